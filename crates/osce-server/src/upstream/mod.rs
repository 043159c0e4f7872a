//! Upstream speech and chat services.
//!
//! The interview flow sees only these three contracts. The OpenAI-compatible
//! client implements all of them; tests substitute scripted fakes.

pub mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use osce_core::types::{Turn, VoiceGender};
use thiserror::Error;

/// Errors from the speech and chat collaborators.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Chat completion failed: {0}")]
    Completion(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Audio uploaded by the client, with whatever labeling the browser supplied.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, file_name: Option<String>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            file_name,
            content_type,
        }
    }
}

/// Speech-to-text contract.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, UpstreamError>;
}

/// Chat completion contract. Receives the full ordered transcript, hidden
/// system turn included.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, turns: &[Turn]) -> Result<String, UpstreamError>;
}

/// Text-to-speech contract. Returns encoded audio bytes.
#[async_trait]
pub trait SpeechSynthesis: Send + Sync {
    async fn synthesize(&self, text: &str, voice: VoiceGender) -> Result<Vec<u8>, UpstreamError>;
}
