//! OpenAI-compatible speech and chat client.
//!
//! One reqwest client serves all three upstream contracts:
//! - `audio/transcriptions` (multipart upload) for speech-to-text
//! - `chat/completions` for the patient's reply
//! - `audio/speech` for text-to-speech
//!
//! Works against api.openai.com or any server speaking the same API when
//! `OSCE_OPENAI_BASE_URL` points elsewhere.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, multipart};
use serde::{Deserialize, Serialize};
use tracing::debug;

use osce_core::types::{Turn, VoiceGender};

use super::{AudioClip, ChatCompletion, SpeechSynthesis, SpeechToText, UpstreamError};
use crate::config::UpstreamConfig;

/// Extension labels tried in turn when the service rejects the uploaded
/// container format.
const FORMAT_FALLBACKS: &[&str] = &["webm", "wav", "mp3", "m4a", "ogg"];

/// OpenAI-compatible client implementing all three upstream contracts.
pub struct OpenAiClient {
    http: Client,
    config: UpstreamConfig,
}

impl OpenAiClient {
    /// Create a new client from upstream config.
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl SpeechToText for OpenAiClient {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, UpstreamError> {
        let mut last_rejection = String::new();

        for (file_name, mime) in upload_candidates(clip) {
            let part = multipart::Part::bytes(clip.bytes.clone())
                .file_name(file_name.clone())
                .mime_str(&mime)?;
            let form = multipart::Form::new()
                .part("file", part)
                .text("model", self.config.transcription_model.clone());

            let response = self
                .http
                .post(self.endpoint("audio/transcriptions"))
                .bearer_auth(&self.config.api_key)
                .multipart(form)
                .send()
                .await?;

            let status = response.status();
            if status == reqwest::StatusCode::BAD_REQUEST {
                // container format rejected; relabel and try the next one
                last_rejection = response.text().await.unwrap_or_default();
                debug!(file_name = %file_name, "transcription upload rejected");
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(UpstreamError::Transcription(format!("{status}: {body}")));
            }

            let parsed: TranscriptionResponse = response.json().await?;
            return Ok(parsed.text);
        }

        Err(UpstreamError::Transcription(format!(
            "all upload formats rejected: {last_rejection}"
        )))
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, turns: &[Turn]) -> Result<String, UpstreamError> {
        let body = ChatRequest {
            model: &self.config.chat_model,
            messages: turns
                .iter()
                .map(|t| ChatMessage {
                    role: t.role.as_str(),
                    content: &t.content,
                })
                .collect(),
        };

        let response = self
            .http
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Completion(format!("{status}: {body}")));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| UpstreamError::Completion("response contained no choices".to_string()))
    }
}

#[async_trait]
impl SpeechSynthesis for OpenAiClient {
    async fn synthesize(&self, text: &str, voice: VoiceGender) -> Result<Vec<u8>, UpstreamError> {
        let body = SpeechRequest {
            model: &self.config.speech_model,
            input: text,
            voice: voice_for(voice),
        };

        let response = self
            .http
            .post(self.endpoint("audio/speech"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Synthesis(format!("{status}: {body}")));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// OpenAI voice for each patient gender.
fn voice_for(voice: VoiceGender) -> &'static str {
    match voice {
        VoiceGender::Male => "onyx",
        VoiceGender::Female => "nova",
    }
}

/// Upload labels to try, client-supplied one first.
fn upload_candidates(clip: &AudioClip) -> Vec<(String, String)> {
    let mut candidates: Vec<(String, String)> = Vec::new();

    if let Some(name) = &clip.file_name {
        let mime = clip
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        candidates.push((name.clone(), mime));
    }

    for ext in FORMAT_FALLBACKS {
        let suffix = format!(".{ext}");
        if candidates.iter().any(|(name, _)| name.ends_with(&suffix)) {
            continue;
        }
        candidates.push((format!("audio{suffix}"), mime_for(ext).to_string()));
    }

    candidates
}

fn mime_for(ext: &str) -> &'static str {
    match ext {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        _ => "audio/webm",
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'static str,
}
