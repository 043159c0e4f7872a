//! Application state shared across all request handlers.

use std::sync::Arc;
use std::time::Instant;

use osce_core::case::CaseDatabase;
use osce_core::session::SessionStore;

use crate::config::Config;
use crate::upstream::{ChatCompletion, SpeechSynthesis, SpeechToText};

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: Config,
    /// Live interview sessions
    pub sessions: Arc<SessionStore>,
    /// Clinical case definitions
    pub cases: CaseDatabase,
    /// Speech-to-text collaborator
    pub speech_to_text: Arc<dyn SpeechToText>,
    /// Chat completion collaborator
    pub chat: Arc<dyn ChatCompletion>,
    /// Text-to-speech collaborator
    pub synthesis: Arc<dyn SpeechSynthesis>,
    /// Server start time for uptime reporting
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: Config,
        cases: CaseDatabase,
        speech_to_text: Arc<dyn SpeechToText>,
        chat: Arc<dyn ChatCompletion>,
        synthesis: Arc<dyn SpeechSynthesis>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            sessions: Arc::new(SessionStore::new()),
            cases,
            speech_to_text,
            chat,
            synthesis,
            start_time: Instant::now(),
        })
    }
}
