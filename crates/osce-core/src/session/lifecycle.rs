//! Session lifecycle rules.
//!
//! A session is `Initialized` from creation until the patient has greeted the
//! trainee, and `Active` from then on. There is no terminal state: a finished
//! session is removed outright and later requests fail as not-found, which is
//! also how expiry presents itself.

use super::Session;
use crate::error::{Error, Result};
use crate::types::Turn;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initialized,
    Active,
}

impl Session {
    /// Check that the interview has not started yet.
    pub fn ensure_can_begin(&self) -> Result<()> {
        match self.state {
            SessionState::Initialized => Ok(()),
            SessionState::Active => Err(Error::SessionAlreadyActive(self.id.clone())),
        }
    }

    /// Start the interview: record the patient's greeting and go Active.
    pub fn begin(&mut self, greeting: &str) -> Result<()> {
        self.ensure_can_begin()?;
        self.transcript.push(Turn::assistant(greeting));
        self.state = SessionState::Active;
        self.touch();
        Ok(())
    }

    /// Turns may only be processed once the interview has started.
    pub fn require_active(&self) -> Result<()> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Initialized => Err(Error::SessionNotActive(self.id.clone())),
        }
    }
}
