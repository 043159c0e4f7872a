//! osce-core - Core library for OSCE Voice
//!
//! This crate provides the domain model shared by the OSCE Voice server:
//!
//! - **session**: in-memory interview sessions and their lifecycle rules
//! - **case**: SQLite-backed store of clinical case definitions
//! - **prompt**: standardized-patient instruction and greeting text
//! - **types**: transcript turns and voice selection
//!
//! Sessions are deliberately memory-only. A process restart discards every
//! conversation; only the case definitions survive in SQLite.

pub mod case;
pub mod error;
pub mod prompt;
pub mod session;
pub mod types;

pub use error::{Error, Result};
pub use session::{Session, SessionState, SessionStore};
pub use types::{Role, Turn, VoiceGender};
