//! osce-server - OSCE Voice backend server
//!
//! REST API that runs voice-driven standardized-patient interviews: axum
//! routes, upstream speech and chat clients, the in-memory session registry,
//! and the expiry sweeper.

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod upstream;
