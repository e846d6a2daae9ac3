//! consulta - terminal client for a question-answering backend
//!
//! The library holds the session lifecycle (validation, dispatch, progress,
//! rendering); the binary wraps it in a TUI and a few one-shot commands.

pub mod client;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod logging;
pub mod models;
pub mod progress;
pub mod render;
pub mod ui;

pub use client::{Backend, HttpBackend, RequestEnvelope, ResponseEnvelope};
pub use controller::{Outcome, SessionConfig, SessionController, Submission};
pub use conversation::{ChatEntry, Conversation, Role};
pub use error::ClientError;
pub use models::Mode;
