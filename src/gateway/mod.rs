//! Device session gateway.
//!
//! The discovery engine never talks to a transport directly. It opens a
//! [`DeviceSession`] through a [`DeviceGateway`], escalates privilege, reads
//! the prompt, runs commands and closes the session. Connect, escalate and
//! execute may block; per-call timeouts belong to the gateway.

pub mod replay;

pub use replay::{CaptureError, ReplayGateway};

use crate::discovery::types::ConnectionParams;

/// Failure while opening or driving a device session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Session error: {0}")]
    Other(String),
}

impl SessionError {
    /// Short label used in summaries ("auth", "timeout", "other")
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::Auth(_) => "auth",
            SessionError::Timeout(_) => "timeout",
            SessionError::Other(_) => "other",
        }
    }
}

/// Opens sessions to devices
pub trait DeviceGateway {
    type Session: DeviceSession;

    fn open(&self, params: &ConnectionParams) -> Result<Self::Session, SessionError>;
}

/// An established session with one device
pub trait DeviceSession {
    /// Enter privileged mode (`enable` or equivalent)
    fn escalate_privilege(&mut self) -> Result<(), SessionError>;

    /// Raw prompt text, e.g. `"R1#"`
    fn identify(&mut self) -> Result<String, SessionError>;

    /// Run `command` and return its raw output
    fn execute(&mut self, command: &str) -> Result<String, SessionError>;

    /// Release the session. Called exactly once on every exit path.
    fn close(&mut self);
}

/// Self-reported hostname from a raw prompt.
///
/// Strips surrounding whitespace and the trailing privilege marker
/// (`#` or `>`).
pub fn hostname_from_prompt(prompt: &str) -> String {
    prompt
        .trim()
        .trim_end_matches(['#', '>'])
        .trim()
        .to_string()
}
