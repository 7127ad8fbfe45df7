//! Speech capture seam
//!
//! The actual speech-to-text engine is an external collaborator; the
//! controller only needs one utterance's transcript or a classified failure.

use async_trait::async_trait;
use thiserror::Error;

/// Capture failures, classified so each maps to a user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The session completed without hearing any speech
    #[error("no speech detected")]
    NoSpeech,

    /// No usable microphone device
    #[error("microphone not found")]
    NoMicrophone,

    /// The user denied microphone access
    #[error("microphone access denied")]
    NotAllowed,

    /// Any other engine error code, passed through raw
    #[error("{0}")]
    Other(String),
}

impl CaptureError {
    /// The user-facing message shown in the status line
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoSpeech => "No speech detected. Please try again.".to_string(),
            Self::NoMicrophone => "Microphone not found or not working.".to_string(),
            Self::NotAllowed => {
                "Microphone access denied. Please allow microphone access.".to_string()
            }
            Self::Other(code) => code.clone(),
        }
    }
}

/// A speech-to-text capture session source
///
/// One call is one capture session: it resolves with the transcript when the
/// utterance completes, or a [`CaptureError`] when it fails. There is no
/// cancellation; a session runs to completion or to its own error.
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    /// Capture one utterance and return its transcript
    async fn capture(&self) -> Result<String, CaptureError>;
}
