//! Chat controller
//!
//! Sequences one conversation turn: capture → transcript → relay → reply →
//! synthesis, with an explicit three-state phase instead of the bare
//! recording flag the flow started life as. The controller owns the
//! transcript list and the status line; the driving loop owns time (the
//! auto-clear delay) so the state machine stays deterministic.

use std::sync::Arc;
use std::time::Duration;

use crate::client::ChatBackend;

use super::{CaptureError, SpeechCapture, SpeechSynthesis};

/// Status line when the controller is ready for input
pub const READY_STATUS: &str = "Click the button to speak";

/// Chat message shown (and spoken) when the relay call fails
pub const APOLOGY_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// How long a transient error status stays up before reverting to ready
pub const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(3);

const LISTENING_STATUS: &str = "Listening...";
const PROCESSING_STATUS: &str = "Processing...";
const THINKING_STATUS: &str = "AI is thinking...";
const SPEAKING_STATUS: &str = "AI is speaking...";
const SYNTHESIS_ERROR_STATUS: &str = "Error in speech synthesis";

/// Phase of the conversation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    /// Ready for the user to start a capture session
    Idle,
    /// A capture session is running
    Recording,
    /// Transcript sent, waiting on the relay reply
    WaitingForReply,
}

/// Who produced a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

/// One displayed message; created per turn, never mutated
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub sender: Sender,
    pub text: String,
}

/// Owns the conversation state for one chat session
pub struct ChatController {
    phase: ChatPhase,
    turns: Vec<ChatTurn>,
    status: String,
    transient_error: bool,
    capture: Arc<dyn SpeechCapture>,
    synthesis: Arc<dyn SpeechSynthesis>,
    backend: Arc<dyn ChatBackend>,
}

impl ChatController {
    /// Create a controller over the given capture, synthesis, and relay seams
    #[must_use]
    pub fn new(
        capture: Arc<dyn SpeechCapture>,
        synthesis: Arc<dyn SpeechSynthesis>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            phase: ChatPhase::Idle,
            turns: Vec::new(),
            status: READY_STATUS.to_string(),
            transient_error: false,
            capture,
            synthesis,
            backend,
        }
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// Current status line
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The conversation so far
    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Whether the current status is a transient error awaiting auto-clear
    #[must_use]
    pub const fn has_transient_error(&self) -> bool {
        self.transient_error
    }

    /// Handle a press of the talk button
    ///
    /// Returns `true` when a capture session should start. A press while
    /// recording ends the session early; a press while waiting for the reply
    /// is ignored.
    pub fn press(&mut self) -> bool {
        match self.phase {
            ChatPhase::Idle => {
                self.phase = ChatPhase::Recording;
                self.set_status(LISTENING_STATUS);
                true
            }
            ChatPhase::Recording => {
                self.phase = ChatPhase::Idle;
                self.set_status(PROCESSING_STATUS);
                false
            }
            ChatPhase::WaitingForReply => {
                tracing::debug!("press ignored while waiting for reply");
                false
            }
        }
    }

    /// Run one full conversation turn after [`press`](Self::press) started a
    /// capture session
    ///
    /// Drives capture → relay → synthesis and lands back in `Idle`. Failures
    /// never propagate: they become status text (and, for relay failures, an
    /// apology turn). Check [`has_transient_error`](Self::has_transient_error)
    /// afterwards and revert via [`clear_transient_status`](Self::clear_transient_status)
    /// once [`STATUS_CLEAR_DELAY`] has passed.
    pub async fn run_turn(&mut self) {
        let capture = self.capture.clone();
        match capture.capture().await {
            Ok(transcript) => {
                self.on_transcript(&transcript);
                self.fetch_reply(&transcript).await;
            }
            Err(e) => self.on_capture_error(&e),
        }
    }

    /// Record a completed capture and enter the waiting phase
    pub fn on_transcript(&mut self, transcript: &str) {
        tracing::info!(transcript = %transcript, "capture complete");
        self.push_turn(Sender::User, transcript.to_string());
        self.phase = ChatPhase::WaitingForReply;
        self.set_status(THINKING_STATUS);
    }

    /// Call the relay for a reply to `transcript` and play it back
    ///
    /// On failure the AI turn becomes a generic apology and the error detail
    /// lands in the status line.
    pub async fn fetch_reply(&mut self, transcript: &str) {
        let backend = self.backend.clone();
        match backend.reply(transcript).await {
            Ok(reply) => {
                self.phase = ChatPhase::Idle;
                self.push_turn(Sender::Ai, reply.clone());
                self.speak(&reply).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "relay call failed");
                self.phase = ChatPhase::Idle;
                self.push_turn(Sender::Ai, APOLOGY_MESSAGE.to_string());
                self.set_transient_error(format!("Error: {e}"));
            }
        }
    }

    /// Revert a transient error status to the ready message
    ///
    /// The driving loop calls this after [`STATUS_CLEAR_DELAY`].
    pub fn clear_transient_status(&mut self) {
        if self.transient_error {
            self.transient_error = false;
            self.set_status(READY_STATUS);
        }
    }

    fn on_capture_error(&mut self, error: &CaptureError) {
        tracing::error!(error = %error, "speech capture failed");
        self.phase = ChatPhase::Idle;
        self.set_transient_error(format!("Error: {}", error.user_message()));
    }

    /// Speak a reply, cancelling whatever was still playing
    async fn speak(&mut self, text: &str) {
        let synthesis = self.synthesis.clone();
        synthesis.cancel();
        self.set_status(SPEAKING_STATUS);

        match synthesis.speak(text).await {
            Ok(()) => self.set_status(READY_STATUS),
            Err(e) => {
                tracing::error!(error = %e, "speech synthesis failed");
                self.set_status(SYNTHESIS_ERROR_STATUS);
            }
        }
    }

    fn push_turn(&mut self, sender: Sender, text: String) {
        self.turns.push(ChatTurn { sender, text });
    }

    fn set_status(&mut self, status: &str) {
        self.transient_error = false;
        self.status = status.to_string();
    }

    fn set_transient_error(&mut self, status: String) {
        self.status = status;
        self.transient_error = true;
    }
}
