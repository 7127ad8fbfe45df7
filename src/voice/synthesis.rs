//! Speech synthesis seam
//!
//! The text-to-speech engine is an external collaborator. Playback is
//! fire-and-forget from the conversation's point of view: the controller
//! cancels any previous utterance before starting a new one and mirrors
//! start/end/error in its status line.

use async_trait::async_trait;

use crate::Result;

/// A text-to-speech playback sink
#[async_trait]
pub trait SpeechSynthesis: Send + Sync {
    /// Cancel any utterance currently playing
    fn cancel(&self);

    /// Speak `text`, resolving when playback ends
    async fn speak(&self, text: &str) -> Result<()>;
}
