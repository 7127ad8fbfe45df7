//! Client-side voice chat: capture and synthesis seams plus the controller
//! that sequences a conversation turn

mod capture;
mod controller;
mod synthesis;

pub use capture::{CaptureError, SpeechCapture};
pub use controller::{
    ChatController, ChatPhase, ChatTurn, Sender, APOLOGY_MESSAGE, READY_STATUS,
    STATUS_CLEAR_DELAY,
};
pub use synthesis::SpeechSynthesis;
