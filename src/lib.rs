//! Parley - voice chat relay for a conversational language-practice assistant
//!
//! This library provides the pieces of the Parley relay:
//! - The relay HTTP API that shields the upstream API credential
//! - The upstream Gemini client and response normalization
//! - The client-side chat controller (capture → relay → synthesis)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Chat Controller                     │
//! │   Capture  │  Status  │  Transcript  │  Synthesis   │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST /api/chat
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Relay Handler                       │
//! │   validate  │  template  │  credential  │  envelope │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │         Gemini generateContent (upstream)            │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod upstream;
pub mod voice;

pub use api::{ApiServer, ApiState};
pub use client::{ChatBackend, RelayClient};
pub use config::Config;
pub use error::{Error, Result};
pub use upstream::{GeminiClient, UpstreamError};
pub use voice::{
    CaptureError, ChatController, ChatPhase, ChatTurn, Sender, SpeechCapture, SpeechSynthesis,
    STATUS_CLEAR_DELAY,
};
