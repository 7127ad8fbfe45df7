//! Upstream generative-language API clients

mod gemini;

pub use gemini::{GeminiClient, UpstreamError, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_MODEL};
