//! Web variant of the speech translation pipeline
//!
//! Four endpoints mirror the browser UI: file upload, typed-text
//! translation, microphone recording, and YouTube translation. Synthesized
//! audio files are served back under `/audio`.

pub mod http;
pub mod state;
pub mod youtube;

pub use http::create_router;
pub use state::AppState;
pub use youtube::YoutubeFetcher;
