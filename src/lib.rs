//! Video narration: sample frames, describe them with a vision model, write a
//! narration script sized to the video, and voice it.

pub mod ai;
pub mod capture;
pub mod config;
pub mod describer;
pub mod duration;
pub mod error;
pub mod intake;
pub mod language;
pub mod logging;
pub mod narrator;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod script;
pub mod sections;
pub mod session;
pub mod speech;

pub use config::Settings;
pub use error::{ErrorKind, NarraiError, ProviderError, Result};
pub use language::Language;
pub use pipeline::{NarrationOutcome, Pipeline, PipelineOutput};
