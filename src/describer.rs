use std::sync::Arc;

use tracing::{info, instrument};

use crate::capture::Frame;
use crate::error::{NarraiError, ProviderError, Result};
use crate::language::Language;
use crate::prompts;
use crate::providers::VisionProvider;
use crate::sections::AnalysisText;

/// Turns sampled frames into a timeline description.
pub struct VisionDescriber {
    provider: Arc<dyn VisionProvider>,
    interval_seconds: f64,
}

impl VisionDescriber {
    pub fn new(provider: Arc<dyn VisionProvider>, interval_seconds: f64) -> Self {
        Self {
            provider,
            interval_seconds,
        }
    }

    /// One multimodal request: the instruction first, then every frame in order.
    /// No frames means no request.
    #[instrument(skip_all, fields(frames = frames.len(), %language))]
    pub async fn describe(&self, frames: &[Frame], language: Language) -> Result<AnalysisText> {
        if frames.is_empty() {
            return Err(NarraiError::NoFrames);
        }

        let instruction = prompts::analysis_instruction(language, self.interval_seconds);
        let images = frames
            .iter()
            .map(Frame::to_data_url)
            .collect::<Result<Vec<_>>>()?;

        let text = self
            .provider
            .describe(&instruction, &images)
            .await
            .map_err(|e| NarraiError::provider(self.provider.name(), e))?;
        if text.trim().is_empty() {
            return Err(NarraiError::provider(
                self.provider.name(),
                ProviderError::EmptyResponse,
            ));
        }

        info!(chars = text.chars().count(), "Video analysis completed");
        Ok(AnalysisText::new(text))
    }
}
