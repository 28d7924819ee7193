//! Ports for the three external AI services.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ProviderError;

/// Multimodal model that describes an ordered list of images.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Label used in logs and user-facing errors.
    fn name(&self) -> &'static str;

    /// `images` are `data:` URLs, earliest frame first.
    async fn describe(&self, instruction: &str, images: &[String]) -> Result<String, ProviderError>;

    async fn check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// A single chat-completion style generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub system: Option<String>,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &TextRequest) -> Result<String, ProviderError>;

    async fn check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Voice quality parameters sent with every synthesis request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.4,
            similarity_boost: 0.75,
            style: 1.0,
            use_speaker_boost: true,
        }
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns encoded audio (MP3).
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, ProviderError>;

    async fn check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
