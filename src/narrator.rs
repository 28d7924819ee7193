use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::error::{NarraiError, ProviderError, Result};
use crate::language::Language;
use crate::providers::{SpeechSynthesizer, VoiceSettings};
use crate::sections::{truncate_at_sentence, ScriptBundle};

/// Narration extracted from a script is cut to this many characters.
pub const NARRATION_CEILING: usize = 1000;
pub const NARRATION_MIN_CUT: usize = 800;

/// Longest free text accepted by [`Narrator::speak_text`].
pub const FREE_TEXT_LIMIT: usize = 5000;

pub struct Narrator {
    speech: Arc<dyn SpeechSynthesizer>,
    settings: VoiceSettings,
}

impl Narrator {
    pub fn new(speech: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            speech,
            settings: VoiceSettings::default(),
        }
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        self.settings
    }

    /// Voices the narration section of `bundle`.
    ///
    /// A bundle with nothing to say fails with [`NarraiError::NarrationNotFound`]
    /// before the provider is called.
    #[instrument(skip_all, fields(%language))]
    pub async fn narrate(&self, bundle: &ScriptBundle, language: Language) -> Result<Vec<u8>> {
        let text = prepare_narration(bundle, language)?;
        info!(chars = text.chars().count(), "Extracted script for synthesis");
        debug!(script = %text, "Full extracted script");
        self.synthesize(&text, language).await
    }

    /// Voices arbitrary user text.
    #[instrument(skip_all, fields(%language))]
    pub async fn speak_text(&self, text: &str, language: Language) -> Result<Vec<u8>> {
        let text = prepare_free_text(text)?;
        self.synthesize(&text, language).await
    }

    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>> {
        let audio = self
            .speech
            .synthesize(text, language.voice_id(), &self.settings)
            .await
            .map_err(|e| NarraiError::provider(self.speech.name(), e))?;
        if audio.is_empty() {
            return Err(NarraiError::provider(
                self.speech.name(),
                ProviderError::EmptyResponse,
            ));
        }
        info!(bytes = audio.len(), "Narration synthesized");
        Ok(audio)
    }
}

/// Narration text of `bundle`, cut at a sentence boundary near the ceiling.
pub fn prepare_narration(bundle: &ScriptBundle, language: Language) -> Result<String> {
    let Some(text) = bundle.narration(language) else {
        warn!("No script content found for synthesis");
        return Err(NarraiError::NarrationNotFound);
    };
    Ok(truncate_at_sentence(&text, NARRATION_CEILING, NARRATION_MIN_CUT))
}

/// Validates free text for synthesis. The trimmed text is voiced as given.
pub fn prepare_free_text(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(NarraiError::EmptyText);
    }
    let len = text.chars().count();
    if len > FREE_TEXT_LIMIT {
        return Err(NarraiError::TextTooLong {
            len,
            limit: FREE_TEXT_LIMIT,
        });
    }
    Ok(text.trim().to_string())
}

/// Human-readable description of the voice used for `language`.
pub fn voice_summary(language: Language, settings: &VoiceSettings) -> String {
    let (title, voice, quality, stability, similarity, style, limits) = match language {
        Language::Ru => (
            "🎙️ Настройки голосового синтеза",
            "🔊 Текущий голос",
            "🎛️ Настройки качества",
            "Стабильность",
            "Схожесть",
            "Стиль",
            "⚡ Максимум символов",
        ),
        Language::En => (
            "🎙️ Voice synthesis settings",
            "🔊 Current voice",
            "🎛️ Quality settings",
            "Stability",
            "Similarity",
            "Style",
            "⚡ Maximum characters",
        ),
        Language::Es => (
            "🎙️ Configuración de síntesis de voz",
            "🔊 Voz actual",
            "🎛️ Ajustes de calidad",
            "Estabilidad",
            "Similitud",
            "Estilo",
            "⚡ Máximo de caracteres",
        ),
    };
    format!(
        "{title}\n\n{voice}: {} ({})\n{quality}:\n• {stability}: {}\n• {similarity}: {}\n• {style}: {}\n\n{limits}: {FREE_TEXT_LIMIT}",
        language.voice_name(),
        language.display_name(),
        settings.stability,
        settings.similarity_boost,
        settings.style,
    )
}
