//! Error types shared by every pipeline stage.

use std::path::PathBuf;

use thiserror::Error;

use crate::language::Language;

pub type Result<T> = std::result::Result<T, NarraiError>;

/// Failure reported by one of the external AI providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("empty response")]
    EmptyResponse,

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("timed out after {0}s")]
    Timeout(u64),
}

impl From<async_openai::error::OpenAIError> for ProviderError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        let message = err.to_string();
        if is_quota_message(&message) {
            ProviderError::QuotaExceeded(message)
        } else {
            ProviderError::Request(message)
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Request(err.to_string())
    }
}

pub(crate) fn is_quota_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("quota_exceeded")
        || lower.contains("credits remaining")
        || lower.contains("insufficient_quota")
}

/// The four failure classes a user can see, plus internal faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputRejected,
    DecodeFailure,
    ProviderFailure,
    ExtractionFailure,
    Internal,
}

#[derive(Debug, Error)]
pub enum NarraiError {
    #[error("video not found: {0}")]
    VideoMissing(PathBuf),

    #[error("video is too large: {size_mb:.1} MB (limit {limit_mb} MB)")]
    VideoTooLarge { size_mb: f64, limit_mb: u64 },

    #[error("text is empty")]
    EmptyText,

    #[error("text is too long: {len} characters (limit {limit})")]
    TextTooLong { len: usize, limit: usize },

    #[error("no frames could be extracted from the video")]
    NoFrames,

    #[error("{provider} provider failed: {source}")]
    Provider {
        provider: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("narration section not found in script")]
    NarrationNotFound,

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NarraiError {
    pub fn provider(provider: &'static str, source: ProviderError) -> Self {
        Self::Provider { provider, source }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NarraiError::VideoMissing(_)
            | NarraiError::VideoTooLarge { .. }
            | NarraiError::EmptyText
            | NarraiError::TextTooLong { .. }
            | NarraiError::UnsupportedLanguage(_) => ErrorKind::InputRejected,
            NarraiError::NoFrames => ErrorKind::DecodeFailure,
            NarraiError::Provider { .. } => ErrorKind::ProviderFailure,
            NarraiError::NarrationNotFound => ErrorKind::ExtractionFailure,
            NarraiError::Config(_)
            | NarraiError::Download(_)
            | NarraiError::Io(_)
            | NarraiError::Json(_) => ErrorKind::Internal,
        }
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(
            self,
            NarraiError::Provider {
                source: ProviderError::QuotaExceeded(_),
                ..
            }
        )
    }

    /// Localized message shown to the user in place of the failed artifact.
    pub fn user_message(&self, language: Language) -> String {
        use Language::*;

        match self {
            NarraiError::VideoMissing(_) => match language {
                Ru => "❌ Ошибка: видео не найдено".to_string(),
                En => "❌ Error: video not found".to_string(),
                Es => "❌ Error: no se encontró el video".to_string(),
            },
            NarraiError::VideoTooLarge { size_mb, limit_mb } => match language {
                Ru => format!(
                    "❌ Видео слишком большое!\n\n📏 Размер вашего видео: {size_mb:.1} МБ\n📐 Максимальный размер: {limit_mb} МБ\n\n💡 Сожмите видео, уменьшите разрешение или сократите длительность."
                ),
                En => format!(
                    "❌ The video is too large!\n\n📏 Your video: {size_mb:.1} MB\n📐 Maximum size: {limit_mb} MB\n\n💡 Compress it, lower the resolution or shorten it."
                ),
                Es => format!(
                    "❌ ¡El video es demasiado grande!\n\n📏 Tu video: {size_mb:.1} MB\n📐 Tamaño máximo: {limit_mb} MB\n\n💡 Comprímelo, reduce la resolución o acórtalo."
                ),
            },
            NarraiError::EmptyText => match language {
                Ru => "❌ Текст не может быть пустым".to_string(),
                En => "❌ Text cannot be empty".to_string(),
                Es => "❌ El texto no puede estar vacío".to_string(),
            },
            NarraiError::TextTooLong { limit, .. } => match language {
                Ru => format!("❌ Текст слишком длинный (максимум {limit} символов)"),
                En => format!("❌ Text is too long (maximum {limit} characters)"),
                Es => format!("❌ El texto es demasiado largo (máximo {limit} caracteres)"),
            },
            NarraiError::NoFrames => match language {
                Ru => "❌ Ошибка: не удалось извлечь кадры из видео".to_string(),
                En => "❌ Error: could not extract frames from the video".to_string(),
                Es => "❌ Error: no se pudieron extraer fotogramas del video".to_string(),
            },
            NarraiError::Provider {
                source: ProviderError::QuotaExceeded(_),
                provider,
            } => match language {
                Ru => format!("⚠️ Превышена квота {provider}. Попробуйте позже или обновите план."),
                En => format!("⚠️ {provider} quota exceeded. Try again later or upgrade the plan."),
                Es => format!("⚠️ Cuota de {provider} excedida. Inténtalo más tarde o mejora el plan."),
            },
            NarraiError::Provider { provider, source } => match language {
                Ru => format!("❌ Ошибка {provider}: {source}"),
                En => format!("❌ {provider} error: {source}"),
                Es => format!("❌ Error de {provider}: {source}"),
            },
            NarraiError::NarrationNotFound => match language {
                Ru => "⚠️ В сценарии не найден текст для озвучки, озвучка пропущена".to_string(),
                En => "⚠️ No voice-over text found in the script, narration skipped".to_string(),
                Es => "⚠️ No se encontró texto de narración en el guion, narración omitida"
                    .to_string(),
            },
            NarraiError::UnsupportedLanguage(code) => match language {
                Ru => format!("❌ Неподдерживаемый язык: {code}"),
                En => format!("❌ Unsupported language: {code}"),
                Es => format!("❌ Idioma no soportado: {code}"),
            },
            other => match language {
                Ru => format!("❌ Произошла ошибка при обработке видео:\n{other}"),
                En => format!("❌ An error occurred while processing the video:\n{other}"),
                Es => format!("❌ Ocurrió un error al procesar el video:\n{other}"),
            },
        }
    }
}
