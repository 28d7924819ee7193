//! Runtime configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::{NarraiError, Result};
use crate::language::Language;
use crate::session::SessionStore;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Every tunable the pipeline reads, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,

    pub vision_model: String,
    pub vision_api_base: String,
    pub script_model: String,
    pub speech_model: String,
    pub speech_api_base: String,

    /// Videos above this size are rejected before decoding
    pub max_video_size_mb: u64,
    pub frame_interval_seconds: f64,
    pub max_frames_per_video: usize,
    /// Longest edge of a sampled frame
    pub max_frame_dimension: u32,
    pub supported_languages: Vec<Language>,
    pub default_language: Language,

    /// Acceptable narration length band for the correction post-check
    pub script_length_range: (usize, usize),
    /// Number of correction calls the writer may issue; 0 leaves it unwired
    pub script_length_corrections: u32,
    pub provider_timeout: Duration,

    pub temp_dir: PathBuf,
    pub session_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let temp_dir = std::env::temp_dir().join("narrai");
        Self {
            gemini_api_key: None,
            openai_api_key: None,
            elevenlabs_api_key: None,
            vision_model: "gemini-2.5-flash".to_string(),
            vision_api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            script_model: "gpt-4o".to_string(),
            speech_model: "eleven_multilingual_v2".to_string(),
            speech_api_base: "https://api.elevenlabs.io".to_string(),
            max_video_size_mb: 20,
            frame_interval_seconds: 5.0,
            max_frames_per_video: 100,
            max_frame_dimension: 1024,
            supported_languages: Language::ALL.to_vec(),
            default_language: Language::Ru,
            script_length_range: (700, 900),
            script_length_corrections: 0,
            provider_timeout: Duration::from_secs(300),
            session_file: temp_dir.join("sessions.json"),
            temp_dir,
        }
    }
}

impl Settings {
    /// Create settings from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Settings::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let temp_dir = get("TEMP_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.temp_dir);
        let session_file = get("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| temp_dir.join("sessions.json"));

        let supported_languages = match get("SUPPORTED_LANGUAGES") {
            Some(raw) => parse_languages(&raw)?,
            None => defaults.supported_languages,
        };
        let default_language = match get("DEFAULT_LANGUAGE") {
            Some(raw) => raw.parse()?,
            None => defaults.default_language,
        };

        let settings = Self {
            gemini_api_key: get("GEMINI_API_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            elevenlabs_api_key: get("ELEVENLABS_API_KEY"),
            vision_model: get("GEMINI_VISION_MODEL").unwrap_or(defaults.vision_model),
            vision_api_base: get("GEMINI_API_BASE").unwrap_or(defaults.vision_api_base),
            script_model: get("OPENAI_SCRIPT_MODEL").unwrap_or(defaults.script_model),
            speech_model: get("ELEVENLABS_MODEL").unwrap_or(defaults.speech_model),
            speech_api_base: get("ELEVENLABS_API_BASE").unwrap_or(defaults.speech_api_base),
            max_video_size_mb: parse_or(
                "MAX_VIDEO_SIZE_MB",
                get("MAX_VIDEO_SIZE_MB"),
                defaults.max_video_size_mb,
            )?,
            frame_interval_seconds: parse_or(
                "FRAME_INTERVAL_SECONDS",
                get("FRAME_INTERVAL_SECONDS"),
                defaults.frame_interval_seconds,
            )?,
            max_frames_per_video: parse_or(
                "MAX_FRAMES_PER_VIDEO",
                get("MAX_FRAMES_PER_VIDEO"),
                defaults.max_frames_per_video,
            )?,
            max_frame_dimension: parse_or(
                "MAX_FRAME_DIMENSION",
                get("MAX_FRAME_DIMENSION"),
                defaults.max_frame_dimension,
            )?,
            supported_languages,
            default_language,
            script_length_range: (
                parse_or(
                    "SCRIPT_LENGTH_MIN",
                    get("SCRIPT_LENGTH_MIN"),
                    defaults.script_length_range.0,
                )?,
                parse_or(
                    "SCRIPT_LENGTH_MAX",
                    get("SCRIPT_LENGTH_MAX"),
                    defaults.script_length_range.1,
                )?,
            ),
            script_length_corrections: parse_or(
                "SCRIPT_LENGTH_CORRECTIONS",
                get("SCRIPT_LENGTH_CORRECTIONS"),
                defaults.script_length_corrections,
            )?,
            provider_timeout: Duration::from_secs(parse_or(
                "PROVIDER_TIMEOUT_SECONDS",
                get("PROVIDER_TIMEOUT_SECONDS"),
                defaults.provider_timeout.as_secs(),
            )?),
            temp_dir,
            session_file,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.frame_interval_seconds > 0.0) {
            return Err(NarraiError::config("FRAME_INTERVAL_SECONDS must be > 0"));
        }
        if self.max_frames_per_video == 0 {
            return Err(NarraiError::config("MAX_FRAMES_PER_VIDEO must be > 0"));
        }
        if self.max_frame_dimension == 0 {
            return Err(NarraiError::config("MAX_FRAME_DIMENSION must be > 0"));
        }
        if self.supported_languages.is_empty() {
            return Err(NarraiError::config("SUPPORTED_LANGUAGES must not be empty"));
        }
        if !self.supported_languages.contains(&self.default_language) {
            return Err(NarraiError::config(format!(
                "DEFAULT_LANGUAGE={} is not in SUPPORTED_LANGUAGES",
                self.default_language
            )));
        }
        if self.max_video_size_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(NarraiError::config(format!(
                "MAX_VIDEO_SIZE_MB={} is too large",
                self.max_video_size_mb
            )));
        }
        let (min, max) = self.script_length_range;
        if min > max {
            return Err(NarraiError::config(
                "SCRIPT_LENGTH_MIN must not exceed SCRIPT_LENGTH_MAX",
            ));
        }
        Ok(())
    }

    pub fn gemini_key(&self) -> Result<&str> {
        require(&self.gemini_api_key, "GEMINI_API_KEY")
    }

    pub fn openai_key(&self) -> Result<&str> {
        require(&self.openai_api_key, "OPENAI_API_KEY")
    }

    pub fn elevenlabs_key(&self) -> Result<&str> {
        require(&self.elevenlabs_api_key, "ELEVENLABS_API_KEY")
    }

    pub fn is_supported(&self, language: Language) -> bool {
        self.supported_languages.contains(&language)
    }

    /// Stores `language` for `session`, rejecting languages outside `supported_languages`.
    pub fn select_language(
        &self,
        store: &dyn SessionStore,
        session: &str,
        language: Language,
    ) -> Result<()> {
        if !self.is_supported(language) {
            return Err(NarraiError::UnsupportedLanguage(language.to_string()));
        }
        store.set_language(session, language)?;
        info!(session, %language, "Language changed");
        Ok(())
    }

    /// Language stored for `session`, or the default when unset or no longer supported.
    pub fn language_for(&self, store: &dyn SessionStore, session: &str) -> Language {
        store
            .language(session)
            .filter(|lang| self.is_supported(*lang))
            .unwrap_or(self.default_language)
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.max_video_size_mb.saturating_mul(BYTES_PER_MB)
    }
}

fn require<'a>(key: &'a Option<String>, env_var: &str) -> Result<&'a str> {
    key.as_deref()
        .ok_or_else(|| NarraiError::config(format!("{env_var} environment variable is not set")))
}

fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| NarraiError::config(format!("invalid value for {name}: {value}"))),
        None => Ok(default),
    }
}

fn parse_languages(raw: &str) -> Result<Vec<Language>> {
    let mut languages = Vec::new();
    for code in raw.split(',').filter(|c| !c.trim().is_empty()) {
        let language: Language = code.parse()?;
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    Ok(languages)
}
