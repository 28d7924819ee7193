use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NarraiError;

/// A narration language. Every prompt, section marker and voice is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ru,
    En,
    Es,
}

/// Headers that delimit the four regions of a video description.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisMarkers {
    pub title: &'static str,
    pub general: &'static str,
    pub timeline: &'static str,
    pub key_moments: &'static str,
    pub conclusion: &'static str,
}

/// Headers that delimit the three regions of a generated script.
#[derive(Debug, Clone, Copy)]
pub struct ScriptMarkers {
    pub narration: &'static str,
    pub titles: &'static str,
    pub keywords: &'static str,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Ru, Language::En, Language::Es];

    pub fn code(self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Ru => "🇷🇺 Русский",
            Language::En => "🇺🇸 English",
            Language::Es => "🇪🇸 Español",
        }
    }

    pub fn voice_id(self) -> &'static str {
        match self {
            Language::Ru => "1REYVgkHGlaFX4Rz9cPZ",
            Language::En => "EXAVITQu4vr4xnSDxMaL",
            Language::Es => "XrExE9yKIg1WjnnlVkGX",
        }
    }

    pub fn voice_name(self) -> &'static str {
        match self {
            Language::Ru => "Vasiliy",
            Language::En => "Sarah",
            Language::Es => "Mateo",
        }
    }

    pub fn analysis_markers(self) -> AnalysisMarkers {
        match self {
            Language::Ru => AnalysisMarkers {
                title: "🎬 **АНАЛИЗ ВИДЕО**",
                general: "📋 **ОБЩЕЕ ОПИСАНИЕ:**",
                timeline: "⏰ **РАСКАДРОВКА ПО ВРЕМЕНИ:**",
                key_moments: "🎯 **КЛЮЧЕВЫЕ МОМЕНТЫ:**",
                conclusion: "📝 **ЗАКЛЮЧЕНИЕ:**",
            },
            Language::En => AnalysisMarkers {
                title: "🎬 **VIDEO ANALYSIS**",
                general: "📋 **GENERAL DESCRIPTION:**",
                timeline: "⏰ **TIMELINE BREAKDOWN:**",
                key_moments: "🎯 **KEY MOMENTS:**",
                conclusion: "📝 **CONCLUSION:**",
            },
            Language::Es => AnalysisMarkers {
                title: "🎬 **ANÁLISIS DE VIDEO**",
                general: "📋 **DESCRIPCIÓN GENERAL:**",
                timeline: "⏰ **DESGLOSE TEMPORAL:**",
                key_moments: "🎯 **MOMENTOS CLAVE:**",
                conclusion: "📝 **CONCLUSIÓN:**",
            },
        }
    }

    pub fn script_markers(self) -> ScriptMarkers {
        match self {
            Language::Ru => ScriptMarkers {
                narration: "🎙️ **СЦЕНАРИЙ ДЛЯ ОЗВУЧКИ:**",
                titles: "📺 **ВАРИАНТЫ ЗАГОЛОВКОВ:**",
                keywords: "🔑 **КЛЮЧЕВЫЕ СЛОВА:**",
            },
            Language::En => ScriptMarkers {
                narration: "🎙️ **VOICE-OVER SCRIPT:**",
                titles: "📺 **TITLE OPTIONS:**",
                keywords: "🔑 **KEYWORDS:**",
            },
            Language::Es => ScriptMarkers {
                narration: "🎙️ **GUIÓN DE NARRACIÓN:**",
                titles: "📺 **OPCIONES DE TÍTULO:**",
                keywords: "🔑 **PALABRAS CLAVE:**",
            },
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = NarraiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ru" => Ok(Language::Ru),
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(NarraiError::UnsupportedLanguage(other.to_string())),
        }
    }
}
