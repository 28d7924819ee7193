//! Marker-based parsing of formatted provider output.
//!
//! Both provider responses are free text with emoji/bold headers. Parsing never
//! fails: when the expected markers are missing, callers get the whole text back.

use std::fmt;

use crate::language::Language;

/// Free-text timeline description of a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisText(String);

/// Formatted script holding narration, title options and keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBundle(String);

impl AnalysisText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Splits the description into its marked sections, in document order.
    ///
    /// Falls back to a single block (the title marker followed by the whole text)
    /// when none of the sections can be found.
    pub fn blocks(&self, language: Language) -> Vec<String> {
        let markers = language.analysis_markers();
        let bounds = [
            (markers.general, Some(markers.timeline)),
            (markers.timeline, Some(markers.key_moments)),
            (markers.key_moments, Some(markers.conclusion)),
            (markers.conclusion, None),
        ];

        let text = self.0.as_str();
        let mut blocks = Vec::new();
        for (start_marker, end_marker) in bounds {
            let Some(start) = text.find(start_marker) else {
                continue;
            };
            let rest = &text[start..];
            let end = end_marker
                .and_then(|m| rest.find(m))
                .unwrap_or(rest.len());
            let block = rest[..end].trim();
            if !block.is_empty() {
                blocks.push(block.to_string());
            }
        }

        if blocks.is_empty() {
            blocks.push(format!("{}\n\n{}", markers.title, text.trim()));
        }
        blocks
    }

    /// Whether the general-description header is present.
    pub fn has_general_section(&self, language: Language) -> bool {
        self.0.contains(language.analysis_markers().general)
    }
}

impl ScriptBundle {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn has_all_sections(&self, language: Language) -> bool {
        let markers = language.script_markers();
        [markers.narration, markers.titles, markers.keywords]
            .iter()
            .all(|m| self.0.contains(m))
    }

    /// Clean narration text ready for synthesis, or `None` when the narration
    /// section is missing or has no speakable lines.
    pub fn narration(&self, language: Language) -> Option<String> {
        let marker = language.script_markers().narration;
        let mut collecting = false;
        let mut lines = Vec::new();

        for line in self.0.lines() {
            let line = line.trim();
            if is_narration_header(line, marker) {
                collecting = true;
                continue;
            }
            if !collecting {
                continue;
            }
            if is_section_end(line) {
                break;
            }
            if !is_formatting(line) {
                lines.push(line);
            }
        }

        let clean = lines.join(" ").replace(['[', ']'], "");
        let clean = clean.trim();
        (!clean.is_empty()).then(|| clean.to_string())
    }

    /// The narration section, or the whole text when it cannot be isolated.
    pub fn script_body(&self, language: Language) -> String {
        self.narration(language)
            .unwrap_or_else(|| self.0.trim().to_string())
    }

    /// Replaces the narration section with `narration`, keeping the other sections.
    pub fn with_narration(&self, narration: &str, language: Language) -> ScriptBundle {
        let marker = language.script_markers().narration;
        let lines: Vec<&str> = self.0.lines().collect();

        let Some(start) = lines
            .iter()
            .position(|l| is_narration_header(l.trim(), marker))
        else {
            return ScriptBundle::new(narration.trim());
        };
        let end = lines[start + 1..]
            .iter()
            .position(|l| is_section_end(l.trim()))
            .map_or(lines.len(), |p| start + 1 + p);

        let mut out = lines[..=start].join("\n");
        out.push('\n');
        out.push_str(narration.trim());
        if end < lines.len() {
            out.push_str("\n\n");
            out.push_str(&lines[end..].join("\n"));
        }
        ScriptBundle(out)
    }
}

impl fmt::Display for AnalysisText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ScriptBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_narration_header(line: &str, marker: &str) -> bool {
    line.contains(marker)
        || (line.contains("🎙") && ["СЦЕНАРИЙ", "SCRIPT", "GUIÓN"].iter().any(|k| line.contains(k)))
}

fn is_section_end(line: &str) -> bool {
    const HEADERS: [&str; 6] = [
        "**ВАРИАНТЫ ЗАГОЛОВКОВ",
        "**КЛЮЧЕВЫЕ СЛОВА",
        "**TITLE OPTIONS",
        "**KEYWORDS",
        "**OPCIONES DE TÍTULO",
        "**PALABRAS CLAVE",
    ];
    const PAIRS: [(&str, &str); 5] = [
        ("ЗАГОЛОВКОВ", "ВАРИАНТЫ"),
        ("КЛЮЧЕВЫЕ", "СЛОВА"),
        ("TITLE", "OPTIONS"),
        ("OPCIONES", "TÍTULO"),
        ("PALABRAS", "CLAVE"),
    ];

    line.starts_with('📺')
        || line.starts_with('🔑')
        || HEADERS.iter().any(|h| line.starts_with(h))
        || PAIRS.iter().any(|(a, b)| line.contains(a) && line.contains(b))
        || line.contains("KEYWORDS")
}

fn is_formatting(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('[')
        || line.starts_with("**")
        || line.starts_with('#')
        || line == "---"
}

/// Cuts `text` to at most `ceiling` characters.
///
/// The cut lands just after the last `.`, `!` or `?` when that sits past `min`;
/// otherwise the text is hard-cut and `...` appended. Text at or under the
/// ceiling is returned unchanged.
pub fn truncate_at_sentence(text: &str, ceiling: usize, min: usize) -> String {
    if text.chars().count() <= ceiling {
        return text.to_string();
    }
    let head: Vec<char> = text.chars().take(ceiling).collect();
    match head.iter().rposition(|c| matches!(c, '.' | '!' | '?')) {
        Some(pos) if pos > min => head[..=pos].iter().collect(),
        _ => head.into_iter().collect::<String>() + "...",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narration_excludes_title_section() {
        let bundle = ScriptBundle::new(
            "🎙️ **VOICE-OVER SCRIPT:**\nHello world.\n📺 **TITLE OPTIONS:**\n1. X",
        );
        assert_eq!(bundle.narration(Language::En).as_deref(), Some("Hello world."));
    }

    #[test]
    fn test_narration_skips_formatting_and_strips_brackets() {
        let bundle = ScriptBundle::new(
            "intro\n🎙️ **СЦЕНАРИЙ ДЛЯ ОЗВУЧКИ:**\n\n[Пауза]\n**Громко**\n# note\n---\nПервая [мягко] строка.\n  Вторая строка!\n🔑 **КЛЮЧЕВЫЕ СЛОВА:**\nкот, собака",
        );
        assert_eq!(
            bundle.narration(Language::Ru).as_deref(),
            Some("Первая мягко строка. Вторая строка!")
        );
    }

    #[test]
    fn test_narration_tolerates_header_drift() {
        let bundle = ScriptBundle::new(
            "🎙 SCRIPT\nLine one.\nKEYWORDS: a, b\nnot narration",
        );
        assert_eq!(bundle.narration(Language::En).as_deref(), Some("Line one."));

        let spanish = ScriptBundle::new(
            "🎙️ **GUIÓN DE NARRACIÓN:**\nHola.\nPalabras: **PALABRAS CLAVE**\nperro",
        );
        assert_eq!(spanish.narration(Language::Es).as_deref(), Some("Hola."));
    }

    #[test]
    fn test_missing_marker_yields_none_and_whole_body() {
        let bundle = ScriptBundle::new("Just a paragraph of text.");
        assert_eq!(bundle.narration(Language::En), None);
        assert_eq!(bundle.script_body(Language::En), "Just a paragraph of text.");

        let empty_section = ScriptBundle::new("🎙️ **VOICE-OVER SCRIPT:**\n[music]\n📺 **TITLE OPTIONS:**");
        assert_eq!(empty_section.narration(Language::En), None);
    }

    #[test]
    fn test_with_narration_keeps_other_sections() {
        let bundle = ScriptBundle::new(
            "🎙️ **VOICE-OVER SCRIPT:**\nOld text.\n\n📺 **TITLE OPTIONS:**\n1. X\n🔑 **KEYWORDS:**\ncat",
        );
        let updated = bundle.with_narration("New text.", Language::En);
        assert_eq!(updated.narration(Language::En).as_deref(), Some("New text."));
        assert!(updated.has_all_sections(Language::En));
        assert!(updated.as_str().contains("1. X"));
        assert!(!updated.as_str().contains("Old text."));
    }

    #[test]
    fn test_analysis_blocks_split_on_markers() {
        let text = AnalysisText::new(
            "🎬 **VIDEO ANALYSIS**\n📋 **GENERAL DESCRIPTION:**\nA cat.\n⏰ **TIMELINE BREAKDOWN:**\n0:00 sits\n🎯 **KEY MOMENTS:**\njump\n📝 **CONCLUSION:**\nfun",
        );
        let blocks = text.blocks(Language::En);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0], "📋 **GENERAL DESCRIPTION:**\nA cat.");
        assert!(blocks[3].starts_with("📝 **CONCLUSION:**"));
        assert!(text.has_general_section(Language::En));
    }

    #[test]
    fn test_analysis_blocks_fall_back_to_whole_text() {
        let text = AnalysisText::new("The model ignored the format.");
        let blocks = text.blocks(Language::En);
        assert_eq!(blocks, vec!["🎬 **VIDEO ANALYSIS**\n\nThe model ignored the format."]);
    }

    #[test]
    fn test_truncate_at_sentence_boundary() {
        let mut text = "a".repeat(850);
        text.push('.');
        text.push_str(&"b".repeat(349));
        assert_eq!(text.chars().count(), 1200);

        let cut = truncate_at_sentence(&text, 1000, 800);
        assert_eq!(cut.chars().count(), 851);
        assert!(cut.ends_with('.'));
    }

    #[test]
    fn test_truncate_without_late_sentence_end() {
        let mut text = "a".repeat(100);
        text.push('.');
        text.push_str(&"b".repeat(1100));

        let cut = truncate_at_sentence(&text, 1000, 800);
        assert_eq!(cut.chars().count(), 1003);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_counts_characters() {
        let text = "я".repeat(1000);
        assert_eq!(truncate_at_sentence(&text, 1000, 800), text);
        let longer = "я".repeat(1001);
        assert_eq!(truncate_at_sentence(&longer, 1000, 800).chars().count(), 1003);
    }
}
