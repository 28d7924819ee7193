//! Video duration resolution.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::sections::AnalysisText;

/// Duration assumed when neither metadata nor the description gives one.
pub const DEFAULT_DURATION_SECS: f64 = 60.0;

// Checked in order; the first pattern with any match wins.
static MINUTES_SECONDS_CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d+)").unwrap());
static MINUTES_AND_SECONDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:мин|min)\w*\.?,?\s*(?:и\s+|and\s+|y\s+)?(\d+)\s*(?:сек|sec|seg)")
        .unwrap()
});
static SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:сек|sec|seg)").unwrap());
static MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:мин|min)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationSource {
    Metadata,
    Description,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationEstimate {
    pub seconds: f64,
    pub source: DurationSource,
}

impl DurationEstimate {
    /// Duration rendered as `m:ss`.
    pub fn formatted(&self) -> String {
        format_duration(self.seconds)
    }
}

pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Scans a description for a mention of the video's length.
///
/// Returns the last match of the highest-priority pattern that matches at all,
/// in seconds, or `None` when nothing looks like a duration.
pub fn estimate_from_text(text: &str) -> Option<f64> {
    // Matches whose numbers do not fit are skipped.
    let two_part = |re: &Regex| -> Option<f64> {
        re.captures_iter(text)
            .filter_map(|c| {
                let minutes = c[1].parse::<u64>().ok()?;
                let seconds = c[2].parse::<u64>().ok()?;
                minutes.checked_mul(60)?.checked_add(seconds)
            })
            .last()
            .map(|s| s as f64)
    };
    let one_part = |re: &Regex, scale: u64| -> Option<f64> {
        re.captures_iter(text)
            .filter_map(|c| c[1].parse::<u64>().ok()?.checked_mul(scale))
            .last()
            .map(|n| n as f64)
    };

    two_part(&MINUTES_SECONDS_CLOCK)
        .or_else(|| two_part(&MINUTES_AND_SECONDS))
        .or_else(|| one_part(&SECONDS, 1))
        .or_else(|| one_part(&MINUTES, 60))
}

/// Picks the container duration when positive, then the description, then the default.
pub fn resolve(metadata_seconds: Option<f64>, analysis: &AnalysisText) -> DurationEstimate {
    let estimate = if let Some(seconds) = metadata_seconds.filter(|s| s.is_finite() && *s > 0.0) {
        DurationEstimate {
            seconds,
            source: DurationSource::Metadata,
        }
    } else if let Some(seconds) = estimate_from_text(analysis.as_str()) {
        debug!(seconds, "Duration recovered from description");
        DurationEstimate {
            seconds,
            source: DurationSource::Description,
        }
    } else {
        DurationEstimate {
            seconds: DEFAULT_DURATION_SECS,
            source: DurationSource::Default,
        }
    };
    info!(
        seconds = estimate.seconds,
        source = ?estimate.source,
        "Resolved video duration"
    );
    estimate
}
