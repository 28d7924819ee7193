use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::duration::DurationEstimate;
use crate::error::{NarraiError, ProviderError, Result};
use crate::language::Language;
use crate::prompts;
use crate::providers::{TextGenerator, TextRequest};
use crate::sections::{AnalysisText, ScriptBundle};

/// Assumed narration density.
pub const CHARS_PER_MINUTE: f64 = 1000.0;
pub const SCRIPT_MAX_TOKENS: u32 = 2000;
pub const SCRIPT_TEMPERATURE: f32 = 0.8;
pub const CORRECTION_TEMPERATURE: f32 = 0.7;

/// Target narration length in characters for a video of `duration_seconds`.
pub fn character_budget(duration_seconds: f64) -> usize {
    (duration_seconds.max(0.0) / 60.0 * CHARS_PER_MINUTE).round() as usize
}

/// Bounds for the optional length post-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPolicy {
    pub min: usize,
    pub max: usize,
    /// 0 disables the post-check
    pub max_corrections: u32,
}

impl LengthPolicy {
    pub fn contains(&self, length: usize) -> bool {
        (self.min..=self.max).contains(&length)
    }
}

impl Default for LengthPolicy {
    fn default() -> Self {
        Self {
            min: 700,
            max: 900,
            max_corrections: 0,
        }
    }
}

pub struct ScriptWriter {
    generator: Arc<dyn TextGenerator>,
    policy: LengthPolicy,
}

impl ScriptWriter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            policy: LengthPolicy::default(),
        }
    }

    pub fn with_length_policy(mut self, policy: LengthPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> LengthPolicy {
        self.policy
    }

    /// Generates a script sized to `duration`.
    ///
    /// With a non-zero correction budget, the narration is measured afterwards and
    /// rewritten up to that many times while it falls outside the policy range.
    #[instrument(skip_all, fields(%language, duration = duration.seconds))]
    pub async fn write(
        &self,
        analysis: &AnalysisText,
        duration: &DurationEstimate,
        language: Language,
    ) -> Result<ScriptBundle> {
        let budget = character_budget(duration.seconds);
        let prompt = prompts::fill(
            prompts::script_template(language),
            &[
                ("duration", &duration.formatted()),
                ("character_count", &budget.to_string()),
                ("video_description", analysis.as_str()),
            ],
        );
        info!(budget, "Generating script");

        let request = TextRequest {
            system: Some(prompts::script_system_instruction(language).to_string()),
            user: prompt.trim().to_string(),
            max_tokens: SCRIPT_MAX_TOKENS,
            temperature: SCRIPT_TEMPERATURE,
        };
        let text = self
            .generator
            .generate(&request)
            .await
            .map_err(|e| NarraiError::provider(self.generator.name(), e))?;
        if text.trim().is_empty() {
            return Err(NarraiError::provider(
                self.generator.name(),
                ProviderError::EmptyResponse,
            ));
        }

        let mut bundle = ScriptBundle::new(text.trim());
        info!(chars = bundle.as_str().chars().count(), "Script generated");

        for attempt in 1..=self.policy.max_corrections {
            let body = bundle.script_body(language);
            let length = body.chars().count();
            if self.policy.contains(length) {
                break;
            }
            info!(attempt, length, min = self.policy.min, max = self.policy.max, "Narration length outside target range");

            let corrected = self
                .correct_length(&body, length, (self.policy.min, self.policy.max), language)
                .await;
            if corrected == body {
                break;
            }
            bundle = bundle.with_narration(&corrected, language);
        }

        Ok(bundle)
    }

    /// Asks the generator once to bring `script` into `target` characters.
    /// Returns `script` unchanged if the call fails.
    pub async fn correct_length(
        &self,
        script: &str,
        current_length: usize,
        target: (usize, usize),
        language: Language,
    ) -> String {
        let request = TextRequest {
            system: None,
            user: prompts::correction_instruction(language, script, current_length, target.0, target.1),
            max_tokens: SCRIPT_MAX_TOKENS,
            temperature: CORRECTION_TEMPERATURE,
        };

        match self.generator.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => {
                let corrected = text.trim().to_string();
                info!(
                    from = current_length,
                    to = corrected.chars().count(),
                    "Script length corrected"
                );
                corrected
            }
            Ok(_) => {
                warn!("Empty response for script correction");
                script.to_string()
            }
            Err(e) => {
                error!(error = %e, "Error correcting script length");
                script.to_string()
            }
        }
    }
}
