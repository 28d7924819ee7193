//! End-to-end orchestration: video in, analysis, script and narration out.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::ai::{OpenAiTextGenerator, OpenAiVision};
use crate::capture::{self, Frame, SamplerOptions, VideoInfo};
use crate::config::Settings;
use crate::describer::VisionDescriber;
use crate::duration::{self, DurationEstimate};
use crate::error::{NarraiError, ProviderError, Result};
use crate::intake;
use crate::language::Language;
use crate::narrator::Narrator;
use crate::providers::{SpeechSynthesizer, TextGenerator, VisionProvider};
use crate::script::{LengthPolicy, ScriptWriter};
use crate::sections::{AnalysisText, ScriptBundle};
use crate::session::SessionStore;
use crate::speech::ElevenLabsClient;

/// What happened to the narration step. Analysis and script survive a failure here.
#[derive(Debug)]
pub enum NarrationOutcome {
    Ready(Vec<u8>),
    /// The script had no narration section, so synthesis was skipped
    NothingToSynthesize,
    Failed(NarraiError),
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub language: Language,
    pub analysis: AnalysisText,
    pub duration: DurationEstimate,
    pub script: ScriptBundle,
    pub narration: NarrationOutcome,
}

#[derive(Debug)]
pub struct ProviderCheck {
    pub provider: &'static str,
    pub result: std::result::Result<(), ProviderError>,
}

pub struct Pipeline {
    settings: Settings,
    sessions: Arc<dyn SessionStore>,
    vision: Arc<dyn VisionProvider>,
    text: Arc<dyn TextGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    describer: VisionDescriber,
    writer: ScriptWriter,
    narrator: Narrator,
}

impl Pipeline {
    pub fn new(
        settings: Settings,
        sessions: Arc<dyn SessionStore>,
        vision: Arc<dyn VisionProvider>,
        text: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let (min, max) = settings.script_length_range;
        let writer = ScriptWriter::new(text.clone()).with_length_policy(LengthPolicy {
            min,
            max,
            max_corrections: settings.script_length_corrections,
        });
        Self {
            describer: VisionDescriber::new(vision.clone(), settings.frame_interval_seconds),
            narrator: Narrator::new(speech.clone()),
            writer,
            settings,
            sessions,
            vision,
            text,
            speech,
        }
    }

    /// Builds the pipeline against the real providers. Every API key must be set.
    pub fn from_settings(settings: Settings, sessions: Arc<dyn SessionStore>) -> Result<Self> {
        let vision = OpenAiVision::new(
            settings.gemini_key()?,
            &settings.vision_api_base,
            settings.vision_model.clone(),
            settings.provider_timeout,
        );
        let text = OpenAiTextGenerator::new(
            settings.openai_key()?,
            settings.script_model.clone(),
            settings.provider_timeout,
        );
        let speech = ElevenLabsClient::new(
            settings.elevenlabs_key()?,
            settings.speech_api_base.clone(),
            settings.speech_model.clone(),
            settings.provider_timeout,
        )
        .map_err(|e| NarraiError::provider("ElevenLabs", e))?;

        Ok(Self::new(
            settings,
            sessions,
            Arc::new(vision),
            Arc::new(text),
            Arc::new(speech),
        ))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn writer(&self) -> &ScriptWriter {
        &self.writer
    }

    pub fn language_for(&self, session: &str) -> Language {
        self.settings.language_for(self.sessions.as_ref(), session)
    }

    fn sampler_options(&self) -> SamplerOptions {
        SamplerOptions {
            interval_seconds: self.settings.frame_interval_seconds,
            max_frames: self.settings.max_frames_per_video,
            max_dimension: self.settings.max_frame_dimension,
        }
    }

    /// Runs the whole pipeline on a local path or http(s) URL.
    ///
    /// A downloaded video is removed when this returns, whatever the outcome.
    #[instrument(skip(self))]
    pub async fn process_video(&self, source: &str, session: &str) -> Result<PipelineOutput> {
        let language = self.language_for(session);
        let video = intake::open(
            source,
            self.settings.max_video_size_bytes(),
            &self.settings.temp_dir,
        )
        .await?;

        let info = probe_blocking(video.path().to_path_buf()).await;
        let frames =
            capture::sample_frames_blocking(video.path().to_path_buf(), self.sampler_options())
                .await;
        if frames.is_empty() {
            error!(path = %video.path().display(), "No frames extracted from video");
            return Err(NarraiError::NoFrames);
        }

        let metadata_duration = info.as_ref().and_then(VideoInfo::metadata_duration);
        self.process_frames(&frames, metadata_duration, language)
            .await
    }

    /// Runs describe, duration, script and narration on already sampled frames.
    #[instrument(skip(self, frames), fields(frames = frames.len()))]
    pub async fn process_frames(
        &self,
        frames: &[Frame],
        metadata_duration: Option<f64>,
        language: Language,
    ) -> Result<PipelineOutput> {
        let analysis = self.describer.describe(frames, language).await?;
        if !analysis.has_general_section(language) {
            warn!("Analysis is missing its section markers");
        }

        let duration = duration::resolve(metadata_duration, &analysis);
        let script = self.writer.write(&analysis, &duration, language).await?;

        let narration = match self.narrator.narrate(&script, language).await {
            Ok(audio) => NarrationOutcome::Ready(audio),
            Err(NarraiError::NarrationNotFound) => NarrationOutcome::NothingToSynthesize,
            Err(e) => {
                error!(error = %e, "Narration failed");
                NarrationOutcome::Failed(e)
            }
        };
        info!("Pipeline finished");

        Ok(PipelineOutput {
            language,
            analysis,
            duration,
            script,
            narration,
        })
    }

    /// Voices free text with the session's voice.
    pub async fn speak_text(&self, text: &str, session: &str) -> Result<Vec<u8>> {
        let language = self.language_for(session);
        self.narrator.speak_text(text, language).await
    }

    /// Stores `language` for `session` if it is supported.
    pub fn set_language(&self, session: &str, language: Language) -> Result<()> {
        self.settings
            .select_language(self.sessions.as_ref(), session, language)
    }

    /// Probes each provider once. Failures are reported, not raised.
    pub async fn check_providers(&self) -> Vec<ProviderCheck> {
        let checks = vec![
            ProviderCheck {
                provider: self.vision.name(),
                result: self.vision.check().await,
            },
            ProviderCheck {
                provider: self.text.name(),
                result: self.text.check().await,
            },
            ProviderCheck {
                provider: self.speech.name(),
                result: self.speech.check().await,
            },
        ];
        for check in &checks {
            match &check.result {
                Ok(()) => info!(provider = check.provider, "Connection test successful"),
                Err(e) => warn!(provider = check.provider, error = %e, "Connection test failed"),
            }
        }
        checks
    }
}

async fn probe_blocking(path: PathBuf) -> Option<VideoInfo> {
    tokio::task::spawn_blocking(move || capture::probe(&path))
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "Probe task failed");
            None
        })
}
