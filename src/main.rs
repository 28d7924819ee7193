use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use narrai::capture;
use narrai::narrator::{self, Narrator};
use narrai::providers::VoiceSettings;
use narrai::session::FileSessionStore;
use narrai::speech::ElevenLabsClient;
use narrai::{Language, NarraiError, NarrationOutcome, Pipeline, PipelineOutput, Settings};

#[derive(Parser)]
#[command(name = "narrai")]
#[command(about = "Describe, script and voice short videos", long_about = None)]
struct Cli {
    /// Session key under which the selected language is stored
    #[arg(short, long, global = true, default_value = "local")]
    session: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a video (path or http(s) URL) and narrate it
    Process {
        input: String,
        #[arg(short, long, default_value = "narrai-output")]
        output_dir: PathBuf,
    },
    /// Voice arbitrary text
    Voice {
        text: String,
        #[arg(short, long, default_value = "voice.mp3")]
        output: PathBuf,
    },
    /// Show or change the session language
    Language { code: Option<String> },
    /// Show the voice used for the session language
    VoiceSettings,
    /// Test the connection to every provider
    Check,
    /// Print container metadata of a video
    Probe { input: PathBuf },
}

/// Attaches the localized user message to a library error.
fn visible(err: NarraiError, language: Language) -> anyhow::Error {
    let message = err.user_message(language);
    anyhow::Error::new(err).context(message)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    narrai::logging::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("Invalid configuration")?;
    let sessions = Arc::new(
        FileSessionStore::open(&settings.session_file).context("Cannot open session store")?,
    );
    let language = settings.language_for(sessions.as_ref(), &cli.session);

    match cli.command {
        Command::Process { input, output_dir } => {
            let pipeline =
                Pipeline::from_settings(settings, sessions).map_err(|e| visible(e, language))?;
            info!(input = %input, "Processing video");
            let output = pipeline
                .process_video(&input, &cli.session)
                .await
                .map_err(|e| visible(e, language))?;
            deliver(&output, &output_dir)?;
        }
        Command::Voice { text, output } => {
            let speech = ElevenLabsClient::new(
                settings.elevenlabs_key().map_err(|e| visible(e, language))?,
                settings.speech_api_base.clone(),
                settings.speech_model.clone(),
                settings.provider_timeout,
            )
            .map_err(|e| visible(NarraiError::provider("ElevenLabs", e), language))?;
            let audio = Narrator::new(Arc::new(speech))
                .speak_text(&text, language)
                .await
                .map_err(|e| visible(e, language))?;
            fs::write(&output, audio)
                .with_context(|| format!("Cannot write {}", output.display()))?;
            println!("🎙️ {}", output.display());
        }
        Command::Language { code: None } => {
            println!("{} ({})", language.display_name(), language.code());
            for supported in &settings.supported_languages {
                println!("  {} - {}", supported.code(), supported.display_name());
            }
        }
        Command::Language { code: Some(code) } => {
            let selected: Language = code.parse().map_err(|e| visible(e, language))?;
            settings
                .select_language(sessions.as_ref(), &cli.session, selected)
                .map_err(|e| visible(e, language))?;
            println!("✅ {}", selected.display_name());
        }
        Command::VoiceSettings => {
            println!("{}", narrator::voice_summary(language, &VoiceSettings::default()));
        }
        Command::Check => {
            let pipeline =
                Pipeline::from_settings(settings, sessions).map_err(|e| visible(e, language))?;
            let mut all_ok = true;
            for check in pipeline.check_providers().await {
                match check.result {
                    Ok(()) => println!("✅ {}", check.provider),
                    Err(e) => {
                        all_ok = false;
                        println!("❌ {}: {e}", check.provider);
                    }
                }
            }
            if !all_ok {
                anyhow::bail!("Some providers are unreachable");
            }
        }
        Command::Probe { input } => {
            let info = capture::probe(&input)
                .ok_or_else(|| visible(NarraiError::NoFrames, language))?;
            println!("fps: {:.2}", info.fps);
            println!("frames: {}", info.frame_count);
            println!("duration: {:.2}s", info.duration_seconds);
            println!("resolution: {}x{}", info.width, info.height);
            println!("size: {:.1} MB", info.size_mb());
        }
    }

    Ok(())
}

fn deliver(output: &PipelineOutput, output_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Cannot create {}", output_dir.display()))?;

    for block in output.analysis.blocks(output.language) {
        println!("{block}\n");
    }
    println!("{}\n", output.script);

    fs::write(output_dir.join("analysis.md"), output.analysis.as_str())?;
    fs::write(output_dir.join("script.md"), output.script.as_str())?;

    match &output.narration {
        NarrationOutcome::Ready(audio) => {
            let path = output_dir.join("narration.mp3");
            fs::write(&path, audio)?;
            println!("🎙️ {}", path.display());
        }
        NarrationOutcome::NothingToSynthesize => {
            println!("{}", NarraiError::NarrationNotFound.user_message(output.language));
        }
        NarrationOutcome::Failed(e) => {
            println!("{}", e.user_message(output.language));
        }
    }
    Ok(())
}
