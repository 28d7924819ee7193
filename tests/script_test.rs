mod common;

use narrai::duration::{DurationEstimate, DurationSource};
use narrai::script::{LengthPolicy, ScriptWriter, CORRECTION_TEMPERATURE, SCRIPT_TEMPERATURE};
use narrai::sections::AnalysisText;
use narrai::{ErrorKind, Language, NarraiError, ProviderError};

use common::{MockText, ANALYSIS_EN, SCRIPT_EN};

fn ninety_seconds() -> DurationEstimate {
    DurationEstimate {
        seconds: 90.0,
        source: DurationSource::Metadata,
    }
}

fn script_with_narration(narration: &str) -> String {
    format!("🎙️ **VOICE-OVER SCRIPT:**\n{narration}\n\n📺 **TITLE OPTIONS:**\n1. X\n\n🔑 **KEYWORDS:**\ncat")
}

#[tokio::test]
async fn test_write_formats_prompt_with_budget_and_duration() {
    let text = MockText::replying(&[SCRIPT_EN]);
    let writer = ScriptWriter::new(text.clone());

    let bundle = writer
        .write(&AnalysisText::new(ANALYSIS_EN), &ninety_seconds(), Language::En)
        .await
        .unwrap();

    assert!(bundle.has_all_sections(Language::En));
    let requests = text.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.user.contains("1500"));
    assert!(request.user.contains("1:30"));
    assert!(request.user.contains("A dog runs across a beach."));
    assert!(request.system.is_some());
    assert_eq!(request.temperature, SCRIPT_TEMPERATURE);
    assert_eq!(request.max_tokens, 2000);
}

#[tokio::test]
async fn test_write_does_not_correct_by_default() {
    let text = MockText::replying(&[&script_with_narration("Too short.")]);
    let writer = ScriptWriter::new(text.clone());

    writer
        .write(&AnalysisText::new(ANALYSIS_EN), &ninety_seconds(), Language::En)
        .await
        .unwrap();

    assert_eq!(text.requests().len(), 1);
}

#[tokio::test]
async fn test_post_check_corrects_within_bound() {
    let fixed = "x".repeat(800);
    let text = MockText::replying(&[&script_with_narration("Too short."), &fixed]);
    let writer = ScriptWriter::new(text.clone()).with_length_policy(LengthPolicy {
        min: 700,
        max: 900,
        max_corrections: 2,
    });

    let bundle = writer
        .write(&AnalysisText::new(ANALYSIS_EN), &ninety_seconds(), Language::En)
        .await
        .unwrap();

    let requests = text.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].system.is_none());
    assert_eq!(requests[1].temperature, CORRECTION_TEMPERATURE);
    assert!(requests[1].user.contains("Too short."));
    assert_eq!(bundle.narration(Language::En), Some(fixed));
    assert!(bundle.as_str().contains("📺 **TITLE OPTIONS:**"));
}

#[tokio::test]
async fn test_post_check_stops_at_bound() {
    let text = MockText::replying(&[
        &script_with_narration("One."),
        "Two.",
        "Three.",
        "Four.",
    ]);
    let writer = ScriptWriter::new(text.clone()).with_length_policy(LengthPolicy {
        min: 700,
        max: 900,
        max_corrections: 2,
    });

    let bundle = writer
        .write(&AnalysisText::new(ANALYSIS_EN), &ninety_seconds(), Language::En)
        .await
        .unwrap();

    assert_eq!(text.requests().len(), 3);
    assert_eq!(bundle.narration(Language::En).as_deref(), Some("Three."));
}

#[tokio::test]
async fn test_correct_length_returns_original_on_failure() {
    let text = MockText::with_results(vec![Err(ProviderError::Request("boom".into()))]);
    let writer = ScriptWriter::new(text);

    let out = writer
        .correct_length("keep me", 7, (700, 900), Language::Ru)
        .await;

    assert_eq!(out, "keep me");
}

#[tokio::test]
async fn test_correct_length_asks_to_shorten() {
    let text = MockText::replying(&["shorter"]);
    let writer = ScriptWriter::new(text.clone());

    let out = writer
        .correct_length(&"y".repeat(1200), 1200, (700, 900), Language::En)
        .await;

    assert_eq!(out, "shorter");
    assert!(text.requests()[0].user.contains("Shorten"));
}

#[tokio::test]
async fn test_write_provider_failure() {
    let text = MockText::with_results(vec![Err(ProviderError::QuotaExceeded(
        "insufficient_quota".into(),
    ))]);
    let writer = ScriptWriter::new(text);

    let err = writer
        .write(&AnalysisText::new(ANALYSIS_EN), &ninety_seconds(), Language::Es)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProviderFailure);
    assert!(err.is_quota_exceeded());
}

#[tokio::test]
async fn test_write_blank_response_is_provider_failure() {
    for reply in ["", "  \n\t"] {
        let text = MockText::replying(&[reply]);
        let writer = ScriptWriter::new(text.clone()).with_length_policy(LengthPolicy {
            min: 700,
            max: 900,
            max_corrections: 2,
        });

        let err = writer
            .write(&AnalysisText::new(ANALYSIS_EN), &ninety_seconds(), Language::En)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ProviderFailure);
        assert!(matches!(
            err,
            NarraiError::Provider {
                source: ProviderError::EmptyResponse,
                ..
            }
        ));
        assert_eq!(text.requests().len(), 1);
    }
}
