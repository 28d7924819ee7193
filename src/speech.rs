//! ElevenLabs text-to-speech client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{is_quota_message, ProviderError};
use crate::providers::{SpeechSynthesizer, VoiceSettings};

#[derive(Serialize)]
struct SpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl ElevenLabsClient {
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    async fn read_failure(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!(%status, body = %body, "ElevenLabs request failed");

        if status == StatusCode::TOO_MANY_REQUESTS || is_quota_message(&body) {
            ProviderError::QuotaExceeded(body)
        } else {
            ProviderError::Request(format!("HTTP {status}: {body}"))
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    fn name(&self) -> &'static str {
        "ElevenLabs"
    }

    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}/v1/text-to-speech/{voice_id}", self.api_base);
        info!(voice_id, chars = text.chars().count(), "Generating speech");

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&SpeechBody {
                text,
                model_id: &self.model,
                voice_settings: settings,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_failure(response).await);
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        info!(bytes = audio.len(), "Speech generated");
        Ok(audio.to_vec())
    }

    async fn check(&self) -> Result<(), ProviderError> {
        let response = self
            .http
            .get(format!("{}/v1/voices", self.api_base))
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::read_failure(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> ElevenLabsClient {
        ElevenLabsClient::new(
            "test-key",
            server.uri(),
            "eleven_multilingual_v2",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_synthesize_posts_voice_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice-1"))
            .and(header("xi-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "text": "Hello.",
                "model_id": "eleven_multilingual_v2",
                "voice_settings": {"stability": 0.4, "style": 1.0}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;

        let audio = client(&server)
            .synthesize("Hello.", "voice-1", &VoiceSettings::default())
            .await
            .unwrap();
        assert_eq!(audio, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_quota_error_detected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                r#"{"detail":{"status":"quota_exceeded","message":"You have 3 credits remaining"}}"#,
            ))
            .mount(&server)
            .await;

        let err = client(&server)
            .synthesize("Hello.", "voice-1", &VoiceSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn test_other_failures_are_request_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid voice"))
            .mount(&server)
            .await;

        let err = client(&server)
            .synthesize("Hello.", "voice-1", &VoiceSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Request(msg) if msg.contains("invalid voice")));
    }

    #[tokio::test]
    async fn test_check_lists_voices() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/voices"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"voices":[]}"#))
            .mount(&server)
            .await;

        assert!(client(&server).check().await.is_ok());
    }
}
