use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
    ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, ImageUrlArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::providers::{TextGenerator, TextRequest, VisionProvider};

fn client(api_key: &str, api_base: Option<&str>) -> Client<OpenAIConfig> {
    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }
    Client::with_config(config)
}

async fn complete(
    client: &Client<OpenAIConfig>,
    request: CreateChatCompletionRequest,
    timeout: Duration,
) -> Result<String, ProviderError> {
    let response = tokio::time::timeout(timeout, client.chat().create(request))
        .await
        .map_err(|_| ProviderError::Timeout(timeout.as_secs()))??;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();
    if content.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(content)
}

async fn list_models(client: &Client<OpenAIConfig>, timeout: Duration) -> Result<(), ProviderError> {
    let models = tokio::time::timeout(timeout, client.models().list())
        .await
        .map_err(|_| ProviderError::Timeout(timeout.as_secs()))??;
    debug!(count = models.data.len(), "Listed models");
    Ok(())
}

/// Vision model reached through an OpenAI-compatible chat endpoint.
pub struct OpenAiVision {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiVision {
    pub fn new(api_key: &str, api_base: &str, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: client(api_key, Some(api_base)),
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl VisionProvider for OpenAiVision {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn describe(&self, instruction: &str, images: &[String]) -> Result<String, ProviderError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(
                        [
                            vec![ChatCompletionRequestUserMessageContentPart::Text(
                                ChatCompletionRequestMessageContentPartTextArgs::default()
                                    .text(instruction)
                                    .build()?,
                            )],
                            images
                                .iter()
                                .map(|image| -> Result<_, OpenAIError> {
                                    Ok(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                                        ChatCompletionRequestMessageContentPartImageArgs::default()
                                            .image_url(ImageUrlArgs::default().url(image).build()?)
                                            .build()?,
                                    ))
                                })
                                .collect::<Result<_, _>>()?,
                        ]
                        .concat(),
                    ))
                    .build()?,
            )])
            .build()?;

        info!(model = %self.model, frames = images.len(), "Requesting video description");
        complete(&self.client, request, self.timeout).await
    }

    async fn check(&self) -> Result<(), ProviderError> {
        list_models(&self.client, self.timeout).await
    }
}

/// Text generation through the OpenAI chat completions API.
pub struct OpenAiTextGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiTextGenerator {
    pub fn new(api_key: &str, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: client(api_key, None),
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    async fn generate(&self, request: &TextRequest) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system.as_str())
                    .build()?,
            ));
        }
        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user.as_str())
                .build()?,
        ));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .messages(messages)
            .build()?;

        info!(model = %self.model, "Requesting text generation");
        complete(&self.client, request, self.timeout).await
    }

    async fn check(&self) -> Result<(), ProviderError> {
        list_models(&self.client, self.timeout).await
    }
}
