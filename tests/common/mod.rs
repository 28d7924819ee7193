#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{Rgb, RgbImage};

use narrai::capture::Frame;
use narrai::providers::{
    SpeechSynthesizer, TextGenerator, TextRequest, VisionProvider, VoiceSettings,
};
use narrai::session::MemorySessionStore;
use narrai::{Pipeline, ProviderError, Settings};

pub const ANALYSIS_EN: &str = "🎬 **VIDEO ANALYSIS**

📋 **GENERAL DESCRIPTION:**
A dog runs across a beach.

⏰ **TIMELINE BREAKDOWN:**
0:00-0:05 The dog waits.
0:05-0:10 The dog runs.

🎯 **KEY MOMENTS:**
The jump into the waves.

📝 **CONCLUSION:**
A joyful clip.";

pub const SCRIPT_EN: &str = "🎙️ **VOICE-OVER SCRIPT:**
[soft music]
The dog waits by the shore.
Then it runs into the waves!

📺 **TITLE OPTIONS:**
1. Beach Day
2. Run Free

🔑 **KEYWORDS:**
dog, beach, waves";

pub fn frames(count: usize) -> Vec<Frame> {
    (0..count)
        .map(|i| {
            let image = RgbImage::from_pixel(16, 9, Rgb([i as u8 * 20, 100, 200]));
            Frame::new(i as u64 * 150, i as f64 * 5.0, image)
        })
        .collect()
}

#[derive(Default)]
pub struct MockVision {
    pub reply: Mutex<Option<Result<String, ProviderError>>>,
    pub calls: Mutex<Vec<(String, usize)>>,
}

impl MockVision {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(Ok(text.to_string()))),
            ..Default::default()
        })
    }

    pub fn failing(err: ProviderError) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(Err(err))),
            ..Default::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VisionProvider for MockVision {
    fn name(&self) -> &'static str {
        "MockVision"
    }

    async fn describe(&self, instruction: &str, images: &[String]) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((instruction.to_string(), images.len()));
        self.reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }
}

/// Replies in order; an exhausted queue answers with an empty response error.
#[derive(Default)]
pub struct MockText {
    pub replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    pub requests: Mutex<Vec<TextRequest>>,
}

impl MockText {
    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            ..Default::default()
        })
    }

    pub fn with_results(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<TextRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockText {
    fn name(&self) -> &'static str {
        "MockText"
    }

    async fn generate(&self, request: &TextRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }
}

pub struct MockSpeech {
    pub audio: Result<Vec<u8>, String>,
    pub calls: Mutex<Vec<(String, String, VoiceSettings)>>,
}

impl MockSpeech {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            audio: Ok(b"ID3fake-mp3".to_vec()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            audio: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String, VoiceSettings)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    fn name(&self) -> &'static str {
        "MockSpeech"
    }

    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice_id.to_string(), *settings));
        match &self.audio {
            Ok(bytes) => Ok(bytes.clone()),
            Err(message) => Err(ProviderError::QuotaExceeded(message.clone())),
        }
    }

    async fn check(&self) -> Result<(), ProviderError> {
        match &self.audio {
            Ok(_) => Ok(()),
            Err(message) => Err(ProviderError::Request(message.clone())),
        }
    }
}

pub fn pipeline(
    settings: Settings,
    vision: Arc<MockVision>,
    text: Arc<MockText>,
    speech: Arc<MockSpeech>,
) -> Pipeline {
    Pipeline::new(
        settings,
        Arc::new(MemorySessionStore::default()),
        vision,
        text,
        speech,
    )
}
