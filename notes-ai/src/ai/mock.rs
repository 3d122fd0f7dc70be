use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Error, GenerationBackend, Result};

#[derive(Clone)]
enum Reply {
    Text(String),
    Fail(u16, String),
    MissingApiKey,
}

/// Deterministic backend that records every prompt it receives.
#[derive(Clone)]
pub struct MockBackend {
    reply: Reply,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_response("<p>Mock response</p>")
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            reply: Reply::Text(response.into()),
            prompts: Arc::default(),
        }
    }

    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self {
            reply: Reply::Fail(status, message.into()),
            prompts: Arc::default(),
        }
    }

    pub fn without_api_key() -> Self {
        Self {
            reply: Reply::MissingApiKey,
            prompts: Arc::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if let Reply::MissingApiKey = self.reply {
            return Err(Error::MissingApiKey);
        }

        self.prompts.lock().unwrap().push(prompt.to_string());

        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(status, message) => Err(Error::Status {
                status: *status,
                message: message.clone(),
            }),
            Reply::MissingApiKey => Err(Error::MissingApiKey),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
