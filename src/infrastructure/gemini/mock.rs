//! Scripted generative model for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::errors::{HyperError, HyperResult};
use crate::domain::ports::{GenerativeModel, SamplingConfig};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Failure(String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }
}

/// Replies are consumed in order; once the script is exhausted the default
/// reply is returned for every further call.
pub struct MockGenerativeModel {
    script: Mutex<VecDeque<MockReply>>,
    default_reply: MockReply,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockGenerativeModel {
    pub fn new(default_reply: MockReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Always answer with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        Self::new(MockReply::text(text))
    }

    /// Always fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockReply::failure(message))
    }

    /// Answer with `replies` in order, then fail.
    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let mock = Self::failing("mock script exhausted");
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            ..mock
        }
    }

    /// Sleep before every reply.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl GenerativeModel for MockGenerativeModel {
    async fn generate(&self, prompt: &str, _sampling: &SamplingConfig) -> HyperResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Failure(message) => Err(HyperError::ExternalCallFailure(message)),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
