// Completion Provider Port (Interface)

use crate::domain::{ChatCompletion, ChatRequest};
use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to the upstream generation provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("No provider credential configured")]
    NotConfigured,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider timed out after {0}s")]
    Timeout(u64),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// External chat-completion provider (OpenAI-compatible)
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, UpstreamError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

pub mod mocks {
    use super::*;
    use crate::domain::{ChatChoice, ChatMessage, Usage};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Answer with this content
        Content(String),
        /// Fail with this error
        Error(UpstreamError),
    }

    /// Scripted provider: replies are consumed in order, the last one repeats
    pub struct MockCompletionProvider {
        replies: Arc<Mutex<VecDeque<MockReply>>>,
        requests: Arc<Mutex<Vec<ChatRequest>>>,
    }

    impl MockCompletionProvider {
        pub fn new(replies: Vec<MockReply>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn replying(content: impl Into<String>) -> Self {
            Self::new(vec![MockReply::Content(content.into())])
        }

        pub fn failing(error: UpstreamError) -> Self {
            Self::new(vec![MockReply::Error(error)])
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn next_reply(&self) -> MockReply {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                replies
                    .front()
                    .cloned()
                    .unwrap_or(MockReply::Error(UpstreamError::NotConfigured))
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for MockCompletionProvider {
        async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, UpstreamError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.next_reply() {
                MockReply::Content(content) => Ok(ChatCompletion {
                    id: format!("mock-{}", self.call_count()),
                    object: "chat.completion".to_string(),
                    created: 0,
                    model: request.model.clone(),
                    choices: vec![ChatChoice {
                        index: 0,
                        message: ChatMessage::assistant(content),
                        finish_reason: Some("stop".to_string()),
                    }],
                    usage: Usage {
                        prompt_tokens: 10,
                        completion_tokens: 20,
                        total_tokens: 30,
                    },
                }),
                MockReply::Error(e) => Err(e),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }
}
