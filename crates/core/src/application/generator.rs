// Content Generator - provider call with deterministic fallback
//
// `generate` and `forward` never fail: a missing credential or any upstream
// error yields canned content instead.

use crate::domain::chat::{DEFAULT_CHAT_MODEL, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::domain::{ChatChoice, ChatCompletion, ChatMessage, ChatRequest, Usage};
use crate::port::{CompletionProvider, TimeProvider, UpstreamError};
use std::sync::Arc;
use tracing::{debug, warn};

const FALLBACK_JOB_SAMPLE: &str = "Here are some sample job openings:

1. **Software Engineer** at TechCorp
   - Location: Remote
   - Salary: $80,000 - $120,000
   - Skills: JavaScript, React, Node.js
   - Experience: Mid Level

2. **Data Scientist** at Analytics Inc
   - Location: Remote
   - Salary: $90,000 - $140,000
   - Skills: Python, Machine Learning, SQL
   - Experience: Mid Level

*Note: This is fallback data. For real-time information, please check job boards.*";

const FALLBACK_GENERIC: &str =
    "I'm currently using fallback mode. Please try again later for real-time data.";

/// Model parameters for a single generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Optional system message sent ahead of the prompt
    pub system_prompt: Option<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: None,
        }
    }
}

impl GenerationParams {
    pub fn to_request(&self, prompt: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(prompt));
        ChatRequest::new(self.model.clone(), messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

/// Generator output tagged with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    /// Canned content served because the provider was missing or failed
    pub fallback: bool,
}

impl<T> Generated<T> {
    fn provider(value: T) -> Self {
        Self {
            value,
            fallback: false,
        }
    }

    fn fallback(value: T) -> Self {
        Self {
            value,
            fallback: true,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Generated<U> {
        Generated {
            value: f(self.value),
            fallback: self.fallback,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Generated<U>, E> {
        Ok(Generated {
            value: f(self.value)?,
            fallback: self.fallback,
        })
    }
}

/// Canned text chosen by a keyword match on the prompt
pub fn fallback_content(prompt: &str) -> String {
    let lower = prompt.to_lowercase();
    if lower.contains("job") || lower.contains("position") {
        FALLBACK_JOB_SAMPLE.to_string()
    } else {
        FALLBACK_GENERIC.to_string()
    }
}

/// Chat-completion-shaped fallback: one assistant choice, zero usage
pub fn fallback_completion(request: &ChatRequest, now_millis: i64) -> ChatCompletion {
    ChatCompletion {
        id: format!("fallback-{}", now_millis),
        object: "chat.completion".to_string(),
        created: now_millis / 1000,
        model: request.model.clone(),
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage::assistant(fallback_content(&request.joined_content())),
            finish_reason: Some("stop".to_string()),
        }],
        usage: Usage::default(),
    }
}

pub struct ContentGenerator {
    provider: Option<Arc<dyn CompletionProvider>>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ContentGenerator {
    pub fn new(
        provider: Option<Arc<dyn CompletionProvider>>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            provider,
            time_provider,
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Provider call without the fallback; callers decide what a failure means
    pub async fn try_generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, UpstreamError> {
        let provider = self.provider.as_ref().ok_or(UpstreamError::NotConfigured)?;
        let completion = provider.complete(&params.to_request(prompt)).await?;
        completion
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| UpstreamError::InvalidResponse("response has no choices".to_string()))
    }

    /// Generated text, or the keyword-selected fallback
    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> Generated<String> {
        match self.try_generate(prompt, params).await {
            Ok(content) => Generated::provider(content),
            Err(UpstreamError::NotConfigured) => {
                debug!("No completion provider configured, serving fallback content");
                Generated::fallback(fallback_content(prompt))
            }
            Err(e) => {
                warn!(error = %e, model = %params.model, "Generation failed, serving fallback content");
                Generated::fallback(fallback_content(prompt))
            }
        }
    }

    /// Pass a chat request through, keeping the completion shape in fallback mode
    pub async fn forward(&self, request: &ChatRequest) -> Generated<ChatCompletion> {
        if let Some(provider) = &self.provider {
            match provider.complete(request).await {
                Ok(completion) => return Generated::provider(completion),
                Err(e) => {
                    warn!(
                        error = %e,
                        provider = provider.name(),
                        "Forwarded completion failed, serving fallback response"
                    );
                }
            }
        }
        Generated::fallback(fallback_completion(request, self.time_provider.now_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::completion::mocks::{MockCompletionProvider, MockReply};
    use crate::port::time_provider::mocks::MockTimeProvider;

    fn generator(provider: Option<Arc<dyn CompletionProvider>>) -> ContentGenerator {
        ContentGenerator::new(provider, Arc::new(MockTimeProvider::new(1_700_000_000_000)))
    }

    #[tokio::test]
    async fn test_no_provider_never_fails() {
        let gen = generator(None);
        for prompt in ["", "List open job positions", "roadmap", "\u{0}\u{ffff}", "POSITION"] {
            let text = gen.generate(prompt, &GenerationParams::default()).await;
            assert!(text.fallback);
            assert!(!text.value.is_empty());
        }
    }

    #[tokio::test]
    async fn test_fallback_keyword_selection() {
        assert!(fallback_content("Find a Job in Texas").contains("Software Engineer"));
        assert!(fallback_content("open positions").contains("Data Scientist"));
        assert_eq!(fallback_content("salary outlook"), FALLBACK_GENERIC);
    }

    #[tokio::test]
    async fn test_upstream_error_uses_fallback() {
        let provider = Arc::new(MockCompletionProvider::failing(UpstreamError::Status {
            status: 503,
            body: "overloaded".to_string(),
        }));
        let gen = generator(Some(provider.clone()));

        let text = gen.generate("market trends", &GenerationParams::default()).await;
        assert!(text.fallback);
        assert_eq!(text.value, FALLBACK_GENERIC);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_content_and_params_are_used() {
        let provider = Arc::new(MockCompletionProvider::replying("{\"ok\":true}"));
        let gen = generator(Some(provider.clone()));
        let params = GenerationParams {
            model: "gpt-4".to_string(),
            temperature: 0.3,
            max_tokens: 500,
            system_prompt: Some("You are an analyst.".to_string()),
        };

        let text = gen.generate("analyze", &params).await;
        assert!(!text.fallback);
        assert_eq!(text.value, "{\"ok\":true}");

        let sent = &provider.requests()[0];
        assert_eq!(sent.model, "gpt-4");
        assert_eq!(sent.messages.len(), 2);
        assert_eq!(sent.messages[0].role, "system");
        assert_eq!(sent.max_tokens, 500);
    }

    #[tokio::test]
    async fn test_forward_fallback_shape() {
        let provider = Arc::new(MockCompletionProvider::new(vec![MockReply::Error(
            UpstreamError::Timeout(60),
        )]));
        let gen = generator(Some(provider));
        let request = ChatRequest::new("gpt-4o", vec![ChatMessage::user("any hiring news?")]);

        let response = gen.forward(&request).await;
        assert!(response.fallback);
        let response = response.value;
        assert_eq!(response.id, "fallback-1700000000000");
        assert_eq!(response.object, "chat.completion");
        assert_eq!(response.model, "gpt-4o");
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.role, "assistant");
        assert_eq!(response.usage, Usage::default());
    }

    #[tokio::test]
    async fn test_forward_passes_provider_response_through() {
        let provider = Arc::new(MockCompletionProvider::replying("hello"));
        let gen = generator(Some(provider));
        let request = ChatRequest::new("gpt-4o", vec![ChatMessage::user("hi")]);

        let response = gen.forward(&request).await;
        assert!(!response.fallback);
        let response = response.value;
        assert_eq!(response.first_content(), Some("hello"));
        assert_eq!(response.usage.total_tokens, 30);
    }
}
