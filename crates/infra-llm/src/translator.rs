// Completion-backed Translator
//
// One completion call per (language, field). A field whose call fails keeps
// its source text; the whole batch only errors when no call succeeded.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use trendline_core::domain::{ChatMessage, ChatRequest};
use trendline_core::error::{AppError, Result};
use trendline_core::port::{CompletionProvider, Translations, Translator, UpstreamError};

const TRANSLATION_MODEL: &str = "gpt-3.5-turbo";
const TRANSLATION_TEMPERATURE: f32 = 0.3;
const TRANSLATION_MAX_TOKENS: u32 = 500;
const TRANSLATOR_ROLE: &str =
    "You are a professional translator specializing in business and market analysis terminology.";

const LANGUAGE_NAMES: [(&str, &str); 11] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ru", "Russian"),
    ("ar", "Arabic"),
];

pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

fn translation_prompt(text: &str, language: &str) -> String {
    format!(
        "Translate the following text from English to {language}.
Maintain professional terminology and ensure the translation is accurate for the career/job market context.
Return only the translated text, no explanations or additional text.

Text to translate: {text}"
    )
}

/// Providers like to wrap short answers in quotes
fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed)
}

pub struct CompletionTranslator {
    provider: Arc<dyn CompletionProvider>,
    model: String,
}

impl CompletionTranslator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            model: TRANSLATION_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn translate_text(
        &self,
        text: &str,
        language: &str,
    ) -> std::result::Result<String, UpstreamError> {
        let request = ChatRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::system(TRANSLATOR_ROLE),
                ChatMessage::user(translation_prompt(text, language)),
            ],
        )
        .with_temperature(TRANSLATION_TEMPERATURE)
        .with_max_tokens(TRANSLATION_MAX_TOKENS);

        let completion = self.provider.complete(&request).await?;
        let content = completion
            .first_content()
            .map(strip_quotes)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| UpstreamError::InvalidResponse("Empty translation".to_string()))?;
        Ok(content.to_string())
    }
}

#[async_trait]
impl Translator for CompletionTranslator {
    async fn translate(
        &self,
        fields: &BTreeMap<String, String>,
        target_languages: &[String],
    ) -> Result<Translations> {
        let mut translations = Translations::new();
        let mut attempted = 0usize;
        let mut succeeded = 0usize;
        let mut last_error: Option<UpstreamError> = None;

        for code in target_languages {
            let Some(language) = language_name(code) else {
                warn!(language = %code, "Unsupported translation language, skipping");
                continue;
            };

            let mut translated = BTreeMap::new();
            for (field, text) in fields {
                if code == "en" || text.trim().is_empty() {
                    translated.insert(field.clone(), text.clone());
                    continue;
                }

                attempted += 1;
                match self.translate_text(text, language).await {
                    Ok(t) => {
                        succeeded += 1;
                        translated.insert(field.clone(), t);
                    }
                    Err(e) => {
                        warn!(language = %code, field = %field, error = %e, "Translation failed, keeping source text");
                        translated.insert(field.clone(), text.clone());
                        last_error = Some(e);
                    }
                }
            }
            translations.insert(code.clone(), translated);
        }

        if attempted > 0 && succeeded == 0 {
            if let Some(err) = last_error {
                return Err(AppError::Upstream(err));
            }
        }

        debug!(languages = translations.len(), "Translation batch complete");
        Ok(translations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendline_core::port::completion::mocks::{MockCompletionProvider, MockReply};

    fn fields() -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("future_outlook".to_string(), "Bright".to_string());
        fields.insert("salary_trend".to_string(), "Rising".to_string());
        fields
    }

    #[tokio::test]
    async fn test_translates_each_field_per_language() {
        let provider = Arc::new(MockCompletionProvider::replying("\"Prometedor\""));
        let translator = CompletionTranslator::new(provider.clone());

        let result = translator
            .translate(&fields(), &["es".to_string(), "en".to_string()])
            .await
            .unwrap();

        assert_eq!(result["es"]["future_outlook"], "Prometedor");
        assert_eq!(result["en"], fields());
        // English is passed through without calls
        assert_eq!(provider.call_count(), 2);

        let request = &provider.requests()[0];
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.max_tokens, 500);
        assert!(request.messages[1].content.contains("to Spanish"));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_source_text() {
        let provider = Arc::new(MockCompletionProvider::new(vec![
            MockReply::Content("Vielversprechend".to_string()),
            MockReply::Error(UpstreamError::Timeout(60)),
        ]));
        let translator = CompletionTranslator::new(provider);

        let result = translator
            .translate(&fields(), &["de".to_string()])
            .await
            .unwrap();
        assert_eq!(result["de"]["future_outlook"], "Vielversprechend");
        assert_eq!(result["de"]["salary_trend"], "Rising");
    }

    #[tokio::test]
    async fn test_total_failure_is_error() {
        let provider = Arc::new(MockCompletionProvider::failing(UpstreamError::NotConfigured));
        let translator = CompletionTranslator::new(provider);

        let err = translator
            .translate(&fields(), &["ja".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(UpstreamError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_unsupported_language_skipped() {
        let provider = Arc::new(MockCompletionProvider::replying("x"));
        let translator = CompletionTranslator::new(provider.clone());

        let result = translator
            .translate(&fields(), &["xx".to_string()])
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("  \"Hola\" "), "Hola");
        assert_eq!(strip_quotes("Hola"), "Hola");
        assert_eq!(strip_quotes("\""), "\"");
    }
}
