// Trendline Infrastructure - LLM Adapter
// Implements: CompletionProvider (OpenAI-compatible HTTP), Translator (completion-backed)

mod openai;
mod translator;

pub use openai::{OpenAiConfig, OpenAiProvider, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use translator::{language_name, CompletionTranslator};
