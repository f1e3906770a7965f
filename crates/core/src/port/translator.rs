// Translation Collaborator Port (Interface)

use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// language code -> (field name -> translated text)
pub type Translations = BTreeMap<String, BTreeMap<String, String>>;

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate every field into each target language
    async fn translate(
        &self,
        fields: &BTreeMap<String, String>,
        target_languages: &[String],
    ) -> Result<Translations>;
}

/// Returns the source text for every language.
/// Used when no translation backend is configured.
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(
        &self,
        fields: &BTreeMap<String, String>,
        target_languages: &[String],
    ) -> Result<Translations> {
        Ok(target_languages
            .iter()
            .map(|lang| (lang.clone(), fields.clone()))
            .collect())
    }
}

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Prefixes each text with "[lang] ", or fails every call
    pub struct MockTranslator {
        fail: bool,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockTranslator {
        pub fn new() -> Self {
            Self {
                fail: false,
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    impl Default for MockTranslator {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Translator for MockTranslator {
        async fn translate(
            &self,
            fields: &BTreeMap<String, String>,
            target_languages: &[String],
        ) -> Result<Translations> {
            *self.call_count.lock().unwrap() += 1;
            if self.fail {
                return Err(AppError::Internal("translation backend down".to_string()));
            }
            Ok(target_languages
                .iter()
                .map(|lang| {
                    let texts = fields
                        .iter()
                        .map(|(k, v)| (k.clone(), format!("[{}] {}", lang, v)))
                        .collect();
                    (lang.clone(), texts)
                })
                .collect())
        }
    }
}
