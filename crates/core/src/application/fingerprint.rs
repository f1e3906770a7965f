//! Request fingerprinting for the response cache.
//!
//! A fingerprint is `category:k1:v1:k2:v2...` with absent parameters dropped
//! and the rest sorted by key, so construction order never matters.
//!
//! Values are not escaped. A value containing `:` can collide with a
//! different parameter set; callers must not pass such values.

use std::collections::BTreeMap;
use std::fmt::Display;

const SEGMENT_DELIMITER: &str = ":";

/// Cache key builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    category: String,
    params: BTreeMap<String, String>,
}

impl Fingerprint {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter; `None` leaves the key unchanged
    pub fn param<V: Display>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.params.insert(key.into(), value.to_string());
        }
        self
    }

    pub fn key(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.params.len());
        parts.push(self.category.clone());
        parts.extend(
            self.params
                .iter()
                .map(|(k, v)| format!("{}{}{}", k, SEGMENT_DELIMITER, v)),
        );
        parts.join(SEGMENT_DELIMITER)
    }
}

/// Derive the cache key for `category` and an unordered parameter set
pub fn fingerprint<K, V, I>(category: &str, params: I) -> String
where
    K: Into<String>,
    V: Display,
    I: IntoIterator<Item = (K, Option<V>)>,
{
    params
        .into_iter()
        .fold(Fingerprint::new(category), |fp, (k, v)| fp.param(k, v))
        .key()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_independent() {
        let a = fingerprint("job_market", [("a", Some(1)), ("b", Some(2))]);
        let b = fingerprint("job_market", [("b", Some(2)), ("a", Some(1))]);
        assert_eq!(a, b);
        assert_eq!(a, "job_market:a:1:b:2");
    }

    #[test]
    fn test_null_param_same_as_absent() {
        let with_null = fingerprint(
            "skills_data",
            [("skill_name", Some("rust")), ("level", None)],
        );
        let without = fingerprint("skills_data", [("skill_name", Some("rust"))]);
        assert_eq!(with_null, without);
    }

    #[test]
    fn test_differing_values_differ() {
        let a = Fingerprint::new("career_data").param("career_id", Some("nurse"));
        let b = Fingerprint::new("career_data").param("career_id", Some("pilot"));
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_category_only() {
        let key = fingerprint::<&str, &str, _>("all_careers", []);
        assert_eq!(key, "all_careers");
    }
}
