//! Response Parser - pulls one JSON value out of free-form generated text.
//!
//! The first `{` (object) or `[` (array) marks the start of the payload.
//! Leading prose is skipped and only the first complete JSON value is
//! decoded, so trailing commentary after it is ignored.
//!
//! Two policies exist side by side:
//! - [`ParsePolicy::Fallback`]: a fixed, schema-valid default replaces
//!   anything that does not decode (commodity listing endpoints).
//! - [`ParsePolicy::Strict`]: failure is an [`AppError::GenerationParse`]
//!   carrying the raw text (personalised or catalog endpoints).

use crate::domain::{
    AssessmentRecommendations, CareerDocument, CareerMarketData, JobListing, MarketTrends,
    Roadmap, SkillInsight,
};
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Expected top-level JSON shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
}

impl Shape {
    fn delimiter(&self) -> char {
        match self {
            Shape::Object => '{',
            Shape::Array => '[',
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Shape::Object => value.is_object(),
            Shape::Array => value.is_array(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePolicy {
    Strict,
    Fallback,
}

pub struct ResponseParser;

impl ResponseParser {
    /// First JSON value of the expected shape, if the text contains one
    pub fn extract(text: &str, shape: Shape) -> Option<Value> {
        let start = text.find(shape.delimiter())?;
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) if shape.matches(&value) => Some(value),
            _ => None,
        }
    }

    /// Decode into `T` or fail with the raw text attached
    pub fn parse_strict<T: DeserializeOwned>(text: &str, shape: Shape, context: &str) -> Result<T> {
        let value = Self::extract(text, shape)
            .ok_or_else(|| AppError::generation_parse(context, text))?;
        serde_json::from_value(value).map_err(|e| {
            warn!(context = %context, error = %e, "Generated JSON does not match expected schema");
            AppError::generation_parse(context, text)
        })
    }

    /// Decode into `T`, substituting `fallback()` on any failure
    pub fn parse_or_else<T, F>(text: &str, shape: Shape, context: &str, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match Self::parse_strict(text, shape, context) {
            Ok(value) => value,
            Err(_) => {
                warn!(context = %context, "Unparseable generation, serving fallback payload");
                fallback()
            }
        }
    }
}

// Call sites

/// Fallback policy. Accepts a bare array or an object wrapping `jobs: [...]`.
pub fn parse_job_listings(text: &str, posted_date: &str) -> Vec<JobListing> {
    ResponseParser::parse_or_else(text, Shape::Array, "job listings", || {
        JobListing::fallback(posted_date)
    })
}

/// Fallback policy; an empty object counts as a failure
pub fn parse_market_trends(text: &str) -> MarketTrends {
    let trends =
        ResponseParser::parse_or_else(text, Shape::Object, "market trends", MarketTrends::fallback);
    if trends.is_empty() {
        MarketTrends::fallback()
    } else {
        trends
    }
}

/// Fallback policy
pub fn parse_skills(text: &str) -> Vec<SkillInsight> {
    ResponseParser::parse_or_else(text, Shape::Array, "skills data", SkillInsight::fallback)
}

/// Strict policy
pub fn parse_assessment(text: &str) -> Result<AssessmentRecommendations> {
    ResponseParser::parse_strict(text, Shape::Object, "assessment recommendations")
}

/// Strict policy
pub fn parse_careers(text: &str) -> Result<Vec<CareerDocument>> {
    ResponseParser::parse_strict(text, Shape::Array, "careers data")
}

/// Strict policy
pub fn parse_single_career(text: &str) -> Result<CareerDocument> {
    ResponseParser::parse_strict(text, Shape::Object, "career data")
}

/// Strict policy
pub fn parse_roadmap(text: &str) -> Result<Roadmap> {
    ResponseParser::parse_strict(text, Shape::Object, "roadmap data")
}

/// Strict policy
pub fn parse_market_data(text: &str) -> Result<CareerMarketData> {
    ResponseParser::parse_strict(text, Shape::Object, "market data")
}
