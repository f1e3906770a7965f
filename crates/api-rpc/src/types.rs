//! RPC Request/Response Types
//!
//! Endpoint payloads that already exist in core (`JobMarketQuery`,
//! `SkillsAssessmentRequest`, `CareerRoadmapRequest`, `CareerSearchRequest`,
//! `ChatRequest`) are used as parameters directly.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use trendline_core::application::constants::BASE_LANGUAGE;
use trendline_core::application::SchedulerStatus;
use trendline_core::port::TrendStats;

/// Parameters of methods that take none; accepts absent, `null`, `{}` or `[]`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParams;

impl<'de> Deserialize<'de> for NoParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(NoParams)
    }
}

/// trends.market.v1
#[derive(Debug, Default, Deserialize)]
pub struct MarketTrendsRequest {
    #[serde(default)]
    pub industries: Option<Vec<String>>,
}

/// skills.data.v1
#[derive(Debug, Default, Deserialize)]
pub struct SkillsDataRequest {
    #[serde(default, alias = "skillName")]
    pub skill_name: Option<String>,
}

/// careers.get.v1, careers.refresh.v1, careers.market.v1
#[derive(Debug, Deserialize)]
pub struct CareerIdRequest {
    #[serde(alias = "careerId")]
    pub career_id: String,
}

fn base_language() -> String {
    BASE_LANGUAGE.to_string()
}

/// trends.career.v1
#[derive(Debug, Deserialize)]
pub struct CareerTrendRequest {
    #[serde(alias = "careerId")]
    pub career_id: String,
    #[serde(default = "base_language")]
    pub language: String,
}

/// careers.update.v1
#[derive(Debug, Deserialize)]
pub struct UpdateCareerRequest {
    #[serde(alias = "careerId")]
    pub career_id: String,
    #[serde(default)]
    pub updates: Map<String, Value>,
}

/// admin.stats.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub trends: TrendStats,
    pub scheduler: SchedulerStatus,
    pub cache_enabled: bool,
    pub generation_tokens_available: u32,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_params_accepts_anything() {
        for raw in ["null", "{}", "[]", r#"{"ignored": 1}"#] {
            assert!(serde_json::from_str::<NoParams>(raw).is_ok(), "{raw}");
        }
    }

    #[test]
    fn test_career_id_accepts_camel_case() {
        let req: CareerIdRequest = serde_json::from_str(r#"{"careerId": "swe"}"#).unwrap();
        assert_eq!(req.career_id, "swe");
    }

    #[test]
    fn test_trend_request_defaults_to_base_language() {
        let req: CareerTrendRequest = serde_json::from_str(r#"{"career_id": "rn"}"#).unwrap();
        assert_eq!(req.language, "en");
    }
}
