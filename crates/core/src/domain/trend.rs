// Trend Record Domain Model

use crate::domain::career::CareerId;
use crate::domain::error::{DomainError, Result};
use crate::domain::salary::SalaryData;
use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Upper bound of every 0-10 scaled metric
pub const SCORE_MAX: f64 = 10.0;

/// Score thresholds used to derive categorical fields
pub const HIGH_SCORE_THRESHOLD: f64 = 8.0;
pub const MEDIUM_SCORE_THRESHOLD: f64 = 6.0;

/// Free-text fields handed to the translation collaborator
pub const TRANSLATABLE_FIELDS: [&str; 4] = [
    "market_insights",
    "salary_trend",
    "industry_impact",
    "future_outlook",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Stable,
    Declining,
}

impl TrendDirection {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_SCORE_THRESHOLD {
            TrendDirection::Rising
        } else if score >= MEDIUM_SCORE_THRESHOLD {
            TrendDirection::Stable
        } else {
            TrendDirection::Declining
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rising" => Ok(TrendDirection::Rising),
            "stable" => Ok(TrendDirection::Stable),
            "declining" => Ok(TrendDirection::Declining),
            other => Err(DomainError::UnknownDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    High,
    Medium,
    Low,
}

impl DemandLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_SCORE_THRESHOLD {
            DemandLevel::High
        } else if score >= MEDIUM_SCORE_THRESHOLD {
            DemandLevel::Medium
        } else {
            DemandLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::High => "high",
            DemandLevel::Medium => "medium",
            DemandLevel::Low => "low",
        }
    }
}

impl fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemandLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(DemandLevel::High),
            "medium" => Ok(DemandLevel::Medium),
            "low" => Ok(DemandLevel::Low),
            other => Err(DomainError::UnknownDemand(other.to_string())),
        }
    }
}

/// Clamp onto the 0-10 scale; non-finite input collapses to 0
pub fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, SCORE_MAX)
    } else {
        0.0
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Metrics produced by an analyzer for one career
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub trend_score: f64,
    pub trend_direction: TrendDirection,
    pub demand_level: DemandLevel,
    pub growth_rate: f64,
    pub market_insights: String,
    pub key_skills_trending: Vec<String>,
    pub salary_trend: String,
    pub job_availability_score: f64,
    pub top_locations: Vec<String>,
    pub remote_work_trend: f64,
    pub industry_impact: String,
    pub automation_risk: f64,
    pub future_outlook: String,
    pub confidence_score: f64,
    pub currency_code: String,
    pub salary_data: SalaryData,
}

impl TrendAnalysis {
    /// Clamp every 0-10 metric and drop non-finite growth
    pub fn normalized(mut self) -> Self {
        self.trend_score = clamp_score(self.trend_score);
        self.job_availability_score = clamp_score(self.job_availability_score);
        self.remote_work_trend = clamp_score(self.remote_work_trend);
        self.automation_risk = clamp_score(self.automation_risk);
        self.confidence_score = clamp_score(self.confidence_score);
        if !self.growth_rate.is_finite() {
            self.growth_rate = 0.0;
        }
        self
    }

    pub fn translatable_fields(&self) -> BTreeMap<String, String> {
        TRANSLATABLE_FIELDS
            .iter()
            .map(|field| (field.to_string(), self.text_field(field).to_string()))
            .collect()
    }

    /// Copy of this analysis with translated text fields swapped in.
    /// Fields missing from `translated` keep their original text.
    pub fn with_translations(&self, translated: &BTreeMap<String, String>) -> Self {
        let mut out = self.clone();
        for (field, text) in translated {
            match field.as_str() {
                "market_insights" => out.market_insights = text.clone(),
                "salary_trend" => out.salary_trend = text.clone(),
                "industry_impact" => out.industry_impact = text.clone(),
                "future_outlook" => out.future_outlook = text.clone(),
                _ => {}
            }
        }
        out
    }

    fn text_field(&self, field: &str) -> &str {
        match field {
            "market_insights" => &self.market_insights,
            "salary_trend" => &self.salary_trend,
            "industry_impact" => &self.industry_impact,
            "future_outlook" => &self.future_outlook,
            _ => "",
        }
    }
}

/// One persisted trend row per career (upsert semantics)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub career_id: CareerId,
    #[serde(flatten)]
    pub analysis: TrendAnalysis,
    pub generated_at: i64,    // epoch ms
    pub next_update_due: i64, // epoch ms
}

impl TrendRecord {
    pub fn new(
        career_id: impl Into<String>,
        analysis: TrendAnalysis,
        generated_at: i64,
        refresh_period_ms: i64,
    ) -> Self {
        Self {
            career_id: career_id.into(),
            analysis: analysis.normalized(),
            generated_at,
            next_update_due: generated_at + refresh_period_ms,
        }
    }

    /// History partition key ("YYYY-MM") of this record
    pub fn month_year(&self) -> String {
        month_key(self.generated_at)
    }
}

/// "YYYY-MM" for an epoch-ms timestamp (UTC)
pub fn month_key(epoch_ms: i64) -> String {
    chrono::Utc
        .timestamp_millis_opt(epoch_ms)
        .single()
        .map(|dt| dt.format("%Y-%m").to_string())
        .unwrap_or_else(|| "1970-01".to_string())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::salary::SalaryData;

    pub fn analysis(score: f64) -> TrendAnalysis {
        TrendAnalysis {
            trend_score: score,
            trend_direction: TrendDirection::from_score(score),
            demand_level: DemandLevel::from_score(score),
            growth_rate: 12.0,
            market_insights: "Demand keeps growing.".to_string(),
            key_skills_trending: vec!["Python".to_string()],
            salary_trend: "Rising".to_string(),
            job_availability_score: 7.0,
            top_locations: vec!["Austin".to_string()],
            remote_work_trend: 6.0,
            industry_impact: "Automation".to_string(),
            automation_risk: 3.0,
            future_outlook: "Positive".to_string(),
            confidence_score: 8.0,
            currency_code: "USD".to_string(),
            salary_data: SalaryData::for_region(90_000.0, "north-america"),
        }
    }
}
