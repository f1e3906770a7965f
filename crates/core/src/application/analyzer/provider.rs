// Provider-backed trend analysis

use super::TrendAnalyzer;
use crate::application::generator::{ContentGenerator, GenerationParams};
use crate::application::parser::{ResponseParser, Shape};
use crate::domain::salary::DEFAULT_REGION;
use crate::domain::{
    Career, Currency, DemandLevel, SalaryData, TrendAnalysis, TrendDirection,
};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const ANALYST_SYSTEM_PROMPT: &str =
    "You are a career market analyst. Analyze career trends and provide structured data.";
const ANALYSIS_MODEL: &str = "gpt-4";
const ANALYSIS_TEMPERATURE: f32 = 0.3;
const ANALYSIS_MAX_TOKENS: u32 = 2000;

const DEFAULT_SCORE: f64 = 5.0;
const DEFAULT_BASE_SALARY: f64 = 75_000.0;

fn default_score() -> f64 {
    DEFAULT_SCORE
}

fn default_base_salary() -> f64 {
    DEFAULT_BASE_SALARY
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

#[derive(Debug, Deserialize)]
struct RawSalaryInfo {
    #[serde(default = "default_base_salary")]
    base_salary: f64,
    #[serde(default = "default_region")]
    region: String,
}

impl Default for RawSalaryInfo {
    fn default() -> Self {
        Self {
            base_salary: DEFAULT_BASE_SALARY,
            region: default_region(),
        }
    }
}

/// Analysis as the provider emits it; every field optional
#[derive(Debug, Deserialize)]
struct RawTrendAnalysis {
    #[serde(default = "default_score")]
    trend_score: f64,
    #[serde(default)]
    trend_direction: Option<String>,
    #[serde(default)]
    demand_level: Option<String>,
    #[serde(default)]
    growth_rate: f64,
    #[serde(default)]
    market_insights: String,
    #[serde(default)]
    key_skills_trending: Vec<String>,
    #[serde(default)]
    salary_trend: String,
    #[serde(default = "default_score")]
    job_availability_score: f64,
    #[serde(default)]
    top_locations: Vec<String>,
    #[serde(default = "default_score")]
    remote_work_trend: f64,
    #[serde(default)]
    industry_impact: String,
    #[serde(default = "default_score")]
    automation_risk: f64,
    #[serde(default)]
    future_outlook: String,
    #[serde(default = "default_score")]
    confidence_score: f64,
    #[serde(default)]
    salary_info: RawSalaryInfo,
}

impl RawTrendAnalysis {
    fn into_analysis(self) -> Result<TrendAnalysis> {
        let trend_direction = match self.trend_direction.as_deref() {
            Some(s) => s.parse::<TrendDirection>()?,
            None => TrendDirection::Stable,
        };
        let demand_level = match self.demand_level.as_deref() {
            Some(s) => s.parse::<DemandLevel>()?,
            None => DemandLevel::Medium,
        };
        let currency = Currency::for_region(&self.salary_info.region);

        Ok(TrendAnalysis {
            trend_score: self.trend_score,
            trend_direction,
            demand_level,
            growth_rate: self.growth_rate,
            market_insights: self.market_insights,
            key_skills_trending: self.key_skills_trending,
            salary_trend: self.salary_trend,
            job_availability_score: self.job_availability_score,
            top_locations: self.top_locations,
            remote_work_trend: self.remote_work_trend,
            industry_impact: self.industry_impact,
            automation_risk: self.automation_risk,
            future_outlook: self.future_outlook,
            confidence_score: self.confidence_score,
            currency_code: currency.code().to_string(),
            salary_data: SalaryData::new(self.salary_info.base_salary, currency),
        }
        .normalized())
    }
}

/// Prompt asking the provider for a structured trend analysis of `career`
pub fn trend_analysis_prompt(career: &Career) -> String {
    format!(
        r#"Analyze the current market trends for the career: {title}

Career Details:
- Title: {title}
- Industry: {industry}
- Level: {level}
- Skills: {skills}
- Description: {description}

Please provide a comprehensive trend analysis in the following JSON format:
{{
    "trend_score": 7.5,
    "trend_direction": "rising",
    "demand_level": "high",
    "growth_rate": 15.2,
    "market_insights": "Detailed analysis of current market conditions...",
    "key_skills_trending": ["Python", "Machine Learning", "Cloud Computing"],
    "salary_trend": "Salaries are increasing by 8-12% annually due to high demand",
    "job_availability_score": 8.2,
    "top_locations": ["San Francisco", "New York", "Seattle", "Austin"],
    "remote_work_trend": 7.8,
    "industry_impact": "AI and automation are driving demand for this role",
    "automation_risk": 3.2,
    "future_outlook": "Strong growth expected over next 2-3 years",
    "confidence_score": 8.5,
    "salary_info": {{
        "base_salary": 85000,
        "region": "north-america"
    }}
}}

Guidelines:
- trend_score: 0-10 scale (10 = very hot/trending)
- trend_direction: "rising", "stable", or "declining"
- demand_level: "high", "medium", or "low"
- growth_rate: percentage growth expected
- job_availability_score: 0-10 scale (10 = many jobs available)
- remote_work_trend: 0-10 scale (10 = very remote-friendly)
- automation_risk: 0-10 scale (10 = high risk of automation)
- confidence_score: 0-10 scale (10 = very confident in analysis)
- salary_info.base_salary: average salary in USD for this role
- salary_info.region: "north-america", "europe", "asia-pacific", "south-america", "africa", or "middle-east"

Provide current, accurate market data based on recent trends and job market analysis."#,
        title = career.title,
        industry = career.industry,
        level = career.level,
        skills = career.skills.join(", "),
        description = career.description,
    )
}

/// Asks the upstream provider, then strictly parses its answer
pub struct ProviderTrendAnalyzer {
    generator: Arc<ContentGenerator>,
    params: GenerationParams,
}

impl ProviderTrendAnalyzer {
    pub fn new(generator: Arc<ContentGenerator>) -> Self {
        Self {
            generator,
            params: GenerationParams {
                model: ANALYSIS_MODEL.to_string(),
                temperature: ANALYSIS_TEMPERATURE,
                max_tokens: ANALYSIS_MAX_TOKENS,
                system_prompt: Some(ANALYST_SYSTEM_PROMPT.to_string()),
            },
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.params.model = model.into();
        self
    }

    /// Decode one provider answer into a normalized analysis
    pub fn parse_analysis(text: &str, career_id: &str) -> Result<TrendAnalysis> {
        let raw: RawTrendAnalysis = ResponseParser::parse_strict(
            text,
            Shape::Object,
            &format!("trend analysis for {}", career_id),
        )?;
        raw.into_analysis().map_err(|e| match e {
            AppError::Domain(domain) => {
                AppError::generation_parse(format!("trend analysis for {} ({})", career_id, domain), text)
            }
            other => other,
        })
    }
}

#[async_trait]
impl TrendAnalyzer for ProviderTrendAnalyzer {
    async fn analyze(&self, career: &Career) -> Result<TrendAnalysis> {
        let prompt = trend_analysis_prompt(career);
        // Upstream failures are item failures here; canned text would never parse
        let content = self.generator.try_generate(&prompt, &self.params).await?;
        debug!(career_id = %career.id, chars = content.len(), "Received trend analysis");
        Self::parse_analysis(&content, &career.id)
    }

    fn name(&self) -> &str {
        "provider"
    }
}
