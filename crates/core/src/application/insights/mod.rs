//! Insight Service - cache-backed generation endpoints.
//!
//! Every endpoint follows the same path: fingerprint the request, read the
//! response cache, generate on a miss, parse under the endpoint's policy,
//! write back with the endpoint's TTL.
//!
//! Listing endpoints (`job_market`, `market_trends`, `skills_data`) use the
//! fallback policy and only fail on invalid input. Personalised and catalog
//! endpoints are strict: an unparseable generation is an
//! [`AppError::GenerationParse`] and nothing is cached.

mod chat;
mod prompts;

pub use chat::{extract_industry, extract_location, is_job_market_request};

use crate::application::cache::ResponseCache;
use crate::application::constants::{
    FALLBACK_CACHE_TTL, MARKET_DATA_CACHE_TTL, ROADMAP_CACHE_TTL, SEARCH_CACHE_TTL,
};
use crate::application::fingerprint::Fingerprint;
use crate::application::generator::{ContentGenerator, GenerationParams, Generated};
use crate::application::parser;
use crate::domain::{
    AssessmentRecommendations, CareerDocument, CareerMarketData, ChatCompletion, ChatRequest,
    JobListing, MarketTrends, Roadmap, SkillInsight,
};
use crate::error::{AppError, Result};
use crate::port::TimeProvider;
use chrono::TimeZone;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

fn default_industry() -> String {
    "technology".to_string()
}

fn default_location() -> String {
    "United States".to_string()
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMarketQuery {
    #[serde(default = "default_industry")]
    pub industry: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for JobMarketQuery {
    fn default() -> Self {
        Self {
            industry: default_industry(),
            location: default_location(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsAssessmentRequest {
    pub skills: Vec<String>,
    pub experience_level: String,
    #[serde(default)]
    pub current_role: String,
    #[serde(default)]
    pub experience_details: String,
    pub selected_career_goal: String,
    #[serde(default)]
    pub goals_details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerRoadmapRequest {
    pub career_id: String,
    pub current_level: String,
    pub target_level: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryFilter {
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerSearchRequest {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub salary: Option<SalaryFilter>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CareerSearchRequest {
    pub fn salary_min(&self) -> Option<i64> {
        self.salary.and_then(|s| s.min)
    }

    pub fn salary_max(&self) -> Option<i64> {
        self.salary.and_then(|s| s.max)
    }
}

/// Fingerprint values are joined with ':' unescaped, so reject it up front
fn key_part<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    if value.contains(':') {
        return Err(AppError::Validation(format!(
            "{} must not contain ':'",
            field
        )));
    }
    Ok(value)
}

fn career_key(career_id: &str) -> Result<&str> {
    let id = career_id.trim();
    if id.is_empty() {
        return Err(AppError::Validation("career_id must not be empty".to_string()));
    }
    key_part("career_id", id)
}

pub struct InsightService {
    generator: Arc<ContentGenerator>,
    cache: Arc<ResponseCache>,
    time_provider: Arc<dyn TimeProvider>,
    params: GenerationParams,
}

impl InsightService {
    pub fn new(
        generator: Arc<ContentGenerator>,
        cache: Arc<ResponseCache>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            generator,
            cache,
            time_provider,
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Cache hit, or `produce` then write-through. `produce` is only polled on a miss.
    async fn cached<T, F>(&self, key: &str, ttl: Option<Duration>, produce: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<Generated<T>>>,
    {
        if let Some(hit) = self.cache.get::<T>(key).await {
            return Ok(hit);
        }
        let generated = produce.await?;
        self.store(key, &generated, ttl).await;
        Ok(generated.value)
    }

    /// Fallback content is kept only briefly so a recovered provider is used again
    async fn store<T: Serialize>(
        &self,
        key: &str,
        generated: &Generated<T>,
        ttl: Option<Duration>,
    ) {
        let ttl = if generated.fallback {
            Some(FALLBACK_CACHE_TTL)
        } else {
            ttl
        };
        self.cache.set(key, &generated.value, ttl).await;
    }

    async fn generate(&self, prompt: &str) -> Generated<String> {
        self.generator.generate(prompt, &self.params).await
    }

    fn now_iso(&self) -> String {
        chrono::Utc
            .timestamp_millis_opt(self.time_provider.now_millis())
            .single()
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default()
    }

    pub async fn job_market(&self, query: &JobMarketQuery) -> Result<Vec<JobListing>> {
        let key = Fingerprint::new("job_market")
            .param("industry", Some(key_part("industry", &query.industry)?))
            .param("location", Some(key_part("location", &query.location)?))
            .key();
        self.cached(&key, None, async {
            let text = self.generate(&prompts::job_market(query)).await;
            Ok(text.map(|t| parser::parse_job_listings(&t, &self.now_iso())))
        })
        .await
    }

    pub async fn market_trends(&self, industries: Option<&[String]>) -> Result<MarketTrends> {
        let scope = match industries {
            Some(list) if !list.is_empty() => list.join(","),
            _ => "all".to_string(),
        };
        let key = Fingerprint::new("market_trends")
            .param("industries", Some(key_part("industries", &scope)?))
            .key();
        self.cached(&key, None, async {
            let text = self.generate(&prompts::market_trends()).await;
            Ok(text.map(|t| parser::parse_market_trends(&t)))
        })
        .await
    }

    pub async fn skills_data(&self, skill_name: Option<&str>) -> Result<Vec<SkillInsight>> {
        let skill_name = skill_name.map(|s| key_part("skill_name", s)).transpose()?;
        let key = Fingerprint::new("skills_data")
            .param("skill_name", skill_name)
            .key();
        self.cached(&key, None, async {
            let text = self.generate(&prompts::skills_data(skill_name)).await;
            Ok(text.map(|t| parser::parse_skills(&t)))
        })
        .await
    }

    pub async fn skills_assessment(
        &self,
        req: &SkillsAssessmentRequest,
    ) -> Result<AssessmentRecommendations> {
        let mut skills = req.skills.clone();
        skills.sort();
        let skills = skills.join(",");
        let key = Fingerprint::new("skills_assessment")
            .param("skills", Some(key_part("skills", &skills)?))
            .param(
                "experience",
                Some(key_part("experience_level", &req.experience_level)?),
            )
            .param("goal", Some(key_part("selected_career_goal", &req.selected_career_goal)?))
            .key();
        self.cached(&key, None, async {
            let text = self.generate(&prompts::skills_assessment(req)).await;
            text.try_map(|t| parser::parse_assessment(&t))
        })
        .await
    }

    pub async fn all_careers(&self) -> Result<Vec<CareerDocument>> {
        let key = Fingerprint::new("all_careers").key();
        self.cached(&key, Some(MARKET_DATA_CACHE_TTL), async {
            let text = self.generate(&prompts::all_careers()).await;
            text.try_map(|t| parser::parse_careers(&t))
        })
        .await
    }

    fn career_data_key(career_id: &str) -> String {
        Fingerprint::new("career_data")
            .param("career_id", Some(career_id))
            .key()
    }

    pub async fn career(&self, career_id: &str) -> Result<CareerDocument> {
        let id = career_key(career_id)?;
        self.cached(&Self::career_data_key(id), Some(MARKET_DATA_CACHE_TTL), async {
            let text = self.generate(&prompts::career(id)).await;
            text.try_map(|t| parser::parse_single_career(&t))
        })
        .await
    }

    /// Regenerate a career with caller-supplied changes; replaces the cached document
    pub async fn update_career(
        &self,
        career_id: &str,
        updates: &Map<String, Value>,
    ) -> Result<CareerDocument> {
        let id = career_key(career_id)?;
        if updates.is_empty() {
            return Err(AppError::Validation("No updates provided".to_string()));
        }
        let text = self.generate(&prompts::update_career(id, updates)).await;
        let career = text.try_map(|t| parser::parse_single_career(&t))?;
        self.store(&Self::career_data_key(id), &career, Some(MARKET_DATA_CACHE_TTL))
            .await;
        info!(career_id = %id, fields = updates.len(), "Career document updated");
        Ok(career.value)
    }

    /// Regenerate a career ignoring any cached copy
    pub async fn refresh_career(&self, career_id: &str) -> Result<CareerDocument> {
        let id = career_key(career_id)?;
        let text = self.generate(&prompts::refresh_career(id)).await;
        let career = text.try_map(|t| parser::parse_single_career(&t))?;
        self.store(&Self::career_data_key(id), &career, Some(MARKET_DATA_CACHE_TTL))
            .await;
        debug!(career_id = %id, "Career document refreshed");
        Ok(career.value)
    }

    pub async fn career_roadmap(&self, req: &CareerRoadmapRequest) -> Result<Roadmap> {
        let id = career_key(&req.career_id)?;
        let key = Fingerprint::new("career_roadmap")
            .param("career_id", Some(id))
            .param("current_level", Some(key_part("current_level", &req.current_level)?))
            .param("target_level", Some(key_part("target_level", &req.target_level)?))
            .key();
        self.cached(&key, Some(ROADMAP_CACHE_TTL), async {
            let text = self.generate(&prompts::career_roadmap(req)).await;
            text.try_map(|t| parser::parse_roadmap(&t))
        })
        .await
    }

    pub async fn career_market(&self, career_id: &str) -> Result<CareerMarketData> {
        let id = career_key(career_id)?;
        let key = Fingerprint::new("career_market")
            .param("career_id", Some(id))
            .key();
        self.cached(&key, Some(MARKET_DATA_CACHE_TTL), async {
            let text = self.generate(&prompts::career_market(id)).await;
            text.try_map(|t| parser::parse_market_data(&t))
        })
        .await
    }

    pub async fn search_careers(&self, req: &CareerSearchRequest) -> Result<Vec<CareerDocument>> {
        let skills = req.skills.join(",");
        let key = Fingerprint::new("career_search")
            .param("skills", Some(key_part("skills", &skills)?))
            .param("salary_min", req.salary_min())
            .param("salary_max", req.salary_max())
            .param(
                "level",
                req.level.as_deref().map(|l| key_part("level", l)).transpose()?,
            )
            .param(
                "category",
                req.category
                    .as_deref()
                    .map(|c| key_part("category", c))
                    .transpose()?,
            )
            .key();
        self.cached(&key, Some(SEARCH_CACHE_TTL), async {
            let text = self.generate(&prompts::search_careers(req)).await;
            text.try_map(|t| parser::parse_careers(&t))
        })
        .await
    }

    /// Forward a chat request. Job-market conversations are cached under
    /// their own `job_market_chat` namespace. Never fails.
    pub async fn chat_completions(&self, request: &ChatRequest) -> ChatCompletion {
        if !is_job_market_request(request) {
            return self.generator.forward(request).await.value;
        }

        let key = Fingerprint::new("job_market_chat")
            .param("industry", extract_industry(request))
            .param("location", Some(extract_location(request)))
            .key();
        if let Some(hit) = self.cache.get::<ChatCompletion>(&key).await {
            return hit;
        }
        let response = self.generator.forward(request).await;
        self.store(&key, &response, None).await;
        response.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::constants::DEFAULT_CACHE_TTL;
    use crate::domain::ChatMessage;
    use crate::port::cache_backend::mocks::InMemoryCacheBackend;
    use crate::port::completion::mocks::{MockCompletionProvider, MockReply};
    use crate::port::time_provider::mocks::MockTimeProvider;
    use crate::port::{CompletionProvider, UpstreamError};

    struct Fixture {
        clock: Arc<MockTimeProvider>,
        backend: Arc<InMemoryCacheBackend>,
        provider: Option<Arc<MockCompletionProvider>>,
        service: InsightService,
    }

    fn fixture(reply: Option<&str>) -> Fixture {
        let clock = Arc::new(MockTimeProvider::new(1_700_000_000_000));
        let backend = Arc::new(InMemoryCacheBackend::new(clock.clone()));
        let provider = reply.map(|r| Arc::new(MockCompletionProvider::replying(r)));
        let generator = Arc::new(ContentGenerator::new(
            provider
                .clone()
                .map(|p| p as Arc<dyn CompletionProvider>),
            clock.clone(),
        ));
        let cache = Arc::new(ResponseCache::new(backend.clone()));
        let service = InsightService::new(generator, cache, clock.clone());
        Fixture {
            clock,
            backend,
            provider,
            service,
        }
    }

    fn calls(f: &Fixture) -> usize {
        f.provider.as_ref().map(|p| p.call_count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_job_market_generates_once_then_hits_cache() {
        let f = fixture(Some(r#"[{"title": "Nurse", "company": "Mercy"}]"#));
        let query = JobMarketQuery {
            industry: "healthcare".to_string(),
            ..JobMarketQuery::default()
        };

        let first = f.service.job_market(&query).await.unwrap();
        let second = f.service.job_market(&query).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].title, "Nurse");
        assert_eq!(calls(&f), 1);
        assert!(f
            .backend
            .raw("job_market:industry:healthcare:location:United States")
            .is_some());
    }

    #[tokio::test]
    async fn test_job_market_without_provider_serves_fallback() {
        let f = fixture(None);
        let jobs = f.service.job_market(&JobMarketQuery::default()).await.unwrap();
        assert_eq!(jobs[0].id, "fallback-1");
        assert!(jobs[0].posted_date.starts_with("2023-11-14"));
    }

    #[tokio::test]
    async fn test_strict_endpoint_raises_and_caches_nothing() {
        let f = fixture(None);
        let err = f.service.career("nurse").await.unwrap_err();
        assert!(matches!(err, AppError::GenerationParse { .. }));
        assert_eq!(f.backend.set_count(), 0);
    }

    #[tokio::test]
    async fn test_market_trends_empty_object_uses_fallback() {
        let f = fixture(Some("{}"));
        let trends = f.service.market_trends(None).await.unwrap();
        assert_eq!(trends, MarketTrends::fallback());
        assert!(f.backend.raw("market_trends:industries:all").is_some());
    }

    #[tokio::test]
    async fn test_update_career_requires_changes_and_replaces_cache() {
        let f = fixture(Some(r#"{"id": "nurse", "title": "Registered Nurse"}"#));

        let err = f.service.update_career("nurse", &Map::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(calls(&f), 0);

        let mut updates = Map::new();
        updates.insert("salary".to_string(), Value::from("85000"));
        let updated = f.service.update_career("nurse", &updates).await.unwrap();
        assert_eq!(updated["title"], "Registered Nurse");

        let served = f.service.career("nurse").await.unwrap();
        assert_eq!(served, updated);
        assert_eq!(calls(&f), 1);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache_read() {
        let f = fixture(Some(r#"{"id": "pilot"}"#));
        f.service.career("pilot").await.unwrap();
        f.service.refresh_career("pilot").await.unwrap();
        assert_eq!(calls(&f), 2);
    }

    #[tokio::test]
    async fn test_assessment_key_ignores_skill_order() {
        let f = fixture(Some(r#"{"careerPaths": [{"title": "Data Engineer"}]}"#));
        let mut req = SkillsAssessmentRequest {
            skills: vec!["sql".to_string(), "python".to_string()],
            experience_level: "mid".to_string(),
            selected_career_goal: "data".to_string(),
            ..SkillsAssessmentRequest::default()
        };
        f.service.skills_assessment(&req).await.unwrap();
        req.skills.reverse();
        let recs = f.service.skills_assessment(&req).await.unwrap();

        assert_eq!(recs.career_paths[0].title, "Data Engineer");
        assert_eq!(calls(&f), 1);
    }

    #[tokio::test]
    async fn test_search_cache_expires_after_an_hour() {
        let f = fixture(Some(r#"[{"id": "nurse"}]"#));
        let req = CareerSearchRequest {
            skills: vec!["care".to_string()],
            salary: Some(SalaryFilter {
                min: Some(50_000),
                max: None,
            }),
            ..CareerSearchRequest::default()
        };

        f.service.search_careers(&req).await.unwrap();
        f.clock.advance(SEARCH_CACHE_TTL.as_millis() as i64);
        f.service.search_careers(&req).await.unwrap();
        assert_eq!(calls(&f), 1);

        f.clock.advance(1);
        f.service.search_careers(&req).await.unwrap();
        assert_eq!(calls(&f), 2);
    }

    #[tokio::test]
    async fn test_roadmap_cached_for_a_week() {
        let f = fixture(Some(
            r#"{"shortTerm": ["a"], "mediumTerm": ["b"], "longTerm": ["c"]}"#,
        ));
        let req = CareerRoadmapRequest {
            career_id: "nurse".to_string(),
            current_level: "E".to_string(),
            target_level: "A".to_string(),
            ..CareerRoadmapRequest::default()
        };
        f.service.career_roadmap(&req).await.unwrap();
        f.clock.advance(DEFAULT_CACHE_TTL.as_millis() as i64);
        f.service.career_roadmap(&req).await.unwrap();
        assert_eq!(calls(&f), 1);
    }

    #[tokio::test]
    async fn test_colon_in_identifier_rejected() {
        let f = fixture(Some("{}"));
        let err = f.service.career_market("a:b").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = f.service.career("  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_chat_job_market_is_cached() {
        let f = fixture(Some("Three openings in Austin."));
        let request = ChatRequest::new(
            "gpt-3.5-turbo",
            vec![ChatMessage::user("Any technology jobs in Texas?")],
        );

        let first = f.service.chat_completions(&request).await;
        let second = f.service.chat_completions(&request).await;
        assert_eq!(first, second);
        assert_eq!(calls(&f), 1);
        assert!(f
            .backend
            .raw("job_market_chat:industry:technology:location:texas")
            .is_some());
    }

    #[tokio::test]
    async fn test_chat_and_job_listings_do_not_share_entries() {
        let f = fixture(Some(r#"[{"title": "Rust Developer", "company": "Acme"}]"#));
        let request = ChatRequest::new(
            "gpt-3.5-turbo",
            vec![ChatMessage::user("Show me technology jobs")],
        );

        let jobs = f.service.job_market(&JobMarketQuery::default()).await.unwrap();
        f.service.chat_completions(&request).await;
        let again = f.service.job_market(&JobMarketQuery::default()).await.unwrap();

        assert_eq!(jobs, again);
        assert_eq!(calls(&f), 2);
        assert!(f
            .backend
            .raw("job_market:industry:technology:location:United States")
            .is_some());
        assert!(f
            .backend
            .raw("job_market_chat:industry:technology:location:United States")
            .is_some());
    }

    #[tokio::test]
    async fn test_fallback_is_cached_briefly() {
        let clock = Arc::new(MockTimeProvider::new(1_700_000_000_000));
        let provider = Arc::new(MockCompletionProvider::new(vec![
            MockReply::Error(UpstreamError::Timeout(60)),
            MockReply::Content(r#"[{"title": "Nurse", "company": "Mercy"}]"#.to_string()),
        ]));
        let generator = Arc::new(ContentGenerator::new(
            Some(provider.clone() as Arc<dyn CompletionProvider>),
            clock.clone(),
        ));
        let cache = Arc::new(ResponseCache::new(Arc::new(InMemoryCacheBackend::new(
            clock.clone(),
        ))));
        let service = InsightService::new(generator, cache, clock.clone());
        let query = JobMarketQuery::default();

        let outage = service.job_market(&query).await.unwrap();
        assert_eq!(outage[0].id, "fallback-1");
        clock.advance(FALLBACK_CACHE_TTL.as_millis() as i64);
        assert_eq!(service.job_market(&query).await.unwrap(), outage);
        assert_eq!(provider.call_count(), 1);

        clock.advance(1);
        let recovered = service.job_market(&query).await.unwrap();
        assert_eq!(recovered[0].title, "Nurse");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_chat_other_topics_are_not_cached() {
        let f = fixture(Some("Hello!"));
        let request = ChatRequest::new("gpt-3.5-turbo", vec![ChatMessage::user("hi there")]);
        f.service.chat_completions(&request).await;
        f.service.chat_completions(&request).await;
        assert_eq!(calls(&f), 2);
        assert_eq!(f.backend.set_count(), 0);
    }
}
