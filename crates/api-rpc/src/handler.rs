//! RPC Method Handlers
//!
//! Thin mapping from JSON-RPC methods onto `InsightService` and the scheduler.

use crate::error::{throttled, to_rpc_error};
use crate::rate_limiter::RateLimiter;
use crate::types::{
    CareerIdRequest, CareerTrendRequest, MarketTrendsRequest, NoParams, SkillsDataRequest,
    StatsResponse, UpdateCareerRequest,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use trendline_core::application::{
    CareerRoadmapRequest, CareerSearchRequest, InsightService, JobMarketQuery,
    SkillsAssessmentRequest, WorklistScheduler,
};
use trendline_core::domain::{
    AssessmentRecommendations, CareerDocument, CareerMarketData, ChatCompletion, ChatRequest,
    JobListing, MarketTrends, Roadmap, SkillInsight, TrendRecord, UpdateRun,
};
use trendline_core::error::AppError;
use trendline_core::port::TrendStore;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    insights: Arc<InsightService>,
    scheduler: Arc<WorklistScheduler>,
    trend_store: Arc<dyn TrendStore>,
    rate_limiter: RateLimiter,
    start_time: Instant,
}

impl RpcHandler {
    pub fn new(
        insights: Arc<InsightService>,
        scheduler: Arc<WorklistScheduler>,
        trend_store: Arc<dyn TrendStore>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            insights,
            scheduler,
            trend_store,
            rate_limiter,
            start_time: Instant::now(),
        }
    }

    /// Generation-backed methods spend a token before touching the service
    fn throttle(&self, method: &str) -> RpcResult<()> {
        if self.rate_limiter.try_acquire() {
            Ok(())
        } else {
            debug!(method, "Request throttled");
            Err(throttled())
        }
    }

    /// jobs.market.v1
    pub async fn job_market(&self, query: JobMarketQuery) -> RpcResult<Vec<JobListing>> {
        self.throttle("jobs.market.v1")?;
        self.insights.job_market(&query).await.map_err(to_rpc_error)
    }

    /// trends.market.v1
    pub async fn market_trends(&self, req: MarketTrendsRequest) -> RpcResult<MarketTrends> {
        self.throttle("trends.market.v1")?;
        self.insights
            .market_trends(req.industries.as_deref())
            .await
            .map_err(to_rpc_error)
    }

    /// skills.data.v1
    pub async fn skills_data(&self, req: SkillsDataRequest) -> RpcResult<Vec<SkillInsight>> {
        self.throttle("skills.data.v1")?;
        self.insights
            .skills_data(req.skill_name.as_deref())
            .await
            .map_err(to_rpc_error)
    }

    /// skills.assessment.v1
    pub async fn skills_assessment(
        &self,
        req: SkillsAssessmentRequest,
    ) -> RpcResult<AssessmentRecommendations> {
        self.throttle("skills.assessment.v1")?;
        self.insights
            .skills_assessment(&req)
            .await
            .map_err(to_rpc_error)
    }

    /// careers.list.v1
    pub async fn all_careers(&self, _req: NoParams) -> RpcResult<Vec<CareerDocument>> {
        self.throttle("careers.list.v1")?;
        self.insights.all_careers().await.map_err(to_rpc_error)
    }

    /// careers.get.v1
    pub async fn career(&self, req: CareerIdRequest) -> RpcResult<CareerDocument> {
        self.throttle("careers.get.v1")?;
        self.insights
            .career(&req.career_id)
            .await
            .map_err(to_rpc_error)
    }

    /// careers.update.v1
    pub async fn update_career(&self, req: UpdateCareerRequest) -> RpcResult<CareerDocument> {
        self.throttle("careers.update.v1")?;
        self.insights
            .update_career(&req.career_id, &req.updates)
            .await
            .map_err(to_rpc_error)
    }

    /// careers.refresh.v1
    pub async fn refresh_career(&self, req: CareerIdRequest) -> RpcResult<CareerDocument> {
        self.throttle("careers.refresh.v1")?;
        self.insights
            .refresh_career(&req.career_id)
            .await
            .map_err(to_rpc_error)
    }

    /// careers.roadmap.v1
    pub async fn career_roadmap(&self, req: CareerRoadmapRequest) -> RpcResult<Roadmap> {
        self.throttle("careers.roadmap.v1")?;
        self.insights
            .career_roadmap(&req)
            .await
            .map_err(to_rpc_error)
    }

    /// careers.market.v1
    pub async fn career_market(&self, req: CareerIdRequest) -> RpcResult<CareerMarketData> {
        self.throttle("careers.market.v1")?;
        self.insights
            .career_market(&req.career_id)
            .await
            .map_err(to_rpc_error)
    }

    /// careers.search.v1
    pub async fn search_careers(&self, req: CareerSearchRequest) -> RpcResult<Vec<CareerDocument>> {
        self.throttle("careers.search.v1")?;
        self.insights
            .search_careers(&req)
            .await
            .map_err(to_rpc_error)
    }

    /// chat.completions.v1
    pub async fn chat_completions(&self, req: ChatRequest) -> RpcResult<ChatCompletion> {
        self.throttle("chat.completions.v1")?;
        Ok(self.insights.chat_completions(&req).await)
    }

    /// trends.career.v1
    ///
    /// Stored monthly analysis; reads the trend store only, so not throttled.
    pub async fn career_trend(&self, req: CareerTrendRequest) -> RpcResult<TrendRecord> {
        let career_id = req.career_id.trim().to_string();
        if career_id.is_empty() {
            return Err(to_rpc_error(AppError::Validation(
                "career_id must not be empty".to_string(),
            )));
        }
        self.trend_store
            .find_localized(&career_id, &req.language)
            .await
            .map_err(to_rpc_error)?
            .ok_or_else(|| {
                to_rpc_error(AppError::NotFound(format!(
                    "No trend analysis stored for career '{}'",
                    career_id
                )))
            })
    }

    /// admin.force_run.v1
    pub async fn force_run(&self, _req: NoParams) -> RpcResult<UpdateRun> {
        self.throttle("admin.force_run.v1")?;
        info!("Manual refresh run requested");
        self.scheduler.force_run().await.map_err(to_rpc_error)
    }

    /// admin.stats.v1
    pub async fn stats(&self, _req: NoParams) -> RpcResult<StatsResponse> {
        let trends = self
            .trend_store
            .stats(self.scheduler.due_cutoff())
            .await
            .map_err(to_rpc_error)?;

        Ok(StatsResponse {
            trends,
            scheduler: self.scheduler.status(),
            cache_enabled: self.insights.cache().is_enabled(),
            generation_tokens_available: self.rate_limiter.available(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        })
    }
}
