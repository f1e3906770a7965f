// Application Layer - Use Cases and Business Logic

pub mod analyzer;
pub mod cache;
pub mod constants;
pub mod fingerprint;
pub mod generator;
pub mod insights;
pub mod parser;
pub mod scheduler;

// Re-exports
pub use analyzer::{ProviderTrendAnalyzer, TrendAnalyzer, TrendSynthesizer};
pub use cache::ResponseCache;
pub use fingerprint::{fingerprint, Fingerprint};
pub use generator::{ContentGenerator, GenerationParams, Generated};
pub use insights::{
    CareerRoadmapRequest, CareerSearchRequest, InsightService, JobMarketQuery, SalaryFilter,
    SkillsAssessmentRequest,
};
pub use parser::{ParsePolicy, ResponseParser, Shape};
pub use scheduler::{
    shutdown_channel, SchedulerConfig, SchedulerHandle, SchedulerStatus, ShutdownSender,
    ShutdownToken, WorklistScheduler,
};
