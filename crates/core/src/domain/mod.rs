// Domain Layer - Pure business logic and entities

pub mod career;
pub mod chat;
pub mod error;
pub mod insight;
pub mod run;
pub mod salary;
pub mod trend;

// Re-exports
pub use career::{Career, CareerId, CareerLevel};
pub use chat::{ChatChoice, ChatCompletion, ChatMessage, ChatRequest, Usage};
pub use error::DomainError;
pub use insight::{
    AssessmentRecommendations, CareerDocument, CareerMarketData, CareerPathSuggestion,
    EmergingRole, IndustryInsight, JobListing, MarketTrends, Roadmap, SalaryBand,
    SkillDevelopment, SkillInsight, TrendingSkill,
};
pub use run::{RunId, RunStatus, UpdateRun};
pub use salary::{Currency, SalaryData, SalaryRange};
pub use trend::{
    month_key, DemandLevel, TrendAnalysis, TrendDirection, TrendRecord, TRANSLATABLE_FIELDS,
};
