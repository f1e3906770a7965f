// Trend Analyzers - strategies producing a TrendAnalysis per career

mod provider;
mod synthesizer;

pub use provider::{trend_analysis_prompt, ProviderTrendAnalyzer};
pub use synthesizer::{profile_for, IndustryProfile, TrendSynthesizer};

use crate::domain::{Career, TrendAnalysis};
use crate::error::Result;
use async_trait::async_trait;

/// Source of trend metrics for one career.
///
/// The scheduler calls exactly one implementation per run, chosen at
/// composition time: the provider-backed analyzer, or the local synthesizer
/// when no provider is configured.
#[async_trait]
pub trait TrendAnalyzer: Send + Sync {
    async fn analyze(&self, career: &Career) -> Result<TrendAnalysis>;

    /// Strategy name for logs
    fn name(&self) -> &str;
}
