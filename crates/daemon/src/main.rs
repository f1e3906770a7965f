//! Trendline Daemon - Main Entry Point
//! Monthly career-trend refresh worker + JSON-RPC insight server

mod config;
mod seed;
mod telemetry;

use anyhow::{Context, Result};
use config::{AnalyzerMode, Settings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use trendline_api_rpc::{RateLimiter, RpcHandler, RpcServer, RpcServerConfig};
use trendline_core::application::constants::BASE_LANGUAGE;
use trendline_core::application::{
    ContentGenerator, InsightService, ProviderTrendAnalyzer, ResponseCache, TrendAnalyzer,
    TrendSynthesizer, WorklistScheduler,
};
use trendline_core::port::id_provider::UuidProvider;
use trendline_core::port::time_provider::SystemTimeProvider;
use trendline_core::port::translator::PassthroughTranslator;
use trendline_core::port::{CacheBackend, CompletionProvider, TimeProvider, Translator};
use trendline_infra_llm::{CompletionTranslator, OpenAiConfig, OpenAiProvider};
use trendline_infra_redis::RedisCacheBackend;
use trendline_infra_sqlite::{
    create_pool, run_migrations, SqliteCareerCatalog, SqliteRunRepository, SqliteTrendStore,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filesystem location of a SQLite URL, `None` for in-memory databases
fn database_file(url: &str) -> Option<PathBuf> {
    if url.contains(":memory:") || url.contains("mode=memory") {
        return None;
    }
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);
    (!path.is_empty()).then(|| PathBuf::from(path))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
    }
    Ok(())
}

/// Redis is optional: an unreachable server disables the cache
async fn connect_cache(redis_url: Option<&str>) -> ResponseCache {
    let Some(url) = redis_url else {
        info!("No redis_url configured, response cache disabled");
        return ResponseCache::disabled();
    };

    match RedisCacheBackend::connect(url).await {
        Ok(backend) => {
            let backend: Arc<dyn CacheBackend> = Arc::new(backend);
            ResponseCache::new(backend)
        }
        Err(e) => {
            warn!(error = %e, "Redis unavailable, continuing without response cache");
            ResponseCache::disabled()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let settings = Settings::load()?;
    let _telemetry = telemetry::init(settings.log_format, settings.log_dir.as_deref())?;

    info!("Trendline daemon v{} starting...", VERSION);

    // 2. Database
    let database_url = settings.database_url();
    if let Some(path) = database_file(&database_url) {
        ensure_parent_dir(&path)?;
    }
    info!(database_url = %database_url, "Initializing database...");

    let pool = create_pool(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);

    // 3. Catalog seed
    if let Some(seed_path) = &settings.seed_path {
        let catalog = SqliteCareerCatalog::new(pool.clone(), time_provider.clone());
        let seed_path = PathBuf::from(shellexpand::tilde(seed_path).into_owned());
        seed::seed_catalog(&catalog, &seed_path).await?;
    }

    // 4. Response cache
    let cache = Arc::new(connect_cache(settings.redis_url.as_deref()).await);

    // 5. Generation collaborators
    let provider: Option<Arc<dyn CompletionProvider>> = match &settings.llm.api_key {
        Some(key) => {
            let config = OpenAiConfig::new(key.clone())
                .with_base_url(settings.llm.base_url.clone())
                .with_timeout_secs(settings.llm.timeout_secs);
            let provider = OpenAiProvider::new(config)
                .map_err(|e| anyhow::anyhow!("Completion provider setup failed: {}", e))?;
            Some(Arc::new(provider))
        }
        None => {
            warn!("No completion API key configured, insight endpoints serve fallback content");
            None
        }
    };
    let generator = Arc::new(ContentGenerator::new(provider.clone(), time_provider.clone()));

    let (analyzer, translator): (Arc<dyn TrendAnalyzer>, Arc<dyn Translator>) =
        match (settings.effective_mode(), provider) {
            (AnalyzerMode::Provider, Some(provider)) => (
                Arc::new(
                    ProviderTrendAnalyzer::new(generator.clone())
                        .with_model(settings.llm.analysis_model.clone()),
                ),
                Arc::new(CompletionTranslator::new(provider)),
            ),
            _ => {
                info!("Trend analysis runs in synthetic mode");
                (Arc::new(TrendSynthesizer::new()), Arc::new(PassthroughTranslator))
            }
        };

    // 6. Refresh scheduler
    let trend_store = Arc::new(
        SqliteTrendStore::with_layout(
            pool.clone(),
            time_provider.clone(),
            settings.storage_layout()?,
            BASE_LANGUAGE,
        )
        .map_err(|e| anyhow::anyhow!("Trend store setup failed: {}", e))?,
    );
    let run_repo = Arc::new(SqliteRunRepository::new(pool.clone()));

    let scheduler = Arc::new(WorklistScheduler::new(
        settings.scheduler_config(),
        trend_store.clone(),
        run_repo,
        analyzer,
        translator,
        time_provider.clone(),
        Arc::new(UuidProvider),
    ));

    let scheduler_handle = if settings.scheduler.enabled {
        info!(
            batch_size = settings.scheduler.batch_size,
            refresh_period_days = settings.scheduler.refresh_period_days,
            "Starting refresh scheduler..."
        );
        Some(scheduler.clone().start())
    } else {
        info!("Refresh scheduler disabled; runs only via admin.force_run.v1");
        None
    };

    // 7. JSON-RPC server
    info!("Starting JSON-RPC server...");
    let insights = Arc::new(InsightService::new(generator, cache, time_provider));
    let handler = Arc::new(RpcHandler::new(
        insights,
        scheduler.clone(),
        trend_store,
        RateLimiter::new(
            settings.rpc.rate_limit_burst,
            settings.rpc.rate_limit_per_sec,
        ),
    ));
    let rpc_server = RpcServer::new(
        RpcServerConfig {
            host: settings.rpc.host.clone(),
            port: settings.rpc.port,
        },
        handler,
    );
    let running = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %running.local_addr, "System ready");
    info!("Press Ctrl+C to shutdown");

    // 8. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    if let Err(e) = running.handle.stop() {
        warn!(error = %e, "RPC server already stopped");
    }

    // Forced runs outlive their RPC request, so both paths wait here
    let shutdown_timeout = settings.shutdown_timeout();
    info!(timeout_secs = shutdown_timeout.as_secs(), "Waiting for the refresh pass to stop...");
    let stopped = match scheduler_handle {
        Some(handle) => tokio::time::timeout(shutdown_timeout, handle.stop()).await,
        None => tokio::time::timeout(shutdown_timeout, scheduler.shutdown()).await,
    };
    match stopped {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Scheduler stopped with error"),
        Err(_) => warn!("Scheduler did not stop within the shutdown timeout"),
    }

    info!("Shutdown complete.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_file() {
        assert_eq!(database_file("sqlite::memory:"), None);
        assert_eq!(database_file("sqlite://file:x?mode=memory"), None);
        assert_eq!(
            database_file("sqlite:///var/lib/trendline/db.sqlite?mode=rwc"),
            Some(PathBuf::from("/var/lib/trendline/db.sqlite"))
        );
        assert_eq!(
            database_file("/home/u/.trendline/trendline.db"),
            Some(PathBuf::from("/home/u/.trendline/trendline.db"))
        );
    }

    #[tokio::test]
    async fn test_cache_disabled_without_redis() {
        assert!(!connect_cache(None).await.is_enabled());
    }
}
