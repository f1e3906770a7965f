//! Refresh cycle over a real SQLite database
//!
//! Scheduler + SqliteTrendStore + SqliteRunRepository wired the way the
//! daemon wires them, with a seeded synthesizer and a prefixing translator.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use trendline_core::application::{
    SchedulerConfig, TrendAnalyzer, TrendSynthesizer, WorklistScheduler,
};
use trendline_core::domain::{Career, CareerLevel, RunStatus, TrendAnalysis};
use trendline_core::error::{AppError, Result};
use trendline_core::port::id_provider::mocks::SequentialIdProvider;
use trendline_core::port::time_provider::mocks::MockTimeProvider;
use trendline_core::port::translator::mocks::MockTranslator;
use trendline_core::port::{CareerCatalog, RunRepository, TrendStore};
use trendline_infra_sqlite::{
    create_pool, run_migrations, SqliteCareerCatalog, SqliteRunRepository, SqliteTrendStore,
    StorageLayout,
};

// 2024-06-01T00:00:00Z
const T0: i64 = 1_717_200_000_000;
const DAY_MS: i64 = 86_400_000;

/// Synthesizer that fails for one career id
struct FlakyAnalyzer {
    inner: TrendSynthesizer,
    failing_id: String,
}

#[async_trait]
impl TrendAnalyzer for FlakyAnalyzer {
    async fn analyze(&self, career: &Career) -> Result<TrendAnalysis> {
        if career.id == self.failing_id {
            return Err(AppError::generation_parse("trend analysis", "not json"));
        }
        self.inner.analyze(career).await
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

struct Harness {
    pool: sqlx::SqlitePool,
    clock: Arc<MockTimeProvider>,
    store: Arc<SqliteTrendStore>,
    runs: Arc<SqliteRunRepository>,
    translator: Arc<MockTranslator>,
    scheduler: Arc<WorklistScheduler>,
}

async fn harness(layout: StorageLayout, analyzer: Arc<dyn TrendAnalyzer>) -> Harness {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    let clock = Arc::new(MockTimeProvider::new(T0));

    let catalog = SqliteCareerCatalog::new(pool.clone(), clock.clone());
    for career in [
        Career::new("data-scientist", "Data Scientist", "tech", CareerLevel::Advanced)
            .with_skills(["Python", "SQL"]),
        Career::new("swe", "Software Engineer", "tech", CareerLevel::Intermediate)
            .with_skills(["Rust", "SQL"]),
        Career::new("nurse", "Registered Nurse", "healthcare", CareerLevel::Entry),
    ] {
        catalog.upsert(&career).await.unwrap();
    }

    let store = Arc::new(
        SqliteTrendStore::with_layout(pool.clone(), clock.clone(), layout, "en").unwrap(),
    );
    let runs = Arc::new(SqliteRunRepository::new(pool.clone()));
    let translator = Arc::new(MockTranslator::new());
    let scheduler = Arc::new(WorklistScheduler::new(
        SchedulerConfig {
            item_delay: Duration::ZERO,
            idle_interval: Duration::from_secs(3600),
            languages: vec!["en".to_string(), "de".to_string()],
            ..SchedulerConfig::default()
        },
        store.clone(),
        runs.clone(),
        analyzer,
        translator.clone(),
        clock.clone(),
        Arc::new(SequentialIdProvider::new("run")),
    ));

    Harness {
        pool,
        clock,
        store,
        runs,
        translator,
        scheduler,
    }
}

#[tokio::test]
async fn test_full_pass_persists_trends_runs_and_rollups() {
    let h = harness(StorageLayout::Single, Arc::new(TrendSynthesizer::with_seed(11))).await;

    let run = h.scheduler.force_run().await.unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.month_year, "2024-06");
    assert_eq!(run.total_items, 3);
    assert_eq!(run.success_count, 3);
    assert_eq!(h.translator.call_count(), 3);

    // Run log is durable
    let logged = h.runs.latest().await.unwrap().unwrap();
    assert_eq!(logged, run);

    // Trend record is due again one refresh period later
    let record = h.store.find_trend(&"swe".to_string()).await.unwrap().unwrap();
    assert_eq!(record.generated_at, T0);
    assert_eq!(record.next_update_due, T0 + 30 * DAY_MS);

    let localized = h
        .store
        .find_localized(&"swe".to_string(), "de")
        .await
        .unwrap()
        .unwrap();
    assert!(localized.analysis.market_insights.starts_with("[de] "));
    assert_eq!(localized.analysis.trend_score, record.analysis.trend_score);

    let industries: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM industry_trends WHERE month_year = '2024-06'")
            .fetch_one(&h.pool)
            .await
            .unwrap();
    assert_eq!(industries, 2);

    let stats = h.store.stats(h.scheduler.due_cutoff()).await.unwrap();
    assert_eq!(stats.total_careers, 3);
    assert_eq!(stats.tracked_trends, 3);
    assert_eq!(stats.due_careers, 0);
}

#[tokio::test]
async fn test_second_pass_is_empty_until_period_elapses() {
    let h = harness(StorageLayout::Single, Arc::new(TrendSynthesizer::with_seed(5))).await;

    h.scheduler.force_run().await.unwrap();

    h.clock.advance(DAY_MS);
    let idle = h.scheduler.force_run().await.unwrap();
    assert_eq!(idle.total_items, 0);
    assert_eq!(idle.status, RunStatus::Completed);

    h.clock.advance(30 * DAY_MS);
    let again = h.scheduler.force_run().await.unwrap();
    assert_eq!(again.total_items, 3);

    let history: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM career_trend_history")
        .fetch_one(&h.pool)
        .await
        .unwrap();
    assert_eq!(history, 6);
}

#[tokio::test]
async fn test_item_failure_is_isolated() {
    let analyzer = Arc::new(FlakyAnalyzer {
        inner: TrendSynthesizer::with_seed(2),
        failing_id: "nurse".to_string(),
    });
    let h = harness(StorageLayout::Single, analyzer).await;

    let run = h.scheduler.force_run().await.unwrap();
    assert_eq!(run.status, RunStatus::CompletedWithErrors);
    assert_eq!(run.processed_items, 3);
    assert_eq!(run.success_count, 2);
    assert_eq!(run.failure_count, 1);
    assert!(run.errors[0].starts_with("nurse:"));

    // The failed career stays in the worklist
    let due = h
        .store
        .due_careers(h.scheduler.due_cutoff(), 100)
        .await
        .unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, "nurse");
}

#[tokio::test]
async fn test_partitioned_layout_writes_language_tables() {
    let h = harness(
        StorageLayout::Partitioned,
        Arc::new(TrendSynthesizer::with_seed(9)),
    )
    .await;

    h.scheduler.force_run().await.unwrap();

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM career_trends_de")
        .fetch_one(&h.pool)
        .await
        .unwrap();
    assert_eq!(rows, 3);

    let localized = h
        .store
        .find_localized(&"data-scientist".to_string(), "de")
        .await
        .unwrap()
        .unwrap();
    assert!(localized.analysis.future_outlook.starts_with("[de] "));
}

#[tokio::test]
async fn test_background_loop_runs_then_stops() {
    let h = harness(StorageLayout::Single, Arc::new(TrendSynthesizer::with_seed(4))).await;

    let handle = h.scheduler.clone().start();

    let mut finished = false;
    for _ in 0..100 {
        if h.scheduler.status().last_run.is_some() {
            finished = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(finished, "first pass did not finish");

    // Idle sleep is interrupted by shutdown
    tokio::time::timeout(Duration::from_secs(5), handle.stop())
        .await
        .expect("scheduler did not stop")
        .unwrap();
    assert!(!h.scheduler.is_running());

    let logged = h.runs.latest().await.unwrap().unwrap();
    assert_eq!(logged.status, RunStatus::Completed);
}
