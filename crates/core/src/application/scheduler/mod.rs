// Worklist Scheduler - periodic trend refresh runs

mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::analyzer::TrendAnalyzer;
use crate::application::constants::*;
use crate::domain::{Career, TrendRecord, UpdateRun};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, RunRepository, TimeProvider, Translator, TrendStore};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub refresh_period: Duration,
    pub batch_size: u32,
    pub item_delay: Duration,
    pub idle_interval: Duration,
    pub error_backoff: Duration,
    /// Every language trend text is kept in, base language included
    pub languages: Vec<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_period: REFRESH_PERIOD,
            batch_size: DEFAULT_BATCH_SIZE,
            item_delay: ITEM_DELAY,
            idle_interval: IDLE_SLEEP_DURATION,
            error_backoff: ERROR_RECOVERY_SLEEP_DURATION,
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Running flag and last finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub analyzer: String,
    pub last_run: Option<UpdateRun>,
}

/// Clears the running flag when a run ends, however it ends
struct RunningGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Refreshes due careers one at a time and records each pass as an `UpdateRun`.
///
/// At most one run is in flight. The continuous loop and `force_run` share
/// the same running flag; a trigger that finds it set is rejected, not queued.
/// Both execute on tasks the scheduler owns and observe its shutdown signal,
/// so every started run is finalized even when the caller goes away.
pub struct WorklistScheduler {
    config: SchedulerConfig,
    trend_store: Arc<dyn TrendStore>,
    run_repo: Arc<dyn RunRepository>,
    analyzer: Arc<dyn TrendAnalyzer>,
    translator: Arc<dyn Translator>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
    running: Arc<AtomicBool>,
    last_run: Mutex<Option<UpdateRun>>,
    shutdown: ShutdownSender,
    shutdown_token: ShutdownToken,
    forced: Mutex<Option<JoinHandle<()>>>,
}

impl WorklistScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SchedulerConfig,
        trend_store: Arc<dyn TrendStore>,
        run_repo: Arc<dyn RunRepository>,
        analyzer: Arc<dyn TrendAnalyzer>,
        translator: Arc<dyn Translator>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        let (shutdown, shutdown_token) = shutdown_channel();
        Self {
            config,
            trend_store,
            run_repo,
            analyzer,
            translator,
            time_provider,
            id_provider,
            running: Arc::new(AtomicBool::new(false)),
            last_run: Mutex::new(None),
            shutdown,
            shutdown_token,
            forced: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.is_running(),
            analyzer: self.analyzer.name().to_string(),
            last_run: self.last_run.lock().ok().and_then(|g| g.clone()),
        }
    }

    /// Cutoff for the due-check: anything generated before it is stale
    pub fn due_cutoff(&self) -> i64 {
        self.time_provider.now_millis() - self.refresh_period_ms()
    }

    fn refresh_period_ms(&self) -> i64 {
        i64::try_from(self.config.refresh_period.as_millis()).unwrap_or(i64::MAX)
    }

    fn try_acquire(&self) -> Option<RunningGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RunningGuard {
                flag: Arc::clone(&self.running),
            })
    }

    /// Run immediately, bypassing the idle sleep.
    ///
    /// The pass executes on a spawned task; dropping the returned future only
    /// stops waiting for the result, the run still ends in a terminal status.
    pub async fn force_run(self: &Arc<Self>) -> Result<UpdateRun> {
        if self.shutdown_token.is_shutdown() {
            return Err(AppError::InvalidState(
                "scheduler is shutting down".to_string(),
            ));
        }
        let Some(guard) = self.try_acquire() else {
            warn!("Force run rejected: a trend update run is already in progress");
            return Err(AppError::Conflict(
                "trend update run already in progress".to_string(),
            ));
        };
        info!("Force run requested");

        let (tx, rx) = oneshot::channel();
        let scheduler = Arc::clone(self);
        let task = tokio::spawn(async move {
            let token = scheduler.shutdown_token.clone();
            let result = scheduler.execute_run(Some(&token)).await;
            drop(guard);
            let _ = tx.send(result);
        });
        if let Ok(mut forced) = self.forced.lock() {
            *forced = Some(task);
        }

        rx.await
            .map_err(|_| AppError::Internal("Forced run task ended without a result".to_string()))?
    }

    /// Signal shutdown and wait for a forced pass still in flight.
    /// The pass stops between items and is finalized before this returns.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown.shutdown();
        let task = self.forced.lock().ok().and_then(|mut f| f.take());
        if let Some(task) = task {
            task.await
                .map_err(|e| AppError::Internal(format!("Forced run task panicked: {}", e)))?;
        }
        Ok(())
    }

    /// Continuous loop: run, sleep, repeat until shutdown
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(
            analyzer = self.analyzer.name(),
            batch_size = self.config.batch_size,
            "Scheduler started"
        );
        loop {
            if shutdown.is_shutdown() {
                info!("Scheduler shutting down");
                break;
            }

            let pause = match self.try_acquire() {
                Some(_guard) => match self.execute_run(Some(&shutdown)).await {
                    Ok(_) => self.config.idle_interval,
                    Err(e) => {
                        error!("Scheduler error: {}", e);
                        self.config.error_backoff
                    }
                },
                None => {
                    debug!("Run already in progress, skipping this cycle");
                    self.config.idle_interval
                }
            };

            tokio::select! {
                _ = sleep(pause) => {},
                _ = shutdown.wait() => {
                    info!("Scheduler interrupted during idle");
                    break;
                }
            }
        }
        info!("Scheduler stopped");
        Ok(())
    }

    /// Spawn the continuous loop
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let token = self.shutdown_token.clone();
        let scheduler = Arc::clone(&self);
        let task = tokio::spawn(async move { scheduler.run(token).await });
        SchedulerHandle {
            scheduler: self,
            task,
        }
    }

    /// One full pass. Errors only when the run could not even be recorded;
    /// anything after that is folded into the returned run's status.
    async fn execute_run(&self, shutdown: Option<&ShutdownToken>) -> Result<UpdateRun> {
        let mut run = UpdateRun::new(
            self.id_provider.generate_id(),
            self.time_provider.now_millis(),
        );
        self.run_repo.create(&run).await?;
        info!(run_id = %run.id, month = %run.month_year, "Trend update run started");

        match self.process(&mut run, shutdown).await {
            Ok(()) => {
                run.finish(self.time_provider.now_millis())?;
            }
            Err(e) => {
                error!(run_id = %run.id, error = %e, "Trend update run failed");
                run.fail(e.to_string(), self.time_provider.now_millis())?;
            }
        }

        if let Err(e) = self.run_repo.finalize(&run).await {
            error!(run_id = %run.id, error = %e, "Failed to finalize run log");
        }

        info!(
            run_id = %run.id,
            status = %run.status,
            processed = run.processed_items,
            success = run.success_count,
            failure = run.failure_count,
            duration_minutes = run.duration_minutes().unwrap_or_default(),
            "Trend update run finished"
        );

        if let Ok(mut last) = self.last_run.lock() {
            *last = Some(run.clone());
        }
        Ok(run)
    }

    async fn process(&self, run: &mut UpdateRun, shutdown: Option<&ShutdownToken>) -> Result<()> {
        let careers = self
            .trend_store
            .due_careers(self.due_cutoff(), self.config.batch_size)
            .await?;
        run.set_total(careers.len());
        info!(run_id = %run.id, due = careers.len(), "Due check complete");

        let mut shutdown = shutdown.cloned();
        for (index, career) in careers.iter().enumerate() {
            if shutdown.as_ref().is_some_and(|s| s.is_shutdown()) {
                info!(
                    run_id = %run.id,
                    processed = index,
                    total = careers.len(),
                    "Shutdown requested, stopping between items"
                );
                run.record_interruption();
                break;
            }

            match self.refresh_item(career).await {
                Ok(record) => {
                    run.record_success();
                    self.translate(&record, shutdown.as_mut()).await;
                }
                Err(e) => {
                    warn!(career_id = %career.id, error = %e, "Career refresh failed");
                    run.record_failure(format!("{}: {}", career.id, e));
                }
            }
            self.run_repo.save_progress(run).await?;

            let last = index + 1 == careers.len();
            if !last && !self.config.item_delay.is_zero() {
                match shutdown.as_mut() {
                    Some(token) => {
                        tokio::select! {
                            _ = sleep(self.config.item_delay) => {},
                            _ = token.wait() => {},
                        }
                    }
                    None => sleep(self.config.item_delay).await,
                }
            }
        }

        match self.trend_store.refresh_industry_rollups(&run.month_year).await {
            Ok(count) => debug!(industries = count, "Industry rollups refreshed"),
            Err(e) => warn!(error = %e, "Industry rollup refresh failed"),
        }
        Ok(())
    }

    async fn refresh_item(&self, career: &Career) -> Result<TrendRecord> {
        let analysis = self.analyzer.analyze(career).await?;
        let record = TrendRecord::new(
            career.id.clone(),
            analysis,
            self.time_provider.now_millis(),
            self.refresh_period_ms(),
        );
        self.trend_store.save_trend(&record).await?;
        debug!(
            career_id = %career.id,
            score = record.analysis.trend_score,
            direction = %record.analysis.trend_direction,
            "Trend saved"
        );
        Ok(record)
    }

    /// Translation never affects run accounting, so shutdown may cut it short
    async fn translate(&self, record: &TrendRecord, shutdown: Option<&mut ShutdownToken>) {
        let targets: Vec<String> = self
            .config
            .languages
            .iter()
            .filter(|lang| lang.as_str() != BASE_LANGUAGE)
            .cloned()
            .collect();
        if targets.is_empty() {
            return;
        }

        let fields = record.analysis.translatable_fields();
        let translating = self.translator.translate(&fields, &targets);
        let result = match shutdown {
            Some(token) => tokio::select! {
                result = translating => result,
                _ = token.wait() => {
                    info!(career_id = %record.career_id, "Shutdown requested, skipping translation");
                    return;
                }
            },
            None => translating.await,
        };
        let translations = match result {
            Ok(t) => t,
            Err(e) => {
                warn!(career_id = %record.career_id, error = %e, "Translation failed");
                return;
            }
        };
        if let Err(e) = self
            .trend_store
            .save_translations(record, &translations)
            .await
        {
            warn!(career_id = %record.career_id, error = %e, "Saving translations failed");
        }
    }
}

/// Owned handle to a spawned scheduler loop
pub struct SchedulerHandle {
    scheduler: Arc<WorklistScheduler>,
    task: JoinHandle<Result<()>>,
}

impl SchedulerHandle {
    pub fn scheduler(&self) -> &Arc<WorklistScheduler> {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Signal shutdown and wait for the loop and any forced pass to exit
    pub async fn stop(self) -> Result<()> {
        self.scheduler.shutdown.shutdown();
        let looped = self
            .task
            .await
            .map_err(|e| AppError::Internal(format!("Scheduler task panicked: {}", e)))?;
        self.scheduler.shutdown().await?;
        looped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analyzer::TrendSynthesizer;
    use crate::domain::{CareerLevel, RunStatus};
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::run_repository::mocks::MockRunRepository;
    use crate::port::time_provider::mocks::MockTimeProvider;
    use crate::port::translator::mocks::MockTranslator;
    use crate::port::trend_store::mocks::MockTrendStore;

    const T0: i64 = 1_700_000_000_000;

    struct Fixture {
        store: Arc<MockTrendStore>,
        runs: Arc<MockRunRepository>,
        translator: Arc<MockTranslator>,
        clock: Arc<MockTimeProvider>,
        scheduler: Arc<WorklistScheduler>,
    }

    fn careers() -> Vec<Career> {
        vec![
            Career::new("c", "Cloud Architect", "tech", CareerLevel::Expert),
            Career::new("a", "Android Developer", "tech", CareerLevel::Intermediate),
            Career::new("b", "Backend Engineer", "tech", CareerLevel::Advanced),
        ]
    }

    fn fixture_with(config: SchedulerConfig, translator: MockTranslator) -> Fixture {
        let store = Arc::new(MockTrendStore::new(careers()));
        let runs = Arc::new(MockRunRepository::new());
        let translator = Arc::new(translator);
        let clock = Arc::new(MockTimeProvider::new(T0));
        let scheduler = Arc::new(WorklistScheduler::new(
            config,
            store.clone(),
            runs.clone(),
            Arc::new(TrendSynthesizer::with_seed(3)),
            translator.clone(),
            clock.clone(),
            Arc::new(SequentialIdProvider::new("run")),
        ));
        Fixture {
            store,
            runs,
            translator,
            clock,
            scheduler,
        }
    }

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig {
            item_delay: Duration::ZERO,
            languages: vec!["en".to_string()],
            ..SchedulerConfig::default()
        }
    }

    fn fixture() -> Fixture {
        fixture_with(fast_config(), MockTranslator::new())
    }

    #[tokio::test]
    async fn test_second_item_save_failure_is_isolated() {
        let f = fixture();
        f.store.fail_save_for("b");

        let run = f.scheduler.force_run().await.unwrap();

        assert_eq!(run.total_items, 3);
        assert_eq!(run.processed_items, 3);
        assert_eq!(run.success_count, 2);
        assert_eq!(run.failure_count, 1);
        assert_eq!(run.status, RunStatus::CompletedWithErrors);
        assert!(run.errors[0].starts_with("b: "));
        assert_eq!(f.runs.finalize_count(), 1);
        assert_eq!(f.store.rollup_calls(), 1);

        let persisted = f.runs.runs();
        assert_eq!(persisted[0].status, RunStatus::CompletedWithErrors);
        assert_eq!(persisted[0].id, "run-1");
    }

    #[tokio::test]
    async fn test_clean_run_completes_and_items_are_not_due_again() {
        let f = fixture();

        let first = f.scheduler.force_run().await.unwrap();
        assert_eq!(first.status, RunStatus::Completed);
        assert_eq!(first.success_count, 3);
        assert_eq!(f.store.saved()[0].next_update_due, T0 + REFRESH_PERIOD.as_millis() as i64);

        f.clock.advance(REFRESH_PERIOD.as_millis() as i64);
        let second = f.scheduler.force_run().await.unwrap();
        assert_eq!(second.total_items, 0);
        assert_eq!(second.status, RunStatus::Completed);

        f.clock.advance(1);
        let third = f.scheduler.force_run().await.unwrap();
        assert_eq!(third.total_items, 3);
    }

    #[tokio::test]
    async fn test_force_run_rejected_while_running() {
        let f = fixture();
        let _guard = f.scheduler.try_acquire().unwrap();
        assert!(f.scheduler.is_running());

        let err = f.scheduler.force_run().await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(f.runs.runs().is_empty());
    }

    #[tokio::test]
    async fn test_running_flag_cleared_after_run() {
        let f = fixture();
        f.scheduler.force_run().await.unwrap();
        assert!(!f.scheduler.is_running());
        let status = f.scheduler.status();
        assert_eq!(status.analyzer, "synthetic");
        assert_eq!(status.last_run.unwrap().status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_store_outage_fails_run_without_crashing() {
        let f = fixture();
        f.store.set_unreachable(true);

        let run = f.scheduler.force_run().await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.errors.iter().any(|e| e.contains("connection refused")));
        assert_eq!(f.runs.finalize_count(), 1);
        assert!(!f.scheduler.is_running());
    }

    #[tokio::test]
    async fn test_progress_write_failure_fails_run() {
        let f = fixture();
        f.runs.set_fail_progress(true);

        let run = f.scheduler.force_run().await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.processed_items, 1);
    }

    #[tokio::test]
    async fn test_run_log_create_failure_is_an_error() {
        let f = fixture();
        f.runs.set_fail_create(true);
        assert!(f.scheduler.force_run().await.is_err());
        assert!(!f.scheduler.is_running());
    }

    #[tokio::test]
    async fn test_rollup_failure_keeps_status() {
        let f = fixture();
        f.store.set_fail_rollups(true);
        let run = f.scheduler.force_run().await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_translations_target_non_base_languages() {
        let config = SchedulerConfig {
            languages: vec!["en".to_string(), "ja".to_string(), "de".to_string()],
            ..fast_config()
        };
        let f = fixture_with(config, MockTranslator::new());
        f.scheduler.force_run().await.unwrap();

        let saved = f.store.translations();
        assert_eq!(saved.len(), 3);
        let (_, translations) = &saved[0];
        assert_eq!(translations.keys().collect::<Vec<_>>(), vec!["de", "ja"]);
        assert!(translations["ja"]["future_outlook"].starts_with("[ja] "));
    }

    #[tokio::test]
    async fn test_translation_failure_does_not_count() {
        let config = SchedulerConfig {
            languages: vec!["en".to_string(), "fr".to_string()],
            ..fast_config()
        };
        let f = fixture_with(config, MockTranslator::failing());
        let run = f.scheduler.force_run().await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(f.translator.call_count(), 3);
        assert!(f.store.translations().is_empty());
    }

    #[tokio::test]
    async fn test_batch_size_caps_worklist() {
        let config = SchedulerConfig {
            batch_size: 2,
            ..fast_config()
        };
        let f = fixture_with(config, MockTranslator::new());
        let run = f.scheduler.force_run().await.unwrap();
        assert_eq!(run.total_items, 2);
        let ids: Vec<_> = f.store.saved().into_iter().map(|r| r.career_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    fn slow_fixture(item_delay: Duration) -> Fixture {
        fixture_with(
            SchedulerConfig {
                item_delay,
                ..fast_config()
            },
            MockTranslator::new(),
        )
    }

    async fn wait_until_idle(scheduler: &WorklistScheduler) {
        for _ in 0..200 {
            if !scheduler.is_running() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("run did not finish");
    }

    #[tokio::test]
    async fn test_dropped_force_run_caller_still_finalizes() {
        let f = slow_fixture(Duration::from_millis(150));

        let waited = tokio::time::timeout(Duration::from_millis(50), f.scheduler.force_run()).await;
        assert!(waited.is_err());
        assert!(f.scheduler.is_running());

        wait_until_idle(&f.scheduler).await;
        let persisted = f.runs.runs();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].status, RunStatus::Completed);
        assert_eq!(persisted[0].processed_items, 3);
        assert_eq!(f.runs.finalize_count(), 1);
        assert_eq!(f.scheduler.status().last_run.unwrap().id, "run-1");
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_forced_run() {
        let f = slow_fixture(Duration::from_secs(5));

        let waited = tokio::time::timeout(Duration::from_millis(50), f.scheduler.force_run()).await;
        assert!(waited.is_err());

        tokio::time::timeout(Duration::from_secs(1), f.scheduler.shutdown())
            .await
            .expect("shutdown should cut the item delay short")
            .unwrap();

        let run = &f.runs.runs()[0];
        assert_eq!(run.status, RunStatus::CompletedWithErrors);
        assert_eq!(run.total_items, 3);
        assert_eq!(run.processed_items, 1);
        assert_eq!(run.failure_count, 0);
        assert_eq!(run.errors, vec!["stopped after 1 of 3 items".to_string()]);
        assert_eq!(f.runs.finalize_count(), 1);
        assert!(!f.scheduler.is_running());

        let err = f.scheduler.force_run().await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_stopping_loop_mid_pass_records_interruption() {
        let f = slow_fixture(Duration::from_millis(300));
        let handle = f.scheduler.clone().start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        tokio::time::timeout(Duration::from_secs(1), handle.stop())
            .await
            .expect("scheduler should stop promptly")
            .unwrap();

        let run = &f.runs.runs()[0];
        assert_eq!(run.status, RunStatus::CompletedWithErrors);
        assert_eq!(run.processed_items, 1);
        assert!(run.errors[0].starts_with("stopped after 1 of 3"));
        assert_eq!(f.runs.finalize_count(), 1);
    }

    /// Never answers, like a provider hanging until its timeout
    struct StalledTranslator;

    #[async_trait::async_trait]
    impl Translator for StalledTranslator {
        async fn translate(
            &self,
            _fields: &std::collections::BTreeMap<String, String>,
            _target_languages: &[String],
        ) -> Result<crate::port::Translations> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_shutdown_skips_pending_translation() {
        let store = Arc::new(MockTrendStore::new(careers()));
        let runs = Arc::new(MockRunRepository::new());
        let scheduler = Arc::new(WorklistScheduler::new(
            SchedulerConfig {
                languages: vec!["en".to_string(), "de".to_string()],
                ..fast_config()
            },
            store.clone(),
            runs.clone(),
            Arc::new(TrendSynthesizer::with_seed(3)),
            Arc::new(StalledTranslator),
            Arc::new(MockTimeProvider::new(T0)),
            Arc::new(SequentialIdProvider::new("run")),
        ));
        let handle = scheduler.clone().start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        tokio::time::timeout(Duration::from_secs(1), handle.stop())
            .await
            .expect("translation should not hold up shutdown")
            .unwrap();

        let run = &runs.runs()[0];
        assert_eq!(run.status, RunStatus::CompletedWithErrors);
        assert_eq!(run.success_count, 1);
        assert_eq!(run.processed_items, 1);
        assert_eq!(store.saved().len(), 1);
        assert!(store.translations().is_empty());
    }

    #[tokio::test]
    async fn test_start_runs_then_stops_on_signal() {
        let f = fixture();
        let handle = f.scheduler.clone().start();

        for _ in 0..100 {
            if f.scheduler.status().last_run.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        tokio::time::timeout(Duration::from_secs(1), handle.stop())
            .await
            .expect("scheduler should stop promptly")
            .unwrap();
        assert_eq!(f.runs.runs().len(), 1);
        assert!(!f.scheduler.is_running());
    }
}
