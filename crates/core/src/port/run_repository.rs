// Run Log Port (Interface)

use crate::domain::UpdateRun;
use crate::error::Result;
use async_trait::async_trait;

/// Append-only log of scheduler runs
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Insert a freshly started run
    async fn create(&self, run: &UpdateRun) -> Result<()>;

    /// Persist counters and error list of an in-flight run
    async fn save_progress(&self, run: &UpdateRun) -> Result<()>;

    /// Persist the terminal status, end time and duration
    async fn finalize(&self, run: &UpdateRun) -> Result<()>;

    /// Most recently started run
    async fn latest(&self) -> Result<Option<UpdateRun>>;
}

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Keeps the last snapshot written for each run
    pub struct MockRunRepository {
        runs: Arc<Mutex<Vec<UpdateRun>>>,
        fail_create: Arc<Mutex<bool>>,
        fail_progress: Arc<Mutex<bool>>,
        finalize_count: Arc<Mutex<usize>>,
    }

    impl MockRunRepository {
        pub fn new() -> Self {
            Self {
                runs: Arc::new(Mutex::new(Vec::new())),
                fail_create: Arc::new(Mutex::new(false)),
                fail_progress: Arc::new(Mutex::new(false)),
                finalize_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn set_fail_create(&self, fail: bool) {
            *self.fail_create.lock().unwrap() = fail;
        }

        pub fn set_fail_progress(&self, fail: bool) {
            *self.fail_progress.lock().unwrap() = fail;
        }

        pub fn runs(&self) -> Vec<UpdateRun> {
            self.runs.lock().unwrap().clone()
        }

        pub fn finalize_count(&self) -> usize {
            *self.finalize_count.lock().unwrap()
        }

        fn replace(&self, run: &UpdateRun) {
            let mut runs = self.runs.lock().unwrap();
            if let Some(existing) = runs.iter_mut().find(|r| r.id == run.id) {
                *existing = run.clone();
            } else {
                runs.push(run.clone());
            }
        }
    }

    impl Default for MockRunRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl RunRepository for MockRunRepository {
        async fn create(&self, run: &UpdateRun) -> Result<()> {
            if *self.fail_create.lock().unwrap() {
                return Err(AppError::Database("run log unavailable".to_string()));
            }
            self.replace(run);
            Ok(())
        }

        async fn save_progress(&self, run: &UpdateRun) -> Result<()> {
            if *self.fail_progress.lock().unwrap() {
                return Err(AppError::Database("run log unavailable".to_string()));
            }
            self.replace(run);
            Ok(())
        }

        async fn finalize(&self, run: &UpdateRun) -> Result<()> {
            *self.finalize_count.lock().unwrap() += 1;
            self.replace(run);
            Ok(())
        }

        async fn latest(&self) -> Result<Option<UpdateRun>> {
            Ok(self.runs.lock().unwrap().last().cloned())
        }
    }
}
