// Trend Store Port (Interface)

use crate::domain::{Career, CareerId, TrendRecord};
use crate::error::Result;
use crate::port::Translations;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Snapshot counters for the admin surface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendStats {
    pub total_careers: i64,
    pub tracked_trends: i64,
    pub due_careers: i64,
    pub industries: i64,
}

/// Relational store holding trend records, their history and rollups.
///
/// Implementations choose the physical layout (single table, per-language
/// tables); the scheduler only sees this interface.
#[async_trait]
pub trait TrendStore: Send + Sync {
    /// Careers never refreshed, or last refreshed before `cutoff_millis`,
    /// ordered by industry then title, at most `limit` entries
    async fn due_careers(&self, cutoff_millis: i64, limit: u32) -> Result<Vec<Career>>;

    /// Upsert the record on its career id and append a history row
    async fn save_trend(&self, record: &TrendRecord) -> Result<()>;

    /// Persist translated text fields for an already saved record
    async fn save_translations(
        &self,
        record: &TrendRecord,
        translations: &Translations,
    ) -> Result<()>;

    /// Latest record for a career
    async fn find_trend(&self, career_id: &CareerId) -> Result<Option<TrendRecord>>;

    /// Latest record with text fields in `language`. Untranslated records keep
    /// their base-language text; the base language is `find_trend`.
    async fn find_localized(
        &self,
        career_id: &CareerId,
        language: &str,
    ) -> Result<Option<TrendRecord>>;

    /// Recompute per-industry aggregates for a month; returns industries written
    async fn refresh_industry_rollups(&self, month_year: &str) -> Result<u32>;

    async fn stats(&self, cutoff_millis: i64) -> Result<TrendStats>;
}

pub mod mocks {
    use super::*;
    use crate::application::constants::BASE_LANGUAGE;
    use crate::error::AppError;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// In-memory store with per-career save failures and a switchable outage
    pub struct MockTrendStore {
        careers: Arc<Mutex<Vec<Career>>>,
        trends: Arc<Mutex<HashMap<CareerId, TrendRecord>>>,
        history: Arc<Mutex<Vec<TrendRecord>>>,
        translations: Arc<Mutex<Vec<(CareerId, Translations)>>>,
        failing_saves: Arc<Mutex<HashSet<CareerId>>>,
        unreachable: Arc<Mutex<bool>>,
        fail_rollups: Arc<Mutex<bool>>,
        rollup_calls: Arc<Mutex<usize>>,
    }

    impl MockTrendStore {
        pub fn new(careers: Vec<Career>) -> Self {
            Self {
                careers: Arc::new(Mutex::new(careers)),
                trends: Arc::new(Mutex::new(HashMap::new())),
                history: Arc::new(Mutex::new(Vec::new())),
                translations: Arc::new(Mutex::new(Vec::new())),
                failing_saves: Arc::new(Mutex::new(HashSet::new())),
                unreachable: Arc::new(Mutex::new(false)),
                fail_rollups: Arc::new(Mutex::new(false)),
                rollup_calls: Arc::new(Mutex::new(0)),
            }
        }

        pub fn fail_save_for(&self, career_id: &str) {
            self.failing_saves
                .lock()
                .unwrap()
                .insert(career_id.to_string());
        }

        pub fn set_unreachable(&self, unreachable: bool) {
            *self.unreachable.lock().unwrap() = unreachable;
        }

        pub fn set_fail_rollups(&self, fail: bool) {
            *self.fail_rollups.lock().unwrap() = fail;
        }

        pub fn saved(&self) -> Vec<TrendRecord> {
            self.history.lock().unwrap().clone()
        }

        pub fn translations(&self) -> Vec<(CareerId, Translations)> {
            self.translations.lock().unwrap().clone()
        }

        pub fn rollup_calls(&self) -> usize {
            *self.rollup_calls.lock().unwrap()
        }

        fn check_reachable(&self) -> Result<()> {
            if *self.unreachable.lock().unwrap() {
                return Err(AppError::Database("connection refused".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TrendStore for MockTrendStore {
        async fn due_careers(&self, cutoff_millis: i64, limit: u32) -> Result<Vec<Career>> {
            self.check_reachable()?;
            let trends = self.trends.lock().unwrap();
            let mut due: Vec<Career> = self
                .careers
                .lock()
                .unwrap()
                .iter()
                .filter(|c| match trends.get(&c.id) {
                    None => true,
                    Some(t) => t.generated_at < cutoff_millis,
                })
                .cloned()
                .collect();
            due.sort_by(|a, b| (&a.industry, &a.title).cmp(&(&b.industry, &b.title)));
            due.truncate(limit as usize);
            Ok(due)
        }

        async fn save_trend(&self, record: &TrendRecord) -> Result<()> {
            self.check_reachable()?;
            if self.failing_saves.lock().unwrap().contains(&record.career_id) {
                return Err(AppError::Database(format!(
                    "upsert rejected for {}",
                    record.career_id
                )));
            }
            self.trends
                .lock()
                .unwrap()
                .insert(record.career_id.clone(), record.clone());
            self.history.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn save_translations(
            &self,
            record: &TrendRecord,
            translations: &Translations,
        ) -> Result<()> {
            self.check_reachable()?;
            self.translations
                .lock()
                .unwrap()
                .push((record.career_id.clone(), translations.clone()));
            Ok(())
        }

        async fn find_trend(&self, career_id: &CareerId) -> Result<Option<TrendRecord>> {
            self.check_reachable()?;
            Ok(self.trends.lock().unwrap().get(career_id).cloned())
        }

        async fn find_localized(
            &self,
            career_id: &CareerId,
            language: &str,
        ) -> Result<Option<TrendRecord>> {
            let Some(record) = self.find_trend(career_id).await? else {
                return Ok(None);
            };
            if language == BASE_LANGUAGE {
                return Ok(Some(record));
            }
            let translated = self
                .translations
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(id, _)| id == career_id)
                .and_then(|(_, t)| t.get(language).cloned());
            Ok(Some(match translated {
                Some(fields) => TrendRecord {
                    analysis: record.analysis.with_translations(&fields),
                    ..record
                },
                None => record,
            }))
        }

        async fn refresh_industry_rollups(&self, _month_year: &str) -> Result<u32> {
            *self.rollup_calls.lock().unwrap() += 1;
            if *self.fail_rollups.lock().unwrap() {
                return Err(AppError::Database("rollup failed".to_string()));
            }
            self.check_reachable()?;
            let industries: HashSet<String> = self
                .careers
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.industry.clone())
                .collect();
            Ok(industries.len() as u32)
        }

        async fn stats(&self, cutoff_millis: i64) -> Result<TrendStats> {
            let due = self.due_careers(cutoff_millis, u32::MAX).await?.len() as i64;
            let careers = self.careers.lock().unwrap();
            let industries: HashSet<&String> = careers.iter().map(|c| &c.industry).collect();
            Ok(TrendStats {
                total_careers: careers.len() as i64,
                tracked_trends: self.trends.lock().unwrap().len() as i64,
                due_careers: due,
                industries: industries.len() as i64,
            })
        }
    }
}
