// SQLite TrendStore Implementation
//
// Two physical layouts behind one adapter:
// - Single: `career_trends` holds base-language records, translated text
//   lives in `career_trend_translations`.
// - Partitioned: one `career_trends_{lang}` table per language, created on
//   first use. The base language table drives the due-check.

use crate::career_catalog::CareerRow;
use crate::error::{corrupt_column, map_sqlx_error};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{Executor, Sqlite, SqlitePool};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use trendline_core::domain::{
    Career, CareerId, TrendAnalysis, TrendDirection, TrendRecord,
};
use trendline_core::error::{AppError, Result};
use trendline_core::port::{TimeProvider, Translations, TrendStats, TrendStore};

const SINGLE_TRENDS_TABLE: &str = "career_trends";
const TOP_CAREERS_PER_INDUSTRY: usize = 5;
const TOP_SKILLS_PER_INDUSTRY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLayout {
    Single,
    Partitioned,
}

impl StorageLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageLayout::Single => "single",
            StorageLayout::Partitioned => "partitioned",
        }
    }
}

impl FromStr for StorageLayout {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(StorageLayout::Single),
            "partitioned" => Ok(StorageLayout::Partitioned),
            other => Err(AppError::Config(format!(
                "Unknown storage layout '{}' (expected single or partitioned)",
                other
            ))),
        }
    }
}

/// Language codes end up in table names; only `[a-z]{2}` is accepted
pub fn validate_language(code: &str) -> Result<&str> {
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase()) {
        Ok(code)
    } else {
        Err(AppError::Validation(format!(
            "Invalid language code '{}' (expected two lowercase letters)",
            code
        )))
    }
}

fn partition_table(language: &str) -> Result<String> {
    Ok(format!("career_trends_{}", validate_language(language)?))
}

fn trend_table_ddl(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            career_id TEXT PRIMARY KEY REFERENCES careers(id) ON DELETE CASCADE,
            trend_score REAL NOT NULL,
            trend_direction TEXT NOT NULL,
            demand_level TEXT NOT NULL,
            growth_rate REAL NOT NULL,
            currency_code TEXT NOT NULL,
            trend_data TEXT NOT NULL,
            last_updated INTEGER NOT NULL,
            next_update_due INTEGER NOT NULL
        )
        "#
    )
}

async fn upsert_trend<'e, E>(executor: E, table: &str, record: &TrendRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let analysis = &record.analysis;
    let trend_data = serde_json::to_string(analysis)?;

    sqlx::query(&format!(
        r#"
        INSERT INTO {table} (
            career_id, trend_score, trend_direction, demand_level, growth_rate,
            currency_code, trend_data, last_updated, next_update_due
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(career_id) DO UPDATE SET
            trend_score = excluded.trend_score,
            trend_direction = excluded.trend_direction,
            demand_level = excluded.demand_level,
            growth_rate = excluded.growth_rate,
            currency_code = excluded.currency_code,
            trend_data = excluded.trend_data,
            last_updated = excluded.last_updated,
            next_update_due = excluded.next_update_due
        "#
    ))
    .bind(&record.career_id)
    .bind(analysis.trend_score)
    .bind(analysis.trend_direction.as_str())
    .bind(analysis.demand_level.as_str())
    .bind(analysis.growth_rate)
    .bind(&analysis.currency_code)
    .bind(&trend_data)
    .bind(record.generated_at)
    .bind(record.next_update_due)
    .execute(executor)
    .await
    .map_err(map_sqlx_error)?;

    Ok(())
}

pub struct SqliteTrendStore {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
    layout: StorageLayout,
    base_language: String,
    /// Partition tables known to exist
    ensured: Mutex<HashSet<String>>,
}

impl SqliteTrendStore {
    /// Single-table layout
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
            layout: StorageLayout::Single,
            base_language: "en".to_string(),
            ensured: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_layout(
        pool: SqlitePool,
        time_provider: Arc<dyn TimeProvider>,
        layout: StorageLayout,
        base_language: &str,
    ) -> Result<Self> {
        let base_language = validate_language(base_language)
            .map_err(|e| AppError::Config(e.to_string()))?
            .to_string();
        Ok(Self {
            pool,
            time_provider,
            layout,
            base_language,
            ensured: Mutex::new(HashSet::new()),
        })
    }

    pub fn layout(&self) -> StorageLayout {
        self.layout
    }

    /// Table holding base-language records, created if needed
    async fn base_table(&self) -> Result<String> {
        match self.layout {
            StorageLayout::Single => Ok(SINGLE_TRENDS_TABLE.to_string()),
            StorageLayout::Partitioned => self.partition(&self.base_language).await,
        }
    }

    async fn partition(&self, language: &str) -> Result<String> {
        let table = partition_table(language)?;
        let mut ensured = self.ensured.lock().await;
        if !ensured.contains(&table) {
            sqlx::query(&trend_table_ddl(&table))
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
            info!(table = %table, "Created language partition table");
            ensured.insert(table.clone());
        }
        Ok(table)
    }

    async fn fetch_trend(&self, table: &str, career_id: &str) -> Result<Option<TrendRecord>> {
        let row = sqlx::query_as::<_, TrendRow>(&format!(
            "SELECT career_id, trend_data, last_updated, next_update_due FROM {} WHERE career_id = ?",
            table
        ))
        .bind(career_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(TrendRow::into_record).transpose()
    }
}

#[async_trait]
impl TrendStore for SqliteTrendStore {
    async fn due_careers(&self, cutoff_millis: i64, limit: u32) -> Result<Vec<Career>> {
        let table = self.base_table().await?;
        let rows = sqlx::query_as::<_, CareerRow>(&format!(
            r#"
            SELECT c.id, c.title, c.industry, c.level, c.skills, c.description
            FROM careers c
            LEFT JOIN {table} t ON t.career_id = c.id
            WHERE t.career_id IS NULL OR t.last_updated < ?
            ORDER BY c.industry ASC, c.title ASC
            LIMIT ?
            "#
        ))
        .bind(cutoff_millis)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(CareerRow::into_career).collect()
    }

    async fn save_trend(&self, record: &TrendRecord) -> Result<()> {
        let table = self.base_table().await?;
        let trend_data = serde_json::to_string(&record.analysis)?;

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        upsert_trend(&mut *tx, &table, record).await?;

        sqlx::query(
            r#"
            INSERT INTO career_trend_history (career_id, trend_data, currency_code, month_year, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.career_id)
        .bind(&trend_data)
        .bind(&record.analysis.currency_code)
        .bind(record.month_year())
        .bind(record.generated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn save_translations(
        &self,
        record: &TrendRecord,
        translations: &Translations,
    ) -> Result<()> {
        match self.layout {
            StorageLayout::Single => {
                let now = self.time_provider.now_millis();
                let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
                for (language, fields) in translations {
                    validate_language(language)?;
                    sqlx::query(
                        r#"
                        INSERT INTO career_trend_translations (career_id, language, fields, updated_at)
                        VALUES (?, ?, ?, ?)
                        ON CONFLICT(career_id, language) DO UPDATE SET
                            fields = excluded.fields,
                            updated_at = excluded.updated_at
                        "#,
                    )
                    .bind(&record.career_id)
                    .bind(language)
                    .bind(serde_json::to_string(fields)?)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;
                }
                tx.commit().await.map_err(map_sqlx_error)?;
            }
            StorageLayout::Partitioned => {
                for (language, fields) in translations {
                    let table = self.partition(language).await?;
                    let localized = TrendRecord {
                        analysis: record.analysis.with_translations(fields),
                        ..record.clone()
                    };
                    upsert_trend(&self.pool, &table, &localized).await?;
                }
            }
        }

        debug!(
            career_id = %record.career_id,
            languages = translations.len(),
            "Translations saved"
        );
        Ok(())
    }

    async fn find_trend(&self, career_id: &CareerId) -> Result<Option<TrendRecord>> {
        let table = self.base_table().await?;
        self.fetch_trend(&table, career_id).await
    }

    async fn find_localized(
        &self,
        career_id: &CareerId,
        language: &str,
    ) -> Result<Option<TrendRecord>> {
        validate_language(language)?;
        if language == self.base_language {
            return self.find_trend(career_id).await;
        }

        match self.layout {
            StorageLayout::Partitioned => {
                let table = self.partition(language).await?;
                self.fetch_trend(&table, career_id).await
            }
            StorageLayout::Single => {
                let Some(mut record) = self.find_trend(career_id).await? else {
                    return Ok(None);
                };
                let fields: Option<String> = sqlx::query_scalar(
                    "SELECT fields FROM career_trend_translations WHERE career_id = ? AND language = ?",
                )
                .bind(career_id)
                .bind(language)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

                if let Some(fields) = fields {
                    let fields: BTreeMap<String, String> =
                        serde_json::from_str(&fields).map_err(|e| corrupt_column("fields", e))?;
                    record.analysis = record.analysis.with_translations(&fields);
                }
                Ok(Some(record))
            }
        }
    }

    async fn refresh_industry_rollups(&self, month_year: &str) -> Result<u32> {
        let table = self.base_table().await?;
        let rows = sqlx::query_as::<_, RollupRow>(&format!(
            r#"
            SELECT c.id AS career_id, c.title, c.industry, t.trend_score, t.trend_direction, t.trend_data
            FROM careers c
            JOIN {table} t ON t.career_id = c.id
            "#
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let rollups = compute_rollups(rows)?;
        let now = self.time_provider.now_millis();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        for rollup in &rollups {
            sqlx::query(
                r#"
                INSERT INTO industry_trends (
                    industry, month_year, total_careers, avg_trend_score,
                    rising_count, stable_count, declining_count,
                    top_careers, trending_skills, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(industry, month_year) DO UPDATE SET
                    total_careers = excluded.total_careers,
                    avg_trend_score = excluded.avg_trend_score,
                    rising_count = excluded.rising_count,
                    stable_count = excluded.stable_count,
                    declining_count = excluded.declining_count,
                    top_careers = excluded.top_careers,
                    trending_skills = excluded.trending_skills,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(&rollup.industry)
            .bind(month_year)
            .bind(rollup.total_careers)
            .bind(rollup.avg_trend_score)
            .bind(rollup.rising_count)
            .bind(rollup.stable_count)
            .bind(rollup.declining_count)
            .bind(serde_json::to_string(&rollup.top_careers)?)
            .bind(serde_json::to_string(&rollup.trending_skills)?)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(u32::try_from(rollups.len()).unwrap_or(u32::MAX))
    }

    async fn stats(&self, cutoff_millis: i64) -> Result<TrendStats> {
        let table = self.base_table().await?;

        let total_careers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM careers")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let tracked_trends: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let due_careers: i64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COUNT(*) FROM careers c
            LEFT JOIN {table} t ON t.career_id = c.id
            WHERE t.career_id IS NULL OR t.last_updated < ?
            "#
        ))
        .bind(cutoff_millis)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let industries: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT industry) FROM careers")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(TrendStats {
            total_careers,
            tracked_trends,
            due_careers,
            industries,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TrendRow {
    career_id: String,
    trend_data: String, // JSON TrendAnalysis
    last_updated: i64,
    next_update_due: i64,
}

impl TrendRow {
    fn into_record(self) -> Result<TrendRecord> {
        let analysis: TrendAnalysis = serde_json::from_str(&self.trend_data)
            .map_err(|e| corrupt_column("trend_data", e))?;
        Ok(TrendRecord {
            career_id: self.career_id,
            analysis,
            generated_at: self.last_updated,
            next_update_due: self.next_update_due,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RollupRow {
    career_id: String,
    title: String,
    industry: String,
    trend_score: f64,
    trend_direction: String,
    trend_data: String,
}

#[derive(Debug, Serialize)]
struct TopCareer {
    career_id: String,
    title: String,
    trend_score: f64,
}

#[derive(Debug, Serialize)]
struct SkillCount {
    skill: String,
    count: i64,
}

#[derive(Debug)]
struct IndustryRollup {
    industry: String,
    total_careers: i64,
    avg_trend_score: f64,
    rising_count: i64,
    stable_count: i64,
    declining_count: i64,
    top_careers: Vec<TopCareer>,
    trending_skills: Vec<SkillCount>,
}

fn compute_rollups(rows: Vec<RollupRow>) -> Result<Vec<IndustryRollup>> {
    let mut by_industry: BTreeMap<String, Vec<RollupRow>> = BTreeMap::new();
    for row in rows {
        by_industry.entry(row.industry.clone()).or_default().push(row);
    }

    let mut rollups = Vec::with_capacity(by_industry.len());
    for (industry, rows) in by_industry {
        let mut rollup = IndustryRollup {
            industry,
            total_careers: rows.len() as i64,
            avg_trend_score: 0.0,
            rising_count: 0,
            stable_count: 0,
            declining_count: 0,
            top_careers: Vec::new(),
            trending_skills: Vec::new(),
        };
        let mut skills: HashMap<String, i64> = HashMap::new();
        let mut score_sum = 0.0;

        for row in &rows {
            score_sum += row.trend_score;
            match row.trend_direction.parse::<TrendDirection>()? {
                TrendDirection::Rising => rollup.rising_count += 1,
                TrendDirection::Stable => rollup.stable_count += 1,
                TrendDirection::Declining => rollup.declining_count += 1,
            }
            let analysis: TrendAnalysis = serde_json::from_str(&row.trend_data)
                .map_err(|e| corrupt_column("trend_data", e))?;
            for skill in analysis.key_skills_trending {
                *skills.entry(skill).or_default() += 1;
            }
        }
        rollup.avg_trend_score = (score_sum / rows.len() as f64 * 100.0).round() / 100.0;

        let mut ranked: Vec<&RollupRow> = rows.iter().collect();
        ranked.sort_by(|a, b| {
            b.trend_score
                .total_cmp(&a.trend_score)
                .then_with(|| a.title.cmp(&b.title))
        });
        rollup.top_careers = ranked
            .into_iter()
            .take(TOP_CAREERS_PER_INDUSTRY)
            .map(|r| TopCareer {
                career_id: r.career_id.clone(),
                title: r.title.clone(),
                trend_score: r.trend_score,
            })
            .collect();

        let mut skills: Vec<SkillCount> = skills
            .into_iter()
            .map(|(skill, count)| SkillCount { skill, count })
            .collect();
        skills.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
        skills.truncate(TOP_SKILLS_PER_INDUSTRY);
        rollup.trending_skills = skills;

        rollups.push(rollup);
    }
    Ok(rollups)
}
