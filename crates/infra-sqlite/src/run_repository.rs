// SQLite RunRepository Implementation

use crate::error::{corrupt_column, map_sqlx_error};
use async_trait::async_trait;
use sqlx::SqlitePool;
use trendline_core::domain::{RunStatus, UpdateRun};
use trendline_core::error::{AppError, Result};
use trendline_core::port::RunRepository;

pub struct SqliteRunRepository {
    pool: SqlitePool,
}

impl SqliteRunRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent runs first
    pub async fn recent(&self, limit: u32) -> Result<Vec<UpdateRun>> {
        let rows = sqlx::query_as::<_, RunRow>(
            r#"
            SELECT id, month_year, status, started_at, ended_at, total_items,
                   processed_items, success_count, failure_count, errors
            FROM trend_update_log
            ORDER BY started_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(RunRow::into_run).collect()
    }

    async fn write_counters(&self, run: &UpdateRun) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE trend_update_log
            SET status = ?, ended_at = ?, total_items = ?, processed_items = ?,
                success_count = ?, failure_count = ?, errors = ?, duration_minutes = ?
            WHERE id = ?
            "#,
        )
        .bind(run.status.as_str())
        .bind(run.ended_at)
        .bind(run.total_items)
        .bind(run.processed_items)
        .bind(run.success_count)
        .bind(run.failure_count)
        .bind(serde_json::to_string(&run.errors)?)
        .bind(run.duration_minutes())
        .bind(&run.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RunRepository for SqliteRunRepository {
    async fn create(&self, run: &UpdateRun) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO trend_update_log (
                id, month_year, status, started_at, ended_at, total_items,
                processed_items, success_count, failure_count, errors, duration_minutes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&run.id)
        .bind(&run.month_year)
        .bind(run.status.as_str())
        .bind(run.started_at)
        .bind(run.ended_at)
        .bind(run.total_items)
        .bind(run.processed_items)
        .bind(run.success_count)
        .bind(run.failure_count)
        .bind(serde_json::to_string(&run.errors)?)
        .bind(run.duration_minutes())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn save_progress(&self, run: &UpdateRun) -> Result<()> {
        if self.write_counters(run).await? == 0 {
            return Err(AppError::NotFound(format!("Update run {}", run.id)));
        }
        Ok(())
    }

    async fn finalize(&self, run: &UpdateRun) -> Result<()> {
        if !run.status.is_terminal() {
            return Err(AppError::Validation(format!(
                "Run {} is still {}",
                run.id, run.status
            )));
        }
        if self.write_counters(run).await? == 0 {
            return Err(AppError::NotFound(format!("Update run {}", run.id)));
        }
        Ok(())
    }

    async fn latest(&self) -> Result<Option<UpdateRun>> {
        Ok(self.recent(1).await?.into_iter().next())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RunRow {
    id: String,
    month_year: String,
    status: String,
    started_at: i64,
    ended_at: Option<i64>,
    total_items: u32,
    processed_items: u32,
    success_count: u32,
    failure_count: u32,
    errors: String, // JSON array
}

impl RunRow {
    fn into_run(self) -> Result<UpdateRun> {
        let status = RunStatus::parse(&self.status)
            .ok_or_else(|| AppError::Database(format!("Unknown run status '{}'", self.status)))?;
        let errors: Vec<String> =
            serde_json::from_str(&self.errors).map_err(|e| corrupt_column("errors", e))?;

        Ok(UpdateRun {
            id: self.id,
            month_year: self.month_year,
            status,
            started_at: self.started_at,
            ended_at: self.ended_at,
            total_items: self.total_items,
            processed_items: self.processed_items,
            success_count: self.success_count,
            failure_count: self.failure_count,
            errors,
        })
    }
}
