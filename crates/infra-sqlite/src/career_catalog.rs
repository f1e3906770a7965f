// SQLite CareerCatalog Implementation

use crate::error::{corrupt_column, map_sqlx_error};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use trendline_core::domain::{Career, CareerId, CareerLevel};
use trendline_core::error::Result;
use trendline_core::port::{CareerCatalog, TimeProvider};

pub struct SqliteCareerCatalog {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteCareerCatalog {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }
}

#[async_trait]
impl CareerCatalog for SqliteCareerCatalog {
    async fn upsert(&self, career: &Career) -> Result<()> {
        career.validate()?;
        let now = self.time_provider.now_millis();
        let skills = serde_json::to_string(&career.skills)?;

        sqlx::query(
            r#"
            INSERT INTO careers (id, title, industry, level, skills, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                industry = excluded.industry,
                level = excluded.level,
                skills = excluded.skills,
                description = excluded.description,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&career.id)
        .bind(&career.title)
        .bind(&career.industry)
        .bind(career.level.as_code())
        .bind(&skills)
        .bind(&career.description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &CareerId) -> Result<Option<Career>> {
        let row = sqlx::query_as::<_, CareerRow>(
            "SELECT id, title, industry, level, skills, description FROM careers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(CareerRow::into_career).transpose()
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM careers")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

/// SQLite row representation of a catalog entry
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CareerRow {
    id: String,
    title: String,
    industry: String,
    level: String,
    skills: String, // JSON array
    description: String,
}

impl CareerRow {
    pub(crate) fn into_career(self) -> Result<Career> {
        let level: CareerLevel = self.level.parse()?;
        let skills: Vec<String> =
            serde_json::from_str(&self.skills).map_err(|e| corrupt_column("skills", e))?;
        Ok(Career {
            id: self.id,
            title: self.title,
            industry: self.industry,
            level,
            skills,
            description: self.description,
        })
    }
}
