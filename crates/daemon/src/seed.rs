//! Career catalog seeding from a JSON file

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};
use trendline_core::domain::Career;
use trendline_core::port::CareerCatalog;

/// Upsert every entry of a JSON array of careers.
/// Invalid entries are skipped; returns the number stored.
pub async fn seed_catalog(catalog: &dyn CareerCatalog, path: &Path) -> Result<usize> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let careers: Vec<Career> = serde_json::from_str(&raw)
        .with_context(|| format!("Seed file {} is not a career list", path.display()))?;

    let mut stored = 0;
    for career in &careers {
        match catalog.upsert(career).await {
            Ok(()) => stored += 1,
            Err(e) => warn!(career_id = %career.id, error = %e, "Skipping seed entry"),
        }
    }

    info!(path = %path.display(), stored, total = careers.len(), "Career catalog seeded");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trendline_core::port::time_provider::mocks::MockTimeProvider;
    use trendline_infra_sqlite::{create_pool, run_migrations, SqliteCareerCatalog};

    async fn catalog() -> SqliteCareerCatalog {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteCareerCatalog::new(pool, Arc::new(MockTimeProvider::new(1_700_000_000_000)))
    }

    fn write_seed(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "trendline-seed-{}-{}.json",
            name,
            std::process::id()
        ));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_seed_skips_invalid_entries() {
        let catalog = catalog().await;
        let path = write_seed(
            "mixed",
            r#"[
                {"id": "data-scientist", "title": "Data Scientist", "industry": "tech", "level": "A",
                 "skills": ["Python", "SQL"]},
                {"id": "nurse", "title": "Registered Nurse", "industry": "healthcare", "level": "E"},
                {"id": "blank", "title": " ", "industry": "tech", "level": "E"}
            ]"#,
        );

        let stored = seed_catalog(&catalog, &path).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(stored, 2);
        assert_eq!(catalog.count().await.unwrap(), 2);
        let ds = catalog
            .find_by_id(&"data-scientist".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ds.skills, vec!["Python", "SQL"]);
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let catalog = catalog().await;
        let path = write_seed(
            "repeat",
            r#"[{"id": "swe", "title": "Software Engineer", "industry": "tech", "level": "I"}]"#,
        );

        seed_catalog(&catalog, &path).await.unwrap();
        seed_catalog(&catalog, &path).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(catalog.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seed_rejects_malformed_file() {
        let catalog = catalog().await;
        let path = write_seed("broken", r#"{"id": "swe"}"#);

        let result = seed_catalog(&catalog, &path).await;
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
        assert!(seed_catalog(&catalog, Path::new("/nonexistent/seed.json"))
            .await
            .is_err());
    }
}
