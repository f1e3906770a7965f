// Career Catalog Port (Interface)

use crate::domain::{Career, CareerId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for the career catalog
#[async_trait]
pub trait CareerCatalog: Send + Sync {
    /// Insert or replace a career entry
    async fn upsert(&self, career: &Career) -> Result<()>;

    /// Find career by ID
    async fn find_by_id(&self, id: &CareerId) -> Result<Option<Career>>;

    /// Number of catalog entries
    async fn count(&self) -> Result<i64>;
}
