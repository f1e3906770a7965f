// Trendline Infrastructure - SQLite Adapter
// Implements: CareerCatalog, TrendStore (single / partitioned layouts), RunRepository

mod career_catalog;
mod connection;
mod error;
mod migration;
mod run_repository;
mod trend_store;

pub use career_catalog::SqliteCareerCatalog;
pub use connection::create_pool;
pub use migration::run_migrations;
pub use run_repository::SqliteRunRepository;
pub use trend_store::{validate_language, SqliteTrendStore, StorageLayout};
