// Port Layer - Interfaces for external dependencies

pub mod cache_backend;
pub mod career_catalog;
pub mod completion;
pub mod id_provider; // For deterministic testing
pub mod run_repository;
pub mod time_provider;
pub mod translator;
pub mod trend_store;

// Re-exports
pub use cache_backend::{CacheBackend, CacheError};
pub use career_catalog::CareerCatalog;
pub use completion::{CompletionProvider, UpstreamError};
pub use id_provider::IdProvider;
pub use run_repository::RunRepository;
pub use time_provider::TimeProvider;
pub use translator::{Translations, Translator};
pub use trend_store::{TrendStats, TrendStore};
