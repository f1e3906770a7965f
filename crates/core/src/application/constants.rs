// Application constants (No magic values)
use std::time::Duration;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

/// Default lifetime of a cached generation (1 week)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(7 * DAY);

/// Lifetime of career and market-data lookups (1 day)
pub const MARKET_DATA_CACHE_TTL: Duration = Duration::from_secs(DAY);

/// Lifetime of career search results (1 hour)
pub const SEARCH_CACHE_TTL: Duration = Duration::from_secs(HOUR);

/// Lifetime of canned fallback content, so a provider outage is not served
/// for a full endpoint TTL after recovery (5 minutes)
pub const FALLBACK_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Lifetime of generated roadmaps (1 week)
pub const ROADMAP_CACHE_TTL: Duration = Duration::from_secs(7 * DAY);

/// A trend record older than this is due for refresh (30 days)
pub const REFRESH_PERIOD: Duration = Duration::from_secs(30 * DAY);

/// Maximum careers refreshed per run
pub const DEFAULT_BATCH_SIZE: u32 = 100;

/// Pause between two items of a run, keeps the provider under its rate ceiling (1s)
pub const ITEM_DELAY: Duration = Duration::from_secs(1);

/// Sleep between two due-checks of the continuous loop (24h)
pub const IDLE_SLEEP_DURATION: Duration = Duration::from_secs(DAY);

/// Sleep after a loop-level error before retrying (1h)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(HOUR);

/// Time the daemon waits for the scheduler to wind down (5s)
pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Languages trend text is translated into, besides the base language
pub const DEFAULT_LANGUAGES: [&str; 5] = ["en", "ja", "de", "es", "fr"];

/// Base language of generated text
pub const BASE_LANGUAGE: &str = "en";
