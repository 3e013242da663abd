//! Infrastructure layer: configuration, record sources, query caching and
//! the catalog service the dashboard views call into.

pub mod catalog;
pub mod config;
pub mod query_cache;
pub mod source;

pub use catalog::{CatalogError, CatalogService};
pub use config::{CacheSettings, ConfigError, DashboardConfig};
pub use query_cache::{CacheSnapshot, QueryCache, QueryKey, QueryScope};
pub use source::{InMemoryRecordSource, RecordSource, SourceError, load_records, parse_records};
