//! Shared types, error model, and configuration for nsrecords.
//!
//! This crate is the foundation depended on by all other nsrecords crates.
//! It provides:
//! - [`NsRecordsError`]: the unified error type
//! - Domain types ([`RecordEntry`], [`FieldDescriptor`], [`CrawlResult`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, DEFAULT_START_URL, DebugConfig, DebugSection, DefaultsConfig,
    DiscoveryConfig, LinkFilterConfig, PageSourceKind, TimingConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{NsRecordsError, Result};
pub use types::{CrawlResult, FieldDescriptor, RecordEntry};
