//! Core types, configuration, and error handling for commitscope.
//!
//! This crate provides the shared foundation used by the other crates:
//! - [`ScopeError`] — unified error type using `thiserror`
//! - [`ScopeConfig`] — configuration loaded from `.commitscope.toml`
//! - Shared types: [`CommitRecord`], [`ClassifiedCommit`], [`Category`],
//!   [`SeverityLevel`], [`OutputFormat`]
//! - [`progress`] — progress reporting for per-commit stages

mod config;
mod error;
pub mod progress;
mod types;

pub use config::{ChartConfig, ClassifierConfig, HistoryConfig, OutputConfig, ScopeConfig, Timezone};
pub use error::ScopeError;
pub use types::{
    is_object_id, Category, ClassifiedCommit, CommitRecord, OutputFormat, SeverityLevel,
    CLASSIFIED_COLUMNS, HISTORY_COLUMNS,
};

/// A convenience `Result` type for commitscope operations.
pub type Result<T> = std::result::Result<T, ScopeError>;
