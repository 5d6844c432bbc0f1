//! Core types, configuration, and error handling for riskgate.
//!
//! This crate provides the shared foundation used by the collector and
//! scoring crates:
//! - [`RiskgateError`] — unified error type using `thiserror`
//! - [`RiskgateConfig`] — configuration loaded from `.riskgate.toml`
//! - The diff data model: [`DiffSnapshot`], [`Hunk`], [`FileChange`],
//!   [`FileStat`], [`Rename`]
//! - The scoring vocabulary: [`Signal`], [`SignalKind`], [`RiskLevel`],
//!   [`Gate`], [`Confidence`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{BlastConfig, ClassifyConfig, DeepConfig, RiskgateConfig};
pub use error::RiskgateError;
pub use types::{
    Confidence, DiffSnapshot, FileChange, FileStat, FileStatus, Gate, Hunk, OutputFormat, Rename,
    RiskLevel, Signal, SignalKind,
};

/// A convenience `Result` type for riskgate operations.
pub type Result<T> = std::result::Result<T, RiskgateError>;
