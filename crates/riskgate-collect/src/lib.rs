//! Git diff collection and history queries for riskgate.
//!
//! Uses git2 to build one immutable [`riskgate_core::DiffSnapshot`] per run
//! (unified diff text, per-file stats, statuses with rename detection,
//! untracked expansion) and to answer deep-mode churn queries. All reads are
//! side-effect-free; nothing here writes to the working tree.
//!
//! Concurrent invocations of the whole tool over the same working directory
//! are not safe: the underlying queries read live, mutable on-disk state
//! with no locking. That is acceptable for the single-operator interactive
//! use case.

pub mod churn;
pub mod hunks;
pub mod snapshot;

pub use churn::file_churn;
pub use hunks::parse_hunks;
pub use snapshot::{collect_snapshot, repo_context, RepoContext};
