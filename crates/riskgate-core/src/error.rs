/// Errors that can occur across riskgate.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary maps [`RiskgateError::InvalidBaseRef`] and other
/// fatal errors to the reserved exit code 2 at the boundary.
///
/// # Examples
///
/// ```
/// use riskgate_core::RiskgateError;
///
/// let err = RiskgateError::InvalidBaseRef("no-such-ref".into());
/// assert!(err.to_string().contains("no-such-ref"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RiskgateError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The supplied base reference does not resolve to a revision.
    ///
    /// Fatal: no partial assessment is produced. The binary maps this to
    /// exit code 2, which happens to collide with the Critical-risk exit
    /// code; callers disambiguate via the stderr message.
    #[error("invalid base ref: {0}")]
    InvalidBaseRef(String),

    /// Git operation failure (not a repository, unreadable object, ...).
    #[error("git error: {0}")]
    Git(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Diff or pattern parsing failure.
    #[error("parse error: {0}")]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
