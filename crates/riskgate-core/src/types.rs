use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status of a changed file relative to the base revision.
///
/// # Examples
///
/// ```
/// use riskgate_core::FileStatus;
///
/// assert_eq!(FileStatus::Added.to_string(), "added");
/// assert_eq!(FileStatus::Renamed.to_string(), "renamed");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// New file (tracked or untracked).
    Added,
    /// Existing file modified in place.
    Modified,
    /// File removed.
    Deleted,
    /// File renamed from another path.
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "added"),
            FileStatus::Modified => write!(f, "modified"),
            FileStatus::Deleted => write!(f, "deleted"),
            FileStatus::Renamed => write!(f, "renamed"),
        }
    }
}

/// A changed file with its status.
///
/// For renames, `path` is the new (canonical) path and `old_path` holds the
/// previous one. All paths are relative to the repository root and use `/`
/// separators.
///
/// # Examples
///
/// ```
/// use riskgate_core::{FileChange, FileStatus};
///
/// let change = FileChange {
///     status: FileStatus::Renamed,
///     path: "src/new.ts".into(),
///     old_path: Some("src/old.ts".into()),
/// };
/// assert_eq!(change.path, "src/new.ts");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    /// Type of change.
    pub status: FileStatus,
    /// Path relative to the repository root (new path for renames).
    pub path: String,
    /// Previous path, set only for renames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
}

/// Per-file added/deleted line counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStat {
    /// Path relative to the repository root.
    pub path: String,
    /// Lines added.
    pub added: u64,
    /// Lines deleted.
    pub deleted: u64,
}

/// A rename recorded in the diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rename {
    /// Path before the rename.
    pub from: String,
    /// Path after the rename.
    pub to: String,
}

/// A contiguous block of changed lines from a unified diff, scoped to one
/// file.
///
/// `file` is `None` for hunks that appear before any file header; such hunks
/// are unattributable and scorers skip file-scoped checks for them. Line
/// markers (`+`/`-`) are already stripped; context lines are not retained.
///
/// # Examples
///
/// ```
/// use riskgate_core::Hunk;
///
/// let hunk = Hunk {
///     file: Some("src/lib.ts".into()),
///     removed: vec!["export function foo() {}".into()],
///     added: vec![],
/// };
/// assert_eq!(hunk.removed.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// File the hunk belongs to, if a file header preceded it.
    pub file: Option<String>,
    /// Removed lines, leading `-` stripped.
    pub removed: Vec<String>,
    /// Added lines, leading `+` stripped.
    pub added: Vec<String>,
}

/// Immutable result of one diff collection pass.
///
/// Created fresh per invocation and never mutated after construction; no
/// state persists across runs.
#[derive(Debug, Clone)]
pub struct DiffSnapshot {
    /// Parsed hunks, in diff order.
    pub hunks: Vec<Hunk>,
    /// Per-file line counts.
    pub stats: Vec<FileStat>,
    /// Changed files with statuses.
    pub files: Vec<FileChange>,
    /// Detected renames.
    pub renames: Vec<Rename>,
    /// Raw unified diff text the hunks were parsed from.
    pub diff_text: String,
}

/// Kind of breaking-change signal.
///
/// Serialized in kebab-case to match the report schema
/// (`"export-removed"`, `"signature-changed"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    /// An exported declaration was removed with no replacement.
    ExportRemoved,
    /// An exported declaration was removed while other exports were added.
    ExportRenamed,
    /// A function kept its name but changed its parameter list.
    SignatureChanged,
    /// A field disappeared from a type or interface body.
    TypeFieldRemoved,
    /// A key disappeared from a configuration file.
    ConfigKeyRemoved,
    /// A whole source module was deleted.
    ModuleDeleted,
}

impl SignalKind {
    /// Fixed additive weight for this signal kind.
    ///
    /// Weights are points, not probabilities; the breaking-surface score
    /// caps the displayed sum at 100 without reducing individual signals.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgate_core::SignalKind;
    ///
    /// assert_eq!(SignalKind::ExportRemoved.weight(), 15);
    /// assert_eq!(SignalKind::ModuleDeleted.weight(), 20);
    /// ```
    pub fn weight(self) -> u32 {
        match self {
            SignalKind::ExportRemoved => 15,
            SignalKind::ExportRenamed => 10,
            SignalKind::SignatureChanged => 10,
            SignalKind::TypeFieldRemoved => 8,
            SignalKind::ConfigKeyRemoved => 5,
            SignalKind::ModuleDeleted => 20,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::ExportRemoved => write!(f, "export-removed"),
            SignalKind::ExportRenamed => write!(f, "export-renamed"),
            SignalKind::SignatureChanged => write!(f, "signature-changed"),
            SignalKind::TypeFieldRemoved => write!(f, "type-field-removed"),
            SignalKind::ConfigKeyRemoved => write!(f, "config-key-removed"),
            SignalKind::ModuleDeleted => write!(f, "module-deleted"),
        }
    }
}

/// An immutable breaking-change finding.
///
/// # Examples
///
/// ```
/// use riskgate_core::{Signal, SignalKind};
///
/// let signal = Signal::new(
///     SignalKind::ExportRemoved,
///     "src/api.ts",
///     "Export removed: export function login()",
/// );
/// assert_eq!(signal.weight, 15);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// Kind of finding.
    #[serde(rename = "type")]
    pub kind: SignalKind,
    /// File the finding refers to.
    pub file: String,
    /// Human-readable detail.
    pub detail: String,
    /// Additive weight, fixed per kind.
    pub weight: u32,
}

impl Signal {
    /// Build a signal with the weight implied by its kind.
    pub fn new(kind: SignalKind, file: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.into(),
            detail: detail.into(),
            weight: kind.weight(),
        }
    }
}

/// Categorical risk classification of the overall score.
///
/// Bands are half-open with the lower bound inclusive: `<30` Low,
/// `<50` Medium, `<75` High, else Critical.
///
/// # Examples
///
/// ```
/// use riskgate_core::RiskLevel;
///
/// assert_eq!(RiskLevel::from_score(29), RiskLevel::Low);
/// assert_eq!(RiskLevel::from_score(30), RiskLevel::Medium);
/// assert_eq!(RiskLevel::from_score(75), RiskLevel::Critical);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Score 0–29.
    Low,
    /// Score 30–49.
    Medium,
    /// Score 50–74.
    High,
    /// Score 75–100.
    Critical,
}

impl RiskLevel {
    /// Map an overall score to a risk level.
    pub fn from_score(score: u32) -> Self {
        if score < 30 {
            RiskLevel::Low
        } else if score < 50 {
            RiskLevel::Medium
        } else if score < 75 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// Map this level to its gate decision.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgate_core::{Gate, RiskLevel};
    ///
    /// assert_eq!(RiskLevel::Medium.gate(), Gate::Pass);
    /// assert_eq!(RiskLevel::High.gate(), Gate::Review);
    /// assert_eq!(RiskLevel::Critical.gate(), Gate::Block);
    /// ```
    pub fn gate(self) -> Gate {
        match self {
            RiskLevel::Low | RiskLevel::Medium => Gate::Pass,
            RiskLevel::High => Gate::Review,
            RiskLevel::Critical => Gate::Block,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Critical => write!(f, "Critical"),
        }
    }
}

/// Pass/review/block decision derived from the risk level.
///
/// Exit codes: PASS 0, REVIEW 1, BLOCK 2. The BLOCK exit code shares its
/// value with the fatal invalid-base-ref code; the two paths stay distinct
/// (report on stdout vs error on stderr) rather than introducing a new code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gate {
    /// Low or Medium risk; proceed.
    Pass,
    /// High risk; human review recommended.
    Review,
    /// Critical risk; stop and split the change.
    Block,
}

impl Gate {
    /// Process exit code for this gate.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgate_core::Gate;
    ///
    /// assert_eq!(Gate::Pass.exit_code(), 0);
    /// assert_eq!(Gate::Review.exit_code(), 1);
    /// assert_eq!(Gate::Block.exit_code(), 2);
    /// ```
    pub fn exit_code(self) -> i32 {
        match self {
            Gate::Pass => 0,
            Gate::Review => 1,
            Gate::Block => 2,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Pass => write!(f, "PASS"),
            Gate::Review => write!(f, "REVIEW"),
            Gate::Block => write!(f, "BLOCK"),
        }
    }
}

/// Reliability flag for the blast-radius estimate.
///
/// Advisory metadata only; never changes the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// No known precision hazards detected.
    High,
    /// Monorepo markers present; cross-package references may be missed.
    Medium,
    /// Dynamic imports present anywhere in the repository.
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Output format for the CLI.
///
/// Implements [`FromStr`] so it can be used directly with `clap`.
///
/// # Examples
///
/// ```
/// use riskgate_core::OutputFormat;
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted report.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
