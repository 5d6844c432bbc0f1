//! Change-scope scoring: how big and how spread out the change is.

use std::collections::BTreeSet;

use riskgate_core::{ClassifyConfig, FileChange, FileStat, Rename};
use serde::Serialize;

/// Raw size metrics backing the change-scope score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeMetrics {
    /// Changed files after ignore filtering.
    pub file_count: u64,
    /// Total lines added plus deleted, over all files.
    pub loc_delta: u64,
    /// Distinct parent directories among the counted files.
    pub dir_span: u64,
    /// Renames divided by counted files, rounded to two decimals.
    pub rename_ratio: f64,
}

/// Change-scope dimension result: 20% of the overall score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeScope {
    /// Weighted blend of the four metric sub-scores (0–100).
    pub score: u32,
    /// Dimension weight in the overall blend (percent).
    pub weight: u32,
    /// The raw metrics, for the report.
    pub metrics: ScopeMetrics,
}

impl ChangeScope {
    /// An empty result for the zero-change short circuit.
    pub fn empty() -> Self {
        Self {
            score: 0,
            weight: 20,
            metrics: ScopeMetrics {
                file_count: 0,
                loc_delta: 0,
                dir_span: 0,
                rename_ratio: 0.0,
            },
        }
    }
}

/// Score the size and spread of a change set.
///
/// File count and directory span ignore filtered paths; the LOC delta
/// deliberately does not, so a large generated-file diff still registers
/// as churn. Sub-scores blend as `fc*30 + loc*30 + dirs*20 + ratio*20`,
/// divided by 100 and rounded half-up.
pub fn score_change_scope(
    stats: &[FileStat],
    files: &[FileChange],
    renames: &[Rename],
    classify: &ClassifyConfig,
) -> ChangeScope {
    let counted: Vec<&FileChange> = files
        .iter()
        .filter(|f| !classify.is_ignored(&f.path))
        .collect();

    let file_count = counted.len() as u64;
    let loc_delta: u64 = stats.iter().map(|s| s.added + s.deleted).sum();
    let dirs: BTreeSet<&str> = counted.iter().map(|f| parent_dir(&f.path)).collect();
    let dir_span = dirs.len() as u64;
    let rename_ratio = if file_count > 0 {
        renames.len() as f64 / file_count as f64
    } else {
        0.0
    };

    let fc_score = crate::band(file_count, &[(3, 10), (10, 30), (25, 60)], 90);
    let loc_score = crate::band(loc_delta, &[(50, 10), (200, 30), (500, 60)], 90);
    let dir_score = crate::band(dir_span, &[(1, 0), (3, 20), (6, 50)], 80);
    // Banded on the raw ratio; only the reported metric is rounded
    let ratio_score = rename_ratio_score(rename_ratio);

    let blended = (fc_score * 30 + loc_score * 30 + dir_score * 20 + ratio_score * 20) as f64;
    let score = (blended / 100.0).round() as u32;

    ChangeScope {
        score,
        weight: 20,
        metrics: ScopeMetrics {
            file_count,
            loc_delta,
            dir_span,
            rename_ratio: (rename_ratio * 100.0).round() / 100.0,
        },
    }
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => ".",
    }
}

fn rename_ratio_score(ratio: f64) -> u32 {
    if ratio == 0.0 {
        0
    } else if ratio < 0.3 {
        10
    } else if ratio <= 0.7 {
        30
    } else {
        50
    }
}
