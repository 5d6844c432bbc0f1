//! Deep-mode analysis: history hotspots and a rough transitive estimate.
//!
//! Deep mode trades runtime for context. The extra findings are advisory
//! and never alter the numeric score or the gate.

use std::collections::BTreeMap;

use riskgate_core::{ClassifyConfig, DeepConfig, FileChange};
use serde::Serialize;

use crate::blast::{count_dependents, BlastRadius, SourceIndex};

/// A changed file that is both frequently edited and widely depended on.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Changed file path.
    pub file: String,
    /// Commits touching it inside the churn window.
    pub commits: u32,
    /// Direct dependent count from the blast pass.
    pub dependents: u64,
}

/// Deep-mode findings attached to the report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepAnalysis {
    /// Files exceeding both hotspot thresholds.
    pub hotspots: Vec<Hotspot>,
    /// Rough count of second-degree dependents.
    pub transitive_count: u64,
    /// Per-file commit counts inside the churn window.
    pub churn_summary: BTreeMap<String, u32>,
}

/// Combine churn counts with blast-radius data into deep findings.
///
/// Only the first `max_files` changed source files are considered; `churn`
/// is the per-path commit count already gathered for them. A file is a
/// hotspot when its commit count exceeds `hotspot_churn` and its dependent
/// count exceeds `hotspot_dependents` (both strict).
///
/// The transitive estimate asks, for each directly-depended-on file, how
/// many index files mention its own module identifier, and accumulates the
/// surplus over the direct count. It is an upper-bound hint, not a closure.
pub fn deep_analysis(
    index: &SourceIndex,
    files: &[FileChange],
    blast: &BlastRadius,
    churn: &BTreeMap<String, u32>,
    classify: &ClassifyConfig,
    deep: &DeepConfig,
) -> DeepAnalysis {
    let targets: Vec<&FileChange> = files
        .iter()
        .filter(|f| classify.is_code_file(&f.path) && !classify.is_ignored(&f.path))
        .take(deep.max_files)
        .collect();

    let mut hotspots = Vec::new();
    let mut churn_summary = BTreeMap::new();
    for change in &targets {
        let commits = churn.get(&change.path).copied().unwrap_or(0);
        churn_summary.insert(change.path.clone(), commits);

        let dependents = blast
            .top_affected
            .iter()
            .find(|a| a.file == change.path)
            .map(|a| a.dependent_count)
            .unwrap_or_else(|| count_dependents(index, &change.path, classify));

        if commits > deep.hotspot_churn && dependents > deep.hotspot_dependents {
            hotspots.push(Hotspot {
                file: change.path.clone(),
                commits,
                dependents,
            });
        }
    }

    let transitive_count = estimate_transitive(index, blast, classify);

    DeepAnalysis {
        hotspots,
        transitive_count,
        churn_summary,
    }
}

fn estimate_transitive(
    index: &SourceIndex,
    blast: &BlastRadius,
    classify: &ClassifyConfig,
) -> u64 {
    let mut total: u64 = 0;
    for affected in &blast.top_affected {
        if affected.dependent_count == 0 {
            continue;
        }
        let second_degree = count_dependents(index, &affected.file, classify);
        // Subtract the direct dependents and the file itself
        total += second_degree.saturating_sub(affected.dependent_count + 1);
    }
    total
}
