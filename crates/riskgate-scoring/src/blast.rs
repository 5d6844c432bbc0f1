//! Blast-radius scoring: textual dependent search over the working tree.
//!
//! Dependents are found by substring match on module identifiers, not by
//! resolving imports. That overcounts (comments, strings, coincidental
//! names) and undercounts (aliased or dynamic imports); the attached
//! confidence flag reports the known hazards without changing the number.

use std::path::Path;

use ignore::WalkBuilder;
use riskgate_core::{BlastConfig, ClassifyConfig, Confidence, FileChange};
use serde::Serialize;

/// Files larger than this are skipped when building the source index.
const MAX_INDEXED_SIZE: u64 = 1_048_576;

/// One source file loaded into the in-memory index.
#[derive(Debug, Clone)]
pub struct IndexedFile {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    /// Full file content.
    pub content: String,
}

/// In-memory index of the repository's source files.
///
/// Built once per run and shared by the blast-radius and deep-analysis
/// passes so the tree is walked a single time.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    /// Indexed files, in walk order.
    pub files: Vec<IndexedFile>,
}

impl SourceIndex {
    /// Walk the repository under `root` and load every source file.
    ///
    /// Only files with a configured code extension are loaded. Files over
    /// 1 MiB, files that are not valid UTF-8, and files with a null byte in
    /// their first 8 KiB are skipped, as are gitignored paths (the walker
    /// honors `.gitignore`).
    pub fn build(root: &Path, classify: &ClassifyConfig) -> Self {
        let mut files = Vec::new();
        for entry in WalkBuilder::new(root).hidden(false).build().flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Ok(meta) = entry.metadata() {
                if meta.len() > MAX_INDEXED_SIZE {
                    continue;
                }
            }
            let rel = match path.strip_prefix(root) {
                Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };
            if !classify.is_code_file(&rel) || classify.is_ignored(&rel) {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(path) else {
                continue;
            };
            if looks_binary(&content) {
                continue;
            }
            files.push(IndexedFile { path: rel, content });
        }
        Self { files }
    }
}

fn looks_binary(content: &str) -> bool {
    let head = &content.as_bytes()[..content.len().min(8192)];
    head.contains(&0)
}

/// A dependent-count entry for one changed file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedFile {
    /// Changed file path.
    pub file: String,
    /// Number of distinct files referencing its module identifier.
    pub dependent_count: u64,
}

/// Blast-radius dimension result: 35% of the overall score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlastRadius {
    /// Bucketed dependent total (0–95).
    pub score: u32,
    /// Dimension weight in the overall blend (percent).
    pub weight: u32,
    /// Sum of per-file dependent counts.
    pub dependents_total: u64,
    /// Estimate reliability.
    pub confidence: Confidence,
    /// Up to ten changed files, most-depended-on first.
    pub top_affected: Vec<AffectedFile>,
}

impl BlastRadius {
    /// An empty result for the zero-change short circuit.
    pub fn empty() -> Self {
        Self {
            score: 0,
            weight: 35,
            dependents_total: 0,
            confidence: Confidence::High,
            top_affected: Vec::new(),
        }
    }
}

/// Estimate how much of the repository depends on the changed files.
///
/// For each changed source file, derive its module identifier (extension
/// stripped, trailing `/index` collapsed onto the parent directory) and
/// count the index files whose content mentions the identifier's base name
/// or, for nested identifiers, the full path. Buckets:
///
/// | dependents | score |
/// |-----------:|------:|
/// | 0          | 0     |
/// | 1–3        | 15    |
/// | 4–10       | 35    |
/// | 11–25      | 60    |
/// | 26–50      | 80    |
/// | >50        | 95    |
pub fn score_blast_radius(
    root: &Path,
    index: &SourceIndex,
    files: &[FileChange],
    classify: &ClassifyConfig,
    blast: &BlastConfig,
) -> BlastRadius {
    let code_files: Vec<&FileChange> = files
        .iter()
        .filter(|f| classify.is_code_file(&f.path) && !classify.is_ignored(&f.path))
        .collect();

    if code_files.is_empty() {
        return BlastRadius::empty();
    }

    let mut affected = Vec::new();
    let mut total: u64 = 0;
    for change in &code_files {
        let count = count_dependents(index, &change.path, classify);
        total += count;
        affected.push(AffectedFile {
            file: change.path.clone(),
            dependent_count: count,
        });
    }

    let score = crate::band(
        total,
        &[(0, 0), (3, 15), (10, 35), (25, 60), (50, 80)],
        95,
    );

    affected.sort_by(|a, b| b.dependent_count.cmp(&a.dependent_count));
    affected.truncate(10);

    BlastRadius {
        score,
        weight: 35,
        dependents_total: total,
        confidence: assess_confidence(root, index, blast),
        top_affected: affected,
    }
}

/// Count distinct index files that reference `path`'s module identifier.
///
/// The changed file itself and ignored paths never count. A file matching
/// several patterns counts once.
pub fn count_dependents(index: &SourceIndex, path: &str, classify: &ClassifyConfig) -> u64 {
    let Some(module) = derive_module_id(path) else {
        return 0;
    };
    let patterns = reference_patterns(&module);

    index
        .files
        .iter()
        .filter(|f| f.path != path && !classify.is_ignored(&f.path))
        .filter(|f| patterns.iter().any(|p| f.content.contains(p)))
        .count() as u64
}

/// Strip the extension and collapse a trailing `/index` segment.
///
/// Returns `None` for extensionless paths; they have no usable identifier.
fn derive_module_id(path: &str) -> Option<String> {
    let dot = path.rfind('.')?;
    let base = &path[..dot];
    let module = base.strip_suffix("/index").unwrap_or(base);
    if module.is_empty() {
        return None;
    }
    Some(module.to_string())
}

fn reference_patterns(module: &str) -> Vec<String> {
    let basename = module.rsplit('/').next().unwrap_or(module);
    let mut patterns = vec![basename.to_string()];
    if module.contains('/') {
        patterns.push(module.to_string());
    }
    patterns
}

fn assess_confidence(root: &Path, index: &SourceIndex, blast: &BlastConfig) -> Confidence {
    let dynamic = index.files.iter().any(|f| {
        blast
            .dynamic_import_markers
            .iter()
            .any(|m| f.content.contains(m))
    });
    if dynamic {
        return Confidence::Low;
    }
    if blast.monorepo_markers.iter().any(|m| root.join(m).exists()) {
        return Confidence::Medium;
    }
    Confidence::High
}
