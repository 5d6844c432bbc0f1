//! Breaking-surface scoring: detect likely public-contract breaks in hunks.
//!
//! This is a best-effort pattern-matching tier, not a parser. Malformed or
//! unexpected syntax yields no signal rather than an error, and exact-text
//! comparisons (signatures in particular) are a known source of false
//! positives. If higher precision is wanted, swap the implementation behind
//! the same interface per language.

use std::sync::LazyLock;

use regex::Regex;
use riskgate_core::{ClassifyConfig, FileChange, FileStatus, Hunk, Signal, SignalKind};
use serde::Serialize;

static EXPORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*export\s+(function|const|class|default|let|var|type|interface|enum)\b")
        .expect("export declaration pattern")
});

static EXPORT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+(?:function|const|class|let|var|type|interface|enum)\s+(\w+)")
        .expect("export name pattern")
});

static FN_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:async\s+)?function\s+(\w+)\s*\(([^)]*)\)")
        .expect("function declaration pattern")
});

static METHOD_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:async\s+)?(\w+)\s*\(([^)]*)\)\s*[\{:]")
        .expect("method declaration pattern")
});

static TYPE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+(\w+)\s*\??\s*:").expect("type field pattern"));

static CONFIG_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*"?(\w[\w.-]*)"?\s*[=:]"#).expect("config key pattern")
});

/// Breaking-surface dimension result: 45% of the overall score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingSurface {
    /// Capped sum of signal weights (0–100).
    pub score: u32,
    /// Dimension weight in the overall blend (percent).
    pub weight: u32,
    /// Individual findings, in detection order.
    pub signals: Vec<Signal>,
}

impl BreakingSurface {
    /// An empty result for the zero-change short circuit.
    pub fn empty() -> Self {
        Self {
            score: 0,
            weight: 45,
            signals: Vec::new(),
        }
    }
}

/// Score the breaking surface of a change set.
///
/// Four independent checks run per hunk (a hunk can contribute several
/// signal kinds): export removal/rename, signature change (source files
/// only), type-field removal, and config-key removal. Independently of
/// hunks, every deleted source module emits its own signal. The score is
/// the weight sum capped at 100; the cap never reduces individual signals.
///
/// Known precision limit, kept deliberately: a removed export with *any*
/// added export lines in the same hunk is presumed renamed, even when the
/// additions are unrelated.
///
/// # Examples
///
/// ```
/// use riskgate_core::{ClassifyConfig, Hunk, SignalKind};
/// use riskgate_scoring::breaking::score_breaking_surface;
///
/// let hunk = Hunk {
///     file: Some("src/api.ts".into()),
///     removed: vec!["export function foo() { return 1; }".into()],
///     added: vec![],
/// };
/// let result = score_breaking_surface(&[hunk], &[], &ClassifyConfig::default());
/// assert_eq!(result.signals[0].kind, SignalKind::ExportRemoved);
/// assert_eq!(result.score, 15);
/// ```
pub fn score_breaking_surface(
    hunks: &[Hunk],
    files: &[FileChange],
    classify: &ClassifyConfig,
) -> BreakingSurface {
    let mut signals = Vec::new();

    for hunk in hunks {
        let Some(file) = hunk.file.as_deref() else {
            continue;
        };

        check_exports(hunk, file, &mut signals);
        if classify.is_code_file(file) {
            check_signatures(hunk, file, &mut signals);
        }
        check_type_fields(hunk, file, &mut signals);
    }

    for hunk in hunks {
        let Some(file) = hunk.file.as_deref() else {
            continue;
        };
        if classify.is_config_file(file) {
            check_config_keys(hunk, file, &mut signals);
        }
    }

    for f in files {
        if f.status == FileStatus::Deleted
            && classify.is_code_file(&f.path)
            && !classify.is_ignored(&f.path)
        {
            signals.push(Signal::new(
                SignalKind::ModuleDeleted,
                f.path.clone(),
                format!("Module deleted: {}", f.path),
            ));
        }
    }

    let raw: u32 = signals.iter().map(|s| s.weight).sum();
    BreakingSurface {
        score: raw.min(100),
        weight: 45,
        signals,
    }
}

fn check_exports(hunk: &Hunk, file: &str, signals: &mut Vec<Signal>) {
    let removed_exports: Vec<&String> = hunk
        .removed
        .iter()
        .filter(|l| EXPORT_DECL.is_match(l))
        .collect();
    let added_exports: Vec<&String> = hunk
        .added
        .iter()
        .filter(|l| EXPORT_DECL.is_match(l))
        .collect();

    for removed in removed_exports {
        let removed_name = EXPORT_NAME
            .captures(removed)
            .map(|c| c.get(1).expect("name group").as_str());

        let re_added = removed_name
            .map(|name| added_exports.iter().any(|a| a.contains(name)))
            .unwrap_or(false);
        if re_added {
            continue;
        }

        // Asymmetry with additions present is presumed to be a rename
        if let (Some(name), false) = (removed_name, added_exports.is_empty()) {
            signals.push(Signal::new(
                SignalKind::ExportRenamed,
                file,
                format!("Export '{name}' renamed"),
            ));
        } else {
            let summary: String = removed.trim().chars().take(80).collect();
            signals.push(Signal::new(
                SignalKind::ExportRemoved,
                file,
                format!("Export removed: {summary}"),
            ));
        }
    }
}

fn check_signatures(hunk: &Hunk, file: &str, signals: &mut Vec<Signal>) {
    let removed = extract_signatures(&hunk.removed);
    let added = extract_signatures(&hunk.added);

    for (name, old_params) in &removed {
        if let Some((_, new_params)) = added.iter().find(|(n, _)| n == name) {
            // Exact text comparison, whitespace included
            if new_params != old_params {
                signals.push(Signal::new(
                    SignalKind::SignatureChanged,
                    file,
                    format!("'{name}' params changed: ({old_params}) -> ({new_params})"),
                ));
            }
        }
    }
}

/// Extract `name -> parameter-list-text` pairs from changed lines.
///
/// Two declaration shapes are recognized: a `function` keyword form and a
/// bare `name(params) {` method-like form. Later duplicates of a name
/// overwrite the parameter text but keep the first position, so output
/// order is deterministic.
fn extract_signatures(lines: &[String]) -> Vec<(String, String)> {
    let mut sigs: Vec<(String, String)> = Vec::new();
    for line in lines {
        let captured = FN_DECL
            .captures(line)
            .or_else(|| METHOD_DECL.captures(line));
        let Some(caps) = captured else {
            continue;
        };
        let name = caps.get(1).expect("name group").as_str().to_string();
        let params = caps.get(2).expect("params group").as_str().trim().to_string();
        match sigs.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = params,
            None => sigs.push((name, params)),
        }
    }
    sigs
}

fn check_type_fields(hunk: &Hunk, file: &str, signals: &mut Vec<Signal>) {
    let added_fields: Vec<&str> = hunk
        .added
        .iter()
        .filter_map(|l| TYPE_FIELD.captures(l))
        .map(|c| c.get(1).expect("field group").as_str())
        .collect();

    for removed in &hunk.removed {
        let Some(caps) = TYPE_FIELD.captures(removed) else {
            continue;
        };
        let name = caps.get(1).expect("field group").as_str();
        if !added_fields.contains(&name) {
            signals.push(Signal::new(
                SignalKind::TypeFieldRemoved,
                file,
                format!("Field '{name}' removed"),
            ));
        }
    }
}

fn check_config_keys(hunk: &Hunk, file: &str, signals: &mut Vec<Signal>) {
    for removed in &hunk.removed {
        let Some(caps) = CONFIG_KEY.captures(removed) else {
            continue;
        };
        let key = caps.get(1).expect("key group").as_str();
        let re_added = hunk.added.iter().any(|a| a.contains(key));
        if !re_added {
            signals.push(Signal::new(
                SignalKind::ConfigKeyRemoved,
                file,
                format!("Config key '{key}' removed"),
            ));
        }
    }
}
