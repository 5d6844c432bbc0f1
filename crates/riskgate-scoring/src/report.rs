//! Final risk assessment: weighted aggregation, gating, and rendering.

use std::fmt;

use riskgate_core::{Gate, RiskLevel};
use serde::Serialize;

use crate::blast::BlastRadius;
use crate::breaking::BreakingSurface;
use crate::deep::DeepAnalysis;
use crate::flags::{MigrationSafety, RegressionHint};
use crate::scope::ChangeScope;

/// Report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Repository identity stamped into the report header.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoInfo {
    /// Repository directory name.
    pub repo: String,
    /// Current branch short name, or `detached`.
    pub branch: String,
    /// Abbreviated HEAD commit id, or `unknown`.
    pub head: String,
}

/// The three scored dimensions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    /// Breaking-surface result (45%).
    pub breaking_surface: BreakingSurface,
    /// Blast-radius result (35%).
    pub blast_radius: BlastRadius,
    /// Change-scope result (20%).
    pub change_scope: ChangeScope,
}

/// Advisory flags attached to the report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    /// Migration-safety advisory.
    pub migration_safety: MigrationSafety,
    /// Regression placeholder.
    pub regression_hint: RegressionHint,
}

/// A recommended follow-up derived from the findings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAction {
    /// Short imperative description.
    pub action: String,
    /// Command to run, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Why this is recommended.
    pub reason: String,
}

/// Complete assessment for one invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Report schema version.
    pub version: u32,
    /// Repository directory name.
    pub repo: String,
    /// Current branch short name.
    pub branch: String,
    /// Abbreviated HEAD commit id.
    pub head: String,
    /// Analysis mode (`fast` or `deep`).
    pub mode: String,
    /// Base revision the diff was taken against.
    pub base: String,
    /// Weighted blend of the three dimension scores (0–100).
    pub overall_score: u32,
    /// Categorical classification of the overall score.
    pub risk_level: RiskLevel,
    /// Per-dimension results.
    pub dimensions: Dimensions,
    /// Advisory flags.
    pub flags: Flags,
    /// Deep-mode findings, present only in deep mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_analysis: Option<DeepAnalysis>,
    /// Gate decision.
    pub gate: Gate,
    /// Recommended follow-ups.
    pub next_actions: Vec<NextAction>,
}

/// Blend the three dimension scores: 45% breaking, 35% blast, 20% scope,
/// rounded half-up.
///
/// # Examples
///
/// ```
/// use riskgate_scoring::report::overall_score;
///
/// assert_eq!(overall_score(100, 100, 100), 100);
/// assert_eq!(overall_score(50, 50, 50), 50);
/// assert_eq!(overall_score(15, 0, 6), 8);
/// ```
pub fn overall_score(breaking: u32, blast: u32, scope: u32) -> u32 {
    (0.45 * breaking as f64 + 0.35 * blast as f64 + 0.20 * scope as f64).round() as u32
}

impl RiskAssessment {
    /// Assemble a report from the dimension results and flags.
    pub fn build(
        info: RepoInfo,
        mode: &str,
        base: &str,
        breaking: BreakingSurface,
        blast: BlastRadius,
        scope: ChangeScope,
        migration: MigrationSafety,
        deep: Option<DeepAnalysis>,
    ) -> Self {
        let score = overall_score(breaking.score, blast.score, scope.score);
        let level = RiskLevel::from_score(score);
        let gate = level.gate();
        let next_actions = recommend(mode, level, &breaking, &blast, &migration);

        Self {
            version: REPORT_VERSION,
            repo: info.repo,
            branch: info.branch,
            head: info.head,
            mode: mode.to_string(),
            base: base.to_string(),
            overall_score: score,
            risk_level: level,
            dimensions: Dimensions {
                breaking_surface: breaking,
                blast_radius: blast,
                change_scope: scope,
            },
            flags: Flags {
                migration_safety: migration,
                regression_hint: RegressionHint::default(),
            },
            deep_analysis: deep,
            gate,
            next_actions,
        }
    }

    /// A zero-score report for an empty change set: Low risk, PASS, no
    /// signals, no recommendations.
    pub fn zero(info: RepoInfo, mode: &str, base: &str) -> Self {
        Self::build(
            info,
            mode,
            base,
            BreakingSurface::empty(),
            BlastRadius::empty(),
            ChangeScope::empty(),
            MigrationSafety::empty(),
            None,
        )
    }

    /// Render the report as a markdown string.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Risk Assessment\n\n");
        out.push_str(&format!(
            "**{}** @ {} ({}) vs `{}` in {} mode\n\n",
            self.repo, self.branch, self.head, self.base, self.mode
        ));
        out.push_str(&format!(
            "**Overall:** {}/100 ({})\n\n",
            self.overall_score, self.risk_level
        ));

        out.push_str("| Dimension | Score | Weight |\n");
        out.push_str("|-----------|------:|-------:|\n");
        out.push_str(&format!(
            "| Breaking surface | {} | {}% |\n",
            self.dimensions.breaking_surface.score, self.dimensions.breaking_surface.weight
        ));
        out.push_str(&format!(
            "| Blast radius | {} | {}% |\n",
            self.dimensions.blast_radius.score, self.dimensions.blast_radius.weight
        ));
        out.push_str(&format!(
            "| Change scope | {} | {}% |\n\n",
            self.dimensions.change_scope.score, self.dimensions.change_scope.weight
        ));

        if !self.dimensions.breaking_surface.signals.is_empty() {
            out.push_str("## Signals\n\n");
            out.push_str("| Type | File | Detail |\n");
            out.push_str("|------|------|--------|\n");
            for s in &self.dimensions.breaking_surface.signals {
                out.push_str(&format!("| {} | {} | {} |\n", s.kind, s.file, s.detail));
            }
            out.push('\n');
        }

        if self.flags.migration_safety.triggered {
            out.push_str(&format!(
                "**Migration files changed** (rollback {}): {}\n\n",
                if self.flags.migration_safety.has_rollback {
                    "present"
                } else {
                    "missing"
                },
                self.flags.migration_safety.files.join(", ")
            ));
        }

        if let Some(deep) = &self.deep_analysis {
            out.push_str("## Deep Analysis\n\n");
            if deep.hotspots.is_empty() {
                out.push_str("No hotspots.\n\n");
            } else {
                out.push_str("| Hotspot | Commits (90d) | Dependents |\n");
                out.push_str("|---------|--------------:|-----------:|\n");
                for h in &deep.hotspots {
                    out.push_str(&format!(
                        "| {} | {} | {} |\n",
                        h.file, h.commits, h.dependents
                    ));
                }
                out.push('\n');
            }
            out.push_str(&format!(
                "Estimated transitive dependents: {}\n\n",
                deep.transitive_count
            ));
        }

        if !self.next_actions.is_empty() {
            out.push_str("## Next Actions\n\n");
            for a in &self.next_actions {
                match &a.command {
                    Some(cmd) => out.push_str(&format!("- {} (`{}`): {}\n", a.action, cmd, a.reason)),
                    None => out.push_str(&format!("- {}: {}\n", a.action, a.reason)),
                }
            }
            out.push('\n');
        }

        out.push_str(&format!("## Gate: {}\n", self.gate));
        out
    }
}

fn recommend(
    mode: &str,
    level: RiskLevel,
    breaking: &BreakingSurface,
    blast: &BlastRadius,
    migration: &MigrationSafety,
) -> Vec<NextAction> {
    let mut actions = Vec::new();

    if mode != "deep" && matches!(level, RiskLevel::High | RiskLevel::Critical) {
        actions.push(NextAction {
            action: "Re-run with deep analysis".into(),
            command: Some("riskgate assess --mode deep".into()),
            reason: "high risk warrants history and hotspot context".into(),
        });
    }
    if breaking.score >= 50 {
        actions.push(NextAction {
            action: "Review breaking-change signals".into(),
            command: None,
            reason: format!(
                "{} potential contract break(s) detected",
                breaking.signals.len()
            ),
        });
    }
    if blast.score >= 35 {
        actions.push(NextAction {
            action: "Verify dependent call sites".into(),
            command: None,
            reason: format!("{} file(s) reference the changed modules", blast.dependents_total),
        });
    }
    if migration.triggered && !migration.has_rollback {
        actions.push(NextAction {
            action: "Add a rollback migration".into(),
            command: None,
            reason: "migration files changed without a down/rollback script".into(),
        });
    }
    if level == RiskLevel::Critical {
        actions.push(NextAction {
            action: "Split this change into smaller reviews".into(),
            command: None,
            reason: "critical overall risk; smaller units gate independently".into(),
        });
    }
    actions
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Risk Assessment")?;
        writeln!(f, "===============")?;
        writeln!(
            f,
            "{} @ {} ({}) vs {} in {} mode\n",
            self.repo, self.branch, self.head, self.base, self.mode
        )?;
        writeln!(
            f,
            "Overall Risk: {}/100 ({})\n",
            self.overall_score, self.risk_level
        )?;

        writeln!(f, "{:<20} {:>6} {:>8}", "Dimension", "Score", "Weight")?;
        writeln!(f, "{}", "-".repeat(40))?;
        writeln!(
            f,
            "{:<20} {:>6} {:>7}%",
            "Breaking surface",
            self.dimensions.breaking_surface.score,
            self.dimensions.breaking_surface.weight
        )?;
        writeln!(
            f,
            "{:<20} {:>6} {:>7}%",
            "Blast radius",
            self.dimensions.blast_radius.score,
            self.dimensions.blast_radius.weight
        )?;
        writeln!(
            f,
            "{:<20} {:>6} {:>7}%",
            "Change scope",
            self.dimensions.change_scope.score,
            self.dimensions.change_scope.weight
        )?;

        let signals = &self.dimensions.breaking_surface.signals;
        if !signals.is_empty() {
            writeln!(f, "\nSignals:")?;
            for s in signals {
                writeln!(f, "  [{}] {}: {}", s.kind, s.file, s.detail)?;
            }
        }

        if !self.dimensions.blast_radius.top_affected.is_empty() {
            writeln!(
                f,
                "\nTop affected ({} dependents total, confidence {}):",
                self.dimensions.blast_radius.dependents_total,
                self.dimensions.blast_radius.confidence
            )?;
            for a in &self.dimensions.blast_radius.top_affected {
                writeln!(f, "  {:<50} {:>4}", a.file, a.dependent_count)?;
            }
        }

        if self.flags.migration_safety.triggered {
            writeln!(
                f,
                "\nMigration files changed (rollback {}):",
                if self.flags.migration_safety.has_rollback {
                    "present"
                } else {
                    "missing"
                }
            )?;
            for path in &self.flags.migration_safety.files {
                writeln!(f, "  {path}")?;
            }
        }

        if let Some(deep) = &self.deep_analysis {
            writeln!(f, "\nDeep analysis:")?;
            if deep.hotspots.is_empty() {
                writeln!(f, "  no hotspots")?;
            }
            for h in &deep.hotspots {
                writeln!(
                    f,
                    "  hotspot {} ({} commits, {} dependents)",
                    h.file, h.commits, h.dependents
                )?;
            }
            writeln!(
                f,
                "  estimated transitive dependents: {}",
                deep.transitive_count
            )?;
        }

        if !self.next_actions.is_empty() {
            writeln!(f, "\nNext actions:")?;
            for a in &self.next_actions {
                match &a.command {
                    Some(cmd) => writeln!(f, "  - {} [{}] ({})", a.action, cmd, a.reason)?,
                    None => writeln!(f, "  - {} ({})", a.action, a.reason)?,
                }
            }
        }

        writeln!(f, "\nGate: {}", self.gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskgate_core::{Confidence, Signal, SignalKind};

    fn info() -> RepoInfo {
        RepoInfo {
            repo: "demo".into(),
            branch: "main".into(),
            head: "abc1234".into(),
        }
    }

    fn breaking(score: u32, signals: Vec<Signal>) -> BreakingSurface {
        BreakingSurface {
            score,
            weight: 45,
            signals,
        }
    }

    fn blast(score: u32, total: u64) -> BlastRadius {
        BlastRadius {
            score,
            weight: 35,
            dependents_total: total,
            confidence: Confidence::High,
            top_affected: Vec::new(),
        }
    }

    fn scope(score: u32) -> ChangeScope {
        let mut s = ChangeScope::empty();
        s.score = score;
        s
    }

    #[test]
    fn blend_weights_are_45_35_20() {
        assert_eq!(overall_score(100, 0, 0), 45);
        assert_eq!(overall_score(0, 100, 0), 35);
        assert_eq!(overall_score(0, 0, 100), 20);
        assert_eq!(overall_score(100, 100, 100), 100);
        assert_eq!(overall_score(0, 0, 0), 0);
    }

    #[test]
    fn blend_rounds_half_up() {
        // 0.45*15 + 0.20*6 = 6.75 + 1.2 = 7.95 -> 8
        assert_eq!(overall_score(15, 0, 6), 8);
        // 0.45*1 = 0.45 -> 0
        assert_eq!(overall_score(1, 0, 0), 0);
        // 0.35*3 = 1.05 -> 1
        assert_eq!(overall_score(0, 3, 0), 1);
    }

    #[test]
    fn zero_report_passes() {
        let report = RiskAssessment::zero(info(), "fast", "HEAD");
        assert_eq!(report.overall_score, 0);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.gate, Gate::Pass);
        assert!(report.next_actions.is_empty());
        assert!(report.deep_analysis.is_none());
    }

    #[test]
    fn high_risk_in_fast_mode_recommends_deep_rerun() {
        let report = RiskAssessment::build(
            info(),
            "fast",
            "HEAD",
            breaking(100, vec![]),
            blast(60, 12),
            scope(50),
            MigrationSafety::empty(),
            None,
        );
        assert!(matches!(
            report.risk_level,
            RiskLevel::High | RiskLevel::Critical
        ));
        assert!(report
            .next_actions
            .iter()
            .any(|a| a.command.as_deref() == Some("riskgate assess --mode deep")));
    }

    #[test]
    fn deep_mode_never_recommends_itself() {
        let report = RiskAssessment::build(
            info(),
            "deep",
            "HEAD",
            breaking(100, vec![]),
            blast(60, 12),
            scope(50),
            MigrationSafety::empty(),
            None,
        );
        assert!(report.next_actions.iter().all(|a| a.command.is_none()));
    }

    #[test]
    fn missing_rollback_recommends_adding_one() {
        let migration = MigrationSafety {
            triggered: true,
            has_rollback: false,
            files: vec!["db/0001.sql".into()],
        };
        let report = RiskAssessment::build(
            info(),
            "fast",
            "HEAD",
            breaking(0, vec![]),
            blast(0, 0),
            scope(0),
            migration,
            None,
        );
        assert!(report
            .next_actions
            .iter()
            .any(|a| a.action.contains("rollback")));
    }

    #[test]
    fn critical_risk_blocks_and_recommends_splitting() {
        let report = RiskAssessment::build(
            info(),
            "deep",
            "HEAD",
            breaking(100, vec![]),
            blast(95, 60),
            scope(90),
            MigrationSafety::empty(),
            None,
        );
        assert_eq!(report.risk_level, RiskLevel::Critical);
        assert_eq!(report.gate, Gate::Block);
        assert!(report
            .next_actions
            .iter()
            .any(|a| a.action.contains("Split")));
    }

    #[test]
    fn json_shape_is_camel_case_with_versioned_header() {
        let report = RiskAssessment::build(
            info(),
            "fast",
            "origin/main",
            breaking(
                15,
                vec![Signal::new(SignalKind::ExportRemoved, "a.ts", "Export removed: x")],
            ),
            blast(15, 2),
            scope(6),
            MigrationSafety::empty(),
            None,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["base"], "origin/main");
        assert_eq!(json["overallScore"], 13);
        assert_eq!(json["dimensions"]["breakingSurface"]["score"], 15);
        assert_eq!(
            json["dimensions"]["breakingSurface"]["signals"][0]["type"],
            "export-removed"
        );
        assert_eq!(json["gate"], "PASS");
        assert!(json.get("deepAnalysis").is_none());
    }

    #[test]
    fn text_render_includes_gate_and_signals() {
        let report = RiskAssessment::build(
            info(),
            "fast",
            "HEAD",
            breaking(
                15,
                vec![Signal::new(SignalKind::ExportRemoved, "a.ts", "Export removed: x")],
            ),
            blast(0, 0),
            scope(0),
            MigrationSafety::empty(),
            None,
        );
        let text = report.to_string();
        assert!(text.contains("Risk Assessment"));
        assert!(text.contains("export-removed"));
        assert!(text.contains("Gate: PASS"));
    }

    #[test]
    fn markdown_render_has_gate_heading() {
        let report = RiskAssessment::zero(info(), "fast", "HEAD");
        let md = report.to_markdown();
        assert!(md.contains("# Risk Assessment"));
        assert!(md.contains("## Gate: PASS"));
    }
}
