//! Risk scoring for riskgate: three dimension scorers, advisory flags,
//! deep-mode analysis, and the aggregated report.
//!
//! Everything here is pure over its inputs except [`blast::SourceIndex::build`],
//! which reads the working tree once. Scorers take the parsed diff snapshot
//! and configuration and return serializable results; rendering lives on
//! [`report::RiskAssessment`].

pub mod blast;
pub mod breaking;
pub mod deep;
pub mod flags;
pub mod report;
pub mod scope;

pub use blast::{score_blast_radius, BlastRadius, SourceIndex};
pub use breaking::{score_breaking_surface, BreakingSurface};
pub use deep::{deep_analysis, DeepAnalysis};
pub use flags::{check_migration_safety, MigrationSafety};
pub use report::{overall_score, RepoInfo, RiskAssessment};
pub use scope::{score_change_scope, ChangeScope};

/// Map `value` onto a step function: the score of the first band whose
/// inclusive upper bound admits it, or `otherwise` past the last band.
///
/// Bands must be sorted by ascending bound.
pub(crate) fn band(value: u64, bands: &[(u64, u32)], otherwise: u32) -> u32 {
    for (bound, score) in bands {
        if value <= *bound {
            return *score;
        }
    }
    otherwise
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_picks_first_admitting_bound() {
        let bands = &[(3, 10), (10, 30), (25, 60)];
        assert_eq!(band(0, bands, 90), 10);
        assert_eq!(band(3, bands, 90), 10);
        assert_eq!(band(4, bands, 90), 30);
        assert_eq!(band(25, bands, 90), 60);
        assert_eq!(band(26, bands, 90), 90);
    }
}
