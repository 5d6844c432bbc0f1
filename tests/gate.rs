use riskgate_core::{Gate, RiskLevel};

#[test]
fn gate_passes_below_fifty() {
    for score in [0, 29, 30, 49] {
        let level = RiskLevel::from_score(score);
        assert_eq!(level.gate(), Gate::Pass, "score {score} should pass");
        assert_eq!(level.gate().exit_code(), 0);
    }
}

#[test]
fn gate_requests_review_in_high_band() {
    for score in [50, 60, 74] {
        let level = RiskLevel::from_score(score);
        assert_eq!(level.gate(), Gate::Review, "score {score} should need review");
        assert_eq!(level.gate().exit_code(), 1);
    }
}

#[test]
fn gate_blocks_critical_scores() {
    for score in [75, 90, 100] {
        let level = RiskLevel::from_score(score);
        assert_eq!(level.gate(), Gate::Block, "score {score} should block");
        assert_eq!(level.gate().exit_code(), 2);
    }
}

#[test]
fn overall_blend_drives_the_gate() {
    // Heavy breaking surface alone cannot block: 0.45 * 100 = 45 -> PASS
    let score = riskgate_scoring::overall_score(100, 0, 0);
    assert_eq!(RiskLevel::from_score(score).gate(), Gate::Pass);

    // Breaking plus blast crosses the review line
    let score = riskgate_scoring::overall_score(100, 35, 0);
    assert_eq!(RiskLevel::from_score(score).gate(), Gate::Review);

    // All three maxed blocks
    let score = riskgate_scoring::overall_score(100, 95, 90);
    assert_eq!(RiskLevel::from_score(score).gate(), Gate::Block);
}
