use fd_core::{ChaosBand, DiffLine, ImpactMetrics};
use tracing::debug;

/// Opening access weighs more than closing it
pub const ADDITION_WEIGHT: f64 = 1.5;
pub const REMOVAL_WEIGHT: f64 = 1.0;

/// Bounds for the normalization baseline
pub const MIN_BASELINE: f64 = 50.0;
pub const MAX_BASELINE: f64 = 200.0;

pub struct ImpactScorer;

impl ImpactScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, diff: &[DiffLine]) -> ImpactMetrics {
        let additions = diff.iter().filter(|l| l.is_added()).count();
        let removals = diff.iter().filter(|l| l.is_removed()).count();
        let rule_lines = diff.iter().filter(|l| l.is_rule_line()).count();

        let chaos_score = chaos_score(additions, removals, rule_lines);

        let chain_changes = |chain: &str| {
            diff.iter()
                .filter(|l| l.is_change() && l.to_string().contains(chain))
                .count()
        };

        let metrics = ImpactMetrics {
            additions,
            removals,
            input_changes: chain_changes("INPUT"),
            output_changes: chain_changes("OUTPUT"),
            forward_changes: chain_changes("FORWARD"),
            chaos_score,
            band: ChaosBand::from_score(chaos_score),
        };

        debug!(
            additions,
            removals,
            chaos_score,
            band = metrics.band.label(),
            "scored diff impact"
        );

        metrics
    }
}

impl Default for ImpactScorer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn score(diff: &[DiffLine]) -> ImpactMetrics {
    ImpactScorer::new().score(diff)
}

/// Weighted change volume scaled to 0-100 against a bounded baseline
pub fn chaos_score(additions: usize, removals: usize, rule_lines: usize) -> f64 {
    let raw = additions as f64 * ADDITION_WEIGHT + removals as f64 * REMOVAL_WEIGHT;
    let baseline = (rule_lines as f64 / 2.0).clamp(MIN_BASELINE, MAX_BASELINE);
    let scaled = (raw / baseline * 100.0).clamp(0.0, 100.0);

    (scaled * 100.0).round_ties_even() / 100.0
}
