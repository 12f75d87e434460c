use fd_core::{Analysis, AnalysisConfig};
use tracing::info;

use crate::diff::RuleDiffer;
use crate::group::RuleGrouper;
use crate::impact::ImpactScorer;
use crate::normalize::Normalizer;
use crate::risk::RiskClassifier;

/// Runs normalize -> diff -> {classify, group, score} over one before/after pair
pub struct RuleSetComparator {
    normalizer: Option<Normalizer>,
    differ: RuleDiffer,
    classifier: RiskClassifier,
    grouper: RuleGrouper,
    scorer: ImpactScorer,
}

impl RuleSetComparator {
    pub fn new(config: &AnalysisConfig) -> Self {
        let normalizer = config.normalize.then(|| {
            if config.sort_rules {
                Normalizer::new()
            } else {
                Normalizer::unsorted()
            }
        });

        Self {
            normalizer,
            differ: RuleDiffer::new()
                .with_algorithm(config.algorithm)
                .with_context(config.context_lines),
            classifier: RiskClassifier::new(),
            grouper: RuleGrouper::new(),
            scorer: ImpactScorer::new(),
        }
    }

    pub fn compare<S: AsRef<str>>(&self, before: &[S], after: &[S]) -> Analysis {
        let diff = match &self.normalizer {
            Some(normalizer) => {
                let before = normalizer.normalize(before);
                let after = normalizer.normalize(after);
                self.differ.diff(&before, &after)
            }
            None => self.differ.diff(before, after),
        };

        let findings = self.classifier.classify(&diff);
        let groups = self.grouper.group(&diff);
        let metrics = self.scorer.score(&diff);

        info!(
            diff_lines = diff.len(),
            findings = findings.len(),
            chaos_score = metrics.chaos_score,
            "comparison complete"
        );

        Analysis {
            diff,
            findings,
            groups,
            metrics,
        }
    }
}

impl Default for RuleSetComparator {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fd_core::{ChaosBand, Severity};

    #[test]
    fn test_rdp_scenario() {
        let before = vec!["-A INPUT -p tcp --dport 80 -j ACCEPT\n"];
        let after = vec![
            "-A INPUT -p tcp --dport 80 -j ACCEPT\n",
            "-A INPUT -p tcp --dport 3389 -j ACCEPT\n",
        ];

        let analysis = RuleSetComparator::default().compare(&before, &after);

        let added: Vec<_> = analysis.diff.iter().filter(|l| l.is_added()).collect();
        assert_eq!(added.len(), 1);
        assert!(analysis.findings.iter().any(|f| {
            f.severity == Severity::Medium && f.description.contains("RDP")
        }));
        assert_eq!(analysis.metrics.additions, 1);
        assert_eq!(analysis.metrics.removals, 0);
        assert!(analysis.metrics.chaos_score > 0.0);
        assert_eq!(analysis.metrics.band, ChaosBand::Low);
    }

    #[test]
    fn test_identical_inputs_have_no_differences() {
        let rules = vec!["*filter", "-A INPUT -j DROP", "COMMIT"];
        let analysis = RuleSetComparator::default().compare(&rules, &rules);
        assert!(!analysis.has_differences());
        assert!(analysis.findings.is_empty());
        assert!(analysis.groups.is_empty());
        assert_eq!(analysis.metrics.chaos_score, 0.0);
    }

    #[test]
    fn test_reordering_only_is_not_a_change_when_normalized() {
        let before = vec!["-A INPUT -j DROP", "-A OUTPUT -j ACCEPT"];
        let after = vec!["-A OUTPUT  -j ACCEPT", "# moved", "-A INPUT -j DROP"];

        let analysis = RuleSetComparator::default().compare(&before, &after);
        assert!(!analysis.has_differences());
    }

    #[test]
    fn test_raw_comparison_sees_reordering() {
        let config = AnalysisConfig {
            normalize: false,
            ..AnalysisConfig::default()
        };
        let before = vec!["-A INPUT -j DROP", "-A OUTPUT -j ACCEPT"];
        let after = vec!["-A OUTPUT -j ACCEPT", "-A INPUT -j DROP"];

        let analysis = RuleSetComparator::new(&config).compare(&before, &after);
        assert!(analysis.has_differences());
        assert_eq!(analysis.metrics.additions, 1);
        assert_eq!(analysis.metrics.removals, 1);
    }

    #[test]
    fn test_unsorted_normalization_keeps_order_changes() {
        let config = AnalysisConfig {
            sort_rules: false,
            ..AnalysisConfig::default()
        };
        let before = vec!["-A INPUT -j DROP", "-A OUTPUT -j ACCEPT"];
        let after = vec!["-A OUTPUT -j ACCEPT", "-A INPUT  -j DROP"];

        let analysis = RuleSetComparator::new(&config).compare(&before, &after);
        assert!(analysis.has_differences());
    }
}
