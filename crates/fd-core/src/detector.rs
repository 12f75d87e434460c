use once_cell::sync::Lazy;
use regex::RegexSet;

/// Lines that must match a signature before content is accepted as a rule file
pub const MATCH_THRESHOLD: usize = 3;

/// Signatures of iptables rule syntax
static RULE_SIGNATURES: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"iptables",
        r"-A\s+\w+",
        r"-p\s+\w+",
        r"--dport",
        r"--sport",
        r"-j\s+\w+",
        r"ACCEPT|DROP|REJECT",
    ])
    .expect("Invalid rule signature regex")
});

/// Heuristic check that a block of text looks like a firewall rule file.
///
/// Advisory only: a line counts once no matter how many signatures it hits,
/// and scanning stops as soon as enough lines have matched.
pub struct RuleFileDetector {
    threshold: usize,
}

impl RuleFileDetector {
    pub fn new() -> Self {
        Self {
            threshold: MATCH_THRESHOLD,
        }
    }

    pub fn looks_like_rule_file<S: AsRef<str>>(&self, lines: &[S]) -> bool {
        let mut matches = 0;

        for line in lines {
            if RULE_SIGNATURES.is_match(line.as_ref()) {
                matches += 1;
            }

            if matches >= self.threshold {
                return true;
            }
        }

        false
    }
}

impl Default for RuleFileDetector {
    fn default() -> Self {
        Self::new()
    }
}

pub fn looks_like_rule_file<S: AsRef<str>>(lines: &[S]) -> bool {
    RuleFileDetector::new().looks_like_rule_file(lines)
}
