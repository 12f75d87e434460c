use fd_core::{DiffLine, RuleGroup, RuleGroups};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::risk::DPORT;

static APPEND_CHAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-A\s+(\w+)").expect("Invalid chain regex"));

/// Buckets added rules by destination port spec and by chain for review
pub struct RuleGrouper;

impl RuleGrouper {
    pub fn new() -> Self {
        Self
    }

    pub fn group(&self, diff: &[DiffLine]) -> RuleGroups {
        let mut groups = RuleGroups::default();

        for line in diff.iter().filter(|l| l.is_added()) {
            let text = line.to_string();
            let rule = text.trim();

            if let Some(m) = DPORT.find(rule) {
                push_rule(&mut groups.by_port, m.as_str(), rule);
            }

            if let Some(caps) = APPEND_CHAIN.captures(rule) {
                push_rule(&mut groups.by_chain, &caps[1], rule);
            }
        }

        groups
    }
}

impl Default for RuleGrouper {
    fn default() -> Self {
        Self::new()
    }
}

pub fn group(diff: &[DiffLine]) -> RuleGroups {
    RuleGrouper::new().group(diff)
}

fn push_rule(groups: &mut Vec<RuleGroup>, key: &str, rule: &str) {
    match groups.iter_mut().find(|g| g.key == key) {
        Some(group) => group.rules.push(rule.to_string()),
        None => groups.push(RuleGroup {
            key: key.to_string(),
            rules: vec![rule.to_string()],
        }),
    }
}
