use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of a unified diff between two rule sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum DiffLine {
    /// `@@ -a,b +c,d @@`
    Hunk(String),
    /// Present only in the "after" rule set
    Added(String),
    /// Present only in the "before" rule set
    Removed(String),
    /// Unchanged line carried for context
    Context(String),
}

impl DiffLine {
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Hunk(_) => "",
            Self::Added(_) => "+",
            Self::Removed(_) => "-",
            Self::Context(_) => " ",
        }
    }

    /// Rule text without the diff marker
    pub fn content(&self) -> &str {
        match self {
            Self::Hunk(text) | Self::Added(text) | Self::Removed(text) | Self::Context(text) => {
                text
            }
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed(_))
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Self::Added(_) | Self::Removed(_))
    }

    /// Added, removed or context line (everything but hunk headers)
    pub fn is_rule_line(&self) -> bool {
        !matches!(self, Self::Hunk(_))
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.marker(), self.content())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which detector produced a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingSource {
    /// A single `--dport` that is in the well-known port catalog
    Port { port: u32 },
    /// A catalog port that falls inside a `--dport start:end` range
    PortRange { port: u32 },
    /// A risky rule signature
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub severity: Severity,
    pub source: FindingSource,
    /// Diff line the finding is attached to, including its `+` marker
    pub line: String,
    pub description: String,
}

impl RiskFinding {
    pub fn message(&self) -> String {
        match &self.source {
            FindingSource::Port { .. } => {
                format!("Security Risk Detected! - {} ({})", self.line, self.description)
            }
            FindingSource::PortRange { port } => format!(
                "Security Risk Detected! - {} (Port {}: {})",
                self.line, port, self.description
            ),
            FindingSource::Pattern => {
                format!("Potential Risk! - {} ({})", self.line, self.description)
            }
        }
    }
}

/// Added rules sharing one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub key: String,
    pub rules: Vec<String>,
}

/// Added rules grouped by `--dport` spec and by chain, keys in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGroups {
    pub by_port: Vec<RuleGroup>,
    pub by_chain: Vec<RuleGroup>,
}

impl RuleGroups {
    pub fn is_empty(&self) -> bool {
        self.by_port.is_empty() && self.by_chain.is_empty()
    }
}

/// Qualitative band of the chaos index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChaosBand {
    Low,
    Moderate,
    High,
    Extreme,
}

impl ChaosBand {
    pub const THRESHOLDS: [f64; 3] = [25.0, 50.0, 75.0];

    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            Self::Low
        } else if score < 50.0 {
            Self::Moderate
        } else if score < 75.0 {
            Self::High
        } else {
            Self::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Extreme => "Extreme",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low impact, minimal changes",
            Self::Moderate => "Moderate impact, significant changes",
            Self::High => "High impact, major reconfiguration",
            Self::Extreme => "Extreme impact, complete overhaul",
        }
    }

    /// Chart color as RGB
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (0x4C, 0xAF, 0x50),
            Self::Moderate => (0xFF, 0xC1, 0x07),
            Self::High => (0xFF, 0x98, 0x00),
            Self::Extreme => (0xF4, 0x43, 0x36),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub additions: usize,
    pub removals: usize,
    pub input_changes: usize,
    pub output_changes: usize,
    pub forward_changes: usize,
    /// 0-100, rounded to two decimals
    pub chaos_score: f64,
    pub band: ChaosBand,
}

impl ImpactMetrics {
    pub fn total_changes(&self) -> usize {
        self.additions + self.removals
    }
}

/// Everything one before/after comparison produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub diff: Vec<DiffLine>,
    pub findings: Vec<RiskFinding>,
    pub groups: RuleGroups,
    pub metrics: ImpactMetrics,
}

impl Analysis {
    pub fn has_differences(&self) -> bool {
        !self.diff.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_line_display_keeps_marker() {
        assert_eq!(DiffLine::Added("-A INPUT -j DROP".into()).to_string(), "+-A INPUT -j DROP");
        assert_eq!(DiffLine::Removed("-P FORWARD DROP".into()).to_string(), "--P FORWARD DROP");
        assert_eq!(DiffLine::Context("COMMIT".into()).to_string(), " COMMIT");
        assert_eq!(DiffLine::Hunk("@@ -1 +1 @@".into()).to_string(), "@@ -1 +1 @@");
    }

    #[test]
    fn test_chaos_band_boundaries_fall_into_higher_band() {
        assert_eq!(ChaosBand::from_score(0.0), ChaosBand::Low);
        assert_eq!(ChaosBand::from_score(24.99), ChaosBand::Low);
        assert_eq!(ChaosBand::from_score(25.0), ChaosBand::Moderate);
        assert_eq!(ChaosBand::from_score(50.0), ChaosBand::High);
        assert_eq!(ChaosBand::from_score(75.0), ChaosBand::Extreme);
        assert_eq!(ChaosBand::from_score(100.0), ChaosBand::Extreme);
    }

    #[test]
    fn test_finding_messages() {
        let single = RiskFinding {
            severity: Severity::High,
            source: FindingSource::Port { port: 22 },
            line: "+-A INPUT -p tcp --dport 22 -j ACCEPT".into(),
            description: "SSH - remote access".into(),
        };
        assert_eq!(
            single.message(),
            "Security Risk Detected! - +-A INPUT -p tcp --dport 22 -j ACCEPT (SSH - remote access)"
        );

        let ranged = RiskFinding {
            source: FindingSource::PortRange { port: 23 },
            ..single.clone()
        };
        assert!(ranged.message().ends_with("(Port 23: SSH - remote access)"));

        let pattern = RiskFinding {
            source: FindingSource::Pattern,
            ..single
        };
        assert!(pattern.message().starts_with("Potential Risk! - "));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}
