use fd_core::{DiffLine, FindingSource, RiskFinding, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Well-known ports worth flagging when a rule opens them
pub static SENSITIVE_PORTS: Lazy<BTreeMap<u32, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        (21, "FTP - Unencrypted file transfers, vulnerable to interception."),
        (22, "SSH - Used for remote access, often targeted by attackers."),
        (23, "Telnet - Unencrypted communication, easily intercepted."),
        (53, "DNS - Can be used for DNS amplification attacks."),
        (80, "HTTP - Often unencrypted, vulnerable to various attacks."),
        (443, "HTTPS - Critical for secure web traffic, targeted for MiTM attacks."),
        (1433, "MS SQL Server - Database often targeted."),
        (3306, "MySQL - Often targeted in brute force attacks."),
        (3389, "RDP - Remote desktop access, vulnerable to brute force attacks."),
        (5432, "PostgreSQL - Target database for attacks."),
        (8080, "HTTP Proxy - Can bypass normal firewall rules, potentially dangerous."),
        (27017, "MongoDB - NoSQL database, often misconfigured."),
    ])
});

/// `--dport N`, `--dport N:M` or `--dport N-M`
pub(crate) static DPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--dport\s+(\d+)(?:[:-](\d+))?").expect("Invalid dport regex"));

/// A rule shape that weakens the firewall
pub struct RiskSignature {
    pub pattern: Regex,
    pub severity: Severity,
    pub description: &'static str,
}

impl RiskSignature {
    fn new(pattern: &str, severity: Severity, description: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("Invalid risk signature regex"),
            severity,
            description,
        }
    }
}

pub static RISK_SIGNATURES: Lazy<Vec<RiskSignature>> = Lazy::new(|| {
    use Severity::*;

    vec![
        // Accept rules without filters
        RiskSignature::new(
            r"-j\s+ACCEPT\s*$",
            High,
            "High risk: Unconditional acceptance rule without restrictions",
        ),
        RiskSignature::new(
            r"-A\s+INPUT.*-j\s+ACCEPT\s*$",
            Medium,
            "Medium risk: Input acceptance rule without specific filters",
        ),
        RiskSignature::new(
            r"-A\s+FORWARD.*-j\s+ACCEPT\s*$",
            High,
            "High risk: Forwarding rule without restrictions, potential pivot point",
        ),
        // Port ranges
        RiskSignature::new(
            r"--dport\s+0:65535",
            Critical,
            "Critical risk: Complete port range open",
        ),
        RiskSignature::new(
            r"--dport\s+1:1024",
            High,
            "High risk: All privileged ports open",
        ),
        RiskSignature::new(
            r"--dport\s+[0-9]+:[0-9]+",
            Medium,
            "Medium risk: Port range detected, verify if necessary",
        ),
        // Sources
        RiskSignature::new(
            r"-s\s+0\.0\.0\.0/0.*-j\s+ACCEPT",
            High,
            "High risk: Accepting traffic from any source IP",
        ),
        RiskSignature::new(
            r"-A\s+INPUT\s+-s\s+192\.168\.[0-9]+\.[0-9]+/[0-9]+.*-j\s+ACCEPT",
            Low,
            "Low risk: Private network access rule, verify scope",
        ),
        // Connection state tracking
        RiskSignature::new(
            r"-j\s+DROP.*--state\s+INVALID",
            Medium,
            "Medium risk: Security rule for invalid packets modified/removed",
        ),
        RiskSignature::new(
            r"-j\s+DROP.*--state\s+NEW.*-m\s+state\s+--state\s+ESTABLISHED",
            High,
            "High risk: State tracking rule modified/removed",
        ),
        // Default policies
        RiskSignature::new(
            r":INPUT\s+ACCEPT",
            High,
            "High risk: Default INPUT policy set to ACCEPT",
        ),
        RiskSignature::new(
            r":FORWARD\s+ACCEPT",
            High,
            "High risk: Default FORWARD policy set to ACCEPT",
        ),
        // Sensitive services
        RiskSignature::new(
            r"-A\s+INPUT.*--dport\s+3389.*-j\s+ACCEPT",
            Medium,
            "Medium risk: RDP port opened, vulnerable to brute force",
        ),
        RiskSignature::new(
            r"-A\s+INPUT.*--dport\s+22.*-j\s+ACCEPT\s*$",
            Medium,
            "Medium risk: SSH port opened without IP restriction",
        ),
        RiskSignature::new(
            r"-A\s+INPUT.*--dport\s+(1433|3306|5432|27017).*-j\s+ACCEPT\s*$",
            High,
            "High risk: Database port exposed without restrictions",
        ),
    ]
});

/// Flags added rules that open sensitive ports or match risky signatures
pub struct RiskClassifier;

impl RiskClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Only added lines are inspected. Findings are not deduplicated.
    pub fn classify(&self, diff: &[DiffLine]) -> Vec<RiskFinding> {
        let mut findings = Vec::new();

        for line in diff.iter().filter(|l| l.is_added()) {
            let text = line.to_string();
            let stripped = text.trim();

            findings.extend(self.port_findings(stripped));
            findings.extend(self.pattern_findings(stripped));
        }

        debug!(findings = findings.len(), "classified diff");
        findings
    }

    fn port_findings(&self, line: &str) -> Vec<RiskFinding> {
        let Some(caps) = DPORT.captures(line) else {
            return vec![];
        };
        let Ok(start) = caps[1].parse::<u32>() else {
            return vec![];
        };

        match caps.get(2) {
            None => SENSITIVE_PORTS
                .get(&start)
                .map(|description| {
                    vec![finding(line, FindingSource::Port { port: start }, description)]
                })
                .unwrap_or_default(),
            Some(end) => {
                let Ok(end) = end.as_str().parse::<u32>() else {
                    return vec![];
                };
                if start > end {
                    return vec![];
                }

                // Same result as walking every port in the range, without the walk
                SENSITIVE_PORTS
                    .range(start..=end)
                    .map(|(&port, description)| {
                        finding(line, FindingSource::PortRange { port }, description)
                    })
                    .collect()
            }
        }
    }

    fn pattern_findings(&self, line: &str) -> Vec<RiskFinding> {
        RISK_SIGNATURES
            .iter()
            .filter(|sig| sig.pattern.is_match(line))
            .map(|sig| RiskFinding {
                severity: sig.severity,
                source: FindingSource::Pattern,
                line: line.to_string(),
                description: sig.description.to_string(),
            })
            .collect()
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new()
    }
}

pub fn classify(diff: &[DiffLine]) -> Vec<RiskFinding> {
    RiskClassifier::new().classify(diff)
}

fn finding(line: &str, source: FindingSource, description: &str) -> RiskFinding {
    RiskFinding {
        severity: Severity::High,
        source,
        line: line.to_string(),
        description: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(text: &str) -> DiffLine {
        DiffLine::Added(text.to_string())
    }

    fn port_hits(findings: &[RiskFinding]) -> Vec<u32> {
        findings
            .iter()
            .filter_map(|f| match f.source {
                FindingSource::Port { port } | FindingSource::PortRange { port } => Some(port),
                FindingSource::Pattern => None,
            })
            .collect()
    }

    #[test]
    fn test_ssh_accept_flagged() {
        let findings = classify(&[added("-A INPUT -p tcp --dport 22 -j ACCEPT")]);
        assert!(findings.iter().any(|f| f.description.contains("SSH")));
        assert!(
            findings
                .iter()
                .any(|f| f.description == "Medium risk: SSH port opened without IP restriction")
        );
    }

    #[test]
    fn test_range_expands_to_catalog_ports() {
        let findings = classify(&[added("-A INPUT -p tcp --dport 20:25 -j DROP")]);
        assert_eq!(port_hits(&findings), vec![21, 22, 23]);
        assert!(findings.iter().all(|f| !f.description.starts_with("HTTP -")));
        assert!(
            findings
                .iter()
                .any(|f| f.message().contains("(Port 23: Telnet"))
        );
    }

    #[test]
    fn test_dash_range_spelling() {
        let findings = classify(&[added("-A INPUT -p tcp --dport 3300-3400 -j DROP")]);
        assert_eq!(port_hits(&findings), vec![3306, 3389]);
    }

    #[test]
    fn test_full_range_is_bounded_and_critical() {
        let findings = classify(&[added("-A INPUT -p tcp --dport 0:65535 -j ACCEPT")]);
        assert_eq!(port_hits(&findings).len(), SENSITIVE_PORTS.len());
        assert!(findings.iter().any(|f| f.severity == Severity::Critical));
    }

    #[test]
    fn test_reversed_or_oversized_range_yields_no_port_findings() {
        let findings = classify(&[added("-A INPUT -p tcp --dport 25:20 -j DROP")]);
        assert!(port_hits(&findings).is_empty());

        let findings = classify(&[added("-A INPUT --dport 1:99999999999999999999 -j DROP")]);
        assert!(port_hits(&findings).is_empty());
    }

    #[test]
    fn test_rdp_scenario() {
        let findings = classify(&[added("-A INPUT -p tcp --dport 3389 -j ACCEPT")]);
        let rdp = findings
            .iter()
            .find(|f| f.description.contains("RDP port opened"))
            .expect("RDP signature should match");
        assert_eq!(rdp.severity, Severity::Medium);
        assert!(rdp.description.starts_with("Medium risk"));
    }

    #[test]
    fn test_removed_and_context_lines_ignored() {
        let diff = vec![
            DiffLine::Hunk("@@ -1,2 +1 @@".into()),
            DiffLine::Removed("-A INPUT -p tcp --dport 22 -j ACCEPT".into()),
            DiffLine::Context("-A INPUT -p tcp --dport 3389 -j ACCEPT".into()),
        ];
        assert!(classify(&diff).is_empty());
    }

    #[test]
    fn test_multiple_signatures_fire_without_dedup() {
        let findings = classify(&[added("-A FORWARD -s 0.0.0.0/0 -j ACCEPT")]);
        let descriptions: Vec<&str> = findings.iter().map(|f| f.description.as_str()).collect();
        assert!(descriptions.contains(&"High risk: Unconditional acceptance rule without restrictions"));
        assert!(descriptions.contains(&"High risk: Forwarding rule without restrictions, potential pivot point"));
        assert!(descriptions.contains(&"High risk: Accepting traffic from any source IP"));

        let twice = classify(&[
            added("-A FORWARD -s 0.0.0.0/0 -j ACCEPT"),
            added("-A FORWARD -s 0.0.0.0/0 -j ACCEPT"),
        ]);
        assert_eq!(twice.len(), findings.len() * 2);
    }

    #[test]
    fn test_default_policy_and_state_rules() {
        let findings = classify(&[added(":INPUT ACCEPT [0:0]")]);
        assert!(
            findings
                .iter()
                .any(|f| f.description == "High risk: Default INPUT policy set to ACCEPT")
        );

        let findings = classify(&[added("-A INPUT -j DROP -m state --state INVALID")]);
        assert!(findings.iter().any(|f| f.description.contains("invalid packets")));
    }

    #[test]
    fn test_database_port_exposed() {
        let findings = classify(&[added("-A INPUT -p tcp --dport 5432 -j ACCEPT")]);
        assert!(findings.iter().any(|f| f.description.contains("PostgreSQL")));
        assert!(
            findings
                .iter()
                .any(|f| f.description == "High risk: Database port exposed without restrictions")
        );
    }

    #[test]
    fn test_finding_keeps_marker_in_line() {
        let findings = classify(&[added("-A INPUT -p tcp --dport 80 -j DROP")]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, "+-A INPUT -p tcp --dport 80 -j DROP");
        assert_eq!(
            findings[0].message(),
            "Security Risk Detected! - +-A INPUT -p tcp --dport 80 -j DROP (HTTP - Often unencrypted, vulnerable to various attacks.)"
        );
    }
}
