use fd_core::{Analysis, DiffLine, FindingSource, ImpactMetrics, RuleGroup, RuleGroups};

pub const REPORT_TITLE: &str = "fwdelta - Rule Change Impact Analysis";

/// Semantic style of a piece of report text; renderers decide what it looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Dim,
    Strong,
    Title,
    Heading,
    Hunk,
    Added,
    Removed,
    Danger,
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
}

impl Span {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Plain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Boxed one-line heading
    Panel { text: String, tone: Tone },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<Span>>,
    },
    Line(Vec<Span>),
    Blank,
}

/// Presentation-neutral report built from an analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDocument {
    blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding a single boxed notice
    pub fn notice(text: impl Into<String>, tone: Tone) -> Self {
        let mut doc = Self::new();
        doc.panel(text, tone);
        doc
    }

    pub fn from_analysis(analysis: &Analysis) -> Self {
        let mut doc = Self::new();

        doc.panel(REPORT_TITLE, Tone::Title);

        doc.blank();
        doc.panel("Change Summary", Tone::Info);
        doc.push(summary_table(&analysis.metrics));

        doc.blank();
        doc.panel("Differences Detected", Tone::Success);
        doc.push(diff_table(&analysis.diff));

        doc.blank();
        if analysis.findings.is_empty() {
            doc.panel("No Security Risks Detected", Tone::Success);
        } else {
            doc.panel("Security Risks Detected", Tone::Danger);
            for finding in &analysis.findings {
                let (label, tone) = match finding.source {
                    FindingSource::Port { .. } | FindingSource::PortRange { .. } => {
                        ("Security Risk Detected!", Tone::Danger)
                    }
                    FindingSource::Pattern => ("Potential Risk!", Tone::Warning),
                };
                let rest = finding
                    .message()
                    .strip_prefix(label)
                    .map(str::to_string)
                    .unwrap_or_else(|| finding.message());
                doc.line(vec![Span::new(label, tone), Span::plain(rest)]);
            }
        }

        if !analysis.groups.is_empty() {
            doc.blank();
            doc.panel("Rule Analysis", Tone::Heading);
            doc.extend_groups(&analysis.groups);
        }

        doc.blank();
        doc.panel("Chaos Index", Tone::Danger);
        doc.line(vec![Span::new(
            format!("Chaos Index: {}/100", format_score(analysis.metrics.chaos_score)),
            Tone::Warning,
        )]);
        doc.line(vec![
            Span::new("Assessment: ", Tone::Strong),
            Span::plain(analysis.metrics.band.description()),
        ]);

        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn panel(&mut self, text: impl Into<String>, tone: Tone) {
        self.push(Block::Panel {
            text: text.into(),
            tone,
        });
    }

    pub fn line(&mut self, spans: Vec<Span>) {
        self.push(Block::Line(spans));
    }

    pub fn blank(&mut self) {
        self.push(Block::Blank);
    }

    fn extend_groups(&mut self, groups: &RuleGroups) {
        if !groups.by_port.is_empty() {
            self.line(vec![Span::new("--- Rules Grouped by Port ---", Tone::Heading)]);
            self.extend_group_list(&groups.by_port, |key| format!("{} Rules", key));
        }

        if !groups.by_chain.is_empty() {
            if !groups.by_port.is_empty() {
                self.blank();
            }
            self.line(vec![Span::new("--- Rules Grouped by Chain ---", Tone::Heading)]);
            self.extend_group_list(&groups.by_chain, |key| format!("Chain {} Rules", key));
        }
    }

    fn extend_group_list(&mut self, groups: &[RuleGroup], title: impl Fn(&str) -> String) {
        for group in groups {
            self.line(vec![
                Span::new(title(&group.key), Tone::Success),
                Span::plain(":"),
            ]);
            for rule in &group.rules {
                self.line(vec![Span::plain(format!("    {}", rule))]);
            }
        }
    }
}

/// `3.0`, `1.67`, `100.0`
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        format!("{}", score)
    }
}

fn summary_table(metrics: &ImpactMetrics) -> Block {
    let rows = [
        ("Total Changes", metrics.total_changes().to_string()),
        ("Additions", metrics.additions.to_string()),
        ("Removals", metrics.removals.to_string()),
        ("INPUT Chain Changes", metrics.input_changes.to_string()),
        ("OUTPUT Chain Changes", metrics.output_changes.to_string()),
        ("FORWARD Chain Changes", metrics.forward_changes.to_string()),
        ("Chaos Index", format!("{}/100", format_score(metrics.chaos_score))),
    ];

    Block::Table {
        headers: vec!["Metric".into(), "Value".into()],
        rows: rows
            .into_iter()
            .map(|(name, value)| vec![Span::plain(name), Span::plain(value)])
            .collect(),
    }
}

fn diff_table(diff: &[DiffLine]) -> Block {
    let rows = diff
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let tone = match line {
                DiffLine::Hunk(_) => Tone::Hunk,
                DiffLine::Added(_) => Tone::Added,
                DiffLine::Removed(_) => Tone::Removed,
                DiffLine::Context(_) => Tone::Plain,
            };
            vec![
                Span::new((i + 1).to_string(), Tone::Dim),
                Span::new(line.to_string().trim().to_string(), tone),
            ]
        })
        .collect();

    Block::Table {
        headers: vec!["Line".into(), "Diff".into()],
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fd_core::{ChaosBand, RiskFinding, Severity};

    fn sample_analysis() -> Analysis {
        let added = "-A INPUT -p tcp --dport 3389 -j ACCEPT";
        Analysis {
            diff: vec![
                DiffLine::Hunk("@@ -1 +1,2 @@".into()),
                DiffLine::Added(added.into()),
                DiffLine::Context("-A INPUT -p tcp --dport 80 -j ACCEPT".into()),
            ],
            findings: vec![
                RiskFinding {
                    severity: Severity::High,
                    source: FindingSource::Port { port: 3389 },
                    line: format!("+{}", added),
                    description: "RDP - Remote desktop access".into(),
                },
                RiskFinding {
                    severity: Severity::Medium,
                    source: FindingSource::Pattern,
                    line: format!("+{}", added),
                    description: "Medium risk: RDP port opened, vulnerable to brute force".into(),
                },
            ],
            groups: RuleGroups {
                by_port: vec![RuleGroup {
                    key: "--dport 3389".into(),
                    rules: vec![format!("+{}", added)],
                }],
                by_chain: vec![RuleGroup {
                    key: "INPUT".into(),
                    rules: vec![format!("+{}", added)],
                }],
            },
            metrics: ImpactMetrics {
                additions: 1,
                removals: 0,
                input_changes: 1,
                output_changes: 0,
                forward_changes: 0,
                chaos_score: 3.0,
                band: ChaosBand::Low,
            },
        }
    }

    fn panels(doc: &ReportDocument) -> Vec<&str> {
        doc.blocks()
            .iter()
            .filter_map(|b| match b {
                Block::Panel { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_sections_in_order() {
        let doc = ReportDocument::from_analysis(&sample_analysis());
        assert_eq!(
            panels(&doc),
            vec![
                REPORT_TITLE,
                "Change Summary",
                "Differences Detected",
                "Security Risks Detected",
                "Rule Analysis",
                "Chaos Index",
            ]
        );
    }

    #[test]
    fn test_no_risks_notice() {
        let mut analysis = sample_analysis();
        analysis.findings.clear();
        let doc = ReportDocument::from_analysis(&analysis);
        assert!(panels(&doc).contains(&"No Security Risks Detected"));
    }

    #[test]
    fn test_diff_rows_are_numbered_and_toned() {
        let doc = ReportDocument::from_analysis(&sample_analysis());
        let rows = doc
            .blocks()
            .iter()
            .find_map(|b| match b {
                Block::Table { headers, rows } if headers[0] == "Line" => Some(rows),
                _ => None,
            })
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0].text, "1");
        assert_eq!(rows[0][1].tone, Tone::Hunk);
        assert_eq!(rows[1][1].tone, Tone::Added);
        assert_eq!(rows[1][1].text, "+-A INPUT -p tcp --dport 3389 -j ACCEPT");
    }

    #[test]
    fn test_finding_lines_split_label() {
        let doc = ReportDocument::from_analysis(&sample_analysis());
        let lines: Vec<&Vec<Span>> = doc
            .blocks()
            .iter()
            .filter_map(|b| match b {
                Block::Line(spans) => Some(spans),
                _ => None,
            })
            .collect();
        assert_eq!(lines[0][0].text, "Security Risk Detected!");
        assert_eq!(lines[0][0].tone, Tone::Danger);
        assert!(lines[0][1].text.starts_with(" - +-A INPUT"));
        assert_eq!(lines[1][0].text, "Potential Risk!");
        assert_eq!(lines[1][0].tone, Tone::Warning);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(3.0), "3.0");
        assert_eq!(format_score(1.67), "1.67");
        assert_eq!(format_score(100.0), "100.0");
        assert_eq!(format_score(12.5), "12.5");
    }
}
