use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// `--A` style typo for a single-letter command flag (longer dash runs too)
static DOUBLE_DASH_COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-{2,}([A-Z])").expect("Invalid double dash regex"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Canonicalizes rule lines so two snapshots can be compared line by line
pub struct Normalizer {
    sort: bool,
}

impl Normalizer {
    pub fn new() -> Self {
        Self { sort: true }
    }

    /// Keep file order instead of sorting
    pub fn unsorted() -> Self {
        Self { sort: false }
    }

    pub fn normalize<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        let mut normalized: Vec<String> = lines
            .iter()
            .map(|line| line.as_ref().trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(normalize_line)
            .collect();

        if self.sort {
            normalized.sort();
        }

        debug!(
            lines_in = lines.len(),
            lines_out = normalized.len(),
            sorted = self.sort,
            "normalized rule set"
        );

        normalized
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize and sort
pub fn normalize<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    Normalizer::new().normalize(lines)
}

fn normalize_line(trimmed: &str) -> String {
    let fixed = DOUBLE_DASH_COMMAND.replace_all(trimmed, "-$1");
    WHITESPACE_RUN.replace_all(&fixed, " ").into_owned()
}
