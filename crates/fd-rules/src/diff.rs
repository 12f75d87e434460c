use fd_core::{DiffAlgorithm, DiffLine};
use similar::{Algorithm, ChangeTag, TextDiff};
use tracing::debug;

/// Unified line diff between two rule sets
pub struct RuleDiffer {
    algorithm: DiffAlgorithm,
    context_lines: usize,
}

impl RuleDiffer {
    pub fn new() -> Self {
        Self {
            algorithm: DiffAlgorithm::Myers,
            context_lines: 3,
        }
    }

    pub fn with_algorithm(mut self, algorithm: DiffAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_context(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    /// Hunk headers plus added, removed and context lines in emitter order.
    /// File headers (`---`/`+++`) are never produced.
    pub fn diff<S: AsRef<str>>(&self, before: &[S], after: &[S]) -> Vec<DiffLine> {
        let old: Vec<&str> = before.iter().map(|l| l.as_ref()).collect();
        let new: Vec<&str> = after.iter().map(|l| l.as_ref()).collect();

        let diff = TextDiff::configure()
            .algorithm(similar_algorithm(self.algorithm))
            .diff_slices(&old, &new);

        let mut lines = Vec::new();
        for hunk in diff
            .unified_diff()
            .context_radius(self.context_lines)
            .iter_hunks()
        {
            lines.push(DiffLine::Hunk(hunk.header().to_string()));

            for change in hunk.iter_changes() {
                let text = change.value().to_string();
                lines.push(match change.tag() {
                    ChangeTag::Delete => DiffLine::Removed(text),
                    ChangeTag::Insert => DiffLine::Added(text),
                    ChangeTag::Equal => DiffLine::Context(text),
                });
            }
        }

        debug!(
            before = old.len(),
            after = new.len(),
            diff_lines = lines.len(),
            "computed rule diff"
        );

        lines
    }
}

impl Default for RuleDiffer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn diff<S: AsRef<str>>(before: &[S], after: &[S]) -> Vec<DiffLine> {
    RuleDiffer::new().diff(before, after)
}

fn similar_algorithm(algorithm: DiffAlgorithm) -> Algorithm {
    match algorithm {
        DiffAlgorithm::Myers => Algorithm::Myers,
        DiffAlgorithm::Patience => Algorithm::Patience,
        DiffAlgorithm::Lcs => Algorithm::Lcs,
    }
}
