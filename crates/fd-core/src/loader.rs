use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::detector::RuleFileDetector;
use crate::error::{InputError, InputErrors};

pub const VALID_EXTENSIONS: &[&str] = &[".txt", ".rules", ".iptables"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

/// Contents of one rule file at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub path: PathBuf,
    pub lines: Vec<String>,
    pub encoding: Encoding,
}

pub struct RuleFileLoader {
    detector: RuleFileDetector,
}

impl RuleFileLoader {
    pub fn new() -> Self {
        Self {
            detector: RuleFileDetector::new(),
        }
    }

    /// Reject files whose suffix is not a known rule-file extension
    pub fn check_extension(&self, path: &Path) -> Result<(), InputError> {
        let suffix = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()));

        match suffix {
            Some(ext) if VALID_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            _ => Err(InputError::InvalidExtension {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Read a whole file as lines, falling back to Latin-1 when it is not valid UTF-8
    pub fn read(&self, path: &Path) -> Result<RuleSet, InputError> {
        if !path.is_file() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path).map_err(|source| InputError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        })?;

        let (content, encoding) = match String::from_utf8(bytes) {
            Ok(text) => (text, Encoding::Utf8),
            Err(e) => {
                info!(path = %path.display(), "file is not valid UTF-8, decoding as Latin-1");
                (decode_latin1(e.as_bytes()), Encoding::Latin1)
            }
        };

        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        debug!(path = %path.display(), lines = lines.len(), "read rule file");

        Ok(RuleSet {
            path: path.to_path_buf(),
            lines,
            encoding,
        })
    }

    /// Validate and read the before/after pair.
    ///
    /// Extension and format problems are collected across both files so they
    /// are reported together. Read failures stop at the first file.
    pub fn load_pair(&self, before: &Path, after: &Path) -> Result<(RuleSet, RuleSet), InputErrors> {
        let extension_errors: Vec<InputError> = [before, after]
            .iter()
            .filter_map(|path| self.check_extension(path).err())
            .collect();
        if !extension_errors.is_empty() {
            return Err(InputErrors(extension_errors));
        }

        let before_set = self.read(before)?;
        let after_set = self.read(after)?;

        let format_errors: Vec<InputError> = [&before_set, &after_set]
            .iter()
            .filter(|set| !self.detector.looks_like_rule_file(&set.lines))
            .map(|set| InputError::NotARuleFile {
                path: set.path.clone(),
            })
            .collect();
        if !format_errors.is_empty() {
            return Err(InputErrors(format_errors));
        }

        Ok((before_set, after_set))
    }
}

impl Default for RuleFileLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
