use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::loader::VALID_EXTENSIONS;

/// Problems with one of the two input rule files
#[derive(Error, Debug)]
pub enum InputError {
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error(
        "The file {} does not have a valid extension. Valid extensions are: {}",
        .path.display(),
        VALID_EXTENSIONS.join(", ")
    )]
    InvalidExtension { path: PathBuf },

    #[error("Unable to read file {}: {source}", .path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The file {} does not appear to be an iptables configuration.", .path.display())]
    NotARuleFile { path: PathBuf },
}

/// Every input problem found in one validation pass
#[derive(Debug)]
pub struct InputErrors(pub Vec<InputError>);

impl InputErrors {
    pub fn errors(&self) -> &[InputError] {
        &self.0
    }
}

impl fmt::Display for InputErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&messages.join("\n"))
    }
}

impl std::error::Error for InputErrors {}

impl From<InputError> for InputErrors {
    fn from(error: InputError) -> Self {
        Self(vec![error])
    }
}
