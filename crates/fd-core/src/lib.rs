pub mod config;
pub mod detector;
pub mod error;
pub mod loader;
pub mod model;

pub use config::{AnalysisConfig, DiffAlgorithm};
pub use detector::{RuleFileDetector, looks_like_rule_file};
pub use error::{InputError, InputErrors};
pub use loader::{Encoding, RuleFileLoader, RuleSet, VALID_EXTENSIONS};
pub use model::*;
