pub mod diff;
pub mod group;
pub mod impact;
pub mod normalize;
pub mod pipeline;
pub mod risk;

pub use diff::{RuleDiffer, diff};
pub use group::{RuleGrouper, group};
pub use impact::{ImpactScorer, score};
pub use normalize::{Normalizer, normalize};
pub use pipeline::RuleSetComparator;
pub use risk::{RISK_SIGNATURES, RiskClassifier, RiskSignature, SENSITIVE_PORTS, classify};
