pub mod analyzer;
pub mod config;
pub mod domain_utils;
pub mod rules;
pub mod url_parts;

pub use analyzer::{analyze_url, AnalysisResult, Report, RuleEngine, RuleResult};
pub use config::EngineConfig;
pub use rules::{Rule, RULES};
pub use url_parts::{decompose, validate_submission, ParsedUrl};
