use crate::rules::{find_rule, RULES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Score at or above which a URL is reported as phishing.
pub const DEFAULT_THRESHOLD: f64 = 0.75;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Tunable weights and decision threshold for the rule engine.
///
/// Rules are fixed; only their weights can change. A rule missing from
/// `weights` keeps its built-in weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            threshold: DEFAULT_THRESHOLD,
            weights: RULES
                .iter()
                .map(|rule| (rule.name.to_string(), rule.weight))
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `path` if it exists, otherwise fall back to the built-in values.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            log::warn!(
                "Configuration file '{}' not found, using default configuration",
                path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            anyhow::bail!("threshold must be within [0, 1], got {}", self.threshold);
        }

        for (name, weight) in &self.weights {
            if find_rule(name).is_none() {
                anyhow::bail!("unknown rule '{}' in weights", name);
            }
            if !weight.is_finite() || *weight <= 0.0 {
                anyhow::bail!("weight for '{}' must be a positive number, got {}", name, weight);
            }
        }

        Ok(())
    }

    /// Effective weight for a rule name.
    pub fn weight_for(&self, name: &str) -> Option<f64> {
        self.weights
            .get(name)
            .copied()
            .or_else(|| find_rule(name).map(|rule| rule.weight))
    }
}
