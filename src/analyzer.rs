use crate::config::{EngineConfig, DEFAULT_THRESHOLD};
use crate::rules::{Rule, RULES};
use crate::url_parts::decompose;
use serde::{Deserialize, Serialize};

/// Outcome of a single rule for one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_name: String,
    pub description: String,
    pub matched: bool,
}

/// Verdict for one URL, one `RuleResult` per rule in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub url: String,
    pub is_phishing: bool,
    pub score: f64,
    pub rules_triggered: Vec<RuleResult>,
}

/// What callers see: an `AnalysisResult` with the score rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub url: String,
    pub is_phishing: bool,
    pub score: f64,
    pub rules_triggered: Vec<RuleResult>,
}

impl AnalysisResult {
    pub fn matched_rules(&self) -> impl Iterator<Item = &RuleResult> {
        self.rules_triggered.iter().filter(|result| result.matched)
    }

    pub fn to_report(&self) -> Report {
        Report {
            url: self.url.clone(),
            is_phishing: self.is_phishing,
            score: round_score(self.score),
            rules_triggered: self.rules_triggered.clone(),
        }
    }
}

impl Report {
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

struct WeightedRule {
    rule: &'static Rule,
    weight: f64,
}

/// Runs every rule against a URL and folds the matches into a score.
///
/// The engine is immutable once built and can be shared across threads.
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
    threshold: f64,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// Engine with the built-in weights and threshold.
    pub fn new() -> Self {
        Self {
            rules: RULES
                .iter()
                .map(|rule| WeightedRule {
                    rule,
                    weight: rule.weight,
                })
                .collect(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn from_config(config: &EngineConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let rules = RULES
            .iter()
            .map(|rule| WeightedRule {
                rule,
                weight: config.weight_for(rule.name).unwrap_or(rule.weight),
            })
            .collect();

        Ok(Self {
            rules,
            threshold: config.threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `(rule, effective weight)` in table order.
    pub fn weights(&self) -> impl Iterator<Item = (&'static Rule, f64)> + '_ {
        self.rules.iter().map(|entry| (entry.rule, entry.weight))
    }

    pub fn total_weight(&self) -> f64 {
        self.rules.iter().map(|entry| entry.weight).sum()
    }

    /// Score a URL. Total over its input: malformed URLs simply match fewer rules.
    pub fn analyze(&self, url: &str) -> AnalysisResult {
        let parsed = decompose(url);
        let total_weight = self.total_weight();

        let mut matched_score = 0.0;
        let mut rules_triggered = Vec::with_capacity(self.rules.len());

        for entry in &self.rules {
            let matched = entry.rule.evaluate(&parsed, url);
            if matched {
                log::debug!("Rule '{}' matched {}", entry.rule.name, url);
                matched_score += entry.weight;
            }
            rules_triggered.push(RuleResult {
                rule_name: entry.rule.name.to_string(),
                description: entry.rule.description.to_string(),
                matched,
            });
        }

        let score = if total_weight > 0.0 {
            (matched_score / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let is_phishing = score >= self.threshold;

        log::debug!(
            "Analyzed {}: score={:.4} phishing={}",
            url,
            score,
            is_phishing
        );

        AnalysisResult {
            url: url.to_string(),
            is_phishing,
            score,
            rules_triggered,
        }
    }
}

/// Score a URL with the built-in rule table and threshold.
pub fn analyze_url(url: &str) -> AnalysisResult {
    RuleEngine::new().analyze(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phishing_url() -> String {
        format!("http://192.168.1.1/login?{}", "a=-&".repeat(25))
    }

    fn assert_invariants(result: &AnalysisResult, threshold: f64) {
        assert!((0.0..=1.0).contains(&result.score), "score {}", result.score);
        assert_eq!(result.is_phishing, result.score >= threshold);
        assert_eq!(result.rules_triggered.len(), RULES.len());
        for (result, rule) in result.rules_triggered.iter().zip(RULES.iter()) {
            assert_eq!(result.rule_name, rule.name);
            assert_eq!(result.description, rule.description);
        }
    }

    #[test]
    fn test_ip_login_url() {
        let result = analyze_url("http://192.168.1.1/login");
        assert_invariants(&result, DEFAULT_THRESHOLD);

        let matched: Vec<&str> = result.matched_rules().map(|r| r.rule_name.as_str()).collect();
        assert_eq!(
            matched,
            vec!["contains_ip_address", "use_of_https", "suspicious_keywords"]
        );
        assert!((result.score - 0.55).abs() < 1e-9);
        assert!(!result.is_phishing);
    }

    #[test]
    fn test_phishing_verdict() {
        let url = phishing_url();
        let result = analyze_url(&url);
        assert_invariants(&result, DEFAULT_THRESHOLD);

        assert!((result.score - 0.8).abs() < 1e-9);
        assert!(result.is_phishing);
        assert_eq!(result.url, url);
    }

    #[test]
    fn test_clean_url_scores_zero() {
        let result = analyze_url("https://www.example.com/");
        assert_invariants(&result, DEFAULT_THRESHOLD);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.matched_rules().count(), 0);
    }

    #[test]
    fn test_non_latin_path_scores_zero() {
        let result = analyze_url("https://example.com/новости/сегодня");
        assert_invariants(&result, DEFAULT_THRESHOLD);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_dot_segments_do_not_hide_keywords() {
        let result = analyze_url("http://example.com/login/../home");
        let matched: Vec<&str> = result.matched_rules().map(|r| r.rule_name.as_str()).collect();
        assert_eq!(matched, vec!["use_of_https", "suspicious_keywords"]);
    }

    #[test]
    fn test_malformed_input_never_fails() {
        for url in ["", " ", "http://", "::::", "http://[::1", "%%%?==&&", "\u{202e}login"] {
            let result = analyze_url(url);
            assert_invariants(&result, DEFAULT_THRESHOLD);
            assert_eq!(result.url, url);
            assert!(!result.rules_triggered[0].matched);
            assert!(!result.rules_triggered[1].matched);
            assert!(!result.rules_triggered[2].matched);
        }

        assert_eq!(analyze_url("").score, 0.0);
    }

    #[test]
    fn test_hostless_input_keeps_textual_signals() {
        let result = analyze_url("account/verify");
        let matched: Vec<&str> = result.matched_rules().map(|r| r.rule_name.as_str()).collect();
        assert_eq!(matched, vec!["suspicious_keywords"]);
        assert!((result.score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let url = "http://secure.login.example.com/account/update?id=1";
        assert_eq!(analyze_url(url), analyze_url(url));
    }

    #[test]
    fn test_report_rounding_and_json() {
        let result = analyze_url("http://secure.login.example.com/home");
        assert_invariants(&result, DEFAULT_THRESHOLD);

        let report = result.to_report();
        assert_eq!(report.score, round_score(result.score));
        assert_eq!(report.score, 0.4);

        let json = report.to_json(false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["url"], "http://secure.login.example.com/home");
        assert_eq!(value["is_phishing"], false);
        assert_eq!(value["rules_triggered"].as_array().unwrap().len(), 6);
        assert_eq!(value["rules_triggered"][2]["rule_name"], "suspicious_subdomains");
        assert_eq!(value["rules_triggered"][2]["matched"], true);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456), 0.1235);
        assert_eq!(round_score(1.0), 1.0);
        assert_eq!(round_score(0.0), 0.0);
    }

    #[test]
    fn test_configured_threshold() {
        let mut config = EngineConfig::default();
        config.threshold = 0.5;
        let engine = RuleEngine::from_config(&config).unwrap();

        let result = engine.analyze("http://192.168.1.1/login");
        assert_invariants(&result, 0.5);
        assert!(result.is_phishing);
    }

    #[test]
    fn test_configured_weights_renormalize() {
        let mut config = EngineConfig::default();
        config.weights.insert("suspicious_keywords".to_string(), 2.0);
        let engine = RuleEngine::from_config(&config).unwrap();

        assert!((engine.total_weight() - 2.9).abs() < 1e-9);

        let result = engine.analyze("https://example.com/account");
        assert!((result.score - 2.0 / 2.9).abs() < 1e-9);
        assert!(!result.is_phishing);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = EngineConfig::default();
        config.weights.insert("url_length".to_string(), -1.0);
        assert!(RuleEngine::from_config(&config).is_err());
    }

    #[test]
    fn test_default_weights_listing() {
        let engine = RuleEngine::default();
        let weights: Vec<(&str, f64)> = engine.weights().map(|(r, w)| (r.name, w)).collect();
        assert_eq!(weights.len(), 6);
        assert_eq!(weights[0], ("contains_ip_address", 0.25));
        assert!((engine.total_weight() - 1.0).abs() < 1e-9);
        assert_eq!(engine.threshold(), 0.75);
    }

    #[test]
    fn test_shared_across_threads() {
        let engine = RuleEngine::new();
        let urls = ["http://192.168.1.1/login", "https://example.com", "http://a.b.c.d.example.com"];

        std::thread::scope(|scope| {
            let handles: Vec<_> = urls
                .iter()
                .map(|url| {
                    let engine = &engine;
                    scope.spawn(move || engine.analyze(url))
                })
                .collect();

            for (handle, url) in handles.into_iter().zip(urls.iter()) {
                assert_eq!(handle.join().unwrap(), engine.analyze(url));
            }
        });
    }
}
