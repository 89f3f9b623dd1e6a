use crate::domain_utils::DomainUtils;
use crate::url_parts::ParsedUrl;
use std::net::IpAddr;

const MAX_URL_LENGTH: usize = 100;
const MAX_HOST_LENGTH: usize = 50;
const MAX_SUBDOMAIN_LABELS: usize = 3;
const SPECIAL_CHARACTER_RATIO: f64 = 0.3;

const SPECIAL_CHARACTERS: [char; 7] = ['@', '-', '_', '?', '=', '&', '%'];
const SUSPICIOUS_KEYWORDS: [&str; 6] = ["login", "verify", "secure", "update", "account", "confirm"];
const SENSITIVE_HOST_HINTS: [&str; 3] = ["bank", "login", "paypal"];
const IMPERSONATION_HINTS: [&str; 4] = ["paypal", "bank", "secure", "login"];
const BRAND_HINTS: [&str; 2] = ["paypal", "bank"];

/// Signature shared by every heuristic: the decomposed URL and the raw string.
pub type Predicate = fn(&ParsedUrl, &str) -> bool;

/// A named, weighted heuristic.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub description: &'static str,
    pub weight: f64,
    pub predicate: Predicate,
}

impl Rule {
    pub fn evaluate(&self, parsed: &ParsedUrl, url: &str) -> bool {
        (self.predicate)(parsed, url)
    }
}

/// The rule table. Order is part of the output contract.
pub static RULES: [Rule; 6] = [
    Rule {
        name: "contains_ip_address",
        description: "URL contains an IP address instead of a domain name.",
        weight: 0.25,
        predicate: contains_ip_address,
    },
    Rule {
        name: "url_length",
        description: "URL or domain length is unusually long.",
        weight: 0.15,
        predicate: url_length,
    },
    Rule {
        name: "suspicious_subdomains",
        description: "URL has excessive or impersonating subdomains.",
        weight: 0.2,
        predicate: suspicious_subdomains,
    },
    Rule {
        name: "use_of_https",
        description: "Sensitive-looking site does not use HTTPS.",
        weight: 0.2,
        predicate: use_of_https,
    },
    Rule {
        name: "special_characters",
        description: "High ratio of special characters in path or query.",
        weight: 0.1,
        predicate: special_characters,
    },
    Rule {
        name: "suspicious_keywords",
        description: "URL contains common phishing keywords (e.g., 'login', 'verify').",
        weight: 0.1,
        predicate: suspicious_keywords,
    },
];

/// Look up a rule by name
pub fn find_rule(name: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.name == name)
}

/// Host is a literal IPv4 or IPv6 address rather than a domain name.
pub fn contains_ip_address(parsed: &ParsedUrl, _url: &str) -> bool {
    parsed
        .host
        .as_deref()
        .is_some_and(|host| host.parse::<IpAddr>().is_ok())
}

/// Either the whole URL or the host alone is too long.
pub fn url_length(parsed: &ParsedUrl, url: &str) -> bool {
    let Some(host) = parsed.host.as_deref() else {
        return false;
    };
    url.chars().count() > MAX_URL_LENGTH || host.chars().count() > MAX_HOST_LENGTH
}

/// Too many subdomains, or brand-like words that only appear in the subdomain.
pub fn suspicious_subdomains(parsed: &ParsedUrl, _url: &str) -> bool {
    let Some(host) = parsed.host.as_deref() else {
        return false;
    };

    let labels = DomainUtils::labels(host);
    let Some(registered) = DomainUtils::registered_domain(&labels) else {
        return false;
    };
    let subdomains = DomainUtils::subdomain_labels(&labels);

    if subdomains.len() > MAX_SUBDOMAIN_LABELS {
        log::debug!("{} has {} subdomain labels", host, subdomains.len());
        return true;
    }

    let subdomain = subdomains.join(".").to_lowercase();
    DomainUtils::contains_any(&subdomain, &IMPERSONATION_HINTS)
        && !DomainUtils::contains_any(&registered, &BRAND_HINTS)
}

/// Banking or login looking page served over anything but https.
pub fn use_of_https(parsed: &ParsedUrl, _url: &str) -> bool {
    let host = parsed.host.as_deref().unwrap_or("").to_lowercase();
    let path = parsed.path.to_lowercase();

    let looks_sensitive = SENSITIVE_HOST_HINTS
        .iter()
        .any(|hint| host.contains(hint) || path.contains(hint));

    looks_sensitive && parsed.scheme != "https"
}

/// Path and query are dominated by punctuation used in obfuscated links.
pub fn special_characters(parsed: &ParsedUrl, _url: &str) -> bool {
    let target = parsed.path_and_query();
    let length = target.chars().count();
    if length == 0 {
        return false;
    }

    let specials = target
        .chars()
        .filter(|c| SPECIAL_CHARACTERS.contains(c))
        .count();

    specials as f64 / length as f64 > SPECIAL_CHARACTER_RATIO
}

/// Path or query mentions words typical for credential harvesting.
pub fn suspicious_keywords(parsed: &ParsedUrl, _url: &str) -> bool {
    let text = parsed.path_and_query().to_lowercase();
    DomainUtils::contains_any(&text, &SUSPICIOUS_KEYWORDS)
}
