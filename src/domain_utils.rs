/// Minimal host label utilities
pub struct DomainUtils;

impl DomainUtils {
    /// Split a host into its dot-separated labels
    pub fn labels(host: &str) -> Vec<&str> {
        host.split('.').collect()
    }

    /// Naive registered domain: the last two labels joined back together.
    /// Multi-part public suffixes such as `co.uk` are not recognised.
    pub fn registered_domain(labels: &[&str]) -> Option<String> {
        if labels.len() < 2 {
            return None;
        }
        Some(labels[labels.len() - 2..].join(".").to_lowercase())
    }

    /// Every label in front of the registered domain
    pub fn subdomain_labels<'a, 'b>(labels: &'b [&'a str]) -> &'b [&'a str] {
        labels
            .len()
            .checked_sub(2)
            .map_or(&[][..], |end| &labels[..end])
    }

    /// Check if any hint occurs as a substring of `text`
    pub fn contains_any(text: &str, hints: &[&str]) -> bool {
        hints.iter().any(|hint| text.contains(hint))
    }
}
