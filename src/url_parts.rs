use url::Url;

/// Schemes accepted from callers before a URL reaches the engine.
const SUBMITTABLE_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// The pieces of a URL the rules look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: String,
    /// Lower-cased host. IPv6 literals are kept without brackets.
    pub host: Option<String>,
    pub path: String,
    pub query: String,
}

impl ParsedUrl {
    /// Path followed by `?query` when a query is present.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// Split a URL into its parts. Never fails.
///
/// Scheme, path and query are cut from the submitted text as-is, with no
/// percent-encoding and no dot-segment resolution. The host is read from the
/// raw authority, and only when `Url::parse` accepts the whole URL; anything
/// it rejects comes back without a host.
pub fn decompose(url: &str) -> ParsedUrl {
    let parts = split_raw(url);

    let host = match Url::parse(url) {
        Ok(_) => parts.authority.and_then(host_from_authority),
        Err(e) => {
            log::debug!("No host for {:?}: {}", url, e);
            None
        }
    };

    ParsedUrl {
        scheme: parts.scheme,
        host,
        path: parts.path.to_string(),
        query: parts.query.to_string(),
    }
}

struct RawParts<'a> {
    scheme: String,
    authority: Option<&'a str>,
    path: &'a str,
    query: &'a str,
}

fn split_raw(url: &str) -> RawParts<'_> {
    let (scheme, rest) = match url.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => (scheme.to_lowercase(), rest),
        _ => (String::new(), url),
    };

    let (authority, rest) = match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            (Some(&after[..end]), &after[end..])
        }
        None => (None, rest),
    };

    let rest = rest.split('#').next().unwrap_or("");
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

    RawParts {
        scheme,
        authority,
        path,
        query,
    }
}

/// Host text of an authority: userinfo and port dropped, IPv6 brackets
/// stripped, lower-cased. No IDNA or IPv4 shorthand rewriting.
fn host_from_authority(authority: &str) -> Option<String> {
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    let host = match host_port.split_once('[') {
        Some((_, bracketed)) => bracketed.split(']').next().unwrap_or(""),
        None => host_port.split(':').next().unwrap_or(""),
    };

    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Boundary check applied to submitted URLs before analysis.
pub fn validate_submission(url: &str) -> anyhow::Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("Missing 'url' field");
    }

    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL format"))?;

    if !SUBMITTABLE_SCHEMES.contains(&parsed.scheme()) || parsed.host_str().is_none() {
        anyhow::bail!("Invalid URL format");
    }

    Ok(())
}
