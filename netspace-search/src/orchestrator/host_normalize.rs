//! Host normalisation for asset deduplication.
//!
//! Providers disagree on whether `host` carries a scheme (FOFA reports
//! `https://www.example.com` for TLS services, Hunter and Quake report a
//! bare name), and on capitalisation. Both collapse here.

/// Normalise a host string for key comparison.
///
/// 1. Trim surrounding whitespace.
/// 2. Lowercase.
/// 3. Strip a leading `http://` or `https://`.
///
/// Ports and paths are left alone.
///
/// # Examples
///
/// ```
/// use netspace_search::orchestrator::host_normalize::normalize_host;
///
/// assert_eq!(normalize_host(" HTTPS://WWW.Example.com "), "www.example.com");
/// assert_eq!(normalize_host("api.example.com:8443"), "api.example.com:8443");
/// ```
pub fn normalize_host(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    stripped.to_string()
}

/// Strip scheme and port from a host, leaving the bare name.
///
/// Used when only a name is wanted (plain-text export).
pub fn bare_host(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_scheme = ["https://", "http://", "HTTPS://", "HTTP://"]
        .iter()
        .find_map(|p| trimmed.strip_prefix(p))
        .unwrap_or(trimmed);
    without_scheme
        .split(['/', ':'])
        .next()
        .unwrap_or(without_scheme)
}
