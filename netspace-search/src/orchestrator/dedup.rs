//! Asset deduplication by priority key.
//!
//! Each asset gets one identity key, chosen from the first usable rule:
//!
//! 1. normalised `host`, with `:port` appended when a port is known and the
//!    host does not already end in it
//! 2. `ip:port`
//! 3. `ip`
//! 4. `domain:port`
//! 5. `domain`
//!
//! Assets with no host, ip or domain have no key and are dropped. The first
//! asset with a given key wins; order is otherwise preserved.

use std::collections::HashSet;

use crate::types::Asset;

use super::host_normalize::normalize_host;

/// The identity key for `asset`, or `None` when it cannot be identified.
pub fn dedup_key(asset: &Asset) -> Option<String> {
    let host = normalize_host(&asset.host);
    let ip = asset.ip.trim();
    let domain = asset.domain.trim();
    let port = asset.port.trim();

    let with_port = |base: &str| {
        if port.is_empty() {
            base.to_string()
        } else {
            format!("{base}:{port}")
        }
    };

    if !host.is_empty() {
        if !port.is_empty() && host.ends_with(&format!(":{port}")) {
            return Some(host);
        }
        Some(with_port(&host))
    } else if !ip.is_empty() {
        Some(with_port(ip))
    } else if !domain.is_empty() {
        Some(with_port(domain))
    } else {
        None
    }
}

/// Remove duplicate assets, keeping the first occurrence of each key.
///
/// Applied to one target's assets at a time; the same service found for two
/// different targets is reported under both.
pub fn dedup(assets: Vec<Asset>) -> Vec<Asset> {
    let mut seen: HashSet<String> = HashSet::with_capacity(assets.len());
    let before = assets.len();

    let kept: Vec<Asset> = assets
        .into_iter()
        .filter(|asset| match dedup_key(asset) {
            Some(key) => seen.insert(key),
            None => false,
        })
        .collect();

    tracing::debug!(before, after = kept.len(), "assets deduplicated");
    kept
}
