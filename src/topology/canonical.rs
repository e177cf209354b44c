//! Canonical device identities and undirected link keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a hostname: trimmed, lower-cased, domain stripped.
///
/// `"R1.example.com "` and `"r1"` both canonicalize to `"r1"`. Returns
/// `None` when nothing usable is left.
pub fn canonical_hostname(hostname: &str) -> Option<String> {
    let short = hostname.trim().split('.').next()?.trim();
    if short.is_empty() {
        None
    } else {
        Some(short.to_lowercase())
    }
}

/// Unordered pair of canonical hostnames identifying one physical link
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkKey {
    low: String,
    high: String,
}

impl LinkKey {
    /// Key for a link between two canonical names, in either order
    pub fn new(a: String, b: String) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Canonicalize both endpoints; `None` if either cannot be canonicalized
    pub fn between(a: &str, b: &str) -> Option<Self> {
        Some(Self::new(canonical_hostname(a)?, canonical_hostname(b)?))
    }

    pub fn endpoints(&self) -> (&str, &str) {
        (&self.low, &self.high)
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_hostname() {
        assert_eq!(canonical_hostname("r1.example.com").as_deref(), Some("r1"));
        assert_eq!(canonical_hostname("  CORE-SW01.corp.local ").as_deref(), Some("core-sw01"));
        assert_eq!(canonical_hostname("S1").as_deref(), Some("s1"));
        assert_eq!(canonical_hostname(""), None);
        assert_eq!(canonical_hostname("   "), None);
        assert_eq!(canonical_hostname(".example.com"), None);
    }

    #[test]
    fn test_canonical_hostname_is_idempotent() {
        for name in ["r1.example.com", "  Edge-01 ", "SW.a.b.c", "x", "Mixed.Case.Domain"] {
            let once = canonical_hostname(name).unwrap();
            assert_eq!(canonical_hostname(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn test_link_key_is_symmetric() {
        let ab = LinkKey::between("r1.example.com", "s1.example.com").unwrap();
        let ba = LinkKey::between("S1", "R1").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.endpoints(), ("r1", "s1"));
        assert_eq!(ab.to_string(), "r1 <-> s1");
    }

    #[test]
    fn test_link_key_rejects_blank_endpoint() {
        assert!(LinkKey::between("r1", "").is_none());
        assert!(LinkKey::between("  ", "r1").is_none());
    }
}
