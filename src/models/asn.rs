//! ASN input handling and per-ASN fetch results

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::client::models::{AddressFamily, IpRecord};

/// Parse free-text ASN input into an ordered set of numeric tokens.
///
/// Tokens are separated by any run of whitespace or commas. Anything that is
/// not purely decimal digits is dropped silently. Duplicates keep their first
/// position.
pub fn normalize_asns(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    raw.split(|c: char| c.is_whitespace() || c == ',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

/// Outcome of fetching one ASN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsnResult {
    /// ASN as entered (digits only)
    pub asn: String,

    /// Records returned by the backend, empty on error
    pub records: Vec<IpRecord>,

    /// Set when the retrieval failed and no cached copy was available
    pub error: bool,
}

impl AsnResult {
    /// A successful retrieval
    pub fn success(asn: impl Into<String>, records: Vec<IpRecord>) -> Self {
        Self {
            asn: asn.into(),
            records,
            error: false,
        }
    }

    /// A failed retrieval
    pub fn failed(asn: impl Into<String>) -> Self {
        Self {
            asn: asn.into(),
            records: Vec::new(),
            error: true,
        }
    }

    /// Count records of one address family
    pub fn count_family(&self, family: AddressFamily) -> usize {
        self.records.iter().filter(|r| r.family == family).count()
    }
}
