//! Prefix record models served by the backend

use serde::{Deserialize, Serialize};

/// Address family of an advertised prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

/// One allocated prefix as returned by `GET /api/asn/{asn}.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRecord {
    /// Regional registry that delegated the block (arin, ripencc, ...)
    pub registry: String,

    /// Address family
    #[serde(rename = "type")]
    pub family: AddressFamily,

    /// Prefix in CIDR notation
    pub cidr: String,

    /// ISO-3166 country code
    #[serde(rename = "cc")]
    pub country_code: String,

    /// First address of the block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// Prefix length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<u8>,

    /// Allocation date (YYYYMMDD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl IpRecord {
    /// Build a record with only the required fields set
    pub fn new(
        registry: impl Into<String>,
        family: AddressFamily,
        cidr: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            registry: registry.into(),
            family,
            cidr: cidr.into(),
            country_code: country_code.into(),
            start: None,
            prefix: None,
            date: None,
        }
    }
}
