//! Domain models shared by the fetch and output layers

pub mod asn;

pub use asn::{AsnResult, normalize_asns};
