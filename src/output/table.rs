//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::generator::DisplayConfig;
use crate::client::models::AddressFamily;
use crate::models::AsnResult;

/// One summary row per fetched ASN
#[derive(Debug, Tabled)]
pub struct AsnRow {
    #[tabled(rename = "ASN")]
    pub asn: String,
    #[tabled(rename = "STATUS")]
    pub status: String,
    #[tabled(rename = "IPV4")]
    pub ipv4: usize,
    #[tabled(rename = "IPV6")]
    pub ipv6: usize,
    #[tabled(rename = "SHOWN")]
    pub shown: usize,
}

impl AsnRow {
    pub fn from_result(result: &AsnResult, display: &DisplayConfig) -> Self {
        Self {
            asn: format!("AS{}", result.asn),
            status: if result.error { "not found" } else { "ok" }.to_string(),
            ipv4: result.count_family(AddressFamily::Ipv4),
            ipv6: result.count_family(AddressFamily::Ipv6),
            shown: result.records.iter().filter(|r| display.shows(r)).count(),
        }
    }
}

/// Build summary rows for a fetch cycle
pub fn asn_rows(results: &[AsnResult], display: &DisplayConfig) -> Vec<AsnRow> {
    results
        .iter()
        .map(|r| AsnRow::from_result(r, display))
        .collect()
}

/// Format data as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}
