//! Router configuration generation
//!
//! `generate` is a pure function of the fetched results and the display
//! settings; calling it twice with the same inputs yields identical text.

use serde::{Deserialize, Serialize};

use super::render::Vendor;
use crate::client::models::{AddressFamily, IpRecord};
use crate::models::AsnResult;

/// List name used when all ASNs are merged into one list
pub const MERGED_LIST_NAME: &str = "NETMIRROR_LIST";

/// Positional index advances by this much per prefix
pub const INDEX_STRIDE: usize = 5;

/// Operator-controlled output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub vendor: Vendor,
    pub merge: bool,
    pub show_ipv4: bool,
    pub show_ipv6: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            vendor: Vendor::Cisco,
            merge: true,
            show_ipv4: true,
            show_ipv6: true,
        }
    }
}

impl DisplayConfig {
    /// Whether a record survives the address-family filter
    pub fn shows(&self, record: &IpRecord) -> bool {
        match record.family {
            AddressFamily::Ipv4 => self.show_ipv4,
            AddressFamily::Ipv6 => self.show_ipv6,
        }
    }

    fn filter<'a>(&self, records: &'a [IpRecord]) -> Vec<&'a IpRecord> {
        records.iter().filter(|r| self.shows(r)).collect()
    }
}

/// Summary counts over a fetch cycle (before family filtering)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_asns: usize,
    pub ipv4: usize,
    pub ipv6: usize,
    pub errors: usize,
}

impl Stats {
    pub fn from_results(results: &[AsnResult]) -> Self {
        results.iter().fold(Stats::default(), |mut stats, result| {
            if result.error {
                stats.errors += 1;
            } else {
                stats.total_asns += 1;
            }
            stats.ipv4 += result.count_family(AddressFamily::Ipv4);
            stats.ipv6 += result.count_family(AddressFamily::Ipv6);
            stats
        })
    }
}

/// Render the configuration text for `results`
pub fn generate(results: &[AsnResult], config: &DisplayConfig) -> String {
    if results.is_empty() {
        return String::new();
    }

    if config.merge {
        generate_merged(results, config)
    } else {
        generate_per_asn(results, config)
    }
}

fn generate_merged(results: &[AsnResult], config: &DisplayConfig) -> String {
    let stats = Stats::from_results(results);
    let mut output = format!("! --- NETMIRROR: {} ASNs MERGED ---\n", stats.total_asns);

    let records = results.iter().flat_map(|r| config.filter(&r.records));
    push_lines(&mut output, records, config.vendor, MERGED_LIST_NAME);
    output
}

fn generate_per_asn(results: &[AsnResult], config: &DisplayConfig) -> String {
    let mut output = String::new();

    for result in results {
        if result.error {
            output.push_str(&format!("! ERROR: ASN {} not found\n", result.asn));
            continue;
        }

        let records = config.filter(&result.records);
        if records.is_empty() {
            continue;
        }

        output.push_str(&format!(
            "! --- ASN {} ({} prefixes) ---\n",
            result.asn,
            records.len()
        ));
        let list_name = format!("AS{}", result.asn);
        push_lines(&mut output, records, config.vendor, &list_name);
        output.push('\n');
    }

    output
}

fn push_lines<'a>(
    output: &mut String,
    records: impl IntoIterator<Item = &'a IpRecord>,
    vendor: Vendor,
    list_name: &str,
) {
    let render = vendor.renderer();
    for (i, record) in records.into_iter().enumerate() {
        output.push_str(&render(&record.cidr, i * INDEX_STRIDE, list_name));
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(cidr: &str) -> IpRecord {
        IpRecord::new("arin", AddressFamily::Ipv4, cidr, "US")
    }

    fn v6(cidr: &str) -> IpRecord {
        IpRecord::new("arin", AddressFamily::Ipv6, cidr, "US")
    }

    fn config(vendor: Vendor, merge: bool) -> DisplayConfig {
        DisplayConfig {
            vendor,
            merge,
            show_ipv4: true,
            show_ipv6: true,
        }
    }

    fn sample() -> Vec<AsnResult> {
        vec![
            AsnResult::success("100", vec![v4("10.0.0.0/24"), v6("2001:db8::/32")]),
            AsnResult::failed("200"),
            AsnResult::success("300", vec![v4("192.0.2.0/24")]),
        ]
    }

    #[test]
    fn test_empty_results_yield_empty_output() {
        assert_eq!(generate(&[], &DisplayConfig::default()), "");
        assert_eq!(generate(&[], &config(Vendor::Bird, false)), "");
    }

    #[test]
    fn test_per_asn_scenario() {
        let results = vec![
            AsnResult::success("100", vec![v4("10.0.0.0/24")]),
            AsnResult::failed("200"),
        ];

        let output = generate(&results, &config(Vendor::Cisco, false));

        assert_eq!(
            output,
            "! --- ASN 100 (1 prefixes) ---\n\
             ip prefix-list AS100 seq 5 permit 10.0.0.0/24\n\
             \n\
             ! ERROR: ASN 200 not found\n"
        );
        assert!(!output.contains("AS200 "));
    }

    #[test]
    fn test_merged_output() {
        let output = generate(&sample(), &config(Vendor::Cisco, true));

        assert_eq!(
            output,
            "! --- NETMIRROR: 2 ASNs MERGED ---\n\
             ip prefix-list NETMIRROR_LIST seq 5 permit 10.0.0.0/24\n\
             ip prefix-list NETMIRROR_LIST seq 10 permit 2001:db8::/32\n\
             ip prefix-list NETMIRROR_LIST seq 15 permit 192.0.2.0/24\n"
        );
    }

    #[test]
    fn test_per_asn_index_restarts() {
        let output = generate(&sample(), &config(Vendor::Huawei, false));

        assert!(output.contains("ip ip-prefix AS100 index 10 permit 10.0.0.0/24\n"));
        assert!(output.contains("ip ip-prefix AS100 index 15 permit 2001:db8::/32\n"));
        assert!(output.contains("ip ip-prefix AS300 index 10 permit 192.0.2.0/24\n"));
    }

    #[test]
    fn test_per_asn_skips_asn_with_nothing_left_after_filter() {
        let mut cfg = config(Vendor::Plain, false);
        cfg.show_ipv4 = false;

        let output = generate(&sample(), &cfg);

        assert_eq!(
            output,
            "! --- ASN 100 (1 prefixes) ---\n2001:db8::/32\n\n! ERROR: ASN 200 not found\n"
        );
    }

    #[test]
    fn test_family_filter_is_exhaustive() {
        let mut cfg = config(Vendor::Cisco, true);
        cfg.show_ipv4 = false;
        cfg.show_ipv6 = false;

        let merged = generate(&sample(), &cfg);
        assert_eq!(merged, "! --- NETMIRROR: 2 ASNs MERGED ---\n");

        cfg.merge = false;
        let per_asn = generate(&sample(), &cfg);
        assert!(!per_asn.contains("prefix-list"));
        assert_eq!(per_asn, "! ERROR: ASN 200 not found\n");
    }

    #[test]
    fn test_merged_header_counts_only_successes() {
        let all_failed = vec![AsnResult::failed("1"), AsnResult::failed("2")];
        assert_eq!(
            generate(&all_failed, &DisplayConfig::default()),
            "! --- NETMIRROR: 0 ASNs MERGED ---\n"
        );

        let all_ok = vec![
            AsnResult::success("1", vec![]),
            AsnResult::success("2", vec![v4("10.0.0.0/8")]),
        ];
        assert!(
            generate(&all_ok, &DisplayConfig::default())
                .starts_with("! --- NETMIRROR: 2 ASNs MERGED ---\n")
        );
    }

    #[test]
    fn test_generate_is_idempotent() {
        let results = sample();
        for vendor in Vendor::ALL {
            for merge in [true, false] {
                let cfg = config(vendor, merge);
                assert_eq!(generate(&results, &cfg), generate(&results, &cfg));
            }
        }
    }

    #[test]
    fn test_stats() {
        let stats = Stats::from_results(&sample());
        assert_eq!(
            stats,
            Stats {
                total_asns: 2,
                ipv4: 2,
                ipv6: 1,
                errors: 1
            }
        );
    }

    #[test]
    fn test_bird_merged() {
        let output = generate(&sample(), &config(Vendor::Bird, true));
        assert!(output.contains("route 10.0.0.0/24 via \"bgp_uplink\";\n"));
        assert_eq!(output.lines().count(), 4);
    }
}
