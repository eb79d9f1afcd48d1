//! Vendor dialects and per-prefix line rendering

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Signature shared by every dialect: (cidr, positional index, list name)
pub type LineRenderer = fn(&str, usize, &str) -> String;

/// Router configuration dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Vendor {
    /// Cisco IOS `ip prefix-list`
    #[default]
    Cisco,
    /// Huawei VRP `ip ip-prefix`
    Huawei,
    /// Junos `policy-options prefix-list`
    Juniper,
    /// RouterOS firewall address-list
    Mikrotik,
    /// RouterOS v7 routing filter rule
    MikrotikRoute,
    /// BIRD static route
    Bird,
    /// Bare CIDR, one per line; also used for unrecognised dialect names
    Plain,
}

impl Vendor {
    pub const ALL: [Vendor; 7] = [
        Vendor::Cisco,
        Vendor::Huawei,
        Vendor::Juniper,
        Vendor::Mikrotik,
        Vendor::MikrotikRoute,
        Vendor::Bird,
        Vendor::Plain,
    ];

    /// Parse a dialect name; anything unrecognised renders bare CIDRs
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cisco" => Vendor::Cisco,
            "huawei" => Vendor::Huawei,
            "juniper" => Vendor::Juniper,
            "mikrotik" => Vendor::Mikrotik,
            "mikrotik_route" => Vendor::MikrotikRoute,
            "bird" => Vendor::Bird,
            other => {
                if other != "plain" {
                    log::debug!("Unknown vendor '{}', emitting bare prefixes", other);
                }
                Vendor::Plain
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Vendor::Cisco => "cisco",
            Vendor::Huawei => "huawei",
            Vendor::Juniper => "juniper",
            Vendor::Mikrotik => "mikrotik",
            Vendor::MikrotikRoute => "mikrotik_route",
            Vendor::Bird => "bird",
            Vendor::Plain => "plain",
        }
    }

    /// Rendering function for this dialect
    pub fn renderer(self) -> LineRenderer {
        match self {
            Vendor::Cisco => cisco_line,
            Vendor::Huawei => huawei_line,
            Vendor::Juniper => juniper_line,
            Vendor::Mikrotik => mikrotik_line,
            Vendor::MikrotikRoute => mikrotik_route_line,
            Vendor::Bird => bird_line,
            Vendor::Plain => plain_line,
        }
    }

    /// Render one prefix line (without trailing newline)
    pub fn render_line(self, cidr: &str, index: usize, list_name: &str) -> String {
        (self.renderer())(cidr, index, list_name)
    }
}

fn cisco_line(cidr: &str, index: usize, list: &str) -> String {
    format!("ip prefix-list {} seq {} permit {}", list, index + 5, cidr)
}

fn huawei_line(cidr: &str, index: usize, list: &str) -> String {
    format!("ip ip-prefix {} index {} permit {}", list, index + 10, cidr)
}

fn juniper_line(cidr: &str, _index: usize, list: &str) -> String {
    format!("set policy-options prefix-list {} {}", list, cidr)
}

fn mikrotik_line(cidr: &str, _index: usize, list: &str) -> String {
    format!("/ip firewall address-list add list={} address={}", list, cidr)
}

fn mikrotik_route_line(cidr: &str, _index: usize, list: &str) -> String {
    format!(
        "/routing filter rule add chain={} rule=\"if (dst in {}) {{ accept }}\"",
        list, cidr
    )
}

fn bird_line(cidr: &str, _index: usize, _list: &str) -> String {
    format!("route {} via \"bgp_uplink\";", cidr)
}

fn plain_line(cidr: &str, _index: usize, _list: &str) -> String {
    cidr.to_string()
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Vendor {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Vendor::from_name(s))
    }
}

impl Serialize for Vendor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Vendor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Vendor::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cisco_sequence_offset() {
        assert_eq!(
            Vendor::Cisco.render_line("10.0.0.0/24", 0, "AS100"),
            "ip prefix-list AS100 seq 5 permit 10.0.0.0/24"
        );
        assert_eq!(
            Vendor::Cisco.render_line("10.0.1.0/24", 5, "AS100"),
            "ip prefix-list AS100 seq 10 permit 10.0.1.0/24"
        );
    }

    #[test]
    fn test_huawei_index_offset() {
        assert_eq!(
            Vendor::Huawei.render_line("10.0.0.0/24", 5, "NETMIRROR_LIST"),
            "ip ip-prefix NETMIRROR_LIST index 15 permit 10.0.0.0/24"
        );
    }

    #[test]
    fn test_index_free_dialects() {
        assert_eq!(
            Vendor::Juniper.render_line("2001:db8::/32", 10, "AS1"),
            "set policy-options prefix-list AS1 2001:db8::/32"
        );
        assert_eq!(
            Vendor::Mikrotik.render_line("192.0.2.0/24", 10, "AS1"),
            "/ip firewall address-list add list=AS1 address=192.0.2.0/24"
        );
        assert_eq!(
            Vendor::MikrotikRoute.render_line("192.0.2.0/24", 10, "AS1"),
            "/routing filter rule add chain=AS1 rule=\"if (dst in 192.0.2.0/24) { accept }\""
        );
        assert_eq!(
            Vendor::Bird.render_line("192.0.2.0/24", 10, "AS1"),
            "route 192.0.2.0/24 via \"bgp_uplink\";"
        );
        assert_eq!(Vendor::Plain.render_line("192.0.2.0/24", 10, "AS1"), "192.0.2.0/24");
    }

    #[test]
    fn test_from_name() {
        for vendor in Vendor::ALL {
            assert_eq!(Vendor::from_name(vendor.name()), vendor);
        }
        assert_eq!(Vendor::from_name("MikroTik-Route"), Vendor::MikrotikRoute);
        assert_eq!(Vendor::from_name("arista"), Vendor::Plain);
        assert_eq!("JUNIPER".parse::<Vendor>().unwrap(), Vendor::Juniper);
    }

    #[test]
    fn test_serde_uses_names() {
        let yaml = serde_yaml::to_string(&Vendor::MikrotikRoute).unwrap();
        assert_eq!(yaml.trim(), "mikrotik_route");

        let parsed: Vendor = serde_yaml::from_str("bird").unwrap();
        assert_eq!(parsed, Vendor::Bird);
        let unknown: Vendor = serde_yaml::from_str("nokia").unwrap();
        assert_eq!(unknown, Vendor::Plain);
    }
}
