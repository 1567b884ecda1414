use serde::Serialize;
use std::net::IpAddr;
use sysinfo::Networks;

/// An external interface with an IPv4 address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInterface {
    pub iface: String,
    pub ip4: String,
    /// Empty when the interface has no IPv6 address.
    pub ip6: String,
    pub mac: String,
    /// Link speed in Mbit/s, 0 when unknown.
    pub speed: u64,
}

/// Collect the host's external interfaces, sorted by name.
pub fn collect() -> Vec<NetworkInterface> {
    let networks = Networks::new_with_refreshed_list();

    let mut interfaces: Vec<NetworkInterface> = networks
        .iter()
        .filter_map(|(name, data)| {
            let addrs: Vec<IpAddr> = data
                .ip_networks()
                .iter()
                .map(|net| net.addr)
                .collect();
            describe(name, data.mac_address().to_string(), &addrs)
        })
        .collect();
    interfaces.sort_by(|a, b| a.iface.cmp(&b.iface));
    interfaces
}

/// Build the entry for one interface, or `None` for loopback interfaces and
/// interfaces without a routable IPv4 address.
fn describe(name: &str, mac: String, addrs: &[IpAddr]) -> Option<NetworkInterface> {
    if addrs.iter().any(IpAddr::is_loopback) {
        return None;
    }
    let ip4 = addrs.iter().find(|a| a.is_ipv4())?;
    let ip6 = addrs.iter().find(|a| a.is_ipv6());

    Some(NetworkInterface {
        iface: name.to_string(),
        ip4: ip4.to_string(),
        ip6: ip6.map(ToString::to_string).unwrap_or_default(),
        mac,
        // sysinfo does not report link speed.
        speed: 0,
    })
}
