//! Address scoping helpers.

use std::net::IpAddr;

/// Returns true when the address is routable on the public internet and
/// therefore eligible for geolocation enrichment.
///
/// Private, loopback, link-local, and unspecified addresses are never
/// enriched; traffic from them is scoped as internal.
pub fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            let seg0 = v6.segments()[0];
            // fc00::/7 unique-local, fe80::/10 link-local
            !(v6.is_loopback()
                || v6.is_unspecified()
                || (seg0 & 0xfe00) == 0xfc00
                || (seg0 & 0xffc0) == 0xfe80)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn private_ranges_are_internal() {
        for a in ["192.168.1.5", "127.0.0.1", "10.0.0.1", "172.16.9.9", "169.254.0.3", "0.0.0.0"] {
            assert!(!is_public(ip(a)), "{a} should be internal");
        }
    }

    #[test]
    fn public_addresses_are_external() {
        for a in ["8.8.8.8", "93.184.216.34", "2001:4860:4860::8888"] {
            assert!(is_public(ip(a)), "{a} should be public");
        }
    }

    #[test]
    fn v6_local_scopes_are_internal() {
        for a in ["::1", "fe80::1", "fd12:3456::1"] {
            assert!(!is_public(ip(a)), "{a} should be internal");
        }
    }
}
