//! Network values: ports, URLs, IP addresses.

use std::net::{IpAddr, Ipv4Addr};

use relface_core::{Field, IntegerRange, ParseCodec, StringCodec, Url};

/// Any TCP/UDP port. Defaults to 0.
pub fn port() -> Field<i64> {
    port_in("Port", 0, 0, 65535)
}

/// Port in the privileged range [0, 1023]. Defaults to 0.
pub fn privileged_port() -> Field<i64> {
    port_in("PrivilegedPort", 0, 0, 1023)
}

/// Port in the unprivileged range [1024, 65535]. Defaults to 1024.
pub fn unprivileged_port() -> Field<i64> {
    port_in("UnprivilegedPort", 1024, 1024, 65535)
}

fn port_in(kind: &str, default: i64, lo: i64, hi: i64) -> Field<i64> {
    Field::new(kind, ParseCodec::<i64>::new())
        .with_default(default)
        .with_checker(IntegerRange::new(Some(lo), Some(hi)))
}

/// `<scheme>://<host>...` string.
pub fn url() -> Field<String> {
    Field::new("URL", StringCodec).with_checker(Url)
}

/// IPv4 or IPv6 address. Defaults to `0.0.0.0`.
pub fn ip_address() -> Field<IpAddr> {
    Field::new("IPAddress", ParseCodec::<IpAddr>::new())
        .with_default(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
