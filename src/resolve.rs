use std::net::{IpAddr, Ipv4Addr};

use crate::{TraceError, TraceResult};

/// Resolves `hostname` to its first IPv4 address. Literal addresses are
/// returned as they are.
pub fn lookup_host_v4(hostname: &str) -> TraceResult<Ipv4Addr> {
    if let Ok(ip) = hostname.parse::<Ipv4Addr>() {
        return Ok(ip);
    }
    let resolve_error = || TraceError::Resolve { host: hostname.to_owned() };
    let ips: Vec<IpAddr> = dns_lookup::lookup_host(hostname).map_err(|e| {
        tracing::debug!(hostname, "lookup failed: {e}");
        resolve_error()
    })?;
    ips.into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(ipv4) => Some(ipv4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(resolve_error)
}
