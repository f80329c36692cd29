use pnet_packet::icmp::{IcmpCode, IcmpType, IcmpTypes};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::icmp::v4::Ttl;

const TIMEOUT_MARKER: &str = " * TIMED_OUT * ";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HopResponse {
    Reply {
        addr: IpAddr,
        icmp_type: IcmpType,
        icmp_code: IcmpCode,
        elapsed: Duration,
    },
    /// Nothing arrived within the probe timeout.
    Timeout { waited: Duration },
}

/// Outcome of probing one TTL.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HopResult {
    pub ttl: Ttl,
    pub response: HopResponse,
}

impl HopResult {
    #[must_use]
    pub fn addr(&self) -> Option<IpAddr> {
        match self.response {
            HopResponse::Reply { addr, .. } => Some(addr),
            HopResponse::Timeout { .. } => None,
        }
    }

    /// Round-trip time, `None` on timeout.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        match self.response {
            HopResponse::Reply { elapsed, .. } => Some(elapsed),
            HopResponse::Timeout { .. } => None,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.response, HopResponse::Timeout { .. })
    }

    /// Whether this response ends the trace: it came from `destination` or is
    /// an echo reply.
    #[must_use]
    pub fn reached(&self, destination: Ipv4Addr) -> bool {
        match self.response {
            HopResponse::Reply { addr, icmp_type, .. } => {
                addr == IpAddr::V4(destination) || icmp_type == IcmpTypes::EchoReply
            }
            HopResponse::Timeout { .. } => false,
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// `TTL  ADDRESS  ELAPSED ms`, with the timeout marker and the probe timeout
/// in place of address and round-trip time when nothing answered.
impl fmt::Display for HopResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ttl = self.ttl.0;
        match &self.response {
            HopResponse::Reply { addr, elapsed, .. } => {
                write!(f, "{ttl:02} {:<15}  {:06.2} ms", addr.to_string(), millis(*elapsed))
            }
            HopResponse::Timeout { waited } => {
                write!(f, "{ttl:02} {TIMEOUT_MARKER:<15}  {:06.2} ms", millis(*waited))
            }
        }
    }
}
