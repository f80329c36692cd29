use socket2::SockAddr;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use super::{HopResponse, HopResult};
use crate::icmp::v4::{new_echo_request, parse_response, SequenceNumber, SocketFactory, TSocket, Ttl};
use crate::{TraceError, TraceResult};

const RECEIVE_BUFFER_SIZE: usize = 1024;

/// Sends one echo request with a given TTL and waits for whatever ICMP message
/// comes back.
pub struct HopProber<F> {
    factory: F,
    identifier: u16,
}

impl<F> HopProber<F>
where
    F: SocketFactory,
{
    pub fn new(factory: F, identifier: u16) -> Self {
        HopProber { factory, identifier }
    }

    /// Probes a single hop.
    ///
    /// A receive timeout is not an error: it yields [`HopResponse::Timeout`].
    /// Any other socket error, and a datagram too short to hold the IPv4 and
    /// ICMP headers, is returned as an error naming `ttl`. Both sockets are
    /// closed before this returns, on every path.
    pub fn probe_hop(
        &self,
        destination: Ipv4Addr,
        ttl: Ttl,
        sequence_number: SequenceNumber,
        timeout: Duration,
    ) -> TraceResult<HopResult> {
        let outbound = self.factory.create().map_err(TraceError::socket_create(ttl))?;
        outbound.set_ttl(ttl).map_err(TraceError::probe(ttl))?;
        let inbound = self.factory.create().map_err(TraceError::socket_create(ttl))?;
        inbound.listen(timeout).map_err(TraceError::probe(ttl))?;

        let packet = new_echo_request(self.identifier, sequence_number);
        let addr = SockAddr::from(SocketAddr::new(IpAddr::V4(destination), 0));

        let send_time = Instant::now();
        outbound.send_to(&packet, &addr).map_err(TraceError::probe(ttl))?;
        tracing::trace!(%ttl, %sequence_number, %destination, "echo request sent");

        let mut buf = [0u8; RECEIVE_BUFFER_SIZE];
        let (n, source) = match inbound.recv_from(&mut buf) {
            Err(e) if is_timeout(&e) => {
                tracing::trace!(%ttl, "no response within {timeout:?}");
                return Ok(HopResult { ttl, response: HopResponse::Timeout { waited: timeout } });
            }
            Err(e) => return Err(TraceError::probe(ttl)(e)),
            Ok(received) => received,
        };
        let elapsed = send_time.elapsed();

        let response = parse_response(&buf[..n]).map_err(|e| {
            tracing::warn!(%ttl, %source, "{e}");
            e
        })?;
        // Responses are not filtered: any ICMP message counts for this hop.
        match response.probe {
            Some(probe) if probe.identifier == self.identifier && probe.sequence_number == sequence_number => {}
            probe => tracing::debug!(%ttl, %source, ?probe, "response does not match the probe sent"),
        }

        Ok(HopResult {
            ttl,
            response: HopResponse::Reply {
                addr: source,
                icmp_type: response.icmp_type,
                icmp_code: response.icmp_code,
                elapsed,
            },
        })
    }
}

// A read timeout is reported as `WouldBlock` on Unix and as `TimedOut` on Windows.
fn is_timeout(error: &io::Error) -> bool {
    matches!(error.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
