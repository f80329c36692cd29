use std::net::Ipv4Addr;

use super::{HopProber, HopResult, HopSink};
use crate::icmp::v4::{RawSocketFactory, SequenceNumber, SocketFactory, Ttl};
use crate::{TraceConfig, TraceResult};

/// How a trace that did not fail came to an end.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraceOutcome {
    /// The destination answered, or some host sent an echo reply, at `ttl`.
    DestinationReached { ttl: Ttl },
    /// Every TTL up to the ceiling was probed without reaching the destination.
    MaxHopsExceeded,
}

/// One traceroute run towards a resolved destination.
///
/// Hops are probed strictly one after another, TTL 1 first. Each probe opens
/// and closes its own sockets.
pub struct TraceSession<F = RawSocketFactory> {
    destination: Ipv4Addr,
    config: TraceConfig,
    prober: HopProber<F>,
}

impl TraceSession<RawSocketFactory> {
    /// A session probing through raw ICMP sockets.
    pub fn new(destination: Ipv4Addr, config: TraceConfig) -> TraceResult<Self> {
        Self::with_factory(destination, config, RawSocketFactory)
    }
}

impl<F> TraceSession<F>
where
    F: SocketFactory,
{
    pub fn with_factory(destination: Ipv4Addr, config: TraceConfig, factory: F) -> TraceResult<Self> {
        config.validate()?;
        let prober = HopProber::new(factory, config.identifier);
        Ok(TraceSession { destination, config, prober })
    }

    #[must_use]
    pub fn destination(&self) -> Ipv4Addr {
        self.destination
    }

    #[must_use]
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Probes TTL 1, 2, ... and hands each hop to `sink` as soon as it is known.
    ///
    /// Stops after the hop that reached the destination or after `max_hops`
    /// hops. A hop timing out moves on to the next TTL; any other error aborts
    /// the trace without probing further.
    pub fn run<S>(&self, sink: &mut S) -> TraceResult<TraceOutcome>
    where
        S: HopSink + ?Sized,
    {
        let max_hops = self.config.max_hops;
        tracing::debug!(destination = %self.destination, max_hops, "trace start");

        for hop_number in 1..=max_hops {
            let ttl = Ttl(hop_number);
            let hop = self
                .prober
                .probe_hop(self.destination, ttl, SequenceNumber::from(ttl), self.config.timeout)
                .map_err(|e| {
                    tracing::error!(%ttl, "trace aborted: {e}");
                    e
                })?;
            tracing::debug!(%ttl, addr = ?hop.addr(), elapsed = ?hop.elapsed(), "hop probed");

            let reached = hop.reached(self.destination);
            sink.accept(hop)?;
            if reached {
                tracing::debug!(%ttl, "destination reached");
                return Ok(TraceOutcome::DestinationReached { ttl });
            }

            if hop_number < max_hops && !self.config.probe_interval.is_zero() {
                std::thread::sleep(self.config.probe_interval);
            }
        }

        tracing::debug!(max_hops, "maximum hops reached");
        Ok(TraceOutcome::MaxHopsExceeded)
    }

    /// Runs the trace and returns all hops once it has ended.
    pub fn collect(&self) -> TraceResult<Vec<HopResult>> {
        let mut hops = Vec::new();
        self.run(&mut hops)?;
        Ok(hops)
    }
}
