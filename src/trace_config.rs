use std::time::Duration;

use crate::icmp::v4::TRACE_IDENTIFIER;
use crate::{TraceError, TraceResult};

pub const DEFAULT_MAX_HOPS: u8 = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_millis(100);

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TraceConfig {
    /// TTL ceiling. `0` traces nothing.
    pub max_hops: u8,
    /// How long to wait for a response to each probe.
    pub timeout: Duration,
    /// Pause between two consecutive hops.
    pub probe_interval: Duration,
    /// ICMP identifier of every echo request.
    pub identifier: u16,
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            max_hops: DEFAULT_MAX_HOPS,
            timeout: DEFAULT_TIMEOUT,
            probe_interval: DEFAULT_PROBE_INTERVAL,
            identifier: TRACE_IDENTIFIER,
        }
    }
}

impl TraceConfig {
    pub fn validate(&self) -> TraceResult<()> {
        // a zero read timeout means "block forever" to the socket layer
        if self.timeout.is_zero() {
            return Err(TraceError::InvalidConfig("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}
