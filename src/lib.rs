#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! ICMP traceroute: discovers the routers between this host and a destination
//! by sending echo requests with increasing TTL.
//!
//! Raw ICMP sockets need root (or `CAP_NET_RAW` on Linux).

pub use resolve::lookup_host_v4;
pub use trace::*;
pub use trace_config::TraceConfig;
pub use trace_error::{TraceError, TraceResult};

pub mod icmp;
mod resolve;
mod trace;
mod trace_config;
mod trace_error;
