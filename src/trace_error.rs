use std::io;
use thiserror::Error;

use crate::icmp::v4::Ttl;

pub type TraceResult<T> = std::result::Result<T, TraceError>;

/// A fatal trace error.
///
/// Hop timeouts are not errors; they are reported as
/// [`HopResponse::Timeout`](crate::HopResponse::Timeout).
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("cannot resolve hostname '{host}'")]
    Resolve { host: String },
    #[error("could not create raw ICMP socket at hop {ttl}{}: {source}", privilege_hint(.source))]
    SocketCreate {
        ttl: Ttl,
        #[source]
        source: io::Error,
    },
    #[error("probe failed at hop {ttl}: {source}")]
    Probe {
        ttl: Ttl,
        #[source]
        source: io::Error,
    },
    #[error("malformed datagram of {len} bytes: {reason}")]
    MalformedDatagram { len: usize, reason: &'static str },
    #[error("could not write hop result: {0}")]
    Sink(#[source] io::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl TraceError {
    pub(crate) fn socket_create(ttl: Ttl) -> impl FnOnce(io::Error) -> TraceError {
        move |source| TraceError::SocketCreate { ttl, source }
    }

    pub(crate) fn probe(ttl: Ttl) -> impl FnOnce(io::Error) -> TraceError {
        move |source| TraceError::Probe { ttl, source }
    }
}

fn privilege_hint(error: &io::Error) -> &'static str {
    if error.kind() == io::ErrorKind::PermissionDenied {
        " (raw sockets require root/administrator privileges)"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::ErrorKind;

    #[test]
    fn fmt_resolve() {
        let error = TraceError::Resolve { host: "no.such.host".to_string() };
        assert_eq!("cannot resolve hostname 'no.such.host'", format!("{error}"));
    }

    #[test]
    fn fmt_probe_names_hop() {
        let error = TraceError::probe(Ttl(7))(io::Error::new(ErrorKind::Other, "network unreachable"));
        assert_eq!("probe failed at hop 7: network unreachable", format!("{error}"));
    }

    #[test]
    fn socket_create_mentions_privileges_when_denied() {
        let error = TraceError::socket_create(Ttl(1))(io::Error::new(ErrorKind::PermissionDenied, "operation not permitted"));
        assert_eq!(
            "could not create raw ICMP socket at hop 1 (raw sockets require root/administrator privileges): \
             operation not permitted",
            format!("{error}")
        );
    }

    #[test]
    fn socket_create_names_hop_without_privilege_hint() {
        let error = TraceError::socket_create(Ttl(3))(io::Error::new(ErrorKind::Other, "too many open files"));
        assert_eq!("could not create raw ICMP socket at hop 3: too many open files", format!("{error}"));
    }

    #[test]
    fn source_is_chained_for_io_errors() {
        let error = TraceError::Sink(io::Error::from(ErrorKind::BrokenPipe));
        assert!(error.source().is_some());

        let error = TraceError::InvalidConfig("timeout must be positive".to_string());
        assert!(error.source().is_none());
    }
}
