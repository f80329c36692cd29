use crate::icmp::v4::Ttl;
use std::net::IpAddr;
use std::{io, time::Duration};

pub(crate) mod raw_socket;

pub use raw_socket::RawSocket;

pub trait TSocket: Send + Sync {
    /// Sets the TTL of outgoing datagrams.
    fn set_ttl(&self, ttl: Ttl) -> io::Result<()>;
    /// Binds to all local addresses; reads give up after `timeout`.
    fn listen(&self, timeout: Duration) -> io::Result<()>;
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;
    /// Receives one whole IPv4 datagram and the address it came from.
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)>;
}

/// Opens the short-lived sockets of one hop probe.
///
/// Sockets are closed when dropped.
pub trait SocketFactory {
    type Socket: TSocket;

    fn create(&self) -> io::Result<Self::Socket>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RawSocketFactory;

impl SocketFactory for RawSocketFactory {
    type Socket = RawSocket;

    fn create(&self) -> io::Result<RawSocket> {
        RawSocket::new()
    }
}
