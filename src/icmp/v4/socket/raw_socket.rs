use super::TSocket;
use crate::icmp::v4::Ttl;
use socket2::{Domain, Protocol, SockAddr, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::{io, time::Duration};

/// A raw `IPPROTO_ICMP` socket. Requires root (or `CAP_NET_RAW`).
pub struct RawSocket {
    socket: socket2::Socket,
}

impl RawSocket {
    pub(crate) fn new() -> io::Result<RawSocket> {
        tracing::trace!("creating raw ICMPv4 socket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))?;
        Ok(RawSocket { socket })
    }
}

impl TSocket for RawSocket {
    fn set_ttl(&self, ttl: Ttl) -> io::Result<()> {
        self.socket.set_ttl(u32::from(ttl.0))
    }

    fn listen(&self, timeout: Duration) -> io::Result<()> {
        // ICMP has no ports
        self.socket.bind(&SockAddr::from(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)))?;
        self.socket.set_read_timeout(Some(timeout))
    }

    fn send_to(&self, buf: &[u8], addr: &SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        // Socket2 gives a safety guaranty which allows us to do an unsafe cast from `&mut [u8]`
        // to `&mut [std::mem::MaybeUninit<u8>]`: it never writes uninitialized bytes into it.
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        //
        // On a RAW socket we get the IP packet including its header.
        let (n, socket_addr) = self.socket.recv_from(unsafe {
            &mut *(buf as *mut [u8] as *mut [std::mem::MaybeUninit<u8>])
        })?;
        let ip = socket_addr
            .as_socket()
            .map(|addr| addr.ip())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "datagram without source address"))?;
        Ok((n, ip))
    }
}
