mod checksum;
pub use checksum::checksum;

mod icmpv4;
pub use icmpv4::{
    new_echo_request, parse_response, IcmpResponse, ProbeId, ICMP_HEADER_SIZE, MIN_IPV4_HEADER_SIZE, PAYLOAD,
    TRACE_IDENTIFIER,
};
#[cfg(test)]
pub(crate) use icmpv4::tests as packet_tests;

mod sequence_number;
pub use sequence_number::SequenceNumber;

mod socket;
pub use socket::{RawSocket, RawSocketFactory, SocketFactory, TSocket};
#[cfg(test)]
pub(crate) use socket::tests;

mod ttl;
pub use ttl::Ttl;
