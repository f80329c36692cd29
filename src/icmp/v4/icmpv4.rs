use pnet_packet::icmp::echo_reply::EchoReplyPacket;
use pnet_packet::icmp::echo_request::{EchoRequestPacket, MutableEchoRequestPacket};
use pnet_packet::icmp::{IcmpCode, IcmpPacket, IcmpType, IcmpTypes};
use pnet_packet::ip::IpNextHeaderProtocols;
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::Packet;

use super::checksum;
use super::SequenceNumber;
use crate::{TraceError, TraceResult};

pub const ICMP_HEADER_SIZE: usize = 8;
pub const MIN_IPV4_HEADER_SIZE: usize = 20;

/// Padding carried by every echo request. The content is never inspected.
pub const PAYLOAD: &[u8; 16] = b"trace-fox probe!";

/// Identifier stamped into every echo request of this process.
pub const TRACE_IDENTIFIER: u16 = identifier_from_tag(b"trace-fox traceroute");

#[allow(clippy::cast_lossless)] // u16::from is not const
const fn identifier_from_tag(tag: &[u8]) -> u16 {
    let mut identifier: u16 = 0;
    let mut idx = 0;
    while idx < tag.len() {
        identifier = identifier.wrapping_add(tag[idx] as u16);
        idx += 1;
    }
    identifier
}

/// Builds an ICMP Echo Request: the 8-byte header followed by [`PAYLOAD`].
///
/// The checksum is computed over header and payload with the checksum field
/// zeroed and then written into the header, so the returned packet always
/// sums to `0`.
#[must_use]
pub fn new_echo_request(identifier: u16, sequence_number: SequenceNumber) -> Vec<u8> {
    let mut buf = vec![0u8; EchoRequestPacket::minimum_packet_size() + PAYLOAD.len()];
    // never None: buf holds at least the fixed header
    if let Some(mut package) = MutableEchoRequestPacket::new(&mut buf) {
        package.set_icmp_type(IcmpTypes::EchoRequest);
        package.set_icmp_code(IcmpCode::new(0));
        package.set_checksum(0_u16);
        package.set_identifier(identifier);
        package.set_sequence_number(sequence_number.into());
        package.set_payload(PAYLOAD);

        let checksum = checksum(package.packet());
        package.set_checksum(checksum);
    }
    buf
}

/// Identifier and sequence number of the echo request a response refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProbeId {
    pub identifier: u16,
    pub sequence_number: SequenceNumber,
}

/// The parts of an inbound ICMP message the tracer acts on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IcmpResponse {
    pub icmp_type: IcmpType,
    pub icmp_code: IcmpCode,
    /// Recovered from an echo reply, or from the original datagram quoted
    /// inside an error message. `None` for anything else.
    pub probe: Option<ProbeId>,
}

impl IcmpResponse {
    #[must_use]
    pub fn is_echo_reply(&self) -> bool {
        self.icmp_type == IcmpTypes::EchoReply
    }
}

/// Parses a datagram as read from a raw ICMP socket: IPv4 header (with
/// options, as given by the header length field) followed by the ICMP message.
pub fn parse_response(datagram: &[u8]) -> TraceResult<IcmpResponse> {
    let malformed = |reason| TraceError::MalformedDatagram { len: datagram.len(), reason };

    let icmp = ipv4_payload(datagram).map_err(malformed)?;
    if icmp.len() < ICMP_HEADER_SIZE {
        return Err(malformed("truncated ICMP header"));
    }
    let icmp_packet = IcmpPacket::new(icmp).ok_or_else(|| malformed("truncated ICMP header"))?;
    let icmp_type = icmp_packet.get_icmp_type();

    let probe = if icmp_type == IcmpTypes::EchoReply {
        EchoReplyPacket::new(icmp).map(|reply| ProbeId {
            identifier: reply.get_identifier(),
            sequence_number: reply.get_sequence_number().into(),
        })
    } else if icmp_type == IcmpTypes::TimeExceeded || icmp_type == IcmpTypes::DestinationUnreachable {
        quoted_probe(&icmp[ICMP_HEADER_SIZE..])
    } else {
        None
    };

    Ok(IcmpResponse { icmp_type, icmp_code: icmp_packet.get_icmp_code(), probe })
}

fn ipv4_payload(datagram: &[u8]) -> Result<&[u8], &'static str> {
    let ipv4 = Ipv4Packet::new(datagram).ok_or("shorter than an IPv4 header")?;
    if ipv4.get_version() != 4 {
        return Err("not an IPv4 datagram");
    }
    let header_size = usize::from(ipv4.get_header_length()) * 4;
    if header_size < MIN_IPV4_HEADER_SIZE {
        return Err("IPv4 header length below minimum");
    }
    datagram.get(header_size..).ok_or("truncated IPv4 options")
}

// Time Exceeded and Destination Unreachable quote the IP header and the first
// 8 bytes of the datagram that triggered them.
fn quoted_probe(quoted: &[u8]) -> Option<ProbeId> {
    let inner = ipv4_payload(quoted).ok()?;
    let inner_ipv4 = Ipv4Packet::new(quoted)?;
    if inner_ipv4.get_next_level_protocol() != IpNextHeaderProtocols::Icmp || inner.len() < ICMP_HEADER_SIZE {
        return None;
    }
    let request = EchoRequestPacket::new(inner)?;
    if request.get_icmp_type() != IcmpTypes::EchoRequest {
        return None;
    }
    Some(ProbeId {
        identifier: request.get_identifier(),
        sequence_number: request.get_sequence_number().into(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pnet_packet::ipv4::MutableIpv4Packet;
    use std::net::Ipv4Addr;

    pub(crate) const LOCALHOST: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 1);

    pub(crate) fn ipv4_datagram(header_words: u8, source: Ipv4Addr, payload: &[u8]) -> Vec<u8> {
        let header_size = usize::from(header_words) * 4;
        let mut buf = vec![0u8; header_size + payload.len()];
        {
            let mut ipv4 = MutableIpv4Packet::new(&mut buf).unwrap();
            ipv4.set_version(4);
            ipv4.set_header_length(header_words);
            ipv4.set_total_length(u16::try_from(header_size + payload.len()).unwrap());
            ipv4.set_ttl(64);
            ipv4.set_next_level_protocol(IpNextHeaderProtocols::Icmp);
            ipv4.set_source(source);
            ipv4.set_destination(LOCALHOST);
        }
        buf[header_size..].copy_from_slice(payload);
        buf
    }

    pub(crate) fn echo_reply_datagram(source: Ipv4Addr, identifier: u16, sequence_number: u16) -> Vec<u8> {
        let mut icmp = new_echo_request(identifier, SequenceNumber(sequence_number));
        icmp[0] = 0; // echo reply
        icmp[2..4].copy_from_slice(&[0, 0]);
        let sum = checksum(&icmp);
        icmp[2..4].copy_from_slice(&sum.to_be_bytes());
        ipv4_datagram(5, source, &icmp)
    }

    /// An ICMP error of `icmp_type` from `source` quoting the probe with `sequence_number`.
    pub(crate) fn icmp_error_datagram(icmp_type: u8, source: Ipv4Addr, sequence_number: u16) -> Vec<u8> {
        let probe = new_echo_request(TRACE_IDENTIFIER, SequenceNumber(sequence_number));
        let quoted = ipv4_datagram(5, LOCALHOST, &probe[..ICMP_HEADER_SIZE]);
        let mut icmp = vec![icmp_type, 0, 0, 0, 0, 0, 0, 0];
        icmp.extend_from_slice(&quoted);
        let sum = checksum(&icmp);
        icmp[2..4].copy_from_slice(&sum.to_be_bytes());
        ipv4_datagram(5, source, &icmp)
    }

    pub(crate) fn time_exceeded_datagram(source: Ipv4Addr, sequence_number: u16) -> Vec<u8> {
        icmp_error_datagram(11, source, sequence_number)
    }

    #[test]
    fn identifier_is_sum_of_tag_bytes() {
        assert_eq!(195, identifier_from_tag(b"ab"));
        assert_eq!(905, identifier_from_tag(b"trace-fox"));
        assert_eq!(0, identifier_from_tag(b""));
    }

    #[test]
    fn echo_request_layout() {
        let packet = new_echo_request(0xABCD, SequenceNumber(0x0102));

        assert_eq!(ICMP_HEADER_SIZE + PAYLOAD.len(), packet.len());
        assert_eq!(8, packet[0]);
        assert_eq!(0, packet[1]);
        assert_eq!(0xABCD, u16::from_be_bytes([packet[4], packet[5]]));
        assert_eq!(0x0102, u16::from_be_bytes([packet[6], packet[7]]));
        assert_eq!(&PAYLOAD[..], &packet[ICMP_HEADER_SIZE..]);
    }

    #[test]
    fn echo_request_sequence_number_reads_back_for_every_value() {
        for sequence_number in 0..=u16::MAX {
            let packet = new_echo_request(TRACE_IDENTIFIER, SequenceNumber(sequence_number));
            assert_eq!(ICMP_HEADER_SIZE + PAYLOAD.len(), packet.len());
            assert_eq!(sequence_number, u16::from_be_bytes([packet[6], packet[7]]));
            assert_eq!(0, checksum(&packet));
        }
    }

    #[test]
    fn echo_request_checksum_agrees_with_pnet() {
        let packet = new_echo_request(TRACE_IDENTIFIER, SequenceNumber(3));
        let expected = pnet_packet::icmp::checksum(&IcmpPacket::new(&packet).unwrap());
        assert_eq!(expected, u16::from_be_bytes([packet[2], packet[3]]));
    }

    #[test]
    fn parse_echo_reply() {
        let datagram = echo_reply_datagram(Ipv4Addr::new(10, 0, 0, 1), TRACE_IDENTIFIER, 4);

        let response = parse_response(&datagram).unwrap();

        assert!(response.is_echo_reply());
        assert_eq!(
            Some(ProbeId { identifier: TRACE_IDENTIFIER, sequence_number: SequenceNumber(4) }),
            response.probe
        );
    }

    #[test]
    fn parse_time_exceeded_recovers_quoted_probe() {
        let datagram = time_exceeded_datagram(Ipv4Addr::new(192, 168, 1, 1), 2);

        let response = parse_response(&datagram).unwrap();

        assert_eq!(IcmpTypes::TimeExceeded, response.icmp_type);
        assert!(!response.is_echo_reply());
        assert_eq!(SequenceNumber(2), response.probe.unwrap().sequence_number);
    }

    #[test]
    fn parse_honors_ip_options() {
        let mut reply = new_echo_request(TRACE_IDENTIFIER, SequenceNumber(9));
        reply[0] = 0;
        // six header words: 20 bytes plus 4 bytes of options
        let datagram = ipv4_datagram(6, LOCALHOST, &reply);

        let response = parse_response(&datagram).unwrap();

        assert!(response.is_echo_reply());
        assert_eq!(SequenceNumber(9), response.probe.unwrap().sequence_number);
    }

    #[test]
    fn parse_unrelated_message_has_no_probe() {
        // router advertisement
        let datagram = ipv4_datagram(5, LOCALHOST, &[9, 0, 0, 0, 0, 0, 0, 0]);

        let response = parse_response(&datagram).unwrap();

        assert_eq!(IcmpType::new(9), response.icmp_type);
        assert!(response.probe.is_none());
    }

    #[test]
    fn parse_rejects_short_datagrams() {
        let datagram = echo_reply_datagram(LOCALHOST, TRACE_IDENTIFIER, 1);

        for len in [0, 10, 19, 20, 27] {
            let result = parse_response(&datagram[..len]);
            assert!(
                matches!(result, Err(TraceError::MalformedDatagram { len: l, .. }) if l == len),
                "length {len} must be rejected"
            );
        }
        assert!(parse_response(&datagram[..28]).is_ok());
    }

    #[test]
    fn parse_rejects_bad_header_length() {
        let mut datagram = echo_reply_datagram(LOCALHOST, TRACE_IDENTIFIER, 1);
        datagram[0] = 0x44;
        assert!(matches!(parse_response(&datagram), Err(TraceError::MalformedDatagram { .. })));

        // options claimed beyond the end of the datagram
        datagram[0] = 0x4F;
        assert!(matches!(parse_response(&datagram[..40]), Err(TraceError::MalformedDatagram { .. })));
    }

    #[test]
    fn parse_rejects_ipv6() {
        let mut datagram = echo_reply_datagram(LOCALHOST, TRACE_IDENTIFIER, 1);
        datagram[0] = 0x65;
        assert!(matches!(parse_response(&datagram), Err(TraceError::MalformedDatagram { .. })));
    }
}
