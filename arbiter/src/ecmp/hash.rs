use crate::concepts::packet::{Ipv4Header, Packet};
use crate::concepts::topology::NodeId;
use crate::util::murmur3_32;

pub const HASH_INPUT_LEN: usize = 21;

/// Lays out the hash input:
/// source (4) | destination (4) | protocol (1) | source port (2) | destination port (2) | node id (4) | salt (4),
/// all multi-byte fields big-endian.
///
/// Ports are only read for TCP or UDP, when there are headers behind the IPv4 one, and when the packet is not a fragment.
/// Otherwise they are zero and the flow degrades to (source, destination, node).
pub fn five_tuple_hash_input(
    header: &Ipv4Header,
    packet: &Packet,
    node_id: NodeId,
    no_other_headers: bool,
    salt: u32,
) -> [u8; HASH_INPUT_LEN] {
    let (src_port, dst_port) = if no_other_headers || header.is_fragment() {
        (0, 0)
    } else {
        packet.peek_ports(header.protocol).unwrap_or((0, 0))
    };

    let mut buf = [0u8; HASH_INPUT_LEN];
    buf[0..4].copy_from_slice(&header.source.octets());
    buf[4..8].copy_from_slice(&header.destination.octets());
    buf[8] = header.protocol;
    buf[9..11].copy_from_slice(&src_port.to_be_bytes());
    buf[11..13].copy_from_slice(&dst_port.to_be_bytes());
    buf[13..17].copy_from_slice(&node_id.to_be_bytes());
    buf[17..21].copy_from_slice(&salt.to_be_bytes());
    buf
}

/// Flow hash of the 5-tuple perturbed by the deciding node
pub fn five_tuple_hash(header: &Ipv4Header, packet: &Packet, node_id: NodeId, no_other_headers: bool, salt: u32) -> u32 {
    murmur3_32(&five_tuple_hash_input(header, packet, node_id, no_other_headers, salt), 0)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::concepts::packet::{TCP_PROT_NUMBER, UDP_PROT_NUMBER};

    fn tcp_header() -> Ipv4Header {
        Ipv4Header::new(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 3, 2), TCP_PROT_NUMBER)
    }

    #[test]
    fn byte_layout() {
        let buf = five_tuple_hash_input(&tcp_header(), &Packet::tcp(1, 100, 0x1234, 0xabcd), 0x0102_0304, false, 0xdead_beef);
        assert_eq!(
            buf,
            [10, 0, 0, 1, 10, 0, 3, 2, 6, 0x12, 0x34, 0xab, 0xcd, 1, 2, 3, 4, 0xde, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn ports_skipped_without_headers() {
        let buf = five_tuple_hash_input(&tcp_header(), &Packet::tcp(1, 100, 80, 443), 7, true, 0);
        assert_eq!(&buf[9..13], &[0, 0, 0, 0]);
    }

    #[test]
    fn ports_skipped_for_fragments() {
        let mut header = tcp_header();
        header.fragment_offset = 185;
        let buf = five_tuple_hash_input(&header, &Packet::tcp(1, 100, 80, 443), 7, false, 0);
        assert_eq!(&buf[9..13], &[0, 0, 0, 0]);

        header.fragment_offset = 0;
        header.more_fragments = true;
        let buf = five_tuple_hash_input(&header, &Packet::tcp(1, 100, 80, 443), 7, false, 0);
        assert_eq!(&buf[9..13], &[0, 0, 0, 0]);
    }

    #[test]
    fn protocol_must_match_transport_header() {
        let mut header = tcp_header();
        header.protocol = UDP_PROT_NUMBER;
        let buf = five_tuple_hash_input(&header, &Packet::tcp(1, 100, 80, 443), 7, false, 0);
        assert_eq!(&buf[9..13], &[0, 0, 0, 0]);

        header.protocol = 1;
        let buf = five_tuple_hash_input(&header, &Packet::udp(1, 100, 80, 443), 7, false, 0);
        assert_eq!(&buf[9..13], &[0, 0, 0, 0]);
    }
}
