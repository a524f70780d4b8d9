use std::net::Ipv4Addr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const TCP_PROT_NUMBER: u8 = 6;
pub const UDP_PROT_NUMBER: u8 = 17;

/// Placeholder source set by a socket that still has to learn its own source address.
/// A header carrying it is a source-IP probe: the packet behind it is empty, whatever the protocol field says.
pub const PROBE_SOURCE_ADDRESS: Ipv4Addr = Ipv4Addr::new(102, 102, 102, 102);

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ipv4Header {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub protocol: u8,
    /// in 8-byte units
    pub fragment_offset: u16,
    pub more_fragments: bool,
}

impl Ipv4Header {
    pub fn new(source: Ipv4Addr, destination: Ipv4Addr, protocol: u8) -> Self {
        Self {
            source,
            destination,
            protocol,
            fragment_offset: 0,
            more_fragments: false,
        }
    }

    /// Header a socket hands to routing to pick its source address
    pub fn probe(destination: Ipv4Addr, protocol: u8) -> Self {
        Self::new(PROBE_SOURCE_ADDRESS, destination, protocol)
    }

    pub fn is_probe(&self) -> bool {
        self.source == PROBE_SOURCE_ADDRESS
    }

    pub fn is_fragment(&self) -> bool {
        self.more_fragments || self.fragment_offset != 0
    }
}

/// Transport header sitting right behind the IPv4 header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransportHeader {
    Tcp { source_port: u16, destination_port: u16 },
    Udp { source_port: u16, destination_port: u16 },
}

/// Packet as seen by routing, i.e. with the IPv4 header already removed
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Packet {
    pub uid: u64,
    pub payload_size: u32,
    pub transport: Option<TransportHeader>,
}

impl Packet {
    pub fn new(uid: u64, payload_size: u32) -> Self {
        Self {
            uid,
            payload_size,
            transport: None,
        }
    }

    pub fn tcp(uid: u64, payload_size: u32, source_port: u16, destination_port: u16) -> Self {
        Self {
            transport: Some(TransportHeader::Tcp { source_port, destination_port }),
            ..Self::new(uid, payload_size)
        }
    }

    pub fn udp(uid: u64, payload_size: u32, source_port: u16, destination_port: u16) -> Self {
        Self {
            transport: Some(TransportHeader::Udp { source_port, destination_port }),
            ..Self::new(uid, payload_size)
        }
    }

    /// Peeks the ports of the transport header expected for `protocol`, without consuming it.
    /// Returns `None` if there is no header of that kind.
    pub fn peek_ports(&self, protocol: u8) -> Option<(u16, u16)> {
        match (protocol, self.transport?) {
            (TCP_PROT_NUMBER, TransportHeader::Tcp { source_port, destination_port })
            | (UDP_PROT_NUMBER, TransportHeader::Udp { source_port, destination_port }) => {
                Some((source_port, destination_port))
            }
            _ => None,
        }
    }
}
