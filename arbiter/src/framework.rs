use log::error;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::addressing::AddressResolver;
use crate::concepts::decision::{ArbiterResult, NextHop};
use crate::concepts::packet::{Ipv4Header, Packet};
use crate::concepts::topology::NodeId;
use crate::feedback::ArbiterError;

/// More nodes than this would overflow signed 32-bit indexing of the n * n distance matrix (sqrt(2^31) ~= 46340)
pub const MAX_NUM_NODES: usize = 40000;

/// Mixed into every ECMP flow hash
pub const ECMP_HASH_SALT: u32 = 0x5bd1_e995;

/// Tunables of the forwarding layer
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ArbiterParams {
    pub max_nodes: usize,
    pub hash_salt: u32,
}

impl Default for ArbiterParams {
    fn default() -> Self {
        Self {
            max_nodes: MAX_NUM_NODES,
            hash_salt: ECMP_HASH_SALT,
        }
    }
}

/// Per-node forwarding decision maker, queried by routing once per packet.
///
/// Implementors provide [`Arbiter::decide`]; the pre-processing around it
/// (loop-back, multicast, probe detection and address resolution) is shared in [`Arbiter::try_base_decide`].
pub trait Arbiter {
    /// The node this arbiter decides for
    fn node_id(&self) -> NodeId;

    fn resolver(&self) -> &AddressResolver;

    /// Decide how to forward a packet from `source_node_id` towards `target_node_id`.
    ///
    /// If `is_socket_request_for_source_ip` is set there is no transport header in the packet,
    /// even if the protocol field says otherwise, and nothing is actually being forwarded.
    fn decide(
        &self,
        source_node_id: NodeId,
        target_node_id: NodeId,
        packet: &Packet,
        header: &Ipv4Header,
        is_socket_request_for_source_ip: bool,
    ) -> Result<ArbiterResult, ArbiterError>;

    /// Human-readable forwarding state, for diagnostics only
    fn forwarding_state(&self) -> String;

    fn resolve_node_id(&self, ip: std::net::Ipv4Addr) -> Result<NodeId, ArbiterError> {
        self.resolver().resolve(ip)
    }

    fn try_base_decide(&self, packet: &Packet, header: &Ipv4Header) -> Result<ArbiterResult, ArbiterError> {
        if header.destination.is_loopback() {
            return Ok(Ok(NextHop::loopback()));
        }
        if header.destination.is_multicast() {
            return Err(ArbiterError::Multicast {
                destination: header.destination,
            });
        }

        let is_probe = header.is_probe();
        let source_node_id = if is_probe {
            self.node_id()
        } else {
            self.resolve_node_id(header.source)?
        };
        let target_node_id = self.resolve_node_id(header.destination)?;

        self.decide(source_node_id, target_node_id, packet, header, is_probe)
    }

    /// Entry point for routing. Panics if the arbiter turns out to be inconsistent with the topology.
    fn base_decide(&self, packet: &Packet, header: &Ipv4Header) -> ArbiterResult {
        self.try_base_decide(packet, header).unwrap_or_else(|err| {
            error!("Arbiter of node {} failed on packet {}: {err}", self.node_id(), packet.uid);
            panic!("{err}")
        })
    }
}
