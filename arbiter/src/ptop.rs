use std::collections::BTreeSet;
use std::num::NonZeroU32;
use std::sync::Arc;

use educe::Educe;

use crate::concepts::addressing::{AddressResolver, PtopAddressing};
use crate::concepts::decision::{ArbiterResult, NextHop};
use crate::concepts::packet::{Ipv4Header, Packet};
use crate::concepts::topology::{NodeId, Topology};
use crate::feedback::{ArbiterError, NoRoute, TopologyError};
use crate::framework::Arbiter;

/// Forwarding policy over a point-to-point topology: pick one neighbor, or none.
pub trait PtopPolicy {
    /// From among `neighbor_node_ids`, decide where the packet goes next.
    /// `Ok(None)` means there is no route, so the packet is dropped (or the probing socket fails).
    fn ptop_decide(
        &self,
        node_id: NodeId,
        source_node_id: NodeId,
        target_node_id: NodeId,
        neighbor_node_ids: &BTreeSet<NodeId>,
        packet: &Packet,
        header: &Ipv4Header,
        is_socket_request_for_source_ip: bool,
    ) -> Result<Option<NodeId>, ArbiterError>;

    fn forwarding_state(&self, node_id: NodeId) -> String;
}

/// Maps neighbor node id to the local interface index of the edge towards it, 0 if not a neighbor
pub fn neighbor_interface_map(
    topology: &Topology,
    node_id: NodeId,
    interface_idxs_for_edges: &[(u32, u32)],
) -> Result<Vec<u32>, TopologyError> {
    if interface_idxs_for_edges.len() != topology.num_undirected_edges() {
        return Err(TopologyError::InterfaceCountMismatch {
            expected: topology.num_undirected_edges(),
            actual: interface_idxs_for_edges.len(),
        });
    }
    if node_id as usize >= topology.num_nodes() {
        return Err(TopologyError::NodeOutOfRange {
            node: node_id,
            num_nodes: topology.num_nodes(),
        });
    }
    let mut map = vec![0; topology.num_nodes()];
    for (&(a, b), &(a_idx, b_idx)) in topology.undirected_edges().iter().zip(interface_idxs_for_edges) {
        let (neighbor, if_idx) = if a == node_id {
            (b, a_idx)
        } else if b == node_id {
            (a, b_idx)
        } else {
            continue;
        };
        if if_idx == 0 {
            return Err(TopologyError::ReservedInterface { a, b });
        }
        map[neighbor as usize] = if_idx;
    }
    Ok(map)
}

/// Arbiter for point-to-point topologies, turns the neighbor chosen by its policy into an egress interface
#[derive(Educe)]
#[educe(Debug(bound(P: std::fmt::Debug)))]
pub struct PtopArbiter<P: PtopPolicy> {
    node_id: NodeId,
    topology: Arc<Topology>,
    #[educe(Debug(ignore))]
    resolver: Arc<AddressResolver>,
    neighbor_node_id_to_if_idx: Vec<u32>,
    policy: P,
}

impl<P: PtopPolicy> PtopArbiter<P> {
    pub fn new(
        node_id: NodeId,
        topology: Arc<Topology>,
        resolver: Arc<AddressResolver>,
        interface_idxs_for_edges: &[(u32, u32)],
        policy: P,
    ) -> Result<Self, TopologyError> {
        let neighbor_node_id_to_if_idx = neighbor_interface_map(&topology, node_id, interface_idxs_for_edges)?;
        Ok(Self {
            node_id,
            topology,
            resolver,
            neighbor_node_id_to_if_idx,
            policy,
        })
    }

    /// Shortcut wiring the arbiter with the default point-to-point addressing
    pub fn with_addressing(
        node_id: NodeId,
        topology: Arc<Topology>,
        addressing: &PtopAddressing,
        policy: P,
    ) -> Result<Self, TopologyError> {
        let resolver = Arc::new(addressing.resolver());
        Self::new(node_id, topology, resolver, addressing.interface_idxs_for_edges(), policy)
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub fn if_idx_towards(&self, neighbor: NodeId) -> Option<NonZeroU32> {
        self.neighbor_node_id_to_if_idx
            .get(neighbor as usize)
            .copied()
            .and_then(NonZeroU32::new)
    }
}

impl<P: PtopPolicy> Arbiter for PtopArbiter<P> {
    fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    fn decide(
        &self,
        source_node_id: NodeId,
        target_node_id: NodeId,
        packet: &Packet,
        header: &Ipv4Header,
        is_socket_request_for_source_ip: bool,
    ) -> Result<ArbiterResult, ArbiterError> {
        let selected = self.policy.ptop_decide(
            self.node_id,
            source_node_id,
            target_node_id,
            self.topology.adjacency(self.node_id),
            packet,
            header,
            is_socket_request_for_source_ip,
        )?;

        let Some(selected) = selected else {
            return Ok(Err(NoRoute));
        };

        let num_nodes = self.topology.num_nodes();
        if selected as usize >= num_nodes {
            return Err(ArbiterError::NodeOutOfRange { selected, num_nodes });
        }

        match self.if_idx_towards(selected) {
            Some(if_idx) => Ok(Ok(NextHop::ptop(if_idx))),
            None => Err(ArbiterError::NotANeighbor {
                selected,
                node: self.node_id,
            }),
        }
    }

    fn forwarding_state(&self) -> String {
        self.policy.forwarding_state(self.node_id)
    }
}
