use std::collections::HashMap;
use std::net::Ipv4Addr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use serde_with::serde_as;

use crate::concepts::topology::{NodeId, Topology};
use crate::feedback::ArbiterError;

pub const LOOPBACK_ADDRESS: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 1);
pub const LOOPBACK_PREFIX_LEN: u8 = 8;
pub const LINK_PREFIX_LEN: u8 = 24;
/// every link is its own /24, starting here
pub const LINK_NETWORK_BASE: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterfaceAddress {
    pub local: Ipv4Addr,
    pub prefix_len: u8,
}

impl InterfaceAddress {
    pub fn mask(&self) -> Ipv4Addr {
        let bits = match 32u32.checked_sub(self.prefix_len as u32) {
            Some(host_bits) => u32::MAX.checked_shl(host_bits).unwrap_or(0),
            None => u32::MAX,
        };
        Ipv4Addr::from(bits)
    }
}

/// Interface wiring of a point-to-point topology.
///
/// Interface 0 of every node is loop-back. Edges are wired in the topology's sorted order;
/// edge `i` is network `10.0.0.0 + 256 * i` with `.1` on the lower node and `.2` on the higher one,
/// and every node numbers its interfaces in the order its edges are wired.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PtopAddressing {
    interface_idxs_for_edges: Vec<(u32, u32)>,
    node_interfaces: Vec<Vec<InterfaceAddress>>,
}

impl PtopAddressing {
    pub fn assign(topology: &Topology) -> Self {
        let loopback = InterfaceAddress {
            local: LOOPBACK_ADDRESS,
            prefix_len: LOOPBACK_PREFIX_LEN,
        };
        let mut node_interfaces = vec![vec![loopback]; topology.num_nodes()];
        let mut interface_idxs_for_edges = Vec::with_capacity(topology.num_undirected_edges());

        let base = u32::from(LINK_NETWORK_BASE);
        for (i, &(a, b)) in topology.undirected_edges().iter().enumerate() {
            let network = base.wrapping_add((i as u32) << 8);
            let mut attach = |node: NodeId, host: u32| {
                let itfs = &mut node_interfaces[node as usize];
                itfs.push(InterfaceAddress {
                    local: Ipv4Addr::from(network | host),
                    prefix_len: LINK_PREFIX_LEN,
                });
                (itfs.len() - 1) as u32
            };
            let a_idx = attach(a, 1);
            let b_idx = attach(b, 2);
            interface_idxs_for_edges.push((a_idx, b_idx));
        }

        Self {
            interface_idxs_for_edges,
            node_interfaces,
        }
    }

    /// Interface index pair `(lower node side, higher node side)` for each edge, aligned with [`Topology::undirected_edges`]
    pub fn interface_idxs_for_edges(&self) -> &[(u32, u32)] {
        &self.interface_idxs_for_edges
    }

    pub fn interfaces(&self, node: NodeId) -> &[InterfaceAddress] {
        &self.node_interfaces[node as usize]
    }

    pub fn resolver(&self) -> AddressResolver {
        AddressResolver::new(
            self.node_interfaces
                .iter()
                .enumerate()
                .flat_map(|(node, itfs)| itfs.iter().skip(1).map(move |itf| (itf.local, node as NodeId))),
        )
    }
}

/// Exact-match lookup from an interface address to the node that owns it
#[cfg_attr(feature = "serde", serde_as, derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct AddressResolver {
    #[cfg_attr(feature = "serde", serde_as(as = "Vec<(_, _)>"))]
    ip_to_node_id: HashMap<Ipv4Addr, NodeId>,
}

impl AddressResolver {
    pub fn new(entries: impl IntoIterator<Item = (Ipv4Addr, NodeId)>) -> Self {
        Self {
            ip_to_node_id: entries.into_iter().collect(),
        }
    }

    pub fn resolve(&self, ip: Ipv4Addr) -> Result<NodeId, ArbiterError> {
        self.ip_to_node_id
            .get(&ip)
            .copied()
            .ok_or(ArbiterError::UnknownAddress { ip })
    }

    pub fn len(&self) -> usize {
        self.ip_to_node_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ip_to_node_id.is_empty()
    }
}
