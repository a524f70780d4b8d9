use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::feedback::TopologyError;

/// Dense node identifier in `[0, num_nodes)`
pub type NodeId = u32;

/// Undirected point-to-point topology. Immutable once built.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Topology {
    num_nodes: usize,
    /// normalised to (lower, higher) and sorted
    undirected_edges: Vec<(NodeId, NodeId)>,
    adjacency: Vec<BTreeSet<NodeId>>,
    /// empty means every node may terminate a flow
    endpoints: BTreeSet<NodeId>,
}

impl Topology {
    pub fn new(num_nodes: usize, edges: &[(NodeId, NodeId)]) -> Result<Self, TopologyError> {
        Self::with_endpoints(num_nodes, edges, &[])
    }

    pub fn with_endpoints(
        num_nodes: usize,
        edges: &[(NodeId, NodeId)],
        endpoints: &[NodeId],
    ) -> Result<Self, TopologyError> {
        let mut adjacency = vec![BTreeSet::new(); num_nodes];
        let mut undirected_edges = Vec::with_capacity(edges.len());
        for &(a, b) in edges {
            if a == b {
                return Err(TopologyError::SelfLoop { node: a });
            }
            for node in [a, b] {
                if node as usize >= num_nodes {
                    return Err(TopologyError::EdgeOutOfRange { a, b, node, num_nodes });
                }
            }
            if !adjacency[a as usize].insert(b) {
                return Err(TopologyError::DuplicateEdge { a, b });
            }
            adjacency[b as usize].insert(a);
            undirected_edges.push((a.min(b), a.max(b)));
        }
        undirected_edges.sort_unstable();

        let mut endpoint_set = BTreeSet::new();
        for &node in endpoints {
            if node as usize >= num_nodes {
                return Err(TopologyError::EndpointOutOfRange { node, num_nodes });
            }
            endpoint_set.insert(node);
        }

        Ok(Self {
            num_nodes,
            undirected_edges,
            adjacency,
            endpoints: endpoint_set,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_undirected_edges(&self) -> usize {
        self.undirected_edges.len()
    }

    pub fn undirected_edges(&self) -> &[(NodeId, NodeId)] {
        &self.undirected_edges
    }

    pub fn adjacency(&self, node: NodeId) -> &BTreeSet<NodeId> {
        &self.adjacency[node as usize]
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get(a as usize)
            .is_some_and(|neigh| neigh.contains(&b))
    }

    pub fn is_valid_endpoint(&self, node: NodeId) -> bool {
        if self.endpoints.is_empty() {
            (node as usize) < self.num_nodes
        } else {
            self.endpoints.contains(&node)
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        0..self.num_nodes as NodeId
    }
}
