use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::addressing::PtopAddressing;
use crate::concepts::packet::{Ipv4Header, Packet};
use crate::concepts::topology::{NodeId, Topology};
use crate::feedback::{ArbiterError, TopologyError};
use crate::framework::ArbiterParams;
use crate::ptop::{PtopArbiter, PtopPolicy};

pub mod hash;
pub mod precompute;

pub use precompute::{calculate_global_state, CandidateList, DistanceMatrix};

/// Equal-cost multi-path policy: hashes the flow onto one of the precomputed shortest-path neighbors
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ecmp {
    /// candidates of this node, indexed by destination
    candidate_list: Vec<Vec<NodeId>>,
    hash_salt: u32,
}

pub type EcmpArbiter = PtopArbiter<Ecmp>;

impl Ecmp {
    pub fn new(candidate_list: Vec<Vec<NodeId>>, params: &ArbiterParams) -> Self {
        Self {
            candidate_list,
            hash_salt: params.hash_salt,
        }
    }

    pub fn candidates(&self, target_node_id: NodeId) -> &[NodeId] {
        self.candidate_list
            .get(target_node_id as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn compute_five_tuple_hash(
        &self,
        header: &Ipv4Header,
        packet: &Packet,
        node_id: NodeId,
        no_other_headers: bool,
    ) -> u32 {
        hash::five_tuple_hash(header, packet, node_id, no_other_headers, self.hash_salt)
    }
}

impl PtopPolicy for Ecmp {
    fn ptop_decide(
        &self,
        node_id: NodeId,
        source_node_id: NodeId,
        target_node_id: NodeId,
        _neighbor_node_ids: &BTreeSet<NodeId>,
        packet: &Packet,
        header: &Ipv4Header,
        is_socket_request_for_source_ip: bool,
    ) -> Result<Option<NodeId>, ArbiterError> {
        let candidates = self.candidates(target_node_id);
        if candidates.is_empty() {
            return Err(ArbiterError::NoCandidates {
                source_node: source_node_id,
                target_node: target_node_id,
                node: node_id,
            });
        }
        let hash = self.compute_five_tuple_hash(header, packet, node_id, is_socket_request_for_source_ip);
        Ok(Some(candidates[hash as usize % candidates.len()]))
    }

    fn forwarding_state(&self, node_id: NodeId) -> String {
        let mut res = format!("node {node_id}\n");
        for (dest, candidates) in self.candidate_list.iter().enumerate() {
            let joined = candidates
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(",");
            res.push_str(&format!("  -> {dest}: {{{joined}}}\n"));
        }
        res
    }
}

/// Computes the global ECMP state once and builds the arbiter of every node, in node id order
pub fn install_ecmp_arbiters(
    topology: &Arc<Topology>,
    addressing: &PtopAddressing,
    params: &ArbiterParams,
) -> Result<Vec<EcmpArbiter>, TopologyError> {
    info!("Setting up ECMP routing for {} nodes", topology.num_nodes());
    let start = Instant::now();
    let global_state = calculate_global_state(topology, params)?;
    info!("Calculated ECMP routing state in {:?}", start.elapsed());

    let resolver = Arc::new(addressing.resolver());
    let arbiters = global_state
        .into_rows()
        .into_iter()
        .enumerate()
        .map(|(node, row)| {
            debug!("Installing ECMP arbiter on node {node}");
            PtopArbiter::new(
                node as NodeId,
                topology.clone(),
                resolver.clone(),
                addressing.interface_idxs_for_edges(),
                Ecmp::new(row, params),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    info!("Installed {} ECMP arbiters", arbiters.len());
    Ok(arbiters)
}
