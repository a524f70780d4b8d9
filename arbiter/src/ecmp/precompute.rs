use std::time::Instant;

use log::{info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::topology::{NodeId, Topology};
use crate::feedback::TopologyError;
use crate::framework::ArbiterParams;
use crate::util::{is_one_hop_closer, sum_inf, INF};

/// All-pairs hop distances, row-major `n * n`
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    n: usize,
    dist: Vec<u32>,
}

impl DistanceMatrix {
    /// Floyd-Warshall with unit edge weights
    pub fn compute(topology: &Topology) -> Self {
        let n = topology.num_nodes();
        let mut dist = vec![INF; n * n];
        for i in 0..n {
            dist[n * i + i] = 0;
        }
        for &(a, b) in topology.undirected_edges() {
            let (a, b) = (a as usize, b as usize);
            dist[n * a + b] = 1;
            dist[n * b + a] = 1;
        }

        for k in 0..n {
            for i in 0..n {
                let d_ik = dist[n * i + k];
                if d_ik == INF {
                    continue;
                }
                for j in 0..n {
                    let via = sum_inf(d_ik, dist[n * k + j]);
                    if dist[n * i + j] > via {
                        dist[n * i + j] = via;
                    }
                }
            }
        }

        Self { n, dist }
    }

    pub fn get(&self, from: NodeId, to: NodeId) -> u32 {
        self.dist[self.n * from as usize + to as usize]
    }
}

/// `candidates[current][destination]`: the neighbors of `current` lying on some shortest path to `destination`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateList {
    candidates: Vec<Vec<Vec<NodeId>>>,
}

impl CandidateList {
    pub fn num_nodes(&self) -> usize {
        self.candidates.len()
    }

    pub fn get(&self, current: NodeId, destination: NodeId) -> &[NodeId] {
        &self.candidates[current as usize][destination as usize]
    }

    /// Splits the list into one row per node, in node id order
    pub fn into_rows(self) -> Vec<Vec<Vec<NodeId>>> {
        self.candidates
    }
}

/// Computes the ECMP candidate list of every node towards every destination.
///
/// For each edge a-b and destination d, b is a candidate of a iff dist(b, d) == dist(a, d) - 1,
/// and symmetrically for a as candidate of b. Unreachable destinations get no candidates.
pub fn calculate_global_state(topology: &Topology, params: &ArbiterParams) -> Result<CandidateList, TopologyError> {
    let n = topology.num_nodes();
    if n > params.max_nodes {
        return Err(TopologyError::TooManyNodes {
            num_nodes: n,
            max: params.max_nodes,
        });
    }

    let start = Instant::now();
    let dist = DistanceMatrix::compute(topology);
    info!("Computed all-pairs shortest paths of {n} nodes in {:?}", start.elapsed());

    let mut candidates = vec![vec![Vec::new(); n]; n];
    for &(a, b) in topology.undirected_edges() {
        for d in 0..n as NodeId {
            if is_one_hop_closer(dist.get(b, d), dist.get(a, d)) {
                candidates[a as usize][d as usize].push(b);
            }
            if is_one_hop_closer(dist.get(a, d), dist.get(b, d)) {
                candidates[b as usize][d as usize].push(a);
            }
        }
    }

    let unreachable = (0..n as NodeId)
        .flat_map(|c| (0..n as NodeId).map(move |d| (c, d)))
        .filter(|&(c, d)| dist.get(c, d) == INF)
        .count();
    if unreachable > 0 {
        warn!("Topology is disconnected, {unreachable} ordered node pairs have no path");
    }

    Ok(CandidateList { candidates })
}
