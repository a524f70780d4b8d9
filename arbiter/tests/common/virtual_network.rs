use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use arbiter::concepts::addressing::PtopAddressing;
use arbiter::concepts::packet::{Ipv4Header, Packet, TCP_PROT_NUMBER};
use arbiter::concepts::topology::{NodeId, Topology};
use arbiter::ecmp::{install_ecmp_arbiters, EcmpArbiter};
use arbiter::framework::ArbiterParams;
use arbiter::routing::{ArbiterRouting, InputAction};

/// Walks packets hop by hop through the routing of every node
pub struct VirtualNetwork {
    pub topology: Arc<Topology>,
    pub addressing: PtopAddressing,
    pub routers: Vec<ArbiterRouting<EcmpArbiter>>,
    /// (node, egress interface) -> (neighbor, ingress interface at the neighbor)
    wiring: HashMap<(NodeId, u32), (NodeId, u32)>,
    next_uid: u64,
}

impl VirtualNetwork {
    pub fn ecmp(topology: Topology) -> VirtualNetwork {
        let topology = Arc::new(topology);
        let addressing = PtopAddressing::assign(&topology);
        let arbiters = install_ecmp_arbiters(&topology, &addressing, &ArbiterParams::default()).unwrap();

        let routers = arbiters
            .into_iter()
            .enumerate()
            .map(|(node, arbiter)| {
                let mut routing = ArbiterRouting::with_interfaces(addressing.interfaces(node as NodeId)).unwrap();
                routing.set_arbiter(arbiter);
                routing
            })
            .collect();

        let mut wiring = HashMap::new();
        for (&(a, b), &(a_idx, b_idx)) in topology
            .undirected_edges()
            .iter()
            .zip(addressing.interface_idxs_for_edges())
        {
            wiring.insert((a, a_idx), (b, b_idx));
            wiring.insert((b, b_idx), (a, a_idx));
        }

        VirtualNetwork {
            topology,
            addressing,
            routers,
            wiring,
            next_uid: 0,
        }
    }

    /// first link address of the node
    pub fn address_of(&self, node: NodeId) -> Ipv4Addr {
        self.addressing.interfaces(node)[1].local
    }

    /// Sends one TCP packet of the flow, returns the nodes it visited
    pub fn send_tcp(&mut self, src: NodeId, dst: NodeId, src_port: u16, dst_port: u16, payload_size: u32) -> Vec<NodeId> {
        assert!(self.topology.is_valid_endpoint(src), "{src} is not a valid endpoint");
        assert!(self.topology.is_valid_endpoint(dst), "{dst} is not a valid endpoint");
        self.next_uid += 1;
        let packet = Packet::tcp(self.next_uid, payload_size, src_port, dst_port);
        let destination = self.address_of(dst);

        // learn the source address first, like a socket does
        let probe = self.routers[src as usize]
            .route_output(&Packet::new(self.next_uid, 0), &Ipv4Header::probe(destination, TCP_PROT_NUMBER), None)
            .unwrap()
            .unwrap_or_else(|err| panic!("No route from {src} to {dst}: {err:?}"));

        let header = Ipv4Header::new(probe.source, destination, TCP_PROT_NUMBER);
        let mut route = self.routers[src as usize]
            .route_output(&packet, &header, None)
            .unwrap()
            .unwrap_or_else(|err| panic!("No route from {src} to {dst}: {err:?}"));

        let mut path = vec![src];
        let mut node = src;
        loop {
            let (next, iif) = self.wiring[&(node, route.out_if_idx)];
            path.push(next);
            assert!(path.len() <= self.topology.num_nodes(), "Forwarding loop: {path:?}");
            match self.routers[next as usize].route_input(&packet, &header, iif).unwrap() {
                InputAction::LocalDeliver { .. } => return path,
                InputAction::Forward(r) => {
                    route = r;
                    node = next;
                }
                InputAction::Drop => panic!("Packet dropped at {next}, path so far {path:?}"),
            }
        }
    }
}
