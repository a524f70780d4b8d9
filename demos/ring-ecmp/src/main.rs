use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use arbiter::concepts::addressing::PtopAddressing;
use arbiter::concepts::packet::{Ipv4Header, Packet, TCP_PROT_NUMBER};
use arbiter::concepts::topology::Topology;
use arbiter::ecmp::install_ecmp_arbiters;
use arbiter::framework::{Arbiter, ArbiterParams};
use arbiter::routing::{ArbiterRouting, InputAction};
use log::{info, LevelFilter};
use serde_json::json;
use simplelog::*;

fn main() -> anyhow::Result<()> {
    CombinedLogger::init(vec![TermLogger::new(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])?;

    // two equal-cost paths: 0 - 1 - 3 and 0 - 2 - 3
    let topology = Arc::new(Topology::with_endpoints(4, &[(0, 1), (0, 2), (1, 3), (2, 3)], &[0, 3])?);
    let addressing = PtopAddressing::assign(&topology);
    let arbiters = install_ecmp_arbiters(&topology, &addressing, &ArbiterParams::default())?;

    for arbiter in &arbiters {
        print!("{}", arbiter.forwarding_state());
    }

    let mut routers = Vec::new();
    for (node, arbiter) in arbiters.into_iter().enumerate() {
        let mut routing = ArbiterRouting::with_interfaces(addressing.interfaces(node as u32))?;
        routing.set_arbiter(arbiter);
        routers.push(routing);
    }

    // which neighbor sits behind each (node, interface)
    let mut wiring = BTreeMap::new();
    for (&(a, b), &(a_idx, b_idx)) in topology.undirected_edges().iter().zip(addressing.interface_idxs_for_edges()) {
        wiring.insert((a, a_idx), (b, b_idx));
        wiring.insert((b, b_idx), (a, a_idx));
    }

    let destination = addressing.interfaces(3)[1].local;
    let mut per_middle = BTreeMap::<u32, u32>::new();
    for flow in 0..8u16 {
        let packet = Packet::tcp(flow as u64, 1380, 49152 + flow, 1024);
        let probe = routers[0]
            .route_output(&packet, &Ipv4Header::probe(destination, TCP_PROT_NUMBER), None)?
            .map_err(|err| anyhow!("flow {flow}: {err:?}"))?;
        let header = Ipv4Header::new(probe.source, destination, TCP_PROT_NUMBER);
        let mut route = routers[0]
            .route_output(&packet, &header, None)?
            .map_err(|err| anyhow!("flow {flow}: {err:?}"))?;

        let mut node = 0;
        let mut path = vec![node];
        loop {
            let &(next, iif) = wiring
                .get(&(node, route.out_if_idx))
                .context("interface without a link")?;
            path.push(next);
            match routers[next as usize].route_input(&packet, &header, iif)? {
                InputAction::LocalDeliver { .. } => break,
                InputAction::Forward(r) => {
                    route = r;
                    node = next;
                }
                InputAction::Drop => return Err(anyhow!("flow {flow} dropped at node {next}")),
            }
        }
        info!("flow {flow} took path {}", json!(path));
        *per_middle.entry(path[1]).or_default() += 1;
    }

    info!("flows per middle node: {}", json!(per_middle));
    Ok(())
}
