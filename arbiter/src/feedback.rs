use std::net::Ipv4Addr;

use thiserror::Error;

use crate::concepts::topology::NodeId;

/// Configuration errors, these are detected while setting up the simulation and before any packet is routed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Cannot handle more than {max} nodes (got {num_nodes})")]
    TooManyNodes { num_nodes: usize, max: usize },
    #[error("Cannot have edge to itself on node {node}")]
    SelfLoop { node: NodeId },
    #[error("Node identifier {node} in edge {a}-{b} does not exist (num_nodes = {num_nodes})")]
    EdgeOutOfRange { a: NodeId, b: NodeId, node: NodeId, num_nodes: usize },
    #[error("Duplicate edge {a}-{b} in edge set")]
    DuplicateEdge { a: NodeId, b: NodeId },
    #[error("Node {node} is out of node id range of [0, {num_nodes})")]
    NodeOutOfRange { node: NodeId, num_nodes: usize },
    #[error("Endpoint {node} is out of node id range of [0, {num_nodes})")]
    EndpointOutOfRange { node: NodeId, num_nodes: usize },
    #[error("Expected interface indices for {expected} undirected edges, got {actual}")]
    InterfaceCountMismatch { expected: usize, actual: usize },
    #[error("Interface index 0 is reserved for loop-back, but edge {a}-{b} was assigned to it")]
    ReservedInterface { a: NodeId, b: NodeId },
}

/// These are critical errors, they mean the forwarding policy is inconsistent with the topology.
/// The process should not continue after observing one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbiterError {
    #[error("IP address {ip} ({}) is not mapped to a node id", ip_as_u32(.ip))]
    UnknownAddress { ip: Ipv4Addr },
    #[error("Multi-cast is not supported (destination {destination})")]
    Multicast { destination: Ipv4Addr },
    #[error("The selected next node {selected} is out of node id range of [0, {num_nodes}).")]
    NodeOutOfRange { selected: NodeId, num_nodes: usize },
    #[error("The selected next node {selected} is not a neighbor of node {node}.")]
    NotANeighbor { selected: NodeId, node: NodeId },
    #[error("ECMP has no candidates at node {node} for source {source_node} and target {target_node}, no path exists between them.")]
    NoCandidates { source_node: NodeId, target_node: NodeId, node: NodeId },
}

fn ip_as_u32(ip: &Ipv4Addr) -> u32 {
    u32::from(*ip)
}

/// Violations of the contract between the host's IPv4 layer and the arbiter routing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Arbiter has not been set")]
    ArbiterNotSet,
    #[error("Requested output interfaces are not supported")]
    OutputInterfaceRequested,
    #[error("Loopback interface 0 must have IP 127.0.0.1 and mask 255.0.0.0")]
    BadLoopback,
    #[error("Each interface must have a subnet mask of 255.255.255.0 (interface {interface})")]
    BadSubnetMask { interface: u32 },
    #[error("Interface {interface} does not exist")]
    NoSuchInterface { interface: u32 },
    #[error("Each interface is permitted exactly one IP address (interface {interface} has none)")]
    MissingAddress { interface: u32 },
    #[error("Interfaces are not permitted to go down (interface {interface})")]
    InterfaceDown { interface: u32 },
    #[error("Not permitted to add IP addresses after the interface has gone up (interface {interface})")]
    AddAddressAfterUp { interface: u32 },
    #[error("Not permitted to remove IP addresses (interface {interface})")]
    RemoveAddress { interface: u32 },
}

/// Not an error, the arbiter found no next hop.
/// For a source-IP probe the socket should fail with no route to host, otherwise the packet is dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("no route")]
pub struct NoRoute;
