//! Pluggable forwarding arbiters for point-to-point network simulation.
//!
//! Every node gets an [`framework::Arbiter`] which the routing layer ([`routing::ArbiterRouting`]) asks,
//! once per packet, for the interface to forward on. The ECMP arbiter ([`ecmp`]) spreads flows over all
//! shortest paths by hashing their 5-tuple.

pub mod concepts;
pub mod ecmp;
pub mod feedback;
pub mod framework;
pub mod ptop;
pub mod routing;
pub mod util;
