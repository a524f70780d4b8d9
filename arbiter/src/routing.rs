use std::net::Ipv4Addr;

use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::addressing::{InterfaceAddress, LINK_PREFIX_LEN, LOOPBACK_ADDRESS, LOOPBACK_PREFIX_LEN};
use crate::concepts::packet::{Ipv4Header, Packet};
use crate::feedback::RoutingError;
use crate::framework::Arbiter;

/// Route handed back to the IPv4 layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    pub destination: Ipv4Addr,
    /// address of the egress interface, the transport layer takes it as its source address
    pub source: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub out_if_idx: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SocketErrno {
    /// the socket fails right away, nothing is sent
    NoRouteToHost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InputAction {
    LocalDeliver { iif: u32 },
    Forward(Route),
    /// network-level loss, the sender is not told
    Drop,
}

#[derive(Clone, Copy, Debug)]
struct InterfaceState {
    address: Option<InterfaceAddress>,
    up: bool,
}

/// IPv4 routing protocol of one node which delegates every decision to its arbiter
pub struct ArbiterRouting<A: Arbiter> {
    interfaces: Vec<InterfaceState>,
    arbiter: Option<A>,
}

impl<A: Arbiter> Default for ArbiterRouting<A> {
    fn default() -> Self {
        Self {
            interfaces: Vec::new(),
            arbiter: None,
        }
    }
}

impl<A: Arbiter> ArbiterRouting<A> {
    /// Adds every interface with its address and brings them all up, interface 0 must be loop-back
    pub fn with_interfaces(interfaces: &[InterfaceAddress]) -> Result<Self, RoutingError> {
        let mut routing = Self::default();
        for address in interfaces {
            let i = routing.add_interface();
            routing.notify_add_address(i, *address)?;
        }
        for i in 0..interfaces.len() as u32 {
            routing.notify_interface_up(i)?;
        }
        Ok(routing)
    }

    pub fn add_interface(&mut self) -> u32 {
        self.interfaces.push(InterfaceState { address: None, up: false });
        (self.interfaces.len() - 1) as u32
    }

    pub fn set_arbiter(&mut self, arbiter: A) {
        self.arbiter = Some(arbiter);
    }

    pub fn arbiter(&self) -> Option<&A> {
        self.arbiter.as_ref()
    }

    fn interface(&self, i: u32) -> Result<&InterfaceState, RoutingError> {
        self.interfaces
            .get(i as usize)
            .ok_or(RoutingError::NoSuchInterface { interface: i })
    }

    pub fn notify_interface_up(&mut self, i: u32) -> Result<(), RoutingError> {
        let address = self
            .interface(i)?
            .address
            .ok_or(RoutingError::MissingAddress { interface: i })?;
        if i == 0 {
            if address.local != LOOPBACK_ADDRESS || address.prefix_len != LOOPBACK_PREFIX_LEN {
                return Err(RoutingError::BadLoopback);
            }
        } else if address.prefix_len != LINK_PREFIX_LEN {
            return Err(RoutingError::BadSubnetMask { interface: i });
        }
        self.interfaces[i as usize].up = true;
        Ok(())
    }

    pub fn notify_interface_down(&mut self, i: u32) -> Result<(), RoutingError> {
        Err(RoutingError::InterfaceDown { interface: i })
    }

    /// Each interface carries exactly one address, which can only be set while it is down
    pub fn notify_add_address(&mut self, i: u32, address: InterfaceAddress) -> Result<(), RoutingError> {
        if self.interface(i)?.up {
            return Err(RoutingError::AddAddressAfterUp { interface: i });
        }
        self.interfaces[i as usize].address = Some(address);
        Ok(())
    }

    pub fn notify_remove_address(&mut self, i: u32) -> Result<(), RoutingError> {
        Err(RoutingError::RemoveAddress { interface: i })
    }

    /// Weak end-system model: any address of any interface of the node
    pub fn is_destination_address(&self, destination: Ipv4Addr) -> bool {
        self.interfaces
            .iter()
            .filter_map(|itf| itf.address)
            .any(|addr| addr.local == destination)
    }

    fn source_address_selection(&self, if_idx: u32) -> Ipv4Addr {
        self.interfaces
            .get(if_idx as usize)
            .and_then(|itf| itf.address)
            .map(|addr| addr.local)
            .unwrap_or(Ipv4Addr::UNSPECIFIED)
    }

    /// Asks the arbiter for a route, `None` if it found no next hop
    fn lookup_arbiter(
        &self,
        destination: Ipv4Addr,
        header: &Ipv4Header,
        packet: &Packet,
        oif: Option<u32>,
    ) -> Result<Option<Route>, RoutingError> {
        let arbiter = self.arbiter.as_ref().ok_or(RoutingError::ArbiterNotSet)?;
        if oif.is_some() {
            return Err(RoutingError::OutputInterfaceRequested);
        }

        Ok(arbiter.base_decide(packet, header).ok().map(|hop| Route {
            destination,
            source: self.source_address_selection(hop.if_idx()),
            gateway: hop.gateway,
            out_if_idx: hop.if_idx(),
        }))
    }

    /// Route for a locally originated packet.
    ///
    /// Sockets first call this with a probe header to learn their source address;
    /// a failure then means no route to host and nothing is ever sent.
    pub fn route_output(
        &self,
        packet: &Packet,
        header: &Ipv4Header,
        oif: Option<u32>,
    ) -> Result<Result<Route, SocketErrno>, RoutingError> {
        let route = self.lookup_arbiter(header.destination, header, packet, oif)?;
        if route.is_none() {
            debug!("No route to host {} (probe: {})", header.destination, header.is_probe());
        }
        Ok(route.ok_or(SocketErrno::NoRouteToHost))
    }

    /// Handles a packet received on interface `iif`: deliver it locally, forward it, or drop it
    pub fn route_input(&self, packet: &Packet, header: &Ipv4Header, iif: u32) -> Result<InputAction, RoutingError> {
        self.interface(iif)?;
        if self.is_destination_address(header.destination) {
            trace!("Local delivery of packet {} on interface {iif}", packet.uid);
            return Ok(InputAction::LocalDeliver { iif });
        }

        match self.lookup_arbiter(header.destination, header, packet, None)? {
            Some(route) => Ok(InputAction::Forward(route)),
            None => {
                debug!("Dropping packet {} towards {}, no route", packet.uid, header.destination);
                Ok(InputAction::Drop)
            }
        }
    }

    pub fn print_routing_table(&self) -> Result<String, RoutingError> {
        Ok(self
            .arbiter
            .as_ref()
            .ok_or(RoutingError::ArbiterNotSet)?
            .forwarding_state())
    }
}
