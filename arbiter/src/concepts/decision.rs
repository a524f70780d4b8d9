use std::net::Ipv4Addr;
use std::num::NonZeroU32;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::feedback::NoRoute;

pub const LOOPBACK_IF_IDX: u32 = 0;

/// Where a routed packet leaves the node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Egress {
    Loopback,
    /// a point-to-point interface, never index 0
    Interface(NonZeroU32),
}

impl Egress {
    pub fn if_idx(&self) -> u32 {
        match self {
            Egress::Loopback => LOOPBACK_IF_IDX,
            Egress::Interface(idx) => idx.get(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NextHop {
    pub egress: Egress,
    /// 0.0.0.0 on point-to-point links, there is nothing to resolve
    pub gateway: Ipv4Addr,
}

impl NextHop {
    pub fn loopback() -> Self {
        Self {
            egress: Egress::Loopback,
            gateway: Ipv4Addr::UNSPECIFIED,
        }
    }

    pub fn ptop(if_idx: NonZeroU32) -> Self {
        Self {
            egress: Egress::Interface(if_idx),
            gateway: Ipv4Addr::UNSPECIFIED,
        }
    }

    pub fn if_idx(&self) -> u32 {
        self.egress.if_idx()
    }
}

/// Outcome of a single forwarding decision, created per packet and never retained
pub type ArbiterResult = Result<NextHop, NoRoute>;
