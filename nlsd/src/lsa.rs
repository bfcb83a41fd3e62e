//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;

use enum_as_inner::EnumAsInner;
use nlsd_utils::lsa::LsaType;
use nlsd_utils::name::NamePrefix;
use serde::{Deserialize, Serialize};

/// Identity of an LSA instance: the router that originated it plus the LSA
/// type. Unique within the database.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct LsaKey {
    pub origin: NamePrefix,
    pub lsa_type: LsaType,
}

/// Header fields common to all LSA types.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaHdr {
    // Name of the router that originated this LSA.
    pub origin: NamePrefix,
    // Sequence number, non-decreasing per (origin, type).
    pub seqno: u64,
    // Advertised lifetime in seconds. Learned LSAs expire after this long
    // unless a newer instance arrives first.
    pub lifetime: u64,
}

/// Name LSA: the name prefixes reachable through the originating router.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct NameLsa {
    pub hdr: LsaHdr,
    pub name_list: BTreeSet<NamePrefix>,
}

/// One link advertised by an Adjacency LSA.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Link {
    pub neighbor: NamePrefix,
    pub face_uri: String,
    pub cost: u32,
}

/// Adjacency LSA: the originating router's active links, plus the number of
/// active neighbors at build time.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AdjLsa {
    pub hdr: LsaHdr,
    pub link_count: u32,
    pub links: Vec<Link>,
}

/// Coordinate LSA: the originating router's hyperbolic coordinates, used for
/// greedy routing when hyperbolic mode is enabled.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct CoordinateLsa {
    pub hdr: LsaHdr,
    pub radius: f64,
    pub angle: f64,
}

/// An LSA of any type, as handed over by the dissemination layer after
/// decoding and validation.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, EnumAsInner, Serialize)]
pub enum Lsa {
    Name(NameLsa),
    Adjacency(AdjLsa),
    Coordinate(CoordinateLsa),
}

/// Access to the fields shared by all LSA types.
pub trait LsaData: Clone + std::fmt::Debug {
    const TYPE: LsaType;

    fn hdr(&self) -> &LsaHdr;

    fn hdr_mut(&mut self) -> &mut LsaHdr;

    fn key(&self) -> LsaKey {
        LsaKey {
            origin: self.hdr().origin.clone(),
            lsa_type: Self::TYPE,
        }
    }
}

// ===== impl NameLsa =====

impl NameLsa {
    pub fn new(
        origin: NamePrefix,
        seqno: u64,
        lifetime: u64,
        name_list: BTreeSet<NamePrefix>,
    ) -> NameLsa {
        NameLsa {
            hdr: LsaHdr {
                origin,
                seqno,
                lifetime,
            },
            name_list,
        }
    }
}

impl LsaData for NameLsa {
    const TYPE: LsaType = LsaType::Name;

    fn hdr(&self) -> &LsaHdr {
        &self.hdr
    }

    fn hdr_mut(&mut self) -> &mut LsaHdr {
        &mut self.hdr
    }
}

// ===== impl AdjLsa =====

impl AdjLsa {
    pub fn new(
        origin: NamePrefix,
        seqno: u64,
        lifetime: u64,
        link_count: u32,
        links: Vec<Link>,
    ) -> AdjLsa {
        AdjLsa {
            hdr: LsaHdr {
                origin,
                seqno,
                lifetime,
            },
            link_count,
            links,
        }
    }
}

impl LsaData for AdjLsa {
    const TYPE: LsaType = LsaType::Adjacency;

    fn hdr(&self) -> &LsaHdr {
        &self.hdr
    }

    fn hdr_mut(&mut self) -> &mut LsaHdr {
        &mut self.hdr
    }
}

// ===== impl CoordinateLsa =====

impl CoordinateLsa {
    pub fn new(
        origin: NamePrefix,
        seqno: u64,
        lifetime: u64,
        radius: f64,
        angle: f64,
    ) -> CoordinateLsa {
        CoordinateLsa {
            hdr: LsaHdr {
                origin,
                seqno,
                lifetime,
            },
            radius,
            angle,
        }
    }
}

impl LsaData for CoordinateLsa {
    const TYPE: LsaType = LsaType::Coordinate;

    fn hdr(&self) -> &LsaHdr {
        &self.hdr
    }

    fn hdr_mut(&mut self) -> &mut LsaHdr {
        &mut self.hdr
    }
}

// ===== impl Lsa =====

impl Lsa {
    /// Returns the LSA type of this instance.
    pub fn lsa_type(&self) -> LsaType {
        match self {
            Lsa::Name(_) => LsaType::Name,
            Lsa::Adjacency(_) => LsaType::Adjacency,
            Lsa::Coordinate(_) => LsaType::Coordinate,
        }
    }

    /// Returns the header fields common to all LSA types.
    pub fn hdr(&self) -> &LsaHdr {
        match self {
            Lsa::Name(lsa) => &lsa.hdr,
            Lsa::Adjacency(lsa) => &lsa.hdr,
            Lsa::Coordinate(lsa) => &lsa.hdr,
        }
    }

    /// Returns the database key of this LSA instance.
    pub fn key(&self) -> LsaKey {
        LsaKey {
            origin: self.hdr().origin.clone(),
            lsa_type: self.lsa_type(),
        }
    }
}
