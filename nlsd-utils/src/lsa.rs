//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

/// The three LSA types of the link-state protocol.
///
/// The discriminants are the type numbers used on the wire and in LSA name
/// components.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum LsaType {
    Name = 1,
    Adjacency = 2,
    Coordinate = 3,
}

/// Current sequence numbers for this router's self-originated LSAs, one per
/// LSA type.
///
/// Carried in routing-update announcements so peers can fetch the LSA
/// instances they are missing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LsaSeqNumbers {
    pub name: u64,
    pub adjacency: u64,
    pub coordinate: u64,
}

// ===== impl LsaType =====

impl std::fmt::Display for LsaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LsaType::Name => write!(f, "name"),
            LsaType::Adjacency => write!(f, "adjacency"),
            LsaType::Coordinate => write!(f, "coordinate"),
        }
    }
}

impl From<LsaType> for u8 {
    fn from(lsa_type: LsaType) -> u8 {
        lsa_type as u8
    }
}

impl TryFrom<u8> for LsaType {
    type Error = u8;

    fn try_from(value: u8) -> Result<LsaType, u8> {
        match value {
            1 => Ok(LsaType::Name),
            2 => Ok(LsaType::Adjacency),
            3 => Ok(LsaType::Coordinate),
            _ => Err(value),
        }
    }
}

// ===== impl LsaSeqNumbers =====

impl LsaSeqNumbers {
    /// Returns the current sequence number for the given LSA type.
    pub fn get(&self, lsa_type: LsaType) -> u64 {
        match lsa_type {
            LsaType::Name => self.name,
            LsaType::Adjacency => self.adjacency,
            LsaType::Coordinate => self.coordinate,
        }
    }

    /// Updates the current sequence number for the given LSA type.
    pub fn set(&mut self, lsa_type: LsaType, seqno: u64) {
        match lsa_type {
            LsaType::Name => self.name = seqno,
            LsaType::Adjacency => self.adjacency = seqno,
            LsaType::Coordinate => self.coordinate = seqno,
        }
    }
}
