//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use nlsd_utils::name::NamePrefix;
use tracing::warn;

use crate::collections::LsaEntryId;

// nlsd errors.
#[derive(Debug)]
pub enum Error {
    InstanceNotActive,
    LsaEntryIdNotFound(LsaEntryId),
    LsaEntryNotFound(NamePrefix),
    NeighborExists(NamePrefix),
    NeighborNotFound(NamePrefix),
}

// ===== impl Error =====

impl Error {
    pub(crate) fn log(&self) {
        match self {
            Error::InstanceNotActive => {
                warn!("{}", self);
            }
            Error::LsaEntryIdNotFound(lse_id) => {
                warn!(?lse_id, "{}", self);
            }
            Error::LsaEntryNotFound(origin) => {
                warn!(%origin, "{}", self);
            }
            Error::NeighborExists(name) | Error::NeighborNotFound(name) => {
                warn!(%name, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InstanceNotActive => {
                write!(f, "instance isn't active")
            }
            Error::LsaEntryIdNotFound(..) => {
                write!(f, "LSA entry ID not found")
            }
            Error::LsaEntryNotFound(..) => {
                write!(f, "LSA entry not found")
            }
            Error::NeighborExists(..) => {
                write!(f, "neighbor already exists")
            }
            Error::NeighborNotFound(..) => {
                write!(f, "neighbor not found")
            }
        }
    }
}

impl std::error::Error for Error {}
