//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use nlsd_utils::lsa::LsaType;
use nlsd_utils::name::NamePrefix;
use tracing::{debug, debug_span};

use crate::lsa::LsaHdr;

// nlsd debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    // Instances
    InstanceCreate,
    InstanceStart,
    InstanceStop,
    // LSDB maintenance
    LsaInstall(LsaType, &'a LsaHdr),
    LsaOriginate(LsaType, &'a LsaHdr),
    LsaRefresh(LsaType, &'a LsaHdr),
    LsaExpire(LsaType, &'a LsaHdr),
    LsaRemove(LsaType, &'a LsaHdr),
    LsaStale(LsaType, &'a LsaHdr),
    AdjLsaBuildPostponed,
    // Local name prefixes
    NameAdvertise(&'a NamePrefix),
    NameWithdraw(&'a NamePrefix),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::InstanceCreate
            | Debug::InstanceStart
            | Debug::InstanceStop
            | Debug::AdjLsaBuildPostponed => {
                // Parent span(s): nlsd-instance
                debug!("{}", self);
            }
            Debug::LsaInstall(lsa_type, hdr)
            | Debug::LsaOriginate(lsa_type, hdr)
            | Debug::LsaRefresh(lsa_type, hdr)
            | Debug::LsaExpire(lsa_type, hdr)
            | Debug::LsaRemove(lsa_type, hdr)
            | Debug::LsaStale(lsa_type, hdr) => {
                // Parent span(s): nlsd-instance
                debug_span!("lsdb", %lsa_type).in_scope(|| {
                    debug!(
                        origin = %hdr.origin,
                        seqno = %hdr.seqno,
                        "{}",
                        self
                    );
                })
            }
            Debug::NameAdvertise(name) | Debug::NameWithdraw(name) => {
                // Parent span(s): nlsd-instance
                debug!(%name, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    // Display debug message. Defines the message to be logged.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::InstanceCreate => {
                write!(f, "instance created")
            }
            Debug::InstanceStart => {
                write!(f, "starting instance")
            }
            Debug::InstanceStop => {
                write!(f, "stopping instance")
            }
            Debug::LsaInstall(..) => {
                write!(f, "installing LSA")
            }
            Debug::LsaOriginate(..) => {
                write!(f, "originating LSA")
            }
            Debug::LsaRefresh(..) => {
                write!(f, "refreshing LSA")
            }
            Debug::LsaExpire(..) => {
                write!(f, "LSA lifetime expired")
            }
            Debug::LsaRemove(..) => {
                write!(f, "removing LSA")
            }
            Debug::LsaStale(..) => {
                write!(f, "discarding stale LSA")
            }
            Debug::AdjLsaBuildPostponed => {
                write!(f, "postponing Adjacency LSA build")
            }
            Debug::NameAdvertise(..) => {
                write!(f, "advertising name prefix")
            }
            Debug::NameWithdraw(..) => {
                write!(f, "withdrawing name prefix")
            }
        }
    }
}
