//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use nlsd_utils::UnboundedSender;
use nlsd_utils::lsa::LsaType;
use nlsd_utils::task::TimeoutTask;

use crate::collections::LsaEntryId;

//
// nlsd tasks diagram:
//                                     +--------------+
//                        lsa_rcvd  -> |              |
//                lsa_expiry (Nx)   -> |   instance   |
//                adj_lsa_build     -> |              |
//                                     +--------------+
//                                  ibus_tx (3x) |
//                                               V
//                                     +--------------+
//                                     |     ibus     |
//                                     +--------------+
//

// Inter-task message types.
pub mod messages {
    use nlsd_utils::lsa::LsaType;
    use serde::{Deserialize, Serialize};

    use crate::collections::LsaEntryKey;
    use crate::lsa::Lsa;

    // Type aliases.
    pub type ProtocolInputMsg = input::ProtocolMsg;

    // Input messages (child task -> main task).
    pub mod input {
        use super::*;

        #[derive(Debug)]
        #[derive(Deserialize, Serialize)]
        pub enum ProtocolMsg {
            LsaRcvd(LsaRcvdMsg),
            LsaExpiry(LsaExpiryMsg),
            AdjLsaBuild(AdjLsaBuildMsg),
        }

        #[derive(Debug)]
        #[derive(Deserialize, Serialize)]
        pub struct LsaRcvdMsg {
            pub lsa: Lsa,
        }

        #[derive(Debug)]
        #[derive(Deserialize, Serialize)]
        pub struct LsaExpiryMsg {
            pub lsa_type: LsaType,
            pub lse_key: LsaEntryKey,
            pub seqno: u64,
        }

        #[derive(Debug)]
        #[derive(Deserialize, Serialize)]
        pub struct AdjLsaBuildMsg {}
    }
}

// ===== nlsd tasks =====

// LSA expiry/refresh timer task.
//
// The armed sequence number travels with the event so the handler can detect
// timers made stale by a newer update.
pub(crate) fn lsa_expiry_timer(
    lsa_type: LsaType,
    lse_id: LsaEntryId,
    seqno: u64,
    timeout: u64,
    lsa_expiryp: &UnboundedSender<messages::input::LsaExpiryMsg>,
) -> TimeoutTask {
    #[cfg(not(feature = "testing"))]
    {
        let timeout = Duration::from_secs(timeout);
        let lsa_expiryp = lsa_expiryp.clone();

        TimeoutTask::new(timeout, move || async move {
            let msg = messages::input::LsaExpiryMsg {
                lsa_type,
                lse_key: lse_id.into(),
                seqno,
            };
            let _ = lsa_expiryp.send(msg);
        })
    }
    #[cfg(feature = "testing")]
    {
        TimeoutTask {}
    }
}

// Adjacency LSA build timer task.
pub(crate) fn adj_lsa_build_timer(
    timeout: u64,
    adj_lsa_buildp: &UnboundedSender<messages::input::AdjLsaBuildMsg>,
) -> TimeoutTask {
    #[cfg(not(feature = "testing"))]
    {
        let timeout = Duration::from_secs(timeout);
        let adj_lsa_buildp = adj_lsa_buildp.clone();

        TimeoutTask::new(timeout, move || async move {
            let msg = messages::input::AdjLsaBuildMsg {};
            let _ = adj_lsa_buildp.send(msg);
        })
    }
    #[cfg(feature = "testing")]
    {
        TimeoutTask {}
    }
}
