//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use nlsd_utils::lsa::LsaType;

use crate::collections::LsaEntryKey;
use crate::debug::Debug;
use crate::error::Error;
use crate::instance::{InstanceArenas, InstanceUpView};
use crate::lsa::{AdjLsa, CoordinateLsa, Lsa, LsaData, NameLsa};
use crate::lsdb::{self, LsaLogId, LsaLogReason, LsdbVariant};
use crate::tasks;

// ===== LSA receipt =====

// Processes an LSA learned from the network (already decoded and validated
// by the dissemination layer). Stale instances are discarded by the install
// path.
pub(crate) fn process_lsa_rcvd(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    lsa: Lsa,
) -> Result<(), Error> {
    match lsa {
        Lsa::Name(lsa) => {
            lsdb::install(instance, arenas, lsa);
        }
        Lsa::Adjacency(lsa) => {
            lsdb::install(instance, arenas, lsa);
        }
        Lsa::Coordinate(lsa) => {
            lsdb::install(instance, arenas, lsa);
        }
    }

    Ok(())
}

// ===== LSA expiry event =====

pub(crate) fn process_lsa_expiry(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    lsa_type: LsaType,
    lse_key: LsaEntryKey,
    seqno: u64,
) -> Result<(), Error> {
    match lsa_type {
        LsaType::Name => lsa_expiry::<NameLsa>(instance, arenas, lse_key, seqno),
        LsaType::Adjacency => {
            lsa_expiry::<AdjLsa>(instance, arenas, lse_key, seqno)
        }
        LsaType::Coordinate => {
            lsa_expiry::<CoordinateLsa>(instance, arenas, lse_key, seqno)
        }
    }
}

// Refreshes self-originated LSAs and expires learned ones.
//
// Timer cancellation is best-effort: a fired event may still be queued when
// its entry is removed or updated, so events whose entry is gone or whose
// sequence number no longer matches are ignored.
fn lsa_expiry<T>(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    lse_key: LsaEntryKey,
    seqno: u64,
) -> Result<(), Error>
where
    T: LsdbVariant,
{
    let Ok((lse_idx, lse)) =
        T::lsdb_mut(instance.state).get_mut_by_key(T::arena_mut(arenas), &lse_key)
    else {
        return Ok(());
    };
    if lse.data.hdr().seqno != seqno {
        return Ok(());
    }

    if instance.is_own_router(&lse.data.hdr().origin) {
        // Self-originated LSAs never expire: bump the sequence number,
        // announce it, and re-arm the refresh timer.
        Debug::LsaRefresh(T::TYPE, lse.data.hdr()).log();

        let key = lse.data.key();
        let new_seqno = seqno + 1;
        lse.data.hdr_mut().seqno = new_seqno;
        lse.expiry_timer = Some(tasks::lsa_expiry_timer(
            T::TYPE,
            lse.id,
            new_seqno,
            instance.config.lsa_refresh_interval,
            &instance.tx.protocol_input.lsa_expiry,
        ));

        instance.state.seqnos.set(T::TYPE, new_seqno);
        lsdb::publish_routing_update(instance);
        lsdb::log_lsa(
            instance,
            LsaLogId::new(key, new_seqno),
            LsaLogReason::Refresh,
        );
    } else {
        // Learned LSAs expire: no newer sequence number was observed within
        // the advertised lifetime.
        Debug::LsaExpire(T::TYPE, lse.data.hdr()).log();

        let lse =
            T::lsdb_mut(instance.state).delete(T::arena_mut(arenas), lse_idx);
        lse.data.on_remove(instance);
    }

    T::on_expiry(instance);

    Ok(())
}

// ===== Adjacency LSA build event =====

// Rebuilds this router's Adjacency LSA from the local adjacency list.
//
// The build is postponed while some neighbor is still mid-handshake; with no
// active neighbors left, the LSA is withdrawn instead.
pub(crate) fn process_adj_lsa_build(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
) -> Result<(), Error> {
    instance.state.adj_build_scheduled = false;
    instance.state.adj_build_timer = None;

    if !instance
        .state
        .neighbors
        .is_buildable(instance.config.interest_retry_count)
    {
        Debug::AdjLsaBuildPostponed.log();
        let timeout = instance.config.interest_retry_count as u64
            * instance.config.interest_retry_interval;
        instance.state.adj_build_scheduled = true;
        instance.state.adj_build_timer = Some(tasks::adj_lsa_build_timer(
            timeout,
            &instance.tx.protocol_input.adj_lsa_build,
        ));
        return Ok(());
    }

    let count = instance.state.adj_build_count;
    if count > 0 {
        if instance.state.neighbors.active_count() > 0 {
            lsdb::originate_adj_lsa(instance, arenas);
        } else {
            // No active neighbors left: withdraw the own Adjacency LSA.
            let router_prefix = instance.config.router_prefix.clone();
            lsdb::remove::<AdjLsa>(instance, arenas, &router_prefix);
            instance.tx.ibus.route_calc_schedule();
        }
        instance.state.adj_build_count -= count;
    }

    Ok(())
}
