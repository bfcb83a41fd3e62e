//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use derive_new::new;
use nlsd_utils::lsa::LsaType;
use nlsd_utils::name::NamePrefix;
use nlsd_utils::task::TimeoutTask;

use crate::collections::{Arena, LsaEntryId, Lsdb};
use crate::debug::Debug;
use crate::instance::{InstanceArenas, InstanceState, InstanceUpView};
use crate::lsa::{AdjLsa, CoordinateLsa, LsaData, LsaKey, NameLsa};
use crate::tasks;

// Delay before a requested Adjacency LSA build runs, to coalesce bursts of
// neighbor changes.
pub const ADJ_LSA_BUILD_DELAY: u64 = 5;
// Maximum size of the LSA log record.
const LSA_LOG_MAX_SIZE: usize = 64;

// LSA database entry.
#[derive(Debug)]
pub struct LsaEntry<T> {
    // LSA entry ID.
    pub id: LsaEntryId,
    // LSA data.
    pub data: T,
    // Timer triggered when the LSA's expiry interval elapses; refreshes
    // self-originated LSAs and expires learned ones.
    pub expiry_timer: Option<TimeoutTask>,
}

/// Outcome of installing an LSA into the database.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InstallResult {
    // First instance for this (origin, type).
    Installed,
    // Higher sequence number merged into the stored instance.
    Refreshed,
    // Sequence number not higher than the stored one; nothing changed.
    Stale,
}

#[derive(Debug)]
#[derive(new)]
pub struct LsaLogEntry {
    pub id: u32,
    pub lsa: LsaLogId,
    pub reason: LsaLogReason,
}

#[derive(Clone, Debug)]
#[derive(new)]
pub struct LsaLogId {
    pub key: LsaKey,
    pub seqno: u64,
}

#[derive(Debug)]
pub enum LsaLogReason {
    Refresh,
    ContentChange,
}

/// LSA-type-specific database behavior: storage projections plus the
/// side-effect hooks invoked by the install/merge engine.
pub trait LsdbVariant: LsaData + Sized {
    // Storage projections.
    fn lsdb(state: &InstanceState) -> &Lsdb<Self>;
    fn lsdb_mut(state: &mut InstanceState) -> &mut Lsdb<Self>;
    fn arena(arenas: &InstanceArenas) -> &Arena<LsaEntry<Self>>;
    fn arena_mut(arenas: &mut InstanceArenas) -> &mut Arena<LsaEntry<Self>>;

    // Invoked when the first instance for this (origin, type) is installed.
    fn on_install(&self, instance: &mut InstanceUpView<'_>);

    // Merges a higher-sequence instance into the stored one (payload only;
    // the header was already updated). Returns whether the payload changed.
    fn merge(
        stored: &mut Self,
        incoming: Self,
        instance: &mut InstanceUpView<'_>,
    ) -> bool;

    // Invoked when the LSA is removed from the database.
    fn on_remove(&self, instance: &mut InstanceUpView<'_>);

    // Invoked after an expiry-timer event was acted upon (refresh or
    // removal).
    fn on_expiry(instance: &mut InstanceUpView<'_>);
}

// ===== impl LsaEntry =====

impl<T> LsaEntry<T> {
    pub(crate) fn new(id: LsaEntryId, data: T) -> LsaEntry<T> {
        LsaEntry {
            id,
            data,
            expiry_timer: None,
        }
    }
}

// ===== impl NameLsa =====

impl LsdbVariant for NameLsa {
    fn lsdb(state: &InstanceState) -> &Lsdb<NameLsa> {
        &state.lsdb.name
    }

    fn lsdb_mut(state: &mut InstanceState) -> &mut Lsdb<NameLsa> {
        &mut state.lsdb.name
    }

    fn arena(arenas: &InstanceArenas) -> &Arena<LsaEntry<NameLsa>> {
        &arenas.name_lsas
    }

    fn arena_mut(
        arenas: &mut InstanceArenas,
    ) -> &mut Arena<LsaEntry<NameLsa>> {
        &mut arenas.name_lsas
    }

    fn on_install(&self, instance: &mut InstanceUpView<'_>) {
        // This router doesn't route to itself: self-originated LSAs never
        // touch the name-prefix table.
        if instance.is_own_router(&self.hdr.origin) {
            return;
        }

        // Register the origin router and every advertised name, pointing at
        // the origin router as the destination.
        let ibus = &instance.tx.ibus;
        ibus.prefix_entry_add(self.hdr.origin.clone(), self.hdr.origin.clone());
        for name in self
            .name_list
            .iter()
            .filter(|name| !instance.is_own_router(name))
        {
            ibus.prefix_entry_add(name.clone(), self.hdr.origin.clone());
        }
    }

    fn merge(
        stored: &mut NameLsa,
        incoming: NameLsa,
        instance: &mut InstanceUpView<'_>,
    ) -> bool {
        let origin = stored.hdr.origin.clone();
        let foreign = !instance.is_own_router(&origin);

        // Compute the set differences between the advertised name sets (both
        // sides ordered).
        let added = incoming
            .name_list
            .difference(&stored.name_list)
            .cloned()
            .collect::<Vec<_>>();
        let removed = stored
            .name_list
            .difference(&incoming.name_list)
            .cloned()
            .collect::<Vec<_>>();
        let changed = !added.is_empty() || !removed.is_empty();

        for name in added {
            stored.name_list.insert(name.clone());
            if foreign && !instance.is_own_router(&name) {
                instance.tx.ibus.prefix_entry_add(name, origin.clone());
            }
        }
        for name in removed {
            stored.name_list.remove(&name);
            if foreign && !instance.is_own_router(&name) {
                instance.tx.ibus.prefix_entry_del(name, origin.clone());
            }
        }

        changed
    }

    fn on_remove(&self, instance: &mut InstanceUpView<'_>) {
        if instance.is_own_router(&self.hdr.origin) {
            return;
        }

        // Retract every name-prefix-table entry this LSA installed.
        let ibus = &instance.tx.ibus;
        ibus.prefix_entry_del(self.hdr.origin.clone(), self.hdr.origin.clone());
        for name in self
            .name_list
            .iter()
            .filter(|name| !instance.is_own_router(name))
        {
            ibus.prefix_entry_del(name.clone(), self.hdr.origin.clone());
        }
    }

    fn on_expiry(_instance: &mut InstanceUpView<'_>) {}
}

// ===== impl AdjLsa =====

impl LsdbVariant for AdjLsa {
    fn lsdb(state: &InstanceState) -> &Lsdb<AdjLsa> {
        &state.lsdb.adjacency
    }

    fn lsdb_mut(state: &mut InstanceState) -> &mut Lsdb<AdjLsa> {
        &mut state.lsdb.adjacency
    }

    fn arena(arenas: &InstanceArenas) -> &Arena<LsaEntry<AdjLsa>> {
        &arenas.adj_lsas
    }

    fn arena_mut(arenas: &mut InstanceArenas) -> &mut Arena<LsaEntry<AdjLsa>> {
        &mut arenas.adj_lsas
    }

    fn on_install(&self, instance: &mut InstanceUpView<'_>) {
        if !instance.is_own_router(&self.hdr.origin) {
            instance
                .tx
                .ibus
                .prefix_entry_add(self.hdr.origin.clone(), self.hdr.origin.clone());
        }

        // A new adjacency set always affects the topology.
        instance.tx.ibus.route_calc_schedule();
    }

    fn merge(
        stored: &mut AdjLsa,
        incoming: AdjLsa,
        instance: &mut InstanceUpView<'_>,
    ) -> bool {
        // Recompute routes only when the adjacency payload actually differs.
        if stored.links == incoming.links
            && stored.link_count == incoming.link_count
        {
            return false;
        }

        stored.links = incoming.links;
        stored.link_count = incoming.link_count;
        instance.tx.ibus.route_calc_schedule();
        true
    }

    fn on_remove(&self, instance: &mut InstanceUpView<'_>) {
        if !instance.is_own_router(&self.hdr.origin) {
            instance
                .tx
                .ibus
                .prefix_entry_del(self.hdr.origin.clone(), self.hdr.origin.clone());
        }
    }

    fn on_expiry(instance: &mut InstanceUpView<'_>) {
        instance.tx.ibus.route_calc_schedule();
    }
}

// ===== impl CoordinateLsa =====

impl LsdbVariant for CoordinateLsa {
    fn lsdb(state: &InstanceState) -> &Lsdb<CoordinateLsa> {
        &state.lsdb.coordinate
    }

    fn lsdb_mut(state: &mut InstanceState) -> &mut Lsdb<CoordinateLsa> {
        &mut state.lsdb.coordinate
    }

    fn arena(arenas: &InstanceArenas) -> &Arena<LsaEntry<CoordinateLsa>> {
        &arenas.coordinate_lsas
    }

    fn arena_mut(
        arenas: &mut InstanceArenas,
    ) -> &mut Arena<LsaEntry<CoordinateLsa>> {
        &mut arenas.coordinate_lsas
    }

    fn on_install(&self, instance: &mut InstanceUpView<'_>) {
        if !instance.is_own_router(&self.hdr.origin) {
            instance
                .tx
                .ibus
                .prefix_entry_add(self.hdr.origin.clone(), self.hdr.origin.clone());
        }

        if instance.config.hyperbolic_routing {
            instance.tx.ibus.route_calc_schedule();
        }
    }

    fn merge(
        stored: &mut CoordinateLsa,
        incoming: CoordinateLsa,
        instance: &mut InstanceUpView<'_>,
    ) -> bool {
        if stored.radius == incoming.radius && stored.angle == incoming.angle {
            return false;
        }

        stored.radius = incoming.radius;
        stored.angle = incoming.angle;

        // Coordinates only matter to the route calculator in hyperbolic mode.
        if instance.config.hyperbolic_routing {
            instance.tx.ibus.route_calc_schedule();
        }
        true
    }

    fn on_remove(&self, instance: &mut InstanceUpView<'_>) {
        if !instance.is_own_router(&self.hdr.origin) {
            instance
                .tx
                .ibus
                .prefix_entry_del(self.hdr.origin.clone(), self.hdr.origin.clone());
        }
    }

    fn on_expiry(instance: &mut InstanceUpView<'_>) {
        if instance.config.hyperbolic_routing {
            instance.tx.ibus.route_calc_schedule();
        }
    }
}

// ===== helper functions =====

// Self-originated LSAs refresh on the configured interval; learned LSAs
// expire on their advertised lifetime.
fn expiry_interval(instance: &InstanceUpView<'_>, origin: &NamePrefix, lifetime: u64) -> u64 {
    if instance.is_own_router(origin) {
        instance.config.lsa_refresh_interval
    } else {
        lifetime
    }
}

// Adds log entry for the newly installed or refreshed LSA.
pub(crate) fn log_lsa(
    instance: &mut InstanceUpView<'_>,
    lsa: LsaLogId,
    reason: LsaLogReason,
) {
    // Get next log ID.
    let log_id = &mut instance.state.lsa_log_next_id;
    *log_id += 1;

    // Add new log entry.
    let log_entry = LsaLogEntry::new(*log_id, lsa, reason);
    instance.state.lsa_log.push_front(log_entry);

    // Remove old entries if necessary.
    instance.state.lsa_log.truncate(LSA_LOG_MAX_SIZE);
}

fn originate<T>(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    lsa: T,
) where
    T: LsdbVariant,
{
    Debug::LsaOriginate(T::TYPE, lsa.hdr()).log();

    // Push the new sequence number to the sequencing state and announce it
    // so peers learn about the new LSA instance.
    instance.state.seqnos.set(T::TYPE, lsa.hdr().seqno);
    publish_routing_update(instance);

    install(instance, arenas, lsa);
}

// ===== global functions =====

/// Installs the provided LSA into the database.
///
/// This is the single entry point for both network-learned and
/// self-originated LSAs: it decides between new install, refresh-merge and
/// stale discard, applies the type-specific side effects, and (re)schedules
/// the entry's expiry/refresh timer.
pub fn install<T>(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    lsa: T,
) -> InstallResult
where
    T: LsdbVariant,
{
    Debug::LsaInstall(T::TYPE, lsa.hdr()).log();

    let key = lsa.key();

    // Merge or discard when an instance for this key is already present.
    if let Some((_, lse)) =
        T::lsdb_mut(instance.state).get_mut_by_origin(T::arena_mut(arenas), &key.origin)
    {
        // An update with a sequence number not higher than the stored one is
        // a stale or duplicated advertisement.
        if lsa.hdr().seqno <= lse.data.hdr().seqno {
            Debug::LsaStale(T::TYPE, lsa.hdr()).log();
            return InstallResult::Stale;
        }

        // Merge in place: header unconditionally, payload via the
        // type-specific hook.
        let seqno = lsa.hdr().seqno;
        let lifetime = lsa.hdr().lifetime;
        lse.data.hdr_mut().seqno = seqno;
        lse.data.hdr_mut().lifetime = lifetime;
        let content_change = T::merge(&mut lse.data, lsa, instance);

        // Replace the previous expiry timer with one armed for the new
        // sequence number.
        let timeout = expiry_interval(instance, &key.origin, lifetime);
        lse.expiry_timer = Some(tasks::lsa_expiry_timer(
            T::TYPE,
            lse.id,
            seqno,
            timeout,
            &instance.tx.protocol_input.lsa_expiry,
        ));

        let reason = if content_change {
            LsaLogReason::ContentChange
        } else {
            LsaLogReason::Refresh
        };
        log_lsa(instance, LsaLogId::new(key, seqno), reason);

        return InstallResult::Refreshed;
    }

    // First instance for this key: insert and apply the type-specific
    // install side effects.
    let (_, lse) = T::lsdb_mut(instance.state).insert(T::arena_mut(arenas), lsa);
    lse.data.on_install(instance);

    let seqno = lse.data.hdr().seqno;
    let lifetime = lse.data.hdr().lifetime;
    let timeout = expiry_interval(instance, &key.origin, lifetime);
    lse.expiry_timer = Some(tasks::lsa_expiry_timer(
        T::TYPE,
        lse.id,
        seqno,
        timeout,
        &instance.tx.protocol_input.lsa_expiry,
    ));

    log_lsa(instance, LsaLogId::new(key, seqno), LsaLogReason::ContentChange);

    InstallResult::Installed
}

/// Removes the LSA originated by `origin` from the database, retracting the
/// name-prefix-table entries it installed.
///
/// Returns false if no such LSA exists.
pub fn remove<T>(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    origin: &NamePrefix,
) -> bool
where
    T: LsdbVariant,
{
    let Some((lse_idx, _)) =
        T::lsdb(instance.state).get_by_origin(T::arena(arenas), origin)
    else {
        return false;
    };

    // Deleting the entry drops its pending expiry timer.
    let lse = T::lsdb_mut(instance.state).delete(T::arena_mut(arenas), lse_idx);
    Debug::LsaRemove(T::TYPE, lse.data.hdr()).log();
    lse.data.on_remove(instance);

    true
}

/// Checks whether an LSA with the given key is present in the database.
pub fn lsa_exists(
    state: &InstanceState,
    arenas: &InstanceArenas,
    key: &LsaKey,
) -> bool {
    match key.lsa_type {
        LsaType::Name => state
            .lsdb
            .name
            .get_by_origin(&arenas.name_lsas, &key.origin)
            .is_some(),
        LsaType::Adjacency => state
            .lsdb
            .adjacency
            .get_by_origin(&arenas.adj_lsas, &key.origin)
            .is_some(),
        LsaType::Coordinate => state
            .lsdb
            .coordinate
            .get_by_origin(&arenas.coordinate_lsas, &key.origin)
            .is_some(),
    }
}

/// Builds this router's Name LSA from the local name-prefix list and
/// installs it at the next sequence number.
pub fn originate_name_lsa(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
) {
    let seqno = instance.state.seqnos.get(LsaType::Name) + 1;
    let lsa = NameLsa::new(
        instance.config.router_prefix.clone(),
        seqno,
        instance.config.lsa_lifetime,
        instance.state.name_prefixes.clone(),
    );
    originate(instance, arenas, lsa);
}

/// Builds this router's Adjacency LSA from the active neighbors and installs
/// it at the next sequence number.
pub fn originate_adj_lsa(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
) {
    let seqno = instance.state.seqnos.get(LsaType::Adjacency) + 1;
    let lsa = AdjLsa::new(
        instance.config.router_prefix.clone(),
        seqno,
        instance.config.lsa_lifetime,
        instance.state.neighbors.active_count(),
        instance.state.neighbors.links(),
    );
    originate(instance, arenas, lsa);
}

/// Builds this router's Coordinate LSA from the configured hyperbolic
/// coordinates and installs it at the next sequence number.
pub fn originate_coordinate_lsa(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
) {
    let seqno = instance.state.seqnos.get(LsaType::Coordinate) + 1;
    let lsa = CoordinateLsa::new(
        instance.config.router_prefix.clone(),
        seqno,
        instance.config.lsa_lifetime,
        instance.config.hyperbolic_radius,
        instance.config.hyperbolic_angle,
    );
    originate(instance, arenas, lsa);
}

/// Announces the current self-originated LSA sequence numbers under this
/// router's LSA prefix.
pub(crate) fn publish_routing_update(instance: &InstanceUpView<'_>) {
    let lsa_prefix = instance
        .config
        .lsa_sync_prefix
        .join(&instance.config.router_prefix);
    instance
        .tx
        .ibus
        .routing_update_publish(instance.state.seqnos, lsa_prefix);
}
