//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

use generational_arena::Index;
use nlsd_utils::name::NamePrefix;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::lsa::{AdjLsa, CoordinateLsa, LsaData, NameLsa};
use crate::lsdb::LsaEntry;

pub type ObjectId = u32;

#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub enum ObjectKey<T> {
    Id(ObjectId),
    Value(T),
}

pub type LsaEntryId = ObjectId;
pub type LsaEntryIndex = Index;
pub type LsaEntryKey = ObjectKey<NamePrefix>;

#[derive(Debug)]
pub struct Arena<T>(generational_arena::Arena<T>);

/// LSA database for a single LSA type.
///
/// The entries live in the type's arena; the database holds index trees for
/// lookup by entry ID and by origin router. Exactly one entry per origin can
/// exist at any time.
#[derive(Debug)]
pub struct Lsdb<T: LsaData> {
    id_tree: HashMap<LsaEntryId, LsaEntryIndex>,
    origin_tree: BTreeMap<NamePrefix, LsaEntryIndex>,
    next_id: LsaEntryId,
    _marker: PhantomData<T>,
}

/// The three per-type LSA databases.
#[derive(Debug, Default)]
pub struct Lsdbs {
    pub name: Lsdb<NameLsa>,
    pub adjacency: Lsdb<AdjLsa>,
    pub coordinate: Lsdb<CoordinateLsa>,
}

// ===== impl ObjectKey =====

impl<T> From<ObjectId> for ObjectKey<T> {
    fn from(id: ObjectId) -> ObjectKey<T> {
        ObjectKey::Id(id)
    }
}

// ===== impl Arena =====

impl<T> Default for Arena<T> {
    fn default() -> Arena<T> {
        Arena(Default::default())
    }
}

impl<T> std::ops::Index<Index> for Arena<T> {
    type Output = T;

    fn index(&self, index: Index) -> &Self::Output {
        &self.0[index]
    }
}

impl<T> std::ops::IndexMut<Index> for Arena<T> {
    fn index_mut(&mut self, index: Index) -> &mut Self::Output {
        &mut self.0[index]
    }
}

// ===== impl Lsdb =====

impl<T> Lsdb<T>
where
    T: LsaData,
{
    pub(crate) fn insert<'a>(
        &mut self,
        arena: &'a mut Arena<LsaEntry<T>>,
        data: T,
    ) -> (LsaEntryIndex, &'a mut LsaEntry<T>) {
        // Create and insert LSA entry into the arena.
        self.next_id += 1;
        let lse = LsaEntry::new(self.next_id, data);
        let lse_idx = arena.0.insert(lse);

        // Link LSA entry to the lookup trees.
        let lse = &mut arena[lse_idx];
        self.id_tree.insert(lse.id, lse_idx);
        if self
            .origin_tree
            .insert(lse.data.hdr().origin.clone(), lse_idx)
            .is_some()
        {
            panic!("LSA origin={} already exists", lse.data.hdr().origin);
        }

        (lse_idx, lse)
    }

    pub(crate) fn delete(
        &mut self,
        arena: &mut Arena<LsaEntry<T>>,
        lse_idx: LsaEntryIndex,
    ) -> LsaEntry<T> {
        let lse = &mut arena[lse_idx];

        // Unlink LSA entry from the lookup trees.
        self.id_tree.remove(&lse.id);
        self.origin_tree.remove(&lse.data.hdr().origin);

        // Remove LSA entry from the arena.
        arena.0.remove(lse_idx).unwrap()
    }

    pub(crate) fn clear(&mut self, arena: &mut Arena<LsaEntry<T>>) {
        for lse_idx in self.id_tree.values() {
            arena.0.remove(*lse_idx).unwrap();
        }
        self.id_tree.clear();
        self.origin_tree.clear();
    }

    // Returns a reference to the LSA entry corresponding to the given ID.
    pub fn get_by_id<'a>(
        &self,
        arena: &'a Arena<LsaEntry<T>>,
        id: LsaEntryId,
    ) -> Result<(LsaEntryIndex, &'a LsaEntry<T>), Error> {
        self.id_tree
            .get(&id)
            .copied()
            .map(|lse_idx| (lse_idx, &arena[lse_idx]))
            .filter(|(_, lse)| lse.id == id)
            .ok_or(Error::LsaEntryIdNotFound(id))
    }

    // Returns a mutable reference to the LSA entry corresponding to the given
    // ID.
    pub fn get_mut_by_id<'a>(
        &mut self,
        arena: &'a mut Arena<LsaEntry<T>>,
        id: LsaEntryId,
    ) -> Result<(LsaEntryIndex, &'a mut LsaEntry<T>), Error> {
        self.id_tree
            .get(&id)
            .copied()
            .map(move |lse_idx| (lse_idx, &mut arena[lse_idx]))
            .filter(|(_, lse)| lse.id == id)
            .ok_or(Error::LsaEntryIdNotFound(id))
    }

    // Returns a reference to the LSA entry corresponding to the given origin
    // router.
    pub fn get_by_origin<'a>(
        &self,
        arena: &'a Arena<LsaEntry<T>>,
        origin: &NamePrefix,
    ) -> Option<(LsaEntryIndex, &'a LsaEntry<T>)> {
        self.origin_tree
            .get(origin)
            .copied()
            .map(|lse_idx| (lse_idx, &arena[lse_idx]))
    }

    // Returns a mutable reference to the LSA entry corresponding to the given
    // origin router.
    pub fn get_mut_by_origin<'a>(
        &mut self,
        arena: &'a mut Arena<LsaEntry<T>>,
        origin: &NamePrefix,
    ) -> Option<(LsaEntryIndex, &'a mut LsaEntry<T>)> {
        self.origin_tree
            .get(origin)
            .copied()
            .map(move |lse_idx| (lse_idx, &mut arena[lse_idx]))
    }

    // Returns a reference to the LSA entry corresponding to the given object
    // key.
    pub fn get_by_key<'a>(
        &self,
        arena: &'a Arena<LsaEntry<T>>,
        key: &LsaEntryKey,
    ) -> Result<(LsaEntryIndex, &'a LsaEntry<T>), Error> {
        match key {
            LsaEntryKey::Id(id) => self.get_by_id(arena, *id),
            LsaEntryKey::Value(origin) => self
                .get_by_origin(arena, origin)
                .ok_or_else(|| Error::LsaEntryNotFound(origin.clone())),
        }
    }

    // Returns a mutable reference to the LSA entry corresponding to the given
    // object key.
    pub fn get_mut_by_key<'a>(
        &mut self,
        arena: &'a mut Arena<LsaEntry<T>>,
        key: &LsaEntryKey,
    ) -> Result<(LsaEntryIndex, &'a mut LsaEntry<T>), Error> {
        match key {
            LsaEntryKey::Id(id) => self.get_mut_by_id(arena, *id),
            LsaEntryKey::Value(origin) => self
                .get_mut_by_origin(arena, origin)
                .ok_or_else(|| Error::LsaEntryNotFound(origin.clone())),
        }
    }

    // Returns an iterator visiting all LSA entries.
    //
    // Entries are ordered by their origin router names.
    pub fn iter<'a>(
        &'a self,
        arena: &'a Arena<LsaEntry<T>>,
    ) -> impl Iterator<Item = &'a LsaEntry<T>> + 'a {
        self.origin_tree.values().map(|lse_idx| &arena[*lse_idx])
    }
}

impl<T> Default for Lsdb<T>
where
    T: LsaData,
{
    fn default() -> Lsdb<T> {
        Lsdb {
            id_tree: Default::default(),
            origin_tree: Default::default(),
            next_id: 0,
            _marker: PhantomData,
        }
    }
}
