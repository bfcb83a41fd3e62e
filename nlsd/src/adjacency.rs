//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use nlsd_utils::name::NamePrefix;
use serde::{Deserialize, Serialize};

use crate::lsa::Link;

/// State of a neighbor in the local adjacency list.
///
/// A neighbor starts `Down` and moves to `Up` once the hello exchange
/// succeeds; every failed hello attempt increments the retry counter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum AdjacencyState {
    Down,
    Up,
}

/// A neighbor of this router.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Adjacency {
    pub name: NamePrefix,
    pub face_uri: String,
    pub link_cost: u32,
    pub state: AdjacencyState,
    pub hello_retries: u32,
}

/// The local adjacency list, keyed by neighbor name.
#[derive(Clone, Debug, Default)]
#[derive(Deserialize, Serialize)]
pub struct AdjacencyList {
    name_tree: BTreeMap<NamePrefix, Adjacency>,
}

// ===== impl Adjacency =====

impl Adjacency {
    pub fn new(
        name: NamePrefix,
        face_uri: String,
        link_cost: u32,
    ) -> Adjacency {
        Adjacency {
            name,
            face_uri,
            link_cost,
            state: AdjacencyState::Down,
            hello_retries: 0,
        }
    }
}

// ===== impl AdjacencyList =====

impl AdjacencyList {
    /// Adds a neighbor to the list. Returns false (without mutating) if a
    /// neighbor with the same name is already present.
    pub fn insert(&mut self, adj: Adjacency) -> bool {
        if self.name_tree.contains_key(&adj.name) {
            return false;
        }
        self.name_tree.insert(adj.name.clone(), adj);
        true
    }

    /// Removes the neighbor with the given name.
    pub fn remove(&mut self, name: &NamePrefix) -> Option<Adjacency> {
        self.name_tree.remove(name)
    }

    /// Returns a reference to the neighbor with the given name.
    pub fn get(&self, name: &NamePrefix) -> Option<&Adjacency> {
        self.name_tree.get(name)
    }

    /// Returns a mutable reference to the neighbor with the given name.
    pub fn get_mut(&mut self, name: &NamePrefix) -> Option<&mut Adjacency> {
        self.name_tree.get_mut(name)
    }

    /// Returns an iterator visiting all neighbors, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Adjacency> {
        self.name_tree.values()
    }

    /// Returns the number of neighbors whose adjacency is up.
    pub fn active_count(&self) -> u32 {
        self.iter()
            .filter(|adj| adj.state == AdjacencyState::Up)
            .count() as u32
    }

    /// Returns whether the Adjacency LSA can be built right now.
    ///
    /// The LSA must not be built while some neighbor is still mid-handshake:
    /// down, but with hello retries remaining.
    pub fn is_buildable(&self, retry_limit: u32) -> bool {
        self.iter().all(|adj| {
            adj.state == AdjacencyState::Up
                || adj.hello_retries >= retry_limit
        })
    }

    /// Returns the Adjacency LSA payload for the active neighbors.
    pub fn links(&self) -> Vec<Link> {
        self.iter()
            .filter(|adj| adj.state == AdjacencyState::Up)
            .map(|adj| Link {
                neighbor: adj.name.clone(),
                face_uri: adj.face_uri.clone(),
                cost: adj.link_cost,
            })
            .collect()
    }
}
