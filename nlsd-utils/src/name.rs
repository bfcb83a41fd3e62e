//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// NDN hierarchical name prefix.
///
/// Names are sequences of `/`-separated components, stored in canonical form
/// (leading slash, no trailing slash, no empty components). The derived
/// ordering is total and component-wise lexicographic, which makes sets of
/// names deterministic to iterate and diff.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct NamePrefix(String);

// ===== impl NamePrefix =====

impl NamePrefix {
    /// The root name, `/`.
    pub fn root() -> NamePrefix {
        NamePrefix("/".to_owned())
    }

    /// Creates a name from its URI representation, normalizing separators.
    pub fn new(uri: impl AsRef<str>) -> NamePrefix {
        let mut name = String::new();
        for component in uri.as_ref().split('/').filter(|c| !c.is_empty()) {
            let _ = write!(name, "/{component}");
        }
        if name.is_empty() {
            return NamePrefix::root();
        }
        NamePrefix(name)
    }

    /// Returns the canonical URI representation of the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns an iterator over the name components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|c| !c.is_empty())
    }

    /// Returns the number of components in the name.
    pub fn len(&self) -> usize {
        self.components().count()
    }

    /// Returns whether this is the root name.
    pub fn is_empty(&self) -> bool {
        self.0 == "/"
    }

    /// Returns a new name with `suffix`'s components appended to this name's.
    pub fn join(&self, suffix: &NamePrefix) -> NamePrefix {
        if suffix.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return suffix.clone();
        }
        NamePrefix(format!("{}{}", self.0, suffix.0))
    }

    /// Returns whether this name is a prefix of `other` (names are prefixes
    /// of themselves).
    pub fn is_prefix_of(&self, other: &NamePrefix) -> bool {
        if self.is_empty() {
            return true;
        }
        other
            .0
            .strip_prefix(&self.0)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

impl std::fmt::Display for NamePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for NamePrefix {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<NamePrefix, Self::Err> {
        Ok(NamePrefix::new(s))
    }
}

impl From<&str> for NamePrefix {
    fn from(uri: &str) -> NamePrefix {
        NamePrefix::new(uri)
    }
}
