//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![cfg_attr(
    feature = "testing",
    allow(dead_code, unused_variables, unused_imports)
)]

pub mod adjacency;
pub mod collections;
pub mod debug;
pub mod error;
pub mod events;
pub mod instance;
pub mod lsa;
pub mod lsdb;
pub mod tasks;
