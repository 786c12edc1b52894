// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An ordered multimap with O(log n) positional access.
//!
//! This crate provides [`RankMap`], a sorted multimap backed by a
//! count-augmented B-tree. It differs from an ordinary ordered map in
//! three ways:
//!
//! - **Duplicate keys are allowed.** Inserting never overwrites; elements
//!   with equal keys keep their insertion order, and a [`MatchPolicy`]
//!   picks between them when a search key is ambiguous.
//! - **Elements are addressable by rank.** Every node caches the element
//!   count of its subtree, so "the n-th element in sorted order" and
//!   "the rank of this key" are O(log n) queries ([`get_at`],
//!   [`offset_of`]), as are splits at arbitrary positions
//!   ([`split_at`]).
//! - **Clones share structure.** A clone is O(1); the two maps share
//!   nodes until one of them writes, and a writer clones only the nodes
//!   it actually touches. A [cursor] can hold a position in the tree and
//!   insert or remove elements there repeatedly without rebuilding
//!   anything around it.
//!
//! # Examples
//!
//! ```
//! # #[macro_use] extern crate rankmap;
//! use rankmap::{MatchPolicy, RankMap};
//!
//! let mut scores: RankMap<&str, u32> = RankMap::new();
//! scores.insert("ada", 310);
//! scores.insert("grace", 420);
//! scores.insert("ada", 275);
//!
//! // duplicates are kept, in insertion order
//! assert_eq!(scores.offset_of(&"ada", MatchPolicy::First), Some(0));
//! assert_eq!(scores.offset_of(&"ada", MatchPolicy::Last), Some(1));
//!
//! // rank-based access
//! assert_eq!(scores.get_at(2), Some((&"grace", &420)));
//!
//! // cheap snapshots
//! let snapshot = scores.clone();
//! scores.remove(&"grace");
//! assert_eq!(snapshot.len(), 3);
//! assert_eq!(scores.len(), 2);
//! ```
//!
//! [`RankMap`]: type.RankMap.html
//! [`MatchPolicy`]: enum.MatchPolicy.html
//! [`get_at`]: struct.GenericRankMap.html#method.get_at
//! [`offset_of`]: struct.GenericRankMap.html#method.offset_of
//! [`split_at`]: struct.GenericRankMap.html#method.split_at
//! [cursor]: struct.CursorMut.html

#[macro_use]
mod util;

mod config;
mod nodes;

pub mod map;
pub mod shared_ptr;

pub use crate::map::{ConsumingIter, CursorMut, GenericRankMap, Iter, RankMap};
pub use crate::nodes::path::MatchPolicy;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

#[cfg(feature = "arbitrary")]
mod arbitrary;
