// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// The default fan-out of a tree: the maximum number of elements a single
/// node may hold when no explicit order is requested.
// Sized so a node of small keys and payloads stays within a few cache
// lines; tests use much smaller orders to exercise deep trees.
pub(crate) const DEFAULT_ORDER: usize = 64;

/// The smallest order a tree accepts. Below this, splitting an overfull
/// node cannot produce two non-empty halves around a separator.
pub(crate) const MIN_ORDER: usize = 2;
