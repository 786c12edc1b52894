// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Proptest strategies for generating maps.
//!
//! These are only available when using the `proptest` feature flag.

use std::fmt::Debug;
use std::ops::Range;

use ::proptest::collection::vec;
use ::proptest::strategy::{BoxedStrategy, Strategy};

use crate::RankMap;

/// A strategy for a [`RankMap`] of a given size. Since duplicate keys are
/// kept, the map has exactly as many elements as the strategy generates
/// pairs.
///
/// # Examples
///
/// ```rust,no_run
/// # use ::proptest::proptest;
/// proptest! {
///     #[test]
///     fn proptest_works(map in rankmap::proptest::rank_map(0..9999, ".*", 10..100)) {
///         assert!(map.len() < 100);
///         assert!(map.len() >= 10);
///     }
/// }
/// ```
///
/// [`RankMap`]: ../type.RankMap.html
pub fn rank_map<K: Strategy + 'static, V: Strategy + 'static>(
    key: K,
    value: V,
    size: Range<usize>,
) -> BoxedStrategy<RankMap<K::Value, V::Value>>
where
    K::Value: Ord + Clone + Debug,
    V::Value: Clone + Debug,
{
    vec((key, value), size).prop_map(RankMap::from).boxed()
}
