// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An ordered multimap with positional access.
//!
//! An immutable-friendly sorted multimap implemented as a
//! count-augmented B-tree. Keys may repeat; elements with equal keys keep
//! their insertion order. Every element has a zero-based *offset* (its
//! rank in the sorted sequence), and both key lookup and offset lookup
//! run in O(log n). Clones share structure and only copy the nodes a
//! mutation actually touches.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{Debug, Error, Formatter};
use std::hash::{Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};

use archery::{SharedPointer, SharedPointerKind};

use crate::config::{DEFAULT_ORDER, MIN_ORDER};
use crate::nodes::btree;
use crate::nodes::btree::Node;
use crate::nodes::cursor::CursorPath;
use crate::nodes::path::{MatchPolicy, MutPathState, NodePtr, PathState};
use crate::nodes::strong::StrongPath;
use crate::nodes::weak::WeakPath;
use crate::shared_ptr::DefaultSharedPtr;

/// Construct a map from a sequence of key/value pairs.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate rankmap;
/// # use rankmap::RankMap;
/// # fn main() {
/// assert_eq!(
///   rankmap! {1 => "one", 2 => "two"},
///   RankMap::from(vec![(1, "one"), (2, "two")])
/// );
/// # }
/// ```
#[macro_export]
macro_rules! rankmap {
    () => { $crate::map::RankMap::new() };

    ( $( $key:expr => $value:expr ),* $(,)? ) => {{
        let mut map = $crate::map::RankMap::new();
        $(
            map.insert($key, $value);
        )*
        map
    }};
}

/// Type alias for [`GenericRankMap`] that uses [`DefaultSharedPtr`] as
/// the pointer type.
///
/// [GenericRankMap]: ./struct.GenericRankMap.html
/// [DefaultSharedPtr]: ../shared_ptr/type.DefaultSharedPtr.html
pub type RankMap<K, V> = GenericRankMap<K, V, DefaultSharedPtr>;

/// An ordered multimap with positional access.
///
/// Most operations are O(log n). Unlike a plain ordered map, duplicate
/// keys are allowed — inserting never overwrites — and elements are
/// addressable by their rank in the sorted sequence, so the n-th element
/// and the rank of a key are both cheap queries.
pub struct GenericRankMap<K, V, P: SharedPointerKind> {
    root: NodePtr<K, V, P>,
}

impl<K, V, P: SharedPointerKind> GenericRankMap<K, V, P> {
    /// Construct an empty map with the default node fan-out.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_order(DEFAULT_ORDER)
    }

    /// Construct an empty map whose nodes hold at most `order` elements.
    ///
    /// Small orders are mainly useful to force deep trees in tests.
    ///
    /// # Panics
    ///
    /// If `order < 2`.
    #[must_use]
    pub fn with_order(order: usize) -> Self {
        assert!(order >= MIN_ORDER, "order must be at least {}", MIN_ORDER);
        GenericRankMap {
            root: SharedPointer::new(Node::new(order)),
        }
    }

    /// Construct a map with a single element.
    #[inline]
    #[must_use]
    pub fn unit(key: K, value: V) -> Self {
        GenericRankMap {
            root: SharedPointer::new(Node::unit(DEFAULT_ORDER, key, value)),
        }
    }

    /// Test whether the map is empty.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of elements in the map.
    ///
    /// Time: O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate rankmap;
    /// assert_eq!(3, rankmap! {1 => 11, 2 => 22, 3 => 33}.len());
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.size()
    }

    /// The maximum number of elements a single tree node may hold.
    #[inline]
    #[must_use]
    pub fn order(&self) -> usize {
        self.root.order()
    }

    /// Test whether two maps refer to the same content in memory.
    ///
    /// This is true when the two sides are references to the same map or
    /// share the same root node, for instance right after a clone.
    ///
    /// Time: O(1)
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq::<Node<K, V, P>>(&*self.root, &*other.root)
    }

    /// Discard all elements from the map.
    pub fn clear(&mut self) {
        self.root = SharedPointer::new(Node::new(self.root.order()));
    }
}

impl<K, V, P> GenericRankMap<K, V, P>
where
    K: Ord,
    P: SharedPointerKind,
{
    /// Get the element with the smallest key, or `None` for an empty map.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get_min(&self) -> Option<(&K, &V)> {
        self.root.first_entry().map(|(k, v)| (k, v))
    }

    /// Get the element with the largest key, or `None` for an empty map.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get_max(&self) -> Option<(&K, &V)> {
        self.root.last_entry().map(|(k, v)| (k, v))
    }

    /// Get the offset (rank) of the element `policy` selects for `key`,
    /// or `None` when the key is absent. For [`MatchPolicy::After`] the
    /// reported offset is one past the last match.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate rankmap;
    /// # use rankmap::MatchPolicy;
    /// let mut map = rankmap! {1 => "a", 2 => "b"};
    /// map.insert(1, "c");
    /// assert_eq!(Some(0), map.offset_of(&1, MatchPolicy::First));
    /// assert_eq!(Some(1), map.offset_of(&1, MatchPolicy::Last));
    /// assert_eq!(Some(2), map.offset_of(&1, MatchPolicy::After));
    /// assert_eq!(None, map.offset_of(&3, MatchPolicy::First));
    /// ```
    #[must_use]
    pub fn offset_of<BK>(&self, key: &BK, policy: MatchPolicy) -> Option<usize>
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        let (offset, matched) = match policy {
            MatchPolicy::First => self.root.search_first(key),
            MatchPolicy::Last => self.root.search_last(key),
            MatchPolicy::After => {
                let (offset, matched) = self.root.search_last(key);
                (if matched { offset + 1 } else { offset }, matched)
            }
            MatchPolicy::Any => self.root.search_any(key),
        };
        if matched {
            Some(offset)
        } else {
            None
        }
    }
}

impl<K, V, P> GenericRankMap<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    /// Construct a map in one pass from elements already sorted by key.
    /// This builds a minimal-height tree directly, bypassing per-element
    /// insertion.
    ///
    /// Time: O(n)
    ///
    /// # Panics
    ///
    /// If `order < 2`. Debug builds also check that the input is sorted.
    #[must_use]
    pub fn from_sorted_iter<I>(order: usize, iterable: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        assert!(order >= MIN_ORDER, "order must be at least {}", MIN_ORDER);
        let entries: Vec<(K, V)> = iterable.into_iter().collect();
        GenericRankMap {
            root: Node::from_sorted(order, entries),
        }
    }

    /// Get the value of the first element matching `key`, or `None`.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn get<BK>(&self, key: &BK) -> Option<&V>
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        self.lookup(key, MatchPolicy::First).and_then(|(k, v)| {
            if k.borrow() == key {
                Some(v)
            } else {
                None
            }
        })
    }

    /// Get the element at the position `policy` selects for `key`, or
    /// `None` when that position is the end of the map. When the key is
    /// absent this reports the element the key would be inserted before
    /// (the ceiling); [`MatchPolicy::After`] always reports the first
    /// element greater than `key`.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn lookup<BK>(&self, key: &BK, policy: MatchPolicy) -> Option<(&K, &V)>
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        let path = WeakPath::at_key(&self.root, key, policy);
        if path.is_at_end() {
            None
        } else {
            let (k, v) = path.current_entry();
            Some((k, v))
        }
    }

    /// Test whether the map contains an element with the given key.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn contains_key<BK>(&self, key: &BK) -> bool
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        self.get(key).is_some()
    }

    /// Get the element at `offset` in sorted order, or `None` when the
    /// offset is past the last element.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate rankmap;
    /// let map = rankmap! {10 => "a", 20 => "b", 30 => "c"};
    /// assert_eq!(Some((&20, &"b")), map.get_at(1));
    /// assert_eq!(None, map.get_at(3));
    /// ```
    #[must_use]
    pub fn get_at(&self, offset: usize) -> Option<(&K, &V)> {
        if offset >= self.len() {
            return None;
        }
        let path = WeakPath::at_offset(&self.root, offset);
        let (k, v) = path.current_entry();
        Some((k, v))
    }

    /// Insert an element. Duplicate keys are kept: the new element lands
    /// after every existing element with an equal key, so iteration sees
    /// equal keys in insertion order.
    ///
    /// Time: O(log n)
    pub fn insert(&mut self, key: K, value: V) {
        let mut path = StrongPath::at_key(self.take_root(), &key, MatchPolicy::After);
        path.insert((key, value));
        self.root = path.finish();
    }

    /// Remove the first element matching `key` and return it, or `None`
    /// when the key is absent.
    ///
    /// Time: O(log n)
    pub fn remove<BK>(&mut self, key: &BK) -> Option<(K, V)>
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        let (offset, matched) = self.root.search_first(key);
        if !matched {
            return None;
        }
        Some(self.remove_at(offset))
    }

    /// Remove and return the element at `offset`.
    ///
    /// Time: O(log n)
    ///
    /// # Panics
    ///
    /// If `offset >= len`.
    pub fn remove_at(&mut self, offset: usize) -> (K, V) {
        let mut path = StrongPath::at_offset(self.take_root(), offset);
        let entry = path.remove();
        self.root = path.finish();
        entry
    }

    /// Remove and return the element with the smallest key.
    ///
    /// Time: O(log n)
    pub fn pop_min(&mut self) -> Option<(K, V)> {
        if self.is_empty() {
            None
        } else {
            Some(self.remove_at(0))
        }
    }

    /// Remove and return the element with the largest key.
    ///
    /// Time: O(log n)
    pub fn pop_max(&mut self) -> Option<(K, V)> {
        if self.is_empty() {
            None
        } else {
            Some(self.remove_at(self.len() - 1))
        }
    }

    /// Split the map around the element at `offset`: everything before
    /// it, the element itself, and everything after it. All three share
    /// structure with `self`, which is unaffected.
    ///
    /// Time: O(log n)
    ///
    /// # Panics
    ///
    /// If `offset >= len`.
    #[must_use]
    pub fn split_at(&self, offset: usize) -> (Self, (K, V), Self) {
        let path = WeakPath::at_offset(&self.root, offset);
        let (prefix, separator, suffix) = path.split();
        (
            GenericRankMap { root: prefix },
            separator,
            GenericRankMap { root: suffix },
        )
    }

    /// The first `n` elements as a map of their own, sharing structure
    /// with `self`.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn take(&self, n: usize) -> Self {
        if n >= self.len() {
            return self.clone();
        }
        let path = WeakPath::at_offset(&self.root, n);
        GenericRankMap {
            root: path.prefix(),
        }
    }

    /// Everything but the first `n` elements, sharing structure with
    /// `self`.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn skip(&self, n: usize) -> Self {
        if n == 0 {
            return self.clone();
        }
        if n > self.len() {
            return Self::with_order(self.order());
        }
        let path = WeakPath::at_offset(&self.root, n - 1);
        GenericRankMap {
            root: path.suffix(),
        }
    }

    /// Create an iterator over the elements in sorted order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter {
            fwd: WeakPath::start_of(&self.root),
            bwd: WeakPath::end_of(&self.root),
            remaining: self.len(),
        }
    }

    /// Open a cursor at `offset`. The cursor borrows the map mutably and
    /// writes its changes back when dropped.
    ///
    /// # Panics
    ///
    /// If `offset > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate rankmap;
    /// let mut map = rankmap! {1 => "a", 3 => "c"};
    /// {
    ///     let mut cursor = map.cursor_at(1);
    ///     cursor.insert(2, "b");
    ///     assert_eq!(Some(&"c"), cursor.value());
    /// }
    /// assert_eq!(Some((&2, &"b")), map.get_at(1));
    /// ```
    pub fn cursor_at(&mut self, offset: usize) -> CursorMut<'_, K, V, P> {
        let path = CursorPath::at_offset(self.take_root(), offset);
        CursorMut {
            map: self,
            path: Some(path),
        }
    }

    /// Open a cursor at the position `policy` selects for `key`.
    pub fn cursor_at_key<BK>(&mut self, key: &BK, policy: MatchPolicy) -> CursorMut<'_, K, V, P>
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        let path = CursorPath::at_key(self.take_root(), key, policy);
        CursorMut {
            map: self,
            path: Some(path),
        }
    }

    /// Takes the root out for a path to work on, leaving an empty
    /// placeholder; the caller must store the finished root back.
    fn take_root(&mut self) -> NodePtr<K, V, P> {
        let placeholder = SharedPointer::new(Node::new(self.root.order()));
        std::mem::replace(&mut self.root, placeholder)
    }
}

impl<K, V, P: SharedPointerKind> Clone for GenericRankMap<K, V, P> {
    /// Clone the map, sharing every node until one side mutates.
    ///
    /// Time: O(1)
    fn clone(&self) -> Self {
        GenericRankMap {
            root: SharedPointer::clone(&self.root),
        }
    }
}

impl<K, V, P: SharedPointerKind> Default for GenericRankMap<K, V, P> {
    fn default() -> Self {
        Self::new()
    }
}

/// A mutable cursor into a map: a position that survives any number of
/// insertions and removals made through it. Changes are written back into
/// the owning map when the cursor is dropped.
pub struct CursorMut<'a, K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    map: &'a mut GenericRankMap<K, V, P>,
    path: Option<CursorPath<K, V, P>>,
}

impl<'a, K, V, P> CursorMut<'a, K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn path(&self) -> &CursorPath<K, V, P> {
        self.path.as_ref().unwrap()
    }

    fn path_mut(&mut self) -> &mut CursorPath<K, V, P> {
        self.path.as_mut().unwrap()
    }

    /// The number of elements in the underlying map, including edits made
    /// through this cursor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.path().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cursor's position in the sorted sequence; `len()` means the
    /// end position.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.path().offset()
    }

    #[must_use]
    pub fn is_at_start(&self) -> bool {
        self.path().is_at_start()
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.path().is_at_end()
    }

    /// The element at the cursor, or `None` at the end position.
    #[must_use]
    pub fn entry(&self) -> Option<(&K, &V)> {
        if self.is_at_end() {
            None
        } else {
            let (k, v) = self.path().entry();
            Some((k, v))
        }
    }

    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.entry().map(|(k, _)| k)
    }

    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.entry().map(|(_, v)| v)
    }

    /// Mutable access to the value at the cursor, or `None` at the end
    /// position.
    #[must_use]
    pub fn value_mut(&mut self) -> Option<&mut V> {
        if self.is_at_end() {
            None
        } else {
            Some(self.path_mut().value_mut())
        }
    }

    /// Advance to the next element.
    ///
    /// # Panics
    ///
    /// If the cursor is at the end position.
    pub fn move_forward(&mut self) {
        self.path_mut().move_forward();
    }

    /// Retreat to the previous element.
    ///
    /// # Panics
    ///
    /// If the cursor is at the start position.
    pub fn move_backward(&mut self) {
        self.path_mut().move_backward();
    }

    pub fn move_to_start(&mut self) {
        self.path_mut().move_to_start();
    }

    pub fn move_to_end(&mut self) {
        self.path_mut().move_to_end();
    }

    /// Jump to an absolute offset.
    ///
    /// # Panics
    ///
    /// If `offset > len`.
    pub fn move_to_offset(&mut self, offset: usize) {
        self.path_mut().move_to_offset(offset);
    }

    /// Jump to the position `policy` selects for `key`.
    pub fn move_to_key<BK>(&mut self, key: &BK, policy: MatchPolicy)
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        self.path_mut().move_to_key(key, policy);
    }

    /// Insert an element at the cursor's position; afterwards the cursor
    /// is positioned just past it. The key must sort at this position —
    /// at or after the previous element's key and at or before the next
    /// one's.
    pub fn insert(&mut self, key: K, value: V) {
        let path = self.path_mut();
        debug_assert!(
            path.is_at_end() || *path.key() >= key,
            "cursor insert would break the key order"
        );
        path.insert((key, value));
    }

    /// Remove and return the element at the cursor, which ends up at the
    /// same offset, addressing the removed element's successor.
    ///
    /// # Panics
    ///
    /// If the cursor is at the end position.
    pub fn remove(&mut self) -> (K, V) {
        self.path_mut().remove()
    }
}

impl<'a, K, V, P> Drop for CursorMut<'a, K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            self.map.root = path.finish();
        }
    }
}

/// A double-ended iterator over a map's elements in sorted order.
pub struct Iter<'a, K, V, P: SharedPointerKind> {
    fwd: WeakPath<'a, K, V, P>,
    bwd: WeakPath<'a, K, V, P>,
    remaining: usize,
}

impl<'a, K, V, P> Iterator for Iter<'a, K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let (k, v) = self.fwd.current_entry();
        self.fwd.move_forward();
        Some((k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, P> DoubleEndedIterator for Iter<'a, K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.bwd.move_backward();
        let (k, v) = self.bwd.current_entry();
        Some((k, v))
    }
}

impl<'a, K, V, P> ExactSizeIterator for Iter<'a, K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
}

impl<'a, K, V, P> FusedIterator for Iter<'a, K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
}

impl<'a, K, V, P: SharedPointerKind> Clone for Iter<'a, K, V, P> {
    fn clone(&self) -> Self {
        Iter {
            fwd: self.fwd.clone(),
            bwd: self.bwd.clone(),
            remaining: self.remaining,
        }
    }
}

/// A consuming iterator over a map's elements in sorted order. Nodes the
/// map held exclusively are drained without cloning their contents.
pub struct ConsumingIter<K, V, P: SharedPointerKind> {
    it: btree::ConsumingIter<K, V, P>,
}

impl<K, V, P> Iterator for ConsumingIter<K, V, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> ExactSizeIterator for ConsumingIter<K, V, P> {}
impl<K: Clone, V: Clone, P: SharedPointerKind> FusedIterator for ConsumingIter<K, V, P> {}

impl<'a, K, V, P> IntoIterator for &'a GenericRankMap<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, P> IntoIterator for GenericRankMap<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Item = (K, V);
    type IntoIter = ConsumingIter<K, V, P>;

    fn into_iter(self) -> Self::IntoIter {
        ConsumingIter {
            it: btree::ConsumingIter::new(self.root),
        }
    }
}

impl<K, V, P> FromIterator<(K, V)> for GenericRankMap<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K, V, P> Extend<(K, V)> for GenericRankMap<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn extend<T>(&mut self, iter: T)
    where
        T: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, P> From<Vec<(K, V)>> for GenericRankMap<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn from(vec: Vec<(K, V)>) -> Self {
        vec.into_iter().collect()
    }
}

impl<'a, K, V, P> From<&'a [(K, V)]> for GenericRankMap<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn from(slice: &'a [(K, V)]) -> Self {
        slice.iter().cloned().collect()
    }
}

impl<K, V, P> Debug for GenericRankMap<K, V, P>
where
    K: Ord + Clone + Debug,
    V: Clone + Debug,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, P1, P2> PartialEq<GenericRankMap<K, V, P2>> for GenericRankMap<K, V, P1>
where
    K: Ord + Clone,
    V: Clone + PartialEq,
    P1: SharedPointerKind,
    P2: SharedPointerKind,
{
    fn eq(&self, other: &GenericRankMap<K, V, P2>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, P> Eq for GenericRankMap<K, V, P>
where
    K: Ord + Clone,
    V: Clone + Eq,
    P: SharedPointerKind,
{
}

impl<K, V, P> PartialOrd for GenericRankMap<K, V, P>
where
    K: Ord + Clone,
    V: Clone + PartialOrd,
    P: SharedPointerKind,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K, V, P> Ord for GenericRankMap<K, V, P>
where
    K: Ord + Clone,
    V: Clone + Ord,
    P: SharedPointerKind,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K, V, P> Hash for GenericRankMap<K, V, P>
where
    K: Ord + Clone + Hash,
    V: Clone + Hash,
    P: SharedPointerKind,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for entry in self.iter() {
            entry.hash(state);
        }
    }
}
