// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Paths: positions inside a tree.
//!
//! A path records the chain of (node, slot) pairs from the root down to
//! the element at a given offset, and knows how to navigate, decompose
//! and (for the owning flavors) edit the tree through that chain. The
//! descent and navigation algorithms are written once, against the
//! [`PathState`] capability; the three concrete path types differ only in
//! what they hold between the root and the current node.

use std::borrow::Borrow;

use archery::{SharedPointer, SharedPointerKind};

use super::btree::{Node, OffsetStep};

/// A shared pointer to a node.
pub(crate) type NodePtr<K, V, P> = SharedPointer<Node<K, V, P>, P>;

/// Which element a key search lands on when the key has multiple matches.
///
/// All four policies agree when the key is absent: the landing position is
/// the insertion point that keeps the tree sorted, and it is the end
/// position exactly when the key is greater than every element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Land on the first (leftmost) matching element.
    First,
    /// Land on the last (rightmost) matching element.
    Last,
    /// Land one past the last matching element; never reports an element
    /// equal to the search key.
    After,
    /// Land on some matching element; no guarantee which one.
    Any,
}

/// The chain-holder capability: primitive state operations a path flavor
/// must supply, from which every navigation and decomposition algorithm
/// is derived.
///
/// The position invariant maintained by the derived methods: the current
/// node either holds the element at `offset` at `slot`, or — only when
/// `offset == count` — is the rightmost leaf with `slot == len`.
pub(crate) trait PathState<K, V, P>: Sized
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    /// What this flavor is built over: an owned root pointer or a borrow.
    type Root;

    /// A path over `root`, not yet descended anywhere.
    fn from_root(root: Self::Root) -> Self;

    /// The number of elements in the tree the path was built over.
    fn count(&self) -> usize;
    fn offset(&self) -> usize;
    fn set_offset(&mut self, offset: usize);
    /// The offset of the first element of the current node's subtree.
    fn base(&self) -> usize;
    /// The number of nodes on the chain.
    fn depth(&self) -> usize;
    /// The deepest node on the chain.
    fn node(&self) -> &Node<K, V, P>;
    fn slot(&self) -> usize;
    fn set_slot(&mut self, slot: usize);
    /// Makes the child at `child_slot` of the current node current.
    fn push(&mut self, child_slot: usize);
    /// Makes the parent current again, returning the slot the descent
    /// took. Owning flavors write a changed child back here.
    fn pop(&mut self) -> usize;
    /// Visits every (node, slot) pair on the chain; root first when
    /// `ascending` is false, current node first when it is true.
    fn visit_levels(&self, ascending: bool, f: &mut dyn FnMut(&Node<K, V, P>, usize));

    // -- construction forms ------------------------------------------------

    fn start_of(root: Self::Root) -> Self {
        Self::at_offset(root, 0)
    }

    fn end_of(root: Self::Root) -> Self {
        let mut path = Self::from_root(root);
        let count = path.count();
        path.descend_to_offset(count);
        path
    }

    /// A path at `offset`.
    ///
    /// # Panics
    ///
    /// If `offset > count`.
    fn at_offset(root: Self::Root, offset: usize) -> Self {
        let mut path = Self::from_root(root);
        assert!(
            offset <= path.count(),
            "offset out of bounds: the offset is {} but the count is {}",
            offset,
            path.count()
        );
        path.descend_to_offset(offset);
        path
    }

    /// A path at the position `policy` selects for `key`.
    fn at_key<BK>(root: Self::Root, key: &BK, policy: MatchPolicy) -> Self
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        let mut path = Self::from_root(root);
        path.move_to_key(key, policy);
        path
    }

    // -- reading -----------------------------------------------------------

    fn is_at_start(&self) -> bool {
        self.offset() == 0
    }

    fn is_at_end(&self) -> bool {
        self.offset() == self.count()
    }

    /// The element at the current position.
    ///
    /// # Panics
    ///
    /// If the path is at the end position.
    fn entry<'a>(&'a self) -> &'a (K, V)
    where
        P: 'a,
    {
        assert!(!self.is_at_end(), "no element at the end position");
        self.node().entry(self.slot())
    }

    fn key<'a>(&'a self) -> &'a K
    where
        V: 'a,
        P: 'a,
    {
        &self.entry().0
    }

    fn value<'a>(&'a self) -> &'a V
    where
        K: 'a,
        P: 'a,
    {
        &self.entry().1
    }

    // -- navigation --------------------------------------------------------

    /// Advances to the next element.
    ///
    /// # Panics
    ///
    /// If the path is already at the end position.
    fn move_forward(&mut self) {
        assert!(!self.is_at_end(), "cannot move forward from the end position");
        let offset = self.offset() + 1;
        if self.node().is_leaf() {
            let slot = self.slot() + 1;
            if slot < self.node().len() || offset == self.count() {
                self.set_slot(slot);
            } else {
                loop {
                    let slot = self.pop();
                    if slot < self.node().len() {
                        self.set_slot(slot);
                        break;
                    }
                }
            }
        } else {
            // the successor of a branch entry is the leftmost element of
            // the child to its right
            let slot = self.slot();
            self.push(slot + 1);
            while !self.node().is_leaf() {
                self.push(0);
            }
            self.set_slot(0);
        }
        self.set_offset(offset);
    }

    /// Retreats to the previous element.
    ///
    /// # Panics
    ///
    /// If the path is already at the start position.
    fn move_backward(&mut self) {
        assert!(
            !self.is_at_start(),
            "cannot move backward from the start position"
        );
        let offset = self.offset() - 1;
        if self.node().is_leaf() {
            let slot = self.slot();
            if slot > 0 {
                self.set_slot(slot - 1);
            } else {
                loop {
                    let slot = self.pop();
                    if slot > 0 {
                        self.set_slot(slot - 1);
                        break;
                    }
                }
            }
        } else {
            let slot = self.slot();
            self.push(slot);
            while !self.node().is_leaf() {
                let last = self.node().child_count() - 1;
                self.push(last);
            }
            let last = self.node().len() - 1;
            self.set_slot(last);
        }
        self.set_offset(offset);
    }

    fn move_to_start(&mut self) {
        self.move_to_offset(0);
    }

    fn move_to_end(&mut self) {
        let count = self.count();
        self.move_to_offset(count);
    }

    /// Re-positions the path at an arbitrary offset, reusing the shared
    /// prefix of the chain.
    ///
    /// # Panics
    ///
    /// If `offset > count`.
    fn move_to_offset(&mut self, offset: usize) {
        assert!(
            offset <= self.count(),
            "offset out of bounds: the offset is {} but the count is {}",
            offset,
            self.count()
        );
        while self.depth() > 1
            && !(self.base() <= offset && offset < self.base() + self.node().size())
        {
            self.pop();
        }
        self.descend_to_offset(offset);
    }

    /// Re-positions the path at the offset `policy` selects for `key`.
    fn move_to_key<BK>(&mut self, key: &BK, policy: MatchPolicy)
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        while self.depth() > 1 {
            self.pop();
        }
        let (offset, _) = match policy {
            MatchPolicy::First => self.node().search_first(key),
            MatchPolicy::Last => self.node().search_last(key),
            MatchPolicy::After => {
                let (offset, matched) = self.node().search_last(key);
                (if matched { offset + 1 } else { offset }, false)
            }
            MatchPolicy::Any => self.node().search_any(key),
        };
        self.descend_to_offset(offset);
    }

    /// Descends from the current node to `offset`, which must lie inside
    /// (or at the trailing edge of) the current subtree.
    fn descend_to_offset(&mut self, offset: usize) {
        debug_assert!(
            self.base() <= offset && offset <= self.base() + self.node().size()
        );
        loop {
            let local = offset - self.base();
            if self.node().is_leaf() {
                self.set_slot(local);
                break;
            }
            match self.node().step_for_offset(local) {
                OffsetStep::OnEntry(slot) => {
                    self.set_slot(slot);
                    break;
                }
                OffsetStep::IntoChild(slot) => self.push(slot),
            }
        }
        self.set_offset(offset);
    }

    // -- structural traversal ----------------------------------------------

    fn for_each(&self, ascending: bool, mut f: impl FnMut(&Node<K, V, P>, usize)) {
        self.visit_levels(ascending, &mut f);
    }

    fn for_each_slot(&self, ascending: bool, mut f: impl FnMut(usize)) {
        self.visit_levels(ascending, &mut |_, slot| f(slot));
    }

    /// Checks that the cached counts along the chain agree with the nodes
    /// below them and with the path's own bookkeeping. Meant for tests
    /// and debugging; correct operation never depends on it.
    fn is_valid(&self) -> bool {
        let depth = self.depth();
        let count = self.count();
        let offset = self.offset();
        let mut ok = true;
        let mut level = 0usize;
        let mut base = 0usize;
        let mut expected: Option<*const Node<K, V, P>> = None;
        self.visit_levels(false, &mut |node, slot| {
            level += 1;
            if let Some(parent_child) = expected {
                ok &= std::ptr::eq(parent_child, node as *const _);
            }
            if level == 1 {
                ok &= node.size() == count;
            }
            let mut sum = node.len();
            for i in 0..node.child_count() {
                sum += node.child(i).size();
            }
            ok &= node.size() == sum;
            if level < depth {
                ok &= !node.is_leaf() && slot <= node.len();
                if ok {
                    expected = Some(node.child(slot) as *const _);
                    base += node.start_of_child(slot);
                }
            } else if node.is_leaf() {
                ok &= slot <= node.len();
                ok &= base + slot == offset;
                ok &= slot < node.len() || offset == count;
            } else {
                ok &= slot < node.len() && base + node.offset_of_entry(slot) == offset;
            }
        });
        ok
    }

    // -- decomposition -----------------------------------------------------

    /// Partitions the tree into the elements before the current position,
    /// the element at it, and the elements after it. The path itself is
    /// unaffected; the returned trees share structure with the original.
    ///
    /// # Panics
    ///
    /// If the path is at the end position.
    fn split(&self) -> (NodePtr<K, V, P>, (K, V), NodePtr<K, V, P>) {
        let (prefix, separator, suffix) = self.split_parts(true, true);
        (prefix.unwrap(), separator, suffix.unwrap())
    }

    /// The tree of elements strictly before the current position.
    ///
    /// # Panics
    ///
    /// If the path is at the end position.
    fn prefix(&self) -> NodePtr<K, V, P> {
        self.split_parts(true, false).0.unwrap()
    }

    /// The tree of elements strictly after the current position.
    ///
    /// # Panics
    ///
    /// If the path is at the end position.
    fn suffix(&self) -> NodePtr<K, V, P> {
        self.split_parts(false, true).2.unwrap()
    }

    /// Folds the chain from the current node up to the root, joining the
    /// requested sides level by level.
    fn split_parts(
        &self,
        want_prefix: bool,
        want_suffix: bool,
    ) -> (Option<NodePtr<K, V, P>>, (K, V), Option<NodePtr<K, V, P>>) {
        assert!(!self.is_at_end(), "cannot split at the end position");
        let mut prefix: Option<NodePtr<K, V, P>> = None;
        let mut suffix: Option<NodePtr<K, V, P>> = None;
        let mut separator: Option<(K, V)> = None;
        self.visit_levels(true, &mut |node, slot| {
            if separator.is_none() {
                // the deepest node: the slot names the separator element
                separator = Some(node.entry(slot).clone());
                if want_prefix {
                    prefix = Some(node.subtree_before(slot));
                }
                if want_suffix {
                    suffix = Some(node.subtree_after(slot));
                }
            } else {
                // an ancestor: the slot names the child the chain took
                if want_prefix {
                    if let Some((sep, part)) = node.split_left_at(slot) {
                        prefix = Some(Node::join(part, sep, prefix.take().unwrap()));
                    }
                }
                if want_suffix {
                    if let Some((sep, part)) = node.split_right_at(slot) {
                        suffix = Some(Node::join(suffix.take().unwrap(), sep, part));
                    }
                }
            }
        });
        (prefix, separator.unwrap(), suffix)
    }
}

/// The write half of the path capability. The read-only flavor simply
/// does not implement this, so a mutation through it is a compile error
/// rather than a runtime one.
pub(crate) trait MutPathState<K, V, P>: PathState<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn set_count(&mut self, count: usize);
    /// Clone-if-shared access to the current node.
    fn node_mut(&mut self) -> &mut Node<K, V, P>;
    /// Discards the chain and restarts it over a fresh root.
    fn replace_root(&mut self, root: NodePtr<K, V, P>);
    /// Rewrites the root pointer in place. Only valid at depth 1.
    fn update_root(&mut self, f: &mut dyn FnMut(NodePtr<K, V, P>) -> NodePtr<K, V, P>);
    /// Consumes the path, handing back the root. Only valid at depth 1;
    /// use [`finish`] from any position.
    ///
    /// [`finish`]: MutPathState::finish
    fn take_root(self) -> NodePtr<K, V, P>;

    /// Ascends one level, writing the current node back into its parent
    /// and repairing the fill violation a pending edit may have left.
    fn pop_and_repair(&mut self) {
        let slot = self.pop();
        let needs_split = self.node().child(slot).is_overfull();
        let needs_fix = !needs_split && self.node().child(slot).is_underfull();
        if needs_split {
            self.node_mut().split_child(slot);
        } else if needs_fix {
            self.node_mut().fix_underfull_child(slot);
        }
    }

    /// Reconciles every pending edit into the root: ascends the whole
    /// chain, rebalancing as it goes, then repairs the root itself.
    fn fold_to_root(&mut self) {
        while self.depth() > 1 {
            self.pop_and_repair();
        }
        if self.node().is_overfull() {
            let order = self.node().order();
            self.update_root(&mut |mut root| {
                let (separator, right) = SharedPointer::make_mut(&mut root).split_overfull();
                SharedPointer::new(Node::branch(order, vec![separator], vec![root, right]))
            });
        } else if !self.node().is_leaf() && self.node().len() == 0 {
            self.update_root(&mut |mut root| {
                SharedPointer::make_mut(&mut root).pop_single_child().unwrap()
            });
        }
    }

    /// Reconstitutes the chain from the root down to `offset` after a
    /// structural edit has invalidated it.
    fn rebuild_at(&mut self, offset: usize) {
        self.fold_to_root();
        self.descend_to_offset(offset);
    }

    /// The terminal operation: reconciles the chain and returns the new
    /// root for adoption by the owning tree.
    fn finish(mut self) -> NodePtr<K, V, P> {
        self.fold_to_root();
        self.take_root()
    }

    /// Inserts an element at the current position; the path ends up
    /// positioned just past it. The caller is responsible for a key that
    /// keeps the tree sorted at this position.
    fn insert(&mut self, entry: (K, V)) {
        let target = self.offset() + 1;
        if !self.node().is_leaf() {
            // inserting before a branch entry happens at the back of the
            // rightmost leaf of its left subtree
            let slot = self.slot();
            self.push(slot);
            while !self.node().is_leaf() {
                let last = self.node().child_count() - 1;
                self.push(last);
            }
            let len = self.node().len();
            self.set_slot(len);
        }
        let slot = self.slot();
        self.node_mut().insert_at(slot, entry);
        let count = self.count() + 1;
        self.set_count(count);
        if self.node().is_overfull() || (slot + 1 == self.node().len() && target < count) {
            self.rebuild_at(target);
        } else {
            self.set_slot(slot + 1);
            self.set_offset(target);
        }
    }

    /// Removes and returns the element at the current position; the path
    /// stays at the same offset, now addressing the removed element's
    /// successor.
    ///
    /// # Panics
    ///
    /// If the path is at the end position.
    fn remove(&mut self) -> (K, V) {
        assert!(!self.is_at_end(), "cannot remove at the end position");
        let offset = self.offset();
        if self.node().is_leaf() {
            let slot = self.slot();
            let entry = self.node_mut().remove_at(slot);
            let count = self.count() - 1;
            self.set_count(count);
            if (self.depth() > 1 && self.node().is_underfull())
                || (slot == self.node().len() && offset < count)
            {
                self.rebuild_at(offset);
            } else {
                self.set_slot(slot);
            }
            entry
        } else {
            // the element lives in a branch: take the tree apart around
            // it and stitch the halves back together
            let (prefix, separator, suffix) = self.split();
            let root = Node::append(prefix, suffix);
            let count = self.count() - 1;
            self.replace_root(root);
            self.set_count(count);
            self.descend_to_offset(offset);
            separator
        }
    }
}

/// One link of an owned chain: the node, the slot the position (or the
/// descent) takes in it, and the offset where its subtree starts.
pub(super) struct Level<K, V, P: SharedPointerKind> {
    pub(super) node: NodePtr<K, V, P>,
    pub(super) slot: usize,
    pub(super) base: usize,
}

/// The owned root-to-current chain shared by the mutating path flavors.
/// Children are written back into their parents on ascent, cloning shared
/// parents first, so edits below never leak into other owners of the same
/// nodes.
pub(super) struct Spine<K, V, P: SharedPointerKind> {
    pub(super) levels: Vec<Level<K, V, P>>,
    pub(super) offset: usize,
    pub(super) count: usize,
}

impl<K, V, P: SharedPointerKind> Spine<K, V, P> {
    pub(super) fn new(root: NodePtr<K, V, P>) -> Self {
        let count = root.size();
        Spine {
            levels: vec![Level {
                node: root,
                slot: 0,
                base: 0,
            }],
            offset: 0,
            count,
        }
    }

    pub(super) fn node(&self) -> &Node<K, V, P> {
        &self.levels.last().unwrap().node
    }

    pub(super) fn slot(&self) -> usize {
        self.levels.last().unwrap().slot
    }

    pub(super) fn set_slot(&mut self, slot: usize) {
        self.levels.last_mut().unwrap().slot = slot;
    }

    pub(super) fn base(&self) -> usize {
        self.levels.last().unwrap().base
    }

    pub(super) fn depth(&self) -> usize {
        self.levels.len()
    }

    pub(super) fn push(&mut self, child_slot: usize) {
        let (child, base) = {
            let level = self.levels.last().unwrap();
            let base = level.base + level.node.start_of_child(child_slot);
            (SharedPointer::clone(level.node.child_ptr(child_slot)), base)
        };
        self.levels.last_mut().unwrap().slot = child_slot;
        self.levels.push(Level {
            node: child,
            slot: 0,
            base,
        });
    }

    pub(super) fn visit_levels(&self, ascending: bool, f: &mut dyn FnMut(&Node<K, V, P>, usize)) {
        if ascending {
            for level in self.levels.iter().rev() {
                f(&level.node, level.slot);
            }
        } else {
            for level in self.levels.iter() {
                f(&level.node, level.slot);
            }
        }
    }

    pub(super) fn replace_root(&mut self, root: NodePtr<K, V, P>) {
        self.levels.clear();
        self.levels.push(Level {
            node: root,
            slot: 0,
            base: 0,
        });
    }

    pub(super) fn update_root(&mut self, f: &mut dyn FnMut(NodePtr<K, V, P>) -> NodePtr<K, V, P>) {
        debug_assert_eq!(self.levels.len(), 1);
        let level = self.levels.pop().unwrap();
        self.levels.push(Level {
            node: f(level.node),
            slot: 0,
            base: 0,
        });
    }

    pub(super) fn take_root(mut self) -> NodePtr<K, V, P> {
        debug_assert_eq!(self.levels.len(), 1);
        self.levels.pop().unwrap().node
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> Spine<K, V, P> {
    pub(super) fn pop(&mut self) -> usize {
        debug_assert!(self.levels.len() >= 2);
        let child = self.levels.pop().unwrap();
        let level = self.levels.last_mut().unwrap();
        let slot = level.slot;
        let unchanged = std::ptr::eq::<Node<K, V, P>>(&*child.node, level.node.child(slot));
        if !unchanged {
            let node = SharedPointer::make_mut(&mut level.node);
            node.replace_child(slot, child.node);
        }
        slot
    }

    pub(super) fn node_mut(&mut self) -> &mut Node<K, V, P> {
        SharedPointer::make_mut(&mut self.levels.last_mut().unwrap().node)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Conformance checks shared by the three path flavors. Each flavor's
    //! test module constructs its own paths and hands them here.

    use super::*;
    use archery::ArcK;

    type TestNode = Node<usize, String, ArcK>;

    pub(crate) fn numbered(n: usize) -> Vec<(usize, String)> {
        (0..n).map(|i| (i, i.to_string())).collect()
    }

    /// Walks forward over the whole tree, checking every read accessor at
    /// every position.
    pub(crate) fn check_forward_walk<T: PathState<usize, String, ArcK>>(mut path: T) -> T {
        let count = path.count();
        let mut i = 0;
        while !path.is_at_end() {
            assert!(path.is_valid());
            assert_eq!(path.offset(), i);
            assert_eq!(*path.key(), i);
            assert_eq!(*path.value(), i.to_string());
            path.move_forward();
            i += 1;
        }
        assert_eq!(i, count);
        assert_eq!(path.offset(), count);
        assert!(path.is_at_end());
        path
    }

    pub(crate) fn check_backward_walk<T: PathState<usize, String, ArcK>>(mut path: T) -> T {
        let count = path.count();
        let mut i = count;
        while !path.is_at_start() {
            path.move_backward();
            i -= 1;
            assert!(path.is_valid());
            assert_eq!(path.offset(), i);
            assert_eq!(*path.key(), i);
            assert_eq!(*path.value(), i.to_string());
        }
        assert_eq!(i, 0);
        assert!(path.is_at_start());
        path
    }

    /// Seeks to offsets from both ends, converging on the middle.
    pub(crate) fn check_seek_by_offset<T: PathState<usize, String, ArcK>>(mut path: T) -> T {
        let count = path.count();
        let mut i = 0;
        let mut j = count;
        while i < j {
            path.move_to_offset(i);
            assert_eq!(path.offset(), i);
            assert_eq!(*path.key(), i);
            i += 1;
            j -= 1;
            path.move_to_offset(j);
            assert_eq!(path.offset(), j);
            assert_eq!(*path.key(), j);
        }
        path.move_to_offset(count);
        assert!(path.is_at_end());
        path
    }

    /// Re-seeks by key under every policy. The path must be over the
    /// duplicated-key corpus built by `fixture::pairs_with_duplicates(c)`.
    pub(crate) fn check_seek_by_key<T: PathState<usize, String, ArcK>>(mut path: T, c: usize) -> T {
        for i in 0..=c {
            path.move_to_key(&(2 * i), MatchPolicy::First);
            assert!(path.is_valid());
            assert_eq!(path.offset(), 2 * i);
            assert_eq!(*path.key(), 2 * i);
            assert_eq!(*path.value(), (2 * i).to_string());

            path.move_to_key(&(2 * i), MatchPolicy::Last);
            assert_eq!(path.offset(), 2 * i + 1);
            assert_eq!(*path.key(), 2 * i);
            assert_eq!(*path.value(), (2 * i + 1).to_string());

            path.move_to_key(&(2 * i), MatchPolicy::After);
            assert_eq!(path.offset(), 2 * i + 2);
            if i < c {
                assert_eq!(*path.key(), 2 * i + 2);
            } else {
                assert!(path.is_at_end());
            }

            path.move_to_key(&(2 * i), MatchPolicy::Any);
            assert!(path.offset() == 2 * i || path.offset() == 2 * i + 1);
            assert_eq!(*path.key(), 2 * i);
        }
        let policies = [
            MatchPolicy::First,
            MatchPolicy::Last,
            MatchPolicy::After,
            MatchPolicy::Any,
        ];
        for i in 0..c {
            // absent keys: every policy lands on the ceiling
            for &policy in &policies {
                path.move_to_key(&(2 * i + 1), policy);
                assert_eq!(path.offset(), 2 * i + 2);
                assert_eq!(*path.key(), 2 * i + 2);
            }
        }
        for &policy in &policies {
            path.move_to_key(&(2 * c + 1), policy);
            assert!(path.is_at_end());
        }
        path
    }

    /// Splits at every position and checks both halves and the separator
    /// against the expected element runs.
    pub(crate) fn check_split_everywhere<T: PathState<usize, String, ArcK>>(mut path: T) -> T {
        let count = path.count();
        path.move_to_start();
        for i in 0..count {
            assert_eq!(path.offset(), i);
            let (prefix, separator, suffix) = path.split();
            prefix.check_valid();
            suffix.check_valid();
            assert_eq!(separator, (i, i.to_string()));
            let mut entries = Vec::new();
            prefix.collect_entries(&mut entries);
            assert_eq!(entries, numbered(i));
            entries.clear();
            suffix.collect_entries(&mut entries);
            let expected: Vec<_> = (i + 1..count).map(|j| (j, j.to_string())).collect();
            assert_eq!(entries, expected);

            // prefix() and suffix() agree with split()
            entries.clear();
            path.prefix().collect_entries(&mut entries);
            assert_eq!(entries, numbered(i));
            entries.clear();
            path.suffix().collect_entries(&mut entries);
            assert_eq!(entries, expected);

            path.move_forward();
        }
        path
    }

    /// Checks that the descending traversal visits each parent before its
    /// child, that each slot indexes the next node, and that the
    /// ascending traversal is its exact reverse.
    pub(crate) fn check_level_traversal<T: PathState<usize, String, ArcK>>(path: &T) {
        let mut chain: Vec<(*const TestNode, usize)> = Vec::new();
        let mut expected: Option<*const TestNode> = None;
        path.for_each(false, |node, slot| {
            if let Some(parent_child) = expected {
                assert!(std::ptr::eq(parent_child, node as *const _));
            }
            expected = if node.is_leaf() {
                None
            } else {
                Some(node.child(slot) as *const _)
            };
            chain.push((node as *const _, slot));
        });
        assert_eq!(chain.len(), path.depth());

        path.for_each(true, |node, slot| {
            let (expected_node, expected_slot) = chain.pop().unwrap();
            assert!(std::ptr::eq(expected_node, node as *const _));
            assert_eq!(expected_slot, slot);
        });
        assert!(chain.is_empty());

        let mut slots = Vec::new();
        path.for_each_slot(false, |slot| slots.push(slot));
        let mut up = Vec::new();
        path.for_each_slot(true, |slot| up.push(slot));
        up.reverse();
        assert_eq!(slots, up);
    }

    /// Finishes a path that has only been navigated and checks the root
    /// still holds exactly `expected`.
    pub(crate) fn check_read_only_finish<T: MutPathState<usize, String, ArcK>>(
        path: T,
        expected: &[(usize, String)],
    ) {
        let root = path.finish();
        root.check_valid();
        let mut entries = Vec::new();
        root.collect_entries(&mut entries);
        assert_eq!(entries, expected);
    }
}
