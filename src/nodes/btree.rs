// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Borrow;
use std::mem;

use archery::{SharedPointer, SharedPointerKind};

use crate::util::clone_ref;

/// A node in the tree.
///
/// Invariants:
/// * entries are ordered by key; duplicate keys are allowed, and the order
///   among equal keys is their insertion order
/// * a leaf has no children; a branch has `entries.len() + 1` children
/// * all children are at `level - 1`, leaves are at level 0
/// * `size` is the number of entries in the whole subtree
/// * `entries.len() <= order`, and `entries.len() >= order / 2` for every
///   node except the root (transient violations are repaired before a
///   mutation hands the root back)
#[derive(Debug)]
pub(crate) struct Node<K, V, P: SharedPointerKind> {
    order: usize,
    level: usize,
    size: usize,
    entries: Vec<(K, V)>,
    children: Vec<SharedPointer<Node<K, V, P>, P>>,
}

/// One step of a descent by offset: either the offset names an entry of
/// the current node, or it falls inside one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OffsetStep {
    OnEntry(usize),
    IntoChild(usize),
}

impl<K, V, P: SharedPointerKind> Node<K, V, P> {
    /// An empty leaf: the root of an empty tree.
    pub(crate) fn new(order: usize) -> Self {
        debug_assert!(order >= crate::config::MIN_ORDER);
        Node {
            order,
            level: 0,
            size: 0,
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn unit(order: usize, key: K, value: V) -> Self {
        Node::leaf(order, vec![(key, value)])
    }

    pub(crate) fn leaf(order: usize, entries: Vec<(K, V)>) -> Self {
        Node {
            order,
            level: 0,
            size: entries.len(),
            entries,
            children: Vec::new(),
        }
    }

    pub(crate) fn branch(
        order: usize,
        entries: Vec<(K, V)>,
        children: Vec<SharedPointer<Node<K, V, P>, P>>,
    ) -> Self {
        debug_assert_eq!(children.len(), entries.len() + 1);
        let level = children[0].level + 1;
        let mut node = Node {
            order,
            level,
            size: 0,
            entries,
            children,
        };
        node.update_size();
        node
    }

    /// Wraps loose entry/child runs into a tree, collapsing the trivial
    /// single-child case. `children` must be empty or one longer than
    /// `entries`.
    pub(crate) fn from_parts(
        order: usize,
        entries: Vec<(K, V)>,
        mut children: Vec<SharedPointer<Node<K, V, P>, P>>,
    ) -> SharedPointer<Node<K, V, P>, P> {
        if children.is_empty() {
            SharedPointer::new(Node::leaf(order, entries))
        } else if entries.is_empty() {
            debug_assert_eq!(children.len(), 1);
            children.pop().unwrap()
        } else {
            SharedPointer::new(Node::branch(order, entries, children))
        }
    }

    pub(crate) fn order(&self) -> usize {
        self.order
    }

    /// The number of entries in this subtree.
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// The number of entries held locally by this node.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn entry(&self, slot: usize) -> &(K, V) {
        &self.entries[slot]
    }

    pub(crate) fn entry_mut(&mut self, slot: usize) -> &mut (K, V) {
        &mut self.entries[slot]
    }

    pub(crate) fn child(&self, slot: usize) -> &Node<K, V, P> {
        &self.children[slot]
    }

    pub(crate) fn child_ptr(&self, slot: usize) -> &SharedPointer<Node<K, V, P>, P> {
        &self.children[slot]
    }

    pub(crate) fn first_entry(&self) -> Option<&(K, V)> {
        let mut node = self;
        loop {
            if node.is_leaf() {
                return node.entries.first();
            }
            node = &node.children[0];
        }
    }

    pub(crate) fn last_entry(&self) -> Option<&(K, V)> {
        let mut node = self;
        loop {
            if node.is_leaf() {
                return node.entries.last();
            }
            node = &node.children[node.children.len() - 1];
        }
    }

    pub(crate) fn is_overfull(&self) -> bool {
        self.entries.len() > self.order
    }

    /// True if this node is below the minimum fill for a non-root node.
    pub(crate) fn is_underfull(&self) -> bool {
        self.entries.len() < self.order / 2
    }

    /// The offset, within this subtree, of the first entry of the child at
    /// `slot`'s subtree.
    pub(crate) fn start_of_child(&self, slot: usize) -> usize {
        debug_assert!(!self.is_leaf());
        let mut p = 0;
        for child in &self.children[..slot] {
            p += child.size + 1;
        }
        p
    }

    /// The offset, within this subtree, of the entry at `slot`.
    pub(crate) fn offset_of_entry(&self, slot: usize) -> usize {
        if self.is_leaf() {
            slot
        } else {
            self.start_of_child(slot) + self.children[slot].size
        }
    }

    /// Resolves a subtree-local offset against a branch node: the offset
    /// either names one of this node's own entries or falls inside a
    /// child. `local == size` resolves into the last child, whose own end
    /// it is.
    pub(crate) fn step_for_offset(&self, local: usize) -> OffsetStep {
        debug_assert!(!self.is_leaf());
        debug_assert!(local <= self.size);
        let mut p = 0;
        for i in 0..self.entries.len() {
            let child_size = self.children[i].size;
            if local < p + child_size {
                return OffsetStep::IntoChild(i);
            }
            if local == p + child_size {
                return OffsetStep::OnEntry(i);
            }
            p += child_size + 1;
        }
        OffsetStep::IntoChild(self.entries.len())
    }

    /// Recomputes the cached subtree size from the node's local contents.
    pub(crate) fn update_size(&mut self) {
        let mut size = self.entries.len();
        for child in &self.children {
            size += child.size;
        }
        self.size = size;
    }

    /// If the node is a branch left with a single child and no entries,
    /// returns that child so the caller can collapse a level.
    pub(crate) fn pop_single_child(&mut self) -> Option<SharedPointer<Node<K, V, P>, P>> {
        if self.children.len() == 1 {
            debug_assert_eq!(self.entries.len(), 0);
            return Some(self.children.pop().unwrap());
        }
        None
    }
}

impl<K: Ord, V, P: SharedPointerKind> Node<K, V, P> {
    /// Finds the landing offset of the leftmost entry with a key `>= key`.
    /// Returns the offset and whether the entry there is an exact match;
    /// the offset is `size` when every key is smaller.
    pub(crate) fn search_first<BK>(&self, key: &BK) -> (usize, bool)
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        let lb = self.entries.partition_point(|(k, _)| k.borrow() < key);
        let on_entry = lb < self.entries.len() && self.entries[lb].0.borrow() == key;
        if self.is_leaf() {
            return (lb, on_entry);
        }
        let (below, matched) = self.children[lb].search_first(key);
        let start = self.start_of_child(lb);
        if below < self.children[lb].size {
            (start + below, matched)
        } else {
            (start + below, on_entry)
        }
    }

    /// Finds the rightmost entry equal to `key`, or the leftmost entry
    /// greater than it when there is no match. Returns the landing offset
    /// and whether it is an exact match.
    pub(crate) fn search_last<BK>(&self, key: &BK) -> (usize, bool)
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        let ub = self.entries.partition_point(|(k, _)| k.borrow() <= key);
        let node_match = ub > 0 && self.entries[ub - 1].0.borrow() == key;
        if self.is_leaf() {
            if node_match {
                return (ub - 1, true);
            }
            return (ub, false);
        }
        let (below, matched) = self.children[ub].search_last(key);
        let start = self.start_of_child(ub);
        if matched {
            (start + below, true)
        } else if node_match {
            // the entry just before the descended child is the last match
            (start - 1, true)
        } else {
            (start + below, false)
        }
    }

    /// Finds some entry equal to `key` (no guarantee which one), or the
    /// insertion point that keeps the tree sorted when there is none.
    pub(crate) fn search_any<BK>(&self, key: &BK) -> (usize, bool)
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        match self.entries.binary_search_by(|(k, _)| k.borrow().cmp(key)) {
            Ok(slot) => (self.offset_of_entry(slot), true),
            Err(slot) => {
                if self.is_leaf() {
                    (slot, false)
                } else {
                    let (below, matched) = self.children[slot].search_any(key);
                    (self.start_of_child(slot) + below, matched)
                }
            }
        }
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> Node<K, V, P> {
    /// Clone-if-shared access to the child at `slot`.
    pub(crate) fn child_mut(&mut self, slot: usize) -> &mut Node<K, V, P> {
        SharedPointer::make_mut(&mut self.children[slot])
    }

    /// Replaces the child at `slot` and refreshes the cached size.
    pub(crate) fn replace_child(&mut self, slot: usize, child: SharedPointer<Node<K, V, P>, P>) {
        self.children[slot] = child;
        self.update_size();
    }

    /// Inserts an entry into a leaf at `slot`.
    pub(crate) fn insert_at(&mut self, slot: usize, entry: (K, V)) {
        debug_assert!(self.is_leaf());
        self.entries.insert(slot, entry);
        self.size += 1;
    }

    /// Removes and returns the entry of a leaf at `slot`.
    pub(crate) fn remove_at(&mut self, slot: usize) -> (K, V) {
        debug_assert!(self.is_leaf());
        self.size -= 1;
        self.entries.remove(slot)
    }

    /// Splits an overfull node around its median entry. `self` keeps the
    /// left half; the median and the freshly allocated right half are
    /// returned for insertion into the parent.
    pub(crate) fn split_overfull(&mut self) -> ((K, V), SharedPointer<Node<K, V, P>, P>) {
        debug_assert!(self.is_overfull());
        let mid = self.entries.len() / 2;
        let right_entries = self.entries.split_off(mid + 1);
        let separator = self.entries.pop().unwrap();
        let right_children = if self.is_leaf() {
            Vec::new()
        } else {
            self.children.split_off(mid + 1)
        };
        let mut right = Node {
            order: self.order,
            level: self.level,
            size: 0,
            entries: right_entries,
            children: right_children,
        };
        right.update_size();
        self.update_size();
        (separator, SharedPointer::new(right))
    }

    /// Splits the overfull child at `slot`, absorbing the promoted
    /// separator. The subtree size of `self` is unchanged.
    pub(crate) fn split_child(&mut self, slot: usize) {
        let (separator, right) = self.child_mut(slot).split_overfull();
        self.entries.insert(slot, separator);
        self.children.insert(slot + 1, right);
    }

    /// Repairs an underfull child at `slot` by merging it with a sibling
    /// when the pair fits in one node, or by rotating entries through the
    /// separator until the two are balanced.
    pub(crate) fn fix_underfull_child(&mut self, slot: usize) {
        debug_assert!(!self.is_leaf());
        debug_assert!(self.entries.len() >= 1);
        let li = if slot == 0 { 0 } else { slot - 1 };
        let (left_len, right_len) = (self.children[li].len(), self.children[li + 1].len());

        if left_len + right_len + 1 <= self.order {
            // merge the right sibling into the left one
            let right = clone_ref(self.children.remove(li + 1));
            let separator = self.entries.remove(li);
            let left = SharedPointer::make_mut(&mut self.children[li]);
            left.entries.push(separator);
            left.entries.extend(right.entries);
            left.children.extend(right.children);
            left.update_size();
            return;
        }

        let num_to_move = left_len.abs_diff(right_len) / 2;
        if num_to_move == 0 {
            return;
        }
        let separator = &mut self.entries[li];
        let [left, right, ..] = &mut self.children[li..] else {
            unreachable!()
        };
        let (left, right) = (
            SharedPointer::make_mut(left),
            SharedPointer::make_mut(right),
        );
        if left_len > right_len {
            let tail = left.entries.split_off(left_len - num_to_move);
            let mut tail = tail.into_iter();
            let new_separator = tail.next().unwrap();
            let mut front: Vec<(K, V)> = tail.collect();
            front.push(mem::replace(separator, new_separator));
            right.entries.splice(0..0, front);
            if !left.is_leaf() {
                let moved = left.children.split_off(left.children.len() - num_to_move);
                right.children.splice(0..0, moved);
            }
        } else {
            let mut front: Vec<(K, V)> = right.entries.drain(..num_to_move).collect();
            let new_separator = front.pop().unwrap();
            left.entries.push(mem::replace(separator, new_separator));
            left.entries.extend(front);
            if !right.is_leaf() {
                left.children.extend(right.children.drain(..num_to_move));
            }
        }
        left.update_size();
        right.update_size();
        debug_assert_ne!(left.entries.len(), 0);
        debug_assert_ne!(right.entries.len(), 0);
    }

    /// The subtree holding everything strictly before the entry at `slot`.
    pub(crate) fn subtree_before(&self, slot: usize) -> SharedPointer<Node<K, V, P>, P> {
        let entries = self.entries[..slot].to_vec();
        let children = if self.is_leaf() {
            Vec::new()
        } else {
            self.children[..=slot].to_vec()
        };
        Node::from_parts(self.order, entries, children)
    }

    /// The subtree holding everything strictly after the entry at `slot`.
    pub(crate) fn subtree_after(&self, slot: usize) -> SharedPointer<Node<K, V, P>, P> {
        let entries = self.entries[slot + 1..].to_vec();
        let children = if self.is_leaf() {
            Vec::new()
        } else {
            self.children[slot + 1..].to_vec()
        };
        Node::from_parts(self.order, entries, children)
    }

    /// On a branch this path descended through at `child_slot`, the run of
    /// entries and children before that child, as a (separator, subtree)
    /// pair. `None` when the descent took the leftmost child.
    pub(crate) fn split_left_at(
        &self,
        child_slot: usize,
    ) -> Option<((K, V), SharedPointer<Node<K, V, P>, P>)> {
        if child_slot == 0 {
            return None;
        }
        let separator = self.entries[child_slot - 1].clone();
        let part = Node::from_parts(
            self.order,
            self.entries[..child_slot - 1].to_vec(),
            self.children[..child_slot].to_vec(),
        );
        Some((separator, part))
    }

    /// The mirror image of [`split_left_at`]: the run after the descended
    /// child. `None` when the descent took the rightmost child.
    ///
    /// [`split_left_at`]: Node::split_left_at
    pub(crate) fn split_right_at(
        &self,
        child_slot: usize,
    ) -> Option<((K, V), SharedPointer<Node<K, V, P>, P>)> {
        if child_slot == self.entries.len() {
            return None;
        }
        let separator = self.entries[child_slot].clone();
        let part = Node::from_parts(
            self.order,
            self.entries[child_slot + 1..].to_vec(),
            self.children[child_slot + 1..].to_vec(),
        );
        Some((separator, part))
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> Node<K, V, P> {
    /// Joins two trees of arbitrary heights around a separator element.
    /// Every entry of `left` precedes `separator`, which precedes every
    /// entry of `right`; the caller is responsible for that ordering.
    pub(crate) fn join(
        left: SharedPointer<Node<K, V, P>, P>,
        separator: (K, V),
        right: SharedPointer<Node<K, V, P>, P>,
    ) -> SharedPointer<Node<K, V, P>, P> {
        if left.size == 0 {
            return Node::insert_outer(right, separator, true);
        }
        if right.size == 0 {
            return Node::insert_outer(left, separator, false);
        }
        let order = left.order;
        match left.level.cmp(&right.level) {
            std::cmp::Ordering::Equal => {
                if left.len() + right.len() + 1 <= order {
                    let mut node = clone_ref(left);
                    let right = clone_ref(right);
                    node.entries.push(separator);
                    node.entries.extend(right.entries);
                    node.children.extend(right.children);
                    node.update_size();
                    SharedPointer::new(node)
                } else {
                    SharedPointer::new(Node::branch(order, vec![separator], vec![left, right]))
                }
            }
            std::cmp::Ordering::Greater => {
                let mut left = left;
                let overflow = SharedPointer::make_mut(&mut left).join_right(separator, right);
                match overflow {
                    Some((sep, extra)) => {
                        SharedPointer::new(Node::branch(order, vec![sep], vec![left, extra]))
                    }
                    None => left,
                }
            }
            std::cmp::Ordering::Less => {
                let mut right = right;
                let overflow = SharedPointer::make_mut(&mut right).join_left(left, separator);
                match overflow {
                    Some((sep, extra)) => {
                        SharedPointer::new(Node::branch(order, vec![sep], vec![right, extra]))
                    }
                    None => right,
                }
            }
        }
    }

    /// Joins two trees with no separator between them.
    pub(crate) fn append(
        left: SharedPointer<Node<K, V, P>, P>,
        right: SharedPointer<Node<K, V, P>, P>,
    ) -> SharedPointer<Node<K, V, P>, P> {
        if left.size == 0 {
            return right;
        }
        if right.size == 0 {
            return left;
        }
        // steal the last entry of the left tree to act as the separator
        let (left, separator) = Node::remove_max(left);
        Node::join(left, separator, right)
    }

    /// Hangs `right` (a shorter tree) off the right spine of `self`,
    /// separated by `separator`. Returns the split overflow when `self`
    /// itself ends up overfull.
    fn join_right(
        &mut self,
        separator: (K, V),
        right: SharedPointer<Node<K, V, P>, P>,
    ) -> Option<((K, V), SharedPointer<Node<K, V, P>, P>)> {
        debug_assert!(self.level > right.level);
        let added = 1 + right.size;
        if self.level == right.level + 1 {
            self.entries.push(separator);
            self.children.push(right);
        } else {
            let last = self.children.len() - 1;
            if let Some((sep, extra)) = self.child_mut(last).join_right(separator, right) {
                self.entries.push(sep);
                self.children.push(extra);
            }
        }
        self.size += added;
        if self.is_overfull() {
            Some(self.split_overfull())
        } else {
            None
        }
    }

    /// The mirror image of [`join_right`]: hangs `left` off the left
    /// spine of `self`.
    ///
    /// [`join_right`]: Node::join_right
    fn join_left(
        &mut self,
        left: SharedPointer<Node<K, V, P>, P>,
        separator: (K, V),
    ) -> Option<((K, V), SharedPointer<Node<K, V, P>, P>)> {
        debug_assert!(self.level > left.level);
        let added = 1 + left.size;
        if self.level == left.level + 1 {
            self.entries.insert(0, separator);
            self.children.insert(0, left);
        } else {
            if let Some((sep, extra)) = self.child_mut(0).join_left(left, separator) {
                self.entries.insert(0, sep);
                self.children.insert(1, extra);
            }
        }
        self.size += added;
        if self.is_overfull() {
            Some(self.split_overfull())
        } else {
            None
        }
    }

    /// Inserts an entry at the very front or back of a tree, splitting
    /// overfull nodes on the way back up.
    fn insert_outer(
        mut root: SharedPointer<Node<K, V, P>, P>,
        entry: (K, V),
        front: bool,
    ) -> SharedPointer<Node<K, V, P>, P> {
        let order = root.order;
        let overflow = {
            let node = SharedPointer::make_mut(&mut root);
            if front {
                node.insert_min(entry)
            } else {
                node.insert_max(entry)
            }
        };
        match overflow {
            Some((sep, right)) => {
                SharedPointer::new(Node::branch(order, vec![sep], vec![root, right]))
            }
            None => root,
        }
    }

    fn insert_min(&mut self, entry: (K, V)) -> Option<((K, V), SharedPointer<Node<K, V, P>, P>)> {
        if self.is_leaf() {
            self.entries.insert(0, entry);
        } else if let Some((sep, right)) = self.child_mut(0).insert_min(entry) {
            self.entries.insert(0, sep);
            self.children.insert(1, right);
        }
        self.size += 1;
        if self.is_overfull() {
            Some(self.split_overfull())
        } else {
            None
        }
    }

    fn insert_max(&mut self, entry: (K, V)) -> Option<((K, V), SharedPointer<Node<K, V, P>, P>)> {
        if self.is_leaf() {
            self.entries.push(entry);
        } else {
            let last = self.children.len() - 1;
            if let Some((sep, right)) = self.child_mut(last).insert_max(entry) {
                self.entries.push(sep);
                self.children.push(right);
            }
        }
        self.size += 1;
        if self.is_overfull() {
            Some(self.split_overfull())
        } else {
            None
        }
    }

    /// Removes the last entry of a tree, repairing underfull nodes on the
    /// way back up.
    pub(crate) fn remove_max(
        mut root: SharedPointer<Node<K, V, P>, P>,
    ) -> (SharedPointer<Node<K, V, P>, P>, (K, V)) {
        debug_assert!(root.size > 0);
        let entry = SharedPointer::make_mut(&mut root).remove_max_rec();
        let collapsed = if !root.is_leaf() && root.len() == 0 {
            SharedPointer::make_mut(&mut root).pop_single_child()
        } else {
            None
        };
        (collapsed.unwrap_or(root), entry)
    }

    fn remove_max_rec(&mut self) -> (K, V) {
        self.size -= 1;
        if self.is_leaf() {
            return self.entries.pop().unwrap();
        }
        let last = self.children.len() - 1;
        let entry = self.child_mut(last).remove_max_rec();
        if self.children[last].is_underfull() {
            self.fix_underfull_child(last);
        }
        entry
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> Node<K, V, P> {
    /// Builds a minimal-height tree from entries already in key order, in
    /// one pass. Sizes are distributed evenly at every level, which keeps
    /// each node within its fill bounds.
    pub(crate) fn from_sorted(order: usize, entries: Vec<(K, V)>) -> SharedPointer<Node<K, V, P>, P>
    where
        K: Ord,
    {
        debug_assert!(order >= crate::config::MIN_ORDER);
        debug_assert!(entries.windows(2).all(|w| w[0].0 <= w[1].0));
        let mut height = 0;
        let mut capacity = order;
        while capacity < entries.len() {
            capacity = (order + 1).saturating_mul(capacity + 1) - 1;
            height += 1;
        }
        let len = entries.len();
        let mut iter = entries.into_iter();
        Node::build_level(&mut iter, order, len, height)
    }

    fn build_level<I>(
        iter: &mut I,
        order: usize,
        n: usize,
        height: usize,
    ) -> SharedPointer<Node<K, V, P>, P>
    where
        I: Iterator<Item = (K, V)>,
    {
        if height == 0 {
            let entries: Vec<(K, V)> = iter.take(n).collect();
            debug_assert_eq!(entries.len(), n);
            return SharedPointer::new(Node::leaf(order, entries));
        }
        let mut capacity = order;
        for _ in 1..height {
            capacity = (order + 1).saturating_mul(capacity + 1) - 1;
        }
        let k = (n + 1).div_ceil(capacity + 1);
        debug_assert!(k >= 2 && k <= order + 1);
        let spread = n - (k - 1);
        let (base, extra) = (spread / k, spread % k);
        let mut entries = Vec::with_capacity(k - 1);
        let mut children = Vec::with_capacity(k);
        for i in 0..k {
            let child_size = base + usize::from(i < extra);
            children.push(Node::build_level(iter, order, child_size, height - 1));
            if i + 1 < k {
                entries.push(iter.next().unwrap());
            }
        }
        SharedPointer::new(Node::branch(order, entries, children))
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> Clone for Node<K, V, P> {
    fn clone(&self) -> Self {
        Node {
            order: self.order,
            level: self.level,
            size: self.size,
            entries: self.entries.clone(),
            children: self.children.clone(),
        }
    }
}

/// An owned, in-order iterator over a whole tree. Nodes that are not
/// shared are drained in place; shared nodes are cloned on first touch.
pub(crate) struct ConsumingIter<K, V, P: SharedPointerKind> {
    stack: Vec<SharedPointer<Node<K, V, P>, P>>,
    remaining: usize,
}

impl<K, V, P: SharedPointerKind> ConsumingIter<K, V, P> {
    pub(crate) fn new(root: SharedPointer<Node<K, V, P>, P>) -> Self {
        let remaining = root.size;
        ConsumingIter {
            stack: vec![root],
            remaining,
        }
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> Iterator for ConsumingIter<K, V, P> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            let node = SharedPointer::make_mut(top);
            // a branch with as many children as entries has already
            // yielded its leading child
            if node.children.len() > node.entries.len() {
                let child = node.children.remove(0);
                self.stack.push(child);
            } else if !node.entries.is_empty() {
                self.remaining -= 1;
                return Some(node.entries.remove(0));
            } else {
                self.stack.pop();
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> ExactSizeIterator for ConsumingIter<K, V, P> {}

#[cfg(test)]
impl<K, V, P> Node<K, V, P>
where
    K: Ord + Clone + std::fmt::Debug,
    V: Clone,
    P: SharedPointerKind,
{
    /// Asserts every structural invariant of the subtree rooted here.
    pub(crate) fn check_valid(&self) {
        self.check_valid_rec(true);
    }

    fn check_valid_rec(&self, is_root: bool) {
        assert!(
            self.entries.len() <= self.order,
            "node with {} entries exceeds order {}",
            self.entries.len(),
            self.order
        );
        if !is_root {
            assert!(
                self.entries.len() >= self.order / 2,
                "non-root node with {} entries is below the minimum fill {}",
                self.entries.len(),
                self.order / 2
            );
        } else if !self.is_leaf() {
            assert!(self.entries.len() >= 1, "branch root with no entries");
        }
        assert!(
            self.entries.windows(2).all(|w| w[0].0 <= w[1].0),
            "entries out of order"
        );
        if self.is_leaf() {
            assert_eq!(self.level, 0);
            assert_eq!(self.size, self.entries.len());
            return;
        }
        assert_eq!(self.children.len(), self.entries.len() + 1);
        let mut size = self.entries.len();
        for (i, child) in self.children.iter().enumerate() {
            assert_eq!(child.level + 1, self.level);
            assert_eq!(child.order, self.order);
            size += child.size;
            if i > 0 {
                let low = &self.entries[i - 1].0;
                assert!(
                    child.first_entry().unwrap().0 >= *low,
                    "child {} starts before its separator {:?}",
                    i,
                    low
                );
            }
            if i < self.entries.len() {
                let high = &self.entries[i].0;
                assert!(
                    child.last_entry().unwrap().0 <= *high,
                    "child {} ends after its separator {:?}",
                    i,
                    high
                );
            }
            child.check_valid_rec(false);
        }
        assert_eq!(self.size, size, "cached subtree size is stale");
    }

    /// Flattens the subtree into its in-order entry sequence.
    pub(crate) fn collect_entries(&self, out: &mut Vec<(K, V)>) {
        if self.is_leaf() {
            out.extend(self.entries.iter().cloned());
            return;
        }
        for (i, child) in self.children.iter().enumerate() {
            child.collect_entries(out);
            if i < self.entries.len() {
                out.push(self.entries[i].clone());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nodes::fixture::{maximal_node, pairs_with_duplicates};
    use archery::ArcK;
    use pretty_assertions::assert_eq;

    type Ptr = SharedPointer<Node<usize, String, ArcK>, ArcK>;

    fn entries_of(node: &Node<usize, String, ArcK>) -> Vec<(usize, String)> {
        let mut out = Vec::new();
        node.collect_entries(&mut out);
        out
    }

    fn numbered(n: usize) -> Vec<(usize, String)> {
        (0..n).map(|i| (i, i.to_string())).collect()
    }

    #[test]
    fn from_sorted_is_valid_across_sizes_and_orders() {
        for &order in &[2, 3, 4, 5, 7, 16] {
            for n in 0..200 {
                let root: Ptr = Node::from_sorted(order, numbered(n));
                root.check_valid();
                assert_eq!(root.size(), n);
                assert_eq!(entries_of(&root), numbered(n));
            }
        }
    }

    #[test]
    fn maximal_node_is_packed_and_ordered() {
        let root = maximal_node::<ArcK>(3, 3);
        root.check_valid();
        let entries = entries_of(&root);
        assert_eq!(entries, numbered(entries.len()));
        assert_eq!(root.level, 3);
    }

    #[test]
    fn step_for_offset_matches_entry_offsets() {
        let root = maximal_node::<ArcK>(2, 3);
        for offset in 0..root.size() {
            let mut node = &*root;
            let mut local = offset;
            loop {
                if node.is_leaf() {
                    assert_eq!(node.entry(local).0, offset);
                    break;
                }
                match node.step_for_offset(local) {
                    OffsetStep::OnEntry(slot) => {
                        assert_eq!(node.offset_of_entry(slot), local);
                        assert_eq!(node.entry(slot).0, offset);
                        break;
                    }
                    OffsetStep::IntoChild(slot) => {
                        local -= node.start_of_child(slot);
                        node = node.child(slot);
                    }
                }
            }
        }
    }

    #[test]
    fn search_policies_on_duplicated_keys() {
        // every even key appears exactly twice, at offsets 2i and 2i + 1
        let c = 26;
        let root: Ptr = Node::from_sorted(3, pairs_with_duplicates(c));
        for i in 0..=c {
            assert_eq!(root.search_first(&(2 * i)), (2 * i, true));
            assert_eq!(root.search_last(&(2 * i)), (2 * i + 1, true));
            let (any, matched) = root.search_any(&(2 * i));
            assert!(matched && (any == 2 * i || any == 2 * i + 1));
        }
        for i in 0..c {
            // odd keys are absent; all searches land on the next even key
            assert_eq!(root.search_first(&(2 * i + 1)), (2 * i + 2, false));
            assert_eq!(root.search_last(&(2 * i + 1)), (2 * i + 2, false));
            assert_eq!(root.search_any(&(2 * i + 1)), (2 * i + 2, false));
        }
        assert_eq!(root.search_first(&(2 * c + 1)), (root.size(), false));
    }

    #[test]
    fn join_trees_of_unequal_heights() {
        for &order in &[2, 3, 5] {
            for left_n in 0..40 {
                for &right_n in &[0, 1, 7, 40, 100] {
                    let left: Ptr = Node::from_sorted(order, numbered(left_n));
                    let right: Ptr = Node::from_sorted(
                        order,
                        (left_n + 1..left_n + 1 + right_n)
                            .map(|i| (i, i.to_string()))
                            .collect(),
                    );
                    let joined = Node::join(left, (left_n, left_n.to_string()), right);
                    joined.check_valid();
                    assert_eq!(entries_of(&joined), numbered(left_n + 1 + right_n));
                }
            }
        }
    }

    #[test]
    fn append_skips_the_separator() {
        let left: Ptr = Node::from_sorted(3, numbered(25));
        let right: Ptr = Node::from_sorted(3, (25..60).map(|i| (i, i.to_string())).collect());
        let joined = Node::append(left, right);
        joined.check_valid();
        assert_eq!(entries_of(&joined), numbered(60));
    }

    #[test]
    fn remove_max_keeps_the_tree_valid() {
        let mut root: Ptr = Node::from_sorted(3, numbered(80));
        for expected in (0..80).rev() {
            let (rest, entry) = Node::remove_max(root);
            root = rest;
            assert_eq!(entry, (expected, expected.to_string()));
            root.check_valid();
        }
        assert_eq!(root.size(), 0);
    }

    #[test]
    fn consuming_iter_yields_in_order() {
        let root: Ptr = Node::from_sorted(4, numbered(100));
        let shared = SharedPointer::clone(&root);
        let collected: Vec<_> = ConsumingIter::new(root).collect();
        assert_eq!(collected, numbered(100));
        // the shared copy is untouched
        assert_eq!(entries_of(&shared), numbered(100));
    }

    #[test]
    fn shared_children_are_cloned_before_mutation() {
        let root: Ptr = Node::from_sorted(3, numbered(30));
        let pristine = SharedPointer::clone(&root);
        let mut copy = clone_ref(root);
        copy.child_mut(0).insert_at(0, (0, "dup".to_string()));
        copy.update_size();
        assert_eq!(copy.size(), 31);
        assert_eq!(pristine.size(), 30);
        assert_eq!(entries_of(&pristine), numbered(30));
    }
}
