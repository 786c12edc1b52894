// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The owning path flavor.
//!
//! A [`StrongPath`] holds its own shared pointer to every node on the
//! chain. A node is cloned the moment an edit first touches it — never
//! earlier, so read-only use stays allocation-free — and changed nodes
//! are written back into their (by then uniquely held) parents as the
//! chain ascends. Built for one-shot mutations: position, edit once,
//! [`finish`].
//!
//! [`finish`]: crate::nodes::path::MutPathState::finish

use archery::SharedPointerKind;

use super::btree::Node;
use super::path::{MutPathState, NodePtr, PathState, Spine};

/// An owning position inside a tree, capable of a structural edit.
pub(crate) struct StrongPath<K, V, P: SharedPointerKind> {
    spine: Spine<K, V, P>,
}

impl<K, V, P> PathState<K, V, P> for StrongPath<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Root = NodePtr<K, V, P>;

    fn from_root(root: NodePtr<K, V, P>) -> Self {
        StrongPath {
            spine: Spine::new(root),
        }
    }

    fn count(&self) -> usize {
        self.spine.count
    }

    fn offset(&self) -> usize {
        self.spine.offset
    }

    fn set_offset(&mut self, offset: usize) {
        self.spine.offset = offset;
    }

    fn base(&self) -> usize {
        self.spine.base()
    }

    fn depth(&self) -> usize {
        self.spine.depth()
    }

    fn node(&self) -> &Node<K, V, P> {
        self.spine.node()
    }

    fn slot(&self) -> usize {
        self.spine.slot()
    }

    fn set_slot(&mut self, slot: usize) {
        self.spine.set_slot(slot);
    }

    fn push(&mut self, child_slot: usize) {
        self.spine.push(child_slot);
    }

    fn pop(&mut self) -> usize {
        self.spine.pop()
    }

    fn visit_levels(&self, ascending: bool, f: &mut dyn FnMut(&Node<K, V, P>, usize)) {
        self.spine.visit_levels(ascending, f);
    }
}

impl<K, V, P> MutPathState<K, V, P> for StrongPath<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn set_count(&mut self, count: usize) {
        self.spine.count = count;
    }

    fn node_mut(&mut self) -> &mut Node<K, V, P> {
        self.spine.node_mut()
    }

    fn replace_root(&mut self, root: NodePtr<K, V, P>) {
        self.spine.replace_root(root);
    }

    fn update_root(&mut self, f: &mut dyn FnMut(NodePtr<K, V, P>) -> NodePtr<K, V, P>) {
        self.spine.update_root(f);
    }

    fn take_root(self) -> NodePtr<K, V, P> {
        self.spine.take_root()
    }
}
