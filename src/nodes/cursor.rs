// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The cursor path flavor.
//!
//! A [`CursorPath`] stays valid across any number of edits at a moving
//! position. Leaf-level edits are applied in place; when one leaves the
//! current leaf overfull, underfull, or splits it out from under the
//! position, the path folds its pending changes into the root —
//! rebalancing as it ascends — and reconstitutes the chain by descending
//! to the still-valid offset. The chain above the leaf is therefore never
//! trusted across a structural change, only rebuilt from the root on
//! demand.

use archery::SharedPointerKind;

use super::btree::Node;
use super::path::{MutPathState, NodePtr, PathState, Spine};

/// An owning position that survives repeated edits; the engine behind
/// the public cursor.
pub(crate) struct CursorPath<K, V, P: SharedPointerKind> {
    spine: Spine<K, V, P>,
}

impl<K, V, P> CursorPath<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    /// Clone-if-shared access to the payload at the current position.
    ///
    /// # Panics
    ///
    /// If the path is at the end position.
    pub(crate) fn value_mut(&mut self) -> &mut V {
        assert!(!self.is_at_end(), "no element at the end position");
        let slot = self.slot();
        &mut self.node_mut().entry_mut(slot).1
    }
}

impl<K, V, P> PathState<K, V, P> for CursorPath<K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Root = NodePtr<K, V, P>;

    fn from_root(root: NodePtr<K, V, P>) -> Self {
        CursorPath {
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

impl<K, V, P> MutPathState<K, V, P> for CursorPath<K, V, P>
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::nodes::fixture::maximal_node;
    use crate::nodes::path::testing::*;
    use archery::{ArcK, SharedPointer};
    use pretty_assertions::assert_eq;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    type TestPath = CursorPath<usize, String, ArcK>;
    type Ptr = NodePtr<usize, String, ArcK>;

    fn entries_of(root: &Ptr) -> Vec<(usize, String)> {
        let mut out = Vec::new();
        root.collect_entries(&mut out);
        out
    }

    #[test]
    fn behaves_as_a_plain_path_between_edits() {
        let root = maximal_node::<ArcK>(3, 3);
        let expected = entries_of(&root);
        let path = check_forward_walk(TestPath::start_of(SharedPointer::clone(&root)));
        check_read_only_finish(path, &expected);
        let path = check_seek_by_offset(TestPath::end_of(SharedPointer::clone(&root)));
        check_read_only_finish(path, &expected);
        check_split_everywhere(TestPath::start_of(root));
    }

    #[test]
    fn survives_the_leaf_splitting_under_it() {
        // repeated front insertion forces the current leaf to split on
        // almost every step while the path stays alive
        let mut path = TestPath::from_root(SharedPointer::new(Node::new(3)));
        for i in (0..100).rev() {
            path.move_to_start();
            path.insert((i, i.to_string()));
            assert_eq!(path.offset(), 1);
            assert_eq!(path.count(), 100 - i);
        }
        let root = path.finish();
        root.check_valid();
        assert_eq!(entries_of(&root), numbered(100));
    }

    #[test]
    fn appends_at_the_end_without_reseeking() {
        let mut path = TestPath::from_root(SharedPointer::new(Node::new(4)));
        for i in 0..200 {
            path.insert((i, i.to_string()));
            assert!(path.is_at_end());
        }
        let root = path.finish();
        root.check_valid();
        assert_eq!(entries_of(&root), numbered(200));
    }

    #[test]
    fn removes_forward_from_the_middle() {
        let root: Ptr = Node::from_sorted(3, numbered(60));
        let mut path = TestPath::at_offset(root, 20);
        for expected in 20..60 {
            let entry = path.remove();
            assert_eq!(entry, (expected, expected.to_string()));
            assert_eq!(path.offset(), 20);
        }
        assert!(path.is_at_end());
        let root = path.finish();
        root.check_valid();
        assert_eq!(entries_of(&root), numbered(20));
    }

    #[test]
    fn edits_payloads_in_place() {
        let root: Ptr = Node::from_sorted(3, numbered(50));
        let pristine = SharedPointer::clone(&root);
        let mut path = TestPath::start_of(root);
        while !path.is_at_end() {
            let key = *path.key();
            *path.value_mut() = format!("#{}", key);
            path.move_forward();
        }
        let root = path.finish();
        root.check_valid();
        let expected: Vec<_> = (0..50).map(|i| (i, format!("#{}", i))).collect();
        assert_eq!(entries_of(&root), expected);
        // the original payloads are still visible through the old root
        assert_eq!(entries_of(&pristine), numbered(50));
    }

    #[test]
    fn random_edit_sequence_matches_a_vec_model() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut model: Vec<(usize, String)> = numbered(32);
        let mut path = TestPath::from_root(Node::from_sorted(3, model.clone()));
        for step in 0..1000 {
            if model.is_empty() || (model.len() < 512 && rng.random_bool(0.6)) {
                // insert a duplicate of the key at the chosen position so
                // sort order is preserved no matter where we land
                let at = rng.random_range(0..=model.len());
                let key = if at < model.len() {
                    model[at].0
                } else {
                    model.last().map_or(0, |e| e.0)
                };
                let entry = (key, format!("step{}", step));
                path.move_to_offset(at);
                path.insert(entry.clone());
                model.insert(at, entry);
                assert_eq!(path.offset(), at + 1);
            } else {
                let at = rng.random_range(0..model.len());
                path.move_to_offset(at);
                let removed = path.remove();
                assert_eq!(removed, model.remove(at));
            }
            assert_eq!(path.count(), model.len());
        }
        let root = path.finish();
        root.check_valid();
        assert_eq!(entries_of(&root), model);
    }
}
