// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The borrowed path flavor.
//!
//! A [`WeakPath`] holds plain references into a tree someone else keeps
//! alive, so building and moving one never touches a reference count.
//! It is the cheapest way to iterate, and it is read-only by
//! construction: the mutating capability is simply not implemented for
//! it, so there is no write access to misuse.

use archery::SharedPointerKind;

use super::btree::Node;
use super::path::PathState;

struct WeakLevel<'a, K, V, P: SharedPointerKind> {
    node: &'a Node<K, V, P>,
    slot: usize,
    base: usize,
}

/// A read-only position inside a borrowed tree.
pub(crate) struct WeakPath<'a, K, V, P: SharedPointerKind> {
    levels: Vec<WeakLevel<'a, K, V, P>>,
    offset: usize,
    count: usize,
}

impl<'a, K, V, P: SharedPointerKind> WeakPath<'a, K, V, P> {
    /// The element at the current position, with the tree's lifetime
    /// rather than the path's.
    ///
    /// # Panics
    ///
    /// If the path is at the end position.
    pub(crate) fn current_entry(&self) -> &'a (K, V) {
        assert!(self.offset < self.count, "no element at the end position");
        let level = self.levels.last().unwrap();
        level.node.entry(level.slot)
    }

    /// The terminal operation of the shared contract, for symmetry with
    /// the owning flavors: a borrowed path never edits anything, so
    /// finishing simply hands back the root it was built over.
    #[cfg(test)]
    pub(crate) fn finish(self) -> &'a Node<K, V, P> {
        self.levels.first().unwrap().node
    }
}

impl<'a, K, V, P> PathState<K, V, P> for WeakPath<'a, K, V, P>
where
    K: Ord + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Root = &'a Node<K, V, P>;

    fn from_root(root: &'a Node<K, V, P>) -> Self {
        let count = root.size();
        WeakPath {
            levels: vec![WeakLevel {
                node: root,
                slot: 0,
                base: 0,
            }],
            offset: 0,
            count,
        }
    }

    fn count(&self) -> usize {
        self.count
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    fn base(&self) -> usize {
        self.levels.last().unwrap().base
    }

    fn depth(&self) -> usize {
        self.levels.len()
    }

    fn node(&self) -> &Node<K, V, P> {
        self.levels.last().unwrap().node
    }

    fn slot(&self) -> usize {
        self.levels.last().unwrap().slot
    }

    fn set_slot(&mut self, slot: usize) {
        self.levels.last_mut().unwrap().slot = slot;
    }

    fn push(&mut self, child_slot: usize) {
        let level = self.levels.last_mut().unwrap();
        level.slot = child_slot;
        let base = level.base + level.node.start_of_child(child_slot);
        let child = level.node.child(child_slot);
        self.levels.push(WeakLevel {
            node: child,
            slot: 0,
            base,
        });
    }

    fn pop(&mut self) -> usize {
        debug_assert!(self.levels.len() >= 2);
        self.levels.pop();
        self.levels.last().unwrap().slot
    }

    fn visit_levels(&self, ascending: bool, f: &mut dyn FnMut(&Node<K, V, P>, usize)) {
        if ascending {
            for level in self.levels.iter().rev() {
                f(level.node, level.slot);
            }
        } else {
            for level in self.levels.iter() {
                f(level.node, level.slot);
            }
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Clone for WeakPath<'a, K, V, P> {
    fn clone(&self) -> Self {
        WeakPath {
            levels: self
                .levels
                .iter()
                .map(|level| WeakLevel {
                    node: level.node,
                    slot: level.slot,
                    base: level.base,
                })
                .collect(),
            offset: self.offset,
            count: self.count,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nodes::btree::Node;
    use crate::nodes::fixture::{maximal_node, pairs_with_duplicates};
    use crate::nodes::path::testing::*;
    use crate::nodes::path::MatchPolicy;
    use archery::ArcK;

    type TestPath<'a> = WeakPath<'a, usize, String, ArcK>;

    #[test]
    fn construction_forms() {
        let root = maximal_node::<ArcK>(3, 3);
        let count = root.size();

        let path = TestPath::start_of(&root);
        assert!(path.is_valid());
        assert!(path.is_at_start());
        assert!(!path.is_at_end());
        assert_eq!(path.offset(), 0);
        assert_eq!(*path.key(), 0);
        assert_eq!(*path.value(), "0");

        let path = TestPath::end_of(&root);
        assert!(path.is_valid());
        assert!(!path.is_at_start());
        assert!(path.is_at_end());
        assert_eq!(path.offset(), count);

        for i in 0..count {
            let path = TestPath::at_offset(&root, i);
            assert!(path.is_valid());
            assert_eq!(path.offset(), i);
            assert_eq!(*path.key(), i);
            assert_eq!(*path.value(), i.to_string());
        }
        let path = TestPath::at_offset(&root, count);
        assert!(path.is_at_end());
    }

    #[test]
    fn construction_by_key() {
        let c = 26;
        let root: crate::nodes::path::NodePtr<usize, String, ArcK> =
            Node::from_sorted(3, pairs_with_duplicates(c));
        for i in 0..=c {
            let path = TestPath::at_key(&root, &(2 * i), MatchPolicy::First);
            assert!(path.is_valid());
            assert_eq!(path.offset(), 2 * i);
            let path = TestPath::at_key(&root, &(2 * i), MatchPolicy::Last);
            assert_eq!(path.offset(), 2 * i + 1);
            assert_eq!(*path.key(), 2 * i);
            let path = TestPath::at_key(&root, &(2 * i), MatchPolicy::After);
            assert_eq!(path.offset(), 2 * i + 2);
            let path = TestPath::at_key(&root, &(2 * i), MatchPolicy::Any);
            assert!(path.offset() == 2 * i || path.offset() == 2 * i + 1);
        }
    }

    #[test]
    fn walks_and_seeks() {
        let root = maximal_node::<ArcK>(3, 3);
        check_forward_walk(TestPath::start_of(&root));
        check_backward_walk(TestPath::end_of(&root));
        check_seek_by_offset(TestPath::end_of(&root));
        check_level_traversal(&TestPath::start_of(&root));
    }

    #[test]
    fn seeks_by_key() {
        let c = 30;
        let root: crate::nodes::path::NodePtr<usize, String, ArcK> =
            Node::from_sorted(3, pairs_with_duplicates(c));
        check_seek_by_key(TestPath::end_of(&root), c);
    }

    #[test]
    fn splits_share_structure_without_copying_the_tree() {
        let root = maximal_node::<ArcK>(2, 4);
        check_split_everywhere(TestPath::start_of(&root));
        // the borrowed tree is untouched afterwards
        root.check_valid();
        assert_eq!(root.size(), TestPath::start_of(&root).count());
    }

    #[test]
    fn finish_returns_the_untouched_root() {
        let root = maximal_node::<ArcK>(2, 3);
        let mut path = TestPath::start_of(&root);
        path.move_to_offset(root.size() / 2);
        path.move_forward();
        let finished = path.finish();
        assert!(std::ptr::eq(finished, &*root));
    }

    #[test]
    fn cloned_paths_move_independently() {
        let root = maximal_node::<ArcK>(2, 3);
        let mut a = TestPath::start_of(&root);
        let mut b = a.clone();
        a.move_forward();
        a.move_forward();
        b.move_forward();
        assert_eq!(a.offset(), 2);
        assert_eq!(b.offset(), 1);
        assert_eq!(*a.key(), 2);
        assert_eq!(*b.key(), 1);
    }

    #[test]
    fn current_entry_outlives_the_path() {
        let root = maximal_node::<ArcK>(1, 3);
        let entry = {
            let path = TestPath::at_offset(&root, 2);
            path.current_entry()
        };
        assert_eq!(*entry, (2, "2".to_string()));
    }

    #[test]
    #[should_panic(expected = "cannot move forward")]
    fn forward_at_end_panics() {
        let root = maximal_node::<ArcK>(1, 3);
        let mut path = TestPath::end_of(&root);
        path.move_forward();
    }

    #[test]
    #[should_panic(expected = "offset out of bounds")]
    fn offset_out_of_range_panics() {
        let root = maximal_node::<ArcK>(1, 3);
        let _ = TestPath::at_offset(&root, root.size() + 1);
    }
}
