// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tree fixtures shared by the node, path and map tests.

use archery::{SharedPointer, SharedPointerKind};

use super::btree::Node;

/// Builds a fully packed tree of the given depth: every node holds exactly
/// `order` entries, so the shape exercises each level uniformly. Keys are
/// assigned in order, which puts key `i` at offset `i`; payloads are the
/// keys rendered as strings.
pub(crate) fn maximal_node<P: SharedPointerKind>(
    depth: usize,
    order: usize,
) -> SharedPointer<Node<usize, String, P>, P> {
    let mut next = 0;
    build(depth, order, &mut next)
}

fn build<P: SharedPointerKind>(
    depth: usize,
    order: usize,
    next: &mut usize,
) -> SharedPointer<Node<usize, String, P>, P> {
    if depth == 0 {
        let entries = (0..order).map(|_| take(next)).collect();
        return SharedPointer::new(Node::leaf(order, entries));
    }
    let mut entries = Vec::with_capacity(order);
    let mut children = Vec::with_capacity(order + 1);
    for _ in 0..order {
        children.push(build(depth - 1, order, next));
        entries.push(take(next));
    }
    children.push(build(depth - 1, order, next));
    SharedPointer::new(Node::branch(order, entries, children))
}

fn take(next: &mut usize) -> (usize, String) {
    let key = *next;
    *next += 1;
    (key, key.to_string())
}

/// The duplicated-key corpus from the match-policy tests: every even key
/// `0, 2, .., 2c` appears exactly twice, with payloads recording the
/// original insertion positions. Key `2i` occupies offsets `2i` and
/// `2i + 1`; odd keys are absent.
pub(crate) fn pairs_with_duplicates(c: usize) -> Vec<(usize, String)> {
    (0..=2 * c + 1).map(|x| (x & !1, x.to_string())).collect()
}
