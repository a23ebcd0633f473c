// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree backend generic over scalar `T: Scalar`.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar, ScalarAcc, area, cmp_t, enlargement, intersection_area, margin};

/// Default node fan-out.
pub const DEFAULT_MAX_ENTRIES: usize = 9;

/// R-tree backend with margin/overlap driven splits and sort-tile bulk loading.
pub struct RTree<T: Scalar> {
    max_entries: usize,
    min_entries: usize,
    root: Option<NodeIdx>,
    nodes: Vec<Node<T>>,
    free_nodes: Vec<NodeIdx>,
    slots: Vec<Option<Aabb2D<T>>>,
    len: usize,
}

#[derive(Clone, Debug)]
struct Node<T> {
    bbox: Aabb2D<T>,
    // Leaves are height 1.
    height: usize,
    children: Vec<Child<T>>,
}

impl<T> Node<T> {
    fn is_leaf(&self) -> bool {
        self.height == 1
    }
}

#[derive(Copy, Clone, Debug)]
enum Child<T> {
    Node(NodeIdx),
    Item { slot: usize, bbox: Aabb2D<T> },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct NodeIdx(usize);

impl<T: Scalar> Default for RTree<T> {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl<T: Scalar> RTree<T> {
    /// Create an empty tree with the default fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree with a custom fan-out (clamped to at least 4).
    ///
    /// Nodes are kept at least 40% full after splits.
    pub fn with_max_entries(max_entries: usize) -> Self {
        let max_entries = max_entries.max(4);
        Self {
            max_entries,
            min_entries: (max_entries * 2).div_ceil(5).max(2),
            root: None,
            nodes: Vec::new(),
            free_nodes: Vec::new(),
            slots: Vec::new(),
            len: 0,
        }
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree; `0` when empty, `1` when the root is a leaf.
    pub fn height(&self) -> usize {
        self.root.map_or(0, |r| self.nodes[r.0].height)
    }

    /// Bounding box of everything in the tree.
    pub fn bounds(&self) -> Option<Aabb2D<T>> {
        self.root.map(|r| self.nodes[r.0].bbox)
    }

    fn child_bbox(&self, child: &Child<T>) -> Aabb2D<T> {
        match child {
            Child::Node(i) => self.nodes[i.0].bbox,
            Child::Item { bbox, .. } => *bbox,
        }
    }

    fn bbox_of(&self, children: &[Child<T>]) -> Option<Aabb2D<T>> {
        children
            .iter()
            .map(|c| self.child_bbox(c))
            .reduce(|a, b| a.union(&b))
    }

    fn alloc(&mut self, node: Node<T>) -> NodeIdx {
        if let Some(idx) = self.free_nodes.pop() {
            self.nodes[idx.0] = node;
            idx
        } else {
            self.nodes.push(node);
            NodeIdx(self.nodes.len() - 1)
        }
    }

    fn release(&mut self, idx: NodeIdx) {
        self.nodes[idx.0].children.clear();
        self.free_nodes.push(idx);
    }

    fn drop_nodes(&mut self) {
        self.root = None;
        self.nodes.clear();
        self.free_nodes.clear();
    }

    fn store_slot(&mut self, slot: usize, bbox: Aabb2D<T>) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        if self.slots[slot].replace(bbox).is_none() {
            self.len += 1;
        }
    }

    fn insert_item(&mut self, slot: usize, bbox: Aabb2D<T>) {
        let item = Child::Item { slot, bbox };
        let Some(root) = self.root else {
            let leaf = self.alloc(Node {
                bbox,
                height: 1,
                children: vec![item],
            });
            self.root = Some(leaf);
            return;
        };

        let path = self.choose_subtree(root, &bbox);
        let leaf = path[path.len() - 1];
        self.nodes[leaf.0].children.push(item);
        for n in &path {
            let node = &mut self.nodes[n.0];
            node.bbox = node.bbox.union(&bbox);
        }

        // Split overflowing nodes bottom-up; stop at the first one that fits.
        let mut level = path.len();
        while level > 0 {
            level -= 1;
            if self.nodes[path[level].0].children.len() <= self.max_entries {
                break;
            }
            self.split(&path, level);
        }
    }

    /// Root-to-leaf path picking the child needing the least enlargement.
    fn choose_subtree(&self, root: NodeIdx, bbox: &Aabb2D<T>) -> Vec<NodeIdx> {
        let mut path = vec![root];
        let mut node = root;
        while !self.nodes[node.0].is_leaf() {
            let mut best: Option<(ScalarAcc<T>, ScalarAcc<T>, NodeIdx)> = None;
            for child in &self.nodes[node.0].children {
                let Child::Node(ci) = *child else {
                    continue;
                };
                let cb = self.nodes[ci.0].bbox;
                let grow = enlargement(&cb, bbox);
                let size = area(&cb);
                let better = match &best {
                    None => true,
                    Some((bg, bs, _)) => grow < *bg || (grow == *bg && size < *bs),
                };
                if better {
                    best = Some((grow, size, ci));
                }
            }
            let Some((_, _, next)) = best else {
                break;
            };
            node = next;
            path.push(next);
        }
        path
    }

    fn split(&mut self, path: &[NodeIdx], level: usize) {
        let idx = path[level];
        let mut children = core::mem::take(&mut self.nodes[idx.0].children);
        self.sort_for_split(&mut children);
        let at = self.choose_split_index(&children);
        let right = children.split_off(at);

        let height = self.nodes[idx.0].height;
        let left_bbox = self.bbox_of(&children).unwrap_or(self.nodes[idx.0].bbox);
        let right_bbox = self.bbox_of(&right).unwrap_or(left_bbox);
        {
            let node = &mut self.nodes[idx.0];
            node.children = children;
            node.bbox = left_bbox;
        }
        let sibling = self.alloc(Node {
            bbox: right_bbox,
            height,
            children: right,
        });

        if level == 0 {
            let root = self.alloc(Node {
                bbox: left_bbox.union(&right_bbox),
                height: height + 1,
                children: vec![Child::Node(idx), Child::Node(sibling)],
            });
            self.root = Some(root);
        } else {
            self.nodes[path[level - 1].0]
                .children
                .push(Child::Node(sibling));
        }
    }

    /// Sort children along the axis whose split candidates have the smallest total margin.
    fn sort_for_split(&self, children: &mut [Child<T>]) {
        children.sort_by(|a, b| cmp_t(&self.child_bbox(a).min_x, &self.child_bbox(b).min_x));
        let x_margin = self.distribution_margin(children);
        children.sort_by(|a, b| cmp_t(&self.child_bbox(a).min_y, &self.child_bbox(b).min_y));
        let y_margin = self.distribution_margin(children);
        if x_margin < y_margin {
            children.sort_by(|a, b| cmp_t(&self.child_bbox(a).min_x, &self.child_bbox(b).min_x));
        }
    }

    fn distribution_margin(&self, children: &[Child<T>]) -> ScalarAcc<T> {
        let boxes: Vec<Aabb2D<T>> = children.iter().map(|c| self.child_bbox(c)).collect();
        let (m, n) = (self.min_entries, boxes.len());
        let mut left = cover(&boxes[..m]);
        let mut right = cover(&boxes[n - m..]);
        let mut total = margin(&left) + margin(&right);
        for b in &boxes[m..n - m] {
            left = left.union(b);
            total = total + margin(&left);
        }
        for b in boxes[m..n - m].iter().rev() {
            right = right.union(b);
            total = total + margin(&right);
        }
        total
    }

    /// Split index with the least overlap between halves, then the least total area.
    fn choose_split_index(&self, children: &[Child<T>]) -> usize {
        let boxes: Vec<Aabb2D<T>> = children.iter().map(|c| self.child_bbox(c)).collect();
        let (m, n) = (self.min_entries, boxes.len());
        let mut best_at = n - m;
        let mut best: Option<(ScalarAcc<T>, ScalarAcc<T>)> = None;
        for i in m..=n - m {
            let left = cover(&boxes[..i]);
            let right = cover(&boxes[i..]);
            let overlap = intersection_area(&left, &right);
            let total = area(&left) + area(&right);
            let better = match best {
                None => true,
                Some((bo, ba)) => overlap < bo || (overlap == bo && total < ba),
            };
            if better {
                best = Some((overlap, total));
                best_at = i;
            }
        }
        best_at
    }

    fn find_leaf(
        &self,
        node: NodeIdx,
        slot: usize,
        bbox: &Aabb2D<T>,
        path: &mut Vec<NodeIdx>,
    ) -> bool {
        let n = &self.nodes[node.0];
        if !n.bbox.contains(bbox) {
            return false;
        }
        path.push(node);
        if n.is_leaf() {
            if n
                .children
                .iter()
                .any(|c| matches!(c, Child::Item { slot: s, .. } if *s == slot))
            {
                return true;
            }
        } else {
            for child in &n.children {
                if let Child::Node(ci) = *child
                    && self.find_leaf(ci, slot, bbox, path)
                {
                    return true;
                }
            }
        }
        path.pop();
        false
    }

    fn remove_item(&mut self, slot: usize, bbox: &Aabb2D<T>) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let mut path = Vec::new();
        if !self.find_leaf(root, slot, bbox, &mut path) {
            return false;
        }
        let leaf = path[path.len() - 1];
        self.nodes[leaf.0]
            .children
            .retain(|c| !matches!(c, Child::Item { slot: s, .. } if *s == slot));
        self.condense(&path);
        true
    }

    /// Drop emptied nodes along `path` and shrink the remaining boxes.
    fn condense(&mut self, path: &[NodeIdx]) {
        for level in (0..path.len()).rev() {
            let idx = path[level];
            if self.nodes[idx.0].children.is_empty() {
                if level > 0 {
                    let parent = path[level - 1];
                    self.nodes[parent.0]
                        .children
                        .retain(|c| !matches!(c, Child::Node(i) if *i == idx));
                    self.release(idx);
                } else {
                    self.drop_nodes();
                }
            } else {
                let bbox = self.bbox_of(&self.nodes[idx.0].children);
                if let Some(bbox) = bbox {
                    self.nodes[idx.0].bbox = bbox;
                }
            }
        }

        // A root left with a single inner child gives up a level.
        while let Some(root) = self.root {
            let only = match self.nodes[root.0].children.as_slice() {
                [Child::Node(only)] if !self.nodes[root.0].is_leaf() => *only,
                _ => break,
            };
            self.release(root);
            self.root = Some(only);
        }
    }

    /// Sort-tile packing of `items` into a subtree.
    ///
    /// `height == 0` lets the root level pick its own height and fan-out so the
    /// lower levels come out full.
    fn build(&mut self, items: &mut [(usize, Aabb2D<T>)], height: usize) -> NodeIdx {
        let n = items.len();
        let mut fanout = self.max_entries;
        if n <= fanout {
            let children: Vec<Child<T>> = items
                .iter()
                .map(|&(slot, bbox)| Child::Item { slot, bbox })
                .collect();
            let bbox = self.bbox_of(&children).unwrap_or(items[0].1);
            return self.alloc(Node {
                bbox,
                height: 1,
                children,
            });
        }

        let mut height = height;
        if height == 0 {
            let (levels, capacity_below) = levels_for(n, fanout);
            height = levels;
            fanout = n.div_ceil(capacity_below);
        }
        let per_child = n.div_ceil(fanout);
        let per_slice = per_child * ceil_sqrt(fanout);

        items.sort_by(|a, b| cmp_t(&a.1.min_x, &b.1.min_x));
        let mut children = Vec::with_capacity(fanout);
        let mut child_height = 0;
        for slice in items.chunks_mut(per_slice) {
            slice.sort_by(|a, b| cmp_t(&a.1.min_y, &b.1.min_y));
            for group in slice.chunks_mut(per_child) {
                let child = self.build(group, (height - 1).max(1));
                child_height = child_height.max(self.nodes[child.0].height);
                children.push(Child::Node(child));
            }
        }
        let bbox = self.bbox_of(&children).unwrap_or(items[0].1);
        self.alloc(Node {
            bbox,
            height: child_height + 1,
            children,
        })
    }

    fn search(&self, rect: &Aabb2D<T>, out: &mut Vec<usize>) {
        let Some(root) = self.root else {
            return;
        };
        if !self.nodes[root.0].bbox.intersects(rect) {
            return;
        }
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            for child in &self.nodes[idx.0].children {
                match *child {
                    Child::Item { slot, bbox } => {
                        if bbox.intersects(rect) {
                            out.push(slot);
                        }
                    }
                    Child::Node(ci) => {
                        let cb = self.nodes[ci.0].bbox;
                        if rect.contains(&cb) {
                            self.collect_all(ci, out);
                        } else if cb.intersects(rect) {
                            stack.push(ci);
                        }
                    }
                }
            }
        }
    }

    fn collect_all(&self, from: NodeIdx, out: &mut Vec<usize>) {
        let mut stack = vec![from];
        while let Some(idx) = stack.pop() {
            for child in &self.nodes[idx.0].children {
                match *child {
                    Child::Item { slot, .. } => out.push(slot),
                    Child::Node(ci) => stack.push(ci),
                }
            }
        }
    }
}

fn cover<T: Scalar>(boxes: &[Aabb2D<T>]) -> Aabb2D<T> {
    debug_assert!(!boxes.is_empty(), "cover needs at least one box");
    boxes[1..].iter().fold(boxes[0], |acc, b| acc.union(b))
}

/// Levels needed to hold `n` items at fan-out `m`, plus the capacity of one
/// subtree directly under the root.
fn levels_for(n: usize, m: usize) -> (usize, usize) {
    let mut levels = 1;
    let mut below = 1_usize;
    let mut capacity = m;
    while capacity < n {
        below = capacity;
        capacity = capacity.saturating_mul(m);
        levels += 1;
    }
    (levels, below)
}

fn ceil_sqrt(v: usize) -> usize {
    let mut r = 1;
    while r * r < v {
        r += 1;
    }
    r
}

impl<T: Scalar> Backend<T> for RTree<T> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.slots.get(slot).is_some_and(Option::is_some) {
            self.remove(slot);
        }
        self.store_slot(slot, aabb);
        self.insert_item(slot, aabb);
    }

    fn remove(&mut self, slot: usize) -> bool {
        let Some(old) = self.slots.get_mut(slot).and_then(Option::take) else {
            return false;
        };
        self.len -= 1;
        self.remove_item(slot, &old)
    }

    fn bulk_load(&mut self, items: &[(usize, Aabb2D<T>)]) {
        if items.is_empty() {
            return;
        }
        if self.root.is_some() && items.len() < self.min_entries {
            for &(slot, aabb) in items {
                self.insert(slot, aabb);
            }
            return;
        }
        // Repack everything, old and new, into a fresh tree.
        for &(slot, aabb) in items {
            self.store_slot(slot, aabb);
        }
        let mut all: Vec<(usize, Aabb2D<T>)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot, b)| b.map(|b| (slot, b)))
            .collect();
        self.drop_nodes();
        let root = self.build(&mut all, 0);
        self.root = Some(root);
    }

    fn clear(&mut self) {
        self.drop_nodes();
        self.slots.clear();
        self.len = 0;
    }

    fn visit_rect(&self, rect: &Aabb2D<T>, out: &mut Vec<usize>) {
        self.search(rect, out);
    }
}

impl<T: Scalar> Debug for RTree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RTree")
            .field("max_entries", &self.max_entries)
            .field("min_entries", &self.min_entries)
            .field("height", &self.height())
            .field("arena_nodes", &(self.nodes.len() - self.free_nodes.len()))
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// R-tree with i64 coordinates and i128 metrics.
pub type RTreeI64 = RTree<i64>;

/// R-tree with f32 coordinates and f64 metrics.
pub type RTreeF32 = RTree<f32>;

/// R-tree with f64 coordinates and f64 metrics.
pub type RTreeF64 = RTree<f64>;
