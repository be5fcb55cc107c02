//! Dynamic R-tree over bounding boxes.
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by index,
//! including the child→parent links needed during splits. Leaves hold
//! `(bbox, data_index)` entries where the data index is opaque to the tree;
//! callers map it back to whatever collection they indexed.
//!
//! Insertion is the classic algorithm: descend by least area enlargement,
//! append at the chosen leaf, split on overflow with quadratic seed
//! picking, and recompute every ancestor's bbox on the way back up.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use crate::geometry::{BoundingBox, Point};

use super::QueryError;

/// Default maximum entries per node.
pub const DEFAULT_MAX_ENTRIES: usize = 16;

/// One leaf payload.
#[derive(Debug, Clone, Copy)]
struct Entry {
    bounds: BoundingBox,
    data_index: usize,
}

#[derive(Debug)]
enum NodeKind {
    Leaf { entries: Vec<Entry> },
    Internal { children: Vec<usize> },
}

#[derive(Debug)]
struct Node {
    bounds: BoundingBox,
    parent: Option<usize>,
    kind: NodeKind,
}

impl Node {
    fn leaf() -> Self {
        Self {
            bounds: BoundingBox::empty(),
            parent: None,
            kind: NodeKind::Leaf { entries: Vec::new() },
        }
    }

    fn entry_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { entries } => entries.len(),
            NodeKind::Internal { children } => children.len(),
        }
    }
}

/// R-tree spatial index.
#[derive(Debug)]
pub struct RTree {
    nodes: Vec<Node>,
    root: usize,
    max_entries: usize,
    min_entries: usize,
    len: usize,
}

impl RTree {
    /// Create an empty tree with [`DEFAULT_MAX_ENTRIES`] entries per node.
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create an empty tree holding up to `max_entries` per node.
    ///
    /// Values below 4 are raised to 4 so every split can give both halves
    /// their minimum fill.
    pub fn with_max_entries(max_entries: usize) -> Self {
        let max_entries = max_entries.max(4);
        Self {
            nodes: vec![Node::leaf()],
            root: 0,
            max_entries,
            min_entries: max_entries / 2,
            len: 0,
        }
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::leaf());
        self.root = 0;
        self.len = 0;
    }

    /// Insert a bounding box with an opaque payload index.
    pub fn insert(&mut self, bounds: BoundingBox, data_index: usize) {
        let leaf = self.choose_leaf(bounds);
        match &mut self.nodes[leaf].kind {
            NodeKind::Leaf { entries } => entries.push(Entry { bounds, data_index }),
            NodeKind::Internal { .. } => unreachable!("choose_leaf returned an internal node"),
        }
        self.len += 1;

        if self.nodes[leaf].entry_count() > self.max_entries {
            self.split(leaf);
        } else {
            self.refresh_bounds_upward(leaf);
        }
    }

    /// Descend from the root picking, at each level, the child needing the
    /// least area enlargement; ties go to the smaller resulting area, then
    /// to the smaller existing area.
    fn choose_leaf(&self, bounds: BoundingBox) -> usize {
        let mut current = self.root;
        loop {
            let children = match &self.nodes[current].kind {
                NodeKind::Leaf { .. } => return current,
                NodeKind::Internal { children } => children,
            };

            let mut best = children[0];
            let mut best_key = self.choose_key(best, &bounds);
            for &child in &children[1..] {
                let key = self.choose_key(child, &bounds);
                if key < best_key {
                    best = child;
                    best_key = key;
                }
            }
            current = best;
        }
    }

    /// (enlargement, resulting area, existing area), compared
    /// lexicographically.
    fn choose_key(&self, node: usize, bounds: &BoundingBox) -> (f64, f64, f64) {
        let existing = self.nodes[node].bounds;
        let enlarged = existing.union(bounds).area();
        (enlarged - existing.area(), enlarged, existing.area())
    }

    /// Split an overfull node, propagating splits and bbox updates upward.
    fn split(&mut self, node: usize) {
        let parent = self.nodes[node].parent;

        let sibling = match std::mem::replace(
            &mut self.nodes[node].kind,
            NodeKind::Leaf { entries: Vec::new() },
        ) {
            NodeKind::Leaf { entries } => {
                let (keep, give) = quadratic_split(entries, self.min_entries, |e| e.bounds);
                self.nodes[node].kind = NodeKind::Leaf { entries: keep };
                self.push_node(Node {
                    bounds: BoundingBox::empty(),
                    parent,
                    kind: NodeKind::Leaf { entries: give },
                })
            }
            NodeKind::Internal { children } => {
                let items: Vec<(usize, BoundingBox)> = children
                    .into_iter()
                    .map(|c| (c, self.nodes[c].bounds))
                    .collect();
                let (keep, give) = quadratic_split(items, self.min_entries, |&(_, b)| b);
                let keep: Vec<usize> = keep.into_iter().map(|(c, _)| c).collect();
                let give: Vec<usize> = give.into_iter().map(|(c, _)| c).collect();
                self.nodes[node].kind = NodeKind::Internal { children: keep };
                let sibling = self.push_node(Node {
                    bounds: BoundingBox::empty(),
                    parent,
                    kind: NodeKind::Internal { children: give },
                });
                let moved = match &self.nodes[sibling].kind {
                    NodeKind::Internal { children } => children.clone(),
                    NodeKind::Leaf { .. } => unreachable!(),
                };
                for child in moved {
                    self.nodes[child].parent = Some(sibling);
                }
                sibling
            }
        };

        self.recompute_bounds(node);
        self.recompute_bounds(sibling);

        match parent {
            None => {
                // Root split: both halves go under a fresh root.
                let new_root = self.push_node(Node {
                    bounds: BoundingBox::empty(),
                    parent: None,
                    kind: NodeKind::Internal {
                        children: vec![node, sibling],
                    },
                });
                self.nodes[node].parent = Some(new_root);
                self.nodes[sibling].parent = Some(new_root);
                self.root = new_root;
                self.recompute_bounds(new_root);
            }
            Some(parent) => {
                match &mut self.nodes[parent].kind {
                    NodeKind::Internal { children } => children.push(sibling),
                    NodeKind::Leaf { .. } => unreachable!("leaf node has children"),
                }
                if self.nodes[parent].entry_count() > self.max_entries {
                    self.split(parent);
                } else {
                    self.refresh_bounds_upward(parent);
                }
            }
        }
    }

    fn push_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Recompute `node`'s bbox from its entries or children.
    fn recompute_bounds(&mut self, node: usize) {
        let bounds = match &self.nodes[node].kind {
            NodeKind::Leaf { entries } => entries
                .iter()
                .fold(BoundingBox::empty(), |acc, e| acc.union(&e.bounds)),
            NodeKind::Internal { children } => children
                .iter()
                .fold(BoundingBox::empty(), |acc, &c| acc.union(&self.nodes[c].bounds)),
        };
        self.nodes[node].bounds = bounds;
    }

    /// Recompute bboxes from `node` up to the root.
    fn refresh_bounds_upward(&mut self, node: usize) {
        let mut current = Some(node);
        while let Some(idx) = current {
            self.recompute_bounds(idx);
            current = self.nodes[idx].parent;
        }
    }

    /// Data indices whose stored bbox intersects `query`.
    ///
    /// Result order is unspecified.
    pub fn range_query(&self, query: &BoundingBox) -> Vec<usize> {
        let mut results = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let node = &self.nodes[node];
            if !node.bounds.intersects(query) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf { entries } => {
                    results.extend(
                        entries
                            .iter()
                            .filter(|e| e.bounds.intersects(query))
                            .map(|e| e.data_index),
                    );
                }
                NodeKind::Internal { children } => stack.extend_from_slice(children),
            }
        }
        results
    }

    /// The `k` entries nearest to `point`, by Euclidean distance from the
    /// point to each entry's bbox (zero when the point is inside).
    ///
    /// Results come back in ascending distance; equal distances break by
    /// ascending data index. Fewer than `k` results means the tree is
    /// smaller than `k`.
    pub fn nearest_neighbors(&self, point: Point, k: usize) -> Result<Vec<usize>, QueryError> {
        if k == 0 {
            return Err(QueryError::InvalidK);
        }

        // Best-first search: a min-heap keyed by distance holds both
        // unexpanded nodes and individual entries; nodes order before
        // entries at equal distance so no closer entry can be missed.
        let mut heap = BinaryHeap::new();
        heap.push(HeapItem::node(self.nodes[self.root].bounds.distance_to(point), self.root));

        let mut results = Vec::with_capacity(k.min(self.len));
        while let Some(item) = heap.pop() {
            match item.target {
                Target::Node(idx) => match &self.nodes[idx].kind {
                    NodeKind::Leaf { entries } => {
                        for entry in entries {
                            heap.push(HeapItem::entry(
                                entry.bounds.distance_to(point),
                                entry.data_index,
                            ));
                        }
                    }
                    NodeKind::Internal { children } => {
                        for &child in children {
                            heap.push(HeapItem::node(
                                self.nodes[child].bounds.distance_to(point),
                                child,
                            ));
                        }
                    }
                },
                Target::Entry(data_index) => {
                    results.push(data_index);
                    if results.len() == k {
                        break;
                    }
                }
            }
        }
        Ok(results)
    }

    /// Data indices whose bbox lies within `distance` of `point`.
    ///
    /// A range query over the point's `(±distance, ±distance)` expansion
    /// box, filtered by exact point-to-bbox distance.
    pub fn within_distance(&self, point: Point, distance: f64) -> Result<Vec<usize>, QueryError> {
        if distance < 0.0 || distance.is_nan() {
            return Err(QueryError::NegativeDistance(distance));
        }
        let query = BoundingBox::new(
            point.x - distance,
            point.y - distance,
            point.x + distance,
            point.y + distance,
        );
        let mut results = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let node = &self.nodes[node];
            if !node.bounds.intersects(&query) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf { entries } => {
                    results.extend(
                        entries
                            .iter()
                            .filter(|e| e.bounds.distance_to(point) <= distance)
                            .map(|e| e.data_index),
                    );
                }
                NodeKind::Internal { children } => stack.extend_from_slice(children),
            }
        }
        Ok(results)
    }

    /// Structural summary for display and diagnostics.
    pub fn stats(&self) -> RTreeStats {
        let mut node_count = 0;
        let mut leaf_count = 0;
        let mut stack = vec![(self.root, 1)];
        let mut height = 0;
        while let Some((idx, depth)) = stack.pop() {
            node_count += 1;
            height = height.max(depth);
            match &self.nodes[idx].kind {
                NodeKind::Leaf { .. } => leaf_count += 1,
                NodeKind::Internal { children } => {
                    stack.extend(children.iter().map(|&c| (c, depth + 1)));
                }
            }
        }
        RTreeStats {
            len: self.len,
            max_entries: self.max_entries,
            min_entries: self.min_entries,
            node_count,
            leaf_count,
            height,
        }
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        self.check_node(self.root, None);
    }

    #[cfg(test)]
    fn check_node(&self, idx: usize, parent: Option<usize>) {
        let node = &self.nodes[idx];
        assert_eq!(node.parent, parent, "parent link mismatch at node {}", idx);

        if idx != self.root {
            assert!(
                node.entry_count() >= self.min_entries,
                "non-root node {} under-full ({} < {})",
                idx,
                node.entry_count(),
                self.min_entries
            );
        }
        assert!(
            node.entry_count() <= self.max_entries,
            "node {} over-full",
            idx
        );

        match &node.kind {
            NodeKind::Leaf { entries } => {
                let expected = entries
                    .iter()
                    .fold(BoundingBox::empty(), |acc, e| acc.union(&e.bounds));
                assert_eq!(node.bounds, expected, "leaf {} bbox stale", idx);
            }
            NodeKind::Internal { children } => {
                assert!(!children.is_empty(), "internal node {} empty", idx);
                let expected = children
                    .iter()
                    .fold(BoundingBox::empty(), |acc, &c| acc.union(&self.nodes[c].bounds));
                assert_eq!(node.bounds, expected, "internal {} bbox stale", idx);
                for &child in children {
                    self.check_node(child, Some(idx));
                }
            }
        }
    }
}

impl Default for RTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Quadratic-split an overfull item list into two groups of at least
/// `min_entries` each.
///
/// Seeds are the pair wasting the most area when combined; the rest are
/// assigned one at a time to the group needing the least enlargement,
/// except when a group must take everything left to reach its minimum.
fn quadratic_split<T, F: Fn(&T) -> BoundingBox>(
    items: Vec<T>,
    min_entries: usize,
    bounds_of: F,
) -> (Vec<T>, Vec<T>) {
    debug_assert!(items.len() >= 2 * min_entries.max(1));

    // Seed pick: maximize dead area of the pairwise union.
    let mut seed_a = 0;
    let mut seed_b = 1;
    let mut worst = f64::NEG_INFINITY;
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            let bi = bounds_of(&items[i]);
            let bj = bounds_of(&items[j]);
            let dead = bi.union(&bj).area() - bi.area() - bj.area();
            if dead > worst {
                worst = dead;
                seed_a = i;
                seed_b = j;
            }
        }
    }

    let mut group_a = Vec::new();
    let mut group_b = Vec::new();
    let mut bounds_a = BoundingBox::empty();
    let mut bounds_b = BoundingBox::empty();
    let mut rest = Vec::new();

    for (i, item) in items.into_iter().enumerate() {
        if i == seed_a {
            bounds_a = bounds_of(&item);
            group_a.push(item);
        } else if i == seed_b {
            bounds_b = bounds_of(&item);
            group_b.push(item);
        } else {
            rest.push(item);
        }
    }

    while let Some(item) = rest.pop() {
        // A group short enough that it needs every remaining item gets them.
        let remaining = rest.len() + 1;
        if group_a.len() + remaining <= min_entries {
            bounds_a = bounds_a.union(&bounds_of(&item));
            group_a.push(item);
            continue;
        }
        if group_b.len() + remaining <= min_entries {
            bounds_b = bounds_b.union(&bounds_of(&item));
            group_b.push(item);
            continue;
        }

        let bounds = bounds_of(&item);
        let enl_a = bounds_a.enlargement(&bounds);
        let enl_b = bounds_b.enlargement(&bounds);
        let to_a = match enl_a.partial_cmp(&enl_b) {
            Some(Ordering::Less) => true,
            Some(Ordering::Greater) => false,
            _ => match bounds_a.area().partial_cmp(&bounds_b.area()) {
                Some(Ordering::Less) => true,
                Some(Ordering::Greater) => false,
                _ => group_a.len() <= group_b.len(),
            },
        };
        if to_a {
            bounds_a = bounds_a.union(&bounds);
            group_a.push(item);
        } else {
            bounds_b = bounds_b.union(&bounds);
            group_b.push(item);
        }
    }

    (group_a, group_b)
}

#[derive(Debug)]
enum Target {
    Node(usize),
    Entry(usize),
}

/// Min-heap item for best-first k-NN.
///
/// Ordering is (distance, node-before-entry, ascending data index), all
/// reversed so `BinaryHeap`'s max-pop yields the minimum.
#[derive(Debug)]
struct HeapItem {
    dist: f64,
    target: Target,
}

impl HeapItem {
    fn node(dist: f64, idx: usize) -> Self {
        Self {
            dist,
            target: Target::Node(idx),
        }
    }

    fn entry(dist: f64, data_index: usize) -> Self {
        Self {
            dist,
            target: Target::Entry(data_index),
        }
    }

    fn rank(&self) -> (u8, usize) {
        match self.target {
            Target::Node(idx) => (0, idx),
            Target::Entry(data_index) => (1, data_index),
        }
    }
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.rank().cmp(&self.rank()))
    }
}

/// Printable tree statistics.
#[derive(Debug, Clone, Copy)]
pub struct RTreeStats {
    pub len: usize,
    pub max_entries: usize,
    pub min_entries: usize,
    pub node_count: usize,
    pub leaf_count: usize,
    pub height: usize,
}

impl fmt::Display for RTreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "R-Tree Statistics:")?;
        writeln!(f, "  Indexed Objects: {}", self.len)?;
        writeln!(f, "  Max Entries per Node: {}", self.max_entries)?;
        writeln!(f, "  Min Entries per Node: {}", self.min_entries)?;
        writeln!(f, "  Nodes: {} ({} leaves)", self.node_count, self.leaf_count)?;
        writeln!(f, "  Height: {}", self.height)?;
        Ok(())
    }
}
