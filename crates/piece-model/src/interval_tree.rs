use std::collections::BTreeMap;

use crate::Range;

/// Implemented by anything that occupies a tick interval.
///
/// This is the seam between the index and the musical types: notes, meta
/// objects, and columns all expose their range through it.
pub trait Ranged {
    fn range(&self) -> Range;
}

impl Ranged for Range {
    fn range(&self) -> Range {
        *self
    }
}

/// Interval-indexed tree over range-bearing elements.
///
/// Built once from a finite collection and read-only afterwards, so it is
/// safe to query concurrently. Nodes are keyed by exact range (low, then
/// high) and created by recursive median split over the sorted distinct
/// ranges, which balances the tree without a rebalancing discipline.
/// Every node carries the maximum high endpoint in its subtree; queries use
/// it to prune whole branches.
///
/// The tree is a multiset index: elements with duplicate ranges, including
/// fully identical elements, are all retained and all returned.
///
/// Construction is `O(n log n)`, a window query `O(log n + k)` for `k`
/// matches.
#[derive(Debug, Clone)]
pub struct IntervalTree<T> {
    root: Option<Box<Node<T>>>,
    len_elements: usize,
    len_nodes: usize,
}

#[derive(Debug, Clone)]
struct Node<T> {
    range: Range,
    /// max high endpoint among this node and both subtrees
    max_high: u32,
    /// elements sharing this node's exact range
    elements: Vec<T>,
    left: Option<Box<Node<T>>>,
    right: Option<Box<Node<T>>>,
}

impl<T: Ranged> IntervalTree<T> {
    pub fn new(elements: Vec<T>) -> Self {
        let mut groups: BTreeMap<Range, Vec<T>> = BTreeMap::new();
        for elem in elements {
            groups.entry(elem.range()).or_default().push(elem);
        }

        let len_nodes = groups.len();
        let len_elements = groups.values().map(Vec::len).sum();
        let mut groups: Vec<(Range, Vec<T>)> = groups.into_iter().collect();
        let root = build(&mut groups);

        Self {
            root,
            len_elements,
            len_nodes,
        }
    }
}

fn build<T>(groups: &mut [(Range, Vec<T>)]) -> Option<Box<Node<T>>> {
    if groups.is_empty() {
        return None;
    }

    let mid = groups.len() / 2;
    let (left_half, rest) = groups.split_at_mut(mid);
    let ((range, elements), right_half) = rest.split_first_mut()?;

    let left = build(left_half);
    let right = build(right_half);

    let mut max_high = range.high();
    if let Some(node) = &left {
        max_high = max_high.max(node.max_high);
    }
    if let Some(node) = &right {
        max_high = max_high.max(node.max_high);
    }

    Some(Box::new(Node {
        range: *range,
        max_high,
        elements: std::mem::take(elements),
        left,
        right,
    }))
}

impl<T> IntervalTree<T> {
    /// All elements whose range overlaps `window`, in range order.
    pub fn query(&self, window: Range) -> Vec<&T> {
        let mut matches = Vec::new();
        if let Some(root) = &self.root {
            query_window(root, window, &mut matches);
        }
        matches
    }

    /// All elements whose range contains `tick`, in range order.
    pub fn query_tick(&self, tick: u32) -> Vec<&T> {
        let mut matches = Vec::new();
        if let Some(root) = &self.root {
            query_tick(root, tick, &mut matches);
        }
        matches
    }

    /// In-order traversal of every element.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let mut out = Vec::with_capacity(self.len_elements);
        in_order(&self.root, &mut out);
        out.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Total elements stored across all nodes.
    pub fn len_elements(&self) -> usize {
        self.len_elements
    }

    /// Distinct ranges, i.e. node count.
    pub fn len_nodes(&self) -> usize {
        self.len_nodes
    }

    /// Low endpoint of the earliest range.
    pub fn first_tick(&self) -> Option<u32> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(node.range.low())
    }

    /// The greatest high endpoint anywhere in the tree. Not necessarily the
    /// high of the last-starting range: a piece's final note can start and
    /// stop while an earlier note still sounds.
    pub fn last_tick(&self) -> Option<u32> {
        self.root.as_deref().map(|root| root.max_high)
    }

    /// Verify the augmentation on every node. Construction is the only
    /// writer, so this only needs to run in tests.
    #[cfg(test)]
    fn check_max_invariant(&self) -> bool {
        fn check<T>(node: &Node<T>) -> Option<u32> {
            let mut expected = node.range.high();
            if let Some(left) = node.left.as_deref() {
                expected = expected.max(check(left)?);
            }
            if let Some(right) = node.right.as_deref() {
                expected = expected.max(check(right)?);
            }
            (expected == node.max_high).then_some(expected)
        }
        match self.root.as_deref() {
            Some(root) => check(root).is_some(),
            None => true,
        }
    }
}

fn query_window<'a, T>(node: &'a Node<T>, window: Range, out: &mut Vec<&'a T>) {
    if let Some(left) = node.left.as_deref() {
        if window.low() <= left.max_high {
            query_window(left, window, out);
        }
    }
    if window.overlaps(node.range) {
        out.extend(node.elements.iter());
    }
    if let Some(right) = node.right.as_deref() {
        if node.range.low() <= window.high() {
            query_window(right, window, out);
        }
    }
}

fn query_tick<'a, T>(node: &'a Node<T>, tick: u32, out: &mut Vec<&'a T>) {
    if let Some(left) = node.left.as_deref() {
        if tick <= left.max_high {
            query_tick(left, tick, out);
        }
    }
    if node.range.contains_tick(tick) {
        out.extend(node.elements.iter());
    }
    if let Some(right) = node.right.as_deref() {
        if tick >= node.range.low() {
            query_tick(right, tick, out);
        }
    }
}

fn in_order<'a, T>(node: &'a Option<Box<Node<T>>>, out: &mut Vec<&'a T>) {
    if let Some(node) = node.as_deref() {
        in_order(&node.left, out);
        out.extend(node.elements.iter());
        in_order(&node.right, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn r(low: u32, high: u32) -> Range {
        Range::new(low, high).unwrap()
    }

    /// The nine ranges used throughout; two share a low endpoint ladder.
    fn fixture() -> Vec<Range> {
        vec![
            r(5, 30),
            r(7, 20),
            r(10, 15),
            r(10, 17),
            r(10, 20),
            r(10, 22),
            r(10, 25),
            r(12, 30),
            r(15, 20),
        ]
    }

    #[test]
    fn construction_with_distinct_ranges() {
        let tree = IntervalTree::new(fixture());
        assert_eq!(tree.len_nodes(), 9);
        assert_eq!(tree.len_elements(), 9);
        assert!(tree.check_max_invariant());

        let in_order: Vec<Range> = tree.iter().copied().collect();
        let mut sorted = fixture();
        sorted.sort();
        assert_eq!(in_order, sorted);
    }

    #[test]
    fn duplicate_ranges_share_a_node() {
        let mut elements = fixture();
        elements.extend(fixture());
        let tree = IntervalTree::new(elements);
        // multiset: every element retained, node per distinct range
        assert_eq!(tree.len_nodes(), 9);
        assert_eq!(tree.len_elements(), 18);
        assert!(tree.check_max_invariant());

        let hits = tree.query(r(10, 15));
        assert_eq!(hits.iter().filter(|range| ***range == r(10, 15)).count(), 2);
    }

    #[test]
    fn window_query_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let ranges: Vec<Range> = (0..300)
            .map(|_| {
                let low = rng.gen_range(0..4000);
                let len = rng.gen_range(1..600);
                r(low, low + len)
            })
            .collect();
        let tree = IntervalTree::new(ranges.clone());
        assert!(tree.check_max_invariant());

        for _ in 0..100 {
            let low = rng.gen_range(0..4400);
            let len = rng.gen_range(1..500);
            let window = r(low, low + len);

            let mut expected: Vec<Range> = ranges
                .iter()
                .filter(|range| range.overlaps(window))
                .copied()
                .collect();
            expected.sort();

            let mut actual: Vec<Range> = tree.query(window).into_iter().copied().collect();
            actual.sort();

            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn tick_query_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(0xbeef);
        let ranges: Vec<Range> = (0..200)
            .map(|_| {
                let low = rng.gen_range(0..2000);
                let len = rng.gen_range(1..300);
                r(low, low + len)
            })
            .collect();
        let tree = IntervalTree::new(ranges.clone());

        for _ in 0..100 {
            let tick = rng.gen_range(0..2500);

            let mut expected: Vec<Range> = ranges
                .iter()
                .filter(|range| range.contains_tick(tick))
                .copied()
                .collect();
            expected.sort();

            let mut actual: Vec<Range> = tree.query_tick(tick).into_iter().copied().collect();
            actual.sort();

            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn empty_tree() {
        let tree: IntervalTree<Range> = IntervalTree::new(Vec::new());
        assert!(tree.is_empty());
        assert!(tree.query(r(0, 100)).is_empty());
        assert_eq!(tree.first_tick(), None);
        assert_eq!(tree.last_tick(), None);
    }

    #[test]
    fn first_and_last_ticks() {
        let tree = IntervalTree::new(fixture());
        assert_eq!(tree.first_tick(), Some(5));
        // [5,30] outlives the last-starting range [15,20]
        assert_eq!(tree.last_tick(), Some(30));
    }

    #[test]
    fn query_misses_return_nothing() {
        let tree = IntervalTree::new(fixture());
        assert!(tree.query(r(31, 40)).is_empty());
        assert!(tree.query_tick(4).is_empty());
        assert!(tree.query_tick(31).is_empty());
    }
}
