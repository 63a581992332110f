//! Candidate pair generation.
//!
//! The dynamic tree is the default pair finder. Sweep-and-prune and the
//! all-pairs brute force produce the same kind of live pair set and can be
//! swapped in to cross-check the tree.

use std::collections::BTreeSet;

use crate::objects::{BodyHandle, BodyMap};

/// Unordered pair of bodies, stored with the smaller handle first so that
/// `(a, b)` and `(b, a)` compare and hash identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyPair {
    a: BodyHandle,
    b: BodyHandle,
}

impl BodyPair {
    pub fn new(x: BodyHandle, y: BodyHandle) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    pub fn a(&self) -> BodyHandle {
        self.a
    }

    pub fn b(&self) -> BodyHandle {
        self.b
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.a == handle || self.b == handle
    }
}

/// How the world finds candidate pairs each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BroadphaseMode {
    /// Query each body against the dynamic bounding-volume tree.
    #[default]
    DynamicTree,
    /// Sort by bounds on the x axis and sweep.
    SweepAndPrune,
    /// Every pair of bodies, without any bounds test. Debug baseline.
    BruteForce,
}

/// Every unordered pair of distinct bodies.
pub fn brute_force_pairs(bodies: &BodyMap) -> BTreeSet<BodyPair> {
    let handles: Vec<BodyHandle> = bodies.keys().collect();
    let mut pairs = BTreeSet::new();
    for (i, &a) in handles.iter().enumerate() {
        for &b in &handles[i + 1..] {
            pairs.insert(BodyPair::new(a, b));
        }
    }
    pairs
}

/// Pairs whose tight bounds overlap, found by sorting on min x and sweeping
/// with an active list.
pub fn sweep_and_prune_pairs(bodies: &BodyMap) -> BTreeSet<BodyPair> {
    let mut sorted: Vec<_> = bodies.iter().map(|(handle, body)| (handle, body.bounds())).collect();
    sorted.sort_by(|(_, a), (_, b)| a.min.x.total_cmp(&b.min.x));

    let mut pairs = BTreeSet::new();
    let mut active: Vec<usize> = Vec::new();
    for (i, (handle, bounds)) in sorted.iter().enumerate() {
        // Drop everything that ends before this one starts
        active.retain(|&j| sorted[j].1.max.x >= bounds.min.x);
        for &j in &active {
            let (other, other_bounds) = sorted[j];
            if other_bounds.overlaps(bounds) {
                pairs.insert(BodyPair::new(*handle, other));
            }
        }
        active.push(i);
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::objects::RigidBody;
    use crate::shapes::{Circle, Polygon};

    fn scene() -> (BodyMap, Vec<BodyHandle>) {
        let mut bodies = BodyMap::with_key();
        let handles = vec![
            bodies.insert(RigidBody::new(Polygon::new_box(0.5, 0.5), Vec2::ZERO, 0.0)),
            bodies.insert(RigidBody::new(Circle::new(0.5), Vec2::new(0.9, 0.2), 0.0)),
            bodies.insert(RigidBody::new(Circle::new(0.5), Vec2::new(0.9, 5.0), 0.0)),
            bodies.insert(RigidBody::new(Polygon::new_box(10.0, 0.5), Vec2::new(0.0, -1.0), 0.0)),
            bodies.insert(RigidBody::new(Circle::new(0.5), Vec2::new(30.0, 0.0), 0.0)),
        ];
        (bodies, handles)
    }

    #[test]
    fn test_body_pair_is_unordered() {
        let (_, h) = scene();
        assert_eq!(BodyPair::new(h[0], h[1]), BodyPair::new(h[1], h[0]));
        let pair = BodyPair::new(h[3], h[2]);
        assert!(pair.a() < pair.b());
        assert!(pair.contains(h[2]));
        assert!(!pair.contains(h[0]));
    }

    #[test]
    fn test_brute_force_is_every_pair() {
        let (bodies, _) = scene();
        assert_eq!(brute_force_pairs(&bodies).len(), 5 * 4 / 2);
    }

    #[test]
    fn test_sweep_and_prune_matches_overlap_test() {
        let (bodies, h) = scene();
        let pairs = sweep_and_prune_pairs(&bodies);

        let mut expected = BTreeSet::new();
        for (i, &a) in h.iter().enumerate() {
            for &b in &h[i + 1..] {
                if bodies[a].bounds().overlaps(&bodies[b].bounds()) {
                    expected.insert(BodyPair::new(a, b));
                }
            }
        }
        assert_eq!(pairs, expected);
        assert!(pairs.contains(&BodyPair::new(h[0], h[1])));
        assert!(pairs.contains(&BodyPair::new(h[0], h[3])));
        assert!(!pairs.contains(&BodyPair::new(h[1], h[2])));
        assert!(!pairs.iter().any(|p| p.contains(h[4])));
    }
}
