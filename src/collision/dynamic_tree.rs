//! Dynamic bounding-volume tree used as the default broadphase.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Each body in a
//! world owns exactly one leaf whose id is stored on the body. Leaf ids stay
//! valid across insertion, removal of other leaves and refits: when a leaf is
//! paired with a newcomer a fresh branch node is allocated above it, so no
//! node ever changes role.

use std::collections::{BTreeSet, VecDeque};

use super::broadphase::BodyPair;
use crate::math::{Bounds, Ray};
use crate::objects::{BodyHandle, BodyMap};
use crate::shapes::RayIntersection;

/// Margin added around a body's tight bounds when it is (re)inserted.
pub const DEFAULT_MARGIN: f32 = 0.2;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NodeKind {
    Leaf { body: BodyHandle },
    Branch { children: [NodeId; 2] },
    Free,
}

#[derive(Debug, Clone)]
struct Node {
    /// Fat bounds for leaves, union of the children for branches.
    bounds: Bounds,
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// Hierarchy of fattened bounding boxes over all bodies of a world.
#[derive(Debug, Clone)]
pub struct DynamicTree {
    nodes: Vec<Node>,
    free_list: Vec<NodeId>,
    root: Option<NodeId>,
    margin: f32,
    leaf_count: usize,
}

impl Default for DynamicTree {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN)
    }
}

impl DynamicTree {
    pub fn new(margin: f32) -> Self {
        Self {
            nodes: Vec::new(),
            free_list: Vec::new(),
            root: None,
            margin,
            leaf_count: 0,
        }
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Live nodes, leaves and branches together.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Fat bounds stored for a leaf.
    pub fn fat_bounds(&self, id: NodeId) -> Option<Bounds> {
        match self.nodes.get(id.index()) {
            Some(node) if matches!(node.kind, NodeKind::Leaf { .. }) => Some(node.bounds),
            _ => None,
        }
    }

    /// Adds a leaf for `body` with its tight bounds and returns the leaf id.
    pub fn insert(&mut self, body: BodyHandle, tight: Bounds) -> NodeId {
        let leaf = self.allocate(Node {
            bounds: tight.fatten(self.margin),
            parent: None,
            kind: NodeKind::Leaf { body },
        });
        self.insert_leaf(leaf);
        self.leaf_count += 1;
        leaf
    }

    /// Removes a leaf. Returns the body it referred to, or `None` if `id` is not a leaf.
    pub fn remove(&mut self, id: NodeId) -> Option<BodyHandle> {
        let body = match self.nodes.get(id.index())?.kind {
            NodeKind::Leaf { body } => body,
            _ => return None,
        };
        self.remove_leaf(id);
        self.free(id);
        self.leaf_count -= 1;
        Some(body)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.root = None;
        self.leaf_count = 0;
    }

    /// Re-inserts every leaf whose fat bounds no longer contain its body's tight
    /// bounds. Returns how many leaves moved.
    pub fn refit(&mut self, bodies: &BodyMap) -> usize {
        let stale: Vec<(NodeId, Bounds)> = bodies
            .values()
            .filter_map(|body| {
                let id = body.proxy?;
                let fat = self.fat_bounds(id)?;
                let tight = body.bounds();
                (!fat.contains(&tight)).then_some((id, tight))
            })
            .collect();

        for &(id, tight) in &stale {
            self.remove_leaf(id);
            self.nodes[id.index()].bounds = tight.fatten(self.margin);
            self.insert_leaf(id);
        }
        stale.len()
    }

    /// Visits every leaf whose fat bounds overlap `bounds`, breadth first.
    /// The callback returns `false` to stop early.
    pub fn query<F>(&self, bounds: &Bounds, mut callback: F)
    where
        F: FnMut(NodeId, BodyHandle) -> bool,
    {
        let mut queue: VecDeque<NodeId> = self.root.into_iter().collect();
        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id.index()];
            if !node.bounds.overlaps(bounds) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { body } => {
                    if !callback(id, body) {
                        return;
                    }
                }
                NodeKind::Branch { children } => queue.extend(children),
                NodeKind::Free => {}
            }
        }
    }

    /// Bodies whose fat leaf overlaps `bounds`.
    pub fn query_bounds(&self, bounds: &Bounds) -> Vec<BodyHandle> {
        let mut found = Vec::new();
        self.query(bounds, |_, body| {
            found.push(body);
            true
        });
        found
    }

    /// Live pair set: every body's tight bounds queried against the tree.
    pub fn compute_pairs(&self, bodies: &BodyMap) -> BTreeSet<BodyPair> {
        let mut pairs = BTreeSet::new();
        for (handle, body) in bodies {
            self.query(&body.bounds(), |_, other| {
                if other != handle {
                    pairs.insert(BodyPair::new(handle, other));
                }
                true
            });
        }
        pairs
    }

    /// Nearest exact shape hit along the ray within `max_distance`.
    pub fn raycast(&self, ray: &Ray, max_distance: f32, bodies: &BodyMap) -> Option<(BodyHandle, RayIntersection)> {
        let mut best: Option<(BodyHandle, RayIntersection)> = None;
        let mut queue: VecDeque<NodeId> = self.root.into_iter().collect();

        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id.index()];
            if !node.bounds.raycast(ray, max_distance) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { body: handle } => {
                    let Some(body) = bodies.get(handle) else {
                        continue;
                    };
                    if let Some(hit) = body.shape().raycast(body.transform(), ray, max_distance) {
                        if best.map_or(true, |(_, b)| hit.distance < b.distance) {
                            best = Some((handle, hit));
                        }
                    }
                }
                NodeKind::Branch { children } => queue.extend(children),
                NodeKind::Free => {}
            }
        }
        best
    }

    /// Levels from the root to the deepest leaf. An empty tree has height 0.
    pub fn height(&self) -> usize {
        fn depth(tree: &DynamicTree, id: NodeId) -> usize {
            match tree.nodes[id.index()].kind {
                NodeKind::Branch { children: [a, b] } => 1 + depth(tree, a).max(depth(tree, b)),
                _ => 1,
            }
        }
        self.root.map_or(0, |root| depth(self, root))
    }

    /// Bounds of every live node with its depth (root = 1), level by level.
    pub fn nodes_for_debug(&self) -> Vec<(Bounds, usize)> {
        let mut out = Vec::with_capacity(self.node_count());
        let mut queue: VecDeque<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((id, depth)) = queue.pop_front() {
            let node = &self.nodes[id.index()];
            out.push((node.bounds, depth));
            if let NodeKind::Branch { children } = node.kind {
                queue.extend(children.map(|c| (c, depth + 1)));
            }
        }
        out
    }

    /// Checks the structural invariants against the body store.
    ///
    /// Every branch must hold exactly the union of its children, parent links
    /// must agree with child links, every leaf must point at a body that points
    /// back at it, and every leaf's fat bounds must contain its body's bounds.
    pub fn validate(&self, bodies: &BodyMap) -> Result<(), String> {
        let Some(root) = self.root else {
            return if self.leaf_count == 0 {
                Ok(())
            } else {
                Err(format!("empty tree reports {} leaves", self.leaf_count))
            };
        };
        if self.nodes[root.index()].parent.is_some() {
            return Err("root has a parent".to_string());
        }

        let mut leaves = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            match node.kind {
                NodeKind::Free => return Err(format!("{id:?} is reachable but free")),
                NodeKind::Branch { children } => {
                    for child in children {
                        if self.nodes[child.index()].parent != Some(id) {
                            return Err(format!("{child:?} does not point back to parent {id:?}"));
                        }
                    }
                    let union = self.nodes[children[0].index()]
                        .bounds
                        .union(&self.nodes[children[1].index()].bounds);
                    if union != node.bounds {
                        return Err(format!("{id:?} bounds differ from the union of its children"));
                    }
                    stack.extend(children);
                }
                NodeKind::Leaf { body } => {
                    leaves += 1;
                    let Some(b) = bodies.get(body) else {
                        return Err(format!("{id:?} refers to a removed body"));
                    };
                    if b.proxy != Some(id) {
                        return Err(format!("body of {id:?} points at {:?}", b.proxy));
                    }
                    if !node.bounds.contains(&b.bounds()) {
                        return Err(format!("{id:?} fat bounds do not contain the body"));
                    }
                }
            }
        }

        if leaves != self.leaf_count {
            return Err(format!("found {leaves} leaves, expected {}", self.leaf_count));
        }
        Ok(())
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        match self.free_list.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                id
            }
            None => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(node);
                id
            }
        }
    }

    fn free(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.index()];
        node.kind = NodeKind::Free;
        node.parent = None;
        self.free_list.push(id);
    }

    /// Links a detached leaf into the tree next to the sibling whose bounds
    /// grow least.
    fn insert_leaf(&mut self, leaf: NodeId) {
        let Some(root) = self.root else {
            self.nodes[leaf.index()].parent = None;
            self.root = Some(leaf);
            return;
        };

        let leaf_bounds = self.nodes[leaf.index()].bounds;
        let growth = |tree: &Self, id: NodeId| {
            let bounds = tree.nodes[id.index()].bounds;
            bounds.union(&leaf_bounds).volume() - bounds.volume()
        };

        let mut sibling = root;
        while let NodeKind::Branch { children: [c0, c1] } = self.nodes[sibling.index()].kind {
            sibling = if growth(self, c0) < growth(self, c1) { c0 } else { c1 };
        }

        let old_parent = self.nodes[sibling.index()].parent;
        let branch = self.allocate(Node {
            bounds: leaf_bounds.union(&self.nodes[sibling.index()].bounds),
            parent: old_parent,
            kind: NodeKind::Branch { children: [leaf, sibling] },
        });
        self.nodes[leaf.index()].parent = Some(branch);
        self.nodes[sibling.index()].parent = Some(branch);

        match old_parent {
            Some(parent) => {
                self.replace_child(parent, sibling, branch);
                self.refresh_ancestors(Some(parent));
            }
            None => self.root = Some(branch),
        }
    }

    /// Unlinks a leaf, promoting its sibling into the parent's place. The leaf
    /// itself stays allocated.
    fn remove_leaf(&mut self, leaf: NodeId) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }
        let Some(parent) = self.nodes[leaf.index()].parent else {
            return;
        };

        let sibling = match self.nodes[parent.index()].kind {
            NodeKind::Branch { children: [a, b] } => {
                if a == leaf {
                    b
                } else {
                    a
                }
            }
            _ => return,
        };

        let grandparent = self.nodes[parent.index()].parent;
        self.nodes[sibling.index()].parent = grandparent;
        match grandparent {
            Some(g) => {
                self.replace_child(g, parent, sibling);
                self.refresh_ancestors(Some(g));
            }
            None => self.root = Some(sibling),
        }

        self.free(parent);
        self.nodes[leaf.index()].parent = None;
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if let NodeKind::Branch { children } = &mut self.nodes[parent.index()].kind {
            for child in children.iter_mut() {
                if *child == old {
                    *child = new;
                }
            }
        }
    }

    fn refresh_ancestors(&mut self, mut current: Option<NodeId>) {
        while let Some(id) = current {
            if let NodeKind::Branch { children: [a, b] } = self.nodes[id.index()].kind {
                let union = self.nodes[a.index()].bounds.union(&self.nodes[b.index()].bounds);
                self.nodes[id.index()].bounds = union;
            }
            current = self.nodes[id.index()].parent;
        }
    }
}
