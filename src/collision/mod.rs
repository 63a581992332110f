pub mod broadphase;
pub mod dynamic_tree;
pub mod manifold;
pub mod narrowphase;

// Re-export key types
pub use broadphase::{brute_force_pairs, sweep_and_prune_pairs, BodyPair, BroadphaseMode};
pub use dynamic_tree::{DynamicTree, NodeId};
pub use manifold::{Contact, Manifold};
pub use narrowphase::{collide, ContactGeometry, ContactPoint};
