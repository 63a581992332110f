//! A 2D rigid-body physics core.
//!
//! Bodies carry a convex [`Shape`] (circle or polygon). Each [`PhysicsWorld::step`]
//! refits a dynamic bounding-volume tree, builds contact manifolds for the
//! overlapping pairs and resolves them with a warm-started sequential-impulse
//! solver.
//!
//! ```
//! use impulse2d::{Circle, PhysicsWorld, Polygon, RigidBody, Vec2};
//!
//! let mut world = PhysicsWorld::new();
//! world.add_body(RigidBody::new_static(Polygon::new_box(10.0, 0.5), Vec2::ZERO, 0.0));
//! let ball = world.add_body(RigidBody::new(Circle::new(0.5), Vec2::new(0.0, 3.0), 0.0));
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//! assert!(world.body(ball).unwrap().position().y > 0.5);
//! ```

pub mod collision;
pub mod common;
pub mod constraints;
pub mod error;
pub mod integration;
pub mod math;
pub mod objects;
pub mod shapes;
pub mod world;

// Re-export key types for easier use
pub use collision::{BodyPair, BroadphaseMode, Contact, DynamicTree, Manifold};
pub use common::Material;
pub use constraints::Constraint;
pub use error::{PhysicsError, PhysicsResult};
pub use math::{Bounds, Ray, Transform, Vec2};
pub use objects::{BodyHandle, RigidBody};
pub use shapes::{Circle, Polygon, Shape};
pub use world::{PhysicsWorld, RaycastHit, SolverConfig, WorldConfig};
