pub mod config;
pub mod physics_world;

pub use config::{SolverConfig, WorldConfig};
pub use physics_world::{PhysicsWorld, RaycastHit};
