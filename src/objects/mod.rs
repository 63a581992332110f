pub mod rigid_body;

pub use rigid_body::RigidBody;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable identifier of a body inside a [`crate::PhysicsWorld`].
    pub struct BodyHandle;
}

/// Body store owned by the world. Manifolds and tree leaves refer into it by handle.
pub type BodyMap = SlotMap<BodyHandle, RigidBody>;
