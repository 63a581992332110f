use std::hash::{Hash, Hasher};

use super::broadphase::BodyPair;
use super::narrowphase::ContactGeometry;
use crate::math::vec2::Vec2;
use crate::objects::BodyHandle;

/// A single contact point together with its solver state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Contact {
    /// Contact position in world coordinates.
    pub position: Vec2,
    /// Overlap along the manifold normal.
    pub penetration: f32,
    /// Accumulated normal impulse, never negative.
    pub normal_impulse: f32,
    /// Accumulated friction impulse along the tangent.
    pub tangent_impulse: f32,
    pub normal_mass: f32,
    pub tangent_mass: f32,
    /// Separating velocity injected to remove penetration.
    pub bias: f32,
}

/// Persistent contact record for one pair of bodies.
///
/// A manifold lives as long as the broadphase reports the pair. Narrow-phase
/// misses only zero `contact_count`; the contact slots keep their accumulated
/// impulses so they can warm start the solver once the shapes touch again.
///
/// Equality and hashing ignore the order of the two bodies.
#[derive(Debug, Clone)]
pub struct Manifold {
    body_a: BodyHandle,
    body_b: BodyHandle,
    /// Points from body A toward body B.
    pub normal: Vec2,
    contacts: [Contact; 2],
    contact_count: usize,
}

impl Manifold {
    pub fn new(body_a: BodyHandle, body_b: BodyHandle) -> Self {
        Self {
            body_a,
            body_b,
            normal: Vec2::ZERO,
            contacts: [Contact::default(); 2],
            contact_count: 0,
        }
    }

    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    pub fn pair(&self) -> BodyPair {
        BodyPair::new(self.body_a, self.body_b)
    }

    pub fn contact_count(&self) -> usize {
        self.contact_count
    }

    pub fn is_touching(&self) -> bool {
        self.contact_count > 0
    }

    /// Active contacts.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts[..self.contact_count]
    }

    pub(crate) fn contacts_mut(&mut self) -> &mut [Contact] {
        &mut self.contacts[..self.contact_count]
    }

    /// Replaces contact geometry with the latest narrow-phase result.
    ///
    /// New points inherit the accumulated impulses of the slot with the same
    /// index. With `warm_start` off every slot starts from zero instead.
    pub fn update(&mut self, geometry: Option<&ContactGeometry>, warm_start: bool) {
        let Some(geometry) = geometry else {
            self.contact_count = 0;
            return;
        };

        self.normal = geometry.normal;
        for (slot, point) in self.contacts.iter_mut().zip(geometry.points()) {
            let (normal_impulse, tangent_impulse) = if warm_start {
                (slot.normal_impulse, slot.tangent_impulse)
            } else {
                (0.0, 0.0)
            };
            *slot = Contact {
                position: point.position,
                penetration: point.penetration,
                normal_impulse,
                tangent_impulse,
                ..Contact::default()
            };
        }
        self.contact_count = geometry.count();
    }
}

impl PartialEq for Manifold {
    fn eq(&self, other: &Self) -> bool {
        self.pair() == other.pair()
    }
}

impl Eq for Manifold {}

impl Hash for Manifold {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pair().hash(state);
    }
}
