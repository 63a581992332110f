use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use super::config::{SolverConfig, WorldConfig};
use crate::collision::{
    brute_force_pairs, collide, sweep_and_prune_pairs, BodyPair, BroadphaseMode, DynamicTree, Manifold,
};
use crate::constraints::Constraint;
use crate::error::{PhysicsError, PhysicsResult};
use crate::integration::{integrate_forces, integrate_velocity};
use crate::math::{Bounds, Ray, Vec2};
use crate::objects::{BodyHandle, BodyMap, RigidBody};

/// Nearest body hit by a world raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub body: BodyHandle,
    pub point: Vec2,
    pub normal: Vec2,
    pub distance: f32,
}

/// Owns the bodies, the broadphase tree and the manifold set, and advances them
/// one step at a time.
pub struct PhysicsWorld {
    bodies: BodyMap,
    // Ordered so the solver visits contacts in the same order whatever pair finder is active
    manifolds: BTreeMap<BodyPair, Manifold>,
    tree: DynamicTree,
    config: WorldConfig,
}

impl PhysicsWorld {
    /// Creates a new, empty physics world with default settings.
    pub fn new() -> Self {
        Self::from_valid_config(WorldConfig::default())
    }

    /// Creates an empty world after validating `config`.
    pub fn with_config(config: WorldConfig) -> PhysicsResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: WorldConfig) -> Self {
        Self {
            bodies: BodyMap::with_key(),
            manifolds: BTreeMap::new(),
            tree: DynamicTree::new(config.aabb_margin),
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    pub fn time_scale(&self) -> f32 {
        self.config.time_scale
    }

    /// Scales every subsequent `dt`. Negative or non-finite values are ignored.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        if !time_scale.is_finite() || time_scale < 0.0 {
            warn!(time_scale, "Ignoring invalid time scale");
            return;
        }
        self.config.time_scale = time_scale;
    }

    pub fn broadphase(&self) -> BroadphaseMode {
        self.config.broadphase
    }

    pub fn set_broadphase(&mut self, mode: BroadphaseMode) {
        debug!(?mode, "Broadphase changed");
        self.config.broadphase = mode;
    }

    /// Debug toggle: pair every body with every other body instead of using the tree.
    pub fn set_brute_force(&mut self, enabled: bool) {
        let mode = if enabled {
            BroadphaseMode::BruteForce
        } else {
            BroadphaseMode::DynamicTree
        };
        self.set_broadphase(mode);
    }

    pub fn is_brute_force(&self) -> bool {
        self.config.broadphase == BroadphaseMode::BruteForce
    }

    pub fn set_solver_config(&mut self, solver: SolverConfig) -> PhysicsResult<()> {
        solver.validate()?;
        debug!(?solver, "Solver configuration changed");
        self.config.solver = solver;
        Ok(())
    }

    /// Adds a rigid body to the world and returns its handle.
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let handle = self.bodies.insert(body);
        if let Some(body) = self.bodies.get_mut(handle) {
            body.update_bounds();
            body.proxy = Some(self.tree.insert(handle, body.bounds()));
        }
        debug!(?handle, bodies = self.bodies.len(), "Body added");
        handle
    }

    /// Removes a body together with its broadphase leaf and every manifold it
    /// takes part in.
    pub fn try_remove_body(&mut self, handle: BodyHandle) -> PhysicsResult<RigidBody> {
        let mut body = self.bodies.remove(handle).ok_or(PhysicsError::UnknownBody)?;
        if let Some(proxy) = body.proxy.take() {
            self.tree.remove(proxy);
        }
        self.manifolds.retain(|pair, _| !pair.contains(handle));
        debug!(?handle, bodies = self.bodies.len(), "Body removed");
        Ok(body)
    }

    /// Like [`Self::try_remove_body`], logging a warning for a stale handle.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        match self.try_remove_body(handle) {
            Ok(body) => Some(body),
            Err(err) => {
                warn!(?handle, %err, "Tried to remove a body that is not in the world");
                None
            }
        }
    }

    /// Removes every body and manifold.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.manifolds.clear();
        self.tree.clear();
        debug!("World cleared");
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn manifold(&self, a: BodyHandle, b: BodyHandle) -> Option<&Manifold> {
        self.manifolds.get(&BodyPair::new(a, b))
    }

    pub fn manifolds(&self) -> impl Iterator<Item = &Manifold> {
        self.manifolds.values()
    }

    pub fn manifold_count(&self) -> usize {
        self.manifolds.len()
    }

    /// Contact points across all manifolds as of the last step.
    pub fn contact_count(&self) -> usize {
        self.manifolds.values().map(Manifold::contact_count).sum()
    }

    pub fn tree(&self) -> &DynamicTree {
        &self.tree
    }

    /// Checks the broadphase tree against the body store. Bodies moved through
    /// [`Self::body_mut`] are only picked up by the next step.
    pub fn validate_tree(&self) -> Result<(), String> {
        self.tree.validate(&self.bodies)
    }

    /// Bodies whose broadphase leaf overlaps `bounds`.
    pub fn query_bounds(&self, bounds: &Bounds) -> Vec<BodyHandle> {
        self.tree.query_bounds(bounds)
    }

    /// Nearest body along the ray within `max_distance`, against the poses the
    /// last step ended with.
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        self.tree
            .raycast(ray, max_distance, &self.bodies)
            .map(|(body, hit)| RaycastHit {
                body,
                point: hit.point,
                normal: hit.normal,
                distance: hit.distance,
            })
    }

    /// Advances the simulation by one time step `dt`, scaled by the time scale.
    ///
    /// A non-finite or non-positive `dt` leaves the world untouched.
    pub fn step(&mut self, dt: f32) {
        if let Err(err) = self.try_step(dt) {
            warn!(%err, "Ignoring step");
        }
    }

    /// Same as [`Self::step`] but reports an invalid `dt` to the caller.
    pub fn try_step(&mut self, dt: f32) -> PhysicsResult<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PhysicsError::InvalidTimestep(dt));
        }
        let dt = dt * self.config.time_scale;
        if dt <= 0.0 {
            return Ok(());
        }
        let inv_dt = 1.0 / dt;

        // 1. Broadphase
        for body in self.bodies.values_mut() {
            body.update_bounds();
        }
        let refitted = self.tree.refit(&self.bodies);
        self.update_pairs();

        // 2. Narrow phase
        let warm_start = self.config.solver.warm_starting;
        for manifold in self.manifolds.values_mut() {
            let geometry = match (self.bodies.get(manifold.body_a()), self.bodies.get(manifold.body_b())) {
                (Some(a), Some(b)) => collide(a.shape(), a.transform(), b.shape(), b.transform()),
                _ => None,
            };
            manifold.update(geometry.as_ref(), warm_start);
        }

        // 3. Forces
        let gravity = self.config.gravity;
        for body in self.bodies.values_mut() {
            integrate_forces(body, gravity, dt);
        }

        // 4. Contacts
        let solver = self.config.solver;
        for manifold in self.manifolds.values_mut().filter(|m| m.is_touching()) {
            manifold.pre_step(&mut self.bodies, inv_dt, &solver);
        }
        for _ in 0..solver.iterations {
            for manifold in self.manifolds.values_mut().filter(|m| m.is_touching()) {
                manifold.apply_impulse(&mut self.bodies);
            }
        }

        // 5. Positions
        for body in self.bodies.values_mut() {
            integrate_velocity(body, dt);
            body.update_bounds();
        }
        // Keep raycasts and region queries in step with the new poses
        let refitted = refitted + self.tree.refit(&self.bodies);

        trace!(
            bodies = self.bodies.len(),
            manifolds = self.manifolds.len(),
            contacts = self.contact_count(),
            refitted,
            "Step complete"
        );
        Ok(())
    }

    /// Creates manifolds for new live pairs and drops those no longer reported.
    fn update_pairs(&mut self) {
        let live = match self.config.broadphase {
            BroadphaseMode::DynamicTree => self.tree.compute_pairs(&self.bodies),
            BroadphaseMode::SweepAndPrune => sweep_and_prune_pairs(&self.bodies),
            BroadphaseMode::BruteForce => brute_force_pairs(&self.bodies),
        };

        self.manifolds.retain(|pair, _| live.contains(pair));
        for pair in live {
            self.manifolds
                .entry(pair)
                .or_insert_with(|| Manifold::new(pair.a(), pair.b()));
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
