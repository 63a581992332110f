use std::collections::HashSet;

use approx::assert_abs_diff_eq;
use impulse2d::{
    BodyHandle, BroadphaseMode, Circle, PhysicsWorld, Polygon, Ray, RigidBody, SolverConfig, Vec2, WorldConfig,
};

const DT: f32 = 1.0 / 60.0;

fn run(world: &mut PhysicsWorld, steps: usize) {
    for _ in 0..steps {
        world.step(DT);
    }
}

fn world_with_floor(config: WorldConfig) -> (PhysicsWorld, BodyHandle) {
    let mut world = PhysicsWorld::with_config(config).unwrap();
    let floor = world.add_body(RigidBody::new_static(Polygon::new_box(20.0, 0.5), Vec2::ZERO, 0.0));
    (world, floor)
}

/// Bodies that start slightly sunk into the floor or each other so every
/// contact stays closed for the whole run.
fn settling_scene(mode: BroadphaseMode) -> (PhysicsWorld, Vec<BodyHandle>) {
    let (mut world, floor) = world_with_floor(WorldConfig::default().broadphase(mode));
    let mut handles = vec![floor];
    handles.push(world.add_body(RigidBody::new(Circle::new(0.5), Vec2::new(-6.0, 0.98), 0.0)));
    handles.push(world.add_body(RigidBody::new(Polygon::new_box(0.5, 0.5), Vec2::new(-3.0, 0.98), 0.0)));
    handles.push(world.add_body(RigidBody::new(Polygon::new_box(0.5, 0.5), Vec2::new(-3.0, 1.96), 0.0)));
    handles.push(world.add_body(RigidBody::new(Circle::new(0.5), Vec2::new(2.0, 0.98), 0.0).with_friction(0.4)));
    handles.push(world.add_body(RigidBody::new(Polygon::new_box(1.0, 0.25), Vec2::new(6.0, 0.73), 0.0)));
    // Out of reach of everything
    handles.push(world.add_body(RigidBody::new(Circle::new(0.3), Vec2::new(40.0, 30.0), 0.0).with_gravity_scale(0.0)));
    (world, handles)
}

fn touching_pairs(world: &PhysicsWorld) -> HashSet<(BodyHandle, BodyHandle)> {
    world
        .manifolds()
        .filter(|m| m.is_touching())
        .map(|m| (m.pair().a(), m.pair().b()))
        .collect()
}

#[test]
fn test_circle_comes_to_rest_on_floor() {
    let (mut world, floor) = world_with_floor(WorldConfig::default());
    let ball = world.add_body(RigidBody::new(Circle::new(0.5), Vec2::new(0.0, 3.0), 0.0));

    run(&mut world, 300);

    let body = world.body(ball).unwrap();
    assert_abs_diff_eq!(body.position().y, 1.0, epsilon = 0.05);
    assert_abs_diff_eq!(body.linear_velocity.y, 0.0, epsilon = 0.05);

    let manifold = world.manifold(floor, ball).unwrap();
    assert_eq!(manifold.contact_count(), 1);
    assert!(manifold.contacts()[0].penetration < 0.05);
}

#[test]
fn test_fast_circle_does_not_tunnel() {
    let (mut world, _) = world_with_floor(WorldConfig::default());
    // Moves 0.3 per step, less than the ball's radius plus the floor's half height
    let ball = world.add_body(
        RigidBody::new(Circle::new(0.5), Vec2::new(0.0, 4.0), 0.0).with_velocity(Vec2::new(0.0, -18.0), 0.0),
    );
    run(&mut world, 240);
    assert!(world.body(ball).unwrap().position().y > 0.5);
}

#[test]
fn test_broadphase_modes_agree() {
    let modes = [BroadphaseMode::DynamicTree, BroadphaseMode::SweepAndPrune, BroadphaseMode::BruteForce];
    let mut results = Vec::new();
    for mode in modes {
        let (mut world, handles) = settling_scene(mode);
        run(&mut world, 90);
        let state: Vec<_> = handles
            .iter()
            .map(|&h| {
                let body = world.body(h).unwrap();
                (body.position(), body.linear_velocity, body.angular_velocity)
            })
            .collect();
        results.push((state, touching_pairs(&world)));
    }

    let (reference, reference_pairs) = &results[0];
    assert!(!reference_pairs.is_empty());
    for (state, pairs) in &results[1..] {
        assert_eq!(pairs, reference_pairs);
        for ((p, v, w), (rp, rv, rw)) in state.iter().zip(reference) {
            assert_abs_diff_eq!(p.x, rp.x, epsilon = 1e-5);
            assert_abs_diff_eq!(p.y, rp.y, epsilon = 1e-5);
            assert_abs_diff_eq!(v.x, rv.x, epsilon = 1e-5);
            assert_abs_diff_eq!(v.y, rv.y, epsilon = 1e-5);
            assert_abs_diff_eq!(*w, *rw, epsilon = 1e-5);
        }
    }
}

#[test]
fn test_tree_pairs_cover_touching_pairs() {
    let (mut world, _) = settling_scene(BroadphaseMode::DynamicTree);
    for _ in 0..30 {
        world.step(DT);
        let live: HashSet<_> = world.manifolds().map(|m| (m.pair().a(), m.pair().b())).collect();
        assert!(touching_pairs(&world).is_subset(&live));
    }
    // Floor against four resting bodies plus the two stacked boxes
    assert_eq!(touching_pairs(&world).len(), 5);
}

#[test]
fn test_one_manifold_per_pair() {
    let (mut world, handles) = settling_scene(BroadphaseMode::BruteForce);
    run(&mut world, 10);

    let n = handles.len();
    assert_eq!(world.manifold_count(), n * (n - 1) / 2);
    let unique: HashSet<_> = world.manifolds().cloned().collect();
    assert_eq!(unique.len(), world.manifold_count());

    let (a, b) = (handles[2], handles[3]);
    assert_eq!(world.manifold(a, b).unwrap(), world.manifold(b, a).unwrap());
}

#[test]
fn test_warm_start_impulses_carry_over() {
    let (mut world, floor) = world_with_floor(WorldConfig::default());
    let crate_box = world.add_body(RigidBody::new(Polygon::new_box(0.5, 0.5), Vec2::new(0.0, 0.99), 0.0));
    run(&mut world, 120);

    let before: Vec<f32> = world
        .manifold(floor, crate_box)
        .unwrap()
        .contacts()
        .iter()
        .map(|c| c.normal_impulse)
        .collect();
    assert_eq!(before.len(), 2);

    // At rest the contacts carry the box's weight each step
    let weight_impulse = world.body(crate_box).unwrap().mass() * 9.8 * DT;
    let total: f32 = before.iter().sum();
    assert_abs_diff_eq!(total, weight_impulse, epsilon = weight_impulse * 0.25);

    world.step(DT);
    let after = world.manifold(floor, crate_box).unwrap().contacts();
    for (old, new) in before.iter().zip(after) {
        assert!(*old > 0.0);
        assert_abs_diff_eq!(new.normal_impulse, *old, epsilon = old * 0.1);
    }
}

#[test]
fn test_warm_starting_reduces_stack_sinking() {
    fn deepest_contact(warm_starting: bool) -> f32 {
        let solver = SolverConfig::fast().warm_starting(warm_starting);
        let (mut world, _) = world_with_floor(WorldConfig::default().solver(solver));
        for level in 0..4 {
            let y = 0.5 + 0.5 + level as f32 * 1.0;
            world.add_body(RigidBody::new(Polygon::new_box(0.5, 0.5), Vec2::new(0.0, y), 0.0));
        }
        run(&mut world, 180);
        world
            .manifolds()
            .flat_map(|m| m.contacts().iter().map(|c| c.penetration))
            .fold(0.0, f32::max)
    }

    let warm = deepest_contact(true);
    let cold = deepest_contact(false);
    assert!(warm < cold, "warm {warm} should sink less than cold {cold}");
}

#[test]
fn test_raycast_hits_nearest_surface() {
    let mut world = PhysicsWorld::new();
    let near = world.add_body(RigidBody::new(Circle::new(1.0), Vec2::new(5.0, 0.0), 0.0));
    world.add_body(RigidBody::new(Polygon::new_box(1.0, 1.0), Vec2::new(9.0, 0.0), 0.0));

    let hit = world.raycast(&Ray::new(Vec2::ZERO, Vec2::UNIT_X), 100.0).unwrap();
    assert_eq!(hit.body, near);
    assert_abs_diff_eq!(hit.distance, 4.0, epsilon = 1e-4);
    assert_abs_diff_eq!(hit.normal.x, -1.0, epsilon = 1e-4);
    assert_abs_diff_eq!(hit.normal.y, 0.0, epsilon = 1e-4);

    world.remove_body(near);
    let hit = world.raycast(&Ray::new(Vec2::ZERO, Vec2::UNIT_X), 100.0).unwrap();
    assert_abs_diff_eq!(hit.distance, 8.0, epsilon = 1e-4);
}

#[test]
fn test_tree_stays_valid_while_bodies_move() {
    let (mut world, floor) = world_with_floor(WorldConfig::default());
    let mut handles = Vec::new();
    for i in 0..12 {
        let x = -5.5 + i as f32;
        let y = 2.0 + (i % 3) as f32 * 1.5;
        let body = if i % 2 == 0 {
            RigidBody::new(Circle::new(0.4), Vec2::new(x, y), 0.0)
        } else {
            RigidBody::new(Polygon::new_box(0.4, 0.3), Vec2::new(x, y), 0.3)
        };
        handles.push(world.add_body(body.with_velocity(Vec2::new(1.0 - (i % 3) as f32, 0.0), 0.5)));
    }

    for step in 0..120 {
        world.step(DT);
        world.validate_tree().unwrap();
        if step == 60 {
            for &h in handles.iter().step_by(3) {
                world.remove_body(h);
            }
            world.validate_tree().unwrap();
        }
    }

    assert_eq!(world.tree().leaf_count(), world.body_count());
    assert_eq!(world.body_count(), 9);
    for manifold in world.manifolds() {
        assert!(world.body(manifold.body_a()).is_some());
        assert!(world.body(manifold.body_b()).is_some());
    }
    assert!(world.body(floor).unwrap().is_static());
}
