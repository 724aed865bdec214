//! Integration tests for the physics world
//!
//! Covers the behaviour the game loop relies on:
//! - Ground plane stays put
//! - Free fall under fixed gravity
//! - Spheres come to rest on the ground
//! - Duplicate registration never doubles a body

use approx::assert_relative_eq;
use mass_physics::prelude::*;

fn ball(y: f32) -> RigidBody {
    RigidBody::sphere(1.0, 0.5, Transform::from_translation(0.0, y, 0.0))
}

#[test]
fn test_ground_is_static() {
    let mut world = PhysicsWorld::new();
    let before = world.ground_transform();

    for _ in 0..300 {
        world.tick();
    }

    assert_eq!(world.ground_transform(), before);
    assert_eq!(before.translation, [0.0, -1.0, 0.0]);
}

#[test]
fn test_ground_is_static_under_load() {
    let mut world = PhysicsWorld::new();
    let before = world.ground_transform();

    let balls: Vec<_> = (0..5).map(|i| ball(2.0 + i as f32 * 1.5)).collect();
    for b in &balls {
        world.add_rigid_body(b).unwrap();
    }
    for _ in 0..180 {
        world.tick();
    }

    assert_eq!(world.ground_transform(), before);
}

#[test]
fn test_free_fall_one_second() {
    let mut world = PhysicsWorld::new();
    let body = ball(100.0);
    let handle = world.add_rigid_body(&body).unwrap();

    for _ in 0..60 {
        world.tick();
    }

    let velocity = world.body_linear_velocity(handle).unwrap();
    assert_relative_eq!(velocity[1], -10.0, epsilon = 0.05);
    assert_relative_eq!(velocity[0], 0.0, epsilon = 1.0e-4);
    assert_relative_eq!(world.simulated_time(), 1.0, epsilon = 1.0e-4);

    // Semi-implicit Euler lands slightly past the analytic 5 m
    let fallen = 100.0 - body.transform().translation[1];
    assert!(fallen > 4.9 && fallen < 5.2, "fell {} m", fallen);
}

#[test]
fn test_height_decreases_during_fall() {
    let mut world = PhysicsWorld::new();
    let body = ball(5.0);
    world.add_rigid_body(&body).unwrap();

    let mut last = body.transform().translation[1];
    for _ in 0..50 {
        world.tick();
        let y = body.transform().translation[1];
        assert!(y <= last, "height rose from {} to {}", last, y);
        last = y;
    }
    assert!(last < 5.0);
}

#[test]
fn test_sphere_settles_on_ground() {
    let mut world = PhysicsWorld::new();
    let body = ball(5.0);
    world.add_rigid_body(&body).unwrap();

    let mut lowest = f32::MAX;
    for _ in 0..120 {
        world.tick();
        lowest = lowest.min(body.transform().translation[1]);
    }

    let y = body.transform().translation[1];
    assert_relative_eq!(y, 0.5, epsilon = 0.05);
    // One frame of impact penetration at most, never through the plane
    assert!(lowest > 0.3, "sank to {}", lowest);
}

#[test]
fn test_duplicate_add_has_single_effect() {
    let mut single = PhysicsWorld::new();
    let mut doubled = PhysicsWorld::new();

    let a = ball(3.0);
    let b = ball(3.0);
    single.add_rigid_body(&a).unwrap();
    doubled.add_rigid_body(&b).unwrap();
    let err = doubled.add_rigid_body(&b).unwrap_err();
    assert!(matches!(err, PhysicsError::DuplicateRegistration(id) if id == b.id()));

    for _ in 0..90 {
        single.tick();
        doubled.tick();
    }

    assert_eq!(single.proxy_count(), doubled.proxy_count());
    assert_relative_eq!(
        a.transform().translation[1],
        b.transform().translation[1],
        epsilon = 1.0e-5
    );
}

#[test]
fn test_construct_and_drop() {
    for _ in 0..16 {
        let world = PhysicsWorld::new();
        drop(world);
    }
}

#[test]
fn test_drop_with_registered_bodies() {
    let body = ball(5.0);
    {
        let mut world = PhysicsWorld::new();
        world.add_rigid_body(&body).unwrap();
        world.tick();
    }
    // The caller's body outlives the world and keeps its last transform
    assert!(body.transform().translation[1] < 5.0);
}

#[test]
fn test_body_dropped_while_registered() {
    let mut world = PhysicsWorld::new();
    let handle = {
        let body = ball(5.0);
        world.add_rigid_body(&body).unwrap()
    };

    for _ in 0..30 {
        world.tick();
    }

    assert_eq!(world.body_count(), 1);
    assert!(world.body_transform(handle).unwrap().translation[1] < 5.0);

    world.remove_by_handle(handle).unwrap();
    assert_eq!(world.body_count(), 0);
}

#[test]
fn test_capacity_recovered_after_bodies_dropped() {
    let config = PhysicsConfig::default().with_max_proxies(4);
    let mut world = PhysicsWorld::with_config(config).unwrap();

    let handles: Vec<_> = (0..3)
        .map(|i| world.add_rigid_body(&ball(2.0 + i as f32 * 1.5)).unwrap())
        .collect();
    assert!(matches!(
        world.add_rigid_body(&ball(10.0)),
        Err(PhysicsError::ProxyLimitReached { max: 4 })
    ));

    for handle in handles {
        world.remove_by_handle(handle).unwrap();
    }
    assert_eq!(world.proxy_count(), 1);
    world.add_rigid_body(&ball(10.0)).unwrap();
}

#[test]
fn test_static_body_is_not_moved() {
    let mut world = PhysicsWorld::new();
    let block = RigidBody::sphere(0.0, 1.0, Transform::from_translation(3.0, 2.0, 0.0));
    let handle = world.add_rigid_body(&block).unwrap();

    for _ in 0..60 {
        world.tick();
    }

    assert_eq!(world.body_transform(handle).unwrap().translation, [3.0, 2.0, 0.0]);
    assert_eq!(block.transform().translation, [3.0, 2.0, 0.0]);
}

#[test]
fn test_collision_with_ground_is_reported() {
    let mut world = PhysicsWorld::new();
    let body = ball(1.0);
    world.add_rigid_body(&body).unwrap();

    let mut touched = false;
    for _ in 0..60 {
        world.tick();
        touched |= world
            .collision_events()
            .iter()
            .any(|e| e.is_started() && e.involves(body.id()) && e.involves(BodyId::GROUND));
    }

    assert!(touched, "expected a ground contact event");
}

#[test]
fn test_config_from_toml() {
    let config = PhysicsConfig::from_toml_str(
        r#"
        [physics]
        max_sub_steps = 2
        "#,
    )
    .unwrap();
    let mut world = PhysicsWorld::with_config(config).unwrap();
    let max_sub_steps = world.config().max_sub_steps;

    // Four frames of time in one call, capped at two internal steps
    assert_eq!(world.step_simulation(4.0 / 60.0, max_sub_steps), 2);
}

#[test]
fn test_removed_body_reports_stopped_contact() {
    let mut world = PhysicsWorld::new();
    let body = ball(1.0);
    world.add_rigid_body(&body).unwrap();

    let mut touched = false;
    for _ in 0..60 {
        world.tick();
        touched |= world.collision_events().iter().any(|e| e.is_started());
    }
    assert!(touched);

    world.remove_rigid_body(&body).unwrap();
    world.tick();

    assert!(
        world
            .collision_events()
            .iter()
            .any(|e| e.is_stopped() && e.involves(body.id()) && e.involves(BodyId::GROUND)),
        "expected a stopped event, got {:?}",
        world.collision_events()
    );
}
