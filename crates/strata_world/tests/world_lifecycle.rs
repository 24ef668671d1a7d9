//! Integration test for entity lifecycle and system scheduling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use strata_world::{
    EntityGroup, EntityId, Scheduler, StorageError, SystemId, World, WorldConfig, WorldError,
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Position {
    x: i32,
    y: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Velocity {
    dx: i32,
    dy: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Lifetime {
    ticks_left: u32,
}

const PROJECTILES: EntityGroup = EntityGroup::new(2);

fn temp_config_path() -> std::path::PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("test_world_config_{id}.toml"))
}

fn movement(world: &mut World, _id: SystemId, _elapsed_ms: u32) {
    let moves: Vec<(EntityId, Velocity)> = match world.pool::<Velocity>() {
        Ok(pool) => pool.iter().map(|(id, v)| (id, *v)).collect(),
        Err(_) => return,
    };
    if let Ok(positions) = world.pool_mut::<Position>() {
        for (id, vel) in moves {
            if let Some(pos) = positions.get_mut(id) {
                pos.x += vel.dx;
                pos.y += vel.dy;
            }
        }
    }
}

fn expiry(world: &mut World, _id: SystemId, _elapsed_ms: u32) {
    let mut expired = Vec::new();
    if let Ok(pool) = world.pool_mut::<Lifetime>() {
        for (id, life) in pool.iter_mut() {
            life.ticks_left = life.ticks_left.saturating_sub(1);
            if life.ticks_left == 0 {
                expired.push(id);
            }
        }
    }
    for id in expired {
        world.destroy_entity(id).unwrap();
    }
}

fn game_world() -> World {
    let mut world = World::with_config(WorldConfig::compact());
    world.register_component::<Position>().unwrap();
    world.register_component::<Velocity>().unwrap();
    world.register_component::<Lifetime>().unwrap();
    world
}

#[test]
fn test_projectiles_move_then_expire() {
    let mut world = game_world();
    let mut scheduler = Scheduler::new();
    scheduler.add_system(movement, 1).unwrap();
    scheduler.add_system(expiry, 1).unwrap();

    let wall = world.create_entity(EntityGroup::NONE).unwrap();
    world.add_component::<Position>(wall).unwrap();

    let mut shots = Vec::new();
    for ticks in 1..=3 {
        let shot = world.create_entity(PROJECTILES).unwrap();
        world.add_component::<Position>(shot).unwrap();
        world
            .insert_component(shot, Velocity { dx: 1, dy: 2 })
            .unwrap();
        world
            .insert_component(shot, Lifetime { ticks_left: ticks })
            .unwrap();
        shots.push(shot);
    }

    scheduler.run_tick(&mut world, 16);
    assert!(!world.is_alive(shots[0]));
    assert_eq!(
        world.get_component::<Position>(shots[1]).unwrap(),
        &Position { x: 1, y: 2 }
    );

    scheduler.run_tick(&mut world, 16);
    scheduler.run_tick(&mut world, 16);

    assert_eq!(world.entities_in_group(PROJECTILES).count(), 0);
    assert_eq!(world.alive_entities().collect::<Vec<_>>(), vec![wall]);
    for &shot in &shots {
        assert!(!world.pool::<Position>().unwrap().has(shot));
        assert!(!world.pool::<Velocity>().unwrap().has(shot));
        assert!(!world.pool::<Lifetime>().unwrap().has(shot));
    }
    assert_eq!(world.pool_mut::<Position>().unwrap().active_entities(), &[wall]);
}

#[test]
fn test_retired_ids_are_rejected_everywhere() {
    let mut world = game_world();
    let id = world.create_entity(EntityGroup::NONE).unwrap();
    world.destroy_entity(id).unwrap();

    let invalid = WorldError::Storage(StorageError::InvalidEntityId(id));
    assert_eq!(world.destroy_entity(id), Err(invalid.clone()));
    assert_eq!(world.add_component::<Position>(id).unwrap_err(), invalid);
    assert_eq!(world.get_component::<Position>(id).unwrap_err(), invalid);
    assert_eq!(world.remove_component::<Position>(id).unwrap_err(), invalid);
    assert_eq!(world.group_of(id).unwrap_err(), invalid);
    assert!(invalid.to_string().contains("invalid"));

    // The next id is fresh, never the retired one.
    assert_ne!(world.create_entity(EntityGroup::NONE).unwrap(), id);
}

#[test]
fn test_entity_limit_from_config_file() {
    let path = temp_config_path();
    std::fs::write(&path, "max_entities = 3\n[storage]\nsparse_floor = 16\n").unwrap();
    let config = WorldConfig::from_toml_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let mut world = World::with_config(config);
    for _ in 0..3 {
        world.create_entity(EntityGroup::NONE).unwrap();
    }
    let err = world.create_entity(EntityGroup::NONE).unwrap_err();
    assert_eq!(err, WorldError::EntityLimitReached { limit: 3 });

    // Destroying does not free capacity; ids are never reused.
    world.destroy_entity(EntityId::new(0)).unwrap();
    assert!(world.create_entity(EntityGroup::NONE).is_err());
    assert_eq!(world.alive_count(), 2);
}

#[test]
fn test_missing_config_file() {
    let err = WorldConfig::from_toml_file(temp_config_path()).unwrap_err();
    assert!(matches!(
        err,
        WorldError::Storage(StorageError::InvalidConfig(_))
    ));
}

#[test]
fn test_throttled_and_disabled_systems() {
    let mut world = game_world();
    let mut scheduler = Scheduler::new();

    let fast_runs = Arc::new(AtomicU32::new(0));
    let slow_elapsed = Arc::new(AtomicU32::new(0));

    let fast_counter = Arc::clone(&fast_runs);
    let fast = scheduler.add_system(
        move |_: &mut World, _: SystemId, _: u32| {
            fast_counter.fetch_add(1, Ordering::Relaxed);
        },
        1,
    )
    .unwrap();
    let slow_total = Arc::clone(&slow_elapsed);
    let slow = scheduler.add_system(
        move |_: &mut World, _: SystemId, elapsed_ms: u32| {
            slow_total.fetch_add(elapsed_ms, Ordering::Relaxed);
        },
        4,
    )
    .unwrap();

    for _ in 0..10 {
        scheduler.run_tick(&mut world, 10);
    }
    assert_eq!(fast_runs.load(Ordering::Relaxed), 10);
    // Ran on ticks 4 and 8; ticks 9 and 10 are pending.
    assert_eq!(slow_elapsed.load(Ordering::Relaxed), 80);
    assert_eq!(scheduler.skipped_ticks(slow).unwrap(), 2);

    scheduler.set_enabled(fast, false).unwrap();
    scheduler.set_tick_rate(slow, 1).unwrap();
    assert_eq!(scheduler.run_tick(&mut world, 10), 1);
    assert_eq!(fast_runs.load(Ordering::Relaxed), 10);
    assert_eq!(slow_elapsed.load(Ordering::Relaxed), 110);
    assert_eq!(scheduler.tick_count(), 11);
}

#[test]
fn test_random_lifecycle_keeps_pools_in_sync() {
    for seed in [3_u64, 21, 404] {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut world = game_world();
        let mut alive = BTreeSet::new();
        let mut with_velocity = BTreeSet::new();

        for _ in 0..1_500 {
            match rng.gen_range(0..4) {
                0 | 1 => {
                    let id = world.create_entity(EntityGroup::NONE).unwrap();
                    world.add_component::<Position>(id).unwrap();
                    if rng.gen_bool(0.5) {
                        world.add_component::<Velocity>(id).unwrap();
                        with_velocity.insert(id);
                    }
                    alive.insert(id);
                }
                2 => {
                    let Some(&id) = alive.iter().nth(rng.gen_range(0..alive.len().max(1))) else {
                        continue;
                    };
                    world.destroy_entity(id).unwrap();
                    alive.remove(&id);
                    with_velocity.remove(&id);
                }
                _ => {
                    let Some(&id) = alive.iter().next() else {
                        continue;
                    };
                    if world.remove_component::<Velocity>(id).unwrap().is_some() {
                        assert!(with_velocity.remove(&id));
                    }
                }
            }
        }

        assert_eq!(world.alive_count(), alive.len());
        let expected: Vec<EntityId> = alive.iter().copied().collect();
        assert_eq!(world.alive_entities().collect::<Vec<_>>(), expected);
        assert_eq!(
            world.pool_mut::<Position>().unwrap().active_entities(),
            expected.as_slice()
        );
        let expected_velocity: Vec<EntityId> = with_velocity.iter().copied().collect();
        assert_eq!(
            world.pool_mut::<Velocity>().unwrap().active_entities(),
            expected_velocity.as_slice()
        );
    }
}
