//! Integration tests for pool and registry behavior.
//!
//! Covers the end-to-end scenarios plus seeded random add/remove sweeps
//! that re-check the sparse/dense invariants along the way.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use std::sync::Arc;

use strata_core::{
    ComponentPool, EntityId, Registry, StorageConfig, StorageError, TypeIdAllocator,
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

#[derive(Clone, Debug, Default, PartialEq)]
struct Name(String);

fn e(index: u32) -> EntityId {
    EntityId::new(index)
}

fn isolated_registry() -> Registry {
    Registry::with_allocator(Arc::new(TypeIdAllocator::new()), StorageConfig::compact())
}

/// Asserts every invariant the pool promises, against a model set.
fn check_pool<C: strata_core::Component>(
    pool: &mut ComponentPool<C>,
    model: &BTreeSet<EntityId>,
    bound: u32,
) {
    let dense: Vec<EntityId> = pool.entities().collect();

    // No gaps: dense length is exactly the holder count.
    assert_eq!(pool.len(), model.len());
    assert_eq!(dense.len(), model.len());

    for raw in 0..bound {
        let entity = e(raw);
        let expected = model.contains(&entity);
        assert_eq!(pool.has(entity), expected, "has({raw})");
        match pool.dense_index_of(entity) {
            Some(slot) => {
                assert!(expected);
                assert_eq!(dense[slot], entity, "dense[sparse[{raw}]]");
            }
            None => assert!(!expected),
        }
    }

    let sorted: Vec<EntityId> = model.iter().copied().collect();
    assert_eq!(pool.active_entities(), sorted.as_slice());
}

#[test]
fn test_position_scenario() {
    let mut registry = isolated_registry();
    assert!(registry.register::<Position>().unwrap());

    let pool = registry.pool_mut::<Position>().unwrap();

    pool.add(e(3)).unwrap();
    assert!(pool.has(e(3)));
    assert_eq!(pool.active_entities(), &[e(3)]);

    pool.add(e(1)).unwrap();
    assert_eq!(pool.active_entities(), &[e(1), e(3)]);

    pool.get_mut(e(3)).unwrap().x = 12;
    pool.remove(e(3));
    assert_eq!(pool.active_entities(), &[e(1)]);

    let again = pool.add(e(3)).unwrap();
    assert_eq!(*again, Position { x: 0, y: 0 });
}

#[test]
fn test_unregistered_velocity_scenario() {
    let mut registry = isolated_registry();
    registry.register::<Position>().unwrap();

    let err = registry.pool::<Velocity>().unwrap_err();
    assert!(err.to_string().contains("Velocity"));
    assert!(matches!(err, StorageError::UnregisteredComponent { .. }));
}

#[test]
fn test_double_attach_leaves_state_unchanged() {
    let mut pool: ComponentPool<Name> = ComponentPool::with_config(&StorageConfig::compact());
    pool.insert(e(8), Name("first".into())).unwrap();
    let sparse_before = pool.sparse_len();

    let err = pool.insert(e(8), Name("second".into())).unwrap_err();
    assert!(matches!(err, StorageError::ComponentAlreadyAttached { entity, .. } if entity == e(8)));

    assert_eq!(pool.get(e(8)), Some(&Name("first".into())));
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.sparse_len(), sparse_before);
}

#[test]
fn test_random_churn_keeps_invariants() {
    const BOUND: u32 = 200;

    for seed in [1_u64, 7, 42, 1337] {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut pool: ComponentPool<Velocity> =
            ComponentPool::with_config(&StorageConfig::compact());
        let mut model = BTreeSet::new();

        for step in 0..2_000_i32 {
            let entity = e(rng.gen_range(0..BOUND));
            if rng.gen_bool(0.55) {
                let result = pool.add(entity);
                if model.insert(entity) {
                    result.unwrap().dx = step;
                } else {
                    assert!(result.is_err());
                }
            } else {
                let removed = pool.remove(entity);
                assert_eq!(removed.is_some(), model.remove(&entity));
            }

            // Full sweep is O(BOUND); do it often but not every step.
            if step % 16 == 0 {
                check_pool(&mut pool, &model, BOUND);
            }
        }
        check_pool(&mut pool, &model, BOUND);
    }
}

#[test]
fn test_values_follow_their_entity_through_swaps() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut pool: ComponentPool<Position> = ComponentPool::with_config(&StorageConfig::compact());

    for raw in 0..64 {
        pool.insert(e(raw), Position { x: raw as i32, y: -(raw as i32) })
            .unwrap();
    }

    // Remove half in random order; every survivor must keep its own value.
    let mut order: Vec<u32> = (0..64).collect();
    for i in (1..order.len()).rev() {
        let j = rng.gen_range(0..=i);
        order.swap(i, j);
    }
    for &raw in &order[..32] {
        assert!(pool.remove(e(raw)).is_some());
    }
    for &raw in &order[32..] {
        assert_eq!(
            pool.get(e(raw)),
            Some(&Position { x: raw as i32, y: -(raw as i32) })
        );
    }
}

#[test]
fn test_broadcast_disable_across_registered_types() {
    let mut registry = isolated_registry();
    registry.register::<Position>().unwrap();
    registry.register::<Velocity>().unwrap();
    registry.register::<Name>().unwrap();

    for raw in 0..10 {
        registry.pool_mut::<Position>().unwrap().add(e(raw)).unwrap();
        if raw % 2 == 0 {
            registry.pool_mut::<Velocity>().unwrap().add(e(raw)).unwrap();
        }
    }

    for raw in [0, 3, 4, 9, 500] {
        registry.disable_entity(e(raw));
        assert!(!registry.pool::<Position>().unwrap().has(e(raw)));
        assert!(!registry.pool::<Velocity>().unwrap().has(e(raw)));
        assert!(!registry.pool::<Name>().unwrap().has(e(raw)));
    }

    assert_eq!(
        registry.pool_mut::<Position>().unwrap().active_entities(),
        &[e(1), e(2), e(5), e(6), e(7), e(8)]
    );
    assert_eq!(
        registry.pool_mut::<Velocity>().unwrap().active_entities(),
        &[e(2), e(6), e(8)]
    );
}

#[test]
fn test_registries_on_shared_ids_agree() {
    let mut first = Registry::new();
    let mut second = Registry::new();
    assert!(first.register::<Name>().unwrap());
    assert!(second.register::<Name>().unwrap());

    first.pool_mut::<Name>().unwrap().add(e(1)).unwrap();
    // Pools are per registry even though the type id is shared.
    assert!(!second.pool::<Name>().unwrap().has(e(1)));
    assert_eq!(
        first.type_ids().lookup::<Name>(),
        second.type_ids().lookup::<Name>()
    );
}

#[test]
fn test_storage_config_from_file() {
    let path = std::env::temp_dir().join(format!("strata_storage_{}.toml", std::process::id()));
    std::fs::write(&path, "sparse_floor = 128\ndense_reserve = 16\n").unwrap();

    let config = StorageConfig::from_toml_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let mut pool: ComponentPool<Position> = ComponentPool::with_config(&config);
    pool.add(e(0)).unwrap();
    assert_eq!(pool.sparse_len(), 128);
}
