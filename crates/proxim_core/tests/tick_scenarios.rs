use proxim_core::distance::{CacheState, DistanceCache, DistanceError};
use proxim_core::math::DeterministicRng;
use proxim_core::{EntityId, EntityRef, Tick, TickClock};

fn id(raw: u64) -> EntityId {
    EntityId::from_raw(raw)
}

#[test]
fn two_entities_three_four_five() {
    let entities = [EntityRef::at(1, 0.0, 0.0), EntityRef::at(2, 3.0, 4.0)];
    let mut cache = DistanceCache::new();
    let mut query = cache.query(&entities, Tick::new(1));

    assert_eq!(query.distance(id(1), id(2)), Ok(5.0));
    assert_eq!(query.squared_distance(id(1), id(2)), Ok(25.0));
}

#[test]
fn right_triangle_pairs_regardless_of_order() {
    let forward = [
        EntityRef::at(1, 0.0, 0.0),
        EntityRef::at(2, 1.0, 0.0),
        EntityRef::at(3, 0.0, 1.0),
    ];
    let mut shuffled = forward;
    shuffled.reverse();

    for entities in [forward, shuffled] {
        let mut cache = DistanceCache::new();
        let mut query = cache.query(&entities, Tick::new(1));
        let mut found = vec![
            query.squared_distance(id(1), id(2)).unwrap(),
            query.squared_distance(id(1), id(3)).unwrap(),
            query.squared_distance(id(2), id(3)).unwrap(),
        ];
        found.sort_by(f64::total_cmp);
        assert_eq!(found, vec![1.0, 1.0, 2.0]);

        let mut stored = cache.vector().as_slice().to_vec();
        stored.sort_by(f64::total_cmp);
        assert_eq!(stored, vec![1.0, 1.0, 2.0]);
    }
}

#[test]
fn self_and_unknown_queries_fail() {
    let entities = [EntityRef::at(1, 0.0, 0.0), EntityRef::at(2, 3.0, 4.0)];
    let mut cache = DistanceCache::new();
    let mut query = cache.query(&entities, Tick::new(1));

    assert_eq!(
        query.squared_distance(id(1), id(1)),
        Err(DistanceError::SelfDistance { id: id(1) })
    );
    assert_eq!(
        query.distance(id(2), id(404)),
        Err(DistanceError::UnknownEntity {
            id: id(404),
            tick: Tick::new(1),
        })
    );
    // Errors are fatal to the query, not the session.
    assert_eq!(query.distance(id(1), id(2)), Ok(5.0));
}

#[test]
fn stale_fresh_cycle_across_ticks() {
    let mut clock = TickClock::new();
    let mut rng = DeterministicRng::new(99);
    let mut entities: Vec<EntityRef> = (0..32)
        .map(|i| EntityRef::new(id(i), rng.next_point(50.0)))
        .collect();
    let mut cache = DistanceCache::new();

    for _ in 0..5 {
        let tick = clock.advance();
        assert_eq!(cache.state(tick), CacheState::Stale);

        {
            let mut query = cache.query(&entities, tick);
            for k in 0..20u64 {
                query.squared_distance(id(k), id(k + 1)).unwrap();
            }
        }
        assert_eq!(cache.state(tick), CacheState::Fresh);

        for entity in &mut entities {
            entity.position += rng.next_point(1.0);
        }
    }

    assert_eq!(cache.stats().matrix_rebuilds, 5);
    assert_eq!(cache.stats().index_rebuilds, 5);
    assert_eq!(cache.stats().lookups, 100);
}

#[test]
fn ticks_without_queries_cost_nothing() {
    let entities = [EntityRef::at(1, 0.0, 0.0), EntityRef::at(2, 1.0, 0.0)];
    let mut cache = DistanceCache::new();
    let mut clock = TickClock::new();

    for _ in 0..10 {
        let _ = cache.query(&entities, clock.advance());
    }
    let tick = clock.advance();
    cache.query(&entities, tick).distance(id(1), id(2)).unwrap();

    assert_eq!(cache.stats().matrix_rebuilds, 1);
}

#[test]
fn same_tick_movement_is_not_observed() {
    let mut entities = vec![EntityRef::at(1, 0.0, 0.0), EntityRef::at(2, 3.0, 4.0)];
    let mut cache = DistanceCache::new();
    let tick = Tick::new(50);

    assert_eq!(cache.query(&entities, tick).distance(id(1), id(2)), Ok(5.0));

    entities[1].position.x = 30.0;
    entities[1].position.y = 40.0;
    assert_eq!(cache.query(&entities, tick).distance(id(1), id(2)), Ok(5.0));
    assert_eq!(
        cache.query(&entities, tick.next()).distance(id(1), id(2)),
        Ok(50.0)
    );
}

#[test]
fn explicit_ensure_fresh_precomputes() {
    let entities = [EntityRef::at(1, 0.0, 0.0), EntityRef::at(2, 0.0, 7.0)];
    let mut cache = DistanceCache::new();
    cache.ensure_fresh(&entities, Tick::new(2)).unwrap();
    assert!(cache.is_fresh(Tick::new(2)));

    cache.query(&entities, Tick::new(2)).distance(id(1), id(2)).unwrap();
    assert_eq!(cache.stats().matrix_rebuilds, 1);
    assert_eq!(cache.vector().tick(), Some(Tick::new(2)));
    assert_eq!(cache.index_map().tick(), Some(Tick::new(2)));
}

#[test]
fn sessions_keep_independent_caches() {
    let red = [EntityRef::at(1, 0.0, 0.0), EntityRef::at(2, 1.0, 0.0)];
    let blue = [EntityRef::at(1, 0.0, 0.0), EntityRef::at(2, 0.0, 9.0)];
    let mut red_cache = DistanceCache::new();
    let mut blue_cache = DistanceCache::new();
    let tick = Tick::new(1);

    assert_eq!(red_cache.query(&red, tick).distance(id(1), id(2)), Ok(1.0));
    assert_eq!(blue_cache.query(&blue, tick).distance(id(1), id(2)), Ok(9.0));
}
