//! Simulation session: owns the entity snapshot, the tick clock and the
//! distance cache for one run.

use proxim_core::distance::{CacheStats, DistanceCache, DistanceError};
use proxim_core::glam::DVec2;
use proxim_core::math::DeterministicRng;
use proxim_core::{EntityId, EntityRef, Tick, TickClock};
use proxim_metrics::{Counter, TickTimer};
use proxim_services::{Settings, SimulationSettings};

/// Every this many ticks the session issues no distance queries at all.
const IDLE_EVERY: u64 = 10;
const LOG_EVERY: u64 = 30;

pub struct Session {
    sim: SimulationSettings,
    clock: TickClock,
    rng: DeterministicRng,
    entities: Vec<EntityRef>,
    cache: DistanceCache,
    counter: Counter,
    timer: TickTimer,
    pairs_queried: u64,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        let sim = settings.simulation.clone();
        let mut rng = DeterministicRng::new(sim.seed);
        let entities = (0..sim.entity_count as u64)
            .map(|raw| EntityRef::new(EntityId::from_raw(raw + 1), rng.next_point(sim.world_extent)))
            .collect();

        Self {
            clock: TickClock::new(),
            rng,
            entities,
            cache: DistanceCache::with_config(settings.distance.clone()),
            counter: Counter::new(),
            timer: TickTimer::new(sim.timing_window),
            pairs_queried: 0,
            sim,
        }
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn pairs_queried(&self) -> u64 {
        self.pairs_queried
    }

    /// Advance one tick: move everything, then query.
    pub fn step(&mut self) -> Result<(), DistanceError> {
        self.timer.begin();
        let tick = self.clock.advance();
        self.move_entities();

        if tick.raw() % IDLE_EVERY == 0 {
            tracing::debug!(tick = tick.raw(), "idle tick, no distance queries");
            self.counter.increment("tick.idle", 1);
        } else {
            self.query_tick(tick)?;
        }

        self.timer.end();
        if tick.raw() % LOG_EVERY == 0 {
            let stats = self.cache.stats();
            tracing::info!(
                tick = tick.raw(),
                matrix_rebuilds = stats.matrix_rebuilds,
                lookups = stats.lookups,
                tick_ms = self.timer.tick_time_ms(),
                window = self.timer.window(),
                "tick summary"
            );
        }
        Ok(())
    }

    fn move_entities(&mut self) {
        let extent = self.sim.world_extent;
        for entity in &mut self.entities {
            let step = self.rng.next_point(self.sim.step_size);
            entity.position = (entity.position + step).clamp(DVec2::splat(-extent), DVec2::splat(extent));
        }
    }

    fn query_tick(&mut self, tick: Tick) -> Result<(), DistanceError> {
        let n = self.entities.len();
        if n < 2 {
            return Ok(());
        }

        let mut query = self.cache.query(&self.entities, tick);
        let mut nearest_pair: Option<(EntityId, EntityId, f64)> = None;
        for _ in 0..self.sim.queries_per_tick {
            let a = self.entities[self.rng.next_u32() as usize % n].id;
            let b = self.entities[self.rng.next_u32() as usize % n].id;
            match query.squared_distance(a, b) {
                Ok(squared) => {
                    self.pairs_queried += 1;
                    if nearest_pair.map_or(true, |(_, _, best)| squared < best) {
                        nearest_pair = Some((a, b, squared));
                    }
                }
                Err(DistanceError::SelfDistance { .. }) => {
                    self.counter.increment("query.self_skipped", 1);
                }
                Err(err) => return Err(err),
            }
        }

        let anchor = self.entities[0].id;
        if let Some((other, squared)) = query.closest_to(anchor)? {
            tracing::trace!(tick = tick.raw(), %anchor, %other, distance = squared.sqrt(), "closest to anchor");
        }

        // Cheap linear path: no matrix involvement.
        let origin_hugger = query
            .distances_from_entities_to_point(DVec2::ZERO)
            .fold(f64::INFINITY, f64::min);

        if let Some((a, b, squared)) = nearest_pair {
            tracing::debug!(
                tick = tick.raw(),
                %a,
                %b,
                distance = squared.sqrt(),
                nearest_to_origin = origin_hugger,
                "closest sampled pair"
            );
        }
        self.counter.increment("query.pairs", self.sim.queries_per_tick as u64);
        Ok(())
    }

    pub fn report(&self) {
        let stats = self.cache.stats();
        tracing::info!(
            ticks = self.clock.current().raw(),
            index_rebuilds = stats.index_rebuilds,
            matrix_rebuilds = stats.matrix_rebuilds,
            lookups = stats.lookups,
            pairs_queried = self.pairs_queried,
            rebuild_ms = self.cache.rebuild_time().as_secs_f64() * 1000.0,
            "session finished"
        );
        for (name, value) in self.counter.snapshot() {
            tracing::info!(counter = %name, value, "session counter");
        }
        let (min_ms, max_ms) = self.timer.tick_time_range_ms();
        tracing::info!(
            avg_ms = self.timer.tick_time_ms(),
            min_ms,
            max_ms,
            ticks_per_second = self.timer.ticks_per_second(),
            window = self.timer.window(),
            "tick timing"
        );
    }
}
