//! The simulation world: owns every ship, bullet, planetoid, moon, and the ring
//! system, and drives the fixed five-step tick. Entities store ids only;
//! cross-references (a bullet's source, a moon's owning planetoid) are resolved
//! through the world's own query interface rather than back-pointers.

use std::time::Duration;

use engine_core::{EntityId, EntityKind, Faction, Time};
use glam::Vec3;
use physics::spheres_overlap;
use procgen::{ParticleSummary, RingParameters, RingSystem};
use rand::rngs::StdRng;
use rand::SeedableRng;
use steering::AgentState;

use crate::ai::{AiOutput, PlanetoidSnapshot, ShipSnapshot, UnitAi};
use crate::constants::{BULLET_RADIUS, BULLET_SPEED, BULLET_EXPLOSION_SIZE, SHIP_DEATH_EXPLOSION_SIZE};
use crate::entities::{Bullet, ExplosionRecord, ExplosionStore, LifeState, MoonRecord, Planetoid, Ship};
use crate::error::SimError;

/// Monotonic per-kind id counters, so an entity's identity never depends on its
/// storage slot (bullets and explosions are pruned/reused; ships and planetoids are
/// not, but we still allocate the same way for consistency).
#[derive(Default)]
struct IdAllocator {
    ship: u16,
    bullet: u16,
    planetoid: u16,
    marker: u16,
}

impl IdAllocator {
    fn next(&mut self, kind: EntityKind, faction: Faction) -> EntityId {
        let counter = match kind {
            EntityKind::Ship => &mut self.ship,
            EntityKind::Bullet | EntityKind::Missile => &mut self.bullet,
            EntityKind::Planetoid => &mut self.planetoid,
            EntityKind::Marker => &mut self.marker,
        };
        let index = *counter;
        *counter = counter.wrapping_add(1);
        EntityId::new(kind, faction, index)
    }
}

pub struct World {
    ships: Vec<Ship>,
    bullets: Vec<Bullet>,
    planetoids: Vec<Planetoid>,
    moons: Vec<MoonRecord>,
    explosions: ExplosionStore,
    ring: RingSystem,
    rng: StdRng,
    ids: IdAllocator,
    elapsed: f32,
    /// Measures, per tick, how long `run_ai` took against `ai_budget`. The budget
    /// is never enforced; AI is merely measured, never preempted.
    ai_time: Time,
    ai_budget: Duration,
}

impl World {
    pub fn new(seed: u64, ring_params: RingParameters) -> Result<Self, SimError> {
        let ring = RingSystem::new(procgen::PseudorandomGrid3::default(), ring_params)?;
        Ok(Self {
            ships: Vec::new(),
            bullets: Vec::new(),
            planetoids: Vec::new(),
            moons: Vec::new(),
            explosions: ExplosionStore::new(),
            ring,
            rng: StdRng::seed_from_u64(seed),
            ids: IdAllocator::default(),
            elapsed: 0.0,
            ai_time: Time::new(),
            ai_budget: Duration::from_secs_f64(crate::constants::AI_TIME_BUDGET_SECONDS),
        })
    }

    /// Set the diagnostic AI time budget used by [`Self::ai_time_overshot`]. Purely
    /// informational: AI work is never cut short.
    pub fn set_ai_budget(&mut self, budget: Duration) {
        self.ai_budget = budget;
    }

    /// Wall-clock time the most recent `run_ai` pass took.
    pub fn ai_time_elapsed(&self) -> Duration {
        self.ai_time.ai_time_elapsed()
    }

    /// Budget remaining as of the most recent `run_ai` pass, zero if exhausted.
    pub fn ai_time_remaining(&self) -> Duration {
        self.ai_time.ai_time_remaining()
    }

    /// How far the most recent `run_ai` pass overshot its diagnostic budget.
    pub fn ai_time_overshot(&self) -> Duration {
        self.ai_time.ai_time_overshot()
    }

    pub fn ring_system(&self) -> &RingSystem {
        &self.ring
    }

    // ---- World construction (build-time, not part of the tick) ----

    pub fn spawn_planetoid(&mut self, position: Vec3, radius: f32, owner_faction: Faction) -> EntityId {
        let id = self.ids.next(EntityKind::Planetoid, owner_faction);
        self.planetoids.push(Planetoid::new(id, position, radius, owner_faction));
        id
    }

    pub fn spawn_moon(&mut self, centre: Vec3, radius: f32, owning_planetoid: EntityId) -> EntityId {
        let id = self.ids.next(EntityKind::Marker, engine_core::FACTION_NATURE);
        self.moons.push(MoonRecord { id, centre, radius, owning_planetoid });
        id
    }

    /// Spawn a moon-guard ship. `moon_id` must come from a prior `spawn_moon` call.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_moon_guard_ship(
        &mut self,
        faction: Faction,
        position: Vec3,
        forward: Vec3,
        radius: f32,
        speed_max: f64,
        acceleration: f64,
        rotation_rate: f64,
        max_health: f32,
        moon_id: EntityId,
    ) -> EntityId {
        let id = self.ids.next(EntityKind::Ship, faction);
        let ai = UnitAi::moon_guard(id, moon_id, &mut self.rng);
        self.ships.push(Ship::new(id, faction, position, forward, radius, speed_max, acceleration, rotation_rate, max_health, ai));
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn spawn_stopped_ship(
        &mut self,
        faction: Faction,
        position: Vec3,
        forward: Vec3,
        radius: f32,
        speed_max: f64,
        acceleration: f64,
        rotation_rate: f64,
        max_health: f32,
    ) -> EntityId {
        let id = self.ids.next(EntityKind::Ship, faction);
        let ai = UnitAi::stop(id);
        self.ships.push(Ship::new(id, faction, position, forward, radius, speed_max, acceleration, rotation_rate, max_health, ai));
        id
    }

    // ---- Write-mutation adapter ----

    pub fn add_explosion(&mut self, position: Vec3, size: f32, kind: u32) {
        self.explosions.add(position, size, kind, self.elapsed);
    }

    pub fn add_bullet(&mut self, position: Vec3, forward: Vec3, source: EntityId) -> EntityId {
        let faction = self.ship(source).map(|s| s.faction).unwrap_or(engine_core::FACTION_NATURE);
        let id = self.ids.next(EntityKind::Bullet, faction);
        self.bullets.push(Bullet::new(id, position, forward, source, BULLET_SPEED, BULLET_RADIUS));
        id
    }

    /// Missiles are unimplemented beyond forwarding to `add_bullet`.
    pub fn add_missile(&mut self, position: Vec3, forward: Vec3, source: EntityId) -> EntityId {
        self.add_bullet(position, forward, source)
    }

    // ---- Read-only query adapter ----

    fn ship(&self, id: EntityId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    pub fn position(&self, id: EntityId) -> Option<Vec3> {
        self.ship(id)
            .map(|s| s.body.position())
            .or_else(|| self.bullets.iter().find(|b| b.id == id).map(|b| b.body.position()))
            .or_else(|| self.planetoids.iter().find(|p| p.id == id).map(|p| p.body.position()))
    }

    pub fn velocity(&self, id: EntityId) -> Vec3 {
        self.ship(id).map(|s| s.body.velocity).unwrap_or(Vec3::ZERO)
    }

    pub fn forward(&self, id: EntityId) -> Vec3 {
        self.ship(id).map(|s| s.body.forward()).unwrap_or(Vec3::ZERO)
    }

    pub fn up(&self, id: EntityId) -> Vec3 {
        self.ship(id).map(|s| s.body.up()).unwrap_or(Vec3::ZERO)
    }

    pub fn right(&self, id: EntityId) -> Vec3 {
        self.ship(id).map(|s| s.body.right()).unwrap_or(Vec3::ZERO)
    }

    pub fn radius(&self, id: EntityId) -> f32 {
        self.ship(id).map(|s| s.body.radius).unwrap_or(0.0)
    }

    pub fn health(&self, id: EntityId) -> f32 {
        self.ship(id).map(|s| s.health).unwrap_or(0.0)
    }

    pub fn speed_max(&self, id: EntityId) -> f64 {
        self.ship(id).map(|s| s.speed_max).unwrap_or(0.0)
    }

    pub fn acceleration(&self, id: EntityId) -> f64 {
        self.ship(id).map(|s| s.acceleration).unwrap_or(0.0)
    }

    pub fn rotation_rate(&self, id: EntityId) -> f64 {
        self.ship(id).map(|s| s.rotation_rate).unwrap_or(0.0)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.ship(id).map(|s| s.is_alive()).unwrap_or(false)
    }

    /// Unsupported in this minimal harness: there is no fleet/command hierarchy, so
    /// this always reports false rather than inventing one.
    pub fn is_ship_command_ship(&self, _id: EntityId) -> bool {
        false
    }

    /// Unsupported in this minimal harness: no multi-planet ownership tree exists;
    /// always the "nothing" id.
    pub fn planet_id(&self, _id: EntityId) -> EntityId {
        EntityId::NOTHING
    }

    pub fn moon_count(&self) -> usize {
        self.moons.len()
    }

    pub fn moon_id(&self, index: usize) -> EntityId {
        self.moons.get(index).map(|m| m.id).unwrap_or(EntityId::NOTHING)
    }

    pub fn is_planetoid_moon(&self, planetoid_id: EntityId) -> bool {
        self.moons.iter().any(|m| m.owning_planetoid == planetoid_id)
    }

    pub fn nearest_planetoid_id(&self, position: Vec3) -> EntityId {
        self.planetoids
            .iter()
            .min_by(|a, b| {
                let da = (a.body.position() - position).length_squared();
                let db = (b.body.position() - position).length_squared();
                da.partial_cmp(&db).unwrap()
            })
            .map(|p| p.id)
            .unwrap_or(EntityId::NOTHING)
    }

    pub fn ship_ids_within(&self, sphere_centre: Vec3, sphere_radius: f64) -> Vec<EntityId> {
        self.ships
            .iter()
            .filter(|s| s.is_alive() && (s.body.position() - sphere_centre).length() as f64 <= sphere_radius)
            .map(|s| s.id)
            .collect()
    }

    pub fn ring_density(&self, position: Vec3) -> f64 {
        self.ring.density_at(position)
    }

    pub fn ring_particles(&self, sphere_centre: Vec3, sphere_radius: f64) -> Result<Vec<ParticleSummary>, SimError> {
        Ok(self.ring.particles_in(sphere_centre, sphere_radius)?)
    }

    pub fn explosions(&self) -> impl Iterator<Item = &ExplosionRecord> {
        self.explosions.live()
    }

    // ---- Draw-facing accessors: read-only iteration for the render adapter. ----

    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships.iter()
    }

    pub fn bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.bullets.iter()
    }

    pub fn planetoids(&self) -> impl Iterator<Item = &Planetoid> {
        self.planetoids.iter()
    }

    pub fn ring_particles_to_draw(&self, camera_position: Vec3, halo_sectors: i32, max_distance: f64) -> Vec<ParticleSummary> {
        self.ring.particles_to_draw(camera_position, halo_sectors, max_distance).unwrap_or_default()
    }

    // ---- The tick ----

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;

        // 1. Advance explosion ageing.
        self.explosions.advance(self.elapsed);

        // 2. Run AI.
        self.run_ai(dt);

        // 3. Integrate bodies.
        self.integrate_bodies(dt);

        // 4. Resolve collisions.
        self.resolve_collisions();

        // 5. Reload timers and death transitions.
        self.finish_tick(dt);
    }

    fn run_ai(&mut self, dt: f32) {
        self.ai_time.start_ai_budget(self.ai_budget);

        let ship_snapshots: Vec<ShipSnapshot> = self
            .ships
            .iter()
            .map(|s| ShipSnapshot {
                id: s.id,
                position: s.body.position(),
                velocity: s.body.velocity,
                faction: s.faction,
                radius: s.body.radius,
                alive: s.is_alive(),
            })
            .collect();
        let planetoid_snapshots: Vec<PlanetoidSnapshot> = self
            .planetoids
            .iter()
            .map(|p| PlanetoidSnapshot { id: p.id, position: p.body.position(), radius: p.body.radius })
            .collect();

        let mut fire_requests: Vec<EntityId> = Vec::new();

        for ship in self.ships.iter_mut() {
            if !ship.is_alive() {
                continue;
            }
            let agent = AgentState {
                position: ship.body.position(),
                velocity: ship.body.velocity,
                forward: ship.body.forward(),
                up: ship.body.up(),
                right: ship.body.right(),
                radius: ship.body.radius,
                speed_max: ship.speed_max,
                acceleration: ship.acceleration,
                is_alive: true,
            };
            let AiOutput { desired_velocity, fire } =
                ship.ai.tick(&agent, ship.faction, &ship_snapshots, &self.ring, &planetoid_snapshots, &self.moons, &mut self.rng);
            ship.apply_steering(desired_velocity, dt);
            if fire && ship.can_fire() {
                fire_requests.push(ship.id);
            }
        }

        for shooter_id in fire_requests {
            if let Some(ship) = self.ships.iter_mut().find(|s| s.id == shooter_id) {
                ship.mark_reloading();
                let position = ship.body.position();
                let forward = ship.body.forward();
                self.bullets.push(Bullet::new(
                    self.ids.next(EntityKind::Bullet, ship.faction),
                    position,
                    forward,
                    shooter_id,
                    BULLET_SPEED,
                    BULLET_RADIUS,
                ));
            }
        }
    }

    fn integrate_bodies(&mut self, dt: f32) {
        for ship in self.ships.iter_mut() {
            if ship.state != LifeState::Dead {
                ship.body.integrate(dt);
            }
        }
        for bullet in self.bullets.iter_mut() {
            if bullet.state == LifeState::Alive {
                bullet.body.integrate(dt);
                bullet.age += dt;
                if bullet.age > crate::constants::BULLET_LIFESPAN {
                    bullet.mark_dying();
                }
            }
        }
    }

    fn resolve_collisions(&mut self) {
        // Ships vs ring particles.
        for i in 0..self.ships.len() {
            if !self.ships[i].is_alive() {
                continue;
            }
            let position = self.ships[i].body.position();
            let radius = self.ships[i].body.radius as f64;
            if self.ring.collides(position, radius).unwrap_or(false) {
                self.ships[i].mark_dying();
            }
        }

        // Ships vs planetoids.
        for i in 0..self.ships.len() {
            if !self.ships[i].is_alive() {
                continue;
            }
            let position = self.ships[i].body.position();
            let radius = self.ships[i].body.radius;
            let hit = self.planetoids.iter().any(|p| spheres_overlap(position, radius, p.body.position(), p.body.radius));
            if hit {
                self.ships[i].mark_dying();
            }
        }

        // Ships vs ships, j > i.
        for i in 0..self.ships.len() {
            if !self.ships[i].is_alive() {
                continue;
            }
            for j in (i + 1)..self.ships.len() {
                if !self.ships[j].is_alive() {
                    continue;
                }
                let overlap = spheres_overlap(
                    self.ships[i].body.position(),
                    self.ships[i].body.radius,
                    self.ships[j].body.position(),
                    self.ships[j].body.radius,
                );
                if overlap {
                    self.ships[i].mark_dying();
                    self.ships[j].mark_dying();
                }
            }
        }

        // Bullets vs ring particles / planetoids.
        for b in 0..self.bullets.len() {
            if !self.bullets[b].is_alive() {
                continue;
            }
            let position = self.bullets[b].body.position();
            let radius = self.bullets[b].body.radius as f64;
            let hit_ring = self.ring.collides(position, radius).unwrap_or(false);
            let hit_planetoid = self
                .planetoids
                .iter()
                .any(|p| spheres_overlap(position, radius as f32, p.body.position(), p.body.radius));
            if hit_ring || hit_planetoid {
                self.bullets[b].mark_dying();
            }
        }

        // Bullets vs ships, skipping the bullet's own source.
        for b in 0..self.bullets.len() {
            if !self.bullets[b].is_alive() {
                continue;
            }
            let source = self.bullets[b].source;
            let position = self.bullets[b].body.position();
            let radius = self.bullets[b].body.radius;
            for s in 0..self.ships.len() {
                if !self.ships[s].is_alive() || self.ships[s].id == source {
                    continue;
                }
                if spheres_overlap(position, radius, self.ships[s].body.position(), self.ships[s].body.radius) {
                    self.ships[s].apply_damage(1.0);
                    self.bullets[b].mark_dying();
                    break;
                }
            }
        }
    }

    fn finish_tick(&mut self, dt: f32) {
        let elapsed = self.elapsed;
        for ship in self.ships.iter_mut() {
            ship.tick_reload(dt);
            if ship.state == LifeState::Dying {
                self.explosions.add(ship.body.previous_position, SHIP_DEATH_EXPLOSION_SIZE, 0, elapsed);
                ship.state = LifeState::Dead;
            }
        }
        for bullet in self.bullets.iter_mut() {
            if bullet.state == LifeState::Dying {
                self.explosions.add(bullet.body.previous_position, BULLET_EXPLOSION_SIZE, 0, elapsed);
                bullet.state = LifeState::Dead;
            }
        }
        self.bullets.retain(|b| b.state != LifeState::Dead);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world() -> World {
        World::new(42, RingParameters { density_max: 0.0, ..RingParameters::default() }).unwrap()
    }

    #[test]
    fn bullet_never_collides_with_its_own_source() {
        let mut world = test_world();
        let shooter = world.spawn_stopped_ship(1, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 10.0, 100.0, 10.0, 1.0, 100.0);
        let bullet_id = world.add_bullet(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), shooter);
        for _ in 0..5 {
            world.tick(1.0 / 60.0);
        }
        assert!(world.is_alive(shooter));
        let _ = bullet_id;
    }

    #[test]
    fn bullet_striking_a_ship_reduces_its_health() {
        let mut world = test_world();
        let target = world.spawn_stopped_ship(2, Vec3::new(0.0, 0.0, -20.0), Vec3::new(0.0, 0.0, -1.0), 10.0, 0.0, 1.0, 1.0, 100.0);
        let shooter = world.spawn_stopped_ship(1, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 10.0, 0.0, 1.0, 1.0, 100.0);
        world.add_bullet(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), shooter);
        let health_before = world.health(target);
        for _ in 0..10 {
            world.tick(1.0 / 60.0);
        }
        assert!(world.health(target) < health_before);
    }

    #[test]
    fn explosion_buffer_never_exceeds_capacity() {
        let mut world = test_world();
        for _ in 0..300 {
            world.add_explosion(Vec3::ZERO, 1.0, 0);
        }
        assert_eq!(world.explosions().count(), ExplosionStore::CAPACITY);
    }

    #[test]
    fn nearest_planetoid_id_is_nothing_when_none_exist() {
        let world = test_world();
        assert_eq!(world.nearest_planetoid_id(Vec3::ZERO), EntityId::NOTHING);
    }

    #[test]
    fn ring_sector_query_agrees_with_ring_system_directly() {
        let world = test_world();
        let direct = world.ring_system().density_at(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(world.ring_density(Vec3::new(10.0, 0.0, 0.0)), direct);
    }

    #[test]
    fn ai_time_diagnostics_update_after_a_tick() {
        let mut world = test_world();
        world.spawn_stopped_ship(1, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 10.0, 50.0, 5.0, 1.0, 50.0);
        world.tick(1.0 / 60.0);
        assert!(world.ai_time_remaining() <= Duration::from_secs_f64(crate::constants::AI_TIME_BUDGET_SECONDS));
        assert_eq!(world.ai_time_overshot(), Duration::ZERO);
    }

    #[test]
    fn tiny_ai_budget_reports_an_overshoot() {
        let mut world = test_world();
        world.spawn_stopped_ship(1, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 10.0, 50.0, 5.0, 1.0, 50.0);
        world.set_ai_budget(Duration::ZERO);
        world.tick(1.0 / 60.0);
        assert_eq!(world.ai_time_remaining(), Duration::ZERO);
    }
}
