//! Ship, bullet, planetoid, and moon records, plus the explosion ring buffer.
//! Entity kind is a tagged sum dispatched on at the handful of call sites
//! that need it; there is no virtual method table.

use engine_core::{EntityId, Faction};
use glam::Vec3;
use physics::KinematicBody;

use crate::ai::UnitAi;
use crate::constants::{SHIP_HEALTH_DEAD_AT, SHIP_RELOAD_TIME};

/// A mobile or stationary object's life-cycle stage. `Dying` is transient: it is set
/// during collision resolution and cleared to `Dead` in the same tick's final step,
/// after the death explosion has been able to read `previous_position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    Alive,
    Dying,
    Dead,
}

pub struct Ship {
    pub id: EntityId,
    pub faction: Faction,
    pub body: KinematicBody,
    pub health: f32,
    pub max_health: f32,
    pub speed_max: f64,
    pub acceleration: f64,
    pub rotation_rate: f64,
    pub reload_timer: f32,
    pub reloading: bool,
    pub state: LifeState,
    pub ai: UnitAi,
}

impl Ship {
    pub fn new(
        id: EntityId,
        faction: Faction,
        position: Vec3,
        forward: Vec3,
        radius: f32,
        speed_max: f64,
        acceleration: f64,
        rotation_rate: f64,
        max_health: f32,
        ai: UnitAi,
    ) -> Self {
        let mut body = KinematicBody::new(position, radius);
        body.transform.look_rotation(forward, Vec3::Y);
        Self {
            id,
            faction,
            body,
            health: max_health,
            max_health,
            speed_max,
            acceleration,
            rotation_rate,
            reload_timer: 0.0,
            reloading: false,
            state: LifeState::Alive,
            ai,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    /// Turn toward `desired_velocity` at this ship's rotation rate, then set speed
    /// along the (now-updated) forward direction, clamped to `speed_max`.
    pub fn apply_steering(&mut self, desired_velocity: Vec3, dt: f32) {
        if desired_velocity.length_squared() > 1e-9 {
            let max_angle = (self.rotation_rate * dt as f64) as f32;
            self.body.transform.rotate_toward(desired_velocity, max_angle);
        }
        let speed = (desired_velocity.length() as f64).min(self.speed_max) as f32;
        self.body.set_speed(speed);
    }

    pub fn mark_reloading(&mut self) {
        self.reloading = true;
        self.reload_timer = SHIP_RELOAD_TIME;
    }

    pub fn can_fire(&self) -> bool {
        !self.reloading
    }

    pub fn tick_reload(&mut self, dt: f32) {
        if self.reloading {
            self.reload_timer -= dt;
            if self.reload_timer <= 0.0 {
                self.reload_timer = 0.0;
                self.reloading = false;
            }
        }
    }

    pub fn apply_damage(&mut self, amount: f32) {
        self.health -= amount;
        if self.health <= SHIP_HEALTH_DEAD_AT && self.state == LifeState::Alive {
            self.state = LifeState::Dying;
        }
    }

    pub fn mark_dying(&mut self) {
        if self.state == LifeState::Alive {
            self.state = LifeState::Dying;
        }
    }
}

pub struct Bullet {
    pub id: EntityId,
    pub source: EntityId,
    pub body: KinematicBody,
    pub age: f32,
    pub state: LifeState,
}

impl Bullet {
    pub fn new(id: EntityId, origin: Vec3, forward: Vec3, source: EntityId, speed: f32, radius: f32) -> Self {
        let mut body = KinematicBody::new(origin, radius);
        body.transform.look_rotation(forward, Vec3::Y);
        body.set_speed(speed);
        Self { id, source, body, age: 0.0, state: LifeState::Alive }
    }

    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    pub fn mark_dying(&mut self) {
        if self.state == LifeState::Alive {
            self.state = LifeState::Dying;
        }
    }
}

pub struct Planetoid {
    pub id: EntityId,
    pub body: KinematicBody,
    pub owner_faction: Faction,
    pub actively_claimed: bool,
}

impl Planetoid {
    pub fn new(id: EntityId, position: Vec3, radius: f32, owner_faction: Faction) -> Self {
        Self {
            id,
            body: KinematicBody::new(position, radius),
            owner_faction,
            actively_claimed: owner_faction != engine_core::FACTION_NATURE,
        }
    }
}

/// A small, authored spherical body a moon-guard ship patrols around.
#[derive(Debug, Clone, Copy)]
pub struct MoonRecord {
    pub id: EntityId,
    pub centre: Vec3,
    pub radius: f32,
    pub owning_planetoid: EntityId,
}

/// One retired-or-live explosion entry.
#[derive(Debug, Clone, Copy)]
pub struct ExplosionRecord {
    pub position: Vec3,
    pub size: f32,
    pub kind: u32,
    pub created_at: f32,
}

/// A fixed-capacity ring buffer of explosion records. When full, adding a new record
/// overwrites the oldest slot in place rather than growing or rejecting it.
pub struct ExplosionStore {
    records: Vec<Option<ExplosionRecord>>,
    next_slot: usize,
}

impl ExplosionStore {
    pub const CAPACITY: usize = crate::constants::EXPLOSION_COUNT_MAX;

    pub fn new() -> Self {
        Self { records: vec![None; Self::CAPACITY], next_slot: 0 }
    }

    pub fn add(&mut self, position: Vec3, size: f32, kind: u32, now: f32) {
        self.records[self.next_slot] = Some(ExplosionRecord { position, size, kind, created_at: now });
        self.next_slot = (self.next_slot + 1) % Self::CAPACITY;
    }

    /// Retire any record older than `EXPLOSION_LIFESPAN` as of `now`.
    pub fn advance(&mut self, now: f32) {
        for slot in self.records.iter_mut() {
            if let Some(record) = slot {
                if now - record.created_at > crate::constants::EXPLOSION_LIFESPAN {
                    *slot = None;
                }
            }
        }
    }

    pub fn live(&self) -> impl Iterator<Item = &ExplosionRecord> {
        self.records.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }
}

impl Default for ExplosionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explosion_store_caps_at_capacity_and_drops_oldest() {
        let mut store = ExplosionStore::new();
        for i in 0..300 {
            store.add(Vec3::ZERO, 1.0, 0, i as f32);
        }
        assert_eq!(store.live_count(), ExplosionStore::CAPACITY);
        assert!(store.live().all(|r| r.created_at >= 44.0));
    }

    #[test]
    fn advance_retires_aged_out_records() {
        let mut store = ExplosionStore::new();
        store.add(Vec3::ZERO, 1.0, 0, 0.0);
        store.advance(10.0);
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn ship_health_at_threshold_transitions_to_dying() {
        let ai = UnitAi::stop(EntityId::new(engine_core::EntityKind::Ship, 1, 0));
        let mut ship = Ship::new(
            EntityId::new(engine_core::EntityKind::Ship, 1, 0),
            1,
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            10.0,
            100.0,
            10.0,
            1.0,
            1.0,
            ai,
        );
        ship.apply_damage(1.0);
        assert_eq!(ship.state, LifeState::Dying);
    }
}
