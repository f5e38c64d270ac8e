//! Tuning constants for bodies, weapons, and AI. Mirrors the authoritative table
//! (`game::config::SimConfig` serializes the same defaults into `config.ron`).

/// Ring sector edge length, also defined in `procgen::sector::SECTOR_EDGE`.
pub const SECTOR_EDGE: f64 = 500.0;
/// Default `±N` sector halo considered by the ring system's draw query.
pub const DRAW_HALO_SECTORS: i32 = 4;

/// Bullet collision radius. Bullets are points for collision purposes.
pub const BULLET_RADIUS: f32 = 0.0;
/// Seconds a bullet remains alive before expiring.
pub const BULLET_LIFESPAN: f32 = 3.0;
/// Bullet muzzle speed, world units/second.
pub const BULLET_SPEED: f32 = 1500.0;
/// Size of the explosion spawned when a bullet expires or strikes a target.
pub const BULLET_EXPLOSION_SIZE: f32 = 10.0;

/// Maximum live explosion records retained at once.
pub const EXPLOSION_COUNT_MAX: usize = 256;
/// Seconds an explosion record remains before being retired.
pub const EXPLOSION_LIFESPAN: f32 = 0.75;
/// Explosion size for a ship's death, distinct from a bullet's.
pub const SHIP_DEATH_EXPLOSION_SIZE: f32 = 50.0;

/// Ship collision radius.
pub const SHIP_RADIUS: f32 = 10.0;
/// Seconds between shots once reloading starts.
pub const SHIP_RELOAD_TIME: f32 = 0.25;
/// Health at or below which a ship transitions dying -> dead.
pub const SHIP_HEALTH_DEAD_AT: f32 = 0.001;

/// Padding factor in the `arrive` braking-distance formula.
pub const SLOW_DISTANCE_PADDING_FACTOR: f64 = 2.0;
/// Minimum clearance an explore/patrol goal must keep from the agent.
pub const EXPLORE_DISTANCE_NEW_POSITION: f64 = 100.0;
/// Floor on the `avoid` filter's speed-reduction factor.
pub const AVOID_SPEED_FACTOR_MIN: f64 = 0.1;
/// Minimum usable norm for the `avoid` filter's sideways vector.
pub const AVOID_SIDEWAYS_NORM_MIN: f64 = 0.01;
/// Weight of the fractal-noise perturbation added to the ring density field.
pub const RING_NOISE_FACTOR: f64 = 0.2;

/// How many ticks a moon-guard agent's scan cache is reused before refreshing.
pub const SCAN_COUNT_MAX: u32 = 5;
/// Radius within which ships are cached as "nearby" by the moon-guard scan.
pub const SCAN_DISTANCE_SHIP: f64 = 2_500.0;
/// Radius within which ring particles are cached as "nearby" by the moon-guard scan.
pub const SCAN_DISTANCE_RING_PARTICLE: f64 = 500.0;
/// Distance ahead of the agent the ring-particle scan point is taken from.
pub const SCAN_RING_PARTICLE_LOOKAHEAD: f64 = 500.0;

/// `avoid` clearance/avoid-distance pairs used by moon-guard against each obstacle kind.
pub const SHIP_CLEARANCE: f64 = 50.0;
pub const SHIP_AVOID_DISTANCE: f64 = 200.0;
pub const RING_PARTICLE_CLEARANCE: f64 = 100.0;
pub const RING_PARTICLE_AVOID_DISTANCE: f64 = 500.0;
pub const PLANETOID_CLEARANCE: f64 = 200.0;
pub const PLANETOID_AVOID_DISTANCE: f64 = 1_000.0;

/// Maximum angle (radians) between current velocity and the aim direction within
/// which a moon-guard ship considers itself "on target" and will fire if reloaded.
pub const SHOOT_ANGLE_RADIANS_MAX: f64 = 0.1;

/// Default per-tick time budget for the AI pass (one 60 Hz frame), used only for the
/// diagnostic `getAiTimeElapsed`/`getAiTimeRemaining`/`getAiTimeOvershot` queries;
/// never enforced, since the tick never preempts AI work.
pub const AI_TIME_BUDGET_SECONDS: f64 = 1.0 / 60.0;
