//! Steering-kernel tuning constants, grounded in the reference source's
//! `FleetNameSteeringBehaviours.cpp` static consts.

/// Sentinel returned by the intercept solvers when no non-negative root exists.
pub const NO_INTERSECTION: f64 = -1.0e40;

/// Padding factor for `arrive`'s braking-distance formula; default ensures the agent
/// starts slowing early enough to avoid overshoot under discrete-time integration.
pub const SLOW_DISTANCE_PADDING_FACTOR: f64 = 2.0;

/// Minimum distance an explore/patrol goal must be replaced at, and the minimum
/// allowed `dMin` for `explore`/`patrolSphere` calls.
pub const EXPLORE_DISTANCE_NEW_POSITION: f64 = 100.0;

/// Retry budget when drawing a new explore/patrol goal that must clear
/// [`EXPLORE_DISTANCE_NEW_POSITION`] from the agent.
pub const EXPLORE_POSITION_ATTEMPT_COUNT: u32 = 100;

/// Floor on the speed-reduction factor the `avoid` filter applies while turning away
/// from an obstacle; prevents the agent from stalling completely.
pub const AVOID_SPEED_FACTOR_MIN: f64 = 0.1;

/// Below this norm, the sideways vector computed by `avoid`'s ahead-branch is
/// considered ill-defined and replaced by a random unit vector.
pub const AVOID_SIDEWAYS_NORM_MIN: f64 = 0.01;
