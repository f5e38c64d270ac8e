//! Closed-form intercept-time solvers and the `aim` direction helper.
//!
//! Grounded in `SteeringBehaviour::getIntersectionTime`/`getAimDirection` in
//! `FleetNameSteeringBehaviours.cpp`.

use glam::Vec3;

use crate::constants::NO_INTERSECTION;

/// Time for an agent moving at `agent_speed` to reach a stationary `target_position`,
/// or [`NO_INTERSECTION`] if `agent_speed <= 0`.
pub fn intercept_time_stationary(agent_position: Vec3, agent_speed: f64, target_position: Vec3) -> f64 {
    if agent_speed <= 0.0 {
        return NO_INTERSECTION;
    }
    (target_position - agent_position).length() as f64 / agent_speed
}

/// Smallest non-negative `t` solving `|(target + target_velocity * t) - agent| = agent_speed * t`,
/// or [`NO_INTERSECTION`] if the equal-speed case degenerates or no non-negative root exists.
pub fn intercept_time_moving(
    agent_position: Vec3,
    agent_speed: f64,
    target_position: Vec3,
    target_velocity: Vec3,
) -> f64 {
    if agent_speed <= 0.0 {
        return NO_INTERSECTION;
    }

    let to_target = (target_position - agent_position).as_dvec3();
    let target_velocity = target_velocity.as_dvec3();

    let a = target_velocity.length_squared() - agent_speed * agent_speed;
    let b = 2.0 * target_velocity.dot(to_target);
    let c = to_target.length_squared();

    if a.abs() < 1e-9 {
        // Equal speeds: the quadratic degenerates to linear (or no solution).
        if b.abs() < 1e-12 {
            return NO_INTERSECTION;
        }
        let t = -c / b;
        return if t >= 0.0 { t } else { NO_INTERSECTION };
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return NO_INTERSECTION;
    }
    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    if lo >= 0.0 {
        lo
    } else if hi >= 0.0 {
        hi
    } else {
        NO_INTERSECTION
    }
}

/// Direction a projectile of speed `shot_speed` fired from `start` must travel to meet
/// `target_position + target_velocity * t` at the solved intercept time, or zero if
/// unsolvable.
pub fn aim_direction(start: Vec3, shot_speed: f64, target_position: Vec3, target_velocity: Vec3) -> Vec3 {
    let t = intercept_time_moving(start, shot_speed, target_position, target_velocity);
    if t == NO_INTERSECTION {
        return Vec3::ZERO;
    }
    let meeting_point = target_position + target_velocity * (t as f32);
    let delta = meeting_point - start;
    if delta.length_squared() < 1e-12 {
        return Vec3::ZERO;
    }
    delta.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intercept_stationary_matches_scenario() {
        let t = intercept_time_stationary(Vec3::ZERO, 5.0, Vec3::new(0.0, 30.0, 0.0));
        assert!((t - 6.0).abs() < 1e-9);
    }

    #[test]
    fn intercept_moving_matches_scenario() {
        let t = intercept_time_moving(
            Vec3::ZERO,
            10.0,
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(-5.0, 0.0, 0.0),
        );
        assert!((t - 100.0 / 15.0).abs() < 1e-6);
    }

    #[test]
    fn no_intercept_when_target_faster_and_fleeing() {
        let t = intercept_time_moving(
            Vec3::ZERO,
            1.0,
            Vec3::new(0.0, 0.0, 100.0),
            Vec3::new(0.0, 0.0, 100.0),
        );
        assert_eq!(t, NO_INTERSECTION);
    }

    #[test]
    fn intercept_correctness_law_holds_for_solved_cases() {
        let cases = [
            (Vec3::ZERO, 10.0, Vec3::new(50.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0)),
            (Vec3::new(1.0, 2.0, 3.0), 25.0, Vec3::new(-40.0, 10.0, 5.0), Vec3::new(2.0, -1.0, 0.0)),
        ];
        for (p, s, q, v) in cases {
            let t = intercept_time_moving(p, s, q, v);
            assert_ne!(t, NO_INTERSECTION);
            assert!(t >= 0.0);
            let meeting = q + v * (t as f32);
            let lhs = (meeting - p).length() as f64;
            let rhs = s * t;
            assert!((lhs - rhs).abs() < 1e-4, "lhs={lhs} rhs={rhs}");
        }
    }

    #[test]
    fn aim_round_trip_meets_target() {
        let start = Vec3::new(0.0, 0.0, 0.0);
        let shot_speed = 40.0;
        let target = Vec3::new(30.0, 0.0, 10.0);
        let target_vel = Vec3::new(-2.0, 0.0, 4.0);
        let d = aim_direction(start, shot_speed, target, target_vel);
        assert!(d != Vec3::ZERO);
        let t = intercept_time_moving(start, shot_speed, target, target_vel);
        let meeting = target + target_vel * (t as f32);
        let shot_pos = start + d * (shot_speed as f32) * (t as f32);
        assert!((shot_pos - meeting).length() < 1e-3);
    }
}
