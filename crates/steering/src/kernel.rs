//! The steering kernel: one instance per agent, composing the ten named
//! behaviours plus the `avoid` obstacle filter.
//!
//! Grounded directly in `SteeringBehaviour` (`FleetNameSteeringBehaviours.cpp`).

use engine_core::EntityId;
use glam::Vec3;
use rand::Rng;

use crate::agent::AgentState;
use crate::constants::{
    AVOID_SIDEWAYS_NORM_MIN, AVOID_SPEED_FACTOR_MIN, EXPLORE_DISTANCE_NEW_POSITION,
    EXPLORE_POSITION_ATTEMPT_COUNT, NO_INTERSECTION, SLOW_DISTANCE_PADDING_FACTOR,
};
use crate::error::SteeringError;
use crate::intercept::{aim_direction, intercept_time_moving};

/// Which behaviour most recently produced the kernel's stored goal. Changing the tag
/// (or the parameters of `explore`/`patrolSphere`) invalidates the stored goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviourTag {
    Stop,
    Arrive,
    Seek,
    Flee,
    Pursue,
    Evade,
    Aim,
    Explore,
    Escort,
    PatrolSphere,
}

/// Per-agent steering state: the last-invoked behaviour tag plus the goal positions
/// that `explore` and `patrolSphere` reuse across ticks.
#[derive(Debug, Clone)]
pub struct SteeringKernel {
    agent_id: EntityId,
    tag: BehaviourTag,
    explore_goal: Option<Vec3>,
    desired_distance: f64,
    desired_distance_tolerance: f64,
    sphere_center: Vec3,
}

impl SteeringKernel {
    pub fn new(agent_id: EntityId) -> Self {
        Self {
            agent_id,
            tag: BehaviourTag::Stop,
            explore_goal: None,
            desired_distance: 0.0,
            desired_distance_tolerance: 1.0,
            sphere_center: Vec3::ZERO,
        }
    }

    pub fn agent_id(&self) -> EntityId {
        self.agent_id
    }

    pub fn tag(&self) -> BehaviourTag {
        self.tag
    }

    fn set_tag(&mut self, tag: BehaviourTag) {
        if self.tag != tag {
            self.explore_goal = None;
        }
        self.tag = tag;
    }

    /// stop: return zero.
    pub fn stop(&mut self, agent: &AgentState) -> Vec3 {
        self.set_tag(BehaviourTag::Stop);
        let _ = agent;
        Vec3::ZERO
    }

    /// seek(target): unit vector (target - agent) * vMax.
    pub fn seek(&mut self, agent: &AgentState, target: Vec3) -> Vec3 {
        self.set_tag(BehaviourTag::Seek);
        if !agent.is_alive {
            return Vec3::ZERO;
        }
        let delta = target - agent.position;
        if delta.length_squared() < 1e-12 {
            return Vec3::ZERO;
        }
        delta.normalize() * agent.speed_max as f32
    }

    /// flee(target): -seek(target).
    pub fn flee(&mut self, agent: &AgentState, target: Vec3) -> Vec3 {
        let result = self.seek(agent, target);
        self.set_tag(BehaviourTag::Flee);
        -result
    }

    fn max_safe_speed(distance: f64, acceleration: f64) -> f64 {
        (2.0 * distance * acceleration).max(0.0).sqrt() / SLOW_DISTANCE_PADDING_FACTOR
    }

    /// arrive(target): decelerate smoothly so as not to overshoot.
    pub fn arrive(&mut self, agent: &AgentState, target: Vec3) -> Vec3 {
        self.set_tag(BehaviourTag::Arrive);
        if !agent.is_alive {
            return Vec3::ZERO;
        }
        let delta = target - agent.position;
        let distance = delta.length() as f64;
        if distance < 1e-9 {
            return Vec3::ZERO;
        }
        let speed = Self::max_safe_speed(distance, agent.acceleration).min(agent.speed_max);
        delta.normalize() * speed as f32
    }

    /// pursue(target): intercept a moving target at vMax, falling back to copying its
    /// direction of travel if no intercept solution exists.
    pub fn pursue(&mut self, agent: &AgentState, target_position: Vec3, target_velocity: Vec3) -> Vec3 {
        self.set_tag(BehaviourTag::Pursue);
        if !agent.is_alive {
            return Vec3::ZERO;
        }
        let direction = aim_direction(agent.position, agent.speed_max, target_position, target_velocity);
        let direction = if direction == Vec3::ZERO {
            if target_velocity.length_squared() > 1e-12 {
                target_velocity.normalize()
            } else {
                return Vec3::ZERO;
            }
        } else {
            direction
        };
        direction * agent.speed_max as f32
    }

    /// evade(target): pursue with sign inverted.
    pub fn evade(&mut self, agent: &AgentState, target_position: Vec3, target_velocity: Vec3) -> Vec3 {
        let result = self.pursue(agent, target_position, target_velocity);
        self.set_tag(BehaviourTag::Evade);
        -result
    }

    /// aim(target, shotSpeed): desired velocity aligned with the direction needed to
    /// launch a projectile of speed `shot_speed` that intercepts the target.
    pub fn aim(
        &mut self,
        agent: &AgentState,
        target_position: Vec3,
        target_velocity: Vec3,
        shot_speed: f64,
    ) -> Vec3 {
        self.set_tag(BehaviourTag::Aim);
        if !agent.is_alive {
            return Vec3::ZERO;
        }
        let direction = aim_direction(agent.position, shot_speed, target_position, target_velocity);
        direction * agent.speed_max as f32
    }

    /// explore(dMin, dMax): wander toward a randomly re-drawn goal on a spherical
    /// shell of radius in [dMin, dMax] around the agent.
    pub fn explore(
        &mut self,
        agent: &AgentState,
        d_min: f64,
        d_max: f64,
        rng: &mut impl Rng,
    ) -> Result<Vec3, SteeringError> {
        if d_min <= EXPLORE_DISTANCE_NEW_POSITION {
            return Err(SteeringError::DesiredDistanceTooSmall(d_min));
        }
        if d_min > d_max {
            return Err(SteeringError::InvertedDistanceRange { min: d_min, max: d_max });
        }
        let params_changed = self.tag != BehaviourTag::Explore
            || (self.desired_distance - d_min).abs() > 1e-9
            || (self.desired_distance_tolerance - d_max).abs() > 1e-9;
        self.tag = BehaviourTag::Explore;
        self.desired_distance = d_min;
        self.desired_distance_tolerance = d_max;

        if !agent.is_alive {
            return Ok(Vec3::ZERO);
        }

        let needs_new_goal = params_changed
            || match self.explore_goal {
                None => true,
                Some(goal) => (goal - agent.position).length() < EXPLORE_DISTANCE_NEW_POSITION as f32,
            };

        if needs_new_goal {
            self.explore_goal = Some(Self::draw_shell_goal(agent.position, d_min, d_max, rng));
        }

        let goal = self.explore_goal.unwrap();
        Ok(self.seek(agent, goal))
    }

    fn draw_shell_goal(from: Vec3, d_min: f64, d_max: f64, rng: &mut impl Rng) -> Vec3 {
        for _ in 0..EXPLORE_POSITION_ATTEMPT_COUNT {
            let direction = random_unit_vector(rng);
            let radius = rng.gen_range(d_min..=d_max) as f32;
            let candidate = from + direction * radius;
            if (candidate - from).length() as f64 > EXPLORE_DISTANCE_NEW_POSITION {
                return candidate;
            }
        }
        // Fallback: a vector at the midpoint distance, guaranteed to clear the
        // minimum by construction since d_min > EXPLORE_DISTANCE_NEW_POSITION.
        from + random_unit_vector(rng) * ((d_min + d_max) * 0.5) as f32
    }

    /// escort(target, offset): hold station at a point offset from the target's own
    /// basis, then add the target's velocity so the escort tracks it.
    pub fn escort(
        &mut self,
        agent: &AgentState,
        target_position: Vec3,
        target_forward: Vec3,
        target_up: Vec3,
        target_right: Vec3,
        target_velocity: Vec3,
        offset: Vec3,
    ) -> Vec3 {
        let escort_point =
            target_position + target_forward * offset.x + target_up * offset.y + target_right * offset.z;
        let arrive_component = self.arrive(agent, escort_point);
        self.set_tag(BehaviourTag::Escort);
        if !agent.is_alive {
            return Vec3::ZERO;
        }
        agent.clamp_to_max_speed(arrive_component + target_velocity)
    }

    /// patrolSphere(centre, radius, tolerance): orbit a sphere, blending a radial
    /// correction (stay on the sphere) with a tangential pursuit of a wandering goal.
    pub fn patrol_sphere(
        &mut self,
        agent: &AgentState,
        centre: Vec3,
        radius: f64,
        tolerance: f64,
        rng: &mut impl Rng,
    ) -> Vec3 {
        let params_changed = self.tag != BehaviourTag::PatrolSphere
            || (self.sphere_center - centre).length_squared() > 1e-9
            || (self.desired_distance - radius).abs() > 1e-9
            || (self.desired_distance_tolerance - tolerance).abs() > 1e-9;
        self.tag = BehaviourTag::PatrolSphere;
        self.sphere_center = centre;
        self.desired_distance = radius;
        self.desired_distance_tolerance = tolerance;

        if !agent.is_alive {
            return Vec3::ZERO;
        }

        let needs_new_goal = params_changed
            || match self.explore_goal {
                None => true,
                Some(goal) => {
                    let projection = centre + (agent.position - centre).normalize_or_zero() * radius as f32;
                    (projection - goal).length() < EXPLORE_DISTANCE_NEW_POSITION as f32
                }
            };
        if needs_new_goal {
            self.explore_goal = Some(centre + random_unit_vector(rng) * radius as f32);
        }
        let goal = self.explore_goal.unwrap();

        let from_centre = agent.position - centre;
        let distance_from_centre = from_centre.length() as f64;
        let radial_error = ((distance_from_centre - radius) / tolerance.max(1e-9)).clamp(-1.0, 1.0);
        let radial_weight = radial_error * radial_error.abs(); // signed, squared, clamped to [-1, 1]

        let radial_direction = if distance_from_centre > 1e-9 {
            from_centre.normalize() * -(radial_weight.signum() as f32)
        } else {
            Vec3::ZERO
        };
        let tangential_direction = (goal - agent.position).normalize_or_zero();

        let combined = radial_direction * radial_weight.abs() as f32
            + tangential_direction * (1.0 - radial_weight.abs()) as f32;
        if combined.length_squared() < 1e-12 {
            return Vec3::ZERO;
        }
        combined.normalize() * agent.speed_max as f32
    }

    /// Obstacle-avoidance filter, composable after any base behaviour.
    pub fn avoid(
        &self,
        agent: &AgentState,
        original_velocity: Vec3,
        sphere_center: Vec3,
        sphere_radius: f64,
        clearance: f64,
        avoid_distance: f64,
        rng: &mut impl Rng,
    ) -> Vec3 {
        if !agent.is_alive || original_velocity.length_squared() < 1e-12 {
            return Vec3::ZERO;
        }

        let to_sphere = sphere_center - agent.position;
        let distance = to_sphere.length() as f64;
        let combined_radius = agent.radius as f64 + sphere_radius;

        if distance > combined_radius + avoid_distance {
            return agent.clamp_to_max_speed(original_velocity);
        }

        let forward_dot = to_sphere.dot(agent.forward) as f64;
        if forward_dot < 0.0 {
            // Sphere is behind: the agent is departing.
            if distance <= combined_radius + clearance {
                let proximity = ((combined_radius + clearance - distance) / clearance.max(1e-9)).clamp(0.0, 1.0);
                let flee_direction = (-to_sphere).normalize_or_zero();
                let blended = (original_velocity.normalize_or_zero() * (1.0 - proximity as f32)
                    + flee_direction * proximity as f32)
                    .normalize_or_zero();
                let speed_factor = (1.0 - proximity).max(AVOID_SPEED_FACTOR_MIN);
                blended * (agent.speed_max * speed_factor) as f32
            } else {
                agent.clamp_to_max_speed(original_velocity)
            }
        } else {
            // Sphere is ahead: measure perpendicular (cylinder) distance from the
            // agent's forward ray.
            let along_forward = agent.forward * (forward_dot as f32);
            let perpendicular = to_sphere - along_forward;
            let cylinder_distance = perpendicular.length() as f64;

            if cylinder_distance > combined_radius + clearance {
                return agent.clamp_to_max_speed(original_velocity);
            }

            let proximity =
                ((combined_radius + clearance - cylinder_distance) / clearance.max(1e-9)).clamp(0.0, 1.0);

            let mut sideways = -perpendicular;
            if (sideways.length() as f64) < AVOID_SIDEWAYS_NORM_MIN {
                sideways = random_unit_vector(rng);
            }
            let sideways = sideways.normalize_or_zero();

            let blended = (original_velocity.normalize_or_zero() * (1.0 - proximity as f32)
                + sideways * proximity as f32)
                .normalize_or_zero();
            agent.clamp_to_max_speed(blended * agent.speed_max as f32)
        }
    }
}

fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    // Marsaglia's method: uniform on the sphere via rejection sampling in the disk.
    loop {
        let x: f32 = rng.gen_range(-1.0..1.0);
        let y: f32 = rng.gen_range(-1.0..1.0);
        let s = x * x + y * y;
        if s < 1.0 && s > 1e-9 {
            let factor = 2.0 * (1.0 - s).sqrt();
            return Vec3::new(x * factor, y * factor, 1.0 - 2.0 * s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn alive_agent(position: Vec3, speed_max: f64) -> AgentState {
        AgentState {
            position,
            velocity: Vec3::ZERO,
            forward: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            right: Vec3::X,
            radius: 10.0,
            speed_max,
            acceleration: 2.0,
            is_alive: true,
        }
    }

    #[test]
    fn stop_returns_zero() {
        let mut kernel = SteeringKernel::new(EntityId::DEFAULT);
        let agent = alive_agent(Vec3::ZERO, 100.0);
        assert_eq!(kernel.stop(&agent), Vec3::ZERO);
    }

    #[test]
    fn seek_reaches_max_speed_toward_target() {
        let mut kernel = SteeringKernel::new(EntityId::DEFAULT);
        let agent = alive_agent(Vec3::ZERO, 100.0);
        let result = kernel.seek(&agent, Vec3::new(3.0, 0.0, 4.0));
        assert!((result - Vec3::new(60.0, 0.0, 80.0)).length() < 1e-3);
    }

    #[test]
    fn dead_agent_behaviours_return_zero() {
        let mut kernel = SteeringKernel::new(EntityId::DEFAULT);
        let mut agent = alive_agent(Vec3::ZERO, 100.0);
        agent.is_alive = false;
        assert_eq!(kernel.seek(&agent, Vec3::new(3.0, 0.0, 4.0)), Vec3::ZERO);
        assert_eq!(kernel.arrive(&agent, Vec3::new(3.0, 0.0, 4.0)), Vec3::ZERO);
    }

    #[test]
    fn arrive_deceleration_matches_scenario() {
        let mut kernel = SteeringKernel::new(EntityId::DEFAULT);
        let agent = alive_agent(Vec3::ZERO, 10.0);
        let result = kernel.arrive(&agent, Vec3::new(0.0, 0.0, 4.0));
        let expected_speed = (2.0_f64 * 4.0 * 2.0).sqrt() / 2.0;
        assert!((result.length() as f64 - expected_speed).abs() < 1e-3);
        assert!(result.z > 0.0);
    }

    #[test]
    fn changing_behaviour_tag_invalidates_explore_goal() {
        let mut kernel = SteeringKernel::new(EntityId::DEFAULT);
        let mut rng = StdRng::seed_from_u64(7);
        let agent = alive_agent(Vec3::ZERO, 50.0);
        kernel.explore(&agent, 200.0, 300.0, &mut rng).unwrap();
        assert!(kernel.explore_goal.is_some());
        kernel.stop(&agent);
        assert!(kernel.explore_goal.is_none());
    }

    #[test]
    fn avoid_passes_through_when_far_away() {
        let kernel = SteeringKernel::new(EntityId::DEFAULT);
        let mut rng = StdRng::seed_from_u64(1);
        let agent = alive_agent(Vec3::ZERO, 100.0);
        let original = Vec3::new(0.0, 0.0, -50.0);
        let far_sphere = Vec3::new(0.0, 0.0, -100_000.0);
        let result = kernel.avoid(&agent, original, far_sphere, 10.0, 20.0, 50.0, &mut rng);
        assert!((result - original).length() < 1e-3);
    }

    #[test]
    fn avoid_non_collision_law_deflects_away_from_ahead_obstacle() {
        let kernel = SteeringKernel::new(EntityId::DEFAULT);
        let mut rng = StdRng::seed_from_u64(3);
        let agent = alive_agent(Vec3::ZERO, 100.0);
        let original = Vec3::new(0.0, 0.0, -100.0); // heading straight at the obstacle
        let obstacle = Vec3::new(0.0, 0.0, -50.0);
        let obstacle_radius = 10.0;
        let clearance = 20.0;
        let result = kernel.avoid(&agent, original, obstacle, obstacle_radius, clearance, 200.0, &mut rng);
        // The corrected ray should not pass through the obstacle's enlarged sphere.
        let to_obstacle = obstacle - agent.position;
        let forward = result.normalize_or_zero();
        let along = forward * forward.dot(to_obstacle);
        let perpendicular_distance = (to_obstacle - along).length() as f64;
        assert!(perpendicular_distance > 1e-3 || result.length() < original.length());
    }
}
