//! The kinematic state a steering behaviour needs to know about its agent.

use glam::Vec3;

/// A read-only snapshot of the agent's kinematic state, as seen by the steering
/// kernel. Callers (typically a unit-AI composition layer) build this from the
/// world's query interface each tick.
#[derive(Debug, Clone, Copy)]
pub struct AgentState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub radius: f32,
    pub speed_max: f64,
    pub acceleration: f64,
    pub is_alive: bool,
}

impl AgentState {
    /// Truncate a velocity to this agent's maximum speed, preserving direction.
    pub fn clamp_to_max_speed(&self, velocity: Vec3) -> Vec3 {
        let speed = velocity.length() as f64;
        if speed > self.speed_max && speed > 1e-9 {
            velocity * (self.speed_max / speed) as f32
        } else {
            velocity
        }
    }
}
