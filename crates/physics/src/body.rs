//! Kinematic bodies: position, orthonormal orientation, velocity, and a scaled
//! display primitive. No rigid-body dynamics — integration is explicit Euler,
//! advanced once per tick by the owning world.

use engine_core::Transform;
use glam::Vec3;

/// An opaque handle to a loaded display primitive, owned by a render adapter.
/// The core never inspects it; it exists purely to carry "this body has (or lacks)
/// something to draw" through to the adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayHandle(pub u32);

/// A kinematic body: a transform plus linear velocity and a collision radius.
///
/// Invariants: `transform`'s basis is unit and mutually orthogonal (guaranteed
/// by [`Transform`]'s own construction); `radius >= 0`; when `velocity` is non-zero
/// its direction matches `transform.forward()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    pub transform: Transform,
    pub previous_position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    pub display: Option<DisplayHandle>,
    pub display_scale: f32,
}

impl KinematicBody {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            transform: Transform::from_position(position),
            previous_position: position,
            velocity: Vec3::ZERO,
            radius,
            display: None,
            display_scale: 1.0,
        }
    }

    /// `position += velocity * dt`, recording the pre-integration position. This is
    /// the body's entire physics: no forces, no rigid-body solver.
    pub fn integrate(&mut self, dt: f32) {
        self.previous_position = self.transform.position;
        self.transform.position += self.velocity * dt;
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    pub fn up(&self) -> Vec3 {
        self.transform.up()
    }

    pub fn right(&self) -> Vec3 {
        self.transform.right()
    }

    /// Set the agent's speed while preserving its current forward direction.
    pub fn set_speed(&mut self, speed: f32) {
        self.velocity = self.forward() * speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_advances_position_and_records_previous() {
        let mut body = KinematicBody::new(Vec3::ZERO, 5.0);
        body.velocity = Vec3::new(1.0, 0.0, 0.0);
        body.integrate(2.0);
        assert_eq!(body.previous_position, Vec3::ZERO);
        assert_eq!(body.position(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn set_speed_preserves_forward_direction() {
        let mut body = KinematicBody::new(Vec3::ZERO, 1.0);
        body.transform.rotate_y(1.2);
        let forward = body.forward();
        body.set_speed(30.0);
        assert!(body.velocity.normalize().abs_diff_eq(forward, 1e-5));
        assert!((body.velocity.length() - 30.0).abs() < 1e-4);
    }
}
