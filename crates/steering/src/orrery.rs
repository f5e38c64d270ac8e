//! The orrery: a sum-of-epicycles position function of time, used as a test-harness
//! target for the pursue/evade/aim steering laws. Not part of the simulation's
//! production world state — grounded in `procgen::star_system::OrbitalBody`'s single-
//! circle `orbital_position`, generalised to a sum of several axis-rotated circles.

use glam::{Quat, Vec3};

/// One summand in an orrery's position formula: a rotation of fixed radius about a
/// fixed axis at a fixed angular rate, starting from an initial direction.
#[derive(Debug, Clone, Copy)]
pub struct Epicycle {
    pub axis: Vec3,
    pub radius: f32,
    pub initial_direction: Vec3,
    pub angular_rate: f32,
    pub colour: [f32; 3],
}

impl Epicycle {
    pub fn position(&self, t: f32) -> Vec3 {
        let rotation = Quat::from_axis_angle(self.axis.normalize_or_zero(), self.angular_rate * t);
        (rotation * self.initial_direction.normalize_or_zero()) * self.radius
    }
}

/// A sum of epicycles; `position(t)` is purely a function of time.
#[derive(Debug, Clone, Default)]
pub struct Orrery {
    pub epicycles: Vec<Epicycle>,
}

impl Orrery {
    pub fn new(epicycles: Vec<Epicycle>) -> Self {
        Self { epicycles }
    }

    pub fn position(&self, t: f32) -> Vec3 {
        self.epicycles.iter().map(|e| e.position(t)).sum()
    }

    /// The instantaneous velocity at time `t`, computed analytically from each
    /// epicycle's angular rate (derivative of a rotating vector).
    pub fn velocity(&self, t: f32) -> Vec3 {
        self.epicycles
            .iter()
            .map(|e| {
                let rotation = Quat::from_axis_angle(e.axis.normalize_or_zero(), e.angular_rate * t);
                let radial = rotation * e.initial_direction.normalize_or_zero();
                let tangential = e.axis.normalize_or_zero().cross(radial);
                tangential * e.radius * e.angular_rate
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_epicycle_traces_a_circle() {
        let orrery = Orrery::new(vec![Epicycle {
            axis: Vec3::Y,
            radius: 10.0,
            initial_direction: Vec3::X,
            angular_rate: 1.0,
            colour: [1.0, 0.0, 0.0],
        }]);
        let p0 = orrery.position(0.0);
        assert!((p0.length() - 10.0).abs() < 1e-4);
        let quarter_turn = orrery.position(std::f32::consts::FRAC_PI_2);
        assert!((quarter_turn.length() - 10.0).abs() < 1e-3);
        assert!((p0 - quarter_turn).length() > 1.0);
    }

    #[test]
    fn sum_of_epicycles_is_additive() {
        let a = Epicycle { axis: Vec3::Y, radius: 5.0, initial_direction: Vec3::X, angular_rate: 0.5, colour: [0.0; 3] };
        let b = Epicycle { axis: Vec3::X, radius: 3.0, initial_direction: Vec3::Y, angular_rate: 1.2, colour: [0.0; 3] };
        let orrery = Orrery::new(vec![a, b]);
        let combined = orrery.position(0.7);
        let separate = a.position(0.7) + b.position(0.7);
        assert!((combined - separate).length() < 1e-5);
    }
}
