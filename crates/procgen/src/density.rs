//! Ring density field: analytic ring shape + spherical "holes" + noise perturbation,
//! producing an expected particle count per sector volume.
//!
//! Grounded in `RingSystem::getDensity` (original source, `cs409a5/RingSystem.cpp`).

use glam::Vec3;

use crate::error::RingSystemError;
use crate::noise::noise;
use crate::sector::SECTOR_EDGE;

/// A spherical region of suppressed density around a moon or other body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hole {
    pub centre: Vec3,
    pub radius: f64,
}

/// Ring geometry and density parameters governing the shaping formula below.
#[derive(Debug, Clone, PartialEq)]
pub struct RingParameters {
    pub half_thickness: f64,
    pub inner_radius: f64,
    pub outer_radius_base: f64,
    pub density_max: f64,
    pub density_factor: f64,
    pub holes: Vec<Hole>,
}

impl Default for RingParameters {
    fn default() -> Self {
        Self {
            half_thickness: 50.0,
            inner_radius: 8_000.0,
            outer_radius_base: 20_000.0,
            density_max: 30.0,
            density_factor: 0.01,
            holes: Vec::new(),
        }
    }
}

impl RingParameters {
    /// Validate the invariants: `halfThickness >= 0`, `innerRadius >= 0`,
    /// `outerRadiusBase >= innerRadius`, `densityMax >= 0`, `densityFactor in [0, 1]`,
    /// all holes have `radius >= 0`.
    pub fn validate(&self) -> Result<(), RingSystemError> {
        if self.half_thickness < 0.0 {
            return Err(RingSystemError::InvalidParameter("halfThickness must be >= 0"));
        }
        if self.inner_radius < 0.0 {
            return Err(RingSystemError::InvalidParameter("innerRadius must be >= 0"));
        }
        if self.outer_radius_base < self.inner_radius {
            return Err(RingSystemError::InvalidParameter("outerRadiusBase must be >= innerRadius"));
        }
        if self.density_max < 0.0 {
            return Err(RingSystemError::InvalidParameter("densityMax must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.density_factor) {
            return Err(RingSystemError::InvalidParameter("densityFactor must be in [0, 1]"));
        }
        if self.holes.iter().any(|h| h.radius < 0.0) {
            return Err(RingSystemError::InvalidParameter("hole radius must be >= 0"));
        }
        Ok(())
    }

    /// `densityAt(p)`: the analytic density field, steps 1-6.
    pub fn density_at(&self, p: Vec3) -> f64 {
        let p64 = p.as_dvec3();
        let xz_len = (p64.x * p64.x + p64.z * p64.z).sqrt();

        let d_thickness = self.half_thickness - p64.y.abs();
        let d_inner_edge = p64.length() - self.inner_radius;
        let mut d = d_thickness.min(d_inner_edge);

        if xz_len > self.outer_radius_base {
            let over = xz_len - self.outer_radius_base;
            let d_outer_edge = self.half_thickness - (over * over + p64.y * p64.y).sqrt();
            d = d.min(d_outer_edge);
        }

        for hole in &self.holes {
            let d_hole = (p64 - hole.centre.as_dvec3()).length() - hole.radius;
            d = d.min(d_hole);
        }

        let s = (d * self.density_factor).atan() * std::f64::consts::FRAC_2_PI;
        let perturbed = s + noise(p / SECTOR_EDGE as f32) as f64 * 0.2;

        if perturbed <= 0.0 {
            0.0
        } else {
            perturbed * self.density_max
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RingParameters {
        RingParameters {
            half_thickness: 50.0,
            inner_radius: 8_000.0,
            outer_radius_base: 20_000.0,
            density_max: 30.0,
            density_factor: 0.01,
            holes: Vec::new(),
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        let mut p = params();
        p.outer_radius_base = p.inner_radius - 1.0;
        assert!(p.validate().is_err());

        let mut p = params();
        p.density_factor = 1.5;
        assert!(p.validate().is_err());

        let mut p = params();
        p.holes.push(Hole { centre: Vec3::ZERO, radius: -1.0 });
        assert!(p.validate().is_err());
    }

    #[test]
    fn density_decreases_away_from_ring_midplane() {
        let p = params();
        // Deep inside the ring, away from any edge: density should be near density_max.
        let centre = Vec3::new(14_000.0, 0.0, 0.0);
        let edge = Vec3::new(14_000.0, 200.0, 0.0); // far above half_thickness
        assert!(p.density_at(centre) > p.density_at(edge));
        assert_eq!(p.density_at(edge), 0.0);
    }

    #[test]
    fn density_decreases_inside_inner_radius() {
        let p = params();
        let inside_ring = p.density_at(Vec3::new(14_000.0, 0.0, 0.0));
        let near_planet = p.density_at(Vec3::new(100.0, 0.0, 0.0));
        assert!(near_planet < inside_ring);
        assert_eq!(near_planet, 0.0);
    }

    #[test]
    fn density_decreases_past_outer_radius() {
        let p = params();
        let inside_ring = p.density_at(Vec3::new(14_000.0, 0.0, 0.0));
        let beyond_outer = p.density_at(Vec3::new(30_000.0, 0.0, 0.0));
        assert!(beyond_outer < inside_ring);
        assert_eq!(beyond_outer, 0.0);
    }

    #[test]
    fn hole_suppresses_density_to_zero() {
        let mut p = params();
        let hole_centre = Vec3::new(14_000.0, 0.0, 0.0);
        p.holes.push(Hole { centre: hole_centre, radius: 500.0 });
        assert_eq!(p.density_at(hole_centre), 0.0);
        // Far from the hole, the ring is undisturbed.
        assert!(p.density_at(Vec3::new(14_000.0, 0.0, 5_000.0)) > 0.0);
    }

    #[test]
    fn density_is_deterministic() {
        let p = params();
        let pos = Vec3::new(12_345.0, 3.0, -987.0);
        assert_eq!(p.density_at(pos), p.density_at(pos));
    }
}
