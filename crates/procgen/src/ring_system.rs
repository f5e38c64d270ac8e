//! The procedural ring system: composes the sector index, the density field,
//! and the Worley sampler into a deterministic, infinite,
//! query-on-demand ring-particle field. Sectors are never stored; any sector can be
//! regenerated bit-identically from its integer index alone.
//!
//! Grounded in `RingSystem` (original source, `cs409a5/RingSystem.cpp`/`.h`).

use glam::Vec3;

use crate::density::RingParameters;
use crate::error::RingSystemError;
use crate::pseudorandom::{next_pseudorandom, PseudorandomGrid3};
use crate::sector::{center_of, index_of, sphere_vs_cuboid, SectorIndex, SECTOR_EDGE};
use crate::worley::get_points;

/// Number of distinct ring-particle materials; material index is `seed % MATERIAL_COUNT`.
pub const MATERIAL_COUNT: u32 = 20;
/// Smallest particle radius a sector can produce.
pub const PARTICLE_RADIUS_MIN: f32 = 0.5;
/// Largest particle radius a sector can produce.
pub const PARTICLE_RADIUS_MAX: f32 = 4.0;
/// Default draw halo radius: sectors within this Chebyshev distance of the
/// camera's sector are regenerated and considered for drawing.
pub const DEFAULT_DRAW_HALO_SECTORS: i32 = 4;

const SCALE_TO_01: f64 = 1.0 / (u32::MAX as f64 + 1.0);

/// One fully materialised ring particle: position, radius, material, and a fixed
/// orientation axis/angle for visual variety. All fields are derived deterministically
/// from (position, seed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSummary {
    pub position: Vec3,
    pub radius: f32,
    pub material: u32,
    pub orientation_axis: Vec3,
    pub orientation_angle: f32,
}

impl ParticleSummary {
    fn from_point(sector_origin: Vec3, local: [f64; 3], seed: u32) -> Self {
        let position = sector_origin
            + Vec3::new(local[0] as f32, local[1] as f32, local[2] as f32) * SECTOR_EDGE as f32;

        // Derive radius, material, and orientation from further steps of the same
        // per-point seed so that every field is a pure function of (position, seed).
        let mut r = seed;
        r = next_pseudorandom(r);
        let radius_t = r as f64 * SCALE_TO_01;
        let radius = PARTICLE_RADIUS_MIN + (PARTICLE_RADIUS_MAX - PARTICLE_RADIUS_MIN) * radius_t as f32;

        let material = seed % MATERIAL_COUNT;

        r = next_pseudorandom(r);
        let ax = (r as f64 * SCALE_TO_01) as f32 * 2.0 - 1.0;
        r = next_pseudorandom(r);
        let ay = (r as f64 * SCALE_TO_01) as f32 * 2.0 - 1.0;
        r = next_pseudorandom(r);
        let az = (r as f64 * SCALE_TO_01) as f32 * 2.0 - 1.0;
        let axis = Vec3::new(ax, ay, az).normalize_or(Vec3::Y);

        r = next_pseudorandom(r);
        let angle = (r as f64 * SCALE_TO_01) as f32 * std::f32::consts::TAU;

        Self {
            position,
            radius,
            material,
            orientation_axis: axis,
            orientation_angle: angle,
        }
    }
}

/// The ring system: owns its seed state (the pseudorandom grid) and its ring
/// parameters. Owns no particles — every query regenerates sectors from
/// scratch, which keeps "regeneration is pure" trivially true.
#[derive(Debug, Clone)]
pub struct RingSystem {
    grid: PseudorandomGrid3,
    params: RingParameters,
}

impl RingSystem {
    /// Construct a ring system with the given seed grid and ring parameters. Fails
    /// if `params` violates any of its invariants.
    pub fn new(grid: PseudorandomGrid3, params: RingParameters) -> Result<Self, RingSystemError> {
        params.validate()?;
        Ok(Self { grid, params })
    }

    /// `densityAt(p)`: the analytic density at a single position.
    pub fn density_at(&self, p: Vec3) -> f64 {
        self.params.density_at(p)
    }

    /// Regenerate sector `index`'s particles from scratch. Pure: calling this twice
    /// for the same index and parameters yields bit-identical results.
    pub fn generate_sector(&self, index: SectorIndex) -> Vec<ParticleSummary> {
        let centre = center_of(index);
        let density = self.params.density_at(centre);
        let count = density.round().max(0.0) as u32;
        let sector_origin = centre - Vec3::splat(SECTOR_EDGE as f32 / 2.0);

        get_points(&self.grid, index, count)
            .into_iter()
            .map(|point| ParticleSummary::from_point(sector_origin, point.local, point.seed))
            .collect()
    }

    /// `particlesIn(sphereCentre, sphereRadius)`: exact particle data for every
    /// particle whose bounding sphere intersects the query sphere. Iterates a 3x3x3
    /// sector neighbourhood around the sector containing the centre, prunes each
    /// sector by sphere-vs-cuboid, then prunes particles by sphere-vs-sphere.
    pub fn particles_in(&self, sphere_centre: Vec3, sphere_radius: f64) -> Result<Vec<ParticleSummary>, RingSystemError> {
        if sphere_radius < 0.0 {
            return Err(RingSystemError::NegativeRadius(sphere_radius));
        }
        let centre_index = index_of(sphere_centre)?;
        let mut found = Vec::new();
        let half = Vec3::splat(SECTOR_EDGE as f32 / 2.0);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let index = [centre_index[0] + dx, centre_index[1] + dy, centre_index[2] + dz];
                    let sector_centre = center_of(index);
                    if !sphere_vs_cuboid(sphere_centre, sphere_radius as f32, sector_centre, half) {
                        continue;
                    }
                    for particle in self.generate_sector(index) {
                        let combined = (particle.radius as f64 + sphere_radius).powi(2);
                        if (particle.position - sphere_centre).length_squared() as f64 <= combined {
                            found.push(particle);
                        }
                    }
                }
            }
        }
        Ok(found)
    }

    /// `collides(sphereCentre, sphereRadius)`: short-circuit variant of `particles_in`
    /// that stops at the first intersecting particle.
    pub fn collides(&self, sphere_centre: Vec3, sphere_radius: f64) -> Result<bool, RingSystemError> {
        if sphere_radius < 0.0 {
            return Err(RingSystemError::NegativeRadius(sphere_radius));
        }
        let centre_index = index_of(sphere_centre)?;
        let half = Vec3::splat(SECTOR_EDGE as f32 / 2.0);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let index = [centre_index[0] + dx, centre_index[1] + dy, centre_index[2] + dz];
                    let sector_centre = center_of(index);
                    if !sphere_vs_cuboid(sphere_centre, sphere_radius as f32, sector_centre, half) {
                        continue;
                    }
                    for particle in self.generate_sector(index) {
                        let combined = (particle.radius as f64 + sphere_radius).powi(2);
                        if (particle.position - sphere_centre).length_squared() as f64 <= combined {
                            return Ok(true);
                        }
                    }
                }
            }
        }
        Ok(false)
    }

    /// `draw(cameraCoords)`: every particle within `halo_sectors` of the camera's
    /// sector and within `max_distance` of the camera, regenerated on the fly. Pure
    /// (never mutates state); the renderer adapter is responsible for the actual
    /// drawing given the returned summaries.
    pub fn particles_to_draw(
        &self,
        camera_position: Vec3,
        halo_sectors: i32,
        max_distance: f64,
    ) -> Result<Vec<ParticleSummary>, RingSystemError> {
        let centre_index = index_of(camera_position)?;
        let mut found = Vec::new();
        for dx in -halo_sectors..=halo_sectors {
            for dy in -halo_sectors..=halo_sectors {
                for dz in -halo_sectors..=halo_sectors {
                    let index = [centre_index[0] + dx, centre_index[1] + dy, centre_index[2] + dz];
                    for particle in self.generate_sector(index) {
                        if (particle.position - camera_position).length() as f64 <= max_distance {
                            found.push(particle);
                        }
                    }
                }
            }
        }
        Ok(found)
    }

    /// `addHole(centre, radius)`: add a spherical suppression region.
    pub fn add_hole(&mut self, centre: Vec3, radius: f64) -> Result<(), RingSystemError> {
        if radius < 0.0 {
            return Err(RingSystemError::NegativeRadius(radius));
        }
        self.params.holes.push(crate::density::Hole { centre, radius });
        Ok(())
    }

    /// `removeAllHoles()`.
    pub fn remove_all_holes(&mut self) {
        self.params.holes.clear();
    }

    /// `configure(halfThickness, innerRadius, outerRadiusBase, densityMax, densityFactor)`.
    pub fn configure(
        &mut self,
        half_thickness: f64,
        inner_radius: f64,
        outer_radius_base: f64,
        density_max: f64,
        density_factor: f64,
    ) -> Result<(), RingSystemError> {
        let candidate = RingParameters {
            half_thickness,
            inner_radius,
            outer_radius_base,
            density_max,
            density_factor,
            holes: self.params.holes.clone(),
        };
        candidate.validate()?;
        self.params = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_system() -> RingSystem {
        let params = RingParameters {
            half_thickness: 50.0,
            inner_radius: 1_000.0,
            outer_radius_base: 3_000.0,
            density_max: 30.0,
            density_factor: 0.02,
            holes: Vec::new(),
        };
        RingSystem::new(PseudorandomGrid3::default(), params).unwrap()
    }

    #[test]
    fn sector_regeneration_is_idempotent() {
        let ring = test_system();
        let a = ring.generate_sector([2, 0, -5]);
        let b = ring.generate_sector([2, 0, -5]);
        assert_eq!(a, b);
    }

    #[test]
    fn two_instances_with_identical_parameters_agree() {
        let a = test_system();
        let b = test_system();
        assert_eq!(a.generate_sector([0, 0, 0]), b.generate_sector([0, 0, 0]));
    }

    #[test]
    fn particles_in_only_returns_particles_within_the_query_sphere() {
        let ring = test_system();
        let centre = Vec3::new(1_500.0, 0.0, 0.0);
        let particles = ring.particles_in(centre, 600.0).unwrap();
        for p in &particles {
            assert!((p.position - centre).length() <= 600.0 + p.radius + 1e-3);
        }
    }

    #[test]
    fn collides_agrees_with_particles_in_non_emptiness() {
        let ring = test_system();
        let centre = Vec3::new(1_500.0, 0.0, 0.0);
        let has_particles = !ring.particles_in(centre, 800.0).unwrap().is_empty();
        assert_eq!(ring.collides(centre, 800.0).unwrap(), has_particles);
    }

    #[test]
    fn negative_radius_is_rejected() {
        let ring = test_system();
        assert!(ring.particles_in(Vec3::ZERO, -1.0).is_err());
        assert!(ring.collides(Vec3::ZERO, -1.0).is_err());
    }

    #[test]
    fn adding_a_hole_suppresses_particles_there() {
        let mut ring = test_system();
        let hole_centre = Vec3::new(1_500.0, 0.0, 0.0);
        ring.add_hole(hole_centre, 400.0).unwrap();
        let particles = ring.particles_in(hole_centre, 100.0).unwrap();
        assert!(particles.is_empty());
        ring.remove_all_holes();
    }

    #[test]
    fn configure_rejects_invalid_parameters_without_mutating_state() {
        let mut ring = test_system();
        let before = ring.generate_sector([0, 0, 0]);
        assert!(ring.configure(-1.0, 1_000.0, 3_000.0, 30.0, 0.02).is_err());
        assert_eq!(ring.generate_sector([0, 0, 0]), before);
    }

    #[test]
    fn materials_are_bounded_by_material_count() {
        let ring = test_system();
        for p in ring.generate_sector([1, 1, 1]) {
            assert!(p.material < MATERIAL_COUNT);
        }
    }

    #[test]
    fn draw_never_mutates_and_respects_max_distance() {
        let ring = test_system();
        let camera = Vec3::new(1_500.0, 0.0, 0.0);
        let particles = ring.particles_to_draw(camera, 1, 2_000.0).unwrap();
        for p in &particles {
            assert!((p.position - camera).length() as f64 <= 2_000.0);
        }
    }
}
