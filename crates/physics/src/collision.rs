//! Pure sphere-vs-sphere collision detection. Collision resolution (what happens on
//! contact) is the world's job; this module only answers "do these two
//! spheres overlap".

use glam::Vec3;

/// Squared-distance sphere-vs-sphere overlap test. No allocation, no state.
pub fn spheres_overlap(a_center: Vec3, a_radius: f32, b_center: Vec3, b_radius: f32) -> bool {
    let combined = a_radius + b_radius;
    (a_center - b_center).length_squared() <= combined * combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_overlap_and_separation() {
        assert!(spheres_overlap(Vec3::ZERO, 5.0, Vec3::new(8.0, 0.0, 0.0), 5.0));
        assert!(!spheres_overlap(Vec3::ZERO, 5.0, Vec3::new(20.0, 0.0, 0.0), 5.0));
    }

    #[test]
    fn touching_spheres_count_as_overlapping() {
        assert!(spheres_overlap(Vec3::ZERO, 3.0, Vec3::new(6.0, 0.0, 0.0), 3.0));
    }
}
