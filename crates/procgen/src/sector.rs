//! Sector index & geometry: world positions <-> integer sector indices, plus the
//! sphere-vs-cuboid separating-axis test used to prune sectors during queries.

use glam::Vec3;

use crate::error::RingSystemError;

/// An integer sector index. Each axis must fit in a 16-bit signed integer; indices
/// outside that range are a range error (worlds at scales beyond +/-32767 * S).
pub type SectorIndex = [i32; 3];

/// Sector edge length S. A module constant, not user-configurable.
pub const SECTOR_EDGE: f64 = 500.0;

/// `indexOf(position) = floor(p / S)` per axis, checked against the 16-bit range.
pub fn index_of(position: Vec3) -> Result<SectorIndex, RingSystemError> {
    let raw = [
        (position.x as f64 / SECTOR_EDGE).floor() as i64,
        (position.y as f64 / SECTOR_EDGE).floor() as i64,
        (position.z as f64 / SECTOR_EDGE).floor() as i64,
    ];
    if raw.iter().any(|&v| v < i16::MIN as i64 || v > i16::MAX as i64) {
        return Err(RingSystemError::SectorIndexOutOfRange(raw));
    }
    Ok([raw[0] as i32, raw[1] as i32, raw[2] as i32])
}

/// `centerOf(index) = (index + 0.5) * S`.
pub fn center_of(index: SectorIndex) -> Vec3 {
    Vec3::new(
        (index[0] as f64 + 0.5) as f32 * SECTOR_EDGE as f32,
        (index[1] as f64 + 0.5) as f32 * SECTOR_EDGE as f32,
        (index[2] as f64 + 0.5) as f32 * SECTOR_EDGE as f32,
    )
}

/// Standard axis-separating sphere-vs-cuboid test: clamp the sphere centre to the
/// cuboid, then compare the squared distance to the clamped point against radius^2.
pub fn sphere_vs_cuboid(
    sphere_center: Vec3,
    sphere_radius: f32,
    cuboid_center: Vec3,
    cuboid_half_size: Vec3,
) -> bool {
    let min = cuboid_center - cuboid_half_size;
    let max = cuboid_center + cuboid_half_size;
    let clamped = sphere_center.clamp(min, max);
    (clamped - sphere_center).length_squared() <= sphere_radius * sphere_radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_of_matches_floor_division() {
        let idx = index_of(Vec3::new(750.0, -10.0, 499.0)).unwrap();
        assert_eq!(idx, [1, -1, 0]);
    }

    #[test]
    fn center_of_is_index_plus_half_times_edge() {
        let c = center_of([0, 0, 0]);
        assert!((c - Vec3::splat(250.0)).length() < 1e-3);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let far = Vec3::splat((i16::MAX as f32 + 10.0) * SECTOR_EDGE as f32);
        assert!(index_of(far).is_err());
    }

    #[test]
    fn sphere_vs_cuboid_detects_overlap_and_separation() {
        let cuboid_center = Vec3::ZERO;
        let half_size = Vec3::splat(250.0);
        assert!(sphere_vs_cuboid(Vec3::new(260.0, 0.0, 0.0), 20.0, cuboid_center, half_size));
        assert!(!sphere_vs_cuboid(Vec3::new(1000.0, 0.0, 0.0), 20.0, cuboid_center, half_size));
    }
}
