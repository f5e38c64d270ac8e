//! Per-cell Worley-style point sampler, seeded from the pseudorandom grid.
//!
//! Grounded in `WorleyPoint3` (original source, `cs409a5/WorleyPoint.h`).

use crate::pseudorandom::{next_pseudorandom, PseudorandomGrid3};

const SCALE_TO_01: f64 = 1.0 / (u32::MAX as f64 + 1.0);

/// One generated Worley point: local `[0, 1)` coordinates (to be added to the cell
/// origin by the caller) and a 32-bit seed of its own, for deriving particle
/// attributes (radius, material, orientation) independent of position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorleyPoint3 {
    pub local: [f64; 3],
    pub seed: u32,
}

/// Draw exactly `count` points for `cell`, deterministic given `grid` and `cell`.
pub fn get_points(grid: &PseudorandomGrid3, cell: [i32; 3], count: u32) -> Vec<WorleyPoint3> {
    let mut r = grid.hash(cell);
    let mut points = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut local = [0.0; 3];
        for coord in &mut local {
            r = next_pseudorandom(r);
            *coord = r as f64 * SCALE_TO_01;
        }
        r = next_pseudorandom(r);
        points.push(WorleyPoint3 { local, seed: r });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_exactly_count_points() {
        let grid = PseudorandomGrid3::default();
        let points = get_points(&grid, [1, 2, 3], 7);
        assert_eq!(points.len(), 7);
    }

    #[test]
    fn deterministic_for_same_cell() {
        let grid = PseudorandomGrid3::default();
        let a = get_points(&grid, [4, -5, 6], 3);
        let b = get_points(&grid, [4, -5, 6], 3);
        assert_eq!(a, b);
    }

    #[test]
    fn local_coordinates_are_in_unit_range() {
        let grid = PseudorandomGrid3::default();
        for p in get_points(&grid, [0, 0, 0], 20) {
            for c in p.local {
                assert!((0.0..1.0).contains(&c));
            }
        }
    }

    #[test]
    fn different_cells_differ() {
        let grid = PseudorandomGrid3::default();
        let a = get_points(&grid, [0, 0, 0], 1);
        let b = get_points(&grid, [0, 0, 1], 1);
        assert_ne!(a, b);
    }
}
