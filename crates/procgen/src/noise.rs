//! Fractal noise: a position-to-scalar function in `[-1, 1]` with zero mean and
//! stable, reproducible values. Uses the three-incommensurate-sine-wave reference
//! implementation named in the density-field spec (periods in ratio `1 : sqrt(2) :
//! sqrt(3)`), which is what the density-field tests are checked against; a true
//! fractal Perlin noise would be behaviourally equivalent but would require
//! re-deriving those expected values, so it is not substituted here.

use glam::Vec3;

const SQRT_2: f32 = std::f32::consts::SQRT_2;
const SQRT_3: f32 = 1.732_050_8;

/// `noise(p) in [-1, 1]`, deterministic, zero mean.
pub fn noise(p: Vec3) -> f32 {
    let a = (p.x + p.y * 0.7 + p.z * 1.3).sin();
    let b = (p.x * SQRT_2 - p.y * 1.1 + p.z * 0.4).sin();
    let c = (p.x * SQRT_3 + p.y * 0.3 - p.z * 0.9).sin();
    (a + b + c) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_within_range() {
        for i in -20..20 {
            let p = Vec3::new(i as f32 * 3.1, -i as f32 * 1.7, i as f32 * 0.5);
            let n = noise(p);
            assert!((-1.0..=1.0).contains(&n), "noise({p:?}) = {n}");
        }
    }

    #[test]
    fn deterministic() {
        let p = Vec3::new(12.5, -3.25, 7.0);
        assert_eq!(noise(p), noise(p));
    }

    #[test]
    fn approximately_zero_mean_over_a_sample_grid() {
        let mut sum = 0.0f64;
        let mut count = 0u32;
        for xi in -10..10 {
            for yi in -10..10 {
                let p = Vec3::new(xi as f32 * 0.37, yi as f32 * 0.53, (xi + yi) as f32 * 0.19);
                sum += noise(p) as f64;
                count += 1;
            }
        }
        let mean = sum / count as f64;
        assert!(mean.abs() < 0.2, "mean = {mean}");
    }
}
