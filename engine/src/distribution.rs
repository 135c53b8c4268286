use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::DistributionKind;

/// Weights folding a cell index into a scalar seed.
pub const CELL_HASH: Vec2 = Vec2::new(12.9898, 78.233);
pub const HASH_SCALE: f32 = 43758.5453;
/// Gaussian density rolloff, chosen so that density(0) == 1.
pub const GAUSSIAN_DENSITY_SCALE: f32 = 0.564189583548;
/// Fixed tail shape of the Pareto density.
pub const PARETO_DENSITY_TAIL: f32 = 100.0;
pub const SMOOTH_CLAMP_KNEE: f32 = 1.5;
const SMOOTH_CLAMP_CUBIC: f32 = 4.0 / 27.0;

/// Deterministic, non-cryptographic hash of a seed into [0, 1].
#[inline]
pub fn hash_uniform(seed: f32) -> f32 {
    let x = seed.sin() * HASH_SCALE;
    x - x.floor()
}

/// 三次软限幅：零点附近为恒等映射，在 ±1.5·cap 处平滑地停在 ±cap
#[inline]
pub fn smooth_clamp(z: f32, cap: f32) -> f32 {
    let t = (z / cap).clamp(-SMOOTH_CLAMP_KNEE, SMOOTH_CLAMP_KNEE);
    cap * (t - SMOOTH_CLAMP_CUBIC * (t * t * t))
}

/// d/dz of [`smooth_clamp`]; zero outside the knee.
#[inline]
pub fn smooth_clamp_slope(z: f32, cap: f32) -> f32 {
    let t = z / cap;
    if t.abs() >= SMOOTH_CLAMP_KNEE {
        return 0.0;
    }
    1.0 - 3.0 * SMOOTH_CLAMP_CUBIC * t * t
}

/// A distribution resolved from its [`DistributionKind`] once per parameter
/// block, so per-pixel code never branches on raw encodings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    Gaussian,
    Pareto { alpha: f32 },
    Triangle,
    Uniform,
}

impl Distribution {
    pub fn resolve(kind: DistributionKind, pareto_alpha: f32) -> Self {
        match kind {
            DistributionKind::Gaussian => Distribution::Gaussian,
            DistributionKind::Pareto => Distribution::Pareto { alpha: pareto_alpha },
            DistributionKind::Triangle => Distribution::Triangle,
            DistributionKind::Uniform => Distribution::Uniform,
        }
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            Distribution::Gaussian => DistributionKind::Gaussian,
            Distribution::Pareto { .. } => DistributionKind::Pareto,
            Distribution::Triangle => DistributionKind::Triangle,
            Distribution::Uniform => DistributionKind::Uniform,
        }
    }

    /// Draw one deviate. Every independent uniform inside a single draw uses
    /// its own seed offset (`seed`, `seed + 1`).
    pub fn sample(&self, seed: f32) -> f32 {
        match *self {
            Distribution::Gaussian => {
                // Box-Muller
                let u1 = hash_uniform(seed);
                let u2 = hash_uniform(seed + 1.0);
                (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
            }
            Distribution::Pareto { alpha } => {
                let u = hash_uniform(seed);
                (1.0 - u).powf(-1.0 / (alpha * alpha)) - 1.0
            }
            Distribution::Triangle => hash_uniform(seed) + hash_uniform(seed + 1.0) - 1.0,
            Distribution::Uniform => hash_uniform(seed) - 0.5,
        }
    }

    /// Analytic falloff in [0, 1], peaking at exactly 1 for `x == 0`.
    pub fn density(&self, x: f32) -> f32 {
        match self {
            Distribution::Gaussian => {
                let s = GAUSSIAN_DENSITY_SCALE * x;
                (-(s * s)).exp()
            }
            Distribution::Pareto { .. } => {
                let a = PARETO_DENSITY_TAIL;
                (a / (a + x.abs())).powf(2.0 * a + 1.0)
            }
            Distribution::Triangle => (1.0 - x.abs()).max(0.0),
            Distribution::Uniform => {
                if x.abs() <= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Distribution; 4] = [
        Distribution::Gaussian,
        Distribution::Pareto { alpha: 1.0 },
        Distribution::Triangle,
        Distribution::Uniform,
    ];

    #[test]
    fn hash_stays_in_unit_interval() {
        for i in -2000..2000 {
            let u = hash_uniform(i as f32 * 0.37);
            assert!((0.0..=1.0).contains(&u), "hash({}) = {}", i, u);
        }
    }

    #[test]
    fn hash_decorrelates_neighbouring_seeds() {
        let a = hash_uniform(10.0);
        let b = hash_uniform(11.0);
        assert_ne!(a, b);
    }

    #[test]
    fn smooth_clamp_never_exceeds_cap() {
        let cap = 3.0;
        for z in [0.0, 1.0, 4.4, 4.5, 4.6, 10.0, 1e6, 1e30, f32::MAX, f32::INFINITY] {
            assert!(smooth_clamp(z, cap).abs() <= cap, "z = {}", z);
            assert!(smooth_clamp(-z, cap).abs() <= cap, "z = {}", -z);
        }
        let mut z = -20.0;
        while z < 20.0 {
            assert!(smooth_clamp(z, cap).abs() <= cap);
            z += 0.01;
        }
        assert_eq!(smooth_clamp(f32::INFINITY, cap), cap);
        assert_eq!(smooth_clamp(f32::NEG_INFINITY, cap), -cap);
    }

    #[test]
    fn smooth_clamp_is_identity_near_zero() {
        assert_eq!(smooth_clamp(0.0, 2.0), 0.0);
        assert!((smooth_clamp(0.01, 2.0) - 0.01).abs() < 1e-6);
        assert!((smooth_clamp_slope(0.0, 2.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn smooth_clamp_has_no_kink_at_the_knee() {
        let cap = 2.0;
        let knee = SMOOTH_CLAMP_KNEE * cap;
        let eps = 1e-3;
        // value is continuous across the knee
        let inside = smooth_clamp(knee - eps, cap);
        let outside = smooth_clamp(knee + eps, cap);
        assert!((inside - outside).abs() < 1e-4);
        // slope approaches zero from inside, equals zero outside
        assert!(smooth_clamp_slope(knee - eps, cap).abs() < 1e-2);
        assert_eq!(smooth_clamp_slope(knee + eps, cap), 0.0);
        // finite-difference slope agrees with the analytic one
        let fd =
            (smooth_clamp(knee - eps, cap) - smooth_clamp(knee - 3.0 * eps, cap)) / (2.0 * eps);
        assert!((fd - smooth_clamp_slope(knee - 2.0 * eps, cap)).abs() < 1e-2);
    }

    #[test]
    fn smooth_clamp_is_odd_across_the_negative_knee() {
        let cap = 2.0;
        let knee = -SMOOTH_CLAMP_KNEE * cap;
        let eps = 1e-3;
        let inside = smooth_clamp(knee + eps, cap);
        let outside = smooth_clamp(knee - eps, cap);
        assert!((inside - outside).abs() < 1e-4);
        assert_eq!(outside, -cap);
        assert_eq!(inside, -smooth_clamp(-knee - eps, cap));
        assert!(smooth_clamp_slope(knee + eps, cap).abs() < 1e-2);
        assert_eq!(smooth_clamp_slope(knee - eps, cap), 0.0);
        let fd =
            (smooth_clamp(knee + 3.0 * eps, cap) - smooth_clamp(knee + eps, cap)) / (2.0 * eps);
        assert!((fd - smooth_clamp_slope(knee + 2.0 * eps, cap)).abs() < 1e-2);
    }

    #[test]
    fn densities_are_normalized_and_bounded() {
        for dist in ALL {
            assert_eq!(dist.density(0.0), 1.0, "{:?}", dist);
            let mut x = -50.0;
            while x < 50.0 {
                let d = dist.density(x);
                assert!((0.0..=1.0).contains(&d), "{:?} at {} = {}", dist, x, d);
                x += 0.125;
            }
            for x in [f32::MAX, f32::MIN, 1e20] {
                assert!((0.0..=1.0).contains(&dist.density(x)));
            }
        }
    }

    #[test]
    fn uniform_density_is_a_box() {
        let d = Distribution::Uniform;
        assert_eq!(d.density(0.5), 1.0);
        assert_eq!(d.density(-0.5), 1.0);
        assert_eq!(d.density(0.51), 0.0);
        assert_eq!(d.density(7.07), 0.0);
    }

    #[test]
    fn triangle_density_reaches_zero_at_one() {
        let d = Distribution::Triangle;
        assert_eq!(d.density(1.0), 0.0);
        assert_eq!(d.density(0.5), 0.5);
        assert_eq!(d.density(3.0), 0.0);
    }

    #[test]
    fn samples_are_deterministic() {
        for dist in ALL {
            for i in 0..64 {
                let seed = i as f32 * 91.7;
                assert_eq!(dist.sample(seed).to_bits(), dist.sample(seed).to_bits());
            }
        }
    }

    #[test]
    fn bounded_samples_stay_within_range() {
        assert!((-0.5..=0.5).contains(&Distribution::Uniform.sample(3.0)));
        for i in 0..256 {
            let seed = i as f32 * 1.618;
            let tri = Distribution::Triangle.sample(seed);
            assert!((-1.0..=1.0).contains(&tri));
            let pareto = Distribution::Pareto { alpha: 0.5 }.sample(seed);
            assert!(pareto >= 0.0 || pareto.is_nan());
        }
    }

    #[test]
    fn resolve_keeps_kind() {
        for kind in DistributionKind::ALL {
            assert_eq!(Distribution::resolve(kind, 2.0).kind(), kind);
        }
        assert_eq!(
            Distribution::resolve(DistributionKind::Pareto, 2.0),
            Distribution::Pareto { alpha: 2.0 }
        );
    }
}
