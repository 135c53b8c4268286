use glam::{vec2, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{Dimensions, FieldError, FieldSource, Frame, FrameRequest, Rgba};
use crate::distribution::{smooth_clamp, Distribution, CELL_HASH};
use crate::params::ParameterBlock;
use crate::render;

/// 单个像素的场强分解，用完即弃
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSample {
    pub noise_term: f32,
    pub signal_term: f32,
    pub strength: f32,
}

/// 场求值器：持有参数块以及预先解析好的噪声/信号分布
///
/// Cells are float-valued lattice indices (`floor(uv / cell_spacing)`); in
/// 1-D mode the y index is always 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldEvaluator {
    params: ParameterBlock,
    noise: Distribution,
    signal: Distribution,
    /// Centre of the cell holding the signal origin, normalized. The drawn
    /// peak can sit up to half a cell from `signal_origin`, the point guesses
    /// are scored against.
    signal_anchor: Vec2,
}

impl FieldEvaluator {
    pub fn new(params: ParameterBlock) -> Result<Self, FieldError> {
        if let Err(e) = params.validate() {
            warn!("Rejected parameter block: {e}");
            return Err(e);
        }
        let evaluator = Self::unchecked(params);
        debug!(
            "Field evaluator ready: {} noise={:?} signal={:?} cell_spacing={}",
            params.dimensions, evaluator.noise, evaluator.signal, params.cell_spacing
        );
        Ok(evaluator)
    }

    /// Skips validation; degenerate parameters propagate as inf/NaN.
    pub fn unchecked(params: ParameterBlock) -> Self {
        let noise = Distribution::resolve(
            params.noise_distribution,
            params.noise_pareto_distribution_parameter,
        );
        let signal = Distribution::resolve(params.signal_shape, 0.0);
        let mut evaluator = Self { params, noise, signal, signal_anchor: Vec2::ZERO };
        let origin_cell = evaluator.cell(params.signal_origin);
        evaluator.signal_anchor = evaluator.cell_center(origin_cell);
        evaluator
    }

    pub fn params(&self) -> &ParameterBlock {
        &self.params
    }

    pub fn noise_distribution(&self) -> Distribution {
        self.noise
    }

    pub fn signal_shape(&self) -> Distribution {
        self.signal
    }

    pub fn normalize(&self, pixel: Vec2) -> Vec2 {
        pixel / self.params.resolution
    }

    pub fn cell(&self, pixel: Vec2) -> Vec2 {
        let uv = self.normalize(pixel);
        let s = self.params.cell_spacing;
        match self.params.dimensions {
            Dimensions::One => vec2((uv.x / s).floor(), 0.0),
            Dimensions::Two => (uv / s).floor(),
        }
    }

    pub fn cell_center(&self, cell: Vec2) -> Vec2 {
        (cell + 0.5) * self.params.cell_spacing
    }

    pub fn cell_seed(&self, cell: Vec2) -> f32 {
        cell.dot(CELL_HASH) + self.params.noise_seed
    }

    pub fn raw_deviate(&self, cell: Vec2) -> f32 {
        self.noise.sample(self.cell_seed(cell))
    }

    pub fn noise_term(&self, cell: Vec2) -> f32 {
        let p = &self.params;
        let bounded = smooth_clamp(self.raw_deviate(cell), p.noise_deviation_cap);
        p.noise_deviation * bounded + p.noise_floor
    }

    /// Pixel-space distance from the cell to the signal, over `signal_width`.
    pub fn signal_factor(&self, cell: Vec2) -> f32 {
        let delta = (self.cell_center(cell) - self.signal_anchor) * self.params.resolution;
        let dist = match self.params.dimensions {
            Dimensions::One => delta.x.abs(),
            Dimensions::Two => delta.length(),
        };
        dist / self.params.signal_width
    }

    pub fn signal_term(&self, cell: Vec2) -> f32 {
        self.signal.density(self.signal_factor(cell)) * self.params.signal_strength
    }

    pub fn sample_cell(&self, cell: Vec2) -> FieldSample {
        let noise_term = self.noise_term(cell);
        let signal_term = self.signal_term(cell);
        FieldSample { noise_term, signal_term, strength: noise_term + signal_term }
    }

    /// Field strength of a 1-D column; independent of the row.
    pub fn column_strength(&self, x: f32) -> f32 {
        self.sample(vec2(x, 0.0)).strength
    }

    pub fn colorize(&self, strength: f32, uv: Vec2) -> Rgba {
        match self.params.dimensions {
            Dimensions::One => {
                if strength >= 1.0 - uv.y {
                    Rgba::WHITE
                } else {
                    Rgba::BLACK
                }
            }
            Dimensions::Two => Rgba::gray(strength),
        }
    }
}

impl FieldSource for FieldEvaluator {
    fn resolution(&self) -> Vec2 {
        self.params.resolution
    }

    fn sample(&self, pixel: Vec2) -> FieldSample {
        self.sample_cell(self.cell(pixel))
    }

    fn evaluate(&self, pixel: Vec2) -> Rgba {
        let strength = self.sample(pixel).strength;
        self.colorize(strength, self.normalize(pixel))
    }

    fn render(&self, req: &FrameRequest) -> Frame {
        match self.params.dimensions {
            Dimensions::One => render::render_columns(self, req),
            Dimensions::Two => render::render_per_pixel(self, req),
        }
    }
}

/// Evaluate one pixel straight from a parameter block, without validation.
pub fn evaluate(pixel: Vec2, params: &ParameterBlock) -> Rgba {
    FieldEvaluator::unchecked(*params).evaluate(pixel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DistributionKind;

    fn scenario(shape: DistributionKind) -> ParameterBlock {
        ParameterBlock {
            resolution: vec2(100.0, 100.0),
            cell_spacing: 0.1,
            dimensions: Dimensions::Two,
            signal_origin: vec2(50.0, 50.0),
            signal_shape: shape,
            signal_strength: 1.0,
            signal_width: 10.0,
            noise_deviation: 0.0,
            noise_floor: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn uniform_signal_lights_only_the_origin_cell() {
        let params = scenario(DistributionKind::Uniform);
        assert_eq!(evaluate(vec2(50.0, 50.0), &params), Rgba::WHITE);
        assert_eq!(evaluate(vec2(0.0, 0.0), &params), Rgba::BLACK);

        let ev = FieldEvaluator::new(params).unwrap();
        let far = ev.signal_factor(ev.cell(vec2(0.0, 0.0)));
        assert!((far - 7.0710678).abs() < 1e-3, "factor = {}", far);
    }

    #[test]
    fn every_shape_peaks_at_the_origin() {
        for shape in DistributionKind::ALL {
            let params = scenario(shape);
            assert_eq!(evaluate(vec2(50.0, 50.0), &params), Rgba::WHITE, "{}", shape);
        }
    }

    #[test]
    fn noise_is_constant_within_a_cell() {
        let params = ParameterBlock {
            resolution: vec2(200.0, 100.0),
            cell_spacing: 0.1,
            noise_seed: 17.0,
            ..Default::default()
        };
        let ev = FieldEvaluator::new(params).unwrap();
        // cell (1, 2) spans x in [20, 40), y in [20, 30)
        let cell = ev.cell(vec2(21.0, 21.0));
        assert_eq!(cell, vec2(1.0, 2.0));
        let reference = ev.sample(vec2(21.0, 21.0)).noise_term;
        for (x, y) in [(20.5, 20.5), (39.0, 29.0), (30.0, 25.0)] {
            let p = vec2(x, y);
            assert_eq!(ev.cell(p), cell);
            assert_eq!(ev.sample(p).noise_term.to_bits(), reference.to_bits());
        }
    }

    #[test]
    fn one_dimensional_cells_ignore_the_row() {
        let params = ParameterBlock {
            dimensions: Dimensions::One,
            resolution: vec2(100.0, 100.0),
            cell_spacing: 0.1,
            ..Default::default()
        };
        let ev = FieldEvaluator::new(params).unwrap();
        assert_eq!(ev.cell(vec2(35.0, 0.0)), vec2(3.0, 0.0));
        assert_eq!(ev.cell(vec2(35.0, 99.0)), vec2(3.0, 0.0));
        assert_eq!(ev.sample(vec2(35.0, 3.0)), ev.sample(vec2(35.0, 97.0)));
    }

    #[test]
    fn reseeding_changes_the_noise() {
        let a = ParameterBlock { noise_seed: 1.0, ..Default::default() };
        let b = ParameterBlock { noise_seed: 2.0, ..Default::default() };
        let a = FieldEvaluator::new(a).unwrap();
        let b = FieldEvaluator::new(b).unwrap();
        let cell = vec2(4.0, 9.0);
        assert_ne!(a.raw_deviate(cell), b.raw_deviate(cell));
    }

    #[test]
    fn noise_term_respects_cap_and_floor() {
        for kind in DistributionKind::ALL {
            let params = ParameterBlock {
                noise_distribution: kind,
                noise_pareto_distribution_parameter: 0.3,
                noise_floor: 0.25,
                noise_deviation: 0.5,
                noise_deviation_cap: 2.0,
                ..Default::default()
            };
            let ev = FieldEvaluator::new(params).unwrap();
            for i in 0..40 {
                for j in 0..40 {
                    let n = ev.noise_term(vec2(i as f32, j as f32));
                    assert!((n - 0.25).abs() <= 0.5 * 2.0 + 1e-6, "{} -> {}", kind, n);
                }
            }
        }
    }

    #[test]
    fn one_dimensional_output_is_black_or_white() {
        let params = ParameterBlock {
            dimensions: Dimensions::One,
            noise_deviation: 0.3,
            ..Default::default()
        };
        let ev = FieldEvaluator::new(params).unwrap();
        for x in (0..800).step_by(13) {
            for y in (0..800).step_by(17) {
                let c = ev.evaluate(vec2(x as f32, y as f32));
                assert!(c == Rgba::WHITE || c == Rgba::BLACK, "{:?}", c);
            }
        }
    }

    #[test]
    fn two_dimensional_output_is_gray() {
        let params = ParameterBlock { noise_deviation: 0.4, ..Default::default() };
        let ev = FieldEvaluator::new(params).unwrap();
        for x in (0..800).step_by(29) {
            for y in (0..800).step_by(31) {
                let c = ev.evaluate(vec2(x as f32, y as f32));
                assert_eq!(c.r, c.g);
                assert_eq!(c.g, c.b);
                assert_eq!(c.a, 1.0);
            }
        }
    }

    #[test]
    fn half_strength_fills_bottom_half() {
        let params = ParameterBlock {
            dimensions: Dimensions::One,
            resolution: vec2(100.0, 100.0),
            noise_deviation: 0.0,
            noise_floor: 0.5,
            signal_strength: 0.0,
            ..Default::default()
        };
        let ev = FieldEvaluator::new(params).unwrap();
        for x in [0.0, 42.0, 99.0] {
            assert_eq!(ev.column_strength(x), 0.5);
            assert_eq!(ev.evaluate(vec2(x, 49.0)), Rgba::BLACK);
            assert_eq!(ev.evaluate(vec2(x, 50.0)), Rgba::WHITE);
            assert_eq!(ev.evaluate(vec2(x, 99.0)), Rgba::WHITE);
        }
    }

    #[test]
    fn distributions_are_resolved_once_per_block() {
        let params = ParameterBlock {
            noise_distribution: DistributionKind::Pareto,
            noise_pareto_distribution_parameter: 1.5,
            signal_shape: DistributionKind::Triangle,
            ..Default::default()
        };
        let ev = FieldEvaluator::new(params).unwrap();
        assert_eq!(ev.noise_distribution(), Distribution::Pareto { alpha: 1.5 });
        assert_eq!(ev.signal_shape(), Distribution::Triangle);
        assert_eq!(ev.signal_shape().kind(), params.signal_shape);
        let cell = vec2(3.0, 4.0);
        assert_eq!(ev.raw_deviate(cell), ev.noise_distribution().sample(ev.cell_seed(cell)));
    }

    #[test]
    fn unchecked_path_propagates_non_finite_values() {
        let params = ParameterBlock { cell_spacing: 0.0, ..Default::default() };
        assert!(FieldEvaluator::new(params).is_err());
        let c = evaluate(vec2(10.0, 10.0), &params);
        assert!(!c.r.is_finite());
    }
}
