use glam::{vec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::api::{Dimensions, DistributionKind, FieldError};

/// 每帧由宿主提供的参数块，求值期间只读
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterBlock {
    /// Viewport size in pixels.
    pub resolution: Vec2,
    /// Cell edge length in normalized [0,1] units.
    pub cell_spacing: f32,
    pub dimensions: Dimensions,
    /// Signal source in pixel space. 1-D mode only reads `x`.
    pub signal_origin: Vec2,
    pub signal_strength: f32,
    /// Distance (in pixels) that maps to a density argument of 1.
    pub signal_width: f32,
    pub signal_shape: DistributionKind,
    pub noise_seed: f32,
    pub noise_floor: f32,
    pub noise_deviation: f32,
    pub noise_deviation_cap: f32,
    pub noise_distribution: DistributionKind,
    pub noise_pareto_distribution_parameter: f32,
}

impl Default for ParameterBlock {
    fn default() -> Self {
        Self {
            resolution: vec2(800.0, 800.0),
            cell_spacing: 0.05,
            dimensions: Dimensions::Two,
            signal_origin: vec2(400.0, 400.0),
            signal_strength: 1.0,
            signal_width: 200.0,
            signal_shape: DistributionKind::Gaussian,
            noise_seed: 0.0,
            noise_floor: 0.25,
            noise_deviation: 0.05,
            noise_deviation_cap: 3.0,
            noise_distribution: DistributionKind::Gaussian,
            noise_pareto_distribution_parameter: 1.0,
        }
    }
}

pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<(), FieldError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(FieldError::InvalidParameter { name, value, reason: "must be finite and > 0" })
    }
}

impl ParameterBlock {
    /// Reject blocks whose divisors would turn evaluation into inf/NaN.
    pub fn validate(&self) -> Result<(), FieldError> {
        require_positive("resolution.x", self.resolution.x)?;
        require_positive("resolution.y", self.resolution.y)?;
        require_positive("cell_spacing", self.cell_spacing)?;
        require_positive("signal_width", self.signal_width)?;
        require_positive("noise_deviation_cap", self.noise_deviation_cap)?;
        if self.noise_distribution == DistributionKind::Pareto
            && self.noise_pareto_distribution_parameter == 0.0
        {
            return Err(FieldError::InvalidParameter {
                name: "noise_pareto_distribution_parameter",
                value: self.noise_pareto_distribution_parameter,
                reason: "pareto shape must be non-zero",
            });
        }
        Ok(())
    }

    pub fn uniforms(&self) -> UniformBlock {
        UniformBlock::from(*self)
    }
}

/// Flat GPU-facing mirror of [`ParameterBlock`]; enums travel as their
/// shared `u32` encodings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct UniformBlock {
    pub resolution: [f32; 2],
    pub cell_spacing: f32,
    pub signal_origin: [f32; 2],
    pub signal_strength: f32,
    pub signal_width: f32,
    pub signal_shape: u32,
    pub noise_seed: f32,
    pub noise_floor: f32,
    pub noise_deviation: f32,
    pub noise_deviation_cap: f32,
    pub noise_distribution: u32,
    pub noise_pareto_distribution_parameter: f32,
    pub dimensions: u32,
}

impl From<ParameterBlock> for UniformBlock {
    fn from(p: ParameterBlock) -> Self {
        Self {
            resolution: p.resolution.to_array(),
            cell_spacing: p.cell_spacing,
            signal_origin: p.signal_origin.to_array(),
            signal_strength: p.signal_strength,
            signal_width: p.signal_width,
            signal_shape: p.signal_shape as u32,
            noise_seed: p.noise_seed,
            noise_floor: p.noise_floor,
            noise_deviation: p.noise_deviation,
            noise_deviation_cap: p.noise_deviation_cap,
            noise_distribution: p.noise_distribution as u32,
            noise_pareto_distribution_parameter: p.noise_pareto_distribution_parameter,
            dimensions: p.dimensions as u32,
        }
    }
}

impl TryFrom<UniformBlock> for ParameterBlock {
    type Error = FieldError;

    fn try_from(u: UniformBlock) -> Result<Self, Self::Error> {
        Ok(Self {
            resolution: Vec2::from_array(u.resolution),
            cell_spacing: u.cell_spacing,
            dimensions: Dimensions::try_from(u.dimensions)?,
            signal_origin: Vec2::from_array(u.signal_origin),
            signal_strength: u.signal_strength,
            signal_width: u.signal_width,
            signal_shape: DistributionKind::try_from(u.signal_shape)?,
            noise_seed: u.noise_seed,
            noise_floor: u.noise_floor,
            noise_deviation: u.noise_deviation,
            noise_deviation_cap: u.noise_deviation_cap,
            noise_distribution: DistributionKind::try_from(u.noise_distribution)?,
            noise_pareto_distribution_parameter: u.noise_pareto_distribution_parameter,
        })
    }
}
