use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::{Dimensions, DistributionKind, FieldError};
use crate::params::{require_positive, ParameterBlock};

/// 可配置项，与窗口无关；信号宽度按视口短边的比例给出
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub dimensions: Dimensions,
    /// Cell size as a fraction of the viewport. Bigger = harder.
    pub cell_spacing: f32,
    /// Signal width as a fraction of the short viewport side (1-D: of the
    /// width). Bigger = harder.
    pub signal_width: f32,
    pub signal_shape: DistributionKind,
    /// Mean noise brightness. Bigger = harder.
    pub noise_floor: f32,
    /// Spread of the noise around the floor. Bigger = harder.
    pub noise_deviation: f32,
    /// Deviates beyond this many spreads are smoothly clipped.
    pub noise_deviation_cap: f32,
    pub noise_distribution: DistributionKind,
    pub noise_pareto_distribution_parameter: f32,
    /// Seconds each noise frame stays on screen.
    pub frame_length: f32,
    /// Rough time in seconds until the signal nears full strength.
    pub signal_ramp_duration: f32,
    /// Peak signal strength. Smaller = harder.
    pub signal_max_strength: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::Two,
            cell_spacing: 0.05,
            signal_width: 0.25,
            signal_shape: DistributionKind::Gaussian,
            noise_floor: 0.25,
            noise_deviation: 0.05,
            noise_deviation_cap: 3.0,
            noise_distribution: DistributionKind::Gaussian,
            noise_pareto_distribution_parameter: 1.0,
            frame_length: 0.1,
            signal_ramp_duration: 180.0,
            signal_max_strength: 1.0,
        }
    }
}

impl FieldConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, FieldError> {
        Ok(ron::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, FieldError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a preset, picking the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FieldError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            other => {
                return Err(FieldError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, FieldError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        let positive = [
            ("cell_spacing", self.cell_spacing),
            ("signal_width", self.signal_width),
            ("noise_deviation_cap", self.noise_deviation_cap),
            ("frame_length", self.frame_length),
        ];
        for (name, value) in positive {
            require_positive(name, value)?;
        }
        if self.noise_distribution == DistributionKind::Pareto
            && self.noise_pareto_distribution_parameter == 0.0
        {
            return Err(FieldError::InvalidParameter {
                name: "noise_pareto_distribution_parameter",
                value: 0.0,
                reason: "pareto shape must be non-zero",
            });
        }
        Ok(())
    }

    /// Width of the signal in pixels for the given viewport.
    pub fn signal_width_px(&self, resolution: Vec2) -> f32 {
        let reference = match self.dimensions {
            Dimensions::One => resolution.x,
            Dimensions::Two => resolution.x.min(resolution.y),
        };
        self.signal_width * reference
    }

    pub fn parameter_block(
        &self,
        resolution: Vec2,
        signal_origin: Vec2,
        signal_strength: f32,
        noise_seed: f32,
    ) -> ParameterBlock {
        ParameterBlock {
            resolution,
            cell_spacing: self.cell_spacing,
            dimensions: self.dimensions,
            signal_origin,
            signal_strength,
            signal_width: self.signal_width_px(resolution),
            signal_shape: self.signal_shape,
            noise_seed,
            noise_floor: self.noise_floor,
            noise_deviation: self.noise_deviation,
            noise_deviation_cap: self.noise_deviation_cap,
            noise_distribution: self.noise_distribution,
            noise_pareto_distribution_parameter: self.noise_pareto_distribution_parameter,
        }
    }
}
