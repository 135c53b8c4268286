use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::FieldSample;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter { name: &'static str, value: f32, reason: &'static str },
    #[error("unknown {field} encoding: {code}")]
    UnknownEncoding { field: &'static str, code: u32 },
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ron parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("ron write error: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 概率分布种类，噪声采样和信号形状共用同一套编号
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum DistributionKind {
    #[default]
    Gaussian = 0,
    Pareto = 1,
    Triangle = 2,
    Uniform = 3,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 4] = [
        DistributionKind::Gaussian,
        DistributionKind::Pareto,
        DistributionKind::Triangle,
        DistributionKind::Uniform,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DistributionKind::Gaussian => "gaussian",
            DistributionKind::Pareto => "pareto",
            DistributionKind::Triangle => "triangle",
            DistributionKind::Uniform => "uniform",
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for DistributionKind {
    type Error = FieldError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DistributionKind::Gaussian),
            1 => Ok(DistributionKind::Pareto),
            2 => Ok(DistributionKind::Triangle),
            3 => Ok(DistributionKind::Uniform),
            _ => Err(FieldError::UnknownEncoding { field: "distribution", code }),
        }
    }
}

/// 渲染维度：一维柱状图或二维密度图
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum Dimensions {
    #[serde(alias = "1d")]
    #[cfg_attr(feature = "clap", value(name = "1d", alias = "one"))]
    One = 1,
    #[default]
    #[serde(alias = "2d")]
    #[cfg_attr(feature = "clap", value(name = "2d", alias = "two"))]
    Two = 2,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimensions::One => f.write_str("1d"),
            Dimensions::Two => f.write_str("2d"),
        }
    }
}

impl TryFrom<u32> for Dimensions {
    type Error = FieldError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Dimensions::One),
            2 => Ok(Dimensions::Two),
            _ => Err(FieldError::UnknownEncoding { field: "dimensions", code }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::gray(0.0);
    pub const WHITE: Rgba = Rgba::gray(1.0);

    pub const fn gray(v: f32) -> Rgba {
        Rgba { r: v, g: v, b: v, a: 1.0 }
    }
}

/// 帧请求：输出帧的像素尺寸，可以与参数块的分辨率不同（缩略预览）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRequest {
    pub width: u32,
    pub height: u32,
}

/// Row-major RGBA frame, `pixels.len() == width * height`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

pub trait FieldSource: Send + Sync {
    /// Viewport size the source normalizes pixel coordinates against.
    fn resolution(&self) -> Vec2;
    fn sample(&self, pixel: Vec2) -> FieldSample;
    fn evaluate(&self, pixel: Vec2) -> Rgba;
    fn render(&self, req: &FrameRequest) -> Frame {
        crate::render::render_per_pixel(self, req)
    }
}
