//! Cellular noise + signal field evaluation.
//!
//! Every pixel is a pure function of its coordinate and a [`ParameterBlock`]:
//! a per-cell pseudo-random deviate drawn from a selectable distribution,
//! softly bounded, plus a signal falloff around a source point. The result is
//! shown as a gray density map (2-D) or a thresholded column chart (1-D).

pub mod api;
pub mod config;
pub mod distribution;
pub mod field;
pub mod params;
pub mod render;
pub mod session;

pub use api::{Dimensions, DistributionKind, FieldError, FieldSource, Frame, FrameRequest, Rgba};
pub use config::FieldConfig;
pub use distribution::Distribution;
pub use field::{evaluate, FieldEvaluator, FieldSample};
pub use params::{ParameterBlock, UniformBlock};
pub use session::{Decision, Trial};
