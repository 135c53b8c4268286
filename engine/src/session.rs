use std::time::Duration;

use glam::{vec2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::api::{Dimensions, FieldError};
use crate::config::FieldConfig;
use crate::field::FieldEvaluator;
use crate::params::{require_positive, ParameterBlock};

pub fn inv_exp(x: f32) -> f32 {
    1.0 - (-x).exp()
}

fn check_resolution(resolution: Vec2) -> Result<(), FieldError> {
    require_positive("resolution.x", resolution.x)?;
    require_positive("resolution.y", resolution.y)
}

/// 一次点击判定的结果，距离以归一化坐标计
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Decision {
    /// Guessed location, normalized.
    pub location: Vec2,
    pub distance: f32,
    /// Seconds since the trial started.
    pub time: f32,
    /// Signal strength on screen when the guess was made.
    pub strength: f32,
    #[serde(skip)]
    noise_frame: f32,
}

/// 一轮试验：随机放置信号，噪声按帧重新播种，信号强度随时间渐强，直到玩家给出猜测
///
/// Time is passed in as the elapsed duration since the trial (re)started; the
/// host owns the clock.
pub struct Trial {
    config: FieldConfig,
    resolution: Vec2,
    rng: StdRng,
    /// Normalized signal location.
    signal_origin: Vec2,
    decision: Option<Decision>,
}

impl Trial {
    pub fn new(config: FieldConfig, resolution: Vec2, rng_seed: u64) -> Result<Self, FieldError> {
        config.validate()?;
        check_resolution(resolution)?;
        let mut trial = Self {
            config,
            resolution,
            rng: StdRng::seed_from_u64(rng_seed),
            signal_origin: Vec2::ZERO,
            decision: None,
        };
        trial.reset();
        Ok(trial)
    }

    /// Place the signal somewhere new and forget the previous guess.
    pub fn reset(&mut self) {
        self.signal_origin = vec2(self.rng.gen(), self.rng.gen());
        self.decision = None;
        info!(
            "New {} trial, signal at ({:.3}, {:.3})",
            self.config.dimensions, self.signal_origin.x, self.signal_origin.y
        );
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn resolution(&self) -> Vec2 {
        self.resolution
    }

    /// Follow a viewport resize; the signal keeps its normalized location.
    pub fn set_resolution(&mut self, resolution: Vec2) -> Result<(), FieldError> {
        check_resolution(resolution)?;
        self.resolution = resolution;
        Ok(())
    }

    pub fn signal_origin(&self) -> Vec2 {
        self.signal_origin
    }

    pub fn signal_origin_px(&self) -> Vec2 {
        self.signal_origin * self.resolution
    }

    pub fn decision(&self) -> Option<&Decision> {
        self.decision.as_ref()
    }

    pub fn is_revealed(&self) -> bool {
        self.decision.is_some()
    }

    pub fn noise_frame(&self, elapsed: Duration) -> f32 {
        (elapsed.as_secs_f32() / self.config.frame_length).floor()
    }

    /// Ramp in [0, 1) that approaches 1 over `signal_ramp_duration`.
    pub fn signal_progression(&self, noise_frame: f32) -> f32 {
        let c = &self.config;
        let scale = c.signal_ramp_duration * c.signal_max_strength;
        if scale > 0.0 {
            inv_exp((noise_frame * c.frame_length) / scale)
        } else {
            1.0
        }
    }

    fn strength_at(&self, noise_frame: f32) -> f32 {
        self.signal_progression(noise_frame) * self.config.signal_max_strength
    }

    pub fn signal_strength(&self, elapsed: Duration) -> f32 {
        self.strength_at(self.noise_frame(elapsed))
    }

    /// Parameters to draw at `elapsed`. Once revealed the picture freezes at
    /// the guess instant with the noise switched off.
    pub fn parameter_block(&self, elapsed: Duration) -> ParameterBlock {
        let origin = self.signal_origin_px();
        match &self.decision {
            Some(decision) => {
                let mut block = self.config.parameter_block(
                    self.resolution,
                    origin,
                    decision.strength,
                    decision.noise_frame,
                );
                block.noise_floor = 0.0;
                block.noise_deviation = 0.0;
                block
            }
            None => {
                let frame = self.noise_frame(elapsed);
                self.config
                    .parameter_block(self.resolution, origin, self.strength_at(frame), frame)
            }
        }
    }

    pub fn evaluator(&self, elapsed: Duration) -> Result<FieldEvaluator, FieldError> {
        FieldEvaluator::new(self.parameter_block(elapsed))
    }

    /// Score a guess at `location_px`. Only the first guess of a trial counts;
    /// later calls return the recorded decision.
    pub fn guess(&mut self, location_px: Vec2, elapsed: Duration) -> Decision {
        if let Some(decision) = self.decision {
            return decision;
        }
        let location = location_px / self.resolution;
        let distance = match self.config.dimensions {
            Dimensions::One => (location.x - self.signal_origin.x).abs(),
            Dimensions::Two => location.distance(self.signal_origin),
        };
        let noise_frame = self.noise_frame(elapsed);
        let decision = Decision {
            location,
            distance,
            time: elapsed.as_secs_f32(),
            strength: self.strength_at(noise_frame),
            noise_frame,
        };
        info!(
            "Guess at ({:.3}, {:.3}): distance {:.3} after {:.2}s, strength {:.1}%",
            location.x,
            location.y,
            distance,
            decision.time,
            self.signal_progression(noise_frame) * 100.0
        );
        self.decision = Some(decision);
        decision
    }
}
