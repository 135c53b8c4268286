use std::time::Instant;

use glam::{vec2, Vec2};
use rayon::prelude::*;
use tracing::debug;

use crate::api::{FieldSource, Frame, FrameRequest, Rgba};
use crate::field::FieldEvaluator;

const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

impl FrameRequest {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// One output pixel per viewport pixel.
    pub fn native(resolution: Vec2) -> Self {
        Self { width: resolution.x.round() as u32, height: resolution.y.round() as u32 }
    }

    /// Viewport-space centre of output pixel `(x, y)`.
    pub fn pixel_center(&self, resolution: Vec2, x: u32, y: u32) -> Vec2 {
        let scale = resolution / vec2(self.width as f32, self.height as f32);
        (vec2(x as f32, y as f32) + 0.5) * scale
    }
}

/// 逐像素并行渲染：每行一个 rayon 任务，像素之间互不依赖
pub fn render_per_pixel<S: FieldSource + ?Sized>(source: &S, req: &FrameRequest) -> Frame {
    let started = Instant::now();
    let resolution = source.resolution();
    let width = req.width as usize;
    let mut pixels = vec![Rgba::BLACK; width * req.height as usize];
    if width > 0 {
        pixels.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                *px = source.evaluate(req.pixel_center(resolution, x as u32, y as u32));
            }
        });
    }
    debug!("Rendered {}x{} frame in {:?}", req.width, req.height, started.elapsed());
    Frame { width: req.width, height: req.height, pixels }
}

/// 1-D render: column strength does not depend on the row, so compute it
/// once per column and only threshold per pixel.
pub fn render_columns(evaluator: &FieldEvaluator, req: &FrameRequest) -> Frame {
    let started = Instant::now();
    let resolution = evaluator.params().resolution;
    let width = req.width as usize;
    let strengths: Vec<f32> = (0..req.width)
        .into_par_iter()
        .map(|x| evaluator.column_strength(req.pixel_center(resolution, x, 0).x))
        .collect();

    let mut pixels = vec![Rgba::BLACK; width * req.height as usize];
    if width > 0 {
        pixels.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                let uv = evaluator.normalize(req.pixel_center(resolution, x as u32, y as u32));
                *px = evaluator.colorize(strengths[x], uv);
            }
        });
    }
    debug!(
        "Rendered {}x{} column frame ({} columns cached) in {:?}",
        req.width,
        req.height,
        strengths.len(),
        started.elapsed()
    );
    Frame { width: req.width, height: req.height, pixels }
}

fn quantize(v: f32) -> u8 {
    // NaN clamps to 0 through the cast
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Frame {
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Gray bytes; out-of-range values clip to [0, 1].
    pub fn to_luma8(&self) -> Vec<u8> {
        self.pixels.iter().map(|p| quantize(p.r)).collect()
    }

    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| [quantize(p.r), quantize(p.g), quantize(p.b), quantize(p.a)])
            .collect()
    }

    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for row in self.pixels.chunks(self.width.max(1) as usize) {
            for p in row {
                let level = p.r.clamp(0.0, 1.0) * (ASCII_RAMP.len() - 1) as f32;
                out.push(ASCII_RAMP[level.round() as usize] as char);
            }
            out.push('\n');
        }
        out
    }
}
