use std::path::Path;

use anyhow::{Context, Result};
use field_engine::{FieldEvaluator, FieldSource, FrameRequest};
use image::GrayImage;
use tracing::info;

use crate::cli::OutputArgs;

const DEFAULT_ASCII_COLUMNS: u32 = 80;

pub fn emit(evaluator: &FieldEvaluator, output: &OutputArgs) -> Result<()> {
    if let Some(path) = &output.out {
        write_png(evaluator, output, path)?;
    }
    match output.ascii {
        Some(columns) => print_ascii(evaluator, columns),
        None if output.out.is_none() => print_ascii(evaluator, DEFAULT_ASCII_COLUMNS),
        None => {}
    }
    Ok(())
}

fn write_png(evaluator: &FieldEvaluator, output: &OutputArgs, path: &Path) -> Result<()> {
    let frame = evaluator.render(&FrameRequest::new(output.width, output.height));
    let image = GrayImage::from_raw(frame.width, frame.height, frame.to_luma8())
        .context("frame buffer does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {}x{} preview to {}", frame.width, frame.height, path.display());
    Ok(())
}

/// Terminal cells are roughly twice as tall as wide, so halve the rows.
fn ascii_request(resolution_w: u32, resolution_h: u32, columns: u32) -> FrameRequest {
    let columns = columns.max(1);
    let rows = (columns as f32 * resolution_h as f32 / resolution_w.max(1) as f32 / 2.0).round();
    FrameRequest::new(columns, (rows as u32).max(1))
}

fn print_ascii(evaluator: &FieldEvaluator, columns: u32) {
    let res = evaluator.resolution();
    let req = ascii_request(res.x as u32, res.y as u32, columns);
    print!("{}", evaluator.render(&req).to_ascii());
}
