//! Export extraction results to JSON and CSV.
//!
//! The JSON export keeps everything (cost maps, flux spectra, detections); the
//! CSV export is the flat cost table, one row per output and grid cell, meant
//! for spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::SkyPosition;
use crate::error::AppError;
use crate::extract::{Detection, ExtractionResult};

#[derive(Debug, Serialize)]
struct ExtractionFile<'a> {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    grid_size: usize,
    /// `[output][row][col]`
    cost_maps: Vec<Vec<Vec<f64>>>,
    /// `[template][output][wavelength]`
    flux: &'a [Vec<Vec<f64>>],
    positions: &'a [Option<SkyPosition>],
    best: Vec<DetectionRow<'a>>,
    skipped_channels: &'a [(usize, usize)],
}

#[derive(Debug, Serialize)]
struct DetectionRow<'a> {
    output: usize,
    template: usize,
    row: usize,
    col: usize,
    cost: f64,
    flux: &'a [f64],
    position: Option<SkyPosition>,
}

impl<'a> From<&'a Detection> for DetectionRow<'a> {
    fn from(d: &'a Detection) -> Self {
        Self {
            output: d.output,
            template: d.template,
            row: d.row,
            col: d.col,
            cost: d.cost,
            flux: &d.flux,
            position: d.position,
        }
    }
}

/// Write the full extraction result as pretty JSON.
pub fn write_extraction_json(path: &Path, result: &ExtractionResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let cost_maps = result
        .cost_maps
        .iter()
        .map(|m| {
            m.row_iter()
                .map(|row| row.iter().copied().collect())
                .collect()
        })
        .collect();

    let export = ExtractionFile {
        tool: "sygn",
        generated_at: Utc::now(),
        grid_size: result.grid_size,
        cost_maps,
        flux: &result.flux,
        positions: &result.positions,
        best: result.best.iter().map(DetectionRow::from).collect(),
        skipped_channels: &result.skipped_channels,
    };

    serde_json::to_writer_pretty(BufWriter::new(file), &export)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

/// Write the cost table as CSV: `output,row,col,x,y,cost`.
///
/// `x`/`y` are the template sky position in radians, empty when unknown.
pub fn write_cost_csv(path: &Path, result: &ExtractionResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "output,row,col,x,y,cost")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let g = result.grid_size;
    for (o, map) in result.cost_maps.iter().enumerate() {
        for row in 0..g {
            for col in 0..g {
                let (x, y) = match result.positions.get(row * g + col).copied().flatten() {
                    Some(p) => (format!("{:e}", p.x), format!("{:e}", p.y)),
                    None => (String::new(), String::new()),
                };
                writeln!(out, "{o},{row},{col},{x},{y},{:.10e}", map[(row, col)])
                    .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
            }
        }
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn result() -> ExtractionResult {
        let map = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 4.0, 2.0]);
        ExtractionResult {
            grid_size: 2,
            cost_maps: vec![map],
            flux: vec![vec![vec![0.0]], vec![vec![0.5]], vec![vec![2.0]], vec![vec![1.0]]],
            positions: vec![
                Some(SkyPosition { x: -1.0, y: 1.0 }),
                Some(SkyPosition { x: 1.0, y: 1.0 }),
                None,
                Some(SkyPosition { x: 1.0, y: -1.0 }),
            ],
            best: vec![Detection {
                output: 0,
                template: 2,
                row: 1,
                col: 0,
                cost: 4.0,
                flux: vec![2.0],
                position: None,
            }],
            skipped_channels: Vec::new(),
        }
    }

    #[test]
    fn csv_has_one_row_per_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cost.csv");
        write_cost_csv(&path, &result()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "output,row,col,x,y,cost");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "0,1,0,,,4.0000000000e0");
        assert!(lines[2].starts_with("0,0,1,1e0,1e0,"));
    }

    #[test]
    fn json_export_is_row_major() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        write_extraction_json(&path, &result()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tool"], "sygn");
        assert_eq!(value["grid_size"], 2);
        assert_eq!(value["cost_maps"][0][1][0], 4.0);
        assert_eq!(value["best"][0]["template"], 2);
        assert!(value["best"][0]["position"].is_null());
    }
}
