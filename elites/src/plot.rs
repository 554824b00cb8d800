//! SVG heatmap of a one- or two-dimensional archive.

use std::path::Path;

use plotters::prelude::*;

use crate::archive::Archive;
use crate::error::{MapElitesError, Result};
use crate::feature::FeatureDimension;

const SIZE: (u32, u32) = (960, 720);

/// Labels of the form `"n: lo to hi"`, one per bin, numbered from 1.
pub fn bin_labels(bins: &[f64]) -> Vec<String> {
    bins.windows(2)
        .enumerate()
        .map(|(i, edges)| format!("{}: {} to {}", i + 1, edges[0], edges[1]))
        .collect()
}

/// Render `archive` to `path`. Returns `Ok(false)` without writing anything
/// when the archive has more than two dimensions.
pub fn render_heatmap(archive: &Archive, dimensions: &[FeatureDimension], path: &Path) -> Result<bool> {
    if dimensions.is_empty() || dimensions.len() > 2 {
        tracing::info!(dimensions = dimensions.len(), "heatmap only covers one or two feature dimensions");
        return Ok(false);
    }

    draw(archive, dimensions, path).map_err(|err| MapElitesError::Plot(err.to_string()))?;
    Ok(true)
}

fn draw(
    archive: &Archive,
    dimensions: &[FeatureDimension],
    path: &Path,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let x_labels = bin_labels(dimensions[0].bins());
    let (y_labels, y_name) = match dimensions.get(1) {
        Some(dimension) => (bin_labels(dimension.bins()), dimension.name().to_string()),
        None => (vec![String::new()], String::new()),
    };
    let columns = x_labels.len();
    let rows = y_labels.len();

    let (low, high) = archive.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), (_, elite)| {
        (low.min(elite.performance), high.max(elite.performance))
    });

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Map of elites ({:?})", archive.objective()), ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(120)
        .build_cartesian_2d(0f64..columns as f64, 0f64..rows as f64)?;

    let label = |labels: &[String], v: f64| -> String {
        let index = v.floor();
        if (v - index - 0.5).abs() < 1e-9 && index >= 0.0 {
            labels.get(index as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    let x_format = |v: &f64| label(&x_labels, *v);
    let y_format = |v: &f64| label(&y_labels, *v);

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(dimensions[0].name())
        .y_desc(y_name)
        .x_labels(2 * columns + 1)
        .y_labels(2 * rows + 1)
        .x_label_formatter(&x_format)
        .y_label_formatter(&y_format)
        .draw()?;

    chart.draw_series(archive.iter().map(|(cell, elite)| {
        let x = cell[0] as f64;
        let y = cell.get(1).copied().unwrap_or(0) as f64;
        let t = if high > low {
            (elite.performance - low) / (high - low)
        } else {
            0.5
        };
        // blue for the low end, red for the high end
        let color = HSLColor(0.66 * (1.0 - t), 0.75, 0.5);
        Rectangle::new([(x, y), (x + 1.0, y + 1.0)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}
