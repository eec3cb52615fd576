//! Heat layer rendering
//!
//! This module provides the map plugin that renders the sampled trip points
//! as a density heatmap. Points are projected into screen space, binned into
//! a grid of radius-sized cells, and each occupied cell is painted with a
//! color ramp scaled by its share of the peak density.

use crate::data::TripPoint;
use egui::Color32;
use std::sync::Arc;
use tokio::sync::RwLock;
use walkers::{Plugin, Projector};

/// Render statistics published by the heat layer each frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeatStats {
    /// Sample points that landed inside the viewport
    pub projected_points: usize,

    /// Grid cells painted
    pub drawn_cells: usize,

    /// Highest per-cell point count
    pub peak_density: u32,
}

/// Plugin for rendering the sampled points as a heat layer
pub struct HeatmapPlugin {
    /// The current sample, shared with the application state
    sample: Arc<Vec<TripPoint>>,

    /// Heat point radius in pixels (also the grid cell size)
    radius: f32,

    /// Shared render statistics (updated each frame)
    stats: Arc<RwLock<HeatStats>>,
}

impl HeatmapPlugin {
    pub fn new(sample: Arc<Vec<TripPoint>>, radius: f32, stats: Arc<RwLock<HeatStats>>) -> Self {
        Self {
            sample,
            radius: radius.max(1.0),
            stats,
        }
    }
}

impl Plugin for HeatmapPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("HeatmapPlugin::run");

        let painter = ui.painter();
        let viewport_rect = response.rect;

        // Convert screen corners to geographic positions for culling
        let top_left_pos =
            projector.unproject(egui::Vec2::new(viewport_rect.min.x, viewport_rect.min.y));
        let bottom_right_pos =
            projector.unproject(egui::Vec2::new(viewport_rect.max.x, viewport_rect.max.y));

        let lat_min = top_left_pos.y().min(bottom_right_pos.y());
        let lat_max = top_left_pos.y().max(bottom_right_pos.y());
        let lon_min = top_left_pos.x().min(bottom_right_pos.x());
        let lon_max = top_left_pos.x().max(bottom_right_pos.x());

        // Bin visible points into a grid of radius-sized cells
        let cell = self.radius;
        let cols = (viewport_rect.width() / cell).ceil() as usize + 1;
        let rows = (viewport_rect.height() / cell).ceil() as usize + 1;
        let mut bins = vec![0u32; cols * rows];
        let mut projected_points = 0usize;

        {
            profiling::scope!("bin_points");
            for point in self.sample.iter() {
                if point.lat < lat_min
                    || point.lat > lat_max
                    || point.lon < lon_min
                    || point.lon > lon_max
                {
                    continue;
                }

                let screen_vec = projector.project(walkers::lat_lon(point.lat, point.lon));
                let x = screen_vec.x - viewport_rect.min.x;
                let y = screen_vec.y - viewport_rect.min.y;
                let col = (x / cell).floor();
                let row = (y / cell).floor();
                if col < 0.0 || row < 0.0 || col >= cols as f32 || row >= rows as f32 {
                    continue;
                }

                bins[row as usize * cols + col as usize] += 1;
                projected_points += 1;
            }
        }

        let peak_density = bins.iter().copied().max().unwrap_or(0);
        let mut drawn_cells = 0usize;

        if peak_density > 0 {
            profiling::scope!("paint_cells");
            for (index, &count) in bins.iter().enumerate() {
                if count == 0 {
                    continue;
                }

                let col = (index % cols) as f32;
                let row = (index / cols) as f32;
                let center = egui::Pos2::new(
                    viewport_rect.min.x + (col + 0.5) * cell,
                    viewport_rect.min.y + (row + 0.5) * cell,
                );

                // Square-root scaling so sparse cells stay visible next to hotspots
                let intensity = (count as f32 / peak_density as f32).sqrt();
                painter.circle_filled(center, self.radius, heat_color(intensity));
                drawn_cells += 1;
            }
        }

        // Use try_write for non-blocking stats publishing.
        if let Ok(mut stats) = self.stats.try_write() {
            *stats = HeatStats {
                projected_points,
                drawn_cells,
                peak_density,
            };
        }
    }
}

/// Map a normalized density to the heat ramp: blue through green and yellow
/// to red, increasingly opaque at higher densities.
fn heat_color(intensity: f32) -> Color32 {
    let intensity = intensity.clamp(0.0, 1.0);

    // Walk the hue from blue (240°) down to red (0°)
    let hue = 240.0 * (1.0 - intensity);
    let saturation = 0.9;
    let value = 1.0;

    // Convert HSV to RGB
    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = if hue < 60.0 {
        (c, x, 0.0)
    } else if hue < 120.0 {
        (x, c, 0.0)
    } else if hue < 180.0 {
        (0.0, c, x)
    } else if hue < 240.0 {
        (0.0, x, c)
    } else if hue < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let alpha = 60.0 + 180.0 * intensity;

    Color32::from_rgba_unmultiplied(
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
        alpha as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_color_endpoints() {
        let cold = heat_color(0.0);
        let hot = heat_color(1.0);

        // Low densities lean blue, the peak is red
        assert!(cold.b() > cold.r());
        assert!(hot.r() > hot.b());
        assert!(hot.a() > cold.a());
    }

    #[test]
    fn test_heat_color_clamps_out_of_range_input() {
        assert_eq!(heat_color(-1.0), heat_color(0.0));
        assert_eq!(heat_color(2.0), heat_color(1.0));
    }
}
