//! Chart Plotter Module
//! Interactive dashboard charts using egui_plot: the projected 3D cluster
//! scatter and the radar feature profile.

use egui::{Color32, Stroke};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::data::Dataset;
use crate::profile::AggregateProfile;

/// Stroke/fill color of the radar profile polygon.
pub const PROFILE_COLOR: Color32 = Color32::from_rgb(0, 104, 201);

/// Color palette for clusters
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

const GRID_COLOR: Color32 = Color32::from_gray(90);

/// Creates the dashboard visualizations using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for a cluster by its position in canonical label order.
    pub fn cluster_color(cluster_index: usize) -> Color32 {
        PALETTE[cluster_index % PALETTE.len()]
    }

    /// Orthographic projection of a 3D point after yaw/pitch rotation.
    pub fn project(coord: [f64; 3], yaw: f64, pitch: f64) -> [f64; 2] {
        let (sin_yaw, cos_yaw) = yaw.sin_cos();
        let (sin_pitch, cos_pitch) = pitch.sin_cos();

        let x = coord[0] * cos_yaw + coord[2] * sin_yaw;
        let z = -coord[0] * sin_yaw + coord[2] * cos_yaw;
        let y = coord[1] * cos_pitch - z * sin_pitch;
        [x, y]
    }

    /// Draw the cluster map: every city projected to 2D, colored by cluster,
    /// with the selected cluster highlighted and the rest dimmed.
    pub fn draw_projection_chart(
        ui: &mut egui::Ui,
        dataset: &Dataset,
        yaw: f64,
        pitch: f64,
        highlight: Option<&str>,
        height: f32,
    ) {
        let labels = dataset.cluster_labels();

        Plot::new("cluster_projection")
            .height(height)
            .data_aspect(1.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .show_axes(false)
            .show_x(false)
            .show_y(false)
            .show(ui, |plot_ui| {
                for (idx, label) in labels.iter().enumerate() {
                    let color = Self::cluster_color(idx);
                    let dimmed = highlight.is_some_and(|h| h != label);
                    let (color, radius) = if dimmed {
                        (color.gamma_multiply(0.25), 2.5)
                    } else {
                        (color, 4.0)
                    };

                    let points: PlotPoints = dataset
                        .cities
                        .points()
                        .iter()
                        .filter(|p| p.cluster == *label)
                        .map(|p| Self::project(p.coord, yaw, pitch))
                        .collect();

                    plot_ui.points(
                        Points::new(points)
                            .radius(radius)
                            .color(color)
                            .name(format!("Cluster {}", label)),
                    );
                }
            });
    }

    /// Draw the radar profile: grid rings, axis spokes, feature labels and
    /// the filled profile polygon.
    ///
    /// `radial_max` comes from the full feature table (a session fact), so
    /// the scale does not jump as the selection changes.
    pub fn draw_radar_chart(
        ui: &mut egui::Ui,
        profile: &AggregateProfile,
        radial_max: f64,
        height: f32,
    ) {
        let axes = profile.axis_count();
        if axes == 0 {
            return;
        }
        let bound = radial_max * 1.45;

        Plot::new(format!("radar_{}", profile.selection))
            .height(height)
            .data_aspect(1.0)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_axes(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .include_x(-bound)
            .include_x(bound)
            .include_y(-bound)
            .include_y(bound)
            .show(ui, |plot_ui| {
                // Concentric grid rings at quarter steps of the radial max.
                for step in 1..=4 {
                    let r = radial_max * step as f64 / 4.0;
                    let ring: PlotPoints = (0..=64)
                        .map(|i| {
                            let theta = TAU * i as f64 / 64.0;
                            [r * theta.cos(), r * theta.sin()]
                        })
                        .collect();
                    plot_ui.line(Line::new(ring).color(GRID_COLOR).width(0.5));
                }

                // Axis spokes and feature labels.
                for (i, label) in profile.labels.iter().take(axes).enumerate() {
                    let theta = Self::axis_angle(i, axes);
                    let (dir_x, dir_y) = (theta.cos(), theta.sin());

                    let spoke: PlotPoints =
                        vec![[0.0, 0.0], [radial_max * dir_x, radial_max * dir_y]].into();
                    plot_ui.line(Line::new(spoke).color(GRID_COLOR).width(0.5));

                    plot_ui.text(Text::new(
                        PlotPoint::new(radial_max * 1.22 * dir_x, radial_max * 1.22 * dir_y),
                        label.clone(),
                    ));
                }

                // Profile polygon (open ring; Polygon closes it) plus the
                // closed outline.
                let ring: Vec<[f64; 2]> = profile
                    .values
                    .iter()
                    .take(axes)
                    .enumerate()
                    .map(|(i, &v)| {
                        let theta = Self::axis_angle(i, axes);
                        [v * theta.cos(), v * theta.sin()]
                    })
                    .collect();

                plot_ui.polygon(
                    Polygon::new(PlotPoints::from_iter(ring.iter().copied()))
                        .fill_color(PROFILE_COLOR.gamma_multiply(0.2))
                        .stroke(Stroke::new(2.0, PROFILE_COLOR)),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(ring.iter().copied()))
                        .radius(3.0)
                        .color(PROFILE_COLOR),
                );
            });
    }

    /// Angle of axis `i` of `n`: first axis at twelve o'clock, clockwise.
    pub fn axis_angle(i: usize, n: usize) -> f64 {
        FRAC_PI_2 - TAU * i as f64 / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_projection_keeps_xy() {
        let [x, y] = ChartPlotter::project([1.0, 2.0, 3.0], 0.0, 0.0);
        assert_eq!(x, 1.0);
        assert_eq!(y, 2.0);
    }

    #[test]
    fn quarter_yaw_swaps_z_into_x() {
        let [x, _] = ChartPlotter::project([0.0, 0.0, 5.0], FRAC_PI_2, 0.0);
        assert!((x - 5.0).abs() < 1e-12);
    }

    #[test]
    fn first_axis_points_up() {
        let theta = ChartPlotter::axis_angle(0, 4);
        assert!((theta.cos()).abs() < 1e-12);
        assert!((theta.sin() - 1.0).abs() < 1e-12);
    }
}
