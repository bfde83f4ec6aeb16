//! Static Chart Renderer
//! Exports the current radar profile as a PNG image, mirroring the
//! interactive chart: grid rings, axis spokes, labeled axes and the filled
//! profile polygon, plus a member-count footer.

use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

use crate::charts::plotter::ChartPlotter;
use crate::profile::AggregateProfile;

const PROFILE_RGB: RGBColor = RGBColor(0, 104, 201);
const GRID_RGB: RGBColor = RGBColor(210, 210, 210);

/// Renders profile cards to image files with plotters.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one radar profile card to a PNG at `path`.
    pub fn render_profile_png(
        profile: &AggregateProfile,
        radial_max: f64,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let axes = profile.axis_count();
        anyhow::ensure!(axes > 0, "profile has no axes to draw");

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).context("failed to fill background")?;

        let caption = if profile.member_count == 1 {
            profile.selection.clone()
        } else {
            format!(
                "{} (average of {} cities)",
                profile.selection, profile.member_count
            )
        };

        let bound = radial_max * 1.5;
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 28))
            .margin(20)
            .build_cartesian_2d(-bound..bound, -bound..bound)
            .context("failed to build chart area")?;

        // Concentric grid rings.
        for step in 1..=4 {
            let r = radial_max * step as f64 / 4.0;
            let ring: Vec<(f64, f64)> = (0..=64)
                .map(|i| {
                    let theta = std::f64::consts::TAU * i as f64 / 64.0;
                    (r * theta.cos(), r * theta.sin())
                })
                .collect();
            chart
                .draw_series(std::iter::once(PathElement::new(ring, GRID_RGB)))
                .context("failed to draw grid ring")?;
        }

        // Axis spokes and labels.
        for (i, label) in profile.labels.iter().take(axes).enumerate() {
            let theta = ChartPlotter::axis_angle(i, axes);
            let (dir_x, dir_y) = (theta.cos(), theta.sin());

            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0.0, 0.0), (radial_max * dir_x, radial_max * dir_y)],
                    GRID_RGB,
                )))
                .context("failed to draw axis spoke")?;

            let style = TextStyle::from(("sans-serif", 18).into_font()).pos(Pos::new(
                if dir_x < -0.1 {
                    HPos::Right
                } else if dir_x > 0.1 {
                    HPos::Left
                } else {
                    HPos::Center
                },
                if dir_y < -0.1 { VPos::Top } else { VPos::Bottom },
            ));
            chart
                .draw_series(std::iter::once(Text::new(
                    label.clone(),
                    (radial_max * 1.12 * dir_x, radial_max * 1.12 * dir_y),
                    style,
                )))
                .context("failed to draw axis label")?;
        }

        // Filled profile polygon with outline and vertex markers.
        let ring: Vec<(f64, f64)> = profile
            .values
            .iter()
            .take(axes)
            .enumerate()
            .map(|(i, &v)| {
                let theta = ChartPlotter::axis_angle(i, axes);
                (v * theta.cos(), v * theta.sin())
            })
            .collect();

        chart
            .draw_series(std::iter::once(Polygon::new(
                ring.clone(),
                PROFILE_RGB.mix(0.2).filled(),
            )))
            .context("failed to draw profile fill")?;

        let mut outline = ring.clone();
        if let Some(first) = ring.first() {
            outline.push(*first);
        }
        chart
            .draw_series(std::iter::once(PathElement::new(
                outline,
                PROFILE_RGB.stroke_width(2),
            )))
            .context("failed to draw profile outline")?;
        chart
            .draw_series(
                ring.iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, PROFILE_RGB.filled())),
            )
            .context("failed to draw profile vertices")?;

        root.present().context("failed to write chart image")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CityPoint, CityTable, FeatureTable};
    use crate::profile::{aggregate, SelectionMode};

    #[test]
    fn renders_a_profile_card_to_disk() {
        let mut cities = CityTable::new();
        cities.push(CityPoint {
            city: "Paris".to_string(),
            cluster: "1".to_string(),
            coord: [0.0, 0.0, 0.0],
        });
        let mut features = FeatureTable::new(vec![
            "economy".to_string(),
            "mobility".to_string(),
            "environment".to_string(),
        ]);
        features.insert("Paris".to_string(), vec![0.2, 0.8, 0.5]);

        let profile = aggregate("1", &cities, &features, SelectionMode::ByCluster).unwrap();
        let path = std::env::temp_dir().join(format!("cityscope_test_{}.png", std::process::id()));

        StaticChartRenderer::render_profile_png(&profile, 1.0, &path, 640, 520).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
