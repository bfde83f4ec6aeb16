//! Dashboard Widget
//! Central panel with the two chart cards: the projected cluster map and
//! the radar feature profile, including the recoverable empty states.

use egui::{Color32, RichText, ScrollArea};
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::charts::ChartPlotter;
use crate::data::Dataset;
use crate::profile::{AggregateError, AggregateProfile};

const CARD_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 480.0;

/// Central dashboard area holding the current profile and orbit state.
pub struct Dashboard {
    /// Outcome of the latest aggregation, kept until the next selection.
    pub profile: Option<Result<AggregateProfile, AggregateError>>,
    yaw: f32,
    pitch: f32,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            profile: None,
            yaw: 0.6,
            pitch: 0.4,
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the latest aggregation outcome (success or recoverable error).
    pub fn set_profile(&mut self, profile: Result<AggregateProfile, AggregateError>) {
        self.profile = Some(profile);
    }

    pub fn current_profile(&self) -> Option<&AggregateProfile> {
        match &self.profile {
            Some(Ok(profile)) => Some(profile),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.profile = None;
    }

    /// Draw the dashboard: both cards side by side, or the placeholder /
    /// fatal-error state when no dataset is loaded.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        dataset: Option<&Dataset>,
        load_error: Option<&str>,
        highlight: Option<&str>,
    ) {
        if let Some(error) = load_error {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new(format!("⚠ {error}"))
                        .size(16.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
            });
            return;
        }
        let Some(dataset) = dataset else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        let avail_width = ui.available_width();
        // Same 3:2 split as the original dashboard layout.
        let map_width = (avail_width - CARD_SPACING) * 0.58;
        let profile_width = (avail_width - CARD_SPACING) * 0.40;

        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            ui.horizontal_top(|ui| {
                ui.vertical(|ui| {
                    ui.set_width(map_width);
                    self.draw_map_card(ui, dataset, highlight);
                });
                ui.add_space(CARD_SPACING);
                ui.vertical(|ui| {
                    ui.set_width(profile_width);
                    self.draw_profile_card(ui, dataset);
                });
            });
        });
    }

    /// Projected 3D scatter with orbit sliders.
    fn draw_map_card(&mut self, ui: &mut egui::Ui, dataset: &Dataset, highlight: Option<&str>) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new("🗺 Cluster Map (3D)").size(16.0).strong());
                ui.add_space(6.0);

                ui.horizontal(|ui| {
                    ui.add(
                        egui::Slider::new(&mut self.yaw, 0.0..=TAU)
                            .text("yaw")
                            .show_value(false),
                    );
                    ui.add_space(10.0);
                    ui.add(
                        egui::Slider::new(&mut self.pitch, -FRAC_PI_2..=FRAC_PI_2)
                            .text("pitch")
                            .show_value(false),
                    );
                });
                ui.add_space(6.0);

                ChartPlotter::draw_projection_chart(
                    ui,
                    dataset,
                    self.yaw as f64,
                    self.pitch as f64,
                    highlight,
                    CHART_HEIGHT,
                );
            });
    }

    /// Radar profile, or the message for a recoverable aggregation failure.
    fn draw_profile_card(&mut self, ui: &mut egui::Ui, dataset: &Dataset) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                let title = match &self.profile {
                    Some(Ok(profile)) => format!("📊 Feature Profile — {}", profile.selection),
                    _ => "📊 Feature Profile".to_string(),
                };
                ui.label(RichText::new(title).size(16.0).strong());
                ui.add_space(6.0);

                match &self.profile {
                    None => {
                        ui.label(RichText::new("Select a cluster or city.").color(Color32::GRAY));
                    }
                    Some(Ok(profile)) => {
                        ChartPlotter::draw_radar_chart(
                            ui,
                            profile,
                            dataset.radial_max(),
                            CHART_HEIGHT * 0.78,
                        );
                        ui.add_space(8.0);
                        ui.label(
                            RichText::new(format!(
                                "This profile represents the average of {} cities.",
                                profile.member_count
                            ))
                            .size(12.0)
                            .color(Color32::from_rgb(40, 167, 69)),
                        );
                        egui::CollapsingHeader::new("Show cities in this selection")
                            .default_open(false)
                            .show(ui, |ui| {
                                ui.label(profile.members.join(", "));
                            });
                    }
                    Some(Err(AggregateError::ProfileNotFound { key, available })) => {
                        ui.label(
                            RichText::new(format!("No feature profile found for '{key}'."))
                                .color(Color32::from_rgb(220, 53, 69)),
                        );
                        ui.add_space(4.0);
                        ui.label(
                            RichText::new(format!(
                                "Available keys include: {}",
                                available.join(", ")
                            ))
                            .size(12.0)
                            .color(Color32::GRAY),
                        );
                    }
                    Some(Err(AggregateError::EmptyAggregate { label, members })) => {
                        ui.label(
                            RichText::new(format!(
                                "Cluster '{label}' has no members with feature data."
                            ))
                            .color(Color32::from_rgb(243, 156, 18)),
                        );
                        ui.add_space(4.0);
                        let detail = if members.is_empty() {
                            "The cluster has no member cities at all.".to_string()
                        } else {
                            format!("Members without a profile: {}", members.join(", "))
                        };
                        ui.label(RichText::new(detail).size(12.0).color(Color32::GRAY));
                    }
                }
            });
    }
}
