//! Control Panel Widget
//! Left side panel with data source pickers, selection mode and the
//! cluster/city selection control.

use crate::profile::SelectionMode;
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// User settings driving the dashboard
#[derive(Default, Clone)]
pub struct UserSettings {
    pub projection_csv: PathBuf,
    pub features_csv: PathBuf,
    pub mode: SelectionMode,
    pub selection: String,
}

/// One entry of the selection combo.
#[derive(Debug, Clone)]
pub struct SelectOption {
    /// Canonical value handed to the aggregator.
    pub value: String,
    /// Text shown in the combo.
    pub display: String,
}

/// Left side control panel with file selection and the selection control.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub options: Vec<SelectOption>,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            options: Vec::new(),
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection options after a load or mode change, keeping
    /// the current selection when it is still present, else defaulting to
    /// the first entry in canonical order.
    pub fn update_options(&mut self, options: Vec<SelectOption>) {
        let current_valid = options.iter().any(|o| o.value == self.settings.selection);
        if !current_valid {
            self.settings.selection = options
                .first()
                .map(|o| o.value.clone())
                .unwrap_or_default();
        }
        self.options = options;
    }

    fn selected_display(&self) -> String {
        self.options
            .iter()
            .find(|o| o.value == self.settings.selection)
            .map(|o| o.display.clone())
            .unwrap_or_else(|| self.settings.selection.clone())
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏙 CityScope")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("City Cluster Dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Sources").size(14.0).strong());
        ui.add_space(5.0);

        Self::file_row(
            ui,
            "Projection:",
            &self.settings.projection_csv,
            || action = ControlPanelAction::BrowseProjection,
        );
        ui.add_space(5.0);
        Self::file_row(
            ui,
            "Features:",
            &self.settings.features_csv,
            || action = ControlPanelAction::BrowseFeatures,
        );

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            if ui.button("⟳ Reload Data").clicked() {
                action = ControlPanelAction::Reload;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Selection Mode Section =====
        ui.label(RichText::new("⚙ Selection Mode").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            if ui
                .radio_value(&mut self.settings.mode, SelectionMode::ByCluster, "By Cluster")
                .changed()
            {
                action = ControlPanelAction::ModeChanged;
            }
            if ui
                .radio_value(&mut self.settings.mode, SelectionMode::ByCity, "By City")
                .changed()
            {
                action = ControlPanelAction::ModeChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Selection Section =====
        let select_label = match self.settings.mode {
            SelectionMode::ByCluster => "Cluster:",
            SelectionMode::ByCity => "City:",
        };
        ui.label(RichText::new("🔍 Analyze").size(14.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.add_sized([70.0, 20.0], egui::Label::new(select_label));
            ComboBox::from_id_salt("selection")
                .width(180.0)
                .selected_text(self.selected_display())
                .show_ui(ui, |ui| {
                    for option in &self.options {
                        if ui
                            .selectable_label(
                                self.settings.selection == option.value,
                                &option.display,
                            )
                            .clicked()
                        {
                            self.settings.selection = option.value.clone();
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// One aligned label + file name + browse button row.
    fn file_row(
        ui: &mut egui::Ui,
        label: &str,
        path: &std::path::Path,
        mut on_browse: impl FnMut(),
    ) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.add_sized([70.0, 20.0], egui::Label::new(label));
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());
                    ui.label(RichText::new(name).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            on_browse();
                        }
                    });
                });
            });
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseProjection,
    BrowseFeatures,
    Reload,
    ModeChanged,
    SelectionChanged,
    ExportPng,
}
