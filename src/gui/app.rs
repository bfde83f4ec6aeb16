//! CityScope Main Application
//! Main window with control panel and the two-chart dashboard.

use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info};

use crate::charts::StaticChartRenderer;
use crate::config::{AppConfig, CONFIG_FILE};
use crate::data::{Dataset, DatasetLoader};
use crate::gui::control_panel::{ControlPanel, ControlPanelAction, SelectOption};
use crate::gui::Dashboard;
use crate::profile::{aggregate, cluster_overview, SelectionMode};

/// Dataset loading result from background thread
enum LoadResult {
    Progress(String),
    Complete(Box<Dataset>),
    Error(String),
}

/// Main application window.
pub struct CityscopeApp {
    config_path: PathBuf,
    dataset: Option<Dataset>,
    load_error: Option<String>,
    highlight: Option<String>,
    control_panel: ControlPanel,
    dashboard: Dashboard,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl CityscopeApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config_path = PathBuf::from(CONFIG_FILE);
        let config = AppConfig::load(&config_path).unwrap_or_else(|e| {
            error!("{e:#}");
            AppConfig::default()
        });

        let mut control_panel = ControlPanel::new();
        control_panel.settings.projection_csv = config.projection_csv;
        control_panel.settings.features_csv = config.features_csv;
        control_panel.settings.mode = config.mode;

        let mut app = Self {
            config_path,
            dataset: None,
            load_error: None,
            highlight: None,
            control_panel,
            dashboard: Dashboard::new(),
            load_rx: None,
            is_loading: false,
        };
        // The backing files are static for the session: load once at startup.
        app.start_load();
        app
    }

    /// Kick off dataset loading on a background thread.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        self.dataset = None;
        self.load_error = None;
        self.dashboard.clear();
        self.control_panel.export_enabled = false;
        self.control_panel.set_progress(5.0, "Loading datasets...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let projection = self.control_panel.settings.projection_csv.clone();
        let features = self.control_panel.settings.features_csv.clone();

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading CSV files...".to_string()));
            match DatasetLoader::load(&projection, &features) {
                Ok(dataset) => {
                    let _ = tx.send(LoadResult::Complete(Box::new(dataset)));
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_progress(40.0, &status);
                    }
                    LoadResult::Complete(dataset) => {
                        let summary = format!(
                            "Loaded {} cities, {} clusters, {} features",
                            dataset.cities.len(),
                            dataset.cluster_labels().len(),
                            dataset.features.feature_names().len()
                        );
                        self.dataset = Some(*dataset);
                        self.rebuild_options();
                        self.recompute_profile();
                        self.control_panel.set_progress(100.0, &summary);
                        if let Err(e) = self.current_config().save(&self.config_path) {
                            error!("{e:#}");
                        }
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(message) => {
                        self.load_error = Some(message.clone());
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {message}"));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Rebuild the selection combo for the current mode.
    fn rebuild_options(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.control_panel.update_options(Vec::new());
            return;
        };

        let options = match self.control_panel.settings.mode {
            SelectionMode::ByCluster => cluster_overview(&dataset.cities, &dataset.features)
                .into_iter()
                .map(|overview| SelectOption {
                    // Flag clusters where the join dropped members.
                    display: if overview.matched_count < overview.city_count {
                        format!(
                            "Cluster {} ({}/{} cities)",
                            overview.label, overview.matched_count, overview.city_count
                        )
                    } else {
                        format!(
                            "Cluster {} ({} cities)",
                            overview.label, overview.city_count
                        )
                    },
                    value: overview.label,
                })
                .collect(),
            SelectionMode::ByCity => dataset
                .cities
                .city_names()
                .into_iter()
                .map(|city| SelectOption {
                    display: city.clone(),
                    value: city,
                })
                .collect(),
        };
        self.control_panel.update_options(options);
    }

    /// Run one aggregation for the current selection and hand the outcome
    /// (success or recoverable failure) to the dashboard.
    fn recompute_profile(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let settings = &self.control_panel.settings;
        if settings.selection.is_empty() {
            return;
        }

        let result = aggregate(
            &settings.selection,
            &dataset.cities,
            &dataset.features,
            settings.mode,
        );
        if let Err(e) = &result {
            info!("aggregation fell back to message: {e}");
        }

        self.highlight = match settings.mode {
            SelectionMode::ByCluster => Some(settings.selection.clone()),
            SelectionMode::ByCity => dataset
                .cities
                .cluster_of(&settings.selection)
                .map(String::from),
        };
        self.control_panel.export_enabled = result.is_ok();
        self.dashboard.set_profile(result);
    }

    fn handle_browse(&mut self, target: ControlPanelAction) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            match target {
                ControlPanelAction::BrowseProjection => {
                    self.control_panel.settings.projection_csv = path;
                }
                ControlPanelAction::BrowseFeatures => {
                    self.control_panel.settings.features_csv = path;
                }
                _ => {}
            }
            self.start_load();
        }
    }

    fn handle_mode_changed(&mut self) {
        self.rebuild_options();
        self.recompute_profile();
        if let Err(e) = self.current_config().save(&self.config_path) {
            error!("{e:#}");
        }
    }

    /// Export the current radar profile as a PNG and open it.
    fn handle_export_png(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let Some(profile) = self.dashboard.current_profile() else {
            self.control_panel.set_progress(0.0, "No profile to export");
            return;
        };

        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(format!("profile_{}.png", profile.selection))
            .save_file()
        else {
            return; // User cancelled
        };

        match StaticChartRenderer::render_profile_png(
            profile,
            dataset.radial_max(),
            &output_path,
            900,
            700,
        ) {
            Ok(()) => {
                self.control_panel
                    .set_progress(100.0, &format!("Exported {}", output_path.display()));
                let _ = open::that(&output_path);
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: export failed: {e:#}"));
            }
        }
    }

    fn current_config(&self) -> AppConfig {
        AppConfig {
            projection_csv: self.control_panel.settings.projection_csv.clone(),
            features_csv: self.control_panel.settings.features_csv.clone(),
            mode: self.control_panel.settings.mode,
        }
    }
}

impl eframe::App for CityscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseProjection
                        | ControlPanelAction::BrowseFeatures => self.handle_browse(action),
                        ControlPanelAction::Reload => self.start_load(),
                        ControlPanelAction::ModeChanged => self.handle_mode_changed(),
                        ControlPanelAction::SelectionChanged => self.recompute_profile(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.dashboard.show(
                ui,
                self.dataset.as_ref(),
                self.load_error.as_deref(),
                self.highlight.as_deref(),
            );
        });
    }
}
