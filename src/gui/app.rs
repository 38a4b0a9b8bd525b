//! CORD-19 Explorer Main Application
//! Main window with control panel and tabbed chart viewer.

use crate::config::Config;
use crate::data::{DatasetCache, ViewFilter};
use crate::gui::snapshot::{year_bounds, ViewSettings, ViewSnapshot};
use crate::gui::{ChartViewer, ChartViewerAction, ControlPanel, ControlPanelAction, SidebarMetrics};
use crate::stats::Aggregate;
use egui::{Color32, RichText, SidePanel};

/// File name proposed by the save dialog.
const EXPORT_FILE_NAME: &str = "covid19_filtered_data.csv";

/// Main application window.
///
/// Everything runs on the UI thread: the cleaned table is cached per source
/// version and each filter change recomputes the snapshot synchronously.
pub struct ExplorerApp {
    config: Config,
    cache: DatasetCache,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    /// Blocking error shown instead of the dashboard
    error: Option<String>,
}

impl ExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let defaults = ViewSettings::from_config(&config);
        let mut app = Self {
            config,
            cache: DatasetCache::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(defaults.top_journals, defaults.top_words),
            error: None,
        };
        app.load_dataset();
        app
    }

    /// Load (or reuse) the cleaned table and reset the filters when the
    /// source changed.
    fn load_dataset(&mut self) {
        let path = self.config.data.path.clone();
        let previous = self.cache.current().map(|d| d.content_hash);

        let loaded = self
            .cache
            .get_or_load(&path, &self.config.cleaning_options())
            .map(|dataset| {
                (
                    dataset.content_hash,
                    dataset.raw.height(),
                    year_bounds(&dataset.cleaned.df),
                )
            });

        match loaded {
            Ok((hash, original_papers, bounds)) => {
                self.error = None;
                if previous == Some(hash) {
                    self.control_panel.set_status("Data unchanged");
                } else {
                    self.control_panel.reset(&path, bounds);
                    self.control_panel.metrics.original_papers = original_papers;
                    self.control_panel
                        .set_status(&format!("Loaded {} papers", original_papers));
                }
                self.refresh_view();
            }
            Err(e) => {
                log::error!("{}", e);
                self.chart_viewer.clear();
                self.error = Some(e.to_string());
            }
        }
    }

    /// Recompute the filtered view and its aggregates.
    fn refresh_view(&mut self) {
        let Some(dataset) = self.cache.current() else {
            return;
        };
        let mut settings = ViewSettings::from_config(&self.config);
        settings.top_journals = self.chart_viewer.top_journals;
        settings.top_words = self.chart_viewer.top_words;

        // Journal options come from the year-filtered view, so a stale
        // selection is dropped and the view recomputed once.
        let mut result = ViewSnapshot::compute(
            &dataset.cleaned.df,
            &self.control_panel.criteria(),
            &settings,
        );
        if let Ok(snapshot) = &result {
            if self
                .control_panel
                .set_journal_options(snapshot.journal_choices.clone())
            {
                result = ViewSnapshot::compute(
                    &dataset.cleaned.df,
                    &self.control_panel.criteria(),
                    &settings,
                );
            }
        }

        match result {
            Ok(snapshot) => {
                self.control_panel.metrics = SidebarMetrics {
                    filtered_papers: snapshot.papers(),
                    original_papers: dataset.raw.height(),
                    avg_abstract_words: match snapshot.avg_abstract_words {
                        Aggregate::Available(avg) => avg,
                        Aggregate::Unavailable { .. } => None,
                    },
                };
                self.chart_viewer.set_snapshot(snapshot);
            }
            Err(e) => {
                log::error!("Filtering failed: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    /// Save the filtered view through a save-file dialog.
    fn handle_export_csv(&mut self) {
        let Some(snapshot) = self.chart_viewer.snapshot() else {
            self.control_panel.set_status("No data to export");
            return;
        };

        let output_path = match rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(EXPORT_FILE_NAME)
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        match ViewFilter::export_csv(&snapshot.view, &output_path) {
            Ok(rows) => self
                .control_panel
                .set_status(&format!("Exported {} rows", rows)),
            Err(e) => {
                log::error!("{}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    fn show_error(&mut self, ctx: &egui::Context, message: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 3.0);
                ui.label(
                    RichText::new("⚠ Could not load the dataset")
                        .size(22.0)
                        .strong()
                        .color(Color32::from_rgb(220, 53, 69)),
                );
                ui.add_space(8.0);
                ui.label(RichText::new(message).size(14.0));
                ui.label(
                    RichText::new(format!(
                        "Expected the metadata CSV at {}",
                        self.config.data.path.display()
                    ))
                    .size(12.0)
                    .color(Color32::GRAY),
                );
                ui.add_space(12.0);
                if ui.button("🔄 Retry").clicked() {
                    self.load_dataset();
                }
            });
        });
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(message) = self.error.clone() {
            self.show_error(ctx, &message);
            return;
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::FiltersChanged => self.refresh_view(),
                        ControlPanelAction::Reload => self.load_dataset(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            match self.chart_viewer.show(ctx, ui) {
                ChartViewerAction::SettingsChanged => self.refresh_view(),
                ChartViewerAction::ExportCsv => self.handle_export_csv(),
                ChartViewerAction::None => {}
            }
        });
    }
}
