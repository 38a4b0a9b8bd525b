//! Control Panel Widget
//! Left side panel with the filter controls and dataset metrics.

use crate::data::FilterCriteria;
use egui::{Color32, RichText, ScrollArea};
use std::path::Path;

/// Metrics shown under the filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SidebarMetrics {
    pub filtered_papers: usize,
    pub original_papers: usize,
    pub avg_abstract_words: Option<f64>,
}

/// Left side control panel with year/journal filters and a reload button.
pub struct ControlPanel {
    pub source_name: String,
    /// Full year range of the cleaned table; `None` hides the year filter
    pub year_bounds: Option<(i32, i32)>,
    pub year_from: i32,
    pub year_to: i32,
    pub include_undated: bool,
    pub journal_options: Vec<String>,
    pub selected_journals: Vec<String>,
    pub journal_search: String,
    pub metrics: SidebarMetrics,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            source_name: String::new(),
            year_bounds: None,
            year_from: 0,
            year_to: 0,
            include_undated: false,
            journal_options: Vec::new(),
            selected_journals: Vec::new(),
            journal_search: String::new(),
            metrics: SidebarMetrics::default(),
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the filters for a freshly loaded dataset.
    pub fn reset(&mut self, source: &Path, year_bounds: Option<(i32, i32)>) {
        self.source_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.display().to_string());
        self.year_bounds = year_bounds;
        if let Some((min, max)) = year_bounds {
            self.year_from = min;
            self.year_to = max;
        }
        self.selected_journals.clear();
        self.journal_search.clear();
    }

    /// Criteria for the current control state.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            year_range: self.year_bounds.map(|_| (self.year_from, self.year_to)),
            include_undated: self.include_undated,
            journals: self.selected_journals.clone(),
        }
    }

    /// Replace the journal options; selections no longer offered are dropped.
    ///
    /// Returns true when the selection changed.
    pub fn set_journal_options(&mut self, options: Vec<String>) -> bool {
        let before = self.selected_journals.len();
        self.selected_journals.retain(|j| options.contains(j));
        self.journal_options = options;
        self.selected_journals.len() != before
    }

    fn toggle_journal(&mut self, journal: &str, selected: bool) {
        if selected {
            if !self.selected_journals.iter().any(|j| j == journal) {
                self.selected_journals.push(journal.to_string());
            }
        } else {
            self.selected_journals.retain(|j| j != journal);
        }
    }

    /// Set status
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🦠 CORD-19 Explorer")
                    .size(22.0)
                    .color(Color32::from_rgb(46, 134, 171)),
            );
            ui.label(RichText::new(&self.source_name).size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Year Section =====
        ui.label(RichText::new("📅 Year Range").size(14.0).strong());
        ui.add_space(5.0);

        match self.year_bounds {
            Some((min, max)) => {
                let from = ui.add(egui::Slider::new(&mut self.year_from, min..=max).text("From"));
                let to = ui.add(egui::Slider::new(&mut self.year_to, min..=max).text("To"));
                if from.changed() && self.year_from > self.year_to {
                    self.year_to = self.year_from;
                }
                if to.changed() && self.year_to < self.year_from {
                    self.year_from = self.year_to;
                }
                let undated = ui.checkbox(&mut self.include_undated, "Include undated papers");
                if from.changed() || to.changed() || undated.changed() {
                    action = ControlPanelAction::FiltersChanged;
                }
            }
            None => {
                ui.label(RichText::new("No publication years available").color(Color32::GRAY));
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Journal Section =====
        ui.label(RichText::new("📚 Filter by Journal").size(14.0).strong());
        ui.label(
            RichText::new("Leave empty for all journals")
                .size(11.0)
                .color(Color32::GRAY),
        );
        ui.add_space(5.0);

        ui.add(egui::TextEdit::singleline(&mut self.journal_search).hint_text("Search journals"));
        ui.add_space(5.0);

        let needle = self.journal_search.to_lowercase();
        let mut toggled: Option<(String, bool)> = None;
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                    for journal in &self.journal_options {
                        if !needle.is_empty() && !journal.to_lowercase().contains(&needle) {
                            continue;
                        }
                        let mut selected = self.selected_journals.contains(journal);
                        if ui.checkbox(&mut selected, journal).changed() {
                            toggled = Some((journal.clone(), selected));
                        }
                    }
                });
            });
        if let Some((journal, selected)) = toggled {
            self.toggle_journal(&journal, selected);
            action = ControlPanelAction::FiltersChanged;
        }

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.label(format!("{} selected", self.selected_journals.len()));
            if ui.small_button("Clear All").clicked() && !self.selected_journals.is_empty() {
                self.selected_journals.clear();
                action = ControlPanelAction::FiltersChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Metrics Section =====
        ui.label(RichText::new("📊 Dataset Statistics").size(14.0).strong());
        ui.add_space(5.0);

        egui::Grid::new("sidebar_metrics")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label("Total Papers");
                ui.label(RichText::new(self.metrics.filtered_papers.to_string()).strong());
                ui.end_row();
                ui.label("Original Dataset");
                ui.label(RichText::new(self.metrics.original_papers.to_string()).strong());
                ui.end_row();
                if let Some(avg) = self.metrics.avg_abstract_words {
                    ui.label("Avg Abstract Words");
                    ui.label(RichText::new(format!("{:.0}", avg)).strong());
                    ui.end_row();
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("🔄 Reload Data").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::Reload;
            }
        });

        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    FiltersChanged,
    Reload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_after_reset() {
        let mut panel = ControlPanel::new();
        panel.reset(Path::new("data/metadata.csv"), Some((2019, 2022)));
        assert_eq!(panel.source_name, "metadata.csv");
        assert_eq!(
            panel.criteria(),
            FilterCriteria {
                year_range: Some((2019, 2022)),
                include_undated: false,
                journals: Vec::new(),
            }
        );
    }

    #[test]
    fn test_no_year_bounds_disables_year_filter() {
        let mut panel = ControlPanel::new();
        panel.reset(Path::new("metadata.csv"), None);
        assert_eq!(panel.criteria().year_range, None);
    }

    #[test]
    fn test_journal_options_drop_stale_selection() {
        let mut panel = ControlPanel::new();
        panel.toggle_journal("Lancet", true);
        panel.toggle_journal("BMJ", true);
        panel.toggle_journal("Lancet", true);
        assert_eq!(panel.selected_journals, vec!["Lancet", "BMJ"]);

        let changed = panel.set_journal_options(vec!["BMJ".to_string(), "Nature".to_string()]);
        assert!(changed);
        assert_eq!(panel.selected_journals, vec!["BMJ"]);
        assert!(!panel.set_journal_options(vec!["BMJ".to_string()]));
    }
}
