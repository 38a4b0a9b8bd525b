//! Chart Viewer Widget
//! Central tabbed area: overview, journals, words, visualizations and data.

use crate::charts::{
    render_wordcloud, ChartPlotter, ABSTRACT_HIST_COLOR, JOURNAL_COLOR, TITLE_HIST_COLOR,
    WORDCLOUD_SIZE, WORD_COLOR,
};
use crate::gui::snapshot::{
    preview_table, PreviewTable, ViewSnapshot, JOURNAL_SLIDER, PREVIEW_ROWS, WORD_SLIDER,
};
use crate::stats::{Aggregate, Counts};
use egui::{Color32, RichText, ScrollArea};

const CHART_HEIGHT: f32 = 320.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Journals,
    Words,
    Visualizations,
    Data,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Journals,
        Tab::Words,
        Tab::Visualizations,
        Tab::Data,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "📈 Overview",
            Tab::Journals => "📚 Top Journals",
            Tab::Words => "🔤 Word Analysis",
            Tab::Visualizations => "📊 Visualizations",
            Tab::Data => "📋 Data",
        }
    }
}

/// Actions triggered by the chart viewer
#[derive(Debug, Clone, PartialEq)]
pub enum ChartViewerAction {
    None,
    SettingsChanged,
    ExportCsv,
}

/// Word cloud texture and the words it was drawn from.
struct WordCloudTexture {
    words: Counts<String>,
    texture: Result<egui::TextureHandle, String>,
}

/// Tabbed display of the current view snapshot.
pub struct ChartViewer {
    pub tab: Tab,
    pub top_journals: usize,
    pub top_words: usize,
    snapshot: Option<ViewSnapshot>,
    preview: PreviewTable,
    wordcloud: Option<WordCloudTexture>,
}

impl ChartViewer {
    pub fn new(top_journals: usize, top_words: usize) -> Self {
        Self {
            tab: Tab::Overview,
            top_journals,
            top_words,
            snapshot: None,
            preview: PreviewTable::default(),
            wordcloud: None,
        }
    }

    /// Clear all charts
    pub fn clear(&mut self) {
        self.snapshot = None;
        self.preview = PreviewTable::default();
        self.wordcloud = None;
    }

    pub fn snapshot(&self) -> Option<&ViewSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn set_snapshot(&mut self, snapshot: ViewSnapshot) {
        self.preview = match preview_table(&snapshot.view, PREVIEW_ROWS) {
            Ok(preview) => preview,
            Err(e) => {
                log::warn!("Could not build data preview: {}", e);
                PreviewTable::default()
            }
        };
        self.snapshot = Some(snapshot);
    }

    /// Redraw the word cloud texture when the words changed.
    fn refresh_wordcloud(&mut self, ctx: &egui::Context, words: &Counts<String>) {
        if self.wordcloud.as_ref().is_some_and(|w| &w.words == words) {
            return;
        }
        let texture = render_wordcloud(words, WORDCLOUD_SIZE, None)
            .map(|buffer| {
                let size = [WORDCLOUD_SIZE.0 as usize, WORDCLOUD_SIZE.1 as usize];
                let image = egui::ColorImage::from_rgb(size, &buffer);
                ctx.load_texture("wordcloud", image, egui::TextureOptions::LINEAR)
            })
            .map_err(|e| e.to_string());
        if let Err(e) = &texture {
            log::warn!("Word cloud rendering failed: {}", e);
        }
        self.wordcloud = Some(WordCloudTexture {
            words: words.clone(),
            texture,
        });
    }

    /// Draw the tab bar and the selected tab.
    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;

        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                ui.selectable_value(&mut self.tab, tab, RichText::new(tab.label()).size(15.0));
            }
        });
        ui.separator();

        let Some(snapshot) = self.snapshot.take() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return action;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.tab {
                Tab::Overview => Self::show_overview(ui, &snapshot),
                Tab::Journals => {
                    action = self.show_journals(ui, &snapshot);
                }
                Tab::Words => {
                    action = self.show_words(ui, &snapshot);
                }
                Tab::Visualizations => self.show_visualizations(ctx, ui, &snapshot),
                Tab::Data => {
                    action = self.show_data(ui, &snapshot);
                }
            });

        self.snapshot = Some(snapshot);
        action
    }

    fn metric(ui: &mut egui::Ui, label: &str, value: String) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_width(160.0);
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                    ui.label(RichText::new(value).size(24.0).strong());
                });
            });
    }

    fn show_overview(ui: &mut egui::Ui, snapshot: &ViewSnapshot) {
        ui.label(RichText::new("Dataset Overview").size(18.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            Self::metric(ui, "Total Papers", snapshot.papers().to_string());
            if let Some((first, last)) = snapshot.year_span() {
                Self::metric(ui, "Year Range", format!("{}-{}", first, last));
            }
            if let Aggregate::Available(n) = snapshot.unique_journals {
                Self::metric(ui, "Unique Journals", n.to_string());
            }
            if let Aggregate::Available(n) = snapshot.unique_authors {
                Self::metric(ui, "Unique Authors", n.to_string());
            }
        });

        ui.add_space(12.0);
        ui.separator();
        ui.label(RichText::new("Publications Over Time").size(16.0).strong());
        ChartPlotter::draw_year_line(ui, &snapshot.papers_by_year, CHART_HEIGHT);
    }

    fn show_journals(&mut self, ui: &mut egui::Ui, snapshot: &ViewSnapshot) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;
        ui.label(RichText::new("Top Publishing Journals").size(18.0).strong());
        if ui
            .add(
                egui::Slider::new(&mut self.top_journals, JOURNAL_SLIDER)
                    .text("Number of top journals to display"),
            )
            .changed()
        {
            action = ChartViewerAction::SettingsChanged;
        }
        ui.add_space(8.0);

        ui.label(
            RichText::new(format!(
                "Top {} Journals Publishing COVID-19 Research",
                self.top_journals
            ))
            .size(14.0)
            .strong(),
        );
        ChartPlotter::draw_horizontal_bars(
            ui,
            "top_journals",
            &snapshot.top_journals,
            JOURNAL_COLOR,
            "Number of Papers",
            CHART_HEIGHT + 120.0,
        );

        if let Aggregate::Available(counts) = &snapshot.top_journals {
            ui.add_space(12.0);
            ui.label(RichText::new("Journal Statistics").size(16.0).strong());
            egui::Grid::new("journal_stats")
                .striped(true)
                .num_columns(3)
                .spacing([20.0, 4.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Journal").strong());
                    ui.label(RichText::new("Paper Count").strong());
                    ui.label(RichText::new("Percentage").strong());
                    ui.end_row();
                    for ((journal, count), share) in counts.iter().zip(&snapshot.journal_shares) {
                        ui.label(journal);
                        ui.label(count.to_string());
                        ui.label(format!("{:.2}%", share));
                        ui.end_row();
                    }
                });
        }
        action
    }

    fn show_words(&mut self, ui: &mut egui::Ui, snapshot: &ViewSnapshot) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;
        ui.label(
            RichText::new("Most Frequent Words in Paper Titles")
                .size(18.0)
                .strong(),
        );
        if ui
            .add(
                egui::Slider::new(&mut self.top_words, WORD_SLIDER)
                    .text("Number of top words to display"),
            )
            .changed()
        {
            action = ChartViewerAction::SettingsChanged;
        }
        ui.add_space(8.0);

        ChartPlotter::draw_vertical_bars(
            ui,
            "top_words",
            &snapshot.top_words,
            WORD_COLOR,
            "Frequency",
            CHART_HEIGHT,
        );
        action
    }

    fn show_visualizations(
        &mut self,
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        snapshot: &ViewSnapshot,
    ) {
        ui.label(RichText::new("Advanced Visualizations").size(18.0).strong());
        ui.add_space(8.0);

        ui.columns(2, |columns| {
            columns[0].label(RichText::new("Abstract Word Count Distribution").strong());
            ChartPlotter::draw_histogram(
                &mut columns[0],
                "abstract_hist",
                &snapshot.abstract_hist,
                ABSTRACT_HIST_COLOR,
                "Word Count",
                CHART_HEIGHT - 60.0,
            );
            columns[1].label(RichText::new("Title Word Count Distribution").strong());
            ChartPlotter::draw_histogram(
                &mut columns[1],
                "title_hist",
                &snapshot.title_hist,
                TITLE_HIST_COLOR,
                "Word Count",
                CHART_HEIGHT - 60.0,
            );
        });

        ui.add_space(12.0);
        ui.label(RichText::new("Word Cloud of Paper Titles").size(16.0).strong());
        match &snapshot.cloud_words {
            Aggregate::Available(words) if !words.is_empty() => {
                self.refresh_wordcloud(ctx, words);
                match self.wordcloud.as_ref().map(|w| &w.texture) {
                    Some(Ok(texture)) => {
                        let width = ui.available_width().min(WORDCLOUD_SIZE.0 as f32);
                        let height = width * WORDCLOUD_SIZE.1 as f32 / WORDCLOUD_SIZE.0 as f32;
                        ui.image((texture.id(), egui::vec2(width, height)));
                    }
                    Some(Err(e)) => {
                        ui.label(RichText::new(format!("Error: {}", e)).color(Color32::RED));
                    }
                    None => {}
                }
            }
            Aggregate::Available(_) => ChartPlotter::draw_absence(ui, 80.0, "No title words"),
            Aggregate::Unavailable { .. } => {
                let message = snapshot.cloud_words.absence_message().unwrap_or_default();
                ChartPlotter::draw_absence(ui, 80.0, &message);
            }
        }
    }

    fn show_data(&self, ui: &mut egui::Ui, snapshot: &ViewSnapshot) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;
        ui.horizontal(|ui| {
            ui.label(RichText::new("Filtered Dataset Preview").size(18.0).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let button = egui::Button::new(RichText::new("📥 Save Filtered Data as CSV"));
                if ui.add_enabled(snapshot.papers() > 0, button).clicked() {
                    action = ChartViewerAction::ExportCsv;
                }
            });
        });
        ui.label(
            RichText::new(format!(
                "Showing {} of {} rows",
                self.preview.rows.len(),
                snapshot.papers()
            ))
            .size(11.0)
            .color(Color32::GRAY),
        );
        ui.add_space(8.0);

        ScrollArea::horizontal().show(ui, |ui| {
            egui::Grid::new("data_preview")
                .striped(true)
                .num_columns(self.preview.columns.len())
                .max_col_width(360.0)
                .show(ui, |ui| {
                    for column in &self.preview.columns {
                        ui.label(RichText::new(column).strong());
                    }
                    ui.end_row();
                    for row in &self.preview.rows {
                        for cell in row {
                            ui.add(egui::Label::new(cell).truncate());
                        }
                        ui.end_row();
                    }
                });
        });
        action
    }
}
