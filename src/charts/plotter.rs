//! Chart Plotter Module
//! Interactive dashboard charts using egui_plot.

use crate::stats::{Aggregate, Counts, HistogramBin};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

pub const YEAR_COLOR: Color32 = Color32::from_rgb(46, 134, 171); // Blue
pub const JOURNAL_COLOR: Color32 = Color32::from_rgb(162, 59, 114); // Plum
pub const WORD_COLOR: Color32 = Color32::from_rgb(241, 143, 1); // Orange
pub const ABSTRACT_HIST_COLOR: Color32 = Color32::from_rgb(6, 167, 125); // Green
pub const TITLE_HIST_COLOR: Color32 = Color32::from_rgb(255, 0, 110); // Pink

/// Creates the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Label for an integer grid mark of a category axis.
    fn category_label(labels: &[String], value: f64) -> String {
        if (value - value.round()).abs() > 1e-6 || value < 0.0 {
            return String::new();
        }
        labels.get(value.round() as usize).cloned().unwrap_or_default()
    }

    /// Centered note in place of a chart.
    pub fn draw_absence(ui: &mut egui::Ui, height: f32, message: &str) {
        ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(message).size(14.0).color(Color32::GRAY));
            });
        });
    }

    /// Publications per year as a filled line with markers.
    pub fn draw_year_line(ui: &mut egui::Ui, counts: &Aggregate<Counts<i32>>, height: f32) {
        let counts = match counts {
            Aggregate::Available(c) if !c.is_empty() => c,
            Aggregate::Available(_) => return Self::draw_absence(ui, height, "No papers in range"),
            Aggregate::Unavailable { .. } => {
                return Self::draw_absence(ui, height, "Publication year not available in dataset")
            }
        };

        let points: Vec<[f64; 2]> = counts
            .iter()
            .map(|&(year, count)| [year as f64, count as f64])
            .collect();

        Plot::new("papers_by_year")
            .height(height)
            .allow_scroll(false)
            .x_axis_label("Publication Year")
            .y_axis_label("Number of Papers")
            .include_y(0.0)
            .x_axis_formatter(|mark, _range| {
                if (mark.value - mark.value.round()).abs() < 1e-6 {
                    format!("{}", mark.value.round() as i64)
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(YEAR_COLOR)
                        .width(2.5)
                        .fill(0.0_f32)
                        .name("Papers"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(4.0)
                        .color(YEAR_COLOR),
                );
            });
    }

    /// Horizontal bars, first entry on top.
    pub fn draw_horizontal_bars(
        ui: &mut egui::Ui,
        id: &str,
        counts: &Aggregate<Counts<String>>,
        color: Color32,
        x_label: &str,
        height: f32,
    ) {
        let counts = match counts {
            Aggregate::Available(c) if !c.is_empty() => c,
            Aggregate::Available(_) => return Self::draw_absence(ui, height, "No data"),
            Aggregate::Unavailable { .. } => {
                let message = counts.absence_message().unwrap_or_default();
                return Self::draw_absence(ui, height, &message);
            }
        };

        let n = counts.len();
        // Row 0 is at the bottom of the plot
        let labels: Vec<String> = counts.iter().rev().map(|(k, _)| k.clone()).collect();
        let bars: Vec<Bar> = counts
            .iter()
            .enumerate()
            .map(|(i, (name, count))| {
                Bar::new((n - 1 - i) as f64, *count as f64)
                    .name(name)
                    .width(0.7)
                    .fill(color)
            })
            .collect();

        Plot::new(id)
            .height(height)
            .allow_scroll(false)
            .allow_drag(false)
            .x_axis_label(x_label)
            .y_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(color).horizontal());
            });
    }

    /// Vertical bars with category labels on the x axis.
    pub fn draw_vertical_bars(
        ui: &mut egui::Ui,
        id: &str,
        counts: &Aggregate<Counts<String>>,
        color: Color32,
        y_label: &str,
        height: f32,
    ) {
        let counts = match counts {
            Aggregate::Available(c) if !c.is_empty() => c,
            Aggregate::Available(_) => return Self::draw_absence(ui, height, "No data"),
            Aggregate::Unavailable { .. } => {
                let message = counts.absence_message().unwrap_or_default();
                return Self::draw_absence(ui, height, &message);
            }
        };

        let labels: Vec<String> = counts.iter().map(|(k, _)| k.clone()).collect();
        let bars: Vec<Bar> = counts
            .iter()
            .enumerate()
            .map(|(i, (name, count))| {
                Bar::new(i as f64, *count as f64)
                    .name(name)
                    .width(0.7)
                    .fill(color)
            })
            .collect();

        Plot::new(id)
            .height(height)
            .allow_scroll(false)
            .allow_drag(false)
            .y_axis_label(y_label)
            .x_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(color));
            });
    }

    /// Histogram bins as touching bars.
    pub fn draw_histogram(
        ui: &mut egui::Ui,
        id: &str,
        bins: &Aggregate<Vec<HistogramBin>>,
        color: Color32,
        x_label: &str,
        height: f32,
    ) {
        let bins = match bins {
            Aggregate::Available(b) if !b.is_empty() => b,
            Aggregate::Available(_) => return Self::draw_absence(ui, height, "No data"),
            Aggregate::Unavailable { .. } => {
                let message = bins.absence_message().unwrap_or_default();
                return Self::draw_absence(ui, height, &message);
            }
        };

        let bars: Vec<Bar> = bins
            .iter()
            .map(|bin| {
                Bar::new((bin.start + bin.end) / 2.0, bin.count as f64)
                    .width(bin.end - bin.start)
                    .fill(color.gamma_multiply(0.8))
                    .stroke(egui::Stroke::new(1.0, Color32::BLACK))
            })
            .collect();

        Plot::new(id)
            .height(height)
            .allow_scroll(false)
            .x_axis_label(x_label)
            .y_axis_label("Frequency")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(color));
            });
    }
}
