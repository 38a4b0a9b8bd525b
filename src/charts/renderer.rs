//! Static Chart Renderer
//! Draws the report images into in-memory RGB buffers with plotters.
//!
//! Layout of the analysis chart (2x2 grid):
//! 1. Top left: publications per year (line + markers)
//! 2. Top right: top journals (horizontal bars, largest on top)
//! 3. Bottom left: most frequent title words (vertical bars)
//! 4. Bottom right: paper counts by source, or an absence note

use crate::stats::{Aggregate, Counts};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, FontTransform};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FONT: &str = "sans-serif";

// Panel colors
pub const YEAR_COLOR: RGBColor = RGBColor(46, 134, 171); // Blue
pub const JOURNAL_COLOR: RGBColor = RGBColor(162, 59, 114); // Plum
pub const WORD_COLOR: RGBColor = RGBColor(241, 143, 1); // Orange
pub const SOURCE_COLOR: RGBColor = RGBColor(6, 167, 125); // Green

/// Size of the 2x2 analysis chart image.
pub const ANALYSIS_CHART_SIZE: (u32, u32) = (2400, 1800);

/// Longest axis label before it is shortened.
const MAX_LABEL_CHARS: usize = 40;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Failed to save image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub(crate) fn drawing<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Drawing(err.to_string())
}

/// Aggregates shown in the four panels of the analysis chart.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPanels {
    pub papers_by_year: Aggregate<Counts<i32>>,
    pub top_journals: Aggregate<Counts<String>>,
    pub top_words: Aggregate<Counts<String>>,
    pub top_sources: Aggregate<Counts<String>>,
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the 2x2 analysis chart; returns an RGB buffer of `size`.
    pub fn render_analysis_chart(
        panels: &AnalysisPanels,
        size: (u32, u32),
    ) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; (size.0 * size.1 * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;
            let areas = root.split_evenly((2, 2));

            Self::draw_year_line(&areas[0], &panels.papers_by_year)?;
            Self::draw_horizontal_bars(
                &areas[1],
                &format!("Top {} Journals Publishing COVID-19 Research", len_of(&panels.top_journals)),
                "Number of Papers",
                &panels.top_journals,
                JOURNAL_COLOR,
                "Journal column not available in dataset",
            )?;
            Self::draw_vertical_bars(
                &areas[2],
                &format!("Top {} Most Frequent Words in Paper Titles", len_of(&panels.top_words)),
                "Frequency",
                &panels.top_words,
                WORD_COLOR,
                "Title column not available in dataset",
            )?;
            Self::draw_vertical_bars(
                &areas[3],
                "Distribution of Paper Counts by Source",
                "Number of Papers",
                &panels.top_sources,
                SOURCE_COLOR,
                "Source column not available in dataset",
            )?;

            root.present().map_err(drawing)?;
        }
        Ok(buffer)
    }

    /// Save an RGB buffer as PNG.
    pub fn save_png(buffer: Vec<u8>, size: (u32, u32), path: &Path) -> Result<(), RenderError> {
        let img = image::RgbImage::from_raw(size.0, size.1, buffer)
            .ok_or_else(|| RenderError::Drawing("image buffer has the wrong size".to_string()))?;
        img.save(path).map_err(|source| RenderError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved {}", path.display());
        Ok(())
    }

    fn draw_year_line<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        counts: &Aggregate<Counts<i32>>,
    ) -> Result<(), RenderError> {
        let title = "Number of COVID-19 Publications Over Time";
        let counts = match counts {
            Aggregate::Available(c) if !c.is_empty() => c,
            Aggregate::Available(_) => return Self::draw_placeholder(area, title, "No papers in range"),
            Aggregate::Unavailable { .. } => {
                return Self::draw_placeholder(area, title, "Publication year not available in dataset")
            }
        };

        let x_min = counts.first().map(|(y, _)| *y).unwrap_or(0);
        let x_max = counts.last().map(|(y, _)| *y).unwrap_or(x_min);
        let y_max = counts.iter().map(|(_, c)| *c).max().unwrap_or(1);

        let mut chart = ChartBuilder::on(area)
            .caption(title, (FONT, 30).into_font().style(FontStyle::Bold))
            .margin(25)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(x_min..x_max + 1, 0usize..(y_max + y_max / 10 + 1))
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .x_desc("Publication Year")
            .y_desc("Number of Papers")
            .axis_desc_style((FONT, 22))
            .label_style((FONT, 16))
            .x_label_formatter(&|year| year.to_string())
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(LineSeries::new(
                counts.iter().map(|&(year, count)| (year, count)),
                YEAR_COLOR.stroke_width(3),
            ))
            .map_err(drawing)?;
        chart
            .draw_series(
                counts
                    .iter()
                    .map(|&(year, count)| Circle::new((year, count), 6, YEAR_COLOR.filled())),
            )
            .map_err(drawing)?;
        Ok(())
    }

    /// Horizontal bars with the first entry on top.
    fn draw_horizontal_bars<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        title: &str,
        x_desc: &str,
        counts: &Aggregate<Counts<String>>,
        color: RGBColor,
        absent: &str,
    ) -> Result<(), RenderError> {
        let counts = match counts {
            Aggregate::Available(c) if !c.is_empty() => c,
            Aggregate::Available(_) => return Self::draw_placeholder(area, title, "No data"),
            Aggregate::Unavailable { .. } => return Self::draw_placeholder(area, title, absent),
        };

        let n = counts.len() as u32;
        let max = counts.iter().map(|(_, c)| *c as u32).max().unwrap_or(1);
        let labels: Vec<String> = counts.iter().map(|(k, _)| shorten(k)).collect();
        let label_at = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) if *i < n => labels[(n - 1 - *i) as usize].clone(),
            _ => String::new(),
        };

        let mut chart = ChartBuilder::on(area)
            .caption(title, (FONT, 30).into_font().style(FontStyle::Bold))
            .margin(25)
            .x_label_area_size(60)
            .y_label_area_size(320)
            .build_cartesian_2d(0u32..(max + max / 10 + 1), (0u32..n).into_segmented())
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n as usize)
            .y_label_formatter(&label_at)
            .x_desc(x_desc)
            .axis_desc_style((FONT, 22))
            .label_style((FONT, 15))
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(
                Histogram::horizontal(&chart)
                    .style(color.filled())
                    .margin(4)
                    .data(
                        counts
                            .iter()
                            .enumerate()
                            .map(|(i, (_, c))| (n - 1 - i as u32, *c as u32)),
                    ),
            )
            .map_err(drawing)?;
        Ok(())
    }

    /// Vertical bars with rotated category labels.
    fn draw_vertical_bars<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        title: &str,
        y_desc: &str,
        counts: &Aggregate<Counts<String>>,
        color: RGBColor,
        absent: &str,
    ) -> Result<(), RenderError> {
        let counts = match counts {
            Aggregate::Available(c) if !c.is_empty() => c,
            Aggregate::Available(_) => return Self::draw_placeholder(area, title, "No data"),
            Aggregate::Unavailable { .. } => return Self::draw_placeholder(area, title, absent),
        };

        let n = counts.len() as u32;
        let max = counts.iter().map(|(_, c)| *c as u32).max().unwrap_or(1);
        let labels: Vec<String> = counts.iter().map(|(k, _)| shorten(k)).collect();
        let label_at = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) if *i < n => labels[*i as usize].clone(),
            _ => String::new(),
        };

        let mut chart = ChartBuilder::on(area)
            .caption(title, (FONT, 30).into_font().style(FontStyle::Bold))
            .margin(25)
            .x_label_area_size(180)
            .y_label_area_size(80)
            .build_cartesian_2d((0u32..n).into_segmented(), 0u32..(max + max / 10 + 1))
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n as usize)
            .x_label_formatter(&label_at)
            .x_label_style((FONT, 16).into_font().transform(FontTransform::Rotate90))
            .y_desc(y_desc)
            .axis_desc_style((FONT, 22))
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(color.filled())
                    .margin(6)
                    .data(counts.iter().enumerate().map(|(i, (_, c))| (i as u32, *c as u32))),
            )
            .map_err(drawing)?;
        Ok(())
    }

    /// Panel title with a centered message instead of a chart.
    fn draw_placeholder<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        title: &str,
        message: &str,
    ) -> Result<(), RenderError> {
        let inner = area
            .titled(title, (FONT, 30).into_font().style(FontStyle::Bold))
            .map_err(drawing)?;
        let (w, h) = inner.dim_in_pixel();
        let style = TextStyle::from((FONT, 24).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
        inner
            .draw(&Text::new(message.to_string(), (w as i32 / 2, h as i32 / 2), style))
            .map_err(drawing)?;
        Ok(())
    }
}

fn len_of<T>(counts: &Aggregate<Vec<T>>) -> usize {
    match counts {
        Aggregate::Available(c) => c.len(),
        Aggregate::Unavailable { .. } => 0,
    }
}

/// Shorten long category names for axis labels.
pub fn shorten(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        label.to_string()
    } else {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{}…", head)
    }
}
