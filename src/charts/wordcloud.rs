//! Word Cloud Module
//! Spiral placement of weighted words and rendering into an RGB buffer.

use crate::charts::renderer::{drawing, RenderError, FONT};
use crate::stats::Counts;
use plotters::prelude::*;
use plotters::style::FontStyle;

/// Default word cloud canvas.
pub const WORDCLOUD_SIZE: (u32, u32) = (1200, 600);

const MIN_FONT_SIZE: f64 = 12.0;
/// Largest font as a fraction of the canvas height
const MAX_FONT_FRACTION: f64 = 0.22;
/// Font shrink factor when a word does not fit anywhere
const SHRINK: f64 = 0.8;
/// Angle increment and radial growth of the placement spiral
const SPIRAL_STEP: f64 = 0.1;
const SPIRAL_GROWTH: f64 = 1.5;

/// Viridis color stops
pub const VIRIDIS: [RGBColor; 10] = [
    RGBColor(68, 1, 84),
    RGBColor(72, 40, 120),
    RGBColor(62, 74, 137),
    RGBColor(49, 104, 142),
    RGBColor(38, 130, 142),
    RGBColor(31, 158, 137),
    RGBColor(53, 183, 121),
    RGBColor(110, 206, 88),
    RGBColor(181, 222, 43),
    RGBColor(253, 231, 37),
];

/// A word with its final position (top-left corner) and box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: f64,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Index into `VIRIDIS`
    pub color: usize,
}

impl PlacedWord {
    fn overlaps(&self, x: i32, y: i32, w: u32, h: u32) -> bool {
        x < self.x + self.width as i32
            && self.x < x + w as i32
            && y < self.y + self.height as i32
            && self.y < y + h as i32
    }
}

/// Place `words` (most frequent first) on a `canvas` without overlaps.
///
/// `measure` returns the pixel box of a word at a font size. Font size scales
/// with frequency relative to the first word; words that cannot be placed even
/// at the minimum size are dropped.
pub fn layout_words(
    words: &Counts<String>,
    canvas: (u32, u32),
    measure: impl Fn(&str, f64) -> (u32, u32),
) -> Vec<PlacedWord> {
    let Some(max_count) = words.iter().map(|(_, c)| *c).max().filter(|c| *c > 0) else {
        return Vec::new();
    };
    let max_size = (canvas.1 as f64 * MAX_FONT_FRACTION).max(MIN_FONT_SIZE);
    let mut placed: Vec<PlacedWord> = Vec::with_capacity(words.len());

    for (word, count) in words {
        let weight = *count as f64 / max_count as f64;
        let mut size = MIN_FONT_SIZE + (max_size - MIN_FONT_SIZE) * weight;

        loop {
            let (w, h) = measure(word, size);
            if let Some((x, y)) = find_spot(&placed, canvas, w, h) {
                placed.push(PlacedWord {
                    text: word.clone(),
                    font_size: size,
                    x,
                    y,
                    width: w,
                    height: h,
                    color: color_for(weight),
                });
                break;
            }
            if size <= MIN_FONT_SIZE {
                log::debug!("No room for '{}' in word cloud", word);
                break;
            }
            size = (size * SHRINK).max(MIN_FONT_SIZE);
        }
    }

    placed
}

/// Walk an Archimedean spiral from the center until a free box is found.
fn find_spot(placed: &[PlacedWord], canvas: (u32, u32), w: u32, h: u32) -> Option<(i32, i32)> {
    if w > canvas.0 || h > canvas.1 {
        return None;
    }
    let (cw, ch) = (canvas.0 as f64, canvas.1 as f64);
    let max_radius = (cw * cw + ch * ch).sqrt() / 2.0;
    // Flatten the spiral to the canvas aspect ratio
    let aspect = cw / ch;

    let mut theta = 0.0f64;
    loop {
        let radius = SPIRAL_GROWTH * theta;
        if radius > max_radius * aspect.max(1.0) {
            return None;
        }
        let cx = cw / 2.0 + radius * aspect.sqrt() * theta.cos();
        let cy = ch / 2.0 + radius / aspect.sqrt() * theta.sin();
        let x = (cx - w as f64 / 2.0).round() as i32;
        let y = (cy - h as f64 / 2.0).round() as i32;

        let inside = x >= 0
            && y >= 0
            && x + w as i32 <= canvas.0 as i32
            && y + h as i32 <= canvas.1 as i32;
        if inside && !placed.iter().any(|p| p.overlaps(x, y, w, h)) {
            return Some((x, y));
        }
        theta += SPIRAL_STEP;
    }
}

fn color_for(weight: f64) -> usize {
    let idx = (weight.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f64).round() as usize;
    idx.min(VIRIDIS.len() - 1)
}

/// Render a word cloud into an RGB buffer of `size`, with an optional title.
pub fn render_wordcloud(
    words: &Counts<String>,
    size: (u32, u32),
    title: Option<&str>,
) -> Result<Vec<u8>, RenderError> {
    let mut buffer = vec![0u8; (size.0 * size.1 * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;
        let area = match title {
            Some(title) => root
                .titled(title, (FONT, 28).into_font().style(FontStyle::Bold))
                .map_err(drawing)?,
            None => root.margin(10, 10, 10, 10),
        };

        let canvas = area.dim_in_pixel();
        let placed = layout_words(words, canvas, |text, font_size| {
            let font = (FONT, font_size).into_font();
            area.estimate_text_size(text, &font.into())
                .unwrap_or_else(|_| estimate_box(text, font_size))
        });

        for word in &placed {
            let style = (FONT, word.font_size)
                .into_font()
                .color(&VIRIDIS[word.color]);
            area.draw(&Text::new(word.text.clone(), (word.x, word.y), style))
                .map_err(drawing)?;
        }
        log::debug!("Placed {} of {} words", placed.len(), words.len());

        root.present().map_err(drawing)?;
    }
    Ok(buffer)
}

/// Rough text box when no font metrics are available.
fn estimate_box(text: &str, font_size: f64) -> (u32, u32) {
    let width = text.chars().count() as f64 * font_size * 0.6;
    (width.ceil() as u32, font_size.ceil() as u32)
}
