//! Charts module - Chart rendering

mod plotter;
mod renderer;
mod wordcloud;

pub use plotter::{
    ChartPlotter, ABSTRACT_HIST_COLOR, JOURNAL_COLOR, TITLE_HIST_COLOR, WORD_COLOR, YEAR_COLOR,
};
pub use renderer::{shorten, AnalysisPanels, RenderError, StaticChartRenderer, ANALYSIS_CHART_SIZE};
pub use wordcloud::{layout_words, render_wordcloud, PlacedWord, WORDCLOUD_SIZE};
