//! CORD-19 Explorer - exploratory analysis of the CORD-19 metadata table
//!
//! Loads the metadata CSV, cleans it, computes publication/journal/word
//! aggregates and presents them as a batch report or an interactive dashboard.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod report;
pub mod stats;
