//! Water consumption dashboard.
//!
//! Consumption records are loaded once, filtered by state, sector and year,
//! aggregated into per-year sector totals and drawn as line charts.

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod export;
pub mod particles;
pub mod state;
pub mod ui;
