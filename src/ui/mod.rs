//! egui front end: panels, chart drawing and the decorative background.

pub mod background;
pub mod panels;
pub mod plot;

use crate::state::Dashboard;

/// The dashboard as driven by the egui front end.
pub type AppDashboard = Dashboard<plot::PlotEngine>;
