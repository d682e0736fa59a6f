use std::path::Path;

use eframe::egui;
use water_dash::app::{WaterDashApp, LAYOUT_TARGETS};
use water_dash::config::{DashboardConfig, CONFIG_FILE};
use water_dash::data::loader::{self, DirSource};
use water_dash::state::Dashboard;
use water_dash::ui::plot::PlotEngine;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load(Path::new(CONFIG_FILE));
    let data = loader::load(&DirSource::new(&config.data_dir));
    let dashboard = Dashboard::new(
        data,
        PlotEngine::new(LAYOUT_TARGETS),
        config.default_year_range,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Water Consumption Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(WaterDashApp::new(dashboard, &config)))),
    )
}
