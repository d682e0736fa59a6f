use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::{CONSUMPTION_CHART, GROWTH_CHART};
use crate::ui::background::{Backdrop, LoadingOverlay};
use crate::ui::{panels, plot, AppDashboard};

/// Render targets laid out by [`WaterDashApp`].
pub const LAYOUT_TARGETS: [&str; 2] = [CONSUMPTION_CHART, GROWTH_CHART];

const MAIN_CHART_HEIGHT: f32 = 320.0;
const GROWTH_CHART_HEIGHT: f32 = 220.0;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WaterDashApp {
    pub dashboard: AppDashboard,
    background: Option<Backdrop>,
    loading: LoadingOverlay,
}

impl WaterDashApp {
    pub fn new(dashboard: AppDashboard, config: &DashboardConfig) -> Self {
        Self {
            dashboard,
            background: Backdrop::from_kind(config.background),
            loading: LoadingOverlay::new(),
        }
    }
}

impl eframe::App for WaterDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Background first so panels draw over it ----
        if let Some(background) = self.background.as_mut() {
            background.paint(ctx);
        }

        // ---- Top panel: export menu + status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.dashboard);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.dashboard);
            });

        // ---- Central panel: statistics, charts, details ----
        let frame = egui::Frame::central_panel(&ctx.style()).fill(egui::Color32::TRANSPARENT);
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                panels::summary_cards(ui, &self.dashboard);
                ui.add_space(8.0);

                let main_size =
                    plot::line_chart(ui, self.dashboard.chart.surface(), MAIN_CHART_HEIGHT);
                if let Some(size) = main_size {
                    self.dashboard.chart.resize(size.x, size.y);
                }
                ui.add_space(8.0);

                let growth_size = plot::line_chart(
                    ui,
                    self.dashboard.growth_chart.surface(),
                    GROWTH_CHART_HEIGHT,
                );
                if let Some(size) = growth_size {
                    self.dashboard.growth_chart.resize(size.x, size.y);
                }
                ui.add_space(8.0);

                panels::model_results(ui, "Model Results", &self.dashboard.data.model_results);
                panels::model_results(ui, "Future Predictions", &self.dashboard.data.predictions);
                panels::record_table(ui, &self.dashboard);
            });
        });

        // ---- Loading overlay on top of everything ----
        self.loading.paint(ctx);

        if self.background.is_some() || !self.loading.is_done() {
            ctx.request_repaint();
        }
    }
}
