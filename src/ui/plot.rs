use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use eframe::egui::{Ui, Vec2};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoints};

use crate::chart::{
    raster, smooth_path, ChartEngine, ChartError, ChartOption, ChartSurface, SeriesOption,
};
use crate::color::{parse_css_color, to_color32};

/// Snapshot scale relative to the on-screen size.
const EXPORT_PIXEL_RATIO: f32 = 2.0;
const SMOOTH_SEGMENTS: usize = 8;
/// Snapshot size used before the first layout pass reports a real one.
const DEFAULT_SIZE: [f32; 2] = [800.0, 400.0];

// ---------------------------------------------------------------------------
// egui_plot as the chart drawing engine
// ---------------------------------------------------------------------------

/// Mounts charts for the render targets present in the layout.
#[derive(Debug, Clone, Default)]
pub struct PlotEngine {
    targets: BTreeSet<String>,
}

impl PlotEngine {
    pub fn new<'a>(targets: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            targets: targets.into_iter().map(str::to_string).collect(),
        }
    }
}

impl ChartEngine for PlotEngine {
    type Surface = PlotChart;

    fn mount(&mut self, target: &str) -> Option<PlotChart> {
        self.targets.contains(target).then(|| PlotChart::new(target))
    }
}

/// Retained chart configuration drawn by [`line_chart`] every frame.
#[derive(Debug, Clone)]
pub struct PlotChart {
    pub target: String,
    pub option: Option<ChartOption>,
    pub size: [f32; 2],
}

impl PlotChart {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            option: None,
            size: DEFAULT_SIZE,
        }
    }
}

impl ChartSurface for PlotChart {
    fn set_option(&mut self, option: ChartOption) {
        self.option = Some(option);
    }

    fn update_data(&mut self, categories: Vec<String>, series: Vec<Vec<f64>>) {
        if let Some(option) = self.option.as_mut() {
            option.categories = categories;
            for (s, data) in option.series.iter_mut().zip(series) {
                s.data = data;
            }
        }
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.size = [width, height];
    }

    fn export_image(&self) -> Result<Vec<u8>, ChartError> {
        let option = self.option.as_ref().ok_or(ChartError::EmptyCanvas)?;
        raster::render_png(option, self.size[0], self.size[1], EXPORT_PIXEL_RATIO)
    }
}

// ---------------------------------------------------------------------------
// Line chart (central panel)
// ---------------------------------------------------------------------------

/// Draw a mounted chart. Returns the plot area size so the caller can feed
/// it back as a resize.
pub fn line_chart(ui: &mut Ui, chart: Option<&PlotChart>, height: f32) -> Option<Vec2> {
    let option = chart?.option.as_ref()?;

    ui.strong(&option.title);
    if option.categories.is_empty() {
        ui.label("No records match the current filters.");
        return None;
    }

    let categories = option.categories.clone();
    let response = Plot::new(&option.title)
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label(option.y_axis_label.as_str())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&categories, mark.value)
        })
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &option.series {
                let knots: Vec<[f64; 2]> = series
                    .data
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| [i as f64, v])
                    .collect();
                let path = if series.smooth {
                    smooth_path(&knots, SMOOTH_SEGMENTS)
                } else {
                    knots
                };

                let mut line = Line::new(PlotPoints::from(path))
                    .name(&series.name)
                    .color(to_color32(&series.line_color))
                    .width(series.line_width);
                if let Some(alpha) = area_fill_alpha(series) {
                    line = line.fill(0.0_f32).fill_alpha(alpha);
                }

                plot_ui.line(line);
            }
        });

    Some(response.response.rect.size())
}

/// egui_plot fills flat, so the area takes the opacity of its top gradient stop.
fn area_fill_alpha(series: &SeriesOption) -> Option<f32> {
    let top = series.area.first()?;
    parse_css_color(&top.color).map(|c| f32::from(c.alpha) / 255.0)
}

/// Axis label for a grid mark; only whole indices get a category.
fn category_label(categories: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}
