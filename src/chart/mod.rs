/// Chart layer: declarative option building and the drawing collaborator.
///
/// The drawing engine is injected through [`ChartEngine`]. The renderer only
/// produces data in the shape the engine expects and decides between a full
/// option set (first render) and a data-only update (every later render).
pub mod raster;

use serde::Serialize;
use thiserror::Error;

use crate::color;
use crate::data::model::{SeriesPoint, Sector};

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("chart target '{0}' is not mounted")]
    NotMounted(String),
    #[error("chart has no drawable area")]
    EmptyCanvas,
    #[error("failed to encode chart image: {0}")]
    Encode(#[from] image::ImageError),
}

// ---------------------------------------------------------------------------
// Declarative chart configuration
// ---------------------------------------------------------------------------

/// A vertical gradient stop; offset 0 is the top of the plot area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesOption {
    pub name: String,
    pub data: Vec<f64>,
    pub smooth: bool,
    pub line_color: String,
    pub line_width: f32,
    /// Area fill under the line, top to bottom.
    pub area: Vec<ColorStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    pub enabled: bool,
    pub duration_ms: u32,
    pub easing: String,
}

/// Everything the drawing engine needs to render a line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOption {
    pub title: String,
    pub categories: Vec<String>,
    pub series: Vec<SeriesOption>,
    pub legend: Vec<String>,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub text_color: String,
    pub animation: Animation,
}

/// Styling knobs for [`build_line_chart`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub title: String,
    pub y_axis_label: String,
    pub domestic_color: String,
    pub nondomestic_color: String,
    pub text_color: String,
    pub line_width: f32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: "Water Consumption Trends".to_string(),
            y_axis_label: "Consumption (Million Liters)".to_string(),
            domestic_color: color::PRIMARY.to_string(),
            nondomestic_color: color::SECONDARY.to_string(),
            text_color: color::NEUTRAL.to_string(),
            line_width: 3.0,
        }
    }
}

impl ChartStyle {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Year labels and one data array per tracked sector, aligned by index.
pub fn series_arrays(points: &[SeriesPoint]) -> (Vec<String>, Vec<Vec<f64>>) {
    let categories = points.iter().map(|p| p.year.to_string()).collect();
    let domestic = points.iter().map(|p| p.domestic_total).collect();
    let nondomestic = points.iter().map(|p| p.nondomestic_total).collect();
    (categories, vec![domestic, nondomestic])
}

/// Two smoothed, gradient-filled series (domestic, non-domestic).
pub fn build_line_chart(points: &[SeriesPoint], style: &ChartStyle) -> ChartOption {
    let (categories, arrays) = series_arrays(points);
    let colors = [&style.domestic_color, &style.nondomestic_color];

    let series: Vec<SeriesOption> = Sector::TRACKED
        .iter()
        .zip(arrays)
        .zip(colors)
        .map(|((sector, data), line_color)| SeriesOption {
            name: sector.label().to_string(),
            data,
            smooth: true,
            line_color: line_color.clone(),
            line_width: style.line_width,
            area: vec![
                ColorStop {
                    offset: 0.0,
                    color: color::with_alpha(line_color, 0.3),
                },
                ColorStop {
                    offset: 1.0,
                    color: color::with_alpha(line_color, 0.1),
                },
            ],
        })
        .collect();

    ChartOption {
        title: style.title.clone(),
        legend: series.iter().map(|s| s.name.clone()).collect(),
        categories,
        series,
        x_axis_label: "Year".to_string(),
        y_axis_label: style.y_axis_label.clone(),
        text_color: style.text_color.clone(),
        animation: Animation {
            enabled: true,
            duration_ms: 1000,
            easing: "cubicOut".to_string(),
        },
    }
}

/// Catmull-Rom interpolation through `points`, `segments` samples per span.
pub fn smooth_path(points: &[[f64; 2]], segments: usize) -> Vec<[f64; 2]> {
    if points.len() < 3 || segments < 2 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity((points.len() - 1) * segments + 1);
    for i in 0..points.len() - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(points.len() - 1)];
        for s in 0..segments {
            let t = s as f64 / segments as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let interp = |k: usize| {
                0.5 * (2.0 * p1[k]
                    + (-p0[k] + p2[k]) * t
                    + (2.0 * p0[k] - 5.0 * p1[k] + 4.0 * p2[k] - p3[k]) * t2
                    + (-p0[k] + 3.0 * p1[k] - 3.0 * p2[k] + p3[k]) * t3)
            };
            out.push([interp(0), interp(1)]);
        }
    }
    if let Some(last) = points.last() {
        out.push(*last);
    }
    out
}

// ---------------------------------------------------------------------------
// Drawing collaborator
// ---------------------------------------------------------------------------

/// A mounted chart instance owned by the drawing engine.
pub trait ChartSurface {
    /// Replace the whole configuration.
    fn set_option(&mut self, option: ChartOption);
    /// Replace only the category axis and the series data arrays.
    fn update_data(&mut self, categories: Vec<String>, series: Vec<Vec<f64>>);
    fn resize(&mut self, width: f32, height: f32);
    /// Raster snapshot of the current chart as PNG bytes.
    fn export_image(&self) -> Result<Vec<u8>, ChartError>;
}

/// The drawing engine. Mounting fails (`None`) when the target does not exist.
pub trait ChartEngine {
    type Surface: ChartSurface;

    fn mount(&mut self, target: &str) -> Option<Self::Surface>;
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Keeps one chart instance alive for a target and feeds it series data.
pub struct ChartRenderer<E: ChartEngine> {
    engine: E,
    target: String,
    style: ChartStyle,
    surface: Option<E::Surface>,
}

impl<E: ChartEngine> ChartRenderer<E> {
    pub fn new(engine: E, target: impl Into<String>, style: ChartStyle) -> Self {
        Self {
            engine,
            target: target.into(),
            style,
            surface: None,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn surface(&self) -> Option<&E::Surface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut E::Surface> {
        self.surface.as_mut()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Draw `points`. Returns `false` (and does nothing) when the target is
    /// missing.
    pub fn render(&mut self, points: &[SeriesPoint]) -> bool {
        match self.surface.as_mut() {
            Some(surface) => {
                let (categories, arrays) = series_arrays(points);
                surface.update_data(categories, arrays);
                true
            }
            None => match self.engine.mount(&self.target) {
                Some(mut surface) => {
                    surface.set_option(build_line_chart(points, &self.style));
                    self.surface = Some(surface);
                    true
                }
                None => {
                    log::debug!("Chart target '{}' not present, skipping render", self.target);
                    false
                }
            },
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
        }
    }

    pub fn export_png(&self) -> Result<Vec<u8>, ChartError> {
        self.surface
            .as_ref()
            .ok_or_else(|| ChartError::NotMounted(self.target.clone()))?
            .export_image()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Calls observed by [`MockEngine`] surfaces, in order.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Mount(String),
        SetOption(ChartOption),
        UpdateData(Vec<String>, Vec<Vec<f64>>),
        Resize(f32, f32),
    }

    /// Engine double: mounts only the listed targets and records every call.
    #[derive(Clone, Default)]
    pub struct MockEngine {
        pub targets: Vec<String>,
        pub calls: Rc<RefCell<Vec<Call>>>,
    }

    impl MockEngine {
        pub fn with_targets(targets: &[&str]) -> Self {
            Self {
                targets: targets.iter().map(|t| t.to_string()).collect(),
                calls: Rc::default(),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    pub struct MockSurface {
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl ChartSurface for MockSurface {
        fn set_option(&mut self, option: ChartOption) {
            self.calls.borrow_mut().push(Call::SetOption(option));
        }

        fn update_data(&mut self, categories: Vec<String>, series: Vec<Vec<f64>>) {
            self.calls
                .borrow_mut()
                .push(Call::UpdateData(categories, series));
        }

        fn resize(&mut self, width: f32, height: f32) {
            self.calls.borrow_mut().push(Call::Resize(width, height));
        }

        fn export_image(&self) -> Result<Vec<u8>, ChartError> {
            Ok(b"\x89PNG".to_vec())
        }
    }

    impl ChartEngine for MockEngine {
        type Surface = MockSurface;

        fn mount(&mut self, target: &str) -> Option<MockSurface> {
            if !self.targets.iter().any(|t| t == target) {
                return None;
            }
            self.calls.borrow_mut().push(Call::Mount(target.to_string()));
            Some(MockSurface {
                calls: Rc::clone(&self.calls),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Call, MockEngine};
    use super::*;

    fn points() -> Vec<SeriesPoint> {
        vec![
            SeriesPoint {
                year: 2019,
                domestic_total: 10.0,
                nondomestic_total: 4.0,
            },
            SeriesPoint {
                year: 2020,
                domestic_total: 12.0,
                nondomestic_total: 5.0,
            },
        ]
    }

    #[test]
    fn option_has_two_smoothed_series() {
        let option = build_line_chart(&points(), &ChartStyle::default());
        assert_eq!(option.categories, vec!["2019", "2020"]);
        assert_eq!(option.legend, vec!["Domestic", "Non-Domestic"]);
        assert_eq!(option.series[0].data, vec![10.0, 12.0]);
        assert_eq!(option.series[1].data, vec![4.0, 5.0]);
        assert!(option.series.iter().all(|s| s.smooth && s.area.len() == 2));
        assert_eq!(option.series[0].area[0].color, "rgba(30, 64, 175, 0.3)");
    }

    #[test]
    fn first_render_sets_option_then_updates_data() {
        let engine = MockEngine::with_targets(&["main"]);
        let mut renderer = ChartRenderer::new(engine.clone(), "main", ChartStyle::default());

        assert!(renderer.render(&points()));
        assert!(renderer.render(&points()[..1]));

        let calls = engine.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Call::Mount("main".into()));
        assert!(matches!(calls[1], Call::SetOption(_)));
        assert_eq!(
            calls[2],
            Call::UpdateData(vec!["2019".into()], vec![vec![10.0], vec![4.0]])
        );
    }

    #[test]
    fn missing_target_is_a_no_op() {
        let engine = MockEngine::with_targets(&[]);
        let mut renderer = ChartRenderer::new(engine.clone(), "absent", ChartStyle::default());
        assert!(!renderer.render(&points()));
        renderer.resize(100.0, 100.0);
        assert!(engine.calls().is_empty());
        assert!(matches!(
            renderer.export_png(),
            Err(ChartError::NotMounted(t)) if t == "absent"
        ));
    }

    #[test]
    fn smoothing_passes_through_knots() {
        let knots = [[0.0, 0.0], [1.0, 2.0], [2.0, 1.0], [3.0, 3.0]];
        let path = smooth_path(&knots, 4);
        assert_eq!(path.len(), 3 * 4 + 1);
        for (i, knot) in knots.iter().enumerate() {
            let p = path[i * 4];
            assert!((p[0] - knot[0]).abs() < 1e-9 && (p[1] - knot[1]).abs() < 1e-9);
        }
    }
}
