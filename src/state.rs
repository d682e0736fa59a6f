use crate::chart::{ChartEngine, ChartError, ChartRenderer, ChartStyle};
use crate::data::aggregate::{aggregate, summarize};
use crate::data::filter::{available_states, filter, FilterChange, FilterState};
use crate::data::model::{ConsumptionRecord, DataOrigin, Datasets, Sector, SeriesPoint, Summary};
use crate::export::{csv_artifact, png_artifact, ExportArtifact, ExportError, ExportFormat};

/// Render target of the main consumption chart.
pub const CONSUMPTION_CHART: &str = "time_series_chart";
/// Render target of the growth analysis chart.
pub const GROWTH_CHART: &str = "growth_chart";

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of the UI toolkit.
///
/// All interaction goes through [`Dashboard::apply_filter_change`], which runs
/// filter → aggregate → render to completion before returning.
pub struct Dashboard<E: ChartEngine> {
    /// Datasets loaded once at startup.
    pub data: Datasets,

    /// Current selection.
    pub filters: FilterState,

    /// Year span restored by [`Dashboard::reset_filters`].
    pub default_span: (i32, i32),

    /// Sorted distinct states of the consumption table.
    pub states: Vec<String>,

    /// Consumption records passing the current filters, in source order.
    pub filtered: Vec<ConsumptionRecord>,

    /// Per-year sector totals of `filtered`.
    pub series: Vec<SeriesPoint>,

    /// Scalar statistics of `filtered`.
    pub summary: Summary,

    /// Per-year totals of the growth table under the same filters.
    pub growth_series: Vec<SeriesPoint>,

    pub chart: ChartRenderer<E>,
    pub growth_chart: ChartRenderer<E>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl<E: ChartEngine + Clone> Dashboard<E> {
    /// Wire up both charts on `engine` and run the first render.
    pub fn new(data: Datasets, engine: E, default_span: (i32, i32)) -> Self {
        let status_message = (data.origin == DataOrigin::Fallback)
            .then(|| "Data files unavailable, showing sample data".to_string());
        let mut dashboard = Self {
            states: available_states(&data.records),
            filters: FilterState::with_year_range(default_span),
            default_span,
            filtered: Vec::new(),
            series: Vec::new(),
            summary: Summary::default(),
            growth_series: Vec::new(),
            chart: ChartRenderer::new(engine.clone(), CONSUMPTION_CHART, ChartStyle::default()),
            growth_chart: ChartRenderer::new(
                engine,
                GROWTH_CHART,
                ChartStyle::titled("Growth Analysis"),
            ),
            status_message,
            data,
        };
        dashboard.rerender();
        dashboard
    }
}

impl<E: ChartEngine> Dashboard<E> {
    /// Merge `change` into the filters and rerun the pipeline.
    pub fn apply_filter_change(&mut self, change: FilterChange) {
        self.filters.apply(change);
        self.rerender();
    }

    /// Restore all states, both sectors and the default year span.
    pub fn reset_filters(&mut self) {
        self.filters.reset(self.default_span);
        self.rerender();
    }

    /// Add or remove one state from the selection.
    pub fn toggle_state(&mut self, state: &str) {
        let mut states = self.filters.selected_states.clone();
        if !states.remove(state) {
            states.insert(state.to_string());
        }
        self.apply_filter_change(FilterChange {
            states: Some(states),
            ..Default::default()
        });
    }

    /// Add or remove one sector from the selection.
    pub fn toggle_sector(&mut self, sector: Sector) {
        let mut sectors = self.filters.selected_sectors.clone();
        if !sectors.remove(&sector) {
            sectors.insert(sector);
        }
        self.apply_filter_change(FilterChange {
            sectors: Some(sectors),
            ..Default::default()
        });
    }

    pub fn set_year_range(&mut self, min: i32, max: i32) {
        self.apply_filter_change(FilterChange::year_range(min, max));
    }

    /// Recompute every derived value from scratch and push it to the charts.
    pub fn rerender(&mut self) {
        self.filtered = filter(&self.data.records, &self.filters);
        self.series = aggregate(&self.filtered);
        self.summary = summarize(&self.filtered);
        self.growth_series = aggregate(&filter(&self.data.growth, &self.filters));

        log::debug!(
            "Filters {:?} → {} records over {} years",
            self.filters,
            self.filtered.len(),
            self.series.len()
        );

        self.chart.render(&self.series);
        self.growth_chart.render(&self.growth_series);
    }

    /// Smallest and largest year available, widened to the default span.
    pub fn year_bounds(&self) -> (i32, i32) {
        self.data
            .records
            .iter()
            .map(|r| r.year)
            .fold(self.default_span, |(lo, hi), y| (lo.min(y), hi.max(y)))
    }

    /// Produce an export of the current view.
    pub fn export(&self, format: ExportFormat) -> Result<ExportArtifact, ExportError> {
        match format {
            ExportFormat::Csv => csv_artifact(&self.filtered),
            ExportFormat::Png => match self.chart.export_png() {
                Ok(bytes) => Ok(png_artifact(bytes)),
                Err(ChartError::NotMounted(_)) => Err(ExportError::NoChart),
                Err(e) => Err(e.into()),
            },
            ExportFormat::Pdf => Err(ExportError::Unsupported("PDF")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::testing::{Call, MockEngine};
    use crate::data::model::ModelResults;

    fn datasets(records: Vec<ConsumptionRecord>) -> Datasets {
        Datasets {
            records,
            growth: Vec::new(),
            model_results: ModelResults::new(),
            predictions: ModelResults::new(),
            origin: DataOrigin::Loaded,
        }
    }

    fn scenario() -> Vec<ConsumptionRecord> {
        vec![
            ConsumptionRecord::new("Johor", Sector::Domestic, 2020, 100.0),
            ConsumptionRecord::new("Johor", Sector::Domestic, 2020, 50.0),
            ConsumptionRecord::new("Kedah", Sector::Nondomestic, 2020, 30.0),
        ]
    }

    fn dashboard(engine: &MockEngine) -> Dashboard<MockEngine> {
        Dashboard::new(datasets(scenario()), engine.clone(), (2015, 2024))
    }

    #[test]
    fn initial_render_aggregates_everything() {
        let engine = MockEngine::with_targets(&[CONSUMPTION_CHART]);
        let dash = dashboard(&engine);
        assert_eq!(
            dash.series,
            vec![SeriesPoint {
                year: 2020,
                domestic_total: 150.0,
                nondomestic_total: 30.0,
            }]
        );
        assert_eq!(dash.summary.total, 180.0);
        assert_eq!(dash.states, vec!["Johor", "Kedah"]);
        assert!(dash.status_message.is_none());
    }

    #[test]
    fn state_selection_flows_through_to_chart() {
        let engine = MockEngine::with_targets(&[CONSUMPTION_CHART]);
        let mut dash = dashboard(&engine);
        dash.apply_filter_change(FilterChange::states(["Kedah"]));

        assert_eq!(dash.filtered.len(), 1);
        assert_eq!(dash.series[0].domestic_total, 0.0);
        assert_eq!(dash.series[0].nondomestic_total, 30.0);
        assert_eq!(
            engine.calls().last(),
            Some(&Call::UpdateData(vec!["2020".into()], vec![vec![0.0], vec![30.0]]))
        );
    }

    #[test]
    fn missing_growth_target_does_not_break_main_chart() {
        let engine = MockEngine::with_targets(&[CONSUMPTION_CHART]);
        let mut dash = dashboard(&engine);
        dash.toggle_sector(Sector::Nondomestic);

        assert!(dash.growth_chart.surface().is_none());
        let mounts = engine
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Mount(_)))
            .count();
        assert_eq!(mounts, 1);
        assert_eq!(dash.series[0].nondomestic_total, 0.0);
    }

    #[test]
    fn toggle_state_adds_then_removes() {
        let engine = MockEngine::default();
        let mut dash = dashboard(&engine);
        dash.toggle_state("Johor");
        assert_eq!(dash.filtered.len(), 2);
        dash.toggle_state("Johor");
        assert!(dash.filters.selected_states.is_empty());
        assert_eq!(dash.filtered.len(), 3);
    }

    #[test]
    fn empty_selection_gives_zero_mean() {
        let engine = MockEngine::default();
        let mut dash = dashboard(&engine);
        dash.set_year_range(1990, 1991);
        assert!(dash.series.is_empty());
        assert_eq!(dash.summary.mean, 0.0);

        dash.reset_filters();
        assert_eq!(dash.filters.year_range, (2015, 2024));
        assert_eq!(dash.filtered.len(), 3);
    }

    #[test]
    fn exports() {
        let engine = MockEngine::with_targets(&[CONSUMPTION_CHART]);
        let dash = dashboard(&engine);

        let csv = dash.export(ExportFormat::Csv).unwrap();
        assert_eq!(csv.file_name, "water_consumption_data.csv");
        assert!(String::from_utf8(csv.bytes).unwrap().starts_with("State,Sector,Year,Value\n"));

        let png = dash.export(ExportFormat::Png).unwrap();
        assert_eq!(png.file_name, "water_consumption_chart.png");

        assert!(matches!(
            dash.export(ExportFormat::Pdf),
            Err(ExportError::Unsupported(_))
        ));
    }

    #[test]
    fn png_export_without_chart_reports_no_chart() {
        let engine = MockEngine::default();
        let dash = dashboard(&engine);
        assert!(matches!(dash.export(ExportFormat::Png), Err(ExportError::NoChart)));
    }

    #[test]
    fn fallback_origin_sets_status() {
        let mut data = datasets(scenario());
        data.origin = DataOrigin::Fallback;
        let dash = Dashboard::new(data, MockEngine::default(), (2015, 2024));
        assert!(dash.status_message.is_some());
    }

    #[test]
    fn year_bounds_cover_data_and_default_span() {
        let mut records = scenario();
        records.push(ConsumptionRecord::new("Kedah", Sector::Domestic, 2003, 1.0));
        let dash = Dashboard::new(datasets(records), MockEngine::default(), (2015, 2024));
        assert_eq!(dash.year_bounds(), (2003, 2024));
    }
}
