use std::collections::BTreeSet;

use super::model::{ConsumptionRecord, Sector};

/// Year span selected when nothing else is configured.
pub const DEFAULT_YEAR_RANGE: (i32, i32) = (2015, 2024);

// ---------------------------------------------------------------------------
// Filter predicate: which states / sectors / years are selected
// ---------------------------------------------------------------------------

/// Current selection. An empty set means "no filter" (match all) for that
/// dimension; the year range is inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub selected_states: BTreeSet<String>,
    pub selected_sectors: BTreeSet<Sector>,
    pub year_range: (i32, i32),
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_year_range(DEFAULT_YEAR_RANGE)
    }
}

impl FilterState {
    /// All states, both tracked sectors, the given year span.
    pub fn with_year_range(year_range: (i32, i32)) -> Self {
        Self {
            selected_states: BTreeSet::new(),
            selected_sectors: Sector::TRACKED.into_iter().collect(),
            year_range: normalize_range(year_range),
        }
    }

    /// Restore the initial selection over `default_span`.
    pub fn reset(&mut self, default_span: (i32, i32)) {
        *self = Self::with_year_range(default_span);
    }

    /// Overwrite only the fields present in `change`.
    pub fn apply(&mut self, change: FilterChange) {
        if let Some(states) = change.states {
            self.selected_states = states;
        }
        if let Some(sectors) = change.sectors {
            self.selected_sectors = sectors;
        }
        if let Some(range) = change.year_range {
            self.year_range = normalize_range(range);
        }
    }

    /// Whether a single record passes the current selection.
    pub fn matches(&self, record: &ConsumptionRecord) -> bool {
        let state_match =
            self.selected_states.is_empty() || self.selected_states.contains(&record.state);
        let sector_match =
            self.selected_sectors.is_empty() || self.selected_sectors.contains(&record.sector);
        let (min, max) = self.year_range;
        state_match && sector_match && (min..=max).contains(&record.year)
    }
}

fn normalize_range((a, b): (i32, i32)) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ---------------------------------------------------------------------------
// Partial update produced by UI bindings
// ---------------------------------------------------------------------------

/// A partial [`FilterState`] update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChange {
    pub states: Option<BTreeSet<String>>,
    pub sectors: Option<BTreeSet<Sector>>,
    pub year_range: Option<(i32, i32)>,
}

impl FilterChange {
    pub fn states<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            states: Some(states.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn sectors(sectors: impl IntoIterator<Item = Sector>) -> Self {
        Self {
            sectors: Some(sectors.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn year_range(min: i32, max: i32) -> Self {
        Self {
            year_range: Some((min, max)),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Records passing `state`, in source order.
pub fn filter(records: &[ConsumptionRecord], state: &FilterState) -> Vec<ConsumptionRecord> {
    records
        .iter()
        .filter(|r| state.matches(r))
        .cloned()
        .collect()
}

/// Sorted distinct state names, used to populate the selector.
pub fn available_states(records: &[ConsumptionRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.state.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(state: &str, sector: Sector, year: i32, value: f64) -> ConsumptionRecord {
        ConsumptionRecord::new(state, sector, year, value)
    }

    fn sample() -> Vec<ConsumptionRecord> {
        vec![
            rec("Johor", Sector::Domestic, 2014, 1.0),
            rec("Johor", Sector::Domestic, 2020, 100.0),
            rec("Kedah", Sector::Nondomestic, 2020, 30.0),
            rec("Melaka", Sector::Other("industrial".into()), 2021, 5.0),
            rec("Kedah", Sector::Domestic, 2025, 2.0),
        ]
    }

    fn wildcard(range: (i32, i32)) -> FilterState {
        FilterState {
            selected_states: BTreeSet::new(),
            selected_sectors: BTreeSet::new(),
            year_range: range,
        }
    }

    #[test]
    fn empty_selections_match_everything_in_range() {
        let out = filter(&sample(), &wildcard((2015, 2024)));
        let years: Vec<i32> = out.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2020, 2020, 2021]);
    }

    #[test]
    fn state_selection_excludes_other_states() {
        let mut state = wildcard((2015, 2024));
        state.selected_states.insert("Kedah".into());
        let out = filter(&sample(), &state);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].state, "Kedah");
    }

    #[test]
    fn default_sectors_exclude_unknown_sector() {
        let out = filter(&sample(), &FilterState::default());
        assert!(out.iter().all(|r| r.sector != Sector::Other("industrial".into())));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn year_range_is_inclusive() {
        let out = filter(&sample(), &wildcard((2014, 2014)));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].year, 2014);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = wildcard((2000, 2001));
        state.selected_states.insert("Johor".into());
        state.reset((2003, 2022));
        assert!(state.selected_states.is_empty());
        assert_eq!(state.selected_sectors.len(), 2);
        assert_eq!(state.year_range, (2003, 2022));
    }

    #[test]
    fn apply_touches_only_present_fields() {
        let mut state = FilterState::default();
        state.apply(FilterChange::states(["Johor"]));
        assert_eq!(state.year_range, DEFAULT_YEAR_RANGE);
        assert!(state.selected_states.contains("Johor"));

        state.apply(FilterChange::year_range(2022, 2018));
        assert_eq!(state.year_range, (2018, 2022));
        assert!(state.selected_states.contains("Johor"));
    }

    #[test]
    fn available_states_are_sorted_and_distinct() {
        assert_eq!(available_states(&sample()), vec!["Johor", "Kedah", "Melaka"]);
    }
}
