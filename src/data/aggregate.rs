use std::collections::BTreeMap;

use super::model::{ConsumptionRecord, Sector, SeriesPoint, Summary};

/// Group records by year and sum each tracked sector.
///
/// The output covers exactly the distinct years present in `records`, in
/// ascending order. Records of an untracked sector still open their year but
/// add to neither total.
pub fn aggregate(records: &[ConsumptionRecord]) -> Vec<SeriesPoint> {
    let mut by_year: BTreeMap<i32, SeriesPoint> = BTreeMap::new();

    for r in records {
        let point = by_year.entry(r.year).or_insert(SeriesPoint {
            year: r.year,
            domestic_total: 0.0,
            nondomestic_total: 0.0,
        });
        match r.sector {
            Sector::Domestic => point.domestic_total += r.value,
            Sector::Nondomestic => point.nondomestic_total += r.value,
            Sector::Other(_) => {}
        }
    }

    by_year.into_values().collect()
}

/// Sum, mean, max and min over every record in the set.
pub fn summarize(records: &[ConsumptionRecord]) -> Summary {
    let count = records.len();
    let total: f64 = records.iter().map(|r| r.value).sum();
    let mean = if count == 0 { 0.0 } else { total / count as f64 };
    let max = records.iter().map(|r| r.value).reduce(f64::max);
    let min = records.iter().map(|r| r.value).reduce(f64::min);

    Summary {
        count,
        total,
        mean,
        max,
        min,
    }
}
