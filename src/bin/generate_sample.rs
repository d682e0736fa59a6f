use std::collections::BTreeMap;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use water_dash::data::loader::{
    generate_fallback, CONSUMPTION_FILE, GROWTH_FILE, MODEL_RESULTS_FILE, PREDICTIONS_FILE,
};
use water_dash::data::model::{ConsumptionRecord, Sector};
use water_dash::export::to_csv;

/// Year-over-year change in percent for each (state, sector) series.
fn growth_records(records: &[ConsumptionRecord]) -> Vec<ConsumptionRecord> {
    let mut series: BTreeMap<(String, Sector), Vec<(i32, f64)>> = BTreeMap::new();
    for r in records {
        series
            .entry((r.state.clone(), r.sector.clone()))
            .or_default()
            .push((r.year, r.value));
    }

    let mut out = Vec::new();
    for ((state, sector), mut points) in series {
        points.sort_by_key(|&(year, _)| year);
        for pair in points.windows(2) {
            let ((_, prev), (year, value)) = (pair[0], pair[1]);
            let pct = if prev == 0.0 { 0.0 } else { (value - prev) / prev * 100.0 };
            out.push(ConsumptionRecord::new(
                state.clone(),
                sector.clone(),
                year,
                (pct * 100.0).round() / 100.0,
            ));
        }
    }
    out
}

/// Straight-line continuation of each state's total, five years out.
fn predictions(records: &[ConsumptionRecord]) -> serde_json::Value {
    let mut totals: BTreeMap<&str, BTreeMap<i32, f64>> = BTreeMap::new();
    for r in records {
        *totals
            .entry(r.state.as_str())
            .or_default()
            .entry(r.year)
            .or_default() += r.value;
    }

    let mut out = serde_json::Map::new();
    for (state, by_year) in totals {
        let (Some((&first_year, &first)), Some((&last_year, &last))) =
            (by_year.first_key_value(), by_year.last_key_value())
        else {
            continue;
        };
        let slope = if last_year > first_year {
            (last - first) / f64::from(last_year - first_year)
        } else {
            0.0
        };
        let forecast: serde_json::Map<String, serde_json::Value> = (1..=5)
            .map(|k| {
                let year = last_year + k;
                (year.to_string(), json!((last + slope * f64::from(k)).round()))
            })
            .collect();
        out.insert(state.to_string(), serde_json::Value::Object(forecast));
    }
    serde_json::Value::Object(out)
}

fn main() {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = StdRng::seed_from_u64(42);
    let records = generate_fallback(&mut rng);
    let growth = growth_records(&records);

    let model_results = json!({
        "linear_regression": { "r2": 0.91, "rmse": 42.7 },
        "random_forest": { "r2": 0.95, "rmse": 31.2 },
        "arima": { "order": [1, 1, 1], "aic": 812.4 },
    });

    let write = |name: &str, text: String| {
        let path = out_dir.join(name);
        std::fs::write(&path, text).expect("Failed to write output file");
        println!("Wrote {}", path.display());
    };

    write(CONSUMPTION_FILE, to_csv(&records).expect("Failed to encode CSV"));
    write(GROWTH_FILE, to_csv(&growth).expect("Failed to encode CSV"));
    write(
        MODEL_RESULTS_FILE,
        serde_json::to_string_pretty(&model_results).expect("Failed to encode JSON"),
    );
    write(
        PREDICTIONS_FILE,
        serde_json::to_string_pretty(&predictions(&records)).expect("Failed to encode JSON"),
    );

    println!(
        "{} consumption records, {} growth records",
        records.len(),
        growth.len()
    );
}
