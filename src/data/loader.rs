use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rand::Rng;

use super::model::{ConsumptionRecord, DataOrigin, Datasets, ModelResults, Sector};

pub const CONSUMPTION_FILE: &str = "water_consumption_2015_2024.csv";
pub const GROWTH_FILE: &str = "growth_analysis_2015_2024.csv";
pub const MODEL_RESULTS_FILE: &str = "ml_model_results.json";
pub const PREDICTIONS_FILE: &str = "future_predictions.json";

const FALLBACK_STATES: [&str; 5] = ["Johor", "Kedah", "Kelantan", "Melaka", "Negeri Sembilan"];
const FALLBACK_FIRST_YEAR: i32 = 2015;
const FALLBACK_LAST_YEAR: i32 = 2024;

/// One parsed CSV line: header → trimmed field text.
pub type RawRow = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Resource access
// ---------------------------------------------------------------------------

/// Something that can hand out named text resources.
pub trait ResourceSource {
    fn fetch(&self, name: &str) -> Result<String>;
}

/// Resources stored as files under one directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceSource for DirSource {
    fn fetch(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load every dataset once at startup.
///
/// A failure on the primary consumption table is recovered by substituting
/// [`generate_fallback`] data, so the result is never empty. Secondary
/// resources fail independently and come back empty.
pub fn load(source: &dyn ResourceSource) -> Datasets {
    let (records, origin) = match load_records(source, CONSUMPTION_FILE) {
        Ok(records) => {
            log::info!("Loaded {} consumption records", records.len());
            (records, DataOrigin::Loaded)
        }
        Err(e) => {
            log::warn!("Falling back to sample data: {e:#}");
            (generate_fallback(&mut rand::thread_rng()), DataOrigin::Fallback)
        }
    };

    let growth = load_records(source, GROWTH_FILE).unwrap_or_else(|e| {
        log::warn!("Growth analysis unavailable: {e:#}");
        Vec::new()
    });
    let model_results = load_json_object(source, MODEL_RESULTS_FILE).unwrap_or_else(|e| {
        log::warn!("Model results unavailable: {e:#}");
        ModelResults::new()
    });
    let predictions = load_json_object(source, PREDICTIONS_FILE).unwrap_or_else(|e| {
        log::warn!("Future predictions unavailable: {e:#}");
        ModelResults::new()
    });

    log::info!(
        "Growth records: {}, model result keys: {}, prediction keys: {}",
        growth.len(),
        model_results.len(),
        predictions.len()
    );

    Datasets {
        records,
        growth,
        model_results,
        predictions,
        origin,
    }
}

fn load_records(source: &dyn ResourceSource, name: &str) -> Result<Vec<ConsumptionRecord>> {
    let text = source.fetch(name)?;
    let records = parse_records(&text).with_context(|| format!("parsing {name}"))?;
    if records.is_empty() {
        bail!("{name} contains no usable rows");
    }
    Ok(records)
}

fn load_json_object(source: &dyn ResourceSource, name: &str) -> Result<ModelResults> {
    let text = source.fetch(name)?;
    serde_json::from_str(&text).with_context(|| format!("parsing {name} as a JSON object"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Split headered CSV text into rows keyed by header.
///
/// Fields are plain comma-separated and trimmed: quotes carry no meaning, so a
/// comma inside a value splits it. Missing trailing fields become `""`.
pub fn parse_csv(text: &str) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Convert raw rows into typed records.
///
/// Column names match case-insensitively. A malformed `value` becomes 0; a
/// row without an integer `year` is dropped since no year filter can match it.
pub fn records_from_rows(rows: &[RawRow]) -> Vec<ConsumptionRecord> {
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        let Some(year) = parse_year(field(row, "year")) else {
            dropped += 1;
            continue;
        };
        records.push(ConsumptionRecord {
            state: field(row, "state").to_string(),
            sector: Sector::from(field(row, "sector")),
            year,
            value: coerce_value(field(row, "value")),
        });
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} rows without a valid year");
    }
    records
}

/// [`parse_csv`] followed by [`records_from_rows`].
pub fn parse_records(text: &str) -> Result<Vec<ConsumptionRecord>> {
    Ok(records_from_rows(&parse_csv(text)?))
}

fn field<'a>(row: &'a RawRow, name: &str) -> &'a str {
    row.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

fn parse_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    // "2020.0" style exports from spreadsheet tools
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i32)
}

/// Numeric value of a field, or 0 when missing, non-numeric or non-finite.
///
/// The longest leading number is taken, so unit suffixes such as `"150 ML"`
/// or `"4.5%"` still count.
pub fn coerce_value(s: &str) -> f64 {
    numeric_prefix(s.trim())
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// `[+-]digits[.digits][(e|E)[+-]digits]`, with at least one mantissa digit.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }
    &s[..end]
}

// ---------------------------------------------------------------------------
// Fallback data
// ---------------------------------------------------------------------------

/// Demonstration data: fixed states × sectors × years, random values.
pub fn generate_fallback<R: Rng + ?Sized>(rng: &mut R) -> Vec<ConsumptionRecord> {
    let mut records = Vec::new();
    for state in FALLBACK_STATES {
        for sector in Sector::TRACKED {
            for year in FALLBACK_FIRST_YEAR..=FALLBACK_LAST_YEAR {
                let base = match sector {
                    Sector::Domestic => 500.0,
                    _ => 300.0,
                };
                let variation = rng.gen_range(-100.0..100.0);
                let trend = f64::from(year - FALLBACK_FIRST_YEAR) * 10.0;
                records.push(ConsumptionRecord::new(
                    state,
                    sector.clone(),
                    year,
                    (base + variation + trend).round(),
                ));
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    struct MemSource(HashMap<&'static str, &'static str>);

    impl ResourceSource for MemSource {
        fn fetch(&self, name: &str) -> Result<String> {
            self.0
                .get(name)
                .map(|s| s.to_string())
                .with_context(|| format!("{name} not found"))
        }
    }

    #[test]
    fn parses_headers_and_rows() {
        let rows = parse_csv(" state , sector,year,value\nJohor, domestic ,2020, 100\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["state"], "Johor");
        assert_eq!(rows[0]["sector"], "domestic");
        assert_eq!(rows[0]["value"], "100");
    }

    #[test]
    fn missing_trailing_fields_are_empty() {
        let rows = parse_csv("state,sector,year,value\nJohor,domestic\n").unwrap();
        assert_eq!(rows[0]["year"], "");
        assert_eq!(rows[0]["value"], "");
    }

    #[test]
    fn quotes_are_not_special() {
        let rows = parse_csv("state,value\n\"Pulau, Pinang\",5\n").unwrap();
        assert_eq!(rows[0]["state"], "\"Pulau");
        assert_eq!(rows[0]["value"], "Pinang\"");
    }

    #[test]
    fn malformed_value_is_zero_and_kept() {
        let records =
            parse_records("state,sector,year,value\nJohor,domestic,2020,abc\nKedah,domestic,2020,\n")
                .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.value == 0.0));
    }

    #[test]
    fn row_without_year_is_dropped() {
        let records =
            parse_records("state,sector,year,value\nJohor,domestic,,1\nJohor,domestic,2021,2\n")
                .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2021);
    }

    #[test]
    fn capitalised_headers_are_accepted() {
        let records = parse_records("State,Sector,Year,Value\nKedah,nondomestic,2019,7.5").unwrap();
        assert_eq!(
            records,
            vec![ConsumptionRecord::new("Kedah", Sector::Nondomestic, 2019, 7.5)]
        );
    }

    #[test]
    fn coerce_rejects_non_finite() {
        assert_eq!(coerce_value("NaN"), 0.0);
        assert_eq!(coerce_value("inf"), 0.0);
        assert_eq!(coerce_value("Infinity"), 0.0);
        assert_eq!(coerce_value(" 12.5 "), 12.5);
    }

    #[test]
    fn coerce_takes_leading_number() {
        assert_eq!(coerce_value("150 ML"), 150.0);
        assert_eq!(coerce_value("4.5%"), 4.5);
        assert_eq!(coerce_value("-3.25e2 litres"), -325.0);
        assert_eq!(coerce_value(".5x"), 0.5);
        assert_eq!(coerce_value("7."), 7.0);
        assert_eq!(coerce_value("12e"), 12.0);
        assert_eq!(coerce_value("1e+"), 1.0);
        assert_eq!(coerce_value("1,234"), 1.0);
        assert_eq!(coerce_value("abc"), 0.0);
        assert_eq!(coerce_value("-"), 0.0);
        assert_eq!(coerce_value("."), 0.0);
        assert_eq!(coerce_value(""), 0.0);
    }

    #[test]
    fn unit_suffixed_values_count_in_records() {
        let records =
            parse_records("state,sector,year,value\nJohor,domestic,2020,150 ML\n").unwrap();
        assert_eq!(records[0].value, 150.0);
    }

    #[test]
    fn blank_lines_and_extra_fields() {
        let text = "state,sector,year,value\n\nJohor,domestic,2020,1,extra\n   \n\nKedah,nondomestic,2021,2\n";
        let rows = parse_csv(text).unwrap();
        // the whitespace-only line survives as an all-empty row
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == 4));
        assert!(rows.iter().all(|r| r.values().all(|v| v != "extra")));
        assert_eq!(rows[0]["value"], "1");
        assert!(rows[1].values().all(String::is_empty));

        let records = records_from_rows(&rows);
        assert_eq!(
            records,
            vec![
                ConsumptionRecord::new("Johor", Sector::Domestic, 2020, 1.0),
                ConsumptionRecord::new("Kedah", Sector::Nondomestic, 2021, 2.0),
            ]
        );
    }

    #[test]
    fn fallback_has_fixed_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let records = generate_fallback(&mut rng);
        assert_eq!(records.len(), 5 * 2 * 10);
        assert!(records.iter().all(|r| (2015..=2024).contains(&r.year)));
        assert!(records
            .iter()
            .filter(|r| r.sector == Sector::Domestic && r.year == 2015)
            .all(|r| (400.0..=600.0).contains(&r.value)));
    }

    #[test]
    fn missing_primary_falls_back() {
        let source = MemSource(HashMap::new());
        let data = load(&source);
        assert_eq!(data.origin, DataOrigin::Fallback);
        assert!(!data.records.is_empty());
        assert!(data.growth.is_empty());
        assert!(data.model_results.is_empty());
    }

    #[test]
    fn header_only_primary_falls_back() {
        let source = MemSource(HashMap::from([(CONSUMPTION_FILE, "state,sector,year,value\n")]));
        assert_eq!(load(&source).origin, DataOrigin::Fallback);
    }

    #[test]
    fn secondary_failure_keeps_primary() {
        let source = MemSource(HashMap::from([
            (CONSUMPTION_FILE, "state,sector,year,value\nJohor,domestic,2020,1"),
            (MODEL_RESULTS_FILE, "[1, 2, 3]"),
            (PREDICTIONS_FILE, r#"{"Johor": {"2025": 812.4}}"#),
        ]));
        let data = load(&source);
        assert_eq!(data.origin, DataOrigin::Loaded);
        assert_eq!(data.records.len(), 1);
        assert!(data.model_results.is_empty());
        assert!(data.predictions.contains_key("Johor"));
    }
}
