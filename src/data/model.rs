use std::fmt;
use std::str::FromStr;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Sector – consumption category of a record
// ---------------------------------------------------------------------------

/// The two tracked consumption categories.
///
/// Unrecognised sector text is preserved as `Other` so the record still takes
/// part in filtering, statistics and export. It is never summed into either
/// series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sector {
    Domestic,
    Nondomestic,
    Other(String),
}

impl Sector {
    /// Both tracked sectors, in series order.
    pub const TRACKED: [Sector; 2] = [Sector::Domestic, Sector::Nondomestic];

    pub fn as_str(&self) -> &str {
        match self {
            Sector::Domestic => "domestic",
            Sector::Nondomestic => "nondomestic",
            Sector::Other(s) => s,
        }
    }

    /// Human-readable label used in legends and selectors.
    pub fn label(&self) -> &str {
        match self {
            Sector::Domestic => "Domestic",
            Sector::Nondomestic => "Non-Domestic",
            Sector::Other(s) => s,
        }
    }
}

impl From<&str> for Sector {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "domestic" => Sector::Domestic,
            "nondomestic" => Sector::Nondomestic,
            _ => Sector::Other(trimmed.to_string()),
        }
    }
}

impl FromStr for Sector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Sector::from(s))
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConsumptionRecord – one row of the consumption table
// ---------------------------------------------------------------------------

/// A single consumption observation. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionRecord {
    pub state: String,
    pub sector: Sector,
    pub year: i32,
    /// Consumption in million litres. Malformed source values are stored as 0.
    pub value: f64,
}

impl ConsumptionRecord {
    pub fn new(state: impl Into<String>, sector: Sector, year: i32, value: f64) -> Self {
        Self {
            state: state.into(),
            sector,
            year,
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// Per-year totals for the two tracked sectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub domestic_total: f64,
    pub nondomestic_total: f64,
}

/// Scalar statistics over a filtered record set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub count: usize,
    pub total: f64,
    /// Arithmetic mean; `0.0` for an empty set.
    pub mean: f64,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

/// Opaque JSON object (model results, predictions). Displayed verbatim.
pub type ModelResults = serde_json::Map<String, serde_json::Value>;

/// Where the primary dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Loaded,
    Fallback,
}

/// Everything the loader produces at startup.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub records: Vec<ConsumptionRecord>,
    pub growth: Vec<ConsumptionRecord>,
    pub model_results: ModelResults,
    pub predictions: ModelResults,
    pub origin: DataOrigin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_parsing_is_case_insensitive() {
        assert_eq!("Domestic".parse::<Sector>().unwrap(), Sector::Domestic);
        assert_eq!(" NONDOMESTIC ".parse::<Sector>().unwrap(), Sector::Nondomestic);
    }

    #[test]
    fn unknown_sector_is_preserved() {
        let sector: Sector = "industrial".parse().unwrap();
        assert_eq!(sector, Sector::Other("industrial".into()));
        assert_eq!(sector.to_string(), "industrial");
    }

    #[test]
    fn sector_display_is_canonical() {
        assert_eq!(Sector::Domestic.to_string(), "domestic");
        assert_eq!(Sector::Nondomestic.label(), "Non-Domestic");
    }
}
