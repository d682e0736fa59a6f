use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::chart::ChartError;
use crate::data::model::ConsumptionRecord;

pub const CSV_FILE_NAME: &str = "water_consumption_data.csv";
pub const PNG_FILE_NAME: &str = "water_consumption_chart.png";

const CSV_HEADER: [&str; 4] = ["State", "Sector", "Year", "Value"];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0} export is not supported")]
    Unsupported(&'static str),
    #[error("no chart is available to export")]
    NoChart,
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Png,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Png, ExportFormat::Pdf];

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Png => "PNG",
            ExportFormat::Pdf => "PDF",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Bytes ready to be written under a suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write into `dir` under the suggested name.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(self.file_name);
        self.save_as(&path)?;
        Ok(path)
    }

    pub fn save_as(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, &self.bytes).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Serialize records as `State,Sector,Year,Value` lines, in the given order.
///
/// Fields are written verbatim without quoting, mirroring the loader: a comma
/// inside a state name will not survive a reload.
pub fn to_csv(records: &[ConsumptionRecord]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for r in records {
        let year = r.year.to_string();
        let value = r.value.to_string();
        writer.write_record([r.state.as_str(), r.sector.as_str(), year.as_str(), value.as_str()])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))?;
    let mut text = String::from_utf8(bytes)?;
    // lines are joined, not terminated
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// CSV artifact for `records`.
pub fn csv_artifact(records: &[ConsumptionRecord]) -> Result<ExportArtifact, ExportError> {
    Ok(ExportArtifact {
        file_name: CSV_FILE_NAME,
        mime_type: "text/csv",
        bytes: to_csv(records)?.into_bytes(),
    })
}

/// PNG artifact wrapping an already rendered snapshot.
pub fn png_artifact(bytes: Vec<u8>) -> ExportArtifact {
    ExportArtifact {
        file_name: PNG_FILE_NAME,
        mime_type: "image/png",
        bytes,
    }
}
