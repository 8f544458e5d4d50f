use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ProbeKitError;
use crate::models::{OutcomeRecord, ScanReport};

/// Column order of the CSV export. Written even when there are no rows.
pub const OUTCOME_CSV_COLUMNS: &[&str] = &[
    "index",
    "username",
    "password",
    "path",
    "parameter",
    "payload",
    "url",
    "status",
    "verdict",
    "reason",
    "response_length",
    "server",
    "content_type",
    "elapsed_ms",
    "attempts",
    "error",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ProbeKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(ProbeKitError::Config(format!("Unknown output format: {}", other))),
        }
    }
}

/// Parse a comma-separated format list such as `json,csv`. Duplicates collapse.
pub fn parse_formats(list: &str) -> Result<Vec<OutputFormat>, ProbeKitError> {
    let mut formats = Vec::new();
    for part in list.split(',').filter(|p| !p.trim().is_empty()) {
        let format: OutputFormat = part.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        return Err(ProbeKitError::Config("At least one output format is required".into()));
    }
    Ok(formats)
}

/// Destination for a finished report.
pub trait ResultSink: Send + Sync {
    /// Returns the paths written.
    fn persist(&self, report: &ScanReport) -> Result<Vec<PathBuf>, ProbeKitError>;
}

/// Writes `<prefix>_<YYYYMMDDTHHMMSSZ>.<ext>` files into an existing directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
    prefix: String,
    formats: Vec<OutputFormat>,
}

impl FileSink {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            formats: vec![OutputFormat::Json, OutputFormat::Csv],
        }
    }

    pub fn with_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.formats = formats;
        self
    }

    fn path_for(&self, report: &ScanReport, format: OutputFormat) -> PathBuf {
        let stamp = report.started_at.format("%Y%m%dT%H%M%SZ");
        self.directory
            .join(format!("{}_{}.{}", self.prefix, stamp, format.extension()))
    }
}

impl ResultSink for FileSink {
    fn persist(&self, report: &ScanReport) -> Result<Vec<PathBuf>, ProbeKitError> {
        let mut written = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let path = self.path_for(report, *format);
            match format {
                OutputFormat::Json => write_json(&path, &report.outcomes)?,
                OutputFormat::Csv => write_csv(&path, &report.outcomes)?,
            }
            info!(path = %path.display(), records = report.outcomes.len(), "Results saved");
            written.push(path);
        }
        Ok(written)
    }
}

fn write_json(path: &Path, records: &[OutcomeRecord]) -> Result<(), ProbeKitError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn write_csv(path: &Path, records: &[OutcomeRecord]) -> Result<(), ProbeKitError> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(OUTCOME_CSV_COLUMNS)?;
    for record in records {
        writer.write_record(csv_row(record))?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_row(record: &OutcomeRecord) -> Vec<String> {
    fn opt<T: ToString>(value: &Option<T>) -> String {
        value.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }

    vec![
        record.index.to_string(),
        opt(&record.username),
        opt(&record.password),
        opt(&record.path),
        opt(&record.parameter),
        opt(&record.payload),
        opt(&record.url),
        opt(&record.status),
        record.verdict.to_string(),
        record.reason.clone(),
        opt(&record.response_length),
        opt(&record.server),
        opt(&record.content_type),
        record.elapsed_ms.to_string(),
        record.attempts.to_string(),
        opt(&record.error),
    ]
}
