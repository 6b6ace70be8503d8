// Reading sourmash taxonomy CSVs into lineage rows

use crate::error::{Result, TaxflowError};
use crate::lineage::{DedupPolicy, LineageRow};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const LINEAGE_COLUMN: &str = "lineage";

/// The two supported input layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvSchema {
    /// `csv_summary` output of `sourmash tax metagenome`
    Summary,
    /// `with-lineages` output of `sourmash tax annotate`
    Annotate,
}

#[derive(Debug, Deserialize)]
struct SummaryRecord {
    fraction: f64,
    lineage: String,
}

#[derive(Debug, Deserialize)]
struct AnnotateRecord {
    f_unique_weighted: f64,
    lineage: String,
}

impl CsvSchema {
    pub fn as_str(&self) -> &'static str {
        match self {
            CsvSchema::Summary => "summary",
            CsvSchema::Annotate => "annotate",
        }
    }

    pub fn weight_column(&self) -> &'static str {
        match self {
            CsvSchema::Summary => "fraction",
            CsvSchema::Annotate => "f_unique_weighted",
        }
    }

    pub fn required_headers(&self) -> [&'static str; 2] {
        [self.weight_column(), LINEAGE_COLUMN]
    }

    /// Filename suffix sourmash gives this kind of file
    pub fn file_suffix(&self) -> &'static str {
        match self {
            CsvSchema::Summary => ".summarized.csv",
            CsvSchema::Annotate => ".with-lineages.csv",
        }
    }

    fn origin(&self) -> &'static str {
        match self {
            CsvSchema::Summary => "'csv_summary' file from 'sourmash tax metagenome'",
            CsvSchema::Annotate => "'with-lineages' file from 'sourmash tax annotate'",
        }
    }

    pub fn dedup_policy(&self) -> DedupPolicy {
        match self {
            CsvSchema::Summary => DedupPolicy::Global,
            CsvSchema::Annotate => DedupPolicy::None,
        }
    }

    /// Title used when none is given: the input path cut at the first
    /// occurrence of the schema's suffix, or the whole path without it.
    pub fn default_title(&self, input: &str) -> String {
        match input.find(self.file_suffix()) {
            Some(end) => input[..end].to_string(),
            None => input.to_string(),
        }
    }
}

/// Check that every required column is present in the header row
pub fn validate_headers(headers: &csv::StringRecord, schema: CsvSchema) -> Result<()> {
    let missing: Vec<&str> = schema
        .required_headers()
        .into_iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    debug!("Missing columns {:?} in header {:?}", missing, headers);
    let [weight, lineage] = schema.required_headers();
    Err(TaxflowError::MissingHeaders {
        expected: format!("'{}' and '{}'", weight, lineage),
        origin: schema.origin(),
    })
}

/// Read all rows of a CSV in `schema`'s layout.
///
/// Fails on the first malformed row; nothing is returned for a partially
/// readable file.
pub fn read_rows<R: Read>(reader: R, schema: CsvSchema) -> Result<Vec<LineageRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    validate_headers(csv_reader.headers()?, schema)?;

    let rows = match schema {
        CsvSchema::Summary => csv_reader
            .deserialize::<SummaryRecord>()
            .map(|record| record.map(|r| LineageRow::new(r.fraction, r.lineage)))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        CsvSchema::Annotate => csv_reader
            .deserialize::<AnnotateRecord>()
            .map(|record| record.map(|r| LineageRow::new(r.f_unique_weighted, r.lineage)))
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    Ok(rows)
}

/// Open `path`, read every row, and close the file before returning
pub fn read_rows_from_path(path: &Path, schema: CsvSchema) -> Result<Vec<LineageRow>> {
    let file = File::open(path)?;
    let rows = read_rows(file, schema)?;
    info!(
        "Read {} {} rows from {}",
        rows.len(),
        schema.as_str(),
        path.display()
    );
    Ok(rows)
}
