use csv::ReaderBuilder;
use std::{fmt, path::Path};
use tracing::{debug, warn};

use super::locale::ListSeparator;

/// Declared layout of the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DsvFormat {
    /// Delimited by the locale's list separator (`,` in most locales).
    Csv,
    Tsv,
    /// Anything else; tokenizes to a single empty row.
    Unknown(String),
}

impl From<&str> for DsvFormat {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => DsvFormat::Csv,
            "tsv" => DsvFormat::Tsv,
            _ => DsvFormat::Unknown(s.to_string()),
        }
    }
}

impl fmt::Display for DsvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DsvFormat::Csv => f.write_str("csv"),
            DsvFormat::Tsv => f.write_str("tsv"),
            DsvFormat::Unknown(s) => f.write_str(s),
        }
    }
}

impl DsvFormat {
    /// `.csv` → csv, `.tsv`/`.tab` → tsv, anything else unknown.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "tab" => DsvFormat::Tsv,
            other => DsvFormat::from(other),
        }
    }
}

/// Only single-byte ASCII separators can drive the reader.
fn delimiter_byte(sep: &str) -> u8 {
    match sep.as_bytes() {
        [b] if b.is_ascii() => *b,
        _ => {
            warn!(separator = sep, "unusable list separator, falling back to ','");
            b','
        }
    }
}

fn read_rows(content: &str, delimiter: u8) -> Vec<Vec<String>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // short and long rows are kept as-is
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        match result {
            Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
            Err(e) => warn!(record = idx, error = %e, "skipping unreadable record"),
        }
    }
    rows
}

/// Split `content` into rows of cells, dropping rows with no cells.
///
/// Quoted fields may contain the delimiter and line breaks; `""` inside a
/// quoted field is a literal quote.
pub fn tokenize_rows<L: ListSeparator + ?Sized>(
    format: &DsvFormat,
    content: &str,
    locale: &L,
) -> Vec<Vec<String>> {
    let rows = match format {
        DsvFormat::Csv => read_rows(content, delimiter_byte(&locale.list_separator())),
        DsvFormat::Tsv => read_rows(content, b'\t'),
        DsvFormat::Unknown(name) => {
            debug!(format = %name, "unrecognized format, no rows");
            vec![Vec::new()]
        }
    };
    rows.into_iter().filter(|r| !r.is_empty()).collect()
}
