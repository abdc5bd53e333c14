// src/process/mod.rs
use anyhow::{Context, Result};
use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::Path,
};
use tracing::{debug, info};

use crate::schema::{
    derive::{ColumnInferencer, InferredColumn, TypeInferencer},
    types::{
        Column, ColumnMetadata, DataKind, DataType, DataValue, Row, Table, RAW_COLUMN_SUFFIX,
        ROW_ID,
    },
};

pub mod hints;
pub mod locale;
pub mod tokenize;

use hints::{is_hint_cell, parse_hints, Hints};
use locale::{ListSeparator, SystemLocale};
use tokenize::{tokenize_rows, DsvFormat};

/// A column descriptor together with one value per data row.
struct ColumnValues {
    column: Column,
    values: Vec<DataValue>,
}

/// Builds typed tables from delimited text.
///
/// The inferencer decides each column's type; the list separator supplies
/// the delimiter for the `csv` format.
#[derive(Debug, Clone, Default)]
pub struct DsvParser<I = TypeInferencer, L = SystemLocale> {
    inferencer: I,
    locale: L,
}

impl DsvParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I, L> DsvParser<I, L> {
    pub fn with_inferencer<J: ColumnInferencer>(self, inferencer: J) -> DsvParser<J, L> {
        DsvParser {
            inferencer,
            locale: self.locale,
        }
    }

    pub fn with_list_separator<M: ListSeparator>(self, locale: M) -> DsvParser<I, M> {
        DsvParser {
            inferencer: self.inferencer,
            locale,
        }
    }
}

impl<I: ColumnInferencer, L: ListSeparator> DsvParser<I, L> {
    /// Parse `content` into a table named `file_name`.
    ///
    /// Returns `None` when no non-empty row survives tokenization. The first
    /// row is the header. If every cell of the next row starts with `*`
    /// (after optional whitespace) that row is read as per-column hints
    /// rather than data.
    pub fn parse(
        &self,
        file_name: &str,
        content: &str,
        format: impl Into<DsvFormat>,
    ) -> Option<Table> {
        let format = format.into();
        let rows = tokenize_rows(&format, content, &self.locale);
        let Some((header, rest)) = rows.split_first() else {
            debug!(file_name, %format, "no rows, no table");
            return None;
        };

        let (column_hints, data) = match rest.split_first() {
            Some((first, tail)) if first.iter().all(|c| is_hint_cell(c)) => {
                debug!(cells = first.len(), "consuming hint row");
                (first.iter().map(|c| parse_hints(c)).collect::<Vec<_>>(), tail)
            }
            _ => (Vec::new(), rest),
        };

        let mut taken: HashSet<String> = header.iter().cloned().collect();
        let names: Vec<String> = header
            .iter()
            .map(|h| {
                if h == ROW_ID {
                    claim_id_free_name(h, &mut taken)
                } else {
                    h.clone()
                }
            })
            .collect();
        taken.insert(ROW_ID.to_string());
        let mut typed = Vec::with_capacity(header.len());
        let mut shadows = Vec::new();

        for (idx, name) in names.iter().enumerate() {
            let cells: Vec<Option<&str>> = data
                .iter()
                .map(|row| row.get(idx).map(String::as_str))
                .collect();
            let InferredColumn {
                values,
                raw_values,
                data_type,
                mut metadata,
            } = self.inferencer.infer(&cells);

            if let Some(h) = column_hints.get(idx) {
                apply_hints(&mut metadata, h);
            }

            if let Some(raw_values) = raw_values {
                let raw_name = claim_raw_name(name, &mut taken);
                metadata.raw_column_name = Some(raw_name.clone());
                let raw_metadata = ColumnMetadata {
                    is_raw: true,
                    annotations: metadata.annotations.clone(),
                    ..ColumnMetadata::new(DataKind::Categorical)
                };
                shadows.push(ColumnValues {
                    column: Column {
                        name: raw_name.clone(),
                        display_name: raw_name,
                        data_type: DataType::String,
                        metadata: raw_metadata,
                    },
                    values: raw_values,
                });
            }

            typed.push(ColumnValues {
                column: Column {
                    name: name.clone(),
                    display_name: name.clone(),
                    data_type,
                    metadata,
                },
                values,
            });
        }
        typed.extend(shadows);

        let rows: Vec<Row> = (0..data.len())
            .map(|rindex| {
                let values: BTreeMap<String, DataValue> = typed
                    .iter()
                    .map(|cv| {
                        let v = cv.values.get(rindex).cloned().unwrap_or(DataValue::Null);
                        (cv.column.name.clone(), v)
                    })
                    .collect();
                Row {
                    id: rindex.to_string(),
                    values,
                }
            })
            .collect();
        let columns: Vec<Column> = typed.into_iter().map(|cv| cv.column).collect();

        info!(
            file_name,
            %format,
            rows = rows.len(),
            columns = columns.len(),
            "parsed dataset"
        );
        Some(Table {
            name: file_name.to_string(),
            display_name: file_name.to_string(),
            columns,
            rows,
            table_type: None,
        })
    }

    /// Read `path` and parse it. The format comes from the extension unless
    /// given; the table is named after the file name.
    #[tracing::instrument(level = "info", skip(self, path, format), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(
        &self,
        path: P,
        format: Option<DsvFormat>,
    ) -> Result<Option<Table>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file: {:?}", path))?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let format = format.unwrap_or_else(|| DsvFormat::from_path(path));
        Ok(self.parse(&name, content, format))
    }
}

/// Parse with the default inferencer and the system list separator.
pub fn parse_dataset(
    file_name: &str,
    content: &str,
    format: impl Into<DsvFormat>,
) -> Option<Table> {
    DsvParser::new().parse(file_name, content, format)
}

/// Load a `.csv`/`.tsv` file with the default parser.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Option<Table>> {
    DsvParser::new().load(path, None)
}

/// Fold hint-row entries into inferred metadata. `kind`, `format` and
/// `order` override inference; everything else is kept as an annotation.
fn apply_hints(metadata: &mut ColumnMetadata, hints: &Hints) {
    for (key, value) in hints {
        match key.as_str() {
            "kind" => match value.parse::<DataKind>() {
                Ok(kind) => metadata.kind = kind,
                Err(e) => debug!(error = %e, "ignoring kind hint"),
            },
            "format" => metadata.format = Some(value.clone()),
            "order" => {
                metadata.order = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                )
            }
            "isRaw" | "rawColumnName" => debug!(key = %key, "ignoring reserved hint"),
            _ => {
                metadata.annotations.insert(key.clone(), value.clone());
            }
        }
    }
}

/// `<name>_1`, `<name>_2`, ... for a header that would shadow the row index.
fn claim_id_free_name(name: &str, taken: &mut HashSet<String>) -> String {
    let mut n = 1;
    let mut candidate = format!("{}_{}", name, n);
    while taken.contains(&candidate) {
        n += 1;
        candidate = format!("{}_{}", name, n);
    }
    debug!(column = name, renamed = %candidate, "header clashes with row index");
    taken.insert(candidate.clone());
    candidate
}

/// `<name>_raw`, with the suffix repeated until it clashes with no other column.
fn claim_raw_name(name: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = format!("{}{}", name, RAW_COLUMN_SUFFIX);
    while taken.contains(&candidate) {
        debug!(column = name, candidate = %candidate, "raw column name taken");
        candidate.push_str(RAW_COLUMN_SUFFIX);
    }
    taken.insert(candidate.clone());
    candidate
}
