// src/schema/types.rs

use serde::Serialize;
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Suffix appended to a column name to form its raw shadow column.
pub const RAW_COLUMN_SUFFIX: &str = "_raw";

/// Key of the synthetic row index; no column may use it.
pub const ROW_ID: &str = "_id";

/// Semantic type of a column, as decided by the inferencer.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Boolean,
    Number,
    Date,
    String,
}

/// How a column is meant to be read downstream.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    #[default]
    Categorical,
    Ordinal,
    Numerical,
    Temporal,
}

impl FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "categorical" => Ok(DataKind::Categorical),
            "ordinal" => Ok(DataKind::Ordinal),
            "numerical" => Ok(DataKind::Numerical),
            "temporal" => Ok(DataKind::Temporal),
            other => Err(format!("unknown data kind `{}`", other)),
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataKind::Categorical => "categorical",
            DataKind::Ordinal => "ordinal",
            DataKind::Numerical => "numerical",
            DataKind::Temporal => "temporal",
        };
        f.pad(s)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Boolean => "boolean",
            DataType::Number => "number",
            DataType::Date => "date",
            DataType::String => "string",
        };
        f.pad(s)
    }
}

/// A single converted cell. Dates are milliseconds since the epoch, UTC.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Boolean(bool),
    Number(f64),
    Date(i64),
    String(String),
}

impl DataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Option<&str>> for DataValue {
    fn from(cell: Option<&str>) -> Self {
        cell.map_or(DataValue::Null, |s| DataValue::String(s.to_string()))
    }
}

#[derive(Debug, Serialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub kind: DataKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,
    /// Set on shadow columns holding the untouched source strings.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_raw: bool,
    /// Name of the shadow column carrying this column's source strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_column_name: Option<String>,
    /// Free-form key/value pairs taken from the hint row.
    #[serde(flatten)]
    pub annotations: BTreeMap<String, String>,
}

impl ColumnMetadata {
    pub fn new(kind: DataKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub metadata: ColumnMetadata,
}

#[derive(Debug, Serialize, PartialEq, Clone, Default)]
pub struct Row {
    /// Zero-based row index, as a string.
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, DataValue>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&DataValue> {
        self.values.get(column)
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub display_name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    /// Dataset category; never set by the parser.
    #[serde(rename = "type")]
    pub table_type: Option<String>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_serializes_reserved_keys_and_annotations() {
        let mut meta = ColumnMetadata::new(DataKind::Temporal);
        meta.raw_column_name = Some("when_raw".into());
        meta.annotations.insert("unit".into(), "days".into());

        let v = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            v,
            json!({ "kind": "temporal", "rawColumnName": "when_raw", "unit": "days" })
        );
    }

    #[test]
    fn row_serializes_id_alongside_values() {
        let mut row = Row {
            id: "3".into(),
            ..Default::default()
        };
        row.values.insert("a".into(), DataValue::Number(1.5));
        row.values.insert("b".into(), DataValue::Null);

        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v, json!({ "_id": "3", "a": 1.5, "b": null }));
    }

    #[test]
    fn data_kind_parses_case_insensitively() {
        assert_eq!("Ordinal".parse::<DataKind>(), Ok(DataKind::Ordinal));
        assert_eq!(" TEMPORAL ".parse::<DataKind>(), Ok(DataKind::Temporal));
        assert!("nominal".parse::<DataKind>().is_err());
    }
}
