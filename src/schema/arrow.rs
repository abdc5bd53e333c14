// src/schema/arrow.rs

use anyhow::{Context, Result};
use arrow::{
    array::{
        ArrayRef, BooleanBuilder, Float64Builder, StringBuilder, TimestampMillisecondBuilder,
    },
    datatypes::{DataType as ArrowDataType, Field, Schema, TimeUnit},
    record_batch::RecordBatch,
};
use std::{collections::HashMap, sync::Arc};

use super::types::{Column, ColumnMetadata, DataType, DataValue, Table, ROW_ID};

/// Timezone attached to exported date columns; parsed dates are UTC.
const DATE_TZ: &str = "UTC";

/// Map a column's inferred type into an Arrow DataType.
///
/// - Boolean → Boolean
/// - Number  → Float64
/// - Date    → Timestamp(ms, UTC)
/// - String  → Utf8
pub fn map_to_arrow_type(ty: DataType) -> ArrowDataType {
    match ty {
        DataType::Boolean => ArrowDataType::Boolean,
        DataType::Number => ArrowDataType::Float64,
        DataType::Date => ArrowDataType::Timestamp(TimeUnit::Millisecond, Some(DATE_TZ.into())),
        DataType::String => ArrowDataType::Utf8,
    }
}

fn field_metadata(meta: &ColumnMetadata) -> HashMap<String, String> {
    let mut out: HashMap<String, String> = meta
        .annotations
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    out.insert("kind".into(), meta.kind.to_string());
    if let Some(fmt) = &meta.format {
        out.insert("format".into(), fmt.clone());
    }
    if meta.is_raw {
        out.insert("isRaw".into(), "true".into());
    }
    if let Some(raw) = &meta.raw_column_name {
        out.insert("rawColumnName".into(), raw.clone());
    }
    out
}

/// Build an ArrowSchema from the table's columns, led by the `_id` field.
pub fn build_arrow_schema(cols: &[Column]) -> Arc<Schema> {
    let mut fields = Vec::with_capacity(cols.len() + 1);
    fields.push(Field::new(ROW_ID, ArrowDataType::Utf8, false));
    for col in cols {
        fields.push(
            Field::new(&col.name, map_to_arrow_type(col.data_type), true)
                .with_metadata(field_metadata(&col.metadata)),
        );
    }
    Arc::new(Schema::new(fields))
}

/// Build one Arrow array for `col`; cells that don't fit the column type become nulls.
fn build_column(table: &Table, col: &Column) -> ArrayRef {
    let cells = table.rows.iter().map(|r| r.get(&col.name));
    match col.data_type {
        DataType::Boolean => {
            let mut b = BooleanBuilder::with_capacity(table.rows.len());
            for cell in cells {
                b.append_option(match cell {
                    Some(DataValue::Boolean(v)) => Some(*v),
                    _ => None,
                });
            }
            Arc::new(b.finish())
        }
        DataType::Number => {
            let mut b = Float64Builder::with_capacity(table.rows.len());
            for cell in cells {
                b.append_option(match cell {
                    Some(DataValue::Number(v)) => Some(*v),
                    _ => None,
                });
            }
            Arc::new(b.finish())
        }
        DataType::Date => {
            let mut b = TimestampMillisecondBuilder::with_capacity(table.rows.len());
            for cell in cells {
                b.append_option(match cell {
                    Some(DataValue::Date(ms)) => Some(*ms),
                    _ => None,
                });
            }
            Arc::new(b.finish().with_timezone(DATE_TZ))
        }
        DataType::String => {
            let mut b = StringBuilder::new();
            for cell in cells {
                b.append_option(cell.and_then(DataValue::as_str));
            }
            Arc::new(b.finish())
        }
    }
}

impl Table {
    /// Convert the table into a single Arrow `RecordBatch`.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let schema = build_arrow_schema(&self.columns);

        let mut ids = StringBuilder::new();
        for row in &self.rows {
            ids.append_value(&row.id);
        }
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len() + 1);
        arrays.push(Arc::new(ids.finish()));
        for col in &self.columns {
            arrays.push(build_column(self, col));
        }

        RecordBatch::try_new(schema, arrays)
            .with_context(|| format!("building record batch for {}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{locale::FixedSeparator, parse_dataset, DsvParser};
    use anyhow::anyhow;
    use arrow::array::{Array, Float64Array, StringArray, TimestampMillisecondArray};

    #[test]
    fn exports_typed_and_raw_columns() -> Result<()> {
        let table = DsvParser::new()
            .with_list_separator(FixedSeparator(','))
            .parse("t.csv", "when,n\n2020-01-02,1\n,x\n", "csv")
            .ok_or_else(|| anyhow!("expected a table"))?;
        let batch = table.to_record_batch()?;

        assert_eq!(batch.num_rows(), 2);
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["_id", "when", "n", "when_raw"]);

        let when = schema.field_with_name("when")?;
        assert_eq!(when.data_type(), &map_to_arrow_type(DataType::Date));
        assert_eq!(
            when.metadata().get("rawColumnName").map(String::as_str),
            Some("when_raw")
        );
        let raw = schema.field_with_name("when_raw")?;
        assert_eq!(raw.metadata().get("isRaw").map(String::as_str), Some("true"));

        let ids = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| anyhow!("_id is not utf8"))?;
        assert_eq!(ids.value(1), "1");

        let dates = batch
            .column(1)
            .as_any()
            .downcast_ref::<TimestampMillisecondArray>()
            .ok_or_else(|| anyhow!("when is not a timestamp"))?;
        assert_eq!(dates.value(0), 1_577_923_200_000);
        assert!(dates.is_null(1));

        // "x" makes `n` a string column
        assert!(batch.column(2).as_any().downcast_ref::<Float64Array>().is_none());
        Ok(())
    }

    #[test]
    fn id_header_does_not_duplicate_the_id_field() -> Result<()> {
        let table = DsvParser::new()
            .with_list_separator(FixedSeparator(','))
            .parse("t.csv", "_id,b\nx,1\n", "csv")
            .ok_or_else(|| anyhow!("expected a table"))?;
        let batch = table.to_record_batch()?;

        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["_id", "_id_1", "b"]);
        Ok(())
    }

    #[test]
    fn empty_table_exports_zero_rows() -> Result<()> {
        let table = parse_dataset("t.tsv", "a\tb\n", "tsv")
            .ok_or_else(|| anyhow!("expected a table"))?;
        let batch = table.to_record_batch()?;
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 3);
        Ok(())
    }
}
