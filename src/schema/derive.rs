use std::collections::BTreeSet;
use tracing::debug;

use super::date_parser::parse_timestamp_millis;
use super::types::{ColumnMetadata, DataKind, DataType, DataValue};
use super::utils::{clean_str, parse_number};

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];
const WEEKDAYS: [&str; 7] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

/// Output of column inference: one typed value per input cell, plus the
/// source strings when the typed values lose information.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredColumn {
    pub values: Vec<DataValue>,
    pub raw_values: Option<Vec<DataValue>>,
    pub data_type: DataType,
    pub metadata: ColumnMetadata,
}

/// Decides a column's type from its raw cells. `None` marks a cell missing
/// from a short row. Implementations must return exactly one value per cell.
pub trait ColumnInferencer {
    fn infer(&self, cells: &[Option<&str>]) -> InferredColumn;
}

impl<T: ColumnInferencer + ?Sized> ColumnInferencer for &T {
    fn infer(&self, cells: &[Option<&str>]) -> InferredColumn {
        (**self).infer(cells)
    }
}

/// Tries boolean, number, date and finally string; the first type every
/// non-empty cell converts to wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeInferencer;

impl ColumnInferencer for TypeInferencer {
    fn infer(&self, cells: &[Option<&str>]) -> InferredColumn {
        let samples: Vec<&str> = cells
            .iter()
            .filter_map(|c| c.map(clean_str))
            .filter(|c| !c.is_empty())
            .collect();

        if samples.is_empty() {
            debug!("no samples among {} cells, defaulting to string", cells.len());
            return infer_string(cells, &samples);
        }

        if let Some(col) = infer_boolean(cells, &samples) {
            return col;
        }
        if let Some(col) = infer_number(cells, &samples) {
            return col;
        }
        if let Some(col) = infer_date(cells, &samples) {
            return col;
        }
        infer_string(cells, &samples)
    }
}

fn non_empty(cell: Option<&str>) -> Option<&str> {
    cell.map(clean_str).filter(|c| !c.is_empty())
}

fn infer_boolean(cells: &[Option<&str>], samples: &[&str]) -> Option<InferredColumn> {
    let parse = |s: &str| match s.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    };
    if !samples.iter().all(|s| parse(*s).is_some()) {
        return None;
    }

    debug!("inferred boolean from {} samples", samples.len());
    let values = cells
        .iter()
        .map(|c| non_empty(*c).and_then(parse).map_or(DataValue::Null, DataValue::Boolean))
        .collect();
    Some(InferredColumn {
        values,
        raw_values: None,
        data_type: DataType::Boolean,
        metadata: ColumnMetadata::new(DataKind::Categorical),
    })
}

fn infer_number(cells: &[Option<&str>], samples: &[&str]) -> Option<InferredColumn> {
    let mut reformatted = false;
    for s in samples {
        let (_, r) = parse_number(s)?;
        reformatted |= r;
    }

    debug!(reformatted, "inferred number from {} samples", samples.len());
    let values = cells
        .iter()
        .map(|c| {
            non_empty(*c)
                .and_then(parse_number)
                .map_or(DataValue::Null, |(v, _)| DataValue::Number(v))
        })
        .collect();
    Some(InferredColumn {
        values,
        raw_values: reformatted.then(|| raw_strings(cells)),
        data_type: DataType::Number,
        metadata: ColumnMetadata::new(DataKind::Numerical),
    })
}

fn infer_date(cells: &[Option<&str>], samples: &[&str]) -> Option<InferredColumn> {
    let mut formats = BTreeSet::new();
    for s in samples {
        let (_, fmt) = parse_timestamp_millis(s)?;
        formats.insert(fmt);
    }

    let mut metadata = ColumnMetadata::new(DataKind::Temporal);
    if formats.len() == 1 {
        metadata.format = formats.first().map(|f| f.to_string());
    } else {
        debug!(?formats, "date column mixes formats");
    }

    debug!("inferred date from {} samples", samples.len());
    let values = cells
        .iter()
        .map(|c| {
            non_empty(*c)
                .and_then(parse_timestamp_millis)
                .map_or(DataValue::Null, |(ms, _)| DataValue::Date(ms))
        })
        .collect();
    Some(InferredColumn {
        values,
        raw_values: Some(raw_strings(cells)),
        data_type: DataType::Date,
        metadata,
    })
}

fn infer_string(cells: &[Option<&str>], samples: &[&str]) -> InferredColumn {
    let mut metadata = ColumnMetadata::new(DataKind::Categorical);
    if let Some(order) = calendar_order(samples) {
        debug!(?order, "string column looks ordinal");
        metadata.kind = DataKind::Ordinal;
        metadata.order = Some(order);
    }
    InferredColumn {
        values: raw_strings(cells),
        raw_values: None,
        data_type: DataType::String,
        metadata,
    }
}

fn raw_strings(cells: &[Option<&str>]) -> Vec<DataValue> {
    cells.iter().map(|c| DataValue::from(*c)).collect()
}

/// Position of `s` in `names`, matching full names or their three-letter prefix.
fn calendar_position(names: &[&str], s: &str) -> Option<usize> {
    let lower = s.to_lowercase();
    names
        .iter()
        .position(|n| *n == lower || (lower.len() == 3 && n.starts_with(lower.as_str())))
}

/// Distinct values in calendar order, if every sample is a month or every sample a weekday.
fn calendar_order(samples: &[&str]) -> Option<Vec<String>> {
    if samples.is_empty() {
        return None;
    }
    for names in [&MONTHS[..], &WEEKDAYS[..]] {
        let positions: Option<Vec<usize>> = samples
            .iter()
            .map(|s| calendar_position(names, s))
            .collect();
        if let Some(positions) = positions {
            let mut seen: Vec<(usize, &str)> =
                positions.into_iter().zip(samples.iter().copied()).collect();
            seen.sort_by_key(|(p, _)| *p);
            let mut order: Vec<String> = Vec::new();
            for (_, s) in seen {
                if !order.iter().any(|o| o == s) {
                    order.push(s.to_string());
                }
            }
            return Some(order);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(cells: &[&str]) -> InferredColumn {
        let cells: Vec<Option<&str>> = cells.iter().map(|c| Some(*c)).collect();
        TypeInferencer.infer(&cells)
    }

    #[test]
    fn numbers_without_decoration_have_no_raw_values() {
        let col = infer(&["1", "2.5", "", "-3"]);
        assert_eq!(col.data_type, DataType::Number);
        assert_eq!(col.metadata.kind, DataKind::Numerical);
        assert_eq!(
            col.values,
            vec![
                DataValue::Number(1.0),
                DataValue::Number(2.5),
                DataValue::Null,
                DataValue::Number(-3.0)
            ]
        );
        assert!(col.raw_values.is_none());
    }

    #[test]
    fn currency_numbers_keep_raw_values() {
        let col = infer(&["$1,000", "$25"]);
        assert_eq!(col.data_type, DataType::Number);
        assert_eq!(
            col.raw_values,
            Some(vec![
                DataValue::String("$1,000".into()),
                DataValue::String("$25".into())
            ])
        );
    }

    #[test]
    fn dates_always_keep_raw_values() {
        let col = infer(&["2020-01-01", "2020-01-02"]);
        assert_eq!(col.data_type, DataType::Date);
        assert_eq!(col.metadata.kind, DataKind::Temporal);
        assert_eq!(col.metadata.format.as_deref(), Some("%Y-%m-%d"));
        assert_eq!(col.values.len(), 2);
        assert!(matches!(col.values[0], DataValue::Date(_)));
        assert_eq!(
            col.raw_values.as_ref().map(|r| r[1].clone()),
            Some(DataValue::String("2020-01-02".into()))
        );
    }

    #[test]
    fn mixed_date_formats_leave_format_unset() {
        let col = infer(&["2020-01-01", "01/02/2020"]);
        assert_eq!(col.data_type, DataType::Date);
        assert_eq!(col.metadata.format, None);
    }

    #[test]
    fn booleans_win_over_strings() {
        let col = infer(&["TRUE", "false", ""]);
        assert_eq!(col.data_type, DataType::Boolean);
        assert_eq!(
            col.values,
            vec![DataValue::Boolean(true), DataValue::Boolean(false), DataValue::Null]
        );
    }

    #[test]
    fn mixed_cells_fall_back_to_string() {
        let col = infer(&["1", "two", ""]);
        assert_eq!(col.data_type, DataType::String);
        assert_eq!(col.metadata.kind, DataKind::Categorical);
        assert_eq!(
            col.values,
            vec![
                DataValue::String("1".into()),
                DataValue::String("two".into()),
                DataValue::String("".into())
            ]
        );
    }

    #[test]
    fn missing_cells_become_null() {
        let col = TypeInferencer.infer(&[Some("5"), None]);
        assert_eq!(col.values, vec![DataValue::Number(5.0), DataValue::Null]);

        let col = TypeInferencer.infer(&[None, None]);
        assert_eq!(col.data_type, DataType::String);
        assert_eq!(col.values, vec![DataValue::Null, DataValue::Null]);
    }

    #[test]
    fn months_are_ordinal_in_calendar_order() {
        let col = infer(&["Mar", "January", "Mar", "feb"]);
        assert_eq!(col.data_type, DataType::String);
        assert_eq!(col.metadata.kind, DataKind::Ordinal);
        assert_eq!(
            col.metadata.order,
            Some(vec!["January".to_string(), "feb".to_string(), "Mar".to_string()])
        );
    }

    #[test]
    fn weekdays_are_ordinal() {
        let col = infer(&["Sunday", "Monday"]);
        assert_eq!(col.metadata.kind, DataKind::Ordinal);
        assert_eq!(
            col.metadata.order,
            Some(vec!["Monday".to_string(), "Sunday".to_string()])
        );
    }

    #[test]
    fn output_length_matches_input() {
        for cells in [&["a", "b", "c"][..], &["1", "", "3"], &["2020-01-01", "", ""]] {
            assert_eq!(infer(cells).values.len(), cells.len());
        }
    }
}
