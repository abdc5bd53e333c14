pub mod arrow;
pub mod date_parser;
pub mod derive;
pub mod types;
pub mod utils;

pub use arrow::{build_arrow_schema, map_to_arrow_type};
pub use derive::{ColumnInferencer, InferredColumn, TypeInferencer};
pub use types::{
    Column, ColumnMetadata, DataKind, DataType, DataValue, Row, Table, RAW_COLUMN_SUFFIX,
    ROW_ID,
};
