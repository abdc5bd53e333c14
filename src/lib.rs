pub mod process;
pub mod schema;

pub use process::{load_dataset, parse_dataset, tokenize::DsvFormat, DsvParser};
pub use schema::{Column, ColumnMetadata, DataKind, DataType, DataValue, Row, Table};
