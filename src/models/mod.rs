pub mod record;
pub mod table;

pub use record::{DEFAULT_COLUMN_NAMES, Record, RecordSet, SCHEMA_WIDTH, is_valid_date};
pub use table::{CellValue, RawTable};
