// Incident data pipeline: raw tables in, assembled incidents out.

pub mod assembler;
pub mod fields;
pub mod loader;
pub mod photo;
pub mod rows;

pub use assembler::{assemble_incidents, Assembled, RowWarning};
pub use loader::{DataSource, IncidentLoader, LoadOutcome, TableNames};
pub use photo::find_photo;
pub use rows::{parse_table, Cell, RawRow};
