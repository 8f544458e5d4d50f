pub mod formatter;
pub mod sink;

pub use formatter::{format_hits_table, format_summary};
pub use sink::{parse_formats, FileSink, OutputFormat, ResultSink, OUTCOME_CSV_COLUMNS};
