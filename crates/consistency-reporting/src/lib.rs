//! Report export for paper consistency results.

pub mod export;
pub mod types;

pub use export::{export_json, export_markdown, export_report, export_text};
pub use types::{ExportFormat, REPORT_FILE_NAME, Report};
