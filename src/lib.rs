pub mod aggregate;
pub mod config;
pub mod developers;
pub mod fetch;
pub mod process;
pub mod projects;
pub mod record;
pub mod report;

pub use config::Config;
pub use fetch::{load_datasets, LoadReport};
pub use process::{parse_records, ParsedTable};
pub use projects::{filter_projects, ProjectFilter};
pub use record::{DatasetKind, Datasets, Record, Value};
