// src/fetch/mod.rs

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::process::{parse_records, utils::preview, ParsedTable};
use crate::record::{fields, DatasetKind, Datasets, Record};

pub mod fallback;
pub mod source;

pub use fallback::FallbackGenerator;
pub use source::{Fetched, FileSource, HttpSource, TextSource};

/// Shown to the user when the datasets could not be loaded at all.
pub const LOAD_FAILURE_MESSAGE: &str =
    "Error loading project data. Please refresh the page or contact support.";

/// Bodies shorter than this are treated as a bad response, not data.
pub const MIN_BODY_BYTES: usize = 100;

/// Primary location of a dataset file and the one to retry once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub primary: String,
    pub alternate: String,
}

impl DatasetPaths {
    pub fn etim() -> Self {
        Self {
            primary: "/data/etim_data.csv".into(),
            alternate: "data/etim_data.csv".into(),
        }
    }

    pub fn iig() -> Self {
        Self {
            primary: "/data/iig_data.csv".into(),
            alternate: "data/iig_data.csv".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub etim: DatasetPaths,
    pub iig: DatasetPaths,
    pub min_body_bytes: usize,
    pub fallback_seed: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            etim: DatasetPaths::etim(),
            iig: DatasetPaths::iig(),
            min_body_bytes: MIN_BODY_BYTES,
            fallback_seed: fallback::DEFAULT_SEED,
        }
    }
}

/// User-facing failure signal.
pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

/// Alert that only goes to the log.
pub struct LogAlert;

impl Alert for LogAlert {
    fn alert(&self, message: &str) {
        error!("{}", message);
    }
}

/// How a dataset in a [`LoadReport`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DatasetOrigin {
    Parsed { records: usize, errors: usize },
    Fallback,
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    #[serde(skip)]
    pub datasets: Datasets,
    pub etim: DatasetOrigin,
    pub iig: DatasetOrigin,
    pub loaded_at: DateTime<Utc>,
}

impl LoadReport {
    fn unavailable() -> Self {
        Self {
            datasets: Datasets::default(),
            etim: DatasetOrigin::Unavailable,
            iig: DatasetOrigin::Unavailable,
            loaded_at: Utc::now(),
        }
    }
}

/// Fetch `paths.primary`, falling back once to `paths.alternate`.
async fn fetch_with_retry<S>(source: &S, kind: DatasetKind, paths: &DatasetPaths) -> Result<Vec<u8>>
where
    S: TextSource + ?Sized,
{
    match source.fetch(&paths.primary).await {
        Ok(Fetched::Body(body)) => return Ok(body),
        Ok(Fetched::Status(code)) => {
            warn!(dataset = %kind, path = %paths.primary, status = code, "retrying with alternate path");
        }
        Err(e) => {
            warn!(dataset = %kind, path = %paths.primary, error = %e, "retrying with alternate path");
        }
    }

    match source.fetch(&paths.alternate).await? {
        Fetched::Body(body) => Ok(body),
        Fetched::Status(code) => Err(anyhow!(
            "{} unavailable: {} returned status {}",
            kind,
            paths.alternate,
            code
        )),
    }
}

fn parse_dataset(kind: DatasetKind, body: &[u8]) -> ParsedTable {
    info!(dataset = %kind, bytes = body.len(), "parsing");
    debug!(
        dataset = %kind,
        preview = %preview(&String::from_utf8_lossy(body), 100),
        "body preview"
    );
    let table = parse_records(body);
    info!(dataset = %kind, rows = table.records.len(), errors = table.errors, "parsed");
    table
}

/// Keep the parsed records, or substitute fallback data when none parsed.
fn settle(kind: DatasetKind, table: ParsedTable, seed: u64) -> (Vec<Record>, DatasetOrigin) {
    if !table.records.is_empty() {
        let origin = DatasetOrigin::Parsed {
            records: table.records.len(),
            errors: table.errors,
        };
        return (table.records, origin);
    }

    warn!(dataset = %kind, "no records parsed, using fallback data");
    let mut generator = FallbackGenerator::new(seed);
    let records = match kind {
        DatasetKind::Etim => generator.etim(),
        DatasetKind::Iig => generator.iig(),
    };
    (records, DatasetOrigin::Fallback)
}

fn log_integrity(data: &Datasets) {
    if !data.etim_data.is_empty() {
        let greenko = crate::aggregate::count_matching_developer(&data.etim_data, "Greenko");
        info!(greenko, "Greenko projects in ETIM");
    }
    if !data.iig_data.is_empty() {
        let with_developer = data
            .iig_data
            .iter()
            .filter(|r| r.first_text(&[fields::DEVELOPER]).is_some())
            .count();
        info!(with_developer, "IIG projects with developer");
    }
}

/// Load both datasets.
///
/// Both files are requested concurrently, each retried once on its alternate
/// path. If either is still unavailable, or either body is implausibly
/// small, `alert` fires and both collections come back empty. A dataset
/// whose body parses to zero records is replaced by generated fallback data;
/// the other dataset is kept as parsed.
#[instrument(level = "info", skip_all)]
pub async fn load_datasets<S>(source: &S, opts: &LoadOptions, alert: &dyn Alert) -> LoadReport
where
    S: TextSource + ?Sized,
{
    info!("fetching ETIM and IIG data");
    let (etim, iig) = tokio::join!(
        fetch_with_retry(source, DatasetKind::Etim, &opts.etim),
        fetch_with_retry(source, DatasetKind::Iig, &opts.iig),
    );

    let (etim_body, iig_body) = match (etim, iig) {
        (Ok(e), Ok(i)) => (e, i),
        (etim, iig) => {
            for err in [etim.err(), iig.err()].into_iter().flatten() {
                error!(error = %err, "failed to fetch dataset");
            }
            alert.alert(LOAD_FAILURE_MESSAGE);
            return LoadReport::unavailable();
        }
    };

    if etim_body.len() < opts.min_body_bytes || iig_body.len() < opts.min_body_bytes {
        error!(
            etim_bytes = etim_body.len(),
            iig_bytes = iig_body.len(),
            min = opts.min_body_bytes,
            "dataset body too small"
        );
        alert.alert(LOAD_FAILURE_MESSAGE);
        return LoadReport::unavailable();
    }

    let etim_table = parse_dataset(DatasetKind::Etim, &etim_body);
    let iig_table = parse_dataset(DatasetKind::Iig, &iig_body);

    let (etim_data, etim_origin) = settle(DatasetKind::Etim, etim_table, opts.fallback_seed);
    let (iig_data, iig_origin) = settle(DatasetKind::Iig, iig_table, opts.fallback_seed);

    let datasets = Datasets {
        etim_data,
        iig_data,
    };
    log_integrity(&datasets);

    LoadReport {
        datasets,
        etim: etim_origin,
        iig: iig_origin,
        loaded_at: Utc::now(),
    }
}
