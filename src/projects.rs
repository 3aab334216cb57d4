// src/projects.rs
//
// Project table filtering: exact state, status, priority flag and a free-text
// search over project name or developer.

use serde::Serialize;

use crate::aggregate::{Grouped, UNKNOWN};
use crate::developers::is_high_priority;
use crate::record::{fields, DatasetKind, Record};

/// Status columns for the project table, ETIM first.
const STATUS_FIELDS: &[&str] = &[fields::ETIM_STATUS, fields::IIG_STATUS];
const PROJECT_NAME_FIELDS: &[&str] = &[fields::ETIM_PROJECT, fields::IIG_PROJECT];

/// Active filters of the project table. Empty strings and `false` disable a filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectFilter {
    pub state: String,
    pub status: String,
    pub search: String,
    pub high_priority_only: bool,
}

impl ProjectFilter {
    fn matches(&self, record: &Record, kind: DatasetKind, search: &str) -> bool {
        if !self.state.is_empty() && record.text(fields::STATE) != self.state {
            return false;
        }
        if !self.status.is_empty()
            && record.first_text(STATUS_FIELDS).as_deref() != Some(self.status.as_str())
        {
            return false;
        }

        let developer = record
            .first_text(kind.developer_fields())
            .unwrap_or_default();
        if self.high_priority_only && !is_high_priority(&developer) {
            return false;
        }

        search.is_empty()
            || record
                .first_text(PROJECT_NAME_FIELDS)
                .unwrap_or_default()
                .to_lowercase()
                .contains(search)
            || developer.to_lowercase().contains(search)
    }
}

/// Records of one dataset that pass every active filter, in input order.
pub fn filter_projects<'a>(
    records: &'a [Record],
    kind: DatasetKind,
    filter: &ProjectFilter,
) -> Vec<&'a Record> {
    let search = filter.search.trim().to_lowercase();
    records
        .iter()
        .filter(|r| filter.matches(r, kind, &search))
        .collect()
}

fn distinct<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    let mut seen: Grouped<()> = Grouped::new();
    for v in values {
        seen.entry(&v);
    }
    seen.into_entries().into_iter().map(|(k, _)| k).collect()
}

/// Non-blank `State` values in first-seen order, for the state selector.
pub fn distinct_states(records: &[Record]) -> Vec<String> {
    distinct(records.iter().filter_map(|r| r.first_text(&[fields::STATE])))
}

/// Status values in first-seen order; records without one show as "Unknown".
pub fn distinct_statuses(records: &[Record]) -> Vec<String> {
    distinct(records.iter().map(|r| {
        r.first_text(STATUS_FIELDS)
            .unwrap_or_else(|| UNKNOWN.to_string())
    }))
}
