// src/report.rs
//
// Chart-ready views built from loaded datasets. Each view is what one
// dashboard page renders; the CLI prints them.

use serde::Serialize;

use crate::aggregate::{self, DatasetSummary, Series};
use crate::config::TopConfig;
use crate::developers::{filter_developers, DeveloperEntry};
use crate::projects::{distinct_states, distinct_statuses, filter_projects, ProjectFilter};
use crate::record::{DatasetKind, Datasets, Record};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub summary: DatasetSummary,
    pub description: &'static str,
    pub states: Series,
    pub statuses: Series,
    pub sectors: Series,
    pub top_developers: Series,
    pub value_ranges: Series,
}

impl DashboardView {
    pub fn build(data: &Datasets, kind: DatasetKind, top: &TopConfig) -> Self {
        let records = data.get(kind);
        let value_field = kind.value_field();

        Self {
            summary: aggregate::dataset_summary(records, kind),
            description: kind.description(),
            states: Series::from_counts(
                format!("{} Projects", kind),
                aggregate::state_project_counts(records, top.states),
            ),
            statuses: Series::from_counts(
                "Project Status",
                aggregate::by_status(records).iter().map(|(k, c)| (k, *c)),
            ),
            sectors: Series::from_counts("Sectors", aggregate::by_sector(records, top.sectors)),
            top_developers: Series::from_pairs(
                "Total Value (USD Million)",
                aggregate::top_developers_by_value(
                    records,
                    value_field,
                    kind.developer_fields(),
                    top.developers,
                ),
            ),
            value_ranges: Series::from_counts(
                "Project Value Ranges",
                aggregate::value_ranges(records, value_field),
            ),
        }
    }

    pub fn series(&self) -> Vec<&Series> {
        vec![
            &self.states,
            &self.statuses,
            &self.sectors,
            &self.top_developers,
            &self.value_ranges,
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DevelopersView {
    pub total: usize,
    pub developers: Vec<DeveloperEntry>,
}

impl DevelopersView {
    /// Merged ETIM + IIG developer rollup, filtered and sorted by value.
    pub fn build(data: &Datasets, query: &str, high_priority_only: bool, limit: usize) -> Self {
        let rollup = aggregate::by_developer(data.merged());
        let mut developers = filter_developers(&rollup, query, high_priority_only);
        let total = developers.len();
        developers.truncate(limit);
        Self { total, developers }
    }
}

pub const DEFAULT_PER_PAGE: usize = 10;

/// One page of the filtered project table plus the selector options.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectsView {
    pub dataset: DatasetKind,
    /// Matching projects across all pages.
    pub total: usize,
    /// Zero-based page index.
    pub page: usize,
    pub per_page: usize,
    pub states: Vec<String>,
    pub statuses: Vec<String>,
    pub projects: Vec<Record>,
}

impl ProjectsView {
    /// A page past the end yields no projects but still reports `total`.
    pub fn build(
        data: &Datasets,
        kind: DatasetKind,
        filter: &ProjectFilter,
        page: usize,
        per_page: usize,
    ) -> Self {
        let records = data.get(kind);
        let matching = filter_projects(records, kind, filter);
        let per_page = per_page.max(1);
        let projects = matching
            .iter()
            .skip(page.saturating_mul(per_page))
            .take(per_page)
            .map(|r| (*r).clone())
            .collect();

        Self {
            dataset: kind,
            total: matching.len(),
            page,
            per_page,
            states: distinct_states(records),
            statuses: distinct_statuses(records),
            projects,
        }
    }

    pub fn page_count(&self) -> usize {
        (self.total + self.per_page - 1) / self.per_page
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareView {
    pub etim_summary: DatasetSummary,
    pub iig_summary: DatasetSummary,
    pub etim_states: Series,
    pub iig_states: Series,
    pub etim_sectors: Series,
    pub iig_sectors: Series,
    pub etim_statuses: Series,
    pub iig_statuses: Series,
}

impl CompareView {
    pub fn build(data: &Datasets, top: &TopConfig) -> Self {
        let etim: &[Record] = &data.etim_data;
        let iig: &[Record] = &data.iig_data;

        let comparison = aggregate::compare_states(
            &aggregate::by_state(etim, DatasetKind::Etim.value_field()),
            &aggregate::by_state(iig, DatasetKind::Iig.value_field()),
            top.states,
        );
        let state_series = |title: &str, counts: &[usize]| {
            Series::from_counts(
                title,
                comparison.labels.iter().cloned().zip(counts.iter().copied()),
            )
        };
        let statuses = |title: &str, records: &[Record]| {
            Series::from_counts(
                title,
                aggregate::by_status(records).iter().map(|(k, c)| (k, *c)),
            )
        };

        Self {
            etim_summary: aggregate::dataset_summary(etim, DatasetKind::Etim),
            iig_summary: aggregate::dataset_summary(iig, DatasetKind::Iig),
            etim_states: state_series("ETIM Projects", &comparison.etim_counts[..]),
            iig_states: state_series("IIG Projects", &comparison.iig_counts[..]),
            etim_sectors: Series::from_counts("ETIM Sectors", aggregate::by_sector(etim, top.sectors)),
            iig_sectors: Series::from_counts("IIG Sectors", aggregate::by_sector(iig, top.sectors)),
            etim_statuses: statuses("ETIM Status", etim),
            iig_statuses: statuses("IIG Status", iig),
        }
    }

    pub fn series(&self) -> Vec<&Series> {
        vec![
            &self.etim_states,
            &self.iig_states,
            &self.etim_sectors,
            &self.iig_sectors,
            &self.etim_statuses,
            &self.iig_statuses,
        ]
    }
}
