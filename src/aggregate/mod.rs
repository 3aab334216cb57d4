// src/aggregate/mod.rs
//
// Grouping and rollups over parsed records. Everything here is a pure
// function over a record slice: one pass, no mutation of the input, and
// missing or malformed fields fall back to zero / "Unknown".

use serde::Serialize;
use std::collections::HashSet;

use crate::record::{fields, DatasetKind, Record};

pub mod group;
pub mod series;

pub use group::{top_n, Grouped};
pub use series::Series;

pub const UNKNOWN: &str = "Unknown";
pub const NO_STATUS_DATA: &str = "No Status Data";
pub const NO_SECTOR_DATA: &str = "No Sector Data";
pub const NO_DEVELOPER_DATA: &str = "No Developer Data";

pub const TOP_STATES: usize = 10;
pub const TOP_SECTORS: usize = 8;
pub const TOP_DEVELOPERS: usize = 7;

/// Projects above this value (USD million) count as large.
pub const LARGE_PROJECT_THRESHOLD: f64 = 500.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StateStats {
    pub count: usize,
    pub total_value: f64,
}

/// Per-developer rollup. `states` and `sectors` hold distinct values in
/// first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeveloperStats {
    pub project_count: usize,
    pub states: Vec<String>,
    pub sectors: Vec<String>,
    pub total_value: f64,
}

impl DeveloperStats {
    fn add_distinct(set: &mut Vec<String>, value: String) {
        if !set.contains(&value) {
            set.push(value);
        }
    }
}

/// Headline numbers for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub dataset: DatasetKind,
    pub total_projects: usize,
    pub total_value: f64,
    pub large_projects: usize,
    pub unique_developers: usize,
}

/// State labels shared by both datasets with one count series per dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateComparison {
    pub labels: Vec<String>,
    pub etim_counts: Vec<usize>,
    pub iig_counts: Vec<usize>,
}

fn state_of(record: &Record) -> Option<String> {
    record
        .first_text(&[fields::STATE])
        .filter(|s| !s.trim().is_empty())
}

/// Sum of `field` over all records; blanks and garbage count as zero.
pub fn sum_field(records: &[Record], field: &str) -> f64 {
    records.iter().map(|r| r.number_or_zero(field)).sum()
}

/// Count and value total per `State`.
///
/// Records without a state are left out entirely rather than bucketed
/// under "Unknown".
pub fn by_state(records: &[Record], value_field: &str) -> Grouped<StateStats> {
    let mut out: Grouped<StateStats> = Grouped::new();
    for record in records {
        let Some(state) = state_of(record) else {
            continue;
        };
        let bucket = out.entry(&state);
        bucket.count += 1;
        bucket.total_value += record.number_or_zero(value_field);
    }
    out
}

/// Top `n` states by project count, for the state bar chart.
pub fn state_project_counts(records: &[Record], n: usize) -> Vec<(String, usize)> {
    let mut counts: Grouped<usize> = Grouped::new();
    for state in records.iter().filter_map(state_of) {
        *counts.entry(&state) += 1;
    }
    top_n(counts.into_entries(), n, |(_, c)| *c as f64)
}

/// Which sector-like column the dataset uses, decided from its first record.
pub fn sector_field(records: &[Record]) -> &'static str {
    match records.first() {
        Some(first) if first.contains_key(fields::ETIM_SOURCE) => fields::ETIM_SOURCE,
        _ => fields::IIG_SECTOR,
    }
}

/// Project count per sector (IIG) or source (ETIM), top `n` by count.
///
/// Empty input yields a single placeholder bucket.
pub fn by_sector(records: &[Record], n: usize) -> Vec<(String, usize)> {
    if records.is_empty() {
        return vec![(NO_SECTOR_DATA.to_string(), 1)];
    }
    let field = sector_field(records);
    let mut counts: Grouped<usize> = Grouped::new();
    for record in records {
        let sector = record
            .first_text(&[field])
            .unwrap_or_else(|| UNKNOWN.to_string());
        *counts.entry(&sector) += 1;
    }
    top_n(counts.into_entries(), n, |(_, c)| *c as f64)
}

/// Project count per status, in first-seen order.
///
/// Empty input yields a single placeholder bucket so a chart always has
/// at least one slice.
pub fn by_status(records: &[Record]) -> Grouped<usize> {
    let mut counts: Grouped<usize> = Grouped::new();
    for record in records {
        let status = record
            .first_text(fields::STATUS_CHAIN)
            .unwrap_or_else(|| UNKNOWN.to_string());
        *counts.entry(&status) += 1;
    }
    if counts.is_empty() {
        *counts.entry(NO_STATUS_DATA) = 1;
    }
    counts
}

/// Rollup per developer across one or both datasets.
///
/// The developer key is the ETIM developer column, else `Developer`; records
/// with neither are skipped. Values come from whichever dataset value column
/// holds a non-zero number. Sorting is left to the caller.
pub fn by_developer<'a, I>(records: I) -> Grouped<DeveloperStats>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out: Grouped<DeveloperStats> = Grouped::new();
    for record in records {
        let Some(developer) = record.first_text(fields::DEVELOPER_CHAIN) else {
            continue;
        };
        let stats = out.entry(&developer);
        stats.project_count += 1;
        if let Some(state) = state_of(record) {
            DeveloperStats::add_distinct(&mut stats.states, state);
        }
        let sector = record
            .first_text(fields::SECTOR_CHAIN)
            .unwrap_or_else(|| UNKNOWN.to_string());
        DeveloperStats::add_distinct(&mut stats.sectors, sector);
        stats.total_value += record.first_number(fields::VALUE_CHAIN);
    }
    out
}

/// Value total per developer for one dataset, top `n` by value.
///
/// A blank or missing value counts as zero and keeps the developer listed;
/// text that does not parse as a number is ignored. With no qualifying
/// records the result is a single zero-valued placeholder.
pub fn top_developers_by_value(
    records: &[Record],
    value_field: &str,
    developer_fields: &[&str],
    n: usize,
) -> Vec<(String, f64)> {
    let mut totals: Grouped<f64> = Grouped::new();
    for record in records {
        let Some(developer) = record.first_text(developer_fields) else {
            continue;
        };
        let value = match record.get(value_field) {
            Some(v) if !v.is_blank() => v.as_number(),
            _ => Some(0.0),
        };
        if let Some(value) = value {
            *totals.entry(&developer) += value;
        }
    }
    if totals.is_empty() {
        return vec![(NO_DEVELOPER_DATA.to_string(), 0.0)];
    }
    top_n(totals.into_entries(), n, |(_, v)| *v)
}

/// Project counts in four value bands (USD million).
pub fn value_ranges(records: &[Record], value_field: &str) -> Vec<(&'static str, usize)> {
    let mut ranges = [
        ("Under 100M", 0),
        ("100M-300M", 0),
        ("300M-500M", 0),
        ("Over 500M", 0),
    ];
    for record in records {
        let value = record.number_or_zero(value_field);
        let band = if value < 100.0 {
            0
        } else if value < 300.0 {
            1
        } else if value < 500.0 {
            2
        } else {
            3
        };
        ranges[band].1 += 1;
    }
    ranges.to_vec()
}

pub fn dataset_summary(records: &[Record], kind: DatasetKind) -> DatasetSummary {
    let value_field = kind.value_field();
    let developer_fields = kind.developer_fields();

    let mut total_value = 0.0;
    let mut large_projects = 0;
    let mut developers = HashSet::new();
    for record in records {
        let value = record.number_or_zero(value_field);
        total_value += value;
        if value > LARGE_PROJECT_THRESHOLD {
            large_projects += 1;
        }
        if let Some(dev) = record.first_text(developer_fields) {
            developers.insert(dev);
        }
    }

    DatasetSummary {
        dataset: kind,
        total_projects: records.len(),
        total_value,
        large_projects,
        unique_developers: developers.len(),
    }
}

/// Union of each side's top-10 states by count (ETIM first), cut to `n`,
/// with a count per side for every label.
pub fn compare_states(
    etim: &Grouped<StateStats>,
    iig: &Grouped<StateStats>,
    n: usize,
) -> StateComparison {
    let mut labels: Vec<String> = Vec::new();
    for side in [etim, iig] {
        for (state, _) in side.top_by(TOP_STATES, |s| s.count as f64) {
            if !labels.iter().any(|l| l == state) {
                labels.push(state.to_string());
            }
        }
    }
    labels.truncate(n);

    let count = |side: &Grouped<StateStats>, state: &str| side.get(state).map_or(0, |s| s.count);
    StateComparison {
        etim_counts: labels.iter().map(|s| count(etim, s.as_str())).collect(),
        iig_counts: labels.iter().map(|s| count(iig, s.as_str())).collect(),
        labels,
    }
}

/// Number of records whose developer contains `needle`.
///
/// Case-sensitive on purpose, unlike the priority matching in `developers`:
/// the Greenko integrity count relies on it.
pub fn count_matching_developer(records: &[Record], needle: &str) -> usize {
    records
        .iter()
        .filter_map(|r| r.first_text(fields::DEVELOPER_CHAIN))
        .filter(|dev| dev.contains(needle))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fields::*;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn by_state_skips_blank_states() {
        let records = vec![
            rec(&[("State", "Gujarat"), ("Value", "100")]),
            rec(&[("State", "Gujarat"), ("Value", "200")]),
            rec(&[("State", ""), ("Value", "50")]),
        ];
        let out = by_state(&records, "Value");
        assert_eq!(out.len(), 1);
        assert_eq!(
            out.get("Gujarat"),
            Some(&StateStats {
                count: 2,
                total_value: 300.0
            })
        );
    }

    #[test]
    fn by_state_counts_unparseable_values_as_zero() {
        let records = vec![
            rec(&[("State", "Karnataka"), ("Value", "1,500")]),
            rec(&[("State", "Karnataka"), ("Value", "TBD")]),
            rec(&[("State", "Karnataka")]),
        ];
        let out = by_state(&records, "Value");
        let ka = out.get("Karnataka").copied().unwrap_or_default();
        assert_eq!(ka.count, 3);
        assert_eq!(ka.total_value, 1500.0);
    }

    #[test]
    fn repeated_aggregation_is_identical() {
        let records = vec![
            rec(&[("State", "Gujarat"), ("Sector", "Railways"), ("Project Status", "Completed")]),
            rec(&[("State", "Rajasthan"), ("Sector", ""), ("Developer", "NHAI")]),
        ];
        assert_eq!(by_state(&records, IIG_VALUE), by_state(&records, IIG_VALUE));
        assert_eq!(by_sector(&records, 8), by_sector(&records, 8));
        assert_eq!(by_status(&records), by_status(&records));
        assert_eq!(by_developer(&records), by_developer(&records));
    }

    #[test]
    fn sector_field_is_chosen_from_first_record() {
        let records = vec![
            rec(&[("source", "solar")]),
            rec(&[("Sector", "Railways")]),
            rec(&[("source", "")]),
        ];
        let out = by_sector(&records, 8);
        assert_eq!(
            out,
            vec![("Unknown".to_string(), 2), ("solar".to_string(), 1)]
        );
    }

    #[test]
    fn by_sector_keeps_top_eight() {
        let mut records = Vec::new();
        for (i, name) in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"].iter().enumerate() {
            for _ in 0..=i {
                records.push(rec(&[("Sector", *name)]));
            }
        }
        let out = by_sector(&records, TOP_SECTORS);
        assert_eq!(out.len(), 8);
        assert_eq!(out[0], ("j".to_string(), 10));
        assert_eq!(out[7], ("c".to_string(), 3));
    }

    #[test]
    fn by_sector_empty_input_has_placeholder() {
        assert_eq!(by_sector(&[], 8), vec![(NO_SECTOR_DATA.to_string(), 1)]);
    }

    #[test]
    fn by_status_falls_back_and_defaults() {
        let records = vec![
            rec(&[("Project Status", "Completed")]),
            rec(&[("Status", "Operational")]),
            rec(&[("Project Status", "")]),
        ];
        let out = by_status(&records);
        assert_eq!(
            out.keys().collect::<Vec<_>>(),
            vec!["Completed", "Operational", "Unknown"]
        );
        assert!(out.iter().all(|(_, c)| *c == 1));
    }

    #[test]
    fn by_status_empty_input_has_placeholder() {
        let out = by_status(&[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(NO_STATUS_DATA), Some(&1));
    }

    #[test]
    fn by_developer_merges_both_datasets() {
        let etim = vec![
            rec(&[
                (ETIM_DEVELOPER, "Tata Power"),
                ("State", "Gujarat"),
                ("source", "solar"),
                (ETIM_VALUE, "250"),
            ]),
            rec(&[(ETIM_DEVELOPER, ""), ("State", "Gujarat")]),
        ];
        let iig = vec![
            rec(&[
                ("Developer", "Tata Power"),
                ("State", "Karnataka"),
                ("Sector", "Railways"),
                (IIG_VALUE, "1,000"),
            ]),
            rec(&[("Developer", "Tata Power"), ("State", "Gujarat")]),
        ];

        let out = by_developer(etim.iter().chain(iig.iter()));
        assert_eq!(out.len(), 1);
        let tata = out.get("Tata Power").cloned().unwrap_or_default();
        assert_eq!(tata.project_count, 3);
        assert_eq!(tata.states, vec!["Gujarat", "Karnataka"]);
        assert_eq!(tata.sectors, vec!["solar", "Railways", "Unknown"]);
        assert_eq!(tata.total_value, 1250.0);
    }

    #[test]
    fn top_developers_placeholder_when_empty() {
        let records = vec![rec(&[("Developer", "")])];
        assert_eq!(
            top_developers_by_value(&records, IIG_VALUE, &[DEVELOPER], 7),
            vec![(NO_DEVELOPER_DATA.to_string(), 0.0)]
        );
    }

    #[test]
    fn top_developers_keeps_blank_values_at_zero() {
        let records = vec![rec(&[(ETIM_DEVELOPER, "Tata Power"), (ETIM_VALUE, "")])];
        assert_eq!(
            top_developers_by_value(&records, ETIM_VALUE, &[ETIM_DEVELOPER], 7),
            vec![("Tata Power".to_string(), 0.0)]
        );

        let missing = vec![rec(&[(ETIM_DEVELOPER, "ReNew Power")])];
        assert_eq!(
            top_developers_by_value(&missing, ETIM_VALUE, &[ETIM_DEVELOPER], 7),
            vec![("ReNew Power".to_string(), 0.0)]
        );
    }

    #[test]
    fn top_developers_sorted_by_value() {
        let records = vec![
            rec(&[("Developer", "A"), (IIG_VALUE, "10")]),
            rec(&[("Developer", "B"), (IIG_VALUE, "30")]),
            rec(&[("Developer", "A"), (IIG_VALUE, "25")]),
            rec(&[("Developer", "C"), (IIG_VALUE, "n/a")]),
        ];
        assert_eq!(
            top_developers_by_value(&records, IIG_VALUE, &[DEVELOPER], 7),
            vec![("A".to_string(), 35.0), ("B".to_string(), 30.0)]
        );
    }

    #[test]
    fn value_bands() {
        let records: Vec<Record> = ["", "99.9", "100", "450", "500", "2,000"]
            .iter()
            .map(|v| rec(&[(ETIM_VALUE, *v)]))
            .collect();
        assert_eq!(
            value_ranges(&records, ETIM_VALUE),
            vec![
                ("Under 100M", 2),
                ("100M-300M", 1),
                ("300M-500M", 1),
                ("Over 500M", 2)
            ]
        );
    }

    #[test]
    fn summary_counts_large_projects_and_developers() {
        let records = vec![
            rec(&[(ETIM_DEVELOPER, "ACME"), (ETIM_VALUE, "600")]),
            rec(&[(ETIM_DEVELOPER, "ACME"), (ETIM_VALUE, "1,200")]),
            rec(&[(ETIM_DEVELOPER, "ReNew"), (ETIM_VALUE, "500")]),
            rec(&[(ETIM_DEVELOPER, ""), (ETIM_VALUE, "")]),
        ];
        let s = dataset_summary(&records, DatasetKind::Etim);
        assert_eq!(s.total_projects, 4);
        assert_eq!(s.total_value, 2300.0);
        assert_eq!(s.large_projects, 2);
        assert_eq!(s.unique_developers, 2);
    }

    #[test]
    fn state_comparison_unions_top_states() {
        let etim = vec![
            rec(&[("State", "Gujarat")]),
            rec(&[("State", "Gujarat")]),
            rec(&[("State", "Tamil Nadu")]),
        ];
        let iig = vec![rec(&[("State", "Kerala")]), rec(&[("State", "Gujarat")])];
        let cmp = compare_states(&by_state(&etim, ETIM_VALUE), &by_state(&iig, IIG_VALUE), 10);
        assert_eq!(cmp.labels, vec!["Gujarat", "Tamil Nadu", "Kerala"]);
        assert_eq!(cmp.etim_counts, vec![2, 1, 0]);
        assert_eq!(cmp.iig_counts, vec![1, 0, 1]);
    }

    #[test]
    fn state_counts_top_n() {
        let records = vec![
            rec(&[("State", "Punjab")]),
            rec(&[("State", "Haryana")]),
            rec(&[("State", "Haryana")]),
            rec(&[("State", "")]),
        ];
        assert_eq!(
            state_project_counts(&records, 1),
            vec![("Haryana".to_string(), 2)]
        );
    }

    #[test]
    fn matching_developer_count() {
        let records = vec![
            rec(&[(ETIM_DEVELOPER, "Greenko Energies Private Limited")]),
            rec(&[("Developer", "Greenko Group")]),
            rec(&[("Developer", "greenko lowercase")]),
        ];
        assert_eq!(count_matching_developer(&records, "Greenko"), 2);
    }
}
