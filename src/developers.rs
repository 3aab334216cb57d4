// src/developers.rs

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::aggregate::{top_n, DeveloperStats, Grouped};

/// Developers flagged for business-development focus.
pub static HIGH_PRIORITY_DEVELOPERS: &[&str] = &[
    "ACME Cleantech Solutions Private Limited",
    "NTPC Group",
    "Greenko Energies Private Limited",
    "Greenko Energy",
    "Greenko Group",
    "JSW Energy Limited",
    "ReNew Power",
    "Tata Power",
    "Azure Power",
    "Avaada Energy Private Limited",
    "Hero Future Energies",
    "Ayana Renewable Power",
    "SB Energy",
];

/// Registered name → short label, checked in this order.
pub static DEVELOPER_DISPLAY_NAMES: &[(&str, &str)] = &[
    ("ACME Cleantech Solutions Private Limited", "ACME Cleantech"),
    ("Greenko Energies Private Limited", "Greenko Energies"),
    ("Greenko Energy", "Greenko Energy"),
    ("Greenko Group", "Greenko Group"),
    ("Avaada Energy Private Limited", "Avaada Energy"),
    ("ReNew Power Private Limited", "ReNew Power"),
    ("Hero Future Energies Private Limited", "Hero Future Energies"),
    ("Ayana Renewable Power Private Limited", "Ayana Renewable Power"),
];

const GREENKO: &str = "greenko";
const GREENKO_LABEL: &str = "Greenko";

static PRIORITY_LOWER: Lazy<Vec<String>> = Lazy::new(|| {
    HIGH_PRIORITY_DEVELOPERS
        .iter()
        .map(|d| d.to_lowercase())
        .collect()
});

static DISPLAY_LOOKUP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| DEVELOPER_DISPLAY_NAMES.iter().copied().collect());

/// Whether `developer` belongs to the priority list.
///
/// Any Greenko variant matches. Otherwise a name matches when it contains a
/// listed name or is contained in one, ignoring case.
pub fn is_high_priority(developer: &str) -> bool {
    let name = developer.trim().to_lowercase();
    if name.is_empty() {
        return false;
    }
    if name.contains(GREENKO) {
        return true;
    }
    PRIORITY_LOWER
        .iter()
        .any(|p| name.contains(p.as_str()) || p.contains(name.as_str()))
}

/// Short label for charts and cards.
pub fn display_name(developer: &str) -> String {
    if developer.is_empty() {
        return String::new();
    }
    if developer.to_lowercase().contains(GREENKO) {
        return GREENKO_LABEL.to_string();
    }
    if let Some(short) = DISPLAY_LOOKUP.get(developer.trim()) {
        return short.to_string();
    }
    if let Some((_, short)) = DEVELOPER_DISPLAY_NAMES
        .iter()
        .find(|(full, _)| developer.contains(full))
    {
        return short.to_string();
    }

    developer
        .replacen("Private Limited", "", 1)
        .replacen("Limited", "", 1)
        .replacen("Energy Private", "Energy", 1)
        .trim()
        .to_string()
}

/// A developer row as shown in the developer view.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DeveloperEntry {
    pub name: String,
    pub display_name: String,
    pub high_priority: bool,
    pub stats: DeveloperStats,
}

/// Filter a developer rollup by a case-insensitive name search and,
/// optionally, the priority list; sorted by total value, highest first.
pub fn filter_developers(
    rollup: &Grouped<DeveloperStats>,
    query: &str,
    high_priority_only: bool,
) -> Vec<DeveloperEntry> {
    let query = query.to_lowercase();
    let matching: Vec<DeveloperEntry> = rollup
        .iter()
        .filter(|(name, _)| name.to_lowercase().contains(&query))
        .filter(|(name, _)| !high_priority_only || is_high_priority(name))
        .map(|(name, stats)| DeveloperEntry {
            name: name.to_string(),
            display_name: display_name(name),
            high_priority: is_high_priority(name),
            stats: stats.clone(),
        })
        .collect();
    let len = matching.len();
    top_n(matching, len, |e| e.stats.total_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::by_developer;
    use crate::record::{fields, Record};

    #[test]
    fn greenko_is_always_high_priority() {
        assert!(is_high_priority("Greenko Energies Private Limited"));
        assert!(is_high_priority("GREENKO hydro"));
        assert_eq!(display_name("Greenko Energies Private Limited"), "Greenko");
        assert_eq!(display_name("greenko group"), "Greenko");
    }

    #[test]
    fn unknown_developer_is_not_high_priority() {
        assert!(!is_high_priority("Unknown Developer LLC"));
        assert!(!is_high_priority(""));
        assert!(!is_high_priority("   "));
    }

    #[test]
    fn matches_in_both_directions_ignoring_case() {
        assert!(is_high_priority("tata power renewable energy ltd"));
        assert!(is_high_priority("Tata"));
        assert!(is_high_priority("ntpc group"));
        assert!(!is_high_priority("Adani Green"));
    }

    #[test]
    fn display_name_uses_table_then_suffix_stripping() {
        assert_eq!(
            display_name("ACME Cleantech Solutions Private Limited"),
            "ACME Cleantech"
        );
        assert_eq!(
            display_name("Hero Future Energies Private Limited (Unit 2)"),
            "Hero Future Energies"
        );
        assert_eq!(display_name("JSW Energy Limited"), "JSW Energy");
        assert_eq!(display_name("Torrent Power Private Limited"), "Torrent Power");
        assert_eq!(display_name("NHAI"), "NHAI");
        assert_eq!(display_name(""), "");
    }

    fn project(dev: &str, value: &str) -> Record {
        Record::new()
            .with(fields::DEVELOPER, dev)
            .with(fields::IIG_VALUE, value)
    }

    #[test]
    fn filter_sorts_by_value_and_applies_priority() {
        let records = vec![
            project("Tata Power", "100"),
            project("Local Builders", "900"),
            project("SB Energy", "400"),
            project("Tata Power", "50"),
        ];
        let rollup = by_developer(&records);

        let all: Vec<String> = filter_developers(&rollup, "", false)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(all, vec!["Local Builders", "SB Energy", "Tata Power"]);

        let priority = filter_developers(&rollup, "", true);
        assert_eq!(priority.len(), 2);
        assert!(priority.iter().all(|e| e.high_priority));

        let search = filter_developers(&rollup, "tata", false);
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].stats.total_value, 150.0);
    }
}
