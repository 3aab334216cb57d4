// src/record.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::process::utils::parse_number;

/// Field names used by the two project datasets.
pub mod fields {
    pub const STATE: &str = "State";
    pub const DEVELOPER: &str = "Developer";

    // ETIM (Energy Transition Investment Monitor)
    pub const ETIM_VALUE: &str = "Investment (USD Million)";
    pub const ETIM_DEVELOPER: &str = "Developersorted ascending";
    pub const ETIM_SOURCE: &str = "source";
    pub const ETIM_STATUS: &str = "Status";
    pub const ETIM_PROJECT: &str = "Project";

    // IIG (India Investment Grid)
    pub const IIG_VALUE: &str = "Total Project Cost (USD mn)";
    pub const IIG_SECTOR: &str = "Sector";
    pub const IIG_STATUS: &str = "Project Status";
    pub const IIG_PROJECT: &str = "Project Title";

    /// Developer lookup chain shared by both datasets.
    pub const DEVELOPER_CHAIN: &[&str] = &[ETIM_DEVELOPER, DEVELOPER];
    /// Value lookup chain used when a view spans both datasets.
    pub const VALUE_CHAIN: &[&str] = &[ETIM_VALUE, IIG_VALUE];
    /// Sector lookup chain used when a view spans both datasets.
    pub const SECTOR_CHAIN: &[&str] = &[ETIM_SOURCE, IIG_SECTOR];
    /// Status lookup chain.
    pub const STATUS_CHAIN: &[&str] = &[IIG_STATUS, ETIM_STATUS];
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
    #[default]
    Empty,
}

impl Value {
    /// True for `Empty` and for empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::Number(_) => false,
            Value::Empty => true,
        }
    }

    /// Numeric view of the value; text goes through the shared coercion.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Text(s) => parse_number(s),
            Value::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Empty => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// One parsed data row: field name → value.
///
/// The field set is whatever the header of the source file declared, so
/// access goes through string keys with explicit fallback chains.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style insert, handy for literal records.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Text of `key`, or `""` when absent. Numbers are rendered.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(Value::to_string).unwrap_or_default()
    }

    /// Text of the first key in `keys` with a non-blank value.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.is_blank())
            .map(Value::to_string)
    }

    /// Coerced number for `key`; `None` when absent or not numeric.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_number)
    }

    /// Number for `key`, with missing and malformed values counting as zero.
    pub fn number_or_zero(&self, key: &str) -> f64 {
        self.number(key).unwrap_or(0.0)
    }

    /// First key in `keys` that coerces to a non-zero number, else zero.
    pub fn first_number(&self, keys: &[&str]) -> f64 {
        keys.iter()
            .filter_map(|k| self.number(k))
            .find(|n| *n != 0.0)
            .unwrap_or(0.0)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut rec = Record::new();
        for (k, v) in iter {
            rec.insert(k, v);
        }
        rec
    }
}

/// Which of the two project datasets a collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Etim,
    Iig,
}

impl DatasetKind {
    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Etim => "ETIM",
            DatasetKind::Iig => "IIG",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DatasetKind::Etim => "Energy Transition Investment Monitor by CII and EY",
            DatasetKind::Iig => "India Investment Grid by Government of India",
        }
    }

    pub fn value_field(&self) -> &'static str {
        match self {
            DatasetKind::Etim => fields::ETIM_VALUE,
            DatasetKind::Iig => fields::IIG_VALUE,
        }
    }

    /// Developer columns to try, in order.
    pub fn developer_fields(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Etim => fields::DEVELOPER_CHAIN,
            DatasetKind::Iig => &[fields::DEVELOPER],
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two record collections a dashboard view works from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datasets {
    pub etim_data: Vec<Record>,
    pub iig_data: Vec<Record>,
}

impl Datasets {
    pub fn get(&self, kind: DatasetKind) -> &[Record] {
        match kind {
            DatasetKind::Etim => &self.etim_data,
            DatasetKind::Iig => &self.iig_data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.etim_data.is_empty() && self.iig_data.is_empty()
    }

    /// Both collections back to back, ETIM first.
    pub fn merged(&self) -> impl Iterator<Item = &Record> {
        self.etim_data.iter().chain(self.iig_data.iter())
    }
}
