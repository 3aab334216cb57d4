// src/aggregate/series.rs

use serde::Serialize;

/// Chart-ready data: parallel `labels` and `values` of equal length.
///
/// Fields are private so the only way to add a point is [`Series::push`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    title: String,
    labels: Vec<String>,
    values: Vec<f64>,
}

impl Series {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.labels.push(label.into());
        self.values.push(value);
    }

    /// Build from `(label, value)` pairs, keeping their order.
    pub fn from_pairs<L, V, I>(title: impl Into<String>, pairs: I) -> Self
    where
        L: Into<String>,
        V: Into<f64>,
        I: IntoIterator<Item = (L, V)>,
    {
        let mut series = Self::new(title);
        for (label, value) in pairs {
            series.push(label, value.into());
        }
        series
    }

    /// Build from `(label, count)` pairs.
    pub fn from_counts<L, I>(title: impl Into<String>, pairs: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, usize)>,
    {
        let mut series = Self::new(title);
        for (label, count) in pairs {
            series.push(label, count as f64);
        }
        series
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
