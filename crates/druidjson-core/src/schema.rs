// SPDX-License-Identifier: MIT OR Apache-2.0
//! Table schema fixed from the first record of a result file.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Set of column names that should be coerced to numbers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct MetricSet(AHashSet<String>);

impl MetricSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a comma separated list such as `"clicks, cost"`
    ///
    /// Entries are trimmed; empty entries are ignored.
    #[must_use]
    pub fn parse_list(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether `name` is a metric
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Number of metric names
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MetricSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for MetricSet {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<MetricSet> for Vec<String> {
    fn from(set: MetricSet) -> Self {
        let mut names: Self = set.0.into_iter().collect();
        names.sort_unstable();
        names
    }
}

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    /// Raw text
    Text,
    /// Metric column coerced to `f64`
    Real,
}

/// One column of a [`TableSchema`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (the flattened field label)
    pub name: String,
    /// Whether values are coerced to numbers
    pub metric: bool,
}

impl Column {
    /// Declared column type
    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        if self.metric {
            ColumnType::Real
        } else {
            ColumnType::Text
        }
    }
}

/// Immutable, ordered column list discovered from record 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    columns: Vec<Column>,
}

impl TableSchema {
    /// Build a schema from ordered labels, marking those in `metrics`
    pub fn from_labels<I, S>(labels: I, metrics: &MetricSet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = labels
            .into_iter()
            .map(|label| {
                let name = label.into();
                let metric = metrics.contains(&name);
                Column { name, metric }
            })
            .collect();
        Self { columns }
    }

    /// Wrap in an `Arc` for sharing between cursors
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column at `index`
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Name of the column at `index`
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.name.as_str())
    }

    /// Whether the column at `index` is a metric column
    #[must_use]
    pub fn is_metric(&self, index: usize) -> bool {
        self.columns.get(index).is_some_and(|c| c.metric)
    }

    /// Position of the column called `name`
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Iterate columns in order
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// `(name, is_numeric)` pairs in column order
    pub fn describe(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.columns.iter().map(|c| (c.name.as_str(), c.metric))
    }
}

impl<'a> IntoIterator for &'a TableSchema {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
