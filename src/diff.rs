//! Pure comparison functions over column lists and value-count maps

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A distinct column value rendered as text. NULL is its own key and sorts
/// before every text value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ValueKey {
    Null,
    Text(String),
}

impl ValueKey {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl From<Option<String>> for ValueKey {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => Self::Text(text),
            None => Self::Null,
        }
    }
}

impl From<ValueKey> for Option<String> {
    fn from(key: ValueKey) -> Self {
        match key {
            ValueKey::Null => None,
            ValueKey::Text(text) => Some(text),
        }
    }
}

impl From<&str> for ValueKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Text is quoted so the literal string "NULL" never reads as a null
            Self::Null => write!(f, "NULL"),
            Self::Text(text) => write!(f, "{:?}", text),
        }
    }
}

/// Occurrence count per distinct value for one column of one table
pub type ValueCounts = BTreeMap<ValueKey, u64>;

/// Result of comparing two post-exclusion column lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSetDiff {
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
    /// Columns in both tables, in table A's order
    pub common: Vec<String>,
}

impl ColumnSetDiff {
    pub fn has_differences(&self) -> bool {
        !self.only_in_a.is_empty() || !self.only_in_b.is_empty()
    }
}

/// A value present on both sides with different occurrence counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMismatch {
    pub value: ValueKey,
    pub count_a: u64,
    pub count_b: u64,
}

/// Result of comparing two value-count maps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCountDiff {
    pub missing_in_b: BTreeSet<ValueKey>,
    pub missing_in_a: BTreeSet<ValueKey>,
    pub count_mismatches: Vec<CountMismatch>,
}

impl ValueCountDiff {
    pub fn has_differences(&self) -> bool {
        !self.missing_in_a.is_empty()
            || !self.missing_in_b.is_empty()
            || !self.count_mismatches.is_empty()
    }

    pub fn total_differences(&self) -> usize {
        self.missing_in_a.len() + self.missing_in_b.len() + self.count_mismatches.len()
    }
}

/// Drop excluded names (exact, case-sensitive) keeping declaration order
pub fn exclude_columns<S: AsRef<str>>(columns: Vec<String>, excluded: &[S]) -> Vec<String> {
    let excluded: IndexSet<&str> = excluded.iter().map(AsRef::as_ref).collect();
    columns
        .into_iter()
        .filter(|c| !excluded.contains(c.as_str()))
        .collect()
}

/// Compare two column lists.
///
/// `only_in_a` and `only_in_b` are sorted; `common` follows table A's
/// ordinal order restricted to columns that table B also has.
pub fn diff_column_sets(cols_a: &[String], cols_b: &[String]) -> ColumnSetDiff {
    let set_a: IndexSet<&str> = cols_a.iter().map(String::as_str).collect();
    let set_b: IndexSet<&str> = cols_b.iter().map(String::as_str).collect();

    let mut only_in_a: Vec<String> = set_a
        .iter()
        .filter(|c| !set_b.contains(*c))
        .map(|c| c.to_string())
        .collect();
    let mut only_in_b: Vec<String> = set_b
        .iter()
        .filter(|c| !set_a.contains(*c))
        .map(|c| c.to_string())
        .collect();
    only_in_a.sort();
    only_in_b.sort();

    let common = set_a
        .iter()
        .filter(|c| set_b.contains(*c))
        .map(|c| c.to_string())
        .collect();

    ColumnSetDiff {
        only_in_a,
        only_in_b,
        common,
    }
}

/// Compare two value-count maps by key presence and per-key count
pub fn diff_value_counts(map_a: &ValueCounts, map_b: &ValueCounts) -> ValueCountDiff {
    let missing_in_b = map_a
        .keys()
        .filter(|k| !map_b.contains_key(*k))
        .cloned()
        .collect();
    let missing_in_a = map_b
        .keys()
        .filter(|k| !map_a.contains_key(*k))
        .cloned()
        .collect();

    // BTreeMap iteration keeps mismatches in key order
    let count_mismatches = map_a
        .iter()
        .filter_map(|(value, &count_a)| match map_b.get(value) {
            Some(&count_b) if count_b != count_a => Some(CountMismatch {
                value: value.clone(),
                count_a,
                count_b,
            }),
            _ => None,
        })
        .collect();

    ValueCountDiff {
        missing_in_b,
        missing_in_a,
        count_mismatches,
    }
}
