//! Categorical variables with explicit level ordering
//!
//! Levels are the distinct values in sorted (lexicographic) order. The
//! reference level used for dummy coding is the first level unless the
//! caller names another one with [`Factor::with_reference`].

use std::collections::BTreeMap;

use crate::errors::{StatsError, StatsResult};

/// A categorical variable: sorted levels plus one level code per observation
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    levels: Vec<String>,
    codes: Vec<usize>,
    reference: usize,
}

impl Factor {
    /// Build a factor from raw category labels
    pub fn new<S: AsRef<str>>(values: &[S]) -> Self {
        let mut index: BTreeMap<&str, usize> = BTreeMap::new();
        for v in values {
            index.entry(v.as_ref()).or_insert(0);
        }
        for (code, slot) in index.values_mut().enumerate() {
            *slot = code;
        }

        let codes = values.iter().map(|v| index[v.as_ref()]).collect();
        let levels = index.keys().map(|k| k.to_string()).collect();

        Self {
            levels,
            codes,
            reference: 0,
        }
    }

    /// Use `level` as the reference level for dummy coding
    pub fn with_reference(mut self, level: &str) -> StatsResult<Self> {
        match self.levels.iter().position(|l| l == level) {
            Some(idx) => {
                self.reference = idx;
                Ok(self)
            }
            None => Err(StatsError::InvalidParameter {
                op: "factor",
                reason: format!(
                    "reference level '{}' not among levels {:?}",
                    level, self.levels
                ),
            }),
        }
    }

    /// Levels in sorted order
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Level code of each observation
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Index of the reference level
    pub fn reference(&self) -> usize {
        self.reference
    }

    pub fn reference_level(&self) -> &str {
        &self.levels[self.reference]
    }

    /// Level indices other than the reference, in level order
    pub fn contrast_levels(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.levels.len()).filter(move |&l| l != self.reference)
    }

    /// Number of observations per level
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.levels.len()];
        for &c in &self.codes {
            counts[c] += 1;
        }
        counts
    }

    /// Split `values` into one vector per level (in level order)
    pub fn split(&self, values: &[f64]) -> Vec<Vec<f64>> {
        let mut groups = vec![Vec::new(); self.levels.len()];
        for (&c, &v) in self.codes.iter().zip(values) {
            groups[c].push(v);
        }
        groups
    }
}
