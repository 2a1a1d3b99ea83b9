//! Validated dataset groups
//!
//! A [`DatasetGroup`] is one cartesian axis of a download configuration. The
//! raw, possibly invalid form lives in the configuration schema; this type only
//! exists once every element has been checked.

use super::ids::{Category, DescriptorId, Month, Year};

/// Validated `{taxi_types, years, months}` axis
///
/// Each set keeps the declaration order of its first occurrences so that
/// expansion is reproducible for identical input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetGroup {
    taxi_types: Vec<Category>,
    years: Vec<Year>,
    months: Vec<Month>,
}

impl DatasetGroup {
    /// Create a group; repeated elements within a set are dropped
    ///
    /// # Returns
    ///
    /// Returns `Err` naming the first empty axis
    pub fn new(
        taxi_types: impl IntoIterator<Item = Category>,
        years: impl IntoIterator<Item = Year>,
        months: impl IntoIterator<Item = Month>,
    ) -> Result<Self, String> {
        let taxi_types = dedup_ordered(taxi_types);
        let years = dedup_ordered(years);
        let months = dedup_ordered(months);

        if taxi_types.is_empty() {
            return Err("taxi_types cannot be empty".to_string());
        }
        if years.is_empty() {
            return Err("years cannot be empty".to_string());
        }
        if months.is_empty() {
            return Err("months cannot be empty".to_string());
        }

        Ok(Self {
            taxi_types,
            years,
            months,
        })
    }

    /// Categories in declaration order
    pub fn taxi_types(&self) -> &[Category] {
        &self.taxi_types
    }

    /// Years in declaration order
    pub fn years(&self) -> &[Year] {
        &self.years
    }

    /// Months in declaration order
    pub fn months(&self) -> &[Month] {
        &self.months
    }

    /// Number of identities this group produces on its own
    pub fn len(&self) -> usize {
        self.taxi_types.len() * self.years.len() * self.months.len()
    }

    /// A validated group is never empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product in (category, year, month) nesting order
    pub fn identities(&self) -> impl Iterator<Item = DescriptorId> + '_ {
        self.taxi_types.iter().flat_map(move |&category| {
            self.years.iter().flat_map(move |&year| {
                self.months
                    .iter()
                    .map(move |&month| DescriptorId::new(category, year, month))
            })
        })
    }
}

fn dedup_ordered<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
