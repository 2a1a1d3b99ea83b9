//! Invocation-time selector constraints

use super::ids::{Category, DescriptorId, Month, Year};

/// Optional partial constraint applied conjunctively to a plan
///
/// A descriptor survives only if every present field equals the descriptor's
/// corresponding field. An empty selector matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selector {
    /// Restrict to one taxi category
    pub category: Option<Category>,
    /// Restrict to one year
    pub year: Option<Year>,
    /// Restrict to one month
    pub month: Option<Month>,
}

impl Selector {
    /// Create an empty selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the category constraint
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the year constraint
    pub fn with_year(mut self, year: Year) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the month constraint
    pub fn with_month(mut self, month: Month) -> Self {
        self.month = Some(month);
        self
    }

    /// True when no field is constrained
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.year.is_none() && self.month.is_none()
    }

    /// Check whether an identity satisfies every present constraint
    pub fn matches(&self, id: &DescriptorId) -> bool {
        self.category.map_or(true, |c| c == id.category)
            && self.year.map_or(true, |y| y == id.year)
            && self.month.map_or(true, |m| m == id.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(category: Category, year: i64, month: i64) -> DescriptorId {
        DescriptorId::new(
            category,
            Year::new(year).unwrap(),
            Month::new(month).unwrap(),
        )
    }

    #[test]
    fn test_empty_selector_matches_all() {
        let selector = Selector::new();
        assert!(selector.is_empty());
        assert!(selector.matches(&id(Category::Fhvhv, 2030, 12)));
    }

    #[test]
    fn test_fields_are_conjunctive() {
        let selector = Selector::new()
            .with_category(Category::Yellow)
            .with_month(Month::new(2).unwrap());

        assert!(!selector.is_empty());
        assert!(selector.matches(&id(Category::Yellow, 2019, 2)));
        assert!(selector.matches(&id(Category::Yellow, 2020, 2)));
        assert!(!selector.matches(&id(Category::Green, 2019, 2)));
        assert!(!selector.matches(&id(Category::Yellow, 2019, 1)));
    }
}
