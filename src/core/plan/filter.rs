//! Selector-based narrowing of an expanded plan

use crate::domain::descriptor::FileDescriptor;
use crate::domain::selector::Selector;

/// Keeps the descriptors every present selector field matches
///
/// An empty selector returns the plan unchanged; a selector matching nothing
/// returns an empty plan.
pub fn filter_plan(plan: Vec<FileDescriptor>, selector: &Selector) -> Vec<FileDescriptor> {
    if selector.is_empty() {
        return plan;
    }

    plan.into_iter()
        .filter(|descriptor| selector.matches(&descriptor.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::descriptor::DataLayout;
    use crate::domain::group::DatasetGroup;
    use crate::domain::ids::{Category, Month, Year};

    fn plan() -> Vec<FileDescriptor> {
        let group = DatasetGroup::new(
            [Category::Yellow, Category::Green],
            [Year::new(2019).unwrap(), Year::new(2020).unwrap()],
            [Month::new(1).unwrap(), Month::new(2).unwrap()],
        )
        .unwrap();
        crate::core::plan::expand(&[group], &DataLayout::default())
    }

    #[test]
    fn test_empty_selector_is_identity() {
        assert_eq!(filter_plan(plan(), &Selector::new()), plan());
    }

    #[test]
    fn test_selector_is_conjunctive() {
        let selector = Selector::new()
            .with_category(Category::Green)
            .with_month(Month::new(2).unwrap());
        let filtered = filter_plan(plan(), &selector);

        let ids: Vec<String> = filtered.iter().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, vec!["green 2019-02", "green 2020-02"]);
    }

    #[test]
    fn test_selector_matching_nothing_yields_empty_plan() {
        let selector = Selector::new().with_category(Category::Fhvhv);
        assert!(filter_plan(plan(), &selector).is_empty());
    }
}
