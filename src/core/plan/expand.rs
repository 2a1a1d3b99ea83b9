//! Dataset group validation and cartesian expansion

use crate::config::schema::DatasetGroupConfig;
use crate::domain::descriptor::{DataLayout, FileDescriptor};
use crate::domain::errors::{ConfigViolation, ConfigurationError};
use crate::domain::group::DatasetGroup;
use crate::domain::ids::{Category, DescriptorId, Month, Year};
use std::collections::HashSet;
use std::str::FromStr;

/// Validates raw dataset groups
///
/// Every group is checked in full and every problem is collected; the call
/// only succeeds when no group has any violation.
///
/// # Arguments
///
/// * `raw` - The `[[datasets]]` entries, or `None` when the key is missing
///
/// # Errors
///
/// Returns a [`ConfigurationError`] listing each violation keyed by group
/// index and field.
pub fn validate_groups(
    raw: Option<&[DatasetGroupConfig]>,
) -> Result<Vec<DatasetGroup>, ConfigurationError> {
    let raw = match raw {
        None => {
            return Err(ConfigurationError::new(vec![ConfigViolation::top_level(
                "missing 'datasets' list",
            )]))
        }
        Some([]) => {
            return Err(ConfigurationError::new(vec![ConfigViolation::top_level(
                "at least one dataset group is required",
            )]))
        }
        Some(raw) => raw,
    };

    let mut violations = Vec::new();
    let mut groups = Vec::with_capacity(raw.len());

    for (index, group) in raw.iter().enumerate() {
        let taxi_types = check_axis(
            index,
            "taxi_types",
            group.taxi_types.as_deref(),
            |name| Category::from_str(name),
            &mut violations,
        );
        let years = check_axis(
            index,
            "years",
            group.years.as_deref(),
            |value| Year::new(*value),
            &mut violations,
        );
        let months = check_axis(
            index,
            "months",
            group.months.as_deref(),
            |value| Month::new(*value),
            &mut violations,
        );

        if let (Some(taxi_types), Some(years), Some(months)) = (taxi_types, years, months) {
            match DatasetGroup::new(taxi_types, years, months) {
                Ok(group) => groups.push(group),
                Err(message) => {
                    violations.push(ConfigViolation::in_group(index, "group", message))
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(groups)
    } else {
        Err(ConfigurationError::new(violations))
    }
}

/// Checks one axis of one group, recording every bad element
///
/// Returns `None` when the axis had any violation.
fn check_axis<R, T>(
    index: usize,
    field: &str,
    values: Option<&[R]>,
    parse: impl Fn(&R) -> Result<T, String>,
    violations: &mut Vec<ConfigViolation>,
) -> Option<Vec<T>> {
    let Some(values) = values else {
        violations.push(ConfigViolation::in_group(index, field, "missing required key"));
        return None;
    };

    if values.is_empty() {
        violations.push(ConfigViolation::in_group(index, field, "cannot be empty"));
        return None;
    }

    let before = violations.len();
    let parsed: Vec<T> = values
        .iter()
        .filter_map(|value| match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                violations.push(ConfigViolation::in_group(index, field, message));
                None
            }
        })
        .collect();

    (violations.len() == before).then_some(parsed)
}

/// Expands validated groups into a duplicate-free, order-stable plan
///
/// Groups are visited in declaration order and each group in
/// `(category, year, month)` nesting order; an identity is kept the first
/// time it is produced.
pub fn expand(groups: &[DatasetGroup], layout: &DataLayout) -> Vec<FileDescriptor> {
    let mut seen: HashSet<DescriptorId> = HashSet::new();
    let mut plan = Vec::new();

    for group in groups {
        for id in group.identities() {
            if seen.insert(id) {
                plan.push(layout.describe(id));
            }
        }
    }

    plan
}

/// Validates then expands raw dataset groups
///
/// # Errors
///
/// Returns the aggregated [`ConfigurationError`] from [`validate_groups`].
pub fn expand_config(
    raw: Option<&[DatasetGroupConfig]>,
    layout: &DataLayout,
) -> Result<Vec<FileDescriptor>, ConfigurationError> {
    let groups = validate_groups(raw)?;
    Ok(expand(&groups, layout))
}
