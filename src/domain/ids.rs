//! Domain identifier types with validation
//!
//! This module provides the strongly-typed axes of a dataset file identity:
//! the taxi [`Category`], the [`Year`] and the [`Month`]. Together they form a
//! [`DescriptorId`], the key every other component uses to refer to one file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First year published by the remote archive
pub const MIN_YEAR: u16 = 2009;

/// Last year accepted in configuration
pub const MAX_YEAR: u16 = 2030;

/// Taxi dataset category
///
/// # Examples
///
/// ```
/// use tripdata::domain::ids::Category;
/// use std::str::FromStr;
///
/// let category = Category::from_str("fhvhv").unwrap();
/// assert_eq!(category, Category::Fhvhv);
/// assert_eq!(category.as_str(), "fhvhv");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Yellow medallion taxis
    Yellow,
    /// Green street-hail livery taxis
    Green,
    /// For-hire vehicles
    Fhv,
    /// High-volume for-hire vehicles
    Fhvhv,
}

impl Category {
    /// All recognized categories, in canonical order
    pub const ALL: [Category; 4] = [
        Category::Yellow,
        Category::Green,
        Category::Fhv,
        Category::Fhvhv,
    ];

    /// Returns the lowercase name used in URLs, paths and table names
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Yellow => "yellow",
            Category::Green => "green",
            Category::Fhv => "fhv",
            Category::Fhvhv => "fhvhv",
        }
    }

    /// Comma-separated list of recognized names, for error messages
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "yellow" => Ok(Category::Yellow),
            "green" => Ok(Category::Green),
            "fhv" => Ok(Category::Fhv),
            "fhvhv" => Ok(Category::Fhvhv),
            other => Err(format!(
                "unknown taxi type '{other}' (valid types: {})",
                Self::valid_names()
            )),
        }
    }
}

/// Dataset year newtype wrapper
///
/// Only years in `2009..=2030` can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct Year(u16);

impl Year {
    /// Creates a new Year
    ///
    /// # Returns
    ///
    /// Returns `Err` if the value is outside the range published by the archive
    pub fn new(value: i64) -> Result<Self, String> {
        if value < i64::from(MIN_YEAR) || value > i64::from(MAX_YEAR) {
            return Err(format!(
                "year {value} is outside the valid range ({MIN_YEAR}-{MAX_YEAR})"
            ));
        }
        Ok(Self(value as u16))
    }

    /// Returns the numeric year
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for Year {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Year> for u16 {
    fn from(year: Year) -> Self {
        year.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Year {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{s}' is not a valid year"))?;
        Self::new(value)
    }
}

/// Calendar month newtype wrapper (1-12)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Month(u8);

impl Month {
    /// Creates a new Month
    ///
    /// # Returns
    ///
    /// Returns `Err` unless `1 <= value <= 12`
    pub fn new(value: i64) -> Result<Self, String> {
        if !(1..=12).contains(&value) {
            return Err(format!("month {value} is outside the valid range (1-12)"));
        }
        Ok(Self(value as u8))
    }

    /// Returns the numeric month
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Month {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{s}' is not a valid month"))?;
        Self::new(value)
    }
}

/// Identity of one dataset file: `(category, year, month)`
///
/// Two descriptors with the same identity are duplicates regardless of which
/// dataset group produced them.
///
/// # Examples
///
/// ```
/// use tripdata::domain::ids::{Category, DescriptorId, Month, Year};
///
/// let id = DescriptorId::new(Category::Yellow, Year::new(2019).unwrap(), Month::new(2).unwrap());
/// assert_eq!(id.file_stem(), "yellow_tripdata_2019-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DescriptorId {
    /// Taxi category
    pub category: Category,
    /// Dataset year
    pub year: Year,
    /// Dataset month
    pub month: Month,
}

impl DescriptorId {
    /// Creates a new identity
    pub fn new(category: Category, year: Year, month: Month) -> Self {
        Self {
            category,
            year,
            month,
        }
    }

    /// File name without extension, as published by the archive
    pub fn file_stem(&self) -> String {
        format!("{}_tripdata_{}-{}", self.category, self.year, self.month)
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.category, self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn test_category_unknown() {
        let err = Category::from_str("red").unwrap_err();
        assert!(err.contains("red"));
        assert!(err.contains("yellow, green, fhv, fhvhv"));
    }

    #[test]
    fn test_year_bounds() {
        assert!(Year::new(2009).is_ok());
        assert!(Year::new(2030).is_ok());
        assert!(Year::new(2008).is_err());
        assert!(Year::new(2031).is_err());
        assert!(Year::new(-1).is_err());
    }

    #[test]
    fn test_month_bounds() {
        assert!(Month::new(0).is_err());
        assert!(Month::new(13).is_err());
        assert_eq!(Month::new(12).unwrap().get(), 12);
    }

    #[test]
    fn test_month_display_is_zero_padded() {
        assert_eq!(Month::new(3).unwrap().to_string(), "03");
        assert_eq!(Month::new(11).unwrap().to_string(), "11");
    }

    #[test]
    fn test_year_from_str() {
        assert_eq!(Year::from_str("2020").unwrap().get(), 2020);
        assert!(Year::from_str("twenty").is_err());
    }

    #[test]
    fn test_descriptor_id_display_and_stem() {
        let id = DescriptorId::new(
            Category::Green,
            Year::new(2020).unwrap(),
            Month::new(7).unwrap(),
        );
        assert_eq!(id.to_string(), "green 2020-07");
        assert_eq!(id.file_stem(), "green_tripdata_2020-07");
    }

    #[test]
    fn test_descriptor_id_serde() {
        let id = DescriptorId::new(
            Category::Fhv,
            Year::new(2019).unwrap(),
            Month::new(1).unwrap(),
        );
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"{"category":"fhv","year":2019,"month":1}"#);
        let back: DescriptorId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
