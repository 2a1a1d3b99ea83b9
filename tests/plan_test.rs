//! Integration tests for plan expansion and filtering

use tripdata::config::DatasetGroupConfig;
use tripdata::core::plan::{expand, expand_config, filter_plan, preview, PlannedAction};
use tripdata::domain::{Category, DataLayout, DescriptorId, Month, Selector, Year};

fn layout() -> DataLayout {
    DataLayout::new("https://archive.example.com/releases", "data", "prod")
}

fn id(category: Category, year: i64, month: i64) -> DescriptorId {
    DescriptorId::new(category, Year::new(year).unwrap(), Month::new(month).unwrap())
}

fn ids(plan: &[tripdata::domain::FileDescriptor]) -> Vec<DescriptorId> {
    plan.iter().map(|d| d.id).collect()
}

#[test]
fn test_single_group_with_month_selector() {
    let raw = vec![DatasetGroupConfig::new(["yellow"], [2019], [1, 2])];
    let plan = expand_config(Some(&raw), &layout()).unwrap();
    let selector = Selector::new().with_month(Month::new(2).unwrap());

    let plan = filter_plan(plan, &selector);
    assert_eq!(ids(&plan), vec![id(Category::Yellow, 2019, 2)]);
}

#[test]
fn test_overlapping_groups_keep_first_occurrence() {
    let raw = vec![
        DatasetGroupConfig::new(["yellow"], [2019], [1]),
        DatasetGroupConfig::new(["yellow", "green"], [2019], [1]),
    ];
    let plan = expand_config(Some(&raw), &layout()).unwrap();

    assert_eq!(
        ids(&plan),
        vec![id(Category::Yellow, 2019, 1), id(Category::Green, 2019, 1)]
    );
}

#[test]
fn test_nested_iteration_order() {
    let raw = vec![DatasetGroupConfig::new(["green", "yellow"], [2020, 2019], [2, 1])];
    let plan = expand_config(Some(&raw), &layout()).unwrap();

    assert_eq!(
        ids(&plan),
        vec![
            id(Category::Green, 2020, 2),
            id(Category::Green, 2020, 1),
            id(Category::Green, 2019, 2),
            id(Category::Green, 2019, 1),
            id(Category::Yellow, 2020, 2),
            id(Category::Yellow, 2020, 1),
            id(Category::Yellow, 2019, 2),
            id(Category::Yellow, 2019, 1),
        ]
    );
}

#[test]
fn test_expansion_is_deterministic() {
    let raw = vec![
        DatasetGroupConfig::new(["yellow", "green"], [2019, 2020], 1..=12),
        DatasetGroupConfig::new(["green", "fhv"], [2020], [6, 7]),
    ];
    let first = expand_config(Some(&raw), &layout()).unwrap();
    let second = expand_config(Some(&raw), &layout()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 48 + 2);
}

#[test]
fn test_descriptor_derived_fields() {
    let raw = vec![DatasetGroupConfig::new(["green"], [2020], [7])];
    let plan = expand_config(Some(&raw), &layout()).unwrap();
    let descriptor = &plan[0];

    assert_eq!(
        descriptor.remote_url,
        "https://archive.example.com/releases/green/green_tripdata_2020-07.csv.gz"
    );
    assert_eq!(
        descriptor.raw_path,
        std::path::Path::new("data/green/green_tripdata_2020-07.csv.gz")
    );
    assert_eq!(
        descriptor.columnar_path,
        std::path::Path::new("data/green/green_tripdata_2020-07.parquet")
    );
    assert_eq!(descriptor.table_name, "prod.green_tripdata");
}

#[test]
fn test_empty_selector_is_identity() {
    let raw = vec![DatasetGroupConfig::new(["yellow", "green"], [2019], [1, 2, 3])];
    let plan = expand_config(Some(&raw), &layout()).unwrap();

    assert_eq!(filter_plan(plan.clone(), &Selector::new()), plan);
}

#[test]
fn test_selector_fields_are_conjunctive() {
    let raw = vec![DatasetGroupConfig::new(["yellow", "green"], [2019, 2020], [1, 2])];
    let plan = expand_config(Some(&raw), &layout()).unwrap();
    let selector = Selector::new()
        .with_category(Category::Green)
        .with_year(Year::new(2020).unwrap());

    assert_eq!(
        ids(&filter_plan(plan, &selector)),
        vec![id(Category::Green, 2020, 1), id(Category::Green, 2020, 2)]
    );
}

#[test]
fn test_selector_matching_nothing_yields_empty_plan() {
    let raw = vec![DatasetGroupConfig::new(["yellow"], [2019], [1])];
    let plan = expand_config(Some(&raw), &layout()).unwrap();
    let selector = Selector::new().with_category(Category::Fhvhv);

    assert!(filter_plan(plan, &selector).is_empty());
}

#[test]
fn test_preview_against_local_files() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DataLayout::new("https://archive.example.com", dir.path(), "prod");
    let raw = vec![DatasetGroupConfig::new(["yellow"], [2019], [1, 2])];
    let groups = tripdata::core::plan::validate_groups(Some(&raw)).unwrap();
    let plan = expand(&groups, &layout);

    std::fs::create_dir_all(plan[1].columnar_path.parent().unwrap()).unwrap();
    std::fs::write(&plan[1].columnar_path, b"PAR1").unwrap();

    let actions: Vec<_> = preview(&plan, false).into_iter().map(|(_, a)| a).collect();
    assert_eq!(actions, vec![PlannedAction::New, PlannedAction::Skip]);

    let actions: Vec<_> = preview(&plan, true).into_iter().map(|(_, a)| a).collect();
    assert_eq!(actions, vec![PlannedAction::New, PlannedAction::Redownload]);
}
