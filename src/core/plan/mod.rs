//! Download planning
//!
//! Turns validated dataset groups into the ordered list of files a run will
//! process:
//!
//! 1. [`validate_groups`] checks every `[[datasets]]` entry and reports all
//!    problems together
//! 2. [`expand`] builds the duplicate-free cartesian product
//! 3. [`filter_plan`] narrows it with an invocation-time [`Selector`]
//!
//! [`preview`] labels each planned file for `--dry-run` output.
//!
//! [`Selector`]: crate::domain::selector::Selector

pub mod expand;
pub mod filter;

pub use expand::{expand, expand_config, validate_groups};
pub use filter::filter_plan;

use crate::domain::descriptor::FileDescriptor;
use std::fmt;

/// What a run would do with one planned file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    /// Nothing local yet; will be fetched
    New,
    /// Already present; will be skipped
    Skip,
    /// Already present but `--force` was given
    Redownload,
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            PlannedAction::New => "NEW",
            PlannedAction::Skip => "SKIP",
            PlannedAction::Redownload => "FORCE",
        })
    }
}

/// Labels every planned file without touching the network
pub fn preview(plan: &[FileDescriptor], force: bool) -> Vec<(&FileDescriptor, PlannedAction)> {
    plan.iter()
        .map(|descriptor| {
            let action = match (descriptor.has_local_artifact(), force) {
                (false, _) => PlannedAction::New,
                (true, false) => PlannedAction::Skip,
                (true, true) => PlannedAction::Redownload,
            };
            (descriptor, action)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DatasetGroupConfig;
    use crate::domain::descriptor::DataLayout;

    #[test]
    fn test_preview_labels() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new("https://archive.example.com", dir.path(), "prod");
        let raw = vec![DatasetGroupConfig::new(["yellow"], [2019], [1, 2])];
        let plan = expand_config(Some(&raw), &layout).unwrap();

        std::fs::create_dir_all(plan[1].columnar_path.parent().unwrap()).unwrap();
        std::fs::write(&plan[1].columnar_path, b"PAR1").unwrap();

        let labels: Vec<PlannedAction> = preview(&plan, false).into_iter().map(|(_, a)| a).collect();
        assert_eq!(labels, vec![PlannedAction::New, PlannedAction::Skip]);

        let forced: Vec<PlannedAction> = preview(&plan, true).into_iter().map(|(_, a)| a).collect();
        assert_eq!(forced, vec![PlannedAction::New, PlannedAction::Redownload]);
        assert_eq!(PlannedAction::Redownload.to_string(), "FORCE");
    }
}
