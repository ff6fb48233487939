//! Public output types shared by scaffold operations and the CLI.

use serde::Serialize;

/// What happened to a single target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Created,
    Skipped,
}

impl ItemStatus {
    pub fn from_created(created: bool) -> Self {
        if created {
            ItemStatus::Created
        } else {
            ItemStatus::Skipped
        }
    }
}

/// Counts of created and skipped targets in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub created: u32,
    pub skipped: u32,
}

impl BatchSummary {
    pub fn record(&mut self, status: ItemStatus) {
        match status {
            ItemStatus::Created => self.created += 1,
            ItemStatus::Skipped => self.skipped += 1,
        }
    }
}
