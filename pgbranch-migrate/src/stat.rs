//! Summary statistics for a change set.

use std::fmt;

use serde::Serialize;

use crate::change::{ChangeBucket, ChangeSet};

/// Counts of additions, deletions and modifications in a change set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStat {
    /// Changes in the addition bucket.
    pub additions: usize,
    /// Changes in the deletion bucket.
    pub deletions: usize,
    /// Changes in the modification bucket.
    pub modifications: usize,
    /// Destructive changes across all buckets.
    pub destructive: usize,
}

impl DiffStat {
    /// Tally a change set.
    pub fn from_change_set(cs: &ChangeSet) -> Self {
        let mut stat = Self {
            destructive: cs.destructive_count(),
            ..Self::default()
        };
        for change in cs {
            match change.change_type().bucket() {
                ChangeBucket::Addition => stat.additions += 1,
                ChangeBucket::Deletion => stat.deletions += 1,
                ChangeBucket::Modification => stat.modifications += 1,
            }
        }
        stat
    }

    /// Total number of changes.
    pub fn total(&self) -> usize {
        self.additions + self.deletions + self.modifications
    }
}

impl fmt::Display for DiffStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} addition(s), {} deletion(s), {} modification(s)",
            self.additions, self.deletions, self.modifications
        )?;
        if self.destructive > 0 {
            write!(f, ", {} destructive", self.destructive)?;
        }
        Ok(())
    }
}
