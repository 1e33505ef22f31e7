//! What to do with one staged node.
use std::fmt;

use super::compare::{Comparison, Difference, compare};
use super::entry::{StagingEntry, TargetEntry};
use crate::error::PlacementError;
use crate::helpers::fs::is_empty_dir;

/// The action chosen for a staged node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementDecision {
    /// The live node already matches; nothing is touched.
    Skip,
    /// Nothing exists at the target path.
    Create,
    /// A live node exists and must be replaced or fixed up.
    Overwrite {
        /// The node being replaced.
        existing: TargetEntry,
        /// Why it is being replaced.
        difference: Difference,
    },
    /// A non-empty live directory stands where a file is staged.
    Reject {
        /// The directory that blocks placement.
        existing: TargetEntry,
    },
}

impl fmt::Display for PlacementDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("unchanged"),
            Self::Create => f.write_str("create"),
            Self::Overwrite { difference, .. } => write!(f, "overwrite ({difference})"),
            Self::Reject { .. } => f.write_str("reject"),
        }
    }
}

/// Decide how to place `staged` given the live node at the same path.
///
/// A live file where a directory is staged is replaceable, and so is an
/// empty live directory where a file is staged. Only a non-empty live
/// directory blocks a staged file.
///
/// # Errors
///
/// Returns [`PlacementError`] if a comparison cannot be made or the live
/// directory cannot be read.
pub fn decide(
    staged: &StagingEntry,
    live: Option<TargetEntry>,
) -> Result<PlacementDecision, PlacementError> {
    let Some(existing) = live else {
        return Ok(PlacementDecision::Create);
    };
    match compare(staged, &existing)? {
        Comparison::Equal => Ok(PlacementDecision::Skip),
        Comparison::Differs(Difference::Kind)
            if existing.meta.is_dir()
                && !is_empty_dir(&existing.path)
                    .map_err(|e| PlacementError::io("read directory", &existing.path, e))? =>
        {
            Ok(PlacementDecision::Reject { existing })
        }
        Comparison::Differs(difference) => Ok(PlacementDecision::Overwrite {
            existing,
            difference,
        }),
    }
}
