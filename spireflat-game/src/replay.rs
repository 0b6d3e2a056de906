//! Shared plumbing for the stateful replayers (deck and relics).
use crate::config::ValidationMode;
use crate::error::FlattenError;
use crate::merge::floor_index;
use crate::run::FloorTagged;

/// What a replay did with the floors it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStatus {
    /// Every floor received a snapshot.
    Completed,
    /// An untagged entry broke floor ordering; no floor received a snapshot.
    Aborted { category: &'static str },
}

impl ReplayStatus {
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Policy for entries whose floor tag resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Untagged {
    Abort,
    Skip,
}

impl From<ValidationMode> for Untagged {
    fn from(mode: ValidationMode) -> Self {
        match mode {
            ValidationMode::Strict => Self::Abort,
            ValidationMode::Lenient => Self::Skip,
        }
    }
}

/// Floor-indexed entries of one category, in source order within each floor.
pub(crate) type Buckets<'a, T> = Vec<Vec<&'a T>>;

/// Group entries by the floor they resolve to. Tags outside the run never
/// match a floor and are dropped silently. Returns `Ok(None)` when an untagged
/// entry aborts the replay.
pub(crate) fn bucket_by_floor<T: FloorTagged>(
    entries: &[T],
    floor_count: usize,
    untagged: Untagged,
) -> Result<Option<Buckets<'_, T>>, FlattenError> {
    let mut buckets: Buckets<'_, T> = (0..floor_count).map(|_| Vec::new()).collect();
    for (idx, entry) in entries.iter().enumerate() {
        let Some(floor) = entry.floor()? else {
            if untagged == Untagged::Abort {
                log::debug!("{}: entry {idx} has no floor; replay aborted", T::CATEGORY);
                return Ok(None);
            }
            log::debug!("{}: entry {idx} has no floor; skipped", T::CATEGORY);
            continue;
        };
        if let Some(slot) = floor_index(Some(floor), floor_count) {
            buckets[slot].push(entry);
        }
    }
    Ok(Some(buckets))
}
