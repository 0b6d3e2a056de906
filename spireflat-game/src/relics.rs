//! Relic-state replay.
//!
//! Relics come from three places: floor-tagged pickups, narrative-event
//! grants, and boss chests. Boss chests carry no floor tag, so they are
//! consumed in order, one per boss floor on the aligned path.
use std::collections::HashSet;

use crate::config::FlattenConfig;
use crate::error::FlattenError;
use crate::floor::FloorRecord;
use crate::replay::{ReplayStatus, Untagged, bucket_by_floor};
use crate::run::{EventChoice, FloorTagged, RelicPickup, Run};

/// Ordered relic inventory without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelicInventory {
    order: Vec<String>,
    held: HashSet<String>,
}

impl RelicInventory {
    /// Add `relic` unless it is already held; returns whether it was added.
    pub fn insert(&mut self, relic: &str) -> bool {
        if self.held.contains(relic) {
            return false;
        }
        self.held.insert(relic.to_string());
        self.order.push(relic.to_string());
        true
    }

    #[must_use]
    pub fn contains(&self, relic: &str) -> bool {
        self.held.contains(relic)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.order.clone()
    }
}

/// Replay relic acquisition and store the inventory (and its size) on every
/// floor. Boss floors are read from the aligned path, so [`crate::align_path`]
/// must run first.
///
/// # Errors
///
/// Returns [`FlattenError::InvalidFloorTag`] on a non-integer floor tag and
/// [`FlattenError::MissingField`] for a relic pickup without a key.
pub fn replay_relics(
    run: &Run,
    floors: &mut [FloorRecord],
    cfg: &FlattenConfig,
) -> Result<ReplayStatus, FlattenError> {
    let mut inventory = RelicInventory::default();
    if let Some(starting) = run.relics.first() {
        inventory.insert(starting);
    }

    let floor_count = floors.len();
    let untagged = Untagged::from(cfg.validation);
    let Some(pickups) = bucket_by_floor(&run.relics_obtained, floor_count, untagged)? else {
        return Ok(aborted::<RelicPickup>());
    };
    let Some(events) = bucket_by_floor(&run.event_choices, floor_count, untagged)? else {
        return Ok(aborted::<EventChoice>());
    };

    let mut boss_chests = run.boss_relics.iter();
    for (idx, record) in floors.iter_mut().enumerate() {
        for pickup in &pickups[idx] {
            let key = pickup.key.as_deref().ok_or(FlattenError::MissingField {
                category: RelicPickup::CATEGORY,
                field: "key",
                floor: i64::try_from(idx).unwrap_or(i64::MAX),
            })?;
            inventory.insert(key);
        }

        for event in &events[idx] {
            for relic in &event.relics_obtained {
                inventory.insert(relic);
            }
        }

        if cfg.is_boss_symbol(record.path_symbol())
            && let Some(chest) = boss_chests.next()
            && let Some(picked) = chest.picked.as_deref().filter(|p| !p.is_empty())
        {
            inventory.insert(picked);
        }

        record.relics = Some(inventory.snapshot());
    }

    Ok(ReplayStatus::Completed)
}

fn aborted<T: FloorTagged>() -> ReplayStatus {
    ReplayStatus::Aborted {
        category: T::CATEGORY,
    }
}
