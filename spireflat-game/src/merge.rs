//! Event mergers: each scans one event array and annotates the floor its
//! entries are tagged with.
//!
//! An entry whose floor tag is missing or outside the run ends the scan of its
//! category under [`ValidationMode::Strict`]; later entries of that category
//! are dropped for the run. [`ValidationMode::Lenient`] skips just the entry.
use serde_json::Number;
use smallvec::SmallVec;

use crate::config::ValidationMode;
use crate::error::FlattenError;
use crate::floor::{CampfireAction, CardPick, CombatOutcome, EventOutcome, FloorRecord, RelicGain};
use crate::run::{FloorTagged, Run};

/// Convert a resolved tag into an index into `floors`, if it lands inside the run.
pub(crate) fn floor_index(floor: Option<i64>, floor_count: usize) -> Option<usize> {
    floor
        .and_then(|f| usize::try_from(f).ok())
        .filter(|&f| f < floor_count)
}

/// Scan `entries` in source order and hand each in-range entry to `assign`.
/// Returns how many entries were applied.
fn merge_tagged<T, F>(
    entries: &[T],
    floors: &mut [FloorRecord],
    mode: ValidationMode,
    mut assign: F,
) -> Result<usize, FlattenError>
where
    T: FloorTagged,
    F: FnMut(&mut FloorRecord, &T),
{
    let mut applied = 0;
    for (idx, entry) in entries.iter().enumerate() {
        let raw = entry.floor()?;
        if let Some(floor) = floor_index(raw, floors.len()) {
            assign(&mut floors[floor], entry);
            applied += 1;
        } else if mode.is_strict() {
            log::debug!(
                "{}: entry {idx} has floor {raw:?} outside 0..{}; dropping it and {} later entries",
                T::CATEGORY,
                floors.len(),
                entries.len() - idx - 1
            );
            break;
        } else {
            log::debug!(
                "{}: skipping entry {idx} with floor {raw:?}",
                T::CATEGORY
            );
        }
    }
    Ok(applied)
}

/// Record the picked card and each alternative as `not_picked_1..N`.
///
/// # Errors
///
/// Returns [`FlattenError::InvalidFloorTag`] on a non-integer floor tag.
pub fn merge_card_choices(
    run: &Run,
    floors: &mut [FloorRecord],
    mode: ValidationMode,
) -> Result<usize, FlattenError> {
    merge_tagged(&run.card_choices, floors, mode, |record, choice| {
        record.card_choice = Some(CardPick {
            picked: choice.picked.clone(),
            not_picked: choice.not_picked.iter().cloned().collect::<SmallVec<_>>(),
        });
    })
}

/// Record the relic obtained on each floor; the last entry for a floor wins.
///
/// # Errors
///
/// Returns [`FlattenError::InvalidFloorTag`] on a non-integer floor tag.
pub fn merge_relics(
    run: &Run,
    floors: &mut [FloorRecord],
    mode: ValidationMode,
) -> Result<usize, FlattenError> {
    merge_tagged(&run.relics_obtained, floors, mode, |record, relic| {
        record.relic_obtained = Some(RelicGain {
            key: relic.key.clone(),
        });
    })
}

/// # Errors
///
/// Returns [`FlattenError::InvalidFloorTag`] on a non-integer floor tag.
pub fn merge_events(
    run: &Run,
    floors: &mut [FloorRecord],
    mode: ValidationMode,
) -> Result<usize, FlattenError> {
    merge_tagged(&run.event_choices, floors, mode, |record, event| {
        record.event = Some(EventOutcome {
            name: event.event_name.clone(),
            choice: event.player_choice.clone(),
            cards: event.cards_obtained.clone(),
            relics: event.relics_obtained.clone(),
        });
    })
}

/// # Errors
///
/// Returns [`FlattenError::InvalidFloorTag`] on a non-integer floor tag.
pub fn merge_campfires(
    run: &Run,
    floors: &mut [FloorRecord],
    mode: ValidationMode,
) -> Result<usize, FlattenError> {
    merge_tagged(&run.campfire_choices, floors, mode, |record, camp| {
        record.campfire = Some(CampfireAction {
            action: camp.key.clone(),
            target: camp.data.clone(),
        });
    })
}

/// Record combat results; damage and turns default to 0.
///
/// # Errors
///
/// Returns [`FlattenError::InvalidFloorTag`] on a non-integer floor tag.
pub fn merge_damage(
    run: &Run,
    floors: &mut [FloorRecord],
    mode: ValidationMode,
) -> Result<usize, FlattenError> {
    merge_tagged(&run.damage_taken, floors, mode, |record, combat| {
        record.combat = Some(CombatOutcome {
            enemies: combat.enemies.clone(),
            damage: combat.damage.clone().unwrap_or_else(|| Number::from(0)),
            turns: combat.turns.clone().unwrap_or_else(|| Number::from(0)),
        });
    })
}

/// Attach purchases via the parallel `item_purchase_floors` array. Purchases
/// on floors outside the run are skipped. Each floor's items are joined with
/// commas once every purchase has been placed.
pub fn merge_purchases(run: &Run, floors: &mut [FloorRecord]) -> usize {
    let mut per_floor: Vec<Vec<&str>> = vec![Vec::new(); floors.len()];
    let mut applied = 0;
    for (item, &floor) in run.items_purchased.iter().zip(&run.item_purchase_floors) {
        if let Some(idx) = floor_index(Some(floor), floors.len()) {
            per_floor[idx].push(item);
            applied += 1;
        }
    }
    for (record, items) in floors.iter_mut().zip(per_floor) {
        if !items.is_empty() {
            record.items_purchased = Some(items.join(","));
        }
    }
    applied
}
