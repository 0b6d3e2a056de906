//! Spireflat Engine
//!
//! Platform-agnostic replay engine that flattens recorded Slay the Spire runs
//! into one record per floor. Each record carries the run labels, the static
//! per-floor stats, whatever events happened on that floor, and snapshots of
//! the deck and relic inventory as they stood when the floor ended.
//!
//! This crate performs no I/O; front ends hand it parsed JSON values and
//! decide how to present progress and output.

pub mod batch;
pub mod character;
pub mod config;
pub mod deck;
pub mod error;
pub mod flatten;
pub mod floor;
pub mod merge;
pub mod relics;
pub mod replay;
pub mod run;

// Re-export commonly used types
pub use batch::{BatchOutcome, NullReporter, ProgressReporter, RunFailure, flatten_batch};
pub use character::Character;
pub use config::{FlattenConfig, ValidationMode};
pub use deck::{Deck, replay_deck};
pub use error::FlattenError;
pub use flatten::{RunFlattener, flatten_run};
pub use floor::{
    CampfireAction, CardPick, CombatOutcome, EventOutcome, FloorRecord, FloorStats, PathSlot,
    RelicGain, RunLabels, align_path, init_floors, project_stats,
};
pub use merge::{
    merge_campfires, merge_card_choices, merge_damage, merge_events, merge_purchases, merge_relics,
};
pub use relics::{RelicInventory, replay_relics};
pub use replay::ReplayStatus;
pub use run::{
    BossRelicChoice, CampfireChoice, CardChoice, CombatEntry, EventChoice, FloorTag, FloorTagged,
    RelicPickup, Run, RunEnvelope,
};
