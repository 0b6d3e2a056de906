//! Run orchestrator: drives one run through every stage in a fixed order.
use serde_json::Value;

use crate::config::FlattenConfig;
use crate::deck::replay_deck;
use crate::error::FlattenError;
use crate::floor::{FloorRecord, align_path, init_floors, project_stats};
use crate::merge::{
    merge_campfires, merge_card_choices, merge_damage, merge_events, merge_purchases, merge_relics,
};
use crate::relics::replay_relics;
use crate::replay::ReplayStatus;
use crate::run::{Run, RunEnvelope};

/// Flattens runs into floor records under one configuration.
#[derive(Debug, Clone, Default)]
pub struct RunFlattener {
    config: FlattenConfig,
}

impl RunFlattener {
    #[must_use]
    pub const fn new(config: FlattenConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Flatten one raw envelope value.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::Envelope`] when the value is not a run
    /// envelope, plus any error from [`RunFlattener::flatten`].
    pub fn flatten_value(&self, value: &Value) -> Result<Vec<FloorRecord>, FlattenError> {
        let envelope = RunEnvelope::from_value(value)?;
        self.flatten_envelope(&envelope)
    }

    /// # Errors
    ///
    /// See [`RunFlattener::flatten`].
    pub fn flatten_envelope(&self, envelope: &RunEnvelope) -> Result<Vec<FloorRecord>, FlattenError> {
        self.flatten(&envelope.event)
    }

    /// Build the floor records for `run`. On error nothing is returned, so a
    /// failed run never leaves partial rows behind.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::InvalidFloorTag`] for a floor tag that cannot be
    /// read as an integer, [`FlattenError::UnknownCharacter`] when no starting
    /// deck exists, and [`FlattenError::MissingField`] when a replayed entry
    /// lacks its payload.
    pub fn flatten(&self, run: &Run) -> Result<Vec<FloorRecord>, FlattenError> {
        let mode = self.config.validation;
        let mut floors = init_floors(run);
        project_stats(run, &mut floors);
        align_path(run, &mut floors);

        let picks = merge_card_choices(run, &mut floors, mode)?;
        let relics = merge_relics(run, &mut floors, mode)?;
        let events = merge_events(run, &mut floors, mode)?;
        let campfires = merge_campfires(run, &mut floors, mode)?;
        let purchases = merge_purchases(run, &mut floors);
        let combats = merge_damage(run, &mut floors, mode)?;
        log::debug!(
            "run {}: merged {picks} picks, {relics} relics, {events} events, {campfires} campfires, {purchases} purchases, {combats} combats",
            run.seed_source_timestamp
        );

        let deck = replay_deck(run, &mut floors, &self.config)?;
        report_abort(run, "deck", deck);
        let relic_state = replay_relics(run, &mut floors, &self.config)?;
        report_abort(run, "relic", relic_state);

        Ok(floors)
    }
}

fn report_abort(run: &Run, replay: &str, status: ReplayStatus) {
    if let ReplayStatus::Aborted { category } = status {
        log::debug!(
            "run {}: {replay} replay aborted on untagged {category} entry",
            run.seed_source_timestamp
        );
    }
}

/// Flatten one envelope value with the default configuration.
///
/// # Errors
///
/// See [`RunFlattener::flatten_value`].
pub fn flatten_run(value: &Value) -> Result<Vec<FloorRecord>, FlattenError> {
    RunFlattener::default().flatten_value(value)
}
