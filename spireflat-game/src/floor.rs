//! Per-floor output records plus the stages that lay them out: the skeleton
//! allocator, the static-stat projector, and the path aligner.
use serde_json::{Map, Number, Value};
use smallvec::SmallVec;

use crate::run::Run;

/// Run-level fields replicated onto every floor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunLabels {
    pub run_id: i64,
    pub victory: bool,
    pub character: Option<String>,
    pub asc_level: Option<i64>,
    pub is_ascension: bool,
    pub win_rate: Option<f64>,
}

impl RunLabels {
    #[must_use]
    pub fn from_run(run: &Run) -> Self {
        Self {
            run_id: run.seed_source_timestamp,
            victory: run.victory,
            character: run.character_chosen.clone(),
            asc_level: run.ascension_level,
            is_ascension: run.is_ascension,
            win_rate: run.win_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorStats {
    pub max_hp: i64,
    pub cur_hp: i64,
    pub gold: i64,
}

/// Map node entered on this floor and the one about to be entered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathSlot {
    pub symbol: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardPick {
    pub picked: Option<String>,
    pub not_picked: SmallVec<[String; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelicGain {
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub name: Option<String>,
    pub choice: Option<String>,
    pub cards: Vec<String>,
    pub relics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampfireAction {
    pub action: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatOutcome {
    pub enemies: Option<String>,
    pub damage: Number,
    pub turns: Number,
}

/// One row of the flattened table.
///
/// Each `Option` group stays `None` until the stage that owns it touches the
/// floor, so [`FloorRecord::cells`] only emits columns whose source event
/// actually occurred here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloorRecord {
    pub labels: RunLabels,
    pub floor: usize,
    pub stats: Option<FloorStats>,
    pub path: Option<PathSlot>,
    pub card_choice: Option<CardPick>,
    pub relic_obtained: Option<RelicGain>,
    pub event: Option<EventOutcome>,
    pub campfire: Option<CampfireAction>,
    pub items_purchased: Option<String>,
    pub combat: Option<CombatOutcome>,
    pub deck: Option<Vec<String>>,
    pub relics: Option<Vec<String>>,
}

impl FloorRecord {
    #[must_use]
    pub const fn new(labels: RunLabels, floor: usize) -> Self {
        Self {
            labels,
            floor,
            stats: None,
            path: None,
            card_choice: None,
            relic_obtained: None,
            event: None,
            campfire: None,
            items_purchased: None,
            combat: None,
            deck: None,
            relics: None,
        }
    }

    #[must_use]
    pub fn path_symbol(&self) -> Option<&str> {
        self.path.as_ref().and_then(|p| p.symbol.as_deref())
    }

    #[must_use]
    pub fn deck_size(&self) -> Option<usize> {
        self.deck.as_ref().map(Vec::len)
    }

    #[must_use]
    pub fn num_relics(&self) -> Option<usize> {
        self.relics.as_ref().map(Vec::len)
    }

    /// Present columns in stage order, with JSON-typed values.
    #[must_use]
    pub fn cells(&self) -> Vec<(String, Value)> {
        let mut cells = Vec::with_capacity(32);
        let mut push = |name: &str, value: Value| cells.push((name.to_string(), value));

        let labels = &self.labels;
        push("run_id", Value::from(labels.run_id));
        push("floor", Value::from(self.floor));
        push("victory", Value::from(labels.victory));
        push("character", Value::from(labels.character.clone()));
        push("asc_level", Value::from(labels.asc_level));
        push("is_ascension", Value::from(labels.is_ascension));
        push("win_rate", Value::from(labels.win_rate));

        if let Some(stats) = self.stats {
            push("max_hp", Value::from(stats.max_hp));
            push("cur_hp", Value::from(stats.cur_hp));
            push("gold", Value::from(stats.gold));
        }
        if let Some(path) = &self.path {
            push("path_symbol", Value::from(path.symbol.clone()));
            push("next_path_symbol", Value::from(path.next.clone()));
        }
        if let Some(pick) = &self.card_choice {
            push("card_picked", Value::from(pick.picked.clone()));
            for (idx, card) in pick.not_picked.iter().enumerate() {
                push(&format!("not_picked_{}", idx + 1), Value::from(card.as_str()));
            }
        }
        if let Some(relic) = &self.relic_obtained {
            push("relic_obtained", Value::from(relic.key.clone()));
        }
        if let Some(event) = &self.event {
            push("event_name", Value::from(event.name.clone()));
            push("event_choice", Value::from(event.choice.clone()));
            push("event_cards_obtained", Value::from(event.cards.clone()));
            push("event_relics_obtained", Value::from(event.relics.clone()));
        }
        if let Some(camp) = &self.campfire {
            push("campfire_action", Value::from(camp.action.clone()));
            push("campfire_target", Value::from(camp.target.clone()));
        }
        if let Some(items) = &self.items_purchased {
            push("items_purchased", Value::from(items.as_str()));
        }
        if let Some(combat) = &self.combat {
            push("combat_enemies", Value::from(combat.enemies.clone()));
            push("combat_damage", Value::Number(combat.damage.clone()));
            push("combat_turns", Value::Number(combat.turns.clone()));
        }
        if let Some(deck) = &self.deck {
            push("deck", Value::from(deck.clone()));
            push("deck_size", Value::from(deck.len()));
        }
        if let Some(relics) = &self.relics {
            push("relics", Value::from(relics.clone()));
            push("num_relics", Value::from(relics.len()));
        }
        cells
    }

    /// The record as a JSON object whose keys follow [`FloorRecord::cells`].
    #[must_use]
    pub fn to_json(&self) -> Map<String, Value> {
        self.cells().into_iter().collect()
    }
}

/// Allocate `floor_reached + 1` records carrying the run labels.
#[must_use]
pub fn init_floors(run: &Run) -> Vec<FloorRecord> {
    let labels = RunLabels::from_run(run);
    (0..run.floor_count())
        .map(|floor| FloorRecord::new(labels.clone(), floor))
        .collect()
}

/// Copy max HP, current HP, and gold onto floors by position. The shortest of
/// the three arrays, or the floor count, bounds how many floors receive stats.
pub fn project_stats(run: &Run, floors: &mut [FloorRecord]) {
    let stats = run
        .max_hp_per_floor
        .iter()
        .zip(&run.current_hp_per_floor)
        .zip(&run.gold_per_floor)
        .map(|((&max_hp, &cur_hp), &gold)| FloorStats {
            max_hp,
            cur_hp,
            gold,
        });
    for (record, stats) in floors.iter_mut().zip(stats) {
        record.stats = Some(stats);
    }
}

/// Attach path symbols. `path_per_floor[i]` describes the move into floor
/// `i + 1`, so floor 0 only has a next symbol.
pub fn align_path(run: &Run, floors: &mut [FloorRecord]) {
    let path = &run.path_per_floor;
    let symbol_at = |idx: usize| path.get(idx).cloned().flatten();
    for record in floors {
        let f = record.floor;
        record.path = Some(PathSlot {
            symbol: f.checked_sub(1).and_then(symbol_at),
            next: symbol_at(f),
        });
    }
}
