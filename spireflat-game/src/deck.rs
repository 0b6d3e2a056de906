//! Deck-state replay.
//!
//! The deck is rebuilt floor by floor from the starting deck. Within a floor
//! the categories fold in a fixed order: card rewards, event-granted cards,
//! purges, then campfire upgrades. Each floor stores its own copy of the deck.
use crate::character::Character;
use crate::config::FlattenConfig;
use crate::error::FlattenError;
use crate::floor::FloorRecord;
use crate::replay::{ReplayStatus, Untagged, bucket_by_floor};
use crate::run::{CampfireChoice, CardChoice, EventChoice, FloorTagged, Run};

/// Running deck: acquisition order, duplicates allowed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deck {
    cards: Vec<String>,
}

impl Deck {
    #[must_use]
    pub const fn new(cards: Vec<String>) -> Self {
        Self { cards }
    }

    #[must_use]
    pub fn starting(character: Character) -> Self {
        Self::new(character.starting_deck())
    }

    pub fn add(&mut self, card: impl Into<String>) {
        self.cards.push(card.into());
    }

    /// Remove the first copy of `card`; returns whether one was present.
    pub fn remove(&mut self, card: &str) -> bool {
        if let Some(idx) = self.cards.iter().position(|c| c == card) {
            self.cards.remove(idx);
            true
        } else {
            false
        }
    }

    /// Replace the first copy of `card` with `upgraded`, appended at the end.
    pub fn upgrade(&mut self, card: &str, upgraded: String) -> bool {
        let present = self.remove(card);
        if present {
            self.cards.push(upgraded);
        }
        present
    }

    #[must_use]
    pub fn contains(&self, card: &str) -> bool {
        self.cards.iter().any(|c| c == card)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.cards.clone()
    }
}

/// Replay card acquisitions, purges, and upgrades and store a deck snapshot
/// (plus its size) on every floor.
///
/// An untagged card choice or event aborts the replay under strict
/// validation, leaving every floor without a deck.
///
/// # Errors
///
/// Returns [`FlattenError::UnknownCharacter`] when no starting deck can be
/// inferred, [`FlattenError::InvalidFloorTag`] on a non-integer floor tag, and
/// [`FlattenError::MissingField`] for a card reward without a pick or a
/// campfire without an action.
pub fn replay_deck(
    run: &Run,
    floors: &mut [FloorRecord],
    cfg: &FlattenConfig,
) -> Result<ReplayStatus, FlattenError> {
    let mut deck = Deck::starting(Character::from_label(run.character_chosen.as_deref())?);
    let floor_count = floors.len();
    let untagged = Untagged::from(cfg.validation);

    let Some(picks) = bucket_by_floor(&run.card_choices, floor_count, untagged)? else {
        return Ok(aborted::<CardChoice>());
    };
    let Some(events) = bucket_by_floor(&run.event_choices, floor_count, untagged)? else {
        return Ok(aborted::<EventChoice>());
    };
    // Untagged campfires simply never match a floor.
    let campfires = bucket_by_floor(&run.campfire_choices, floor_count, Untagged::Skip)?
        .unwrap_or_else(|| vec![Vec::new(); floor_count]);
    let purges: Vec<(&str, i64)> = run
        .items_purged
        .iter()
        .map(String::as_str)
        .zip(run.item_purchase_floors.iter().copied())
        .collect();

    for (idx, record) in floors.iter_mut().enumerate() {
        for choice in &picks[idx] {
            let picked = choice
                .picked
                .as_deref()
                .ok_or(FlattenError::MissingField {
                    category: CardChoice::CATEGORY,
                    field: "picked",
                    floor: floor_number(idx),
                })?;
            if picked != cfg.skip_pick {
                deck.add(picked);
            }
        }

        for event in &events[idx] {
            for card in &event.cards_obtained {
                deck.add(card.as_str());
            }
        }

        for &(card, _) in purges
            .iter()
            .filter(|&&(_, floor)| usize::try_from(floor).is_ok_and(|f| f == idx))
        {
            deck.remove(card);
        }

        for camp in &campfires[idx] {
            let action = camp.key.as_deref().ok_or(FlattenError::MissingField {
                category: CampfireChoice::CATEGORY,
                field: "key",
                floor: floor_number(idx),
            })?;
            if action != cfg.upgrade_action {
                continue;
            }
            if let Some(target) = camp.data.as_deref().filter(|t| !t.is_empty()) {
                deck.upgrade(target, cfg.upgraded(target));
            }
        }

        record.deck = Some(deck.snapshot());
    }

    Ok(ReplayStatus::Completed)
}

fn aborted<T: FloorTagged>() -> ReplayStatus {
    ReplayStatus::Aborted {
        category: T::CATEGORY,
    }
}

fn floor_number(idx: usize) -> i64 {
    i64::try_from(idx).unwrap_or(i64::MAX)
}
