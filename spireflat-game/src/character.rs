//! Playable characters and the deck each one starts a run with.
use serde::{Deserialize, Serialize};

use crate::error::FlattenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Character {
    Ironclad,
    #[serde(rename = "THE_SILENT")]
    Silent,
    Defect,
    Watcher,
}

impl Character {
    /// Identify a character from the `character_chosen` label of a run.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::UnknownCharacter`] for an absent or unrecognized label.
    pub fn from_label(label: Option<&str>) -> Result<Self, FlattenError> {
        match label {
            Some("IRONCLAD") => Ok(Self::Ironclad),
            Some("THE_SILENT") => Ok(Self::Silent),
            Some("DEFECT") => Ok(Self::Defect),
            Some("WATCHER") => Ok(Self::Watcher),
            other => Err(FlattenError::UnknownCharacter(other.map(str::to_string))),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ironclad => "IRONCLAD",
            Self::Silent => "THE_SILENT",
            Self::Defect => "DEFECT",
            Self::Watcher => "WATCHER",
        }
    }

    const fn starting_counts(self) -> &'static [(&'static str, usize)] {
        match self {
            Self::Ironclad => &[("Strike_R", 5), ("Defend_R", 4), ("Bash", 1)],
            Self::Silent => &[
                ("Strike_G", 5),
                ("Defend_G", 5),
                ("Survivor", 1),
                ("Neutralize", 1),
            ],
            Self::Defect => &[
                ("Strike_B", 4),
                ("Defend_B", 4),
                ("Zap", 1),
                ("Dualcast", 1),
            ],
            Self::Watcher => &[
                ("Strike_P", 4),
                ("Defend_P", 4),
                ("Eruption", 1),
                ("Vigilance", 1),
            ],
        }
    }

    /// Cards in the starting deck, strikes first, then defends, then signature cards.
    #[must_use]
    pub fn starting_deck(self) -> Vec<String> {
        self.starting_counts()
            .iter()
            .flat_map(|&(card, count)| std::iter::repeat_n(card.to_string(), count))
            .collect()
    }
}

impl std::fmt::Display for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(deck: &[String], card: &str) -> usize {
        deck.iter().filter(|c| *c == card).count()
    }

    #[test]
    fn ironclad_starts_with_ten_cards() {
        let deck = Character::Ironclad.starting_deck();
        assert_eq!(deck.len(), 10);
        assert_eq!(count(&deck, "Strike_R"), 5);
        assert_eq!(count(&deck, "Defend_R"), 4);
        assert_eq!(count(&deck, "Bash"), 1);
        assert_eq!(deck.last().map(String::as_str), Some("Bash"));
    }

    #[test]
    fn silent_defect_and_watcher_decks() {
        let silent = Character::Silent.starting_deck();
        assert_eq!(silent.len(), 12);
        assert_eq!(count(&silent, "Neutralize"), 1);

        let defect = Character::Defect.starting_deck();
        assert_eq!(defect.len(), 10);
        assert_eq!(&defect[8..], ["Zap", "Dualcast"]);

        let watcher = Character::Watcher.starting_deck();
        assert_eq!(watcher.len(), 10);
        assert_eq!(count(&watcher, "Vigilance"), 1);
    }

    #[test]
    fn labels_round_trip() {
        for character in [
            Character::Ironclad,
            Character::Silent,
            Character::Defect,
            Character::Watcher,
        ] {
            assert_eq!(
                Character::from_label(Some(character.label())).unwrap(),
                character
            );
            assert_eq!(character.to_string(), character.label());
        }
    }

    #[test]
    fn unknown_or_missing_character_is_an_error() {
        let err = Character::from_label(Some("HERMIT")).unwrap_err();
        assert!(matches!(err, FlattenError::UnknownCharacter(Some(ref c)) if c == "HERMIT"));
        assert!(matches!(
            Character::from_label(None),
            Err(FlattenError::UnknownCharacter(None))
        ));
    }
}
