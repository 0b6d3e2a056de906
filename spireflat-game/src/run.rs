//! Input model for a single recorded run.
//!
//! Every collection defaults to empty and every scalar label to its neutral
//! value, so a sparse log still deserializes. Only the envelope key and the
//! run id are required.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::error::FlattenError;

/// Outer wrapper around a run as it appears in the exported log collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEnvelope {
    pub event: Run,
}

impl RunEnvelope {
    /// Unwrap a run from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::Envelope`] if the value lacks the `event` key,
    /// the run id, or holds a field of the wrong shape.
    pub fn from_value(value: &Value) -> Result<Self, FlattenError> {
        Ok(Self::deserialize(value)?)
    }

    /// Parse a run envelope from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::Envelope`] if the JSON cannot be parsed into a run.
    pub fn from_json(json: &str) -> Result<Self, FlattenError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One complete playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub seed_source_timestamp: i64,
    #[serde(default)]
    pub floor_reached: u32,
    #[serde(default)]
    pub victory: bool,
    #[serde(default)]
    pub character_chosen: Option<String>,
    #[serde(default)]
    pub ascension_level: Option<i64>,
    #[serde(default)]
    pub is_ascension: bool,
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default)]
    pub max_hp_per_floor: Vec<i64>,
    #[serde(default)]
    pub current_hp_per_floor: Vec<i64>,
    #[serde(default)]
    pub gold_per_floor: Vec<i64>,
    /// One symbol per floor transition; entries may be null.
    #[serde(default)]
    pub path_per_floor: Vec<Option<String>>,
    #[serde(default)]
    pub card_choices: Vec<CardChoice>,
    #[serde(default)]
    pub relics_obtained: Vec<RelicPickup>,
    #[serde(default)]
    pub event_choices: Vec<EventChoice>,
    #[serde(default)]
    pub campfire_choices: Vec<CampfireChoice>,
    #[serde(default)]
    pub items_purchased: Vec<String>,
    /// Parallel to `items_purchased`; also paired with `items_purged`.
    #[serde(default)]
    pub item_purchase_floors: Vec<i64>,
    #[serde(default)]
    pub items_purged: Vec<String>,
    #[serde(default)]
    pub damage_taken: Vec<CombatEntry>,
    /// Final relic inventory; the first entry is the starting relic.
    #[serde(default)]
    pub relics: Vec<String>,
    #[serde(default)]
    pub boss_relics: Vec<BossRelicChoice>,
}

impl Run {
    /// Number of floor records the run expands to (`floor_reached + 1`).
    #[must_use]
    pub fn floor_count(&self) -> usize {
        usize::try_from(self.floor_reached).map_or(usize::MAX, |n| n.saturating_add(1))
    }
}

/// Raw `floor` key of an event entry, resolved lazily so that a bad tag only
/// fails the run when an engine stage actually reads it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloorTag(pub Option<Value>);

impl FloorTag {
    #[must_use]
    pub fn new(floor: i64) -> Self {
        Self(Some(Value::from(floor)))
    }

    /// Coerce the tag to an integer floor.
    ///
    /// Absent or null tags resolve to `None`. Floats truncate toward zero,
    /// numeric strings are parsed, booleans count as 0 and 1.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::InvalidFloorTag`] for arrays, objects, and
    /// strings that do not hold an integer.
    pub fn resolve(&self, category: &'static str) -> Result<Option<i64>, FlattenError> {
        let invalid = |value: &Value| FlattenError::InvalidFloorTag {
            category,
            value: value.clone(),
        };
        match &self.0 {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(i64::from(*flag))),
            Some(value @ Value::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(truncate))
                .map(Some)
                .ok_or_else(|| invalid(value)),
            Some(value @ Value::String(text)) => text
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| invalid(value)),
            Some(other) => Err(invalid(other)),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

/// Event entries that carry a `floor` key.
pub trait FloorTagged {
    /// Category name used in errors and log lines.
    const CATEGORY: &'static str;

    fn floor_tag(&self) -> &FloorTag;

    /// Resolve this entry's floor tag.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::InvalidFloorTag`] if the tag is not integer-like.
    fn floor(&self) -> Result<Option<i64>, FlattenError> {
        self.floor_tag().resolve(Self::CATEGORY)
    }
}

macro_rules! floor_tagged {
    ($($ty:ty => $category:literal),+ $(,)?) => {
        $(
            impl FloorTagged for $ty {
                const CATEGORY: &'static str = $category;

                fn floor_tag(&self) -> &FloorTag {
                    &self.floor
                }
            }
        )+
    };
}

floor_tagged! {
    CardChoice => "card_choices",
    RelicPickup => "relics_obtained",
    EventChoice => "event_choices",
    CampfireChoice => "campfire_choices",
    CombatEntry => "damage_taken",
}

/// A card reward screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardChoice {
    #[serde(default)]
    pub floor: FloorTag,
    #[serde(default)]
    pub picked: Option<String>,
    #[serde(default)]
    pub not_picked: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RelicPickup {
    #[serde(default)]
    pub floor: FloorTag,
    #[serde(default)]
    pub key: Option<String>,
}

/// A narrative (`?` room) event and what it granted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventChoice {
    #[serde(default)]
    pub floor: FloorTag,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub player_choice: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cards_obtained: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub relics_obtained: Vec<String>,
}

/// A rest-site action such as `REST` or `SMITH`, with its target in `data`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CampfireChoice {
    #[serde(default)]
    pub floor: FloorTag,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CombatEntry {
    #[serde(default)]
    pub floor: FloorTag,
    #[serde(default)]
    pub enemies: Option<String>,
    /// Kept as the logged number so integral damage stays integral downstream.
    #[serde(default)]
    pub damage: Option<Number>,
    #[serde(default)]
    pub turns: Option<Number>,
}

/// Boss chest choice; carries no floor tag and is matched positionally.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BossRelicChoice {
    #[serde(default)]
    pub picked: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub not_picked: Vec<String>,
}

/// Grant lists are sometimes logged as `null` when nothing was granted.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
