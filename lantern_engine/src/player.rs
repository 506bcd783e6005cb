//! The player character.

use lantern_data::{AttributeId, LocationId, StateValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default carrying capacity when a blueprint doesn't set one.
pub const DEFAULT_CARRYING_CAPACITY: i64 = 100;

/// The player: location, bookkeeping counters, and an open attribute map
/// for game-defined state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub current_location: LocationId,
    pub score: i64,
    /// Moves taken; also the turn clock the scheduler runs against.
    pub moves: i64,
    pub carrying_capacity: i64,
    pub health: i64,
    /// Game-defined stats, carried as an opaque payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_sheet: Option<StateValue>,
    #[serde(default)]
    pub attributes: BTreeMap<AttributeId, StateValue>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            current_location: LocationId::default(),
            score: 0,
            moves: 0,
            carrying_capacity: DEFAULT_CARRYING_CAPACITY,
            health: 100,
            character_sheet: None,
            attributes: BTreeMap::new(),
        }
    }
}

impl Player {
    /// A player standing in the given location.
    pub fn starting_at(location: impl Into<LocationId>) -> Self {
        Self {
            current_location: location.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_carrying_capacity(mut self, capacity: i64) -> Self {
        self.carrying_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_character_sheet(mut self, sheet: StateValue) -> Self {
        self.character_sheet = Some(sheet);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&StateValue> {
        self.attributes.get(&AttributeId::from(name))
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.attr(name).is_some_and(StateValue::truthy)
    }
}
