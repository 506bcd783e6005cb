//! Locations, exits, and compass directions.
//!
//! A location is an attribute map plus an exit table. Exits may be plain
//! passages or doors with open/locked state and an optional custom message
//! shown when traversal is refused.

use crate::item::attrs;
use lantern_data::{AttributeId, LocationId, StateValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Opaque payload tag used when a `locationExits` change carries a new
/// exit table.
pub const EXITS_TYPE_NAME: &str = "lantern.exits";

/// Compass points plus the vertical and threshold directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
    Up,
    Down,
    In,
    Out,
}

impl Direction {
    /// All directions, for vocabulary construction.
    pub const ALL: [Direction; 12] = [
        Direction::North,
        Direction::Northeast,
        Direction::East,
        Direction::Southeast,
        Direction::South,
        Direction::Southwest,
        Direction::West,
        Direction::Northwest,
        Direction::Up,
        Direction::Down,
        Direction::In,
        Direction::Out,
    ];

    /// Single-letter or short abbreviation accepted as input.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::Northeast => "ne",
            Direction::East => "e",
            Direction::Southeast => "se",
            Direction::South => "s",
            Direction::Southwest => "sw",
            Direction::West => "w",
            Direction::Northwest => "nw",
            Direction::Up => "u",
            Direction::Down => "d",
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Direction::North => "north",
            Direction::Northeast => "northeast",
            Direction::East => "east",
            Direction::Southeast => "southeast",
            Direction::South => "south",
            Direction::Southwest => "southwest",
            Direction::West => "west",
            Direction::Northwest => "northwest",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::In => "in",
            Direction::Out => "out",
        };
        f.write_str(word)
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(word: &str) -> Result<Self, Self::Err> {
        for dir in Direction::ALL {
            if word == dir.abbreviation() || word == dir.to_string() {
                return Ok(dir);
            }
        }
        Err(())
    }
}

/// A passage out of a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exit {
    pub destination: LocationId,
    #[serde(default)]
    pub is_door: bool,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_message: Option<String>,
}

impl Exit {
    /// An ordinary open passage to the given location.
    pub fn new(destination: impl Into<LocationId>) -> Self {
        Self {
            destination: destination.into(),
            is_door: false,
            is_open: false,
            is_locked: false,
            blocked_message: None,
        }
    }

    /// Turn this exit into a door, initially closed.
    #[must_use]
    pub fn door(mut self) -> Self {
        self.is_door = true;
        self
    }

    #[must_use]
    pub fn open(mut self) -> Self {
        self.is_open = true;
        self
    }

    #[must_use]
    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    #[must_use]
    pub fn with_blocked_message(mut self, message: &str) -> Self {
        self.blocked_message = Some(message.to_string());
        self
    }

    /// Whether the player may pass right now.
    pub fn is_passable(&self) -> bool {
        !self.is_door || (self.is_open && !self.is_locked)
    }
}

/// Any place the player can stand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub attributes: BTreeMap<AttributeId, StateValue>,
    pub exits: BTreeMap<Direction, Exit>,
}

impl Location {
    pub fn new(id: impl Into<LocationId>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
            exits: BTreeMap::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&StateValue> {
        self.attributes.get(&AttributeId::from(name))
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.attr(name).is_some_and(StateValue::truthy)
    }

    pub fn name(&self) -> &str {
        match self.attr(attrs::NAME) {
            Some(StateValue::Text(name)) => name,
            _ => self.id.as_str(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self.attr(attrs::DESCRIPTION) {
            Some(StateValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// True for locations that are lit without any light source present.
    pub fn inherently_lit(&self) -> bool {
        self.has_flag(attrs::INHERENTLY_LIT)
    }

    /// Sacred locations refuse daemon interference in some games; the
    /// engine only stores the flag.
    pub fn is_sacred(&self) -> bool {
        self.has_flag(attrs::IS_SACRED)
    }

    pub fn exit(&self, direction: Direction) -> Option<&Exit> {
        self.exits.get(&direction)
    }

    /// Encode the exit table as the opaque payload a `locationExits`
    /// change carries.
    pub fn exits_value(&self) -> Result<StateValue, lantern_data::OpaqueError> {
        StateValue::opaque(EXITS_TYPE_NAME, &self.exits)
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<StateValue>) -> Self {
        self.attributes.insert(AttributeId::from(name), value.into());
        self
    }

    #[must_use]
    pub fn with_name(self, name: &str) -> Self {
        self.with_attr(attrs::NAME, name)
    }

    #[must_use]
    pub fn with_description(self, text: &str) -> Self {
        self.with_attr(attrs::DESCRIPTION, text)
    }

    #[must_use]
    pub fn lit(self) -> Self {
        self.with_attr(attrs::INHERENTLY_LIT, true)
    }

    #[must_use]
    pub fn with_exit(mut self, direction: Direction, exit: Exit) -> Self {
        self.exits.insert(direction, exit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_words_and_abbreviations() {
        assert_eq!("north".parse::<Direction>(), Ok(Direction::North));
        assert_eq!("ne".parse::<Direction>(), Ok(Direction::Northeast));
        assert_eq!("u".parse::<Direction>(), Ok(Direction::Up));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn plain_exit_is_passable() {
        assert!(Exit::new("hall").is_passable());
    }

    #[test]
    fn closed_door_blocks_passage() {
        let door = Exit::new("hall").door();
        assert!(!door.is_passable());
        assert!(door.clone().open().is_passable());
        assert!(!door.open().locked().is_passable());
    }

    #[test]
    fn location_name_falls_back_to_id() {
        assert_eq!(Location::new("cellar").name(), "cellar");
        assert_eq!(Location::new("cellar").with_name("Damp Cellar").name(), "Damp Cellar");
    }

    #[test]
    fn inherently_lit_reads_flag() {
        assert!(!Location::new("cave").inherently_lit());
        assert!(Location::new("meadow").lit().inherently_lit());
    }

    #[test]
    fn exits_value_round_trips() {
        let loc = Location::new("hall").with_exit(Direction::North, Exit::new("study").door().open());
        let value = loc.exits_value().unwrap();
        let decoded: BTreeMap<Direction, Exit> = value.decode_opaque(EXITS_TYPE_NAME).unwrap();
        assert_eq!(decoded, loc.exits);
    }
}
