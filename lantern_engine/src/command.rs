//! The parsed command a turn executes.

use crate::location::Direction;
use lantern_data::{EntityReference, VerbId};
use serde::{Deserialize, Serialize};

/// A fully resolved player command, as produced by the parser.
///
/// `direct_objects` may hold several entries for `AND` lists; `is_all`
/// marks an `ALL` command whose objects the engine expands against the
/// verb's own scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub verb: VerbId,
    pub direct_objects: Vec<EntityReference>,
    pub indirect_object: Option<EntityReference>,
    pub preposition: Option<String>,
    pub direction: Option<Direction>,
    pub is_all: bool,
    pub raw_input: String,
}

impl Command {
    /// A bare command for the given verb, used by hooks and tests.
    pub fn for_verb(verb: impl Into<VerbId>) -> Self {
        Self {
            verb: verb.into(),
            ..Self::default()
        }
    }

    /// The single direct object, if the command names exactly one.
    pub fn sole_direct_object(&self) -> Option<&EntityReference> {
        if self.direct_objects.len() == 1 {
            self.direct_objects.first()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_data::ItemId;

    #[test]
    fn sole_direct_object_requires_exactly_one() {
        let mut command = Command::for_verb("take");
        assert!(command.sole_direct_object().is_none());
        command.direct_objects.push(EntityReference::Item(ItemId::from("coin")));
        assert!(command.sole_direct_object().is_some());
        command.direct_objects.push(EntityReference::Item(ItemId::from("key")));
        assert!(command.sole_direct_object().is_none());
    }
}
