//! References between world entities.
//!
//! [`EntityReference`] names anything a command or pronoun can point at.
//! [`ParentEntity`] names the places an item can be: the parent graph is an
//! arena of items whose parents chain up to a location, the player, or
//! `Nowhere` (despawned / not yet spawned).

use crate::ids::{ItemId, LocationId};
use serde::{Deserialize, Serialize};
use std::fmt;
use variantly::Variantly;

/// A reference to any addressable entity in the world.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Variantly)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum EntityReference {
    Item(ItemId),
    Location(LocationId),
    Player,
    Global,
    Nowhere,
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityReference::Item(id) => write!(f, "item:{id}"),
            EntityReference::Location(id) => write!(f, "location:{id}"),
            EntityReference::Player => write!(f, "player"),
            EntityReference::Global => write!(f, "global"),
            EntityReference::Nowhere => write!(f, "nowhere"),
        }
    }
}

/// Where an item currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Variantly)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum ParentEntity {
    /// Inside (or on top of) another item.
    Item(ItemId),
    /// Lying in a location.
    Location(LocationId),
    /// Carried (or worn) by the player.
    Player,
    /// Not present in the world.
    #[default]
    Nowhere,
}

impl From<&ParentEntity> for EntityReference {
    fn from(parent: &ParentEntity) -> Self {
        match parent {
            ParentEntity::Item(id) => EntityReference::Item(id.clone()),
            ParentEntity::Location(id) => EntityReference::Location(id.clone()),
            ParentEntity::Player => EntityReference::Player,
            ParentEntity::Nowhere => EntityReference::Nowhere,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_default_is_nowhere() {
        assert_eq!(ParentEntity::default(), ParentEntity::Nowhere);
        assert!(ParentEntity::default().is_nowhere());
    }

    #[test]
    fn variantly_accessors_work() {
        let parent = ParentEntity::Item(ItemId::from("chest"));
        assert_eq!(parent.item_ref(), Some(&ItemId::from("chest")));
        assert!(parent.location_ref().is_none());

        let entity = EntityReference::Location(LocationId::from("cellar"));
        assert!(entity.is_location());
        assert!(!entity.is_player());
    }

    #[test]
    fn parent_converts_to_reference() {
        let parent = ParentEntity::Player;
        assert_eq!(EntityReference::from(&parent), EntityReference::Player);
        let parent = ParentEntity::Location(LocationId::from("attic"));
        assert_eq!(
            EntityReference::from(&parent),
            EntityReference::Location(LocationId::from("attic"))
        );
    }

    #[test]
    fn reference_serde_uses_kind_tag() {
        let entity = EntityReference::Item(ItemId::from("lamp"));
        let json = serde_json::to_string(&entity).unwrap();
        assert_eq!(json, r#"{"kind":"item","id":"lamp"}"#);
        let back: EntityReference = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entity);
    }
}
