//! Identifier newtypes.
//!
//! Every world entity is addressed by an author-chosen string id. The
//! newtypes exist so an item id cannot be handed to an API expecting a
//! location id; all of them order lexicographically and serialize as the
//! bare string, which keeps save files readable and map keys sorted.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw string as an identifier.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifies an item in the world arena.
    ItemId
);
string_id!(
    /// Identifies a location (room).
    LocationId
);
string_id!(
    /// Identifies a global state slot or flag.
    GlobalId
);
string_id!(
    /// Identifies a verb family understood by the engine.
    VerbId
);
string_id!(
    /// Identifies a registered daemon behavior.
    DaemonId
);
string_id!(
    /// Identifies a registered fuse behavior.
    FuseId
);
string_id!(
    /// Names an attribute slot on an item, location, or the player.
    AttributeId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn ids_order_lexicographically() {
        let coin = ItemId::from("coin");
        let key = ItemId::from("key");
        let lamp = ItemId::from("lamp");
        assert!(coin < key && key < lamp);
    }

    #[test]
    fn ids_serialize_as_bare_strings() {
        let id = LocationId::from("cellar");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"cellar\"");
        let back: LocationId = serde_json::from_str("\"cellar\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_work_as_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(GlobalId::from("score"), 5);
        assert_eq!(map.get(&GlobalId::from("score")), Some(&5));
    }

    #[test]
    fn display_matches_raw() {
        assert_eq!(VerbId::from("take").to_string(), "take");
        assert_eq!(AttributeId::new("isOpen").as_str(), "isOpen");
    }
}
