//! The tagged value type all world data reduces to.

use crate::ids::{ItemId, LocationId};
use crate::reference::{EntityReference, ParentEntity};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use variantly::Variantly;

/// A single attribute value.
///
/// Attribute maps, global state slots, and [`crate::StateChange`] payloads
/// all hold `StateValue`s. The serialized form is a `type` tag plus the
/// payload, so save files stay self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Variantly)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum StateValue {
    /// Flags and other truthy attributes.
    Bool(bool),
    /// Counters, scores, sizes.
    Int(i64),
    /// Names, descriptions, and other text.
    Text(String),
    /// A typed pointer to an item.
    ItemId(ItemId),
    /// A typed pointer to a location.
    LocationId(LocationId),
    /// An unordered set of item ids (inventory snapshots, scope results).
    ItemIdSet(BTreeSet<ItemId>),
    /// An unordered set of words (adjectives, synonyms).
    StringSet(BTreeSet<String>),
    /// An insertion-ordered, duplicate-free list of entity references
    /// (pronoun targets).
    EntityRefSet(Vec<EntityReference>),
    /// An item's location in the parent graph.
    Parent(ParentEntity),
    /// A game-defined structured payload, keyed by type name.
    #[variantly(rename = "opaque_value")]
    Opaque(OpaqueValue),
}

impl StateValue {
    /// Encode an arbitrary serializable value as an [`StateValue::Opaque`],
    /// tagged with `type_name` so later reads can be type-checked.
    ///
    /// # Errors
    /// Returns [`OpaqueError::Encode`] if the value cannot be represented
    /// as JSON.
    pub fn opaque<T: Serialize>(type_name: &str, value: &T) -> Result<Self, OpaqueError> {
        let payload = serde_json::to_value(value).map_err(|err| OpaqueError::Encode {
            type_name: type_name.to_string(),
            message: err.to_string(),
        })?;
        Ok(StateValue::Opaque(OpaqueValue {
            type_name: type_name.to_string(),
            payload,
        }))
    }

    /// Decode an opaque payload, failing loudly unless this value is an
    /// `Opaque` whose tag matches `type_name`.
    ///
    /// # Errors
    /// - [`OpaqueError::NotOpaque`] if this is any other variant.
    /// - [`OpaqueError::TypeMismatch`] if the stored tag differs.
    /// - [`OpaqueError::Decode`] if the payload does not deserialize as `T`.
    pub fn decode_opaque<T: DeserializeOwned>(&self, type_name: &str) -> Result<T, OpaqueError> {
        let StateValue::Opaque(opaque) = self else {
            return Err(OpaqueError::NotOpaque {
                type_name: type_name.to_string(),
            });
        };
        if opaque.type_name != type_name {
            return Err(OpaqueError::TypeMismatch {
                expected: type_name.to_string(),
                found: opaque.type_name.clone(),
            });
        }
        serde_json::from_value(opaque.payload.clone()).map_err(|err| OpaqueError::Decode {
            type_name: type_name.to_string(),
            message: err.to_string(),
        })
    }

    /// Read this value as a boolean, treating anything else as `false`.
    pub fn truthy(&self) -> bool {
        matches!(self, StateValue::Bool(true))
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Int(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Text(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Text(value)
    }
}

impl From<ParentEntity> for StateValue {
    fn from(value: ParentEntity) -> Self {
        StateValue::Parent(value)
    }
}

/// Carrier for game-specific structured data.
///
/// The payload is stored as JSON alongside the type name it was encoded
/// from; decoding with a different name fails rather than guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueValue {
    pub type_name: String,
    pub payload: serde_json::Value,
}

/// Failure while encoding or decoding an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpaqueError {
    NotOpaque { type_name: String },
    TypeMismatch { expected: String, found: String },
    Encode { type_name: String, message: String },
    Decode { type_name: String, message: String },
}

impl fmt::Display for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpaqueError::NotOpaque { type_name } => {
                write!(f, "value is not an opaque payload (wanted '{type_name}')")
            },
            OpaqueError::TypeMismatch { expected, found } => {
                write!(f, "opaque payload is '{found}', not '{expected}'")
            },
            OpaqueError::Encode { type_name, message } => {
                write!(f, "failed to encode opaque '{type_name}': {message}")
            },
            OpaqueError::Decode { type_name, message } => {
                write!(f, "failed to decode opaque '{type_name}': {message}")
            },
        }
    }
}

impl std::error::Error for OpaqueError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sheet {
        strength: u32,
        lore: u32,
    }

    #[test]
    fn truthy_only_for_bool_true() {
        assert!(StateValue::Bool(true).truthy());
        assert!(!StateValue::Bool(false).truthy());
        assert!(!StateValue::Int(1).truthy());
        assert!(!StateValue::Text("true".into()).truthy());
    }

    #[test]
    fn variantly_accessors_extract_payloads() {
        let value = StateValue::Int(42);
        assert_eq!(value.int_ref(), Some(&42));
        assert!(value.is_int());
        assert!(StateValue::Bool(true).bool_ref().is_some());
    }

    #[test]
    fn serde_form_is_tagged() {
        let value = StateValue::Int(3);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"type":"int","value":3}"#);
        let value = StateValue::Parent(ParentEntity::Player);
        let json = serde_json::to_string(&value).unwrap();
        let back: StateValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn opaque_round_trips_with_matching_name() {
        let sheet = Sheet { strength: 9, lore: 4 };
        let value = StateValue::opaque("demo.sheet", &sheet).unwrap();
        let back: Sheet = value.decode_opaque("demo.sheet").unwrap();
        assert_eq!(back, sheet);
    }

    #[test]
    fn opaque_decode_rejects_wrong_name() {
        let sheet = Sheet { strength: 9, lore: 4 };
        let value = StateValue::opaque("demo.sheet", &sheet).unwrap();
        let err = value.decode_opaque::<Sheet>("demo.other").unwrap_err();
        assert!(matches!(err, OpaqueError::TypeMismatch { .. }));
    }

    #[test]
    fn opaque_decode_rejects_non_opaque() {
        let err = StateValue::Bool(true).decode_opaque::<Sheet>("demo.sheet").unwrap_err();
        assert!(matches!(err, OpaqueError::NotOpaque { .. }));
    }

    #[test]
    fn entity_ref_set_preserves_order() {
        let refs = vec![
            EntityReference::Item(ItemId::from("key")),
            EntityReference::Item(ItemId::from("chest")),
        ];
        let value = StateValue::EntityRefSet(refs.clone());
        assert_eq!(value.entity_ref_set_ref(), Some(&refs));
    }
}
