//! Item types and attribute helpers.
//!
//! Items are data: an id, a place in the parent graph, and an attribute map.
//! Well-known attribute names get typed accessors here; games may add any
//! further attributes they like and read them through hooks.

use lantern_data::{AttributeId, ItemId, ParentEntity, StateValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Well-known attribute names shared by items, locations, and the engine.
pub mod attrs {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const ADJECTIVES: &str = "adjectives";
    pub const SYNONYMS: &str = "synonyms";
    pub const SIZE: &str = "size";
    pub const CAPACITY: &str = "capacity";
    pub const LOCK_KEY: &str = "lockKey";
    pub const TEXT: &str = "text";

    pub const IS_TAKABLE: &str = "isTakable";
    pub const IS_CONTAINER: &str = "isContainer";
    pub const IS_SURFACE: &str = "isSurface";
    pub const IS_OPENABLE: &str = "isOpenable";
    pub const IS_OPEN: &str = "isOpen";
    pub const IS_LOCKABLE: &str = "isLockable";
    pub const IS_LOCKED: &str = "isLocked";
    pub const IS_WEARABLE: &str = "isWearable";
    pub const IS_WORN: &str = "isWorn";
    pub const IS_DEVICE: &str = "isDevice";
    pub const IS_LIGHT_SOURCE: &str = "isLightSource";
    pub const IS_ON: &str = "isOn";
    pub const IS_TOUCHED: &str = "isTouched";
    pub const IS_SCENERY: &str = "isScenery";
    pub const IS_EDIBLE: &str = "isEdible";
    pub const IS_READABLE: &str = "isReadable";
    pub const IS_TRANSPARENT: &str = "isTransparent";

    // Location attributes
    pub const INHERENTLY_LIT: &str = "inherentlyLit";
    pub const IS_SACRED: &str = "isSacred";
}

/// Default size for items that don't declare one.
pub const DEFAULT_ITEM_SIZE: i64 = 1;

/// Anything in the world the player can refer to or manipulate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    /// Stable author-chosen id; also the multi-object ordering key.
    pub id: ItemId,
    /// Where the item currently is.
    pub parent: ParentEntity,
    /// All other item data, including game-defined attributes.
    pub attributes: BTreeMap<AttributeId, StateValue>,
}

impl Item {
    /// Create an empty item located nowhere.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            parent: ParentEntity::Nowhere,
            attributes: BTreeMap::new(),
        }
    }

    /// Fetch a raw attribute value.
    pub fn attr(&self, name: &str) -> Option<&StateValue> {
        self.attributes.get(&AttributeId::from(name))
    }

    /// True when the named boolean attribute is present and set.
    pub fn has_flag(&self, name: &str) -> bool {
        self.attr(name).is_some_and(StateValue::truthy)
    }

    /// Display name; falls back to the id for items without one.
    pub fn name(&self) -> &str {
        match self.attr(attrs::NAME) {
            Some(StateValue::Text(name)) => name,
            _ => self.id.as_str(),
        }
    }

    /// Long-form description, if the item has one.
    pub fn description(&self) -> Option<&str> {
        match self.attr(attrs::DESCRIPTION) {
            Some(StateValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Legible text for `read`, falling back to nothing.
    pub fn text(&self) -> Option<&str> {
        match self.attr(attrs::TEXT) {
            Some(StateValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Bulk of the item when computing carrying load and container fit.
    pub fn size(&self) -> i64 {
        match self.attr(attrs::SIZE) {
            Some(StateValue::Int(size)) => *size,
            _ => DEFAULT_ITEM_SIZE,
        }
    }

    /// Content capacity, for containers that declare one.
    pub fn capacity(&self) -> Option<i64> {
        match self.attr(attrs::CAPACITY) {
            Some(StateValue::Int(cap)) => Some(*cap),
            _ => None,
        }
    }

    /// The key item this lock accepts.
    pub fn lock_key(&self) -> Option<&ItemId> {
        match self.attr(attrs::LOCK_KEY) {
            Some(StateValue::ItemId(key)) => Some(key),
            _ => None,
        }
    }

    /// Words that qualify this item in noun phrases ("brass", "rusty").
    pub fn adjectives(&self) -> BTreeSet<String> {
        match self.attr(attrs::ADJECTIVES) {
            Some(StateValue::StringSet(words)) => words.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// Alternate head nouns ("lantern" for the lamp).
    pub fn synonyms(&self) -> BTreeSet<String> {
        match self.attr(attrs::SYNONYMS) {
            Some(StateValue::StringSet(words)) => words.clone(),
            _ => BTreeSet::new(),
        }
    }

    pub fn is_takable(&self) -> bool {
        self.has_flag(attrs::IS_TAKABLE)
    }
    pub fn is_container(&self) -> bool {
        self.has_flag(attrs::IS_CONTAINER)
    }
    pub fn is_surface(&self) -> bool {
        self.has_flag(attrs::IS_SURFACE)
    }
    pub fn is_openable(&self) -> bool {
        self.has_flag(attrs::IS_OPENABLE)
    }
    pub fn is_open(&self) -> bool {
        self.has_flag(attrs::IS_OPEN)
    }
    pub fn is_lockable(&self) -> bool {
        self.has_flag(attrs::IS_LOCKABLE)
    }
    pub fn is_locked(&self) -> bool {
        self.has_flag(attrs::IS_LOCKED)
    }
    pub fn is_wearable(&self) -> bool {
        self.has_flag(attrs::IS_WEARABLE)
    }
    pub fn is_worn(&self) -> bool {
        self.has_flag(attrs::IS_WORN)
    }
    pub fn is_device(&self) -> bool {
        self.has_flag(attrs::IS_DEVICE)
    }
    pub fn is_light_source(&self) -> bool {
        self.has_flag(attrs::IS_LIGHT_SOURCE)
    }
    pub fn is_on(&self) -> bool {
        self.has_flag(attrs::IS_ON)
    }
    pub fn is_touched(&self) -> bool {
        self.has_flag(attrs::IS_TOUCHED)
    }
    pub fn is_scenery(&self) -> bool {
        self.has_flag(attrs::IS_SCENERY)
    }
    pub fn is_edible(&self) -> bool {
        self.has_flag(attrs::IS_EDIBLE)
    }
    pub fn is_readable(&self) -> bool {
        self.has_flag(attrs::IS_READABLE)
    }
    pub fn is_transparent(&self) -> bool {
        self.has_flag(attrs::IS_TRANSPARENT)
    }

    /// True when this item's contents can be reached into: surfaces always,
    /// containers only while open or transparent.
    pub fn admits_reach(&self) -> bool {
        self.is_surface() || (self.is_container() && (self.is_open() || self.is_transparent()))
    }

    /// True when light inside (or contents) can be seen from outside.
    pub fn admits_light(&self) -> bool {
        self.is_surface() || (self.is_container() && (self.is_open() || self.is_transparent()))
    }

    // Builder-style setters, used by blueprints and tests.

    /// Set any raw attribute.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<StateValue>) -> Self {
        self.attributes.insert(AttributeId::from(name), value.into());
        self
    }

    /// Raise a boolean flag attribute.
    #[must_use]
    pub fn with_flag(self, name: &str) -> Self {
        self.with_attr(name, true)
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
    pub fn with_size(self, size: i64) -> Self {
        self.with_attr(attrs::SIZE, size)
    }

    #[must_use]
    pub fn with_capacity(self, capacity: i64) -> Self {
        self.with_attr(attrs::CAPACITY, capacity)
    }

    #[must_use]
    pub fn with_lock_key(mut self, key: impl Into<ItemId>) -> Self {
        self.attributes
            .insert(AttributeId::from(attrs::LOCK_KEY), StateValue::ItemId(key.into()));
        self
    }

    #[must_use]
    pub fn with_adjectives<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = words.into_iter().map(Into::into).collect();
        self.attributes
            .insert(AttributeId::from(attrs::ADJECTIVES), StateValue::StringSet(set));
        self
    }

    #[must_use]
    pub fn with_synonyms<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = words.into_iter().map(Into::into).collect();
        self.attributes
            .insert(AttributeId::from(attrs::SYNONYMS), StateValue::StringSet(set));
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: ParentEntity) -> Self {
        self.parent = parent;
        self
    }

    #[must_use]
    pub fn in_location(self, location: impl Into<lantern_data::LocationId>) -> Self {
        self.with_parent(ParentEntity::Location(location.into()))
    }

    #[must_use]
    pub fn carried(self) -> Self {
        self.with_parent(ParentEntity::Player)
    }
}
