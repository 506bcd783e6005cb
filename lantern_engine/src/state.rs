//! The game state and the change-log discipline that guards it.
//!
//! [`GameState`] is the sole owner of mutable world data. Nothing outside
//! this module writes to it directly: every mutation arrives as a list of
//! [`StateChange`]s through [`GameState::apply`], which validates the whole
//! batch before committing any of it and appends the batch to the
//! append-only change history.

use crate::item::Item;
use crate::location::{EXITS_TYPE_NAME, Exit, Location};
use crate::player::Player;
use crate::response::ActionResponse;
use crate::timers::{DaemonState, FuseState, ScheduledEvent, Scheduler};
use lantern_data::{
    AttributeKey, DaemonId, EntityReference, FuseId, GlobalId, ItemId, LocationId, ParentEntity, StateChange,
    StateValue,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Complete state of a running game.
///
/// Built once from a blueprint, mutated only through [`GameState::apply`],
/// and destroyed at process exit. Every collection is ordered so the
/// serialized form is canonical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub items: BTreeMap<ItemId, Item>,
    pub locations: BTreeMap<LocationId, Location>,
    pub player: Player,
    pub global_states: BTreeMap<GlobalId, StateValue>,
    pub flags: BTreeSet<GlobalId>,
    pub pronouns: BTreeMap<String, Vec<EntityReference>>,
    pub active_fuses: BTreeMap<FuseId, FuseState>,
    pub active_daemons: BTreeMap<DaemonId, DaemonState>,
    pub scheduler: Scheduler,
    /// Every change ever applied, in application order.
    pub change_history: Vec<StateChange>,
}

impl GameState {
    /// An empty world with a default player; blueprints populate it.
    pub fn new_empty() -> Self {
        Self {
            items: BTreeMap::new(),
            locations: BTreeMap::new(),
            player: Player::default(),
            global_states: BTreeMap::new(),
            flags: BTreeSet::new(),
            pronouns: BTreeMap::new(),
            active_fuses: BTreeMap::new(),
            active_daemons: BTreeMap::new(),
            scheduler: Scheduler::default(),
            change_history: Vec::new(),
        }
    }

    // ---- lookups ----------------------------------------------------

    /// Fetch an item the caller believes exists.
    pub fn item(&self, id: &ItemId) -> Result<&Item, ActionResponse> {
        self.items
            .get(id)
            .ok_or_else(|| ActionResponse::InternalEngineError(format!("item '{id}' not found in world")))
    }

    /// Fetch a location the caller believes exists.
    pub fn location(&self, id: &LocationId) -> Result<&Location, ActionResponse> {
        self.locations
            .get(id)
            .ok_or_else(|| ActionResponse::InternalEngineError(format!("location '{id}' not found in world")))
    }

    /// The location the player is standing in.
    pub fn player_location(&self) -> Result<&Location, ActionResponse> {
        self.location(&self.player.current_location)
    }

    /// Display name for an item, falling back to its id.
    pub fn item_name(&self, id: &ItemId) -> String {
        self.items.get(id).map_or_else(|| id.to_string(), |item| item.name().to_string())
    }

    /// All items with the given parent, ordered by id.
    pub fn children_of(&self, parent: &ParentEntity) -> Vec<&Item> {
        self.items.values().filter(|item| item.parent == *parent).collect()
    }

    /// Items carried directly by the player, ordered by id.
    pub fn carried_items(&self) -> Vec<&Item> {
        self.children_of(&ParentEntity::Player)
    }

    /// Combined bulk of everything the player carries directly.
    pub fn carried_load(&self) -> i64 {
        self.carried_items().iter().map(|item| item.size()).sum()
    }

    /// Whether a global flag is raised.
    pub fn flag(&self, flag: &GlobalId) -> bool {
        self.flags.contains(flag)
    }

    /// A global state slot, if set.
    pub fn global(&self, id: &GlobalId) -> Option<&StateValue> {
        self.global_states.get(id)
    }

    /// Current referents of a pronoun, if any.
    pub fn pronoun(&self, word: &str) -> Option<&Vec<EntityReference>> {
        self.pronouns.get(word)
    }

    /// Walk an item's ancestor chain to the entity that roots it.
    pub fn root_of(&self, id: &ItemId) -> ParentEntity {
        let mut seen = BTreeSet::new();
        let mut current = id.clone();
        loop {
            if !seen.insert(current.clone()) {
                // cycle in data that predates apply-time checks; treat as lost
                return ParentEntity::Nowhere;
            }
            match self.items.get(&current).map(|item| item.parent.clone()) {
                Some(ParentEntity::Item(holder)) => current = holder,
                Some(other) => return other,
                None => return ParentEntity::Nowhere,
            }
        }
    }

    /// True when placing `item` under `new_parent` would close a loop in
    /// the parent graph (including placing an item inside itself).
    pub fn would_create_cycle(&self, item: &ItemId, new_parent: &ParentEntity) -> bool {
        let mut current = match new_parent {
            ParentEntity::Item(holder) => holder.clone(),
            _ => return false,
        };
        let mut seen = BTreeSet::new();
        loop {
            if current == *item {
                return true;
            }
            if !seen.insert(current.clone()) {
                return true;
            }
            match self.items.get(&current).map(|i| i.parent.clone()) {
                Some(ParentEntity::Item(holder)) => current = holder,
                _ => return false,
            }
        }
    }

    // ---- mutation ---------------------------------------------------

    /// Apply a batch of changes atomically.
    ///
    /// Changes are validated in order against the evolving state: each
    /// `old_value` guard must match the value it is about to replace, a
    /// parent change must not create a cycle, and every addressed entity
    /// must exist. On any failure nothing is mutated and the offending
    /// [`ActionResponse`] is returned; on success all changes are applied
    /// and appended to the change history.
    pub fn apply(&mut self, changes: &[StateChange]) -> Result<(), ActionResponse> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut staged = self.clone();
        for change in changes {
            staged.apply_one(change)?;
        }
        staged.change_history.extend_from_slice(changes);
        debug!("applied {} change(s)", changes.len());
        *self = staged;
        Ok(())
    }

    fn apply_one(&mut self, change: &StateChange) -> Result<(), ActionResponse> {
        self.check_old_value(change)?;
        match (&change.key, &change.entity) {
            (AttributeKey::ItemAttribute(attr), EntityReference::Item(id)) => {
                self.item(id)?;
                if let Some(item) = self.items.get_mut(id) {
                    item.attributes.insert(attr.clone(), change.new_value.clone());
                }
                Ok(())
            },
            (AttributeKey::ItemParent, EntityReference::Item(id)) => {
                let StateValue::Parent(new_parent) = &change.new_value else {
                    return Err(ActionResponse::InternalEngineError(format!(
                        "itemParent change for '{id}' carries a non-parent value"
                    )));
                };
                self.item(id)?;
                self.check_parent_target(new_parent)?;
                if self.would_create_cycle(id, new_parent) {
                    return Err(ActionResponse::InternalEngineError(format!(
                        "moving '{id}' into {new_parent:?} would create a containment cycle"
                    )));
                }
                if let Some(item) = self.items.get_mut(id) {
                    item.parent = new_parent.clone();
                }
                Ok(())
            },
            (AttributeKey::LocationAttribute(attr), EntityReference::Location(id)) => {
                self.location(id)?;
                if let Some(location) = self.locations.get_mut(id) {
                    location.attributes.insert(attr.clone(), change.new_value.clone());
                }
                Ok(())
            },
            (AttributeKey::LocationExits, EntityReference::Location(id)) => {
                let exits: BTreeMap<crate::location::Direction, Exit> = change
                    .new_value
                    .decode_opaque(EXITS_TYPE_NAME)
                    .map_err(|err| ActionResponse::InternalEngineError(format!("bad exits payload for '{id}': {err}")))?;
                self.location(id)?;
                if let Some(location) = self.locations.get_mut(id) {
                    location.exits = exits;
                }
                Ok(())
            },
            (AttributeKey::PlayerScore, _) => {
                self.player.score = self.expect_int(change)?;
                Ok(())
            },
            (AttributeKey::PlayerMoves, _) => {
                self.player.moves = self.expect_int(change)?;
                Ok(())
            },
            (AttributeKey::PlayerInventoryLimit, _) => {
                self.player.carrying_capacity = self.expect_int(change)?;
                Ok(())
            },
            (AttributeKey::PlayerHealth, _) => {
                self.player.health = self.expect_int(change)?;
                Ok(())
            },
            (AttributeKey::PlayerLocation, _) => {
                let StateValue::LocationId(destination) = &change.new_value else {
                    return Err(ActionResponse::InternalEngineError(
                        "playerLocation change carries a non-location value".to_string(),
                    ));
                };
                self.location(destination)?;
                self.player.current_location = destination.clone();
                Ok(())
            },
            (AttributeKey::PronounReference(word), _) => {
                let StateValue::EntityRefSet(refs) = &change.new_value else {
                    return Err(ActionResponse::InternalEngineError(format!(
                        "pronoun '{word}' change carries a non-reference-set value"
                    )));
                };
                self.pronouns.insert(word.clone(), refs.clone());
                Ok(())
            },
            (AttributeKey::SetFlag(flag), _) => {
                self.flags.insert(flag.clone());
                Ok(())
            },
            (AttributeKey::ClearFlag(flag), _) => {
                self.flags.remove(flag);
                Ok(())
            },
            (AttributeKey::GlobalState(global), _) => {
                self.global_states.insert(global.clone(), change.new_value.clone());
                Ok(())
            },
            (key, entity) => Err(ActionResponse::InternalEngineError(format!(
                "change key {key} does not address entity {entity}"
            ))),
        }
    }

    /// Look up the live value a change addresses, for guard validation.
    fn current_value(&self, change: &StateChange) -> Option<StateValue> {
        match (&change.key, &change.entity) {
            (AttributeKey::ItemAttribute(attr), EntityReference::Item(id)) => self
                .items
                .get(id)
                .and_then(|item| item.attributes.get(attr).cloned()),
            (AttributeKey::ItemParent, EntityReference::Item(id)) => {
                self.items.get(id).map(|item| StateValue::Parent(item.parent.clone()))
            },
            (AttributeKey::LocationAttribute(attr), EntityReference::Location(id)) => self
                .locations
                .get(id)
                .and_then(|location| location.attributes.get(attr).cloned()),
            (AttributeKey::LocationExits, EntityReference::Location(id)) => self
                .locations
                .get(id)
                .and_then(|location| location.exits_value().ok()),
            (AttributeKey::PlayerScore, _) => Some(StateValue::Int(self.player.score)),
            (AttributeKey::PlayerMoves, _) => Some(StateValue::Int(self.player.moves)),
            (AttributeKey::PlayerInventoryLimit, _) => Some(StateValue::Int(self.player.carrying_capacity)),
            (AttributeKey::PlayerHealth, _) => Some(StateValue::Int(self.player.health)),
            (AttributeKey::PlayerLocation, _) => {
                Some(StateValue::LocationId(self.player.current_location.clone()))
            },
            (AttributeKey::PronounReference(word), _) => {
                self.pronouns.get(word).map(|refs| StateValue::EntityRefSet(refs.clone()))
            },
            (AttributeKey::SetFlag(flag) | AttributeKey::ClearFlag(flag), _) => {
                Some(StateValue::Bool(self.flags.contains(flag)))
            },
            (AttributeKey::GlobalState(global), _) => self.global_states.get(global).cloned(),
            _ => None,
        }
    }

    fn check_old_value(&self, change: &StateChange) -> Result<(), ActionResponse> {
        let Some(expected) = &change.old_value else {
            return Ok(());
        };
        let actual = self.current_value(change);
        let matches = match &actual {
            Some(actual) => actual == expected,
            // An absent boolean attribute reads as false.
            None => *expected == StateValue::Bool(false),
        };
        if matches {
            Ok(())
        } else {
            Err(ActionResponse::StateValidationFailed {
                change: Box::new(change.clone()),
                actual,
            })
        }
    }

    fn check_parent_target(&self, parent: &ParentEntity) -> Result<(), ActionResponse> {
        match parent {
            ParentEntity::Item(id) => self.item(id).map(|_| ()),
            ParentEntity::Location(id) => self.location(id).map(|_| ()),
            ParentEntity::Player | ParentEntity::Nowhere => Ok(()),
        }
    }

    fn expect_int(&self, change: &StateChange) -> Result<i64, ActionResponse> {
        match &change.new_value {
            StateValue::Int(value) => Ok(*value),
            other => Err(ActionResponse::InternalEngineError(format!(
                "{} change carries non-integer value {other:?}",
                change.key
            ))),
        }
    }

    // ---- timer plumbing (called by the engine for side effects) ------

    /// Arm a fuse. Replaces any burning fuse with the same id.
    pub fn arm_fuse(&mut self, id: FuseId, turns: u64, payload: Option<StateValue>, now: i64) {
        info!("arming fuse '{id}' for {turns} turn(s)");
        self.active_fuses.insert(
            id,
            FuseState {
                remaining: turns.max(1),
                armed_on: now,
                payload,
            },
        );
    }

    /// Disarm a fuse before it fires. Quietly ignores unknown ids.
    pub fn stop_fuse(&mut self, id: &FuseId) {
        if self.active_fuses.remove(id).is_some() {
            info!("fuse '{id}' stopped");
        }
    }

    /// Activate a daemon so it ticks each turn, starting next turn.
    pub fn start_daemon(&mut self, id: DaemonId, now: i64) {
        info!("daemon '{id}' started");
        self.active_daemons.insert(
            id,
            DaemonState {
                active: true,
                started_on: now,
            },
        );
    }

    /// Deactivate a daemon. Quietly ignores unknown ids.
    pub fn stop_daemon(&mut self, id: &DaemonId) {
        if self.active_daemons.remove(id).is_some() {
            info!("daemon '{id}' stopped");
        }
    }

    /// Queue a one-shot event for a future turn.
    pub fn schedule_event(&mut self, fuse: FuseId, turns_ahead: u64, payload: Option<StateValue>, now: i64) {
        self.scheduler.schedule_in(now, turns_ahead, ScheduledEvent { fuse, payload });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::attrs;
    use lantern_data::AttributeId;

    fn test_state() -> GameState {
        let mut state = GameState::new_empty();
        state
            .locations
            .insert("hall".into(), Location::new("hall").with_name("Hall").lit());
        state.player = Player::starting_at("hall");
        state.items.insert(
            "chest".into(),
            Item::new("chest")
                .with_name("iron chest")
                .with_flag(attrs::IS_CONTAINER)
                .with_flag(attrs::IS_OPENABLE)
                .in_location("hall"),
        );
        state
            .items
            .insert("coin".into(), Item::new("coin").with_name("gold coin").in_location("hall"));
        state
    }

    fn open_chest_change(expect_old: bool) -> StateChange {
        let mut change = StateChange::new(
            EntityReference::Item("chest".into()),
            AttributeKey::ItemAttribute(AttributeId::from(attrs::IS_OPEN)),
            StateValue::Bool(true),
        );
        if expect_old {
            change.old_value = Some(StateValue::Bool(false));
        }
        change
    }

    #[test]
    fn apply_updates_attribute_and_history() {
        let mut state = test_state();
        state.apply(&[open_chest_change(true)]).unwrap();
        assert!(state.item(&"chest".into()).unwrap().is_open());
        assert_eq!(state.change_history.len(), 1);
    }

    #[test]
    fn absent_flag_counts_as_false_for_guards() {
        let mut state = test_state();
        // chest has no isOpen attribute yet; a guard expecting false passes
        assert!(state.apply(&[open_chest_change(true)]).is_ok());
    }

    #[test]
    fn stale_guard_rejects_whole_batch() {
        let mut state = test_state();
        state.apply(&[open_chest_change(false)]).unwrap();
        let history_len = state.change_history.len();

        // Now isOpen is true; a guard expecting false must fail, and the
        // valid change bundled after it must not apply either.
        let touch = StateChange::new(
            EntityReference::Item("coin".into()),
            AttributeKey::ItemAttribute(AttributeId::from(attrs::IS_TOUCHED)),
            StateValue::Bool(true),
        );
        let err = state.apply(&[open_chest_change(true), touch]).unwrap_err();
        assert!(matches!(err, ActionResponse::StateValidationFailed { .. }));
        assert!(!state.item(&"coin".into()).unwrap().is_touched());
        assert_eq!(state.change_history.len(), history_len);
    }

    #[test]
    fn guards_validate_against_the_evolving_batch() {
        let mut state = test_state();
        let open = open_chest_change(true);
        let close = StateChange::guarded(
            EntityReference::Item("chest".into()),
            AttributeKey::ItemAttribute(AttributeId::from(attrs::IS_OPEN)),
            StateValue::Bool(true),
            StateValue::Bool(false),
        );
        // The second guard matches only because the first change applied.
        state.apply(&[open, close]).unwrap();
        assert!(!state.item(&"chest".into()).unwrap().is_open());
        assert_eq!(state.change_history.len(), 2);
    }

    #[test]
    fn parent_change_moves_item() {
        let mut state = test_state();
        let take = StateChange::new(
            EntityReference::Item("coin".into()),
            AttributeKey::ItemParent,
            StateValue::Parent(ParentEntity::Player),
        );
        state.apply(&[take]).unwrap();
        assert_eq!(state.item(&"coin".into()).unwrap().parent, ParentEntity::Player);
        assert_eq!(state.carried_load(), 1);
    }

    #[test]
    fn parent_change_rejects_self_insertion() {
        let mut state = test_state();
        let bad = StateChange::new(
            EntityReference::Item("chest".into()),
            AttributeKey::ItemParent,
            StateValue::Parent(ParentEntity::Item("chest".into())),
        );
        let err = state.apply(&[bad]).unwrap_err();
        assert!(matches!(err, ActionResponse::InternalEngineError(_)));
        assert_eq!(state.item(&"chest".into()).unwrap().parent, ParentEntity::Location("hall".into()));
    }

    #[test]
    fn parent_change_rejects_descendant_cycle() {
        let mut state = test_state();
        state.items.insert(
            "pouch".into(),
            Item::new("pouch")
                .with_flag(attrs::IS_CONTAINER)
                .with_flag(attrs::IS_OPEN)
                .with_parent(ParentEntity::Item("chest".into())),
        );
        // chest -> pouch would put the chest inside its own descendant
        let bad = StateChange::new(
            EntityReference::Item("chest".into()),
            AttributeKey::ItemParent,
            StateValue::Parent(ParentEntity::Item("pouch".into())),
        );
        assert!(state.apply(&[bad]).is_err());
    }

    #[test]
    fn parent_change_rejects_missing_target() {
        let mut state = test_state();
        let bad = StateChange::new(
            EntityReference::Item("coin".into()),
            AttributeKey::ItemParent,
            StateValue::Parent(ParentEntity::Item("phantom".into())),
        );
        assert!(state.apply(&[bad]).is_err());
    }

    #[test]
    fn player_location_change_validates_destination() {
        let mut state = test_state();
        let bad = StateChange::new(
            EntityReference::Player,
            AttributeKey::PlayerLocation,
            StateValue::LocationId("void".into()),
        );
        assert!(state.apply(&[bad]).is_err());

        state
            .locations
            .insert("attic".into(), Location::new("attic").lit());
        let good = StateChange::new(
            EntityReference::Player,
            AttributeKey::PlayerLocation,
            StateValue::LocationId("attic".into()),
        );
        state.apply(&[good]).unwrap();
        assert_eq!(state.player.current_location, LocationId::from("attic"));
    }

    #[test]
    fn flags_set_and_clear() {
        let mut state = test_state();
        let raise = StateChange::new(
            EntityReference::Global,
            AttributeKey::SetFlag("metBard".into()),
            StateValue::Bool(true),
        );
        state.apply(&[raise]).unwrap();
        assert!(state.flag(&"metBard".into()));

        let clear = StateChange::guarded(
            EntityReference::Global,
            AttributeKey::ClearFlag("metBard".into()),
            StateValue::Bool(true),
            StateValue::Bool(false),
        );
        state.apply(&[clear]).unwrap();
        assert!(!state.flag(&"metBard".into()));
    }

    #[test]
    fn pronoun_change_replaces_referents() {
        let mut state = test_state();
        let set = StateChange::new(
            EntityReference::Global,
            AttributeKey::PronounReference("it".into()),
            StateValue::EntityRefSet(vec![EntityReference::Item("coin".into())]),
        );
        state.apply(&[set]).unwrap();
        assert_eq!(
            state.pronoun("it"),
            Some(&vec![EntityReference::Item("coin".into())])
        );
    }

    #[test]
    fn history_is_append_only_across_batches() {
        let mut state = test_state();
        state.apply(&[open_chest_change(false)]).unwrap();
        let first = state.change_history.clone();
        let touch = StateChange::new(
            EntityReference::Item("coin".into()),
            AttributeKey::ItemAttribute(AttributeId::from(attrs::IS_TOUCHED)),
            StateValue::Bool(true),
        );
        state.apply(&[touch]).unwrap();
        assert_eq!(&state.change_history[..first.len()], &first[..]);
        assert_eq!(state.change_history.len(), first.len() + 1);
    }

    #[test]
    fn mismatched_key_and_entity_is_internal_error() {
        let mut state = test_state();
        let bad = StateChange::new(
            EntityReference::Player,
            AttributeKey::ItemParent,
            StateValue::Parent(ParentEntity::Player),
        );
        let err = state.apply(&[bad]).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn root_of_walks_nested_containers() {
        let mut state = test_state();
        state.items.insert(
            "pouch".into(),
            Item::new("pouch")
                .with_flag(attrs::IS_CONTAINER)
                .with_parent(ParentEntity::Item("chest".into())),
        );
        state.items.insert(
            "pearl".into(),
            Item::new("pearl").with_parent(ParentEntity::Item("pouch".into())),
        );
        assert_eq!(state.root_of(&"pearl".into()), ParentEntity::Location("hall".into()));
    }

    #[test]
    fn serialization_round_trip_is_byte_identical() {
        let mut state = test_state();
        state.apply(&[open_chest_change(true)]).unwrap();
        let first = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&first).unwrap();
        let second = serde_json::to_string(&back).unwrap();
        assert_eq!(first, second);
    }
}
