//! The mutation currency: `StateChange`, `SideEffect`, and `ActionResult`.
//!
//! Nothing in the engine mutates world state directly. Handlers, hooks, and
//! timers all describe what should happen with these records; the engine
//! validates and applies them in one atomic step per result.

use crate::ids::{AttributeId, DaemonId, FuseId, GlobalId};
use crate::reference::EntityReference;
use crate::value::StateValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a [`StateChange`] addresses on its target entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "target", rename_all = "camelCase")]
pub enum AttributeKey {
    /// A per-item flag or scalar attribute.
    ItemAttribute(AttributeId),
    /// The item's place in the parent graph.
    ItemParent,
    /// A per-location flag or scalar attribute.
    LocationAttribute(AttributeId),
    /// A location's full exit table (payload is an opaque exits map).
    LocationExits,
    PlayerScore,
    PlayerMoves,
    PlayerLocation,
    PlayerInventoryLimit,
    PlayerHealth,
    /// The referent list of one pronoun ("it", "them", ...).
    PronounReference(String),
    /// Raise a global flag.
    SetFlag(GlobalId),
    /// Clear a global flag.
    ClearFlag(GlobalId),
    /// A global state slot.
    GlobalState(GlobalId),
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKey::ItemAttribute(attr) => write!(f, "item.{attr}"),
            AttributeKey::ItemParent => write!(f, "item.parent"),
            AttributeKey::LocationAttribute(attr) => write!(f, "location.{attr}"),
            AttributeKey::LocationExits => write!(f, "location.exits"),
            AttributeKey::PlayerScore => write!(f, "player.score"),
            AttributeKey::PlayerMoves => write!(f, "player.moves"),
            AttributeKey::PlayerLocation => write!(f, "player.location"),
            AttributeKey::PlayerInventoryLimit => write!(f, "player.inventoryLimit"),
            AttributeKey::PlayerHealth => write!(f, "player.health"),
            AttributeKey::PronounReference(word) => write!(f, "pronoun.{word}"),
            AttributeKey::SetFlag(flag) => write!(f, "flag.set.{flag}"),
            AttributeKey::ClearFlag(flag) => write!(f, "flag.clear.{flag}"),
            AttributeKey::GlobalState(global) => write!(f, "global.{global}"),
        }
    }
}

/// One validated, atomic mutation record.
///
/// When `old_value` is present it is checked against the live value at
/// apply time; a mismatch rejects the whole containing result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub entity: EntityReference,
    pub key: AttributeKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<StateValue>,
    pub new_value: StateValue,
}

impl StateChange {
    /// A change that applies unconditionally.
    pub fn new(entity: EntityReference, key: AttributeKey, new_value: StateValue) -> Self {
        Self {
            entity,
            key,
            old_value: None,
            new_value,
        }
    }

    /// A change guarded by the value it expects to replace.
    pub fn guarded(
        entity: EntityReference,
        key: AttributeKey,
        old_value: StateValue,
        new_value: StateValue,
    ) -> Self {
        Self {
            entity,
            key,
            old_value: Some(old_value),
            new_value,
        }
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {:?}", self.entity, self.key, self.new_value)
    }
}

/// A deferred consequence of an action, applied after the changes of the
/// same [`ActionResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SideEffect {
    /// Arm a fuse; `turns` overrides the registered default countdown.
    StartFuse {
        fuse: FuseId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turns: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<StateValue>,
    },
    /// Disarm a fuse before it fires.
    StopFuse { fuse: FuseId },
    /// Activate a daemon so it ticks every turn.
    RunDaemon { daemon: DaemonId },
    /// Deactivate a daemon.
    StopDaemon { daemon: DaemonId },
    /// Fire a fuse behavior once on a future turn without arming a fuse.
    ScheduleEvent {
        fuse: FuseId,
        turns: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<StateValue>,
    },
}

/// The sole product of a verb handler's `process` step, and the only way
/// hooks and timers feed mutations back to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// User-visible prose for this turn, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Ordered changes; applied atomically.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<StateChange>,
    /// Applied after the last change.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<SideEffect>,
    /// Before-turn hooks set this to request that default processing
    /// continue after the hook's own result is applied.
    #[serde(default)]
    pub should_yield_to_engine: bool,
}

impl ActionResult {
    /// A result carrying only prose.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// The sentinel a before-turn hook returns to decline: no message, no
    /// changes, and default processing continues.
    pub fn yield_to_engine() -> Self {
        Self {
            should_yield_to_engine: true,
            ..Self::default()
        }
    }

    /// True for the bare yield sentinel.
    pub fn is_yield(&self) -> bool {
        self.should_yield_to_engine && self.message.is_none() && self.changes.is_empty() && self.effects.is_empty()
    }

    /// Append a change, builder-style.
    #[must_use]
    pub fn and_change(mut self, change: StateChange) -> Self {
        self.changes.push(change);
        self
    }

    /// Append a side effect, builder-style.
    #[must_use]
    pub fn and_effect(mut self, effect: SideEffect) -> Self {
        self.effects.push(effect);
        self
    }
}
