//! Fuses, daemons, and the one-shot event scheduler.
//!
//! A fuse counts down once per turn and fires a registered behavior when it
//! reaches zero. A daemon ticks every turn until stopped. Scheduled events
//! fire a fuse behavior once on a specific future turn without arming a
//! fuse. Active instances live in [`crate::GameState`] so they persist
//! across saves; the behaviors themselves are registered on the engine at
//! blueprint time.

use crate::state::GameState;
use lantern_data::{ActionResult, DaemonId, FuseId, StateValue};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A burning fuse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuseState {
    /// Turns left before the fuse fires.
    pub remaining: u64,
    /// Turn on which the fuse was armed. A fuse never ticks on the turn
    /// that armed it.
    pub armed_on: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<StateValue>,
}

/// A running (or suspended) daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonState {
    pub active: bool,
    /// Turn on which the daemon was started; it first ticks the turn after.
    pub started_on: i64,
}

/// One future firing of a fuse behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub fuse: FuseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<StateValue>,
}

/// Pending one-shot events, keyed by the turn they fire on.
///
/// A sorted map (rather than a heap) keeps the serialized form canonical;
/// events on the same turn fire in the order they were scheduled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    pub pending: BTreeMap<i64, Vec<ScheduledEvent>>,
}

impl Scheduler {
    /// Queue an event `turns_ahead` turns in the future (at least one).
    pub fn schedule_in(&mut self, now: i64, turns_ahead: u64, event: ScheduledEvent) {
        let turns_ahead = turns_ahead.max(1);
        let due = now.saturating_add(i64::try_from(turns_ahead).unwrap_or(i64::MAX));
        info!("scheduling event '{}' for turn {due} (now {now})", event.fuse);
        self.pending.entry(due).or_default().push(event);
    }

    /// Remove and return every event due on or before `now`, oldest first.
    pub fn pop_due(&mut self, now: i64) -> Vec<ScheduledEvent> {
        let due_turns: Vec<i64> = self.pending.range(..=now).map(|(turn, _)| *turn).collect();
        let mut due = Vec::new();
        for turn in due_turns {
            if let Some(events) = self.pending.remove(&turn) {
                due.extend(events);
            }
        }
        due
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Context handed to fuse and daemon behaviors.
pub struct TimerContext<'a> {
    pub state: &'a GameState,
    pub payload: Option<&'a StateValue>,
}

/// A fuse or daemon body: reads state, returns the result to apply.
pub type TimerBehavior = Box<dyn Fn(&TimerContext) -> anyhow::Result<Option<ActionResult>>>;

/// A registered fuse: a default countdown plus its firing behavior.
pub struct FuseDefinition {
    pub id: FuseId,
    pub default_turns: u64,
    pub behavior: TimerBehavior,
}

/// A registered daemon behavior.
pub struct DaemonDefinition {
    pub id: DaemonId,
    pub behavior: TimerBehavior,
}

/// Engine-side registry of timer behaviors, populated from the blueprint.
#[derive(Default)]
pub struct TimerRegistry {
    fuses: HashMap<FuseId, FuseDefinition>,
    daemons: HashMap<DaemonId, DaemonDefinition>,
}

impl TimerRegistry {
    pub fn register_fuse(&mut self, definition: FuseDefinition) {
        self.fuses.insert(definition.id.clone(), definition);
    }

    pub fn register_daemon(&mut self, definition: DaemonDefinition) {
        self.daemons.insert(definition.id.clone(), definition);
    }

    pub fn fuse(&self, id: &FuseId) -> Option<&FuseDefinition> {
        self.fuses.get(id)
    }

    pub fn daemon(&self, id: &DaemonId) -> Option<&DaemonDefinition> {
        self.daemons.get(id)
    }
}
