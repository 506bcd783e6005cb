//! Event hooks: per-location and per-item turn interception.
//!
//! A hook is a plain function registered at blueprint time; there is no
//! subclassing. Returning `None` (or the yield sentinel) lets default
//! processing continue; any other result is applied by the engine, which
//! skips default processing for `beforeTurn` results that don't yield.
//! A hook that fails is logged and treated as if it had returned `None`,
//! so a buggy hook cannot wedge the engine.

use crate::command::Command;
use crate::state::GameState;
use lantern_data::{ActionResult, ItemId, LocationId};
use log::error;
use std::collections::HashMap;

/// Events a location hook can observe.
#[derive(Debug, Clone)]
pub enum LocationEvent {
    BeforeTurn(Command),
    AfterTurn(Command),
    /// Fired exactly when the player's location changes to this location.
    OnEnter,
}

/// Events an item hook can observe (on the direct or indirect object).
#[derive(Debug, Clone)]
pub enum ItemEvent {
    BeforeTurn(Command),
    AfterTurn(Command),
}

/// Read-only view handed to hooks.
pub struct HookContext<'a> {
    pub state: &'a GameState,
}

pub type LocationHook = Box<dyn Fn(&HookContext, &LocationEvent) -> anyhow::Result<Option<ActionResult>>>;
pub type ItemHook = Box<dyn Fn(&HookContext, &ItemEvent) -> anyhow::Result<Option<ActionResult>>>;

/// Blueprint-configured hook functions, keyed by the entity they watch.
#[derive(Default)]
pub struct HookRegistry {
    location_hooks: HashMap<LocationId, LocationHook>,
    item_hooks: HashMap<ItemId, ItemHook>,
}

impl HookRegistry {
    pub fn register_location(&mut self, id: LocationId, hook: LocationHook) {
        self.location_hooks.insert(id, hook);
    }

    pub fn register_item(&mut self, id: ItemId, hook: ItemHook) {
        self.item_hooks.insert(id, hook);
    }

    /// Fire a location hook, swallowing (but logging) hook errors.
    pub fn fire_location(&self, state: &GameState, id: &LocationId, event: &LocationEvent) -> Option<ActionResult> {
        let hook = self.location_hooks.get(id)?;
        let context = HookContext { state };
        match hook(&context, event) {
            Ok(result) => result,
            Err(err) => {
                error!("location hook for '{id}' failed ({event:?}): {err}");
                None
            },
        }
    }

    /// Fire an item hook, swallowing (but logging) hook errors.
    pub fn fire_item(&self, state: &GameState, id: &ItemId, event: &ItemEvent) -> Option<ActionResult> {
        let hook = self.item_hooks.get(id)?;
        let context = HookContext { state };
        match hook(&context, event) {
            Ok(result) => result,
            Err(err) => {
                error!("item hook for '{id}' failed ({event:?}): {err}");
                None
            },
        }
    }
}
