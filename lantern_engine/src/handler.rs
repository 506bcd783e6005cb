//! The protocol every verb implements.
//!
//! A handler never mutates the world. `validate` rejects bad commands with
//! a typed [`ActionResponse`]; `process` reads a state snapshot and returns
//! an [`ActionResult`] describing prose and changes; `post_process` runs
//! after the changes are applied (default: print the message).

use crate::command::Command;
use crate::io::IoHandler;
use crate::item::Item;
use crate::response::ActionResponse;
use crate::scope;
use crate::state::GameState;
use crate::vocabulary::{SyntaxFrame, VerbEntry};
use lantern_data::{ActionResult, EntityReference, ItemId, VerbId};

/// Everything a handler may look at while validating or processing:
/// the command, the object it is currently asked to act on, and a
/// read-only snapshot of the world.
pub struct ActionContext<'a> {
    pub command: &'a Command,
    /// The principal object for this pass. Multi-object commands run the
    /// pipeline once per object.
    pub direct_object: Option<EntityReference>,
    pub indirect_object: Option<EntityReference>,
    pub state: &'a GameState,
    /// True when this pass came from an `ALL` expansion rather than an
    /// explicitly named object.
    pub from_all_expansion: bool,
}

impl ActionContext<'_> {
    /// The direct object as an item id, or the internal error a handler
    /// reports when dispatched without one.
    pub fn direct_item_id(&self) -> Result<&ItemId, ActionResponse> {
        match &self.direct_object {
            Some(EntityReference::Item(id)) => Ok(id),
            Some(other) => Err(ActionResponse::UnknownEntity(other.clone())),
            None => Err(ActionResponse::InternalEngineError(format!(
                "verb '{}' dispatched without a direct object",
                self.command.verb
            ))),
        }
    }

    /// The direct object item itself.
    pub fn direct_item(&self) -> Result<&Item, ActionResponse> {
        self.state.item(self.direct_item_id()?)
    }

    /// The indirect object as an item id, if one was named.
    pub fn indirect_item_id(&self) -> Result<&ItemId, ActionResponse> {
        match &self.indirect_object {
            Some(EntityReference::Item(id)) => Ok(id),
            Some(other) => Err(ActionResponse::InvalidIndirectObject(Some(other.to_string()))),
            None => Err(ActionResponse::InvalidIndirectObject(None)),
        }
    }

    /// The direct object, required to be within reach.
    pub fn reachable_direct_item(&self) -> Result<&Item, ActionResponse> {
        let id = self.direct_item_id()?;
        if scope::can_touch(self.state, id) {
            self.state.item(id)
        } else {
            Err(ActionResponse::ItemNotAccessible(id.clone()))
        }
    }

    /// The direct object, required to be held by the player.
    pub fn held_direct_item(&self) -> Result<&Item, ActionResponse> {
        let item = self.direct_item()?;
        if item.parent == lantern_data::ParentEntity::Player {
            Ok(item)
        } else {
            Err(ActionResponse::ItemNotHeld(item.id.clone()))
        }
    }
}

/// The contract shared by every verb.
pub trait ActionHandler {
    /// Canonical verb id this handler claims.
    fn verb(&self) -> VerbId;

    /// Words (possibly two-word phrases) that invoke this verb.
    fn words(&self) -> Vec<&'static str>;

    /// Grammatical shapes accepted.
    fn frames(&self) -> Vec<SyntaxFrame>;

    /// Prepositions that introduce this verb's indirect object.
    fn prepositions(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Whether `verb x and y` / `verb all` are legal.
    fn supports_multiple_objects(&self) -> bool {
        false
    }

    /// Whether the engine should refuse this verb in the dark.
    fn requires_light(&self) -> bool {
        false
    }

    /// Check the command without mutating anything.
    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse>;

    /// Produce the result: prose plus the changes to apply.
    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse>;

    /// Runs after the result is applied. The context carries a fresh
    /// post-apply snapshot. Default: print the result's message.
    fn post_process(&self, _ctx: &ActionContext, result: &ActionResult, io: &mut dyn IoHandler) {
        if let Some(message) = &result.message {
            io.print(message);
        }
    }

    /// The objects `verb ALL` expands to, in no particular order; the
    /// engine sorts them. Default: nothing.
    fn all_scope(&self, _state: &GameState) -> Vec<ItemId> {
        Vec::new()
    }

    /// Message shown when an `ALL` expansion comes up empty.
    fn empty_all_message(&self) -> String {
        "There is nothing here to do that with.".to_string()
    }

    /// Present-tense verb used to aggregate multi-object successes into
    /// one sentence ("You take the coin and the key.").
    fn aggregate_verb(&self) -> &'static str {
        "handle"
    }

    /// Build this handler's vocabulary entry.
    fn vocabulary_entry(&self) -> VerbEntry {
        let mut entry = VerbEntry::new(self.verb())
            .with_words(self.words())
            .with_frames(self.frames())
            .with_prepositions(self.prepositions());
        if self.supports_multiple_objects() {
            entry = entry.multi_object();
        }
        entry
    }
}
