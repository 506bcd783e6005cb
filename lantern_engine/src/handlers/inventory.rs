//! Take, drop, and the inventory listing.

use crate::handler::{ActionContext, ActionHandler};
use crate::handlers::{flip_flag, move_item, touch};
use crate::item::attrs;
use crate::response::ActionResponse;
use crate::scope;
use crate::state::GameState;
use crate::vocabulary::SyntaxFrame;
use lantern_data::{ActionResult, ItemId, ParentEntity, VerbId};

/// `take` / `get` / `pick up`, with ALL support.
pub struct Take;

impl ActionHandler for Take {
    fn verb(&self) -> VerbId {
        "take".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["take", "get", "grab", "carry", "pick up"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn supports_multiple_objects(&self) -> bool {
        true
    }

    fn requires_light(&self) -> bool {
        true
    }

    fn aggregate_verb(&self) -> &'static str {
        "take"
    }

    fn empty_all_message(&self) -> String {
        "There is nothing here to take.".to_string()
    }

    /// Takable items within reach that aren't already in hand, including
    /// the contents of open containers the player carries.
    fn all_scope(&self, state: &GameState) -> Vec<ItemId> {
        scope::reachable_from_player(state)
            .into_iter()
            .filter(|id| {
                state.items.get(id).is_some_and(|item| {
                    item.is_takable() && !item.is_scenery() && item.parent != ParentEntity::Player
                })
            })
            .collect()
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.reachable_direct_item()?;
        if item.parent == ParentEntity::Player {
            return Err(ActionResponse::Custom(format!("You already have the {}.", item.name())));
        }
        if !item.is_takable() || item.is_scenery() {
            return Err(ActionResponse::ItemNotTakable(item.id.clone()));
        }
        if let ParentEntity::Item(holder_id) = &item.parent {
            let holder = ctx.state.item(holder_id)?;
            if holder.is_container() && !holder.is_open() {
                return Err(ActionResponse::ContainerIsClosed(holder_id.clone()));
            }
        }
        if ctx.state.carried_load() + item.size() > ctx.state.player.carrying_capacity {
            return Err(ActionResponse::PlayerCannotCarryMore);
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        let mut result = ActionResult::with_message("Taken.")
            .and_change(move_item(&item.id, &item.parent, ParentEntity::Player))
            .and_change(touch(&item.id));
        if item.is_worn() {
            result = result.and_change(flip_flag(&item.id, attrs::IS_WORN, true, false));
        }
        Ok(result)
    }
}

/// `drop` / `discard` / `put down`, with ALL support.
pub struct Drop;

impl ActionHandler for Drop {
    fn verb(&self) -> VerbId {
        "drop".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["drop", "discard", "put down"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn supports_multiple_objects(&self) -> bool {
        true
    }

    fn aggregate_verb(&self) -> &'static str {
        "drop"
    }

    fn empty_all_message(&self) -> String {
        "You aren't carrying anything.".to_string()
    }

    /// Held items, excluding whatever is being worn.
    fn all_scope(&self, state: &GameState) -> Vec<ItemId> {
        state
            .carried_items()
            .into_iter()
            .filter(|item| !item.is_worn() && !item.is_scenery())
            .map(|item| item.id.clone())
            .collect()
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.held_direct_item()?;
        if item.is_scenery() {
            return Err(ActionResponse::ItemNotDroppable(item.id.clone()));
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        let here = ParentEntity::Location(ctx.state.player.current_location.clone());
        let mut result = ActionResult::with_message("Dropped.")
            .and_change(move_item(&item.id, &item.parent, here))
            .and_change(touch(&item.id));
        if item.is_worn() {
            result = result.and_change(flip_flag(&item.id, attrs::IS_WORN, true, false));
        }
        Ok(result)
    }
}

/// `inventory` / `i`.
pub struct Inventory;

impl ActionHandler for Inventory {
    fn verb(&self) -> VerbId {
        "inventory".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["inventory", "inv", "i"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::Intransitive]
    }

    fn validate(&self, _ctx: &ActionContext) -> Result<(), ActionResponse> {
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let carried = ctx.state.carried_items();
        if carried.is_empty() {
            return Ok(ActionResult::with_message("You are empty-handed."));
        }
        let mut lines = vec!["You are carrying:".to_string()];
        for item in carried {
            let suffix = if item.is_worn() { " (being worn)" } else { "" };
            lines.push(format!("  {}{suffix}", item.name()));
        }
        Ok(ActionResult::with_message(lines.join("\n")))
    }
}
