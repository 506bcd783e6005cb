//! Wearing and removing clothing.

use crate::handler::{ActionContext, ActionHandler};
use crate::handlers::{flip_flag, touch};
use crate::item::attrs;
use crate::response::ActionResponse;
use crate::vocabulary::SyntaxFrame;
use lantern_data::{ActionResult, VerbId};

/// `wear` / `don`. Wearing implies the item stays parented to the player.
pub struct Wear;

impl ActionHandler for Wear {
    fn verb(&self) -> VerbId {
        "wear".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["wear", "don"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.direct_item()?;
        if !item.is_wearable() {
            return Err(ActionResponse::ItemNotWearable(item.id.clone()));
        }
        if item.is_worn() {
            return Err(ActionResponse::ItemIsAlreadyWorn(item.id.clone()));
        }
        ctx.held_direct_item()?;
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        Ok(ActionResult::with_message(format!("You put on the {}.", item.name()))
            .and_change(flip_flag(&item.id, attrs::IS_WORN, false, true))
            .and_change(touch(&item.id)))
    }
}

/// `take off` / `doff`.
pub struct Remove;

impl ActionHandler for Remove {
    fn verb(&self) -> VerbId {
        "remove".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["remove", "doff", "take off"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.direct_item()?;
        if !item.is_wearable() {
            return Err(ActionResponse::ItemNotRemovable(item.id.clone()));
        }
        if !item.is_worn() {
            return Err(ActionResponse::ItemIsNotWorn(item.id.clone()));
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        Ok(ActionResult::with_message(format!("You take off the {}.", item.name()))
            .and_change(flip_flag(&item.id, attrs::IS_WORN, true, false))
            .and_change(touch(&item.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::item::Item;
    use crate::location::Location;
    use crate::player::Player;
    use crate::state::GameState;
    use lantern_data::{EntityReference, ItemId, ParentEntity};

    fn world() -> GameState {
        let mut state = GameState::new_empty();
        state
            .locations
            .insert("hall".into(), Location::new("hall").with_name("Hall").lit());
        state.player = Player::starting_at("hall");
        state.items.insert(
            "cloak".into(),
            Item::new("cloak")
                .with_name("velvet cloak")
                .with_flag(attrs::IS_TAKABLE)
                .with_flag(attrs::IS_WEARABLE)
                .carried(),
        );
        state
    }

    fn ctx<'a>(command: &'a Command, state: &'a GameState, object: &str) -> ActionContext<'a> {
        ActionContext {
            command,
            direct_object: Some(EntityReference::Item(ItemId::from(object))),
            indirect_object: None,
            state,
            from_all_expansion: false,
        }
    }

    #[test]
    fn wear_requires_holding_the_garment() {
        let mut state = world();
        state.items.get_mut(&"cloak".into()).unwrap().parent = ParentEntity::Location("hall".into());
        let command = Command::for_verb("wear");
        let err = Wear.validate(&ctx(&command, &state, "cloak")).unwrap_err();
        assert_eq!(err, ActionResponse::ItemNotHeld("cloak".into()));
    }

    #[test]
    fn wear_sets_worn_and_keeps_player_parent() {
        let mut state = world();
        let command = Command::for_verb("wear");
        let context = ctx(&command, &state, "cloak");
        Wear.validate(&context).unwrap();
        let result = Wear.process(&context).unwrap();
        assert_eq!(result.message.as_deref(), Some("You put on the velvet cloak."));
        state.apply(&result.changes).unwrap();
        let cloak = state.item(&"cloak".into()).unwrap();
        assert!(cloak.is_worn());
        assert_eq!(cloak.parent, ParentEntity::Player);
    }

    #[test]
    fn wear_twice_is_refused() {
        let mut state = world();
        state.items.get_mut(&"cloak".into()).unwrap().attributes.insert(
            lantern_data::AttributeId::from(attrs::IS_WORN),
            lantern_data::StateValue::Bool(true),
        );
        let command = Command::for_verb("wear");
        let err = Wear.validate(&ctx(&command, &state, "cloak")).unwrap_err();
        assert_eq!(err, ActionResponse::ItemIsAlreadyWorn("cloak".into()));
    }

    #[test]
    fn remove_requires_wearing() {
        let state = world();
        let command = Command::for_verb("remove");
        let err = Remove.validate(&ctx(&command, &state, "cloak")).unwrap_err();
        assert_eq!(err, ActionResponse::ItemIsNotWorn("cloak".into()));
    }

    #[test]
    fn remove_clears_worn() {
        let mut state = world();
        state.items.get_mut(&"cloak".into()).unwrap().attributes.insert(
            lantern_data::AttributeId::from(attrs::IS_WORN),
            lantern_data::StateValue::Bool(true),
        );
        let command = Command::for_verb("remove");
        let context = ctx(&command, &state, "cloak");
        Remove.validate(&context).unwrap();
        let result = Remove.process(&context).unwrap();
        state.apply(&result.changes).unwrap();
        assert!(!state.item(&"cloak".into()).unwrap().is_worn());
    }

    #[test]
    fn remove_rejects_unwearable_items() {
        let mut state = world();
        state
            .items
            .insert("rock".into(), Item::new("rock").with_name("rock").carried());
        let command = Command::for_verb("remove");
        let err = Remove.validate(&ctx(&command, &state, "rock")).unwrap_err();
        assert_eq!(err, ActionResponse::ItemNotRemovable("rock".into()));
    }
}
