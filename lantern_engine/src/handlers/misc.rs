//! Small verbs: score, wait, touch, kick, give, eat.

use crate::handler::{ActionContext, ActionHandler};
use crate::handlers::{move_item, touch};
use crate::response::ActionResponse;
use crate::scope;
use crate::vocabulary::SyntaxFrame;
use lantern_data::{ActionResult, ParentEntity, VerbId};

/// `score`.
pub struct Score;

impl ActionHandler for Score {
    fn verb(&self) -> VerbId {
        "score".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["score"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::Intransitive]
    }

    fn validate(&self, _ctx: &ActionContext) -> Result<(), ActionResponse> {
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        Ok(ActionResult::with_message(format!(
            "Your score is {} (in {} moves).",
            ctx.state.player.score, ctx.state.player.moves
        )))
    }
}

/// `wait` / `z`.
pub struct Wait;

impl ActionHandler for Wait {
    fn verb(&self) -> VerbId {
        "wait".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["wait", "z"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::Intransitive]
    }

    fn validate(&self, _ctx: &ActionContext) -> Result<(), ActionResponse> {
        Ok(())
    }

    fn process(&self, _ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        Ok(ActionResult::with_message("Time passes."))
    }
}

/// `touch` / `feel`.
pub struct Touch;

impl ActionHandler for Touch {
    fn verb(&self) -> VerbId {
        "touch".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["touch", "feel"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        ctx.reachable_direct_item().map(|_| ())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        Ok(ActionResult::with_message("You feel nothing unexpected.").and_change(touch(&item.id)))
    }
}

/// `kick`.
pub struct Kick;

impl ActionHandler for Kick {
    fn verb(&self) -> VerbId {
        "kick".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["kick"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        ctx.reachable_direct_item().map(|_| ())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        Ok(
            ActionResult::with_message(format!("Kicking the {} accomplishes nothing.", item.name()))
                .and_change(touch(&item.id)),
        )
    }
}

/// `give <item> to <target>`. With no one around to accept, the offer is
/// politely declined; games script real recipients through hooks.
pub struct Give;

impl ActionHandler for Give {
    fn verb(&self) -> VerbId {
        "give".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["give", "offer"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectAndIndirect]
    }

    fn prepositions(&self) -> Vec<&'static str> {
        vec!["to"]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        ctx.held_direct_item()?;
        let target_id = ctx.indirect_item_id()?;
        if !scope::can_see(ctx.state, target_id) {
            return Err(ActionResponse::ItemNotAccessible(target_id.clone()));
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let target_id = ctx.indirect_item_id()?;
        Ok(ActionResult::with_message(format!(
            "The {} doesn't seem interested.",
            ctx.state.item_name(target_id)
        )))
    }
}

/// `eat`.
pub struct Eat;

impl ActionHandler for Eat {
    fn verb(&self) -> VerbId {
        "eat".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["eat", "devour"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.reachable_direct_item()?;
        if !item.is_edible() {
            return Err(ActionResponse::ItemNotEdible(item.id.clone()));
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        Ok(
            ActionResult::with_message(format!("You eat the {}. Not bad.", item.name()))
                .and_change(move_item(&item.id, &item.parent, ParentEntity::Nowhere)),
        )
    }
}
