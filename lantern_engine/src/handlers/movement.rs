//! Movement between locations.

use crate::handler::{ActionContext, ActionHandler};
use crate::handlers::perception::describe_location;
use crate::io::IoHandler;
use crate::response::ActionResponse;
use crate::vocabulary::SyntaxFrame;
use lantern_data::{ActionResult, AttributeKey, EntityReference, StateChange, StateValue, VerbId};

/// `go <direction>`, including bare direction words.
pub struct Go;

impl Go {
    fn resolve_exit<'a>(ctx: &'a ActionContext) -> Result<(&'a crate::location::Exit, String), ActionResponse> {
        let Some(direction) = ctx.command.direction else {
            return Err(ActionResponse::InvalidDirection);
        };
        let here = ctx.state.player_location()?;
        let Some(exit) = here.exit(direction) else {
            return Err(ActionResponse::InvalidDirection);
        };
        Ok((exit, direction.to_string()))
    }
}

impl ActionHandler for Go {
    fn verb(&self) -> VerbId {
        "go".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["go", "walk", "head"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectionOnly]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let (exit, direction) = Self::resolve_exit(ctx)?;
        if exit.is_door && exit.is_locked {
            let reason = exit
                .blocked_message
                .clone()
                .unwrap_or_else(|| format!("The {direction} door seems to be locked."));
            return Err(ActionResponse::DirectionIsBlocked(Some(reason)));
        }
        if exit.is_door && !exit.is_open {
            let reason = exit
                .blocked_message
                .clone()
                .unwrap_or_else(|| format!("The {direction} door is closed."));
            return Err(ActionResponse::DirectionIsBlocked(Some(reason)));
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let (exit, _) = Self::resolve_exit(ctx)?;
        let change = StateChange::guarded(
            EntityReference::Player,
            AttributeKey::PlayerLocation,
            StateValue::LocationId(ctx.state.player.current_location.clone()),
            StateValue::LocationId(exit.destination.clone()),
        );
        Ok(ActionResult::default().and_change(change))
    }

    /// Successful movement shows the new room instead of a bare message.
    fn post_process(&self, ctx: &ActionContext, _result: &ActionResult, io: &mut dyn IoHandler) {
        if crate::scope::is_location_lit(ctx.state, &ctx.state.player.current_location) {
            io.print(&describe_location(ctx.state));
        } else {
            io.print(crate::response::DARKNESS_MESSAGE);
        }
    }
}
