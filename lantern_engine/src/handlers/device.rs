//! Turning devices on and off.

use crate::handler::{ActionContext, ActionHandler};
use crate::handlers::{flip_flag, touch};
use crate::item::attrs;
use crate::response::{ActionResponse, GRUE_WARNING};
use crate::scope;
use crate::vocabulary::SyntaxFrame;
use lantern_data::{ActionResult, AttributeId, StateValue, VerbId};

/// `turn on` / `switch on` / `light`.
pub struct TurnOn;

impl ActionHandler for TurnOn {
    fn verb(&self) -> VerbId {
        "turn on".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["turn on", "switch on", "activate", "light"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.reachable_direct_item()?;
        if !item.is_device() {
            return Err(ActionResponse::Custom(format!(
                "You can't turn the {} on.",
                item.name()
            )));
        }
        if item.is_on() {
            return Err(ActionResponse::Custom(format!(
                "The {} is already on.",
                item.name()
            )));
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        Ok(ActionResult::with_message(format!("The {} is now on.", item.name()))
            .and_change(flip_flag(&item.id, attrs::IS_ON, false, true))
            .and_change(touch(&item.id)))
    }
}

/// `turn off` / `switch off` / `douse`. Extinguishing the last light in an
/// unlit room earns the grue warning.
pub struct TurnOff;

impl ActionHandler for TurnOff {
    fn verb(&self) -> VerbId {
        "turn off".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["turn off", "switch off", "douse", "extinguish"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.reachable_direct_item()?;
        if !item.is_device() {
            return Err(ActionResponse::Custom(format!(
                "You can't turn the {} off.",
                item.name()
            )));
        }
        if !item.is_on() {
            return Err(ActionResponse::Custom(format!(
                "The {} is already off.",
                item.name()
            )));
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        let mut message = format!("The {} is now off.", item.name());
        if item.is_light_source() && goes_dark_without(ctx, &item.id) {
            message = format!("{message}\n{GRUE_WARNING}");
        }
        Ok(ActionResult::with_message(message)
            .and_change(flip_flag(&item.id, attrs::IS_ON, true, false))
            .and_change(touch(&item.id)))
    }
}

/// Would the player's location be dark if this light were switched off?
fn goes_dark_without(ctx: &ActionContext, light_id: &lantern_data::ItemId) -> bool {
    let here = ctx.state.player.current_location.clone();
    if !scope::is_location_lit(ctx.state, &here) {
        return false;
    }
    let mut simulated = ctx.state.clone();
    if let Some(item) = simulated.items.get_mut(light_id) {
        item.attributes
            .insert(AttributeId::from(attrs::IS_ON), StateValue::Bool(false));
    }
    !scope::is_location_lit(&simulated, &here)
}
