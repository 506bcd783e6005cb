//! Looking around, examining, and reading.

use crate::handler::{ActionContext, ActionHandler};
use crate::handlers::{join_names, touch};
use crate::response::ActionResponse;
use crate::scope;
use crate::state::GameState;
use crate::vocabulary::SyntaxFrame;
use lantern_data::{ActionResult, ParentEntity, VerbId};

/// Compose the standard room description: name, prose, visible items,
/// and obvious exits. Used by `look` and after successful movement.
pub fn describe_location(state: &GameState) -> String {
    let Ok(location) = state.player_location() else {
        return "You are nowhere at all.".to_string();
    };
    let mut lines = vec![location.name().to_string()];
    if let Some(description) = location.description() {
        lines.push(description.to_string());
    }

    let visible = scope::visible_to_player(state);
    let listed: Vec<String> = state
        .children_of(&ParentEntity::Location(location.id.clone()))
        .into_iter()
        .filter(|item| visible.contains(&item.id) && !item.is_scenery())
        .map(|item| format!("a {}", item.name()))
        .collect();
    if !listed.is_empty() {
        lines.push(format!("You can see {} here.", join_names(&listed)));
    }

    let exits: Vec<String> = location.exits.keys().map(ToString::to_string).collect();
    if !exits.is_empty() {
        lines.push(format!("Obvious exits: {}.", exits.join(", ")));
    }
    lines.join("\n")
}

/// `look` / `l`.
pub struct Look;

impl ActionHandler for Look {
    fn verb(&self) -> VerbId {
        "look".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["look", "l"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::Intransitive]
    }

    fn requires_light(&self) -> bool {
        true
    }

    fn validate(&self, _ctx: &ActionContext) -> Result<(), ActionResponse> {
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        Ok(ActionResult::with_message(describe_location(ctx.state)))
    }
}

/// `examine` / `x` / `look at`.
pub struct Examine;

impl ActionHandler for Examine {
    fn verb(&self) -> VerbId {
        "examine".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["examine", "x", "inspect", "look at", "look in"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn requires_light(&self) -> bool {
        true
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let id = ctx.direct_item_id()?;
        if scope::can_see(ctx.state, id) {
            Ok(())
        } else {
            Err(ActionResponse::ItemNotAccessible(id.clone()))
        }
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        let mut lines = vec![
            item.description()
                .map_or_else(|| format!("You see nothing special about the {}.", item.name()), ToString::to_string),
        ];
        if item.is_container() {
            if item.is_open() || item.is_transparent() {
                let contents: Vec<String> = ctx
                    .state
                    .children_of(&ParentEntity::Item(item.id.clone()))
                    .into_iter()
                    .map(|inner| format!("a {}", inner.name()))
                    .collect();
                if contents.is_empty() {
                    lines.push(format!("The {} is empty.", item.name()));
                } else {
                    lines.push(format!("The {} contains {}.", item.name(), join_names(&contents)));
                }
            } else {
                lines.push(format!("The {} is closed.", item.name()));
            }
        }
        if item.is_device() {
            let status = if item.is_on() { "on" } else { "off" };
            lines.push(format!("It is currently {status}."));
        }
        Ok(ActionResult::with_message(lines.join("\n")))
    }
}

/// `read`.
pub struct Read;

impl ActionHandler for Read {
    fn verb(&self) -> VerbId {
        "read".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["read"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn requires_light(&self) -> bool {
        true
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.reachable_direct_item()?;
        if !item.is_readable() {
            return Err(ActionResponse::ItemNotReadable(item.id.clone()));
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        let message = item
            .text()
            .map_or_else(|| "The writing is too faint to make out.".to_string(), ToString::to_string);
        Ok(ActionResult::with_message(message).and_change(touch(&item.id)))
    }
}
