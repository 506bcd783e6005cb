//! Open/close, lock/unlock, and put.

use crate::handler::{ActionContext, ActionHandler};
use crate::handlers::{flip_flag, join_names, move_item, set_pronoun, touch};
use crate::item::attrs;
use crate::response::ActionResponse;
use crate::scope;
use crate::vocabulary::SyntaxFrame;
use lantern_data::{ActionResult, EntityReference, ItemId, ParentEntity, VerbId};

/// `open`.
pub struct Open;

impl ActionHandler for Open {
    fn verb(&self) -> VerbId {
        "open".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["open"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.reachable_direct_item()?;
        if !item.is_openable() {
            return Err(ActionResponse::ItemNotOpenable(item.id.clone()));
        }
        if item.is_locked() {
            return Err(ActionResponse::ItemIsLocked(item.id.clone()));
        }
        if item.is_open() {
            return Err(ActionResponse::ItemAlreadyOpen(item.id.clone()));
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        let contents = ctx.state.children_of(&ParentEntity::Item(item.id.clone()));
        let message = if item.is_container() && !contents.is_empty() {
            let names: Vec<String> = contents.iter().map(|inner| format!("the {}", inner.name())).collect();
            format!("You open the {}, revealing {}.", item.name(), join_names(&names))
        } else {
            format!("You open the {}.", item.name())
        };
        Ok(ActionResult::with_message(message)
            .and_change(flip_flag(&item.id, attrs::IS_OPEN, false, true))
            .and_change(touch(&item.id)))
    }
}

/// `close` / `shut`.
pub struct Close;

impl ActionHandler for Close {
    fn verb(&self) -> VerbId {
        "close".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["close", "shut"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectOnly]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.reachable_direct_item()?;
        if !item.is_openable() {
            return Err(ActionResponse::ItemNotClosable(item.id.clone()));
        }
        if !item.is_open() {
            return Err(ActionResponse::ItemAlreadyClosed(item.id.clone()));
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        Ok(ActionResult::with_message(format!("You close the {}.", item.name()))
            .and_change(flip_flag(&item.id, attrs::IS_OPEN, true, false))
            .and_change(touch(&item.id)))
    }
}

/// Shared key checks for lock and unlock.
fn validate_key(ctx: &ActionContext, target: &ItemId) -> Result<ItemId, ActionResponse> {
    let key_id = ctx.indirect_item_id()?.clone();
    let key = ctx.state.item(&key_id)?;
    if key.parent != ParentEntity::Player {
        return Err(ActionResponse::ItemNotHeld(key_id));
    }
    let lock = ctx.state.item(target)?;
    match lock.lock_key() {
        Some(expected) if *expected == key_id => Ok(key_id),
        _ => Err(ActionResponse::WrongKey {
            key: key_id,
            lock: target.clone(),
        }),
    }
}

/// `lock <target> with <key>`.
pub struct Lock;

impl ActionHandler for Lock {
    fn verb(&self) -> VerbId {
        "lock".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["lock"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectAndIndirect]
    }

    fn prepositions(&self) -> Vec<&'static str> {
        vec!["with", "using"]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.reachable_direct_item()?;
        if !item.is_lockable() {
            return Err(ActionResponse::ItemNotLockable(item.id.clone()));
        }
        if item.is_locked() {
            return Err(ActionResponse::ItemIsLocked(item.id.clone()));
        }
        if item.is_open() {
            return Err(ActionResponse::Custom(format!(
                "You'll have to close the {} first.",
                item.name()
            )));
        }
        validate_key(ctx, &item.id.clone()).map(|_| ())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        let key_id = ctx.indirect_item_id()?.clone();
        Ok(ActionResult::with_message(format!("You lock the {}.", item.name()))
            .and_change(flip_flag(&item.id, attrs::IS_LOCKED, false, true))
            .and_change(touch(&item.id))
            .and_change(touch(&key_id))
            .and_change(set_pronoun(
                "them",
                vec![
                    EntityReference::Item(key_id.clone()),
                    EntityReference::Item(item.id.clone()),
                ],
            )))
    }
}

/// `unlock <target> with <key>`.
pub struct Unlock;

impl ActionHandler for Unlock {
    fn verb(&self) -> VerbId {
        "unlock".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["unlock"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectAndIndirect]
    }

    fn prepositions(&self) -> Vec<&'static str> {
        vec!["with", "using"]
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.reachable_direct_item()?;
        if !item.is_lockable() {
            return Err(ActionResponse::ItemNotUnlockable(item.id.clone()));
        }
        if !item.is_locked() {
            return Err(ActionResponse::ItemIsUnlocked(item.id.clone()));
        }
        validate_key(ctx, &item.id.clone()).map(|_| ())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        let key_id = ctx.indirect_item_id()?.clone();
        Ok(ActionResult::with_message(format!("You unlock the {}.", item.name()))
            .and_change(flip_flag(&item.id, attrs::IS_LOCKED, true, false))
            .and_change(touch(&item.id))
            .and_change(touch(&key_id))
            .and_change(set_pronoun(
                "them",
                vec![
                    EntityReference::Item(key_id.clone()),
                    EntityReference::Item(item.id.clone()),
                ],
            )))
    }
}

/// `put <item> in/on <target>`: container insertion or surface placement,
/// chosen by the preposition.
pub struct Put;

impl Put {
    fn is_surface_placement(ctx: &ActionContext) -> bool {
        matches!(ctx.command.preposition.as_deref(), Some("on" | "onto"))
    }
}

impl ActionHandler for Put {
    fn verb(&self) -> VerbId {
        "put".into()
    }

    fn words(&self) -> Vec<&'static str> {
        vec!["put", "place", "insert"]
    }

    fn frames(&self) -> Vec<SyntaxFrame> {
        vec![SyntaxFrame::DirectAndIndirect]
    }

    fn prepositions(&self) -> Vec<&'static str> {
        vec!["in", "into", "inside", "on", "onto"]
    }

    fn requires_light(&self) -> bool {
        true
    }

    fn validate(&self, ctx: &ActionContext) -> Result<(), ActionResponse> {
        let item = ctx.held_direct_item()?;
        let target_id = ctx.indirect_item_id()?.clone();
        if item.id == target_id {
            return Err(ActionResponse::Custom(
                "You can't put something inside itself.".to_string(),
            ));
        }
        let target = ctx.state.item(&target_id)?;
        if !scope::can_touch(ctx.state, &target_id) {
            return Err(ActionResponse::ItemNotAccessible(target_id));
        }
        if ctx.state.would_create_cycle(&item.id, &ParentEntity::Item(target_id.clone())) {
            return Err(ActionResponse::Custom(format!(
                "The {} is inside the {}.",
                target.name(),
                item.name()
            )));
        }
        if Self::is_surface_placement(ctx) {
            if !target.is_surface() {
                return Err(ActionResponse::TargetIsNotASurface(target_id));
            }
        } else {
            if !target.is_container() {
                return Err(ActionResponse::TargetIsNotAContainer(target_id));
            }
            if !target.is_open() {
                return Err(ActionResponse::ContainerIsClosed(target_id));
            }
            if let Some(capacity) = target.capacity() {
                let load: i64 = ctx
                    .state
                    .children_of(&ParentEntity::Item(target_id.clone()))
                    .iter()
                    .map(|inner| inner.size())
                    .sum();
                if load + item.size() > capacity {
                    return Err(ActionResponse::ItemTooLargeForContainer {
                        item: item.id.clone(),
                        container: target_id,
                    });
                }
            }
        }
        Ok(())
    }

    fn process(&self, ctx: &ActionContext) -> Result<ActionResult, ActionResponse> {
        let item = ctx.direct_item()?;
        let target_id = ctx.indirect_item_id()?.clone();
        let target_name = ctx.state.item_name(&target_id);
        let joiner = if Self::is_surface_placement(ctx) { "on" } else { "in" };
        let mut result = ActionResult::with_message(format!(
            "You put the {} {joiner} the {target_name}.",
            item.name()
        ))
        .and_change(move_item(&item.id, &item.parent, ParentEntity::Item(target_id.clone())))
        .and_change(touch(&item.id))
        .and_change(touch(&target_id));
        if item.is_worn() {
            result = result.and_change(flip_flag(&item.id, attrs::IS_WORN, true, false));
        }
        result = result.and_change(set_pronoun(
            "them",
            vec![
                EntityReference::Item(item.id.clone()),
                EntityReference::Item(target_id),
            ],
        ));
        Ok(result)
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

    fn world() -> GameState {
        let mut state = GameState::new_empty();
        state
            .locations
            .insert("hall".into(), Location::new("hall").with_name("Hall").lit());
        state.player = Player::starting_at("hall");
        state.items.insert(
            "chest".into(),
            Item::new("chest")
                .with_name("iron chest")
                .with_flag(attrs::IS_CONTAINER)
                .with_flag(attrs::IS_OPENABLE)
                .with_flag(attrs::IS_LOCKABLE)
                .with_flag(attrs::IS_LOCKED)
                .with_lock_key("gold-key")
                .in_location("hall"),
        );
        state.items.insert(
            "gold-key".into(),
            Item::new("gold-key").with_name("gold key").carried(),
        );
        state.items.insert(
            "bent-key".into(),
            Item::new("bent-key").with_name("bent key").carried(),
        );
        state
    }

    fn ctx<'a>(command: &'a Command, state: &'a GameState, object: &str) -> ActionContext<'a> {
        ActionContext {
            command,
            direct_object: Some(EntityReference::Item(ItemId::from(object))),
            indirect_object: command.indirect_object.clone(),
            state,
            from_all_expansion: false,
        }
    }

    fn with_io(mut command: Command, io: &str) -> Command {
        command.indirect_object = Some(EntityReference::Item(ItemId::from(io)));
        command
    }

    #[test]
    fn open_refuses_locked_chest_without_mutation() {
        let state = world();
        let command = Command::for_verb("open");
        let err = Open.validate(&ctx(&command, &state, "chest")).unwrap_err();
        assert_eq!(err, ActionResponse::ItemIsLocked("chest".into()));
    }

    #[test]
    fn open_reveals_contents() {
        let mut state = world();
        {
            let chest = state.items.get_mut(&"chest".into()).unwrap();
            chest.attributes.remove(&lantern_data::AttributeId::from(attrs::IS_LOCKED));
        }
        state.items.insert(
            "pearl".into(),
            Item::new("pearl")
                .with_name("white pearl")
                .with_parent(ParentEntity::Item("chest".into())),
        );
        let command = Command::for_verb("open");
        let context = ctx(&command, &state, "chest");
        Open.validate(&context).unwrap();
        let result = Open.process(&context).unwrap();
        assert_eq!(
            result.message.as_deref(),
            Some("You open the iron chest, revealing the white pearl.")
        );
        state.apply(&result.changes).unwrap();
        assert!(state.item(&"chest".into()).unwrap().is_open());
    }

    #[test]
    fn close_rejects_already_closed() {
        let state = world();
        let command = Command::for_verb("close");
        let err = Close.validate(&ctx(&command, &state, "chest")).unwrap_err();
        assert_eq!(err, ActionResponse::ItemAlreadyClosed("chest".into()));
    }

    #[test]
    fn unlock_with_wrong_key_is_refused() {
        let state = world();
        let command = with_io(Command::for_verb("unlock"), "bent-key");
        let err = Unlock.validate(&ctx(&command, &state, "chest")).unwrap_err();
        assert_eq!(
            err,
            ActionResponse::WrongKey {
                key: "bent-key".into(),
                lock: "chest".into(),
            }
        );
    }

    #[test]
    fn unlock_requires_key_in_hand() {
        let mut state = world();
        state.items.get_mut(&"gold-key".into()).unwrap().parent = ParentEntity::Location("hall".into());
        let command = with_io(Command::for_verb("unlock"), "gold-key");
        let err = Unlock.validate(&ctx(&command, &state, "chest")).unwrap_err();
        assert_eq!(err, ActionResponse::ItemNotHeld("gold-key".into()));
    }

    #[test]
    fn unlock_sets_them_to_key_and_target() {
        let mut state = world();
        let command = with_io(Command::for_verb("unlock"), "gold-key");
        let context = ctx(&command, &state, "chest");
        Unlock.validate(&context).unwrap();
        let result = Unlock.process(&context).unwrap();
        assert_eq!(result.message.as_deref(), Some("You unlock the iron chest."));
        state.apply(&result.changes).unwrap();
        assert!(!state.item(&"chest".into()).unwrap().is_locked());
        assert_eq!(
            state.pronoun("them"),
            Some(&vec![
                EntityReference::Item("gold-key".into()),
                EntityReference::Item("chest".into()),
            ])
        );
    }

    #[test]
    fn lock_requires_closed_target() {
        let mut state = world();
        {
            let chest = state.items.get_mut(&"chest".into()).unwrap();
            chest.attributes.remove(&lantern_data::AttributeId::from(attrs::IS_LOCKED));
            chest.attributes.insert(
                lantern_data::AttributeId::from(attrs::IS_OPEN),
                lantern_data::StateValue::Bool(true),
            );
        }
        let command = with_io(Command::for_verb("lock"), "gold-key");
        let err = Lock.validate(&ctx(&command, &state, "chest")).unwrap_err();
        assert!(matches!(err, ActionResponse::Custom(_)));
    }

    #[test]
    fn put_in_requires_open_container() {
        let mut state = world();
        state
            .items
            .insert("coin".into(), Item::new("coin").with_name("gold coin").carried());
        let mut command = with_io(Command::for_verb("put"), "chest");
        command.preposition = Some("in".to_string());
        let err = Put.validate(&ctx(&command, &state, "coin")).unwrap_err();
        assert_eq!(err, ActionResponse::ContainerIsClosed("chest".into()));
    }

    #[test]
    fn put_in_respects_container_capacity() {
        let mut state = world();
        state.items.insert(
            "box".into(),
            Item::new("box")
                .with_name("small box")
                .with_flag(attrs::IS_CONTAINER)
                .with_flag(attrs::IS_OPEN)
                .with_capacity(2)
                .in_location("hall"),
        );
        state
            .items
            .insert("brick".into(), Item::new("brick").with_name("brick").with_size(3).carried());
        let mut command = with_io(Command::for_verb("put"), "box");
        command.preposition = Some("in".to_string());
        let err = Put.validate(&ctx(&command, &state, "brick")).unwrap_err();
        assert_eq!(
            err,
            ActionResponse::ItemTooLargeForContainer {
                item: "brick".into(),
                container: "box".into(),
            }
        );
    }

    #[test]
    fn put_rejects_cycles() {
        let mut state = world();
        state.items.insert(
            "sack".into(),
            Item::new("sack")
                .with_name("sack")
                .with_flag(attrs::IS_CONTAINER)
                .with_flag(attrs::IS_OPEN)
                .carried(),
        );
        state.items.insert(
            "pouch".into(),
            Item::new("pouch")
                .with_name("pouch")
                .with_flag(attrs::IS_CONTAINER)
                .with_flag(attrs::IS_OPEN)
                .with_parent(ParentEntity::Item("sack".into())),
        );
        // put sack in pouch: pouch is a descendant of sack
        let mut command = with_io(Command::for_verb("put"), "pouch");
        command.preposition = Some("in".to_string());
        let err = Put.validate(&ctx(&command, &state, "sack")).unwrap_err();
        assert!(matches!(err, ActionResponse::Custom(_)));
    }

    #[test]
    fn put_on_requires_a_surface() {
        let mut state = world();
        state
            .items
            .insert("coin".into(), Item::new("coin").with_name("gold coin").carried());
        state
            .items
            .insert("table".into(), Item::new("table").with_name("oak table").with_flag(attrs::IS_SURFACE).in_location("hall"));
        let mut command = with_io(Command::for_verb("put"), "table");
        command.preposition = Some("on".to_string());
        let context = ctx(&command, &state, "coin");
        Put.validate(&context).unwrap();
        let result = Put.process(&context).unwrap();
        assert_eq!(result.message.as_deref(), Some("You put the gold coin on the oak table."));
        state.apply(&result.changes).unwrap();
        assert_eq!(
            state.item(&"coin".into()).unwrap().parent,
            ParentEntity::Item("table".into())
        );

        // and a non-surface refuses
        let mut command = with_io(Command::for_verb("put"), "gold-key");
        command.preposition = Some("on".to_string());
        let err = Put.validate(&ctx(&command, &state, "coin")).unwrap_err();
        assert_eq!(err, ActionResponse::TargetIsNotASurface("gold-key".into()));
    }
}
