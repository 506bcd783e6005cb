//! Built-in verb handlers.
//!
//! Each submodule implements one family of verbs against the
//! [`crate::handler::ActionHandler`] protocol. Handlers stay short: they
//! validate with typed responses, then describe their effect as changes.

pub mod container;
pub mod device;
pub mod inventory;
pub mod misc;
pub mod movement;
pub mod perception;
pub mod wearable;

use crate::handler::ActionHandler;
use crate::vocabulary::Vocabulary;
use lantern_data::{AttributeId, AttributeKey, EntityReference, ItemId, ParentEntity, StateChange, StateValue};

/// Every handler the engine ships with.
pub fn builtin_handlers() -> Vec<Box<dyn ActionHandler>> {
    vec![
        Box::new(inventory::Take),
        Box::new(inventory::Drop),
        Box::new(inventory::Inventory),
        Box::new(container::Open),
        Box::new(container::Close),
        Box::new(container::Lock),
        Box::new(container::Unlock),
        Box::new(container::Put),
        Box::new(device::TurnOn),
        Box::new(device::TurnOff),
        Box::new(wearable::Wear),
        Box::new(wearable::Remove),
        Box::new(movement::Go),
        Box::new(perception::Look),
        Box::new(perception::Examine),
        Box::new(perception::Read),
        Box::new(misc::Score),
        Box::new(misc::Wait),
        Box::new(misc::Touch),
        Box::new(misc::Kick),
        Box::new(misc::Give),
        Box::new(misc::Eat),
    ]
}

/// Build the base vocabulary from a handler set.
pub fn vocabulary_for(handlers: &[Box<dyn ActionHandler>]) -> Vocabulary {
    let mut vocabulary = Vocabulary::new();
    for handler in handlers {
        vocabulary.register(handler.vocabulary_entry());
    }
    vocabulary
}

// ---- shared change builders -----------------------------------------

/// Flip a boolean item attribute, guarded on its current value.
pub(crate) fn flip_flag(id: &ItemId, attr: &str, from: bool, to: bool) -> StateChange {
    StateChange::guarded(
        EntityReference::Item(id.clone()),
        AttributeKey::ItemAttribute(AttributeId::from(attr)),
        StateValue::Bool(from),
        StateValue::Bool(to),
    )
}

/// Mark an item as touched (unguarded; touching twice is harmless).
pub(crate) fn touch(id: &ItemId) -> StateChange {
    StateChange::new(
        EntityReference::Item(id.clone()),
        AttributeKey::ItemAttribute(AttributeId::from(crate::item::attrs::IS_TOUCHED)),
        StateValue::Bool(true),
    )
}

/// Move an item, guarded on the parent it is expected to leave.
pub(crate) fn move_item(id: &ItemId, from: &ParentEntity, to: ParentEntity) -> StateChange {
    StateChange::guarded(
        EntityReference::Item(id.clone()),
        AttributeKey::ItemParent,
        StateValue::Parent(from.clone()),
        StateValue::Parent(to),
    )
}

/// Point a pronoun at an ordered referent list.
pub(crate) fn set_pronoun(word: &str, referents: Vec<EntityReference>) -> StateChange {
    StateChange::new(
        EntityReference::Global,
        AttributeKey::PronounReference(word.to_string()),
        StateValue::EntityRefSet(referents),
    )
}

/// Join names into prose: "a", "a and b", "a, b, and c".
pub(crate) fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_builtin_verb() {
        let handlers = builtin_handlers();
        let vocabulary = vocabulary_for(&handlers);
        for verb in [
            "take", "drop", "inventory", "open", "close", "lock", "unlock", "put", "turn on", "turn off", "wear",
            "remove", "go", "look", "examine", "read", "score", "wait", "touch", "kick", "give", "eat",
        ] {
            assert!(
                vocabulary.entry(&verb.into()).is_some(),
                "verb '{verb}' missing from vocabulary"
            );
        }
    }

    #[test]
    fn join_names_uses_oxford_comma_from_three_up() {
        let names = |list: &[&str]| list.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(join_names(&names(&["the coin"])), "the coin");
        assert_eq!(join_names(&names(&["the coin", "the key"])), "the coin and the key");
        assert_eq!(
            join_names(&names(&["the coin", "the key", "the lamp"])),
            "the coin, the key, and the lamp"
        );
    }

    #[test]
    fn flip_flag_guards_on_prior_value() {
        let change = flip_flag(&ItemId::from("chest"), crate::item::attrs::IS_OPEN, false, true);
        assert_eq!(change.old_value, Some(StateValue::Bool(false)));
        assert_eq!(change.new_value, StateValue::Bool(true));
    }
}
