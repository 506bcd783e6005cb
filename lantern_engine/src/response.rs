//! The closed taxonomy of expected action failures.
//!
//! Handlers speak in [`ActionResponse`]s; the engine renders each variant
//! to player-facing prose. The `thiserror` display forms are the terse
//! internal descriptions used in logs.

use crate::state::GameState;
use lantern_data::{EntityReference, ItemId, StateChange, StateValue};
use thiserror::Error;

/// Prose shown when a `requiresLight` verb runs in the dark.
pub const DARKNESS_MESSAGE: &str = "The darkness here is absolute. You can't see a thing.";

/// Prose appended when the player extinguishes the last light.
pub const GRUE_WARNING: &str = "It is now pitch black. You are likely to be eaten by a grue.";

/// Every expected failure a handler may raise.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionResponse {
    #[error("item '{0}' not accessible")]
    ItemNotAccessible(ItemId),
    #[error("item '{0}' not held")]
    ItemNotHeld(ItemId),
    #[error("item '{0}' not takable")]
    ItemNotTakable(ItemId),
    #[error("item '{0}' not droppable")]
    ItemNotDroppable(ItemId),
    #[error("item '{0}' not openable")]
    ItemNotOpenable(ItemId),
    #[error("item '{0}' not closable")]
    ItemNotClosable(ItemId),
    #[error("item '{0}' not lockable")]
    ItemNotLockable(ItemId),
    #[error("item '{0}' not unlockable")]
    ItemNotUnlockable(ItemId),
    #[error("item '{0}' not readable")]
    ItemNotReadable(ItemId),
    #[error("item '{0}' not edible")]
    ItemNotEdible(ItemId),
    #[error("item '{0}' not wearable")]
    ItemNotWearable(ItemId),
    #[error("item '{0}' not removable")]
    ItemNotRemovable(ItemId),
    #[error("item '{0}' already open")]
    ItemAlreadyOpen(ItemId),
    #[error("item '{0}' already closed")]
    ItemAlreadyClosed(ItemId),
    #[error("item '{0}' is locked")]
    ItemIsLocked(ItemId),
    #[error("item '{0}' is unlocked")]
    ItemIsUnlocked(ItemId),
    #[error("item '{0}' already worn")]
    ItemIsAlreadyWorn(ItemId),
    #[error("item '{0}' not worn")]
    ItemIsNotWorn(ItemId),
    #[error("container '{0}' is closed")]
    ContainerIsClosed(ItemId),
    #[error("container '{0}' is open")]
    ContainerIsOpen(ItemId),
    #[error("item '{item}' not in container '{container}'")]
    ItemNotInContainer { item: ItemId, container: ItemId },
    #[error("item '{item}' not on surface '{surface}'")]
    ItemNotOnSurface { item: ItemId, surface: ItemId },
    #[error("item '{item}' too large for container '{container}'")]
    ItemTooLargeForContainer { item: ItemId, container: ItemId },
    #[error("player cannot carry more")]
    PlayerCannotCarryMore,
    #[error("key '{key}' does not fit lock '{lock}'")]
    WrongKey { key: ItemId, lock: ItemId },
    #[error("target '{0}' is not a container")]
    TargetIsNotAContainer(ItemId),
    #[error("target '{0}' is not a surface")]
    TargetIsNotASurface(ItemId),
    #[error("required tool '{0}' missing")]
    ToolMissing(String),
    #[error("direction is blocked")]
    DirectionIsBlocked(Option<String>),
    #[error("invalid direction")]
    InvalidDirection,
    #[error("prerequisite not met: {0}")]
    PrerequisiteNotMet(String),
    #[error("invalid indirect object")]
    InvalidIndirectObject(Option<String>),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("unknown verb '{0}'")]
    UnknownVerb(String),
    #[error("unknown entity '{0}'")]
    UnknownEntity(EntityReference),
    #[error("room is dark")]
    RoomIsDark,
    #[error("state validation failed applying {change}")]
    StateValidationFailed {
        change: Box<StateChange>,
        actual: Option<StateValue>,
    },
    #[error("internal engine error: {0}")]
    InternalEngineError(String),
    #[error("{0}")]
    Custom(String),
}

impl ActionResponse {
    /// True for the variants that indicate an engine defect rather than a
    /// refused command.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ActionResponse::StateValidationFailed { .. } | ActionResponse::InternalEngineError(_)
        )
    }

    /// Render this response as the player sees it.
    pub fn render(&self, state: &GameState) -> String {
        let name = |id: &ItemId| state.item_name(id);
        match self {
            ActionResponse::ItemNotAccessible(id) => {
                let touched = state.items.get(id).is_some_and(crate::item::Item::is_touched);
                if touched {
                    format!("You can't see the {}.", name(id))
                } else {
                    "You can't see any such thing.".to_string()
                }
            },
            ActionResponse::ItemNotHeld(id) => format!("You aren't holding the {}.", name(id)),
            ActionResponse::ItemNotTakable(id) => format!("You can't take the {}.", name(id)),
            ActionResponse::ItemNotDroppable(id) => format!("You can't drop the {}.", name(id)),
            ActionResponse::ItemNotOpenable(id) => format!("You can't open the {}.", name(id)),
            ActionResponse::ItemNotClosable(id) => format!("You can't close the {}.", name(id)),
            ActionResponse::ItemNotLockable(id) => format!("You can't lock the {}.", name(id)),
            ActionResponse::ItemNotUnlockable(id) => format!("You can't unlock the {}.", name(id)),
            ActionResponse::ItemNotReadable(id) => format!("You can't read the {}.", name(id)),
            ActionResponse::ItemNotEdible(id) => format!("You can't eat the {}.", name(id)),
            ActionResponse::ItemNotWearable(id) => format!("You can't wear the {}.", name(id)),
            ActionResponse::ItemNotRemovable(id) => format!("You can't remove the {}.", name(id)),
            ActionResponse::ItemAlreadyOpen(id) => format!("The {} is already open.", name(id)),
            ActionResponse::ItemAlreadyClosed(id) => format!("The {} is already closed.", name(id)),
            ActionResponse::ItemIsLocked(id) => format!("The {} is locked.", name(id)),
            ActionResponse::ItemIsUnlocked(id) => format!("The {} is unlocked.", name(id)),
            ActionResponse::ItemIsAlreadyWorn(id) => {
                format!("You are already wearing the {}.", name(id))
            },
            ActionResponse::ItemIsNotWorn(id) => format!("You aren't wearing the {}.", name(id)),
            ActionResponse::ContainerIsClosed(id) => format!("The {} is closed.", name(id)),
            ActionResponse::ContainerIsOpen(id) => format!("The {} is open.", name(id)),
            ActionResponse::ItemNotInContainer { item, container } => {
                format!("The {} isn't in the {}.", name(item), name(container))
            },
            ActionResponse::ItemNotOnSurface { item, surface } => {
                format!("The {} isn't on the {}.", name(item), name(surface))
            },
            ActionResponse::ItemTooLargeForContainer { item, container } => {
                format!("The {} won't fit in the {}.", name(item), name(container))
            },
            ActionResponse::PlayerCannotCarryMore => "You are carrying too much already.".to_string(),
            ActionResponse::WrongKey { key, lock } => {
                format!("The {} doesn't fit the {}.", name(key), name(lock))
            },
            ActionResponse::TargetIsNotAContainer(id) => {
                format!("The {} can't contain things.", name(id))
            },
            ActionResponse::TargetIsNotASurface(id) => {
                format!("You can't put anything on the {}.", name(id))
            },
            ActionResponse::ToolMissing(tool) => format!("You need a {tool} to do that."),
            ActionResponse::DirectionIsBlocked(reason) => reason
                .clone()
                .unwrap_or_else(|| "Something blocks the way.".to_string()),
            ActionResponse::InvalidDirection => "You can't go that way.".to_string(),
            ActionResponse::PrerequisiteNotMet(message) | ActionResponse::InvalidValue(message) => message.clone(),
            ActionResponse::InvalidIndirectObject(target) => match target {
                Some(target) => format!("You can't do that to the {target}."),
                None => "You need to say what to do that with.".to_string(),
            },
            ActionResponse::UnknownVerb(word) => format!("I don't know the verb '{word}'."),
            ActionResponse::UnknownEntity(entity) => {
                format!("Nothing called '{entity}' is here.")
            },
            ActionResponse::RoomIsDark => DARKNESS_MESSAGE.to_string(),
            ActionResponse::StateValidationFailed { .. } | ActionResponse::InternalEngineError(_) => {
                "An internal error has occurred. Your command had no effect.".to_string()
            },
            ActionResponse::Custom(message) => message.clone(),
        }
    }
}
