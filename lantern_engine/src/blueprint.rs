//! Declarative game construction.
//!
//! A [`GameBlueprint`] gathers the world content (items, locations, the
//! player), vocabulary additions, hooks, and timer definitions, validates
//! the cross-references, and assembles the one [`GameEngine`] per game.
//! There is no inheritance anywhere: all per-object customization is
//! configuration here.

use crate::engine::GameEngine;
use crate::handler::ActionHandler;
use crate::handlers;
use crate::hooks::{HookRegistry, ItemHook, LocationHook};
use crate::io::IoHandler;
use crate::item::Item;
use crate::location::Location;
use crate::player::Player;
use crate::state::GameState;
use crate::timers::{DaemonDefinition, FuseDefinition, TimerRegistry};
use lantern_data::{GlobalId, ItemId, LocationId, ParentEntity, StateValue, VerbId};
use log::info;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// A malformed or dangling reference found while validating a blueprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlueprintError {
    DuplicateItem(ItemId),
    DuplicateLocation(LocationId),
    MissingLocation { id: LocationId, context: String },
    MissingItem { id: ItemId, context: String },
}

impl fmt::Display for BlueprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlueprintError::DuplicateItem(id) => write!(f, "duplicate item id '{id}'"),
            BlueprintError::DuplicateLocation(id) => write!(f, "duplicate location id '{id}'"),
            BlueprintError::MissingLocation { id, context } => {
                write!(f, "missing location '{id}' ({context})")
            },
            BlueprintError::MissingItem { id, context } => write!(f, "missing item '{id}' ({context})"),
        }
    }
}

impl std::error::Error for BlueprintError {}

/// Everything needed to assemble an engine.
#[derive(Default)]
pub struct GameBlueprint {
    pub items: Vec<Item>,
    pub locations: Vec<Location>,
    pub player: Player,
    pub globals: BTreeMap<GlobalId, StateValue>,
    pub flags: BTreeSet<GlobalId>,
    /// Extra invoking words for built-in verbs.
    pub synonyms: Vec<(VerbId, String)>,
    pub location_hooks: Vec<(LocationId, LocationHook)>,
    pub item_hooks: Vec<(ItemId, ItemHook)>,
    pub fuses: Vec<FuseDefinition>,
    pub daemons: Vec<DaemonDefinition>,
    /// Game-specific verbs beyond the built-in set.
    pub extra_handlers: Vec<Box<dyn ActionHandler>>,
}

impl GameBlueprint {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn with_player(mut self, player: Player) -> Self {
        self.player = player;
        self
    }

    #[must_use]
    pub fn with_location_hook(mut self, id: impl Into<LocationId>, hook: LocationHook) -> Self {
        self.location_hooks.push((id.into(), hook));
        self
    }

    #[must_use]
    pub fn with_item_hook(mut self, id: impl Into<ItemId>, hook: ItemHook) -> Self {
        self.item_hooks.push((id.into(), hook));
        self
    }

    #[must_use]
    pub fn with_fuse(mut self, fuse: FuseDefinition) -> Self {
        self.fuses.push(fuse);
        self
    }

    #[must_use]
    pub fn with_daemon(mut self, daemon: DaemonDefinition) -> Self {
        self.daemons.push(daemon);
        self
    }

    /// Collect every cross-reference problem in the blueprint.
    pub fn validate(&self) -> Vec<BlueprintError> {
        let mut errors = Vec::new();
        let mut item_ids = HashSet::new();
        let mut location_ids = HashSet::new();

        for location in &self.locations {
            if !location_ids.insert(location.id.clone()) {
                errors.push(BlueprintError::DuplicateLocation(location.id.clone()));
            }
        }
        for item in &self.items {
            if !item_ids.insert(item.id.clone()) {
                errors.push(BlueprintError::DuplicateItem(item.id.clone()));
            }
        }

        if !location_ids.contains(&self.player.current_location) {
            errors.push(BlueprintError::MissingLocation {
                id: self.player.current_location.clone(),
                context: "player starting location".to_string(),
            });
        }

        for location in &self.locations {
            for (direction, exit) in &location.exits {
                if !location_ids.contains(&exit.destination) {
                    errors.push(BlueprintError::MissingLocation {
                        id: exit.destination.clone(),
                        context: format!("{direction} exit from '{}'", location.id),
                    });
                }
            }
        }

        for item in &self.items {
            match &item.parent {
                ParentEntity::Location(id) if !location_ids.contains(id) => {
                    errors.push(BlueprintError::MissingLocation {
                        id: id.clone(),
                        context: format!("parent of item '{}'", item.id),
                    });
                },
                ParentEntity::Item(id) if !item_ids.contains(id) => {
                    errors.push(BlueprintError::MissingItem {
                        id: id.clone(),
                        context: format!("parent of item '{}'", item.id),
                    });
                },
                _ => {},
            }
            if let Some(key) = item.lock_key()
                && !item_ids.contains(key)
            {
                errors.push(BlueprintError::MissingItem {
                    id: key.clone(),
                    context: format!("lock key of item '{}'", item.id),
                });
            }
        }

        for (id, _) in &self.location_hooks {
            if !location_ids.contains(id) {
                errors.push(BlueprintError::MissingLocation {
                    id: id.clone(),
                    context: "location hook target".to_string(),
                });
            }
        }
        for (id, _) in &self.item_hooks {
            if !item_ids.contains(id) {
                errors.push(BlueprintError::MissingItem {
                    id: id.clone(),
                    context: "item hook target".to_string(),
                });
            }
        }

        errors
    }

    /// Validate and assemble the engine.
    ///
    /// # Errors
    /// Fails with the full list of validation problems, or if any
    /// identifier collides.
    pub fn build(self, io: Box<dyn IoHandler>) -> anyhow::Result<GameEngine> {
        let errors = self.validate();
        if !errors.is_empty() {
            let listing: Vec<String> = errors.iter().map(ToString::to_string).collect();
            anyhow::bail!("blueprint validation failed:\n  {}", listing.join("\n  "));
        }

        let mut state = GameState::new_empty();
        for location in self.locations {
            state.locations.insert(location.id.clone(), location);
        }
        for item in self.items {
            state.items.insert(item.id.clone(), item);
        }
        state.player = self.player;
        state.global_states = self.globals;
        state.flags = self.flags;

        let mut hooks = HookRegistry::default();
        for (id, hook) in self.location_hooks {
            hooks.register_location(id, hook);
        }
        for (id, hook) in self.item_hooks {
            hooks.register_item(id, hook);
        }

        let mut timers = TimerRegistry::default();
        for fuse in self.fuses {
            timers.register_fuse(fuse);
        }
        for daemon in self.daemons {
            timers.register_daemon(daemon);
        }

        let mut handler_list = handlers::builtin_handlers();
        handler_list.extend(self.extra_handlers);
        let mut vocabulary = crate::vocabulary::Vocabulary::new();
        for handler in &handler_list {
            vocabulary.register(handler.vocabulary_entry());
        }
        for (verb, word) in &self.synonyms {
            vocabulary.add_synonym(verb, word);
        }

        info!(
            "blueprint built: {} locations, {} items, {} handlers",
            state.locations.len(),
            state.items.len(),
            handler_list.len()
        );
        Ok(GameEngine::from_parts(state, handler_list, vocabulary, hooks, timers, io))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::BufferedIo;
    use crate::location::{Direction, Exit};

    fn minimal() -> GameBlueprint {
        GameBlueprint::new()
            .with_location(Location::new("hall").with_name("Hall").lit())
            .with_player(Player::starting_at("hall"))
    }

    #[test]
    fn minimal_blueprint_validates_and_builds() {
        assert!(minimal().validate().is_empty());
        assert!(minimal().build(Box::new(BufferedIo::new())).is_ok());
    }

    #[test]
    fn missing_player_location_is_reported() {
        let blueprint = GameBlueprint::new().with_player(Player::starting_at("nowhere"));
        let errors = blueprint.validate();
        assert!(errors.iter().any(|e| matches!(
            e,
            BlueprintError::MissingLocation { id, .. } if id == &LocationId::from("nowhere")
        )));
    }

    #[test]
    fn dangling_exit_is_reported() {
        let blueprint = minimal().with_location(
            Location::new("attic")
                .with_name("Attic")
                .with_exit(Direction::Down, Exit::new("basement")),
        );
        let errors = blueprint.validate();
        assert!(errors.iter().any(|e| matches!(
            e,
            BlueprintError::MissingLocation { id, .. } if id == &LocationId::from("basement")
        )));
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let blueprint = minimal()
            .with_item(Item::new("coin").in_location("hall"))
            .with_item(Item::new("coin").in_location("hall"));
        let errors = blueprint.validate();
        assert!(errors.contains(&BlueprintError::DuplicateItem("coin".into())));
    }

    #[test]
    fn dangling_lock_key_is_reported() {
        let blueprint = minimal().with_item(Item::new("chest").with_lock_key("ghost-key").in_location("hall"));
        let errors = blueprint.validate();
        assert!(errors.iter().any(|e| matches!(
            e,
            BlueprintError::MissingItem { id, .. } if id == &ItemId::from("ghost-key")
        )));
    }

    #[test]
    fn build_refuses_invalid_blueprints() {
        let blueprint = GameBlueprint::new().with_player(Player::starting_at("nowhere"));
        assert!(blueprint.build(Box::new(BufferedIo::new())).is_err());
    }

    #[test]
    fn nested_parent_references_validate() {
        let blueprint = minimal()
            .with_item(Item::new("chest").in_location("hall"))
            .with_item(Item::new("pearl").with_parent(ParentEntity::Item("chest".into())));
        assert!(blueprint.validate().is_empty());
    }
}
