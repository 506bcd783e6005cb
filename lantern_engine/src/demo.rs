//! A small built-in world so the binary is playable out of the box.
//!
//! Three rooms, a light puzzle, and a locked chest: enough content to
//! exercise movement, containers, light, hooks, and a fuse. Real games
//! supply their own [`GameBlueprint`].

use crate::blueprint::GameBlueprint;
use crate::hooks::LocationEvent;
use crate::item::{Item, attrs};
use crate::location::{Direction, Exit, Location};
use crate::player::Player;
use crate::timers::FuseDefinition;
use lantern_data::{ActionResult, SideEffect};

/// Build the bundled demo world.
pub fn demo_blueprint() -> GameBlueprint {
    GameBlueprint::new()
        .with_location(
            Location::new("foyer")
                .with_name("Foyer of the Opera House")
                .with_description(
                    "You are standing in a spacious hall, splendidly decorated in red and gold. \
                     The entrance from the street is to the north, and there are doorways south and west.",
                )
                .lit()
                .with_exit(Direction::South, Exit::new("bar"))
                .with_exit(Direction::West, Exit::new("cloakroom"))
                .with_exit(
                    Direction::North,
                    Exit::new("foyer").with_blocked_message("You've only just arrived, and besides, the weather outside seems to be getting worse.").door(),
                ),
        )
        .with_location(
            Location::new("cloakroom")
                .with_name("Cloakroom")
                .with_description("The walls of this small room were clearly once lined with hooks, though now only one remains.")
                .lit()
                .with_exit(Direction::East, Exit::new("foyer")),
        )
        .with_location(
            Location::new("bar")
                .with_name("Foyer Bar")
                .with_description("The bar, much rougher than you'd have guessed after the opulence of the foyer to the north.")
                .with_exit(Direction::North, Exit::new("foyer")),
        )
        .with_player(Player::starting_at("foyer").with_carrying_capacity(20))
        .with_item(
            Item::new("cloak")
                .with_name("velvet cloak")
                .with_description("A handsome cloak of velvet, dark as the night itself.")
                .with_adjectives(["velvet", "dark"])
                .with_size(2)
                .with_flag(attrs::IS_TAKABLE)
                .with_flag(attrs::IS_WEARABLE)
                .with_flag(attrs::IS_WORN)
                .carried(),
        )
        .with_item(
            Item::new("hook")
                .with_name("brass hook")
                .with_adjectives(["brass", "small"])
                .with_flag(attrs::IS_SURFACE)
                .with_flag(attrs::IS_SCENERY)
                .in_location("cloakroom"),
        )
        .with_item(
            Item::new("lantern")
                .with_name("brass lantern")
                .with_description("A battery-powered brass lantern.")
                .with_adjectives(["brass"])
                .with_synonyms(["lamp", "light"])
                .with_size(3)
                .with_flag(attrs::IS_TAKABLE)
                .with_flag(attrs::IS_DEVICE)
                .with_flag(attrs::IS_LIGHT_SOURCE)
                .in_location("foyer"),
        )
        .with_item(
            Item::new("chest")
                .with_name("iron chest")
                .with_description("A rusted strongbox with a heavy lid.")
                .with_adjectives(["iron", "rusted"])
                .with_size(10)
                .with_flag(attrs::IS_CONTAINER)
                .with_flag(attrs::IS_OPENABLE)
                .with_flag(attrs::IS_LOCKABLE)
                .with_flag(attrs::IS_LOCKED)
                .with_lock_key("key")
                .in_location("bar"),
        )
        .with_item(
            Item::new("key")
                .with_name("gold key")
                .with_adjectives(["gold", "small"])
                .with_flag(attrs::IS_TAKABLE)
                .in_location("cloakroom"),
        )
        .with_item(
            Item::new("pearl")
                .with_name("white pearl")
                .with_adjectives(["white"])
                .with_flag(attrs::IS_TAKABLE)
                .with_parent(lantern_data::ParentEntity::Item("chest".into())),
        )
        .with_item(
            Item::new("leaflet")
                .with_name("printed leaflet")
                .with_adjectives(["printed"])
                .with_flag(attrs::IS_TAKABLE)
                .with_flag(attrs::IS_READABLE)
                .with_attr(attrs::TEXT, "Tonight only: THE MAGIC FLUTE. Patrons are asked not to feed the grues.")
                .in_location("foyer"),
        )
        .with_location_hook(
            "cloakroom",
            Box::new(|_, event| match event {
                LocationEvent::OnEnter => Ok(Some(ActionResult::with_message(
                    "The lone hook gleams, as if expecting something.",
                ))),
                _ => Ok(None),
            }),
        )
        .with_item_hook(
            "lantern",
            Box::new(|_, event| {
                // Arm the dimming fuse whenever the lantern is switched on.
                let crate::hooks::ItemEvent::AfterTurn(command) = event else {
                    return Ok(None);
                };
                if command.verb == "turn on".into() {
                    Ok(Some(ActionResult::default().and_effect(SideEffect::StartFuse {
                        fuse: "lantern-dim".into(),
                        turns: None,
                        payload: None,
                    })))
                } else if command.verb == "turn off".into() {
                    Ok(Some(ActionResult::default().and_effect(SideEffect::StopFuse {
                        fuse: "lantern-dim".into(),
                    })))
                } else {
                    Ok(None)
                }
            }),
        )
        .with_fuse(FuseDefinition {
            id: "lantern-dim".into(),
            default_turns: 30,
            behavior: Box::new(|_| {
                Ok(Some(ActionResult::with_message(
                    "The brass lantern is getting dim. Batteries don't last forever, you know.",
                )))
            }),
        })
}
