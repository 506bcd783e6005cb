//! Scope and visibility queries.
//!
//! Pure, stateless functions over a [`GameState`]: what the player could
//! touch (reachable), what they can see (visible, which depends on light),
//! and whether a location is lit at all. Handlers and the parser consult
//! these; nothing here mutates anything.

use crate::item::Item;
use crate::state::GameState;
use lantern_data::{ItemId, LocationId, ParentEntity};
use std::collections::{BTreeSet, VecDeque};

/// True when the location is lit: inherently, by a switched-on light
/// source whose light escapes to the location, or by one the player
/// carries while standing there.
pub fn is_location_lit(state: &GameState, location_id: &LocationId) -> bool {
    if state
        .locations
        .get(location_id)
        .is_some_and(crate::location::Location::inherently_lit)
    {
        return true;
    }
    state.items.values().any(|item| {
        item.is_light_source() && item.is_on() && light_reaches_root(state, item) && {
            match state.root_of(&item.id) {
                ParentEntity::Location(root) => root == *location_id,
                ParentEntity::Player => state.player.current_location == *location_id,
                _ => false,
            }
        }
    })
}

/// Whether light from `item` escapes every container around it.
fn light_reaches_root(state: &GameState, item: &Item) -> bool {
    let mut parent = item.parent.clone();
    let mut seen = BTreeSet::new();
    while let ParentEntity::Item(holder_id) = parent {
        if !seen.insert(holder_id.clone()) {
            return false;
        }
        let Some(holder) = state.items.get(&holder_id) else {
            return false;
        };
        if !holder.admits_light() {
            return false;
        }
        parent = holder.parent.clone();
    }
    true
}

/// Everything the player could touch: a breadth-first walk from the
/// current location and the player's inventory, descending into surfaces
/// unconditionally and into containers only while open or transparent.
/// Worn items are reachable.
pub fn reachable_from_player(state: &GameState) -> BTreeSet<ItemId> {
    let mut reachable = BTreeSet::new();
    let mut frontier: VecDeque<ItemId> = VecDeque::new();

    let roots = [
        ParentEntity::Location(state.player.current_location.clone()),
        ParentEntity::Player,
    ];
    for root in &roots {
        for item in state.children_of(root) {
            frontier.push_back(item.id.clone());
        }
    }

    while let Some(id) = frontier.pop_front() {
        if !reachable.insert(id.clone()) {
            continue;
        }
        let Some(item) = state.items.get(&id) else {
            continue;
        };
        if item.admits_reach() {
            for child in state.children_of(&ParentEntity::Item(id.clone())) {
                frontier.push_back(child.id.clone());
            }
        }
    }
    reachable
}

/// Everything the player can see. Equal to [`reachable_from_player`] when
/// the location is lit. In darkness visibility narrows to light sources
/// the player holds (a carried lamp can still be found and lit) and
/// self-luminous items (switched-on sources anywhere in reach); ordinary
/// carried items are reachable but not visible.
pub fn visible_to_player(state: &GameState) -> BTreeSet<ItemId> {
    let reachable = reachable_from_player(state);
    if is_location_lit(state, &state.player.current_location) {
        return reachable;
    }
    reachable
        .into_iter()
        .filter(|id| {
            state.items.get(id).is_some_and(|item| {
                item.is_light_source() && (item.is_on() || state.root_of(id) == ParentEntity::Player)
            })
        })
        .collect()
}

/// Can the player currently see this item?
pub fn can_see(state: &GameState, id: &ItemId) -> bool {
    visible_to_player(state).contains(id)
}

/// Can the player currently touch this item?
pub fn can_touch(state: &GameState, id: &ItemId) -> bool {
    reachable_from_player(state).contains(id)
}
