//! The parser boundary.
//!
//! `parse` is a pure function from an input line, the vocabulary, and the
//! current state to a [`Command`] or a [`ParseError`]. Noun phrases resolve
//! against what the player can currently see or touch; pronouns resolve
//! through the state's pronoun table.

use crate::command::Command;
use crate::item::Item;
use crate::scope;
use crate::state::GameState;
use crate::vocabulary::{SyntaxFrame, Vocabulary};
use lantern_data::{EntityReference, ItemId};
use log::debug;
use std::collections::BTreeSet;
use thiserror::Error;

/// Why an input line could not become a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("I don't know the verb '{0}'.")]
    UnknownVerb(String),
    #[error("I don't know the word '{0}'.")]
    UnknownNoun(String),
    #[error("{0}")]
    Ambiguity(String),
    #[error("You can't see any such thing.")]
    ItemNotInScope(String),
    #[error("{0}")]
    BadSyntax(String),
    #[error("I beg your pardon?")]
    Empty,
}

/// Parse one input line.
///
/// # Errors
/// Returns a [`ParseError`] for anything that is not a well-formed command
/// naming entities the player can currently refer to.
pub fn parse(input: &str, vocabulary: &Vocabulary, state: &GameState) -> Result<Command, ParseError> {
    let lowered = input.trim().to_lowercase().replace(',', " and ");
    if lowered.is_empty() {
        return Err(ParseError::Empty);
    }
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    // A bare direction is shorthand for "go <direction>".
    if tokens.len() == 1
        && let Some(direction) = Vocabulary::direction(tokens[0])
    {
        return Ok(Command {
            verb: "go".into(),
            direction: Some(direction),
            raw_input: input.to_string(),
            ..Command::default()
        });
    }

    let (verb, consumed) = match vocabulary.verb_at(&tokens) {
        Some(found) => found,
        None => {
            // "turn lamp on" puts the particle last; recombine it.
            match tokens.last() {
                Some(last) if tokens.len() >= 2 => match vocabulary.particle_verb(tokens[0], last) {
                    Some(verb) => {
                        let object_tokens = &tokens[1..tokens.len() - 1];
                        return parse_with_verb(input, &verb, object_tokens, vocabulary, state);
                    },
                    None => return Err(ParseError::UnknownVerb(tokens[0].to_string())),
                },
                _ => return Err(ParseError::UnknownVerb(tokens[0].to_string())),
            }
        },
    };
    parse_with_verb(input, &verb, &tokens[consumed..], vocabulary, state)
}

fn parse_with_verb(
    input: &str,
    verb: &lantern_data::VerbId,
    rest: &[&str],
    vocabulary: &Vocabulary,
    state: &GameState,
) -> Result<Command, ParseError> {
    let Some(entry) = vocabulary.entry(verb) else {
        return Err(ParseError::UnknownVerb(verb.to_string()));
    };
    let mut command = Command {
        verb: verb.clone(),
        raw_input: input.to_string(),
        ..Command::default()
    };

    let rest: Vec<&str> = rest.iter().copied().filter(|word| !vocabulary.is_article(word)).collect();

    // Direction-taking verbs consume a single direction word.
    if entry.accepts(SyntaxFrame::DirectionOnly) {
        return match rest.first() {
            Some(word) => match Vocabulary::direction(word) {
                Some(direction) => {
                    command.direction = Some(direction);
                    Ok(command)
                },
                None => Err(ParseError::BadSyntax(format!("You can't go \"{word}\"."))),
            },
            None => Err(ParseError::BadSyntax("Which way?".to_string())),
        };
    }

    if rest.is_empty() {
        if entry.accepts(SyntaxFrame::Intransitive) {
            return Ok(command);
        }
        return Err(ParseError::BadSyntax(format!("{} what?", capitalize(verb.as_str()))));
    }

    // Split direct from indirect phrase at the first verb preposition.
    let (do_tokens, io_tokens) = match rest
        .iter()
        .position(|word| entry.prepositions.contains(*word))
    {
        Some(split) if entry.accepts(SyntaxFrame::DirectAndIndirect) => {
            command.preposition = Some(rest[split].to_string());
            (&rest[..split], Some(&rest[split + 1..]))
        },
        _ => (&rest[..], None),
    };

    if do_tokens.is_empty() {
        return Err(ParseError::BadSyntax(format!("{} what?", capitalize(verb.as_str()))));
    }

    if do_tokens.len() == 1 && vocabulary.is_all_word(do_tokens[0]) {
        command.is_all = true;
    } else {
        for phrase in split_on_and(do_tokens) {
            if phrase.len() == 1 && vocabulary.is_pronoun(phrase[0]) {
                command.direct_objects.extend(resolve_pronoun(phrase[0], state)?);
            } else {
                command.direct_objects.push(resolve_phrase(&phrase, state)?);
            }
        }
    }

    if let Some(io_tokens) = io_tokens {
        if io_tokens.is_empty() {
            return Err(ParseError::BadSyntax(format!(
                "{} {} what?",
                capitalize(verb.as_str()),
                command.preposition.as_deref().unwrap_or("with"),
            )));
        }
        if io_tokens.len() == 1 && vocabulary.is_pronoun(io_tokens[0]) {
            let mut refs = resolve_pronoun(io_tokens[0], state)?;
            if refs.len() != 1 {
                return Err(ParseError::BadSyntax(format!(
                    "'{}' names more than one thing here.",
                    io_tokens[0]
                )));
            }
            command.indirect_object = refs.pop();
        } else {
            command.indirect_object = Some(resolve_phrase(io_tokens, state)?);
        }
    }

    debug!("parsed '{input}' as {command:?}");
    Ok(command)
}

/// Split a token list on the word "and" into noun phrases.
fn split_on_and<'a>(tokens: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut phrases = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        if *token == "and" {
            if !current.is_empty() {
                phrases.push(std::mem::take(&mut current));
            }
        } else {
            current.push(*token);
        }
    }
    if !current.is_empty() {
        phrases.push(current);
    }
    phrases
}

fn resolve_pronoun(word: &str, state: &GameState) -> Result<Vec<EntityReference>, ParseError> {
    let referents: Vec<EntityReference> = state
        .pronoun(word)
        .map(|refs| refs.iter().filter(|entity| entity.is_item()).cloned().collect())
        .unwrap_or_default();
    if referents.is_empty() {
        return Err(ParseError::BadSyntax(format!(
            "I'm not sure what '{word}' refers to."
        )));
    }
    Ok(referents)
}

/// Resolve a noun phrase against items in scope.
fn resolve_phrase(phrase: &[&str], state: &GameState) -> Result<EntityReference, ParseError> {
    let matching: Vec<&Item> = state.items.values().filter(|item| phrase_matches(item, phrase)).collect();
    if matching.is_empty() {
        let head = phrase.last().copied().unwrap_or_default();
        return Err(ParseError::UnknownNoun(head.to_string()));
    }

    let in_scope: BTreeSet<ItemId> = {
        let mut scope_set = scope::visible_to_player(state);
        scope_set.extend(scope::reachable_from_player(state));
        scope_set
    };
    let candidates: Vec<&Item> = matching
        .iter()
        .copied()
        .filter(|item| in_scope.contains(&item.id))
        .collect();

    match candidates.len() {
        0 => Err(ParseError::ItemNotInScope(phrase.join(" "))),
        1 => Ok(EntityReference::Item(candidates[0].id.clone())),
        _ => {
            let names: Vec<String> = candidates.iter().map(|item| format!("the {}", item.name())).collect();
            Err(ParseError::Ambiguity(format!(
                "Which do you mean: {}?",
                names.join(" or ")
            )))
        },
    }
}

/// True when every word of the phrase fits the item and the head word
/// names it (via its name or a synonym).
fn phrase_matches(item: &Item, phrase: &[&str]) -> bool {
    let Some(head) = phrase.last() else {
        return false;
    };
    let name = item.name().to_lowercase();
    let name_words: BTreeSet<&str> = name.split_whitespace().collect();
    let synonyms = item.synonyms();
    let adjectives = item.adjectives();

    let head_matches = name_words.contains(head) || synonyms.contains(*head);
    if !head_matches {
        return false;
    }
    phrase[..phrase.len() - 1]
        .iter()
        .all(|word| name_words.contains(word) || adjectives.contains(*word) || synonyms.contains(*word))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::attrs;
    use crate::location::{Direction, Location};
    use crate::player::Player;
    use crate::vocabulary::VerbEntry;
    use lantern_data::{AttributeKey, StateChange, StateValue};

    fn vocab() -> Vocabulary {
        let mut vocab = Vocabulary::new();
        vocab.register(
            VerbEntry::new("take")
                .with_words(["take", "get", "pick up"])
                .with_frames([SyntaxFrame::DirectOnly])
                .multi_object(),
        );
        vocab.register(
            VerbEntry::new("go")
                .with_words(["go", "walk"])
                .with_frames([SyntaxFrame::DirectionOnly]),
        );
        vocab.register(VerbEntry::new("look").with_words(["look", "l"]).with_frames([
            SyntaxFrame::Intransitive,
        ]));
        vocab.register(
            VerbEntry::new("unlock")
                .with_words(["unlock"])
                .with_frames([SyntaxFrame::DirectAndIndirect])
                .with_prepositions(["with", "using"]),
        );
        vocab.register(
            VerbEntry::new("turn on")
                .with_words(["turn on", "switch on"])
                .with_frames([SyntaxFrame::DirectOnly]),
        );
        vocab
    }

    fn lit_world() -> GameState {
        let mut state = GameState::new_empty();
        state
            .locations
            .insert("hall".into(), Location::new("hall").with_name("Hall").lit());
        state.player = Player::starting_at("hall");
        state.items.insert(
            "lamp".into(),
            Item::new("lamp")
                .with_name("brass lamp")
                .with_adjectives(["brass"])
                .with_synonyms(["lantern"])
                .in_location("hall"),
        );
        state.items.insert(
            "chest".into(),
            Item::new("chest")
                .with_name("iron chest")
                .with_adjectives(["iron"])
                .in_location("hall"),
        );
        state
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(parse("   ", &vocab(), &lit_world()), Err(ParseError::Empty));
    }

    #[test]
    fn unknown_verb_is_reported() {
        assert_eq!(
            parse("juggle lamp", &vocab(), &lit_world()),
            Err(ParseError::UnknownVerb("juggle".into()))
        );
    }

    #[test]
    fn simple_take_resolves_object() {
        let command = parse("take the brass lamp", &vocab(), &lit_world()).unwrap();
        assert_eq!(command.verb, "take".into());
        assert_eq!(command.direct_objects, vec![EntityReference::Item("lamp".into())]);
        assert!(!command.is_all);
    }

    #[test]
    fn synonyms_resolve_nouns() {
        let command = parse("take lantern", &vocab(), &lit_world()).unwrap();
        assert_eq!(command.direct_objects, vec![EntityReference::Item("lamp".into())]);
    }

    #[test]
    fn two_word_verbs_parse() {
        let command = parse("pick up lamp", &vocab(), &lit_world()).unwrap();
        assert_eq!(command.verb, "take".into());
    }

    #[test]
    fn trailing_particle_recombines() {
        let command = parse("turn lamp on", &vocab(), &lit_world()).unwrap();
        assert_eq!(command.verb, "turn on".into());
        assert_eq!(command.direct_objects, vec![EntityReference::Item("lamp".into())]);
    }

    #[test]
    fn bare_direction_becomes_go() {
        let command = parse("north", &vocab(), &lit_world()).unwrap();
        assert_eq!(command.verb, "go".into());
        assert_eq!(command.direction, Some(Direction::North));
    }

    #[test]
    fn go_consumes_direction_word() {
        let command = parse("go north", &vocab(), &lit_world()).unwrap();
        assert_eq!(command.direction, Some(Direction::North));
        assert!(parse("go sideways", &vocab(), &lit_world()).is_err());
    }

    #[test]
    fn all_command_is_flagged() {
        let command = parse("take all", &vocab(), &lit_world()).unwrap();
        assert!(command.is_all);
        assert!(command.direct_objects.is_empty());
        let command = parse("take everything", &vocab(), &lit_world()).unwrap();
        assert!(command.is_all);
    }

    #[test]
    fn and_lists_resolve_each_object() {
        let command = parse("take lamp and chest", &vocab(), &lit_world()).unwrap();
        assert_eq!(
            command.direct_objects,
            vec![
                EntityReference::Item("lamp".into()),
                EntityReference::Item("chest".into()),
            ]
        );
    }

    #[test]
    fn commas_read_as_and() {
        let command = parse("take lamp, chest", &vocab(), &lit_world()).unwrap();
        assert_eq!(command.direct_objects.len(), 2);
    }

    #[test]
    fn preposition_splits_indirect_object() {
        let command = parse("unlock chest with lamp", &vocab(), &lit_world()).unwrap();
        assert_eq!(command.direct_objects, vec![EntityReference::Item("chest".into())]);
        assert_eq!(command.indirect_object, Some(EntityReference::Item("lamp".into())));
        assert_eq!(command.preposition.as_deref(), Some("with"));
    }

    #[test]
    fn missing_object_reads_as_bad_syntax() {
        assert!(matches!(
            parse("take", &vocab(), &lit_world()),
            Err(ParseError::BadSyntax(_))
        ));
        assert!(matches!(
            parse("unlock chest with", &vocab(), &lit_world()),
            Err(ParseError::BadSyntax(_))
        ));
    }

    #[test]
    fn unknown_noun_vs_out_of_scope() {
        let mut state = lit_world();
        assert_eq!(
            parse("take zeppelin", &vocab(), &state),
            Err(ParseError::UnknownNoun("zeppelin".into()))
        );
        // Move the chest to another room: known word, but not visible.
        state.locations.insert("attic".into(), Location::new("attic").lit());
        if let Some(chest) = state.items.get_mut(&"chest".into()) {
            chest.parent = lantern_data::ParentEntity::Location("attic".into());
        }
        assert_eq!(
            parse("take chest", &vocab(), &state),
            Err(ParseError::ItemNotInScope("chest".into()))
        );
    }

    #[test]
    fn ambiguity_lists_candidates() {
        let mut state = lit_world();
        state.items.insert(
            "ball-blue".into(),
            Item::new("ball-blue")
                .with_name("blue ball")
                .with_adjectives(["blue"])
                .in_location("hall"),
        );
        state.items.insert(
            "ball-red".into(),
            Item::new("ball-red")
                .with_name("red ball")
                .with_adjectives(["red"])
                .in_location("hall"),
        );
        let err = parse("take ball", &vocab(), &state).unwrap_err();
        assert_eq!(
            err,
            ParseError::Ambiguity("Which do you mean: the blue ball or the red ball?".into())
        );
        // An adjective disambiguates.
        let command = parse("take blue ball", &vocab(), &state).unwrap();
        assert_eq!(command.direct_objects, vec![EntityReference::Item("ball-blue".into())]);
    }

    #[test]
    fn pronoun_resolves_from_state() {
        let mut state = lit_world();
        state
            .apply(&[StateChange::new(
                EntityReference::Global,
                AttributeKey::PronounReference("it".into()),
                StateValue::EntityRefSet(vec![EntityReference::Item("lamp".into())]),
            )])
            .unwrap();
        let command = parse("take it", &vocab(), &state).unwrap();
        assert_eq!(command.direct_objects, vec![EntityReference::Item("lamp".into())]);
    }

    #[test]
    fn unset_pronoun_is_bad_syntax() {
        assert!(matches!(
            parse("take it", &vocab(), &lit_world()),
            Err(ParseError::BadSyntax(_))
        ));
    }

    #[test]
    fn closed_container_contents_are_out_of_scope() {
        let mut state = lit_world();
        state.items.insert(
            "box".into(),
            Item::new("box")
                .with_name("wooden box")
                .with_flag(attrs::IS_CONTAINER)
                .with_flag(attrs::IS_OPENABLE)
                .in_location("hall"),
        );
        state.items.insert(
            "pearl".into(),
            Item::new("pearl")
                .with_name("pearl")
                .with_parent(lantern_data::ParentEntity::Item("box".into())),
        );
        assert_eq!(
            parse("take pearl", &vocab(), &state),
            Err(ParseError::ItemNotInScope("pearl".into()))
        );
    }
}
