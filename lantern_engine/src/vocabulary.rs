//! The runtime vocabulary the parser matches against.
//!
//! Built from the handler registry (each handler contributes its verb,
//! synonym words, and syntax frames) plus direction words, articles, and
//! pronouns. Blueprints may add further synonyms for game-specific flavor.

use crate::location::Direction;
use lantern_data::VerbId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Grammatical shapes a verb accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyntaxFrame {
    /// Verb alone ("wait", "look").
    Intransitive,
    /// Verb plus direct object(s) ("take lamp").
    DirectOnly,
    /// Verb, direct object, preposition, indirect object
    /// ("unlock chest with key").
    DirectAndIndirect,
    /// Verb plus a direction ("go north").
    DirectionOnly,
}

/// One verb family: its id, the words that invoke it, and its grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbEntry {
    pub id: VerbId,
    /// Invoking words; entries may contain a space ("turn on", "look at").
    pub words: BTreeSet<String>,
    pub frames: BTreeSet<SyntaxFrame>,
    pub supports_multiple_objects: bool,
    /// Prepositions that introduce this verb's indirect object.
    pub prepositions: BTreeSet<String>,
}

impl VerbEntry {
    pub fn new(id: impl Into<VerbId>) -> Self {
        Self {
            id: id.into(),
            words: BTreeSet::new(),
            frames: BTreeSet::new(),
            supports_multiple_objects: false,
            prepositions: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(words.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = SyntaxFrame>) -> Self {
        self.frames.extend(frames);
        self
    }

    #[must_use]
    pub fn multi_object(mut self) -> Self {
        self.supports_multiple_objects = true;
        self
    }

    #[must_use]
    pub fn with_prepositions<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prepositions.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn accepts(&self, frame: SyntaxFrame) -> bool {
        self.frames.contains(&frame)
    }
}

/// Words the engine understands, independent of any particular world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    verbs: BTreeMap<VerbId, VerbEntry>,
    /// Maps each invoking word (possibly multi-word) to its verb.
    word_index: BTreeMap<String, VerbId>,
    pub articles: BTreeSet<String>,
    pub pronoun_words: BTreeSet<String>,
    pub all_words: BTreeSet<String>,
}

impl Vocabulary {
    /// A vocabulary with standard articles, pronouns, and ALL words but no
    /// verbs registered yet.
    pub fn new() -> Self {
        Self {
            verbs: BTreeMap::new(),
            word_index: BTreeMap::new(),
            articles: ["the", "a", "an", "some"].iter().map(ToString::to_string).collect(),
            pronoun_words: ["it", "them", "him", "her"].iter().map(ToString::to_string).collect(),
            all_words: ["all", "everything"].iter().map(ToString::to_string).collect(),
        }
    }

    /// Register a verb entry, indexing every invoking word.
    pub fn register(&mut self, entry: VerbEntry) {
        for word in &entry.words {
            self.word_index.insert(word.clone(), entry.id.clone());
        }
        self.verbs.insert(entry.id.clone(), entry);
    }

    /// Add an extra synonym for an already-registered verb.
    pub fn add_synonym(&mut self, verb: &VerbId, word: &str) {
        if let Some(entry) = self.verbs.get_mut(verb) {
            entry.words.insert(word.to_string());
            self.word_index.insert(word.to_string(), verb.clone());
        }
    }

    pub fn entry(&self, verb: &VerbId) -> Option<&VerbEntry> {
        self.verbs.get(verb)
    }

    /// Match the longest verb phrase at the front of `tokens`.
    /// Returns the verb and how many tokens it consumed.
    pub fn verb_at(&self, tokens: &[&str]) -> Option<(VerbId, usize)> {
        for take in (1..=tokens.len().min(2)).rev() {
            let phrase = tokens[..take].join(" ");
            if let Some(verb) = self.word_index.get(&phrase) {
                return Some((verb.clone(), take));
            }
        }
        None
    }

    /// Combine a head word and a trailing particle ("turn ... on") into a
    /// verb, if that two-word form is registered.
    pub fn particle_verb(&self, head: &str, particle: &str) -> Option<VerbId> {
        self.word_index.get(&format!("{head} {particle}")).cloned()
    }

    /// Interpret a word as a compass direction.
    pub fn direction(word: &str) -> Option<Direction> {
        Direction::from_str(word).ok()
    }

    pub fn is_article(&self, word: &str) -> bool {
        self.articles.contains(word)
    }

    pub fn is_pronoun(&self, word: &str) -> bool {
        self.pronoun_words.contains(word)
    }

    pub fn is_all_word(&self, word: &str) -> bool {
        self.all_words.contains(word)
    }
}
