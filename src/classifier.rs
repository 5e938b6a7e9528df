use crate::error::{Error, FsmlexResult};
use crate::patterns::Regex;

/// The character an item maps to when it matches no FSM-char pattern.
///
/// Reserving NUL lets "no class" travel inside the FSM string itself, so a
/// grammar can address unrecognized items with an ordinary error pattern
/// (`\0` matches it) instead of the engine needing a side channel.
pub const UNMATCHED_FSM_CHAR: char = '\0';

/// Maps buffer items to single FSM characters by anchored regex matching.
///
/// Each entry pairs an FSM character with a pattern anchored at both ends;
/// an item is classified by the one entry whose pattern matches it whole.
/// The patterns of a classifier must be mutually exclusive. That is a
/// grammar-design obligation: an item matching two entries aborts
/// tokenization rather than picking a winner.
#[derive(Debug, Default)]
pub struct FsmClassifier {
    entries: Vec<(char, Regex)>,
}

impl FsmClassifier {
    /// A classifier with no entries; every item maps to
    /// [`UNMATCHED_FSM_CHAR`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pattern` for the FSM character `ch`.
    ///
    /// The pattern is stored anchored at both ends and applies to a single
    /// item. `'\0'` is reserved and cannot be registered.
    pub fn define(&mut self, ch: char, pattern: &str) -> FsmlexResult<()> {
        if ch == UNMATCHED_FSM_CHAR {
            return Err(Error::ReservedFsmChar);
        }
        if self.entries.iter().any(|(c, _)| *c == ch) {
            return Err(Error::DuplicatePattern(ch.to_string()));
        }
        self.entries.push((ch, Regex::full_anchored(pattern)?));
        Ok(())
    }

    /// Remove the pattern registered for `ch`. Fails if absent.
    pub fn remove(&mut self, ch: char) -> FsmlexResult<()> {
        match self.entries.iter().position(|(c, _)| *c == ch) {
            Some(idx) => {
                self.entries.remove(idx);
                Ok(())
            }
            None => Err(Error::PatternNotFound(ch.to_string())),
        }
    }

    /// Return the pattern registered for `ch`. Fails if absent.
    pub fn lookup(&self, ch: char) -> FsmlexResult<&Regex> {
        self.entries
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, re)| re)
            .ok_or_else(|| Error::PatternNotFound(ch.to_string()))
    }

    /// Classify one item.
    ///
    /// Returns the single matching FSM character, [`UNMATCHED_FSM_CHAR`]
    /// when no entry matches, and fails when the exclusivity contract is
    /// violated.
    pub fn classify(&self, item: &str) -> FsmlexResult<char> {
        let mut matched = self
            .entries
            .iter()
            .filter(|(_, re)| re.is_match(item))
            .map(|(ch, _)| *ch);

        let Some(first) = matched.next() else {
            return Ok(UNMATCHED_FSM_CHAR);
        };
        match matched.next() {
            None => Ok(first),
            Some(second) => {
                let mut chars = vec![first, second];
                chars.extend(matched);
                Err(Error::AmbiguousFsmChar {
                    item: item.to_string(),
                    chars,
                })
            }
        }
    }

    /// Does the classifier have no entries?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
