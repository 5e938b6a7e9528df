use serde::{Deserialize, Serialize};

use crate::error::{Error, FsmlexResult};
use crate::patterns::Regex;
use crate::position::Position;

/// A token definition: an id and the pattern recognizing it on FSM strings.
///
/// Error types are the same record with a message attached; they live in a
/// separate table and are matched only when no regular token fits.
#[derive(Debug)]
pub struct TokenType {
    id: String,
    pattern: Regex,
    error: Option<String>,
}

impl TokenType {
    pub(crate) fn new(id: &str, pattern: Regex) -> Self {
        Self {
            id: id.to_string(),
            pattern,
            error: None,
        }
    }

    pub(crate) fn new_error(id: &str, pattern: Regex, message: &str) -> Self {
        Self {
            id: id.to_string(),
            pattern,
            error: Some(message.to_string()),
        }
    }

    /// The type's id, unique within its table.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The pattern recognizing this type on FSM strings.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Is this an error type?
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The attached error message; empty for regular tokens.
    pub fn message(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }
}

/// A match of one token type against an FSM string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMatch {
    /// Index of the matching type within its table.
    pub index: usize,
    /// Match length in FSM characters, i.e. in buffer items.
    pub len: usize,
}

/// An ordered registry of token types with unique ids.
#[derive(Debug, Default)]
pub struct TokenTable {
    entries: Vec<TokenType>,
}

impl TokenTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type. Fails if its id is already present.
    pub fn define(&mut self, token_type: TokenType) -> FsmlexResult<()> {
        if self.entries.iter().any(|t| t.id == token_type.id) {
            return Err(Error::DuplicatePattern(token_type.id));
        }
        self.entries.push(token_type);
        Ok(())
    }

    /// Remove and return the type registered under `id`. Fails if absent.
    pub fn remove(&mut self, id: &str) -> FsmlexResult<TokenType> {
        match self.entries.iter().position(|t| t.id == id) {
            Some(idx) => Ok(self.entries.remove(idx)),
            None => Err(Error::PatternNotFound(id.to_string())),
        }
    }

    /// The type registered under `id`. Fails if absent.
    pub fn lookup(&self, id: &str) -> FsmlexResult<&TokenType> {
        self.entries
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::PatternNotFound(id.to_string()))
    }

    /// The type at `index`, as reported by a [`TokenMatch`].
    pub fn get(&self, index: usize) -> &TokenType {
        &self.entries[index]
    }

    /// All types matching at position zero of `fsm_str`, in definition
    /// order, with match lengths in FSM characters.
    pub fn find_matches(&self, fsm_str: &str) -> Vec<TokenMatch> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, t)| {
                t.pattern
                    .match_len(fsm_str)
                    .map(|len| TokenMatch { index, len })
            })
            .collect()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the types in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &TokenType> {
        self.entries.iter()
    }
}

/// One recognized token.
///
/// `value` reproduces the exact span of original input the match consumed:
/// concatenating the values of all emitted tokens, in order, reconstructs
/// the consumed prefix of the input. Error tokens flow in-band and are
/// marked by `is_error`, carrying the message of their error type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Id of the token or error type that produced this token.
    pub id: String,
    /// Where the token starts within the original input.
    pub position: Position,
    /// The literal consumed input span.
    pub value: String,
    /// True when this token was produced by an error type.
    pub is_error: bool,
    /// The error message; empty for regular tokens.
    pub message: String,
}

impl Token {
    pub(crate) fn new(token_type: &TokenType, position: Position, value: String) -> Self {
        Self {
            id: token_type.id().to_string(),
            position,
            value,
            is_error: token_type.is_error(),
            message: token_type.message().to_string(),
        }
    }
}
