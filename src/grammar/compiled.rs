use std::sync::Arc;

use crate::classifier::FsmClassifier;
use crate::error::FsmlexResult;
use crate::patterns::{PatternTable, Regex};
use crate::token::{TokenMatch, TokenTable, TokenType};

/// An immutable lexical grammar.
///
/// Holds four registries: helper patterns (building blocks for composing
/// other patterns), FSM-char patterns (classifying items into FSM
/// characters), token types and error types. Built by [`GrammarBuilder`];
/// once built, nothing can be added or removed, so a grammar can be shared
/// by any number of tokenizers behind an `Arc`.
#[derive(Debug)]
pub struct Grammar {
    helpers: PatternTable,
    fsm_chars: Arc<FsmClassifier>,
    tokens: TokenTable,
    errors: TokenTable,
}

impl Grammar {
    /// Start defining a grammar.
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// The helper pattern registered under `id`.
    pub fn helper_pattern(&self, id: &str) -> FsmlexResult<&Regex> {
        self.helpers.lookup(id)
    }

    /// The item classifier built from the FSM-char patterns.
    pub fn fsm_chars(&self) -> &Arc<FsmClassifier> {
        &self.fsm_chars
    }

    /// The registry of token types.
    pub fn token_types(&self) -> &TokenTable {
        &self.tokens
    }

    /// The registry of error types.
    pub fn error_types(&self) -> &TokenTable {
        &self.errors
    }

    /// All token types matching the start of `fsm_str`.
    pub fn match_token_types(&self, fsm_str: &str) -> Vec<TokenMatch> {
        self.tokens.find_matches(fsm_str)
    }

    /// All error types matching the start of `fsm_str`.
    pub fn match_error_types(&self, fsm_str: &str) -> Vec<TokenMatch> {
        self.errors.find_matches(fsm_str)
    }
}

/// Accumulates grammar definitions, then produces an immutable
/// [`Grammar`].
///
/// Every `define_*` method fails on a duplicate id, every `remove_*` on a
/// missing one. The builder is the only place a grammar can be mutated.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    helpers: PatternTable,
    fsm_chars: FsmClassifier,
    tokens: TokenTable,
    errors: TokenTable,
}

impl GrammarBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a general-purpose helper pattern, usable as a building
    /// block when composing token or FSM-char patterns.
    pub fn define_helper_pattern(&mut self, id: &str, pattern: &str) -> FsmlexResult<&mut Self> {
        self.helpers.define(id, pattern)?;
        Ok(self)
    }

    /// Remove the helper pattern registered under `id`. Fails if absent.
    pub fn remove_helper_pattern(&mut self, id: &str) -> FsmlexResult<()> {
        self.helpers.remove(id).map(|_| ())
    }

    /// The helper pattern registered under `id`, for composing further
    /// patterns. Fails if absent.
    pub fn helper_pattern(&self, id: &str) -> FsmlexResult<&Regex> {
        self.helpers.lookup(id)
    }

    /// Register an FSM-char pattern. The pattern is anchored at both ends
    /// and classifies whole items; `'\0'` is reserved.
    pub fn define_fsm_char_pattern(&mut self, ch: char, pattern: &str) -> FsmlexResult<&mut Self> {
        self.fsm_chars.define(ch, pattern)?;
        Ok(self)
    }

    /// Remove the FSM-char pattern registered for `ch`. Fails if absent.
    pub fn remove_fsm_char_pattern(&mut self, ch: char) -> FsmlexResult<()> {
        self.fsm_chars.remove(ch)
    }

    /// Register a token type recognizing `pattern` on FSM strings.
    pub fn define_token_type(&mut self, id: &str, pattern: &str) -> FsmlexResult<&mut Self> {
        self.tokens.define(TokenType::new(id, Regex::new(pattern)?))?;
        Ok(self)
    }

    /// Remove the token type registered under `id`. Fails if absent.
    pub fn remove_token_type(&mut self, id: &str) -> FsmlexResult<()> {
        self.tokens.remove(id).map(|_| ())
    }

    /// Register an error type. Error types are matched only when no token
    /// type fits, and exactly one of them must match then; the resulting
    /// token carries `message` and `is_error = true`.
    pub fn define_error_type(
        &mut self,
        id: &str,
        pattern: &str,
        message: &str,
    ) -> FsmlexResult<&mut Self> {
        self.errors
            .define(TokenType::new_error(id, Regex::new(pattern)?, message))?;
        Ok(self)
    }

    /// Remove the error type registered under `id`. Fails if absent.
    pub fn remove_error_type(&mut self, id: &str) -> FsmlexResult<()> {
        self.errors.remove(id).map(|_| ())
    }

    /// Freeze the definitions into an immutable [`Grammar`].
    pub fn build(self) -> Grammar {
        Grammar {
            helpers: self.helpers,
            fsm_chars: Arc::new(self.fsm_chars),
            tokens: self.tokens,
            errors: self.errors,
        }
    }
}
