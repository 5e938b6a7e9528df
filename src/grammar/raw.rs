use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FsmlexResult;
use crate::grammar::{Grammar, GrammarBuilder};

/// A token-type entry of a raw grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTokenType {
    /// Id of the token type.
    pub id: String,
    /// Regex source recognizing the type on FSM strings.
    pub pattern: String,
}

/// An error-type entry of a raw grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawErrorType {
    /// Id of the error type.
    pub id: String,
    /// Regex source recognizing the type on FSM strings.
    pub pattern: String,
    /// Message carried by tokens of this type.
    pub message: String,
}

/// The JSON shape of a grammar definition.
///
/// Token and error types are arrays so their definition order survives a
/// round-trip; helper and FSM-char patterns are plain maps. Nothing is
/// validated or compiled until [`compile`](RawGrammar::compile).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGrammar {
    /// Named helper patterns.
    #[serde(default)]
    pub helpers: BTreeMap<String, String>,
    /// FSM-char patterns, keyed by their single character.
    #[serde(default)]
    pub fsm_chars: BTreeMap<char, String>,
    /// Token types, in definition order.
    #[serde(default)]
    pub tokens: Vec<RawTokenType>,
    /// Error types, in definition order.
    #[serde(default)]
    pub errors: Vec<RawErrorType>,
}

impl RawGrammar {
    /// Parse a grammar definition from a JSON string.
    pub fn load_from_str(content: &str) -> FsmlexResult<Self> {
        let raw_grammar = serde_json::from_str(content)?;
        Ok(raw_grammar)
    }

    /// Parse a grammar definition from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> FsmlexResult<Self> {
        let file = File::open(&path)?;
        let raw_grammar = serde_json::from_reader(&file)?;
        Ok(raw_grammar)
    }

    /// Compile every pattern and produce the immutable grammar.
    /// Fails on bad regexes, duplicate ids and a reserved FSM char, the
    /// same way the equivalent [`GrammarBuilder`] calls would.
    pub fn compile(&self) -> FsmlexResult<Grammar> {
        let mut builder = GrammarBuilder::new();
        for (id, pattern) in &self.helpers {
            builder.define_helper_pattern(id, pattern)?;
        }
        for (ch, pattern) in &self.fsm_chars {
            builder.define_fsm_char_pattern(*ch, pattern)?;
        }
        for token in &self.tokens {
            builder.define_token_type(&token.id, &token.pattern)?;
        }
        for error in &self.errors {
            builder.define_error_type(&error.id, &error.pattern, &error.message)?;
        }
        Ok(builder.build())
    }
}
