//! A regex-driven streaming tokenizer framework.
//!
//! A lexical grammar is defined once — token patterns, error patterns and
//! optionally FSM-char patterns — and applied to input consumed
//! incrementally from a string, a reader or an iterator of pieces. Tokens
//! come out annotated with their line, column and absolute character
//! offset plus the literal consumed text; lexical errors flow in-band as
//! tokens flagged with `is_error`.
//!
//! Matching happens on the *FSM string*, a canonical representation of
//! the buffered input with one character per buffered *item*. For
//! character-level grammars ([`Tokenizer::chars`]) the FSM string is
//! ordinarily the input itself. Line-level grammars
//! ([`Tokenizer::lines`]) buffer whole physical lines and classify each
//! one to a single FSM character, so a "token" can be a run of comment
//! lines or a paragraph, recognized by an ordinary regex over the
//! classified characters.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fsmlex::{Grammar, Input, Tokenizer};
//!
//! # fn main() -> Result<(), fsmlex::Error> {
//! let mut builder = Grammar::builder();
//! builder
//!     .define_token_type("Word", r"[a-zA-Z]+")?
//!     .define_token_type("Sep", r"[ \t\n]+")?
//!     .define_token_type("Punct", r"[.,;:-]")?
//!     .define_error_type("SyntaxError", r"[^ \t\n]+", "syntax error")?;
//! let grammar = Arc::new(builder.build());
//!
//! let mut tokenizer = Tokenizer::chars(grammar);
//! tokenizer.bind(Input::text("Lorem, ipsum"));
//! for token in tokenizer.tokens() {
//!     let token = token?;
//!     println!("{}:{}:{:?}", token.position, token.id, token.value);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

mod buffer;
mod classifier;
mod error;
mod grammar;
mod patterns;
mod position;
mod token;
mod tokenizer;

pub use buffer::{
    CharBuffer, FsmMapping, Input, LineBuffer, PiecesInput, ReaderInput, TextInput,
    TokenizerBuffer,
};
pub use classifier::{FsmClassifier, UNMATCHED_FSM_CHAR};
pub use error::Error;
pub use grammar::{Grammar, GrammarBuilder, RawErrorType, RawGrammar, RawTokenType};
pub use patterns::{PatternTable, Regex};
pub use position::Position;
pub use token::{Token, TokenMatch, TokenTable, TokenType};
pub use tokenizer::{Tokenizer, Tokens};
