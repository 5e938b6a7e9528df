//! Lexical grammar definition.
//!
//! A grammar is defined once, through [`GrammarBuilder`] or a JSON
//! [`RawGrammar`], and is immutable afterwards: all tokenizers of the same
//! kind share one `Arc<Grammar>` read-only.

mod compiled;
mod raw;

pub use compiled::{Grammar, GrammarBuilder};
pub use raw::{RawErrorType, RawGrammar, RawTokenType};
