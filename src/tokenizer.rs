use std::sync::Arc;

use crate::buffer::{CharBuffer, FsmMapping, Input, LineBuffer, TokenizerBuffer};
use crate::error::{Error, FsmlexResult};
use crate::grammar::Grammar;
use crate::position::Position;
use crate::token::{Token, TokenMatch};

/// Minimum number of items required in the buffer before a match attempt.
const MAX_LOOKAHEAD: usize = 1;

/// Safety bound on the matching loop. A grammar that cannot make progress
/// within this many rounds admits infinite zero-width matches.
const MAX_ITERATIONS: usize = 1_000_000;

/// The matching engine.
///
/// Drives its buffer against the grammar's token patterns: the buffer is
/// extended until at least one item is present, every token type is
/// matched against the FSM string, and the longest unambiguous match is
/// shifted out as the next token. While some candidate still spans the
/// entire buffered FSM string and input remains, the engine reads more
/// before committing, because an even longer match may exist.
///
/// Unrecognized input and longest-match ties become in-band error tokens
/// through the grammar's error types; misconfigured grammars and caller
/// misuse surface as [`Error`]s and abort tokenization.
pub struct Tokenizer<B> {
    grammar: Arc<Grammar>,
    buffer: B,
}

impl Tokenizer<CharBuffer> {
    /// A tokenizer over character items.
    ///
    /// The FSM string equals the input unless the grammar defines
    /// FSM-char patterns, in which case each character is classified.
    pub fn chars(grammar: Arc<Grammar>) -> Self {
        let mapping = if grammar.fsm_chars().is_empty() {
            FsmMapping::Identity
        } else {
            FsmMapping::Classify(grammar.fsm_chars().clone())
        };
        Self {
            buffer: CharBuffer::new(mapping),
            grammar,
        }
    }
}

impl Tokenizer<LineBuffer> {
    /// A tokenizer over line items, classified by the grammar's FSM-char
    /// patterns.
    pub fn lines(grammar: Arc<Grammar>) -> Self {
        Self {
            buffer: LineBuffer::new(grammar.fsm_chars().clone()),
            grammar,
        }
    }
}

impl<B: TokenizerBuffer> Tokenizer<B> {
    /// Wire a tokenizer to an explicitly constructed buffer.
    pub fn new(grammar: Arc<Grammar>, buffer: B) -> Self {
        Self { grammar, buffer }
    }

    /// Attach an input source to the underlying buffer. Content already
    /// buffered is kept; positions continue without discontinuities.
    pub fn bind(&mut self, input: Input) {
        self.buffer.bind(input);
    }

    /// The grammar this tokenizer recognizes.
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Mutable access to the underlying buffer, e.g. to seed content or
    /// reposition the start marker before tokenizing.
    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    /// Position of the next unconsumed item within the original input.
    pub fn position(&self) -> Position {
        self.buffer.start()
    }

    /// Recognize the next token.
    ///
    /// Returns `Ok(None)` when the buffer is empty and the input is
    /// exhausted. Lexical errors are returned as tokens with
    /// `is_error = true`; an `Err` means the grammar or the caller broke
    /// the framework's contracts.
    pub fn token(&mut self) -> FsmlexResult<Option<Token>> {
        let mut eoi = false;
        for _ in 0..MAX_ITERATIONS {
            while !eoi && self.buffer.len() < MAX_LOOKAHEAD {
                eoi = self.buffer.extend_default()? < B::DEFAULT_CHUNK;
            }
            if self.buffer.is_empty() {
                return Ok(None);
            }

            let fsm_len = self.buffer.fsm_str().chars().count();
            let matches = self.grammar.match_token_types(self.buffer.fsm_str());
            #[cfg(feature = "debug")]
            log::debug!(
                "[token] fsm {:?} (eoi: {eoi}): {} candidates",
                self.buffer.fsm_str(),
                matches.len()
            );
            if matches.is_empty() {
                return self.error_token().map(Some);
            }

            let spans_whole_buffer = matches.iter().any(|m| m.len == fsm_len);
            if spans_whole_buffer && !eoi {
                // some candidate could still grow, read once more and
                // re-evaluate
                eoi = self.buffer.extend_default()? < B::DEFAULT_CHUNK;
                continue;
            }

            let longest = matches
                .iter()
                .map(|m| m.len)
                .max()
                .expect("match list is non-empty");
            let winners: Vec<&TokenMatch> =
                matches.iter().filter(|m| m.len == longest).collect();
            if winners.len() > 1 {
                // two token types tie for longest: grammar ambiguity,
                // surfaced in-band so the grammar can be repaired
                return self.error_token().map(Some);
            }

            let token_type = self.grammar.token_types().get(winners[0].index);
            let shifted = self.buffer.shift(longest)?;
            #[cfg(feature = "debug")]
            log::debug!(
                "[token] emit {} at {} ({} items)",
                token_type.id(),
                shifted.start(),
                longest
            );
            return Ok(Some(Token::new(token_type, shifted.start(), shifted.text())));
        }
        Err(Error::IterationLimit(MAX_ITERATIONS))
    }

    /// Emit an error token for an FSM string no token type matches.
    /// Exactly one error type must match it; anything else is a grammar
    /// configuration error.
    fn error_token(&mut self) -> FsmlexResult<Token> {
        let matches = self.grammar.match_error_types(self.buffer.fsm_str());
        let head: String = self
            .buffer
            .fsm_str()
            .chars()
            .take(MAX_LOOKAHEAD)
            .collect();
        match matches.as_slice() {
            [] => Err(Error::NoErrorType(head)),
            [m] => {
                let token_type = self.grammar.error_types().get(m.index);
                let shifted = self.buffer.shift(m.len)?;
                Ok(Token::new(token_type, shifted.start(), shifted.text()))
            }
            _ => Err(Error::AmbiguousErrorType {
                fsm_str: head,
                ids: matches
                    .iter()
                    .map(|m| self.grammar.error_types().get(m.index).id().to_string())
                    .collect(),
            }),
        }
    }

    /// Iterate over the remaining tokens. The iterator ends when the
    /// input is exhausted and fuses after the first fatal error.
    pub fn tokens(&mut self) -> Tokens<'_, B> {
        Tokens {
            tokenizer: self,
            done: false,
        }
    }
}

/// Iterator over the tokens of a [`Tokenizer`].
pub struct Tokens<'t, B> {
    tokenizer: &'t mut Tokenizer<B>,
    done: bool,
}

impl<B: TokenizerBuffer> Iterator for Tokens<'_, B> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.tokenizer.token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
