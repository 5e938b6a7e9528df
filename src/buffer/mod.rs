//! Tokenizer input buffers.
//!
//! A buffer is a FIFO over *items* — generalized characters — read from a
//! bound input source. [`CharBuffer`] stores plain characters;
//! [`LineBuffer`] stores whole physical lines. Alongside its items every
//! buffer maintains the *FSM string*, a parallel string with exactly one
//! character per item, produced by the grammar's mapping; tokenizers match
//! regexes against the FSM string, never against the raw content.
//!
//! Buffers also keep two position markers locating their content within
//! the original input: the start marker (first buffered item) and the end
//! marker (one past the last). The end marker is always a pure function of
//! the start marker and the content. Markers and content are independent
//! of input binding: replacing the bound input mid-stream keeps them
//! moving without discontinuities, as if the inputs had been concatenated.

use std::sync::Arc;

use crate::classifier::FsmClassifier;
use crate::error::FsmlexResult;
use crate::position::Position;

mod chars;
mod input;
mod lines;

pub use chars::CharBuffer;
pub use input::{Input, PiecesInput, ReaderInput, TextInput};
pub use lines::LineBuffer;

/// How a buffer derives FSM characters from its items.
#[derive(Debug, Clone)]
pub enum FsmMapping {
    /// The FSM string equals the content verbatim. Only meaningful for
    /// character items.
    Identity,
    /// Each item is classified to a single character by anchored regex
    /// matching.
    Classify(Arc<FsmClassifier>),
}

impl FsmMapping {
    /// Map a chunk of character items to its stretch of FSM string.
    pub(crate) fn map_chunk(&self, chunk: &str) -> FsmlexResult<String> {
        match self {
            FsmMapping::Identity => Ok(chunk.to_string()),
            FsmMapping::Classify(classifier) => {
                let mut out = String::with_capacity(chunk.len());
                let mut scratch = [0u8; 4];
                for c in chunk.chars() {
                    out.push(classifier.classify(c.encode_utf8(&mut scratch))?);
                }
                Ok(out)
            }
        }
    }
}

/// The contract shared by both buffer variants.
///
/// The read strategy for a bound input is selected once at bind time and
/// used by every subsequent [`extend`](TokenizerBuffer::extend).
pub trait TokenizerBuffer: Sized {
    /// What `assign` replaces the content with: `String` for character
    /// buffers, `Vec<String>` for line buffers.
    type Content;

    /// Characters requested from the input by a default-sized `extend`.
    const DEFAULT_CHUNK: usize;

    /// Attach an input source. Rebinding does not clear content or
    /// markers.
    fn bind(&mut self, input: Input);

    /// Detach the bound input, if any. A detached buffer cannot be
    /// extended.
    fn unbind(&mut self);

    /// Move the start marker and recompute the end marker.
    fn set_start_marker(&mut self, start: Position);

    /// Replace the whole content, then set the start marker. `None`
    /// content means empty. When `fsm_str` is supplied it is adopted
    /// verbatim, otherwise the FSM string is recomputed from the content.
    fn assign(
        &mut self,
        start: Position,
        content: Option<Self::Content>,
        fsm_str: Option<String>,
    ) -> FsmlexResult<()>;

    /// Read roughly `chunk_size` characters' worth of items from the bound
    /// input and append them. Returns the number of characters read; a
    /// line buffer may read past `chunk_size` to close a trailing
    /// incomplete line.
    fn extend(&mut self, chunk_size: usize) -> FsmlexResult<usize>;

    /// `extend` with the variant's default chunk size.
    fn extend_default(&mut self) -> FsmlexResult<usize> {
        self.extend(Self::DEFAULT_CHUNK)
    }

    /// Remove the first `count` items and return them as a new buffer of
    /// the same type. The returned buffer carries the caller's pre-shift
    /// start marker; the caller's start marker advances to the returned
    /// buffer's end marker. The FSM string is sliced in parallel.
    /// `count == len()` empties the buffer; `count > len()` is a caller
    /// error.
    fn shift(&mut self, count: usize) -> FsmlexResult<Self>;

    /// Number of items currently held.
    fn len(&self) -> usize;

    /// Does the buffer hold no items?
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The FSM string; one character per item.
    fn fsm_str(&self) -> &str;

    /// Position of the first buffered item within the original input.
    fn start(&self) -> Position;

    /// Position one past the last buffered item.
    fn end(&self) -> Position;

    /// Exact reconstruction of the buffered part of the input.
    fn text(&self) -> String;
}
