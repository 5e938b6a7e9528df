use std::fmt;
use std::io;

pub(crate) type FsmlexResult<T> = Result<T, Error>;

/// Errors that can occur during fsmlex usage
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading from a reader input
    /// or when loading a grammar file.
    Io(io::Error),

    /// JSON parsing failed when loading a raw grammar.
    Json(serde_json::Error),

    /// A regex failed to compile while defining a grammar.
    #[allow(missing_docs)]
    Regex { pattern: String, message: String },

    /// A pattern id was defined twice within the same registry.
    DuplicatePattern(String),

    /// A pattern id was looked up or removed but was never defined.
    PatternNotFound(String),

    /// Tried to register an FSM-char pattern for the reserved NUL character.
    /// `'\0'` marks items that match no FSM-char pattern and can never be
    /// a pattern of its own.
    ReservedFsmChar,

    /// Two or more FSM-char patterns matched the same item.
    /// The patterns of a grammar must be mutually exclusive; this is a
    /// grammar-design error, not a recoverable condition.
    #[allow(missing_docs)]
    AmbiguousFsmChar { item: String, chars: Vec<char> },

    /// No error type matched an unrecognized FSM string.
    /// The grammar's error patterns must cover everything its token
    /// patterns do not.
    NoErrorType(String),

    /// More than one error type matched an unrecognized FSM string.
    #[allow(missing_docs)]
    AmbiguousErrorType { fsm_str: String, ids: Vec<String> },

    /// The tokenizer loop exceeded its iteration bound without producing
    /// a token. Indicates a grammar that admits infinite zero-width
    /// matches.
    IterationLimit(usize),

    /// `shift` was asked for more items than the buffer holds.
    #[allow(missing_docs)]
    ShiftOutOfRange { count: usize, len: usize },

    /// `extend` was called on a buffer with no bound input.
    NoInput,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Json(err) => write!(f, "JSON parsing error: {}", err),
            Error::Regex { pattern, message } => {
                write!(f, "invalid regex {:?}: {}", pattern, message)
            }
            Error::DuplicatePattern(id) => write!(f, "pattern already defined: {:?}", id),
            Error::PatternNotFound(id) => write!(f, "pattern not defined: {:?}", id),
            Error::ReservedFsmChar => write!(f, "FSM char '\\0' is reserved"),
            Error::AmbiguousFsmChar { item, chars } => write!(
                f,
                "FSM-char patterns are not mutually exclusive: item {:?} matches {:?}",
                item, chars
            ),
            Error::NoErrorType(fsm_str) => write!(
                f,
                "no error type matches FSM string starting with {:?}, revise the error \
                 definitions of the grammar",
                fsm_str
            ),
            Error::AmbiguousErrorType { fsm_str, ids } => write!(
                f,
                "cannot determine error type for FSM string starting with {:?}, \
                 candidates are {:?}",
                fsm_str, ids
            ),
            Error::IterationLimit(n) => {
                write!(f, "tokenizer made no progress after {} iterations", n)
            }
            Error::ShiftOutOfRange { count, len } => write!(
                f,
                "cannot shift {} items out of a buffer holding {}",
                count, len
            ),
            Error::NoInput => write!(f, "cannot extend a buffer with no bound input"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Regex { .. }
            | Error::DuplicatePattern(_)
            | Error::PatternNotFound(_)
            | Error::ReservedFsmChar
            | Error::AmbiguousFsmChar { .. }
            | Error::NoErrorType(_)
            | Error::AmbiguousErrorType { .. }
            | Error::IterationLimit(_)
            | Error::ShiftOutOfRange { .. }
            | Error::NoInput => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
