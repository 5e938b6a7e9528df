use std::fmt;

use crate::error::{Error, FsmlexResult};

/// A compiled regex together with the pattern text it was built from.
///
/// Matching is always anchored at the start of the haystack (the pattern
/// is compiled with a `\A` prefix), which is the only operation the
/// tokenizer needs: the engine consumes prefixes of the FSM string and
/// never searches. Match lengths are reported in characters because the
/// FSM string is indexed by buffer item, not by byte.
pub struct Regex {
    pattern: String,
    compiled: onig::Regex,
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

impl Regex {
    /// Compile `pattern`, anchored at the start. Compilation is eager so
    /// that a bad pattern fails at grammar-definition time, not in the
    /// middle of tokenization.
    pub fn new(pattern: &str) -> FsmlexResult<Self> {
        Self::compile(pattern, &format!(r"\A(?:{})", pattern))
    }

    /// Compile `pattern` anchored at both ends, for classifying whole
    /// items.
    ///
    /// `\Z` rather than `\z`: an FSM-char pattern written without a
    /// trailing `\n` still classifies a newline-terminated line, which is
    /// how the anchoring behaves in every grammar this design descends
    /// from.
    pub fn full_anchored(pattern: &str) -> FsmlexResult<Self> {
        Self::compile(pattern, &format!(r"\A(?:{})\Z", pattern))
    }

    fn compile(source: &str, wrapped: &str) -> FsmlexResult<Self> {
        let compiled = onig::Regex::new(wrapped).map_err(|e| Error::Regex {
            pattern: source.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            pattern: source.to_string(),
            compiled,
        })
    }

    /// The pattern text this regex was built from, without the anchoring.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Length in characters of the match starting at position zero,
    /// or `None` if the pattern does not match there.
    pub fn match_len(&self, text: &str) -> Option<usize> {
        // \A pins any match to position zero, so find can only ever
        // return a prefix
        self.compiled
            .find(text)
            .map(|(_, end)| text[..end].chars().count())
    }

    /// Does the pattern match at position zero?
    pub fn is_match(&self, text: &str) -> bool {
        self.match_len(text).is_some()
    }
}

/// An ordered mapping from string ids to compiled regexes.
///
/// Iteration follows definition order, so diagnostics listing candidate
/// patterns come out deterministic. Tables stay small (a handful of
/// patterns per grammar), hence the linear lookups.
#[derive(Debug, Default)]
pub struct PatternTable {
    entries: Vec<(String, Regex)>,
}

impl PatternTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pattern` under `id`. Fails if `id` is already present.
    pub fn define(&mut self, id: &str, pattern: &str) -> FsmlexResult<()> {
        self.define_regex(id, Regex::new(pattern)?)
    }

    pub(crate) fn define_regex(&mut self, id: &str, regex: Regex) -> FsmlexResult<()> {
        if self.entries.iter().any(|(eid, _)| eid == id) {
            return Err(Error::DuplicatePattern(id.to_string()));
        }
        self.entries.push((id.to_string(), regex));
        Ok(())
    }

    /// Return the regex registered under `id`. Fails if absent.
    pub fn lookup(&self, id: &str) -> FsmlexResult<&Regex> {
        self.entries
            .iter()
            .find(|(eid, _)| eid == id)
            .map(|(_, re)| re)
            .ok_or_else(|| Error::PatternNotFound(id.to_string()))
    }

    /// Remove and return the regex registered under `id`. Fails if absent.
    pub fn remove(&mut self, id: &str) -> FsmlexResult<Regex> {
        match self.entries.iter().position(|(eid, _)| eid == id) {
            Some(idx) => Ok(self.entries.remove(idx).1),
            None => Err(Error::PatternNotFound(id.to_string())),
        }
    }

    /// All `(id, match-length)` pairs whose regex matches at position zero
    /// of `text`, in definition order. Lengths are in characters.
    pub fn find_matches(&self, text: &str) -> Vec<(&str, usize)> {
        self.entries
            .iter()
            .filter_map(|(id, re)| re.match_len(text).map(|len| (id.as_str(), len)))
            .collect()
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(id, regex)` entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Regex)> {
        self.entries.iter().map(|(id, re)| (id.as_str(), re))
    }
}
