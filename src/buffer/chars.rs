use std::ops::Range;

use crate::buffer::input::{Input, byte_index_of_char};
use crate::buffer::{FsmMapping, TokenizerBuffer};
use crate::error::{Error, FsmlexResult};
use crate::position::Position;

/// A buffer whose items are single characters.
///
/// Content is kept as one string and the FSM string always has exactly as
/// many characters as the content. With the [`FsmMapping::Identity`]
/// mapping the two are equal, which is the ordinary setup for
/// character-level grammars.
#[derive(Debug)]
pub struct CharBuffer {
    content: String,
    /// Item count, cached so `len` stays O(1) on multi-byte text.
    len_chars: usize,
    fsm_str: String,
    start: Position,
    end: Position,
    input: Option<Input>,
    mapping: FsmMapping,
}

impl CharBuffer {
    /// An empty, unbound buffer with zeroed markers.
    pub fn new(mapping: FsmMapping) -> Self {
        Self {
            content: String::new(),
            len_chars: 0,
            fsm_str: String::new(),
            start: Position::default(),
            end: Position::default(),
            input: None,
            mapping,
        }
    }

    /// An empty buffer reading from `input`.
    pub fn with_input(mapping: FsmMapping, input: Input) -> Self {
        let mut buf = Self::new(mapping);
        buf.bind(input);
        buf
    }

    /// The buffered characters.
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// The item at `index`, if present.
    pub fn item_at(&self, index: usize) -> Option<char> {
        self.content.chars().nth(index)
    }

    /// The items of `range` as a string slice.
    pub fn items(&self, range: Range<usize>) -> &str {
        let beg = byte_index_of_char(&self.content, range.start);
        let end = byte_index_of_char(&self.content, range.end);
        &self.content[beg..end]
    }

    /// Iterate over the buffered characters.
    pub fn iter(&self) -> std::str::Chars<'_> {
        self.content.chars()
    }

    fn append_chunk(&mut self, chunk: &str) -> FsmlexResult<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        let mapped = self.mapping.map_chunk(chunk)?;
        self.fsm_str.push_str(&mapped);
        self.content.push_str(chunk);
        self.len_chars += chunk.chars().count();
        Ok(())
    }

    fn update_end_marker(&mut self) {
        let mut newlines = 0;
        let mut after_last_newline = None;
        for (i, c) in self.content.chars().enumerate() {
            if c == '\n' {
                newlines += 1;
                after_last_newline = Some(i + 1);
            }
        }
        self.end.offset = self.start.offset + self.len_chars;
        self.end.line = self.start.line + newlines;
        self.end.col = match after_last_newline {
            None => self.start.col + self.len_chars,
            Some(p) => self.len_chars - p,
        };
    }
}

impl TokenizerBuffer for CharBuffer {
    type Content = String;

    const DEFAULT_CHUNK: usize = 32;

    fn bind(&mut self, input: Input) {
        self.input = Some(input);
    }

    fn unbind(&mut self) {
        self.input = None;
    }

    fn set_start_marker(&mut self, start: Position) {
        self.start = start;
        self.update_end_marker();
    }

    fn assign(
        &mut self,
        start: Position,
        content: Option<String>,
        fsm_str: Option<String>,
    ) -> FsmlexResult<()> {
        let content = content.unwrap_or_default();
        self.fsm_str = match fsm_str {
            Some(s) => s,
            None => self.mapping.map_chunk(&content)?,
        };
        self.len_chars = content.chars().count();
        self.content = content;
        self.set_start_marker(start);
        Ok(())
    }

    fn extend(&mut self, chunk_size: usize) -> FsmlexResult<usize> {
        let chunk = match self.input.as_mut() {
            None => return Err(Error::NoInput),
            Some(Input::Text(text)) => text.take_chars(chunk_size).to_string(),
            Some(Input::Reader(reader)) => reader.read_chars(chunk_size)?,
            Some(Input::Pieces(pieces)) => {
                let mut chunk = String::new();
                let mut size = 0;
                while size < chunk_size {
                    let Some(piece) = pieces.next_piece() else {
                        break;
                    };
                    size += piece.chars().count();
                    chunk.push_str(&piece);
                }
                chunk
            }
        };
        let read = chunk.chars().count();
        self.append_chunk(&chunk)?;
        self.update_end_marker();
        Ok(read)
    }

    fn shift(&mut self, count: usize) -> FsmlexResult<Self> {
        if count > self.len_chars {
            return Err(Error::ShiftOutOfRange {
                count,
                len: self.len_chars,
            });
        }
        let content_cut = byte_index_of_char(&self.content, count);
        let fsm_cut = byte_index_of_char(&self.fsm_str, count);

        let mut shifted = CharBuffer::new(self.mapping.clone());
        shifted.assign(
            self.start,
            Some(self.content[..content_cut].to_string()),
            Some(self.fsm_str[..fsm_cut].to_string()),
        )?;

        let tail = self.content[content_cut..].to_string();
        let fsm_tail = self.fsm_str[fsm_cut..].to_string();
        self.assign(shifted.end, Some(tail), Some(fsm_tail))?;
        Ok(shifted)
    }

    fn len(&self) -> usize {
        self.len_chars
    }

    fn fsm_str(&self) -> &str {
        &self.fsm_str
    }

    fn start(&self) -> Position {
        self.start
    }

    fn end(&self) -> Position {
        self.end
    }

    fn text(&self) -> String {
        self.content.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn identity() -> CharBuffer {
        CharBuffer::new(FsmMapping::Identity)
    }

    #[test]
    fn end_marker_fixtures() {
        // (content, start (line, col, offset), expected end)
        let fixtures: &[(&str, [(usize, usize, usize); 4], [(usize, usize, usize); 4])] = &[
            (
                "",
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
            ),
            (
                "single line content",
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(0, 19, 19), (1, 19, 19), (0, 20, 19), (0, 19, 20)],
            ),
            (
                "\nfirst line empty",
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(1, 16, 17), (2, 16, 17), (1, 16, 17), (1, 16, 18)],
            ),
            (
                "second line empty\n",
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(1, 0, 18), (2, 0, 18), (1, 0, 18), (1, 0, 19)],
            ),
            (
                "two line\ncontent",
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(1, 7, 16), (2, 7, 16), (1, 7, 16), (1, 7, 17)],
            ),
            (
                "two line\ncontent\n",
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(2, 0, 17), (3, 0, 17), (2, 0, 17), (2, 0, 18)],
            ),
        ];

        for (content, starts, ends) in fixtures {
            for (start, end) in starts.iter().zip(ends.iter()) {
                let mut buf = identity();
                buf.assign(
                    Position::new(start.0, start.1, start.2),
                    Some(content.to_string()),
                    None,
                )
                .unwrap();
                assert_eq!(
                    buf.end(),
                    Position::new(end.0, end.1, end.2),
                    "content {:?}, start {:?}",
                    content,
                    start
                );
            }
        }
    }

    #[test]
    fn fixed_chunk_shift() {
        let mut buf = identity();
        buf.bind(Input::text("Lorem ipsum dolor sit amet"));

        let mut shifted = Vec::new();
        loop {
            let appended = buf.extend(32).unwrap();
            while buf.len() >= 8 {
                let s = buf.shift(8).unwrap();
                shifted.push((s.start().line, s.start().col, s.text()));
            }
            if appended == 0 {
                break;
            }
        }

        assert_eq!(
            shifted,
            vec![
                (0, 0, "Lorem ip".to_string()),
                (0, 8, "sum dolo".to_string()),
                (0, 16, "r sit am".to_string()),
            ]
        );
        assert_eq!(buf.text(), "et");
        assert_eq!(buf.start(), Position::new(0, 24, 24));
    }

    #[test]
    fn extend_without_input_fails() {
        let mut buf = identity();
        assert!(matches!(buf.extend(32), Err(Error::NoInput)));
    }

    #[test]
    fn extend_by_reader() {
        let mut buf = identity();
        buf.bind(Input::reader(Cursor::new(
            "hello\nworld".as_bytes().to_vec(),
        )));
        assert_eq!(buf.extend(8).unwrap(), 8);
        assert_eq!(buf.as_str(), "hello\nwo");
        assert_eq!(buf.extend(8).unwrap(), 3);
        assert_eq!(buf.as_str(), "hello\nworld");
        assert_eq!(buf.extend(8).unwrap(), 0);
    }

    #[test]
    fn extend_by_pieces_reads_whole_pieces() {
        let mut buf = identity();
        buf.bind(Input::pieces(vec![
            "first line\n".to_string(),
            "second line\n".to_string(),
        ]));
        // one piece is enough to reach a chunk of 4
        assert_eq!(buf.extend(4).unwrap(), 11);
        assert_eq!(buf.as_str(), "first line\n");
        assert_eq!(buf.extend(32).unwrap(), 12);
        assert_eq!(buf.extend(32).unwrap(), 0);
    }

    #[test]
    fn rebinding_keeps_content_and_markers() {
        let mut buf = identity();
        buf.bind(Input::text("abc"));
        buf.extend(32).unwrap();
        let (start, end) = (buf.start(), buf.end());

        buf.bind(Input::text("def"));
        assert_eq!(buf.as_str(), "abc");
        assert_eq!(buf.start(), start);
        assert_eq!(buf.end(), end);

        // markers continue across the new input as if concatenated
        buf.extend(32).unwrap();
        assert_eq!(buf.as_str(), "abcdef");
        assert_eq!(buf.end().offset, 6);
    }

    #[test]
    fn shift_whole_buffer_empties_it() {
        let mut buf = identity();
        buf.assign(Position::default(), Some("ab\n".to_string()), None)
            .unwrap();
        let s = buf.shift(3).unwrap();
        assert_eq!(s.text(), "ab\n");
        assert!(buf.is_empty());
        assert_eq!(buf.start(), Position::new(1, 0, 3));
        assert_eq!(buf.start(), buf.end());
    }

    #[test]
    fn shift_past_end_is_an_error() {
        let mut buf = identity();
        buf.assign(Position::default(), Some("ab".to_string()), None)
            .unwrap();
        assert!(matches!(
            buf.shift(3),
            Err(Error::ShiftOutOfRange { count: 3, len: 2 })
        ));
    }

    #[test]
    fn shift_then_extend_matches_extend_then_shift() {
        let text = "alpha beta\ngamma delta";

        let mut one = identity();
        one.bind(Input::text(text));
        one.extend(8).unwrap();
        one.shift(5).unwrap();
        one.extend(6).unwrap();

        let mut two = identity();
        two.bind(Input::text(text));
        two.extend(14).unwrap();
        two.shift(5).unwrap();

        assert_eq!(one.text(), two.text());
        assert_eq!(one.fsm_str(), two.fsm_str());
        assert_eq!(one.start(), two.start());
        assert_eq!(one.end(), two.end());
    }

    #[test]
    fn fsm_string_tracks_content_length() {
        let mut buf = identity();
        buf.bind(Input::text("αβγ\nδε"));
        buf.extend(4).unwrap();
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.fsm_str().chars().count(), 4);
        buf.extend(32).unwrap();
        assert_eq!(buf.len(), 6);
        assert_eq!(buf.fsm_str().chars().count(), 6);
        let s = buf.shift(5).unwrap();
        assert_eq!(s.fsm_str().chars().count(), 5);
        assert_eq!(buf.fsm_str().chars().count(), 1);
    }

    #[test]
    fn item_access() {
        let mut buf = identity();
        buf.assign(Position::default(), Some("abcd".to_string()), None)
            .unwrap();
        assert_eq!(buf.item_at(2), Some('c'));
        assert_eq!(buf.item_at(9), None);
        assert_eq!(buf.items(1..3), "bc");
        assert_eq!(buf.iter().collect::<String>(), "abcd");
    }
}
