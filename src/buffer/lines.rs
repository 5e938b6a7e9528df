use std::sync::Arc;

use crate::buffer::input::{Input, byte_index_of_char};
use crate::buffer::TokenizerBuffer;
use crate::classifier::FsmClassifier;
use crate::error::{Error, FsmlexResult};
use crate::position::Position;

/// A buffer whose items are whole physical lines.
///
/// Every item ends with `'\n'`, except possibly the last one: a final item
/// without a terminator is an *incomplete line*, and the next `extend`
/// appends the first text it reads to that item instead of creating a new
/// one. The FSM string has exactly one character per line, produced by the
/// grammar's classifier; when an incomplete line grows, its FSM character
/// is reclassified in place.
#[derive(Debug)]
pub struct LineBuffer {
    content: Vec<String>,
    fsm_str: String,
    start: Position,
    end: Position,
    input: Option<Input>,
    classifier: Arc<FsmClassifier>,
}

impl LineBuffer {
    /// An empty, unbound buffer with zeroed markers.
    pub fn new(classifier: Arc<FsmClassifier>) -> Self {
        Self {
            content: Vec::new(),
            fsm_str: String::new(),
            start: Position::default(),
            end: Position::default(),
            input: None,
            classifier,
        }
    }

    /// An empty buffer reading from `input`.
    pub fn with_input(classifier: Arc<FsmClassifier>, input: Input) -> Self {
        let mut buf = Self::new(classifier);
        buf.bind(input);
        buf
    }

    /// Replace the content with a bare string split into lines, keeping
    /// the terminators, then set the start marker.
    pub fn assign_text(&mut self, start: Position, text: &str) -> FsmlexResult<()> {
        let lines = text
            .split_inclusive('\n')
            .map(String::from)
            .collect::<Vec<_>>();
        self.assign(start, Some(lines), None)
    }

    /// The line at `index`, if present.
    pub fn item_at(&self, index: usize) -> Option<&str> {
        self.content.get(index).map(String::as_str)
    }

    /// All buffered lines.
    pub fn items(&self) -> &[String] {
        &self.content
    }

    /// Iterate over the buffered lines.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.content.iter().map(String::as_str)
    }

    fn make_fsm_str(&self, lines: &[String]) -> FsmlexResult<String> {
        lines
            .iter()
            .map(|line| self.classifier.classify(line))
            .collect()
    }

    fn last_is_incomplete(&self) -> bool {
        self.content.last().is_some_and(|last| !last.ends_with('\n'))
    }

    /// Append one piece that represents a single line boundary.
    fn append_line(&mut self, line: &str) -> FsmlexResult<()> {
        if self.last_is_incomplete() {
            let last = self.content.last_mut().expect("incomplete implies non-empty");
            last.push_str(line);
            let remapped = self.classifier.classify(last)?;
            self.fsm_str.pop();
            self.fsm_str.push(remapped);
        } else {
            self.fsm_str.push(self.classifier.classify(line)?);
            self.content.push(line.to_string());
        }
        Ok(())
    }

    /// Append a run of text, splitting it into lines with terminators
    /// kept. The first line continues a trailing incomplete item.
    fn append_string_lines(&mut self, string: &str) -> FsmlexResult<()> {
        if string.is_empty() {
            return Ok(());
        }
        let mut lines = string.split_inclusive('\n');
        if self.last_is_incomplete() {
            let first = lines.next().expect("non-empty string has a first line");
            let last = self.content.last_mut().expect("incomplete implies non-empty");
            last.push_str(first);
            let remapped = self.classifier.classify(last)?;
            self.fsm_str.pop();
            self.fsm_str.push(remapped);
        }
        for line in lines {
            self.fsm_str.push(self.classifier.classify(line)?);
            self.content.push(line.to_string());
        }
        Ok(())
    }

    fn update_end_marker(&mut self) {
        let mut lines = self.content.len();
        if self.last_is_incomplete() {
            let last_len = self
                .content
                .last()
                .map_or(0, |last| last.chars().count());
            lines -= 1;
            self.end.col = if lines == 0 {
                // one incomplete line, still on the start line
                self.start.col + last_len
            } else {
                last_len
            };
        } else if lines == 0 {
            self.end.col = self.start.col;
        } else {
            self.end.col = 0;
        }
        let chars: usize = self.content.iter().map(|l| l.chars().count()).sum();
        self.end.line = self.start.line + lines;
        self.end.offset = self.start.offset + chars;
    }
}

impl TokenizerBuffer for LineBuffer {
    type Content = Vec<String>;

    const DEFAULT_CHUNK: usize = 256;

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
        content: Option<Vec<String>>,
        fsm_str: Option<String>,
    ) -> FsmlexResult<()> {
        let content = content.unwrap_or_default();
        self.fsm_str = match fsm_str {
            Some(s) => s,
            None => self.make_fsm_str(&content)?,
        };
        self.content = content;
        self.set_start_marker(start);
        Ok(())
    }

    fn extend(&mut self, chunk_size: usize) -> FsmlexResult<usize> {
        enum Chunk {
            Run(String, Option<String>),
            Lines(Vec<String>),
        }

        let chunk = match self.input.as_mut() {
            None => return Err(Error::NoInput),
            Some(Input::Text(text)) => {
                Chunk::Run(text.take_chars_to_newline(chunk_size).to_string(), None)
            }
            Some(Input::Reader(reader)) => {
                let head = reader.read_chars(chunk_size)?;
                let tail = if !head.is_empty() && !head.ends_with('\n') {
                    Some(reader.read_line()?)
                } else {
                    None
                };
                Chunk::Run(head, tail)
            }
            Some(Input::Pieces(pieces)) => {
                let mut lines = Vec::new();
                let mut size = 0;
                while size < chunk_size {
                    let Some(piece) = pieces.next_piece() else {
                        break;
                    };
                    if piece.is_empty() {
                        break;
                    }
                    size += piece.chars().count();
                    lines.push(piece);
                }
                Chunk::Lines(lines)
            }
        };

        let read = match chunk {
            Chunk::Run(head, tail) => {
                let mut read = head.chars().count();
                self.append_string_lines(&head)?;
                if let Some(tail) = tail {
                    read += tail.chars().count();
                    self.append_string_lines(&tail)?;
                }
                read
            }
            Chunk::Lines(lines) => {
                let mut read = 0;
                for line in &lines {
                    read += line.chars().count();
                    self.append_line(line)?;
                }
                read
            }
        };
        self.update_end_marker();
        Ok(read)
    }

    fn shift(&mut self, count: usize) -> FsmlexResult<Self> {
        if count > self.content.len() {
            return Err(Error::ShiftOutOfRange {
                count,
                len: self.content.len(),
            });
        }
        let head: Vec<String> = self.content.drain(..count).collect();
        let fsm_cut = byte_index_of_char(&self.fsm_str, count);

        let mut shifted = LineBuffer::new(self.classifier.clone());
        shifted.assign(
            self.start,
            Some(head),
            Some(self.fsm_str[..fsm_cut].to_string()),
        )?;

        let tail = std::mem::take(&mut self.content);
        let fsm_tail = self.fsm_str[fsm_cut..].to_string();
        self.assign(shifted.end, Some(tail), Some(fsm_tail))?;
        Ok(shifted)
    }

    fn len(&self) -> usize {
        self.content.len()
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
        self.content.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Classifier with no entries: every line maps to `'\0'`. Enough for
    /// content and marker behavior, which ignores FSM characters.
    fn unclassified() -> Arc<FsmClassifier> {
        Arc::new(FsmClassifier::new())
    }

    fn line_classifier() -> Arc<FsmClassifier> {
        let mut cls = FsmClassifier::new();
        cls.define(' ', r"[\t ]*\n?").unwrap();
        cls.define('#', r"#[^\n]*\n").unwrap();
        cls.define('L', r"[^#].*[^\t ]+.*\n").unwrap();
        Arc::new(cls)
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn end_marker_fixtures() {
        let fixtures: &[(&[&str], [(usize, usize, usize); 4], [(usize, usize, usize); 4])] = &[
            (
                &[],
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
            ),
            (
                &[""],
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
            ),
            (
                &["single line content"],
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(0, 19, 19), (1, 19, 19), (0, 20, 19), (0, 19, 20)],
            ),
            (
                &["\n", "first line empty"],
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(1, 16, 17), (2, 16, 17), (1, 16, 17), (1, 16, 18)],
            ),
            (
                &["second line empty\n", ""],
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(1, 0, 18), (2, 0, 18), (1, 0, 18), (1, 0, 19)],
            ),
            (
                &["two line\n", "content"],
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(1, 7, 16), (2, 7, 16), (1, 7, 16), (1, 7, 17)],
            ),
            (
                &["two line\n", "content\n"],
                [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)],
                [(2, 0, 17), (3, 0, 17), (2, 0, 17), (2, 0, 18)],
            ),
        ];

        for (content, starts, ends) in fixtures {
            for (start, end) in starts.iter().zip(ends.iter()) {
                let mut buf = LineBuffer::new(unclassified());
                buf.assign(
                    Position::new(start.0, start.1, start.2),
                    Some(lines(content)),
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
    fn extend_appends_new_line_after_complete_line() {
        let mut buf = LineBuffer::new(unclassified());
        buf.assign(
            Position::default(),
            Some(lines(&["first line\n", "second line\n"])),
            None,
        )
        .unwrap();
        buf.bind(Input::pieces(vec!["input line\n".to_string()]));

        assert_eq!(buf.extend_default().unwrap(), 11);
        assert_eq!(
            buf.items(),
            &lines(&["first line\n", "second line\n", "input line\n"])[..]
        );
    }

    #[test]
    fn extend_continues_incomplete_line() {
        let mut buf = LineBuffer::new(unclassified());
        buf.assign(
            Position::default(),
            Some(lines(&["first line\n", "second line"])),
            None,
        )
        .unwrap();
        buf.bind(Input::pieces(vec!["input line\n".to_string()]));

        assert_eq!(buf.extend_default().unwrap(), 11);
        assert_eq!(
            buf.items(),
            &lines(&["first line\n", "second lineinput line\n"])[..]
        );
    }

    #[test]
    fn continuation_reclassifies_the_last_fsm_char() {
        let mut buf = LineBuffer::new(line_classifier());
        buf.assign(
            Position::default(),
            Some(lines(&["first line\n", "second line"])),
            None,
        )
        .unwrap();
        assert_eq!(buf.fsm_str(), "L\0");

        buf.bind(Input::pieces(vec!["input line\n".to_string()]));
        buf.extend_default().unwrap();
        assert_eq!(buf.fsm_str(), "LL");
        assert_eq!(buf.len(), buf.fsm_str().chars().count());
    }

    #[test]
    fn extend_by_text_closes_the_line() {
        let mut buf = LineBuffer::new(unclassified());
        buf.bind(Input::text("one\ntwo\nthree\nfour"));

        // 5 chars requested, slice extended to the next newline
        assert_eq!(buf.extend(5).unwrap(), 8);
        assert_eq!(buf.items(), &lines(&["one\n", "two\n"])[..]);

        assert_eq!(buf.extend(5).unwrap(), 6);
        assert_eq!(buf.items(), &lines(&["one\n", "two\n", "three\n"])[..]);

        // no newline left, read to end of string
        assert_eq!(buf.extend(2).unwrap(), 4);
        assert_eq!(
            buf.items(),
            &lines(&["one\n", "two\n", "three\n", "four"])[..]
        );
        assert_eq!(buf.extend(2).unwrap(), 0);
    }

    #[test]
    fn extend_by_reader_closes_the_line() {
        let mut buf = LineBuffer::new(unclassified());
        buf.bind(Input::reader(std::io::Cursor::new(
            "alpha\nbeta\ngamma\n".as_bytes().to_vec(),
        )));

        // read(8) ends mid-line, a readline closes it
        assert_eq!(buf.extend(8).unwrap(), 11);
        assert_eq!(buf.items(), &lines(&["alpha\n", "beta\n"])[..]);

        assert_eq!(buf.extend(8).unwrap(), 6);
        assert_eq!(buf.extend(8).unwrap(), 0);
    }

    #[test]
    fn empty_piece_ends_input() {
        let mut buf = LineBuffer::new(unclassified());
        buf.bind(Input::pieces(vec![
            "one\n".to_string(),
            String::new(),
            "two\n".to_string(),
        ]));
        assert_eq!(buf.extend(32).unwrap(), 4);
        assert_eq!(buf.items(), &lines(&["one\n"])[..]);
    }

    #[test]
    fn assign_text_keeps_terminators() {
        let mut buf = LineBuffer::new(unclassified());
        buf.assign_text(Position::default(), "a\nb\nc").unwrap();
        assert_eq!(buf.items(), &lines(&["a\n", "b\n", "c"])[..]);
        assert_eq!(buf.text(), "a\nb\nc");
    }

    #[test]
    fn shift_carries_markers() {
        let mut buf = LineBuffer::new(unclassified());
        buf.assign_text(Position::default(), "one\ntwo\nthree\n")
            .unwrap();

        let s = buf.shift(2).unwrap();
        assert_eq!(s.text(), "one\ntwo\n");
        assert_eq!(s.start(), Position::new(0, 0, 0));
        assert_eq!(s.end(), Position::new(2, 0, 8));
        assert_eq!(buf.start(), Position::new(2, 0, 8));
        assert_eq!(buf.items(), &lines(&["three\n"])[..]);

        let s = buf.shift(1).unwrap();
        assert_eq!(s.start(), Position::new(2, 0, 8));
        assert!(buf.is_empty());
        assert_eq!(buf.start(), Position::new(3, 0, 14));
    }

    #[test]
    fn shift_past_end_is_an_error() {
        let mut buf = LineBuffer::new(unclassified());
        buf.assign_text(Position::default(), "one\n").unwrap();
        assert!(matches!(
            buf.shift(2),
            Err(Error::ShiftOutOfRange { count: 2, len: 1 })
        ));
    }

    #[test]
    fn fsm_string_length_equals_item_count() {
        let mut buf = LineBuffer::new(line_classifier());
        buf.bind(Input::text("# comment\ntext\n\nmore text"));
        buf.extend(256).unwrap();
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.fsm_str(), "#L \0");

        let s = buf.shift(2).unwrap();
        assert_eq!(s.fsm_str(), "#L");
        assert_eq!(buf.fsm_str(), " \0");
    }

    #[test]
    fn item_access() {
        let mut buf = LineBuffer::new(unclassified());
        buf.assign_text(Position::default(), "a\nbb\nccc\n").unwrap();
        assert_eq!(buf.item_at(1), Some("bb\n"));
        assert_eq!(buf.item_at(5), None);
        assert_eq!(buf.iter().collect::<Vec<_>>(), vec!["a\n", "bb\n", "ccc\n"]);
    }
}
