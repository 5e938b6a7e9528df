use std::fmt;
use std::io::{self, BufRead};

/// An input source a buffer can read items from.
///
/// The read strategy is fixed once, when the input is bound to a buffer:
/// an owned string walked with a cursor, a buffered reader decoded as
/// UTF-8 text, or an iterator over string pieces (usually lines). Which
/// strategies a buffer supports and how a chunk request translates into
/// items is up to the buffer variant.
pub enum Input {
    /// An in-memory string consumed left to right.
    Text(TextInput),
    /// A readable handle producing UTF-8 bytes.
    Reader(ReaderInput),
    /// A lazy sequence of text pieces.
    Pieces(PiecesInput),
}

impl Input {
    /// Input over an owned string.
    pub fn text(text: impl Into<String>) -> Self {
        Input::Text(TextInput {
            text: text.into(),
            tell: 0,
        })
    }

    /// Input over a buffered reader. The stream is decoded incrementally
    /// as UTF-8; it is treated as character data, never split inside a
    /// multi-byte sequence.
    pub fn reader(reader: impl BufRead + 'static) -> Self {
        Input::Reader(ReaderInput {
            reader: Box::new(reader),
        })
    }

    /// Input over an iterator of string pieces.
    pub fn pieces<I>(pieces: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'static,
    {
        Input::Pieces(PiecesInput {
            iter: Box::new(pieces.into_iter()),
        })
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Text(t) => write!(f, "Input::Text(tell: {}, len: {})", t.tell, t.text.len()),
            Input::Reader(_) => write!(f, "Input::Reader"),
            Input::Pieces(_) => write!(f, "Input::Pieces"),
        }
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::text(text)
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::text(text)
    }
}

impl From<Vec<String>> for Input {
    fn from(pieces: Vec<String>) -> Self {
        Input::pieces(pieces)
    }
}

impl From<Vec<&str>> for Input {
    fn from(pieces: Vec<&str>) -> Self {
        Input::pieces(
            pieces
                .into_iter()
                .map(String::from)
                .collect::<Vec<String>>(),
        )
    }
}

/// String input with a byte cursor.
pub struct TextInput {
    text: String,
    tell: usize,
}

impl TextInput {
    /// Take up to `n` characters from the cursor.
    pub(crate) fn take_chars(&mut self, n: usize) -> &str {
        let rest = &self.text[self.tell..];
        let end = byte_index_of_char(rest, n);
        let start = self.tell;
        self.tell += end;
        &self.text[start..start + end]
    }

    /// Take up to `n` characters, then keep going to the next newline
    /// (inclusive) or the end of the string, so the slice never stops in
    /// the middle of a line.
    pub(crate) fn take_chars_to_newline(&mut self, n: usize) -> &str {
        let rest = &self.text[self.tell..];
        let mut end = byte_index_of_char(rest, n);
        if end > 0 && !rest[..end].ends_with('\n') {
            end = match rest[end..].find('\n') {
                Some(i) => end + i + 1,
                None => rest.len(),
            };
        }
        let start = self.tell;
        self.tell += end;
        &self.text[start..start + end]
    }
}

/// Buffered-reader input with incremental UTF-8 decoding.
pub struct ReaderInput {
    reader: Box<dyn BufRead>,
}

impl ReaderInput {
    /// Read up to `n` characters. Stops early only at end of input.
    pub(crate) fn read_chars(&mut self, n: usize) -> io::Result<String> {
        let mut out = String::new();
        for _ in 0..n {
            match read_one_char(&mut self.reader)? {
                Some(c) => out.push(c),
                None => break,
            }
        }
        Ok(out)
    }

    /// Read up to and including the next newline, or to end of input.
    pub(crate) fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(line)
    }
}

/// Piece-iterator input.
pub struct PiecesInput {
    iter: Box<dyn Iterator<Item = String>>,
}

impl PiecesInput {
    pub(crate) fn next_piece(&mut self) -> Option<String> {
        self.iter.next()
    }
}

/// Byte index of the `n`-th character of `s`, or `s.len()` when `s` has
/// fewer than `n` characters.
pub(crate) fn byte_index_of_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

fn invalid_utf8() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        "stream did not contain valid UTF-8",
    )
}

/// Decode one character from `reader`, carrying multi-byte sequences whole
/// across read boundaries. `None` at end of input.
fn read_one_char(reader: &mut dyn BufRead) -> io::Result<Option<char>> {
    let mut bytes = [0u8; 4];
    if reader.read(&mut bytes[..1])? == 0 {
        return Ok(None);
    }
    let width = match bytes[0] {
        0x00..=0x7f => return Ok(Some(bytes[0] as char)),
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Err(invalid_utf8()),
    };
    reader
        .read_exact(&mut bytes[1..width])
        .map_err(|_| invalid_utf8())?;
    match std::str::from_utf8(&bytes[..width]) {
        Ok(s) => Ok(s.chars().next()),
        Err(_) => Err(invalid_utf8()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn text_cursor_walks_characters() {
        let mut input = TextInput {
            text: "αβγδε".to_string(),
            tell: 0,
        };
        assert_eq!(input.take_chars(2), "αβ");
        assert_eq!(input.take_chars(2), "γδ");
        assert_eq!(input.take_chars(2), "ε");
        assert_eq!(input.take_chars(2), "");
    }

    #[test]
    fn text_cursor_closes_lines() {
        let mut input = TextInput {
            text: "one\ntwo\nthree".to_string(),
            tell: 0,
        };
        assert_eq!(input.take_chars_to_newline(5), "one\ntwo\n");
        assert_eq!(input.take_chars_to_newline(2), "three");
        assert_eq!(input.take_chars_to_newline(2), "");
    }

    #[test]
    fn text_cursor_keeps_exact_newline_boundary() {
        let mut input = TextInput {
            text: "ab\ncd".to_string(),
            tell: 0,
        };
        // the requested slice already ends on a newline, nothing extra read
        assert_eq!(input.take_chars_to_newline(3), "ab\n");
    }

    #[test]
    fn reader_decodes_multibyte_across_chunks() {
        // 2 chars, 4 bytes; ask for one char at a time
        let mut input = ReaderInput {
            reader: Box::new(Cursor::new("éé".as_bytes().to_vec())),
        };
        assert_eq!(input.read_chars(1).unwrap(), "é");
        assert_eq!(input.read_chars(10).unwrap(), "é");
        assert_eq!(input.read_chars(1).unwrap(), "");
    }

    #[test]
    fn reader_rejects_invalid_utf8() {
        let mut input = ReaderInput {
            reader: Box::new(Cursor::new(vec![0xff, 0x41])),
        };
        assert!(input.read_chars(1).is_err());
    }

    #[test]
    fn reader_read_line() {
        let mut input = ReaderInput {
            reader: Box::new(Cursor::new("partial rest\nnext".as_bytes().to_vec())),
        };
        assert_eq!(input.read_chars(7).unwrap(), "partial");
        assert_eq!(input.read_line().unwrap(), " rest\n");
        assert_eq!(input.read_line().unwrap(), "next");
    }
}
