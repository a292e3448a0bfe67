use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read};

use crate::chars::{CR, LF};

/// The last outcome of reading from a [`LookaheadReader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Last {
    /// Nothing has been read yet.
    Undefined,
    /// The end of the input was reached.
    Eof,
    /// A character was read.
    Char(char),
}

impl Last {
    pub(crate) fn is_char(self, expected: char) -> bool {
        matches!(self, Last::Char(ch) if ch == expected)
    }

    /// True for the states that put the reader at the start of a line.
    pub(crate) fn is_start_of_line(self) -> bool {
        matches!(self, Last::Undefined | Last::Char(CR) | Last::Char(LF))
    }
}

/// A character reader over a byte source, with single-character lookahead,
/// mark/reset, and position bookkeeping.
///
/// The reader decodes UTF-8 incrementally and tracks three monotonically
/// increasing observables: the absolute count of characters consumed, the
/// number of line terminators consumed (`CRLF` counts once), and the last
/// read outcome. The lexer leans on `peek` for quote doubling and on
/// `mark`/`reset` for multi-character delimiter lookahead.
#[derive(Debug)]
pub(crate) struct LookaheadReader<R> {
    rdr: BufReader<R>,
    /// Characters decoded but not yet consumed, front first.
    lookahead: VecDeque<char>,
    mark: Option<Mark>,
    last: Last,
    position: u64,
    eol_count: u64,
}

#[derive(Debug)]
struct Mark {
    position: u64,
    last: Last,
    eol_count: u64,
    /// Characters consumed since the mark, replayed on reset.
    consumed: Vec<char>,
}

impl<R: Read> LookaheadReader<R> {
    pub(crate) fn new(inner: R) -> LookaheadReader<R> {
        LookaheadReader {
            rdr: BufReader::new(inner),
            lookahead: VecDeque::new(),
            mark: None,
            last: Last::Undefined,
            position: 0,
            eol_count: 0,
        }
    }

    /// Reads the next character.
    ///
    /// The end-of-line counter is incremented when consuming `CR`, when
    /// consuming an `LF` not preceded by `CR`, and once at EOF unless the
    /// input already ended with a terminator.
    pub(crate) fn read(&mut self) -> io::Result<Last> {
        let next = match self.lookahead.pop_front() {
            Some(ch) => Some(ch),
            None => decode_char(&mut self.rdr)?,
        };
        match next {
            Some(ch) => {
                if let Some(mark) = &mut self.mark {
                    mark.consumed.push(ch);
                }
                if ch == CR || (ch == LF && self.last != Last::Char(CR)) {
                    self.eol_count += 1;
                }
                self.position += 1;
                self.last = Last::Char(ch);
            }
            None => {
                if !matches!(self.last, Last::Char(CR) | Last::Char(LF) | Last::Eof) {
                    self.eol_count += 1;
                }
                self.last = Last::Eof;
            }
        }
        Ok(self.last)
    }

    /// Reads up to `buf.len()` characters, returning how many were read.
    /// Zero means end of input. Line and position counters advance exactly
    /// as they would under repeated single-character reads. The printer
    /// drains character-stream fields through this.
    pub(crate) fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.read()? {
                Last::Char(ch) => {
                    buf[n] = ch;
                    n += 1;
                }
                _ => break,
            }
        }
        Ok(n)
    }

    /// Returns the next character without consuming it.
    pub(crate) fn peek(&mut self) -> io::Result<Last> {
        if self.lookahead.is_empty() {
            if let Some(ch) = decode_char(&mut self.rdr)? {
                self.lookahead.push_back(ch);
            }
        }
        Ok(match self.lookahead.front() {
            Some(&ch) => Last::Char(ch),
            None => Last::Eof,
        })
    }

    /// Snapshots position, last char and line count. A later [`reset`]
    /// rewinds to this point; characters read in between are replayed.
    ///
    /// [`reset`]: LookaheadReader::reset
    pub(crate) fn mark(&mut self) {
        self.mark = Some(Mark {
            position: self.position,
            last: self.last,
            eol_count: self.eol_count,
            consumed: Vec::new(),
        });
    }

    /// Rewinds to the most recent mark, if any.
    pub(crate) fn reset(&mut self) {
        if let Some(mark) = self.mark.take() {
            for ch in mark.consumed.into_iter().rev() {
                self.lookahead.push_front(ch);
            }
            self.position = mark.position;
            self.last = mark.last;
            self.eol_count = mark.eol_count;
        }
    }

    /// Discards the most recent mark without rewinding.
    pub(crate) fn unmark(&mut self) {
        self.mark = None;
    }

    /// Consumes through the next `LF`, `CR` or `CRLF`, dropping the
    /// terminator, and returns the prefix. `None` when already at EOF.
    pub(crate) fn read_line(&mut self) -> io::Result<Option<String>> {
        if self.peek()? == Last::Eof {
            return Ok(None);
        }
        let mut line = String::new();
        loop {
            match self.read()? {
                Last::Char(ch) if ch == CR => {
                    if self.peek()?.is_char(LF) {
                        self.read()?;
                    }
                    break;
                }
                Last::Char(ch) if ch == LF => break,
                Last::Char(ch) => line.push(ch),
                _ => break,
            }
        }
        Ok(Some(line))
    }

    /// The outcome of the most recent read, [`Last::Undefined`] before the
    /// first one.
    pub(crate) fn last_char(&self) -> Last {
        self.last
    }

    /// Absolute count of characters consumed so far.
    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    /// The line currently being read, derived from the 0-based terminator
    /// count: one past it while inside a line, equal to it at a boundary.
    pub(crate) fn line_number(&self) -> u64 {
        match self.last {
            Last::Char(ch) if ch != CR && ch != LF => self.eol_count + 1,
            _ => self.eol_count,
        }
    }
}

/// Decodes one UTF-8 character from a buffered byte source. `None` at EOF.
fn decode_char<R: BufRead>(rdr: &mut R) -> io::Result<Option<char>> {
    let first = {
        let buf = rdr.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        buf[0]
    };
    let width = match utf8_width(first) {
        Some(width) => width,
        None => return Err(invalid_utf8()),
    };
    let mut bytes = [0u8; 4];
    let mut have = 0;
    while have < width {
        let buf = rdr.fill_buf()?;
        if buf.is_empty() {
            return Err(invalid_utf8());
        }
        let take = (width - have).min(buf.len());
        bytes[have..have + take].copy_from_slice(&buf[..take]);
        rdr.consume(take);
        have += take;
    }
    match std::str::from_utf8(&bytes[..width]) {
        Ok(s) => Ok(s.chars().next()),
        Err(_) => Err(invalid_utf8()),
    }
}

fn utf8_width(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8")
}
