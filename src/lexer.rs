use std::io::Read;

use crate::chars::{self, BACKSPACE, CR, CRLF, CR_STR, FORM_FEED, LF, LF_STR, SP, TAB};
use crate::error::{Error, Result};
use crate::format::Format;
use crate::reader::{Last, LookaheadReader};

/// What a [`Token`] holds after a call to [`Lexer::next_token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Nothing produced yet.
    Invalid,
    /// A complete field with more fields following on the same record.
    Field,
    /// A complete field that ends its record.
    RecordEnd,
    /// The body of one comment line.
    Comment,
    /// End of input. `is_ready` tells whether a final field is attached.
    Eof,
}

/// Scratch token reused across [`Lexer::next_token`] calls so field text can
/// reuse its allocation. Callers consume the content before the next call.
#[derive(Debug)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) content: String,
    /// On `Eof`, whether the accumulated content is a final field.
    pub(crate) is_ready: bool,
    /// Whether the field was read in quoted mode.
    pub(crate) is_quoted: bool,
    /// Whether an escape sequence was substituted into the content. Such
    /// text can no longer match the null sentinel literally.
    pub(crate) unescaped: bool,
}

impl Token {
    pub(crate) fn new() -> Token {
        Token {
            kind: TokenKind::Invalid,
            content: String::new(),
            is_ready: false,
            is_quoted: false,
            unescaped: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.kind = TokenKind::Invalid;
        self.content.clear();
        self.is_ready = false;
        self.is_quoted = false;
        self.unescaped = false;
    }
}

/// The token-producing state machine.
///
/// Scans the character stream under the rules of the active [`Format`] and
/// produces one token per field, comment line or end of input. Quoted and
/// unquoted fields are handled by separate scan loops; record terminators
/// are unified (`CR`, `LF` and `CRLF` each end a record) and the first one
/// seen is remembered.
#[derive(Debug)]
pub(crate) struct Lexer<R> {
    reader: LookaheadReader<R>,
    delimiter: Vec<char>,
    quote: Option<char>,
    escape: Option<char>,
    comment_marker: Option<char>,
    ignore_surrounding_spaces: bool,
    ignore_empty_lines: bool,
    lenient_eof: bool,
    trailing_data: bool,
    first_eol: Option<&'static str>,
    /// Whether the previous token ended because of a delimiter, in which
    /// case EOF still owes the parser one empty field.
    delimiter_was_last: bool,
}

impl<R: Read> Lexer<R> {
    pub(crate) fn new(format: &Format, reader: LookaheadReader<R>) -> Lexer<R> {
        Lexer {
            reader,
            delimiter: format.delimiter().chars().collect(),
            quote: format.quote(),
            escape: format.escape(),
            comment_marker: format.comment_marker(),
            ignore_surrounding_spaces: format.ignore_surrounding_spaces(),
            ignore_empty_lines: format.ignore_empty_lines(),
            lenient_eof: format.lenient_eof(),
            trailing_data: format.trailing_data(),
            first_eol: None,
            delimiter_was_last: false,
        }
    }

    /// Produces the next token into `token`.
    pub(crate) fn next_token(&mut self, token: &mut Token) -> Result<()> {
        token.reset();

        let mut last = self.reader.last_char();
        let mut c = self.reader.read()?;
        let mut eol = self.read_end_of_line(c)?;

        if self.ignore_empty_lines {
            while eol && last.is_start_of_line() {
                last = c;
                c = self.reader.read()?;
                eol = self.read_end_of_line(c)?;
                if c == Last::Eof {
                    token.kind = TokenKind::Eof;
                    return Ok(());
                }
            }
        }

        if last == Last::Eof || (!self.delimiter_was_last && c == Last::Eof) {
            token.kind = TokenKind::Eof;
            return Ok(());
        }

        if last.is_start_of_line() && self.is_comment_start(c) {
            let line = match self.reader.read_line()? {
                Some(line) => line,
                None => {
                    token.kind = TokenKind::Eof;
                    return Ok(());
                }
            };
            token.content.push_str(line.strip_prefix(SP).unwrap_or(&line));
            token.kind = TokenKind::Comment;
            return Ok(());
        }

        while token.kind == TokenKind::Invalid {
            if self.ignore_surrounding_spaces {
                while is_blank(c) && !eol && !self.is_delimiter(c)? {
                    c = self.reader.read()?;
                    eol = self.read_end_of_line(c)?;
                }
            }
            if self.is_delimiter(c)? {
                token.kind = TokenKind::Field;
            } else if eol {
                token.kind = TokenKind::RecordEnd;
            } else if self.is_quote(c) {
                self.scan_quoted(token)?;
            } else if c == Last::Eof {
                token.kind = TokenKind::Eof;
                token.is_ready = true;
            } else {
                self.scan_unquoted(token, c)?;
            }
        }
        Ok(())
    }

    /// Scans an unquoted field starting at `c`.
    fn scan_unquoted(&mut self, token: &mut Token, mut c: Last) -> Result<()> {
        loop {
            if self.read_end_of_line(c)? {
                token.kind = TokenKind::RecordEnd;
                break;
            }
            if c == Last::Eof {
                token.kind = TokenKind::Eof;
                token.is_ready = true;
                break;
            }
            if self.is_delimiter(c)? {
                token.kind = TokenKind::Field;
                break;
            }
            if self.is_escape(c) {
                self.read_escape(token)?;
            } else if let Last::Char(ch) = c {
                token.content.push(ch);
            }
            c = self.reader.read()?;
        }
        if self.ignore_surrounding_spaces {
            trim_trailing_blanks(&mut token.content);
        }
        Ok(())
    }

    /// Scans a quoted field. The opening quote has been consumed.
    fn scan_quoted(&mut self, token: &mut Token) -> Result<()> {
        token.is_quoted = true;
        let start_line = self.line_number();
        loop {
            let c = self.reader.read()?;
            if self.is_quote(c) {
                let peeked = self.reader.peek()?;
                if self.is_quote(peeked) {
                    if let Last::Char(ch) = self.reader.read()? {
                        token.content.push(ch);
                    }
                } else {
                    // Closing quote reached; consume up to the delimiter.
                    loop {
                        let c = self.reader.read()?;
                        if self.is_delimiter(c)? {
                            token.kind = TokenKind::Field;
                            return Ok(());
                        }
                        if c == Last::Eof {
                            token.kind = TokenKind::Eof;
                            token.is_ready = true;
                            return Ok(());
                        }
                        if self.read_end_of_line(c)? {
                            token.kind = TokenKind::RecordEnd;
                            return Ok(());
                        }
                        if self.trailing_data {
                            if let Last::Char(ch) = c {
                                token.content.push(ch);
                            }
                        } else if !is_blank(c) {
                            return Err(Error::parse(
                                self.line_number(),
                                self.position(),
                                "invalid character between encapsulated field and delimiter",
                            ));
                        }
                    }
                }
            } else if self.is_escape(c) {
                self.read_escape(token)?;
            } else if c == Last::Eof {
                if self.lenient_eof {
                    token.kind = TokenKind::Eof;
                    token.is_ready = true;
                    return Ok(());
                }
                return Err(Error::parse(
                    start_line,
                    self.position(),
                    "EOF reached before encapsulated field finished",
                ));
            } else if let Last::Char(ch) = c {
                token.content.push(ch);
            }
        }
    }

    /// Translates the character after an escape into the token.
    fn read_escape(&mut self, token: &mut Token) -> Result<()> {
        match self.reader.read()? {
            Last::Char('r') => {
                token.content.push(CR);
                token.unescaped = true;
            }
            Last::Char('n') => {
                token.content.push(LF);
                token.unescaped = true;
            }
            Last::Char('t') => {
                token.content.push(TAB);
                token.unescaped = true;
            }
            Last::Char('b') => {
                token.content.push(BACKSPACE);
                token.unescaped = true;
            }
            Last::Char('f') => {
                token.content.push(FORM_FEED);
                token.unescaped = true;
            }
            Last::Char('N') => {
                // The MySQL null marker keeps its escape so `\N` can be told
                // apart from an escaped backslash followed by `N`.
                if let Some(escape) = self.escape {
                    token.content.push(escape);
                }
                token.content.push('N');
            }
            Last::Char(ch) => {
                token.content.push(ch);
                token.unescaped = true;
            }
            _ => {
                return Err(Error::parse(
                    self.line_number(),
                    self.position(),
                    "EOF whilst processing escape sequence",
                ));
            }
        }
        Ok(())
    }

    /// True when `c` ends a record. Consumes the `LF` of a `CRLF` pair and
    /// records the first terminator seen in the stream.
    fn read_end_of_line(&mut self, c: Last) -> Result<bool> {
        let mut ch = match c {
            Last::Char(ch) => ch,
            _ => return Ok(false),
        };
        if ch == CR && self.reader.peek()?.is_char(LF) {
            self.reader.read()?;
            ch = LF;
            if self.first_eol.is_none() {
                self.first_eol = Some(CRLF);
            }
        }
        if self.first_eol.is_none() {
            if ch == LF {
                self.first_eol = Some(LF_STR);
            } else if ch == CR {
                self.first_eol = Some(CR_STR);
            }
        }
        Ok(ch == LF || ch == CR)
    }

    /// True when the configured delimiter starts at `c`, consuming the rest
    /// of a multi-character delimiter on a full match.
    fn is_delimiter(&mut self, c: Last) -> Result<bool> {
        self.delimiter_was_last = false;
        let first = match c {
            Last::Char(ch) => ch,
            _ => return Ok(false),
        };
        if first != self.delimiter[0] {
            return Ok(false);
        }
        if self.delimiter.len() > 1 {
            self.reader.mark();
            for &expected in &self.delimiter[1..] {
                if !self.reader.read()?.is_char(expected) {
                    self.reader.reset();
                    return Ok(false);
                }
            }
            self.reader.unmark();
        }
        self.delimiter_was_last = true;
        Ok(true)
    }

    fn is_quote(&self, c: Last) -> bool {
        matches!((c, self.quote), (Last::Char(ch), Some(quote)) if ch == quote)
    }

    fn is_escape(&self, c: Last) -> bool {
        matches!((c, self.escape), (Last::Char(ch), Some(escape)) if ch == escape)
    }

    fn is_comment_start(&self, c: Last) -> bool {
        matches!((c, self.comment_marker), (Last::Char(ch), Some(marker)) if ch == marker)
    }

    /// The first record terminator seen in the stream, if any.
    pub(crate) fn first_eol(&self) -> Option<&'static str> {
        self.first_eol
    }

    pub(crate) fn line_number(&self) -> u64 {
        self.reader.line_number()
    }

    pub(crate) fn position(&self) -> u64 {
        self.reader.position()
    }
}

fn is_blank(c: Last) -> bool {
    matches!(c, Last::Char(ch) if chars::is_blank_char(ch))
}

fn trim_trailing_blanks(content: &mut String) {
    while content.ends_with(&[SP, TAB][..]) {
        content.pop();
    }
}
