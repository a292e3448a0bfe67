use std::fmt;
use std::io::{self, Read, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::chars::{self, CR, LF, SP};
use crate::error::Result;
use crate::format::{Format, Header};
use crate::reader::LookaheadReader;
use crate::QuoteMode;

/// One value handed to the printer.
///
/// Strings and numbers are the common cases; the streaming variants copy a
/// reader straight to the sink so large values never have to be buffered in
/// memory. Most callers rely on the `From` conversions and pass `&str`,
/// numbers or `Option<&str>` (where `None` is the null value) directly.
pub enum Field<'a> {
    /// The null value, exchanged as the format's null string.
    Null,
    Text(&'a str),
    Int(i64),
    Float(f64),
    /// A streaming producer of UTF-8 text, quoted or escaped on the fly.
    CharStream(&'a mut dyn Read),
    /// A streaming producer of raw bytes, base64 encoded between quotes.
    ByteStream(&'a mut dyn Read),
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Field::Null => f.write_str("Null"),
            Field::Text(value) => f.debug_tuple("Text").field(value).finish(),
            Field::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Field::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Field::CharStream(_) => f.write_str("CharStream(..)"),
            Field::ByteStream(_) => f.write_str("ByteStream(..)"),
        }
    }
}

impl<'a> From<&'a str> for Field<'a> {
    fn from(value: &'a str) -> Field<'a> {
        Field::Text(value)
    }
}

impl<'a> From<&'a String> for Field<'a> {
    fn from(value: &'a String) -> Field<'a> {
        Field::Text(value)
    }
}

impl<'a> From<Option<&'a str>> for Field<'a> {
    fn from(value: Option<&'a str>) -> Field<'a> {
        match value {
            Some(value) => Field::Text(value),
            None => Field::Null,
        }
    }
}

impl<'a> From<i64> for Field<'a> {
    fn from(value: i64) -> Field<'a> {
        Field::Int(value)
    }
}

impl<'a> From<i32> for Field<'a> {
    fn from(value: i32) -> Field<'a> {
        Field::Int(value.into())
    }
}

impl<'a> From<u32> for Field<'a> {
    fn from(value: u32) -> Field<'a> {
        Field::Int(value.into())
    }
}

impl<'a> From<f64> for Field<'a> {
    fn from(value: f64) -> Field<'a> {
        Field::Float(value)
    }
}

impl<'a> From<f32> for Field<'a> {
    fn from(value: f32) -> Field<'a> {
        Field::Float(value.into())
    }
}

/// Prints records to a character sink, quoting and escaping fields as the
/// active [`Format`] demands.
///
/// Construction immediately emits the configured header comments and, for
/// an explicit header, the header row. Fields are written with
/// [`Printer::print`] or record-at-a-time with [`Printer::print_record`];
/// [`Printer::close`] releases the sink exactly once, flushing first when
/// the format asks for it.
///
/// # Example
///
/// ```
/// use std::error::Error;
/// use csv_dialect::Format;
///
/// # fn main() { example().unwrap(); }
/// fn example() -> Result<(), Box<dyn Error>> {
///     let mut printer = Format::default().print(vec![])?;
///     printer.print_record(["a", "b", "c"])?;
///     printer.print_record(["x", "y", "z"])?;
///
///     let data = String::from_utf8(printer.into_inner().unwrap())?;
///     assert_eq!(data, "a,b,c\r\nx,y,z\r\n");
///     Ok(())
/// }
/// ```
pub struct Printer<W: Write> {
    out: Option<W>,
    format: Format,
    record_count: u64,
    new_record: bool,
}

impl<W: Write> Printer<W> {
    /// Creates a printer over `out`, writing the header comments and header
    /// row configured by `format`.
    pub fn new(out: W, format: Format) -> Result<Printer<W>> {
        let mut printer = Printer {
            out: Some(out),
            format,
            record_count: 0,
            new_record: true,
        };
        let comments = printer.format.header_comments().to_vec();
        for line in &comments {
            printer.print_comment(line)?;
        }
        if let Header::Names(names) = printer.format.header().clone() {
            if !printer.format.skip_header_record() {
                printer.print_record(names.iter().map(String::as_str))?;
            }
        }
        Ok(printer)
    }

    /// Prints a single field, preceded by the delimiter unless it starts a
    /// record.
    pub fn print<'a>(&mut self, field: impl Into<Field<'a>>) -> Result<()> {
        let Printer {
            out,
            format,
            new_record,
            ..
        } = self;
        let out = out.as_mut().ok_or_else(closed)?;
        emit_field(format, out, field.into(), *new_record)?;
        self.new_record = false;
        Ok(())
    }

    /// Ends the current record: the trailing delimiter when configured,
    /// then the record separator.
    pub fn println(&mut self) -> Result<()> {
        let Printer { out, format, .. } = self;
        let out = out.as_mut().ok_or_else(closed)?;
        if format.trailing_delimiter() {
            out.write_all(format.delimiter().as_bytes())?;
        }
        if let Some(separator) = format.record_separator() {
            out.write_all(separator.as_bytes())?;
        }
        self.new_record = true;
        self.record_count += 1;
        Ok(())
    }

    /// Prints the fields of one record followed by the record separator.
    pub fn print_record<'a, I, F>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = F>,
        F: Into<Field<'a>>,
    {
        for field in fields {
            self.print(field)?;
        }
        self.println()
    }

    /// Prints `comment` as comment lines, one per line break in the text,
    /// each prefixed with the comment marker and a space. Does nothing when
    /// the format has no comment marker. Comment lines do not count as
    /// records.
    pub fn print_comment(&mut self, comment: &str) -> Result<()> {
        let marker = match self.format.comment_marker() {
            Some(marker) => marker,
            None => return Ok(()),
        };
        let count = self.record_count;
        if !self.new_record {
            self.println()?;
        }
        self.comment_start(marker)?;
        let mut iter = comment.chars().peekable();
        while let Some(ch) = iter.next() {
            match ch {
                CR => {
                    if iter.peek() == Some(&LF) {
                        iter.next();
                    }
                    self.println()?;
                    self.comment_start(marker)?;
                }
                LF => {
                    self.println()?;
                    self.comment_start(marker)?;
                }
                _ => {
                    let out = self.out.as_mut().ok_or_else(closed)?;
                    write_char(out, ch)?;
                }
            }
        }
        self.println()?;
        self.record_count = count;
        Ok(())
    }

    fn comment_start(&mut self, marker: char) -> Result<()> {
        let out = self.out.as_mut().ok_or_else(closed)?;
        write_char(out, marker)?;
        write_char(out, SP)?;
        Ok(())
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        let out = self.out.as_mut().ok_or_else(closed)?;
        out.flush()?;
        Ok(())
    }

    /// Releases the sink, flushing first when the format's `auto_flush` is
    /// set. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut out) = self.out.take() {
            if self.format.auto_flush() {
                out.flush()?;
            }
        }
        Ok(())
    }

    /// The number of records written, the header row included.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Gives the sink back, without the auto flush. `None` after `close`.
    pub fn into_inner(mut self) -> Option<W> {
        self.out.take()
    }
}

impl<W: Write> Drop for Printer<W> {
    fn drop(&mut self) {
        if let Some(mut out) = self.out.take() {
            if self.format.auto_flush() {
                let _ = out.flush();
            }
        }
    }
}

fn closed() -> crate::Error {
    io::Error::new(io::ErrorKind::NotConnected, "printer has been closed").into()
}

/// Writes one field to `out` under `format`, preceded by the delimiter
/// unless the field starts its record. Shared by [`Printer`] and
/// [`Format::format`].
pub(crate) fn emit_field<W: Write>(
    format: &Format,
    out: &mut W,
    field: Field<'_>,
    new_record: bool,
) -> Result<()> {
    if !new_record {
        out.write_all(format.delimiter().as_bytes())?;
    }
    match field {
        Field::Null => emit_null(format, out),
        Field::Text(value) => {
            let value = if format.trim() {
                chars::trim(value)
            } else {
                value
            };
            emit_text(format, out, value, new_record, false)
        }
        Field::Int(value) => {
            let mut buf = itoa::Buffer::new();
            emit_text(format, out, buf.format(value), new_record, true)
        }
        Field::Float(value) => {
            let mut buf = ryu::Buffer::new();
            emit_text(format, out, buf.format(value), new_record, true)
        }
        Field::CharStream(rdr) => emit_char_stream(format, out, rdr),
        Field::ByteStream(rdr) => emit_byte_stream(format, out, rdr),
    }
}

/// Null becomes the null string, quoted under `QuoteMode::All`, and the
/// empty string when no null string is configured. The sentinel is written
/// verbatim, never escaped, so it reads back as null.
fn emit_null<W: Write>(format: &Format, out: &mut W) -> Result<()> {
    let null_string = match format.null_string() {
        Some(null_string) => null_string,
        None => return Ok(()),
    };
    match (format.quote_mode(), format.quote()) {
        (QuoteMode::All, Some(quote)) => {
            write_char(out, quote)?;
            out.write_all(null_string.as_bytes())?;
            write_char(out, quote)?;
        }
        _ => out.write_all(null_string.as_bytes())?,
    }
    Ok(())
}

fn emit_text<W: Write>(
    format: &Format,
    out: &mut W,
    value: &str,
    new_record: bool,
    numeric: bool,
) -> Result<()> {
    if format.quote().is_some() {
        emit_with_quotes(format, out, value, new_record, numeric)
    } else if format.escape().is_some() {
        emit_with_escapes(format, out, value)
    } else {
        out.write_all(value.as_bytes())?;
        Ok(())
    }
}

fn emit_with_quotes<W: Write>(
    format: &Format,
    out: &mut W,
    value: &str,
    new_record: bool,
    numeric: bool,
) -> Result<()> {
    let quote = match format.quote() {
        Some(quote) => quote,
        None => {
            out.write_all(value.as_bytes())?;
            return Ok(());
        }
    };
    let needed = match format.quote_mode() {
        QuoteMode::All | QuoteMode::AllNonNull => true,
        QuoteMode::NonNumeric => !numeric,
        QuoteMode::None => return emit_with_escapes(format, out, value),
        QuoteMode::Minimal => minimal_needs_quotes(format, value, new_record),
    };
    if !needed {
        out.write_all(value.as_bytes())?;
        return Ok(());
    }
    // Doubles the quote char and, when set and distinct, the escape char.
    let doubled_escape = format.escape().filter(|&escape| escape != quote);
    write_char(out, quote)?;
    for ch in value.chars() {
        write_char(out, ch)?;
        if ch == quote || Some(ch) == doubled_escape {
            write_char(out, ch)?;
        }
    }
    write_char(out, quote)?;
    Ok(())
}

/// The MINIMAL policy: quote an empty first field of a record, a field
/// starting at or below `#` (which covers the comment marker), a field
/// containing the quote, the escape, a line break or the delimiter string,
/// and a field ending in a trim character.
fn minimal_needs_quotes(format: &Format, value: &str, new_record: bool) -> bool {
    let first = match value.chars().next() {
        Some(first) => first,
        None => return new_record,
    };
    if first <= chars::COMMENT {
        return true;
    }
    let quote = format.quote();
    let escape = format.escape();
    if value
        .chars()
        .any(|ch| ch == CR || ch == LF || Some(ch) == quote || Some(ch) == escape)
    {
        return true;
    }
    if value.contains(format.delimiter()) {
        return true;
    }
    value.chars().last().map_or(false, chars::is_trim_char)
}

/// The escape-only path: `CR` and `LF` are rewritten to `escape-r` and
/// `escape-n`, the escape char and every character of a delimiter match are
/// prefixed with the escape char.
fn emit_with_escapes<W: Write>(format: &Format, out: &mut W, value: &str) -> Result<()> {
    let escape = match format.escape() {
        Some(escape) => escape,
        None => {
            out.write_all(value.as_bytes())?;
            return Ok(());
        }
    };
    let delimiter: Vec<char> = format.delimiter().chars().collect();
    let value: Vec<char> = value.chars().collect();
    let mut pos = 0;
    while pos < value.len() {
        let ch = value[pos];
        if ch == CR {
            write_char(out, escape)?;
            write_char(out, 'r')?;
        } else if ch == LF {
            write_char(out, escape)?;
            write_char(out, 'n')?;
        } else if ch == escape {
            write_char(out, escape)?;
            write_char(out, escape)?;
        } else if value[pos..].starts_with(&delimiter[..]) {
            for &d in &delimiter {
                write_char(out, escape)?;
                write_char(out, d)?;
            }
            pos += delimiter.len();
            continue;
        } else {
            write_char(out, ch)?;
        }
        pos += 1;
    }
    Ok(())
}

/// Copies a character stream to the sink under the quoting policy, pulling
/// runs of characters through a [`LookaheadReader`] so the value is never
/// buffered whole. Quoted output always frames the stream (the value cannot
/// be scanned ahead for the MINIMAL decision) and doubles internal quotes;
/// escape-only output escapes on the fly.
fn emit_char_stream<W: Write>(format: &Format, out: &mut W, rdr: &mut dyn Read) -> Result<()> {
    let mut rdr = LookaheadReader::new(rdr);
    let mut run = ['\0'; 128];
    if let (Some(quote), true) = (format.quote(), format.quote_mode() != QuoteMode::None) {
        write_char(out, quote)?;
        loop {
            let n = rdr.read_chars(&mut run)?;
            if n == 0 {
                break;
            }
            for &ch in &run[..n] {
                write_char(out, ch)?;
                if ch == quote {
                    write_char(out, quote)?;
                }
            }
        }
        write_char(out, quote)?;
        return Ok(());
    }
    if let Some(escape) = format.escape() {
        // Streaming cannot look ahead for a multi-character delimiter, so
        // every delimiter character is escaped individually; the lexer
        // reads each one back verbatim.
        let delimiter = format.delimiter();
        loop {
            let n = rdr.read_chars(&mut run)?;
            if n == 0 {
                break;
            }
            for &ch in &run[..n] {
                if ch == CR {
                    write_char(out, escape)?;
                    write_char(out, 'r')?;
                } else if ch == LF {
                    write_char(out, escape)?;
                    write_char(out, 'n')?;
                } else if ch == escape || delimiter.contains(ch) {
                    write_char(out, escape)?;
                    write_char(out, ch)?;
                } else {
                    write_char(out, ch)?;
                }
            }
        }
        return Ok(());
    }
    loop {
        let n = rdr.read_chars(&mut run)?;
        if n == 0 {
            break;
        }
        for &ch in &run[..n] {
            write_char(out, ch)?;
        }
    }
    Ok(())
}

/// Base64 encodes a byte stream between quotes, in chunks whose size is a
/// multiple of three so the encoded pieces concatenate cleanly.
fn emit_byte_stream<W: Write>(format: &Format, out: &mut W, rdr: &mut dyn Read) -> Result<()> {
    if let Some(quote) = format.quote() {
        write_char(out, quote)?;
    }
    let mut chunk = [0u8; 3072];
    let mut filled = 0;
    loop {
        let n = rdr.read(&mut chunk[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == chunk.len() {
            out.write_all(BASE64.encode(&chunk[..filled]).as_bytes())?;
            filled = 0;
        }
    }
    if filled > 0 {
        out.write_all(BASE64.encode(&chunk[..filled]).as_bytes())?;
    }
    if let Some(quote) = format.quote() {
        write_char(out, quote)?;
    }
    Ok(())
}

fn write_char<W: Write>(out: &mut W, ch: char) -> io::Result<()> {
    let mut buf = [0u8; 4];
    out.write_all(ch.encode_utf8(&mut buf).as_bytes())
}
