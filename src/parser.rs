use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use crate::chars::{self, LF};
use crate::error::{Error, ErrorKind, Result};
use crate::format::{Format, Header};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::reader::LookaheadReader;
use crate::{DuplicateHeaderMode, QuoteMode};

/// The name-to-column mapping built from a header, shared by the parser and
/// every record it produces.
#[derive(Debug)]
pub(crate) struct HeaderIndex {
    /// Lookup key (case folded when configured) to column position. Blank
    /// names reserve their column but are not addressable by name.
    index: HashMap<String, usize>,
    /// Original names in column order.
    names: Vec<String>,
    fold_case: bool,
}

impl HeaderIndex {
    fn get(&self, name: &str) -> Option<usize> {
        if self.fold_case {
            self.index.get(&name.to_lowercase()).copied()
        } else {
            self.index.get(name).copied()
        }
    }
}

/// One parsed record: its fields plus where it came from.
///
/// Fields are owned copies; a record stays valid after its parser has moved
/// on or been closed, and it can be read from any thread. Null fields (per
/// the format's null string) read as `None`.
#[derive(Clone, Debug)]
pub struct Record {
    fields: Vec<Option<String>>,
    comment: Option<String>,
    record_number: u64,
    character_position: u64,
    header: Option<Arc<HeaderIndex>>,
}

impl Record {
    /// The field at `index`, `None` when the field is null or the index is
    /// out of range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).and_then(|field| field.as_deref())
    }

    /// The field under the named column, honoring the format's case
    /// folding. `Ok(None)` means the field is null or the record is too
    /// short for the mapped column (see [`Record::is_set`]).
    pub fn get_by_name(&self, name: &str) -> Result<Option<&str>> {
        let header = match &self.header {
            Some(header) => header,
            None => return Err(Error::new(ErrorKind::NoHeader)),
        };
        let index = header.get(name).ok_or_else(|| {
            Error::new(ErrorKind::UnknownColumn {
                name: name.to_string(),
            })
        })?;
        Ok(self.fields.get(index).and_then(|field| field.as_deref()))
    }

    /// Whether the header maps `name` to a column.
    pub fn is_mapped(&self, name: &str) -> bool {
        self.header
            .as_ref()
            .map_or(false, |header| header.get(name).is_some())
    }

    /// Whether `name` is mapped *and* this record has enough fields to
    /// cover its column.
    pub fn is_set(&self, name: &str) -> bool {
        self.header
            .as_ref()
            .and_then(|header| header.get(name))
            .map_or(false, |index| index < self.fields.len())
    }

    /// Whether the field count matches the header length. Always true
    /// without a header.
    pub fn is_consistent(&self) -> bool {
        self.header
            .as_ref()
            .map_or(true, |header| header.names.len() == self.fields.len())
    }

    /// The fields in order, nulls included.
    pub fn values(&self) -> &[Option<String>] {
        &self.fields
    }

    /// Iterates the fields in order, nulls as `None`.
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.fields.iter().map(|field| field.as_deref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The comment lines that preceded this record, joined with `LF`.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// The 1-based number of this record within its stream.
    pub fn record_number(&self) -> u64 {
        self.record_number
    }

    /// The absolute character offset at which this record began.
    pub fn character_position(&self) -> u64 {
        self.character_position
    }
}

/// A streaming CSV parser: pulls tokens from the lexer, assembles records,
/// and owns the header mapping.
///
/// Construction reads the header as the format demands; iteration is lazy,
/// strictly sequential and not restartable. To resume a stream mid-way,
/// position the underlying reader and use [`Parser::with_position`].
///
/// # Example
///
/// ```
/// use std::error::Error;
/// use csv_dialect::{Format, Header};
///
/// # fn main() { example().unwrap(); }
/// fn example() -> Result<(), Box<dyn Error>> {
///     let format = Format::builder().header(Header::FirstRecord).build()?;
///     let mut parser = format.parse("city,pop\nBoston,4628910\n".as_bytes())?;
///
///     assert_eq!(parser.header_names(), ["city", "pop"]);
///     let record = parser.next_record()?.unwrap();
///     assert_eq!(record.get_by_name("pop")?, Some("4628910"));
///     assert_eq!(parser.next_record()?.is_none(), true);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Parser<R> {
    lexer: Option<Lexer<R>>,
    format: Format,
    header: Option<Arc<HeaderIndex>>,
    header_comment: Option<String>,
    trailer_comment: Option<String>,
    record_number: u64,
    character_offset: u64,
    token: Token,
    fields: Vec<Option<String>>,
    /// Observables frozen when the parser is closed.
    final_line: u64,
    final_position: u64,
    final_first_eol: Option<&'static str>,
}

impl<R: Read> Parser<R> {
    /// Parses `rdr` from its beginning under `format`.
    pub fn new(rdr: R, format: Format) -> Result<Parser<R>> {
        Parser::with_position(rdr, format, 0, 0)
    }

    /// Parses `rdr` as the continuation of a stream: `character_offset` is
    /// added to every reported position and `record_number` is the count of
    /// records already consumed before this point, so the next record is
    /// numbered `record_number + 1`. The caller must hand over a reader
    /// positioned at the offset.
    pub fn with_position(
        rdr: R,
        format: Format,
        character_offset: u64,
        record_number: u64,
    ) -> Result<Parser<R>> {
        let lexer = Lexer::new(&format, LookaheadReader::new(rdr));
        let mut parser = Parser {
            lexer: Some(lexer),
            format,
            header: None,
            header_comment: None,
            trailer_comment: None,
            record_number,
            character_offset,
            token: Token::new(),
            fields: Vec::new(),
            final_line: 0,
            final_position: character_offset,
            final_first_eol: None,
        };
        parser.read_header()?;
        Ok(parser)
    }

    /// Reads and installs the header per the format. For an auto header the
    /// first record of the stream supplies the names; for an explicit
    /// header with `skip_header_record` the first record is discarded. In
    /// both cases comment lines preceding it become the header comment.
    fn read_header(&mut self) -> Result<()> {
        let (names, comment) = match self.format.header().clone() {
            Header::None => return Ok(()),
            Header::FirstRecord => match self.next_record()? {
                Some(record) => {
                    let names = record
                        .fields
                        .iter()
                        .map(|field| field.clone().unwrap_or_default())
                        .collect();
                    (names, record.comment)
                }
                None => (Vec::new(), None),
            },
            Header::Names(names) => {
                let comment = if self.format.skip_header_record() {
                    self.next_record()?.and_then(|record| record.comment)
                } else {
                    None
                };
                (names, comment)
            }
        };
        self.header_comment = comment;
        self.header = Some(Arc::new(build_index(&self.format, names)?));
        Ok(())
    }

    /// Assembles the next record, or `None` at the end of the stream or
    /// after [`Parser::close`].
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let lexer = match self.lexer.as_mut() {
            Some(lexer) => lexer,
            None => return Ok(None),
        };
        self.fields.clear();
        let mut comment: Option<String> = None;
        let start_position = lexer.position() + self.character_offset;
        loop {
            lexer.next_token(&mut self.token)?;
            match self.token.kind {
                TokenKind::Field => {
                    add_record_value(&self.format, &self.token, &mut self.fields, false);
                }
                TokenKind::RecordEnd => {
                    add_record_value(&self.format, &self.token, &mut self.fields, true);
                    break;
                }
                TokenKind::Comment => match &mut comment {
                    Some(text) => {
                        text.push(LF);
                        text.push_str(&self.token.content);
                    }
                    None => comment = Some(self.token.content.clone()),
                },
                TokenKind::Eof => {
                    if self.token.is_ready {
                        add_record_value(&self.format, &self.token, &mut self.fields, true);
                    } else if let Some(text) = comment.take() {
                        self.trailer_comment = Some(text);
                    }
                    break;
                }
                TokenKind::Invalid => {
                    return Err(Error::parse(
                        lexer.line_number(),
                        lexer.position(),
                        "invalid parse sequence",
                    ));
                }
            }
        }
        if self.fields.is_empty() {
            return Ok(None);
        }
        self.record_number += 1;
        Ok(Some(Record {
            fields: std::mem::take(&mut self.fields),
            comment,
            record_number: self.record_number,
            character_position: start_position,
            header: self.header.clone(),
        }))
    }

    /// A lazy, finite, non-restartable view over [`Parser::next_record`].
    /// The iterator fuses after the first error.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            parser: self,
            done: false,
        }
    }

    /// The name-to-column mapping, when a header is configured.
    pub fn header_map(&self) -> Option<&HashMap<String, usize>> {
        self.header.as_ref().map(|header| &header.index)
    }

    /// The header names in column order, duplicates and blanks preserved.
    /// Empty when no header is configured.
    pub fn header_names(&self) -> &[String] {
        self.header
            .as_ref()
            .map_or(&[], |header| header.names.as_slice())
    }

    /// Comment lines preceding the header, joined with `LF`.
    pub fn header_comment(&self) -> Option<&str> {
        self.header_comment.as_deref()
    }

    /// Comment lines after the last record, joined with `LF`. Only present
    /// once the end of the stream has been reached.
    pub fn trailer_comment(&self) -> Option<&str> {
        self.trailer_comment.as_deref()
    }

    /// The line currently being read.
    pub fn current_line_number(&self) -> u64 {
        match &self.lexer {
            Some(lexer) => lexer.line_number(),
            None => self.final_line,
        }
    }

    /// The absolute character position of the parser, offset included.
    pub fn position(&self) -> u64 {
        match &self.lexer {
            Some(lexer) => lexer.position() + self.character_offset,
            None => self.final_position,
        }
    }

    /// The number of records consumed so far, header records included.
    pub fn record_number(&self) -> u64 {
        self.record_number
    }

    /// The first record terminator seen in the stream.
    pub fn first_end_of_line(&self) -> Option<&str> {
        match &self.lexer {
            Some(lexer) => lexer.first_eol(),
            None => self.final_first_eol,
        }
    }

    /// Releases the underlying reader. Idempotent; afterwards
    /// [`Parser::next_record`] returns `Ok(None)` and the position
    /// observables stay frozen at their final values.
    pub fn close(&mut self) {
        if let Some(lexer) = self.lexer.take() {
            self.final_line = lexer.line_number();
            self.final_position = lexer.position() + self.character_offset;
            self.final_first_eol = lexer.first_eol();
        }
    }
}

/// Appends the token's content to the record under assembly, applying the
/// trim policy, the trailing-delimiter rule and the null mapping.
fn add_record_value(format: &Format, token: &Token, fields: &mut Vec<Option<String>>, last: bool) {
    let text = if format.trim() {
        chars::trim(&token.content)
    } else {
        token.content.as_str()
    };
    if last && text.is_empty() && format.trailing_delimiter() {
        return;
    }
    fields.push(to_value(format, token, text));
}

/// Maps field text to its value. Under the strict quote modes a quoted
/// occurrence of the null string stays literal and an unquoted empty field
/// with no null string configured reads as null; text that went through an
/// escape substitution can no longer match the sentinel.
fn to_value(format: &Format, token: &Token, text: &str) -> Option<String> {
    let strict = matches!(
        format.quote_mode(),
        QuoteMode::AllNonNull | QuoteMode::NonNumeric
    );
    match format.null_string() {
        Some(null_string) if text == null_string && !token.unescaped => {
            if strict && token.is_quoted {
                Some(text.to_string())
            } else {
                None
            }
        }
        None if strict && text.is_empty() && !token.is_quoted => None,
        _ => Some(text.to_string()),
    }
}

/// Builds the header index, enforcing the missing-name and duplicate-name
/// policies.
fn build_index(format: &Format, names: Vec<String>) -> Result<HeaderIndex> {
    let fold_case = format.ignore_header_case();
    let mode = format.duplicate_header_mode();
    let mut index = HashMap::with_capacity(names.len());
    let mut observed_missing = false;
    for (i, name) in names.iter().enumerate() {
        let blank = name.trim().is_empty();
        if blank && !format.allow_missing_column_names() {
            return Err(Error::header(format!(
                "a header name is missing in {:?}",
                names
            )));
        }
        let key = if fold_case {
            name.to_lowercase()
        } else {
            name.clone()
        };
        let duplicate = if blank {
            observed_missing
        } else {
            index.contains_key(&key)
        };
        if duplicate
            && mode != DuplicateHeaderMode::AllowAll
            && !(blank && mode == DuplicateHeaderMode::AllowEmpty)
        {
            return Err(Error::header(format!(
                "the header contains a duplicate name: {:?} in {:?}",
                name, names
            )));
        }
        observed_missing |= blank;
        if !blank {
            index.insert(key, i);
        }
    }
    Ok(HeaderIndex {
        index,
        names,
        fold_case,
    })
}

/// A borrowing iterator over a parser's remaining records.
///
/// Single-consumer and single-pass: it cannot be cloned or restarted, and
/// it stops permanently after yielding an error.
pub struct Records<'p, R> {
    parser: &'p mut Parser<R>,
    done: bool,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.parser.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;

    fn parser<'a>(format: &Format, input: &'a str) -> Parser<&'a [u8]> {
        Parser::new(input.as_bytes(), format.clone()).unwrap()
    }

    /// Collects all records as vectors of owned optional fields.
    fn parse_all(format: &Format, input: &str) -> Vec<Vec<Option<String>>> {
        parser(format, input)
            .records()
            .map(|record| record.unwrap().values().to_vec())
            .collect()
    }

    fn strings(fields: &[&str]) -> Vec<Option<String>> {
        fields.iter().map(|s| Some((*s).to_string())).collect()
    }

    #[test]
    fn rfc4180_doubled_quotes() {
        let records = parse_all(&Format::rfc4180(), "\"aaa\",\"b\"\"bb\",\"ccc\"");
        assert_eq!(records, vec![strings(&["aaa", "b\"bb", "ccc"])]);
    }

    #[test]
    fn quoted_multi_line_fields_with_ignored_spaces() {
        let format = Format::default()
            .to_builder()
            .ignore_surrounding_spaces(true)
            .build()
            .unwrap();
        let input = "a,b,c,d\n a , b , 1 2 \n\"foo baar\", b,\n   \"foo\n,,\n\"\",,\n\"\"\",d,e\n";
        let records = parse_all(&format, input);
        assert_eq!(
            records,
            vec![
                strings(&["a", "b", "c", "d"]),
                strings(&["a", "b", "1 2"]),
                strings(&["foo baar", "b", ""]),
                strings(&["foo\n,,\n\",,\n\"", "d", "e"]),
            ]
        );
    }

    #[test]
    fn excel_preserves_blank_lines() {
        let records = parse_all(&Format::excel(), "hello,\r\n\r\n\r\n");
        assert_eq!(
            records,
            vec![strings(&["hello", ""]), strings(&[""]), strings(&[""])]
        );
    }

    #[test]
    fn forward_slash_escape_with_single_quote_encapsulation() {
        let format = Format::builder()
            .quote(Some('\''))
            .escape(Some('/'))
            .build()
            .unwrap();
        assert_eq!(parse_all(&format, "/',/'"), vec![strings(&["'", "'"])]);
        assert_eq!(parse_all(&format, "'/'','/''"), vec![strings(&["'", "'"])]);
    }

    #[test]
    fn eol_styles_parse_identically() {
        for input in ["a,b\nc,d", "a,b\rc,d", "a,b\r\nc,d", "a,b\r\nc,d\r\n"] {
            let records = parse_all(&Format::default(), input);
            assert_eq!(
                records,
                vec![strings(&["a", "b"]), strings(&["c", "d"])],
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn first_end_of_line_is_reported() {
        let mut parser = parser(&Format::default(), "a\r\nb\nc");
        while parser.next_record().unwrap().is_some() {}
        assert_eq!(parser.first_end_of_line(), Some("\r\n"));
    }

    #[test]
    fn null_string_maps_to_null() {
        let format = Format::default()
            .to_builder()
            .null_string(Some("NULL"))
            .build()
            .unwrap();
        let records = parse_all(&format, "a,NULL,b");
        assert_eq!(
            records,
            vec![vec![
                Some("a".to_string()),
                None,
                Some("b".to_string())
            ]]
        );
    }

    #[test]
    fn quoted_null_string_stays_literal_under_strict_quoting() {
        let format = Format::default()
            .to_builder()
            .null_string(Some("NULL"))
            .quote_mode(crate::QuoteMode::AllNonNull)
            .build()
            .unwrap();
        let records = parse_all(&format, "\"NULL\",NULL");
        assert_eq!(records, vec![vec![Some("NULL".to_string()), None]]);
    }

    #[test]
    fn mysql_distinguishes_escaped_backslash_from_null() {
        let records = parse_all(&Format::mysql(), "\\\\N\t\\N\n");
        assert_eq!(records, vec![vec![Some("\\N".to_string()), None]]);
    }

    #[test]
    fn header_auto_detects_from_first_record() {
        let format = Format::builder().header(Header::FirstRecord).build().unwrap();
        let mut parser = parser(&format, "A,B\r\n1,2\r\n");
        assert_eq!(parser.header_names(), ["A", "B"]);
        assert_eq!(parser.header_map().unwrap().get("B"), Some(&1));
        let record = parser.next_record().unwrap().unwrap();
        assert_eq!(record.get_by_name("A").unwrap(), Some("1"));
        assert_eq!(record.record_number(), 2);
        assert!(parser.next_record().unwrap().is_none());
    }

    #[test]
    fn header_comments_attach_to_the_header() {
        let format = Format::builder()
            .comment_marker(Some('#'))
            .header(Header::FirstRecord)
            .build()
            .unwrap();
        let mut parser = parser(&format, "# header comment\r\nA,B\r\n1,2\r\n");
        assert_eq!(parser.header_comment(), Some("header comment"));
        assert_eq!(parser.header_names(), ["A", "B"]);
        let record = parser.next_record().unwrap().unwrap();
        assert_eq!(record.values(), strings(&["1", "2"]).as_slice());
        assert!(parser.next_record().unwrap().is_none());
    }

    #[test]
    fn explicit_header_skips_the_first_record_when_asked() {
        let format = Format::builder()
            .header_names(["x", "y"])
            .skip_header_record(true)
            .build()
            .unwrap();
        let mut parser = parser(&format, "ignored,row\n1,2\n");
        assert_eq!(parser.header_names(), ["x", "y"]);
        let record = parser.next_record().unwrap().unwrap();
        assert_eq!(record.get_by_name("y").unwrap(), Some("2"));
    }

    #[test]
    fn comments_attach_to_the_following_record() {
        let format = Format::builder().comment_marker(Some('#')).build().unwrap();
        let mut parser = parser(&format, "a,b\n# one\n# two\nc,d\n# trailing\n");
        let first = parser.next_record().unwrap().unwrap();
        assert_eq!(first.comment(), None);
        let second = parser.next_record().unwrap().unwrap();
        assert_eq!(second.comment(), Some("one\ntwo"));
        assert!(parser.next_record().unwrap().is_none());
        assert_eq!(parser.trailer_comment(), Some("trailing"));
    }

    #[test]
    fn duplicate_header_names_from_the_stream_are_policed() {
        let format = Format::builder()
            .header(Header::FirstRecord)
            .duplicate_header_mode(DuplicateHeaderMode::Disallow)
            .build()
            .unwrap();
        let err = Parser::new("a,a\n1,2\n".as_bytes(), format).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Header(_)));
    }

    #[test]
    fn missing_header_names_need_permission() {
        let format = Format::builder().header(Header::FirstRecord).build().unwrap();
        let err = Parser::new("a,,c\n1,2,3\n".as_bytes(), format).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Header(_)));

        let format = Format::builder()
            .header(Header::FirstRecord)
            .allow_missing_column_names(true)
            .build()
            .unwrap();
        let mut parser = parser(&format, "a,,c\n1,2,3\n");
        assert_eq!(parser.header_names(), ["a", "", "c"]);
        let record = parser.next_record().unwrap().unwrap();
        // The blank column keeps its slot but has no name-indexed access.
        assert_eq!(record.get(1), Some("2"));
        assert!(!record.is_mapped(""));
    }

    #[test]
    fn header_case_folding() {
        let format = Format::builder()
            .header(Header::FirstRecord)
            .ignore_header_case(true)
            .build()
            .unwrap();
        let mut parser = parser(&format, "Name,AGE\nalice,40\n");
        assert_eq!(parser.header_names(), ["Name", "AGE"]);
        let record = parser.next_record().unwrap().unwrap();
        assert_eq!(record.get_by_name("name").unwrap(), Some("alice"));
        assert_eq!(record.get_by_name("Age").unwrap(), Some("40"));
    }

    #[test]
    fn name_lookup_errors() {
        let mut p = parser(&Format::default(), "a,b\n");
        let record = p.next_record().unwrap().unwrap();
        assert!(matches!(
            record.get_by_name("x").unwrap_err().kind(),
            ErrorKind::NoHeader
        ));

        let format = Format::builder().header_names(["a"]).build().unwrap();
        let mut p = parser(&format, "1\n");
        let record = p.next_record().unwrap().unwrap();
        assert!(matches!(
            record.get_by_name("missing").unwrap_err().kind(),
            ErrorKind::UnknownColumn { .. }
        ));
    }

    #[test]
    fn mapped_set_and_consistent() {
        let format = Format::builder()
            .header_names(["a", "b", "c"])
            .build()
            .unwrap();
        let mut parser = parser(&format, "1,2\n1,2,3\n");
        let short = parser.next_record().unwrap().unwrap();
        assert!(short.is_mapped("c"));
        assert!(!short.is_set("c"));
        assert!(!short.is_consistent());
        let full = parser.next_record().unwrap().unwrap();
        assert!(full.is_set("c"));
        assert!(full.is_consistent());
    }

    #[test]
    fn record_numbers_and_positions_are_monotonic() {
        let mut parser = parser(&Format::default(), "a,b\nc,d\ne,f");
        let mut last_position = 0;
        let mut expected_number = 1;
        while let Some(record) = parser.next_record().unwrap() {
            assert_eq!(record.record_number(), expected_number);
            assert!(record.character_position() >= last_position);
            last_position = record.character_position();
            expected_number += 1;
        }
        assert_eq!(parser.record_number(), 3);
        // All characters accounted for.
        assert_eq!(parser.position(), "a,b\nc,d\ne,f".chars().count() as u64);
    }

    #[test]
    fn resume_from_a_recorded_offset() {
        let input = "a,b\nc,d\ne,f\n";
        let mut parser = parser(&Format::default(), input);
        parser.next_record().unwrap();
        parser.next_record().unwrap();
        let offset = parser.position();
        let resumed_input = &input[offset as usize..];
        let mut resumed =
            Parser::with_position(resumed_input.as_bytes(), Format::default(), offset, 2).unwrap();
        let record = resumed.next_record().unwrap().unwrap();
        assert_eq!(record.record_number(), 3);
        assert_eq!(record.character_position(), offset);
        assert_eq!(record.values(), strings(&["e", "f"]).as_slice());
    }

    #[test]
    fn close_is_idempotent_and_freezes_observables() {
        let mut parser = parser(&Format::default(), "a,b\nc,d\n");
        parser.next_record().unwrap();
        parser.close();
        let line = parser.current_line_number();
        let position = parser.position();
        parser.close();
        assert_eq!(parser.current_line_number(), line);
        assert_eq!(parser.position(), position);
        assert!(parser.next_record().unwrap().is_none());
    }

    #[test]
    fn records_iterator_fuses_after_an_error() {
        let mut parser = parser(&Format::default(), "\"a\" x,b\nc,d\n");
        let mut records = parser.records();
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
    }

    #[test]
    fn lex_errors_leave_the_parser_past_the_offending_character() {
        let mut parser = parser(&Format::default(), "\"a\" x,b\n");
        let err = parser.next_record().unwrap_err();
        match err.kind() {
            ErrorKind::Parse { line, position, .. } => {
                assert_eq!(*line, 1);
                assert_eq!(*position, 5);
            }
            other => panic!("expected Parse but got {:?}", other),
        }
    }

    #[test]
    fn trailing_delimiter_drops_the_final_empty_field() {
        let format = Format::builder().trailing_delimiter(true).build().unwrap();
        let records = parse_all(&format, "a,b,\nc,d,\n");
        assert_eq!(records, vec![strings(&["a", "b"]), strings(&["c", "d"])]);
    }

    #[test]
    fn trim_applies_to_all_fields() {
        let format = Format::builder().trim(true).build().unwrap();
        let records = parse_all(&format, " a ,\" b \",c\u{0001}\n");
        assert_eq!(records, vec![strings(&["a", "b", "c"])]);
    }

    #[test]
    fn records_are_usable_after_the_parser_is_gone() {
        let format = Format::builder().header_names(["a", "b"]).build().unwrap();
        let record = {
            let mut parser = parser(&format, "1,2\n");
            parser.next_record().unwrap().unwrap()
        };
        assert_eq!(record.get_by_name("b").unwrap(), Some("2"));
    }
}
