use std::io::{self, Read, Write};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::chars::{self, CRLF, LF_STR};
use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::printer::{self, Field, Printer};
use crate::{DuplicateHeaderMode, QuoteMode};

/// Header configuration for a [`Format`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Header {
    /// No header row; fields are addressed by position only.
    #[default]
    None,
    /// The first record of the input supplies the column names.
    FirstRecord,
    /// The column names are fixed by the format.
    Names(Vec<String>),
}

impl Header {
    /// True unless the header is [`Header::None`].
    pub fn is_set(&self) -> bool {
        !matches!(self, Header::None)
    }
}

/// An immutable, validated CSV dialect.
///
/// A `Format` carries everything the lexer, parser and printer need to agree
/// on a dialect: the delimiter string, quoting and escaping characters, the
/// comment marker, the record separator, the null sentinel, header handling
/// and the whitespace policies. Values are built with a [`FormatBuilder`]
/// (see [`Format::builder`]) and compare equal exactly when every
/// configuration field is equal.
///
/// Predefined dialects for common producers are available as constructors,
/// e.g. [`Format::rfc4180`], [`Format::excel`] or [`Format::mysql`];
/// [`Format::default`] is the baseline they are derived from.
///
/// # Example
///
/// ```
/// use std::error::Error;
/// use csv_dialect::Format;
///
/// # fn main() { example().unwrap(); }
/// fn example() -> Result<(), Box<dyn Error>> {
///     let format = Format::builder()
///         .delimiter(";")
///         .ignore_surrounding_spaces(true)
///         .build()?;
///
///     let mut parser = format.parse("a ; b\n".as_bytes())?;
///     let record = parser.next_record()?.unwrap();
///     assert_eq!(record.get(0), Some("a"));
///     assert_eq!(record.get(1), Some("b"));
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub(crate) delimiter: String,
    pub(crate) quote: Option<char>,
    pub(crate) escape: Option<char>,
    pub(crate) comment_marker: Option<char>,
    pub(crate) record_separator: Option<String>,
    pub(crate) null_string: Option<String>,
    pub(crate) header: Header,
    pub(crate) header_comments: Vec<String>,
    pub(crate) skip_header_record: bool,
    pub(crate) ignore_surrounding_spaces: bool,
    pub(crate) ignore_empty_lines: bool,
    pub(crate) ignore_header_case: bool,
    pub(crate) trim: bool,
    pub(crate) trailing_delimiter: bool,
    pub(crate) quote_mode: QuoteMode,
    pub(crate) duplicate_header_mode: DuplicateHeaderMode,
    pub(crate) allow_missing_column_names: bool,
    pub(crate) lenient_eof: bool,
    pub(crate) trailing_data: bool,
    pub(crate) auto_flush: bool,
}

/// Comma separated, double quoted, `CRLF` records, empty lines skipped.
static DEFAULT: Lazy<Format> = Lazy::new(|| Format {
    delimiter: ",".into(),
    quote: Some('"'),
    escape: None,
    comment_marker: None,
    record_separator: Some(CRLF.into()),
    null_string: None,
    header: Header::None,
    header_comments: Vec::new(),
    skip_header_record: false,
    ignore_surrounding_spaces: false,
    ignore_empty_lines: true,
    ignore_header_case: false,
    trim: false,
    trailing_delimiter: false,
    quote_mode: QuoteMode::Minimal,
    duplicate_header_mode: DuplicateHeaderMode::AllowAll,
    allow_missing_column_names: false,
    lenient_eof: false,
    trailing_data: false,
    auto_flush: false,
});

static RFC4180: Lazy<Format> = Lazy::new(|| Format {
    ignore_empty_lines: false,
    ..DEFAULT.clone()
});

static EXCEL: Lazy<Format> = Lazy::new(|| Format {
    ignore_empty_lines: false,
    allow_missing_column_names: true,
    lenient_eof: true,
    trailing_data: true,
    ..DEFAULT.clone()
});

static TDF: Lazy<Format> = Lazy::new(|| Format {
    delimiter: "\t".into(),
    ignore_surrounding_spaces: true,
    ..DEFAULT.clone()
});

static MYSQL: Lazy<Format> = Lazy::new(|| Format {
    delimiter: "\t".into(),
    quote: None,
    escape: Some('\\'),
    record_separator: Some(LF_STR.into()),
    null_string: Some("\\N".into()),
    ignore_empty_lines: false,
    quote_mode: QuoteMode::AllNonNull,
    ..DEFAULT.clone()
});

static POSTGRESQL_TEXT: Lazy<Format> = Lazy::new(|| Format {
    delimiter: "\t".into(),
    quote: None,
    escape: Some('\\'),
    record_separator: Some(LF_STR.into()),
    null_string: Some("\\N".into()),
    ignore_empty_lines: false,
    quote_mode: QuoteMode::AllNonNull,
    ..DEFAULT.clone()
});

static POSTGRESQL_CSV: Lazy<Format> = Lazy::new(|| Format {
    record_separator: Some(LF_STR.into()),
    null_string: Some(String::new()),
    ignore_empty_lines: false,
    quote_mode: QuoteMode::AllNonNull,
    ..DEFAULT.clone()
});

static ORACLE: Lazy<Format> = Lazy::new(|| Format {
    escape: Some('\\'),
    record_separator: Some(if cfg!(windows) { CRLF } else { LF_STR }.into()),
    null_string: Some("\\N".into()),
    ignore_empty_lines: false,
    trim: true,
    ..DEFAULT.clone()
});

static INFORMIX_UNLOAD: Lazy<Format> = Lazy::new(|| Format {
    delimiter: "|".into(),
    escape: Some('\\'),
    record_separator: Some(LF_STR.into()),
    ..DEFAULT.clone()
});

static INFORMIX_UNLOAD_CSV: Lazy<Format> = Lazy::new(|| Format {
    record_separator: Some(LF_STR.into()),
    ..DEFAULT.clone()
});

static MONGODB_CSV: Lazy<Format> = Lazy::new(|| Format {
    escape: Some('"'),
    ..DEFAULT.clone()
});

static MONGODB_TSV: Lazy<Format> = Lazy::new(|| Format {
    delimiter: "\t".into(),
    escape: Some('"'),
    ..DEFAULT.clone()
});

impl Default for Format {
    fn default() -> Format {
        DEFAULT.clone()
    }
}

impl Format {
    /// A builder initialized with the [`Format::default`] dialect.
    pub fn builder() -> FormatBuilder {
        FormatBuilder::default()
    }

    /// The RFC 4180 dialect: like the default but blank lines between
    /// records are kept as records with a single empty field.
    pub fn rfc4180() -> Format {
        RFC4180.clone()
    }

    /// The dialect of Excel CSV exports. Tolerates missing column names,
    /// data after a closing quote and EOF inside a quoted field.
    pub fn excel() -> Format {
        EXCEL.clone()
    }

    /// Tab-delimited text with surrounding spaces ignored.
    pub fn tdf() -> Format {
        TDF.clone()
    }

    /// The format written by `mysqldump` and read by `LOAD DATA INFILE`:
    /// tab delimited, no quoting, backslash escapes, `\N` for null.
    pub fn mysql() -> Format {
        MYSQL.clone()
    }

    /// The PostgreSQL `COPY ... FORMAT text` dialect.
    pub fn postgresql_text() -> Format {
        POSTGRESQL_TEXT.clone()
    }

    /// The PostgreSQL `COPY ... FORMAT csv` dialect.
    pub fn postgresql_csv() -> Format {
        POSTGRESQL_CSV.clone()
    }

    /// The dialect accepted by Oracle SQL*Loader.
    pub fn oracle() -> Format {
        ORACLE.clone()
    }

    /// The format written by the Informix `UNLOAD TO` statement.
    pub fn informix_unload() -> Format {
        INFORMIX_UNLOAD.clone()
    }

    /// The format written by `UNLOAD TO` with `CSV` mode enabled.
    pub fn informix_unload_csv() -> Format {
        INFORMIX_UNLOAD_CSV.clone()
    }

    /// The format produced by `mongoexport --type=csv`.
    pub fn mongodb_csv() -> Format {
        MONGODB_CSV.clone()
    }

    /// The format produced by `mongoexport --type=tsv`.
    pub fn mongodb_tsv() -> Format {
        MONGODB_TSV.clone()
    }

    /// Reopens this format as a builder, e.g. to derive a variant of one of
    /// the predefined dialects.
    ///
    /// # Example
    ///
    /// ```
    /// use csv_dialect::Format;
    ///
    /// let format = Format::mysql().to_builder().null_string(Some("NULL")).build().unwrap();
    /// assert_eq!(format.null_string(), Some("NULL"));
    /// ```
    pub fn to_builder(&self) -> FormatBuilder {
        FormatBuilder {
            format: self.clone(),
        }
    }

    /// Parses `rdr` under this dialect.
    pub fn parse<R: Read>(&self, rdr: R) -> Result<Parser<R>> {
        Parser::new(rdr, self.clone())
    }

    /// Prints to `out` under this dialect, emitting any configured header
    /// comments and header row immediately.
    pub fn print<W: Write>(&self, out: W) -> Result<Printer<W>> {
        Printer::new(out, self.clone())
    }

    /// Formats a single record as a string: fields joined by the delimiter,
    /// quoted and escaped per this dialect, without a trailing record
    /// separator.
    ///
    /// # Example
    ///
    /// ```
    /// use csv_dialect::Format;
    ///
    /// let out = Format::default().format(["a", "b\"c", "d"]).unwrap();
    /// assert_eq!(out, "a,\"b\"\"c\",d");
    /// ```
    pub fn format<'a, I, F>(&self, fields: I) -> Result<String>
    where
        I: IntoIterator<Item = F>,
        F: Into<Field<'a>>,
    {
        let mut buf = Vec::new();
        let mut new_record = true;
        for field in fields {
            printer::emit_field(self, &mut buf, field.into(), new_record)?;
            new_record = false;
        }
        if self.trailing_delimiter {
            buf.write_all(self.delimiter.as_bytes())?;
        }
        String::from_utf8(buf)
            .map_err(|err| Error::from(io::Error::new(io::ErrorKind::InvalidData, err)))
    }

    /// The field delimiter string.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// The quote character, if quoting is enabled.
    pub fn quote(&self) -> Option<char> {
        self.quote
    }

    /// The escape character, if escape processing is enabled.
    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    /// The comment marker, if comment lines are recognized.
    pub fn comment_marker(&self) -> Option<char> {
        self.comment_marker
    }

    /// The record separator written between output records. Parsing always
    /// accepts `LF`, `CR` and `CRLF` regardless of this value.
    pub fn record_separator(&self) -> Option<&str> {
        self.record_separator.as_deref()
    }

    /// The sentinel exchanged for the null value on read and write.
    pub fn null_string(&self) -> Option<&str> {
        self.null_string.as_deref()
    }

    /// The header configuration.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Comment lines written before the header on output.
    pub fn header_comments(&self) -> &[String] {
        &self.header_comments
    }

    /// Whether the first input record is consumed and discarded when the
    /// header is explicit.
    pub fn skip_header_record(&self) -> bool {
        self.skip_header_record
    }

    /// Whether spaces and tabs around unquoted fields are stripped.
    pub fn ignore_surrounding_spaces(&self) -> bool {
        self.ignore_surrounding_spaces
    }

    /// Whether blank lines between records are dropped.
    pub fn ignore_empty_lines(&self) -> bool {
        self.ignore_empty_lines
    }

    /// Whether header name lookups fold case.
    pub fn ignore_header_case(&self) -> bool {
        self.ignore_header_case
    }

    /// Whether every field value is trimmed of characters at or below
    /// space.
    pub fn trim(&self) -> bool {
        self.trim
    }

    /// Whether an extra delimiter is written before each record separator.
    pub fn trailing_delimiter(&self) -> bool {
        self.trailing_delimiter
    }

    /// The output quoting policy.
    pub fn quote_mode(&self) -> QuoteMode {
        self.quote_mode
    }

    /// The policy for repeated column names in an explicit header.
    pub fn duplicate_header_mode(&self) -> DuplicateHeaderMode {
        self.duplicate_header_mode
    }

    /// Whether empty header column names are tolerated.
    pub fn allow_missing_column_names(&self) -> bool {
        self.allow_missing_column_names
    }

    /// Whether EOF inside an open quoted field closes the field instead of
    /// failing.
    pub fn lenient_eof(&self) -> bool {
        self.lenient_eof
    }

    /// Whether characters between a closing quote and the next delimiter
    /// are appended to the field instead of rejected.
    pub fn trailing_data(&self) -> bool {
        self.trailing_data
    }

    /// Whether the printer flushes its sink when closed.
    pub fn auto_flush(&self) -> bool {
        self.auto_flush
    }
}

/// Builds a [`Format`] with various configuration knobs.
///
/// Every mutator returns the builder; [`FormatBuilder::build`] validates the
/// combination and produces the immutable format.
///
/// # Example
///
/// ```
/// use std::error::Error;
/// use csv_dialect::{Format, QuoteMode};
///
/// # fn main() { example().unwrap(); }
/// fn example() -> Result<(), Box<dyn Error>> {
///     let format = Format::builder()
///         .delimiter("\t")
///         .quote(None)
///         .escape(Some('\\'))
///         .quote_mode(QuoteMode::None)
///         .build()?;
///     assert_eq!(format.delimiter(), "\t");
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct FormatBuilder {
    format: Format,
}

impl Default for FormatBuilder {
    fn default() -> FormatBuilder {
        FormatBuilder {
            format: Format::default(),
        }
    }
}

impl FormatBuilder {
    /// The field delimiter. May be longer than one character; must be
    /// non-empty and free of line breaks.
    pub fn delimiter(&mut self, delimiter: impl Into<String>) -> &mut FormatBuilder {
        self.format.delimiter = delimiter.into();
        self
    }

    /// The quote character; `None` disables quoting.
    pub fn quote(&mut self, quote: Option<char>) -> &mut FormatBuilder {
        self.format.quote = quote;
        self
    }

    /// The escape character; `None` disables escape processing.
    pub fn escape(&mut self, escape: Option<char>) -> &mut FormatBuilder {
        self.format.escape = escape;
        self
    }

    /// The comment marker; `None` disables comment lines. Only recognized
    /// at the start of a line.
    pub fn comment_marker(&mut self, marker: Option<char>) -> &mut FormatBuilder {
        self.format.comment_marker = marker;
        self
    }

    /// The record separator written on output; `None` suppresses it.
    pub fn record_separator(&mut self, separator: Option<&str>) -> &mut FormatBuilder {
        self.format.record_separator = separator.map(str::to_owned);
        self
    }

    /// The sentinel exchanged for null on read and write; `None` disables
    /// the mapping.
    pub fn null_string(&mut self, null_string: Option<&str>) -> &mut FormatBuilder {
        self.format.null_string = null_string.map(str::to_owned);
        self
    }

    /// The header configuration.
    pub fn header(&mut self, header: Header) -> &mut FormatBuilder {
        self.format.header = header;
        self
    }

    /// Sets an explicit list of column names as the header.
    pub fn header_names<I, T>(&mut self, names: I) -> &mut FormatBuilder
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.format.header = Header::Names(names.into_iter().map(Into::into).collect());
        self
    }

    /// Comment lines to write before the header on output.
    pub fn header_comments<I, T>(&mut self, comments: I) -> &mut FormatBuilder
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.format.header_comments = comments.into_iter().map(Into::into).collect();
        self
    }

    /// Whether to consume and discard the first input record when the
    /// header is explicit.
    pub fn skip_header_record(&mut self, yes: bool) -> &mut FormatBuilder {
        self.format.skip_header_record = yes;
        self
    }

    /// Whether to strip spaces and tabs around unquoted fields.
    pub fn ignore_surrounding_spaces(&mut self, yes: bool) -> &mut FormatBuilder {
        self.format.ignore_surrounding_spaces = yes;
        self
    }

    /// Whether to drop fully blank lines between records.
    pub fn ignore_empty_lines(&mut self, yes: bool) -> &mut FormatBuilder {
        self.format.ignore_empty_lines = yes;
        self
    }

    /// Whether header name lookups fold case.
    pub fn ignore_header_case(&mut self, yes: bool) -> &mut FormatBuilder {
        self.format.ignore_header_case = yes;
        self
    }

    /// Whether to trim every field value of characters at or below space.
    pub fn trim(&mut self, yes: bool) -> &mut FormatBuilder {
        self.format.trim = yes;
        self
    }

    /// Whether to write an extra delimiter before each record separator.
    pub fn trailing_delimiter(&mut self, yes: bool) -> &mut FormatBuilder {
        self.format.trailing_delimiter = yes;
        self
    }

    /// The output quoting policy.
    pub fn quote_mode(&mut self, mode: QuoteMode) -> &mut FormatBuilder {
        self.format.quote_mode = mode;
        self
    }

    /// The policy for repeated column names in an explicit header.
    pub fn duplicate_header_mode(&mut self, mode: DuplicateHeaderMode) -> &mut FormatBuilder {
        self.format.duplicate_header_mode = mode;
        self
    }

    /// Whether empty header column names are tolerated.
    pub fn allow_missing_column_names(&mut self, yes: bool) -> &mut FormatBuilder {
        self.format.allow_missing_column_names = yes;
        self
    }

    /// Whether EOF inside an open quoted field closes the field instead of
    /// failing.
    pub fn lenient_eof(&mut self, yes: bool) -> &mut FormatBuilder {
        self.format.lenient_eof = yes;
        self
    }

    /// Whether characters between a closing quote and the next delimiter
    /// are appended to the field instead of rejected.
    pub fn trailing_data(&mut self, yes: bool) -> &mut FormatBuilder {
        self.format.trailing_data = yes;
        self
    }

    /// Whether the printer flushes its sink when closed.
    pub fn auto_flush(&mut self, yes: bool) -> &mut FormatBuilder {
        self.format.auto_flush = yes;
        self
    }

    /// Validates the configuration and produces the immutable [`Format`].
    pub fn build(&self) -> Result<Format> {
        let format = &self.format;
        if format.delimiter.is_empty() {
            return Err(Error::config("the delimiter cannot be empty"));
        }
        if format.delimiter.chars().any(chars::is_line_break) {
            return Err(Error::config("the delimiter cannot be a line break"));
        }
        if let Some(quote) = format.quote {
            if chars::is_line_break(quote) {
                return Err(Error::config("the quote character cannot be a line break"));
            }
            if format.delimiter.contains(quote) {
                return Err(Error::config(format!(
                    "the quote character {:?} cannot appear in the delimiter {:?}",
                    quote, format.delimiter
                )));
            }
        }
        if let Some(escape) = format.escape {
            if chars::is_line_break(escape) {
                return Err(Error::config("the escape character cannot be a line break"));
            }
            if format.delimiter.contains(escape) {
                return Err(Error::config(format!(
                    "the escape character {:?} cannot appear in the delimiter {:?}",
                    escape, format.delimiter
                )));
            }
        }
        if let Some(marker) = format.comment_marker {
            if chars::is_line_break(marker) {
                return Err(Error::config("the comment marker cannot be a line break"));
            }
            if format.delimiter.contains(marker) {
                return Err(Error::config(format!(
                    "the comment marker {:?} cannot appear in the delimiter {:?}",
                    marker, format.delimiter
                )));
            }
            if format.quote == Some(marker) {
                return Err(Error::config(
                    "the comment marker and the quote character cannot be the same",
                ));
            }
            if format.escape == Some(marker) {
                return Err(Error::config(
                    "the comment marker and the escape character cannot be the same",
                ));
            }
        }
        if format.escape.is_none() && format.quote_mode == QuoteMode::None {
            return Err(Error::config(
                "quote mode NONE requires an escape character",
            ));
        }
        if let Header::Names(names) = &format.header {
            validate_duplicate_names(names, format.duplicate_header_mode)
                .map_err(Error::config)?;
        }
        Ok(format.clone())
    }
}

/// Checks an explicit header list against a duplicate policy. Blank names
/// are permitted to repeat under `AllowEmpty`.
pub(crate) fn validate_duplicate_names(
    names: &[String],
    mode: DuplicateHeaderMode,
) -> std::result::Result<(), String> {
    if mode == DuplicateHeaderMode::AllowAll {
        return Ok(());
    }
    let mut seen = std::collections::HashSet::with_capacity(names.len());
    for name in names {
        let blank = name.trim().is_empty();
        let key = if blank { "" } else { name.as_str() };
        if !seen.insert(key) && !(blank && mode == DuplicateHeaderMode::AllowEmpty) {
            return Err(format!(
                "the header contains a duplicate name: {:?} in {:?}",
                name, names
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn build_err(builder: &FormatBuilder) -> String {
        match builder.build().unwrap_err().into_kind() {
            ErrorKind::Config(msg) => msg,
            other => panic!("expected Config but got {:?}", other),
        }
    }

    #[test]
    fn builder_defaults_match_the_default_dialect() {
        assert_eq!(Format::builder().build().unwrap(), Format::default());
    }

    #[test]
    fn empty_delimiter_is_rejected() {
        let mut builder = Format::builder();
        builder.delimiter("");
        assert!(build_err(&builder).contains("delimiter"));
    }

    #[test]
    fn line_break_delimiter_is_rejected() {
        let mut builder = Format::builder();
        builder.delimiter("\n");
        assert!(builder.build().is_err());
    }

    #[test]
    fn quote_clashing_with_delimiter_is_rejected() {
        let mut builder = Format::builder();
        builder.delimiter("!").quote(Some('!'));
        assert!(build_err(&builder).contains("quote"));
    }

    #[test]
    fn comment_marker_clashes_are_rejected() {
        let mut builder = Format::builder();
        builder.comment_marker(Some('"'));
        assert!(builder.build().is_err());

        let mut builder = Format::builder();
        builder.escape(Some('!')).comment_marker(Some('!'));
        assert!(builder.build().is_err());
    }

    #[test]
    fn quote_mode_none_requires_an_escape() {
        let mut builder = Format::builder();
        builder.quote_mode(QuoteMode::None);
        assert!(build_err(&builder).contains("escape"));

        builder.escape(Some('\\'));
        assert!(builder.build().is_ok());
    }

    #[test]
    fn quote_may_equal_escape() {
        // The MongoDB dialects double quotes by declaring the quote char as
        // the escape char.
        assert_eq!(Format::mongodb_csv().escape(), Some('"'));
        assert_eq!(Format::mongodb_csv().quote(), Some('"'));
    }

    #[test]
    fn duplicate_header_names_honor_the_mode() {
        let mut builder = Format::builder();
        builder
            .header_names(["a", "a"])
            .duplicate_header_mode(DuplicateHeaderMode::Disallow);
        assert!(builder.build().is_err());

        builder.duplicate_header_mode(DuplicateHeaderMode::AllowEmpty);
        assert!(builder.build().is_err());

        builder.duplicate_header_mode(DuplicateHeaderMode::AllowAll);
        assert!(builder.build().is_ok());

        let mut builder = Format::builder();
        builder
            .header_names(["a", "", " ", "b"])
            .duplicate_header_mode(DuplicateHeaderMode::AllowEmpty);
        assert!(builder.build().is_ok());

        builder.duplicate_header_mode(DuplicateHeaderMode::Disallow);
        assert!(builder.build().is_err());
    }

    #[test]
    fn formats_compare_by_value() {
        let a = Format::builder().delimiter(";").build().unwrap();
        let b = Format::builder().delimiter(";").build().unwrap();
        assert_eq!(a, b);

        let c = Format::builder().delimiter(";").trim(true).build().unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn formats_serialize_and_deserialize() {
        let format = Format::mysql();
        let json = serde_json::to_string(&format).unwrap();
        let back: Format = serde_json::from_str(&json).unwrap();
        assert_eq!(format, back);
    }

    #[test]
    fn predefined_dialect_deltas() {
        let mysql = Format::mysql();
        assert_eq!(mysql.delimiter(), "\t");
        assert_eq!(mysql.quote(), None);
        assert_eq!(mysql.escape(), Some('\\'));
        assert_eq!(mysql.null_string(), Some("\\N"));
        assert_eq!(mysql.record_separator(), Some("\n"));
        assert_eq!(mysql.quote_mode(), QuoteMode::AllNonNull);

        let excel = Format::excel();
        assert!(excel.trailing_data());
        assert!(excel.lenient_eof());
        assert!(excel.allow_missing_column_names());
        assert!(!excel.ignore_empty_lines());

        assert_eq!(Format::postgresql_csv().null_string(), Some(""));
        assert_eq!(Format::informix_unload().delimiter(), "|");
        assert!(Format::oracle().trim());
        assert_eq!(Format::tdf().delimiter(), "\t");
        assert!(Format::tdf().ignore_surrounding_spaces());
    }

    #[test]
    fn to_builder_rederives_a_dialect() {
        let format = Format::mysql()
            .to_builder()
            .null_string(Some("NULL"))
            .build()
            .unwrap();
        assert_eq!(format.null_string(), Some("NULL"));
        assert_eq!(format.delimiter(), "\t");
    }
}
