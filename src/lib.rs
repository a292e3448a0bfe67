//! Dialect-driven reading and writing of Character-Separated Values.
//!
//! Real-world CSV comes in many dialects: RFC 4180, spreadsheet exports,
//! database bulk-load formats (MySQL, PostgreSQL, Oracle, Informix,
//! MongoDB) and plain tab-separated files. This crate drives a single
//! lexer/parser/printer engine from an immutable [`Format`] value that
//! captures a dialect: delimiter, quoting, escaping, comments, record
//! separator, null sentinel, header handling and whitespace policies.
//!
//! Parsing is streaming and pull-based over any [`std::io::Read`] of UTF-8
//! text; printing targets any [`std::io::Write`]. Records carry their
//! 1-based record number and starting character offset, so a stream can be
//! resumed later with [`Parser::with_position`].
//!
//! # Example
//!
//! ```
//! use std::error::Error;
//! use csv_dialect::{Format, Header};
//!
//! # fn main() { example().unwrap(); }
//! fn example() -> Result<(), Box<dyn Error>> {
//!     let format = Format::builder()
//!         .header(Header::FirstRecord)
//!         .comment_marker(Some('#'))
//!         .build()?;
//!
//!     let input = "# fruit prices\nname,price\napple,1.25\npear,0.90\n";
//!     let mut parser = format.parse(input.as_bytes())?;
//!
//!     assert_eq!(parser.header_comment(), Some("fruit prices"));
//!     for record in parser.records() {
//!         let record = record?;
//!         let _name = record.get_by_name("name")?;
//!         let _price = record.get_by_name("price")?;
//!     }
//!     Ok(())
//! }
//! ```

mod chars;
mod error;
mod format;
mod lexer;
mod parser;
mod printer;
mod reader;

use serde::{Deserialize, Serialize};

pub use error::{Error, ErrorKind, Result};
pub use format::{Format, FormatBuilder, Header};
pub use parser::{Parser, Record, Records};
pub use printer::{Field, Printer};

/// The quoting policy applied when writing CSV data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum QuoteMode {
    /// This puts quotes around every field. Always.
    All,
    /// This puts quotes around every non-null field; null is written as the
    /// bare null string.
    AllNonNull,
    /// This puts quotes around fields only when necessary.
    ///
    /// They are necessary when a field contains the quote char, the escape
    /// char, a line break or the delimiter, when it begins with a character
    /// at or below `#` or ends with one at or below space, and for an empty
    /// field that starts its record (which would otherwise be
    /// indistinguishable from an empty record).
    ///
    /// This is the default.
    Minimal,
    /// This puts quotes around all fields that are non-numeric.
    NonNumeric,
    /// This *never* writes quotes and escapes special characters instead.
    /// Requires an escape character.
    None,
}

impl Default for QuoteMode {
    fn default() -> QuoteMode {
        QuoteMode::Minimal
    }
}

/// The policy for repeated column names in a header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DuplicateHeaderMode {
    /// Any name may repeat. Name lookups resolve to the last occurrence.
    ///
    /// This is the default.
    AllowAll,
    /// Only blank names may repeat; their columns are not addressable by
    /// name.
    AllowEmpty,
    /// No name may repeat.
    Disallow,
}

impl Default for DuplicateHeaderMode {
    fn default() -> DuplicateHeaderMode {
        DuplicateHeaderMode::AllowAll
    }
}
