mod document;
mod document_file;
mod parser;

pub use self::document::Document;
pub use self::document_file::{DocumentFile, IoError};
pub use self::parser::scanner::{Scanner, Token, TokenKind};
pub use self::parser::{ParseError, ParserConfig};

use std::collections::HashMap;

pub type SectionKey = String;

pub type EntryKey = String;

pub type EntryValue = String;

/// `key=value` pairs of a single section
pub type Entries = HashMap<EntryKey, EntryValue>;

/// Parse INI-style `input` into its sections.
///
/// Fails with [`ParseError::EmptyInput`] for `""`, and with the first error
/// found otherwise. Nothing of a failed parse is returned.
pub fn parse(input: &str) -> Result<Document, ParseError> {
    parse_with(input, &ParserConfig::default())
}

pub fn parse_with(input: &str, config: &ParserConfig) -> Result<Document, ParseError> {
    parser::Parser::new(config).parse(input)
}
