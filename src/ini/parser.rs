pub(crate) mod scanner;

use super::*;

use log::{debug, warn};
use std::sync::mpsc::sync_channel;
use std::thread;

use self::scanner::{Scanner, Token, TokenKind};

type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("nothing to parse")]
    EmptyInput,
    /// A `[`, key or value that was never closed. `message` is the scanner's
    /// diagnostic.
    #[error("{message}")]
    Scan { position: usize, message: String },
    #[error("{text} can't contain new lines")]
    EmbeddedNewline { position: usize, text: String },
    #[error("{key} must belong to a section")]
    OutsideSection { position: usize, key: String },
}

impl ParseError {
    /// Byte offset into the input where the error was detected
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::EmptyInput => None,
            ParseError::Scan { position, .. }
            | ParseError::EmbeddedNewline { position, .. }
            | ParseError::OutsideSection { position, .. } => Some(*position),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParserConfig {
    /// Reject keys that appear before the first section header instead of
    /// collecting them in a section named `""`.
    pub require_section: bool,
}

#[derive(Debug)]
pub(crate) struct Parser<'c> {
    config: &'c ParserConfig,
    current_section: Option<String>,
    current_key: String,
}

impl<'c> Parser<'c> {
    pub(crate) fn new(config: &'c ParserConfig) -> Self {
        Self {
            config,
            current_section: None,
            current_key: String::new(),
        }
    }

    /// Scans `input` on a separate thread and consumes its tokens one at a
    /// time.
    pub(crate) fn parse(&mut self, input: &str) -> ParseResult<Document> {
        if input.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        debug!("parsing {} bytes", input.len());

        thread::scope(|s| {
            // capacity 0: every send waits for the matching recv
            let (tx, rx) = sync_channel(0);
            let producer = thread::Builder::new()
                .name("inilex-scanner".to_owned())
                .spawn_scoped(s, move || Scanner::new(input).run(tx));

            match producer {
                // returning early drops `rx`, which stops the scanner
                Ok(_) => self.parse_tokens(rx),
                Err(e) => {
                    warn!("can't start scanner thread, scanning in place: {e}");
                    self.parse_in_place(input)
                }
            }
        })
    }

    /// Pulls tokens from the scanner on the current thread.
    pub(crate) fn parse_in_place(&mut self, input: &str) -> ParseResult<Document> {
        if input.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        self.parse_tokens(Scanner::new(input))
    }

    pub(crate) fn parse_tokens<'a, I>(&mut self, tokens: I) -> ParseResult<Document>
    where
        I: IntoIterator<Item = Token<'a>>,
    {
        self.current_section = None;
        self.current_key.clear();

        let mut doc = Document::new();

        for token in tokens {
            match token.kind {
                TokenKind::Section => {
                    let name = Self::validated_text(&token)?;
                    doc.ensure_section(name);
                    self.current_section = Some(name.to_owned());
                }
                TokenKind::Key => {
                    let key = Self::validated_text(&token)?;
                    if self.current_section.is_none() && self.config.require_section {
                        return Err(ParseError::OutsideSection {
                            position: token.position,
                            key: key.to_owned(),
                        });
                    }
                    self.current_key = key.to_owned();
                }
                TokenKind::Value => {
                    let value = Self::validated_text(&token)?;
                    let section = self.current_section.as_deref().unwrap_or_default();
                    doc.insert(section, self.current_key.as_str(), value);
                }
                TokenKind::Error => {
                    return Err(ParseError::Scan {
                        position: token.position,
                        message: token.text.to_owned(),
                    });
                }
                TokenKind::EndOfInput => break,
                TokenKind::LeftBracket | TokenKind::RightBracket | TokenKind::EqualSign => (),
            }
        }

        debug!("parsed {} section(s)", doc.len());

        Ok(doc)
    }

    // trimmed text of a section, key or value token
    fn validated_text<'a>(token: &Token<'a>) -> ParseResult<&'a str> {
        if token.text.contains('\n') {
            return Err(ParseError::EmbeddedNewline {
                position: token.position,
                text: token.text.to_owned(),
            });
        }

        Ok(token.text.trim())
    }
}
