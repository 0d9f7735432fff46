use log::trace;
use std::sync::mpsc::SyncSender;

pub(crate) const NO_RIGHT_BRACKET: &str = "no right bracket found";
pub(crate) const NO_EQUAL_SIGN: &str = "no equal sign found";
pub(crate) const NO_NEW_LINE: &str = "no new line found";

const LEFT_BRACKET: char = '[';
const RIGHT_BRACKET: char = ']';
const EQUAL_SIGN: char = '=';
const NEW_LINE: char = '\n';
const SPACE_CHARS: &[char] = &[' ', '\t', '\r', '\n'];

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    LeftBracket,  // [
    RightBracket, // ]
    EqualSign,    // =
    Section,
    Key,
    Value,
    EndOfInput,
    Error,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// byte offset in the input where `text` starts
    pub position: usize,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub(crate) fn new(kind: TokenKind, position: usize, text: &'a str) -> Self {
        Self {
            kind,
            position,
            text,
        }
    }

    /// `true` for tokens after which no other token follows
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfInput | TokenKind::Error)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum State {
    Loop,
    LeftBracket,
    Section,
    RightBracket,
    Key,
    EqualSign,
    Value,
}

/// Turns INI-style text into a sequence of [`Token`]s.
///
/// The sequence always ends with exactly one [`TokenKind::EndOfInput`] or
/// [`TokenKind::Error`] token. After that the iterator only returns `None`.
#[derive(Debug)]
pub struct Scanner<'a> {
    input: &'a str,
    start: usize,
    pos: usize,
    // width in bytes of the last char returned by `next_char()`
    width: usize,
    state: Option<State>,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            start: 0,
            pos: 0,
            width: 0,
            state: Some(State::Loop),
        }
    }

    /// Sends all tokens through `sink`, one at a time.
    ///
    /// Returns once the terminal token was handed over, or as soon as the
    /// receiving side hung up.
    pub fn run(self, sink: SyncSender<Token<'a>>) {
        for token in self {
            if sink.send(token).is_err() {
                trace!("token receiver hung up, stopping scanner");
                break;
            }
        }
        // dropping `sink` closes the channel
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn next_char(&mut self) -> Option<char> {
        match self.input[self.pos..].chars().next() {
            Some(c) => {
                self.width = c.len_utf8();
                self.pos += self.width;
                Some(c)
            }
            None => {
                self.width = 0;
                None
            }
        }
    }

    fn backup(&mut self) {
        self.pos -= self.width;
    }

    fn peek(&mut self) -> Option<char> {
        let c = self.next_char();
        self.backup();
        c
    }

    fn ignore(&mut self) {
        self.start = self.pos;
    }

    fn skip_space(&mut self) {
        while let Some(c) = self.next_char() {
            if !SPACE_CHARS.contains(&c) {
                self.backup();
                break;
            }
        }
        self.ignore();
    }

    fn remainder_contains(&self, c: char) -> bool {
        self.input[self.pos..].contains(c)
    }

    // callers make sure `end` is somewhere in the remaining input
    fn accept_until(&mut self, end: char) {
        while let Some(c) = self.next_char() {
            if c == end {
                self.backup();
                break;
            }
        }
    }

    fn accept(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn emit(&mut self, kind: TokenKind) -> Token<'a> {
        let token = Token::new(kind, self.start, &self.input[self.start..self.pos]);
        self.start = self.pos;
        trace!("emitting {token:?}");
        token
    }

    fn error(&self, msg: &'static str) -> Token<'a> {
        trace!("scanner error at {}: {msg}", self.start);
        Token::new(TokenKind::Error, self.start, msg)
    }

    fn step(&mut self, state: State) -> (Option<Token<'a>>, Option<State>) {
        match state {
            State::Loop => {
                self.skip_space();

                if self.peek() == Some(LEFT_BRACKET) {
                    (None, Some(State::LeftBracket))
                } else if !self.is_eof() {
                    (None, Some(State::Key))
                } else {
                    (Some(self.emit(TokenKind::EndOfInput)), None)
                }
            }
            State::LeftBracket => {
                self.accept(LEFT_BRACKET);
                (Some(self.emit(TokenKind::LeftBracket)), Some(State::Section))
            }
            State::Section => {
                if self.remainder_contains(RIGHT_BRACKET) {
                    self.accept_until(RIGHT_BRACKET);
                    (Some(self.emit(TokenKind::Section)), Some(State::RightBracket))
                } else {
                    (Some(self.error(NO_RIGHT_BRACKET)), None)
                }
            }
            State::RightBracket => {
                self.accept(RIGHT_BRACKET);
                (Some(self.emit(TokenKind::RightBracket)), Some(State::Loop))
            }
            State::Key => {
                if self.remainder_contains(EQUAL_SIGN) {
                    self.accept_until(EQUAL_SIGN);
                    (Some(self.emit(TokenKind::Key)), Some(State::EqualSign))
                } else {
                    (Some(self.error(NO_EQUAL_SIGN)), None)
                }
            }
            State::EqualSign => {
                self.accept(EQUAL_SIGN);
                (Some(self.emit(TokenKind::EqualSign)), Some(State::Value))
            }
            State::Value => {
                if self.remainder_contains(NEW_LINE) {
                    self.accept_until(NEW_LINE);
                    (Some(self.emit(TokenKind::Value)), Some(State::Loop))
                } else {
                    (Some(self.error(NO_NEW_LINE)), None)
                }
            }
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(state) = self.state {
            let (token, next_state) = self.step(state);
            self.state = next_state;
            if token.is_some() {
                return token;
            }
        }

        None
    }
}

impl std::iter::FusedIterator for Scanner<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Scanner::new(input).map(|t| t.kind).collect()
    }

    mod next {
        use super::*;

        #[test]
        fn test_empty_input_yields_only_end_of_input() {
            let tokens: Vec<Token> = Scanner::new("").collect();
            assert_eq!(tokens, vec![Token::new(TokenKind::EndOfInput, 0, "")]);
        }

        #[test]
        fn test_whitespace_only_yields_only_end_of_input() {
            let tokens: Vec<Token> = Scanner::new(" \t\r\n\n").collect();
            assert_eq!(tokens, vec![Token::new(TokenKind::EndOfInput, 5, "")]);
        }

        #[test]
        fn test_with_section_and_entry_succeeds() {
            let tokens: Vec<Token> = Scanner::new("[foo]\nfoo=foo\n").collect();
            assert_eq!(tokens.len(), 7);
            assert_eq!(tokens[0], Token::new(TokenKind::LeftBracket, 0, "["));
            assert_eq!(tokens[1], Token::new(TokenKind::Section, 1, "foo"));
            assert_eq!(tokens[2], Token::new(TokenKind::RightBracket, 4, "]"));
            assert_eq!(tokens[3], Token::new(TokenKind::Key, 6, "foo"));
            assert_eq!(tokens[4], Token::new(TokenKind::EqualSign, 9, "="));
            assert_eq!(tokens[5], Token::new(TokenKind::Value, 10, "foo"));
            assert_eq!(tokens[6], Token::new(TokenKind::EndOfInput, 14, ""));
        }

        #[test]
        fn test_with_multiple_sections_succeeds() {
            assert_eq!(
                kinds("[foo]\nfoo=foo\n\n[bar]\nbar=bar\n"),
                vec![
                    TokenKind::LeftBracket,
                    TokenKind::Section,
                    TokenKind::RightBracket,
                    TokenKind::Key,
                    TokenKind::EqualSign,
                    TokenKind::Value,
                    TokenKind::LeftBracket,
                    TokenKind::Section,
                    TokenKind::RightBracket,
                    TokenKind::Key,
                    TokenKind::EqualSign,
                    TokenKind::Value,
                    TokenKind::EndOfInput,
                ]
            );
        }

        #[test]
        fn test_keeps_surrounding_whitespace_in_text() {
            let tokens: Vec<Token> = Scanner::new("[ foo ]\n key = some value \r\n").collect();
            assert_eq!(tokens[1].text, " foo ");
            assert_eq!(tokens[3].text, "key ");
            assert_eq!(tokens[5].text, " some value \r");
        }

        #[test]
        fn test_empty_key_and_value_succeed() {
            let tokens: Vec<Token> = Scanner::new("[]\n=\n").collect();
            assert_eq!(tokens[1], Token::new(TokenKind::Section, 1, ""));
            assert_eq!(tokens[3], Token::new(TokenKind::Key, 3, ""));
            assert_eq!(tokens[5], Token::new(TokenKind::Value, 4, ""));
        }

        #[test]
        fn test_positions_count_bytes_of_multibyte_chars() {
            let tokens: Vec<Token> = Scanner::new("[Grüße]\nschlüssel=wért…\n").collect();
            assert_eq!(tokens[1], Token::new(TokenKind::Section, 1, "Grüße"));
            assert_eq!(tokens[2], Token::new(TokenKind::RightBracket, 8, "]"));
            assert_eq!(tokens[3], Token::new(TokenKind::Key, 10, "schlüssel"));
            assert_eq!(tokens[4], Token::new(TokenKind::EqualSign, 20, "="));
            assert_eq!(tokens[5], Token::new(TokenKind::Value, 21, "wért…"));
        }

        #[test]
        fn test_key_without_section_is_still_a_key() {
            assert_eq!(
                kinds("foo=bar\n"),
                vec![
                    TokenKind::Key,
                    TokenKind::EqualSign,
                    TokenKind::Value,
                    TokenKind::EndOfInput,
                ]
            );
        }

        #[test]
        fn test_section_text_may_span_lines() {
            let tokens: Vec<Token> = Scanner::new("[foo\nbar]\n").collect();
            assert_eq!(tokens[1], Token::new(TokenKind::Section, 1, "foo\nbar"));
        }

        #[test]
        fn test_is_fused_after_terminal_token() {
            let mut scanner = Scanner::new("[foo]\n");
            assert_eq!(scanner.by_ref().count(), 4);
            assert_eq!(scanner.next(), None);
            assert_eq!(scanner.next(), None);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_without_right_bracket_fails() {
            let tokens: Vec<Token> = Scanner::new("[foo\nfoo=bar\n").collect();
            assert_eq!(
                tokens,
                vec![
                    Token::new(TokenKind::LeftBracket, 0, "["),
                    Token::new(TokenKind::Error, 1, NO_RIGHT_BRACKET),
                ]
            );
        }

        #[test]
        fn test_without_equal_sign_fails() {
            let tokens: Vec<Token> = Scanner::new("[foo]\nfoo\n").collect();
            assert_eq!(tokens.len(), 4);
            assert_eq!(tokens[3], Token::new(TokenKind::Error, 6, NO_EQUAL_SIGN));
        }

        #[test]
        fn test_without_trailing_new_line_fails() {
            let tokens: Vec<Token> = Scanner::new("[foo]\nfoo=bar").collect();
            assert_eq!(tokens.len(), 6);
            assert_eq!(tokens[4], Token::new(TokenKind::EqualSign, 9, "="));
            assert_eq!(tokens[5], Token::new(TokenKind::Error, 10, NO_NEW_LINE));
        }

        #[test]
        fn test_error_is_always_last() {
            for input in ["[", "[foo]\nx", "a=b", "[a]\nb=c\n[d"] {
                let tokens: Vec<Token> = Scanner::new(input).collect();
                let last = tokens.last().unwrap();
                assert!(last.is_terminal());
                assert_eq!(last.kind, TokenKind::Error, "input: {input:?}");
                assert_eq!(tokens.iter().filter(|t| t.is_terminal()).count(), 1);
            }
        }
    }

    mod run {
        use super::*;
        use std::sync::mpsc::sync_channel;
        use std::thread;

        #[test]
        fn test_hands_over_tokens_in_order() {
            let input = "[foo]\nfoo=foo\n";
            let expected: Vec<Token> = Scanner::new(input).collect();

            let received: Vec<Token> = thread::scope(|s| {
                let (tx, rx) = sync_channel(0);
                s.spawn(move || Scanner::new(input).run(tx));
                rx.iter().collect()
            });

            assert_eq!(received, expected);
        }

        #[test]
        fn test_stops_when_receiver_hangs_up() {
            let input = "[a]\nb=c\n[d]\ne=f\n";

            let first = thread::scope(|s| {
                let (tx, rx) = sync_channel(0);
                let producer = s.spawn(move || Scanner::new(input).run(tx));
                let first = rx.recv().unwrap();
                drop(rx);
                producer.join().unwrap();
                first
            });

            assert_eq!(first, Token::new(TokenKind::LeftBracket, 0, "["));
        }
    }
}
