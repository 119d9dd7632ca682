//! Tokenizer for Newick tree descriptions.
//!
//! The grammar engine only needs the [`TokenSource`] capability; the
//! [`NewickLexer`] is the `logos`-based implementation used by
//! [`parse_newick`](super::parse_newick).

use logos::{Lexer, Logos};
use std::borrow::Cow;

/// Classified token kinds consumed by the grammar engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Space,
    Tab,
    Newline,
    String,
    Number,
    LPar,
    RPar,
    Comma,
    Colon,
    Semicolon,
    EndOfString,
    Invalid,
}

impl TokenKind {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, TokenKind::Space | TokenKind::Tab | TokenKind::Newline)
    }
}

/// A stream of classified tokens.
pub trait TokenSource {
    /// Advances to the next token and returns its kind. Returns
    /// [`TokenKind::EndOfString`] once the input is exhausted.
    fn next_token(&mut self) -> TokenKind;

    /// Text of the current token. Quoted strings are returned unquoted.
    fn current_text(&self) -> &str;

    /// Byte offset of the start of the current token.
    fn current_position(&self) -> usize;
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"\[[^\]]*\]")]
enum RawToken {
    #[token(" ")]
    Space,

    #[token("\t")]
    Tab,

    #[regex(r"\r\n|\n|\r")]
    Newline,

    #[token("(")]
    LPar,

    #[token(")")]
    RPar,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[regex(r"[-+]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][-+]?[0-9]+)?", priority = 10)]
    Number,

    // Bare words: anything up to whitespace, punctuation, quotes or comments.
    #[regex(r"[^ \t\r\n()\[\],:;']+", priority = 1)]
    Word,

    #[regex(r"'([^']|'')*'")]
    Quoted,
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::Space => TokenKind::Space,
            RawToken::Tab => TokenKind::Tab,
            RawToken::Newline => TokenKind::Newline,
            RawToken::LPar => TokenKind::LPar,
            RawToken::RPar => TokenKind::RPar,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Number => TokenKind::Number,
            RawToken::Word | RawToken::Quoted => TokenKind::String,
        }
    }
}

/// `logos`-backed [`TokenSource`] over an in-memory Newick string.
pub struct NewickLexer<'s> {
    inner: Lexer<'s, RawToken>,
    text: Cow<'s, str>,
    position: usize,
}

impl<'s> NewickLexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { inner: RawToken::lexer(source), text: Cow::Borrowed(""), position: 0 }
    }
}

impl TokenSource for NewickLexer<'_> {
    fn next_token(&mut self) -> TokenKind {
        match self.inner.next() {
            Some(Ok(raw)) => {
                let slice = self.inner.slice();
                self.position = self.inner.span().start;
                self.text = match raw {
                    RawToken::Quoted => Cow::Owned(unquote(slice)),
                    _ => Cow::Borrowed(slice),
                };
                raw.into()
            }
            Some(Err(())) => {
                self.position = self.inner.span().start;
                self.text = Cow::Borrowed(self.inner.slice());
                TokenKind::Invalid
            }
            None => {
                self.position = self.inner.source().len();
                self.text = Cow::Borrowed("");
                TokenKind::EndOfString
            }
        }
    }

    fn current_text(&self) -> &str {
        &self.text
    }

    fn current_position(&self) -> usize {
        self.position
    }
}

/// Strips the enclosing quotes and collapses doubled quotes.
fn unquote(slice: &str) -> String {
    slice[1..slice.len() - 1].replace("''", "'")
}
