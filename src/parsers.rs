pub(crate) mod newick;

use super::phylo::tree::Tree;
use newick::{ParseError, parse_newick};
use rayon::prelude::*;
use std::io::BufRead;
use std::string::FromUtf8Error;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Tree description is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Reads the next tree description (up to and including its terminating
/// `;`) from a stream and parses it.
///
/// Returns `Ok(None)` once the stream holds nothing but whitespace.
pub fn read_tree<R: BufRead>(reader: &mut R) -> Result<Option<Tree>, ReadError> {
    let mut buffer: Vec<u8> = Vec::new();
    loop {
        let n = reader.read_until(b';', &mut buffer)?;
        if n == 0 || (buffer.last() == Some(&b';') && !is_open(&buffer)) {
            break;
        }
    }

    let text = String::from_utf8(buffer)?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_newick(text.as_str())?))
}

/// Iterates over every tree description in a stream.
///
/// A description that fails to parse is yielded as an error and reading
/// continues with the next one; I/O and encoding errors end the iteration.
pub fn read_trees<R: BufRead>(
    mut reader: R,
) -> impl Iterator<Item = Result<Tree, ReadError>> {
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        match read_tree(&mut reader) {
            Ok(Some(tree)) => Some(Ok(tree)),
            Ok(None) => {
                done = true;
                None
            }
            Err(err @ ReadError::Parse(_)) => Some(Err(err)),
            Err(err) => {
                done = true;
                Some(Err(err))
            }
        }
    })
}

/// Parses every `;`-terminated tree description in `s`, in parallel.
///
/// Results come back in input order. Error positions are byte offsets into
/// `s`, not into the individual description.
pub fn parse_trees(s: &str) -> Vec<Result<Tree, ParseError>> {
    let chunks = split_trees(s);
    debug!(trees = chunks.len(), "parsing newick trees");
    chunks
        .par_iter()
        .map(|&(start, chunk)| parse_newick(chunk).map_err(|err| err.offset_by(start)))
        .collect()
}

/// Splits `s` at every `;` that is outside quotes and comments. Each piece
/// keeps its `;` and is paired with its byte offset in `s`.
/// Whitespace-only pieces are dropped.
fn split_trees(s: &str) -> Vec<(usize, &str)> {
    let mut chunks: Vec<(usize, &str)> = Vec::new();
    let mut scanner = Scanner::default();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if scanner.feed(c) {
            let chunk = &s[start..=i];
            if !chunk.trim().is_empty() {
                chunks.push((start, chunk));
            }
            start = i + 1;
        }
    }
    let rest = &s[start..];
    if !rest.trim().is_empty() {
        chunks.push((start, rest));
    }
    chunks
}

/// True if the last byte of `bytes` is a `;` inside a quote or a comment.
fn is_open(bytes: &[u8]) -> bool {
    let mut scanner = Scanner::default();
    let mut terminated = false;
    for &b in bytes {
        terminated = scanner.feed(b as char);
    }
    !terminated
}

#[derive(Debug, Default)]
struct Scanner {
    in_quote: bool,
    in_comment: bool,
}

impl Scanner {
    /// Consumes one character; returns true for a tree-terminating `;`.
    fn feed(&mut self, c: char) -> bool {
        match c {
            '\'' if !self.in_comment => self.in_quote = !self.in_quote,
            '[' if !self.in_quote => self.in_comment = true,
            ']' if !self.in_quote => self.in_comment = false,
            ';' => return !self.in_quote && !self.in_comment,
            _ => {}
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseErrorKind;
    use std::io::Cursor;

    #[test]
    fn split_respects_quotes_and_comments() {
        let s = "(A,B);\n('x;y',C)[a;b];\n  \n";
        let chunks = split_trees(s);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], (0, "(A,B);"));
        assert_eq!(chunks[1], (6, "\n('x;y',C)[a;b];"));
    }

    #[test]
    fn parse_many_keeps_order_and_offsets() {
        let results = parse_trees("(A,B);(C,D;(E,F);");
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().to_string(), "(A,B);");
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Unbalanced);
        assert_eq!(err.position(), 10);
        assert_eq!(results[2].as_ref().unwrap().to_string(), "(E,F);");
    }

    #[test]
    fn read_from_stream() {
        let mut reader = Cursor::new("(A,B);\n('a;b',C);\n");
        let first = read_tree(&mut reader).unwrap().unwrap();
        assert_eq!(first.to_string(), "(A,B);");
        let second = read_tree(&mut reader).unwrap().unwrap();
        assert_eq!(second.to_string(), "('a;b',C);");
        assert!(read_tree(&mut reader).unwrap().is_none());
    }

    #[test]
    fn read_trees_continues_after_parse_error() {
        let reader = Cursor::new("(A,B);(A,;(C,D);");
        let results: Vec<Result<Tree, ReadError>> = read_trees(reader).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ReadError::Parse(_))));
        assert_eq!(results[2].as_ref().unwrap().leaf_count(), 2);
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let mut reader = Cursor::new(vec![b'(', 0xff, b',', b'B', b')', b';']);
        assert!(matches!(read_tree(&mut reader), Err(ReadError::InvalidUtf8(_))));
    }
}
