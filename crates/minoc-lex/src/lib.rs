//! minoc-lex - Lexical analysis for the Mino language.
//!
//! The lexer turns a character stream into [`Token`]s: it skips whitespace,
//! recognizes two-character operators before their one-character prefixes,
//! upgrades identifiers to keywords, and discards invalid characters with a
//! warning. On exhaustion it yields [`Token::Eof`] repeatedly; the single
//! token of lookahead the parser needs is whatever `next_token` last
//! returned.

mod cursor;
mod lexer;
mod token;

pub use lexer::{tokenize, Lexer, TokenAndSpan};
pub use token::{keyword_from_ident, Token};
