//! The lexer proper.
//!
//! Single-token scan over a [`Cursor`]: each call to [`Lexer::next_token`]
//! skips whitespace, then dispatches on the first character. Two-character
//! operators (`== != <= >= && || ->`) are recognized before their
//! one-character prefixes. Invalid characters are discarded with a warning
//! and scanning continues.

use minoc_util::{Handler, Span, Symbol};

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token};

/// A token together with the source range it was scanned from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenAndSpan {
    pub token: Token,
    pub span: Span,
}

/// Lexer for Mino source code.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    handler: &'a Handler,
    token_start: usize,
    token_line: u32,
    token_column: u32,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `source`, reporting warnings to `handler`.
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            token_start: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    /// Scan the next token. Yields [`Token::Eof`] repeatedly at end of input.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            self.token_start = self.cursor.position();
            self.token_line = self.cursor.line();
            self.token_column = self.cursor.column();

            if self.cursor.is_at_end() {
                return Token::Eof;
            }

            match self.cursor.current_char() {
                '{' => {
                    self.cursor.advance();
                    return Token::LBrace;
                }
                '}' => {
                    self.cursor.advance();
                    return Token::RBrace;
                }
                '(' => {
                    self.cursor.advance();
                    return Token::LParen;
                }
                ')' => {
                    self.cursor.advance();
                    return Token::RParen;
                }
                ',' => {
                    self.cursor.advance();
                    return Token::Comma;
                }
                ';' => {
                    self.cursor.advance();
                    return Token::Semicolon;
                }
                '?' => {
                    self.cursor.advance();
                    return Token::Question;
                }
                ':' => {
                    self.cursor.advance();
                    return Token::Colon;
                }
                '+' => {
                    self.cursor.advance();
                    return Token::Plus;
                }
                '*' => {
                    self.cursor.advance();
                    return Token::Star;
                }
                '/' => {
                    self.cursor.advance();
                    return Token::Slash;
                }
                '%' => {
                    self.cursor.advance();
                    return Token::Percent;
                }
                '-' => return self.lex_minus(),
                '=' => return self.lex_equals(),
                '!' => return self.lex_bang(),
                '<' => return self.lex_less(),
                '>' => return self.lex_greater(),
                '&' => {
                    if let Some(token) = self.lex_ampersand() {
                        return token;
                    }
                    // Lone '&' was discarded; keep scanning.
                }
                '|' => {
                    if let Some(token) = self.lex_pipe() {
                        return token;
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' => return self.lex_identifier(),
                c if c.is_ascii_digit() => return self.lex_number(),
                c => {
                    self.handler
                        .warn(format!("unexpected character '{c}'"), self.token_span());
                    self.cursor.advance();
                }
            }
        }
    }

    /// The span of the most recently returned token.
    pub fn token_span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_line,
            self.token_column,
        )
    }

    /// Scan the next token along with its span.
    pub fn next_spanned(&mut self) -> TokenAndSpan {
        let token = self.next_token();
        TokenAndSpan {
            token,
            span: self.token_span(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.cursor.current_char().is_whitespace() {
            self.cursor.advance();
        }
    }

    /// `-` or `->`.
    fn lex_minus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('>') {
            Token::Arrow
        } else {
            Token::Minus
        }
    }

    /// `=` or `==`.
    fn lex_equals(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::EqEq
        } else {
            Token::Assign
        }
    }

    /// `!` or `!=`.
    fn lex_bang(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::NotEq
        } else {
            Token::Not
        }
    }

    /// `<` or `<=`.
    fn lex_less(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::LtEq
        } else {
            Token::Lt
        }
    }

    /// `>` or `>=`.
    fn lex_greater(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::GtEq
        } else {
            Token::Gt
        }
    }

    /// `&&`; a lone `&` is discarded with a warning.
    fn lex_ampersand(&mut self) -> Option<Token> {
        self.cursor.advance();
        if self.cursor.match_char('&') {
            Some(Token::AndAnd)
        } else {
            self.handler
                .warn("unexpected character '&'", self.token_span());
            None
        }
    }

    /// `||`; a lone `|` is discarded with a warning.
    fn lex_pipe(&mut self) -> Option<Token> {
        self.cursor.advance();
        if self.cursor.match_char('|') {
            Some(Token::OrOr)
        } else {
            self.handler
                .warn("unexpected character '|'", self.token_span());
            None
        }
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`, upgraded to a keyword when it is one.
    fn lex_identifier(&mut self) -> Token {
        let start = self.cursor.position();
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let name = Symbol::intern(self.cursor.slice_from(start));
        keyword_from_ident(name).unwrap_or(Token::Ident(name))
    }

    /// A maximal run of decimal digits, parsed as a signed 32-bit integer.
    fn lex_number(&mut self) -> Token {
        let start = self.cursor.position();
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        match text.parse::<i32>() {
            Ok(value) => Token::Num(value),
            Err(_) => {
                self.handler.warn(
                    format!("integer literal '{text}' is too large"),
                    self.token_span(),
                );
                Token::Num(i32::MAX)
            }
        }
    }
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Iterate tokens up to (but not including) `Eof`.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Token::Eof => None,
            token => Some(token),
        }
    }
}

/// Scan the whole source into a vector ending in an `Eof` entry.
pub fn tokenize(source: &str, handler: &Handler) -> Vec<TokenAndSpan> {
    let mut lexer = Lexer::new(source, handler);
    let mut tokens = Vec::new();
    loop {
        let spanned = lexer.next_spanned();
        let done = spanned.token == Token::Eof;
        tokens.push(spanned);
        if done {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lex_all(source: &str) -> Vec<Token> {
        let handler = Handler::new();
        Lexer::new(source, &handler).collect()
    }

    #[test]
    fn lexes_a_function_header() {
        assert_eq!(
            lex_all("int main(int x)"),
            vec![
                Token::Int,
                Token::Ident(Symbol::intern("main")),
                Token::LParen,
                Token::Int,
                Token::Ident(Symbol::intern("x")),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn two_character_operators_win_over_prefixes() {
        assert_eq!(
            lex_all("= == ! != < <= > >= && || ->"),
            vec![
                Token::Assign,
                Token::EqEq,
                Token::Not,
                Token::NotEq,
                Token::Lt,
                Token::LtEq,
                Token::Gt,
                Token::GtEq,
                Token::AndAnd,
                Token::OrOr,
                Token::Arrow,
            ]
        );
    }

    #[test]
    fn adjacent_operators_split_correctly() {
        // "<=" then "=" rather than "<" "==".
        assert_eq!(
            lex_all("a<==b"),
            vec![
                Token::Ident(Symbol::intern("a")),
                Token::LtEq,
                Token::Assign,
                Token::Ident(Symbol::intern("b")),
            ]
        );
    }

    #[test]
    fn keywords_are_upgraded() {
        assert_eq!(
            lex_all("if else while return operator true false bool int"),
            vec![
                Token::If,
                Token::Else,
                Token::While,
                Token::Return,
                Token::Operator,
                Token::True,
                Token::False,
                Token::Bool,
                Token::Int,
            ]
        );
    }

    #[test]
    fn numbers_parse_to_values() {
        assert_eq!(lex_all("0 42 007"), vec![
            Token::Num(0),
            Token::Num(42),
            Token::Num(7)
        ]);
    }

    #[test]
    fn oversized_number_warns_and_saturates() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("99999999999", &handler);
        assert_eq!(lexer.next_token(), Token::Num(i32::MAX));
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn invalid_characters_are_discarded_with_warning() {
        let handler = Handler::new();
        let tokens: Vec<_> = Lexer::new("x @ y", &handler).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Ident(Symbol::intern("x")),
                Token::Ident(Symbol::intern("y")),
            ]
        );
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn lone_ampersand_is_discarded() {
        let handler = Handler::new();
        let tokens: Vec<_> = Lexer::new("a & b && c", &handler).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Ident(Symbol::intern("a")),
                Token::Ident(Symbol::intern("b")),
                Token::AndAnd,
                Token::Ident(Symbol::intern("c")),
            ]
        );
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn eof_repeats_after_exhaustion() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("x", &handler);
        lexer.next_token();
        assert_eq!(lexer.next_token(), Token::Eof);
        assert_eq!(lexer.next_token(), Token::Eof);
    }

    #[test]
    fn tokenize_ends_with_eof_entry() {
        let handler = Handler::new();
        let tokens = tokenize("1 + 2", &handler);
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens.last().unwrap().token, Token::Eof);
    }

    #[test]
    fn spans_track_lines() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("x\n  y", &handler);
        lexer.next_token();
        assert_eq!((lexer.token_span().line, lexer.token_span().column), (1, 1));
        lexer.next_token();
        assert_eq!((lexer.token_span().line, lexer.token_span().column), (2, 3));
    }

    proptest! {
        #[test]
        fn any_identifier_lexes_to_a_single_token(name in "[a-zA-Z_][a-zA-Z0-9_]{0,20}") {
            let handler = Handler::new();
            let tokens: Vec<_> = Lexer::new(&name, &handler).collect();
            prop_assert_eq!(tokens.len(), 1);
            match tokens[0] {
                Token::Ident(sym) => prop_assert_eq!(sym.as_str(), name.as_str()),
                // Some generated names collide with keywords.
                token => prop_assert!(keyword_from_ident(Symbol::intern(&name)) == Some(token)),
            }
        }

        #[test]
        fn any_i32_lexes_back_to_itself(value in 0i32..) {
            let handler = Handler::new();
            let tokens: Vec<_> = Lexer::new(&value.to_string(), &handler).collect();
            prop_assert_eq!(tokens, vec![Token::Num(value)]);
        }
    }
}
