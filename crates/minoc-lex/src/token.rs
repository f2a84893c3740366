//! Token definitions.

use std::fmt;

use minoc_util::Symbol;

/// A lexical token.
///
/// Equality compares the tag plus any carried value, so `Num(1) != Num(2)`
/// while keywords and punctuation compare by tag alone, which is exactly
/// what `#[derive(PartialEq)]` gives us.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    // Value-carrying tokens
    /// Integer literal
    Num(i32),
    /// Identifier
    Ident(Symbol),

    // Keywords
    Bool,
    True,
    False,
    Int,
    If,
    Else,
    Return,
    While,
    /// "operator" - prefixes an operator-named function definition
    Operator,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Not,
    Question,
    Colon,
    /// "->" - recognized by the lexer, accepted nowhere by the grammar
    Arrow,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Assign,
    Semicolon,

    /// End of input; returned repeatedly once the source is exhausted
    Eof,
}

impl Token {
    /// Whether this token may follow the `operator` keyword in a function
    /// definition, i.e. names a definable operator. Covers every unary and
    /// binary operator plus `bool` and `int` (the explicit coercions).
    pub fn is_operator_name(&self) -> bool {
        matches!(
            self,
            Token::Plus
                | Token::Minus
                | Token::Star
                | Token::Slash
                | Token::Percent
                | Token::EqEq
                | Token::NotEq
                | Token::Lt
                | Token::LtEq
                | Token::Gt
                | Token::GtEq
                | Token::AndAnd
                | Token::OrOr
                | Token::Not
                | Token::Bool
                | Token::Int
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(value) => write!(f, "{value}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Bool => write!(f, "bool"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Int => write!(f, "int"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::Return => write!(f, "return"),
            Token::While => write!(f, "while"),
            Token::Operator => write!(f, "operator"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::LtEq => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::GtEq => write!(f, ">="),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Not => write!(f, "!"),
            Token::Question => write!(f, "?"),
            Token::Colon => write!(f, ":"),
            Token::Arrow => write!(f, "->"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Assign => write!(f, "="),
            Token::Semicolon => write!(f, ";"),
            Token::Eof => write!(f, "<EOF>"),
        }
    }
}

/// Upgrade an identifier to a keyword token, if it is one.
pub fn keyword_from_ident(name: Symbol) -> Option<Token> {
    match name.as_str() {
        "bool" => Some(Token::Bool),
        "true" => Some(Token::True),
        "false" => Some(Token::False),
        "int" => Some(Token::Int),
        "if" => Some(Token::If),
        "else" => Some(Token::Else),
        "return" => Some(Token::Return),
        "while" => Some(Token::While),
        "operator" => Some(Token::Operator),
        _ => None,
    }
}
