//! minoc-par - Parser for the Mino language.
//!
//! Recursive descent over a one-token-lookahead stream for declarations and
//! statements, plus precedence climbing for expressions (see [`expr`]).
//! Parsing is fail-fast: the first grammar violation propagates out as a
//! [`ParseError`] and no partial program is produced.

pub mod ast;
mod expr;
mod print;

pub use print::ProgramPrinter;

use minoc_lex::{Token, TokenAndSpan};
use minoc_util::{Span, Symbol};
use thiserror::Error;

use ast::{
    AssignStmt, CallExp, DeclStmt, FuncDef, IfStmt, Program, SeqStmt, Stmt, Type, VarDecl, VarId,
    VarKind, WhileStmt,
};

/// Error type for parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A specific token or construct was required and something else was found
    #[error("Expected '{expected}'")]
    Expected { expected: String, span: Span },

    /// A token that fits no production at this point
    #[error("Unexpected token: {token}")]
    Unexpected { token: String, span: Span },

    /// The token after the `operator` keyword does not name an operator
    #[error("Invalid operator")]
    InvalidOperator { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Expected { span, .. }
            | ParseError::Unexpected { span, .. }
            | ParseError::InvalidOperator { span } => *span,
        }
    }
}

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse a whole token stream into a fresh program.
pub fn parse_program(tokens: &[TokenAndSpan]) -> Result<Program> {
    let mut program = Program::new();
    parse_into(&mut program, tokens)?;
    Ok(program)
}

/// Parse a token stream, appending its function definitions to `program`.
///
/// The driver calls this twice per compilation: once for the builtin
/// declarations, once for user source, so the builtins occupy the front of
/// the function list.
pub fn parse_into(program: &mut Program, tokens: &[TokenAndSpan]) -> Result<()> {
    let mut parser = Parser::new(tokens);
    loop {
        let func = parser.parse_func_def()?;
        program.push(func);
        if parser.check(Token::Eof) {
            return Ok(());
        }
    }
}

/// Parser state: the token stream, a cursor into it, and the variable arena
/// of the function currently being parsed.
pub struct Parser<'a> {
    tokens: &'a [TokenAndSpan],
    pos: usize,
    vars: Vec<VarDecl>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [TokenAndSpan]) -> Self {
        Self {
            tokens,
            pos: 0,
            vars: Vec::new(),
        }
    }

    /// The current token, without advancing.
    pub(crate) fn peek(&self) -> Token {
        match self.tokens.get(self.pos) {
            Some(spanned) => spanned.token,
            None => Token::Eof,
        }
    }

    pub(crate) fn peek_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(spanned) => spanned.span,
            None => self.tokens.last().map(|t| t.span).unwrap_or(Span::DUMMY),
        }
    }

    /// Consume and return the current token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, token: Token) -> bool {
        self.peek() == token
    }

    /// Consume the current token if it equals `token`.
    pub(crate) fn eat(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip the given token, failing if it is not present.
    pub(crate) fn expect(&mut self, token: Token) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected: token.to_string(),
                span: self.peek_span(),
            })
        }
    }

    pub(crate) fn unexpected<T>(&self, token: Token) -> Result<T> {
        Err(ParseError::Unexpected {
            token: token.to_string(),
            span: self.peek_span(),
        })
    }

    /// FuncDef -> Type FuncId "(" ParamList? ")" ( Seq | ";" )
    pub fn parse_func_def(&mut self) -> Result<FuncDef> {
        let ret = self.parse_type()?;
        let name = self.parse_func_name()?;

        self.expect(Token::LParen)?;
        if !self.check(Token::RParen) {
            self.parse_var_decl(VarKind::Param)?;
            while !self.check(Token::RParen) {
                self.expect(Token::Comma)?;
                self.parse_var_decl(VarKind::Param)?;
            }
        }
        self.expect(Token::RParen)?;
        let param_count = self.vars.len();

        // A brace opens a body; a semicolon makes this a bodiless
        // declaration (how the builtins are written).
        let body = if self.check(Token::LBrace) {
            Some(self.parse_seq()?)
        } else {
            self.expect(Token::Semicolon)?;
            None
        };

        Ok(FuncDef {
            ret,
            name,
            vars: std::mem::take(&mut self.vars),
            param_count,
            body,
        })
    }

    /// Type -> "bool" | "int"
    fn parse_type(&mut self) -> Result<Type> {
        match self.peek() {
            Token::Bool => {
                self.advance();
                Ok(Type::Bool)
            }
            Token::Int => {
                self.advance();
                Ok(Type::Int)
            }
            _ => Err(ParseError::Expected {
                expected: "type name".into(),
                span: self.peek_span(),
            }),
        }
    }

    fn parse_ident(&mut self) -> Result<Symbol> {
        match self.peek() {
            Token::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::Expected {
                expected: "identifier".into(),
                span: self.peek_span(),
            }),
        }
    }

    /// FuncId -> Id | "operator" Op
    ///
    /// After `operator`, the function's name becomes the textual form of the
    /// following operator token (`"+"`, `"<="`, `"bool"`, ...).
    fn parse_func_name(&mut self) -> Result<Symbol> {
        if self.eat(Token::Operator) {
            let span = self.peek_span();
            let op = self.advance();
            if op.is_operator_name() {
                Ok(Symbol::intern(&op.to_string()))
            } else {
                Err(ParseError::InvalidOperator { span })
            }
        } else {
            self.parse_ident()
        }
    }

    /// VarDecl -> Type Id
    ///
    /// The declaration goes into the current function's arena; statements
    /// and parameter lists refer to it by the returned id.
    fn parse_var_decl(&mut self, kind: VarKind) -> Result<VarId> {
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;
        let id = VarId(self.vars.len() as u32);
        self.vars.push(VarDecl { kind, ty, name });
        Ok(id)
    }

    /// Seq -> "{" Stmt* "}"
    fn parse_seq(&mut self) -> Result<SeqStmt> {
        self.expect(Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(Token::RBrace) {
            if self.check(Token::Eof) {
                return Err(ParseError::Expected {
                    expected: "}".into(),
                    span: self.peek_span(),
                });
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect(Token::RBrace)?;
        Ok(SeqStmt { stmts })
    }

    /// Stmt -> Id "=" Exp ";" | Id "(" Args? ")" ";" | Type Id ("=" Exp)? ";"
    ///       | Seq | "return" Exp ";"
    ///       | "if" "(" Exp ")" Stmt ("else" Stmt)?
    ///       | "while" "(" Exp ")" Stmt
    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek() {
            Token::Ident(name) => {
                self.advance();
                if self.eat(Token::Assign) {
                    let rvalue = self.parse_exp()?;
                    self.expect(Token::Semicolon)?;
                    Ok(Stmt::Assign(AssignStmt {
                        name,
                        rvalue,
                        decl: None,
                    }))
                } else {
                    let args = self.parse_args()?;
                    self.expect(Token::Semicolon)?;
                    Ok(Stmt::Call(CallExp::new(name, args)))
                }
            }
            Token::Int | Token::Bool => {
                let var = self.parse_var_decl(VarKind::Local)?;
                let init = if self.eat(Token::Assign) {
                    Some(self.parse_exp()?)
                } else {
                    None
                };
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Decl(DeclStmt { var, init }))
            }
            Token::LBrace => Ok(Stmt::Seq(self.parse_seq()?)),
            Token::Return => {
                self.advance();
                let value = self.parse_exp()?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Return(value))
            }
            Token::If => {
                self.advance();
                self.expect(Token::LParen)?;
                let cond = self.parse_exp()?;
                self.expect(Token::RParen)?;
                let then = Box::new(self.parse_stmt()?);
                let else_ = if self.eat(Token::Else) {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    None
                };
                Ok(Stmt::If(IfStmt { cond, then, else_ }))
            }
            Token::While => {
                self.advance();
                self.expect(Token::LParen)?;
                let cond = self.parse_exp()?;
                self.expect(Token::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                Ok(Stmt::While(WhileStmt { cond, body }))
            }
            token => self.unexpected(token),
        }
    }
}
