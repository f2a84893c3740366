//! Expression parsing.
//!
//! Primaries are parsed by recursive descent; infix operators are folded by
//! precedence climbing: after parsing a primary as the left operand and
//! seeing an operator of precedence `p`, the right operand is parsed with
//! minimum precedence `p + 1`, then the two are folded into a call node.
//!
//! The ternary is handled with the same machinery at precedence 0. A folded
//! `?` builds a partial conditional with an empty else slot; the matching
//! `:` fills it. The else-operand of a `:` keeps climbing at precedence 0
//! (rather than 1), which is what makes `a ? b : c ? d : e` fold to the
//! right. Mismatched `?`/`:` surface as parse errors.

use minoc_lex::Token;
use minoc_util::Symbol;

use crate::ast::{BoolExp, CallExp, CondExp, Exp, IntExp, Type, VarExp};
use crate::{ParseError, Parser, Result};

/// Operator precedence; higher binds tighter. Returns -1 for tokens that are
/// not infix operators, which terminates the climb.
fn precedence(token: Token) -> i32 {
    match token {
        Token::Star | Token::Slash => 6,
        Token::Percent | Token::Plus | Token::Minus => 5,
        Token::Lt | Token::LtEq | Token::Gt | Token::GtEq => 4,
        Token::EqEq | Token::NotEq => 3,
        Token::AndAnd => 2,
        Token::OrOr => 1,
        Token::Question | Token::Colon => 0,
        _ => -1,
    }
}

impl Parser<'_> {
    /// Exp -> Primary (Op Primary)*    -- with precedence climbing
    ///
    /// Entry point for a complete expression: after the climb finishes, any
    /// conditional still missing its else branch means a `?` never met its
    /// `:`.
    pub(crate) fn parse_exp(&mut self) -> Result<Exp> {
        let left = self.parse_primary()?;
        let exp = self.parse_remaining(left, 0)?;
        self.ensure_complete(&exp)?;
        Ok(exp)
    }

    /// Primary -> "true" | "false" | Num
    ///          | Id | Id "(" Args? ")"
    ///          | Type "(" Args ")"
    ///          | "(" Exp ")"
    ///          | "-" Primary | "!" Primary
    fn parse_primary(&mut self) -> Result<Exp> {
        match self.advance() {
            Token::True => Ok(Exp::Bool(BoolExp { value: true })),
            Token::False => Ok(Exp::Bool(BoolExp { value: false })),
            Token::Num(value) => Ok(Exp::Int(IntExp { value })),
            Token::Ident(name) => {
                // A left paren makes this a function call.
                if self.check(Token::LParen) {
                    Ok(Exp::Call(CallExp::new(name, self.parse_args()?)))
                } else {
                    Ok(Exp::Var(VarExp::new(name)))
                }
            }
            // Explicit coercions bool(x) / int(x) are ordinary calls on the
            // builtin coercion declarations.
            token @ (Token::Bool | Token::Int) => {
                let callee = Symbol::intern(&token.to_string());
                Ok(Exp::Call(CallExp::new(callee, self.parse_args()?)))
            }
            Token::LParen => {
                let exp = self.parse_exp()?;
                self.expect(Token::RParen)?;
                Ok(exp)
            }
            // Prefix operators become unary calls, disambiguated from their
            // binary forms by overload resolution.
            token @ (Token::Minus | Token::Not) => {
                let operand = self.parse_primary()?;
                let callee = Symbol::intern(&token.to_string());
                Ok(Exp::Call(CallExp::new(callee, vec![operand])))
            }
            token => self.unexpected(token),
        }
    }

    /// Args -> "(" ")" | "(" Exp ("," Exp)* ")"
    pub(crate) fn parse_args(&mut self) -> Result<Vec<Exp>> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !self.check(Token::RParen) {
            args.push(self.parse_exp()?);
            while self.eat(Token::Comma) {
                args.push(self.parse_exp()?);
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    /// Fold infix operators onto `left` while their precedence is at least
    /// `min_prec`.
    fn parse_remaining(&mut self, mut left: Exp, min_prec: i32) -> Result<Exp> {
        loop {
            let prec = precedence(self.peek());
            if prec < min_prec {
                return Ok(left);
            }

            let op = self.advance();
            let mut right = self.parse_primary()?;

            // If the next operator binds tighter, it claims the right
            // operand first. The else-operand of `:` also continues at the
            // same level, giving the ternary its right fold.
            let next_prec = precedence(self.peek());
            if op == Token::Colon {
                if next_prec >= prec {
                    right = self.parse_remaining(right, prec)?;
                }
            } else if next_prec > prec {
                right = self.parse_remaining(right, prec + 1)?;
            }

            left = self.fold(op, left, right)?;
        }
    }

    /// Combine `left` and `right` under the operator `op`.
    fn fold(&self, op: Token, left: Exp, right: Exp) -> Result<Exp> {
        match op {
            Token::Question => Ok(Exp::Cond(CondExp {
                cond: Box::new(left),
                then: Box::new(right),
                else_: None,
                ty: Type::Unknown,
            })),
            Token::Colon => match left {
                Exp::Cond(mut cond) if cond.else_.is_none() => {
                    cond.else_ = Some(Box::new(right));
                    Ok(Exp::Cond(cond))
                }
                _ => Err(ParseError::Unexpected {
                    token: ":".into(),
                    span: self.peek_span(),
                }),
            },
            _ => {
                let callee = Symbol::intern(&op.to_string());
                Ok(Exp::Call(CallExp::new(callee, vec![left, right])))
            }
        }
    }

    /// Reject expressions that still contain a partial conditional, i.e. a
    /// `?` whose `:` never arrived.
    fn ensure_complete(&self, exp: &Exp) -> Result<()> {
        match exp {
            Exp::Bool(_) | Exp::Int(_) | Exp::Var(_) => Ok(()),
            Exp::Call(call) => {
                for arg in &call.args {
                    self.ensure_complete(arg)?;
                }
                Ok(())
            }
            Exp::Cond(cond) => match &cond.else_ {
                Some(else_) => {
                    self.ensure_complete(&cond.cond)?;
                    self.ensure_complete(&cond.then)?;
                    self.ensure_complete(else_)
                }
                None => Err(ParseError::Expected {
                    expected: ":".into(),
                    span: self.peek_span(),
                }),
            },
        }
    }
}
