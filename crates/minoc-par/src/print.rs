//! Pretty-printing.
//!
//! Renders a program back to parseable source. Binary and unary operator
//! calls print in operator notation, fully parenthesized so that re-parsing
//! the output reproduces the original tree; named calls and the explicit
//! coercions print in call notation. Builtin declarations (no body) are not
//! printed.

use std::fmt;

use crate::ast::{Exp, FuncDef, Program, Stmt};

impl Program {
    /// Displayable view of the program's user-defined functions.
    pub fn display(&self) -> ProgramPrinter<'_> {
        ProgramPrinter(self)
    }
}

pub struct ProgramPrinter<'a>(&'a Program);

impl fmt::Display for ProgramPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for func in self.0.funcs.iter().filter(|func| !func.is_builtin()) {
            write_func(f, func)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

fn write_func(f: &mut fmt::Formatter<'_>, func: &FuncDef) -> fmt::Result {
    write!(f, "{} {}(", func.ret, FuncName(func))?;
    for (i, param) in func.params().iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{} {}", param.ty, param.name)?;
    }
    writeln!(f, ")")?;
    if let Some(body) = &func.body {
        write_stmt(f, func, &Stmt::Seq(body.clone()), 0)?;
        writeln!(f)?;
    }
    Ok(())
}

/// Function names that are operator symbols print with the `operator`
/// keyword so the output stays parseable; `operator bool` and
/// `operator int` need the separating space.
struct FuncName<'a>(&'a FuncDef);

impl fmt::Display for FuncName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0.name.as_str();
        match name {
            "bool" | "int" => write!(f, "operator {name}"),
            _ if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') => {
                write!(f, "operator{name}")
            }
            _ => write!(f, "{name}"),
        }
    }
}

fn write_indent(f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    for _ in 0..indent {
        write!(f, "    ")?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, func: &FuncDef, stmt: &Stmt, indent: usize) -> fmt::Result {
    match stmt {
        Stmt::Call(call) => {
            write_indent(f, indent)?;
            write_exp(f, &Exp::Call(call.clone()))?;
            write!(f, ";")
        }
        Stmt::Assign(assign) => {
            write_indent(f, indent)?;
            write!(f, "{} = ", assign.name)?;
            write_exp(f, &assign.rvalue)?;
            write!(f, ";")
        }
        Stmt::Decl(decl) => {
            let var = func.var(decl.var);
            write_indent(f, indent)?;
            write!(f, "{} {}", var.ty, var.name)?;
            if let Some(init) = &decl.init {
                write!(f, " = ")?;
                write_exp(f, init)?;
            }
            write!(f, ";")
        }
        Stmt::Return(value) => {
            write_indent(f, indent)?;
            write!(f, "return ")?;
            write_exp(f, value)?;
            write!(f, ";")
        }
        Stmt::Seq(seq) => {
            write_indent(f, indent)?;
            writeln!(f, "{{")?;
            for stmt in &seq.stmts {
                write_stmt(f, func, stmt, indent + 1)?;
                writeln!(f)?;
            }
            write_indent(f, indent)?;
            write!(f, "}}")
        }
        Stmt::If(if_stmt) => {
            write_indent(f, indent)?;
            write!(f, "if (")?;
            write_exp(f, &if_stmt.cond)?;
            writeln!(f, ")")?;
            write_sub_stmt(f, func, &if_stmt.then, indent)?;
            if let Some(else_) = &if_stmt.else_ {
                writeln!(f)?;
                write_indent(f, indent)?;
                writeln!(f, "else")?;
                write_sub_stmt(f, func, else_, indent)?;
            }
            Ok(())
        }
        Stmt::While(while_stmt) => {
            write_indent(f, indent)?;
            write!(f, "while (")?;
            write_exp(f, &while_stmt.cond)?;
            writeln!(f, ")")?;
            write_sub_stmt(f, func, &while_stmt.body, indent)
        }
    }
}

/// Bodies of `if`/`while`: blocks stay at the same indent, single statements
/// get one more level.
fn write_sub_stmt(
    f: &mut fmt::Formatter<'_>,
    func: &FuncDef,
    stmt: &Stmt,
    indent: usize,
) -> fmt::Result {
    match stmt {
        Stmt::Seq(_) => write_stmt(f, func, stmt, indent),
        _ => write_stmt(f, func, stmt, indent + 1),
    }
}

fn is_infix(name: &str) -> bool {
    matches!(
        name,
        "+" | "-" | "*" | "/" | "%" | "==" | "!=" | "<" | "<=" | ">" | ">=" | "&&" | "||"
    )
}

fn write_exp(f: &mut fmt::Formatter<'_>, exp: &Exp) -> fmt::Result {
    match exp {
        Exp::Bool(b) => write!(f, "{}", if b.value { "true" } else { "false" }),
        Exp::Int(i) => write!(f, "{}", i.value),
        Exp::Var(var) => write!(f, "{}", var.name),
        Exp::Call(call) => {
            let name = call.callee.as_str();
            if call.args.len() == 2 && is_infix(name) {
                write!(f, "(")?;
                write_exp(f, &call.args[0])?;
                write!(f, " {name} ")?;
                write_exp(f, &call.args[1])?;
                write!(f, ")")
            } else if call.args.len() == 1 && matches!(name, "-" | "!") {
                write!(f, "({name}")?;
                write_exp(f, &call.args[0])?;
                write!(f, ")")
            } else {
                write!(f, "{name}(")?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_exp(f, arg)?;
                }
                write!(f, ")")
            }
        }
        Exp::Cond(cond) => {
            write!(f, "(")?;
            write_exp(f, &cond.cond)?;
            write!(f, " ? ")?;
            write_exp(f, &cond.then)?;
            write!(f, " : ")?;
            match &cond.else_ {
                Some(else_) => write_exp(f, else_)?,
                // Partial nodes never survive parsing; this is unreachable
                // on any printed program.
                None => write!(f, "<incomplete>")?,
            }
            write!(f, ")")
        }
    }
}
