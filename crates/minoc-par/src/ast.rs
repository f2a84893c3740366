//! AST node definitions.
//!
//! The parser produces these nodes with their resolution slots empty; the
//! typechecker fills every `ty`, `decl`, and `target` in place. Back-
//! references are arena indices rather than pointers: a [`FuncId`] indexes
//! [`Program::funcs`] and a [`VarId`] indexes the owning function's
//! [`FuncDef::vars`] arena, so they stay valid for the life of the `Program`
//! without any lifetime plumbing.

use minoc_util::Symbol;
use std::fmt;

/// A value type. `Unknown` appears only on freshly parsed non-constant
/// expressions; after typechecking every expression is `Bool` or `Int`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Type {
    Bool,
    Int,
    #[default]
    Unknown,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Unknown => write!(f, "<unknown>"),
        }
    }
}

/// Index of a function in [`Program::funcs`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

impl FuncId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a variable in its function's [`FuncDef::vars`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VarId(pub u32);

impl VarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a variable is stored, which the code generator needs: parameters map
/// to incoming IR values, locals to stack slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Local,
    Param,
}

/// A variable declaration: a function parameter or a local. Identity is the
/// `VarId` under which it sits in the function's arena, never the name; two
/// variables with the same name in different scopes are distinct entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub ty: Type,
    pub name: Symbol,
}

/// An expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exp {
    Bool(BoolExp),
    Int(IntExp),
    Var(VarExp),
    Call(CallExp),
    Cond(CondExp),
}

impl Exp {
    /// The expression's type; fixed at construction for constants, filled by
    /// the typechecker for everything else.
    pub fn ty(&self) -> Type {
        match self {
            Exp::Bool(_) => Type::Bool,
            Exp::Int(_) => Type::Int,
            Exp::Var(var) => var.ty,
            Exp::Call(call) => call.ty,
            Exp::Cond(cond) => cond.ty,
        }
    }
}

/// Boolean constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoolExp {
    pub value: bool,
}

/// Integer constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntExp {
    pub value: i32,
}

/// Variable reference. `ty` and `decl` are filled by the typechecker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarExp {
    pub name: Symbol,
    pub ty: Type,
    pub decl: Option<VarId>,
}

impl VarExp {
    pub fn new(name: Symbol) -> Self {
        Self {
            name,
            ty: Type::Unknown,
            decl: None,
        }
    }
}

/// Function call. Operators are represented as calls with their symbol as
/// the callee name (`"+"`, `"<="`, `"!"`, `"bool"`, `"int"`, ...); `ty` and
/// `target` are filled by the typechecker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallExp {
    pub callee: Symbol,
    pub args: Vec<Exp>,
    pub ty: Type,
    pub target: Option<FuncId>,
}

impl CallExp {
    pub fn new(callee: Symbol, args: Vec<Exp>) -> Self {
        Self {
            callee,
            args,
            ty: Type::Unknown,
            target: None,
        }
    }
}

/// Conditional (ternary) expression. `else_` is `None` only for the partial
/// node the parser builds when `?` folds before its `:` has arrived; an
/// expression that still contains a partial node once fully parsed is a
/// parse error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CondExp {
    pub cond: Box<Exp>,
    pub then: Box<Exp>,
    pub else_: Option<Box<Exp>>,
    pub ty: Type,
}

/// A statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Call(CallExp),
    Assign(AssignStmt),
    Decl(DeclStmt),
    Return(Exp),
    Seq(SeqStmt),
    If(IfStmt),
    While(WhileStmt),
}

/// Assignment to a local variable. `decl` is filled by the typechecker,
/// which also rejects assignments to parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignStmt {
    pub name: Symbol,
    pub rvalue: Exp,
    pub decl: Option<VarId>,
}

/// Local variable declaration with an optional initializer. The declaration
/// itself lives in the function's arena; `var` points at it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclStmt {
    pub var: VarId,
    pub init: Option<Exp>,
}

/// A brace-delimited sequence of statements, which introduces a nested
/// lexical scope.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SeqStmt {
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IfStmt {
    pub cond: Exp,
    pub then: Box<Stmt>,
    pub else_: Option<Box<Stmt>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhileStmt {
    pub cond: Exp,
    pub body: Box<Stmt>,
}

/// A function definition. A missing body marks a builtin declaration.
///
/// `vars` is the arena of every variable the function declares: parameters
/// first (so `vars[..param_count]` is the parameter list in order), then
/// locals in the order their declarations were parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncDef {
    pub ret: Type,
    pub name: Symbol,
    pub vars: Vec<VarDecl>,
    pub param_count: usize,
    pub body: Option<SeqStmt>,
}

impl FuncDef {
    pub fn params(&self) -> &[VarDecl] {
        &self.vars[..self.param_count]
    }

    pub fn var(&self, id: VarId) -> &VarDecl {
        &self.vars[id.index()]
    }

    /// Builtin declarations have no body.
    pub fn is_builtin(&self) -> bool {
        self.body.is_none()
    }
}

/// An ordered sequence of function definitions. The builtin declarations are
/// parsed into the front before any user code.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Program {
    pub funcs: Vec<FuncDef>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn func(&self, id: FuncId) -> &FuncDef {
        &self.funcs[id.index()]
    }

    pub fn push(&mut self, func: FuncDef) -> FuncId {
        let id = FuncId(self.funcs.len() as u32);
        self.funcs.push(func);
        id
    }

    /// Iterate functions with their ids, in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (FuncId, &FuncDef)> {
        self.funcs
            .iter()
            .enumerate()
            .map(|(i, f)| (FuncId(i as u32), f))
    }
}
