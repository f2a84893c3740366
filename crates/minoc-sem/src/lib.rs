//! minoc-sem - Semantic analysis for the Mino language.
//!
//! The typechecker annotates the AST in place: it assigns a type to every
//! expression, resolves names against lexical scopes, performs overload
//! resolution by exact parameter-type match, and wires each use to its
//! defining node (`VarExp::decl`, `CallExp::target`, `AssignStmt::decl`).
//! Analysis is fail-fast; the first violation propagates out as a
//! [`TypeError`].
//!
//! Functions are checked in source order, and each is entered into the
//! function table *before* its body is analyzed, so a function may call
//! itself, or anything defined earlier, but not something defined later.

pub mod builtins;
mod error;
mod scope;
mod table;

pub use error::TypeError;
pub use scope::Scope;
pub use table::FuncTable;

use minoc_par::ast::{
    AssignStmt, CallExp, DeclStmt, Exp, FuncId, Program, SeqStmt, Stmt, Type, VarKind,
};

/// Result type alias for semantic analysis.
pub type Result<T> = std::result::Result<T, TypeError>;

/// Typecheck a program in place.
///
/// On success every expression reachable from a function body has a `Bool`
/// or `Int` type and every resolution slot is filled. Running the checker a
/// second time on an already-resolved program is a no-op.
pub fn check_program(program: &mut Program) -> Result<()> {
    let mut table = FuncTable::new();
    for index in 0..program.funcs.len() {
        let id = FuncId(index as u32);
        // Insert before analyzing the body to permit self-recursion.
        table.insert(program, id)?;

        // The body is taken out for the duration of the check so the
        // checker can read the program while mutating the statements.
        let Some(mut body) = program.funcs[index].body.take() else {
            continue;
        };
        let result = check_function(program, &table, id, &mut body);
        program.funcs[index].body = Some(body);
        result?;
    }
    Ok(())
}

fn check_function(
    program: &Program,
    table: &FuncTable,
    func: FuncId,
    body: &mut SeqStmt,
) -> Result<()> {
    let def = program.func(func);

    let mut scope = Scope::new();
    for (index, param) in def.params().iter().enumerate() {
        if !scope.insert(param.name, minoc_par::ast::VarId(index as u32)) {
            return Err(TypeError::DuplicateParam(param.name));
        }
    }

    let mut checker = FuncChecker {
        program,
        table,
        func,
        scope,
    };
    checker.check_seq(body)
}

/// Per-function checking state: the (immutable) program and function table,
/// the id of the function being checked, and the live scope stack.
struct FuncChecker<'a> {
    program: &'a Program,
    table: &'a FuncTable,
    func: FuncId,
    scope: Scope,
}

impl FuncChecker<'_> {
    fn check_seq(&mut self, seq: &mut SeqStmt) -> Result<()> {
        // A statement sequence introduces a nested lexical scope.
        self.scope.push();
        let result = seq.stmts.iter_mut().try_for_each(|stmt| self.check_stmt(stmt));
        self.scope.pop();
        result
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match stmt {
            Stmt::Call(call) => {
                self.check_call(call)?;
                Ok(())
            }
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::Decl(decl) => self.check_decl(decl),
            Stmt::Return(value) => {
                let ty = self.check_exp(value)?;
                if ty != self.program.func(self.func).ret {
                    return Err(TypeError::ReturnMismatch);
                }
                Ok(())
            }
            Stmt::Seq(seq) => self.check_seq(seq),
            Stmt::If(if_stmt) => {
                self.check_condition(&mut if_stmt.cond)?;
                self.check_stmt(&mut if_stmt.then)?;
                if let Some(else_) = &mut if_stmt.else_ {
                    self.check_stmt(else_)?;
                }
                Ok(())
            }
            Stmt::While(while_stmt) => {
                self.check_condition(&mut while_stmt.cond)?;
                self.check_stmt(&mut while_stmt.body)
            }
        }
    }

    fn check_assign(&mut self, assign: &mut AssignStmt) -> Result<()> {
        let rvalue_ty = self.check_exp(&mut assign.rvalue)?;
        let Some(var_id) = self.scope.find(assign.name) else {
            return Err(TypeError::UndefinedVariable(assign.name));
        };
        let var = self.program.func(self.func).var(var_id);
        if var.kind != VarKind::Local {
            return Err(TypeError::AssignToParam(assign.name));
        }
        if var.ty != rvalue_ty {
            return Err(TypeError::AssignMismatch(assign.name));
        }
        assign.decl = Some(var_id);
        Ok(())
    }

    fn check_decl(&mut self, decl: &mut DeclStmt) -> Result<()> {
        let var = self.program.func(self.func).var(decl.var);
        // The initializer is analyzed before the declaration enters scope,
        // so it cannot reference the variable being declared.
        if let Some(init) = &mut decl.init {
            let init_ty = self.check_exp(init)?;
            if init_ty != var.ty {
                return Err(TypeError::InitMismatch(var.name));
            }
        }
        if !self.scope.insert(var.name, decl.var) {
            return Err(TypeError::Redefined(var.name));
        }
        Ok(())
    }

    /// `if`/`while`/ternary conditions may be bool or int; an int condition
    /// is coerced at codegen time by comparing against zero.
    fn check_condition(&mut self, cond: &mut Exp) -> Result<()> {
        match self.check_exp(cond)? {
            Type::Bool | Type::Int => Ok(()),
            Type::Unknown => Err(TypeError::BadCondition),
        }
    }

    fn check_exp(&mut self, exp: &mut Exp) -> Result<Type> {
        match exp {
            // Constants carry their type from construction.
            Exp::Bool(_) | Exp::Int(_) => Ok(exp.ty()),
            Exp::Var(var) => {
                let Some(var_id) = self.scope.find(var.name) else {
                    return Err(TypeError::UndefinedVariable(var.name));
                };
                let decl = self.program.func(self.func).var(var_id);
                var.ty = decl.ty;
                var.decl = Some(var_id);
                Ok(var.ty)
            }
            Exp::Call(call) => self.check_call(call),
            Exp::Cond(cond) => {
                self.check_condition(&mut cond.cond)?;
                let then_ty = self.check_exp(&mut cond.then)?;
                let Some(else_) = &mut cond.else_ else {
                    return Err(TypeError::Internal("conditional without else branch"));
                };
                let else_ty = self.check_exp(else_)?;
                if then_ty != else_ty {
                    return Err(TypeError::CondBranchMismatch);
                }
                cond.ty = then_ty;
                Ok(then_ty)
            }
        }
    }

    fn check_call(&mut self, call: &mut CallExp) -> Result<Type> {
        // Arguments are analyzed left to right before resolution.
        let mut arg_types = Vec::with_capacity(call.args.len());
        for arg in &mut call.args {
            arg_types.push(self.check_exp(arg)?);
        }

        let Some(target) = self.table.resolve(self.program, call.callee, &arg_types) else {
            return Err(TypeError::NoFunctionMatch(call.callee));
        };
        call.ty = self.program.func(target).ret;
        call.target = Some(target);
        Ok(call.ty)
    }
}
