//! Error types for semantic analysis.

use minoc_util::Symbol;
use thiserror::Error;

/// Error type for typechecking. All are terminal at the first occurrence;
/// the checker performs no recovery.
#[derive(Debug, Error)]
pub enum TypeError {
    /// Variable reference with no declaration in scope
    #[error("Undefined variable: {0}")]
    UndefinedVariable(Symbol),

    /// No overload of the named function matches the argument types
    #[error("No match for function: {0}")]
    NoFunctionMatch(Symbol),

    /// Assignment rvalue type differs from the variable's type
    #[error("Type mismatch in assignment to {0}")]
    AssignMismatch(Symbol),

    /// Assignment target is a parameter, not a local
    #[error("Cannot assign to parameter: {0}")]
    AssignToParam(Symbol),

    /// Initializer type differs from the declared type
    #[error("Type mismatch in initialization of {0}")]
    InitMismatch(Symbol),

    /// Name declared twice in the same scope
    #[error("Variable already defined in this scope: {0}")]
    Redefined(Symbol),

    /// Two parameters of one function share a name
    #[error("Parameter already defined: {0}")]
    DuplicateParam(Symbol),

    /// Two functions share both name and parameter type list
    #[error("Function already defined: {0}")]
    DuplicateFunction(Symbol),

    /// Return value type differs from the function's return type
    #[error("Type mismatch in return statement")]
    ReturnMismatch,

    /// `if`/`while`/ternary condition is neither bool nor int
    #[error("Expected bool or int condition expression")]
    BadCondition,

    /// The two branches of a conditional expression differ in type
    #[error("Type mismatch in conditional expression branches")]
    CondBranchMismatch,

    /// Indicates a bug: an AST shape the parser can never produce
    #[error("Internal error: {0}")]
    Internal(&'static str),
}
