//! Error types for code generation.

use thiserror::Error;

/// Error type for LLVM code generation and JIT execution.
#[derive(Debug, Error)]
pub enum CodeGenError {
    /// An LLVM builder or module operation failed
    #[error("LLVM operation failed: {0}")]
    Llvm(String),

    /// A resolved call target has no emitted IR function
    #[error("Function '{0}' not found")]
    FunctionNotFound(String),

    /// The emitted module did not pass the LLVM verifier
    #[error("Module verification failed: {0}")]
    Verification(String),

    /// The native target could not be initialized
    #[error("Failed to initialize native target: {0}")]
    TargetInit(String),

    /// The JIT execution engine could not be created
    #[error("Failed to create JIT engine: {0}")]
    Engine(String),

    /// Indicates a bug: codegen ran on an unresolved or impossible AST
    #[error("Internal error: {0}")]
    Internal(&'static str),
}

/// Result type alias for code generation operations.
pub type Result<T> = std::result::Result<T, CodeGenError>;
