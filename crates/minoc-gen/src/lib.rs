//! minoc-gen - LLVM code generation and JIT execution for Mino.
//!
//! [`Codegen`] lowers a resolved AST to an LLVM module: one IR function per
//! bodied function definition, `bool` as i1, `int` as i32, locals as
//! entry-block allocas (so `mem2reg` can promote them), and control flow as
//! basic blocks with terminator-aware stitching. [`Jit`] wraps the execution
//! engine that turns the module into a callable `main`.

mod error;
mod jit;
mod llvm;

pub use error::{CodeGenError, Result};
pub use jit::Jit;
pub use llvm::{optimize, verify_module, Codegen};
