//! minoc-util - Shared infrastructure for the Mino compiler.
//!
//! This crate holds the pieces every pipeline stage needs: source spans,
//! interned strings, and the diagnostic handler used to collect warnings.

pub mod diagnostic;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use span::Span;
pub use symbol::Symbol;
