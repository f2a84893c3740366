//! JIT execution.
//!
//! Thin wrapper over inkwell's execution engine: hand it a finished module,
//! get back something that can invoke the program's `int main(int)` at
//! native speed. The module must not be modified after the engine is
//! created.

use inkwell::execution_engine::ExecutionEngine;
use inkwell::module::Module;
use inkwell::targets::{InitializationConfig, Target};
use inkwell::OptimizationLevel;

use crate::error::{CodeGenError, Result};

/// The native entry point contract: `int main(int)`.
type MainFn = unsafe extern "C" fn(i32) -> i32;

/// A JIT engine holding compiled native code for one module.
pub struct Jit<'ctx> {
    engine: ExecutionEngine<'ctx>,
}

impl<'ctx> Jit<'ctx> {
    /// Compile the module to native code in-process.
    pub fn new(module: &Module<'ctx>) -> Result<Self> {
        Target::initialize_native(&InitializationConfig::default())
            .map_err(CodeGenError::TargetInit)?;
        let engine = module
            .create_jit_execution_engine(OptimizationLevel::Default)
            .map_err(|e| CodeGenError::Engine(e.to_string()))?;
        Ok(Self { engine })
    }

    /// Look up `main` and invoke it with the given argument.
    pub fn run_main(&self, input: i32) -> Result<i32> {
        let main = unsafe { self.engine.get_function::<MainFn>("main") }
            .map_err(|_| CodeGenError::FunctionNotFound("main".into()))?;
        // The signature is enforced upstream: the driver refuses programs
        // without a bodied `int main(int)`.
        Ok(unsafe { main.call(input) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llvm::{verify_module, Codegen};
    use inkwell::context::Context;
    use minoc_par::ast::Program;
    use minoc_util::Handler;

    /// Full pipeline: source through the front end, codegen, JIT, call.
    fn run(source: &str, input: i32) -> i32 {
        let mut program = Program::new();
        minoc_sem::builtins::install(&mut program).unwrap();
        let handler = Handler::new();
        minoc_par::parse_into(&mut program, &minoc_lex::tokenize(source, &handler)).unwrap();
        minoc_sem::check_program(&mut program).unwrap();

        let context = Context::create();
        let module = Codegen::new(&context, "jit_test", &program).compile().unwrap();
        verify_module(&module).unwrap();
        let jit = Jit::new(&module).unwrap();
        jit.run_main(input).unwrap()
    }

    #[test]
    fn squares_its_input() {
        assert_eq!(run("int main(int x) { return x * x; }", 7), 49);
    }

    #[test]
    fn recursive_factorial() {
        let source = "int fact(int n) { if (n <= 1) return 1; return n * fact(n - 1); }
                      int main(int x) { return fact(x); }";
        assert_eq!(run(source, 6), 720);
    }

    #[test]
    fn while_loop_sums() {
        let source = "int main(int x) {
                          int s = 0; int i = 1;
                          while (i <= x) { s = s + i; i = i + 1; }
                          return s;
                      }";
        assert_eq!(run(source, 10), 55);
    }

    #[test]
    fn booleans_cross_function_boundaries() {
        let source = "bool even(int n) { return n % 2 == 0; }
                      int main(int x) { if (even(x)) return 1; else return 0; }";
        assert_eq!(run(source, 4), 1);
        assert_eq!(run(source, 5), 0);
    }

    #[test]
    fn ternary_with_short_logic() {
        let source = "int main(int x) { return (x > 0 && x < 10) ? x : -1; }";
        assert_eq!(run(source, 3), 3);
        assert_eq!(run(source, 42), -1);
        assert_eq!(run(source, -2), -1);
    }

    #[test]
    fn coercions_round_trip_values() {
        assert_eq!(run("int main(int x) { return int(bool(x)); }", 5), 1);
        assert_eq!(run("int main(int x) { return int(bool(x)); }", 0), 0);
        assert_eq!(run("int main(int x) { return int(true) + int(false); }", 0), 1);
    }

    #[test]
    fn integer_conditions_compare_against_zero() {
        let source = "int main(int x) { if (x) return 1; return 0; }";
        assert_eq!(run(source, 3), 1);
        assert_eq!(run(source, 0), 0);
        assert_eq!(run(source, -1), 1);
    }

    #[test]
    fn unary_minus_negates() {
        assert_eq!(run("int main(int x) { return -x; }", 12), -12);
        assert_eq!(run("int main(int x) { return 0 - x; }", 12), -12);
    }

    #[test]
    fn logical_not_flips() {
        let source = "int main(int x) { return int(!(x > 0)); }";
        assert_eq!(run(source, 5), 0);
        assert_eq!(run(source, -5), 1);
    }

    #[test]
    fn division_and_remainder_are_signed() {
        assert_eq!(run("int main(int x) { return x / 3; }", -7), -2);
        assert_eq!(run("int main(int x) { return x % 3; }", -7), -1);
    }

    #[test]
    fn user_defined_operators_execute() {
        let source = "bool operator+ (bool x, bool y) { return x || y; }
                      int main(int x) { return int(bool(x) + false); }";
        assert_eq!(run(source, 1), 1);
        assert_eq!(run(source, 0), 0);
    }

    #[test]
    fn chained_ternary_picks_rightmost() {
        let source = "int main(int x) { return x == 0 ? 10 : x == 1 ? 11 : 12; }";
        assert_eq!(run(source, 0), 10);
        assert_eq!(run(source, 1), 11);
        assert_eq!(run(source, 9), 12);
    }

    #[test]
    fn nested_scopes_shadow_at_runtime() {
        let source = "int main(int x) {
                          int y = 1;
                          int acc = x;
                          { int y = 100; acc = acc + y; }
                          return acc + y;
                      }";
        assert_eq!(run(source, 5), 106);
    }
}
