//! minoc-drv - Compiler driver.
//!
//! Sequences the pipeline: read the source file, lex and parse the builtin
//! declarations and then the user code into one program, typecheck, lower
//! to LLVM IR, verify, optimize, JIT, and invoke `main`. Each stage fully
//! consumes its predecessor's output; a stage either completes cleanly or
//! aborts the run with its first error.
//!
//! When the `ENABLE_DUMP` environment variable is set and non-empty, the
//! driver writes intermediate artifacts next to the input: the
//! pretty-printed AST to `<input>.syn` and the IR module before and after
//! optimization to `<input>.initial.ll` / `<input>.optimized.ll`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use inkwell::context::Context;
use tracing::debug;

use minoc_gen::{optimize, verify_module, Codegen, Jit};
use minoc_par::ast::{Program, Type};
use minoc_util::Handler;

/// Compile the given file and invoke its `main` with `input`.
pub fn run(path: &Path, input: i32) -> Result<i32> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("unable to open input file: {}", path.display()))?;

    let program = compile(&source)?;
    ensure_main(&program)?;
    if dump_enabled() {
        write_artifact(path, "syn", &program.display().to_string())?;
    }

    let context = Context::create();
    let module_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("module");
    let module = Codegen::new(&context, module_name, &program).compile()?;
    verify_module(&module)?;
    debug!("module emitted and verified");
    if dump_enabled() {
        write_artifact(path, "initial.ll", &module.print_to_string().to_string())?;
    }

    optimize(&module)?;
    debug!("optimization passes complete");
    if dump_enabled() {
        write_artifact(path, "optimized.ll", &module.print_to_string().to_string())?;
    }

    // The module belongs to the engine from here on.
    let jit = Jit::new(&module)?;
    let result = jit.run_main(input)?;
    debug!(result, "main returned");
    Ok(result)
}

/// Front end only: builtins plus user source to a resolved program.
pub fn compile(source: &str) -> Result<Program> {
    let mut program = Program::new();
    minoc_sem::builtins::install(&mut program)
        .context("builtin declarations failed to parse")?;

    let handler = Handler::new();
    let tokens = minoc_lex::tokenize(source, &handler);
    for diagnostic in handler.diagnostics() {
        eprintln!("{diagnostic}");
    }
    debug!(tokens = tokens.len(), "lexed");

    minoc_par::parse_into(&mut program, &tokens)?;
    debug!(functions = program.funcs.len(), "parsed");

    minoc_sem::check_program(&mut program)?;
    debug!("typechecked");
    Ok(program)
}

/// The program must supply a bodied `int main(int)` for the JIT to call.
fn ensure_main(program: &Program) -> Result<()> {
    let found = program.funcs.iter().any(|func| {
        !func.is_builtin()
            && func.name.as_str() == "main"
            && func.ret == Type::Int
            && func.param_count == 1
            && func.params()[0].ty == Type::Int
    });
    if !found {
        bail!("no 'int main(int)' function defined");
    }
    Ok(())
}

fn dump_enabled() -> bool {
    env::var_os("ENABLE_DUMP").is_some_and(|value| !value.is_empty())
}

fn write_artifact(input: &Path, suffix: &str, contents: &str) -> Result<()> {
    let path = PathBuf::from(format!("{}.{suffix}", input.display()));
    fs::write(&path, contents)
        .with_context(|| format!("unable to write {}", path.display()))
}
