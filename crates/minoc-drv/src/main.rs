use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// JIT compiler for the Mino language.
///
/// Compiles FILE to native code in-process, invokes its `int main(int)`
/// with INPUT, and prints the result.
#[derive(Parser)]
#[command(name = "minoc", version)]
struct Cli {
    /// Mino source file
    file: PathBuf,

    /// Integer argument passed to the program's main
    #[arg(allow_negative_numbers = true)]
    input: i32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match minoc_drv::run(&cli.file, cli.input) {
        Ok(result) => {
            println!("{result}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
