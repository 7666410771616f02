// https://www.sigbus.info/compilerbook

use std::process::ExitCode;

use clap::Parser;
use clap_stdin::MaybeStdin;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Compiles a small C subset to x86-64 assembly")]
struct Args {
    /// Program source text, or `-` to read it from stdin
    input: MaybeStdin<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let user_input: &str = &args.input;

    match svcc::compile(user_input) {
        Ok(asm) => {
            print!("{asm}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err.render(user_input));
            ExitCode::FAILURE
        }
    }
}
