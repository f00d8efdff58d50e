//! `monkeyc`: command-line front end for the Monkey compiler.
//!
//! ```text
//! monkeyc compile program.mk     compile and save the artifact
//! monkeyc run                    execute the saved artifact
//! monkeyc disasm                 print the saved artifact's instructions
//! ```
//!
//! Responses are printed as JSON. Set `RUST_LOG` for diagnostics on stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use monkey::{CompiledProgram, DriverError, Monkey, MonkeyConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "monkeyc", author, version, about = "Compile and run Monkey programs")]
struct Args {
    /// TOML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a source file and save the program artifact
    Compile {
        /// Monkey source file
        file: PathBuf,
    },
    /// Execute the saved artifact with the VM
    Run,
    /// Print the instructions of the saved artifact
    Disasm,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match execute(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("monkeyc: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(args: &Args) -> Result<ExitCode, DriverError> {
    let config = MonkeyConfig::load(args.config.as_deref())?;
    let monkey = Monkey::new(config);

    match &args.command {
        Command::Compile { file } => {
            let source = std::fs::read_to_string(file).map_err(|source| DriverError::Io {
                path: file.clone(),
                source,
            })?;
            let response = monkey.compile(&source);
            print_json(&response, args.pretty);
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Run => {
            let response = monkey.run();
            print_json(&response, args.pretty);
            Ok(if response.result.ends_with("...finished") {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Disasm => {
            let path = &monkey.config().artifact;
            let bytes = std::fs::read(path).map_err(|source| DriverError::Io {
                path: path.clone(),
                source,
            })?;
            let program = CompiledProgram::from_bytes(&bytes)?;
            print!("{}", program.disassemble());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match text {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("monkeyc: failed to encode response: {err}"),
    }
}
