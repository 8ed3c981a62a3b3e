//! Parse a GC heap log and output a JS program that recreates the structure
//! of that heap, or with `--output-format json` a description of the parsed
//! graph.
//!
//! The generated script expects to be run in a shell that provides
//! `blackRoot()` and `grayRoot()` arrays to hold the reconstructed roots.

use std::fs;
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use heaplog::heap_error::Result;
use heaplog::logging::init_logging;
use heaplog::{describe_heap, reconstruct_heap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// JS program rebuilding the heap.
    Script,
    /// JSON description of the parsed and marked graph.
    Json,
}

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the GC log
    log: PathBuf,

    /// Write the output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value = "script")]
    output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn run(args: &Args) -> Result<()> {
    let text = fs::read_to_string(&args.log)?;

    let output = match args.output_format {
        OutputFormat::Script => reconstruct_heap(&text)?,
        OutputFormat::Json => {
            let value = describe_heap(&text)?;
            let mut json = if args.pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            json.push('\n');
            json
        }
    };

    // Only touch the destination once everything has succeeded.
    match &args.output {
        Some(path) => fs::write(path, output)?,
        None => stdout().lock().write_all(output.as_bytes())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {}", args.log.display(), err);
            ExitCode::FAILURE
        }
    }
}
