mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, check, run, ApplyArgs, CheckArgs, RunArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// xmlens - apply path-addressed changes to XML files
#[derive(Parser, Debug)]
#[command(name = "xmlens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log lens construction and evaluation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply changes to a file, gated by conditions
    Apply(ApplyArgs),

    /// Evaluate conditions against a file without changing it
    Check(CheckArgs),

    /// Apply every modification listed in a manifest
    Run(RunArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let result = match cli.command {
        Command::Apply(args) => apply(args, &cwd),
        Command::Check(args) => check(args, &cwd),
        Command::Run(args) => run(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
