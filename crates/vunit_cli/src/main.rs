//! VUnit CLI: compile order and incremental rebuild sets for HDL projects.
//!
//! Reads `vunit.toml`, scans every listed source file and prints the order
//! the files must be compiled in. `vunit minimal` limits the list to files
//! that changed since they were last marked compiled, and
//! `vunit mark-compiled` records that a compile succeeded.

#![warn(missing_docs)]

mod mark;
mod order;
mod pipeline;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// VUnit: compile order for VHDL and Verilog projects.
#[derive(Parser, Debug)]
#[command(name = "vunit", version, about = "VUnit compile-order engine")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `vunit.toml` file or its directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print files in compile order.
    CompileOrder(CompileOrderArgs),
    /// Print only the files that need recompiling, in compile order.
    Minimal(MinimalArgs),
    /// Record files as successfully compiled.
    MarkCompiled(MarkCompiledArgs),
}

/// Arguments for `vunit compile-order`.
#[derive(Parser, Debug)]
pub struct CompileOrderArgs {
    /// Print every file, not just those needing recompilation.
    #[arg(long)]
    pub full: bool,

    /// Only print these files and what they depend on.
    #[arg(short, long)]
    pub target: Vec<String>,

    /// Bind instantiations to concrete entities and architectures.
    #[arg(long)]
    pub implementation: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `vunit minimal`.
#[derive(Parser, Debug)]
pub struct MinimalArgs {
    /// Limit to these files and what they depend on.
    #[arg(short, long)]
    pub target: Vec<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `vunit mark-compiled`.
#[derive(Parser, Debug)]
pub struct MarkCompiledArgs {
    /// Files to mark; every file needing recompilation when omitted.
    pub files: Vec<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from the environment.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// File list output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One `library path` pair per line.
    Text,
    /// A JSON array of `{ "library", "path" }` objects.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let color = match cli.color {
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").is_some(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::CompileOrder(ref args) => order::run_compile_order(args, &global),
        Command::Minimal(ref args) => order::run_minimal(args, &global),
        Command::MarkCompiled(ref args) => mark::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Logs to stderr; `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_compile_order_default() {
        let cli = Cli::parse_from(["vunit", "compile-order"]);
        match cli.command {
            Command::CompileOrder(ref args) => {
                assert!(!args.full);
                assert!(!args.implementation);
                assert!(args.target.is_empty());
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected CompileOrder command"),
        }
    }

    #[test]
    fn parse_compile_order_with_targets() {
        let cli = Cli::parse_from([
            "vunit",
            "compile-order",
            "--full",
            "--implementation",
            "-t",
            "src/top.vhd",
            "--target",
            "src/tb.vhd",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::CompileOrder(ref args) => {
                assert!(args.full);
                assert!(args.implementation);
                assert_eq!(args.target, vec!["src/top.vhd", "src/tb.vhd"]);
                assert_eq!(args.format, ReportFormat::Json);
            }
            _ => panic!("expected CompileOrder command"),
        }
    }

    #[test]
    fn parse_mark_compiled_files() {
        let cli = Cli::parse_from(["vunit", "mark-compiled", "a.vhd", "b.vhd"]);
        match cli.command {
            Command::MarkCompiled(ref args) => assert_eq!(args.files, vec!["a.vhd", "b.vhd"]),
            _ => panic!("expected MarkCompiled command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["vunit", "--quiet", "--color", "never", "minimal"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert!(matches!(cli.command, Command::Minimal(_)));
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["vunit", "--config", "hw/vunit.toml", "minimal"]);
        assert_eq!(cli.config.as_deref(), Some("hw/vunit.toml"));
    }
}
