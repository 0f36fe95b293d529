use clap::Parser;

pub mod root_commands;

pub use root_commands::{Commands, ConvertArgs, SyncArgs};

/// Top-level CLI parser for the `kisync` binary.
#[derive(Debug, Parser)]
#[command(
    name = "kisync",
    version,
    about = "Keep test-reporting known issues in sync with declarative YAML"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging
    #[arg(short = 'v', long, global = true)]
    pub debug: bool,

    /// Only log errors and print nothing but requested output
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub quiet: bool,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Copy, Debug)]
pub struct GlobalFlags {
    pub debug: bool,
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            debug: self.debug,
            quiet: self.quiet,
        }
    }
}
