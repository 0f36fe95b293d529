use std::path::PathBuf;

use clap::{Args, Subcommand};
use kisync_reconcile::SyncOptions;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create or update remote known issues from project documents.
    Sync(SyncArgs),
    /// Convert skiplist documents into production and staging project documents.
    Convert(ConvertArgs),
}

#[derive(Clone, Debug, Args)]
pub struct SyncArgs {
    /// Project documents to load; later files override projects of the same name
    #[arg(short, long = "config", required = true, num_args = 1..)]
    pub config: Vec<PathBuf>,

    /// netrc file holding the API tokens (default: settings, then ~/.netrc)
    #[arg(short = 'p', long = "credentials")]
    pub credentials: Option<PathBuf>,

    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Check that every declared sub-project exists remotely; implies --dry-run and --strict
    #[arg(long)]
    pub sanity_check: bool,

    /// Fail on undeclared projects, environments or architectures
    #[arg(long)]
    pub strict: bool,
}

impl SyncArgs {
    #[must_use]
    pub const fn options(&self) -> SyncOptions {
        SyncOptions {
            dry_run: self.dry_run,
            sanity_check: self.sanity_check,
            strict: self.strict,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct ConvertArgs {
    /// Skiplist documents to convert
    #[arg(short, long = "config", required = true, num_args = 1..)]
    pub config: Vec<PathBuf>,

    /// Test suite name prefixed to every test
    #[arg(short, long)]
    pub suite: String,

    /// Directory the converted documents are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}
