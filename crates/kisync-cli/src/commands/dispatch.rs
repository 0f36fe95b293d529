use crate::cli::{Commands, GlobalFlags};
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Sync(args) => commands::sync::handle(&args, flags).await,
        Commands::Convert(args) => commands::convert::handle(&args),
    }
}
