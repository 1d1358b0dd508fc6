use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "preforge", version, about = "Pre-build toolchain checks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the installed toolchain against the version pinned in CI (default).
    Check(CheckArgs),
    /// Print the GraphQL codegen configuration as JSON.
    CodegenConfig,
}

#[derive(Debug, Default, Args)]
pub struct CheckArgs {
    /// TOML file overriding the default guard configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Workflow file holding the `nightly-<commit>` pin.
    #[arg(long)]
    pub workflow: Option<PathBuf>,

    /// Toolchain binary to query.
    #[arg(long)]
    pub toolchain: Option<String>,

    /// Report a mismatch without failing.
    #[arg(long)]
    pub no_strict: bool,

    /// Run even when the CI environment variable is set.
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Check(CheckArgs::default()))
    }
}
