mod args;

use std::process::ExitCode;

use clap::Parser;
use preforge_core::codegen::CodegenConfig;
use preforge_core::config::{ConfigError, GuardConfig};
use preforge_core::guard::check_toolchain_version;
use tracing_subscriber::EnvFilter;

use crate::args::{CheckArgs, Cli, Command};

const LOG_ENV: &str = "PREFORGE_LOG";

fn main() -> ExitCode {
    init_logging();

    match Cli::parse().into_command() {
        Command::Check(args) => run_check(&args, &ci_env),
        Command::CodegenConfig => print_codegen_config(),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn ci_env(name: &str) -> Option<String> {
    std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
}

/// Runs the guard and maps its result onto the process exit code: failure
/// (1) on any guard error, success otherwise or when `ci_lookup` reports a CI run.
fn run_check(args: &CheckArgs, ci_lookup: &dyn Fn(&str) -> Option<String>) -> ExitCode {
    let config = match resolve_config(args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("preforge: {error}");
            return ExitCode::FAILURE;
        }
    };

    let ci_value = ci_lookup(&config.ci_env_var);
    if should_skip(args.force, ci_value.as_deref()) {
        tracing::info!(
            env = %config.ci_env_var,
            "running under CI, skipping toolchain check"
        );
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("preforge: failed to create Tokio runtime: {error}");
            return ExitCode::FAILURE;
        }
    };
    let _entered = runtime.enter();

    match check_toolchain_version(&config, !args.no_strict) {
        Ok(outcome) => {
            tracing::debug!(?outcome, "toolchain check finished");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("preforge: {error}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(args: &CheckArgs) -> Result<GuardConfig, ConfigError> {
    let mut config = GuardConfig::load_or_default(args.config.as_deref())?;
    if let Some(workflow) = &args.workflow {
        config.workflow_path = workflow.clone();
    }
    if let Some(toolchain) = &args.toolchain {
        config.toolchain_program = toolchain.clone();
    }
    Ok(config)
}

fn should_skip(force: bool, ci_value: Option<&str>) -> bool {
    !force && GuardConfig::is_ci_value(ci_value)
}

fn print_codegen_config() -> ExitCode {
    match CodegenConfig::default().to_json_pretty() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("preforge: failed to render codegen config: {error}");
            ExitCode::FAILURE
        }
    }
}
