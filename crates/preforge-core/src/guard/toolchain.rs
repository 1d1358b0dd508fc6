use std::sync::LazyLock;

use regex::Regex;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::GuardConfig;
use crate::execution::{CommandSpec, ProcessSpawnRequest};
use crate::models::{GuardResult, InstalledVersion};

static COMMIT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9a-f]{7})").expect("valid commit token pattern"));

static BUILD_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+Z)")
        .expect("valid build timestamp pattern")
});

/// Where the installed toolchain's version banner comes from.
pub trait ToolchainSource: Send + Sync {
    fn version_output(&self) -> GuardResult<String>;
}

pub fn toolchain_version_request(config: &GuardConfig) -> ProcessSpawnRequest {
    ProcessSpawnRequest::new(
        config.toolchain_program.clone(),
        CommandSpec::new(&config.toolchain_program).arg(config.version_arg.clone()),
    )
}

/// Parses a version banner such as `forge 0.2.0 (cafc260 2024-05-14T00:17:52.106245000Z)`.
///
/// Returns `None` when no parenthesized 7-hex commit is present. A missing or
/// malformed timestamp only leaves `built_at` empty.
pub fn parse_installed_version(output: &str) -> Option<InstalledVersion> {
    let commit = COMMIT_TOKEN.captures(output)?.get(1)?.as_str().to_owned();
    Some(InstalledVersion {
        commit,
        built_at: parse_build_timestamp(output),
    })
}

fn parse_build_timestamp(output: &str) -> Option<OffsetDateTime> {
    let raw = BUILD_TIMESTAMP.captures(output)?.get(1)?.as_str();
    match OffsetDateTime::parse(raw, &Rfc3339) {
        Ok(timestamp) => Some(timestamp),
        Err(error) => {
            tracing::debug!(raw, %error, "ignoring unparseable build timestamp");
            None
        }
    }
}
