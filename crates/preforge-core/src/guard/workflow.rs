use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{GuardError, GuardErrorKind, GuardResult, PinnedVersion};

static NIGHTLY_PIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"nightly-([0-9a-f]+)").expect("valid nightly pin pattern"));

/// Reads the workflow at `path` and extracts the pinned toolchain commit.
pub fn load_pinned_version(path: &Path) -> GuardResult<PinnedVersion> {
    let workflow = std::fs::read_to_string(path).map_err(|error| {
        GuardError::new(
            GuardErrorKind::ConfigNotFound,
            format!("failed to read workflow '{}': {error}", path.display()),
        )
    })?;

    let pinned = parse_pinned_version(&workflow).ok_or_else(|| {
        GuardError::new(
            GuardErrorKind::PinnedVersionMissing,
            format!("no nightly-<commit> toolchain pin found in '{}'", path.display()),
        )
    })?;

    tracing::debug!(
        workflow = %path.display(),
        commit = %pinned.commit,
        short = %pinned.short,
        "found pinned toolchain version"
    );
    Ok(pinned)
}

/// First `nightly-<hex>` token in `workflow`, if any.
pub fn parse_pinned_version(workflow: &str) -> Option<PinnedVersion> {
    let captures = NIGHTLY_PIN.captures(workflow)?;
    Some(PinnedVersion::from_commit(captures.get(1)?.as_str()))
}
