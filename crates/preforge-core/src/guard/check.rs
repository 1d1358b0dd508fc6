use std::io::Write;
use std::sync::Arc;

use crate::config::GuardConfig;
use crate::execution::TokioProcessExecutor;
use crate::guard::exemption::is_exempt;
use crate::guard::toolchain::{ToolchainSource, parse_installed_version};
use crate::guard::toolchain_process::ProcessToolchainSource;
use crate::guard::workflow::load_pinned_version;
use crate::models::{CheckOutcome, GuardError, GuardErrorKind, GuardResult, PinnedVersion};

/// Compares the installed toolchain against the commit pinned in CI.
pub struct VersionGuard<S: ToolchainSource> {
    config: GuardConfig,
    source: S,
}

impl<S: ToolchainSource> VersionGuard<S> {
    pub fn new(config: GuardConfig, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Runs one check. On a mismatch the remediation message is written to
    /// `out` before anything is returned; with `strict` the mismatch is then
    /// reported as [`GuardErrorKind::VersionMismatch`].
    pub fn check(&self, strict: bool, out: &mut dyn Write) -> GuardResult<CheckOutcome> {
        let pinned = load_pinned_version(&self.config.workflow_path)?;

        let output = self.source.version_output()?;
        let installed = parse_installed_version(&output).ok_or_else(|| {
            GuardError::new(
                GuardErrorKind::ToolchainVersionUnparseable,
                format!(
                    "cannot find a version in `{} {}` output, is it installed?",
                    self.config.toolchain_program, self.config.version_arg
                ),
            )
        })?;
        tracing::debug!(
            commit = %installed.commit,
            built_at = ?installed.built_at,
            "found installed toolchain version"
        );

        if let Some(built_at) = installed.built_at.filter(|built_at| is_exempt(*built_at)) {
            tracing::warn!(
                %built_at,
                "toolchain build is past the exemption cutoff, skipping comparison"
            );
            return Ok(CheckOutcome::Exempted { built_at });
        }

        if installed.matches(&pinned) {
            tracing::info!(version = %pinned.short, "toolchain matches pinned version");
            return Ok(CheckOutcome::Matched);
        }

        self.write_remediation(out, &pinned);

        if strict {
            return Err(GuardError::new(
                GuardErrorKind::VersionMismatch,
                format!(
                    "{} version {} does not match pinned version {}",
                    self.config.toolchain_program, installed.commit, pinned.short
                ),
            ));
        }

        tracing::warn!(
            pinned = %pinned.short,
            installed = %installed.commit,
            "toolchain version mismatch tolerated in non-strict mode"
        );
        Ok(CheckOutcome::MismatchTolerated { pinned, installed })
    }

    fn write_remediation(&self, out: &mut dyn Write, pinned: &PinnedVersion) {
        let result = writeln!(
            out,
            "{} version is out of date! Please update to the version pinned in {}. Install with:",
            self.config.toolchain_program,
            self.config.workflow_path.display()
        )
        .and_then(|()| {
            writeln!(
                out,
                "{} {}",
                self.config.install_command,
                pinned.nightly_tag()
            )
        })
        .and_then(|()| out.flush());

        if let Err(error) = result {
            tracing::warn!(%error, "failed to write remediation message");
        }
    }
}

/// Checks the toolchain on `PATH` against the workflow named by `config`,
/// writing any remediation message to stdout.
///
/// Blocks on the ambient Tokio runtime while the toolchain runs; see
/// [`crate::execution::run_and_collect_output`].
pub fn check_toolchain_version(config: &GuardConfig, strict: bool) -> GuardResult<CheckOutcome> {
    let source = ProcessToolchainSource::new(Arc::new(TokioProcessExecutor), config);
    let guard = VersionGuard::new(config.clone(), source);
    let mut stdout = std::io::stdout().lock();
    guard.check(strict, &mut stdout)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use time::macros::datetime;

    use super::VersionGuard;
    use crate::config::GuardConfig;
    use crate::guard::toolchain::ToolchainSource;
    use crate::models::{CheckOutcome, GuardError, GuardErrorKind, GuardResult};

    const PINNED_WORKFLOW: &str =
        "jobs:\n  steps:\n    - with:\n        version: nightly-abcdef1234abcdef\n";

    #[derive(Clone)]
    struct FixtureSource {
        output: GuardResult<String>,
        calls: Arc<AtomicUsize>,
    }

    impl FixtureSource {
        fn banner(output: &str) -> Self {
            Self {
                output: Ok(output.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn missing() -> Self {
            Self {
                output: Err(GuardError::new(
                    GuardErrorKind::ToolchainNotFound,
                    "failed to spawn 'forge': No such file or directory",
                )),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl ToolchainSource for FixtureSource {
        fn version_output(&self) -> GuardResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output.clone()
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn temp_workflow(test_name: &str, contents: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("preforge-{test_name}-{nanos}.yml"));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn guard_for(
        test_name: &str,
        workflow: &str,
        source: FixtureSource,
    ) -> VersionGuard<FixtureSource> {
        let config = GuardConfig {
            workflow_path: temp_workflow(test_name, workflow),
            ..GuardConfig::default()
        };
        VersionGuard::new(config, source)
    }

    fn run(
        guard: &VersionGuard<FixtureSource>,
        strict: bool,
    ) -> (GuardResult<CheckOutcome>, String) {
        let mut out = Vec::new();
        let result = guard.check(strict, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn matching_versions_pass_silently() {
        let guard = guard_for(
            "match",
            PINNED_WORKFLOW,
            FixtureSource::banner("forge 1.0 (abcdef1 2024-01-01T00:00:00.000Z)"),
        );

        let (result, out) = run(&guard, true);
        assert_eq!(result.unwrap(), CheckOutcome::Matched);
        assert!(out.is_empty());
    }

    #[test]
    fn matching_versions_pass_for_any_timestamp() {
        for banner in [
            "forge 1.0 (abcdef1)",
            "forge 1.0 (abcdef1 2020-01-01T00:00:00.000Z)",
            "forge 1.0 (abcdef1 2024-06-12T04:00:00.000Z)",
        ] {
            let guard = guard_for("match-any", PINNED_WORKFLOW, FixtureSource::banner(banner));
            assert_eq!(run(&guard, true).0.unwrap(), CheckOutcome::Matched);
        }
    }

    #[test]
    fn strict_mismatch_without_timestamp_fails_after_message() {
        let guard = guard_for(
            "strict-mismatch",
            PINNED_WORKFLOW,
            FixtureSource::banner("forge 1.0 (1234567)"),
        );

        let (result, out) = run(&guard, true);
        let error = result.unwrap_err();
        assert_eq!(error.kind, GuardErrorKind::VersionMismatch);
        assert!(out.contains("out of date"));
        assert!(out.contains("foundryup -v nightly-abcdef1234abcdef"));
    }

    #[test]
    fn strict_mismatch_at_or_before_cutoff_fails() {
        for banner in [
            "forge 1.0 (1234567 2024-01-01T00:00:00.000Z)",
            "forge 1.0 (1234567 2024-06-12T04:00:00.000Z)",
        ] {
            let guard = guard_for(
                "before-cutoff",
                PINNED_WORKFLOW,
                FixtureSource::banner(banner),
            );
            assert_eq!(
                run(&guard, true).0.unwrap_err().kind,
                GuardErrorKind::VersionMismatch
            );
        }
    }

    #[test]
    fn non_strict_mismatch_returns_with_message() {
        let guard = guard_for(
            "lenient-mismatch",
            PINNED_WORKFLOW,
            FixtureSource::banner("forge 1.0 (1234567)"),
        );

        let (result, out) = run(&guard, false);
        let outcome = result.unwrap();
        assert!(outcome.is_mismatch());
        match outcome {
            CheckOutcome::MismatchTolerated { pinned, installed } => {
                assert_eq!(pinned.short, "abcdef1");
                assert_eq!(installed.commit, "1234567");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(out.lines().count(), 2);
        assert_eq!(
            out.lines().last(),
            Some("foundryup -v nightly-abcdef1234abcdef")
        );
    }

    #[test]
    fn post_cutoff_build_is_exempt_in_both_modes() {
        for strict in [true, false] {
            let guard = guard_for(
                "exempt",
                PINNED_WORKFLOW,
                FixtureSource::banner("forge 1.0 (1234567 2025-01-01T00:00:00.000Z)"),
            );

            let (result, out) = run(&guard, strict);
            assert_eq!(
                result.unwrap(),
                CheckOutcome::Exempted {
                    built_at: datetime!(2025-01-01 00:00 UTC)
                }
            );
            assert!(out.is_empty());
        }
    }

    #[test]
    fn missing_pin_fails_before_toolchain_runs() {
        let source = FixtureSource::banner("forge 1.0 (abcdef1)");
        let calls = source.calls.clone();
        let guard = guard_for("no-pin", "version: stable\n", source);

        for strict in [true, false] {
            assert_eq!(
                run(&guard, strict).0.unwrap_err().kind,
                GuardErrorKind::PinnedVersionMissing
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let guard = guard_for(
            "no-pin-missing-tool",
            "version: stable\n",
            FixtureSource::missing(),
        );
        assert_eq!(
            run(&guard, true).0.unwrap_err().kind,
            GuardErrorKind::PinnedVersionMissing
        );
    }

    #[test]
    fn missing_workflow_is_config_not_found() {
        let config = GuardConfig {
            workflow_path: PathBuf::from("/nonexistent/.gitea/workflows/ci.yml"),
            ..GuardConfig::default()
        };
        let guard = VersionGuard::new(config, FixtureSource::banner("forge 1.0 (abcdef1)"));

        let (result, out) = run(&guard, false);
        assert_eq!(result.unwrap_err().kind, GuardErrorKind::ConfigNotFound);
        assert!(out.is_empty());
    }

    #[test]
    fn toolchain_failure_is_propagated() {
        let guard = guard_for("no-tool", PINNED_WORKFLOW, FixtureSource::missing());

        let (result, out) = run(&guard, false);
        assert_eq!(result.unwrap_err().kind, GuardErrorKind::ToolchainNotFound);
        assert!(out.is_empty());
    }

    #[test]
    fn unparseable_banner_fails_regardless_of_strictness() {
        for strict in [true, false] {
            let guard = guard_for(
                "unparseable",
                PINNED_WORKFLOW,
                FixtureSource::banner("forge: command output changed"),
            );

            let (result, out) = run(&guard, strict);
            let error = result.unwrap_err();
            assert_eq!(error.kind, GuardErrorKind::ToolchainVersionUnparseable);
            assert!(error.message.contains("forge --version"));
            assert!(out.is_empty());
        }
    }

    #[test]
    fn exemption_is_logged_as_warning() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let guard = guard_for(
            "exempt-log",
            PINNED_WORKFLOW,
            FixtureSource::banner("forge 1.0 (1234567 2025-01-01T00:00:00.000Z)"),
        );

        let outcome = tracing::subscriber::with_default(subscriber, || run(&guard, true).0);

        assert!(matches!(outcome.unwrap(), CheckOutcome::Exempted { .. }));
        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("WARN"), "expected a warning, got: {text}");
        assert!(text.contains("exemption cutoff"));
    }

    #[test]
    fn sub_millisecond_stamp_past_cutoff_is_compared() {
        let guard = guard_for(
            "sub-ms",
            PINNED_WORKFLOW,
            FixtureSource::banner("forge 1.0 (1234567 2024-06-12T04:00:00.0005Z)"),
        );

        assert_eq!(
            run(&guard, true).0.unwrap_err().kind,
            GuardErrorKind::VersionMismatch
        );
    }
}
