use time::OffsetDateTime;

/// Number of commit characters compared between the pin and the installed build.
pub const SHORT_COMMIT_LEN: usize = 7;

/// Toolchain commit recorded in the CI workflow.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PinnedVersion {
    /// Full hex run following `nightly-`, as written in the workflow.
    pub commit: String,
    /// Leading characters of `commit` used for comparison.
    pub short: String,
}

impl PinnedVersion {
    pub fn from_commit(commit: impl Into<String>) -> Self {
        let commit = commit.into();
        let short = commit.chars().take(SHORT_COMMIT_LEN).collect();
        Self { commit, short }
    }

    pub fn nightly_tag(&self) -> String {
        format!("nightly-{}", self.commit)
    }
}

/// Toolchain commit reported by the locally installed binary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstalledVersion {
    pub commit: String,
    pub built_at: Option<OffsetDateTime>,
}

impl InstalledVersion {
    pub fn matches(&self, pinned: &PinnedVersion) -> bool {
        self.commit == pinned.short
    }
}
