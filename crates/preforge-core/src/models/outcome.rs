use time::OffsetDateTime;

use crate::models::{InstalledVersion, PinnedVersion};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CheckOutcome {
    Matched,
    /// The installed build is newer than the exemption cutoff; versions were not compared.
    Exempted { built_at: OffsetDateTime },
    /// Versions differ and the caller asked for a non-strict check.
    MismatchTolerated {
        pinned: PinnedVersion,
        installed: InstalledVersion,
    },
}

impl CheckOutcome {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::MismatchTolerated { .. })
    }
}
