pub mod error;
pub mod outcome;
pub mod version;

pub use error::{GuardError, GuardErrorKind, GuardResult};
pub use outcome::CheckOutcome;
pub use version::{InstalledVersion, PinnedVersion, SHORT_COMMIT_LEN};
