pub mod check;
pub mod exemption;
pub mod toolchain;
pub mod toolchain_process;
pub mod workflow;

pub use check::{VersionGuard, check_toolchain_version};
pub use exemption::{EXEMPTION_CUTOFF, is_exempt};
pub use toolchain::{ToolchainSource, parse_installed_version};
pub use toolchain_process::ProcessToolchainSource;
pub use workflow::{load_pinned_version, parse_pinned_version};
