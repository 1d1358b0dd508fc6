use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GuardErrorKind {
    ConfigNotFound,
    PinnedVersionMissing,
    ToolchainNotFound,
    ToolchainVersionUnparseable,
    VersionMismatch,
    InvalidInput,
    ProcessFailure,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GuardError {
    pub kind: GuardErrorKind,
    pub message: String,
}

impl GuardError {
    pub fn new(kind: GuardErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for GuardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for GuardError {}

pub type GuardResult<T> = Result<T, GuardError>;
