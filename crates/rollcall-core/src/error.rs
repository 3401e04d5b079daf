//! Error types for Rollcall.

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RollcallError>;

#[derive(Debug, thiserror::Error)]
pub enum RollcallError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RollcallError {
    /// Fatal errors stop the process at startup; everything else is logged and survived.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
