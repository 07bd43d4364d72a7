use wpactrl_ctrl::CtrlError;

/// Errors that can occur in supplicant operations.
#[derive(Debug, thiserror::Error)]
pub enum SupplicantError {
    /// Control-level error. Rejections keep the daemon's reply as their text.
    #[error(transparent)]
    Ctrl(#[from] CtrlError),

    /// A `LIST_NETWORKS` row had fewer than two tab-separated fields.
    #[error("malformed network list line {line}: {content:?}")]
    MalformedNetwork { line: usize, content: String },

    /// A `STATUS` line was not a `key=value` pair.
    #[error("malformed status line {line}: {content:?}")]
    MalformedStatus { line: usize, content: String },

    /// The classifier thread could not be started.
    #[error("failed to start classifier thread: {0}")]
    Spawn(std::io::Error),
}

impl SupplicantError {
    /// True when the underlying command timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Ctrl(err) if err.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, SupplicantError>;
