/// Alias for `Result<T, CfgError>`.
pub type CfgResult<T> = Result<T, CfgError>;

/// Errors produced by strict decoding.
#[derive(Debug, thiserror::Error)]
pub enum CfgError {
    /// A line violated the format in strict mode.
    #[error("syntax error on line {line}: {message}")]
    Syntax {
        /// One-based line number of the offending line.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
}
