/// Errors returned by the protocol codecs and transports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A user-supplied value falls outside the documented protocol domain.
    /// Out-of-range values are always rejected, never clamped.
    #[error("{quantity} {value} out of range {min}..={max}")]
    Range {
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// Negative input to the fixed-point splitter. This indicates a bug in
    /// the calling code, not a board-side condition.
    #[error("fixed-point value must be >= 0, got {0}")]
    Domain(f64),
    #[error("transport is not open")]
    NotOpen,
    /// No response byte arrived within the read timeout. Recoverable: the
    /// cached value is simply left unchanged and the caller may retry.
    #[error("timed out waiting for response byte")]
    Timeout,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
