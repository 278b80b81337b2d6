//! Typed error kinds for the decode pipeline.
//!
//! Nothing in the pipeline raises these up to a caller of [`crate::pipeline::decode_line`] —
//! each kind is constructed, logged at its prescribed level, and absorbed at
//! the boundary that produced it. They exist as a typed vocabulary for
//! internal control flow and for tests that want to assert *why* a line was
//! dropped, not as a public failure channel.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Malformed frame: bad framing, bad field syntax, duplicate keys.
    #[error("parse error: {0}")]
    Parse(String),

    /// A post-demodulation converter rejected its candidate (bad CRC,
    /// parity, or length).
    #[error("converter rejected: {0}")]
    ConverterRejected(String),

    /// A symbolic method name did not resolve, or a referenced protocol
    /// attribute was absent/malformed.
    #[error("catalog inconsistency: {0}")]
    CatalogInconsistency(String),
}

impl GatewayError {
    /// The logging level this kind of error is logged at (§7): parse errors
    /// are debug (4), converter rejections are info (3), catalog
    /// inconsistencies are error (1).
    pub fn log_level(&self) -> u8 {
        match self {
            GatewayError::Parse(_) => 4,
            GatewayError::ConverterRejected(_) => 3,
            GatewayError::CatalogInconsistency(_) => 1,
        }
    }
}
