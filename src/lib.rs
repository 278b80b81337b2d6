//! RF frame decoding gateway for SIGNALduino-class 433/868MHz receivers.
//!
//! Raw firmware lines go in, [`types::DecodedMessage`]s come out. See
//! [`pipeline::decode_line`] for the one public entry point that stitches
//! the stages together: decompression, splitting, demodulation and
//! post-demodulation.

pub mod catalog;
pub mod config;
pub mod convert;
pub mod decompress;
pub mod demod;
pub mod error;
pub mod logging;
pub mod pattern;
pub mod pipeline;
pub mod registry;
pub mod split;
pub mod types;
