//! Shared data types flowing through the decode pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pattern index as it appears in a split frame (`P0`..`P7`).
///
/// The source mixes string and integer pattern IDs; this type normalizes to
/// a single small unsigned integer at the splitter boundary and never lets
/// the ambiguity leak further into the pipeline.
pub type PatternId = u8;

/// Per-frame mapping of pattern IDs to pulse values, normalized against a
/// reference clock. `BTreeMap` keeps iteration order deterministic, which
/// the pattern matcher's closest-first tie-breaking relies on.
pub type PatternCatalog = BTreeMap<PatternId, f64>;

/// A line emitted by the firmware before decoding.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub line: String,
    pub timestamp: DateTime<Utc>,
    pub rssi: Option<f64>,
    pub freq_afc: Option<f64>,
    pub message_type: Option<String>,
}

impl RawFrame {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            timestamp: Utc::now(),
            rssi: None,
            freq_afc: None,
            message_type: None,
        }
    }
}

/// Metadata attached to a decoded message. Fields beyond the common ones are
/// rare enough in practice that a fixed set (rather than an open map) keeps
/// the type checked; `extra` absorbs anything protocol-specific.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub bit_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq_afc: Option<f64>,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty", default)]
    pub extra: std::collections::HashMap<String, String>,
}

/// A fully decoded message, produced by a demodulator and optionally refined
/// by a post-demodulation converter. Immutable after emission.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedMessage {
    pub protocol_id: String,
    pub payload: String,
    #[serde(skip)]
    pub raw: RawFrame,
    pub metadata: Metadata,
}
