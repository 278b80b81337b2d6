//! The four demodulators (§4.5): Message-Synced, Message-Unsynced,
//! Manchester, and Message-Native. Each is a pure function from a split
//! frame plus the protocol catalog to zero or more [`crate::types::DecodedMessage`]s;
//! none of them ever raises an error to their caller (§7) — a dropped
//! candidate is logged and skipped.

pub mod common;
pub mod mc;
pub mod mn;
pub mod ms;
pub mod mu;
