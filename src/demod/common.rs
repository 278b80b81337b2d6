//! Shared machinery the four demodulators (§4.5) all lean on: pattern-field
//! parsing, per-protocol normalization, symbolic-sequence binding via the
//! Pattern Matcher, and final-payload assembly (padding, postDemodulation/
//! dispatch, preamble/postamble, `modulematch`).

use std::collections::BTreeMap;

use crate::catalog::ProtocolDescriptor;
use crate::convert::bin_str_to_hex;
use crate::error::GatewayError;
use crate::pattern;
use crate::registry;
use crate::split::SplitFrame;
use crate::types::{PatternCatalog, PatternId};

/// Raw (unnormalized) pattern values read off a frame's `P0`..`P7` fields.
/// Entries whose value is `0` are dropped: a zero-length pulse is invalid
/// (§3) and must never participate in matching.
pub fn raw_patterns(frame: &SplitFrame) -> BTreeMap<PatternId, i64> {
    let mut out = BTreeMap::new();
    for n in 0u8..=7 {
        let key = format!("P{n}");
        if let Some(raw) = frame.get(&key) {
            if let Ok(value) = raw.parse::<i64>() {
                if value != 0 {
                    out.insert(n, value);
                }
            }
        }
    }
    out
}

/// Normalize raw pattern values against a reference clock, rounded to one
/// decimal place, matching §4.5's shared normalization step.
pub fn normalize(raw: &BTreeMap<PatternId, i64>, clock: f64) -> PatternCatalog {
    raw.iter()
        .map(|(&id, &value)| (id, ((value as f64 / clock) * 10.0).round() / 10.0))
        .collect()
}

/// Bind a symbolic sequence (sync/start/one/zero/float) to concrete pattern
/// IDs and locate its occurrence in `haystack`. Returns the full (non-
/// deduplicated) id sequence alongside the matched substring.
pub fn bind_sequence(
    values: &[f64],
    catalog: &PatternCatalog,
    haystack: &str,
) -> Option<(Vec<PatternId>, String)> {
    let mapping = pattern::pattern_exists(values, catalog, haystack)?;
    let ids: Vec<PatternId> = values
        .iter()
        .map(|v| mapping.iter().find(|(mv, _)| mv == v).map(|(_, id)| *id).unwrap())
        .collect();
    let substring: String = ids.iter().map(PatternId::to_string).collect();
    Some((ids, substring))
}

/// Walk `region` in `width`-character chunks, classifying each chunk as
/// `'1'` (matches `one`), `'0'` (matches `zero`), `'F'` (matches `float`,
/// if given) or a stop. Returns the accumulated bit string and how many
/// characters of `region` were consumed.
pub fn walk_bits(region: &str, one: &str, zero: &str, float: Option<&str>, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }
    let chars: Vec<char> = region.chars().collect();
    let mut bits = String::new();
    let mut pos = 0usize;
    while pos + width <= chars.len() {
        let chunk: String = chars[pos..pos + width].iter().collect();
        if chunk == one {
            bits.push('1');
        } else if chunk == zero {
            bits.push('0');
        } else if float == Some(chunk.as_str()) {
            bits.push('F');
        } else {
            break;
        }
        pos += width;
    }
    (bits, pos)
}

/// Assemble the final payload from an accumulated bit string: pad to a
/// `paddingbits` boundary, run `postDemodulation` or dispatch straight to
/// hex/binary, strip leading hex zeros if `remove_zero`, wrap in preamble/
/// postamble, and enforce `modulematch`.
pub fn finalize(descriptor: &ProtocolDescriptor, bits: &str) -> Result<String, GatewayError> {
    let width = descriptor.padding_bits();
    let mut padded = bits.to_string();
    while padded.len() % width != 0 {
        padded.push('0');
    }

    let mut payload = if let Some(name) = &descriptor.post_demodulation {
        // None of the registered postDemodulation functions (EM/FS20/FHT80/
        // FHT80TF/Revolt) accept a float ('F') bit — rather than let them
        // coerce it into 0 silently, drop the candidate here (§9 open
        // question: a non-binary-accepting post-demod function must reject
        // float bits instead of faulting).
        if padded.contains('F') {
            return Err(GatewayError::ConverterRejected(
                "postDemodulation input contains a float ('F') bit, which this function does not accept".into(),
            ));
        }
        let kind = registry::resolve_method(name).ok_or_else(|| {
            GatewayError::CatalogInconsistency(format!("unknown postDemodulation method {name}"))
        })?;
        registry::apply(kind, &padded)?
    } else if descriptor.dispatch_bin {
        padded
    } else {
        bin_str_to_hex(&padded)?
    };

    if descriptor.remove_zero {
        let trimmed = payload.trim_start_matches('0');
        payload = if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() };
    }

    if let Some(pre) = &descriptor.preamble {
        payload = format!("{pre}{payload}");
    }
    if let Some(post) = &descriptor.postamble {
        payload.push_str(post);
    }

    if let Some(re) = &descriptor.modulematch {
        let compiled = regex::Regex::new(re)
            .map_err(|e| GatewayError::CatalogInconsistency(format!("bad modulematch regex {re}: {e}")))?;
        if !compiled.is_match(&payload) {
            return Err(GatewayError::ConverterRejected(format!(
                "payload {payload} does not match modulematch"
            )));
        }
    }

    Ok(payload)
}

/// RSSI conversion (§6): raw byte 0..255 to dBm.
pub fn rssi_from_raw(raw: u8) -> f64 {
    if raw >= 128 {
        (raw as f64 - 256.0) / 2.0 - 74.0
    } else {
        raw as f64 / 2.0 - 74.0
    }
}

/// AFC conversion (§6). `is_mn` applies the MN-only extra scaling.
pub fn afc_from_raw(raw: u8, is_mn: bool) -> f64 {
    let base = if raw >= 128 { (raw as f64 - 256.0) / 2.0 } else { raw as f64 / 2.0 };
    if is_mn {
        (26_000_000.0 / 16_384.0 * base / 1000.0).round()
    } else {
        base
    }
}

/// Read the common `R=`/`F=` metadata fields off a split frame.
pub fn rssi_afc(frame: &SplitFrame, is_mn: bool) -> (Option<f64>, Option<f64>) {
    let rssi = frame.get("R").and_then(|v| v.parse::<u8>().ok()).map(rssi_from_raw);
    let afc = frame.get("F").and_then(|v| v.parse::<u8>().ok()).map(|v| afc_from_raw(v, is_mn));
    (rssi, afc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_bits_stops_at_first_mismatch() {
        let (bits, consumed) = walk_bits("010101XX", "01", "10", None, 2);
        assert_eq!(bits, "101");
        assert_eq!(consumed, 6);
    }

    #[test]
    fn rssi_conversion_matches_spec_formula() {
        assert_eq!(rssi_from_raw(48), 48.0 / 2.0 - 74.0);
        assert_eq!(rssi_from_raw(200), (200.0 - 256.0) / 2.0 - 74.0);
    }

    #[test]
    fn finalize_rejects_float_bits_ahead_of_a_binary_only_post_demodulation() {
        use crate::catalog::{Catalog, RawDescriptor};

        let raw = RawDescriptor {
            id: "demo-em".into(),
            name: Some("DemoEM".into()),
            method: None,
            modulation: None,
            rfmode: None,
            clock: None,
            sync: None,
            one: None,
            zero: None,
            float: None,
            start: None,
            preamble: None,
            postamble: None,
            length_min: None,
            length_max: None,
            paddingbits: Some(1),
            bit_length: None,
            modulematch: None,
            active: None,
            post_demodulation: Some("postDemo_EM".into()),
            dispatch_bin: None,
            remove_zero: None,
            reconstruct_bit: None,
            regex_match: None,
        };
        let catalog = Catalog::from_raw_descriptors(vec![raw]);
        let descriptor = catalog.get("demo-em").unwrap();

        let err = finalize(descriptor, "11110000F0001111").unwrap_err();
        assert!(matches!(err, GatewayError::ConverterRejected(_)));
    }
}
