//! The decode pipeline (§4, §7): Frame Decompressor → Frame Splitter →
//! message-type dispatch → demodulator → zero or more [`DecodedMessage`]s.
//!
//! `decode_line` is the crate's one public entry point for turning a raw
//! firmware line into decoded messages. It never returns an error: a line
//! that fails to parse or match anything simply yields an empty vector,
//! with the reason logged at the level [`GatewayError::log_level`] assigns it.

use crate::catalog::Catalog;
use crate::decompress::decompress_payload;
use crate::demod::{mc, mn, ms, mu};
use crate::logging::log_gateway_error;
use crate::split::split_frame;
use crate::types::{DecodedMessage, RawFrame};

/// Decode one raw firmware line against `catalog`, gating MN protocols by
/// `rfmode`.
pub fn decode_line(catalog: &Catalog, rfmode: &str, line: &str) -> Vec<DecodedMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let decompressed = decompress_payload(trimmed);
    let raw = RawFrame::new(trimmed);

    let frame = match split_frame(&decompressed) {
        Ok(f) => f,
        Err(e) => {
            log_gateway_error(&e);
            return Vec::new();
        }
    };

    match frame.message_type.as_str() {
        "MS" => ms::demodulate(catalog, &frame, &raw),
        "MU" => mu::demodulate(catalog, &frame, &decompressed, &raw),
        "MC" => mc::demodulate(catalog, &frame, &raw),
        "MN" => mn::demodulate(catalog, &frame, rfmode, &raw),
        other => {
            tracing::debug!("unhandled message type after split: {other}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RawDescriptor;

    fn demo_catalog() -> Catalog {
        let raw = vec![
            RawDescriptor {
                id: "demo-ms".into(),
                name: Some("DemoMS".into()),
                method: None,
                modulation: None,
                rfmode: None,
                clock: Some(400.0),
                sync: Some(vec![1.0, -31.0]),
                one: Some(vec![1.0, -3.0]),
                zero: Some(vec![3.0, -1.0]),
                float: None,
                start: None,
                preamble: None,
                postamble: None,
                length_min: Some(4),
                length_max: Some(4),
                paddingbits: Some(4),
                bit_length: None,
                modulematch: None,
                active: None,
                post_demodulation: None,
                dispatch_bin: None,
                remove_zero: None,
                reconstruct_bit: None,
                regex_match: None,
            },
            RawDescriptor {
                id: "demo-mn".into(),
                name: Some("DemoMN".into()),
                method: None,
                modulation: Some("FSK".into()),
                rfmode: None,
                clock: None,
                sync: None,
                one: None,
                zero: None,
                float: None,
                start: None,
                preamble: None,
                postamble: None,
                length_min: Some(8),
                length_max: Some(64),
                paddingbits: None,
                bit_length: None,
                modulematch: None,
                active: None,
                post_demodulation: None,
                dispatch_bin: None,
                remove_zero: None,
                reconstruct_bit: None,
                regex_match: None,
            },
        ];
        Catalog::from_raw_descriptors(raw)
    }

    #[test]
    fn routes_an_ms_line_to_the_ms_demodulator() {
        let catalog = demo_catalog();
        let line = "MS;P0=400;P1=-12400;P2=-1200;P3=-400;P4=1200;D=0102430202;CP=0;\n";
        let out = decode_line(&catalog, "SlowRF", line);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].protocol_id, "demo-ms");
    }

    #[test]
    fn routes_an_mn_line_to_the_mn_demodulator() {
        let catalog = demo_catalog();
        let out = decode_line(&catalog, "SlowRF", "MN;D=ABCD;");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].protocol_id, "demo-mn");
    }

    #[test]
    fn blank_lines_yield_nothing() {
        let catalog = demo_catalog();
        assert!(decode_line(&catalog, "SlowRF", "   ").is_empty());
    }

    #[test]
    fn malformed_lines_are_dropped_silently() {
        let catalog = demo_catalog();
        assert!(decode_line(&catalog, "SlowRF", "MS;garbage;").is_empty());
    }
}
