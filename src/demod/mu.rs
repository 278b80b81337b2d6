//! MU (Message-Unsynced) demodulator (§4.5.2).
//!
//! Runs against every protocol that defines `clockabs`. An optional `start`
//! sequence anchors each match; otherwise the whole raw data string is
//! scanned from position zero. Unlike the reference port's dynamically
//! built backtracking regex, this walks `signal_width`-sized chunks
//! directly — there is no backtracking to blow up, so the "factor out a
//! common first character" optimization the original needed has no
//! counterpart here; it is simply not a risk this implementation runs.

use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::Catalog;
use crate::logging::log_gateway_error;
use crate::split::SplitFrame;
use crate::types::{DecodedMessage, Metadata, RawFrame};

use super::common;

/// The wire-format shape an MU line must have (§6, SPEC_FULL §11),
/// checked against the frame text before fields are otherwise trusted.
fn mu_shape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?=.*D=\d+)(?:MU;(?:P[0-7]=-?[0-9]{1,5};){2,8}(?:(?:D=\d{2,};)|(?:CP=\d;)|(?:R=\d+;)|(?:O;)|(?:e;)|(?:p;)|(?:w=\d;))*)$",
        )
        .expect("static MU shape regex is valid")
    })
}

pub fn demodulate(catalog: &Catalog, frame: &SplitFrame, decompressed_line: &str, raw: &RawFrame) -> Vec<DecodedMessage> {
    let mut out = Vec::new();

    if !mu_shape_regex().is_match(decompressed_line) {
        tracing::debug!("MU frame does not match the wire-format shape: {decompressed_line}");
        return out;
    }

    let Some(data) = frame.get("D") else {
        tracing::debug!("MU frame missing D field");
        return out;
    };

    let raw_patterns = common::raw_patterns(frame);
    let (rssi, freq_afc) = common::rssi_afc(frame, false);

    for id in catalog.keys_with(|p| p.clock.is_some()) {
        let Some(descriptor) = catalog.check(id) else { continue };
        let clock = descriptor.clock.unwrap();
        if clock == 0.0 {
            continue;
        }
        let normalized = common::normalize(&raw_patterns, clock);

        let start_str = match descriptor.start.as_ref() {
            Some(values) => match common::bind_sequence(values, &normalized, data) {
                Some((_, s)) => Some(s),
                None => continue,
            },
            None => None,
        };

        let one_bind = descriptor.one.as_ref().and_then(|values| common::bind_sequence(values, &normalized, data));
        let zero_bind = descriptor.zero.as_ref().and_then(|values| common::bind_sequence(values, &normalized, data));
        if descriptor.one.is_some() && one_bind.is_none() {
            continue;
        }
        if descriptor.zero.is_some() && zero_bind.is_none() {
            continue;
        }
        let float_bind = descriptor.float.as_ref().and_then(|values| common::bind_sequence(values, &normalized, data));

        let width = match (&one_bind, &zero_bind) {
            (Some((ids, _)), _) => ids.len(),
            (None, Some((ids, _))) => ids.len(),
            (None, None) => continue,
        };
        let one_str = one_bind.as_ref().map(|(_, s)| s.as_str()).unwrap_or("");
        let zero_str = zero_bind.as_ref().map(|(_, s)| s.as_str()).unwrap_or("");
        let float_str = float_bind.as_ref().map(|(_, s)| s.as_str());

        let mut cursor = 0usize;
        while cursor < data.len() {
            let search_region = &data[cursor..];
            let msg_start = match &start_str {
                Some(s) => match search_region.find(s.as_str()) {
                    Some(p) => cursor + p + s.len(),
                    None => break,
                },
                None => cursor,
            };
            if msg_start >= data.len() {
                break;
            }

            let region = &data[msg_start..];
            let (bits, consumed) = common::walk_bits(region, one_str, zero_str, float_str, width);
            let bit_count = bits.chars().count();

            if bit_count > 0 {
                let fits = if descriptor.length_in_range(bit_count) {
                    Some(bits.clone())
                } else if let Some(max) = descriptor.length_max {
                    if bit_count > max && descriptor.reconstruct_bit {
                        let truncated: String = bits.chars().take(max).collect();
                        descriptor.length_in_range(max).then_some(truncated)
                    } else {
                        None
                    }
                } else {
                    None
                };

                if let Some(final_bits) = fits {
                    match common::finalize(descriptor, &final_bits) {
                        Ok(payload) => out.push(DecodedMessage {
                            protocol_id: descriptor.id.clone(),
                            payload,
                            raw: raw.clone(),
                            metadata: Metadata {
                                bit_length: final_bits.chars().count(),
                                rssi,
                                clock: Some(clock),
                                freq_afc,
                                extra: Default::default(),
                            },
                        }),
                        Err(e) => log_gateway_error(&e),
                    }
                }
            }

            cursor = msg_start + consumed.max(1);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, RawDescriptor};
    use crate::split::split_frame;

    fn demo_catalog() -> Catalog {
        let raw = vec![RawDescriptor {
            id: "demo-mu".into(),
            name: Some("DemoMU".into()),
            method: None,
            modulation: None,
            rfmode: None,
            clock: Some(300.0),
            sync: None,
            one: Some(vec![2.0, -1.0]),
            zero: Some(vec![1.0, -2.0]),
            float: None,
            start: Some(vec![1.0, -10.0]),
            preamble: None,
            postamble: None,
            length_min: Some(4),
            length_max: Some(8),
            paddingbits: Some(4),
            bit_length: None,
            modulematch: None,
            active: None,
            post_demodulation: None,
            dispatch_bin: None,
            remove_zero: None,
            reconstruct_bit: None,
            regex_match: None,
        }];
        Catalog::from_raw_descriptors(raw)
    }

    #[test]
    fn decodes_a_start_anchored_message() {
        let catalog = demo_catalog();
        // clock=300: start=(1,-10) binds P0=300(id0)/P1=-3000(id1) -> "01".
        // one=(2,-1) binds P2=600(id2)/P3=-300(id3) -> "23".
        // zero=(1,-2) binds P0(id0)/P4=-600(id4) -> "04".
        // message bits "1010" -> "23" "04" "23" "04", prefixed by start "01".
        let data = "0123042304";
        let line = format!("MU;P0=300;P1=-3000;P2=600;P3=-300;P4=-600;D={data};");
        let frame = split_frame(&line).unwrap();
        let raw = RawFrame::new("dummy");
        let out = demodulate(&catalog, &frame, &line, &raw);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, "A");
    }
}
