//! MN (Message-Native) demodulator (§4.5.4).
//!
//! The receiver has already framed and decoded the packet itself (e.g. a
//! CC1101 packet-mode capture); the `D` field carries that hex verbatim.
//! Candidates are gated by `modulation` (required), `rfmode` (if the
//! receiver is pinned to one), `regexMatch` against the raw hex, and
//! `length_in_range`. `method` then runs, mostly as a passthrough.

use crate::catalog::Catalog;
use crate::logging::log_gateway_error;
use crate::split::SplitFrame;
use crate::types::{DecodedMessage, Metadata, RawFrame};

use super::common;

pub fn demodulate(catalog: &Catalog, frame: &SplitFrame, rfmode: &str, raw: &RawFrame) -> Vec<DecodedMessage> {
    let mut out = Vec::new();

    let Some(hex) = frame.get("D") else {
        tracing::debug!("MN frame missing D field");
        return out;
    };
    let bit_len = hex.len() * 4;
    let (rssi, freq_afc) = common::rssi_afc(frame, true);

    for id in catalog.keys_with(|p| p.modulation.is_some()) {
        let Some(descriptor) = catalog.check(id) else { continue };

        if let Some(wanted) = &descriptor.rfmode {
            if !wanted.eq_ignore_ascii_case(rfmode) {
                continue;
            }
        }
        if !descriptor.length_in_range(bit_len) {
            continue;
        }
        if let Some(pattern) = &descriptor.regex_match {
            let Ok(compiled) = regex::Regex::new(pattern) else {
                tracing::error!("MN protocol {id} names an unresolvable regexMatch");
                continue;
            };
            if !compiled.is_match(hex) {
                continue;
            }
        }

        let payload = if let Some(name) = &descriptor.method {
            let Some(kind) = crate::registry::resolve_method(name) else {
                tracing::error!("MN protocol {id} names an unresolvable method");
                continue;
            };
            match crate::registry::apply(kind, hex) {
                Ok(p) => p,
                Err(e) => {
                    log_gateway_error(&e);
                    continue;
                }
            }
        } else {
            hex.to_string()
        };

        let payload = match &descriptor.preamble {
            Some(pre) => format!("{pre}{payload}"),
            None => payload,
        };

        out.push(DecodedMessage {
            protocol_id: descriptor.id.clone(),
            payload,
            raw: raw.clone(),
            metadata: Metadata {
                bit_length: bit_len,
                rssi,
                clock: None,
                freq_afc,
                extra: Default::default(),
            },
        });
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
            id: "demo-mn".into(),
            name: Some("DemoMN".into()),
            method: None,
            modulation: Some("FSK".into()),
            rfmode: Some("SlowRF".into()),
            clock: None,
            sync: None,
            one: None,
            zero: None,
            float: None,
            start: None,
            preamble: Some("MN#".into()),
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
            regex_match: Some("^AB.*".into()),
        }];
        Catalog::from_raw_descriptors(raw)
    }

    #[test]
    fn decodes_a_passthrough_mn_frame() {
        let catalog = demo_catalog();
        let line = "MN;D=ABCD;";
        let frame = split_frame(line).unwrap();
        let raw = RawFrame::new(line);
        let out = demodulate(&catalog, &frame, "SlowRF", &raw);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, "MN#ABCD");
    }

    #[test]
    fn rejects_mismatched_rfmode() {
        let catalog = demo_catalog();
        let line = "MN;D=ABCD;";
        let frame = split_frame(line).unwrap();
        let raw = RawFrame::new(line);
        assert!(demodulate(&catalog, &frame, "FastRF", &raw).is_empty());
    }

    #[test]
    fn rejects_regex_mismatch() {
        let catalog = demo_catalog();
        let line = "MN;D=FFCD;";
        let frame = split_frame(line).unwrap();
        let raw = RawFrame::new(line);
        assert!(demodulate(&catalog, &frame, "SlowRF", &raw).is_empty());
    }
}
