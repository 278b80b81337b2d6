//! MC (Manchester) demodulator (§4.5.3).
//!
//! The device has already decoded the Manchester pulses; the frame's `D`
//! field carries that result as hex, `L` the bit length, `C` the sample
//! clock. The demodulator unpacks `D` into its `L`-bit binary form and
//! dispatches to the protocol's `mcBit2*` method (§9's compile-time
//! registry, not runtime reflection).

use crate::catalog::Catalog;
use crate::logging::log_gateway_error;
use crate::split::SplitFrame;
use crate::types::{DecodedMessage, Metadata, RawFrame};

use super::common;

/// Keys a well-formed MC frame may carry (SPEC_FULL §11); anything else is
/// a malformed frame, dropped rather than partially interpreted.
const PERMITTED_KEYS: &[&str] = &["LL", "LH", "SL", "SH", "D", "C", "L", "R", "F", "M", "MC", "Mc"];

fn hex_to_bits(hex: &str, bit_len: usize) -> Option<String> {
    let mut bits = String::with_capacity(hex.len() * 4);
    for c in hex.chars() {
        let v = c.to_digit(16)?;
        for i in (0..4).rev() {
            bits.push(if (v >> i) & 1 == 1 { '1' } else { '0' });
        }
    }
    if bits.len() < bit_len {
        return None;
    }
    Some(bits.chars().take(bit_len).collect())
}

pub fn demodulate(catalog: &Catalog, frame: &SplitFrame, raw: &RawFrame) -> Vec<DecodedMessage> {
    let mut out = Vec::new();

    for key in frame.fields.keys() {
        if !PERMITTED_KEYS.contains(&key.as_str()) {
            tracing::debug!("MC frame has unrecognized key {key}");
            return out;
        }
    }
    let (Some(hex), Some(c_raw), Some(l_raw)) = (frame.get("D"), frame.get("C"), frame.get("L")) else {
        tracing::debug!("MC frame missing required D/C/L fields");
        return out;
    };
    let Ok(bit_len) = l_raw.parse::<usize>() else {
        tracing::debug!("MC frame has malformed L field: {l_raw}");
        return out;
    };
    let clock = c_raw.parse::<f64>().ok();
    let Some(bits) = hex_to_bits(hex, bit_len) else {
        tracing::debug!("MC frame's D field too short for declared L={bit_len}");
        return out;
    };

    let (rssi, freq_afc) = common::rssi_afc(frame, false);

    for id in catalog.keys_with(|p| p.method.is_some() && p.modulation.is_none()) {
        let Some(descriptor) = catalog.check(id) else { continue };
        if !descriptor.length_in_range(bit_len) {
            continue;
        }
        let Some(kind) = catalog.resolve_method(id) else {
            tracing::error!("MC protocol {id} names an unresolvable method");
            continue;
        };
        match crate::registry::apply(kind, &bits) {
            Ok(payload) => out.push(DecodedMessage {
                protocol_id: descriptor.id.clone(),
                payload,
                raw: raw.clone(),
                metadata: Metadata {
                    bit_length: bit_len,
                    rssi,
                    clock,
                    freq_afc,
                    extra: Default::default(),
                },
            }),
            Err(e) => log_gateway_error(&e),
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
            id: "demo-mc".into(),
            name: Some("DemoMC".into()),
            method: Some("mcBit2Generic".into()),
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
            length_min: Some(8),
            length_max: Some(16),
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
    fn decodes_a_generic_mc_frame() {
        let catalog = demo_catalog();
        let line = "MC;D=AB;C=10;L=8;";
        let frame = split_frame(line).unwrap();
        let raw = RawFrame::new(line);
        let out = demodulate(&catalog, &frame, &raw);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, "AB");
    }

    #[test]
    fn rejects_length_outside_bounds() {
        let catalog = demo_catalog();
        let line = "MC;D=A;C=10;L=4;";
        let frame = split_frame(line).unwrap();
        let raw = RawFrame::new(line);
        assert!(demodulate(&catalog, &frame, &raw).is_empty());
    }
}
