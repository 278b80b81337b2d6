//! MS (Message-Synced) demodulator (§4.5.1).
//!
//! A protocol is MS-eligible when it defines `sync` and at least one of
//! `one`/`zero`. The `sync` sequence must occur in the raw data string; the
//! message region begins right after it, and exactly one message is
//! emitted per matching protocol.

use crate::catalog::Catalog;
use crate::logging::log_gateway_error;
use crate::split::SplitFrame;
use crate::types::{DecodedMessage, Metadata, RawFrame};

use super::common;

pub fn demodulate(catalog: &Catalog, frame: &SplitFrame, raw: &RawFrame) -> Vec<DecodedMessage> {
    let mut out = Vec::new();

    let Some(data) = frame.get("D") else {
        tracing::debug!("MS frame missing D field");
        return out;
    };
    let Some(cp_raw) = frame.get("CP") else {
        tracing::debug!("MS frame missing CP field");
        return out;
    };
    let Ok(cp_idx) = cp_raw.parse::<u8>() else {
        tracing::debug!("MS frame has malformed CP field: {cp_raw}");
        return out;
    };

    let raw_patterns = common::raw_patterns(frame);
    let Some(&cp_value) = raw_patterns.get(&cp_idx) else {
        tracing::debug!("MS frame's CP index {cp_idx} has no corresponding pattern");
        return out;
    };
    let clock = cp_value.unsigned_abs() as f64;
    if clock == 0.0 {
        return out;
    }
    let normalized = common::normalize(&raw_patterns, clock);
    let (rssi, freq_afc) = common::rssi_afc(frame, false);

    for id in catalog.keys_with(|p| p.sync.is_some()) {
        let Some(descriptor) = catalog.check(id) else { continue };
        let Some(proto_clock) = descriptor.clock else { continue };
        if (proto_clock - clock).abs() > proto_clock.abs() * 0.30 {
            continue;
        }
        if descriptor.one.is_none() && descriptor.zero.is_none() {
            continue;
        }

        let sync = descriptor.sync.as_ref().unwrap();
        let Some((_, sync_str)) = common::bind_sequence(sync, &normalized, data) else {
            continue;
        };
        let Some(pos) = data.find(&sync_str) else { continue };
        let region = &data[pos + sync_str.len()..];

        let one_bind = descriptor
            .one
            .as_ref()
            .and_then(|values| common::bind_sequence(values, &normalized, region));
        let zero_bind = descriptor
            .zero
            .as_ref()
            .and_then(|values| common::bind_sequence(values, &normalized, region));
        if descriptor.one.is_some() && one_bind.is_none() {
            continue;
        }
        if descriptor.zero.is_some() && zero_bind.is_none() {
            continue;
        }
        let float_bind = descriptor
            .float
            .as_ref()
            .and_then(|values| common::bind_sequence(values, &normalized, region));

        let width = match (&one_bind, &zero_bind) {
            (Some((ids, _)), _) => ids.len(),
            (None, Some((ids, _))) => ids.len(),
            (None, None) => continue,
        };
        let one_str = one_bind.as_ref().map(|(_, s)| s.as_str()).unwrap_or("");
        let zero_str = zero_bind.as_ref().map(|(_, s)| s.as_str()).unwrap_or("");
        let float_str = float_bind.as_ref().map(|(_, s)| s.as_str());

        let (bits, _consumed) = common::walk_bits(region, one_str, zero_str, float_str, width);
        if bits.is_empty() || !descriptor.length_in_range(bits.chars().count()) {
            continue;
        }

        match common::finalize(descriptor, &bits) {
            Ok(payload) => out.push(DecodedMessage {
                protocol_id: descriptor.id.clone(),
                payload,
                raw: raw.clone(),
                metadata: Metadata {
                    bit_length: bits.chars().count(),
                    rssi,
                    clock: Some(clock),
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
        }];
        Catalog::from_raw_descriptors(raw)
    }

    #[test]
    fn decodes_a_well_formed_ms_frame() {
        let catalog = demo_catalog();
        // sync=(1,-31) -> P0=400(id0), P1=-12400(id1); one=(1,-3) -> id0,P2=-1200(id2);
        // zero=(3,-1) -> P3=1200(id3), P4=-400(id4). Message bits "1011" -> "02" "43" "02" "02".
        let line = "MS;P0=400;P1=-12400;P2=-1200;P3=-400;P4=1200;D=0102430202;CP=0;";
        let frame = split_frame(line).unwrap();
        let raw = RawFrame::new(line);
        let out = demodulate(&catalog, &frame, &raw);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].protocol_id, "demo-ms");
        assert_eq!(out[0].payload, "B");
    }

    #[test]
    fn rejects_clock_outside_tolerance() {
        let catalog = demo_catalog();
        let line = "MS;P0=900;P1=-12400;P2=-1200;P3=-400;P4=1200;D=0102430202;CP=0;";
        let frame = split_frame(line).unwrap();
        let raw = RawFrame::new(line);
        assert!(demodulate(&catalog, &frame, &raw).is_empty());
    }
}
