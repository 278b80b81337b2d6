//! Bresser weather-station converters (5-in-1, 6-in-1, 7-in-1, lightning).
//! Each validates a protocol-specific checksum over a hex payload and
//! returns the relevant slice of that payload.

use crate::error::GatewayError;

use super::crc::{crc16, lfsr_digest16};

fn rejected(msg: impl Into<String>) -> GatewayError {
    GatewayError::ConverterRejected(msg.into())
}

fn xor_nibbles_with(hex_data: &str, mask: u8) -> Result<String, GatewayError> {
    hex_data
        .chars()
        .map(|c| {
            c.to_digit(16)
                .map(|d| format!("{:X}", (d as u8) ^ mask))
                .ok_or_else(|| rejected(format!("invalid hex digit: {c}")))
        })
        .collect()
}

/// Lightning sensor: XOR every nibble with 0xA, then an LFSR-16 digest
/// over bytes 2-9 of the XOR'd hex must, once XOR'd against the first two
/// bytes, equal the fixed constant `0x899E`.
pub fn conv_bresser_lightning(hex_data: &str) -> Result<String, GatewayError> {
    if hex_data.len() < 20 {
        return Err(rejected("Bresser lightning: hex data too short"));
    }

    let xor_a = xor_nibbles_with(hex_data, 0xA)?;
    let checksum = lfsr_digest16(8, 0x8810, 0xABF9, &xor_a[4..20]);
    let first_two_bytes = u32::from_str_radix(&xor_a[0..4], 16).map_err(|_| rejected("bad hex"))?;
    let checksum_calc = checksum as u32 ^ first_two_bytes;

    if checksum_calc != 0x899E {
        return Err(rejected(format!("Bresser lightning: checksum 0x{checksum_calc:04X} != 0x899E")));
    }

    Ok(hex_data[0..20].to_string())
}

/// 5-in-1: bytes 14-25 must be the bitwise inverse of bytes 1-13, and the
/// popcount of inverted bytes 1-12 must equal inverted byte 0 (used as a
/// checksum). Payload is bytes 14-25.
pub fn conv_bresser_5in1(hex_data: &str) -> Result<String, GatewayError> {
    if hex_data.len() < 52 {
        return Err(rejected("Bresser 5in1: hex data too short"));
    }

    let mut bit_add: u32 = 0;
    let mut bitsum_ref: u32 = 0;
    for i in 0..13 {
        let byte = u8::from_str_radix(&hex_data[i * 2..i * 2 + 2], 16).map_err(|_| rejected("bad hex"))?;
        let inverted = u8::from_str_radix(&hex_data[(i + 13) * 2..(i + 13) * 2 + 2], 16)
            .map_err(|_| rejected("bad hex"))?;

        if byte ^ inverted != 0xFF {
            return Err(rejected(format!("Bresser 5in1: inverted data check failed at byte {i}")));
        }

        if i == 0 {
            bitsum_ref = inverted as u32;
        } else {
            bit_add += inverted.count_ones();
        }
    }

    if bit_add != bitsum_ref {
        return Err(rejected(format!("Bresser 5in1: checksum {bit_add} != {bitsum_ref}")));
    }

    Ok(hex_data[28..52].to_string())
}

/// 6-in-1: CRC-16/CCITT-FALSE (poly 0x1021, init 0) over bytes 2-17 must
/// equal bytes 0-1, and the sum of bytes 2-17 mod 256 must equal 0xFF.
pub fn conv_bresser_6in1(hex_data: &str) -> Result<String, GatewayError> {
    if hex_data.len() < 36 {
        return Err(rejected("Bresser 6in1: hex data too short"));
    }

    let crc_data = &hex_data[4..34];
    let checksum = hex_data[0..4].to_ascii_uppercase();
    let calc_crc = crc16(crc_data, 0x1021, 0x0000).ok_or_else(|| rejected("bad hex"))?;

    if calc_crc != checksum {
        return Err(rejected(format!("Bresser 6in1: CRC 0x{calc_crc} != 0x{checksum}")));
    }

    let mut sum_val: u32 = 0;
    for i in 2..18 {
        sum_val += u32::from_str_radix(&hex_data[i * 2..i * 2 + 2], 16).map_err(|_| rejected("bad hex"))?;
    }
    sum_val &= 0xFF;
    if sum_val != 0xFF {
        return Err(rejected(format!("Bresser 6in1: sum {sum_val} != 255")));
    }

    Ok(hex_data.to_string())
}

/// 7-in-1: byte 21 must be non-zero, then the same XOR-0xA / LFSR-16
/// scheme as lightning but with key `0xBA95` and a `0x6DF1` target.
pub fn conv_bresser_7in1(hex_data: &str) -> Result<String, GatewayError> {
    if hex_data.len() < 46 {
        return Err(rejected("Bresser 7in1: hex data too short"));
    }
    if &hex_data[42..44] == "00" {
        return Err(rejected("Bresser 7in1: byte 21 is 0x00"));
    }

    let xor_a = xor_nibbles_with(hex_data, 0xA)?;
    let checksum = lfsr_digest16(21, 0x8810, 0xBA95, &xor_a[4..46]);
    let first_two_bytes = u32::from_str_radix(&xor_a[0..4], 16).map_err(|_| rejected("bad hex"))?;
    let checksum_calc = checksum as u32 ^ first_two_bytes;

    if checksum_calc != 0x6DF1 {
        return Err(rejected(format!("Bresser 7in1: checksum 0x{checksum_calc:04X} != 0x6DF1")));
    }

    Ok(xor_a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_lightning_payload() {
        assert!(conv_bresser_lightning("AA").is_err());
    }

    #[test]
    fn rejects_5in1_without_matching_inversion() {
        let hex = "0".repeat(52);
        assert!(conv_bresser_5in1(&hex).is_err());
    }

    #[test]
    fn rejects_7in1_with_zero_byte_21() {
        let mut hex = "1".repeat(92);
        hex.replace_range(42..44, "00");
        assert!(conv_bresser_7in1(&hex).is_err());
    }
}
