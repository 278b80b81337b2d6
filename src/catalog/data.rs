//! Bundled representative protocol catalog.
//!
//! This is a representative slice of the full catalog (real installs carry
//! on the order of 150 entries), sized to exercise every demodulator and
//! every converter in `src/convert/`. A real deployment is expected to
//! supply its own catalog file via `Config::catalog_path` and merge it over
//! this one.

pub const BUNDLED_CATALOG_JSON: &str = r#"
{
  "protocols": {
    "0": {
      "name": "GenericMS",
      "clock": 400.0,
      "sync": [1.0, -31.0],
      "one": [1.0, -3.0],
      "zero": [3.0, -1.0],
      "length_min": 4,
      "length_max": 64,
      "paddingbits": 4
    },
    "1": {
      "name": "GenericMU",
      "clock": 300.0,
      "start": [1.0, -10.0],
      "one": [2.0, -1.0],
      "zero": [1.0, -2.0],
      "length_min": 4,
      "length_max": 64,
      "paddingbits": 4
    },
    "41": {
      "name": "EM",
      "clock": 400.0,
      "sync": [1.0, -18.0],
      "one": [1.0, -3.0],
      "zero": [3.0, -1.0],
      "length_min": 86,
      "length_max": 92,
      "paddingbits": 1,
      "post_demodulation": "postDemo_EM"
    },
    "42": {
      "name": "FS20",
      "clock": 200.0,
      "sync": [1.0, -10.0],
      "one": [1.0, -3.0],
      "zero": [1.0, -1.0],
      "length_min": 44,
      "length_max": 56,
      "paddingbits": 1,
      "post_demodulation": "postDemo_FS20"
    },
    "43": {
      "name": "FHT80",
      "clock": 200.0,
      "sync": [1.0, -10.0],
      "one": [1.0, -3.0],
      "zero": [1.0, -1.0],
      "length_min": 52,
      "length_max": 56,
      "paddingbits": 1,
      "post_demodulation": "postDemo_FHT80"
    },
    "44": {
      "name": "FHT80TF",
      "clock": 200.0,
      "sync": [1.0, -10.0],
      "one": [1.0, -3.0],
      "zero": [1.0, -1.0],
      "length_min": 26,
      "length_max": 29,
      "paddingbits": 1,
      "post_demodulation": "postDemo_FHT80TF"
    },
    "55": {
      "name": "Revolt",
      "clock": 70.0,
      "sync": [1.0, -20.0],
      "one": [1.0, -2.0],
      "zero": [1.0, -1.0],
      "length_min": 94,
      "length_max": 98,
      "paddingbits": 1,
      "post_demodulation": "postDemo_Revolt"
    },
    "119": {
      "name": "Funkbus",
      "method": "mcBit2Funkbus",
      "length_min": 48,
      "length_max": 96
    },
    "120": {
      "name": "SomfyRTS",
      "method": "mcBit2SomfyRTS",
      "length_min": 56,
      "length_max": 57
    },
    "121": {
      "name": "Grothe",
      "method": "mcBit2Grothe",
      "length_min": 32,
      "length_max": 32
    },
    "122": {
      "name": "AS",
      "method": "mcBit2AS",
      "length_min": 20,
      "length_max": 64
    },
    "123": {
      "name": "Sainlogic",
      "method": "mcBit2Sainlogic",
      "length_min": 40,
      "length_max": 128
    },
    "124": {
      "name": "GenericMC",
      "method": "mcBit2Generic",
      "length_min": 8,
      "length_max": 64
    },
    "100": {
      "name": "LaCrosse",
      "modulation": "2-FSK",
      "rfmode": "SlowRF",
      "method": "ConvLaCrosse",
      "length_min": 40,
      "length_max": 40
    },
    "101": {
      "name": "PCA301",
      "modulation": "2-FSK",
      "rfmode": "SlowRF",
      "method": "ConvPCA301",
      "length_min": 96,
      "length_max": 96
    },
    "102": {
      "name": "KoppFreeControl",
      "modulation": "2-FSK",
      "method": "ConvKoppFreeControl",
      "length_min": 16,
      "length_max": 80
    },
    "103": {
      "name": "BresserLightning",
      "modulation": "2-FSK",
      "rfmode": "FastRF",
      "method": "ConvBresser_lightning",
      "length_min": 80,
      "length_max": 200
    },
    "104": {
      "name": "Bresser5in1",
      "modulation": "2-FSK",
      "method": "ConvBresser_5in1",
      "length_min": 208,
      "length_max": 208
    },
    "105": {
      "name": "Bresser6in1",
      "modulation": "2-FSK",
      "method": "ConvBresser_6in1",
      "length_min": 144,
      "length_max": 144
    },
    "106": {
      "name": "Bresser7in1",
      "modulation": "2-FSK",
      "method": "ConvBresser_7in1",
      "length_min": 184,
      "length_max": 184
    },
    "107": {
      "name": "GenericMN",
      "modulation": "2-FSK",
      "length_min": 8,
      "length_max": 512
    }
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogFile;

    #[test]
    fn bundled_json_parses_into_a_catalog_file() {
        let file: CatalogFile = serde_json::from_str(BUNDLED_CATALOG_JSON).unwrap();
        assert!(file.protocols.len() >= 20);
        assert!(file.protocols.contains_key("119"));
        assert!(file.protocols.contains_key("100"));
    }
}
