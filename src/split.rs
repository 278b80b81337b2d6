//! Frame Splitter: turns a decompressed `Key=Value;...` line into a typed
//! field map, rejecting anything that doesn't look like a well-formed
//! SIGNALduino-class frame.
//!
//! Keys are 1-2 uppercase letters, values are `[-+]?[0-9A-Fa-f]+`, and the
//! only token allowed without an `=` is the message-type marker itself
//! (`MS`/`MU`/`MC`/`MN`, any case, plus the legacy `MO` alias for `MS`).

use std::collections::BTreeMap;

use crate::error::GatewayError;

#[derive(Debug, Clone)]
pub struct SplitFrame {
    /// Normalized message type: `MS`, `MU`, `MC`, or `MN` (never `MO`).
    pub message_type: String,
    pub fields: BTreeMap<String, String>,
}

impl SplitFrame {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

pub fn split_frame(line: &str) -> Result<SplitFrame, GatewayError> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    let mut msg_type_token: Option<String> = None;

    for part in line.split(';') {
        if part.is_empty() {
            continue;
        }

        if let Some(eq) = part.find('=') {
            let key = &part[..eq];
            let value = &part[eq + 1..];

            if !is_valid_key(key) {
                return Err(GatewayError::Parse(format!("invalid key: {key}")));
            }
            if !is_valid_value(value) {
                return Err(GatewayError::Parse(format!("invalid value: {value}")));
            }
            if fields.contains_key(key) {
                return Err(GatewayError::Parse(format!("duplicate key: {key}")));
            }
            fields.insert(key.to_string(), value.to_string());
        } else {
            if fields.contains_key(part) {
                return Err(GatewayError::Parse(format!("duplicate key: {part}")));
            }
            match &msg_type_token {
                None => msg_type_token = Some(part.to_string()),
                Some(t) if part.eq_ignore_ascii_case(t) => {}
                Some(_) => {
                    return Err(GatewayError::Parse(format!("stray token: {part}")));
                }
            }
            fields.insert(part.to_string(), String::new());
        }
    }

    let token = msg_type_token.ok_or_else(|| GatewayError::Parse("missing message type".into()))?;
    let message_type = normalize_message_type(&token)?;

    Ok(SplitFrame { message_type, fields })
}

fn is_valid_key(key: &str) -> bool {
    let len = key.chars().count();
    (1..=2).contains(&len) && key.chars().all(|c| c.is_ascii_uppercase())
}

fn is_valid_value(value: &str) -> bool {
    let body = value.strip_prefix(['+', '-']).unwrap_or(value);
    !body.is_empty() && body.chars().all(|c| c.is_ascii_hexdigit())
}

fn normalize_message_type(token: &str) -> Result<String, GatewayError> {
    match token.to_ascii_uppercase().as_str() {
        t @ ("MS" | "MU" | "MC" | "MN") => Ok(t.to_string()),
        "MO" => Ok("MS".to_string()),
        other => Err(GatewayError::Parse(format!("unknown message type: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_a_well_formed_ms_frame() {
        let frame = split_frame("MS;P0=-392;P1=400;D=0101;CP=0;").unwrap();
        assert_eq!(frame.message_type, "MS");
        assert_eq!(frame.get("P0"), Some("-392"));
        assert_eq!(frame.get("D"), Some("0101"));
    }

    #[test]
    fn mo_aliases_to_ms() {
        let frame = split_frame("MO;D=AA;").unwrap();
        assert_eq!(frame.message_type, "MS");
    }

    #[test]
    fn mc_accepts_its_own_literal_repeat() {
        let frame = split_frame("MC;D=AA;C=10;L=8;Mc;").unwrap();
        assert_eq!(frame.message_type, "MC");
    }

    #[test]
    fn rejects_duplicate_keys() {
        assert!(split_frame("MS;D=AA;D=BB;").is_err());
    }

    #[test]
    fn rejects_stray_tokens() {
        assert!(split_frame("MS;D=AA;garbage;").is_err());
    }

    #[test]
    fn rejects_lowercase_keys() {
        assert!(split_frame("MS;d=AA;").is_err());
    }

    #[test]
    fn rejects_non_hex_values() {
        assert!(split_frame("MS;D=ZZ;").is_err());
    }
}
