//! Protocol Catalog: a two-stage immutable load of protocol descriptors.
//!
//! Stage one (`RawDescriptor`) is whatever the JSON on disk happens to
//! contain — optional fields, no defaults applied, not yet safe to dispatch
//! on. Stage two (`ProtocolDescriptor`) is produced once, at load time, by
//! applying defaults and basic shape checks; from then on the catalog is
//! read-only. This replaces mutating a shared protocol dict in place after
//! construction, which made "has `set_defaults` already run" an
//! order-of-operations question callers had to track.

pub mod data;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk shape of the catalog file (§6): a JSON object keyed by protocol
/// ID, mapping to that protocol's attributes. The ID itself lives in the
/// map key, not inside the attribute object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogFile {
    pub protocols: BTreeMap<String, RawDescriptor>,
}

/// On-disk shape of one protocol entry's attributes, before defaults are
/// applied. `id` is filled in from the enclosing `CatalogFile` map key, not
/// deserialized from the attribute object itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawDescriptor {
    #[serde(skip, default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub modulation: Option<String>,
    #[serde(default)]
    pub rfmode: Option<String>,
    #[serde(default)]
    pub clock: Option<f64>,
    #[serde(default)]
    pub sync: Option<Vec<f64>>,
    #[serde(default)]
    pub one: Option<Vec<f64>>,
    #[serde(default)]
    pub zero: Option<Vec<f64>>,
    #[serde(default)]
    pub float: Option<Vec<f64>>,
    #[serde(default)]
    pub start: Option<Vec<f64>>,
    #[serde(default)]
    pub preamble: Option<String>,
    #[serde(default)]
    pub postamble: Option<String>,
    #[serde(default)]
    pub length_min: Option<usize>,
    #[serde(default)]
    pub length_max: Option<usize>,
    #[serde(default)]
    pub paddingbits: Option<usize>,
    #[serde(default)]
    pub bit_length: Option<usize>,
    #[serde(default)]
    pub modulematch: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    /// Symbolic name of an MS/MU-level post-demodulation function (§4.6),
    /// distinct from `method` which names an MC/MN-level converter.
    #[serde(default)]
    pub post_demodulation: Option<String>,
    /// If true, the final payload is a binary string rather than hex.
    #[serde(default)]
    pub dispatch_bin: Option<bool>,
    /// Strip leading `0` nibbles from a hex payload.
    #[serde(default)]
    pub remove_zero: Option<bool>,
    /// Allow a final partial chunk of the data string to match by prefix.
    #[serde(default)]
    pub reconstruct_bit: Option<bool>,
    /// Regex an MN payload's raw hex must match before `method` runs.
    #[serde(default)]
    pub regex_match: Option<String>,
}

/// A checked, defaulted descriptor. Once built, every field a demodulator
/// needs either has its author-supplied value or an explicit default — no
/// downstream code needs to ask "did `set_defaults` run yet".
#[derive(Debug, Clone)]
pub struct ProtocolDescriptor {
    pub id: String,
    pub name: String,
    pub method: Option<String>,
    pub modulation: Option<String>,
    pub rfmode: Option<String>,
    pub clock: Option<f64>,
    pub sync: Option<Vec<f64>>,
    pub one: Option<Vec<f64>>,
    pub zero: Option<Vec<f64>>,
    pub float: Option<Vec<f64>>,
    pub start: Option<Vec<f64>>,
    pub preamble: Option<String>,
    pub postamble: Option<String>,
    pub length_min: Option<usize>,
    pub length_max: Option<usize>,
    pub paddingbits: Option<usize>,
    pub bit_length: Option<usize>,
    pub modulematch: Option<String>,
    pub active: bool,
    pub post_demodulation: Option<String>,
    pub dispatch_bin: bool,
    pub remove_zero: bool,
    pub reconstruct_bit: bool,
    pub regex_match: Option<String>,
}

impl ProtocolDescriptor {
    /// `paddingbits` with its spec-mandated default of 4.
    pub fn padding_bits(&self) -> usize {
        self.paddingbits.unwrap_or(4).max(1)
    }

    /// Whether a candidate's raw bit length satisfies this descriptor's
    /// `length_min`/`length_max` bounds (either bound absent = unbounded).
    pub fn length_in_range(&self, len: usize) -> bool {
        if let Some(min) = self.length_min {
            if len < min {
                return false;
            }
        }
        if let Some(max) = self.length_max {
            if len > max {
                return false;
            }
        }
        true
    }
}

impl From<RawDescriptor> for ProtocolDescriptor {
    fn from(raw: RawDescriptor) -> Self {
        let name = raw.name.unwrap_or_else(|| format!("Protocol_{}", raw.id));
        ProtocolDescriptor {
            id: raw.id,
            name,
            method: raw.method,
            modulation: raw.modulation,
            rfmode: raw.rfmode,
            clock: raw.clock,
            sync: raw.sync,
            one: raw.one,
            zero: raw.zero,
            float: raw.float,
            start: raw.start,
            preamble: raw.preamble,
            postamble: raw.postamble,
            length_min: raw.length_min,
            length_max: raw.length_max,
            paddingbits: raw.paddingbits,
            bit_length: raw.bit_length,
            modulematch: raw.modulematch,
            active: raw.active.unwrap_or(true),
            post_demodulation: raw.post_demodulation,
            dispatch_bin: raw.dispatch_bin.unwrap_or(false),
            remove_zero: raw.remove_zero.unwrap_or(false),
            reconstruct_bit: raw.reconstruct_bit.unwrap_or(false),
            regex_match: raw.regex_match,
        }
    }
}

/// The loaded, immutable protocol catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    protocols: BTreeMap<String, ProtocolDescriptor>,
}

impl Catalog {
    /// Derive a catalog directly from already-parsed raw descriptors,
    /// applying the two-stage defaulting step. Used by callers that build
    /// descriptors programmatically (tests, or a non-file catalog source).
    pub fn from_raw_descriptors(raw_entries: Vec<RawDescriptor>) -> Self {
        let protocols = raw_entries
            .into_iter()
            .map(|raw| (raw.id.clone(), ProtocolDescriptor::from(raw)))
            .collect();
        Catalog { protocols }
    }

    /// Turn a parsed `CatalogFile`'s map (keyed by protocol ID) into the
    /// flat `Vec<RawDescriptor>` `from_raw_descriptors` expects, stamping
    /// each entry's `id` from its map key.
    fn raw_entries_from_file(file: CatalogFile) -> Vec<RawDescriptor> {
        file.protocols
            .into_iter()
            .map(|(id, mut raw)| {
                raw.id = id;
                raw
            })
            .collect()
    }

    /// Load the bundled representative catalog (see `catalog::data`).
    pub fn bundled() -> Self {
        let file: CatalogFile =
            serde_json::from_str(data::BUNDLED_CATALOG_JSON).expect("bundled catalog is valid JSON");
        Self::from_raw_descriptors(Self::raw_entries_from_file(file))
    }

    /// Load a catalog from a JSON file on disk (§6: `{"protocols": {"<id>":
    /// {...}}}`), falling back to nothing on a missing file (callers
    /// typically merge this with `bundled()`).
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog file {}", path.display()))?;
        let file: CatalogFile = serde_json::from_str(&text)
            .with_context(|| format!("parsing catalog file {}", path.display()))?;
        Ok(Self::from_raw_descriptors(Self::raw_entries_from_file(file)))
    }

    /// Load a catalog from a TOML file on disk, same `{protocols.<id>}`
    /// shape as the JSON form. Catalog authors who prefer TOML's more
    /// readable table syntax for hand-maintained site overrides can use
    /// this instead of `from_json_file`.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog file {}", path.display()))?;
        let file: CatalogFile =
            toml::from_str(&text).with_context(|| format!("parsing catalog file {}", path.display()))?;
        Ok(Self::from_raw_descriptors(Self::raw_entries_from_file(file)))
    }

    pub fn exists(&self, id: &str) -> bool {
        self.protocols.contains_key(id)
    }

    /// Alias for `exists`, matching the reference port's `protocol_exists`.
    pub fn protocol_exists(&self, id: &str) -> bool {
        self.exists(id)
    }

    pub fn get(&self, id: &str) -> Option<&ProtocolDescriptor> {
        self.protocols.get(id)
    }

    /// Returns `Some` only for an active, present protocol.
    pub fn check(&self, id: &str) -> Option<&ProtocolDescriptor> {
        self.get(id).filter(|p| p.active)
    }

    /// Read one attribute off a protocol via an accessor closure, falling
    /// back to `default` if the protocol is absent. Mirrors the reference
    /// port's `get_property`/`check_property` pair collapsed onto one typed
    /// accessor (`get`/`check` already supply the "present at all" half).
    pub fn get_property<T>(&self, id: &str, accessor: impl FnOnce(&ProtocolDescriptor) -> Option<T>, default: T) -> T {
        self.get(id).and_then(accessor).unwrap_or(default)
    }

    /// Same as `get_property` but only considers active protocols.
    pub fn check_property<T>(&self, id: &str, accessor: impl FnOnce(&ProtocolDescriptor) -> Option<T>, default: T) -> T {
        self.check(id).and_then(accessor).unwrap_or(default)
    }

    /// IDs whose descriptor has `filter_key` set to something other than
    /// its absence — used by demodulators to restrict a scan to protocols
    /// that define, say, `sync`.
    pub fn keys_with(&self, mut has_field: impl FnMut(&ProtocolDescriptor) -> bool) -> Vec<&str> {
        self.protocols
            .values()
            .filter(|p| has_field(p))
            .map(|p| p.id.as_str())
            .collect()
    }

    /// Resolve the symbolic method name on a descriptor against the
    /// compile-time registry, returning `None` if either is absent.
    pub fn resolve_method(&self, id: &str) -> Option<crate::registry::ConverterFn> {
        let descriptor = self.get(id)?;
        let name = descriptor.method.as_deref()?;
        crate::registry::resolve_method(name)
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// Overlay `other`'s entries on top of this catalog, by id. Used to
    /// layer a site-specific catalog file over the bundled one.
    pub fn merge(mut self, other: Catalog) -> Self {
        self.protocols.extend(other.protocols);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_loads_and_defaults_are_applied() {
        let cat = Catalog::bundled();
        assert!(!cat.is_empty());
        for id in cat.protocols.keys() {
            let p = cat.get(id).unwrap();
            assert!(!p.name.is_empty());
        }
    }

    #[test]
    fn check_filters_inactive_protocols() {
        let cat = Catalog::bundled();
        assert!(cat.check("does-not-exist").is_none());
    }

    #[test]
    fn catalog_file_parses_from_toml_too() {
        let toml_text = r#"
            [protocols."200"]
            name = "ToyProtocol"
            clock = 100.0
            length_min = 4
            length_max = 8
        "#;
        let file: CatalogFile = toml::from_str(toml_text).unwrap();
        assert!(file.protocols.contains_key("200"));
        assert_eq!(file.protocols["200"].name.as_deref(), Some("ToyProtocol"));
    }
}
