//! Dynamic trait storage primitives
//!
//! A record carries an open mapping from trait key to a tagged byte
//! payload. Keys are derived deterministically from the trait name, so
//! independent writers agree on where a named attribute lives without a
//! shared name table. Per-record enumeration order is insertion order;
//! the registry stores traits in an `IndexMap` so removal purges both the
//! value and its place in the enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable 32-byte key for one named trait, derived as `blake3(name)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraitKey([u8; 32]);

impl TraitKey {
    /// Derive the key for a trait name.
    pub fn named(name: &str) -> Self {
        Self(*blake3::hash(name.as_bytes()).as_bytes())
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TraitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trait-{}", hex::encode(&self.0[..8]))
    }
}

/// Reserved trait keys with fixed, protocol-level meaning.
pub mod reserved {
    use super::TraitKey;
    use once_cell::sync::Lazy;

    /// Asset type of the record, as its stable string form.
    pub static ASSET_TYPE: Lazy<TraitKey> = Lazy::new(|| TraitKey::named("assetType"));
    /// Current validation flag, mirrored for enumeration.
    pub static IS_VALIDATED: Lazy<TraitKey> = Lazy::new(|| TraitKey::named("isValidated"));
    /// Operating agreement URI.
    pub static OPERATING_AGREEMENT: Lazy<TraitKey> =
        Lazy::new(|| TraitKey::named("operatingAgreement"));
    /// Free-form asset definition.
    pub static DEFINITION: Lazy<TraitKey> = Lazy::new(|| TraitKey::named("definition"));
    /// Free-form asset configuration.
    pub static CONFIGURATION: Lazy<TraitKey> = Lazy::new(|| TraitKey::named("configuration"));
    /// Assigned validator unit, as its display form.
    pub static VALIDATOR: Lazy<TraitKey> = Lazy::new(|| TraitKey::named("validator"));
}

/// Tag describing how a trait payload should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraitKind {
    /// Opaque bytes.
    Bytes,
    /// UTF-8 string.
    Utf8,
    /// Big-endian unsigned integer, up to 128 bits.
    Uint,
    /// Single byte, zero or one.
    Bool,
    /// A 16-byte identifier payload.
    Id,
}

/// One stored trait: a kind tag plus the opaque payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitValue {
    /// Decode tag.
    pub kind: TraitKind,
    /// Payload bytes.
    pub data: Vec<u8>,
}

impl TraitValue {
    /// Opaque byte payload.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: TraitKind::Bytes,
            data: data.into(),
        }
    }

    /// UTF-8 string payload.
    pub fn utf8(value: impl AsRef<str>) -> Self {
        Self {
            kind: TraitKind::Utf8,
            data: value.as_ref().as_bytes().to_vec(),
        }
    }

    /// Unsigned integer payload, big-endian.
    pub fn uint(value: u128) -> Self {
        Self {
            kind: TraitKind::Uint,
            data: value.to_be_bytes().to_vec(),
        }
    }

    /// Boolean payload.
    pub fn boolean(value: bool) -> Self {
        Self {
            kind: TraitKind::Bool,
            data: vec![u8::from(value)],
        }
    }

    /// Identifier payload from raw UUID bytes.
    pub fn id(value: uuid::Uuid) -> Self {
        Self {
            kind: TraitKind::Id,
            data: value.as_bytes().to_vec(),
        }
    }

    /// Decode as UTF-8, if tagged and valid.
    pub fn as_utf8(&self) -> Option<&str> {
        match self.kind {
            TraitKind::Utf8 => std::str::from_utf8(&self.data).ok(),
            _ => None,
        }
    }

    /// Decode as an unsigned integer, if tagged and sized correctly.
    pub fn as_uint(&self) -> Option<u128> {
        match self.kind {
            TraitKind::Uint => {
                let bytes: [u8; 16] = self.data.as_slice().try_into().ok()?;
                Some(u128::from_be_bytes(bytes))
            }
            _ => None,
        }
    }

    /// Decode as a boolean, if tagged.
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            TraitKind::Bool => self.data.first().map(|b| *b != 0),
            _ => None,
        }
    }

    /// Whether the payload is empty. Required traits must be non-empty to
    /// satisfy validation criteria.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
