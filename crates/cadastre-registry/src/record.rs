//! Deed record storage

use cadastre_core::{
    reserved, AccountId, AssetType, RecordId, TraitKey, TraitValue, UnitId,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One deed record: the tokenized representation of a real-world asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeedRecord {
    /// Record identity. Monotonic, never reused.
    pub id: RecordId,
    /// Current holder.
    pub owner: AccountId,
    /// Asset type, immutable after creation.
    pub asset_type: AssetType,
    /// Assigned validator unit.
    pub validator: UnitId,
    /// Whether the record currently satisfies its validator's criteria as
    /// of the last write.
    pub is_validated: bool,
    /// Identity that performed the last validation assertion.
    pub asserted_by: Option<AccountId>,
    /// Display URI.
    pub metadata_uri: String,
    /// Dynamic traits; enumeration order is insertion order.
    pub traits: IndexMap<TraitKey, TraitValue>,
}

impl DeedRecord {
    /// Read a trait value.
    pub fn trait_value(&self, key: TraitKey) -> Option<&TraitValue> {
        self.traits.get(&key)
    }

    /// Active trait keys in enumeration order.
    pub fn trait_keys(&self) -> impl Iterator<Item = TraitKey> + '_ {
        self.traits.keys().copied()
    }

    /// Set the validation flag, keeping the mirror trait in sync.
    pub(crate) fn set_validated(&mut self, valid: bool, asserter: Option<AccountId>) {
        self.is_validated = valid;
        self.asserted_by = asserter;
        self.traits
            .insert(*reserved::IS_VALIDATED, TraitValue::boolean(valid));
    }
}

/// Parameters for creating one record.
///
/// This is the single canonical mint shape; the payment token rides on the
/// settlement call, not in here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    /// Identity originating the mint (fee payer on the settlement path).
    pub minter: AccountId,
    /// Initial owner of the record.
    pub owner: AccountId,
    /// Asset type, fixed for the record's lifetime.
    pub asset_type: AssetType,
    /// Display URI.
    pub metadata_uri: String,
    /// Operating agreement URI; must be non-empty.
    pub operating_agreement: String,
    /// Free-form asset definition.
    pub definition: String,
    /// Free-form asset configuration.
    pub configuration: String,
    /// Explicit validator assignment; falls back to the registry default.
    pub validator: Option<UnitId>,
    /// Correlation salt echoed on the minted event.
    pub salt: u64,
}

impl MintRequest {
    /// A request with sane defaults: the minter keeps the record, a
    /// placeholder agreement, no explicit validator, zero salt.
    pub fn new(minter: AccountId, asset_type: AssetType) -> Self {
        Self {
            minter,
            owner: minter,
            asset_type,
            metadata_uri: String::new(),
            operating_agreement: "agreement://default".to_string(),
            definition: String::new(),
            configuration: String::new(),
            validator: None,
            salt: 0,
        }
    }

    /// Mint to a different owner.
    pub fn with_owner(mut self, owner: AccountId) -> Self {
        self.owner = owner;
        self
    }

    /// Assign an explicit validator.
    pub fn with_validator(mut self, validator: UnitId) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Set the operating agreement URI.
    pub fn with_operating_agreement(mut self, uri: impl Into<String>) -> Self {
        self.operating_agreement = uri.into();
        self
    }

    /// Set the definition payload.
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    /// Set the display URI.
    pub fn with_metadata_uri(mut self, uri: impl Into<String>) -> Self {
        self.metadata_uri = uri.into();
        self
    }

    /// Set the correlation salt.
    pub fn with_salt(mut self, salt: u64) -> Self {
        self.salt = salt;
        self
    }
}
