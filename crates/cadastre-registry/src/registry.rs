//! Registry state and operations

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::record::{DeedRecord, MintRequest};
use crate::renderer::RecordRenderer;
use cadastre_core::{
    reserved, AccountId, AssignmentView, CommissionView, DirectoryView, RecordId, RegistryId,
    RoleTable, RoyaltyView, TraitKey, TraitValue, UnitId, ValidationPolicyView,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Roles on the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryRole {
    /// May administer pause, URIs, allow-lists, role grants.
    Admin,
    /// May create records directly (fee-less path).
    Minter,
}

/// Who is performing a record write. Determines whether the write
/// disturbs the validation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteAuthority {
    Owner,
    AssignedValidator,
}

/// The deed ledger.
#[derive(Debug)]
pub struct AssetRegistry {
    records: BTreeMap<RecordId, DeedRecord>,
    next_id: u64,
    roles: RoleTable<RegistryRole>,
    /// Settlement ledger identity allowed to drive fee-bearing mints.
    settlement: Option<AccountId>,
    record_approvals: HashMap<RecordId, AccountId>,
    operator_approvals: HashSet<(AccountId, AccountId)>,
    approved_marketplaces: HashSet<AccountId>,
    royalty_enforced: bool,
    paused: bool,
    contract_uri: String,
    renderer: Option<Box<dyn RecordRenderer>>,
    default_validator: Option<UnitId>,
    compatible_registries: HashSet<RegistryId>,
    assignments: HashMap<UnitId, u64>,
    events: Vec<RegistryEvent>,
}

impl AssetRegistry {
    /// Create a registry administered by `admin`.
    pub fn new(admin: AccountId, contract_uri: impl Into<String>) -> Self {
        let mut roles = RoleTable::new();
        roles.grant(RegistryRole::Admin, admin);
        Self {
            records: BTreeMap::new(),
            next_id: 1,
            roles,
            settlement: None,
            record_approvals: HashMap::new(),
            operator_approvals: HashSet::new(),
            approved_marketplaces: HashSet::new(),
            royalty_enforced: false,
            paused: false,
            contract_uri: contract_uri.into(),
            renderer: None,
            default_validator: None,
            compatible_registries: HashSet::new(),
            assignments: HashMap::new(),
            events: Vec::new(),
        }
    }

    // ---- Role and wiring administration ----

    /// Grant a registry role.
    pub fn grant_role(
        &mut self,
        caller: AccountId,
        role: RegistryRole,
        account: AccountId,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        self.roles.grant(role, account);
        Ok(())
    }

    /// Revoke a registry role.
    pub fn revoke_role(
        &mut self,
        caller: AccountId,
        role: RegistryRole,
        account: AccountId,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        self.roles.revoke(role, account);
        Ok(())
    }

    /// Attach (or detach) the settlement ledger identity authorized to
    /// drive fee-bearing mints.
    pub fn set_settlement(
        &mut self,
        caller: AccountId,
        settlement: Option<AccountId>,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        self.settlement = settlement;
        Ok(())
    }

    /// The attached settlement ledger identity, if any.
    pub fn settlement(&self) -> Option<AccountId> {
        self.settlement
    }

    // ---- Minting ----

    /// Create a record.
    ///
    /// The caller must hold the minter role or be the attached settlement
    /// ledger. The assigned validator (explicit or default) must be
    /// registered, active, and support the asset type. The initial
    /// validation flag is true only for validator self-mints and for units
    /// whose criteria are vacuously satisfied for the asset type.
    pub fn mint(
        &mut self,
        caller: AccountId,
        request: MintRequest,
        directory: &impl DirectoryView,
        policy: &impl ValidationPolicyView,
    ) -> Result<RecordId, RegistryError> {
        if self.paused {
            return Err(RegistryError::Paused);
        }
        if !self.roles.has(RegistryRole::Minter, caller) && Some(caller) != self.settlement {
            return Err(RegistryError::NotMinter(caller));
        }
        if request.owner.is_nil() {
            return Err(RegistryError::NilRecipient);
        }
        if request.operating_agreement.is_empty() {
            return Err(RegistryError::EmptyOperatingAgreement);
        }

        let unit = request
            .validator
            .or(self.default_validator)
            .ok_or(RegistryError::NoValidator)?;
        if !directory.is_registered(unit) {
            return Err(RegistryError::ValidatorNotRegistered(unit));
        }
        if !directory.is_active(unit) {
            return Err(RegistryError::ValidatorNotActive(unit));
        }
        if !directory.supports(unit, request.asset_type) {
            return Err(RegistryError::UnsupportedAssetType {
                unit,
                asset_type: request.asset_type,
            });
        }

        // Trusted-at-mint only for validator-originated creation, or when
        // the unit's criteria cannot be violated by any trait set.
        let initially_valid = policy.is_unit_validator(unit, request.minter)
            || policy.vacuously_satisfied(unit, request.asset_type);

        let id = RecordId::from_raw(self.next_id);
        self.next_id += 1;

        let mut record = DeedRecord {
            id,
            owner: request.owner,
            asset_type: request.asset_type,
            validator: unit,
            is_validated: false,
            asserted_by: None,
            metadata_uri: request.metadata_uri.clone(),
            traits: indexmap::IndexMap::new(),
        };
        record.traits.insert(
            *reserved::ASSET_TYPE,
            TraitValue::utf8(request.asset_type.as_str()),
        );
        record
            .traits
            .insert(*reserved::IS_VALIDATED, TraitValue::boolean(false));
        record.traits.insert(
            *reserved::OPERATING_AGREEMENT,
            TraitValue::utf8(&request.operating_agreement),
        );
        record
            .traits
            .insert(*reserved::DEFINITION, TraitValue::utf8(&request.definition));
        record.traits.insert(
            *reserved::CONFIGURATION,
            TraitValue::utf8(&request.configuration),
        );
        record
            .traits
            .insert(*reserved::VALIDATOR, TraitValue::id(unit.uuid()));
        if initially_valid {
            record.set_validated(true, Some(request.minter));
        }

        self.records.insert(id, record);
        *self.assignments.entry(unit).or_insert(0) += 1;

        info!(record = %id, asset_type = %request.asset_type, minter = %request.minter,
              validator = %unit, "record minted");
        self.events.push(RegistryEvent::Minted {
            record: id,
            asset_type: request.asset_type,
            minter: request.minter,
            validator: unit,
            salt: request.salt,
        });
        Ok(id)
    }

    // ---- Metadata and traits ----

    /// Update the record's metadata block.
    ///
    /// Callable by the owner or the assigned validator unit. An owner
    /// edit forcibly clears the validation flag; a validator edit leaves
    /// it untouched.
    pub fn update_metadata(
        &mut self,
        caller: AccountId,
        record: RecordId,
        metadata_uri: impl Into<String>,
        operating_agreement: impl Into<String>,
        definition: impl Into<String>,
        configuration: impl Into<String>,
        policy: &impl ValidationPolicyView,
    ) -> Result<(), RegistryError> {
        let operating_agreement = operating_agreement.into();
        if operating_agreement.is_empty() {
            return Err(RegistryError::EmptyOperatingAgreement);
        }
        let authority = self.authorize_record_write(caller, record, policy)?;

        let entry = self.record_mut(record)?;
        entry.metadata_uri = metadata_uri.into();
        entry.traits.insert(
            *reserved::OPERATING_AGREEMENT,
            TraitValue::utf8(&operating_agreement),
        );
        entry
            .traits
            .insert(*reserved::DEFINITION, TraitValue::utf8(&definition.into()));
        entry.traits.insert(
            *reserved::CONFIGURATION,
            TraitValue::utf8(&configuration.into()),
        );

        self.clear_validation_if_untrusted(caller, record, authority);
        debug!(record = %record, caller = %caller, "metadata updated");
        Ok(())
    }

    /// Set a named trait. Restricted to the owner or assigned validator;
    /// an owner write clears the validation flag.
    pub fn set_trait(
        &mut self,
        caller: AccountId,
        record: RecordId,
        name: &str,
        value: TraitValue,
        policy: &impl ValidationPolicyView,
    ) -> Result<(), RegistryError> {
        let authority = self.authorize_record_write(caller, record, policy)?;
        let key = TraitKey::named(name);
        self.record_mut(record)?.traits.insert(key, value);
        self.clear_validation_if_untrusted(caller, record, authority);
        Ok(())
    }

    /// Remove a named trait, purging both the value and its place in the
    /// enumeration.
    pub fn remove_trait(
        &mut self,
        caller: AccountId,
        record: RecordId,
        name: &str,
        policy: &impl ValidationPolicyView,
    ) -> Result<(), RegistryError> {
        let authority = self.authorize_record_write(caller, record, policy)?;
        let key = TraitKey::named(name);
        let entry = self.record_mut(record)?;
        if entry.traits.shift_remove(&key).is_none() {
            return Err(RegistryError::TraitNotFound {
                record,
                name: name.to_string(),
            });
        }
        self.clear_validation_if_untrusted(caller, record, authority);
        Ok(())
    }

    /// Read one trait value. Unrestricted.
    pub fn trait_value(&self, record: RecordId, key: TraitKey) -> Option<&TraitValue> {
        self.records.get(&record).and_then(|r| r.traits.get(&key))
    }

    /// Read several trait values at once. Unrestricted.
    pub fn trait_values<'a>(
        &'a self,
        record: RecordId,
        keys: &'a [TraitKey],
    ) -> Vec<Option<&'a TraitValue>> {
        keys.iter().map(|k| self.trait_value(record, *k)).collect()
    }

    /// Active trait keys in enumeration order. Unrestricted.
    pub fn trait_keys(&self, record: RecordId) -> Vec<TraitKey> {
        self.records
            .get(&record)
            .map(|r| r.trait_keys().collect())
            .unwrap_or_default()
    }

    // ---- Validation ----

    /// Assert or retract validation. Restricted to the assigned unit's
    /// validator identity; this is the only path from `Unvalidated` to
    /// `Validated`.
    pub fn assert_validation(
        &mut self,
        caller: AccountId,
        record: RecordId,
        valid: bool,
        policy: &impl ValidationPolicyView,
    ) -> Result<(), RegistryError> {
        let unit = self.record_ref(record)?.validator;
        if !policy.is_unit_validator(unit, caller) {
            warn!(record = %record, caller = %caller, "validation assertion denied");
            return Err(RegistryError::NotAssignedValidator { caller, record });
        }
        let entry = self.record_mut(record)?;
        entry.set_validated(valid, Some(caller));
        info!(record = %record, valid, asserter = %caller, "validation asserted");
        self.events.push(RegistryEvent::ValidationChanged {
            record,
            valid,
            asserter: caller,
        });
        Ok(())
    }

    // ---- Possession ----

    /// Transfer possession. Does not alter the validation flag.
    pub fn transfer(
        &mut self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        record: RecordId,
    ) -> Result<(), RegistryError> {
        if self.paused {
            return Err(RegistryError::Paused);
        }
        if to.is_nil() {
            return Err(RegistryError::NilRecipient);
        }
        let owner = self.record_ref(record)?.owner;
        if owner != from {
            return Err(RegistryError::WrongOwner { from, record });
        }
        if !self.can_move(caller, owner, record) {
            return Err(RegistryError::TransferNotAuthorized { caller, record });
        }

        self.record_approvals.remove(&record);
        if let Some(entry) = self.records.get_mut(&record) {
            entry.owner = to;
        }
        debug!(record = %record, %from, %to, "record transferred");
        self.events
            .push(RegistryEvent::Transferred { record, from, to });
        Ok(())
    }

    /// Grant (or clear) the per-record transfer approval.
    ///
    /// Under royalty enforcement, grants are the chokepoint: only
    /// allow-listed marketplace identities may receive one.
    pub fn approve(
        &mut self,
        caller: AccountId,
        record: RecordId,
        to: Option<AccountId>,
    ) -> Result<(), RegistryError> {
        let owner = self.record_ref(record)?.owner;
        if caller != owner {
            return Err(RegistryError::TransferNotAuthorized { caller, record });
        }
        match to {
            Some(grantee) => {
                if grantee.is_nil() {
                    return Err(RegistryError::NilRecipient);
                }
                if self.royalty_enforced && !self.approved_marketplaces.contains(&grantee) {
                    return Err(RegistryError::MarketplaceNotApproved(grantee));
                }
                self.record_approvals.insert(record, grantee);
            }
            None => {
                self.record_approvals.remove(&record);
            }
        }
        Ok(())
    }

    /// Grant or revoke an operator over all of the caller's records.
    /// Subject to the same marketplace chokepoint as [`approve`].
    ///
    /// [`approve`]: AssetRegistry::approve
    pub fn set_approval_for_all(
        &mut self,
        caller: AccountId,
        operator: AccountId,
        approved: bool,
    ) -> Result<(), RegistryError> {
        if operator.is_nil() {
            return Err(RegistryError::NilRecipient);
        }
        if approved {
            if self.royalty_enforced && !self.approved_marketplaces.contains(&operator) {
                return Err(RegistryError::MarketplaceNotApproved(operator));
            }
            self.operator_approvals.insert((caller, operator));
        } else {
            self.operator_approvals.remove(&(caller, operator));
        }
        Ok(())
    }

    /// The per-record approval grantee, if any.
    pub fn approved_for(&self, record: RecordId) -> Option<AccountId> {
        self.record_approvals.get(&record).copied()
    }

    /// Whether `operator` may move all of `owner`'s records.
    pub fn is_approved_for_all(&self, owner: AccountId, operator: AccountId) -> bool {
        self.operator_approvals.contains(&(owner, operator))
    }

    /// Destroy a record, purging all trait entries. Owner or approved
    /// operator only.
    pub fn burn(&mut self, caller: AccountId, record: RecordId) -> Result<(), RegistryError> {
        let owner = self.record_ref(record)?.owner;
        if !self.can_move(caller, owner, record) {
            return Err(RegistryError::TransferNotAuthorized { caller, record });
        }

        // Removing the record drops every trait entry with it.
        let removed = self.records.remove(&record);
        self.record_approvals.remove(&record);
        if let Some(rec) = removed {
            if let Some(count) = self.assignments.get_mut(&rec.validator) {
                *count = count.saturating_sub(1);
            }
        }
        info!(record = %record, %owner, "record burned");
        self.events.push(RegistryEvent::Burned { record, owner });
        Ok(())
    }

    // ---- Royalties and marketplaces ----

    /// Quote the royalty owed on a sale: the assigned unit's configured
    /// receiver and percentage, net of the settlement commission cut when
    /// a ledger is attached. `None` when the unit has no royalty config.
    pub fn royalty_info(
        &self,
        record: RecordId,
        sale_price: u128,
        royalties: &impl RoyaltyView,
        commission: Option<&impl CommissionView>,
    ) -> Result<Option<(AccountId, u128)>, RegistryError> {
        let unit = self.record_ref(record)?.validator;
        let Some((receiver, bps)) = royalties.royalty_config(unit) else {
            return Ok(None);
        };
        let gross = bps.apply(sale_price);
        let net = match commission {
            Some(view) => gross - view.regular_commission_bps().apply(gross),
            None => gross,
        };
        Ok(Some((receiver, net)))
    }

    /// Allow or disallow a marketplace identity. Duplicate application is
    /// rejected rather than silently absorbed.
    pub fn set_approved_marketplace(
        &mut self,
        caller: AccountId,
        account: AccountId,
        allowed: bool,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        let changed = if allowed {
            self.approved_marketplaces.insert(account)
        } else {
            self.approved_marketplaces.remove(&account)
        };
        if !changed {
            return Err(RegistryError::MarketplaceAlreadySet { account, allowed });
        }
        self.events
            .push(RegistryEvent::MarketplaceAllowed { account, allowed });
        Ok(())
    }

    /// Whether the identity is an allow-listed marketplace.
    pub fn is_approved_marketplace(&self, account: AccountId) -> bool {
        self.approved_marketplaces.contains(&account)
    }

    /// Toggle royalty enforcement. While disabled, approvals to any
    /// identity are permitted.
    pub fn set_royalty_enforcement(
        &mut self,
        caller: AccountId,
        enabled: bool,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        self.royalty_enforced = enabled;
        self.events
            .push(RegistryEvent::RoyaltyEnforcementChanged { enabled });
        Ok(())
    }

    /// Whether royalty enforcement is active.
    pub fn is_royalty_enforced(&self) -> bool {
        self.royalty_enforced
    }

    // ---- Administration ----

    /// Pause minting and transfers. Reads are unaffected.
    pub fn pause(&mut self, caller: AccountId) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        self.paused = true;
        Ok(())
    }

    /// Resume minting and transfers.
    pub fn unpause(&mut self, caller: AccountId) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        self.paused = false;
        Ok(())
    }

    /// Whether the registry is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Set the contract-level descriptive URI.
    pub fn set_contract_uri(
        &mut self,
        caller: AccountId,
        uri: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        self.contract_uri = uri.into();
        self.events.push(RegistryEvent::ContractUriUpdated);
        Ok(())
    }

    /// The contract-level descriptive URI.
    pub fn contract_uri(&self) -> &str {
        &self.contract_uri
    }

    /// Install or clear the metadata-rendering delegate.
    pub fn set_renderer(
        &mut self,
        caller: AccountId,
        renderer: Option<Box<dyn RecordRenderer>>,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        self.renderer = renderer;
        Ok(())
    }

    /// Display URI for a record: the delegate's output, or the standard
    /// `{contract_uri}/{id}` scheme when the delegate is unset or errors.
    pub fn record_uri(&self, record: RecordId) -> Result<String, RegistryError> {
        let entry = self.record_ref(record)?;
        if let Some(renderer) = &self.renderer {
            match renderer.record_uri(entry) {
                Ok(uri) => return Ok(uri),
                Err(err) => {
                    warn!(record = %record, %err, "renderer failed, using fallback uri");
                }
            }
        }
        Ok(format!("{}/{}", self.contract_uri, record.raw()))
    }

    /// Designate the validator used when a mint request names none.
    pub fn set_default_validator(
        &mut self,
        caller: AccountId,
        validator: Option<UnitId>,
        directory: &impl DirectoryView,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        if let Some(unit) = validator {
            if !directory.is_registered(unit) {
                return Err(RegistryError::ValidatorNotRegistered(unit));
            }
            if !directory.is_active(unit) {
                return Err(RegistryError::ValidatorNotActive(unit));
            }
        }
        self.default_validator = validator;
        self.events
            .push(RegistryEvent::DefaultValidatorUpdated { validator });
        Ok(())
    }

    /// The default validator designation.
    pub fn default_validator(&self) -> Option<UnitId> {
        self.default_validator
    }

    /// Recognize a companion registry for cross-registry validator
    /// assignment.
    pub fn add_compatible_registry(
        &mut self,
        caller: AccountId,
        registry: RegistryId,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        self.compatible_registries.insert(registry);
        Ok(())
    }

    /// Drop a companion registry.
    pub fn remove_compatible_registry(
        &mut self,
        caller: AccountId,
        registry: RegistryId,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        self.compatible_registries.remove(&registry);
        Ok(())
    }

    /// Whether a companion registry is recognized.
    pub fn is_compatible_registry(&self, registry: RegistryId) -> bool {
        self.compatible_registries.contains(&registry)
    }

    // ---- Reads ----

    /// Current owner of a record.
    pub fn owner_of(&self, record: RecordId) -> Option<AccountId> {
        self.records.get(&record).map(|r| r.owner)
    }

    /// Full record view.
    pub fn record(&self, record: RecordId) -> Option<&DeedRecord> {
        self.records.get(&record)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no live records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drain accumulated events.
    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- Internal guards ----

    fn require_admin(&self, caller: AccountId) -> Result<(), RegistryError> {
        if !self.roles.has(RegistryRole::Admin, caller) {
            return Err(RegistryError::NotAdmin);
        }
        Ok(())
    }

    fn can_move(&self, caller: AccountId, owner: AccountId, record: RecordId) -> bool {
        caller == owner
            || self.approved_for(record) == Some(caller)
            || self.is_approved_for_all(owner, caller)
    }

    fn authorize_record_write(
        &self,
        caller: AccountId,
        record: RecordId,
        policy: &impl ValidationPolicyView,
    ) -> Result<WriteAuthority, RegistryError> {
        let entry = self.record_ref(record)?;
        if policy.is_unit_validator(entry.validator, caller) {
            return Ok(WriteAuthority::AssignedValidator);
        }
        if caller == entry.owner {
            return Ok(WriteAuthority::Owner);
        }
        Err(RegistryError::NotOwnerOrValidator { caller, record })
    }

    /// An edit by anyone other than the assigned validator invalidates
    /// trust; the validator is presumed to re-assert consistency itself.
    fn clear_validation_if_untrusted(
        &mut self,
        caller: AccountId,
        record: RecordId,
        authority: WriteAuthority,
    ) {
        if authority == WriteAuthority::AssignedValidator {
            return;
        }
        let Some(entry) = self.records.get_mut(&record) else {
            return;
        };
        if entry.is_validated {
            entry.set_validated(false, Some(caller));
            self.events.push(RegistryEvent::ValidationChanged {
                record,
                valid: false,
                asserter: caller,
            });
        }
    }

    fn record_ref(&self, record: RecordId) -> Result<&DeedRecord, RegistryError> {
        self.records
            .get(&record)
            .ok_or(RegistryError::RecordNotFound(record))
    }

    fn record_mut(&mut self, record: RecordId) -> Result<&mut DeedRecord, RegistryError> {
        self.records
            .get_mut(&record)
            .ok_or(RegistryError::RecordNotFound(record))
    }
}

impl AssignmentView for AssetRegistry {
    fn live_assignments(&self, unit: UnitId) -> u64 {
        self.assignments.get(&unit).copied().unwrap_or(0)
    }
}
