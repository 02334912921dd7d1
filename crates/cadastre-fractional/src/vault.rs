//! Vault state and operations

use crate::error::FractionalError;
use cadastre_core::{AccountId, BasisPoints, CollectionId, RecordId, BPS_DENOMINATOR};
use cadastre_registry::AssetRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// One fractionalized record's share collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FractionCollection {
    /// Collection identity. Monotonic, never reused.
    pub id: CollectionId,
    /// The record held in custody.
    pub record: RecordId,
    /// Shares minted at creation; fixed for the collection's lifetime.
    pub total_shares: u128,
    /// Quorum threshold required to unlock.
    pub approval_bps: BasisPoints,
    /// Display name for the share class.
    pub name: String,
    /// Ticker-style symbol.
    pub symbol: String,
    /// Collection display URI.
    pub collection_uri: String,
    /// Per-holder share balances.
    pub balances: BTreeMap<AccountId, u128>,
    /// Holders with a standing unlock vote.
    pub approvals: BTreeSet<AccountId>,
    /// Set once the record has been reassembled and returned.
    pub retired: bool,
}

impl FractionCollection {
    /// Shares held by holders with a standing unlock vote.
    pub fn approving_shares(&self) -> u128 {
        self.approvals
            .iter()
            .filter_map(|holder| self.balances.get(holder))
            .sum()
    }

    /// Whether the standing votes meet the quorum threshold.
    pub fn quorum_met(&self) -> bool {
        // Integer-only comparison: approving / total >= bps / 10_000.
        self.approving_shares() * BPS_DENOMINATOR
            >= u128::from(self.approval_bps.as_u16()) * self.total_shares
    }
}

/// Events emitted by the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractionalEvent {
    /// A record was surrendered and a collection created.
    FractionCreated {
        /// New collection.
        collection: CollectionId,
        /// Record taken into custody.
        record: RecordId,
        /// Shares minted.
        total_shares: u128,
        /// Quorum threshold.
        approval_bps: BasisPoints,
    },
    /// Shares moved between holders.
    SharesTransferred {
        /// Collection.
        collection: CollectionId,
        /// Sender.
        from: AccountId,
        /// Recipient.
        to: AccountId,
        /// Amount moved.
        amount: u128,
    },
    /// A holder cast or re-cast an unlock vote.
    UnlockApproved {
        /// Collection.
        collection: CollectionId,
        /// Voting holder.
        holder: AccountId,
    },
    /// The record was reassembled and returned.
    Unlocked {
        /// Retired collection.
        collection: CollectionId,
        /// Record returned.
        record: RecordId,
        /// Identity the record was returned to.
        to: AccountId,
    },
}

/// The fractional ownership vault.
#[derive(Debug)]
pub struct FractionalVault {
    /// Registry identity the vault holds records under.
    custodian: AccountId,
    collections: BTreeMap<CollectionId, FractionCollection>,
    /// Live collections by record; cleared on unlock.
    record_index: HashMap<RecordId, CollectionId>,
    next_id: u64,
    events: Vec<FractionalEvent>,
}

impl FractionalVault {
    /// Create a vault holding records under `custodian`.
    pub fn new(custodian: AccountId) -> Self {
        Self {
            custodian,
            collections: BTreeMap::new(),
            record_index: HashMap::new(),
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// The registry identity the vault holds records under.
    pub fn custodian(&self) -> AccountId {
        self.custodian
    }

    /// Surrender a record for `total_shares` divisible shares.
    ///
    /// The caller must own the record and must already have granted
    /// transfer approval to the vault's custodian identity. All shares
    /// are minted to the caller.
    #[allow(clippy::too_many_arguments)]
    pub fn fractionalize(
        &mut self,
        caller: AccountId,
        record: RecordId,
        total_shares: u128,
        approval_bps: u16,
        name: impl Into<String>,
        symbol: impl Into<String>,
        collection_uri: impl Into<String>,
        registry: &mut AssetRegistry,
    ) -> Result<CollectionId, FractionalError> {
        if total_shares == 0 {
            return Err(FractionalError::ZeroShares);
        }
        if total_shares > u128::MAX / BPS_DENOMINATOR {
            return Err(FractionalError::TooManyShares(u128::MAX / BPS_DENOMINATOR));
        }
        let approval_bps = BasisPoints::new(approval_bps)?;
        if self.record_index.contains_key(&record) {
            return Err(FractionalError::AlreadyFractionalized(record));
        }
        if registry.owner_of(record) != Some(caller) {
            return Err(FractionalError::NotRecordOwner(record));
        }

        // Custody move runs under the approval the caller granted; the
        // registry enforces it.
        registry.transfer(self.custodian, caller, self.custodian, record)?;

        let id = CollectionId::from_raw(self.next_id);
        self.next_id += 1;
        let mut balances = BTreeMap::new();
        balances.insert(caller, total_shares);
        self.collections.insert(
            id,
            FractionCollection {
                id,
                record,
                total_shares,
                approval_bps,
                name: name.into(),
                symbol: symbol.into(),
                collection_uri: collection_uri.into(),
                balances,
                approvals: BTreeSet::new(),
                retired: false,
            },
        );
        self.record_index.insert(record, id);

        info!(collection = %id, %record, total_shares, %approval_bps, "record fractionalized");
        self.events.push(FractionalEvent::FractionCreated {
            collection: id,
            record,
            total_shares,
            approval_bps,
        });
        Ok(id)
    }

    /// Move shares between holders. The recipient does not inherit the
    /// sender's vote.
    pub fn transfer_shares(
        &mut self,
        caller: AccountId,
        collection: CollectionId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), FractionalError> {
        if amount == 0 {
            return Err(FractionalError::ZeroShares);
        }
        let entry = self.live_mut(collection)?;
        let have = entry.balances.get(&caller).copied().unwrap_or(0);
        if have < amount {
            return Err(FractionalError::InsufficientShares { have, need: amount });
        }

        if have == amount {
            entry.balances.remove(&caller);
        } else {
            entry.balances.insert(caller, have - amount);
        }
        *entry.balances.entry(to).or_insert(0) += amount;

        debug!(%collection, %caller, %to, amount, "shares transferred");
        self.events.push(FractionalEvent::SharesTransferred {
            collection,
            from: caller,
            to,
            amount,
        });
        Ok(())
    }

    /// Cast a standing unlock vote. Restricted to current holders;
    /// re-approval has no additional effect.
    pub fn approve_unlock(
        &mut self,
        caller: AccountId,
        collection: CollectionId,
    ) -> Result<(), FractionalError> {
        let entry = self.live_mut(collection)?;
        if entry.balances.get(&caller).copied().unwrap_or(0) == 0 {
            return Err(FractionalError::NotHolder(collection));
        }
        if entry.approvals.insert(caller) {
            self.events.push(FractionalEvent::UnlockApproved {
                collection,
                holder: caller,
            });
        }
        Ok(())
    }

    /// Withdraw a standing unlock vote.
    pub fn revoke_unlock_approval(
        &mut self,
        caller: AccountId,
        collection: CollectionId,
    ) -> Result<(), FractionalError> {
        let entry = self.live_mut(collection)?;
        if entry.balances.get(&caller).copied().unwrap_or(0) == 0 {
            return Err(FractionalError::NotHolder(collection));
        }
        entry.approvals.remove(&caller);
        Ok(())
    }

    /// Whether the standing votes currently meet the quorum threshold.
    pub fn can_unlock(&self, collection: CollectionId) -> Result<bool, FractionalError> {
        Ok(self.live_ref(collection)?.quorum_met())
    }

    /// Reassemble the record: burn every holder's shares, return the
    /// record to the caller, retire the collection. Callable by any
    /// approving holder once quorum is met.
    pub fn unlock(
        &mut self,
        caller: AccountId,
        collection: CollectionId,
        registry: &mut AssetRegistry,
    ) -> Result<(), FractionalError> {
        let entry = self.live_ref(collection)?;
        if entry.balances.get(&caller).copied().unwrap_or(0) == 0
            || !entry.approvals.contains(&caller)
        {
            return Err(FractionalError::NotHolder(collection));
        }
        if !entry.quorum_met() {
            return Err(FractionalError::QuorumNotMet {
                approving: entry.approving_shares(),
                total: entry.total_shares,
                required_bps: entry.approval_bps.as_u16(),
            });
        }
        let record = entry.record;

        registry.transfer(self.custodian, self.custodian, caller, record)?;

        // Past the point of failure: burn shares and retire.
        let entry = self
            .collections
            .get_mut(&collection)
            .ok_or(FractionalError::CollectionNotFound(collection))?;
        entry.balances.clear();
        entry.approvals.clear();
        entry.retired = true;
        self.record_index.remove(&record);

        info!(%collection, %record, %caller, "record reassembled");
        self.events.push(FractionalEvent::Unlocked {
            collection,
            record,
            to: caller,
        });
        Ok(())
    }

    // ---- Reads ----

    /// Full collection view, live or retired.
    pub fn collection(&self, collection: CollectionId) -> Option<&FractionCollection> {
        self.collections.get(&collection)
    }

    /// A holder's share balance.
    pub fn balance_of(&self, collection: CollectionId, holder: AccountId) -> u128 {
        self.collections
            .get(&collection)
            .and_then(|c| c.balances.get(&holder))
            .copied()
            .unwrap_or(0)
    }

    /// Whether a holder has a standing unlock vote.
    pub fn approved(&self, collection: CollectionId, holder: AccountId) -> bool {
        self.collections
            .get(&collection)
            .is_some_and(|c| c.approvals.contains(&holder))
    }

    /// The live collection for a record, if one exists.
    pub fn live_collection_for(&self, record: RecordId) -> Option<CollectionId> {
        self.record_index.get(&record).copied()
    }

    /// Drain accumulated events.
    pub fn take_events(&mut self) -> Vec<FractionalEvent> {
        std::mem::take(&mut self.events)
    }

    fn live_ref(&self, collection: CollectionId) -> Result<&FractionCollection, FractionalError> {
        let entry = self
            .collections
            .get(&collection)
            .ok_or(FractionalError::CollectionNotFound(collection))?;
        if entry.retired {
            return Err(FractionalError::CollectionRetired(collection));
        }
        Ok(entry)
    }

    fn live_mut(
        &mut self,
        collection: CollectionId,
    ) -> Result<&mut FractionCollection, FractionalError> {
        let entry = self
            .collections
            .get_mut(&collection)
            .ok_or(FractionalError::CollectionNotFound(collection))?;
        if entry.retired {
            return Err(FractionalError::CollectionRetired(collection));
        }
        Ok(entry)
    }
}
