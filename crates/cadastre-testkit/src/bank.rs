//! In-memory token bank

use cadastre_core::{AccountId, TokenBank, TokenError, TokenId};
use std::collections::HashMap;

/// A minimal in-memory fungible-token ledger with allowances, for tests.
#[derive(Debug, Default)]
pub struct MemoryBank {
    balances: HashMap<(TokenId, AccountId), u128>,
    allowances: HashMap<(TokenId, AccountId, AccountId), u128>,
}

impl MemoryBank {
    /// Empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account out of thin air.
    pub fn fund(&mut self, token: TokenId, account: AccountId, amount: u128) {
        *self.balances.entry((token, account)).or_insert(0) += amount;
    }

    fn debit(
        &mut self,
        token: TokenId,
        account: AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        let balance = self.balances.entry((token, account)).or_insert(0);
        if *balance < amount {
            return Err(TokenError::InsufficientBalance {
                token,
                account,
                available: *balance,
                required: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }
}

impl TokenBank for MemoryBank {
    fn balance_of(&self, token: TokenId, account: AccountId) -> u128 {
        self.balances.get(&(token, account)).copied().unwrap_or(0)
    }

    fn allowance(&self, token: TokenId, owner: AccountId, spender: AccountId) -> u128 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, token: TokenId, owner: AccountId, spender: AccountId, amount: u128) {
        self.allowances.insert((token, owner, spender), amount);
    }

    fn transfer(
        &mut self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.debit(token, from, amount)?;
        *self.balances.entry((token, to)).or_insert(0) += amount;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        token: TokenId,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(token, from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                token,
                owner: from,
                spender,
                available: allowance,
                required: amount,
            });
        }
        self.debit(token, from, amount)?;
        self.allowances.insert((token, from, spender), allowance - amount);
        *self.balances.entry((token, to)).or_insert(0) += amount;
        Ok(())
    }
}
