//! Balance Ledger
//!
//! Single balance in minor units, mutated only by debit-on-bet and
//! credit-on-settlement. Currency is a display label and never affects
//! arithmetic.

use crate::errors::{RgsError, RgsResult};
use serde::{Deserialize, Serialize};

/// What happens when a debit would take the balance below zero
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverdraftPolicy {
    /// Debit unconditionally; the balance may go negative
    #[default]
    Allow,
    /// Refuse the debit and leave the balance untouched
    Reject,
}

#[derive(Debug, Clone)]
pub struct BalanceLedger {
    balance: i64,
    currency: String,
    overdraft: OverdraftPolicy,
}

impl BalanceLedger {
    pub fn new(starting_balance: i64, currency: impl Into<String>, overdraft: OverdraftPolicy) -> Self {
        Self {
            balance: starting_balance,
            currency: currency.into(),
            overdraft,
        }
    }

    pub fn debit(&mut self, amount: u64) -> RgsResult<i64> {
        let next = i64::try_from(amount)
            .ok()
            .and_then(|a| self.balance.checked_sub(a))
            .ok_or(RgsError::BalanceOverflow { amount })?;

        if next < 0 && self.overdraft == OverdraftPolicy::Reject {
            return Err(RgsError::InsufficientBalance {
                balance: self.balance,
                requested: amount,
            });
        }

        self.balance = next;
        Ok(self.balance)
    }

    pub fn credit(&mut self, amount: u64) -> RgsResult<i64> {
        self.balance = i64::try_from(amount)
            .ok()
            .and_then(|a| self.balance.checked_add(a))
            .ok_or(RgsError::BalanceOverflow { amount })?;
        Ok(self.balance)
    }

    pub fn read(&self) -> i64 {
        self.balance
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}
