//! Core Types for the Staking Contracts
//!
//! Fundamental data structures shared across the staking modules.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::{StakingError, StakingResult};

/// Type alias for addresses (32-byte hash)
pub type Address = [u8; 32];

// ============ Coin ============

/// A linear quantity of the staked coin.
///
/// `Coin` is deliberately neither `Clone` nor `Copy`: value enters the
/// engine by withdrawing from an account and leaves it by depositing to
/// one, so coins cannot be duplicated or silently dropped on an error
/// path without it showing up in a diff of balances.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct Coin {
    value: u64,
}

impl Coin {
    /// Mint a coin of the given value.
    ///
    /// Only [`StakingEnv`](crate::env::StakingEnv) implementations should
    /// create non-zero coins; inside the engine, value is always obtained
    /// from the environment.
    pub fn new(value: u64) -> Self {
        Self { value }
    }

    /// A coin of value zero
    pub fn zero() -> Self {
        Self { value: 0 }
    }

    /// Current value
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Returns true if the coin holds no value
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Split `amount` out of this coin, leaving the remainder behind
    pub fn split(&mut self, amount: u64) -> StakingResult<Coin> {
        if amount > self.value {
            return Err(StakingError::InsufficientBalance {
                available: self.value,
                requested: amount,
            });
        }
        self.value -= amount;
        Ok(Coin { value: amount })
    }

    /// Merge another coin into this one
    pub fn merge(&mut self, other: Coin) -> StakingResult<()> {
        self.value = self
            .value
            .checked_add(other.value)
            .ok_or(StakingError::Overflow)?;
        Ok(())
    }

    /// Consume the coin, returning its value
    pub fn into_value(self) -> u64 {
        self.value
    }
}

// ============ Owner Capability ============

/// Exclusive capability over a stake pool's funds.
///
/// This is the sole means of moving value out of the pool it names. It is
/// minted once at contract creation, lives inside the owning
/// [`StakingContract`](crate::contract::StakingContract) record, and is
/// transplanted (never re-minted) when the contract switches operator.
/// It has no `Clone`/`Copy` impl and no public constructor, so holding
/// two live handles to the same pool is a compile error.
#[derive(Debug)]
pub struct OwnerCapability {
    pool_address: Address,
}

impl OwnerCapability {
    pub(crate) fn new(pool_address: Address) -> Self {
        Self { pool_address }
    }

    /// The stake pool this capability controls
    pub fn pool_address(&self) -> Address {
        self.pool_address
    }
}

// ============ Pool Balances ============

/// Snapshot of a stake pool's four balance buckets.
///
/// `active` earns rewards now, `pending_active` joins at the next epoch,
/// `pending_inactive` is unlocking, and `inactive` is withdrawable.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct PoolBalances {
    /// Stake currently earning rewards
    pub active: u64,
    /// Stake unlocked and withdrawable
    pub inactive: u64,
    /// Stake deposited but not yet active
    pub pending_active: u64,
    /// Stake requested for unlock, still locked
    pub pending_inactive: u64,
}

impl PoolBalances {
    /// Active plus pending-active stake: the base that commission
    /// accounting runs against
    pub fn total_active(&self) -> StakingResult<u64> {
        self.active
            .checked_add(self.pending_active)
            .ok_or(StakingError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_split_merge() {
        let mut coin = Coin::new(1_000);
        let part = coin.split(300).unwrap();
        assert_eq!(part.value(), 300);
        assert_eq!(coin.value(), 700);

        coin.merge(part).unwrap();
        assert_eq!(coin.into_value(), 1_000);
    }

    #[test]
    fn test_coin_split_insufficient() {
        let mut coin = Coin::new(100);
        let err = coin.split(101).unwrap_err();
        assert!(matches!(err, StakingError::InsufficientBalance { .. }));
        // Failed split leaves the coin untouched
        assert_eq!(coin.value(), 100);
    }

    #[test]
    fn test_total_active_overflow() {
        let balances = PoolBalances {
            active: u64::MAX,
            pending_active: 1,
            ..Default::default()
        };
        assert_eq!(balances.total_active(), Err(StakingError::Overflow));
    }
}
