//! Deterministic in-memory staking environment for tests.
//!
//! Models the external stake-pool, coin, and config primitives with
//! explicit epoch and lockup transitions, so every operation sequence in
//! the tests is reproducible:
//!
//! - `add_stake` lands in pending-active until [`SimEnv::commit_pending`]
//! - `unlock` moves active stake to pending-inactive
//! - [`SimEnv::expire_lockup`] makes pending-inactive withdrawable
//! - [`SimEnv::accrue_rewards`] injects reward directly into active stake

use crate::env::StakingEnv;
use crate::errors::{StakingError, StakingResult};
use crate::types::{Address, Coin, OwnerCapability, PoolBalances};
use crate::BTreeMap;

#[derive(Debug, Default)]
struct SimStakePool {
    balances: PoolBalances,
    operator: Address,
    voter: Address,
    lockup_extensions: u64,
}

/// In-memory environment implementing [`StakingEnv`]
#[derive(Debug, Default)]
pub struct SimEnv {
    pools: BTreeMap<Address, SimStakePool>,
    accounts: BTreeMap<Address, u64>,
    min_stake: u64,
    /// Total rewards ever injected, for conservation checks
    pub total_rewards_accrued: u64,
}

impl SimEnv {
    pub fn new(min_stake: u64) -> Self {
        Self {
            min_stake,
            ..Self::default()
        }
    }

    /// Credit an account with spendable coins
    pub fn fund(&mut self, account: Address, amount: u64) {
        *self.accounts.entry(account).or_insert(0) += amount;
    }

    /// Inject reward into a pool's active stake
    pub fn accrue_rewards(&mut self, pool_address: Address, amount: u64) {
        let pool = self.pool_mut(pool_address);
        pool.balances.active += amount;
        self.total_rewards_accrued += amount;
    }

    /// End of epoch: pending-active stake becomes active
    pub fn commit_pending(&mut self, pool_address: Address) {
        let pool = self.pool_mut(pool_address);
        pool.balances.active += pool.balances.pending_active;
        pool.balances.pending_active = 0;
    }

    /// Lockup expiry: pending-inactive stake becomes withdrawable
    pub fn expire_lockup(&mut self, pool_address: Address) {
        let pool = self.pool_mut(pool_address);
        pool.balances.inactive += pool.balances.pending_inactive;
        pool.balances.pending_inactive = 0;
    }

    /// Move active stake straight to withdrawable, bypassing the
    /// unlock request path. Simulates balance unlocked outside the
    /// engine (so no distribution claim exists for it).
    pub fn force_unlock(&mut self, pool_address: Address, amount: u64) {
        let pool = self.pool_mut(pool_address);
        let moved = amount.min(pool.balances.active);
        pool.balances.active -= moved;
        pool.balances.inactive += moved;
    }

    /// Operator recorded for a pool
    pub fn operator_of(&self, pool_address: Address) -> Address {
        self.pools[&pool_address].operator
    }

    /// Number of lockup extensions requested on a pool
    pub fn lockup_extensions(&self, pool_address: Address) -> u64 {
        self.pools[&pool_address].lockup_extensions
    }

    /// All value in the system: account balances plus every pool bucket.
    /// Constant across engine operations; only `fund` and
    /// `accrue_rewards` change it.
    pub fn total_value(&self) -> u64 {
        let in_accounts: u64 = self.accounts.values().sum();
        let in_pools: u64 = self
            .pools
            .values()
            .map(|p| {
                p.balances.active
                    + p.balances.inactive
                    + p.balances.pending_active
                    + p.balances.pending_inactive
            })
            .sum();
        in_accounts + in_pools
    }

    fn pool_mut(&mut self, pool_address: Address) -> &mut SimStakePool {
        self.pools
            .get_mut(&pool_address)
            .expect("unknown sim stake pool")
    }
}

impl StakingEnv for SimEnv {
    fn create_stake_pool(
        &mut self,
        pool_address: Address,
        operator: Address,
        voter: Address,
        coins: Coin,
    ) {
        let pool = SimStakePool {
            balances: PoolBalances {
                active: coins.into_value(),
                ..PoolBalances::default()
            },
            operator,
            voter,
            lockup_extensions: 0,
        };
        self.pools.insert(pool_address, pool);
    }

    fn stake_balances(&self, pool_address: Address) -> PoolBalances {
        self.pools[&pool_address].balances
    }

    fn add_stake(&mut self, cap: &OwnerCapability, coins: Coin) {
        let pool = self.pool_mut(cap.pool_address());
        pool.balances.pending_active += coins.into_value();
    }

    fn unlock(&mut self, cap: &OwnerCapability, amount: u64) {
        let pool = self.pool_mut(cap.pool_address());
        let moved = amount.min(pool.balances.active);
        pool.balances.active -= moved;
        pool.balances.pending_inactive += moved;
    }

    fn withdraw_unlocked(&mut self, cap: &OwnerCapability, amount: u64) -> Coin {
        let pool = self.pool_mut(cap.pool_address());
        let taken = amount.min(pool.balances.inactive);
        pool.balances.inactive -= taken;
        Coin::new(taken)
    }

    fn set_voter(&mut self, cap: &OwnerCapability, new_voter: Address) {
        self.pool_mut(cap.pool_address()).voter = new_voter;
    }

    fn set_operator(&mut self, cap: &OwnerCapability, new_operator: Address) {
        self.pool_mut(cap.pool_address()).operator = new_operator;
    }

    fn extend_lockup(&mut self, cap: &OwnerCapability) {
        self.pool_mut(cap.pool_address()).lockup_extensions += 1;
    }

    fn voter_of(&self, pool_address: Address) -> Address {
        self.pools[&pool_address].voter
    }

    fn withdraw_coins(&mut self, account: Address, amount: u64) -> StakingResult<Coin> {
        let balance = self.accounts.entry(account).or_insert(0);
        if *balance < amount {
            return Err(StakingError::InsufficientBalance {
                available: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        Ok(Coin::new(amount))
    }

    fn deposit_coins(&mut self, account: Address, coins: Coin) {
        *self.accounts.entry(account).or_insert(0) += coins.into_value();
    }

    fn coin_balance(&self, account: Address) -> u64 {
        self.accounts.get(&account).copied().unwrap_or(0)
    }

    fn min_required_stake(&self) -> u64 {
        self.min_stake
    }
}
