//! External Environment Interface
//!
//! The staking engine does not own a stake pool, a coin ledger, or a
//! configuration store; it drives them through this trait. Every
//! fund-moving call on a pool is gated by the contract's
//! [`OwnerCapability`], so an environment implementation never needs its
//! own access control for engine traffic.

use crate::errors::StakingResult;
use crate::types::{Address, Coin, OwnerCapability, PoolBalances};

/// The stake-pool, coin/account, and configuration primitives consumed
/// by the accounting engine.
///
/// Implementations must apply each call atomically; the engine
/// sequences calls so that a failed operation leaves no partial state.
pub trait StakingEnv {
    // ============ Stake Pool Primitive ============

    /// Create a stake pool at `pool_address` with the given operator and
    /// voter, funded by `coins`. The engine derives `pool_address`
    /// deterministically and retains the only capability over the pool.
    fn create_stake_pool(
        &mut self,
        pool_address: Address,
        operator: Address,
        voter: Address,
        coins: Coin,
    );

    /// Current balances of the pool's four buckets
    fn stake_balances(&self, pool_address: Address) -> PoolBalances;

    /// Deposit additional stake into the pool
    fn add_stake(&mut self, cap: &OwnerCapability, coins: Coin);

    /// Request unlock of up to `amount` active stake. Funds move to
    /// pending-inactive and become withdrawable once the lockup elapses.
    fn unlock(&mut self, cap: &OwnerCapability, amount: u64);

    /// Withdraw up to `amount` of unlocked (inactive) stake
    fn withdraw_unlocked(&mut self, cap: &OwnerCapability, amount: u64) -> Coin;

    /// Delegate the pool's vote
    fn set_voter(&mut self, cap: &OwnerCapability, new_voter: Address);

    /// Re-key the pool to a new operator
    fn set_operator(&mut self, cap: &OwnerCapability, new_operator: Address);

    /// Extend the pool's lockup period
    fn extend_lockup(&mut self, cap: &OwnerCapability);

    /// Current delegated voter of the pool
    fn voter_of(&self, pool_address: Address) -> Address;

    // ============ Coin / Account Primitive ============

    /// Withdraw `amount` coins from an account
    fn withdraw_coins(&mut self, account: Address, amount: u64) -> StakingResult<Coin>;

    /// Deposit coins into an account
    fn deposit_coins(&mut self, account: Address, coins: Coin);

    /// Coin balance of an account
    fn coin_balance(&self, account: Address) -> u64;

    // ============ Configuration Primitive ============

    /// Minimum stake required to be validator-eligible
    fn min_required_stake(&self) -> u64;
}
