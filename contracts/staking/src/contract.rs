//! Staking Contract Engine
//!
//! Per-(staker, operator) contract records, the per-staker store, and
//! every operation that mutates them. Each public operation runs to
//! completion as one atomic transition: all validation happens before
//! the first state change, so an error leaves principal, shares, and
//! pool balances exactly as they were.
//!
//! ## Operation Skeleton
//!
//! Locate the record, settle any already-unlocked funds through the
//! distribution pool, recompute commission against the live balance,
//! mutate the principal checkpoint, then issue unlock/withdraw requests
//! to the external stake pool. Nothing polls; every transition is
//! caller-triggered.

use crate::account::derive_stake_pool_address;
use crate::commission::compute_commission;
use crate::constants::commission::MAX_COMMISSION_PERCENTAGE;
use crate::constants::distribution::MAX_PENDING_SHAREHOLDERS;
use crate::env::StakingEnv;
use crate::errors::{StakingError, StakingResult};
use crate::events::{EventSink, StakingEvent};
use crate::math::{safe_add, safe_sub};
use crate::shares_pool::SharesPool;
use crate::types::{Address, OwnerCapability};
use crate::BTreeMap;

// ============================================================================
// Types
// ============================================================================

/// Per-(staker, operator) contract state.
///
/// `principal` checkpoints the staker capital not yet recognized as
/// reward; at any observation point the pool's active plus
/// pending-active stake minus `principal` is the accrued reward. The
/// record owns the only [`OwnerCapability`] over its stake pool and is
/// never destroyed: switching operator re-keys it instead.
#[derive(Debug)]
pub struct StakingContract {
    principal: u64,
    pool_address: Address,
    owner_capability: OwnerCapability,
    commission_percentage: u64,
    distribution_pool: SharesPool,
}

impl StakingContract {
    /// Last recorded principal checkpoint
    pub fn principal(&self) -> u64 {
        self.principal
    }

    /// Address of the contract's stake pool
    pub fn pool_address(&self) -> Address {
        self.pool_address
    }

    /// Operator's commission rate in percent
    pub fn commission_percentage(&self) -> u64 {
        self.commission_percentage
    }

    /// Pending distribution claims
    pub fn distribution_pool(&self) -> &SharesPool {
        &self.distribution_pool
    }
}

/// All staking contracts of one staker, keyed by operator
#[derive(Debug, Default)]
pub struct ContractStore {
    contracts: BTreeMap<Address, StakingContract>,
}

impl ContractStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Contract with the given operator, if any
    pub fn contract(&self, operator: &Address) -> Option<&StakingContract> {
        self.contracts.get(operator)
    }

    /// Number of live contracts in this store
    pub fn contract_count(&self) -> usize {
        self.contracts.len()
    }
}

/// Top-level ledger: one [`ContractStore`] per staker, created lazily on
/// the staker's first contract and never destroyed
#[derive(Debug, Default)]
pub struct StakingLedger {
    stores: BTreeMap<Address, ContractStore>,
}

impl StakingLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Store of a staker, if one exists
    pub fn store(&self, staker: &Address) -> Option<&ContractStore> {
        self.stores.get(staker)
    }

    fn store_mut(&mut self, staker: &Address) -> StakingResult<&mut ContractStore> {
        self.stores
            .get_mut(staker)
            .ok_or(StakingError::StoreNotFound { staker: *staker })
    }

    fn contract_ref(
        &self,
        staker: &Address,
        operator: &Address,
    ) -> StakingResult<&StakingContract> {
        self.stores
            .get(staker)
            .ok_or(StakingError::StoreNotFound { staker: *staker })?
            .contracts
            .get(operator)
            .ok_or(StakingError::ContractNotFound {
                staker: *staker,
                operator: *operator,
            })
    }

    fn contract_mut(
        &mut self,
        staker: &Address,
        operator: &Address,
    ) -> StakingResult<&mut StakingContract> {
        self.stores
            .get_mut(staker)
            .ok_or(StakingError::StoreNotFound { staker: *staker })?
            .contracts
            .get_mut(operator)
            .ok_or(StakingError::ContractNotFound {
                staker: *staker,
                operator: *operator,
            })
    }
}

// ============================================================================
// Mutating Operations
// ============================================================================

/// Create a staking contract between `staker` and `operator`.
///
/// Derives a fresh stake pool address from the (staker, operator, seed)
/// triple, funds it with `amount` coins withdrawn from the staker, and
/// records the contract. Returns the pool address.
#[allow(clippy::too_many_arguments)]
pub fn create_staking_contract<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    operator: Address,
    voter: Address,
    amount: u64,
    commission_percentage: u64,
    contract_seed: &[u8],
) -> StakingResult<Address> {
    validate_commission(commission_percentage)?;

    let minimum = env.min_required_stake();
    if amount < minimum {
        return Err(StakingError::StakeBelowMinimum { amount, minimum });
    }

    if staking_contract_exists(ledger, &staker, &operator) {
        return Err(StakingError::ContractAlreadyExists { operator });
    }

    let coins = env.withdraw_coins(staker, amount)?;
    let pool_address = derive_stake_pool_address(&staker, &operator, contract_seed);
    env.create_stake_pool(pool_address, operator, voter, coins);

    let contract = StakingContract {
        principal: amount,
        pool_address,
        owner_capability: OwnerCapability::new(pool_address),
        commission_percentage,
        distribution_pool: SharesPool::new(),
    };
    ledger
        .stores
        .entry(staker)
        .or_default()
        .contracts
        .insert(operator, contract);

    events.emit(StakingEvent::ContractCreated {
        operator,
        voter,
        pool_address,
        principal: amount,
        commission_percentage,
    });
    Ok(pool_address)
}

/// Add `amount` to the contract's stake.
///
/// Principal grows by exactly the added amount. No commission runs here:
/// the new capital has not earned reward yet, so claiming on addition
/// would overpay the operator.
pub fn add_stake<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    operator: Address,
    amount: u64,
) -> StakingResult<()> {
    let contract = ledger.contract_mut(&staker, &operator)?;
    let new_principal = safe_add(contract.principal, amount)?;

    let coins = env.withdraw_coins(staker, amount)?;
    env.add_stake(&contract.owner_capability, coins);
    contract.principal = new_principal;

    events.emit(StakingEvent::StakeAdded {
        operator,
        pool_address: contract.pool_address,
        amount,
    });
    Ok(())
}

/// Delegate the stake pool's vote to `new_voter`
pub fn update_voter<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    operator: Address,
    new_voter: Address,
) -> StakingResult<()> {
    let contract = ledger.contract_mut(&staker, &operator)?;
    let old_voter = env.voter_of(contract.pool_address);
    env.set_voter(&contract.owner_capability, new_voter);

    events.emit(StakingEvent::VoterUpdated {
        operator,
        pool_address: contract.pool_address,
        old_voter,
        new_voter,
    });
    Ok(())
}

/// Extend the stake pool's lockup period
pub fn reset_lockup<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    operator: Address,
) -> StakingResult<()> {
    let contract = ledger.contract_mut(&staker, &operator)?;
    env.extend_lockup(&contract.owner_capability);

    events.emit(StakingEvent::LockupReset {
        operator,
        pool_address: contract.pool_address,
    });
    Ok(())
}

/// Claim the operator's commission on rewards accrued since the last
/// checkpoint. Returns the commission amount moved into unlock.
///
/// Requesting against a zero commission rate is a caller error; a
/// computed commission of zero at a nonzero rate is a silent no-op, so
/// back-to-back requests with no reward growth are idempotent.
pub fn request_commission<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    operator: Address,
) -> StakingResult<u64> {
    let contract = ledger.contract_mut(&staker, &operator)?;
    if contract.commission_percentage == 0 {
        return Err(StakingError::ZeroCommissionRate);
    }

    // Commission math must run against a clean baseline: stale unlocked
    // balance sitting in the pool is settled before anything new is
    // requested.
    distribute_internal(env, events, staker, operator, contract)?;
    request_commission_internal(env, events, operator, contract)
}

/// Request unlock of `amount` of the staker's principal.
///
/// Settles pending distributions, forces a commission request so the
/// withdrawal cannot overlap unclaimed operator commission, clamps the
/// amount to the currently active balance, then records the staker's
/// claim in the distribution pool and asks the stake pool to unlock.
pub fn unlock_stake<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    operator: Address,
    amount: u64,
) -> StakingResult<()> {
    if amount == 0 {
        return Ok(());
    }
    let contract = ledger.contract_mut(&staker, &operator)?;

    distribute_internal(env, events, staker, operator, contract)?;

    // Every buy-in this operation can perform is checked up front: the
    // operator's forced commission claim and the staker's own. A full
    // pool aborts before the first state change.
    let balances = env.stake_balances(contract.pool_address);
    let breakdown = compute_commission(
        contract.principal,
        balances.total_active()?,
        contract.commission_percentage,
    )?;
    if breakdown.commission_amount > 0 {
        contract
            .distribution_pool
            .ensure_capacity_for_all(&[operator, staker])?;
    } else {
        contract.distribution_pool.ensure_capacity_for(&staker)?;
    }

    let commission_paid = request_commission_internal(env, events, operator, contract)?;

    // Re-read after the commission unlock: part of the nominal balance
    // may be pending-active or already unlocking, so the claim is capped
    // at what is actually active.
    let balances = env.stake_balances(contract.pool_address);
    let amount = amount.min(balances.active);

    contract.principal = safe_sub(contract.principal, amount)?;

    add_distribution(env, events, operator, contract, staker, amount)?;
    env.unlock(&contract.owner_capability, amount);

    events.emit(StakingEvent::StakeUnlocked {
        operator,
        pool_address: contract.pool_address,
        amount,
        commission_paid,
    });
    Ok(())
}

/// Unlock all rewards accrued since the last checkpoint, net of the
/// operator commission still owed on them
pub fn unlock_rewards<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    operator: Address,
) -> StakingResult<()> {
    let staker_rewards = {
        let contract = ledger.contract_ref(&staker, &operator)?;
        let balances = env.stake_balances(contract.pool_address);
        let breakdown = compute_commission(
            contract.principal,
            balances.total_active()?,
            contract.commission_percentage,
        )?;
        safe_sub(breakdown.accumulated_rewards, breakdown.commission_amount)?
    };
    unlock_stake(env, ledger, events, staker, operator, staker_rewards)
}

/// Change the commission rate.
///
/// Rewards already accrued are settled and paid at the rate under which
/// they were earned before the new rate takes effect.
pub fn update_commission<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    operator: Address,
    new_commission_percentage: u64,
) -> StakingResult<()> {
    validate_commission(new_commission_percentage)?;
    let contract = ledger.contract_mut(&staker, &operator)?;

    distribute_internal(env, events, staker, operator, contract)?;
    request_commission_internal(env, events, operator, contract)?;

    let old_commission = contract.commission_percentage;
    contract.commission_percentage = new_commission_percentage;

    events.emit(StakingEvent::CommissionUpdated {
        operator,
        pool_address: contract.pool_address,
        old_commission,
        new_commission: new_commission_percentage,
    });
    Ok(())
}

/// Re-key the contract from `old_operator` to `new_operator` with a new
/// commission rate.
///
/// The departing operator is paid commission for work already done; the
/// stake pool address and owner capability are transplanted unchanged.
/// Merging into an existing contract of `new_operator` is unsupported,
/// since two live share pools cannot be combined without breaking the
/// share accounting.
pub fn switch_operator<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    old_operator: Address,
    new_operator: Address,
    new_commission_percentage: u64,
) -> StakingResult<()> {
    validate_commission(new_commission_percentage)?;

    let store = ledger.store_mut(&staker)?;
    if store.contracts.contains_key(&new_operator) {
        return Err(StakingError::ContractAlreadyExists {
            operator: new_operator,
        });
    }

    let mut contract =
        store
            .contracts
            .remove(&old_operator)
            .ok_or(StakingError::ContractNotFound {
                staker,
                operator: old_operator,
            })?;

    // Pay the departing operator before the re-key, at the old rate. On
    // failure the record goes back under its old key untouched.
    let paid = match distribute_internal(env, events, staker, old_operator, &mut contract) {
        Ok(()) => request_commission_internal(env, events, old_operator, &mut contract),
        Err(err) => Err(err),
    };
    if let Err(err) = paid {
        store.contracts.insert(old_operator, contract);
        return Err(err);
    }

    env.set_operator(&contract.owner_capability, new_operator);
    contract.commission_percentage = new_commission_percentage;
    let pool_address = contract.pool_address;
    store.contracts.insert(new_operator, contract);

    events.emit(StakingEvent::OperatorSwitched {
        old_operator,
        new_operator,
        pool_address,
    });
    Ok(())
}

/// [`switch_operator`] keeping the existing commission rate
pub fn switch_operator_with_same_commission<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    old_operator: Address,
    new_operator: Address,
) -> StakingResult<()> {
    let commission_percentage = ledger
        .contract_ref(&staker, &old_operator)?
        .commission_percentage;
    switch_operator(
        env,
        ledger,
        events,
        staker,
        old_operator,
        new_operator,
        commission_percentage,
    )
}

/// Settle all funds the stake pool has already unlocked, paying every
/// pending recipient and sweeping rounding dust to the staker
pub fn distribute<E: StakingEnv, S: EventSink>(
    env: &mut E,
    ledger: &mut StakingLedger,
    events: &mut S,
    staker: Address,
    operator: Address,
) -> StakingResult<()> {
    let contract = ledger.contract_mut(&staker, &operator)?;
    distribute_internal(env, events, staker, operator, contract)
}

// ============================================================================
// Internal Helpers
// ============================================================================

fn validate_commission(commission_percentage: u64) -> StakingResult<()> {
    if commission_percentage > MAX_COMMISSION_PERCENTAGE {
        return Err(StakingError::InvalidCommission {
            percentage: commission_percentage,
        });
    }
    Ok(())
}

/// Settle already-unlocked funds. Cheap no-op when nothing is unlocked,
/// which matters because most operations call this unconditionally.
fn distribute_internal<E: StakingEnv, S: EventSink>(
    env: &mut E,
    events: &mut S,
    staker: Address,
    operator: Address,
    contract: &mut StakingContract,
) -> StakingResult<()> {
    let pool_address = contract.pool_address;
    let balances = env.stake_balances(pool_address);
    if balances.inactive == 0 {
        return Ok(());
    }

    let mut coins = env.withdraw_unlocked(&contract.owner_capability, balances.inactive);
    let distribution_amount = coins.value();

    let pool = &mut contract.distribution_pool;
    pool.synchronize(distribution_amount);

    // Bounded payout loop: oldest recipient first, full balance each
    // time, until the pool is empty. The cardinality cap inside the pool
    // guarantees termination within MAX_PENDING_SHAREHOLDERS rounds.
    for _ in 0..MAX_PENDING_SHAREHOLDERS {
        let Some(recipient) = pool.first_shareholder() else {
            break;
        };
        let entitlement = pool.redeem_all(&recipient)?;
        let payout = coins.split(entitlement)?;
        env.deposit_coins(recipient, payout);

        events.emit(StakingEvent::DistributionPaid {
            operator,
            pool_address,
            recipient,
            amount: entitlement,
        });
    }

    // Floor-rounding residue goes to the staker, never left unspent.
    if !coins.is_zero() {
        env.deposit_coins(staker, coins);
    }
    Ok(())
}

/// Compute and claim commission against the live balance. Skips the
/// zero-rate check so forced requests from unlock/switch paths work on
/// commission-free contracts.
fn request_commission_internal<E: StakingEnv, S: EventSink>(
    env: &mut E,
    events: &mut S,
    operator: Address,
    contract: &mut StakingContract,
) -> StakingResult<u64> {
    let balances = env.stake_balances(contract.pool_address);
    let breakdown = compute_commission(
        contract.principal,
        balances.total_active()?,
        contract.commission_percentage,
    )?;

    if breakdown.commission_amount == 0 {
        // Still advance the checkpoint so sub-percent reward growth is
        // folded back into principal rather than recounted next time.
        contract.principal = breakdown.new_principal;
        return Ok(0);
    }

    // Capacity is verified before any state changes so a full pool
    // aborts the whole request cleanly.
    contract.distribution_pool.ensure_capacity_for(&operator)?;
    contract.principal = breakdown.new_principal;

    add_distribution(
        env,
        events,
        operator,
        contract,
        operator,
        breakdown.commission_amount,
    )?;
    env.unlock(&contract.owner_capability, breakdown.commission_amount);

    events.emit(StakingEvent::CommissionRequested {
        operator,
        pool_address: contract.pool_address,
        accumulated_rewards: breakdown.accumulated_rewards,
        commission_amount: breakdown.commission_amount,
    });
    Ok(breakdown.commission_amount)
}

/// Record a pending distribution claim for `recipient`.
///
/// The pool valuation is synchronized to the funds already unlocking
/// (pending-inactive) first, so the new shares are priced against the
/// live balance rather than a stale one.
fn add_distribution<E: StakingEnv, S: EventSink>(
    env: &mut E,
    events: &mut S,
    operator: Address,
    contract: &mut StakingContract,
    recipient: Address,
    coin_amount: u64,
) -> StakingResult<()> {
    if coin_amount == 0 {
        return Ok(());
    }
    let balances = env.stake_balances(contract.pool_address);
    contract
        .distribution_pool
        .synchronize(balances.pending_inactive);
    contract.distribution_pool.buy_in(recipient, coin_amount)?;

    events.emit(StakingEvent::DistributionAdded {
        operator,
        pool_address: contract.pool_address,
        amount: coin_amount,
    });
    Ok(())
}

// ============================================================================
// Queries
// ============================================================================

/// True if a contract exists between `staker` and `operator`
pub fn staking_contract_exists(
    ledger: &StakingLedger,
    staker: &Address,
    operator: &Address,
) -> bool {
    ledger
        .stores
        .get(staker)
        .map(|store| store.contracts.contains_key(operator))
        .unwrap_or(false)
}

/// Stake pool address of a contract
pub fn pool_address_of(
    ledger: &StakingLedger,
    staker: &Address,
    operator: &Address,
) -> StakingResult<Address> {
    Ok(ledger.contract_ref(staker, operator)?.pool_address)
}

/// Last recorded principal checkpoint of a contract
pub fn last_recorded_principal(
    ledger: &StakingLedger,
    staker: &Address,
    operator: &Address,
) -> StakingResult<u64> {
    Ok(ledger.contract_ref(staker, operator)?.principal)
}

/// Commission rate of a contract in percent
pub fn commission_rate_of(
    ledger: &StakingLedger,
    staker: &Address,
    operator: &Address,
) -> StakingResult<u64> {
    Ok(ledger.contract_ref(staker, operator)?.commission_percentage)
}

/// Live amounts of a contract: total active stake, rewards accrued
/// since the last checkpoint, and the commission currently owed on them
pub fn balances_of<E: StakingEnv>(
    env: &E,
    ledger: &StakingLedger,
    staker: &Address,
    operator: &Address,
) -> StakingResult<(u64, u64, u64)> {
    let contract = ledger.contract_ref(staker, operator)?;
    let balances = env.stake_balances(contract.pool_address);
    let total_active = balances.total_active()?;
    let breakdown = compute_commission(
        contract.principal,
        total_active,
        contract.commission_percentage,
    )?;
    Ok((
        total_active,
        breakdown.accumulated_rewards,
        breakdown.commission_amount,
    ))
}

/// Number of recipients with pending distribution claims
pub fn pending_distribution_count_of(
    ledger: &StakingLedger,
    staker: &Address,
    operator: &Address,
) -> StakingResult<usize> {
    Ok(ledger
        .contract_ref(staker, operator)?
        .distribution_pool
        .shareholder_count())
}

/// Coin value of a recipient's pending distribution claim
pub fn pending_distribution_of(
    ledger: &StakingLedger,
    staker: &Address,
    operator: &Address,
    recipient: &Address,
) -> StakingResult<u64> {
    Ok(ledger
        .contract_ref(staker, operator)?
        .distribution_pool
        .value_of(recipient))
}

/// Pure preview of the pool address a create call would derive
pub fn expected_stake_pool_address(
    staker: &Address,
    operator: &Address,
    contract_seed: &[u8],
) -> Address {
    derive_stake_pool_address(staker, operator, contract_seed)
}
