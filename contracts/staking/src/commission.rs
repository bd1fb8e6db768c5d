//! Commission Computation
//!
//! Pure attribution of accrued rewards between staker and operator.
//! Callers decide whether to apply the new principal and whether to
//! actually request the payout; notably, adding stake never runs this
//! computation, because newly added principal has not yet earned reward.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::commission::PERCENT_DENOMINATOR;
use crate::errors::{StakingError, StakingResult};
use crate::math::mul_div;

/// Outcome of a commission computation at one observation point
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct CommissionBreakdown {
    /// Rewards accrued since the last principal checkpoint
    pub accumulated_rewards: u64,
    /// Operator's floor-rounded cut of those rewards
    pub commission_amount: u64,
    /// Principal checkpoint to record if the commission is claimed
    pub new_principal: u64,
}

/// Compute the operator's commission against the live active balance.
///
/// ```text
/// accumulated_rewards = live_balance - principal
/// commission          = floor(accumulated_rewards * percentage / 100)
/// new_principal       = live_balance - commission
/// ```
///
/// `live_balance` is the pool's active plus pending-active stake. A live
/// balance below the recorded principal means the checkpoint bookkeeping
/// is broken and is reported as an invariant violation.
pub fn compute_commission(
    principal: u64,
    live_balance: u64,
    commission_percentage: u64,
) -> StakingResult<CommissionBreakdown> {
    let accumulated_rewards = live_balance.checked_sub(principal).ok_or(
        StakingError::NegativeAccumulatedRewards {
            principal,
            live_balance,
        },
    )?;

    let commission_amount = mul_div(
        accumulated_rewards,
        commission_percentage,
        PERCENT_DENOMINATOR,
    )?;

    Ok(CommissionBreakdown {
        accumulated_rewards,
        commission_amount,
        new_principal: live_balance - commission_amount,
    })
}
