//! Error Types for the Staking Contracts
//!
//! Typed errors with data-carrying variants. Every error is synchronous
//! and surfaced to the caller of the triggering operation; no operation
//! partially applies.

use crate::types::Address;

/// Result type alias for staking operations
pub type StakingResult<T> = Result<T, StakingError>;

/// Main error enum for all staking contract errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StakingError {
    // ============ Lookup Errors ============
    /// No contract store exists for this staker
    StoreNotFound { staker: Address },

    /// No staking contract exists between this staker and operator
    ContractNotFound { staker: Address, operator: Address },

    /// Recipient holds no shares in the distribution pool
    ShareholderNotFound { recipient: Address },

    // ============ Creation / Switch Errors ============
    /// A staking contract already exists for this operator
    ContractAlreadyExists { operator: Address },

    /// Commission percentage outside [0, 100]
    InvalidCommission { percentage: u64 },

    /// Initial stake below the configured validator minimum
    StakeBelowMinimum { amount: u64, minimum: u64 },

    // ============ Commission Errors ============
    /// Commission requested on a contract whose rate is zero
    ZeroCommissionRate,

    /// Live balance dropped below the recorded principal.
    /// Signals broken checkpoint bookkeeping, not a user mistake.
    NegativeAccumulatedRewards { principal: u64, live_balance: u64 },

    // ============ Distribution Errors ============
    /// Distribution pool already holds the maximum number of recipients
    TooManyPendingRecipients { limit: usize },

    // ============ Coin Errors ============
    /// Insufficient coin balance for operation
    InsufficientBalance { available: u64, requested: u64 },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Division by zero
    DivisionByZero,
}

impl StakingError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreNotFound { .. } => "E001_STORE_NOT_FOUND",
            Self::ContractNotFound { .. } => "E002_CONTRACT_NOT_FOUND",
            Self::ShareholderNotFound { .. } => "E003_SHAREHOLDER_NOT_FOUND",
            Self::ContractAlreadyExists { .. } => "E010_CONTRACT_EXISTS",
            Self::InvalidCommission { .. } => "E011_INVALID_COMMISSION",
            Self::StakeBelowMinimum { .. } => "E012_STAKE_BELOW_MINIMUM",
            Self::ZeroCommissionRate => "E020_ZERO_COMMISSION_RATE",
            Self::NegativeAccumulatedRewards { .. } => "E021_NEGATIVE_ACCRUAL",
            Self::TooManyPendingRecipients { .. } => "E030_TOO_MANY_PENDING",
            Self::InsufficientBalance { .. } => "E040_INSUFFICIENT_BALANCE",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
        }
    }

    /// Returns true if this error is recoverable (caller can fix it)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::StakeBelowMinimum { .. } => true, // Stake more
            Self::InsufficientBalance { .. } => true, // Get more funds
            Self::TooManyPendingRecipients { .. } => true, // Wait for settlement
            _ => false,
        }
    }
}
