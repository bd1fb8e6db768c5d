//! Protocol Constants
//!
//! All magic numbers and configuration values for the staking contracts.

/// Token Metadata
pub mod token {
    /// Decimal places of the staked coin
    pub const DECIMALS: u8 = 8;
    /// One unit with decimals (1 coin = 100_000_000 base units)
    pub const ONE: u64 = 100_000_000;
}

/// Commission Configuration (in percentage points, e.g., 10 = 10%)
pub mod commission {
    /// Maximum commission an operator can charge (100%)
    pub const MAX_COMMISSION_PERCENTAGE: u64 = 100;

    /// Percentage denominator
    pub const PERCENT_DENOMINATOR: u64 = 100;
}

/// Distribution Pool Configuration
pub mod distribution {
    /// Hard cap on simultaneous pending recipients in a distribution pool.
    ///
    /// Bounds the settlement loop so payout cost stays predictable.
    /// Adding a recipient past this cap is an error, never a silent
    /// eviction.
    pub const MAX_PENDING_SHAREHOLDERS: usize = 20;
}

/// Sub-account Derivation Configuration
pub mod account {
    /// Domain-separation salt mixed into every stake pool seed.
    ///
    /// Keeps pool addresses derived here from colliding with sub-accounts
    /// derived by any other module hashing the same (staker, operator)
    /// inputs.
    pub const CONTRACT_SALT: &[u8] = b"stakeshare::staking_contract";
}
