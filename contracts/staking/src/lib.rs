//! StakeShare Staking Library
//!
//! Reward-sharing staking contracts between a staker (capital provider)
//! and an operator (validator runner), built on top of an external
//! stake-pool primitive that accrues rewards over epochs and enforces
//! lock/unlock timing.
//!
//! ## Key Features
//!
//! - **Principal Checkpointing**: Staker capital is checkpointed so that
//!   accrued rewards can be attributed at any point in the lockup cycle
//! - **Commission Accounting**: Operators earn a percentage of rewards
//!   accrued since the last checkpoint, floor-rounded and idempotent
//! - **Shares-Based Distribution**: Unlocked funds are tracked as shares
//!   in a bounded pool until the lockup elapses and they can be paid out
//! - **Dust Sweeping**: Floor-rounding residue from settlement always
//!   lands in the staker's account, never lost
//! - **Operator Switching**: Contracts re-key to a new operator without
//!   destroying the stake pool or its capability
//! - **Capability Exclusivity**: The owner capability that moves pool
//!   funds is a move-only token held exclusively by its contract record
//!
//! The underlying stake-pool, coin/account, and configuration primitives
//! are consumed through the [`StakingEnv`] trait; tests run against a
//! deterministic in-memory simulator.
//!
//! This crate is `no_std` compatible for embedded/proving environments
//! when built without the default `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export collection types for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::{collections::BTreeMap, vec::Vec};
#[cfg(feature = "std")]
pub use std::{collections::BTreeMap, vec::Vec};

pub mod account;
pub mod commission;
pub mod constants;
pub mod contract;
pub mod env;
pub mod errors;
pub mod events;
pub mod math;
pub mod shares_pool;
pub mod types;

#[cfg(test)]
mod sim;


// Re-exports for convenience
pub use account::*;
pub use commission::*;
pub use constants::*;
pub use contract::*;
pub use env::*;
pub use errors::*;
pub use events::*;
pub use math::*;
pub use shares_pool::*;
pub use types::*;
