//! Deterministic Sub-Account Derivation
//!
//! Every staking contract controls its own stake pool, hosted at an
//! address derived from `hash(staker || operator || salt || extra_seed)`.
//! Distinct (staker, operator, seed) triples therefore cannot collide,
//! and re-creating a contract after deletion would require a different
//! seed.

use sha2::{Digest, Sha256};

use crate::constants::account::CONTRACT_SALT;
use crate::types::Address;
use crate::Vec;

/// Build the full seed for a (staker, operator) stake pool.
///
/// `extra_seed` is caller-supplied entropy that lets one pair hold
/// multiple historical pools without address reuse.
pub fn create_pool_seed(staker: &Address, operator: &Address, extra_seed: &[u8]) -> Vec<u8> {
    let mut seed = Vec::with_capacity(64 + CONTRACT_SALT.len() + extra_seed.len());
    seed.extend_from_slice(staker);
    seed.extend_from_slice(operator);
    seed.extend_from_slice(CONTRACT_SALT);
    seed.extend_from_slice(extra_seed);
    seed
}

/// Derive the stake pool address for a (staker, operator, seed) triple.
///
/// Pure function: collision resistance comes from the hash input domain,
/// not from runtime uniqueness checks.
pub fn derive_stake_pool_address(
    staker: &Address,
    operator: &Address,
    extra_seed: &[u8],
) -> Address {
    let seed = create_pool_seed(staker, operator, extra_seed);
    let digest = Sha256::digest(&seed);
    let mut address = [0u8; 32];
    address.copy_from_slice(&digest);
    address
}
