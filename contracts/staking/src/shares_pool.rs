//! Shares-Based Distribution Pool
//!
//! A fixed-capacity shares ledger mapping recipient to share count,
//! convertible to and from a floating total-coin valuation. Claims on
//! already-unlocked funds are held as shares until settlement pays each
//! recipient their proportional entitlement.
//!
//! ## Key Properties
//!
//! - **Synchronize-Before-Trade**: callers must synchronize the coin
//!   valuation immediately before any buy-in or redemption, so share
//!   price reflects the live balance rather than a stale one
//! - **Floor Rounding**: every conversion floors; the residue is swept
//!   to the staker at settlement, never discarded
//! - **Bounded Cardinality**: at most [`MAX_PENDING_SHAREHOLDERS`]
//!   distinct recipients; a 21st is a hard error, not a silent eviction
//! - **Insertion Order**: shareholders are stored and paid oldest-first,
//!   independent of any map iteration order

use crate::constants::distribution::MAX_PENDING_SHAREHOLDERS;
use crate::errors::{StakingError, StakingResult};
use crate::math::mul_div_u128;
use crate::types::Address;
use crate::Vec;

/// One recipient's outstanding shares. Present implies `shares > 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ShareEntry {
    recipient: Address,
    shares: u128,
}

/// Shares ledger over a floating coin valuation.
///
/// Share price is `total_coins / total_shares` (coins per share); it is
/// non-decreasing between synchronizations except immediately after a
/// redemption removes a recipient's proportional claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharesPool {
    total_coins: u64,
    total_shares: u128,
    shares: Vec<ShareEntry>,
}

impl SharesPool {
    /// Create an empty pool with a valuation of zero
    pub fn new() -> Self {
        Self {
            total_coins: 0,
            total_shares: 0,
            shares: Vec::new(),
        }
    }

    /// Overwrite the coin valuation.
    ///
    /// Must be called immediately before any buy-in or redemption;
    /// omitting it misprices shares against a stale balance.
    pub fn synchronize(&mut self, new_total_coins: u64) {
        self.total_coins = new_total_coins;
    }

    /// Current coin valuation
    pub fn total_coins(&self) -> u64 {
        self.total_coins
    }

    /// Sum of all outstanding shares
    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    /// Number of distinct recipients holding shares
    pub fn shareholder_count(&self) -> usize {
        self.shares.len()
    }

    /// True if no shares are outstanding
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// True if the recipient holds shares
    pub fn contains(&self, recipient: &Address) -> bool {
        self.shares.iter().any(|e| &e.recipient == recipient)
    }

    /// Shares held by a recipient, 0 if absent
    pub fn shares_of(&self, recipient: &Address) -> u128 {
        self.shares
            .iter()
            .find(|e| &e.recipient == recipient)
            .map(|e| e.shares)
            .unwrap_or(0)
    }

    /// Oldest-added recipient still holding shares
    pub fn first_shareholder(&self) -> Option<Address> {
        self.shares.first().map(|e| e.recipient)
    }

    /// All shareholders in insertion order
    pub fn shareholders(&self) -> Vec<Address> {
        self.shares.iter().map(|e| e.recipient).collect()
    }

    /// Check that a buy-in for `recipient` would not exceed the
    /// cardinality bound. Existing shareholders never count against it.
    pub fn ensure_capacity_for(&self, recipient: &Address) -> StakingResult<()> {
        if self.contains(recipient) || self.shares.len() < MAX_PENDING_SHAREHOLDERS {
            Ok(())
        } else {
            Err(StakingError::TooManyPendingRecipients {
                limit: MAX_PENDING_SHAREHOLDERS,
            })
        }
    }

    /// Check that buy-ins for every recipient in `recipients` would fit
    /// within the cardinality bound. Existing shareholders and
    /// duplicates within the slice do not count against it.
    pub fn ensure_capacity_for_all(&self, recipients: &[Address]) -> StakingResult<()> {
        let mut new_entries = 0usize;
        for (i, recipient) in recipients.iter().enumerate() {
            if !self.contains(recipient) && !recipients[..i].contains(recipient) {
                new_entries += 1;
            }
        }
        if self.shares.len() + new_entries <= MAX_PENDING_SHAREHOLDERS {
            Ok(())
        } else {
            Err(StakingError::TooManyPendingRecipients {
                limit: MAX_PENDING_SHAREHOLDERS,
            })
        }
    }

    /// Buy the recipient in for `coin_amount`, minting shares at the
    /// current price. Returns the number of shares minted.
    ///
    /// The first buy-in of an empty pool mints 1:1, bootstrapping the
    /// price at 1.0 so later buy-ins cannot dilute claims on coins that
    /// accrued before them.
    pub fn buy_in(&mut self, recipient: Address, coin_amount: u64) -> StakingResult<u128> {
        if coin_amount == 0 {
            return Ok(0);
        }
        self.ensure_capacity_for(&recipient)?;

        let shares = self.amount_to_shares(coin_amount)?;
        if shares > 0 {
            match self.shares.iter_mut().find(|e| e.recipient == recipient) {
                Some(entry) => {
                    entry.shares = entry
                        .shares
                        .checked_add(shares)
                        .ok_or(StakingError::Overflow)?;
                }
                None => self.shares.push(ShareEntry { recipient, shares }),
            }
        }

        self.total_coins = self
            .total_coins
            .checked_add(coin_amount)
            .ok_or(StakingError::Overflow)?;
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(StakingError::Overflow)?;
        Ok(shares)
    }

    /// Redeem the recipient's entire share balance, removing their entry
    /// and returning the floor-rounded coin entitlement.
    pub fn redeem_all(&mut self, recipient: &Address) -> StakingResult<u64> {
        let index = self
            .shares
            .iter()
            .position(|e| &e.recipient == recipient)
            .ok_or(StakingError::ShareholderNotFound {
                recipient: *recipient,
            })?;

        let shares = self.shares[index].shares;
        let entitlement = self.shares_to_amount(shares)?;

        self.shares.remove(index);
        self.total_shares -= shares;
        self.total_coins = self
            .total_coins
            .checked_sub(entitlement)
            .ok_or(StakingError::Underflow)?;
        Ok(entitlement)
    }

    /// Read-only coin value of a recipient's shares, 0 if absent
    pub fn value_of(&self, recipient: &Address) -> u64 {
        let shares = self.shares_of(recipient);
        if shares == 0 {
            return 0;
        }
        self.shares_to_amount(shares).unwrap_or(0)
    }

    fn amount_to_shares(&self, coin_amount: u64) -> StakingResult<u128> {
        if self.total_shares == 0 || self.total_coins == 0 {
            // Bootstrap (or fully drained valuation): mint 1:1
            return Ok(coin_amount as u128);
        }
        mul_div_u128(
            coin_amount as u128,
            self.total_shares,
            self.total_coins as u128,
        )
    }

    fn shares_to_amount(&self, shares: u128) -> StakingResult<u64> {
        if self.total_shares == 0 {
            return Ok(0);
        }
        let amount = mul_div_u128(shares, self.total_coins as u128, self.total_shares)?;
        if amount > u64::MAX as u128 {
            return Err(StakingError::Overflow);
        }
        Ok(amount as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        [byte; 32]
    }

    #[test]
    fn test_new_pool_empty() {
        let pool = SharesPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.total_coins(), 0);
        assert_eq!(pool.total_shares(), 0);
        assert_eq!(pool.first_shareholder(), None);
    }

    #[test]
    fn test_bootstrap_buy_in_one_to_one() {
        let mut pool = SharesPool::new();
        let shares = pool.buy_in(addr(1), 1_000).unwrap();

        assert_eq!(shares, 1_000);
        assert_eq!(pool.total_coins(), 1_000);
        assert_eq!(pool.total_shares(), 1_000);
        assert_eq!(pool.value_of(&addr(1)), 1_000);
    }

    #[test]
    fn test_buy_in_after_appreciation_does_not_dilute() {
        let mut pool = SharesPool::new();
        pool.buy_in(addr(1), 1_000).unwrap();

        // Valuation doubles before the second recipient joins
        pool.synchronize(2_000);
        let shares = pool.buy_in(addr(2), 1_000).unwrap();

        // Price is now 2.0, so 1,000 coins buys 500 shares
        assert_eq!(shares, 500);
        assert_eq!(pool.value_of(&addr(1)), 2_000);
        assert_eq!(pool.value_of(&addr(2)), 1_000);
    }

    #[test]
    fn test_redeem_all_removes_entry() {
        let mut pool = SharesPool::new();
        pool.buy_in(addr(1), 600).unwrap();
        pool.buy_in(addr(2), 400).unwrap();

        let paid = pool.redeem_all(&addr(1)).unwrap();
        assert_eq!(paid, 600);
        assert!(!pool.contains(&addr(1)));
        assert_eq!(pool.total_coins(), 400);
        assert_eq!(pool.total_shares(), 400);
    }

    #[test]
    fn test_redeem_unknown_recipient() {
        let mut pool = SharesPool::new();
        let err = pool.redeem_all(&addr(9)).unwrap_err();
        assert!(matches!(err, StakingError::ShareholderNotFound { .. }));
    }

    #[test]
    fn test_cardinality_bound() {
        let mut pool = SharesPool::new();
        for i in 0..MAX_PENDING_SHAREHOLDERS {
            pool.buy_in(addr(i as u8 + 1), 100).unwrap();
        }
        assert_eq!(pool.shareholder_count(), MAX_PENDING_SHAREHOLDERS);

        // 21st distinct recipient fails hard
        let err = pool.buy_in(addr(200), 100).unwrap_err();
        assert_eq!(
            err,
            StakingError::TooManyPendingRecipients {
                limit: MAX_PENDING_SHAREHOLDERS
            }
        );

        // Existing shareholder can still top up
        pool.buy_in(addr(1), 100).unwrap();

        // Redeeming vacates a slot for a new recipient
        pool.redeem_all(&addr(2)).unwrap();
        pool.buy_in(addr(200), 100).unwrap();
    }

    #[test]
    fn test_capacity_check_for_multiple_recipients() {
        let mut pool = SharesPool::new();
        for i in 0..MAX_PENDING_SHAREHOLDERS - 1 {
            pool.buy_in(addr(i as u8 + 1), 100).unwrap();
        }

        // One free slot: a pair with an existing member fits, and so does
        // a duplicated newcomer, but two distinct newcomers do not
        pool.ensure_capacity_for_all(&[addr(1), addr(100)]).unwrap();
        pool.ensure_capacity_for_all(&[addr(100), addr(100)]).unwrap();
        let err = pool
            .ensure_capacity_for_all(&[addr(100), addr(101)])
            .unwrap_err();
        assert_eq!(
            err,
            StakingError::TooManyPendingRecipients {
                limit: MAX_PENDING_SHAREHOLDERS
            }
        );
    }

    #[test]
    fn test_insertion_order_is_payout_order() {
        let mut pool = SharesPool::new();
        pool.buy_in(addr(3), 100).unwrap();
        pool.buy_in(addr(1), 100).unwrap();
        pool.buy_in(addr(2), 100).unwrap();

        assert_eq!(pool.first_shareholder(), Some(addr(3)));
        pool.redeem_all(&addr(3)).unwrap();
        assert_eq!(pool.first_shareholder(), Some(addr(1)));
        assert_eq!(pool.shareholders(), vec![addr(1), addr(2)]);
    }

    #[test]
    fn test_floor_rounding_leaves_dust_in_valuation() {
        let mut pool = SharesPool::new();
        pool.buy_in(addr(1), 3).unwrap();
        pool.buy_in(addr(2), 3).unwrap();

        // Valuation grows to something that does not divide evenly
        pool.synchronize(7);

        let first = pool.redeem_all(&addr(1)).unwrap();
        assert_eq!(first, 3); // floor(3 * 7 / 6)
        let second = pool.redeem_all(&addr(2)).unwrap();
        assert_eq!(second, 4); // remaining claim against remaining coins

        // Residue tracking: whatever was not entitled stays in the
        // valuation for the settlement sweep
        assert_eq!(pool.total_coins(), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_zero_amount_buy_in_is_noop() {
        let mut pool = SharesPool::new();
        assert_eq!(pool.buy_in(addr(1), 0).unwrap(), 0);
        assert!(pool.is_empty());
        assert_eq!(pool.total_coins(), 0);
    }

    #[test]
    fn test_value_of_absent_recipient() {
        let mut pool = SharesPool::new();
        pool.buy_in(addr(1), 100).unwrap();
        assert_eq!(pool.value_of(&addr(2)), 0);
    }
}
