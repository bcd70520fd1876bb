use anchor_lang::prelude::*;

use crate::error::DarkbookError;

/// Cap on simultaneously open orders per position
pub const MAX_ACTIVE_ORDERS: u8 = 32;

/// Per-(market, owner) deposit and lock ledger
/// Seeds: ["user_position", market, owner]
#[account]
#[derive(Default)]
pub struct UserPosition {
    /// Owner of this position
    pub owner: Pubkey,

    /// Market this position belongs to
    pub market: Pubkey,

    /// Total base tokens custodied (available + locked)
    pub base_deposited: u64,

    /// Total quote tokens custodied (available + locked)
    pub quote_deposited: u64,

    /// Base tokens reserved against open sell orders
    pub base_locked: u64,

    /// Quote tokens reserved against open buy orders
    pub quote_locked: u64,

    /// Number of orders currently holding a reservation
    pub active_order_count: u8,

    /// PDA bump seed
    pub bump: u8,
}

impl UserPosition {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // owner
        32 +  // market
        8 +   // base_deposited
        8 +   // quote_deposited
        8 +   // base_locked
        8 +   // quote_locked
        1 +   // active_order_count
        1;    // bump

    pub const SEED_PREFIX: &'static [u8] = b"user_position";

    /// Base tokens not reserved by any order
    pub fn base_available(&self) -> u64 {
        self.base_deposited.saturating_sub(self.base_locked)
    }

    /// Quote tokens not reserved by any order
    pub fn quote_available(&self) -> u64 {
        self.quote_deposited.saturating_sub(self.quote_locked)
    }

    pub fn available(&self, is_base: bool) -> u64 {
        if is_base {
            self.base_available()
        } else {
            self.quote_available()
        }
    }

    /// Credit a deposit. Called only after the token transfer succeeded.
    pub fn credit(&mut self, amount: u64, is_base: bool) -> Result<()> {
        let total = if is_base {
            &mut self.base_deposited
        } else {
            &mut self.quote_deposited
        };
        *total = total
            .checked_add(amount)
            .ok_or(DarkbookError::MathOverflow)?;
        Ok(())
    }

    /// Debit a withdrawal. The caller must have checked `available` first;
    /// dipping into locked funds here is a fatal invariant break.
    pub fn debit(&mut self, amount: u64, is_base: bool) -> Result<()> {
        require!(self.available(is_base) >= amount, DarkbookError::InsufficientBalance);
        let total = if is_base {
            &mut self.base_deposited
        } else {
            &mut self.quote_deposited
        };
        *total = total
            .checked_sub(amount)
            .ok_or(DarkbookError::MathOverflow)?;
        Ok(())
    }

    /// Reserve collateral for a new order on the leg it spends
    /// (quote for buys, base for sells).
    pub fn lock(&mut self, amount: u64, is_quote: bool) -> Result<()> {
        let (available, locked) = if is_quote {
            (self.quote_available(), &mut self.quote_locked)
        } else {
            (self.base_available(), &mut self.base_locked)
        };
        require!(available >= amount, DarkbookError::InsufficientBalance);
        *locked = locked
            .checked_add(amount)
            .ok_or(DarkbookError::MathOverflow)?;
        Ok(())
    }

    /// Release a reservation. Unlocking more than is locked means the order
    /// and position ledgers diverged, which is a fatal invariant break.
    pub fn unlock(&mut self, amount: u64, is_quote: bool) -> Result<()> {
        let locked = if is_quote {
            &mut self.quote_locked
        } else {
            &mut self.base_locked
        };
        *locked = locked
            .checked_sub(amount)
            .ok_or(DarkbookError::MathOverflow)?;
        Ok(())
    }

    /// Lock invariant: reserved funds never exceed custodied funds
    pub fn invariants_hold(&self) -> bool {
        self.base_locked <= self.base_deposited && self.quote_locked <= self.quote_deposited
    }
}
