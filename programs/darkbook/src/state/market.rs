use anchor_lang::prelude::*;

use crate::error::DarkbookError;

/// Maximum trading fee: 100 bps = 1%
pub const MAX_FEE_RATE_BPS: u16 = 100;

/// Market account representing one trading pair (e.g. SOL/USDC)
/// Seeds: ["market", market_id]
#[account]
#[derive(Default)]
pub struct Market {
    /// Authority that created the market
    pub authority: Pubkey,

    /// Base token mint
    pub base_mint: Pubkey,

    /// Quote token mint
    pub quote_mint: Pubkey,

    /// Token vault holding all deposited base tokens
    pub base_vault: Pubkey,

    /// Token vault holding all deposited quote tokens
    pub quote_vault: Pubkey,

    /// Registered MPC callback signer - the only key allowed to deliver
    /// computation results for this market
    pub callback_authority: Pubkey,

    /// MPC engine program that computations are queued on
    pub mxe_program: Pubkey,

    /// Unique market identifier
    pub market_id: u64,

    /// Trading fee in basis points (100 = 1%)
    pub fee_rate_bps: u16,

    /// Monotonic counter for generating order IDs
    pub order_count: u64,

    /// Monotonic counter for generating settlement IDs
    pub settlement_count: u64,

    /// Total base tokens deposited across all positions
    pub base_deposited: u64,

    /// Total quote tokens deposited across all positions
    pub quote_deposited: u64,

    /// Total base tokens locked in open orders across all positions
    pub base_locked: u64,

    /// Total quote tokens locked in open orders across all positions
    pub quote_locked: u64,

    /// Quote-leg fees accrued to the protocol, still held in the quote vault
    pub quote_fees_accrued: u64,

    /// Number of buy orders in the encrypted book
    pub active_bids: u32,

    /// Number of sell orders in the encrypted book
    pub active_asks: u32,

    /// Whether a match computation is currently in flight.
    /// Only one computation may mutate this market's lock state at a time.
    pub match_in_flight: bool,

    /// PDA bump seed
    pub bump: u8,
}

impl Market {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // authority
        32 +  // base_mint
        32 +  // quote_mint
        32 +  // base_vault
        32 +  // quote_vault
        32 +  // callback_authority
        32 +  // mxe_program
        8 +   // market_id
        2 +   // fee_rate_bps
        8 +   // order_count
        8 +   // settlement_count
        8 +   // base_deposited
        8 +   // quote_deposited
        8 +   // base_locked
        8 +   // quote_locked
        8 +   // quote_fees_accrued
        4 +   // active_bids
        4 +   // active_asks
        1 +   // match_in_flight
        1;    // bump

    pub const SEED_PREFIX: &'static [u8] = b"market";

    /// Fee on a quote amount, rounded down
    pub fn calculate_fee(&self, quote_amount: u64) -> Result<u64> {
        let fee = (quote_amount as u128)
            .checked_mul(self.fee_rate_bps as u128)
            .ok_or(DarkbookError::MathOverflow)?
            / 10_000;
        u64::try_from(fee).map_err(|_| DarkbookError::MathOverflow.into())
    }

    /// Credit a deposit to the market-wide aggregate
    pub fn credit_deposit(&mut self, amount: u64, is_base: bool) -> Result<()> {
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

    /// Debit a withdrawal from the market-wide aggregate
    pub fn debit_deposit(&mut self, amount: u64, is_base: bool) -> Result<()> {
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

    /// Add to the aggregate locked total for one leg
    pub fn lock(&mut self, amount: u64, is_quote: bool) -> Result<()> {
        let locked = if is_quote {
            &mut self.quote_locked
        } else {
            &mut self.base_locked
        };
        *locked = locked
            .checked_add(amount)
            .ok_or(DarkbookError::MathOverflow)?;
        Ok(())
    }

    /// Release from the aggregate locked total for one leg.
    /// Going negative means per-position and market accounting diverged,
    /// which is a fatal invariant break.
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
}
