use anchor_lang::prelude::*;

use crate::error::DarkbookError;

/// Prices are fixed-point, scaled by 10^6 (e.g. $100.50 = 100_500_000)
pub const PRICE_SCALE: u64 = 1_000_000;

/// Audit record for one revealed match. Created by the match callback with
/// the plaintext execution parameters, consumed exactly once by settlement.
/// Seeds: ["settlement", market, settlement_id]
#[account]
#[derive(Default)]
pub struct TradeSettlement {
    /// Market where the trade occurred
    pub market: Pubkey,

    /// Market-scoped sequential identifier
    pub settlement_id: u64,

    /// Owner of the resting order
    pub maker: Pubkey,

    /// Owner of the crossing order
    pub taker: Pubkey,

    /// Maker's order ID
    pub maker_order_id: u64,

    /// Taker's order ID
    pub taker_order_id: u64,

    /// Execution price, scaled by 10^6 (maker price priority)
    pub execution_price: u64,

    /// Execution amount in base tokens
    pub execution_amount: u64,

    /// Whether the maker was the buyer
    pub maker_is_buy: bool,

    /// False until settlement executes; transitions true exactly once
    pub settled: bool,

    /// Timestamp of the match callback
    pub matched_at: i64,

    /// Timestamp of settlement (0 while unsettled)
    pub settled_at: i64,

    /// PDA bump seed
    pub bump: u8,
}

impl TradeSettlement {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // market
        8 +   // settlement_id
        32 +  // maker
        32 +  // taker
        8 +   // maker_order_id
        8 +   // taker_order_id
        8 +   // execution_price
        8 +   // execution_amount
        1 +   // maker_is_buy
        1 +   // settled
        8 +   // matched_at
        8 +   // settled_at
        1;    // bump

    pub const SEED_PREFIX: &'static [u8] = b"settlement";

    /// Quote tokens exchanged for `execution_amount` base at
    /// `execution_price`
    pub fn quote_amount(&self) -> Result<u64> {
        quote_notional(self.execution_amount, self.execution_price)
    }
}

/// Quote tokens exchanged for `base_amount` at `price`:
/// quote = base * price / 10^6
pub fn quote_notional(base_amount: u64, price: u64) -> Result<u64> {
    let quote = (base_amount as u128)
        .checked_mul(price as u128)
        .ok_or(DarkbookError::MathOverflow)?
        / PRICE_SCALE as u128;
    u64::try_from(quote).map_err(|_| DarkbookError::MathOverflow.into())
}
