//! Darkbook - a privacy-preserving limit-order exchange.
//!
//! Users deposit collateral into market vaults, place limit orders whose
//! price and size exist on-chain only as ciphertext, and an external MPC
//! network matches the encrypted book. Execution parameters are revealed
//! to this program only at match time, through a callback gated on each
//! market's registered authority, and settled against the internal
//! position ledger.

use anchor_lang::prelude::*;

pub mod cpi;
pub mod error;
pub mod instructions;
pub mod settlement;
pub mod state;

use instructions::*;
use state::Side;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod darkbook {
    use super::*;

    /// Create a trading market (e.g. SOL/USDC) with its custody vaults and
    /// registered MPC callback authority
    pub fn initialize_market(
        ctx: Context<InitializeMarket>,
        market_id: u64,
        fee_rate_bps: u16,
    ) -> Result<()> {
        instructions::initialize_market::handler(ctx, market_id, fee_rate_bps)
    }

    /// Deposit tokens into the market vault for trading
    pub fn deposit(ctx: Context<Deposit>, amount: u64, is_base: bool) -> Result<()> {
        instructions::deposit::handler(ctx, amount, is_base)
    }

    /// Withdraw unlocked tokens from the market vault
    pub fn withdraw(ctx: Context<Withdraw>, amount: u64, is_base: bool) -> Result<()> {
        instructions::withdraw::handler(ctx, amount, is_base)
    }

    /// Place an encrypted limit order, reserving the declared worst-case
    /// collateral on the spending leg
    pub fn place_order(
        ctx: Context<PlaceOrder>,
        side: Side,
        encrypted_price: [u8; 32],
        encrypted_amount: [u8; 32],
        nonce: [u8; 16],
        worst_case_collateral: u64,
    ) -> Result<()> {
        instructions::place_order::handler(
            ctx,
            side,
            encrypted_price,
            encrypted_amount,
            nonce,
            worst_case_collateral,
        )
    }

    /// Request cancellation of an order (phase one of the two-phase cancel)
    pub fn cancel_order(ctx: Context<CancelOrder>) -> Result<()> {
        instructions::cancel_order::handler(ctx)
    }

    /// MPC confirmation that a cancelled order left the encrypted book;
    /// releases the remaining reservation
    pub fn cancel_order_callback(ctx: Context<CancelOrderCallback>) -> Result<()> {
        instructions::cancel_order::callback_handler(ctx)
    }

    /// Trigger a matching sweep over the encrypted book. Anyone can crank
    /// this; the result arrives via match_orders_callback
    pub fn match_orders(ctx: Context<MatchOrders>) -> Result<()> {
        instructions::match_orders::handler(ctx)
    }

    /// Result delivery for a matching sweep, signed by the market's
    /// registered callback authority. Creates the settlement audit record
    /// when a match was found
    pub fn match_orders_callback(
        ctx: Context<MatchOrdersCallback>,
        matched: bool,
        execution_price: u64,
        execution_amount: u64,
        maker_order_id: u64,
        taker_order_id: u64,
        maker_fully_filled: bool,
        taker_fully_filled: bool,
    ) -> Result<()> {
        instructions::match_orders::callback_handler(
            ctx,
            matched,
            execution_price,
            execution_amount,
            maker_order_id,
            taker_order_id,
            maker_fully_filled,
            taker_fully_filled,
        )
    }

    /// Settle a matched trade by moving the locked legs between positions
    pub fn settle_trade(ctx: Context<SettleTrade>) -> Result<()> {
        instructions::settle_trade::handler(ctx)
    }
}
