use anchor_lang::prelude::*;

use crate::error::DarkbookError;
use crate::settlement::execute_trade;
use crate::state::{EncryptedOrder, Market, TradeSettlement, UserPosition};

/// Execute a revealed match: move the locked legs between maker and taker
/// positions, net of fee. Anyone may crank this (usually maker, taker, or
/// a keeper); idempotence comes from the settlement's `settled` flag.
///
/// Uses Box for the larger accounts to keep stack usage down.
#[derive(Accounts)]
pub struct SettleTrade<'info> {
    pub caller: Signer<'info>,

    #[account(mut)]
    pub market: Box<Account<'info, Market>>,

    #[account(
        mut,
        seeds = [
            TradeSettlement::SEED_PREFIX,
            market.key().as_ref(),
            &settlement.settlement_id.to_le_bytes()
        ],
        bump = settlement.bump,
        constraint = settlement.market == market.key() @ DarkbookError::InvalidMarketConfig
    )]
    pub settlement: Box<Account<'info, TradeSettlement>>,

    #[account(
        mut,
        seeds = [
            EncryptedOrder::SEED_PREFIX,
            market.key().as_ref(),
            &settlement.maker_order_id.to_le_bytes()
        ],
        bump = maker_order.bump,
        constraint = maker_order.owner == settlement.maker @ DarkbookError::OrderNotFound
    )]
    pub maker_order: Box<Account<'info, EncryptedOrder>>,

    #[account(
        mut,
        seeds = [
            EncryptedOrder::SEED_PREFIX,
            market.key().as_ref(),
            &settlement.taker_order_id.to_le_bytes()
        ],
        bump = taker_order.bump,
        constraint = taker_order.owner == settlement.taker @ DarkbookError::OrderNotFound
    )]
    pub taker_order: Box<Account<'info, EncryptedOrder>>,

    #[account(
        mut,
        seeds = [
            UserPosition::SEED_PREFIX,
            market.key().as_ref(),
            settlement.maker.as_ref()
        ],
        bump = maker_position.bump
    )]
    pub maker_position: Box<Account<'info, UserPosition>>,

    #[account(
        mut,
        seeds = [
            UserPosition::SEED_PREFIX,
            market.key().as_ref(),
            settlement.taker.as_ref()
        ],
        bump = taker_position.bump
    )]
    pub taker_position: Box<Account<'info, UserPosition>>,
}

pub fn handler(ctx: Context<SettleTrade>) -> Result<()> {
    let clock = Clock::get()?;

    let maker_is_buy = ctx.accounts.settlement.maker_is_buy;
    let (buyer_order, seller_order) = if maker_is_buy {
        (&mut ctx.accounts.maker_order, &mut ctx.accounts.taker_order)
    } else {
        (&mut ctx.accounts.taker_order, &mut ctx.accounts.maker_order)
    };
    let (buyer_position, seller_position) = if maker_is_buy {
        (&mut ctx.accounts.maker_position, &mut ctx.accounts.taker_position)
    } else {
        (&mut ctx.accounts.taker_position, &mut ctx.accounts.maker_position)
    };

    let outcome = execute_trade(
        &mut ctx.accounts.market,
        &mut ctx.accounts.settlement,
        buyer_order,
        seller_order,
        buyer_position,
        seller_position,
        clock.unix_timestamp,
    )?;

    let market = &ctx.accounts.market;
    let settlement = &ctx.accounts.settlement;

    emit!(TradeSettled {
        market: market.key(),
        settlement: settlement.key(),
        maker: settlement.maker,
        taker: settlement.taker,
        base_transferred: outcome.base_amount,
        quote_transferred: outcome.quote_amount,
        fee: outcome.fee,
    });

    msg!(
        "Settlement {} executed on market {}: {} base for {} quote (fee {})",
        settlement.settlement_id,
        market.market_id,
        outcome.base_amount,
        outcome.quote_amount,
        outcome.fee
    );

    Ok(())
}

#[event]
pub struct TradeSettled {
    pub market: Pubkey,
    pub settlement: Pubkey,
    pub maker: Pubkey,
    pub taker: Pubkey,
    pub base_transferred: u64,
    pub quote_transferred: u64,
    pub fee: u64,
}
