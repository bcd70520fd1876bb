use anchor_lang::prelude::*;
use anchor_lang::AccountsClose;

use crate::cpi::mpc::{self, MxeCpiAccounts};
use crate::error::DarkbookError;
use crate::settlement::apply_match_result;
use crate::state::{EncryptedOrder, Market, Side, TradeSettlement};

/// Trigger a matching sweep over the market's encrypted book.
/// Anyone may call this; the result arrives asynchronously via
/// `match_orders_callback`. One computation per market at a time.
#[derive(Accounts)]
pub struct MatchOrders<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(mut)]
    pub market: Account<'info, Market>,

    /// CHECK: MXE computation slot for the match_book queue CPI
    #[account(mut)]
    pub computation: UncheckedAccount<'info>,

    /// CHECK: Must be the market's registered MPC engine
    #[account(
        constraint = mxe_program.key() == market.mxe_program @ DarkbookError::Unauthorized
    )]
    pub mxe_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<MatchOrders>) -> Result<()> {
    let market = &mut ctx.accounts.market;

    require!(
        market.active_bids > 0 && market.active_asks > 0,
        DarkbookError::NoMatchingOrders
    );
    // A second sweep against the same lock state must wait for the first
    // callback; the caller can retry once the slot is free.
    require!(!market.match_in_flight, DarkbookError::ComputationNotReady);

    market.match_in_flight = true;

    let mxe_accounts = MxeCpiAccounts {
        computation: &ctx.accounts.computation.to_account_info(),
        payer: &ctx.accounts.caller.to_account_info(),
        system_program: &ctx.accounts.system_program.to_account_info(),
        mxe_program: &ctx.accounts.mxe_program.to_account_info(),
    };
    mpc::queue_match_book(&mxe_accounts, market.market_id)?;

    emit!(MatchRequested {
        market: market.key(),
        active_bids: market.active_bids,
        active_asks: market.active_asks,
    });

    msg!(
        "Match requested on market {} ({} bids, {} asks)",
        market.market_id,
        market.active_bids,
        market.active_asks
    );

    Ok(())
}

/// Result delivery for a matching sweep. Only the market's registered
/// callback authority may invoke this, exactly once per computation.
///
/// On `matched = false` the order and settlement accounts are omitted and
/// the only effect is freeing the computation slot. On a match, the orders
/// are re-validated (either may have been cancel-requested since the sweep
/// was queued); a pair that lost that race, or a malformed result, voids
/// the match and closes the settlement account. Otherwise fills are
/// recorded and the settlement audit record is created with the revealed
/// execution parameters.
#[derive(Accounts)]
#[instruction(
    matched: bool,
    execution_price: u64,
    execution_amount: u64,
    maker_order_id: u64,
    taker_order_id: u64
)]
pub struct MatchOrdersCallback<'info> {
    #[account(
        mut,
        constraint = callback_authority.key() == market.callback_authority
            @ DarkbookError::Unauthorized
    )]
    pub callback_authority: Signer<'info>,

    #[account(mut)]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        seeds = [
            EncryptedOrder::SEED_PREFIX,
            market.key().as_ref(),
            &maker_order_id.to_le_bytes()
        ],
        bump = maker_order.bump
    )]
    pub maker_order: Option<Account<'info, EncryptedOrder>>,

    #[account(
        mut,
        seeds = [
            EncryptedOrder::SEED_PREFIX,
            market.key().as_ref(),
            &taker_order_id.to_le_bytes()
        ],
        bump = taker_order.bump
    )]
    pub taker_order: Option<Account<'info, EncryptedOrder>>,

    /// Audit record for the revealed match, at the next settlement slot
    #[account(
        init,
        payer = callback_authority,
        space = TradeSettlement::LEN,
        seeds = [
            TradeSettlement::SEED_PREFIX,
            market.key().as_ref(),
            &market.settlement_count.to_le_bytes()
        ],
        bump
    )]
    pub settlement: Option<Account<'info, TradeSettlement>>,

    pub system_program: Program<'info, System>,
}

pub fn callback_handler(
    ctx: Context<MatchOrdersCallback>,
    matched: bool,
    execution_price: u64,
    execution_amount: u64,
    maker_order_id: u64,
    taker_order_id: u64,
    maker_fully_filled: bool,
    taker_fully_filled: bool,
) -> Result<()> {
    let market = &mut ctx.accounts.market;
    let clock = Clock::get()?;

    // The computation is done either way; the slot frees even when the
    // result cannot be applied.
    market.match_in_flight = false;

    if !matched {
        msg!("No crossing orders on market {}", market.market_id);
        return Ok(());
    }

    let maker_order = ctx
        .accounts
        .maker_order
        .as_mut()
        .ok_or(DarkbookError::OrderNotFound)?;
    let taker_order = ctx
        .accounts
        .taker_order
        .as_mut()
        .ok_or(DarkbookError::OrderNotFound)?;
    let settlement = ctx
        .accounts
        .settlement
        .as_mut()
        .ok_or(DarkbookError::InvalidOrderParams)?;

    // Either order may have been cancel-requested while the computation ran,
    // and a faulty cluster could reveal a zero price or amount. Both void
    // the match; erroring here would roll back the slot release above and
    // wedge the market. The just-created settlement account is refunded.
    if !apply_match_result(
        market,
        maker_order,
        taker_order,
        execution_price,
        execution_amount,
        maker_fully_filled,
        taker_fully_filled,
    )? {
        settlement.close(ctx.accounts.callback_authority.to_account_info())?;

        emit!(MatchVoided {
            market: market.key(),
            maker_order_id,
            taker_order_id,
        });

        msg!(
            "Match of orders {} and {} voided on market {}",
            maker_order_id,
            taker_order_id,
            market.market_id
        );
        return Ok(());
    }

    let settlement_id = market.settlement_count;
    market.settlement_count = market
        .settlement_count
        .checked_add(1)
        .ok_or(DarkbookError::MathOverflow)?;

    settlement.market = market.key();
    settlement.settlement_id = settlement_id;
    settlement.maker = maker_order.owner;
    settlement.taker = taker_order.owner;
    settlement.maker_order_id = maker_order_id;
    settlement.taker_order_id = taker_order_id;
    settlement.execution_price = execution_price;
    settlement.execution_amount = execution_amount;
    settlement.maker_is_buy = maker_order.side == Side::Buy;
    settlement.settled = false;
    settlement.matched_at = clock.unix_timestamp;
    settlement.settled_at = 0;
    settlement.bump = ctx.bumps.settlement.unwrap_or_default();

    // Execution parameters become public here, by design
    emit!(OrdersMatched {
        market: market.key(),
        settlement: settlement.key(),
        maker: settlement.maker,
        taker: settlement.taker,
        maker_order_id,
        taker_order_id,
        execution_price,
        execution_amount,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Orders {} and {} matched on market {}: {} base @ {}",
        maker_order_id,
        taker_order_id,
        market.market_id,
        execution_amount,
        execution_price
    );

    Ok(())
}

#[event]
pub struct MatchRequested {
    pub market: Pubkey,
    pub active_bids: u32,
    pub active_asks: u32,
}

#[event]
pub struct MatchVoided {
    pub market: Pubkey,
    pub maker_order_id: u64,
    pub taker_order_id: u64,
}

#[event]
pub struct OrdersMatched {
    pub market: Pubkey,
    pub settlement: Pubkey,
    pub maker: Pubkey,
    pub taker: Pubkey,
    pub maker_order_id: u64,
    pub taker_order_id: u64,
    /// Revealed execution price (scaled by 10^6, maker price priority)
    pub execution_price: u64,
    /// Revealed execution amount in base tokens
    pub execution_amount: u64,
    pub timestamp: i64,
}
