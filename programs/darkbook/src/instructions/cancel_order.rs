use anchor_lang::prelude::*;

use crate::cpi::mpc::{self, MxeCpiAccounts};
use crate::error::DarkbookError;
use crate::settlement::finalize_cancel;
use crate::state::{EncryptedOrder, Market, OrderStatus, UserPosition};

/// Phase one of the two-phase cancel: park the order in `CancelRequested`
/// and ask the MPC to drop it from the encrypted book. Collateral stays
/// locked until the callback confirms removal - otherwise a match computation
/// already in flight could settle against funds we just released.
#[derive(Accounts)]
pub struct CancelOrder<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(mut)]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        seeds = [
            EncryptedOrder::SEED_PREFIX,
            market.key().as_ref(),
            &order.order_id.to_le_bytes()
        ],
        bump = order.bump,
        constraint = order.market == market.key() @ DarkbookError::OrderNotFound,
        constraint = order.owner == user.key() @ DarkbookError::Unauthorized
    )]
    pub order: Account<'info, EncryptedOrder>,

    /// CHECK: MXE computation slot for the remove_order queue CPI
    #[account(mut)]
    pub computation: UncheckedAccount<'info>,

    /// CHECK: Must be the market's registered MPC engine
    #[account(
        constraint = mxe_program.key() == market.mxe_program @ DarkbookError::Unauthorized
    )]
    pub mxe_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CancelOrder>) -> Result<()> {
    let market = &ctx.accounts.market;
    let order = &mut ctx.accounts.order;

    require!(order.is_matchable(), DarkbookError::OrderAlreadyCancelled);

    order.status = OrderStatus::CancelRequested;

    let mxe_accounts = MxeCpiAccounts {
        computation: &ctx.accounts.computation.to_account_info(),
        payer: &ctx.accounts.user.to_account_info(),
        system_program: &ctx.accounts.system_program.to_account_info(),
        mxe_program: &ctx.accounts.mxe_program.to_account_info(),
    };
    mpc::queue_remove_order(&mxe_accounts, market.market_id, order.order_id)?;

    emit!(OrderCancelRequested {
        market: market.key(),
        user: ctx.accounts.user.key(),
        order_id: order.order_id,
    });

    msg!(
        "Cancel requested for order {} on market {}",
        order.order_id,
        market.market_id
    );

    Ok(())
}

/// Phase two: the MPC confirmed the order left the encrypted book, so the
/// remaining reservation can be released.
#[derive(Accounts)]
pub struct CancelOrderCallback<'info> {
    #[account(
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
            &order.order_id.to_le_bytes()
        ],
        bump = order.bump,
        constraint = order.market == market.key() @ DarkbookError::OrderNotFound
    )]
    pub order: Account<'info, EncryptedOrder>,

    #[account(
        mut,
        seeds = [
            UserPosition::SEED_PREFIX,
            market.key().as_ref(),
            order.owner.as_ref()
        ],
        bump = user_position.bump
    )]
    pub user_position: Account<'info, UserPosition>,
}

pub fn callback_handler(ctx: Context<CancelOrderCallback>) -> Result<()> {
    let market = &mut ctx.accounts.market;
    let order = &mut ctx.accounts.order;
    let user_position = &mut ctx.accounts.user_position;

    let released = finalize_cancel(market, order, user_position)?;

    emit!(OrderCancelled {
        market: market.key(),
        user: order.owner,
        order_id: order.order_id,
        collateral_released: released,
    });

    msg!(
        "Order {} cancelled on market {} ({} released)",
        order.order_id,
        market.market_id,
        released
    );

    Ok(())
}

#[event]
pub struct OrderCancelRequested {
    pub market: Pubkey,
    pub user: Pubkey,
    pub order_id: u64,
}

#[event]
pub struct OrderCancelled {
    pub market: Pubkey,
    pub user: Pubkey,
    pub order_id: u64,
    pub collateral_released: u64,
}
