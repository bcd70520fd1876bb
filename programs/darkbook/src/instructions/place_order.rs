use anchor_lang::prelude::*;

use crate::cpi::mpc::{self, MxeCpiAccounts};
use crate::error::DarkbookError;
use crate::settlement::reserve_for_order;
use crate::state::{EncryptedOrder, Market, OrderStatus, Side, UserPosition};

#[derive(Accounts)]
pub struct PlaceOrder<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(mut)]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        seeds = [
            UserPosition::SEED_PREFIX,
            market.key().as_ref(),
            user.key().as_ref()
        ],
        bump = user_position.bump,
        constraint = user_position.owner == user.key() @ DarkbookError::Unauthorized
    )]
    pub user_position: Account<'info, UserPosition>,

    /// Order record at the next sequence slot
    #[account(
        init,
        payer = user,
        space = EncryptedOrder::LEN,
        seeds = [
            EncryptedOrder::SEED_PREFIX,
            market.key().as_ref(),
            &market.order_count.to_le_bytes()
        ],
        bump
    )]
    pub order: Account<'info, EncryptedOrder>,

    /// CHECK: MXE computation slot for the add_order queue CPI
    #[account(mut)]
    pub computation: UncheckedAccount<'info>,

    /// CHECK: Must be the market's registered MPC engine
    #[account(
        constraint = mxe_program.key() == market.mxe_program @ DarkbookError::Unauthorized
    )]
    pub mxe_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<PlaceOrder>,
    side: Side,
    encrypted_price: [u8; 32],
    encrypted_amount: [u8; 32],
    nonce: [u8; 16],
    worst_case_collateral: u64,
) -> Result<()> {
    let market = &mut ctx.accounts.market;
    let user_position = &mut ctx.accounts.user_position;
    let order = &mut ctx.accounts.order;
    let clock = Clock::get()?;

    // The true notional is opaque to this program; the client declares the
    // upper bound it is willing to reserve. A zero bound can never settle.
    require!(worst_case_collateral > 0, DarkbookError::InvalidOrderParams);
    require!(
        encrypted_price != [0u8; 32] && encrypted_amount != [0u8; 32],
        DarkbookError::InvalidEncryptedData
    );

    reserve_for_order(market, user_position, side, worst_case_collateral)?;

    let order_id = market.order_count;
    market.order_count = market
        .order_count
        .checked_add(1)
        .ok_or(DarkbookError::MathOverflow)?;

    order.owner = ctx.accounts.user.key();
    order.market = market.key();
    order.order_id = order_id;
    order.side = side;
    order.status = OrderStatus::Open;
    order.encrypted_price = encrypted_price;
    order.encrypted_amount = encrypted_amount;
    order.nonce = nonce;
    order.collateral_locked = worst_case_collateral;
    order.collateral_pending = 0;
    order.filled_base = 0;
    order.submitted_at = clock.unix_timestamp;
    order.bump = ctx.bumps.order;

    // Hand the ciphertexts to the encrypted book
    let mxe_accounts = MxeCpiAccounts {
        computation: &ctx.accounts.computation.to_account_info(),
        payer: &ctx.accounts.user.to_account_info(),
        system_program: &ctx.accounts.system_program.to_account_info(),
        mxe_program: &ctx.accounts.mxe_program.to_account_info(),
    };
    mpc::queue_add_order(
        &mxe_accounts,
        market.market_id,
        order_id,
        side == Side::Buy,
        &encrypted_price,
        &encrypted_amount,
        &nonce,
    )?;

    // No price, no amount - sides and ids are the only public facts
    emit!(OrderPlaced {
        market: market.key(),
        user: ctx.accounts.user.key(),
        order_id,
        side,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Order {} placed: {:?} on market {}",
        order_id,
        side,
        market.market_id
    );

    Ok(())
}

#[event]
pub struct OrderPlaced {
    pub market: Pubkey,
    pub user: Pubkey,
    pub order_id: u64,
    pub side: Side,
    pub timestamp: i64,
}
