use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::error::DarkbookError;
use crate::state::{Market, MAX_FEE_RATE_BPS};

#[derive(Accounts)]
#[instruction(market_id: u64)]
pub struct InitializeMarket<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = Market::LEN,
        seeds = [Market::SEED_PREFIX, market_id.to_le_bytes().as_ref()],
        bump
    )]
    pub market: Account<'info, Market>,

    /// Base token mint (e.g. wSOL)
    pub base_mint: Account<'info, Mint>,

    /// Quote token mint (e.g. USDC)
    pub quote_mint: Account<'info, Mint>,

    /// Pooled custody for base tokens, authority = market PDA
    #[account(
        init,
        payer = authority,
        token::mint = base_mint,
        token::authority = market,
        seeds = [b"base_vault", market.key().as_ref()],
        bump
    )]
    pub base_vault: Account<'info, TokenAccount>,

    /// Pooled custody for quote tokens, authority = market PDA
    #[account(
        init,
        payer = authority,
        token::mint = quote_mint,
        token::authority = market,
        seeds = [b"quote_vault", market.key().as_ref()],
        bump
    )]
    pub quote_vault: Account<'info, TokenAccount>,

    /// CHECK: The MPC callback signer registered for this market. Every
    /// computation result must be delivered by this key.
    pub callback_authority: UncheckedAccount<'info>,

    /// CHECK: The MXE program computations are queued on. Validated against
    /// this registration on every queue CPI.
    pub mxe_program: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeMarket>, market_id: u64, fee_rate_bps: u16) -> Result<()> {
    require!(
        fee_rate_bps <= MAX_FEE_RATE_BPS,
        DarkbookError::InvalidMarketConfig
    );
    require!(
        ctx.accounts.base_mint.key() != ctx.accounts.quote_mint.key(),
        DarkbookError::InvalidMarketConfig
    );

    let market = &mut ctx.accounts.market;
    market.authority = ctx.accounts.authority.key();
    market.base_mint = ctx.accounts.base_mint.key();
    market.quote_mint = ctx.accounts.quote_mint.key();
    market.base_vault = ctx.accounts.base_vault.key();
    market.quote_vault = ctx.accounts.quote_vault.key();
    market.callback_authority = ctx.accounts.callback_authority.key();
    market.mxe_program = ctx.accounts.mxe_program.key();
    market.market_id = market_id;
    market.fee_rate_bps = fee_rate_bps;
    market.order_count = 0;
    market.settlement_count = 0;
    market.base_deposited = 0;
    market.quote_deposited = 0;
    market.base_locked = 0;
    market.quote_locked = 0;
    market.quote_fees_accrued = 0;
    market.active_bids = 0;
    market.active_asks = 0;
    market.match_in_flight = false;
    market.bump = ctx.bumps.market;

    emit!(MarketCreated {
        market: market.key(),
        market_id,
        base_mint: market.base_mint,
        quote_mint: market.quote_mint,
        authority: market.authority,
        fee_rate_bps,
    });

    msg!(
        "Market {} initialized: {}/{} (fee {} bps)",
        market_id,
        market.base_mint,
        market.quote_mint,
        fee_rate_bps
    );

    Ok(())
}

#[event]
pub struct MarketCreated {
    pub market: Pubkey,
    pub market_id: u64,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub authority: Pubkey,
    pub fee_rate_bps: u16,
}
