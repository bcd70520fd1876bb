use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::error::DarkbookError;
use crate::state::{Market, UserPosition};

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(mut)]
    pub market: Account<'info, Market>,

    #[account(
        init_if_needed,
        payer = user,
        space = UserPosition::LEN,
        seeds = [
            UserPosition::SEED_PREFIX,
            market.key().as_ref(),
            user.key().as_ref()
        ],
        bump
    )]
    pub user_position: Account<'info, UserPosition>,

    /// User's token account to deposit from
    #[account(
        mut,
        constraint = user_token_account.owner == user.key() @ DarkbookError::Unauthorized
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    /// Market vault for the deposited leg (base or quote)
    #[account(
        mut,
        constraint = vault.key() == market.base_vault || vault.key() == market.quote_vault
            @ DarkbookError::InvalidMarketConfig
    )]
    pub vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Deposit>, amount: u64, is_base: bool) -> Result<()> {
    require!(amount > 0, DarkbookError::AmountTooSmall);

    let market = &mut ctx.accounts.market;
    let user_position = &mut ctx.accounts.user_position;

    // Lazily initialize the position on first deposit
    if user_position.owner == Pubkey::default() {
        user_position.owner = ctx.accounts.user.key();
        user_position.market = market.key();
        user_position.bump = ctx.bumps.user_position;
    }

    let expected_vault = if is_base {
        market.base_vault
    } else {
        market.quote_vault
    };
    require!(
        ctx.accounts.vault.key() == expected_vault,
        DarkbookError::InvalidMarketConfig
    );

    // Transfer first; the ledger credit happens only after the CPI succeeds,
    // and the whole transaction rolls back if anything after it fails.
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.user_token_account.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        amount,
    )?;

    user_position.credit(amount, is_base)?;
    market.credit_deposit(amount, is_base)?;

    emit!(Deposited {
        market: market.key(),
        user: ctx.accounts.user.key(),
        amount,
        is_base,
    });

    msg!(
        "Deposited {} {} tokens to market {}",
        amount,
        if is_base { "base" } else { "quote" },
        market.market_id
    );

    Ok(())
}

#[event]
pub struct Deposited {
    pub market: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub is_base: bool,
}
