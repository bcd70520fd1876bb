use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::error::DarkbookError;
use crate::state::{Market, UserPosition};

#[derive(Accounts)]
pub struct Withdraw<'info> {
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

    /// User's token account to withdraw to
    #[account(
        mut,
        constraint = user_token_account.owner == user.key() @ DarkbookError::Unauthorized
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    /// Market vault for the withdrawn leg (base or quote)
    #[account(
        mut,
        constraint = vault.key() == market.base_vault || vault.key() == market.quote_vault
            @ DarkbookError::InvalidMarketConfig
    )]
    pub vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<Withdraw>, amount: u64, is_base: bool) -> Result<()> {
    require!(amount > 0, DarkbookError::AmountTooSmall);

    let market = &mut ctx.accounts.market;
    let user_position = &mut ctx.accounts.user_position;

    let expected_vault = if is_base {
        market.base_vault
    } else {
        market.quote_vault
    };
    require!(
        ctx.accounts.vault.key() == expected_vault,
        DarkbookError::InvalidMarketConfig
    );

    // Only the unlocked portion may leave custody. The debit itself
    // re-checks availability; funds reserved by open orders stay put.
    user_position.debit(amount, is_base)?;
    market.debit_deposit(amount, is_base)?;

    // Vault outflow signed by the market PDA
    let market_id_bytes = market.market_id.to_le_bytes();
    let market_seeds = &[
        Market::SEED_PREFIX,
        market_id_bytes.as_ref(),
        &[market.bump],
    ];
    let signer_seeds = &[&market_seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.vault.to_account_info(),
                to: ctx.accounts.user_token_account.to_account_info(),
                authority: market.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    emit!(Withdrawn {
        market: market.key(),
        user: ctx.accounts.user.key(),
        amount,
        is_base,
    });

    msg!(
        "Withdrawn {} {} tokens from market {}",
        amount,
        if is_base { "base" } else { "quote" },
        market.market_id
    );

    Ok(())
}

#[event]
pub struct Withdrawn {
    pub market: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub is_base: bool,
}
