//! MPC engine CPI integration.
//!
//! The exchange never sees plaintext prices or amounts. All encrypted-book
//! operations are queued as computations on an external MXE program:
//!
//! 1. The exchange CPIs a `queue_*` instruction with the ciphertexts
//! 2. The MPC cluster executes the computation off-chain
//! 3. The result comes back through a callback instruction on this program,
//!    signed by the market's registered callback authority
//!
//! The interface is deliberately narrow (add_order / remove_order /
//! match_book) so any honest-majority MPC backend can stand behind it.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke;

use crate::error::DarkbookError;

/// Instruction discriminators for the MXE program's queue instructions,
/// computed as sha256("global:<instruction_name>")[0..8]
pub mod mxe_discriminators {
    /// queue_add_order
    pub const QUEUE_ADD_ORDER: [u8; 8] = [0xd1, 0x24, 0xcb, 0x83, 0x84, 0x8a, 0x5b, 0x71];
    /// queue_remove_order
    pub const QUEUE_REMOVE_ORDER: [u8; 8] = [0x33, 0x01, 0x72, 0x9f, 0x9b, 0x76, 0xd2, 0xcf];
    /// queue_match_book
    pub const QUEUE_MATCH_BOOK: [u8; 8] = [0xdb, 0x95, 0x9c, 0x8a, 0x6d, 0x91, 0x0a, 0x5b];
}

/// Discriminators of this program's callback instructions, passed to the MXE
/// so its callback authority knows where to deliver results
pub mod callback_discriminators {
    /// match_orders_callback
    pub const MATCH_ORDERS: [u8; 8] = [0xf5, 0x6a, 0x0d, 0xe8, 0xca, 0x7f, 0xef, 0x1f];
    /// cancel_order_callback
    pub const CANCEL_ORDER: [u8; 8] = [0x8a, 0x22, 0x1d, 0xe9, 0xf0, 0x08, 0xd3, 0x2a];
}

/// Accounts threaded through every queue CPI
pub struct MxeCpiAccounts<'a, 'info> {
    /// Computation slot account on the MXE (created/updated by the queue ix)
    pub computation: &'a AccountInfo<'info>,
    /// Transaction payer for the computation slot
    pub payer: &'a AccountInfo<'info>,
    /// System program
    pub system_program: &'a AccountInfo<'info>,
    /// The MXE program itself; must match the market's registered engine
    pub mxe_program: &'a AccountInfo<'info>,
}

impl<'a, 'info> MxeCpiAccounts<'a, 'info> {
    fn invoke_queue(&self, data: Vec<u8>) -> Result<()> {
        let ix = Instruction {
            program_id: *self.mxe_program.key,
            accounts: vec![
                AccountMeta::new(*self.computation.key, false),
                AccountMeta::new(*self.payer.key, true),
                AccountMeta::new_readonly(*self.system_program.key, false),
            ],
            data,
        };
        invoke(
            &ix,
            &[
                self.computation.clone(),
                self.payer.clone(),
                self.system_program.clone(),
            ],
        )
        .map_err(|_| DarkbookError::MpcComputationFailed.into())
    }
}

/// Queue insertion of an encrypted order into the market's book.
/// Data layout: disc + market_id + order_id + side + price ct + amount ct + nonce
pub fn queue_add_order(
    accounts: &MxeCpiAccounts,
    market_id: u64,
    order_id: u64,
    is_buy: bool,
    encrypted_price: &[u8; 32],
    encrypted_amount: &[u8; 32],
    nonce: &[u8; 16],
) -> Result<()> {
    let mut data = Vec::with_capacity(8 + 8 + 8 + 1 + 32 + 32 + 16);
    data.extend_from_slice(&mxe_discriminators::QUEUE_ADD_ORDER);
    data.extend_from_slice(&market_id.to_le_bytes());
    data.extend_from_slice(&order_id.to_le_bytes());
    data.push(is_buy as u8);
    data.extend_from_slice(encrypted_price);
    data.extend_from_slice(encrypted_amount);
    data.extend_from_slice(nonce);

    msg!("MPC CPI: queue_add_order (order {})", order_id);
    accounts.invoke_queue(data)
}

/// Queue removal of an order from the encrypted book. The MPC confirms via
/// cancel_order_callback, at which point the cancel is finalized on-chain.
pub fn queue_remove_order(accounts: &MxeCpiAccounts, market_id: u64, order_id: u64) -> Result<()> {
    let mut data = Vec::with_capacity(8 + 8 + 8 + 8);
    data.extend_from_slice(&mxe_discriminators::QUEUE_REMOVE_ORDER);
    data.extend_from_slice(&market_id.to_le_bytes());
    data.extend_from_slice(&order_id.to_le_bytes());
    data.extend_from_slice(&callback_discriminators::CANCEL_ORDER);

    msg!("MPC CPI: queue_remove_order (order {})", order_id);
    accounts.invoke_queue(data)
}

/// Queue a matching sweep over the market's encrypted book. The MPC scans
/// for crossing orders (buy price >= sell price, execution at the maker's
/// price) and reveals at most one matched pair via match_orders_callback.
pub fn queue_match_book(accounts: &MxeCpiAccounts, market_id: u64) -> Result<()> {
    let mut data = Vec::with_capacity(8 + 8 + 8);
    data.extend_from_slice(&mxe_discriminators::QUEUE_MATCH_BOOK);
    data.extend_from_slice(&market_id.to_le_bytes());
    data.extend_from_slice(&callback_discriminators::MATCH_ORDERS);

    msg!("MPC CPI: queue_match_book (market {})", market_id);
    accounts.invoke_queue(data)
}
