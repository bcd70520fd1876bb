use anchor_lang::prelude::*;

/// Order side
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Side {
    #[default]
    Buy,
    Sell,
}

impl Side {
    /// Which leg an order on this side spends (and therefore locks)
    pub fn locks_quote(&self) -> bool {
        matches!(self, Side::Buy)
    }
}

/// Order lifecycle state.
///
/// `Open -> PartiallyFilled -> Filled` on matches, or
/// `Open | PartiallyFilled -> CancelRequested -> Cancelled` on cancellation.
/// `CancelRequested` is the window between the user's cancel and the MPC
/// confirming removal from the encrypted book; orders in it are not matchable.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum OrderStatus {
    #[default]
    Open,
    PartiallyFilled,
    CancelRequested,
    Filled,
    Cancelled,
}

/// An encrypted limit order. Price and amount exist on-chain only as
/// ciphertext; the public record carries side, owner, and lifecycle state.
/// Seeds: ["order", market, order_id]
#[account]
#[derive(Default)]
pub struct EncryptedOrder {
    /// User who placed the order
    pub owner: Pubkey,

    /// Market the order belongs to
    pub market: Pubkey,

    /// Market-scoped sequential identifier
    pub order_id: u64,

    /// Buy or Sell (public by design - sides are visible, sizes are not)
    pub side: Side,

    /// Lifecycle state
    pub status: OrderStatus,

    /// Encrypted limit price (opaque ciphertext)
    pub encrypted_price: [u8; 32],

    /// Encrypted order amount (opaque ciphertext)
    pub encrypted_amount: [u8; 32],

    /// Encryption nonce supplied by the client
    pub nonce: [u8; 16],

    /// Remaining collateral reserved for this order, starting at the
    /// client-declared worst-case bound and consumed by settlements
    pub collateral_locked: u64,

    /// Portion of `collateral_locked` owed to revealed fills that have not
    /// settled yet. Cancellation and full-fill release keep this locked.
    pub collateral_pending: u64,

    /// Cumulative base tokens filled, revealed match by match
    pub filled_base: u64,

    /// Timestamp of placement
    pub submitted_at: i64,

    /// PDA bump seed
    pub bump: u8,
}

impl EncryptedOrder {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // owner
        32 +  // market
        8 +   // order_id
        1 +   // side
        1 +   // status
        32 +  // encrypted_price
        32 +  // encrypted_amount
        16 +  // nonce
        8 +   // collateral_locked
        8 +   // collateral_pending
        8 +   // filled_base
        8 +   // submitted_at
        1;    // bump

    pub const SEED_PREFIX: &'static [u8] = b"order";

    /// Whether the encrypted book may still match this order
    pub fn is_matchable(&self) -> bool {
        matches!(self.status, OrderStatus::Open | OrderStatus::PartiallyFilled)
    }

    /// Filled and Cancelled are terminal; CancelRequested is not (the
    /// cancel callback still has to land)
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_orders_lock_quote_sell_orders_lock_base() {
        assert!(Side::Buy.locks_quote());
        assert!(!Side::Sell.locks_quote());
    }

    #[test]
    fn cancel_requested_is_neither_matchable_nor_terminal() {
        let order = EncryptedOrder {
            status: OrderStatus::CancelRequested,
            ..EncryptedOrder::default()
        };
        assert!(!order.is_matchable());
        assert!(!order.is_terminal());
    }

    #[test]
    fn partially_filled_orders_remain_matchable() {
        let order = EncryptedOrder {
            status: OrderStatus::PartiallyFilled,
            ..EncryptedOrder::default()
        };
        assert!(order.is_matchable());
    }

    #[test]
    fn terminal_states_are_not_matchable() {
        for status in [OrderStatus::Filled, OrderStatus::Cancelled] {
            let order = EncryptedOrder {
                status,
                ..EncryptedOrder::default()
            };
            assert!(order.is_terminal());
            assert!(!order.is_matchable());
        }
    }
}
