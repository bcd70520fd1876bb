use anchor_lang::prelude::*;

#[error_code]
pub enum DarkbookError {
    #[msg("Invalid order parameters")]
    InvalidOrderParams,

    #[msg("Invalid market configuration")]
    InvalidMarketConfig,

    #[msg("Amount below minimum")]
    AmountTooSmall,

    #[msg("Price out of valid range")]
    InvalidPrice,

    #[msg("Invalid encrypted data")]
    InvalidEncryptedData,

    #[msg("Unauthorized operation")]
    Unauthorized,

    #[msg("Insufficient balance for this operation")]
    InsufficientBalance,

    #[msg("Orderbook is full")]
    OrderbookFull,

    #[msg("Too many active orders")]
    TooManyOrders,

    #[msg("Order not found")]
    OrderNotFound,

    #[msg("Order already cancelled or filled")]
    OrderAlreadyCancelled,

    #[msg("Trade already settled")]
    TradeAlreadySettled,

    #[msg("No matching orders found")]
    NoMatchingOrders,

    #[msg("Self-trade prevention")]
    SelfTrade,

    #[msg("Math overflow occurred")]
    MathOverflow,

    #[msg("A matching computation is already in flight")]
    ComputationNotReady,

    #[msg("MPC computation failed")]
    MpcComputationFailed,
}
