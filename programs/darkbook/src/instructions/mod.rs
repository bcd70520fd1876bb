pub mod cancel_order;
pub mod deposit;
pub mod initialize_market;
pub mod match_orders;
pub mod place_order;
pub mod settle_trade;
pub mod withdraw;

pub use cancel_order::*;
pub use deposit::*;
pub use initialize_market::*;
pub use match_orders::*;
pub use place_order::*;
pub use settle_trade::*;
pub use withdraw::*;
