pub mod market;
pub mod order;
pub mod settlement;
pub mod user_position;

pub use market::*;
pub use order::*;
pub use settlement::*;
pub use user_position::*;
