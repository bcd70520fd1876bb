//! Settlement and match-application logic.
//!
//! Instruction handlers deal with accounts and signers; the balance and
//! lifecycle math for reserving, matching, cancelling, and settling lives
//! here, operating directly on the state structs.

pub mod engine;

pub use engine::*;
