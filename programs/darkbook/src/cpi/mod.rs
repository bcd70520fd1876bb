pub mod mpc;

pub use mpc::*;
