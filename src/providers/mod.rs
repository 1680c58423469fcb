//! Providers Module - External Data Sources
//!
//! JSON-RPC transport and the Solana methods read through it.

pub mod rpc;
pub mod solana;

pub use rpc::*;
pub use solana::*;
