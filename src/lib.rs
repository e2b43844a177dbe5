//! Hash-linked ledger with pluggable block admission: unconditional append,
//! local-validity majority vote across admins, or proof-of-work mining.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod consensus;
pub mod digest;
pub mod error;
