//! Adapters implementing the domain ports: ledgers and payout gateways.

pub mod in_memory;
pub mod paypal;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod simulated;
