//! Domain types and the ports the application layer drives.

pub mod amount;
pub mod ids;
pub mod notice;
pub mod ports;
pub mod withdrawal;
