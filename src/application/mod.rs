//! Application layer containing the withdrawal lifecycle.
//!
//! The `WithdrawalController` handles submissions, the `RetrySweeper` settles
//! what the first attempt could not, and both report to the shared
//! `NoticeBoard`. All payout calls go through `GatewayCaller`.

pub mod controller;
pub mod gateway_call;
pub mod notice_board;
pub mod scheduler;
pub mod sweeper;
