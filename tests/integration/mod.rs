//! Integration tests for navsync
//!
//! These tests drive a `HistorySync` over a `MemoryHistory` and check both
//! sides after the queue has settled.

#[path = "../common/mod.rs"]
pub mod common;

pub mod outbound_flow;
pub mod replace_debt;
