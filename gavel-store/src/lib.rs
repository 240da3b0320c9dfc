//! gavel-store: Postgres data access for a coding-problem judge.
//!
//! Stores problems, their test cases, and the assignment rows linking them,
//! behind a typed [`Client`].
//!
//! # Design Principles
//!
//! - Connection pool with explicit limits - no `Arc<Mutex<Connection>>`
//! - Every statement parameter bound with `$n` placeholders
//! - Transactions for multi-step writes
//! - Every operation runs under its own wall-clock deadline

pub mod client;
pub mod error;
pub mod pool;
pub mod schema;

#[cfg(feature = "testenv")]
pub mod testenv;

pub use client::{Client, Problem, TestCase};
pub use error::{Result, StoreError};
