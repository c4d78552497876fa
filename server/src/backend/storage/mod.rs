//! # Storage Module
//!
//! Persistence for members and ledger entries.
//!
//! The domain layer only sees the traits in [`traits`]. The shipped backend is
//! SQLite through SQLx; any other store works as long as it can order entries,
//! sum approved amounts by type, update a pending deposit conditionally, and
//! run an insert plus a bulk reject as one unit of work.

pub mod connection;
pub mod repositories;
pub mod traits;

pub use connection::DbConnection;
pub use repositories::{LedgerRepository, MemberRepository};
pub use traits::*;
