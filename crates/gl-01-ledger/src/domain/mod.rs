//! # Domain Layer - Sponsorship Ledger
//!
//! - `policy`: gas range and the product decisions around failed sponsorships
//! - `store`: the pool table and transaction log
//! - `errors`: LedgerError enumeration

pub mod errors;
pub mod policy;
pub mod store;

pub use errors::*;
pub use policy::*;
pub use store::*;
