//! `pikwa-sales` — immutable sale records keyed by device serial number.
//!
//! A sale is created exactly once per serial and never updated in place;
//! cancellation (which deletes the record and reverses the stock and revenue
//! side effects) is the only mutation path. All side effects happen in the
//! [`SaleLedger`] use-case functions, never in a persistence hook.

pub mod ledger;
pub mod sale;

pub use ledger::SaleLedger;
pub use sale::{Buyer, Sale, SaleRequest};
