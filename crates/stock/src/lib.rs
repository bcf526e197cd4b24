//! `pikwa-stock` — the stock ledger.
//!
//! Every quantity mutation in the system goes through [`StockLedger`]. Sales,
//! restocks, and transfers never touch counters directly; they call `reserve`
//! and `grant`, which is where the non-negativity invariant lives.

pub mod ledger;

pub use ledger::{StockHolder, StockLedger, StockLine};
