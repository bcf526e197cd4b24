//! `pikwa-transfers` — peer-to-peer stock transfers with escrow.
//!
//! A transfer debits the initiator immediately and parks the stock on the
//! escrow holder until the recipient resolves it. "In transit" is an
//! explicit, queryable state: the stock is never simultaneously visible on
//! both sides, and never vanishes.

pub mod transfer;
pub mod workflow;

pub use transfer::{Transfer, TransferId, TransferLine, TransferStatus};
pub use workflow::{InitiateOutcome, TransferWorkflow};
