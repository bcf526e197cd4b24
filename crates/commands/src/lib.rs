//! `pikwa-commands` — free-text command decoding and the inbound contract.
//!
//! The parsers are pure functions from SMS payload text to structured
//! requests; they consult the catalog for code resolution but mutate
//! nothing. The command types form the closed contract the messaging
//! collaborator speaks with the engine.

pub mod command;
pub mod parser;

pub use command::{CommandKind, CommandOutcome, InboundCommand, Notification};
pub use parser::{RestockCommand, parse_restock_command, parse_sale_command};
