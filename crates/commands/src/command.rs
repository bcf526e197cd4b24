use serde::{Deserialize, Serialize};

use pikwa_core::Alias;

/// The fixed, closed set of inbound command kinds.
///
/// The SMS keyword layer maps its keywords/patterns onto these; the set is
/// small and fixed, so it is a tagged union rather than open handler
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// `sale serial# firstname lastname mobile# price regioncode village`
    Sale,
    /// `cancel serial#`
    CancelSale,
    /// `restock recipient code-amount...` (propose a transfer)
    Restock,
    /// `yes` (accept pending incoming transfers)
    Accept,
    /// `no` (reject pending incoming transfers)
    Reject,
    /// Cancel all of the actor's own pending transfers.
    CancelRestock,
    /// `new code-amount...` (manager imports product into own stock)
    NewProduct,
    /// `m alias` (manager grants another retailer the manager role)
    GrantManager,
    /// `stock [alias]` (current stock of self or another retailer)
    CheckStock,
    /// `check serial#` (status of a sale)
    CheckStatus,
}

/// A structured request delivered by the external messaging layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundCommand {
    pub kind: CommandKind,
    /// Payload text after the keyword, still free-form.
    pub raw_text: String,
    /// Resolved identity of the sender.
    pub actor: Alias,
}

impl InboundCommand {
    pub fn new(kind: CommandKind, raw_text: impl Into<String>, actor: Alias) -> Self {
        Self {
            kind,
            raw_text: raw_text.into(),
            actor,
        }
    }
}

/// A message to deliver to someone other than the actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: Alias,
    pub message: String,
}

/// What the engine hands back to the messaging collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    /// Reply to the actor.
    pub message: String,
    /// Side-band messages (transfer offers, confirmations, promotions).
    pub notifications: Vec<Notification>,
}

impl CommandOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            notifications: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            notifications: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_notification(mut self, recipient: Alias, message: impl Into<String>) -> Self {
        self.notifications.push(Notification {
            recipient,
            message: message.into(),
        });
        self
    }
}
