use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pikwa_core::{Alias, Entity, ProductCode};

/// Transfer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(Uuid);

impl TransferId {
    /// UUIDv7 (time-ordered). Prefer fixed ids in tests for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for TransferId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Transfer status lifecycle. All three non-pending states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl TransferStatus {
    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

/// One escrowed line of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLine {
    pub code: ProductCode,
    pub quantity: u32,
}

/// A pending or resolved stock transfer between two retailers.
///
/// The escrowed items belong to the transfer (held by the escrow account)
/// until a terminal transition reassigns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    id: TransferId,
    initiator: Alias,
    recipient: Alias,
    items: Vec<TransferLine>,
    status: TransferStatus,
    date_initiated: DateTime<Utc>,
    date_resolved: Option<DateTime<Utc>>,
}

impl Transfer {
    pub(crate) fn pending(
        id: TransferId,
        initiator: Alias,
        recipient: Alias,
        items: Vec<TransferLine>,
        date_initiated: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            initiator,
            recipient,
            items,
            status: TransferStatus::Pending,
            date_initiated,
            date_resolved: None,
        }
    }

    pub(crate) fn resolve(&mut self, status: TransferStatus, at: DateTime<Utc>) {
        self.status = status;
        self.date_resolved = Some(at);
    }

    pub fn id_typed(&self) -> TransferId {
        self.id
    }

    pub fn initiator(&self) -> &Alias {
        &self.initiator
    }

    pub fn recipient(&self) -> &Alias {
        &self.recipient
    }

    pub fn items(&self) -> &[TransferLine] {
        &self.items
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn date_initiated(&self) -> DateTime<Utc> {
        self.date_initiated
    }

    pub fn date_resolved(&self) -> Option<DateTime<Utc>> {
        self.date_resolved
    }

    /// Total escrowed units across all lines.
    pub fn escrowed_total(&self) -> u64 {
        self.items.iter().map(|l| l.quantity as u64).sum()
    }
}

impl Entity for Transfer {
    type Id = TransferId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
