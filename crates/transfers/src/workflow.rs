use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pikwa_core::{Alias, DomainError, DomainResult, ProductCode};
use pikwa_stock::{StockHolder, StockLedger};

use crate::transfer::{Transfer, TransferId, TransferLine, TransferStatus};

/// Result of an `initiate` call.
///
/// A transfer with zero successful lines is not a workflow error: the
/// stockout list tells the caller what to report, and no transfer record is
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiateOutcome {
    pub transfer: Option<TransferId>,
    pub sent: Vec<TransferLine>,
    pub stockouts: Vec<ProductCode>,
}

/// State machine over pending transfers.
///
/// Stock moves initiator → escrow at `initiate`, escrow → recipient at
/// `accept`, escrow → initiator at `reject`/`cancel_all`. Between initiate
/// and resolution the escrow holder owns exactly the debited amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferWorkflow {
    transfers: BTreeMap<TransferId, Transfer>,
}

impl TransferWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose a transfer of `lines` from `initiator` to `recipient`.
    ///
    /// Each line is debited from the initiator and parked on escrow; lines
    /// the initiator cannot cover are recorded as stockouts and skipped. The
    /// transfer record is only persisted when at least one line succeeded.
    pub fn initiate(
        &mut self,
        stock: &mut StockLedger,
        initiator: &Alias,
        recipient: &Alias,
        lines: &[(ProductCode, u32)],
        now: DateTime<Utc>,
    ) -> InitiateOutcome {
        let initiator_holder = StockHolder::retailer(initiator.clone());
        let mut sent = Vec::new();
        let mut stockouts = Vec::new();

        for (code, amount) in lines {
            if stock.quantity(&initiator_holder, code) < *amount {
                stockouts.push(code.clone());
                continue;
            }
            // The check above makes this reserve infallible.
            if stock.reserve(&initiator_holder, code, *amount).is_err() {
                stockouts.push(code.clone());
                continue;
            }
            stock.grant(&StockHolder::Escrow, code, *amount);
            sent.push(TransferLine {
                code: code.clone(),
                quantity: *amount,
            });
        }

        let transfer = if sent.is_empty() {
            None
        } else {
            let id = TransferId::new();
            self.transfers.insert(
                id,
                Transfer::pending(id, initiator.clone(), recipient.clone(), sent.clone(), now),
            );
            Some(id)
        };

        InitiateOutcome {
            transfer,
            sent,
            stockouts,
        }
    }

    /// Recipient accepts: escrowed lines move to the recipient's stock.
    pub fn accept(
        &mut self,
        stock: &mut StockLedger,
        id: TransferId,
        actor: &Alias,
        now: DateTime<Utc>,
    ) -> DomainResult<&Transfer> {
        self.resolve(stock, id, actor, ResolveAs::Accept, now)
    }

    /// Recipient rejects: escrowed lines return to the initiator's stock.
    pub fn reject(
        &mut self,
        stock: &mut StockLedger,
        id: TransferId,
        actor: &Alias,
        now: DateTime<Utc>,
    ) -> DomainResult<&Transfer> {
        self.resolve(stock, id, actor, ResolveAs::Reject, now)
    }

    /// Cancel every pending transfer the initiator has open, returning all
    /// escrowed lines to them. A no-op (empty result) when none are pending.
    pub fn cancel_all(
        &mut self,
        stock: &mut StockLedger,
        initiator: &Alias,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<TransferId>> {
        let pending: Vec<TransferId> = self
            .transfers
            .values()
            .filter(|t| t.status() == TransferStatus::Pending && t.initiator() == initiator)
            .map(|t| t.id_typed())
            .collect();

        self.escrow_covers(stock, &pending)?;
        for id in &pending {
            let transfer = self
                .transfers
                .get_mut(id)
                .ok_or_else(|| DomainError::internal("pending transfer vanished"))?;
            release_escrow(stock, transfer.items(), &StockHolder::retailer(initiator.clone()))?;
            transfer.resolve(TransferStatus::Cancelled, now);
        }
        Ok(pending)
    }

    /// Pending transfers addressed to `recipient`, oldest first.
    pub fn pending_for_recipient(&self, recipient: &Alias) -> Vec<TransferId> {
        self.transfers
            .values()
            .filter(|t| t.status() == TransferStatus::Pending && t.recipient() == recipient)
            .map(|t| t.id_typed())
            .collect()
    }

    pub fn get(&self, id: TransferId) -> Option<&Transfer> {
        self.transfers.get(&id)
    }

    /// Check that escrow can cover the combined lines of the given transfers.
    ///
    /// Callers resolving a batch run this before the first resolution, so a
    /// broken escrow balance aborts with no transfer committed instead of
    /// stranding part of the batch behind an internal error.
    pub fn escrow_covers(&self, stock: &StockLedger, ids: &[TransferId]) -> DomainResult<()> {
        let mut needed: BTreeMap<ProductCode, u64> = BTreeMap::new();
        for id in ids {
            let transfer = self
                .transfers
                .get(id)
                .ok_or_else(|| DomainError::not_found(format!("transfer {id}")))?;
            for line in transfer.items() {
                *needed.entry(line.code.clone()).or_insert(0) += u64::from(line.quantity);
            }
        }
        for (code, amount) in needed {
            if u64::from(stock.quantity(&StockHolder::Escrow, &code)) < amount {
                return Err(DomainError::internal(format!(
                    "escrow balance below pending transfer lines for {code}"
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    fn resolve(
        &mut self,
        stock: &mut StockLedger,
        id: TransferId,
        actor: &Alias,
        resolve_as: ResolveAs,
        now: DateTime<Utc>,
    ) -> DomainResult<&Transfer> {
        let transfer = self
            .transfers
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("transfer {id}")))?;
        if transfer.recipient() != actor {
            return Err(DomainError::NotAuthorized);
        }
        if transfer.status() != TransferStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "transfer is already {:?}",
                transfer.status()
            )));
        }

        let (beneficiary, status) = match resolve_as {
            ResolveAs::Accept => (
                StockHolder::retailer(transfer.recipient().clone()),
                TransferStatus::Accepted,
            ),
            ResolveAs::Reject => (
                StockHolder::retailer(transfer.initiator().clone()),
                TransferStatus::Rejected,
            ),
        };

        let items = transfer.items().to_vec();
        release_escrow(stock, &items, &beneficiary)?;

        let transfer = self
            .transfers
            .get_mut(&id)
            .ok_or_else(|| DomainError::internal("transfer vanished during resolve"))?;
        transfer.resolve(status, now);
        Ok(&*transfer)
    }
}

#[derive(Debug, Copy, Clone)]
enum ResolveAs {
    Accept,
    Reject,
}

/// Move escrowed lines to their beneficiary.
///
/// Checks every line against the escrow balance before mutating: either the
/// whole release happens or none of it does.
fn release_escrow(
    stock: &mut StockLedger,
    items: &[TransferLine],
    beneficiary: &StockHolder,
) -> DomainResult<()> {
    for line in items {
        if stock.quantity(&StockHolder::Escrow, &line.code) < line.quantity {
            return Err(DomainError::internal(format!(
                "escrow balance below transfer line for {}",
                line.code
            )));
        }
    }
    for line in items {
        stock.reserve(&StockHolder::Escrow, &line.code, line.quantity)?;
        stock.grant(beneficiary, &line.code, line.quantity);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias(a: &str) -> Alias {
        Alias::new(a).unwrap()
    }

    fn holder(a: &str) -> StockHolder {
        StockHolder::retailer(alias(a))
    }

    fn code(raw: &str) -> ProductCode {
        ProductCode::new(raw).unwrap()
    }

    fn setup(initial: u32) -> (TransferWorkflow, StockLedger) {
        let mut stock = StockLedger::new();
        stock.grant(&holder("a"), &code("EW"), initial);
        (TransferWorkflow::new(), stock)
    }

    #[test]
    fn initiate_debits_initiator_and_escrows() {
        let (mut workflow, mut stock) = setup(4);
        let outcome = workflow.initiate(
            &mut stock,
            &alias("a"),
            &alias("b"),
            &[(code("EW"), 3)],
            Utc::now(),
        );

        assert!(outcome.transfer.is_some());
        assert!(outcome.stockouts.is_empty());
        assert_eq!(stock.quantity(&holder("a"), &code("EW")), 1);
        assert_eq!(stock.quantity(&holder("b"), &code("EW")), 0);
        assert_eq!(stock.quantity(&StockHolder::Escrow, &code("EW")), 3);

        let transfer = workflow.get(outcome.transfer.unwrap()).unwrap();
        assert_eq!(transfer.status(), TransferStatus::Pending);
        assert_eq!(transfer.escrowed_total(), 3);
    }

    #[test]
    fn initiate_with_insufficient_stock_creates_nothing() {
        let (mut workflow, mut stock) = setup(1);
        let outcome = workflow.initiate(
            &mut stock,
            &alias("a"),
            &alias("b"),
            &[(code("EW"), 10)],
            Utc::now(),
        );

        assert!(outcome.transfer.is_none());
        assert_eq!(outcome.stockouts, vec![code("EW")]);
        assert!(workflow.is_empty());
        assert_eq!(stock.quantity(&holder("a"), &code("EW")), 1);
        assert_eq!(stock.quantity(&StockHolder::Escrow, &code("EW")), 0);
    }

    #[test]
    fn initiate_mixes_sent_lines_and_stockouts() {
        let (mut workflow, mut stock) = setup(4);
        stock.grant(&holder("a"), &code("CW"), 1);
        let outcome = workflow.initiate(
            &mut stock,
            &alias("a"),
            &alias("b"),
            &[(code("EW"), 3), (code("CW"), 5)],
            Utc::now(),
        );

        assert!(outcome.transfer.is_some());
        assert_eq!(outcome.sent.len(), 1);
        assert_eq!(outcome.stockouts, vec![code("CW")]);
        assert_eq!(stock.quantity(&holder("a"), &code("CW")), 1);
    }

    #[test]
    fn accept_moves_escrow_to_recipient() {
        let (mut workflow, mut stock) = setup(4);
        let outcome = workflow.initiate(
            &mut stock,
            &alias("a"),
            &alias("b"),
            &[(code("EW"), 3)],
            Utc::now(),
        );
        let id = outcome.transfer.unwrap();

        let transfer = workflow
            .accept(&mut stock, id, &alias("b"), Utc::now())
            .unwrap();
        assert_eq!(transfer.status(), TransferStatus::Accepted);
        assert!(transfer.date_resolved().is_some());

        assert_eq!(stock.quantity(&holder("a"), &code("EW")), 1);
        assert_eq!(stock.quantity(&holder("b"), &code("EW")), 3);
        assert_eq!(stock.quantity(&StockHolder::Escrow, &code("EW")), 0);
    }

    #[test]
    fn reject_returns_escrow_to_initiator() {
        let (mut workflow, mut stock) = setup(4);
        let outcome = workflow.initiate(
            &mut stock,
            &alias("a"),
            &alias("b"),
            &[(code("EW"), 3)],
            Utc::now(),
        );
        let id = outcome.transfer.unwrap();

        let transfer = workflow
            .reject(&mut stock, id, &alias("b"), Utc::now())
            .unwrap();
        assert_eq!(transfer.status(), TransferStatus::Rejected);

        assert_eq!(stock.quantity(&holder("a"), &code("EW")), 4);
        assert_eq!(stock.quantity(&holder("b"), &code("EW")), 0);
        assert_eq!(stock.quantity(&StockHolder::Escrow, &code("EW")), 0);
    }

    #[test]
    fn only_the_recipient_may_resolve() {
        let (mut workflow, mut stock) = setup(4);
        let id = workflow
            .initiate(
                &mut stock,
                &alias("a"),
                &alias("b"),
                &[(code("EW"), 3)],
                Utc::now(),
            )
            .transfer
            .unwrap();

        let err = workflow
            .accept(&mut stock, id, &alias("a"), Utc::now())
            .unwrap_err();
        assert_eq!(err, DomainError::NotAuthorized);
        assert_eq!(stock.quantity(&StockHolder::Escrow, &code("EW")), 3);
    }

    #[test]
    fn terminal_transfers_cannot_be_resolved_again() {
        let (mut workflow, mut stock) = setup(4);
        let id = workflow
            .initiate(
                &mut stock,
                &alias("a"),
                &alias("b"),
                &[(code("EW"), 3)],
                Utc::now(),
            )
            .transfer
            .unwrap();

        workflow
            .accept(&mut stock, id, &alias("b"), Utc::now())
            .unwrap();
        let err = workflow
            .accept(&mut stock, id, &alias("b"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        // Stock unchanged by the second attempt.
        assert_eq!(stock.quantity(&holder("b"), &code("EW")), 3);
    }

    #[test]
    fn cancel_all_returns_every_pending_line() {
        let (mut workflow, mut stock) = setup(6);
        workflow.initiate(
            &mut stock,
            &alias("a"),
            &alias("b"),
            &[(code("EW"), 2)],
            Utc::now(),
        );
        workflow.initiate(
            &mut stock,
            &alias("a"),
            &alias("c"),
            &[(code("EW"), 3)],
            Utc::now(),
        );
        assert_eq!(stock.quantity(&holder("a"), &code("EW")), 1);

        let cancelled = workflow
            .cancel_all(&mut stock, &alias("a"), Utc::now())
            .unwrap();
        assert_eq!(cancelled.len(), 2);
        assert_eq!(stock.quantity(&holder("a"), &code("EW")), 6);
        assert_eq!(stock.quantity(&StockHolder::Escrow, &code("EW")), 0);
        for id in cancelled {
            assert_eq!(workflow.get(id).unwrap().status(), TransferStatus::Cancelled);
        }
    }

    #[test]
    fn cancel_all_with_nothing_pending_is_a_noop() {
        let (mut workflow, mut stock) = setup(2);
        let cancelled = workflow
            .cancel_all(&mut stock, &alias("a"), Utc::now())
            .unwrap();
        assert!(cancelled.is_empty());
        assert_eq!(stock.quantity(&holder("a"), &code("EW")), 2);
    }

    #[test]
    fn drained_escrow_fails_cancel_all_before_any_return() {
        let (mut workflow, mut stock) = setup(4);
        let first = workflow
            .initiate(
                &mut stock,
                &alias("a"),
                &alias("b"),
                &[(code("EW"), 1)],
                Utc::now(),
            )
            .transfer
            .unwrap();
        let second = workflow
            .initiate(
                &mut stock,
                &alias("a"),
                &alias("c"),
                &[(code("EW"), 3)],
                Utc::now(),
            )
            .transfer
            .unwrap();
        // Escrow can still cover the first transfer alone, but not both.
        stock.reserve(&StockHolder::Escrow, &code("EW"), 2).unwrap();

        let err = workflow
            .cancel_all(&mut stock, &alias("a"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));

        // Neither transfer was cancelled and nothing was returned.
        assert_eq!(workflow.get(first).unwrap().status(), TransferStatus::Pending);
        assert_eq!(workflow.get(second).unwrap().status(), TransferStatus::Pending);
        assert_eq!(stock.quantity(&holder("a"), &code("EW")), 0);
        assert_eq!(stock.quantity(&StockHolder::Escrow, &code("EW")), 2);
    }

    #[test]
    fn cancel_all_leaves_other_initiators_transfers_alone() {
        let (mut workflow, mut stock) = setup(4);
        stock.grant(&holder("x"), &code("EW"), 2);
        let other = workflow
            .initiate(
                &mut stock,
                &alias("x"),
                &alias("b"),
                &[(code("EW"), 2)],
                Utc::now(),
            )
            .transfer
            .unwrap();

        workflow.initiate(
            &mut stock,
            &alias("a"),
            &alias("b"),
            &[(code("EW"), 4)],
            Utc::now(),
        );
        workflow
            .cancel_all(&mut stock, &alias("a"), Utc::now())
            .unwrap();

        assert_eq!(workflow.get(other).unwrap().status(), TransferStatus::Pending);
        assert_eq!(stock.quantity(&StockHolder::Escrow, &code("EW")), 2);
    }

    #[test]
    fn escrow_equals_debits_while_pending() {
        let (mut workflow, mut stock) = setup(10);
        let before = stock.quantity(&holder("a"), &code("EW"));
        let outcome = workflow.initiate(
            &mut stock,
            &alias("a"),
            &alias("b"),
            &[(code("EW"), 4)],
            Utc::now(),
        );
        let debited = before - stock.quantity(&holder("a"), &code("EW"));
        assert_eq!(
            stock.quantity(&StockHolder::Escrow, &code("EW")) as u64,
            debited as u64
        );
        assert_eq!(
            workflow.get(outcome.transfer.unwrap()).unwrap().escrowed_total(),
            debited as u64
        );
    }
}
