//! Transactional store over the composed ledgers.
//!
//! All persistent state lives in one [`RetailState`] behind a single
//! `RwLock`. Every multi-step operation (record sale, initiate transfer,
//! accept, reject, cancel) runs inside one write guard, which gives the
//! at-most-one-writer-at-a-time boundary the ledgers rely on: a
//! check-then-decrement can never be torn by a racing command. Component
//! operations validate before they mutate, so an `Err` out of a transaction
//! closure means nothing was touched.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use pikwa_catalog::Catalog;
use pikwa_core::{DomainError, DomainResult};
use pikwa_parties::RetailerRegistry;
use pikwa_sales::SaleLedger;
use pikwa_stock::StockLedger;
use pikwa_transfers::TransferWorkflow;

/// The composed domain state: one relational-store-shaped value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailState {
    pub catalog: Catalog,
    pub retailers: RetailerRegistry,
    pub stock: StockLedger,
    pub sales: SaleLedger,
    pub transfers: TransferWorkflow,
}

impl RetailState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }
}

/// Shared handle around [`RetailState`].
#[derive(Debug, Default)]
pub struct RetailStore {
    state: RwLock<RetailState>,
}

impl RetailStore {
    pub fn new(state: RetailState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Read-only query. Consistent with the last committed transaction.
    pub fn read<R>(&self, f: impl FnOnce(&RetailState) -> R) -> DomainResult<R> {
        let state = self
            .state
            .read()
            .map_err(|_| DomainError::internal("store lock poisoned"))?;
        Ok(f(&state))
    }

    /// Run one transaction under the write guard.
    ///
    /// The closure sees the whole state; an `Err` return surfaces as-is and,
    /// because component operations check before they mutate, leaves no
    /// partial mutation behind.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&mut RetailState) -> DomainResult<R>,
    ) -> DomainResult<R> {
        let mut state = self
            .state
            .write()
            .map_err(|_| DomainError::internal("store lock poisoned"))?;
        f(&mut state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pikwa_core::{Alias, ProductCode};
    use pikwa_parties::{Retailer, RetailerDirectory};
    use pikwa_stock::StockHolder;

    #[test]
    fn transaction_error_leaves_state_untouched() {
        let store = RetailStore::new(RetailState::default());
        let alias = Alias::new("a").unwrap();
        let code = ProductCode::new("EW").unwrap();

        let result: DomainResult<()> = store.transaction(|state| {
            state
                .stock
                .reserve(&StockHolder::retailer(alias.clone()), &code, 1)
        });
        assert!(result.is_err());

        let quantity = store
            .read(|state| state.stock.quantity(&StockHolder::retailer(alias.clone()), &code))
            .unwrap();
        assert_eq!(quantity, 0);
    }

    #[test]
    fn reads_see_committed_writes() {
        let store = RetailStore::new(RetailState::default());
        let alias = Alias::new("a").unwrap();

        store
            .transaction(|state| {
                state
                    .retailers
                    .add(Retailer::new(alias.clone(), "A Retailer"))
            })
            .unwrap();

        let name = store
            .read(|state| {
                state
                    .retailers
                    .resolve_by_alias(&alias)
                    .map(|r| r.name().to_string())
            })
            .unwrap()
            .unwrap();
        assert_eq!(name, "A Retailer");
    }
}
