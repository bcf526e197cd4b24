use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pikwa_core::{Alias, DomainError, DomainResult, SerialNumber};
use pikwa_parties::RetailerDirectory;
use pikwa_stock::{StockHolder, StockLedger};

use crate::sale::{Sale, SaleRequest};

/// Store of sale records, keyed by serial number.
///
/// `record_sale` and `cancel_sale` are single atomic units: every check runs
/// before the first mutation, so a rejected request leaves the sale store,
/// the stock ledger, and the seller's revenue untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLedger {
    sales: BTreeMap<SerialNumber, Sale>,
}

impl SaleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sale: persist the record, reserve one unit of the seller's
    /// stock, and accrue the sale's revenue on the seller.
    ///
    /// Preconditions, checked in order:
    /// 1. the seller has at least one unit on hand (`OutOfStock`),
    /// 2. the serial is not already registered (`DuplicateSerial`).
    pub fn record_sale(
        &mut self,
        stock: &mut StockLedger,
        directory: &mut dyn RetailerDirectory,
        request: SaleRequest,
    ) -> DomainResult<&Sale> {
        let seller_holder = StockHolder::retailer(request.seller.clone());

        // All checks before any mutation.
        directory.resolve_by_alias(&request.seller)?;
        if stock.quantity(&seller_holder, &request.product) == 0 {
            return Err(DomainError::OutOfStock(request.product.as_str().to_string()));
        }
        if self.sales.contains_key(&request.serial) {
            return Err(DomainError::DuplicateSerial(
                request.serial.as_str().to_string(),
            ));
        }

        stock.reserve(&seller_holder, &request.product, 1)?;
        let seller = directory.resolve_by_alias_mut(&request.seller)?;
        seller.accrue_revenue(request.price);

        let serial = request.serial.clone();
        let sale = Sale::from_request(request);
        self.sales.insert(serial.clone(), sale);
        self.sales
            .get(&serial)
            .ok_or_else(|| DomainError::internal("sale vanished after insert"))
    }

    /// Cancel a sale: delete the record, return one unit to the seller's
    /// stock, and reverse the revenue accrual.
    ///
    /// Only the original seller may cancel. `NotFound` when the serial was
    /// never registered; `NotAuthorized` when it exists but the requester is
    /// not its seller.
    pub fn cancel_sale(
        &mut self,
        stock: &mut StockLedger,
        directory: &mut dyn RetailerDirectory,
        serial: &SerialNumber,
        requester: &Alias,
    ) -> DomainResult<Sale> {
        let sale = self
            .sales
            .get(serial)
            .ok_or_else(|| DomainError::not_found(format!("sale record for {serial}")))?;
        if sale.seller() != requester {
            return Err(DomainError::NotAuthorized);
        }
        // Resolve before removing so a missing seller aborts cleanly.
        directory.resolve_by_alias(requester)?;

        let sale = self
            .sales
            .remove(serial)
            .ok_or_else(|| DomainError::internal("sale vanished during cancel"))?;
        stock.grant(
            &StockHolder::retailer(sale.seller().clone()),
            sale.product(),
            1,
        );
        let seller = directory.resolve_by_alias_mut(requester)?;
        seller.reverse_revenue(sale.price());
        Ok(sale)
    }

    /// Look up a sale by serial. Pure read.
    pub fn by_serial(&self, serial: &SerialNumber) -> Option<&Sale> {
        self.sales.get(serial)
    }

    /// Sales whose purchase date falls within `[start, end)`, serial order.
    pub fn sales_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Sale> {
        self.sales
            .values()
            .filter(|s| s.purchase_date() >= start && s.purchase_date() < end)
            .collect()
    }

    /// All sales by a given seller, serial order.
    pub fn sales_by_seller(&self, seller: &Alias) -> Vec<&Sale> {
        self.sales.values().filter(|s| s.seller() == seller).collect()
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use pikwa_catalog::Region;
    use pikwa_core::{ProductCode, PurchasePrice, Revenue};
    use pikwa_parties::{Retailer, RetailerRegistry};

    use crate::sale::Buyer;

    fn directory_with(aliases: &[&str]) -> RetailerRegistry {
        let mut registry = RetailerRegistry::new();
        for a in aliases {
            let alias = Alias::new(a).unwrap();
            registry.add(Retailer::new(alias, *a)).unwrap();
        }
        registry
    }

    fn revenue_of(directory: &RetailerRegistry, alias: &str) -> Revenue {
        directory
            .resolve_by_alias(&Alias::new(alias).unwrap())
            .unwrap()
            .revenue()
    }

    fn request(serial: &str, seller: &str) -> SaleRequest {
        SaleRequest {
            serial: SerialNumber::new(serial).unwrap(),
            product: ProductCode::new("EW").unwrap(),
            purchase_date: Utc::now(),
            buyer: Buyer {
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                primary_phone: "0712345678".to_string(),
                secondary_phone: None,
            },
            price: PurchasePrice::parse("10").unwrap(),
            region: Region::new("102"),
            description: "A village".to_string(),
            seller: Alias::new(seller).unwrap(),
        }
    }

    fn seller_holder(alias: &str) -> StockHolder {
        StockHolder::retailer(Alias::new(alias).unwrap())
    }

    fn ew() -> ProductCode {
        ProductCode::new("EW").unwrap()
    }

    #[test]
    fn record_sale_persists_reserves_and_accrues() {
        let mut ledger = SaleLedger::new();
        let mut stock = StockLedger::new();
        let mut directory = directory_with(&["a"]);
        stock.grant(&seller_holder("a"), &ew(), 5);

        let sale = ledger
            .record_sale(&mut stock, &mut directory, request("EW00001", "a"))
            .unwrap();
        assert_eq!(sale.serial().as_str(), "EW00001");

        assert_eq!(stock.quantity(&seller_holder("a"), &ew()), 4);
        assert_eq!(revenue_of(&directory, "a").tsh(), 10_000);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn out_of_stock_rejects_before_any_mutation() {
        let mut ledger = SaleLedger::new();
        let mut stock = StockLedger::new();
        let mut directory = directory_with(&["a"]);

        let err = ledger
            .record_sale(&mut stock, &mut directory, request("EW00001", "a"))
            .unwrap_err();
        match err {
            DomainError::OutOfStock(code) => assert_eq!(code, "EW"),
            other => panic!("expected OutOfStock, got {other:?}"),
        }
        assert!(ledger.is_empty());
        assert_eq!(revenue_of(&directory, "a"), Revenue::zero());
    }

    #[test]
    fn duplicate_serial_rejects_second_sale() {
        let mut ledger = SaleLedger::new();
        let mut stock = StockLedger::new();
        let mut directory = directory_with(&["a"]);
        stock.grant(&seller_holder("a"), &ew(), 5);

        ledger
            .record_sale(&mut stock, &mut directory, request("EW00001", "a"))
            .unwrap();
        let err = ledger
            .record_sale(&mut stock, &mut directory, request("EW00001", "a"))
            .unwrap_err();
        match err {
            DomainError::DuplicateSerial(serial) => assert_eq!(serial, "EW00001"),
            other => panic!("expected DuplicateSerial, got {other:?}"),
        }
        // Second attempt changed nothing.
        assert_eq!(stock.quantity(&seller_holder("a"), &ew()), 4);
        assert_eq!(revenue_of(&directory, "a").tsh(), 10_000);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn stock_check_runs_before_duplicate_check() {
        let mut ledger = SaleLedger::new();
        let mut stock = StockLedger::new();
        let mut directory = directory_with(&["a"]);
        stock.grant(&seller_holder("a"), &ew(), 1);

        ledger
            .record_sale(&mut stock, &mut directory, request("EW00001", "a"))
            .unwrap();
        // Stock is now 0, so the duplicate serial reports OutOfStock first.
        let err = ledger
            .record_sale(&mut stock, &mut directory, request("EW00001", "a"))
            .unwrap_err();
        assert!(matches!(err, DomainError::OutOfStock(_)));
    }

    #[test]
    fn cancel_restores_stock_and_revenue_exactly() {
        let mut ledger = SaleLedger::new();
        let mut stock = StockLedger::new();
        let mut directory = directory_with(&["a"]);
        stock.grant(&seller_holder("a"), &ew(), 5);

        ledger
            .record_sale(&mut stock, &mut directory, request("EW00001", "a"))
            .unwrap();
        let cancelled = ledger
            .cancel_sale(
                &mut stock,
                &mut directory,
                &SerialNumber::new("EW00001").unwrap(),
                &Alias::new("a").unwrap(),
            )
            .unwrap();

        assert_eq!(cancelled.serial().as_str(), "EW00001");
        assert_eq!(stock.quantity(&seller_holder("a"), &ew()), 5);
        assert_eq!(revenue_of(&directory, "a"), Revenue::zero());
        assert!(ledger.is_empty());
    }

    #[test]
    fn cancel_by_non_seller_is_not_authorized() {
        let mut ledger = SaleLedger::new();
        let mut stock = StockLedger::new();
        let mut directory = directory_with(&["a", "b"]);
        stock.grant(&seller_holder("a"), &ew(), 1);

        ledger
            .record_sale(&mut stock, &mut directory, request("EW00001", "a"))
            .unwrap();
        let err = ledger
            .cancel_sale(
                &mut stock,
                &mut directory,
                &SerialNumber::new("EW00001").unwrap(),
                &Alias::new("b").unwrap(),
            )
            .unwrap_err();
        assert_eq!(err, DomainError::NotAuthorized);
        // Nothing was reversed.
        assert_eq!(ledger.len(), 1);
        assert_eq!(revenue_of(&directory, "a").tsh(), 10_000);
    }

    #[test]
    fn cancel_of_unknown_serial_is_not_found() {
        let mut ledger = SaleLedger::new();
        let mut stock = StockLedger::new();
        let mut directory = directory_with(&["a"]);

        let err = ledger
            .cancel_sale(
                &mut stock,
                &mut directory,
                &SerialNumber::new("EW99999").unwrap(),
                &Alias::new("a").unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn sales_in_range_is_half_open() {
        let mut ledger = SaleLedger::new();
        let mut stock = StockLedger::new();
        let mut directory = directory_with(&["a"]);
        stock.grant(&seller_holder("a"), &ew(), 5);

        let now = Utc::now();
        let mut req = request("EW00001", "a");
        req.purchase_date = now;
        ledger.record_sale(&mut stock, &mut directory, req).unwrap();

        let hits = ledger.sales_in_range(now - Duration::days(1), now + Duration::days(1));
        assert_eq!(hits.len(), 1);

        let misses = ledger.sales_in_range(now - Duration::days(2), now);
        assert!(misses.is_empty());
    }
}
