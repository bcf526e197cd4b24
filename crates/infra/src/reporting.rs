//! Read-side reports over the retail state.
//!
//! These are plain aggregations for back-office use (dashboards, exports).
//! They borrow the state immutably and never touch the ledgers, so they can
//! run through [`RetailStore::read`](crate::store::RetailStore::read).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use pikwa_core::{Alias, OrganizationCode};
use pikwa_parties::RetailerDirectory;
use pikwa_sales::Sale;
use pikwa_stock::{StockHolder, StockLine};

use crate::store::RetailState;

/// One row of the sales report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRow {
    pub serial: String,
    pub buyer: String,
    pub seller: Alias,
    pub region: String,
    pub price_cents: u64,
    pub date: DateTime<Utc>,
}

impl SaleRow {
    fn from_sale(sale: &Sale) -> Self {
        Self {
            serial: sale.serial().to_string(),
            buyer: sale.buyer().full_name(),
            seller: sale.seller().clone(),
            region: sale.region().display_name().to_string(),
            price_cents: sale.price().cents(),
            date: sale.purchase_date(),
        }
    }
}

/// Sales recorded in `[start, end)`, oldest first.
pub fn sales_between(state: &RetailState, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<SaleRow> {
    let mut rows: Vec<SaleRow> = state
        .sales
        .sales_in_range(start, end)
        .into_iter()
        .map(SaleRow::from_sale)
        .collect();
    rows.sort_by_key(|row| row.date);
    rows
}

/// Cached revenue totals grouped by organization, in whole Tsh.
///
/// Retailers without an organization are grouped under `None`.
pub fn revenue_by_organization(state: &RetailState) -> BTreeMap<Option<OrganizationCode>, i64> {
    let mut totals: BTreeMap<Option<OrganizationCode>, i64> = BTreeMap::new();
    for retailer in state.retailers.all() {
        let key = retailer.organization().cloned();
        *totals.entry(key).or_insert(0) += retailer.revenue().tsh();
    }
    totals
}

/// Current holdings of every retailer, keyed by alias.
///
/// Escrowed stock is deliberately excluded; it belongs to no retailer
/// until its transfer resolves.
pub fn inventory_by_retailer(state: &RetailState) -> BTreeMap<Alias, Vec<StockLine>> {
    let mut inventory = BTreeMap::new();
    for holder in state.stock.holders() {
        if let StockHolder::Retailer(alias) = holder {
            inventory.insert(alias.clone(), state.stock.summary(holder));
        }
    }
    inventory
}

/// Units currently parked on escrow, per product.
pub fn escrowed_stock(state: &RetailState) -> Vec<StockLine> {
    state.stock.summary(&StockHolder::Escrow)
}
