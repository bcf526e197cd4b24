use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pikwa_core::{Alias, DomainError, DomainResult, ProductCode};

/// Owner of a stock entry.
///
/// Escrow is a first-class holder, not a retailer lookalike, so in-transit
/// stock can never leak into retailer-facing summaries or reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockHolder {
    Retailer(Alias),
    Escrow,
}

impl StockHolder {
    pub fn retailer(alias: Alias) -> Self {
        Self::Retailer(alias)
    }
}

impl core::fmt::Display for StockHolder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Retailer(alias) => core::fmt::Display::fmt(alias, f),
            Self::Escrow => f.write_str("(escrow)"),
        }
    }
}

/// One line of a holder's stock summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
    pub code: ProductCode,
    pub quantity: u32,
}

/// Per-(holder, product) quantity counters.
///
/// At most one entry exists per pair; entries are created lazily by `grant`
/// and never by `reserve`. An entry that reaches zero stays in place (and in
/// summaries), matching how restocked-out rows were shown in the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLedger {
    entries: BTreeMap<(StockHolder, ProductCode), u32>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current quantity; zero when the entry is absent.
    pub fn quantity(&self, holder: &StockHolder, code: &ProductCode) -> u32 {
        self.entries
            .get(&(holder.clone(), code.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Atomically decrement a holder's quantity.
    ///
    /// Fails with `InsufficientStock` (and changes nothing) when the current
    /// quantity is below `amount`. Never creates an entry.
    pub fn reserve(
        &mut self,
        holder: &StockHolder,
        code: &ProductCode,
        amount: u32,
    ) -> DomainResult<()> {
        let available = self.quantity(holder, code);
        if available < amount {
            return Err(DomainError::InsufficientStock {
                code: code.as_str().to_string(),
                requested: amount,
                available,
            });
        }
        if amount == 0 {
            return Ok(());
        }
        // The entry exists: available >= amount > 0 rules out the absent case.
        let entry = self
            .entries
            .get_mut(&(holder.clone(), code.clone()))
            .ok_or_else(|| DomainError::internal("stock entry vanished during reserve"))?;
        *entry -= amount;
        Ok(())
    }

    /// Increment a holder's quantity, creating the entry when absent.
    pub fn grant(&mut self, holder: &StockHolder, code: &ProductCode, amount: u32) {
        let entry = self
            .entries
            .entry((holder.clone(), code.clone()))
            .or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// A holder's stock lines, ordered by product code.
    pub fn summary(&self, holder: &StockHolder) -> Vec<StockLine> {
        self.entries
            .iter()
            .filter(|((h, _), _)| h == holder)
            .map(|((_, code), quantity)| StockLine {
                code: code.clone(),
                quantity: *quantity,
            })
            .collect()
    }

    /// Total units a holder has on hand across all products.
    pub fn total(&self, holder: &StockHolder) -> u64 {
        self.entries
            .iter()
            .filter(|((h, _), _)| h == holder)
            .map(|(_, quantity)| *quantity as u64)
            .sum()
    }

    /// All holders with at least one entry, in stable order.
    pub fn holders(&self) -> Vec<&StockHolder> {
        let mut holders: Vec<&StockHolder> = self.entries.keys().map(|(h, _)| h).collect();
        holders.dedup();
        holders
    }
}
