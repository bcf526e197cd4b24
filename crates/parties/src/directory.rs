//! Identity resolution seam.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pikwa_core::{Alias, DomainError, DomainResult};

use crate::retailer::Retailer;

/// Alias → retailer resolution, supplied by the identity collaborator.
///
/// The core never creates or deletes retailers; it only resolves them and
/// mutates role/revenue on the resolved record. `resolve_by_alias` returns
/// `DomainError::NotFound` for unknown aliases.
pub trait RetailerDirectory {
    fn resolve_by_alias(&self, alias: &Alias) -> DomainResult<&Retailer>;

    fn resolve_by_alias_mut(&mut self, alias: &Alias) -> DomainResult<&mut Retailer>;

    /// All known retailers, in stable (alias) order. Used by reporting.
    fn all(&self) -> Vec<&Retailer>;
}

/// In-memory directory keyed by alias.
///
/// The store embeds one of these as its identity table; tests use it
/// directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerRegistry {
    retailers: BTreeMap<Alias, Retailer>,
}

impl RetailerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a retailer. Aliases are unique.
    pub fn add(&mut self, retailer: Retailer) -> DomainResult<()> {
        let alias = retailer.alias().clone();
        if self.retailers.contains_key(&alias) {
            return Err(DomainError::validation_one(format!(
                "alias {alias} is already in use"
            )));
        }
        self.retailers.insert(alias, retailer);
        Ok(())
    }

    pub fn contains(&self, alias: &Alias) -> bool {
        self.retailers.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.retailers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retailers.is_empty()
    }
}

impl RetailerDirectory for RetailerRegistry {
    fn resolve_by_alias(&self, alias: &Alias) -> DomainResult<&Retailer> {
        self.retailers
            .get(alias)
            .ok_or_else(|| DomainError::not_found(format!("user {alias}")))
    }

    fn resolve_by_alias_mut(&mut self, alias: &Alias) -> DomainResult<&mut Retailer> {
        self.retailers
            .get_mut(alias)
            .ok_or_else(|| DomainError::not_found(format!("user {alias}")))
    }

    fn all(&self) -> Vec<&Retailer> {
        self.retailers.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_alias() {
        let mut registry = RetailerRegistry::new();
        let alias = Alias::new("dnombo").unwrap();
        registry
            .add(Retailer::new(alias.clone(), "D Nombo"))
            .unwrap();
        assert_eq!(registry.resolve_by_alias(&alias).unwrap().name(), "D Nombo");
    }

    #[test]
    fn unknown_alias_is_not_found() {
        let registry = RetailerRegistry::new();
        let err = registry
            .resolve_by_alias(&Alias::new("ghost").unwrap())
            .unwrap_err();
        match err {
            DomainError::NotFound(what) => assert_eq!(what, "user ghost"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_alias_is_rejected() {
        let mut registry = RetailerRegistry::new();
        let alias = Alias::new("dnombo").unwrap();
        registry
            .add(Retailer::new(alias.clone(), "D Nombo"))
            .unwrap();
        let err = registry.add(Retailer::new(alias, "Other")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(registry.len(), 1);
    }
}
