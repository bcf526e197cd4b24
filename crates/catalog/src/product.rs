use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pikwa_core::{DomainError, DomainResult, Entity, ProductCode, SerialNumber};

/// Product reference data: code plus display metadata.
///
/// Immutable once imported; never deleted while sales reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    code: ProductCode,
    /// Short name for use in SMS responses.
    display_name: String,
    full_name: Option<String>,
}

impl Product {
    pub fn new(
        code: ProductCode,
        display_name: impl Into<String>,
        full_name: Option<String>,
    ) -> DomainResult<Self> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(DomainError::validation_one("display name cannot be empty"));
        }
        Ok(Self {
            code,
            display_name,
            full_name,
        })
    }

    pub fn code(&self) -> &ProductCode {
        &self.code
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }
}

impl Entity for Product {
    type Id = ProductCode;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}

/// In-memory product registry keyed by code.
///
/// Ordered by code so listings are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    products: BTreeMap<ProductCode, Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new product. Codes are unique; a second import of the
    /// same code is rejected rather than overwritten.
    pub fn add_product(&mut self, product: Product) -> DomainResult<()> {
        if self.products.contains_key(product.code()) {
            return Err(DomainError::validation_one(format!(
                "product {} already exists",
                product.code()
            )));
        }
        self.products.insert(product.code().clone(), product);
        Ok(())
    }

    /// Pure read; `NotFound` when the code is unknown.
    pub fn lookup_by_code(&self, code: &ProductCode) -> DomainResult<&Product> {
        self.products
            .get(code)
            .ok_or_else(|| DomainError::not_found(format!("product {code}")))
    }

    pub fn contains(&self, code: &ProductCode) -> bool {
        self.products.contains_key(code)
    }

    /// Resolve a product from a serial number's leading alphabetic run.
    ///
    /// Case-insensitive; the numeric suffix of the serial is ignored.
    pub fn lookup_by_alpha_prefix(&self, serial: &SerialNumber) -> DomainResult<&Product> {
        let prefix = serial.alpha_prefix();
        let code = ProductCode::new(prefix)
            .map_err(|_| DomainError::not_found(format!("product {prefix}")))?;
        self.lookup_by_code(&code)
    }

    /// All products in code order.
    pub fn all(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> ProductCode {
        ProductCode::new(raw).unwrap()
    }

    fn catalog_with(codes: &[&str]) -> Catalog {
        let mut catalog = Catalog::new();
        for c in codes {
            catalog
                .add_product(Product::new(code(c), format!("{c} stove"), None).unwrap())
                .unwrap();
        }
        catalog
    }

    #[test]
    fn lookup_by_code_finds_registered_product() {
        let catalog = catalog_with(&["EW", "CW"]);
        let product = catalog.lookup_by_code(&code("ew")).unwrap();
        assert_eq!(product.display_name(), "EW stove");
    }

    #[test]
    fn lookup_by_code_reports_not_found() {
        let catalog = catalog_with(&["EW"]);
        let err = catalog.lookup_by_code(&code("XX")).unwrap_err();
        match err {
            DomainError::NotFound(what) => assert_eq!(what, "product XX"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_product_code_is_rejected() {
        let mut catalog = catalog_with(&["EW"]);
        let err = catalog
            .add_product(Product::new(code("EW"), "other", None).unwrap())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn alpha_prefix_lookup_ignores_numeric_suffix() {
        let catalog = catalog_with(&["EW"]);
        let serial = SerialNumber::new("ew00001").unwrap();
        let product = catalog.lookup_by_alpha_prefix(&serial).unwrap();
        assert_eq!(product.code(), &code("EW"));
    }

    #[test]
    fn alpha_prefix_lookup_fails_for_all_digit_serial() {
        let catalog = catalog_with(&["EW"]);
        let serial = SerialNumber::new("1200001").unwrap();
        assert!(catalog.lookup_by_alpha_prefix(&serial).is_err());
    }

    #[test]
    fn all_iterates_in_code_order() {
        let catalog = catalog_with(&["ZZ", "AA", "MM"]);
        let codes: Vec<&str> = catalog.all().map(|p| p.code().as_str()).collect();
        assert_eq!(codes, vec!["AA", "MM", "ZZ"]);
    }
}
