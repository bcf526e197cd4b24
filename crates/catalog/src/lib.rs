//! `pikwa-catalog` — product reference data.
//!
//! Static mapping of product code to display metadata, plus the region code
//! table used when formatting sale records. No stock or sale state lives
//! here; the catalog is read-mostly reference data created by admin import.

pub mod product;
pub mod regions;

pub use product::{Catalog, Product};
pub use regions::Region;
