//! `pikwa-parties` — retailer identity and the directory seam.
//!
//! The core treats a retailer as an opaque identity plus a mutable role and
//! a cached revenue accumulator. Identity lifecycle (registration, phone
//! connections) is owned by an external collaborator behind
//! [`RetailerDirectory`].

pub mod directory;
pub mod retailer;

pub use directory::{RetailerDirectory, RetailerRegistry};
pub use retailer::{Retailer, Role};
