//! Infrastructure layer: the transactional store, the command engine, and
//! read-only reporting queries.

pub mod engine;
pub mod reporting;
pub mod store;


pub use engine::RetailEngine;
pub use store::{RetailState, RetailStore};
