// handlers/mod.rs - HTTP handlers grouped by resource
//
// transactions: CRUD over the transaction resource, mounted under the
// configured route prefix (`/transactions` or `/api/transactions`).
pub mod transactions;

pub use transactions::*;
