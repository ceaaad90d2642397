pub mod hosted;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use hosted::HostedStore;
pub use manager::open_store;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{SelectFilter, StoreError, TransactionStore};
