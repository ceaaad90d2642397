pub mod collection;
pub mod input;
pub mod record;

// Re-export handler functions for use in routing
pub use collection::create as transaction_create;
pub use collection::list as transaction_list;
pub use record::delete as transaction_delete;
pub use record::get as transaction_get;
pub use record::update as transaction_update;
