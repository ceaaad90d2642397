pub mod transaction;

pub use transaction::{
    parse_date, NewTransaction, Transaction, TransactionId, TransactionPatch, TransactionType,
};
