use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{NewTransaction, Transaction, TransactionId, TransactionPatch};

/// Errors from a transaction store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Transaction not found")]
    NotFound,

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    /// The hosted datastore answered with an error payload
    #[error("{message}")]
    Rejected { code: Option<String>, message: String },

    #[error("Unexpected response from datastore: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

/// Row filter for `select`. Results are always ordered by date, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectFilter {
    pub id: Option<TransactionId>,
    pub owner_id: Option<String>,
}

impl SelectFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: &TransactionId) -> Self {
        Self {
            id: Some(id.clone()),
            ..Default::default()
        }
    }

    pub fn by_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, record: &Transaction) -> bool {
        self.id.as_ref().map_or(true, |id| &record.id == id)
            && self
                .owner_id
                .as_deref()
                .map_or(true, |owner| record.owner_id.as_deref() == Some(owner))
    }
}

/// Persistence boundary shared by the memory, hosted and postgres backends.
///
/// `update` and `delete` must answer `StoreError::NotFound` for an unknown id
/// rather than a generic failure.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Short backend name for logs and the service descriptor
    fn backend(&self) -> &'static str;

    async fn select(&self, filter: &SelectFilter) -> Result<Vec<Transaction>, StoreError>;

    async fn insert(&self, record: NewTransaction) -> Result<Transaction, StoreError>;

    async fn update(&self, id: &TransactionId, patch: TransactionPatch) -> Result<Transaction, StoreError>;

    async fn delete(&self, id: &TransactionId) -> Result<(), StoreError>;

    async fn fetch_one(&self, id: &TransactionId) -> Result<Transaction, StoreError> {
        self.select(&SelectFilter::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }

    /// Cheap connectivity probe used by `/health`
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
