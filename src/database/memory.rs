use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::models::{NewTransaction, Transaction, TransactionId, TransactionPatch};
use crate::database::store::{SelectFilter, StoreError, TransactionStore};

/// Process-local store. Contents are lost on restart; ids are sequential integers.
#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<Vec<Transaction>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, filter: &SelectFilter) -> Result<Vec<Transaction>, StoreError> {
        let records = self.records.read().await;
        let mut rows: Vec<Transaction> = records.iter().filter(|r| filter.matches(r)).cloned().collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn insert(&self, record: NewTransaction) -> Result<Transaction, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = record.into_transaction(TransactionId::new(id.to_string()));

        self.records.write().await.push(stored.clone());
        debug!("memory store inserted transaction {}", stored.id);
        Ok(stored)
    }

    async fn update(&self, id: &TransactionId, patch: TransactionPatch) -> Result<Transaction, StoreError> {
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|r| &r.id == id).ok_or(StoreError::NotFound)?;
        patch.apply_to(record);
        Ok(record.clone())
    }

    async fn delete(&self, id: &TransactionId) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let position = records.iter().position(|r| &r.id == id).ok_or(StoreError::NotFound)?;
        records.remove(position);
        debug!("memory store deleted transaction {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{parse_date, TransactionType};
    use rust_decimal::Decimal;

    fn sample(title: &str, date: &str) -> NewTransaction {
        NewTransaction {
            title: title.to_string(),
            amount: Decimal::new(1000, 2),
            kind: TransactionType::Expense,
            date: parse_date(date).unwrap(),
            notes: String::new(),
            owner_id: None,
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.insert(sample("a", "2025-01-01")).await.unwrap();
        let b = store.insert(sample("b", "2025-01-02")).await.unwrap();
        assert_eq!(a.id.as_str(), "1");
        assert_eq!(b.id.as_str(), "2");
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryStore::new();
        store.insert(sample("old", "2024-06-01")).await.unwrap();
        store.insert(sample("new", "2025-06-01")).await.unwrap();
        store.insert(sample("mid", "2025-01-01")).await.unwrap();

        let titles: Vec<String> = store
            .select(&SelectFilter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn filters_by_owner() {
        let store = MemoryStore::new();
        let mut mine = sample("mine", "2025-01-01");
        mine.owner_id = Some("u1".into());
        store.insert(mine).await.unwrap();
        store.insert(sample("theirs", "2025-01-01")).await.unwrap();

        let rows = store.select(&SelectFilter::by_owner("u1")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "mine");
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryStore::new();
        let id = TransactionId::new("99");
        assert!(store.fetch_one(&id).await.unwrap_err().is_not_found());
        assert!(store.update(&id, TransactionPatch::default()).await.unwrap_err().is_not_found());
        assert!(store.delete(&id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = MemoryStore::new();
        let tx = store.insert(sample("a", "2025-01-01")).await.unwrap();
        store.delete(&tx.id).await.unwrap();
        assert!(store.select(&SelectFilter::all()).await.unwrap().is_empty());
        assert!(store.fetch_one(&tx.id).await.unwrap_err().is_not_found());
    }
}
