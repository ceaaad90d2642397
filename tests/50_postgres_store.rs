//! Runs against a live database: `DATABASE_URL=postgres://... cargo test -- --ignored`

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use fintrack_api::database::models::{parse_date, NewTransaction, TransactionId, TransactionPatch, TransactionType};
use fintrack_api::database::{PgStore, SelectFilter, StoreError, TransactionStore};

/// A throwaway table shaped like the hosted one, dropped by `drop_table`
async fn scratch_table() -> Result<(PgPool, String)> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set for postgres tests")?;
    let pool = PgPoolOptions::new().max_connections(2).connect(&url).await?;

    let table = format!("fintrack_test_{}", Uuid::new_v4().simple());
    sqlx::query(&format!(
        "CREATE TABLE \"{}\" (
            id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
            title text NOT NULL,
            amount numeric NOT NULL,
            type text NOT NULL,
            date timestamptz NOT NULL DEFAULT now(),
            notes text DEFAULT '',
            user_id uuid
        )",
        table
    ))
    .execute(&pool)
    .await?;

    Ok((pool, table))
}

async fn drop_table(pool: &PgPool, table: &str) -> Result<()> {
    sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", table)).execute(pool).await?;
    Ok(())
}

fn new_tx(title: &str, date: &str, owner: Option<Uuid>) -> Result<NewTransaction> {
    Ok(NewTransaction {
        title: title.to_string(),
        amount: Decimal::new(12_345, 2),
        kind: TransactionType::Expense,
        date: parse_date(date).context("bad test date")?,
        notes: String::new(),
        owner_id: owner.map(|id| id.to_string()),
    })
}

async fn exercise(store: &PgStore) -> Result<()> {
    let owner = Uuid::new_v4();

    let old = store.insert(new_tx("Old", "2024-01-10", Some(owner))?).await?;
    let new = store.insert(new_tx("New", "2024-05-10", Some(owner))?).await?;
    store.insert(new_tx("Other", "2024-03-10", None)?).await?;
    assert_eq!(old.amount, Decimal::new(12_345, 2));
    assert_eq!(old.notes, "");

    let titles: Vec<String> = store
        .select(&SelectFilter::all())
        .await?
        .into_iter()
        .map(|tx| tx.title)
        .collect();
    assert_eq!(titles, ["New", "Other", "Old"]);
    assert_eq!(store.select(&SelectFilter::by_owner(owner.to_string())).await?.len(), 2);

    let patch = TransactionPatch {
        notes: Some("paid".into()),
        ..Default::default()
    };
    let updated = store.update(&new.id, patch.clone()).await?;
    assert_eq!(updated.notes, "paid");
    assert_eq!(updated.title, "New");
    assert_eq!(updated.date, new.date);

    store.delete(&old.id).await?;
    assert!(store.fetch_one(&old.id).await.unwrap_err().is_not_found());

    // Missing and malformed ids are both "not found"
    let missing = TransactionId::new(Uuid::new_v4().to_string());
    let malformed = TransactionId::new("42");
    for id in [&missing, &malformed] {
        assert!(store.update(id, patch.clone()).await.unwrap_err().is_not_found());
        assert!(store.delete(id).await.unwrap_err().is_not_found());
        assert!(store.fetch_one(id).await.unwrap_err().is_not_found());
    }

    // A bad owner is a rejection, not a missing row
    let mut bad_owner = new_tx("Bad owner", "2024-02-01", None)?;
    bad_owner.owner_id = Some("ana".into());
    let err = store.insert(bad_owner).await.unwrap_err();
    assert!(matches!(err, StoreError::Rejected { .. }), "unexpected error: {err:?}");

    Ok(())
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at a disposable Postgres"]
async fn crud_and_not_found_against_live_database() -> Result<()> {
    let (pool, table) = scratch_table().await?;
    let store = PgStore::with_pool(pool.clone(), &table)?;

    let outcome = exercise(&store).await;
    drop_table(&pool, &table).await?;
    outcome
}
