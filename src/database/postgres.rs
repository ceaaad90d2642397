use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::database::models::{NewTransaction, Transaction, TransactionId, TransactionPatch};
use crate::database::store::{SelectFilter, StoreError, TransactionStore};

const COLUMNS: &str = "id::text AS id, title, amount::numeric AS amount, type::text AS type, date::timestamptz AS date, notes, user_id::text AS user_id";

/// Direct connection to the transactions table, bypassing the REST gateway.
///
/// Expects the hosted schema: `id uuid default gen_random_uuid()`, `amount numeric`,
/// `type text`, `date timestamptz`, `notes text`, `user_id uuid`.
pub struct PgStore {
    pool: PgPool,
    table: String,
}

impl PgStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for table: {}", config.table);
        Self::with_pool(pool, &config.table)
    }

    pub fn with_pool(pool: PgPool, table: &str) -> Result<Self, StoreError> {
        if !is_valid_table_name(table) {
            return Err(StoreError::InvalidUrl(format!("invalid table name '{}'", table)));
        }
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    fn quoted_table(&self) -> String {
        quote_identifier(&self.table)
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// Ids in this table are UUIDs; anything else cannot match a row
fn parse_id(id: &TransactionId) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id.as_str()).map_err(|_| StoreError::NotFound)
}

fn row_to_transaction(row: &PgRow) -> Result<Transaction, StoreError> {
    let kind: String = row.try_get("type")?;
    Ok(Transaction {
        id: TransactionId::new(row.try_get::<String, _>("id")?),
        title: row.try_get("title")?,
        amount: row.try_get::<Decimal, _>("amount")?,
        kind: kind
            .parse()
            .map_err(|e: String| StoreError::UnexpectedResponse(e))?,
        date: row.try_get::<DateTime<Utc>, _>("date")?,
        notes: row.try_get::<Option<String>, _>("notes")?.unwrap_or_default(),
        owner_id: row.try_get("user_id")?,
    })
}

#[async_trait]
impl TransactionStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn select(&self, filter: &SelectFilter) -> Result<Vec<Transaction>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM {} WHERE TRUE", COLUMNS, self.quoted_table()));

        if let Some(id) = &filter.id {
            match parse_id(id) {
                Ok(uuid) => {
                    builder.push(" AND id = ").push_bind(uuid);
                }
                Err(_) => return Ok(Vec::new()),
            }
        }
        if let Some(owner) = &filter.owner_id {
            builder.push(" AND user_id::text = ").push_bind(owner.clone());
        }
        builder.push(" ORDER BY date DESC");

        debug!("postgres select: {}", builder.sql());
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_transaction).collect()
    }

    async fn insert(&self, record: NewTransaction) -> Result<Transaction, StoreError> {
        let owner = match record.owner_id.as_deref() {
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| StoreError::Rejected {
                        code: Some("22P02".to_string()),
                        message: format!("invalid input syntax for type uuid: \"{}\"", raw),
                    })?,
            ),
            None => None,
        };

        let sql = format!(
            "INSERT INTO {} (title, amount, type, date, notes, user_id) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            self.quoted_table(),
            COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&record.title)
            .bind(record.amount)
            .bind(record.kind.as_str())
            .bind(record.date)
            .bind(&record.notes)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        row_to_transaction(&row)
    }

    async fn update(&self, id: &TransactionId, patch: TransactionPatch) -> Result<Transaction, StoreError> {
        let uuid = parse_id(id)?;
        if patch.is_empty() {
            return self.fetch_one(id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!("UPDATE {} SET ", self.quoted_table()));
        {
            let mut set = builder.separated(", ");
            if let Some(title) = patch.title {
                set.push("title = ").push_bind_unseparated(title);
            }
            if let Some(amount) = patch.amount {
                set.push("amount = ").push_bind_unseparated(amount);
            }
            if let Some(kind) = patch.kind {
                set.push("type = ").push_bind_unseparated(kind.as_str());
            }
            if let Some(date) = patch.date {
                set.push("date = ").push_bind_unseparated(date);
            }
            if let Some(notes) = patch.notes {
                set.push("notes = ").push_bind_unseparated(notes);
            }
        }
        builder.push(" WHERE id = ").push_bind(uuid);
        builder.push(format!(" RETURNING {}", COLUMNS));

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        row_to_transaction(&row)
    }

    async fn delete(&self, id: &TransactionId) -> Result<(), StoreError> {
        let uuid = parse_id(id)?;
        let sql = format!("DELETE FROM {} WHERE id = $1", self.quoted_table());
        let result = sqlx::query(&sql).bind(uuid).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
