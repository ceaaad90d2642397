use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque transaction identifier.
///
/// The in-memory store hands out sequential integers and the hosted store
/// returns UUIDs; both travel as strings so nothing downstream depends on
/// either scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Int(n) => Self(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[serde(alias = "receita")]
    Income,
    #[serde(alias = "despesa")]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" | "receita" => Ok(TransactionType::Income),
            "expense" | "despesa" => Ok(TransactionType::Expense),
            other => Err(format!("type must be 'income' or 'expense', got '{}'", other)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored financial record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(rename = "user_id", default)]
    pub owner_id: Option<String>,
}

/// A validated record ready to be persisted; the store assigns the id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: DateTime<Utc>,
    pub notes: String,
    #[serde(rename = "user_id")]
    pub owner_id: Option<String>,
}

impl NewTransaction {
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            title: self.title,
            amount: self.amount,
            kind: self.kind,
            date: self.date,
            notes: self.notes,
            owner_id: self.owner_id,
        }
    }
}

/// Field changes for an update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.date.is_none()
            && self.notes.is_none()
    }

    /// Apply the changes in place. The id is not part of a patch and never changes.
    pub fn apply_to(&self, record: &mut Transaction) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(amount) = self.amount {
            record.amount = amount;
        }
        if let Some(kind) = self.kind {
            record.kind = kind;
        }
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres renders timestamptz with a space separator and short offset
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = raw.parse::<chrono::NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_hosted_row() {
        let row = json!({
            "id": "7b0c6a43-9e8e-4d55-9a43-0d0f5b1f6d2c",
            "title": "Salário",
            "amount": 3500.5,
            "type": "receita",
            "date": "2025-12-05",
            "notes": null,
            "user_id": null,
            "created_at": "2025-12-05T10:00:00+00:00"
        });
        let tx: Transaction = serde_json::from_value(row).unwrap();
        assert_eq!(tx.id.as_str(), "7b0c6a43-9e8e-4d55-9a43-0d0f5b1f6d2c");
        assert_eq!(tx.kind, TransactionType::Income);
        assert_eq!(tx.amount, Decimal::new(35005, 1));
        assert_eq!(tx.notes, "");
        assert_eq!(tx.date.to_rfc3339(), "2025-12-05T00:00:00+00:00");
    }

    #[test]
    fn integer_ids_become_strings() {
        let id: TransactionId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn serializes_wire_names() {
        let tx = NewTransaction {
            title: "Rent".into(),
            amount: Decimal::new(120000, 2),
            kind: TransactionType::Expense,
            date: parse_date("2025-01-01").unwrap(),
            notes: String::new(),
            owner_id: Some("u1".into()),
        }
        .into_transaction(TransactionId::new("9"));

        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["id"], "9");
        assert_eq!(value["type"], "expense");
        assert_eq!(value["amount"], 1200.0);
        assert_eq!(value["user_id"], "u1");
    }

    #[test]
    fn parses_postgres_timestamps() {
        let dt = parse_date("2025-03-01 12:30:00.123+00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2025-03-01 12:30");
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn patch_leaves_untouched_fields() {
        let mut tx = NewTransaction {
            title: "Groceries".into(),
            amount: Decimal::new(8990, 2),
            kind: TransactionType::Expense,
            date: parse_date("2025-02-10").unwrap(),
            notes: "weekly".into(),
            owner_id: None,
        }
        .into_transaction(TransactionId::new("3"));
        let before = tx.clone();

        let patch = TransactionPatch {
            notes: Some(String::new()),
            ..Default::default()
        };
        patch.apply_to(&mut tx);

        assert_eq!(tx.notes, "");
        assert_eq!(tx.id, before.id);
        assert_eq!(tx.title, before.title);
        assert_eq!(tx.amount, before.amount);
        assert_eq!(tx.date, before.date);
    }
}
