use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

use crate::database::models::{parse_date, NewTransaction, TransactionPatch, TransactionType};
use crate::error::ApiError;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Required fields: title, amount, type";

/// Amount as sent by clients: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    /// `0`, `""` and whitespace count as absent
    fn is_blank(&self) -> bool {
        match self {
            AmountInput::Number(n) => n.as_f64() == Some(0.0),
            AmountInput::Text(s) => s.trim().is_empty(),
        }
    }

    fn to_decimal(&self) -> Result<Decimal, ApiError> {
        let raw = match self {
            AmountInput::Number(n) => n.to_string(),
            AmountInput::Text(s) => s.trim().to_string(),
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|_| ApiError::bad_request(format!("amount must be numeric, got '{}'", raw)))
    }
}

/// Body of POST and PUT. Every field is optional here; each operation decides
/// which ones it requires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub amount: Option<AmountInput>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// `Some` whenever the key is present, with `null` read as `""`
    #[serde(default, deserialize_with = "present_notes")]
    pub notes: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

fn present_notes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Some(Option::<String>::deserialize(deserializer)?.unwrap_or_default()))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn parse_kind(raw: &str) -> Result<TransactionType, ApiError> {
    raw.parse().map_err(ApiError::bad_request)
}

fn parse_input_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    parse_date(raw).ok_or_else(|| ApiError::bad_request(format!("date must be YYYY-MM-DD or RFC 3339, got '{}'", raw)))
}

impl TransactionInput {
    /// Validate a create request. `now` fills in a missing date.
    pub fn into_new(self, now: DateTime<Utc>) -> Result<NewTransaction, ApiError> {
        let (title, amount, kind) = match (
            non_empty(&self.title),
            self.amount.as_ref().filter(|a| !a.is_blank()),
            non_empty(&self.kind),
        ) {
            (Some(title), Some(amount), Some(kind)) => (title.to_string(), amount, kind),
            _ => return Err(ApiError::validation_error(REQUIRED_FIELDS_MESSAGE)),
        };

        Ok(NewTransaction {
            title,
            amount: amount.to_decimal()?,
            kind: parse_kind(kind)?,
            date: match non_empty(&self.date) {
                Some(raw) => parse_input_date(raw)?,
                None => now,
            },
            notes: self.notes.unwrap_or_default(),
            owner_id: non_empty(&self.user_id).map(str::to_string),
        })
    }

    /// Build an update patch. Only present, non-empty fields are applied,
    /// except `notes`, which is applied whenever the key is sent.
    pub fn into_patch(self) -> Result<TransactionPatch, ApiError> {
        Ok(TransactionPatch {
            title: non_empty(&self.title).map(str::to_string),
            amount: match self.amount.as_ref().filter(|a| !a.is_blank()) {
                Some(amount) => Some(amount.to_decimal()?),
                None => None,
            },
            kind: non_empty(&self.kind).map(parse_kind).transpose()?,
            date: non_empty(&self.date).map(parse_input_date).transpose()?,
            notes: self.notes,
        })
    }
}
