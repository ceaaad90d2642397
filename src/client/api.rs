use reqwest::{Response, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::database::models::{Transaction, TransactionType};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Fields sent on create and update. Unset fields are omitted from the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionDraft {
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
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the transaction resource, e.g. `http://localhost:3000/transactions`
#[derive(Debug, Clone)]
pub struct TransactionsClient {
    client: reqwest::Client,
    base_url: Url,
}

impl TransactionsClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn record_url(&self, id: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    pub async fn list(&self, owner_id: Option<&str>) -> Result<Vec<Transaction>, ClientError> {
        let mut request = self.client.get(self.base_url.clone());
        if let Some(owner) = owner_id {
            request = request.query(&[("user_id", owner)]);
        }
        Ok(check(request.send().await?).await?.json().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Transaction, ClientError> {
        let response = self.client.get(self.record_url(id)?).send().await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn create(&self, draft: &TransactionDraft) -> Result<Transaction, ClientError> {
        let response = self.client.post(self.base_url.clone()).json(draft).send().await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn update(&self, id: &str, draft: &TransactionDraft) -> Result<Transaction, ClientError> {
        let response = self.client.put(self.record_url(id)?).json(draft).send().await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let response = self.client.delete(self.record_url(id)?).send().await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

fn api_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}
