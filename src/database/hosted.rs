use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::database::models::{NewTransaction, Transaction, TransactionId, TransactionPatch};
use crate::database::store::{SelectFilter, StoreError, TransactionStore};

/// Error code the REST gateway returns when a single-row request matched nothing
pub const NO_ROWS_CODE: &str = "PGRST116";
/// Postgres `invalid_text_representation`, e.g. a malformed UUID in an id filter
const INVALID_TEXT_CODE: &str = "22P02";

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Error body of the hosted REST gateway
#[derive(Debug, Deserialize)]
struct GatewayError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Client for the hosted datastore's REST interface (`/rest/v1/<table>`)
#[derive(Debug, Clone)]
pub struct HostedStore {
    client: reqwest::Client,
    table_url: Url,
    service_key: String,
}

impl HostedStore {
    pub fn new(base_url: &str, service_key: &str, table: &str) -> Result<Self, StoreError> {
        Self::with_client(reqwest::Client::new(), base_url, service_key, table)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        service_key: &str,
        table: &str,
    ) -> Result<Self, StoreError> {
        let mut table_url = Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        let path = format!("{}/rest/v1/{}", table_url.path().trim_end_matches('/'), table);
        table_url.set_path(&path);

        Ok(Self {
            client,
            table_url,
            service_key: service_key.to_string(),
        })
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn id_url(&self, id: &TransactionId) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
        url
    }

    fn select_url(&self, filter: &SelectFilter) -> Url {
        let mut url = self.table_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            if let Some(id) = &filter.id {
                query.append_pair("id", &format!("eq.{}", id));
            }
            if let Some(owner) = &filter.owner_id {
                query.append_pair("user_id", &format!("eq.{}", owner));
            }
            query.append_pair("order", "date.desc");
        }
        url
    }
}

/// Turn a non-success gateway response into a store error.
///
/// `id_scoped` marks requests filtered by `id=eq.<id>`: only there does a
/// malformed value mean "no such row". Elsewhere (e.g. a non-UUID `user_id`
/// on insert) it is a rejection like any other.
pub(crate) fn classify_error(status: StatusCode, body: &str, id_scoped: bool) -> StoreError {
    match serde_json::from_str::<GatewayError>(body) {
        Ok(err) => match err.code.as_deref() {
            Some(NO_ROWS_CODE) => StoreError::NotFound,
            Some(INVALID_TEXT_CODE) if id_scoped => StoreError::NotFound,
            _ => StoreError::Rejected {
                code: err.code,
                message: err
                    .message
                    .or(err.details)
                    .unwrap_or_else(|| format!("datastore responded with {}", status)),
            },
        },
        Err(_) if status == StatusCode::NOT_FOUND => StoreError::Rejected {
            code: None,
            message: format!("datastore resource not found ({})", status),
        },
        Err(_) => StoreError::Rejected {
            code: None,
            message: if body.trim().is_empty() {
                format!("datastore responded with {}", status)
            } else {
                body.trim().to_string()
            },
        },
    }
}

async fn check(response: Response, id_scoped: bool) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_error(status, &body, id_scoped))
}

#[async_trait]
impl TransactionStore for HostedStore {
    fn backend(&self) -> &'static str {
        "hosted"
    }

    async fn select(&self, filter: &SelectFilter) -> Result<Vec<Transaction>, StoreError> {
        let url = self.select_url(filter);
        debug!("hosted select {}", url);

        let response = self.request(Method::GET, url).send().await?;
        match check(response, filter.id.is_some()).await {
            Ok(response) => Ok(response.json::<Vec<Transaction>>().await?),
            // A malformed id cannot match any row
            Err(StoreError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn insert(&self, record: NewTransaction) -> Result<Transaction, StoreError> {
        let url = self.table_url.clone();
        debug!("hosted insert {}", url);

        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .header(header::ACCEPT, SINGLE_OBJECT)
            .json(&[record])
            .send()
            .await?;
        Ok(check(response, false).await?.json::<Transaction>().await?)
    }

    async fn update(&self, id: &TransactionId, patch: TransactionPatch) -> Result<Transaction, StoreError> {
        if patch.is_empty() {
            return self.fetch_one(id).await;
        }

        let url = self.id_url(id);
        debug!("hosted update {}", url);

        let response = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .header(header::ACCEPT, SINGLE_OBJECT)
            .json(&patch)
            .send()
            .await?;
        Ok(check(response, true).await?.json::<Transaction>().await?)
    }

    async fn delete(&self, id: &TransactionId) -> Result<(), StoreError> {
        let url = self.id_url(id);
        debug!("hosted delete {}", url);

        let response = self
            .request(Method::DELETE, url)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let removed: Vec<serde_json::Value> = check(response, true).await?.json().await?;
        if removed.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().append_pair("select", "id").append_pair("limit", "1");
        let response = self.request(Method::GET, url).send().await?;
        check(response, false).await?;
        Ok(())
    }
}
