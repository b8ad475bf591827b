//! Access to the remote ledger service.
//!
//! [`Ledger`] is the seam the sync layer talks to; [`Client`] is the HTTP
//! implementation used by the binary.

use std::time::Duration;

use api_types::{
    summary::Summary,
    transaction::{Transaction, TransactionNew},
};
use async_trait::async_trait;
use reqwest::{Response, Url};
use rust_decimal::Decimal;
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::error::{AppError, Result};

const TRANSACTIONS_PATH: &str = "transactions";
const SUMMARY_PATH: &str = "summary";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the response body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response was readable but violates the wire contract.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The service answered with a non-success status.
    #[error("rejected with {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Operations the ledger service offers to this client.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// `GET /transactions`, in the order chosen by the service.
    async fn list_transactions(&self) -> std::result::Result<Vec<Transaction>, ClientError>;

    /// `GET /summary`.
    async fn summary(&self) -> std::result::Result<Summary, ClientError>;

    /// `POST /transactions`. The created resource is not returned: callers
    /// reload instead of trusting the echo.
    async fn create_transaction(
        &self,
        payload: &TransactionNew,
    ) -> std::result::Result<(), ClientError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorResponse {
    Error { error: String },
    Detail { detail: serde_json::Value },
}

impl ErrorResponse {
    fn into_message(self) -> String {
        match self {
            Self::Error { error } => error,
            Self::Detail {
                detail: serde_json::Value::String(detail),
            } => detail,
            Self::Detail { detail } => detail.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Malformed(format!("invalid endpoint {path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> std::result::Result<T, ClientError> {
        let endpoint = self.endpoint(path)?;
        tracing::debug!("GET {endpoint}");

        let res = self.http.get(endpoint).send().await?;
        if !res.status().is_success() {
            return Err(rejection(res).await);
        }

        let body = res.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| ClientError::Malformed(err.to_string()))
    }
}

#[async_trait]
impl Ledger for Client {
    async fn list_transactions(&self) -> std::result::Result<Vec<Transaction>, ClientError> {
        let transactions: Vec<Transaction> = self.get_json(TRANSACTIONS_PATH).await?;
        for transaction in &transactions {
            check_transaction(transaction)?;
        }
        tracing::debug!("received {} transactions", transactions.len());
        Ok(transactions)
    }

    async fn summary(&self) -> std::result::Result<Summary, ClientError> {
        let summary: Summary = self.get_json(SUMMARY_PATH).await?;
        check_summary(&summary)?;
        Ok(summary)
    }

    async fn create_transaction(
        &self,
        payload: &TransactionNew,
    ) -> std::result::Result<(), ClientError> {
        let endpoint = self.endpoint(TRANSACTIONS_PATH)?;
        tracing::debug!("POST {endpoint}");

        let res = self.http.post(endpoint).json(payload).send().await?;
        if res.status().is_success() {
            return Ok(());
        }
        Err(rejection(res).await)
    }
}

/// Parses the configured base address, making sure relative endpoints land
/// below it (`…/api` + `summary` must give `…/api/summary`).
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let mut url =
        Url::parse(base_url.trim()).map_err(|err| AppError::InvalidBaseUrl(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(AppError::InvalidBaseUrl(format!(
            "{base_url} cannot be used as a base"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn rejection(res: Response) -> ClientError {
    let status = res.status().as_u16();
    let message = res
        .json::<ErrorResponse>()
        .await
        .map(ErrorResponse::into_message)
        .unwrap_or_else(|_| "unknown error".to_string());
    ClientError::Rejected { status, message }
}

fn check_transaction(transaction: &Transaction) -> std::result::Result<(), ClientError> {
    if transaction.amount < Decimal::ZERO {
        return Err(ClientError::Malformed(format!(
            "transaction {} has a negative amount",
            transaction.id
        )));
    }
    if transaction.description.is_empty() {
        return Err(ClientError::Malformed(format!(
            "transaction {} has an empty description",
            transaction.id
        )));
    }
    Ok(())
}

fn check_summary(summary: &Summary) -> std::result::Result<(), ClientError> {
    if summary.income_total < Decimal::ZERO || summary.expense_total < Decimal::ZERO {
        return Err(ClientError::Malformed(
            "summary totals must not be negative".to_string(),
        ));
    }
    Ok(())
}
