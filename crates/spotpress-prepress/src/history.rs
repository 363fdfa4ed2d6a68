//! Design-history collaborator: has this exact design been printed?

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::RwLock;
use thiserror::Error;

/// Errors from the history collaborator. The checkout workflow treats
/// every one of these as "not printed before" (fail open).
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("history service returned status {0}")]
    Status(u16),

    #[error("history store error: {0}")]
    Store(String),
}

/// Lookup interface over the external design-history store.
#[async_trait]
pub trait DesignHistoryClient: Send + Sync {
    /// Whether a design with this content hash was ordered before.
    async fn has_been_printed(&self, design_hash: &str) -> Result<bool, HistoryError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRequest<'a> {
    artwork_data: ArtworkData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtworkData<'a> {
    design_hash: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    has_been_printed: bool,
}

/// HTTP client for the storefront's design-history endpoint.
pub struct HttpDesignHistory {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpDesignHistory {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DesignHistoryClient for HttpDesignHistory {
    async fn has_been_printed(&self, design_hash: &str) -> Result<bool, HistoryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&HistoryRequest {
                artwork_data: ArtworkData { design_hash },
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(HistoryError::Status(response.status().as_u16()));
        }
        let body: HistoryResponse = response.json().await?;
        Ok(body.has_been_printed)
    }
}

/// In-memory history for tests and offline runs.
#[derive(Debug, Default)]
pub struct InMemoryDesignHistory {
    printed: RwLock<HashSet<String>>,
}

impl InMemoryDesignHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a hash as already printed.
    pub fn record_printed(&self, design_hash: impl Into<String>) {
        if let Ok(mut printed) = self.printed.write() {
            printed.insert(design_hash.into());
        }
    }
}

#[async_trait]
impl DesignHistoryClient for InMemoryDesignHistory {
    async fn has_been_printed(&self, design_hash: &str) -> Result<bool, HistoryError> {
        let printed = self
            .printed
            .read()
            .map_err(|err| HistoryError::Store(format!("lock error: {err}")))?;
        Ok(printed.contains(design_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_hash_is_unprinted() {
        let history = InMemoryDesignHistory::new();
        assert!(!history.has_been_printed("abc123").await.unwrap());
    }

    #[tokio::test]
    async fn recorded_hash_is_printed() {
        let history = InMemoryDesignHistory::new();
        history.record_printed("abc123");
        assert!(history.has_been_printed("abc123").await.unwrap());
        assert!(!history.has_been_printed("def456").await.unwrap());
    }

    #[test]
    fn request_payload_matches_the_contract() {
        let request = HistoryRequest {
            artwork_data: ArtworkData { design_hash: "cafe01" },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"artworkData":{"designHash":"cafe01"}}"#);
    }

    #[test]
    fn response_parses_from_the_contract() {
        let body: HistoryResponse = serde_json::from_str(r#"{"hasBeenPrinted":true}"#).unwrap();
        assert!(body.has_been_printed);
    }
}
