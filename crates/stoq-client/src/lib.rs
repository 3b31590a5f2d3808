//! HTTP client for the inventory backend.
//!
//! Provides a minimal client with two operations: token verification
//! (`GET {verify_path}?token=...`) and multipart inventory ingestion
//! (`POST {ingest_path}?token=...`). The pipeline and CLI crates use this
//! client directly.
//!
//! The client keeps two outcomes strictly apart: a reachable backend that
//! rejects the token yields `Verification::Invalid`, while a transport
//! failure yields `Err`. Conflating them would force a logout on every
//! transient network blip.

pub mod token;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stoq_core::{Config, SelectedFile};

/// Outcome of a token verification call against a reachable backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// HTTP 200: the token is currently valid for protected operations.
    Valid,
    /// Any other status: the token is invalid or expired.
    Invalid,
}

/// Acknowledgement of a successful ingestion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// HTTP status the backend answered with (any 2xx).
    pub status: u16,
}

/// HTTP client for the inventory backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    verify_path: String,
    ingest_path: String,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        verify_path: impl Into<String>,
        ingest_path: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            verify_path: verify_path.into(),
            ingest_path: ingest_path.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            config.verify_path.clone(),
            config.ingest_path.clone(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the backend whether `token` is currently valid.
    ///
    /// Single read-only request; the caller is expected to issue at most one
    /// per pipeline attempt. Returns `Err` only on transport failure.
    pub async fn verify_token(&self, token: &str) -> Result<Verification> {
        let url = self.build_url(&self.verify_path);
        let response = self
            .client
            .get(&url)
            .query(&[("token", token)])
            .send()
            .await
            .context("Failed to reach verification endpoint")?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            tracing::debug!(status = status.as_u16(), "Token verified");
            Ok(Verification::Valid)
        } else {
            tracing::warn!(status = status.as_u16(), "Token rejected by backend");
            Ok(Verification::Invalid)
        }
    }

    /// Upload a validated inventory file.
    ///
    /// The binary content travels as a single multipart field named `file`;
    /// the token rides along as a query parameter. Any non-2xx status or
    /// transport failure is an error. No retry is attempted here.
    pub async fn ingest_file(
        &self,
        file: &SelectedFile,
        token: &str,
    ) -> Result<SubmissionReceipt> {
        let url = self.build_url(&self.ingest_path);
        let size = file.len();

        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .context("Invalid content type for multipart part")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .query(&[("token", token)])
            .multipart(form)
            .send()
            .await
            .context("Failed to reach ingestion endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = status.as_u16(),
                size_bytes = size,
                "Inventory upload rejected"
            );
            return Err(anyhow::anyhow!(
                "Ingestion failed with status {}: {}",
                status,
                error_text
            ));
        }

        tracing::info!(
            status = status.as_u16(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Inventory upload successful"
        );

        Ok(SubmissionReceipt {
            status: status.as_u16(),
        })
    }
}

// Re-export token storage types for convenience.
pub use token::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
