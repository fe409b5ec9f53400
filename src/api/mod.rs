//! Remote Procedure Client - typed HTTP calls to the file-manager backend.
//!
//! Each submodule covers one endpoint family:
//! - `filesystem`: home, roots, list, validate (GET /filesystem/*)
//! - `operations`: the five file operations (POST /operations/*)
//!
//! `BrowseApi` and `OperationsApi` are the seams the navigator, forms and
//! tests plug into; `ApiClient` is the reqwest implementation of both.
//! Every failure (connect, timeout, HTTP status, `success:false` body,
//! undecodable body) comes back as a `ClientError` whose `normalize()` gives
//! the one `{success:false, message, error?}` shape.

pub mod filesystem;
pub mod operations;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::{
    DirectoryListing, DuplicateRequest, DuplicateResponse, ExtractResponse, FileSystemEntry,
    OrganizeResponse, PathValidation, PhotoOrganizeResponse, RenameRequest, RenameResponse,
    TransferRequest,
};

/// Filesystem browsing endpoints used by the directory picker.
#[async_trait]
pub trait BrowseApi: Send + Sync {
    async fn home(&self) -> Result<String>;
    async fn roots(&self) -> Result<Vec<FileSystemEntry>>;
    async fn list_directory(&self, path: &str, include_files: bool) -> Result<DirectoryListing>;
    async fn validate_path(&self, path: &str) -> Result<PathValidation>;
}

/// The five file operations.
#[async_trait]
pub trait OperationsApi: Send + Sync {
    async fn rename(&self, request: &RenameRequest) -> Result<RenameResponse>;
    async fn organize(&self, request: &TransferRequest) -> Result<OrganizeResponse>;
    async fn extract(&self, request: &TransferRequest) -> Result<ExtractResponse>;
    async fn photo_organize(&self, request: &TransferRequest) -> Result<PhotoOrganizeResponse>;
    async fn find_duplicates(&self, request: &DuplicateRequest) -> Result<DuplicateResponse>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.config.url(path);
        tracing::debug!("GET {} {:?}", url, query);
        let response = self.http.get(url).query(query).send().await?;
        decode_response(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.config.url(path);
        tracing::debug!("POST {}", url);
        let response = self.http.post(url).json(body).send().await?;
        decode_response(response).await
    }
}

/// Turn any response into `T` or the normalised remote error.
///
/// The backend reports some failures as 200 with `success:false`, so the
/// body is inspected regardless of status.
async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let err = ClientError::from_status(status.as_u16(), &body);
        tracing::warn!("Request failed ({}): {}", status, err);
        return Err(err);
    }

    let value: serde_json::Value = serde_json::from_str(&body)?;
    if value.get("success").and_then(|s| s.as_bool()) == Some(false) {
        let err = ClientError::from_status(status.as_u16(), &body);
        tracing::warn!("Backend reported failure: {}", err);
        return Err(err);
    }

    Ok(serde_json::from_value(value)?)
}
