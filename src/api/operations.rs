//! File operation calls.
//!
//! - POST /operations/rename { sourceDirectory, includeSubDirectories }
//! - POST /operations/organize { sourceDirectory, destinationDirectory }
//! - POST /operations/extract { sourceDirectory, destinationDirectory }
//! - POST /operations/photo-organize { sourceDirectory, destinationDirectory }
//! - POST /operations/find-duplicates { directory }
//!
//! All five also send `operationId` when the caller tracks progress.

use async_trait::async_trait;

use super::{ApiClient, OperationsApi};
use crate::error::Result;
use crate::models::{
    DuplicateRequest, DuplicateResponse, ExtractResponse, OperationKind, OrganizeResponse,
    PhotoOrganizeResponse, RenameRequest, RenameResponse, TransferRequest,
};

#[async_trait]
impl OperationsApi for ApiClient {
    async fn rename(&self, request: &RenameRequest) -> Result<RenameResponse> {
        tracing::info!("Rename requested for {}", request.source_directory);
        self.post_json(OperationKind::Rename.endpoint(), request).await
    }

    async fn organize(&self, request: &TransferRequest) -> Result<OrganizeResponse> {
        tracing::info!(
            "Organize requested: {} -> {}",
            request.source_directory,
            request.destination_directory
        );
        self.post_json(OperationKind::Organize.endpoint(), request).await
    }

    async fn extract(&self, request: &TransferRequest) -> Result<ExtractResponse> {
        tracing::info!(
            "Extract requested: {} -> {}",
            request.source_directory,
            request.destination_directory
        );
        self.post_json(OperationKind::Extract.endpoint(), request).await
    }

    async fn photo_organize(&self, request: &TransferRequest) -> Result<PhotoOrganizeResponse> {
        tracing::info!(
            "Photo organization requested: {} -> {}",
            request.source_directory,
            request.destination_directory
        );
        self.post_json(OperationKind::PhotoOrganize.endpoint(), request).await
    }

    async fn find_duplicates(&self, request: &DuplicateRequest) -> Result<DuplicateResponse> {
        tracing::info!("Duplicate finder requested for {}", request.directory);
        self.post_json(OperationKind::FindDuplicates.endpoint(), request).await
    }
}
