//! Filesystem browsing calls.
//!
//! - GET /filesystem/home → `{path}`
//! - GET /filesystem/roots → `{roots: FileSystemEntry[]}`
//! - GET /filesystem/list?path&includeFiles → `{currentPath, entries}`
//! - GET /filesystem/validate?path → `{exists, isDirectory, ...}`
//!
//! Used by: DirectoryNavigator, and the `home`/`roots`/`ls`/`validate` commands

use async_trait::async_trait;

use super::{ApiClient, BrowseApi};
use crate::error::Result;
use crate::models::{DirectoryListing, FileSystemEntry, HomeResponse, PathValidation, RootsResponse};

#[async_trait]
impl BrowseApi for ApiClient {
    async fn home(&self) -> Result<String> {
        let home: HomeResponse = self.get_json("/filesystem/home", &[]).await?;
        Ok(home.path)
    }

    async fn roots(&self) -> Result<Vec<FileSystemEntry>> {
        let roots: RootsResponse = self.get_json("/filesystem/roots", &[]).await?;
        Ok(roots.roots)
    }

    async fn list_directory(&self, path: &str, include_files: bool) -> Result<DirectoryListing> {
        let include = if include_files { "true" } else { "false" };
        self.get_json("/filesystem/list", &[("path", path), ("includeFiles", include)])
            .await
    }

    async fn validate_path(&self, path: &str) -> Result<PathValidation> {
        self.get_json("/filesystem/validate", &[("path", path)]).await
    }
}
