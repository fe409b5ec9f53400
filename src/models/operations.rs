//! Operation DTOs.
//!
//! - `RenameRequest`, `TransferRequest`, `DuplicateRequest`: request bodies
//! - `RenameResponse` .. `DuplicateResponse`: success bodies, one count field each
//! - `OperationKind`: the five operations and their endpoint paths
//!
//! Every request carries an optional `operationId` so the backend can publish
//! progress on `/topic/progress/{operationId}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Rename,
    Organize,
    Extract,
    PhotoOrganize,
    FindDuplicates,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Rename,
        OperationKind::Organize,
        OperationKind::Extract,
        OperationKind::PhotoOrganize,
        OperationKind::FindDuplicates,
    ];

    /// Path under the API base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            OperationKind::Rename => "/operations/rename",
            OperationKind::Organize => "/operations/organize",
            OperationKind::Extract => "/operations/extract",
            OperationKind::PhotoOrganize => "/operations/photo-organize",
            OperationKind::FindDuplicates => "/operations/find-duplicates",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            OperationKind::Rename => "Rename files",
            OperationKind::Organize => "Organize files",
            OperationKind::Extract => "Extract files",
            OperationKind::PhotoOrganize => "Organize photos",
            OperationKind::FindDuplicates => "Find duplicates",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub source_directory: String,
    pub include_sub_directories: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

/// Body shared by organize, extract and photo-organize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub source_directory: String,
    pub destination_directory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateRequest {
    pub directory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub files_renamed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub files_organized: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub files_extracted: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoOrganizeResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub photos_organized: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub duplicates_removed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

/// Common view over the five response bodies, used for result banners.
pub trait OperationOutcome {
    fn success(&self) -> bool;
    fn message(&self) -> &str;
    fn count(&self) -> u64;
    fn count_label(&self) -> &'static str;
}

impl OperationOutcome for RenameResponse {
    fn success(&self) -> bool {
        self.success
    }
    fn message(&self) -> &str {
        &self.message
    }
    fn count(&self) -> u64 {
        self.files_renamed
    }
    fn count_label(&self) -> &'static str {
        "files renamed"
    }
}

impl OperationOutcome for OrganizeResponse {
    fn success(&self) -> bool {
        self.success
    }
    fn message(&self) -> &str {
        &self.message
    }
    fn count(&self) -> u64 {
        self.files_organized
    }
    fn count_label(&self) -> &'static str {
        "files organized"
    }
}

impl OperationOutcome for ExtractResponse {
    fn success(&self) -> bool {
        self.success
    }
    fn message(&self) -> &str {
        &self.message
    }
    fn count(&self) -> u64 {
        self.files_extracted
    }
    fn count_label(&self) -> &'static str {
        "files extracted"
    }
}

impl OperationOutcome for PhotoOrganizeResponse {
    fn success(&self) -> bool {
        self.success
    }
    fn message(&self) -> &str {
        &self.message
    }
    fn count(&self) -> u64 {
        self.photos_organized
    }
    fn count_label(&self) -> &'static str {
        "photos organized"
    }
}

impl OperationOutcome for DuplicateResponse {
    fn success(&self) -> bool {
        self.success
    }
    fn message(&self) -> &str {
        &self.message
    }
    fn count(&self) -> u64 {
        self.duplicates_removed
    }
    fn count_label(&self) -> &'static str {
        "duplicates removed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_names() {
        let req = TransferRequest {
            source_directory: "/a".into(),
            destination_directory: "/b".into(),
            operation_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["sourceDirectory"], "/a");
        assert_eq!(json["destinationDirectory"], "/b");
        assert!(json.get("operationId").is_none());
    }

    #[test]
    fn test_duplicate_response_reads_count() {
        let json = r#"{"success":true,"message":"Busca por duplicados concluída","duplicatesRemoved":3,"result":{"files":[]}}"#;
        let resp: DuplicateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.count(), 3);
        assert!(resp.result.is_some());
    }

    #[test]
    fn test_endpoints_are_distinct() {
        let mut paths: Vec<_> = OperationKind::ALL.iter().map(|k| k.endpoint()).collect();
        paths.dedup();
        assert_eq!(paths.len(), 5);
    }
}
