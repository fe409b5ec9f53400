//! Operation Forms - the five operations as path inputs plus a submit.
//!
//! Each form holds the raw text of its path fields, validates them inline
//! (before any network call) and builds its typed request. `controller`
//! binds a form type to its endpoint through an `OperationController`, so
//! every form shares the same loading/result/error lifecycle.
//!
//! Field rules are the backend's request validation, `^[^<>:"|?*\x00-\x1F]+$`:
//! required, and none of `< > : " | ? *` or U+0000..U+001F. The backend
//! rejects `:` anywhere, so a Windows drive prefix like `C:` fails here too.

use std::sync::Arc;

use crate::api::OperationsApi;
use crate::controller::OperationController;
use crate::error::{ClientError, Result};
use crate::models::{
    DuplicateRequest, DuplicateResponse, ExtractResponse, OperationKind, OperationOutcome,
    OrganizeResponse, PhotoOrganizeResponse, RenameRequest, RenameResponse, TransferRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathField {
    Source,
    Destination,
    Directory,
}

impl PathField {
    /// Name used by the backend in request bodies and field errors.
    pub fn wire_name(self) -> &'static str {
        match self {
            PathField::Source => "sourceDirectory",
            PathField::Destination => "destinationDirectory",
            PathField::Directory => "directory",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PathField::Source => "Source directory",
            PathField::Destination => "Destination directory",
            PathField::Directory => "Directory",
        }
    }
}

/// Check one path field and return it trimmed.
pub fn validate_path_field(field: PathField, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::validation(
            field.wire_name(),
            format!("{} cannot be empty", field.label()),
        ));
    }
    let invalid = value
        .chars()
        .any(|c| c <= '\u{1f}' || matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*'));
    if invalid {
        return Err(ClientError::validation(
            field.wire_name(),
            format!("{} contains invalid characters", field.label()),
        ));
    }
    Ok(value.to_string())
}

pub trait OperationForm {
    type Request: Send + 'static;
    type Response: OperationOutcome + Clone + Send + Sync + 'static;

    fn kind(&self) -> OperationKind;

    /// Path inputs in display order.
    fn fields(&self) -> Vec<PathField>;

    fn value(&self, field: PathField) -> &str;

    fn set_value(&mut self, field: PathField, value: String);

    /// Validate and build the request body.
    fn to_request(&self, operation_id: Option<String>) -> Result<Self::Request>;

    fn controller(api: Arc<dyn OperationsApi>) -> OperationController<Self::Request, Self::Response>;

    /// Fields still empty, e.g. to fill through the directory picker.
    fn missing_fields(&self) -> Vec<PathField> {
        self.fields()
            .into_iter()
            .filter(|f| self.value(*f).trim().is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameForm {
    pub source_directory: String,
    pub include_sub_directories: bool,
}

impl OperationForm for RenameForm {
    type Request = RenameRequest;
    type Response = RenameResponse;

    fn kind(&self) -> OperationKind {
        OperationKind::Rename
    }

    fn fields(&self) -> Vec<PathField> {
        vec![PathField::Source]
    }

    fn value(&self, field: PathField) -> &str {
        match field {
            PathField::Source => &self.source_directory,
            _ => "",
        }
    }

    fn set_value(&mut self, field: PathField, value: String) {
        if field == PathField::Source {
            self.source_directory = value;
        }
    }

    fn to_request(&self, operation_id: Option<String>) -> Result<RenameRequest> {
        Ok(RenameRequest {
            source_directory: validate_path_field(PathField::Source, &self.source_directory)?,
            include_sub_directories: self.include_sub_directories,
            operation_id,
        })
    }

    fn controller(api: Arc<dyn OperationsApi>) -> OperationController<RenameRequest, RenameResponse> {
        OperationController::new(move |req: RenameRequest| {
            let api = api.clone();
            async move { api.rename(&req).await }
        })
    }
}

/// Source and destination, shared by organize, extract and photo-organize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferFields {
    pub source_directory: String,
    pub destination_directory: String,
}

impl TransferFields {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source_directory: source.into(),
            destination_directory: destination.into(),
        }
    }

    fn value(&self, field: PathField) -> &str {
        match field {
            PathField::Source => &self.source_directory,
            PathField::Destination => &self.destination_directory,
            PathField::Directory => "",
        }
    }

    fn set_value(&mut self, field: PathField, value: String) {
        match field {
            PathField::Source => self.source_directory = value,
            PathField::Destination => self.destination_directory = value,
            PathField::Directory => {}
        }
    }

    fn to_request(&self, operation_id: Option<String>) -> Result<TransferRequest> {
        Ok(TransferRequest {
            source_directory: validate_path_field(PathField::Source, &self.source_directory)?,
            destination_directory: validate_path_field(PathField::Destination, &self.destination_directory)?,
            operation_id,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizeForm(pub TransferFields);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractForm(pub TransferFields);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoOrganizeForm(pub TransferFields);

impl OperationForm for OrganizeForm {
    type Request = TransferRequest;
    type Response = OrganizeResponse;

    fn kind(&self) -> OperationKind {
        OperationKind::Organize
    }

    fn fields(&self) -> Vec<PathField> {
        vec![PathField::Source, PathField::Destination]
    }

    fn value(&self, field: PathField) -> &str {
        self.0.value(field)
    }

    fn set_value(&mut self, field: PathField, value: String) {
        self.0.set_value(field, value)
    }

    fn to_request(&self, operation_id: Option<String>) -> Result<TransferRequest> {
        self.0.to_request(operation_id)
    }

    fn controller(api: Arc<dyn OperationsApi>) -> OperationController<TransferRequest, OrganizeResponse> {
        OperationController::new(move |req: TransferRequest| {
            let api = api.clone();
            async move { api.organize(&req).await }
        })
    }
}

impl OperationForm for ExtractForm {
    type Request = TransferRequest;
    type Response = ExtractResponse;

    fn kind(&self) -> OperationKind {
        OperationKind::Extract
    }

    fn fields(&self) -> Vec<PathField> {
        vec![PathField::Source, PathField::Destination]
    }

    fn value(&self, field: PathField) -> &str {
        self.0.value(field)
    }

    fn set_value(&mut self, field: PathField, value: String) {
        self.0.set_value(field, value)
    }

    fn to_request(&self, operation_id: Option<String>) -> Result<TransferRequest> {
        self.0.to_request(operation_id)
    }

    fn controller(api: Arc<dyn OperationsApi>) -> OperationController<TransferRequest, ExtractResponse> {
        OperationController::new(move |req: TransferRequest| {
            let api = api.clone();
            async move { api.extract(&req).await }
        })
    }
}

impl OperationForm for PhotoOrganizeForm {
    type Request = TransferRequest;
    type Response = PhotoOrganizeResponse;

    fn kind(&self) -> OperationKind {
        OperationKind::PhotoOrganize
    }

    fn fields(&self) -> Vec<PathField> {
        vec![PathField::Source, PathField::Destination]
    }

    fn value(&self, field: PathField) -> &str {
        self.0.value(field)
    }

    fn set_value(&mut self, field: PathField, value: String) {
        self.0.set_value(field, value)
    }

    fn to_request(&self, operation_id: Option<String>) -> Result<TransferRequest> {
        self.0.to_request(operation_id)
    }

    fn controller(api: Arc<dyn OperationsApi>) -> OperationController<TransferRequest, PhotoOrganizeResponse> {
        OperationController::new(move |req: TransferRequest| {
            let api = api.clone();
            async move { api.photo_organize(&req).await }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateForm {
    pub directory: String,
}

impl OperationForm for DuplicateForm {
    type Request = DuplicateRequest;
    type Response = DuplicateResponse;

    fn kind(&self) -> OperationKind {
        OperationKind::FindDuplicates
    }

    fn fields(&self) -> Vec<PathField> {
        vec![PathField::Directory]
    }

    fn value(&self, field: PathField) -> &str {
        match field {
            PathField::Directory => &self.directory,
            _ => "",
        }
    }

    fn set_value(&mut self, field: PathField, value: String) {
        if field == PathField::Directory {
            self.directory = value;
        }
    }

    fn to_request(&self, operation_id: Option<String>) -> Result<DuplicateRequest> {
        Ok(DuplicateRequest {
            directory: validate_path_field(PathField::Directory, &self.directory)?,
            operation_id,
        })
    }

    fn controller(api: Arc<dyn OperationsApi>) -> OperationController<DuplicateRequest, DuplicateResponse> {
        OperationController::new(move |req: DuplicateRequest| {
            let api = api.clone();
            async move { api.find_duplicates(&req).await }
        })
    }
}
