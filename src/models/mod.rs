//! Data transfer objects (DTOs) exchanged with the file-manager backend.
//!
//! All wire types use the backend's camelCase field names.
//! - `filesystem`: FileSystemEntry, DirectoryListing, PathValidation for the picker
//! - `operations`: request/response pairs for the five file operations
//! - `progress`: ProgressUpdate pushed over the progress channel, ProgressState

pub mod filesystem;
pub mod operations;
pub mod progress;

pub use filesystem::*;
pub use operations::*;
pub use progress::*;
