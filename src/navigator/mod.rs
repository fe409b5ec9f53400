//! Directory Navigator - browse the server's filesystem and pick one directory.
//!
//! - `state`: NavigatorState, PathValidity tri-state, EntryRow view model
//! - `breadcrumb`: path prefix crumbs for the header
//!
//! The navigator owns its state and publishes it on a watch channel. It
//! reaches the backend only through an injected `BrowseApi`.
//!
//! Overlapping navigations are not cancelled: each response is applied when
//! it arrives, so the last response to land wins. Front ends avoid the race
//! by not issuing navigations while `loading` is set.

pub mod breadcrumb;
pub mod state;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tokio::sync::watch;

use crate::api::BrowseApi;
use crate::error::Result;
use crate::models::FileSystemEntry;

pub use breadcrumb::{Breadcrumb, BreadcrumbTarget, breadcrumbs};
pub use state::{EntryIcon, EntryRow, NavigatorState, PathValidity};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigatorError {
    #[error("The roots view is not a directory; open a drive or folder first")]
    RootsView,

    #[error("Still loading")]
    Busy,
}

pub struct DirectoryNavigator {
    api: Arc<dyn BrowseApi>,
    state: watch::Sender<NavigatorState>,
    include_files: bool,
    in_flight: AtomicUsize,
}

impl DirectoryNavigator {
    pub fn new(api: Arc<dyn BrowseApi>) -> Self {
        let (state, _) = watch::channel(NavigatorState::default());
        Self {
            api,
            state,
            include_files: false,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// List files as well as directories.
    pub fn with_files(mut self, include_files: bool) -> Self {
        self.include_files = include_files;
        self
    }

    pub fn watch(&self) -> watch::Receiver<NavigatorState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> NavigatorState {
        self.state.borrow().clone()
    }

    /// Reset and show `initial_path`, or the home directory.
    pub async fn open(&self, initial_path: Option<&str>) -> Result<()> {
        self.state.send_replace(NavigatorState::default());
        match initial_path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => self.navigate(path).await,
            None => self.navigate_home().await,
        }
    }

    pub async fn navigate_home(&self) -> Result<()> {
        self.begin_request();
        let home = self.api.home().await;
        self.end_request();
        match home {
            Ok(home) => self.navigate(&home).await,
            Err(e) => {
                tracing::warn!("Could not resolve home directory: {}", e);
                let message = format!("Could not load home directory: {}", e.message());
                self.state.send_modify(|s| s.error = Some(message));
                Err(e)
            }
        }
    }

    /// List `path`. On failure the previous listing stays on screen.
    pub async fn navigate(&self, path: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", path);
        self.begin_request();
        let listing = self.api.list_directory(path, self.include_files).await;
        self.end_request();

        match listing {
            Ok(listing) => {
                if !listing.parent_entry_is_well_placed() {
                    tracing::warn!("Listing for {} has a misplaced parent entry", path);
                }
                self.state.send_modify(|s| {
                    s.current_path = path.to_string();
                    s.entries = listing.entries;
                    s.error = None;
                    s.manual_path_input = path.to_string();
                    s.manual_path_validity = PathValidity::Valid;
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to list {}: {}", path, e);
                let message = e.message();
                self.state.send_modify(|s| s.error = Some(message));
                Err(e)
            }
        }
    }

    /// Show the platform roots. The roots view has no parent and cannot be
    /// selected.
    pub async fn load_roots(&self) -> Result<()> {
        self.begin_request();
        let roots = self.api.roots().await;
        self.end_request();

        match roots {
            Ok(roots) => {
                self.state.send_modify(|s| {
                    s.current_path.clear();
                    s.entries = roots;
                    s.error = None;
                    s.manual_path_input.clear();
                    s.manual_path_validity = PathValidity::Unknown;
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load roots: {}", e);
                let message = e.message();
                self.state.send_modify(|s| s.error = Some(message));
                Err(e)
            }
        }
    }

    /// Go where a breadcrumb points.
    pub async fn follow(&self, crumb: &Breadcrumb) -> Result<()> {
        match &crumb.target {
            BreadcrumbTarget::Home => self.navigate_home().await,
            BreadcrumbTarget::Path(path) => self.navigate(path).await,
        }
    }

    /// Open an entry row. Files and unreadable entries are ignored; returns
    /// whether a navigation happened.
    pub async fn activate(&self, entry: &FileSystemEntry) -> Result<bool> {
        if !entry.is_navigable() {
            return Ok(false);
        }
        self.navigate(&entry.path).await.map(|_| true)
    }

    /// Update the manual input now, then check it against the backend.
    ///
    /// A validation result is dropped if the input changed meanwhile. A failed
    /// validation call counts as invalid rather than as an error.
    pub async fn set_manual_path(&self, text: &str) {
        self.state.send_modify(|s| {
            s.manual_path_input = text.to_string();
            s.manual_path_validity = PathValidity::Unknown;
        });

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        let validity = match self.api.validate_path(trimmed).await {
            Ok(v) if v.is_valid_directory() => PathValidity::Valid,
            Ok(_) => PathValidity::Invalid,
            Err(e) => {
                tracing::debug!("Validation of {} failed: {}", trimmed, e);
                PathValidity::Invalid
            }
        };

        self.state.send_if_modified(|s| {
            if s.manual_path_input != text {
                return false;
            }
            s.manual_path_validity = validity;
            true
        });
    }

    /// Navigate to the manual input if it was validated. Returns whether a
    /// navigation happened.
    pub async fn submit_manual_path(&self) -> Result<bool> {
        let target = {
            let state = self.state.borrow();
            if !state.can_submit_manual_path() {
                return Ok(false);
            }
            state.manual_path_input.trim().to_string()
        };
        self.navigate(&target).await.map(|_| true)
    }

    /// The directory to hand to the caller's acceptance callback.
    pub fn select(&self) -> std::result::Result<String, NavigatorError> {
        let state = self.state.borrow();
        if state.is_roots_view() {
            return Err(NavigatorError::RootsView);
        }
        if state.loading {
            return Err(NavigatorError::Busy);
        }
        Ok(state.current_path.clone())
    }

    fn begin_request(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    fn end_request(&self) {
        let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        self.state.send_modify(|s| s.loading = remaining > 0);
    }
}
