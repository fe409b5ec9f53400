//! Command handlers for the `fm` binary.
//!
//! - `operation`: the five operations with live progress
//! - `browse`: interactive directory picker
//! - `output`: terminal formatting

mod browse;
mod operation;
mod output;

use std::sync::Arc;

use anyhow::Result;
use fmclient::forms::{DuplicateForm, ExtractForm, OrganizeForm, PhotoOrganizeForm, RenameForm, TransferFields};
use fmclient::models::ProgressStatus;
use fmclient::{ApiClient, BrowseApi, ClientConfig, ProgressChannel, ProgressTracker};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::Commands;

pub enum Outcome {
    Success,
    Failed,
}

pub struct Context {
    pub api: Arc<ApiClient>,
    /// One channel for the whole process
    pub channel: ProgressChannel,
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl Context {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let channel = ProgressChannel::new(config.progress_url.as_str());
        let api = Arc::new(ApiClient::new(config)?);
        Ok(Self {
            api,
            channel,
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        })
    }

    /// Next line of stdin, `None` at end of input.
    pub async fn read_line(&self) -> Result<Option<String>> {
        Ok(self.input.lock().await.next_line().await?)
    }
}

fn transfer(source: Option<String>, destination: Option<String>) -> TransferFields {
    TransferFields::new(source.unwrap_or_default(), destination.unwrap_or_default())
}

pub async fn dispatch(ctx: &Context, command: Commands) -> Result<Outcome> {
    match command {
        Commands::Rename { source, recursive, progress } => {
            let form = RenameForm {
                source_directory: source.unwrap_or_default(),
                include_sub_directories: recursive,
            };
            operation::run_operation(ctx, form, !progress.no_progress).await
        }
        Commands::Organize { source, destination, progress } => {
            let form = OrganizeForm(transfer(source, destination));
            operation::run_operation(ctx, form, !progress.no_progress).await
        }
        Commands::Extract { source, destination, progress } => {
            let form = ExtractForm(transfer(source, destination));
            operation::run_operation(ctx, form, !progress.no_progress).await
        }
        Commands::PhotoOrganize { source, destination, progress } => {
            let form = PhotoOrganizeForm(transfer(source, destination));
            operation::run_operation(ctx, form, !progress.no_progress).await
        }
        Commands::FindDuplicates { directory, progress } => {
            let form = DuplicateForm {
                directory: directory.unwrap_or_default(),
            };
            operation::run_operation(ctx, form, !progress.no_progress).await
        }
        Commands::Home => {
            println!("{}", ctx.api.home().await?);
            Ok(Outcome::Success)
        }
        Commands::Roots => {
            output::print_entries(&ctx.api.roots().await?);
            Ok(Outcome::Success)
        }
        Commands::Ls { path, files } => {
            let path = match path {
                Some(path) => path,
                None => ctx.api.home().await?,
            };
            let listing = ctx.api.list_directory(&path, files).await?;
            println!("{}", listing.current_path);
            output::print_entries(&listing.entries);
            Ok(Outcome::Success)
        }
        Commands::Validate { path } => {
            let validation = ctx.api.validate_path(&path).await?;
            println!("exists:       {}", validation.exists);
            println!("directory:    {}", validation.is_directory);
            if let Some(readable) = validation.can_read {
                println!("readable:     {readable}");
            }
            if let Some(writable) = validation.can_write {
                println!("writable:     {writable}");
            }
            if let Some(absolute) = &validation.absolute_path {
                println!("absolute:     {absolute}");
            }
            Ok(if validation.is_valid_directory() { Outcome::Success } else { Outcome::Failed })
        }
        Commands::Browse { initial, files } => {
            match browse::pick(ctx, "Select a directory", initial.as_deref(), files).await? {
                Some(path) => {
                    println!("{path}");
                    Ok(Outcome::Success)
                }
                None => Ok(Outcome::Failed),
            }
        }
        Commands::Watch { operation_id } => watch(ctx, &operation_id).await,
    }
}

async fn watch(ctx: &Context, operation_id: &str) -> Result<Outcome> {
    let mut tracker = ProgressTracker::new(ctx.channel.clone());
    let pb = output::new_progress_bar();
    let bar = pb.clone();
    tracker
        .subscribe_with(operation_id, move |s| output::render_progress(&bar, s))
        .await?;

    let finished = tokio::select! {
        state = tracker.wait_finished() => Some(state),
        _ = tokio::signal::ctrl_c() => None,
    };
    tracker.unsubscribe();

    match finished {
        Some(state) if state.status == Some(ProgressStatus::Completed) => {
            println!("✓ {}", state.message.unwrap_or_else(|| "Completed".to_string()));
            Ok(Outcome::Success)
        }
        Some(state) if state.status == Some(ProgressStatus::Error) => {
            eprintln!("✗ {}", state.error.unwrap_or_default());
            Ok(Outcome::Failed)
        }
        Some(_) => {
            pb.abandon_with_message("progress channel closed");
            Ok(Outcome::Failed)
        }
        None => {
            pb.abandon_with_message("stopped watching");
            Ok(Outcome::Failed)
        }
    }
}
