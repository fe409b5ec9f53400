//! Run one operation form end to end: fill, validate, follow, execute, report.

use std::sync::Arc;

use anyhow::Result;
use fmclient::OperationsApi;
use fmclient::forms::OperationForm;
use fmclient::models::OperationOutcome;
use fmclient::progress::{self, ProgressTracker};

use super::output::{new_progress_bar, print_outcome, render_progress};
use super::{Context, Outcome, browse};

pub async fn run_operation<F: OperationForm>(ctx: &Context, mut form: F, show_progress: bool) -> Result<Outcome> {
    let title = form.kind().title();

    for field in form.missing_fields() {
        let prompt = format!("{title}: choose the {}", field.label().to_lowercase());
        match browse::pick(ctx, &prompt, None, false).await? {
            Some(path) => form.set_value(field, path),
            None => {
                println!("Cancelled");
                return Ok(Outcome::Failed);
            }
        }
    }

    let operation_id = progress::new_operation_id();
    let request = match form.to_request(Some(operation_id.clone())) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("✗ {}", e.message());
            return Ok(Outcome::Failed);
        }
    };

    // Subscribe before the request so no early update is missed
    let mut tracker = ProgressTracker::new(ctx.channel.clone());
    let bar = show_progress.then(new_progress_bar);
    if let Some(pb) = &bar {
        let pb = pb.clone();
        pb.set_message(format!("{title}..."));
        if let Err(e) = tracker.subscribe_with(&operation_id, move |s| render_progress(&pb, s)).await {
            eprintln!(
                "  Warning: live progress unavailable from {}: {}",
                ctx.channel.url(),
                e.message()
            );
        }
    }

    tracing::debug!("Starting {} as {}", title, operation_id);
    let api: Arc<dyn OperationsApi> = ctx.api.clone();
    let controller = F::controller(api);
    let response = controller.execute(request).await;
    tracker.unsubscribe();
    if let Some(pb) = &bar {
        if !pb.is_finished() {
            pb.finish_and_clear();
        }
    }

    match response {
        Some(response) => {
            print_outcome(title, &response);
            Ok(if response.success() { Outcome::Success } else { Outcome::Failed })
        }
        None => {
            let error = controller.state().error.unwrap_or_default();
            eprintln!("✗ {title} failed: {error}");
            Ok(Outcome::Failed)
        }
    }
}
