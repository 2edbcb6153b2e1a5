use std::sync::Arc;

use framework::exception::CoreRsResult;
use framework::schedule::JobContext;
use futures::StreamExt;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::AppState;
use crate::executor::delete_file;
use crate::extractor::extract_download_events;
use crate::file_share::FileShare;
use crate::log_store::LogStore;
use crate::resolver::resolve;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub blobs: u64,
    pub failed_blobs: u64,
    pub events: u64,
    pub skipped: u64,
    pub deleted: u64,
    pub absent: u64,
    pub failed: u64,
}

pub async fn purge_downloaded_files_job(state: Arc<AppState>, _context: JobContext) -> CoreRsResult<()> {
    run_pass(&state.log_store, &state.file_share_name, state.file_share.as_ref()).await?;
    Ok(())
}

/// Scans every log blob and deletes each file it reports as downloaded.
/// Only a failure to enumerate the store aborts the pass.
pub async fn run_pass(log_store: &LogStore, share_name: &str, share: &dyn FileShare) -> CoreRsResult<PassSummary> {
    let mut summary = PassSummary::default();
    let mut blobs = log_store.blobs();
    while let Some(blob) = blobs.next().await {
        let blob = blob?;
        summary.blobs += 1;
        let log_text = match log_store.read_text(&blob).await {
            Ok(log_text) => log_text,
            Err(e) => {
                summary.failed_blobs += 1;
                error!(blob = %blob, backtrace = %e, "failed to read log blob, error={}", e.message);
                continue;
            }
        };

        for event in extract_download_events(&log_text) {
            summary.events += 1;
            let resolved = match resolve(&event.resource_uri, share_name) {
                Ok(resolved) => resolved,
                Err(e) => {
                    summary.skipped += 1;
                    warn!(uri = event.resource_uri, "skip download event, error={}", e.message);
                    continue;
                }
            };
            if resolved.file_name.is_empty() {
                summary.skipped += 1;
                warn!(uri = event.resource_uri, "no valid file information found in the log entry");
                continue;
            }

            let folder_path = resolved.folder_path.as_deref();
            info!(
                folder = folder_path.unwrap_or("<unknown>"),
                file = resolved.file_name,
                "file was downloaded, deleting it from the file share"
            );
            let outcome = delete_file(folder_path, &resolved.file_name, share).await;
            if !outcome.succeeded {
                summary.failed += 1;
            } else if outcome.existed {
                summary.deleted += 1;
            } else {
                summary.absent += 1;
            }
        }
    }

    info!(
        blobs = summary.blobs,
        failed_blobs = summary.failed_blobs,
        events = summary.events,
        skipped = summary.skipped,
        deleted = summary.deleted,
        absent = summary.absent,
        failed = summary.failed,
        "stats"
    );
    Ok(summary)
}
