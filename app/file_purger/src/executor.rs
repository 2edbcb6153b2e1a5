use tracing::error;
use tracing::info;

use crate::file_share::FileShare;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub folder_path: String,
    pub file_name: String,
    pub succeeded: bool,
    /// false when the file was already absent, which still counts as success
    pub existed: bool,
    pub error_message: Option<String>,
}

/// Deletes `file_name` under `folder_path` (share root when `None` or empty) if it exists.
/// Failures are logged and reported in the outcome, never propagated.
pub async fn delete_file(folder_path: Option<&str>, file_name: &str, share: &dyn FileShare) -> DeletionOutcome {
    let folder_path = folder_path.unwrap_or_default();
    let file = share.directory(folder_path).file(file_name);
    let result = share.delete_if_exists(&file).await;

    let outcome = DeletionOutcome {
        folder_path: folder_path.to_owned(),
        file_name: file_name.to_owned(),
        succeeded: result.is_ok(),
        existed: matches!(result, Ok(true)),
        // message only, the source chain stays out of the outcome
        error_message: result.err().map(|e| e.message),
    };
    log_outcome(&outcome);
    outcome
}

fn log_outcome(outcome: &DeletionOutcome) {
    let folder = outcome.folder_path.as_str();
    let file = outcome.file_name.as_str();
    match outcome.error_message {
        Some(ref message) => error!(folder, file, "failed to delete file, error={message}"),
        None if outcome.existed => info!(folder, file, "file deleted from the file share"),
        None => info!(folder, file, "file already absent from the file share"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::delete_file;
    use crate::file_share::fake::RecordingFileShare;

    #[tokio::test]
    async fn delete_existing_file() {
        let share = RecordingFileShare::with_files(&["dirA/dirB/report final.txt", "dirA/keep.txt"]);

        let outcome = delete_file(Some("dirA/dirB"), "report final.txt", &share).await;

        assert!(outcome.succeeded);
        assert!(outcome.existed);
        assert_eq!(outcome.error_message, None);
        assert!(!share.contains("dirA/dirB/report final.txt"));
        assert!(share.contains("dirA/keep.txt"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let share = RecordingFileShare::with_files(&["a/x.txt"]);

        let first = delete_file(Some("a"), "x.txt", &share).await;
        let second = delete_file(Some("a"), "x.txt", &share).await;

        assert!(first.succeeded && first.existed);
        assert!(second.succeeded);
        assert!(!second.existed);
        assert_eq!(share.attempts(), vec!["a/x.txt", "a/x.txt"]);
    }

    #[tokio::test]
    async fn root_folder() {
        let share = RecordingFileShare::with_files(&["x.txt"]);

        let unknown_folder = delete_file(None, "x.txt", &share).await;
        let root_folder = delete_file(Some(""), "x.txt", &share).await;

        assert!(unknown_folder.existed);
        assert!(root_folder.succeeded);
        assert_eq!(share.attempts(), vec!["x.txt", "x.txt"]);
    }

    #[tokio::test]
    async fn failure_is_reported_not_raised() {
        let share = RecordingFileShare {
            failing: HashSet::from(["a/x.txt".to_owned()]),
            ..RecordingFileShare::with_files(&["a/x.txt"])
        };

        let outcome = delete_file(Some("a"), "x.txt", &share).await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.error_message.as_deref(), Some("access denied, path=a/x.txt"));
        assert!(share.contains("a/x.txt"));
    }
}
