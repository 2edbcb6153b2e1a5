use tokio::task_local;
use tracing::Instrument;
use tracing::error;
use tracing::info_span;
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use crate::exception::CoreRsResult;
use crate::exception::Exception;
use crate::exception::Severity;

task_local! {
    static CURRENT_ACTION_ID: String
}

pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(false) // generally cloud log console doesn't support color
                .with_line_number(true)
                .with_thread_ids(true)
                .with_filter(LevelFilter::INFO),
        )
        .init();
}

/// Runs `task` inside an `action` span with a fresh action id,
/// the returned exception is logged at its severity instead of being propagated.
pub async fn start_action<T>(action: &str, ref_id: Option<String>, task: T)
where
    T: Future<Output = CoreRsResult<()>>,
{
    let action_id = random_id();
    let action_span = info_span!("action", action, action_id, ref_id);
    CURRENT_ACTION_ID
        .scope(
            action_id,
            async {
                if let Err(e) = task.await {
                    log_exception(&e);
                }
            }
            .instrument(action_span),
        )
        .await;
}

fn log_exception(e: &Exception) {
    let message = &e.message;
    match e.severity {
        Severity::Warn => warn!(backtrace = %e, "{message}"),
        Severity::Error => error!(backtrace = %e, "{message}"),
    }
}

pub fn current_action_id() -> Option<String> {
    CURRENT_ACTION_ID.try_with(Clone::clone).ok()
}

fn random_id() -> String {
    Uuid::now_v7().simple().to_string()
}
