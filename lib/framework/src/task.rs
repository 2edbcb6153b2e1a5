use std::future::Future;
use std::sync::LazyLock;

use tokio_util::task::TaskTracker;
use tracing::debug;
use tracing::info;

use crate::exception::CoreRsResult;
use crate::log;
use crate::log::current_action_id;

static TASK_TRACKER: LazyLock<TaskTracker> = LazyLock::new(TaskTracker::new);

/// Spawns `task` as its own action, linked to the current action through `ref_id`.
pub fn spawn_action<T>(name: &'static str, task: T)
where
    T: Future<Output = CoreRsResult<()>> + Send + 'static,
{
    let ref_id = current_action_id();
    TASK_TRACKER.spawn(async move {
        log::start_action("task", ref_id, async {
            debug!(task = name, "context");
            task.await
        })
        .await;
    });
}

pub async fn shutdown() {
    info!(tasks = TASK_TRACKER.len(), "waiting for tasks to finish");
    TASK_TRACKER.close();
    TASK_TRACKER.wait().await;
    info!("tasks finished");
}
