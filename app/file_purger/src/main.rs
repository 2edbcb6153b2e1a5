use std::env;
use std::sync::Arc;

use chrono::Offset;
use chrono::Utc;
use framework::asset::asset_path;
use framework::exception;
use framework::exception::CoreRsResult;
use framework::json;
use framework::log;
use framework::schedule::JobContext;
use framework::schedule::Scheduler;
use framework::shutdown::Shutdown;
use framework::task;
use serde::Deserialize;

use crate::file_share::AzureFileShare;
use crate::file_share::FileShare;
use crate::job::purge_downloaded_files_job;
use crate::log_store::LogStore;

mod executor;
mod extractor;
mod file_share;
mod job;
mod log_store;
mod resolver;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase", default)]
struct AppConfig {
    timer_schedule: String,
    run_on_startup: bool,
    log_storage_account_name: String,
    log_storage_account_key: String,
    log_container_name: String,
    file_share_storage_account_name: String,
    file_share_storage_account_key: String,
    file_share_name: String,
}

impl AppConfig {
    // app settings in the environment win over conf.json, every setting but RunOnStartup is required
    fn apply_env(&mut self) -> CoreRsResult<()> {
        let settings = [
            ("TimerSchedule", &mut self.timer_schedule),
            ("LogStorageAccountName", &mut self.log_storage_account_name),
            ("LogStorageAccountKey", &mut self.log_storage_account_key),
            ("LogContainerName", &mut self.log_container_name),
            ("FileShareStorageAccountName", &mut self.file_share_storage_account_name),
            ("FileShareStorageAccountKey", &mut self.file_share_storage_account_key),
            ("FileShareName", &mut self.file_share_name),
        ];
        for (key, value) in settings {
            if let Ok(setting) = env::var(key) {
                *value = setting;
            }
            if value.trim().is_empty() {
                return Err(exception!(message = format!("missing app setting, key={key}")));
            }
        }
        if let Ok(setting) = env::var("RunOnStartup") {
            self.run_on_startup = setting.eq_ignore_ascii_case("true");
        }
        Ok(())
    }
}

pub struct AppState {
    log_store: LogStore,
    file_share: Box<dyn FileShare>,
    file_share_name: String,
}

impl AppState {
    fn new(config: &AppConfig) -> CoreRsResult<Self> {
        Ok(AppState {
            log_store: LogStore::azure(
                &config.log_storage_account_name,
                &config.log_storage_account_key,
                &config.log_container_name,
            )?,
            file_share: Box::new(AzureFileShare::new(
                &config.file_share_storage_account_name,
                &config.file_share_storage_account_key,
                &config.file_share_name,
            )?),
            file_share_name: config.file_share_name.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> CoreRsResult<()> {
    log::init();

    let mut config: AppConfig = json::load_file(&asset_path("assets/conf.json")?)?;
    config.apply_env()?;

    let shutdown = Shutdown::new();
    let scheduler_signal = shutdown.subscribe();
    shutdown.listen();

    let state = Arc::new(AppState::new(&config)?);

    let mut scheduler = Scheduler::new(Utc.fix());
    scheduler.schedule_cron(
        "purge-downloaded-files-job",
        purge_downloaded_files_job,
        &config.timer_schedule,
    )?;

    if config.run_on_startup {
        let startup_state = state.clone();
        task::spawn_action("purge-downloaded-files-on-startup", async move {
            let context = JobContext {
                name: "purge-downloaded-files-on-startup",
                scheduled_time: Utc::now(),
            };
            purge_downloaded_files_job(startup_state, context).await
        });
    }

    scheduler.start(state, scheduler_signal).await?;

    task::shutdown().await;

    Ok(())
}
