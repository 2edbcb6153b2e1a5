use std::pin::Pin;
use std::time::Duration;

use chrono::DateTime;
use chrono::FixedOffset;
use chrono::SecondsFormat;
use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time;
use tracing::debug;
use tracing::info;
use trigger::CronTrigger;

use crate::exception::CoreRsResult;
use crate::log;

mod trigger;

pub struct JobContext {
    pub name: &'static str,
    pub scheduled_time: DateTime<Utc>,
}

trait Job<S>: Send {
    fn execute(&self, state: S, context: JobContext) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

impl<F, Fut, S> Job<S> for F
where
    F: Fn(S, JobContext) -> Fut + Send,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn execute(&self, state: S, context: JobContext) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(self(state, context))
    }
}

trait Trigger: Send {
    /// next fire time strictly after `previous`, `None` when the trigger never fires again
    fn next(&self, previous: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

struct Schedule<S> {
    name: &'static str,
    job: Box<dyn Job<S>>,
    trigger: Box<dyn Trigger>,
}

pub struct Scheduler<S> {
    timezone: FixedOffset,
    schedules: Vec<Schedule<S>>,
}

impl<S> Scheduler<S>
where
    S: Send + Sync + 'static,
{
    pub fn new(timezone: FixedOffset) -> Self {
        Self {
            timezone,
            schedules: Vec::new(),
        }
    }

    /// `expression` is a 6-field cron expression, `sec min hour day month day-of-week`,
    /// evaluated in the scheduler timezone.
    pub fn schedule_cron<J, Fut>(&mut self, name: &'static str, job: J, expression: &str) -> CoreRsResult<()>
    where
        J: Fn(S, JobContext) -> Fut + Copy + Send + 'static,
        Fut: Future<Output = CoreRsResult<()>> + Send + 'static,
    {
        let trigger = CronTrigger::parse(expression, self.timezone)?;
        self.add_job(name, job, Box::new(trigger));
        Ok(())
    }

    fn add_job<J, Fut>(&mut self, name: &'static str, job: J, trigger: Box<dyn Trigger>)
    where
        J: Fn(S, JobContext) -> Fut + Copy + Send + 'static,
        Fut: Future<Output = CoreRsResult<()>> + Send + 'static,
    {
        let job = move |state: S, context| process_job(job, state, context);
        self.schedules.push(Schedule {
            name,
            job: Box::new(job),
            trigger,
        });
    }

    pub async fn start(self, state: S, shutdown_signal: broadcast::Receiver<()>) -> CoreRsResult<()>
    where
        S: Clone,
    {
        let mut handles = vec![];
        for schedule in self.schedules {
            let state = state.clone();
            let mut shutdown_signal = shutdown_signal.resubscribe();
            handles.push(tokio::spawn(async move {
                time::sleep(Duration::from_secs(3)).await; // initial delay
                let mut previous = Utc::now();
                loop {
                    let Some(next) = schedule.trigger.next(previous) else {
                        info!(name = schedule.name, "job has no further trigger time");
                        return;
                    };
                    let context = JobContext {
                        name: schedule.name,
                        scheduled_time: next,
                    };
                    info!(
                        name = context.name,
                        scheduled_time = context.scheduled_time.to_rfc3339_opts(SecondsFormat::Millis, true),
                        "scheduled job"
                    );
                    let waiting_time = (next - Utc::now()).to_std().unwrap_or_default();
                    tokio::select! {
                        _ = shutdown_signal.recv() => {
                            return;
                        }
                        () = time::sleep(waiting_time) => {
                            // runs are never overlapped, fire times missed while running are skipped
                            schedule.job.execute(state.clone(), context).await;
                            previous = Utc::now().max(next);
                        }
                    }
                }
            }));
        }
        info!("scheduler started");
        for handle in handles {
            handle.await?;
        }
        info!("scheduler stopped");
        Ok(())
    }
}

async fn process_job<S, J, Fut>(job: J, state: S, context: JobContext)
where
    J: Fn(S, JobContext) -> Fut,
    Fut: Future<Output = CoreRsResult<()>>,
{
    log::start_action("job", None, async move {
        let scheduled_time = context.scheduled_time.to_rfc3339_opts(SecondsFormat::Millis, true);
        debug!(job = context.name, scheduled_time, "context");
        job(state, context).await
    })
    .await;
}
