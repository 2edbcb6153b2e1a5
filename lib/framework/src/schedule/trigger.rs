use std::str::FromStr;

use chrono::DateTime;
use chrono::FixedOffset;
use chrono::Utc;

use super::Trigger;
use crate::exception::CoreRsResult;

pub(super) struct CronTrigger {
    schedule: cron::Schedule,
    timezone: FixedOffset,
}

impl CronTrigger {
    pub(super) fn parse(expression: &str, timezone: FixedOffset) -> CoreRsResult<Self> {
        let schedule = cron::Schedule::from_str(expression).map_err(|err| {
            exception!(
                message = format!("invalid cron expression, expression={expression}"),
                source = err
            )
        })?;
        Ok(Self { schedule, timezone })
    }
}

impl Trigger for CronTrigger {
    fn next(&self, previous: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&previous.with_timezone(&self.timezone))
            .next()
            .map(|next| next.with_timezone(&Utc))
    }
}
