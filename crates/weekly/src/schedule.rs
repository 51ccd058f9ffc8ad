//! Weekly scheduler.
//!
//! A single loop with two states: idle (sleeping until the next
//! configured weekday/time) and running (pipeline in flight). A failed
//! run is logged and the loop goes back to idle; the next trigger is
//! unaffected.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveTime, Weekday};

use crate::config::Settings;
use crate::notion::to_local;
use crate::pipeline::Pipeline;

/// When to fire: a weekday plus a local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSpec {
    /// Day of the week.
    pub day: Weekday,
    /// Local time of day.
    pub time: NaiveTime,
}

impl ScheduleSpec {
    /// Parse a weekday name and an `HH:MM` time.
    pub fn parse(day: &str, time: &str) -> Result<Self> {
        let day = match day.trim().to_lowercase().as_str() {
            "monday" => Weekday::Mon,
            "tuesday" => Weekday::Tue,
            "wednesday" => Weekday::Wed,
            "thursday" => Weekday::Thu,
            "friday" => Weekday::Fri,
            "saturday" => Weekday::Sat,
            "sunday" => Weekday::Sun,
            other => bail!("invalid schedule day: {other}"),
        };

        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .with_context(|| format!("invalid schedule time (expected HH:MM): {time}"))?;

        Ok(Self { day, time })
    }

    /// The next trigger strictly after `after`.
    #[must_use]
    pub fn next_trigger(&self, after: DateTime<Local>) -> DateTime<Local> {
        let days_ahead = i64::from(
            (self.day.num_days_from_monday() + 7 - after.weekday().num_days_from_monday()) % 7,
        );

        let date = after.date_naive() + Duration::days(days_ahead);
        let candidate = to_local(date.and_time(self.time));
        if candidate > after {
            candidate
        } else {
            to_local((date + Duration::days(7)).and_time(self.time))
        }
    }
}

/// Runs the pipeline on the configured weekly cadence.
pub struct Scheduler {
    pipeline: Pipeline,
    spec: ScheduleSpec,
}

impl Scheduler {
    /// Build a scheduler from settings. Fails on an invalid schedule or
    /// an unresolvable summarization model.
    pub fn new(settings: Settings) -> Result<Self> {
        let spec = ScheduleSpec::parse(&settings.schedule.day, &settings.schedule.time)?;
        let pipeline = Pipeline::from_settings(settings)?;
        Ok(Self { pipeline, spec })
    }

    /// The next time the scheduler will fire.
    #[must_use]
    pub fn next_run(&self) -> DateTime<Local> {
        self.spec.next_trigger(Local::now())
    }

    /// Run forever, firing once per week. Only process termination
    /// stops the loop.
    pub async fn run(&self) -> Result<()> {
        loop {
            // idle
            let now = Local::now();
            let next = self.spec.next_trigger(now);
            let wait = (next - now).to_std().unwrap_or_default();

            tracing::info!(
                next = %next.format("%Y-%m-%d %H:%M:%S"),
                "Scheduler idle, waiting for next trigger"
            );
            tokio::time::sleep(wait).await;

            // running
            tracing::info!("Schedule triggered, starting pipeline run");
            match self.pipeline.run().await {
                Ok(outcome) => {
                    if let Some(page) = &outcome.page {
                        tracing::info!(
                            title = %outcome.title,
                            tasks = outcome.task_count(),
                            url = %page.url,
                            "Scheduled run complete"
                        );
                    } else {
                        tracing::info!(
                            title = %outcome.title,
                            "Scheduled run complete, nothing published"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Scheduled run failed, waiting for next trigger");
                }
            }
        }
    }
}
