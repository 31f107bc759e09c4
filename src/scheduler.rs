use std::future::Future;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use log::info;
use pretty_duration::pretty_duration;

/// Fires a job at fixed local times of day.
pub struct Scheduler {
    times: Vec<NaiveTime>,
    next_run: Option<NaiveDateTime>,
}

impl Scheduler {
    pub fn new(times: Vec<NaiveTime>, now: NaiveDateTime) -> Scheduler {
        let next_run = next_occurrence(&times, now);
        Scheduler { times, next_run }
    }

    pub fn next_run(&self) -> Option<NaiveDateTime> {
        self.next_run
    }

    /// Slots missed while a job was running collapse into one run.
    pub fn take_due(&mut self, now: NaiveDateTime) -> bool {
        match self.next_run {
            Some(next_run) if now >= next_run => {
                self.next_run = next_occurrence(&self.times, now);
                true
            }
            _ => false,
        }
    }

    pub async fn run_forever<F, Fut>(mut self, poll_interval: Duration, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        self.log_next_run(Local::now().naive_local());
        loop {
            let now = Local::now().naive_local();
            if self.take_due(now) {
                job().await;
                self.log_next_run(Local::now().naive_local());
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    fn log_next_run(&self, now: NaiveDateTime) {
        if let Some(next_run) = self.next_run() {
            let wait = (next_run - now).to_std().unwrap_or_default();
            info!(
                "Next stats message at {} (in {})",
                next_run,
                pretty_duration(&wait, None)
            );
        }
    }
}

/// The first slot strictly after `now`, today or tomorrow.
pub fn next_occurrence(times: &[NaiveTime], now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now.date();
    times
        .iter()
        .map(|time| today.and_time(*time))
        .filter(|candidate| *candidate > now)
        .min()
        .or_else(|| {
            let tomorrow = today.succ_opt()?;
            times.iter().min().map(|time| tomorrow.and_time(*time))
        })
}
