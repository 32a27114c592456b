//! Scheduled countdown reminder.
//!
//! An independent timer task: counts down to a fixed deadline (the league's
//! deck lock-in) and delivers a periodic message through whatever
//! [`ReminderSink`] the surrounding service provides. Message content is a
//! pure function of the clock, so it is testable without one.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration as TimeDelta, Utc};
use thiserror::Error;
use tokio::time::interval;
use tracing::{error, info};

/// Errors raised by a reminder sink.
#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Send capability for reminder messages.
#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn deliver(&self, message: &str) -> Result<(), ReminderError>;
}

/// When and how often to remind.
#[derive(Debug, Clone)]
pub struct ReminderSchedule {
    /// Message title
    pub title: String,

    /// Deadline the countdown runs toward
    pub deadline: DateTime<Utc>,

    /// Delivery interval
    pub interval: std::time::Duration,
}

/// One scheduled message.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderMessage {
    pub text: String,
    pub deadline_reached: bool,
}

/// Human-readable remaining time at second granularity.
pub fn format_remaining(remaining: TimeDelta) -> String {
    if remaining <= TimeDelta::zero() {
        return "0 days 0 hours 0 minutes 0 seconds".to_string();
    }
    let sec = remaining.num_seconds();
    let days = sec / 86400;
    let hours = (sec % 86400) / 3600;
    let mins = (sec % 3600) / 60;
    let secs = sec % 60;
    format!("{days} days {hours} hours {mins} minutes {secs} seconds")
}

/// Build the message for a delivery at `now`.
pub fn build_message(schedule: &ReminderSchedule, now: DateTime<Utc>) -> ReminderMessage {
    if now >= schedule.deadline {
        ReminderMessage {
            text: format!(
                "**{}**\nWe have reached {}. Decks are locked — the season is on!",
                schedule.title,
                schedule.deadline.format("%Y-%m-%d %H:%M:%S UTC"),
            ),
            deadline_reached: true,
        }
    } else {
        ReminderMessage {
            text: format!(
                "**{}**\nTime remaining until {}:\n**{}**",
                schedule.title,
                schedule.deadline.format("%Y-%m-%d %H:%M:%S UTC"),
                format_remaining(schedule.deadline - now),
            ),
            deadline_reached: false,
        }
    }
}

/// The reminder task.
pub struct Reminder {
    schedule: ReminderSchedule,
    sink: Arc<dyn ReminderSink>,
}

impl Reminder {
    pub fn new(schedule: ReminderSchedule, sink: Arc<dyn ReminderSink>) -> Self {
        Self { schedule, sink }
    }

    /// Deliver one message now. Returns true once the deadline message went
    /// out.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> Result<bool, ReminderError> {
        let message = build_message(&self.schedule, now);
        self.sink.deliver(&message.text).await?;
        Ok(message.deadline_reached)
    }

    /// Run the delivery loop: one message immediately, then one per
    /// interval, stopping after the deadline message.
    pub async fn run(&self) {
        let mut ticker = interval(self.schedule.interval);
        info!(
            "Reminder running every {:?} until {}",
            self.schedule.interval, self.schedule.deadline
        );

        loop {
            ticker.tick().await;

            match self.tick_at(Utc::now()).await {
                Ok(true) => {
                    info!("Deadline message delivered, reminder stopped");
                    break;
                }
                Ok(false) => {}
                Err(e) => {
                    error!("Reminder delivery failed: {}", e);
                }
            }
        }
    }
}
