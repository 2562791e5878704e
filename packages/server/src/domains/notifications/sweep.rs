//! Step reminder sweep.
//!
//! Runs on a fixed schedule. Each tick looks at every upcoming step, and for
//! steps inside their alert window creates one notification per event member
//! and pushes it on the member's personal topic. A `(user, step)` pair is
//! notified at most once no matter how many ticks see it: the existence check
//! skips known pairs and the unique index catches the rest.
//!
//! The first failure is logged and ends the tick. There is no retry within a
//! tick; the next tick picks up anything that was not persisted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::common::StoreResult;
use crate::domains::events::models::EventStep;
use crate::domains::membership::models::EventMember;
use crate::domains::notifications::models::NewNotification;
use crate::kernel::{
    BaseEventStore, BaseMembershipStore, BaseNotificationStore, ServerDeps, StreamHub,
};

/// What one tick did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub steps_due: usize,
    pub sent: usize,
    pub already_sent: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct NotificationSweep {
    events: Arc<dyn BaseEventStore>,
    members: Arc<dyn BaseMembershipStore>,
    notifications: Arc<dyn BaseNotificationStore>,
    hub: StreamHub,
}

enum Delivery {
    Sent,
    AlreadySent,
}

impl NotificationSweep {
    pub fn new(
        events: Arc<dyn BaseEventStore>,
        members: Arc<dyn BaseMembershipStore>,
        notifications: Arc<dyn BaseNotificationStore>,
        hub: StreamHub,
    ) -> Self {
        Self {
            events,
            members,
            notifications,
            hub,
        }
    }

    pub fn from_deps(deps: &ServerDeps) -> Self {
        Self::new(
            deps.events.clone(),
            deps.members.clone(),
            deps.notifications.clone(),
            deps.stream_hub.clone(),
        )
    }

    /// Run one pass with `now` as the current time.
    pub async fn tick(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        if let Err(e) = self.sweep(now, &mut report).await {
            report.failed += 1;
            warn!(
                sent = report.sent,
                error = %e,
                "notification sweep ended early"
            );
            return report;
        }

        if report.sent > 0 {
            info!(
                steps_due = report.steps_due,
                sent = report.sent,
                "notification sweep finished"
            );
        } else {
            debug!(steps_due = report.steps_due, "notification sweep found nothing to send");
        }

        report
    }

    async fn sweep(&self, now: DateTime<Utc>, report: &mut SweepReport) -> StoreResult<()> {
        let steps = self.events.find_upcoming_steps(now).await?;

        for step in steps.iter().filter(|s| s.is_within_alert_window(now)) {
            report.steps_due += 1;

            let members = self.members.find_members(step.event_id).await?;
            for member in &members {
                match self.notify(step, member, now).await {
                    Ok(Delivery::Sent) => report.sent += 1,
                    Ok(Delivery::AlreadySent) => report.already_sent += 1,
                    Err(e) => {
                        error!(
                            step_id = %step.id,
                            user_id = %member.user_id,
                            error = %e,
                            "failed to create step reminder"
                        );
                        return Err(e);
                    }
                }
            }
        }

        Ok(())
    }

    async fn notify(
        &self,
        step: &EventStep,
        member: &EventMember,
        now: DateTime<Utc>,
    ) -> StoreResult<Delivery> {
        if self
            .notifications
            .notification_exists(member.user_id, step.id)
            .await?
        {
            return Ok(Delivery::AlreadySent);
        }

        let (title, message) = reminder_text(step, now);
        let created = self
            .notifications
            .insert_notification(NewNotification {
                user_id: member.user_id,
                event_id: step.event_id,
                step_id: step.id,
                title,
                message,
            })
            .await;

        let notification = match created {
            Ok(notification) => notification,
            // Lost the race against a concurrent sweep
            Err(e) if e.is_unique_violation() => return Ok(Delivery::AlreadySent),
            Err(e) => return Err(e),
        };

        self.hub
            .publish_to_user(
                notification.user_id,
                json!({
                    "type": "notification",
                    "title": notification.title,
                    "message": notification.message,
                    "eventId": notification.event_id,
                    "stepId": notification.step_id,
                }),
            )
            .await;

        Ok(Delivery::Sent)
    }
}

/// Title and body for a step reminder
fn reminder_text(step: &EventStep, now: DateTime<Utc>) -> (String, String) {
    let seconds = (step.scheduled_time - now).num_seconds().max(0);
    let minutes = (seconds + 59) / 60;
    let when = match minutes {
        0 | 1 => "in 1 minute".to_string(),
        m => format!("in {} minutes", m),
    };
    let message = match step.location.as_deref().filter(|l| !l.trim().is_empty()) {
        Some(location) => format!("{} starts {} at {}", step.name, when, location),
        None => format!("{} starts {}", step.name, when),
    };
    (format!("Upcoming: {}", step.name), message)
}
