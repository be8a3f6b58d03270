use crate::api::twilio::MessageSender;
use crate::db::{DbReminder, DueReminder, Storage};
use crate::error::MerkbotError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub total: usize,
    pub sent: usize,
    pub errors: usize,
}

/// Query-and-deliver pass over due reminders. Delivery is sequential to keep
/// provider pacing predictable; a failed item is counted and logged, never
/// aborting the pass. The query error is the only one that propagates.
pub async fn run(
    storage: &Storage,
    sender: &dyn MessageSender,
    now: DateTime<Utc>,
) -> Result<SweepSummary, MerkbotError> {
    let due = storage.due_reminders(now).await?;
    let mut summary = SweepSummary {
        total: due.len(),
        sent: 0,
        errors: 0,
    };

    for item in &due {
        match deliver(storage, sender, item, now).await {
            Ok(()) => summary.sent += 1,
            Err(e) => {
                summary.errors += 1;
                warn!(
                    reminder_id = item.reminder.id,
                    error = %e,
                    "reminder delivery failed"
                );
            }
        }
    }

    info!(
        total = summary.total,
        sent = summary.sent,
        errors = summary.errors,
        "sweep finished"
    );
    Ok(summary)
}

async fn deliver(
    storage: &Storage,
    sender: &dyn MessageSender,
    item: &DueReminder,
    now: DateTime<Utc>,
) -> Result<(), MerkbotError> {
    sender
        .send(&item.phone, &delivery_message(&item.reminder))
        .await?;
    storage
        .finish_delivery(item.reminder.id, now, next_due(&item.reminder, now))
        .await
}

fn delivery_message(reminder: &DbReminder) -> String {
    format!("⏰ Erinnerung: {}", reminder.text)
}

/// A one-shot reminder is done after delivery. A recurring one advances past
/// `now` in whole intervals, so a long-overdue reminder fires once instead of
/// replaying every missed occurrence.
fn next_due(reminder: &DbReminder, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let recurrence = reminder.recurrence?;
    let mut next = reminder.due_at + recurrence.interval();
    while next <= now {
        next += recurrence.interval();
    }
    Some(next)
}
