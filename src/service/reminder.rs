use crate::db::{DbUser, Recurrence, Storage};
use crate::error::MerkbotError;
use crate::nlp::{TimeExtractor, TimeMatch, format_berlin};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

const NO_TIME_PROMPT: &str = "⏰ Wann soll ich dich erinnern? Zum Beispiel: \"Erinnere mich in 10 Minuten an die Pause\"";
const NO_TEXT_PROMPT: &str =
    "🤔 Woran soll ich dich erinnern? Zum Beispiel: \"Erinnere mich um 15:00 an den Anruf\"";

static INTENT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(erinnere\s+mich|erinnere|erinnerung|remind\s+me|remind)\b[\s,:]*")
        .expect("INTENT_PREFIX pattern must compile")
});

// Leading words left dangling once the time expression is gone.
static LEADING_FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(an|daran|zu|bitte|täglich|wöchentlich|jeden\s+tag|jeden\s+woche|jede\s+woche)\b\s*",
    )
    .expect("LEADING_FILLER pattern must compile")
});

/// Parse a reminder out of the message, persist it, and format the reply.
/// Missing pieces (no time expression, no remaining text) are not errors:
/// they produce clarification prompts.
pub async fn handle(
    storage: &Storage,
    extractor: &dyn TimeExtractor,
    user: &DbUser,
    text: &str,
    now: DateTime<Utc>,
) -> Result<String, MerkbotError> {
    let matches = extractor.extract(text, now);
    let Some(first) = matches.first() else {
        return Ok(NO_TIME_PROMPT.to_string());
    };

    let reminder_body = strip_time_expression(text, first);
    if reminder_body.is_empty() {
        return Ok(NO_TEXT_PROMPT.to_string());
    }

    let recurrence = detect_recurrence(text);
    let reminder = storage
        .create_reminder(user.id, &reminder_body, first.resolved, recurrence)
        .await?;

    info!(
        reminder_id = reminder.id,
        user_id = user.id,
        due_at = %reminder.due_at,
        "reminder created"
    );
    Ok(confirmation(&reminder_body, first.resolved, recurrence))
}

/// The reminder text is the original message minus the matched time span,
/// minus the intent phrase and dangling connectives, whitespace-collapsed.
pub fn strip_time_expression(original: &str, time: &TimeMatch) -> String {
    let mut remainder = String::with_capacity(original.len());
    remainder.push_str(&original[..time.start]);
    remainder.push(' ');
    remainder.push_str(&original[time.end..]);

    let collapsed = remainder.split_whitespace().collect::<Vec<_>>().join(" ");
    let without_intent = INTENT_PREFIX.replace(&collapsed, "");

    let mut text = without_intent.into_owned();
    loop {
        let stripped = LEADING_FILLER.replace(&text, "");
        if stripped == text {
            break;
        }
        text = stripped.into_owned();
    }
    text.trim_matches([' ', ',', '.', '!', ':']).to_string()
}

/// Recurrence tags by substring over the full lower-cased message.
pub fn detect_recurrence(text: &str) -> Option<Recurrence> {
    let lower = text.to_lowercase();
    if lower.contains("täglich") || lower.contains("jeden tag") {
        Some(Recurrence::Daily)
    } else if lower.contains("wöchentlich")
        || lower.contains("jede woche")
        || lower.contains("jeden woche")
    {
        Some(Recurrence::Weekly)
    } else {
        None
    }
}

fn confirmation(text: &str, due: DateTime<Utc>, recurrence: Option<Recurrence>) -> String {
    let when = format_berlin(due);
    match recurrence {
        Some(Recurrence::Daily) => {
            format!("✅ Alles klar! Ich erinnere dich täglich, zuerst am {when}: \"{text}\"")
        }
        Some(Recurrence::Weekly) => {
            format!("✅ Alles klar! Ich erinnere dich wöchentlich, zuerst am {when}: \"{text}\"")
        }
        None => format!("✅ Alles klar! Ich erinnere dich am {when}: \"{text}\""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::GermanTimeParser;
    use chrono::{Duration, TimeZone};
    use sqlx::sqlite::SqlitePoolOptions;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    async fn storage_with_user() -> (Storage, DbUser) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let storage = Storage::new(pool);
        storage.init_schema().await.unwrap();
        let user = storage
            .get_or_create_user("whatsapp:+491701234567", None)
            .await
            .unwrap();
        (storage, user)
    }

    #[tokio::test]
    async fn creates_reminder_with_stripped_text_and_due_time() {
        let (storage, user) = storage_with_user().await;
        let parser = GermanTimeParser::new();

        let reply = handle(
            &storage,
            &parser,
            &user,
            "Erinnere mich in 5 Minuten an Müll rausbringen",
            reference(),
        )
        .await
        .unwrap();

        assert!(reply.contains("Müll rausbringen"), "reply: {reply}");

        let due = storage
            .due_reminders(reference() + Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].reminder.text, "Müll rausbringen");
        assert_eq!(due[0].reminder.due_at, reference() + Duration::minutes(5));
        assert_eq!(due[0].reminder.recurrence, None);
    }

    #[tokio::test]
    async fn missing_time_expression_prompts_for_clarification() {
        let (storage, user) = storage_with_user().await;
        let parser = GermanTimeParser::new();

        let reply = handle(&storage, &parser, &user, "Erinnere mich an nichts", reference())
            .await
            .unwrap();
        assert_eq!(reply, NO_TIME_PROMPT);
        assert!(storage.due_reminders(reference() + Duration::days(365)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_reminder_text_prompts_for_clarification() {
        let (storage, user) = storage_with_user().await;
        let parser = GermanTimeParser::new();

        let reply = handle(&storage, &parser, &user, "Erinnere mich in 5 Minuten", reference())
            .await
            .unwrap();
        assert_eq!(reply, NO_TEXT_PROMPT);
    }

    #[tokio::test]
    async fn daily_recurrence_is_detected_and_stored() {
        let (storage, user) = storage_with_user().await;
        let parser = GermanTimeParser::new();

        let reply = handle(
            &storage,
            &parser,
            &user,
            "Erinnere mich täglich um 20:00 an Tabletten",
            reference(),
        )
        .await
        .unwrap();
        assert!(reply.contains("täglich"), "reply: {reply}");

        let due = storage
            .due_reminders(reference() + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(due[0].reminder.recurrence, Some(Recurrence::Daily));
        assert_eq!(due[0].reminder.text, "Tabletten");
    }

    #[test]
    fn recurrence_detection_table() {
        assert_eq!(detect_recurrence("bitte täglich dran denken"), Some(Recurrence::Daily));
        assert_eq!(detect_recurrence("jeden Tag um 8"), Some(Recurrence::Daily));
        assert_eq!(detect_recurrence("wöchentlich melden"), Some(Recurrence::Weekly));
        assert_eq!(detect_recurrence("jede Woche Sport"), Some(Recurrence::Weekly));
        assert_eq!(detect_recurrence("nur einmal"), None);
    }

    #[test]
    fn strip_removes_span_prefix_and_connective() {
        let parser = GermanTimeParser::new();
        let text = "Erinnere mich in 5 Minuten an Müll rausbringen";
        let m = &parser.extract(text, reference())[0];
        assert_eq!(strip_time_expression(text, m), "Müll rausbringen");
    }
}
