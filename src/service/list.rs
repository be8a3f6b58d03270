use crate::db::{DbUser, Storage};
use crate::error::MerkbotError;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;
use tracing::info;

pub const DEFAULT_LIST: &str = "Notizen";

const ITEM_PROMPT: &str =
    "🤔 Was soll ich hinzufügen? Zum Beispiel: \"Füge Milch zur Einkaufsliste hinzu\"";
const LIST_UNRECOGNIZED: &str = "🤔 Das habe ich nicht verstanden. Du kannst Listen erstellen (\"Erstelle eine Liste Einkauf\"), etwas hinzufügen (\"Füge Milch hinzu\") oder sie anzeigen (\"Zeig mir die Liste\").";

// "Liste Einkauf" -> explicit name after the word
static NAMED_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bliste\s+([\p{L}][\p{L}\d]*)").expect("NAMED_LIST pattern must compile")
});

// "Einkaufsliste" -> compound stem before the word
static COMPOUND_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([\p{L}]+?)-?liste\b").expect("COMPOUND_LIST pattern must compile")
});

// "füge <item> zur <name>liste ..." / "füge <item> in die Liste ..."
static ADD_TO_NAMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfüge\s+(.+?)\s+(?:zur|zu\s+der|in\s+die|in|auf\s+die|auf)\s+([\p{L}]*?)-?liste\b")
        .expect("ADD_TO_NAMED pattern must compile")
});

// "füge <item> hinzu" with no target list
static ADD_SIMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfüge\s+(.+?)\s+hinzu\b").expect("ADD_SIMPLE pattern must compile")
});

// Captures of NAMED_LIST that are grammar, not names.
const NAME_STOPWORDS: &[&str] = &["hinzu", "hinzufügen", "an", "zeigen", "bitte"];

/// Dispatch the three list sub-intents, checked in fixed priority order:
/// create, then add-item, then show.
pub async fn handle(
    storage: &Storage,
    user: &DbUser,
    text: &str,
    now: DateTime<Utc>,
) -> Result<String, MerkbotError> {
    let lower = text.trim().to_lowercase();

    if lower.contains("erstell") || lower.contains("neue liste") {
        create_list(storage, user, text).await
    } else if lower.contains("hinzufügen") || lower.contains("füge") {
        add_item(storage, user, text, now).await
    } else if lower.contains("zeig") || lower.contains("was ist") {
        show_list(storage, user, text).await
    } else {
        Ok(LIST_UNRECOGNIZED.to_string())
    }
}

async fn create_list(
    storage: &Storage,
    user: &DbUser,
    text: &str,
) -> Result<String, MerkbotError> {
    let name = extract_list_name(text).unwrap_or_else(|| DEFAULT_LIST.to_string());
    let list = storage.get_or_create_list(user.id, &name).await?;
    info!(list_id = list.id, user_id = user.id, "list ready");
    // Re-creating an existing list lands here too; same success message.
    Ok(format!("📝 Deine Liste \"{name}\" ist bereit!"))
}

async fn add_item(
    storage: &Storage,
    user: &DbUser,
    text: &str,
    now: DateTime<Utc>,
) -> Result<String, MerkbotError> {
    let Some((item, name)) = extract_item_and_list(text) else {
        return Ok(ITEM_PROMPT.to_string());
    };

    let list = storage.get_or_create_list(user.id, &name).await?;
    storage.add_list_item(list.id, &item, now).await?;
    info!(list_id = list.id, user_id = user.id, "list item added");
    Ok(format!("✅ \"{item}\" steht jetzt auf der Liste \"{name}\"."))
}

async fn show_list(storage: &Storage, user: &DbUser, text: &str) -> Result<String, MerkbotError> {
    let name = extract_list_name(text).unwrap_or_else(|| DEFAULT_LIST.to_string());
    // A never-populated list exists once shown.
    let list = storage.get_or_create_list(user.id, &name).await?;
    let items = storage.list_items(list.id).await?;
    Ok(render_listing(&name, &items.iter().map(|i| i.content.as_str()).collect::<Vec<_>>()))
}

/// List name from "Liste <Wort>" or a "<Stamm>liste" compound; None when the
/// message names no list.
pub fn extract_list_name(text: &str) -> Option<String> {
    if let Some(caps) = NAMED_LIST.captures(text) {
        let raw = caps[1].to_lowercase();
        if !NAME_STOPWORDS.contains(&raw.as_str()) {
            return Some(capitalize(&raw));
        }
    }
    if let Some(caps) = COMPOUND_LIST.captures(text) {
        let raw = caps[1].to_lowercase();
        if !raw.is_empty() {
            return Some(capitalize(&raw));
        }
    }
    None
}

/// Item and target list from the two fallback patterns; the second one
/// defaults the list name.
pub fn extract_item_and_list(text: &str) -> Option<(String, String)> {
    if let Some(caps) = ADD_TO_NAMED.captures(text) {
        let item = caps[1].trim().to_string();
        let stem = caps[2].to_lowercase();
        let name = if stem.is_empty() {
            DEFAULT_LIST.to_string()
        } else {
            capitalize(&stem)
        };
        if !item.is_empty() {
            return Some((item, name));
        }
    }
    if let Some(caps) = ADD_SIMPLE.captures(text) {
        let item = caps[1].trim().to_string();
        if !item.is_empty() {
            return Some((item, DEFAULT_LIST.to_string()));
        }
    }
    None
}

/// 1-indexed listing in insertion order, or the empty-list message.
pub fn render_listing(name: &str, items: &[&str]) -> String {
    if items.is_empty() {
        return format!("📝 Die Liste \"{name}\" ist leer.");
    }
    let mut out = format!("📝 {name}:");
    for (idx, item) in items.iter().enumerate() {
        let _ = write!(out, "\n{}. {}", idx + 1, item);
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
