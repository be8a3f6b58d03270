use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recurrence tag on a reminder. Stored as `DAILY`/`WEEKLY` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    Daily,
    Weekly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Daily => "DAILY",
            Recurrence::Weekly => "WEEKLY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DAILY" => Some(Recurrence::Daily),
            "WEEKLY" => Some(Recurrence::Weekly),
            _ => None,
        }
    }

    /// Offset to the next firing after a delivery.
    pub fn interval(&self) -> chrono::Duration {
        match self {
            Recurrence::Daily => chrono::Duration::days(1),
            Recurrence::Weekly => chrono::Duration::days(7),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbUser {
    pub id: i64,
    pub phone: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbReminder {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub due_at: DateTime<Utc>,
    pub recurrence: Option<Recurrence>,
    pub active: bool,
    pub last_sent_at: Option<DateTime<Utc>>,
}

/// A due reminder joined with the owning user's contact address,
/// as consumed by the sweep.
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub reminder: DbReminder,
    pub phone: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbList {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbListItem {
    pub id: i64,
    pub list_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurrence_round_trips_through_storage_text() {
        assert_eq!(Recurrence::parse("DAILY"), Some(Recurrence::Daily));
        assert_eq!(Recurrence::parse("WEEKLY"), Some(Recurrence::Weekly));
        assert_eq!(Recurrence::parse("MONTHLY"), None);
        assert_eq!(Recurrence::Daily.as_str(), "DAILY");
        assert_eq!(Recurrence::Weekly.as_str(), "WEEKLY");
    }
}
