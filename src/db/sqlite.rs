use crate::db::models::{DbList, DbListItem, DbReminder, DbUser, DueReminder, Recurrence};
use crate::db::schema::SQLITE_INIT;
use crate::error::MerkbotError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub type SqlitePool = Pool<Sqlite>;

/// CRUD gateway over the four entities. Every operation is a single-row
/// statement (or conflict-tolerant insert plus re-select); no transaction
/// spans multiple entities.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), MerkbotError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Idempotent upsert-by-phone. The UNIQUE constraint makes concurrent
    /// first-contact inserts collapse onto one row.
    pub async fn get_or_create_user(
        &self,
        phone: &str,
        name: Option<&str>,
    ) -> Result<DbUser, MerkbotError> {
        sqlx::query("INSERT INTO users (phone, name) VALUES (?, ?) ON CONFLICT(phone) DO NOTHING")
            .bind(phone)
            .bind(name)
            .execute(&self.pool)
            .await?;

        let row = sqlx::query("SELECT id, phone, name FROM users WHERE phone = ?")
            .bind(phone)
            .fetch_one(&self.pool)
            .await?;
        Self::user_from_row(row)
    }

    pub async fn create_reminder(
        &self,
        user_id: i64,
        text: &str,
        due_at: DateTime<Utc>,
        recurrence: Option<Recurrence>,
    ) -> Result<DbReminder, MerkbotError> {
        let result = sqlx::query(
            "INSERT INTO reminders (user_id, text, due_at, recurrence) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(text)
        .bind(due_at.to_rfc3339())
        .bind(recurrence.map(|r| r.as_str()))
        .execute(&self.pool)
        .await?;

        Ok(DbReminder {
            id: result.last_insert_rowid(),
            user_id,
            text: text.to_string(),
            due_at,
            recurrence,
            active: true,
            last_sent_at: None,
        })
    }

    /// All reminders eligible for delivery, joined with the owning user's
    /// contact address. Eligible iff `active = 1 AND due_at <= now`.
    pub async fn due_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<DueReminder>, MerkbotError> {
        let rows = sqlx::query(
            r#"SELECT r.id, r.user_id, r.text, r.due_at, r.recurrence, r.active, r.last_sent_at,
                      u.phone, u.name
               FROM reminders r
               JOIN users u ON u.id = r.user_id
               WHERE r.active = 1 AND r.due_at <= ?
               ORDER BY r.id"#,
        )
        .bind(now.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let phone: String = row.try_get("phone")?;
                let name: Option<String> = row.try_get("name")?;
                let reminder = Self::reminder_from_row(&row)?;
                Ok(DueReminder {
                    reminder,
                    phone,
                    name,
                })
            })
            .collect()
    }

    /// Record a successful delivery in one statement: stamp `last_sent_at`,
    /// then either deactivate the reminder (one-shot) or advance `due_at` to
    /// the next occurrence (recurring).
    pub async fn finish_delivery(
        &self,
        reminder_id: i64,
        sent_at: DateTime<Utc>,
        next_due: Option<DateTime<Utc>>,
    ) -> Result<(), MerkbotError> {
        sqlx::query(
            r#"UPDATE reminders
               SET last_sent_at = ?,
                   due_at = COALESCE(?, due_at),
                   active = ?
               WHERE id = ?"#,
        )
        .bind(sent_at.to_rfc3339())
        .bind(next_due.map(|d| d.to_rfc3339()))
        .bind(next_due.is_some())
        .bind(reminder_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Lazy list creation, idempotent per (user_id, name).
    pub async fn get_or_create_list(
        &self,
        user_id: i64,
        name: &str,
    ) -> Result<DbList, MerkbotError> {
        sqlx::query(
            "INSERT INTO lists (user_id, name) VALUES (?, ?) ON CONFLICT(user_id, name) DO NOTHING",
        )
        .bind(user_id)
        .bind(name)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT id, user_id, name FROM lists WHERE user_id = ? AND name = ?")
            .bind(user_id)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(DbList {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
        })
    }

    pub async fn add_list_item(
        &self,
        list_id: i64,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<DbListItem, MerkbotError> {
        let result =
            sqlx::query("INSERT INTO list_items (list_id, content, created_at) VALUES (?, ?, ?)")
                .bind(list_id)
                .bind(content)
                .bind(created_at.to_rfc3339())
                .execute(&self.pool)
                .await?;

        Ok(DbListItem {
            id: result.last_insert_rowid(),
            list_id,
            content: content.to_string(),
            created_at,
        })
    }

    /// Items in insertion order (creation time, id as tiebreaker).
    pub async fn list_items(&self, list_id: i64) -> Result<Vec<DbListItem>, MerkbotError> {
        let rows = sqlx::query(
            r#"SELECT id, list_id, content, created_at
               FROM list_items WHERE list_id = ?
               ORDER BY created_at ASC, id ASC"#,
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::item_from_row).collect()
    }

    fn user_from_row(row: SqliteRow) -> Result<DbUser, MerkbotError> {
        Ok(DbUser {
            id: row.try_get("id")?,
            phone: row.try_get("phone")?,
            name: row.try_get("name")?,
        })
    }

    fn reminder_from_row(row: &SqliteRow) -> Result<DbReminder, MerkbotError> {
        let due_at_str: String = row.try_get("due_at")?;
        let last_sent_str: Option<String> = row.try_get("last_sent_at")?;
        let recurrence_str: Option<String> = row.try_get("recurrence")?;
        let active_i: i64 = row.try_get("active")?;

        Ok(DbReminder {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            text: row.try_get("text")?,
            due_at: Self::parse_timestamp(&due_at_str)?,
            // unknown tags read as no recurrence
            recurrence: recurrence_str.as_deref().and_then(Recurrence::parse),
            active: active_i != 0,
            last_sent_at: last_sent_str
                .as_deref()
                .map(Self::parse_timestamp)
                .transpose()?,
        })
    }

    fn item_from_row(row: SqliteRow) -> Result<DbListItem, MerkbotError> {
        let created_at_str: String = row.try_get("created_at")?;
        Ok(DbListItem {
            id: row.try_get("id")?,
            list_id: row.try_get("list_id")?,
            content: row.try_get("content")?,
            created_at: Self::parse_timestamp(&created_at_str)?,
        })
    }

    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, MerkbotError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);
        Ok(dt)
    }
}
