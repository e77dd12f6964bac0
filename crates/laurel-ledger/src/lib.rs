//! laurel-ledger
//!
//! Durable storage for awarded points and per-comment disposition history.
//!
//! Two tables, created idempotently on startup:
//!
//! - `awards` — append-only snapshots of confirmed award events, unique by
//!   `awarding_comment_id`. Never updated or deleted.
//! - `dispo_log` — one mutable row per processed comment, keyed by
//!   `comment_id`; upserted on every disposition change and deleted when a
//!   comment degrades to a trivial disposition.
//!
//! Every mutation runs in its own transaction scope: it either fully
//! commits or has no effect, so each operation is safe to retry on the next
//! scan pass. Award idempotence is enforced here at the DB level as well as
//! by the classifier's `AlreadyAwarded` rule.

use chrono::{Duration, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;

use laurel_schemas::{Award, Disposition, DispositionLogEntry};

/// Environment variable naming the ledger database file.
pub const ENV_DB_PATH: &str = "LAUREL_DB";

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Transactional storage failure. The current operation had no effect.
#[derive(Debug)]
pub enum StorageError {
    Sql(sqlx::Error),
    /// A request the store cannot express (bad month, corrupt stored code).
    Invalid(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Sql(e) => write!(f, "ledger storage failure: {e}"),
            StorageError::Invalid(msg) => write!(f, "invalid ledger request: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Sql(e) => Some(e),
            StorageError::Invalid(_) => None,
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::Sql(e)
    }
}

/// True when the error is the awards unique-index rejecting a duplicate
/// awarding comment id.
pub fn is_unique_violation(err: &StorageError) -> bool {
    match err {
        StorageError::Sql(sqlx::Error::Database(db_err)) => {
            // SQLite primary/unique violations surface as SQLITE_CONSTRAINT.
            db_err.code().as_deref() == Some("2067") || db_err.code().as_deref() == Some("1555")
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// LedgerStore
// ---------------------------------------------------------------------------

/// Handle to the ledger database. Cheap to clone (pool handle).
#[derive(Clone)]
pub struct LedgerStore {
    pool: SqlitePool,
}

/// Connectivity + schema presence, for operator tooling.
#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_awards_table: bool,
    pub has_dispo_log_table: bool,
}

impl LedgerStore {
    /// Open (creating if absent) the database file and apply the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let opts = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Open the database named by [`ENV_DB_PATH`].
    pub async fn open_from_env() -> Result<Self, StorageError> {
        let path = std::env::var(ENV_DB_PATH)
            .map_err(|_| StorageError::Invalid(format!("missing env var {ENV_DB_PATH}")))?;
        Self::open(path).await
    }

    /// Idempotent schema creation. Safe to call on every startup.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS awards (
              submission_id            TEXT NOT NULL,
              submission_title         TEXT NOT NULL,
              submission_self_text     TEXT NOT NULL,
              submission_author        TEXT NOT NULL,
              submission_url           TEXT NOT NULL,
              submission_time          REAL NOT NULL,
              awarded_comment_id       TEXT NOT NULL,
              awarded_comment_text     TEXT NOT NULL,
              awarded_comment_author   TEXT NOT NULL,
              awarded_comment_url      TEXT NOT NULL,
              awarded_comment_time     REAL NOT NULL,
              awarding_comment_id      TEXT NOT NULL,
              awarding_comment_text    TEXT NOT NULL,
              awarding_comment_author  TEXT NOT NULL,
              awarding_comment_url     TEXT NOT NULL,
              awarding_comment_time    REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // At most one award per awarding comment, enforced below the app layer.
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS awards_awarding_comment_uq \
             ON awards (awarding_comment_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dispo_log (
              comment_id   TEXT PRIMARY KEY,
              dispo        INTEGER NOT NULL,
              reply_id     TEXT NOT NULL,
              comment_time REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Connectivity check + schema presence.
    pub async fn status(&self) -> Result<DbStatus, StorageError> {
        let (one,): (i64,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;

        Ok(DbStatus {
            ok: one == 1,
            has_awards_table: self.table_exists("awards").await?,
            has_dispo_log_table: self.table_exists("dispo_log").await?,
        })
    }

    async fn table_exists(&self, name: &str) -> Result<bool, StorageError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    // -----------------------------------------------------------------------
    // awards
    // -----------------------------------------------------------------------

    /// Insert-only append of one confirmed award event.
    ///
    /// # Errors
    /// A duplicate `awarding_comment_id` is rejected by the unique index;
    /// see [`is_unique_violation`].
    pub async fn record_award(&self, award: &Award) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO awards (
              submission_id, submission_title, submission_self_text,
              submission_author, submission_url, submission_time,
              awarded_comment_id, awarded_comment_text, awarded_comment_author,
              awarded_comment_url, awarded_comment_time,
              awarding_comment_id, awarding_comment_text, awarding_comment_author,
              awarding_comment_url, awarding_comment_time
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&award.submission_id)
        .bind(&award.submission_title)
        .bind(&award.submission_self_text)
        .bind(&award.submission_author)
        .bind(&award.submission_url)
        .bind(award.submission_time)
        .bind(&award.awarded_comment_id)
        .bind(&award.awarded_comment_text)
        .bind(&award.awarded_comment_author)
        .bind(&award.awarded_comment_url)
        .bind(award.awarded_comment_time)
        .bind(&award.awarding_comment_id)
        .bind(&award.awarding_comment_text)
        .bind(&award.awarding_comment_author)
        .bind(&award.awarding_comment_url)
        .bind(award.awarding_comment_time)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            awardee = %award.awarded_comment_author,
            awarding_comment = %award.awarding_comment_id,
            "point awarded"
        );
        Ok(())
    }

    /// Prior awards in one submission for an (awarding, awarded) author
    /// pair. Input to the duplicate-in-tree check.
    pub async fn prior_awards_in_thread(
        &self,
        submission_id: &str,
        awarding_author: &str,
        awarded_author: &str,
    ) -> Result<Vec<Award>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM awards \
             WHERE submission_id = ? \
               AND awarding_comment_author = ? \
               AND awarded_comment_author = ?",
        )
        .bind(submission_id)
        .bind(awarding_author)
        .bind(awarded_author)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(award_from_row).collect()
    }

    /// True if an award already exists for this exact awarding comment.
    pub async fn has_award_for_comment(
        &self,
        awarding_comment_id: &str,
    ) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 FROM awards WHERE awarding_comment_id = ? LIMIT 1")
            .bind(awarding_comment_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// All awards received by one author. Reporting read (wiki tracker).
    pub async fn awards_by_awardee(&self, author: &str) -> Result<Vec<Award>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM awards WHERE awarded_comment_author = ? \
             ORDER BY awarding_comment_time",
        )
        .bind(author)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(award_from_row).collect()
    }

    /// Awards whose awarding time falls in the half-open interval
    /// `[month-start, next-month-start)`. Reporting read (monthly scoreboard).
    pub async fn awards_by_month(&self, year: i32, month: u32) -> Result<Vec<Award>, StorageError> {
        let start = month_start(year, month)?;
        let end = if month == 12 {
            month_start(year + 1, 1)?
        } else {
            month_start(year, month + 1)?
        };

        let rows = sqlx::query(
            "SELECT * FROM awards \
             WHERE awarding_comment_time >= ? AND awarding_comment_time < ? \
             ORDER BY awarding_comment_time",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(award_from_row).collect()
    }

    // -----------------------------------------------------------------------
    // dispo_log
    // -----------------------------------------------------------------------

    /// Replace-on-conflict by comment id.
    pub async fn upsert_dispo_log(
        &self,
        comment_id: &str,
        dispo: Disposition,
        reply_id: &str,
        comment_time: f64,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO dispo_log (comment_id, dispo, reply_id, comment_time)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (comment_id) DO UPDATE SET
              dispo = excluded.dispo,
              reply_id = excluded.reply_id,
              comment_time = excluded.comment_time
            "#,
        )
        .bind(comment_id)
        .bind(dispo.code())
        .bind(reply_id)
        .bind(comment_time)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_dispo_log(
        &self,
        comment_id: &str,
    ) -> Result<Option<DispositionLogEntry>, StorageError> {
        let row = sqlx::query("SELECT * FROM dispo_log WHERE comment_id = ?")
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(dispo_log_from_row).transpose()
    }

    /// Entries whose comment creation time is within the last `max_age_days`
    /// days. The rescan driver filters these to rescannable dispositions.
    pub async fn recent_dispo_logs(
        &self,
        max_age_days: i64,
    ) -> Result<Vec<DispositionLogEntry>, StorageError> {
        let cutoff = (Utc::now() - Duration::days(max_age_days)).timestamp() as f64;

        let rows = sqlx::query("SELECT * FROM dispo_log WHERE comment_time > ?")
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(dispo_log_from_row).collect()
    }

    pub async fn delete_dispo_log(&self, comment_id: &str) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM dispo_log WHERE comment_id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn award_from_row(row: &SqliteRow) -> Result<Award, StorageError> {
    Ok(Award {
        submission_id: row.try_get("submission_id")?,
        submission_title: row.try_get("submission_title")?,
        submission_self_text: row.try_get("submission_self_text")?,
        submission_author: row.try_get("submission_author")?,
        submission_url: row.try_get("submission_url")?,
        submission_time: row.try_get("submission_time")?,
        awarded_comment_id: row.try_get("awarded_comment_id")?,
        awarded_comment_text: row.try_get("awarded_comment_text")?,
        awarded_comment_author: row.try_get("awarded_comment_author")?,
        awarded_comment_url: row.try_get("awarded_comment_url")?,
        awarded_comment_time: row.try_get("awarded_comment_time")?,
        awarding_comment_id: row.try_get("awarding_comment_id")?,
        awarding_comment_text: row.try_get("awarding_comment_text")?,
        awarding_comment_author: row.try_get("awarding_comment_author")?,
        awarding_comment_url: row.try_get("awarding_comment_url")?,
        awarding_comment_time: row.try_get("awarding_comment_time")?,
    })
}

fn dispo_log_from_row(row: &SqliteRow) -> Result<DispositionLogEntry, StorageError> {
    let code: i64 = row.try_get("dispo")?;
    let dispo = Disposition::from_code(code)
        .ok_or_else(|| StorageError::Invalid(format!("unknown disposition code {code}")))?;

    Ok(DispositionLogEntry {
        comment_id: row.try_get("comment_id")?,
        dispo,
        reply_id: row.try_get("reply_id")?,
        comment_time: row.try_get("comment_time")?,
    })
}

fn month_start(year: i32, month: u32) -> Result<f64, StorageError> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .map(|dt| dt.timestamp() as f64)
        .ok_or_else(|| StorageError::Invalid(format!("invalid month: {year}-{month:02}")))
}
