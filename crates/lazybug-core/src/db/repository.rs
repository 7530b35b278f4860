//! Feedback repository implementation

use crate::error::{Error, Result};
use crate::models::{FeedbackId, FeedbackRecord};
use rusqlite::types::Type;
use rusqlite::{params, Connection};

/// Trait for feedback outbox storage operations
pub trait FeedbackRepository {
    /// Persist a fully formed record
    fn insert(&self, record: &FeedbackRecord) -> Result<()>;

    /// All records still waiting for delivery, oldest first
    fn list_unsynced(&self) -> Result<Vec<FeedbackRecord>>;

    /// Remove a record; missing ids are not an error
    fn delete(&self, id: &FeedbackId) -> Result<()>;

    /// Number of records waiting for delivery
    fn count_unsynced(&self) -> Result<usize>;
}

/// `SQLite` implementation of `FeedbackRepository`
pub struct SqliteFeedbackRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteFeedbackRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a feedback record from a database row
    fn parse_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackRecord> {
        let raw_id: String = row.get(0)?;
        let id = raw_id.parse().map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(error))
        })?;
        Ok(FeedbackRecord {
            id,
            content: row.get(1)?,
            snapshot: row.get(2)?,
            created_at: row.get(3)?,
            meta: row.get(4)?,
        })
    }
}

impl FeedbackRepository for SqliteFeedbackRepository<'_> {
    fn insert(&self, record: &FeedbackRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO feedbacks (id, content, snapshot, created_at, meta) VALUES (?, ?, ?, ?, ?)",
            params![
                record.id.as_str(),
                record.content,
                record.snapshot,
                record.created_at,
                record.meta
            ],
        )?;
        Ok(())
    }

    fn list_unsynced(&self) -> Result<Vec<FeedbackRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, content, snapshot, created_at, meta
             FROM feedbacks
             ORDER BY created_at ASC, id ASC",
        )?;

        let records = stmt
            .query_map([], Self::parse_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn delete(&self, id: &FeedbackId) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM feedbacks WHERE id = ?", params![id.as_str()])?;
        if rows == 0 {
            tracing::debug!("Feedback {} already absent from store", id);
        }
        Ok(())
    }

    fn count_unsynced(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM feedbacks", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| Error::Persistence(format!("Invalid row count {count}")))
    }
}
