//! SQLite Record Store
//!
//! Durable storage for items and review plans. Separate reader/writer
//! connections behind mutexes give interior mutability: all methods take
//! `&self`, so callers can share a `PracticeStore` via `Arc` without an
//! outer lock. The single writer connection also serializes concurrent
//! engine write operations, which is what keeps item aggregates free of
//! lost updates.
//!
//! Writes go through [`WriteBatch`]: every engine operation commits all of
//! its entity mutations as one SQLite transaction, so a failure mid-way
//! rolls back to the pre-call state. Operations that must read current
//! state before writing use [`PracticeStore::commit_with`], which performs
//! the read inside the writer transaction: a reader-connection read
//! followed by a separate commit would let two concurrent writers fold
//! their updates from the same stale snapshot.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::practice::{Confidence, IntervalLevel, Item, PlanStatus, ReviewPlan};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Record store error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Entity not found
    #[error("Entity not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Record store result type
pub type Result<T> = std::result::Result<T, StoreError>;

// ============================================================================
// WRITE BATCH
// ============================================================================

/// One entity mutation inside a [`WriteBatch`]
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Insert or update an item
    PutItem(Item),
    /// Insert or update a review plan
    PutPlan(ReviewPlan),
}

/// All entity mutations of one engine operation, committed atomically
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an item upsert
    pub fn put_item(mut self, item: Item) -> Self {
        self.ops.push(WriteOp::PutItem(item));
        self
    }

    /// Queue a plan upsert
    pub fn put_plan(mut self, plan: ReviewPlan) -> Self {
        self.ops.push(WriteOp::PutPlan(plan));
        self
    }

    /// Number of queued mutations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// ============================================================================
// WRITER VIEW
// ============================================================================

/// Read access over the writer connection inside
/// [`PracticeStore::commit_with`].
///
/// Reads through the view see every previously committed write and cannot
/// be interleaved with another writer's commit.
pub struct WriterView<'a> {
    conn: &'a Connection,
}

impl WriterView<'_> {
    /// Get an item by ID
    pub fn get_item(&self, id: &str) -> Result<Option<Item>> {
        PracticeStore::query_item(self.conn, id)
    }

    /// Get a plan by ID
    pub fn get_plan(&self, id: &str) -> Result<Option<ReviewPlan>> {
        PracticeStore::query_plan(self.conn, id)
    }
}

// ============================================================================
// STORE
// ============================================================================

/// SQLite-backed record store for items and review plans
pub struct PracticeStore {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl PracticeStore {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Create a new store instance.
    ///
    /// With `None` the database lands in the platform data directory
    /// (owner-only permissions on Unix).
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "grind", "core").ok_or_else(|| {
                    StoreError::Init("Could not determine project directories".to_string())
                })?;

                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o700);
                    let _ = std::fs::set_permissions(data_dir, perms);
                }
                data_dir.join("grind.db")
            }
        };

        let writer_conn = Connection::open(&path)?;

        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Commit a batch of entity mutations as one transaction.
    ///
    /// Either every mutation lands or none does; on error the database is
    /// rolled back to the pre-call state.
    pub fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Init("Writer lock poisoned".into()))?;
        let tx = writer.transaction()?;

        for op in &batch.ops {
            match op {
                WriteOp::PutItem(item) => Self::upsert_item(&tx, item)?,
                WriteOp::PutPlan(plan) => Self::upsert_plan(&tx, plan)?,
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Read-modify-write under the writer lock.
    ///
    /// `f` reads current state through the [`WriterView`] and returns the
    /// batch to commit plus a value handed back to the caller. Read and
    /// commit happen inside one transaction on the writer connection, so
    /// two concurrent callers cannot both act on the same stale state.
    /// Returning an error from `f` rolls back and commits nothing.
    pub fn commit_with<T>(
        &self,
        f: impl FnOnce(&WriterView<'_>) -> Result<(WriteBatch, T)>,
    ) -> Result<T> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Init("Writer lock poisoned".into()))?;
        let tx = writer.transaction()?;

        let (batch, value) = f(&WriterView { conn: &*tx })?;

        for op in &batch.ops {
            match op {
                WriteOp::PutItem(item) => Self::upsert_item(&tx, item)?,
                WriteOp::PutPlan(plan) => Self::upsert_plan(&tx, plan)?,
            }
        }

        tx.commit()?;
        Ok(value)
    }

    fn upsert_item(conn: &Connection, item: &Item) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO items (
                id, title, category,
                mastery, total_reviews, average_score, streak_count, longest_streak,
                last_practiced_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                item.id,
                item.title,
                item.category,
                item.mastery,
                item.total_reviews,
                item.average_score,
                item.streak_count,
                item.longest_streak,
                item.last_practiced_at.map(|dt| dt.to_rfc3339()),
                item.created_at.to_rfc3339(),
                item.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn upsert_plan(conn: &Connection, plan: &ReviewPlan) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO review_plans (
                id, item_id, status,
                interval_level, ease_factor, difficulty_adjustment,
                scheduled_at, score, confidence, time_spent_secs, completed_at,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                plan.id,
                plan.item_id,
                plan.status.as_str(),
                plan.interval_level.ordinal(),
                plan.ease_factor,
                plan.difficulty_adjustment,
                plan.scheduled_at.to_rfc3339(),
                plan.score,
                plan.confidence.map(|c| c.as_str()),
                plan.time_spent_secs,
                plan.completed_at.map(|dt| dt.to_rfc3339()),
                plan.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ========================================================================
    // READS
    // ========================================================================

    fn query_item(conn: &Connection, id: &str) -> Result<Option<Item>> {
        let mut stmt = conn.prepare("SELECT * FROM items WHERE id = ?1")?;
        let item = stmt
            .query_row(params![id], |row| Self::row_to_item(row))
            .optional()?;
        Ok(item)
    }

    fn query_plan(conn: &Connection, id: &str) -> Result<Option<ReviewPlan>> {
        let mut stmt = conn.prepare("SELECT * FROM review_plans WHERE id = ?1")?;
        let plan = stmt
            .query_row(params![id], |row| Self::row_to_plan(row))
            .optional()?;
        Ok(plan)
    }

    /// Get an item by ID
    pub fn get_item(&self, id: &str) -> Result<Option<Item>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        Self::query_item(&reader, id)
    }

    /// Get a plan by ID
    pub fn get_plan(&self, id: &str) -> Result<Option<ReviewPlan>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        Self::query_plan(&reader, id)
    }

    /// All items
    pub fn items(&self) -> Result<Vec<Item>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare("SELECT * FROM items ORDER BY created_at ASC, id ASC")?;

        let rows = stmt.query_map([], |row| Self::row_to_item(row))?;
        let mut result = Vec::new();
        for item in rows {
            result.push(item?);
        }
        Ok(result)
    }

    /// All pending plans, ascending by scheduled time.
    ///
    /// Ties break on ID so two consecutive reads return identical order.
    pub fn pending_plans(&self) -> Result<Vec<ReviewPlan>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM review_plans
             WHERE status = 'pending'
             ORDER BY scheduled_at ASC, id ASC",
        )?;

        let rows = stmt.query_map([], |row| Self::row_to_plan(row))?;
        let mut result = Vec::new();
        for plan in rows {
            result.push(plan?);
        }
        Ok(result)
    }

    /// Pending plans of one item, ascending by scheduled time
    pub fn pending_plans_for_item(&self, item_id: &str) -> Result<Vec<ReviewPlan>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM review_plans
             WHERE status = 'pending' AND item_id = ?1
             ORDER BY scheduled_at ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![item_id], |row| Self::row_to_plan(row))?;
        let mut result = Vec::new();
        for plan in rows {
            result.push(plan?);
        }
        Ok(result)
    }

    /// Full plan history of one item, oldest first
    pub fn plans_for_item(&self, item_id: &str) -> Result<Vec<ReviewPlan>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM review_plans
             WHERE item_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![item_id], |row| Self::row_to_plan(row))?;
        let mut result = Vec::new();
        for plan in rows {
            result.push(plan?);
        }
        Ok(result)
    }

    /// (category, score) of every completed plan, for category calibration.
    /// Orphaned plans (no surviving item row) are excluded by the join.
    pub fn completed_plan_scores(&self) -> Result<Vec<(String, i32)>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT i.category, p.score FROM review_plans p
             JOIN items i ON p.item_id = i.id
             WHERE p.status = 'completed' AND p.score IS NOT NULL",
        )?;

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut result = Vec::new();
        for pair in rows {
            result.push(pair?);
        }
        Ok(result)
    }

    /// Pending plans belonging to items in one category
    pub fn pending_plans_in_category(&self, category: &str) -> Result<Vec<ReviewPlan>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT p.* FROM review_plans p
             JOIN items i ON p.item_id = i.id
             WHERE p.status = 'pending' AND i.category = ?1
             ORDER BY p.scheduled_at ASC, p.id ASC",
        )?;

        let rows = stmt.query_map(params![category], |row| Self::row_to_plan(row))?;
        let mut result = Vec::new();
        for plan in rows {
            result.push(plan?);
        }
        Ok(result)
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    /// Parse RFC3339 timestamp
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Invalid {} timestamp '{}': {}", field_name, value, e),
                    )),
                )
            })
    }

    fn parse_optional_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
        value.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })
    }

    fn conversion_error(message: String) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
        )
    }

    /// Convert a row to Item
    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;
        let last_practiced_at: Option<String> = row.get("last_practiced_at")?;

        Ok(Item {
            id: row.get("id")?,
            title: row.get("title")?,
            category: row.get("category")?,
            mastery: row.get("mastery")?,
            total_reviews: row.get("total_reviews")?,
            average_score: row.get("average_score")?,
            streak_count: row.get("streak_count")?,
            longest_streak: row.get("longest_streak")?,
            last_practiced_at: Self::parse_optional_timestamp(last_practiced_at),
            created_at: Self::parse_timestamp(&created_at, "created_at")?,
            updated_at: Self::parse_timestamp(&updated_at, "updated_at")?,
        })
    }

    /// Convert a row to ReviewPlan
    fn row_to_plan(row: &rusqlite::Row) -> rusqlite::Result<ReviewPlan> {
        let status_raw: String = row.get("status")?;
        let status = PlanStatus::parse_name(&status_raw)
            .ok_or_else(|| Self::conversion_error(format!("Unknown plan status '{status_raw}'")))?;

        let level_raw: u8 = row.get("interval_level")?;
        let interval_level = IntervalLevel::from_ordinal(level_raw).ok_or_else(|| {
            Self::conversion_error(format!("Interval level {level_raw} outside ladder"))
        })?;

        let confidence: Option<String> = row.get("confidence")?;
        let confidence = confidence.as_deref().and_then(Confidence::parse_name);

        let scheduled_at: String = row.get("scheduled_at")?;
        let created_at: String = row.get("created_at")?;
        let completed_at: Option<String> = row.get("completed_at")?;

        Ok(ReviewPlan {
            id: row.get("id")?,
            item_id: row.get("item_id")?,
            status,
            interval_level,
            ease_factor: row.get("ease_factor")?,
            difficulty_adjustment: row.get("difficulty_adjustment")?,
            scheduled_at: Self::parse_timestamp(&scheduled_at, "scheduled_at")?,
            score: row.get("score")?,
            confidence,
            time_spent_secs: row.get("time_spent_secs")?,
            completed_at: Self::parse_optional_timestamp(completed_at),
            created_at: Self::parse_timestamp(&created_at, "created_at")?,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
