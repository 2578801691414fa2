//! SQLite queue backend for pairlink-relay.

use super::QueueLimits;
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use pairlink_client::{QueueBackend, QueueError};
use pairlink_types::QueueName;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// SQLite-based queue storage.
///
/// Uses WAL mode for concurrent reads/writes. Messages are ordered by
/// their row id, so a single writer's enqueues come back in issuance order.
#[derive(Clone)]
pub struct SqliteQueue {
    pool: SqlitePool,
    limits: QueueLimits,
}

impl SqliteQueue {
    /// Open (or create) a queue database at `path`.
    pub async fn new(path: &Path, limits: QueueLimits) -> StorageResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        let queue = Self { pool, limits };
        queue.run_migrations().await?;
        tracing::debug!(path = %path.display(), "queue database ready");
        Ok(queue)
    }

    /// Create an in-memory queue database (for testing).
    pub async fn in_memory(limits: QueueLimits) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(":memory:")?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        // One connection: every pooled connection would get its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let queue = Self { pool, limits };
        queue.run_migrations().await?;
        Ok(queue)
    }

    async fn run_migrations(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS queues (
                name TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                queue TEXT NOT NULL REFERENCES queues(name),
                body TEXT NOT NULL,
                enqueued_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_queue_id ON messages(queue, id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_expires ON messages(expires_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete expired messages across all queues.
    ///
    /// Returns the number of messages removed.
    pub async fn cleanup_expired(&self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM messages WHERE expires_at <= ?1")
            .bind(Self::current_timestamp())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Number of unexpired messages waiting in a queue.
    pub async fn depth(&self, name: &QueueName) -> StorageResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE queue = ?1 AND expires_at > ?2")
                .bind(name.as_str())
                .bind(Self::current_timestamp())
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }

    async fn queue_exists(&self, name: &QueueName) -> StorageResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM queues WHERE name = ?1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Retention beyond the `i64` range saturates to "never expires".
    fn expiry_after(now: i64, retention_secs: u64) -> i64 {
        now.saturating_add(i64::try_from(retention_secs).unwrap_or(i64::MAX))
    }

    fn current_timestamp() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl QueueBackend for SqliteQueue {
    async fn create_queue(&self, name: &QueueName) -> Result<(), QueueError> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO queues (name, created_at) VALUES (?1, ?2)")
                .bind(name.as_str())
                .bind(Self::current_timestamp())
                .execute(&self.pool)
                .await
                .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            tracing::debug!(queue = %name, "queue already exists");
        } else {
            tracing::info!(queue = %name, "queue created");
        }
        Ok(())
    }

    async fn enqueue(&self, name: &QueueName, payload: &str) -> Result<(), QueueError> {
        if payload.len() > self.limits.max_payload_size {
            return Err(QueueError::PayloadTooLarge {
                size: payload.len(),
                limit: self.limits.max_payload_size,
            });
        }

        let now = Self::current_timestamp();
        let expires_at = Self::expiry_after(now, self.limits.retention_secs);

        // Insert only into queues that exist, in one statement.
        let result = sqlx::query(
            r#"
            INSERT INTO messages (queue, body, enqueued_at, expires_at)
            SELECT ?1, ?2, ?3, ?4
            WHERE EXISTS (SELECT 1 FROM queues WHERE name = ?1)
            "#,
        )
        .bind(name.as_str())
        .bind(payload)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(QueueError::NotFound(name.clone()));
        }
        Ok(())
    }

    async fn receive_and_delete_all(&self, name: &QueueName) -> Result<Vec<String>, QueueError> {
        if !self.queue_exists(name).await? {
            return Err(QueueError::NotFound(name.clone()));
        }

        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, body
            FROM messages
            WHERE queue = ?1 AND expires_at > ?2
            ORDER BY id ASC
            LIMIT ?3
            "#,
        )
        .bind(name.as_str())
        .bind(Self::current_timestamp())
        .bind(i64::from(self.limits.max_batch))
        .fetch_all(&mut *tx)
        .await
        .map_err(StorageError::from)?;

        if let Some(last) = rows.last() {
            // Everything at or below the last returned id is either in this
            // batch or already expired.
            sqlx::query("DELETE FROM messages WHERE queue = ?1 AND id <= ?2")
                .bind(name.as_str())
                .bind(last.id)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
        }

        tx.commit().await.map_err(StorageError::from)?;

        tracing::debug!(queue = %name, count = rows.len(), "received batch");
        Ok(rows.into_iter().map(|row| row.body).collect())
    }
}

/// Internal row type for SQLite queries.
#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(name: &str) -> QueueName {
        QueueName::new(name).unwrap()
    }

    fn limits() -> QueueLimits {
        QueueLimits {
            max_payload_size: 64,
            max_batch: 10,
            retention_secs: 3600,
        }
    }

    async fn store() -> SqliteQueue {
        SqliteQueue::in_memory(limits()).await.unwrap()
    }

    // ===========================================
    // Queue Lifecycle Tests
    // ===========================================

    #[tokio::test]
    async fn create_is_idempotent() {
        let store = store().await;
        let name = queue("pair-send");

        store.create_queue(&name).await.unwrap();
        store.enqueue(&name, "first").await.unwrap();
        store.create_queue(&name).await.unwrap();

        assert_eq!(store.depth(&name).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn enqueue_to_missing_queue_fails() {
        let store = store().await;
        let result = store.enqueue(&queue("nowhere"), "data").await;
        assert!(matches!(result, Err(QueueError::NotFound(_))));
    }

    #[tokio::test]
    async fn receive_from_missing_queue_fails() {
        let store = store().await;
        let result = store.receive_and_delete_all(&queue("nowhere")).await;
        assert!(matches!(result, Err(QueueError::NotFound(_))));
    }

    #[tokio::test]
    async fn oversized_payload_rejected() {
        let store = store().await;
        let name = queue("pair-send");
        store.create_queue(&name).await.unwrap();

        let result = store.enqueue(&name, &"x".repeat(65)).await;
        assert!(matches!(
            result,
            Err(QueueError::PayloadTooLarge {
                size: 65,
                limit: 64
            })
        ));
        assert_eq!(store.depth(&name).await.unwrap(), 0);
    }

    // ===========================================
    // Receive Tests
    // ===========================================

    #[tokio::test]
    async fn receive_returns_issuance_order_and_deletes() {
        let store = store().await;
        let name = queue("pair-send");
        store.create_queue(&name).await.unwrap();

        for body in ["one", "two", "three"] {
            store.enqueue(&name, body).await.unwrap();
        }

        let batch = store.receive_and_delete_all(&name).await.unwrap();
        assert_eq!(batch, vec!["one", "two", "three"]);
        assert!(store.receive_and_delete_all(&name).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn receive_is_bounded_by_batch_size() {
        let store = SqliteQueue::in_memory(QueueLimits {
            max_batch: 2,
            ..limits()
        })
        .await
        .unwrap();
        let name = queue("pair-send");
        store.create_queue(&name).await.unwrap();

        for i in 0..5 {
            store.enqueue(&name, &format!("m{i}")).await.unwrap();
        }

        assert_eq!(store.receive_and_delete_all(&name).await.unwrap(), vec!["m0", "m1"]);
        assert_eq!(store.receive_and_delete_all(&name).await.unwrap(), vec!["m2", "m3"]);
        assert_eq!(store.receive_and_delete_all(&name).await.unwrap(), vec!["m4"]);
    }

    #[tokio::test]
    async fn queues_are_isolated() {
        let store = store().await;
        let a = queue("pair-a");
        let b = queue("pair-b");
        store.create_queue(&a).await.unwrap();
        store.create_queue(&b).await.unwrap();

        store.enqueue(&a, "for a").await.unwrap();
        store.enqueue(&b, "for b").await.unwrap();

        assert_eq!(store.receive_and_delete_all(&a).await.unwrap(), vec!["for a"]);
        assert_eq!(store.depth(&b).await.unwrap(), 1);
    }

    // ===========================================
    // Expiry Tests
    // ===========================================

    #[tokio::test]
    async fn expired_messages_are_not_returned() {
        let store = SqliteQueue::in_memory(QueueLimits {
            retention_secs: 0,
            ..limits()
        })
        .await
        .unwrap();
        let name = queue("pair-send");
        store.create_queue(&name).await.unwrap();
        store.enqueue(&name, "stale").await.unwrap();

        assert!(store.receive_and_delete_all(&name).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn huge_retention_never_expires() {
        let store = SqliteQueue::in_memory(QueueLimits {
            retention_secs: u64::MAX,
            ..limits()
        })
        .await
        .unwrap();
        let name = queue("pair-send");
        store.create_queue(&name).await.unwrap();
        store.enqueue(&name, "aGVsbG8=").await.unwrap();

        assert_eq!(store.cleanup_expired().await.unwrap(), 0);
        assert_eq!(
            store.receive_and_delete_all(&name).await.unwrap(),
            vec!["aGVsbG8="]
        );
    }

    #[test]
    fn expiry_saturates() {
        assert_eq!(SqliteQueue::expiry_after(100, 60), 160);
        assert_eq!(SqliteQueue::expiry_after(100, u64::MAX), i64::MAX);
        assert_eq!(SqliteQueue::expiry_after(100, i64::MAX as u64), i64::MAX);
    }

    #[tokio::test]
    async fn cleanup_removes_expired() {
        let store = SqliteQueue::in_memory(QueueLimits {
            retention_secs: 0,
            ..limits()
        })
        .await
        .unwrap();
        let name = queue("pair-send");
        store.create_queue(&name).await.unwrap();
        store.enqueue(&name, "stale").await.unwrap();
        store.enqueue(&name, "staler").await.unwrap();

        assert_eq!(store.cleanup_expired().await.unwrap(), 2);
        assert_eq!(store.cleanup_expired().await.unwrap(), 0);
    }

    // ===========================================
    // Durability Tests
    // ===========================================

    #[tokio::test]
    async fn messages_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queues.db");
        let name = queue("pair-send");

        {
            let store = SqliteQueue::new(&path, limits()).await.unwrap();
            store.create_queue(&name).await.unwrap();
            store.enqueue(&name, "persisted").await.unwrap();
        }

        let store = SqliteQueue::new(&path, limits()).await.unwrap();
        assert_eq!(
            store.receive_and_delete_all(&name).await.unwrap(),
            vec!["persisted"]
        );
    }
}
