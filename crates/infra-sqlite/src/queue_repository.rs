// SQLite QueueRepository Implementation

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use waitline_core::domain::{Consumer, NewStore, Position, Store};
use waitline_core::error::{AppError, Result};
use waitline_core::port::{IdProvider, QueueRepository};

/// Default bound on a single repository call
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(10);

// SQLite primary result codes
const SQLITE_BUSY: i32 = 5;
const SQLITE_FULL: i32 = 13;

/// Primary result code of a (possibly extended) SQLite code string.
/// Extended codes keep the primary code in their low byte (517 -> 5).
fn primary_code(code: &str) -> Option<i32> {
    code.parse::<i32>().ok().map(|c| c & 0xff)
}

// Helper to convert sqlx::Error to AppError with structured information
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            match code.as_deref().and_then(primary_code) {
                Some(SQLITE_BUSY) => AppError::Database(format!(
                    "Database locked (SQLITE_BUSY): {}",
                    db_err.message()
                )),
                Some(SQLITE_FULL) => {
                    AppError::Database(format!("Database full: {}", db_err.message()))
                }
                _ => AppError::Database(format!(
                    "Database error [{}]: {}",
                    code.as_deref().unwrap_or("?"),
                    db_err.message()
                )),
            }
        }
        sqlx::Error::PoolTimedOut => {
            AppError::Timeout("timed out acquiring a database connection".to_string())
        }
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        // Connection, pool, protocol errors
        _ => AppError::Database(err.to_string()),
    }
}

/// Constraint a failed write tripped over
#[derive(Debug, PartialEq, Eq)]
enum Violation {
    StoreName,
    ConsumerPhone,
    MissingStore,
}

fn violation(err: &sqlx::Error) -> Option<Violation> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    let message = db_err.message();
    match db_err.kind() {
        sqlx::error::ErrorKind::UniqueViolation if message.contains("stores.name") => {
            Some(Violation::StoreName)
        }
        sqlx::error::ErrorKind::UniqueViolation if message.contains("consumers.phone") => {
            Some(Violation::ConsumerPhone)
        }
        sqlx::error::ErrorKind::ForeignKeyViolation => Some(Violation::MissingStore),
        _ => None,
    }
}

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: String,
    name: String,
    access_url: String,
    created_at: i64,
}

impl StoreRow {
    fn into_store(self) -> Store {
        Store {
            id: self.id,
            name: self.name,
            access_url: self.access_url,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ConsumerRow {
    name: String,
    phone: String,
    access_key: String,
    status: String,
    enqueued_at: i64,
}

impl ConsumerRow {
    fn into_consumer(self) -> Consumer {
        Consumer {
            name: self.name,
            phone: self.phone,
            access_key: self.access_key,
            status: self.status,
            enqueued_at: self.enqueued_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RankedConsumerRow {
    position: i64,
    #[sqlx(flatten)]
    consumer: ConsumerRow,
}

impl RankedConsumerRow {
    fn into_ranked(self) -> Result<(Position, Consumer)> {
        let position = Position::try_from(self.position)
            .map_err(|_| AppError::Internal(format!("negative position {}", self.position)))?;
        Ok((position, self.consumer.into_consumer()))
    }
}

// Position = number of consumers of the same store enqueued earlier. Computed
// inside the same statement as the lookup so it reflects one snapshot.
const RANKED_COLUMNS: &str = r#"
    (SELECT COUNT(*) FROM consumers p WHERE p.store_id = c.store_id AND p.seq < c.seq) AS position,
    c.name, c.phone, c.access_key, c.status, c.enqueued_at
"#;

pub struct SqliteQueueRepository {
    pool: SqlitePool,
    id_provider: Arc<dyn IdProvider>,
    op_timeout: Duration,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool, id_provider: Arc<dyn IdProvider>) -> Self {
        Self {
            pool,
            id_provider,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Run `fut`, surfacing an expired deadline as `AppError::Timeout`
    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| AppError::Timeout(format!("{} exceeded {:?}", op, self.op_timeout)))?
    }

    async fn store_exists(&self, id: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM stores WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(found.is_some())
    }

    /// NotFound for a consumer miss, naming the store when it is the store
    /// that is missing
    async fn consumer_miss(&self, store_id: &str, phone: &str) -> AppError {
        match self.store_exists(store_id).await {
            Ok(false) => AppError::store_not_found(store_id),
            Ok(true) => AppError::consumer_not_found(store_id, phone),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn create_store(&self, store: NewStore) -> Result<Store> {
        self.bounded("create_store", async {
            let store = store.into_store(self.id_provider.generate_id());

            sqlx::query(
                "INSERT INTO stores (id, name, access_url, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&store.id)
            .bind(&store.name)
            .bind(&store.access_url)
            .bind(store.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match violation(&e) {
                Some(Violation::StoreName) => AppError::AlreadyExists(format!(
                    "store with name {} already registered",
                    store.name
                )),
                _ => map_sqlx_error(e),
            })?;

            Ok(store)
        })
        .await
    }

    async fn remove_store(&self, id: &str) -> Result<()> {
        self.bounded("remove_store", async {
            // consumers go with it (ON DELETE CASCADE)
            let result = sqlx::query("DELETE FROM stores WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

            if result.rows_affected() == 0 {
                return Err(AppError::store_not_found(id));
            }
            Ok(())
        })
        .await
    }

    async fn get_store(&self, name: &str) -> Result<Store> {
        self.bounded("get_store", async {
            sqlx::query_as::<_, StoreRow>(
                "SELECT id, name, access_url, created_at FROM stores WHERE name = ?",
            )
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(StoreRow::into_store)
            .ok_or_else(|| AppError::store_not_found(name))
        })
        .await
    }

    async fn get_store_by_id(&self, id: &str) -> Result<Store> {
        self.bounded("get_store_by_id", async {
            sqlx::query_as::<_, StoreRow>(
                "SELECT id, name, access_url, created_at FROM stores WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(StoreRow::into_store)
            .ok_or_else(|| AppError::store_not_found(id))
        })
        .await
    }

    async fn list_store_names(&self) -> Result<Vec<String>> {
        self.bounded("list_store_names", async {
            sqlx::query_scalar("SELECT name FROM stores ORDER BY seq")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)
        })
        .await
    }

    async fn add_consumer(&self, store_id: &str, consumer: Consumer) -> Result<()> {
        self.bounded("add_consumer", async {
            sqlx::query(
                r#"
                INSERT INTO consumers (store_id, name, phone, access_key, status, enqueued_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(store_id)
            .bind(&consumer.name)
            .bind(&consumer.phone)
            .bind(&consumer.access_key)
            .bind(&consumer.status)
            .bind(consumer.enqueued_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match violation(&e) {
                Some(Violation::MissingStore) => AppError::store_not_found(store_id),
                Some(Violation::ConsumerPhone) => AppError::InvalidArgument(format!(
                    "phone {} already in queue of store {}",
                    consumer.phone, store_id
                )),
                _ => map_sqlx_error(e),
            })?;

            Ok(())
        })
        .await
    }

    async fn remove_consumer(&self, store_id: &str, phone: &str) -> Result<()> {
        self.bounded("remove_consumer", async {
            let result = sqlx::query("DELETE FROM consumers WHERE store_id = ? AND phone = ?")
                .bind(store_id)
                .bind(phone)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

            if result.rows_affected() == 0 {
                return Err(self.consumer_miss(store_id, phone).await);
            }
            Ok(())
        })
        .await
    }

    async fn get_consumer(&self, store_id: &str, phone: &str) -> Result<(Position, Consumer)> {
        self.bounded("get_consumer", async {
            let sql = format!(
                "SELECT {} FROM consumers c WHERE c.store_id = ? AND c.phone = ?",
                RANKED_COLUMNS
            );
            let row = sqlx::query_as::<_, RankedConsumerRow>(&sql)
                .bind(store_id)
                .bind(phone)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

            match row {
                Some(row) => row.into_ranked(),
                None => Err(self.consumer_miss(store_id, phone).await),
            }
        })
        .await
    }

    async fn get_all_consumers(&self, store_id: &str) -> Result<Vec<Consumer>> {
        self.bounded("get_all_consumers", async {
            // Read transaction: existence check and listing share one snapshot
            let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM stores WHERE id = ?")
                .bind(store_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            if exists.is_none() {
                return Err(AppError::store_not_found(store_id));
            }

            let rows = sqlx::query_as::<_, ConsumerRow>(
                r#"
                SELECT name, phone, access_key, status, enqueued_at
                FROM consumers
                WHERE store_id = ?
                ORDER BY seq
                "#,
            )
            .bind(store_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

            tx.commit().await.map_err(map_sqlx_error)?;

            Ok(rows.into_iter().map(ConsumerRow::into_consumer).collect())
        })
        .await
    }

    async fn validate_consumer(
        &self,
        store_name: &str,
        access_key: &str,
    ) -> Result<(Position, Consumer)> {
        self.bounded("validate_consumer", async {
            // Keys are not unique; the earliest enqueued holder wins
            let sql = format!(
                r#"
                SELECT {}
                FROM consumers c
                JOIN stores s ON s.id = c.store_id
                WHERE s.name = ? AND c.access_key = ?
                ORDER BY c.seq
                LIMIT 1
                "#,
                RANKED_COLUMNS
            );
            let row = sqlx::query_as::<_, RankedConsumerRow>(&sql)
                .bind(store_name)
                .bind(access_key)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

            match row {
                Some(row) => row.into_ranked(),
                None => Err(AppError::NotFound(format!(
                    "access key not valid for {}",
                    store_name
                ))),
            }
        })
        .await
    }
}
