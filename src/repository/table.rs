//! Database table operations and implementations.

use sqlx::SqlitePool;

use crate::entity::IsinSubscriptionModel;
use crate::entity::NewsEventModel;
use crate::repository::error::DatabaseError;

/// Base table struct providing database pool access.
#[derive(Clone)]
pub struct BaseTable {
    pub pool: SqlitePool,
}

impl BaseTable {
    /// Creates a new base table with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Base trait for table operations.
#[async_trait::async_trait]
pub trait TableBase {
    /// Deletes all rows from the table.
    async fn delete_all(&self) -> Result<(), DatabaseError>;
}

/// Trait for insert-only tables guarded by a unique key.
#[async_trait::async_trait]
pub trait Table<T, ID>: TableBase {
    async fn select_all(&self) -> Result<Vec<T>, DatabaseError>;
    async fn select(&self, id: &ID) -> Result<Option<T>, DatabaseError>;
    async fn count(&self) -> Result<i64, DatabaseError>;
    /// Inserts `model` unless a row with the same unique key exists.
    ///
    /// Returns the new row id, or `None` when the row was already present.
    /// Concurrent attempts on the same key persist at most one row.
    async fn insert_if_absent(&self, model: &T) -> Result<Option<ID>, DatabaseError>;
}

macro_rules! impl_table {
    (
        $struct_name:ident,
        $model:ty,
        $table:expr,
        $pk:ident,
        $id_type:ty,
        $cols:expr,
        $vals:expr,
        $unique_key:expr,
        [ $( $field:ident ),+ ]
    ) => {
        #[derive(Clone)]
        pub struct $struct_name {
            base: BaseTable,
        }

        impl $struct_name {
            pub fn new(pool: SqlitePool) -> Self {
                Self {
                    base: BaseTable::new(pool),
                }
            }
        }

        #[async_trait::async_trait]
        impl TableBase for $struct_name {
            async fn delete_all(&self) -> Result<(), DatabaseError> {
                sqlx::query(concat!("DELETE FROM ", $table))
                    .execute(&self.base.pool)
                    .await?;
                Ok(())
            }
        }

        #[async_trait::async_trait]
        impl Table<$model, $id_type> for $struct_name {
            async fn select_all(&self) -> Result<Vec<$model>, DatabaseError> {
                Ok(sqlx::query_as::<_, $model>(concat!(
                    "SELECT * FROM ", $table, " ORDER BY ", stringify!($pk)
                ))
                .fetch_all(&self.base.pool)
                .await?)
            }

            async fn select(&self, id: &$id_type) -> Result<Option<$model>, DatabaseError> {
                Ok(sqlx::query_as::<_, $model>(concat!(
                    "SELECT * FROM ", $table, " WHERE ", stringify!($pk), " = ?"
                ))
                .bind(id)
                .fetch_optional(&self.base.pool)
                .await?)
            }

            async fn count(&self) -> Result<i64, DatabaseError> {
                let row: (i64,) = sqlx::query_as(concat!("SELECT COUNT(*) FROM ", $table))
                    .fetch_one(&self.base.pool)
                    .await?;
                Ok(row.0)
            }

            async fn insert_if_absent(
                &self,
                model: &$model,
            ) -> Result<Option<$id_type>, DatabaseError> {
                let mut query = sqlx::query_as::<_, ($id_type,)>(concat!(
                    "INSERT INTO ", $table, " (", $cols, ") VALUES (", $vals, ") ",
                    "ON CONFLICT(", $unique_key, ") DO NOTHING ",
                    "RETURNING ", stringify!($pk)
                ));

                $(
                    query = query.bind(&model.$field);
                )+

                let row = query.fetch_optional(&self.base.pool).await?;
                Ok(row.map(|r| r.0))
            }
        }
    };
}

// ============================================================================
// NewsEventTable
// ============================================================================

impl_table!(
    NewsEventTable,
    NewsEventModel,
    "news_events",
    id,
    i64,
    "news_id, isin, title, event_type, payment_amount, news_url, published_date, created_at",
    "?, ?, ?, ?, ?, ?, ?, ?",
    "news_id",
    [
        news_id,
        isin,
        title,
        event_type,
        payment_amount,
        news_url,
        published_date,
        created_at
    ]
);

impl NewsEventTable {
    /// Whether a news item with this id was already ingested.
    pub async fn is_tracked(&self, news_id: &str) -> Result<bool, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM news_events WHERE news_id = ?")
            .bind(news_id)
            .fetch_one(&self.base.pool)
            .await?;
        Ok(count.0 > 0)
    }

    /// Persists `model` iff its `news_id` is not tracked yet.
    ///
    /// Returns `true` when this call created the row.
    pub async fn insert_if_new(&self, model: &NewsEventModel) -> Result<bool, DatabaseError> {
        Ok(self.insert_if_absent(model).await?.is_some())
    }

    pub async fn select_by_news_id(
        &self,
        news_id: &str,
    ) -> Result<Option<NewsEventModel>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, NewsEventModel>("SELECT * FROM news_events WHERE news_id = ?")
                .bind(news_id)
                .fetch_optional(&self.base.pool)
                .await?,
        )
    }

    /// Most recently ingested events first.
    pub async fn select_recent(&self, limit: u32) -> Result<Vec<NewsEventModel>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, NewsEventModel>(
                "SELECT * FROM news_events ORDER BY id DESC LIMIT ?",
            )
            .bind(limit)
            .fetch_all(&self.base.pool)
            .await?,
        )
    }
}

// ============================================================================
// IsinSubscriptionTable
// ============================================================================

impl_table!(
    IsinSubscriptionTable,
    IsinSubscriptionModel,
    "isin_subscriptions",
    id,
    i64,
    "subscriber_id, isin, created_at",
    "?, ?, ?",
    "subscriber_id, isin",
    [subscriber_id, isin, created_at]
);

impl IsinSubscriptionTable {
    /// All codes tracked by one subscriber, ordered by code.
    pub async fn select_all_by_subscriber_id(
        &self,
        subscriber_id: i64,
    ) -> Result<Vec<IsinSubscriptionModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, IsinSubscriptionModel>(
            "SELECT * FROM isin_subscriptions WHERE subscriber_id = ? ORDER BY isin",
        )
        .bind(subscriber_id)
        .fetch_all(&self.base.pool)
        .await?)
    }

    /// All subscriptions to the given codes.
    pub async fn select_all_by_isins(
        &self,
        isins: &[&str],
    ) -> Result<Vec<IsinSubscriptionModel>, DatabaseError> {
        if isins.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; isins.len()].join(", ");
        let sql = format!(
            "SELECT * FROM isin_subscriptions WHERE isin IN ({placeholders}) ORDER BY subscriber_id, isin"
        );
        let mut query = sqlx::query_as::<_, IsinSubscriptionModel>(&sql);
        for isin in isins {
            query = query.bind(*isin);
        }
        Ok(query.fetch_all(&self.base.pool).await?)
    }
}
