use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;

use super::{Item, ItemKey, KeyValueStore, StoreError};

/// Key-value items kept in a single Postgres table, one row per
/// `(table_name, partition_key, sort_key)`.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for PgStore {
    async fn put_item(&self, table: &str, key: &ItemKey, item: Item) -> Result<(), StoreError> {
        sqlx::query(
            r#"
INSERT INTO kv_items (table_name, partition_key, sort_key, item, updated_at)
VALUES ($1, $2, $3, $4, NOW())
ON CONFLICT (table_name, partition_key, sort_key)
DO UPDATE SET item = EXCLUDED.item, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(table)
        .bind(key.partition())
        .bind(key.sort())
        .bind(Json(Value::Object(item)))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_item(&self, table: &str, key: &ItemKey) -> Result<Option<Item>, StoreError> {
        let row: Option<(Json<Item>,)> = sqlx::query_as(
            r#"
SELECT item FROM kv_items
WHERE table_name = $1 AND partition_key = $2 AND sort_key = $3
            "#,
        )
        .bind(table)
        .bind(key.partition())
        .bind(key.sort())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(item),)| item))
    }
}
