use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// An item as the store holds it: a flat map of attribute name to value.
pub type Item = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("item key needs a non-empty partition key")]
    EmptyPartitionKey,
    #[error("failed to marshal item: {0}")]
    Marshal(#[from] serde_json::Error),
    #[error("item did not marshal to an attribute map")]
    NotAnAttributeMap,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to run store migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("store rejected the write: {0}")]
    Rejected(String),
}

/// Composite primary key of an item within one table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    partition: String,
    sort: String,
}

impl ItemKey {
    pub fn new(partition: impl Into<String>, sort: impl Into<String>) -> Result<Self, StoreError> {
        let partition = partition.into();
        if partition.is_empty() {
            return Err(StoreError::EmptyPartitionKey);
        }

        Ok(Self {
            partition,
            sort: sort.into(),
        })
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn sort(&self) -> &str {
        &self.sort
    }
}

/// Marshal any serializable struct into its attribute map.
pub fn to_item<T: Serialize>(value: &T) -> Result<Item, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(attributes) => Ok(attributes),
        _ => Err(StoreError::NotAnAttributeMap),
    }
}

/// A durable key-value store. `put_item` is an upsert: writing an existing key
/// replaces the prior item.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn put_item(&self, table: &str, key: &ItemKey, item: Item) -> Result<(), StoreError>;

    async fn get_item(&self, table: &str, key: &ItemKey) -> Result<Option<Item>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Attributes {
        #[serde(rename = "Name")]
        name: &'static str,
    }

    #[test]
    fn test_item_key_requires_partition() {
        assert!(matches!(
            ItemKey::new("", "Ottawa"),
            Err(StoreError::EmptyPartitionKey)
        ));

        let key = ItemKey::new("E1", "").unwrap();
        assert_eq!(key.partition(), "E1");
        assert_eq!(key.sort(), "");
    }

    #[test]
    fn test_to_item() {
        let item = to_item(&Attributes { name: "Hall A" }).unwrap();

        assert_eq!(item.get("Name"), Some(&Value::from("Hall A")));
    }

    #[test]
    fn test_to_item_rejects_non_maps() {
        assert!(matches!(
            to_item(&vec![1, 2, 3]),
            Err(StoreError::NotAnAttributeMap)
        ));
    }
}
