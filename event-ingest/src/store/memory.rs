use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Item, ItemKey, KeyValueStore, StoreError};

/// In-process store. Clones share the same contents, so a test can hand one
/// clone to the writer and inspect another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<HashMap<(String, ItemKey), Item>>>,
    // Partition keys whose writes are rejected.
    failing: Arc<Mutex<HashSet<String>>>,
    put_calls: Arc<Mutex<Vec<ItemKey>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every write whose partition key is `partition`.
    pub fn fail_puts_for(&mut self, partition: &str) -> Self {
        lock(&self.failing).insert(partition.to_owned());
        self.clone()
    }

    /// Every key `put_item` was called with, in call order, including rejected ones.
    pub fn put_calls(&self) -> Vec<ItemKey> {
        lock(&self.put_calls).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put_item(&self, table: &str, key: &ItemKey, item: Item) -> Result<(), StoreError> {
        lock(&self.put_calls).push(key.clone());

        if lock(&self.failing).contains(key.partition()) {
            return Err(StoreError::Rejected(format!(
                "write to {table} refused for {}",
                key.partition()
            )));
        }

        lock(&self.items).insert((table.to_owned(), key.clone()), item);
        Ok(())
    }

    async fn get_item(&self, table: &str, key: &ItemKey) -> Result<Option<Item>, StoreError> {
        Ok(lock(&self.items)
            .get(&(table.to_owned(), key.clone()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn item(venue: &str) -> Item {
        let mut item = Item::new();
        item.insert("VenueName".to_owned(), Value::from(venue));
        item
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::new();
        let key = ItemKey::new("E1", "Ottawa").unwrap();

        store.put_item("events", &key, item("Hall A")).await.unwrap();

        assert_eq!(
            store.get_item("events", &key).await.unwrap(),
            Some(item("Hall A"))
        );
        assert_eq!(store.get_item("other", &key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let store = MemoryStore::new();
        let key = ItemKey::new("E1", "Ottawa").unwrap();

        store.put_item("events", &key, item("Hall A")).await.unwrap();
        store.put_item("events", &key, item("Hall B")).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get_item("events", &key).await.unwrap(),
            Some(item("Hall B"))
        );
    }

    #[tokio::test]
    async fn test_same_id_different_city_is_a_different_item() {
        let store = MemoryStore::new();

        store
            .put_item("events", &ItemKey::new("E1", "Ottawa").unwrap(), item("Hall A"))
            .await
            .unwrap();
        store
            .put_item("events", &ItemKey::new("E1", "Toronto").unwrap(), item("Hall A"))
            .await
            .unwrap();

        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_partition_is_rejected_and_recorded() {
        let store = MemoryStore::new().fail_puts_for("E2");
        let key = ItemKey::new("E2", "Ottawa").unwrap();

        let err = store
            .put_item("events", &key, item("Hall A"))
            .await
            .expect_err("write should be rejected");

        assert!(matches!(err, StoreError::Rejected(_)));
        assert!(store.is_empty());
        assert_eq!(store.put_calls(), vec![key]);
    }
}
