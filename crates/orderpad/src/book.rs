//! The order list manager.
//!
//! [`OrderBook`] owns the in-memory ordered sequence of order records and
//! the key-value store it is persisted to. Every mutation serializes the
//! full sequence, writes it to the store, and commits the new sequence to
//! memory only once the write has been acknowledged.

use tracing::{debug, warn};

use crate::error::Result;
use crate::order::OrderRecord;
use crate::store::KvStore;

/// The store key the order list is persisted under.
///
/// Inherited from the application this tool replaces; changing it would
/// orphan existing data.
pub const ORDERS_KEY: &str = "clientes";

/// Ordered list of customer orders, kept in sync with a key-value store.
///
/// Records are addressed by position. The in-memory sequence and the stored
/// blob match after every successful mutation; a failed write leaves memory
/// unchanged and surfaces the error to the caller.
#[derive(Debug)]
pub struct OrderBook {
    /// The current ordered sequence.
    records: Vec<OrderRecord>,
    /// Persistence collaborator; this book is the sole user of [`ORDERS_KEY`].
    store: Box<dyn KvStore>,
}

impl OrderBook {
    /// Create an empty book on top of the given store.
    #[must_use]
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self {
            records: Vec::new(),
            store,
        }
    }

    /// Load the persisted order list, replacing in-memory state.
    ///
    /// A missing key leaves the book as it was. Read or decode failures are
    /// logged and otherwise swallowed: the book keeps whatever it held
    /// before the call, and the next successful mutation rewrites the
    /// stored blob.
    pub async fn hydrate(&mut self) {
        match self.store.get(ORDERS_KEY).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<OrderRecord>>(&bytes) {
                Ok(records) => {
                    debug!("Loaded {} orders from store", records.len());
                    self.records = records;
                }
                Err(e) => warn!("Failed to decode stored order list: {e}"),
            },
            Ok(None) => debug!("No stored order list found"),
            Err(e) => warn!("Failed to read order list from store: {e}"),
        }
    }

    /// Append an order to the end of the list and persist the new sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails; the
    /// in-memory list is unchanged in that case.
    pub async fn add(&mut self, record: OrderRecord) -> Result<()> {
        let mut next = self.records.clone();
        next.push(record);
        self.commit(next).await
    }

    /// Remove the order at `index`, preserving the relative order of the
    /// remaining records.
    ///
    /// Returns `true` if a record was removed, `false` (with no write) if
    /// `index` is out of range.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails; the
    /// in-memory list is unchanged in that case.
    pub async fn remove(&mut self, index: usize) -> Result<bool> {
        if index >= self.records.len() {
            debug!("Ignoring remove of out-of-range index {index}");
            return Ok(false);
        }
        let mut next = self.records.clone();
        next.remove(index);
        self.commit(next).await?;
        Ok(true)
    }

    /// Move the order at `index` one position toward the front.
    ///
    /// Returns `true` if the list changed, `false` (with no write) when the
    /// record is already first or `index` is out of range.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails; the
    /// in-memory list is unchanged in that case.
    pub async fn move_up(&mut self, index: usize) -> Result<bool> {
        if index == 0 || index >= self.records.len() {
            return Ok(false);
        }
        let mut next = self.records.clone();
        let record = next.remove(index);
        next.insert(index - 1, record);
        self.commit(next).await?;
        Ok(true)
    }

    /// Move the order at `index` one position toward the back.
    ///
    /// Returns `true` if the list changed, `false` (with no write) when the
    /// record is already last or `index` is out of range.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails; the
    /// in-memory list is unchanged in that case.
    pub async fn move_down(&mut self, index: usize) -> Result<bool> {
        if self.records.is_empty() || index >= self.records.len() - 1 {
            return Ok(false);
        }
        let mut next = self.records.clone();
        let record = next.remove(index);
        next.insert(index + 1, record);
        self.commit(next).await?;
        Ok(true)
    }

    /// The current ordered sequence.
    #[must_use]
    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    /// Number of orders in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize `next`, write it to the store, then make it current.
    ///
    /// This is the single suspension point of every mutating operation.
    /// Memory is only updated after the write acknowledgment, so a failed
    /// write leaves the book and the store consistent with each other.
    async fn commit(&mut self, next: Vec<OrderRecord>) -> Result<()> {
        let bytes = serde_json::to_vec(&next)?;
        self.store.set(ORDERS_KEY, &bytes).await?;
        debug!("Persisted {} orders", next.len());
        self.records = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::error::Error;
    use crate::store::MemoryStore;

    /// A cloneable store handle, so tests can inspect what a book wrote.
    #[derive(Debug, Clone, Default)]
    struct SharedStore(Arc<Mutex<MemoryStore>>);

    #[async_trait]
    impl KvStore for SharedStore {
        async fn get(&self, key: &str) -> crate::error::Result<Option<Vec<u8>>> {
            self.0.lock().await.get(key).await
        }

        async fn set(&mut self, key: &str, value: &[u8]) -> crate::error::Result<()> {
            self.0.lock().await.set(key, value).await
        }
    }

    /// A store whose writes can be made to fail mid-test.
    #[derive(Debug)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: Arc<AtomicBool>,
    }

    #[async_trait]
    impl KvStore for FlakyStore {
        async fn get(&self, key: &str) -> crate::error::Result<Option<Vec<u8>>> {
            self.inner.get(key).await
        }

        async fn set(&mut self, key: &str, value: &[u8]) -> crate::error::Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Error::internal("store is down"));
            }
            self.inner.set(key, value).await
        }
    }

    fn test_book() -> OrderBook {
        OrderBook::new(Box::new(MemoryStore::new()))
    }

    fn record(name: &str) -> OrderRecord {
        OrderRecord::new(name, "1 Main St", "Pizza").unwrap()
    }

    #[tokio::test]
    async fn test_add_appends_at_end() {
        let mut book = test_book();

        book.add(record("Alice")).await.unwrap();
        book.add(record("Bob")).await.unwrap();

        assert_eq!(book.len(), 2);
        assert_eq!(book.records()[0].customer_name, "Alice");
        assert_eq!(book.records()[1].customer_name, "Bob");
    }

    #[tokio::test]
    async fn test_remove_preserves_relative_order() {
        let mut book = test_book();
        for name in ["Alice", "Bob", "Carol"] {
            book.add(record(name)).await.unwrap();
        }

        let removed = book.remove(1).await.unwrap();

        assert!(removed);
        assert_eq!(book.len(), 2);
        assert_eq!(book.records()[0].customer_name, "Alice");
        assert_eq!(book.records()[1].customer_name, "Carol");
    }

    #[tokio::test]
    async fn test_remove_out_of_range_is_noop() {
        let mut book = test_book();
        book.add(record("Alice")).await.unwrap();

        let removed = book.remove(5).await.unwrap();

        assert!(!removed);
        assert_eq!(book.len(), 1);
    }

    #[tokio::test]
    async fn test_move_up_swaps_with_predecessor() {
        let mut book = test_book();
        for name in ["Alice", "Bob", "Carol"] {
            book.add(record(name)).await.unwrap();
        }

        let moved = book.move_up(2).await.unwrap();

        assert!(moved);
        assert_eq!(book.records()[1].customer_name, "Carol");
        assert_eq!(book.records()[2].customer_name, "Bob");
        // The untouched record keeps its place
        assert_eq!(book.records()[0].customer_name, "Alice");
    }

    #[tokio::test]
    async fn test_move_up_first_is_noop() {
        let mut book = test_book();
        book.add(record("Alice")).await.unwrap();
        book.add(record("Bob")).await.unwrap();

        let moved = book.move_up(0).await.unwrap();

        assert!(!moved);
        assert_eq!(book.records()[0].customer_name, "Alice");
    }

    #[tokio::test]
    async fn test_move_down_last_is_noop() {
        let mut book = test_book();
        book.add(record("Alice")).await.unwrap();
        book.add(record("Bob")).await.unwrap();

        let moved = book.move_down(1).await.unwrap();

        assert!(!moved);
        assert_eq!(book.records()[1].customer_name, "Bob");
    }

    #[tokio::test]
    async fn test_move_on_empty_book_is_noop() {
        let mut book = test_book();

        assert!(!book.move_up(0).await.unwrap());
        assert!(!book.move_down(0).await.unwrap());
    }

    #[tokio::test]
    async fn test_move_roundtrip_restores_order() {
        let mut book = test_book();
        for name in ["Alice", "Bob", "Carol"] {
            book.add(record(name)).await.unwrap();
        }
        let before: Vec<OrderRecord> = book.records().to_vec();

        assert!(book.move_up(2).await.unwrap());
        assert!(book.move_down(1).await.unwrap());

        assert_eq!(book.records(), before.as_slice());
    }

    #[tokio::test]
    async fn test_add_move_remove_sequence() {
        let mut book = test_book();

        book.add(OrderRecord::new("Alice", "1 Main St", "Pizza").unwrap())
            .await
            .unwrap();
        book.add(OrderRecord::new("Bob", "2 Oak Ave", "Burger").unwrap())
            .await
            .unwrap();
        assert_eq!(book.records()[0].customer_name, "Alice");
        assert_eq!(book.records()[1].customer_name, "Bob");

        book.move_up(1).await.unwrap();
        assert_eq!(book.records()[0].customer_name, "Bob");
        assert_eq!(book.records()[1].customer_name, "Alice");

        book.remove(0).await.unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.records()[0].customer_name, "Alice");
    }

    #[tokio::test]
    async fn test_persistence_roundtrip() {
        let store = SharedStore::default();

        let mut book = OrderBook::new(Box::new(store.clone()));
        book.add(record("Alice")).await.unwrap();
        book.add(record("Bob")).await.unwrap();
        book.move_up(1).await.unwrap();

        // A fresh book over the same store sees the same sequence
        let mut reloaded = OrderBook::new(Box::new(store));
        reloaded.hydrate().await;

        assert_eq!(reloaded.records(), book.records());
    }

    #[tokio::test]
    async fn test_stored_blob_is_plain_array() {
        let store = SharedStore::default();

        let mut book = OrderBook::new(Box::new(store.clone()));
        book.add(record("Alice")).await.unwrap();

        let bytes = store.get(ORDERS_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["nomeCliente"], "Alice");
        assert_eq!(entries[0]["enderecoCliente"], "1 Main St");
        assert_eq!(entries[0]["pedidoCliente"], "Pizza");
    }

    #[tokio::test]
    async fn test_hydrate_absent_key_leaves_book_empty() {
        let mut book = test_book();
        book.hydrate().await;
        assert!(book.is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_reads_preexisting_blob() {
        let store = SharedStore::default();
        let blob = r#"[
            {"nomeCliente": "Alice", "enderecoCliente": "1 Main St", "pedidoCliente": "Pizza"},
            {"nomeCliente": "Bob", "enderecoCliente": "2 Oak Ave", "pedidoCliente": "Burger"}
        ]"#;
        store
            .clone()
            .set(ORDERS_KEY, blob.as_bytes())
            .await
            .unwrap();

        let mut book = OrderBook::new(Box::new(store));
        book.hydrate().await;

        assert_eq!(book.len(), 2);
        assert_eq!(book.records()[0].customer_name, "Alice");
        assert_eq!(book.records()[1].customer_name, "Bob");
    }

    #[tokio::test]
    async fn test_hydrate_undecodable_blob_keeps_state() {
        let store = SharedStore::default();

        let mut book = OrderBook::new(Box::new(store.clone()));
        book.add(record("Alice")).await.unwrap();

        store.clone().set(ORDERS_KEY, b"not json").await.unwrap();
        book.hydrate().await;

        assert_eq!(book.len(), 1);
        assert_eq!(book.records()[0].customer_name, "Alice");
    }

    #[tokio::test]
    async fn test_write_failure_leaves_memory_unchanged() {
        let fail_writes = Arc::new(AtomicBool::new(false));
        let store = FlakyStore {
            inner: MemoryStore::new(),
            fail_writes: Arc::clone(&fail_writes),
        };
        let mut book = OrderBook::new(Box::new(store));
        book.add(record("Alice")).await.unwrap();

        fail_writes.store(true, Ordering::SeqCst);

        assert!(book.add(record("Bob")).await.is_err());
        assert!(book.remove(0).await.is_err());
        assert_eq!(book.len(), 1);
        assert_eq!(book.records()[0].customer_name, "Alice");

        // Recovered store accepts the next mutation as usual
        fail_writes.store(false, Ordering::SeqCst);
        book.add(record("Bob")).await.unwrap();
        assert_eq!(book.len(), 2);
    }

    #[tokio::test]
    async fn test_boundary_noops_do_not_write() {
        let fail_writes = Arc::new(AtomicBool::new(true));
        let store = FlakyStore {
            inner: MemoryStore::new(),
            fail_writes,
        };
        let mut book = OrderBook::new(Box::new(store));

        // No-ops never reach the store, so a downed store doesn't matter
        assert!(!book.move_up(0).await.unwrap());
        assert!(!book.move_down(0).await.unwrap());
        assert!(!book.remove(0).await.unwrap());
    }
}
