//! Destination registry
//!
//! Owns the live destination set. Discovery events arrive on an arbitrary
//! inventory thread and land in a pending buffer; the buffer is drained and
//! merged into the live set once per round, under the same critical section
//! that builds the snapshot, so no concurrently recorded destination is
//! ever lost.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::types::Destination;
use crate::collaborators::inventory::Inventory;

/// The set of currently known destinations, unique by resource id.
#[derive(Default)]
pub struct DestinationRegistry {
    live: Mutex<HashSet<Destination>>,
    pending: Mutex<Vec<Destination>>,
}

impl DestinationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the registry to the inventory: subscribe to resource-created
    /// events, then merge the bulk listing.
    ///
    /// The subscription is registered before the bulk load is read, so a
    /// resource created between the two calls lands in the pending buffer
    /// and is merged on the very next snapshot instead of being lost.
    pub async fn bootstrap(registry: Arc<Self>, inventory: &dyn Inventory) -> Result<()> {
        let listener_registry = Arc::clone(&registry);
        inventory.on_resource_created(Box::new(move |resource| {
            if let Some(destination) = Destination::from_resource(&resource) {
                listener_registry.record_discovered(destination);
            }
        }));

        let initial = inventory
            .list_all_url_destinations()
            .await
            .context("Failed to list URL destinations from inventory")?;
        debug!("About to initialize the registry with {} URLs", initial.len());

        let count = initial.len();
        let mut live = lock(&registry.live);
        for destination in initial {
            live.insert(destination);
        }
        drop(live);

        info!("Initialized the destination registry with {} URLs", count);
        Ok(())
    }

    /// Insert a destination. Idempotent: an already known resource id is
    /// left untouched.
    pub fn add(&self, destination: Destination) {
        lock(&self.live).insert(destination);
    }

    /// Remove a destination by resource id. Idempotent.
    pub fn remove(&self, resource_id: &str) {
        lock(&self.live).retain(|d| d.resource_id != resource_id);
    }

    /// Buffer a destination reported by the discovery stream. Callable from
    /// any thread; holds the buffer lock only for the append.
    pub fn record_discovered(&self, destination: Destination) {
        lock(&self.pending).push(destination);
    }

    /// Drain the pending buffer, merge it into the live set and return the
    /// full current set.
    ///
    /// Both locks are held across the merge and the copy-out, so every
    /// destination recorded before this call returns is in the returned set.
    pub fn snapshot(&self) -> Vec<Destination> {
        let mut pending = lock(&self.pending);
        let mut live = lock(&self.live);
        for destination in pending.drain(..) {
            live.insert(destination);
        }
        live.iter().cloned().collect()
    }

    /// Current live destinations, without merging the pending buffer.
    pub fn list(&self) -> Vec<Destination> {
        lock(&self.live).iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.live).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.live).is_empty()
    }
}

/// Lock a mutex, recovering the data if a holder panicked. The registry's
/// critical sections are pure collection edits, so a poisoned state is
/// still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::inventory::{RawResource, ResourceListener, URL_TYPE};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    fn dest(id: &str) -> Destination {
        Destination::new("t1", "e1", id, format!("http://{}.example.com", id))
    }

    #[test]
    fn add_is_idempotent_by_resource_id() {
        let registry = DestinationRegistry::new();
        registry.add(dest("r1"));
        registry.add(Destination::with_method(
            "t1",
            "e1",
            "r1",
            "http://other.example.com",
            "HEAD",
        ));

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = DestinationRegistry::new();
        registry.add(dest("r1"));
        registry.remove("r1");
        registry.remove("r1");

        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_merges_the_pending_buffer() {
        let registry = DestinationRegistry::new();
        registry.add(dest("r1"));
        registry.record_discovered(dest("r2"));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);

        // The merge is durable: the next snapshot still has both.
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn removed_destination_is_absent_from_next_snapshot() {
        let registry = DestinationRegistry::new();
        registry.add(dest("r1"));
        registry.add(dest("r2"));
        registry.remove("r1");

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].resource_id, "r2");
    }

    #[test]
    fn concurrent_discovery_is_not_lost() {
        let registry = Arc::new(DestinationRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|thread| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        registry.record_discovered(dest(&format!("r{}-{}", thread, i)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().len(), 8 * 50);
    }

    /// Inventory stub that fires a discovery event while the bulk load is
    /// still in flight, reproducing the startup window the subscription
    /// ordering guarantee exists for.
    struct RacingInventory {
        listener: StdMutex<Option<ResourceListener>>,
    }

    #[async_trait]
    impl Inventory for RacingInventory {
        async fn list_all_url_destinations(&self) -> Result<Vec<Destination>> {
            if let Some(listener) = self.listener.lock().unwrap().as_ref() {
                let mut resource = RawResource::new("t1", "e1", "r-during-load", URL_TYPE);
                resource
                    .properties
                    .insert("url".to_string(), "http://race.example.com".to_string());
                listener(resource);
            }
            Ok(vec![dest("r-bulk")])
        }

        fn on_resource_created(&self, listener: ResourceListener) {
            *self.listener.lock().unwrap() = Some(listener);
        }
    }

    #[tokio::test]
    async fn bootstrap_does_not_lose_events_during_bulk_load() {
        let registry = Arc::new(DestinationRegistry::new());
        let inventory = RacingInventory {
            listener: StdMutex::new(None),
        };

        DestinationRegistry::bootstrap(Arc::clone(&registry), &inventory)
            .await
            .unwrap();

        let snapshot = registry.snapshot();
        let ids: Vec<_> = snapshot.iter().map(|d| d.resource_id.as_str()).collect();
        assert_eq!(snapshot.len(), 2);
        assert!(ids.contains(&"r-bulk"));
        assert!(ids.contains(&"r-during-load"));
    }

    #[tokio::test]
    async fn bootstrap_listener_filters_non_url_resources() {
        let registry = Arc::new(DestinationRegistry::new());
        let inventory = RacingInventory {
            listener: StdMutex::new(None),
        };
        DestinationRegistry::bootstrap(Arc::clone(&registry), &inventory)
            .await
            .unwrap();

        let listener_slot = inventory.listener.lock().unwrap();
        let listener = listener_slot.as_ref().unwrap();
        listener(RawResource::new("t1", "e1", "r-db", "DATASOURCE"));
        drop(listener_slot);

        let ids: Vec<String> = registry
            .snapshot()
            .into_iter()
            .map(|d| d.resource_id)
            .collect();
        assert!(!ids.contains(&"r-db".to_string()));
    }
}
