//! Snapshot subscriptions and the live typed collection built on them.
//!
//! # Invariants
//! - A listener is called with the collection snapshot of every commit that
//!   touched its collection, in commit order.
//! - Dropping a `Subscription` unregisters its listener before `drop`
//!   returns; no delivery happens afterwards.
//! - Listeners must not subscribe or unsubscribe from inside a callback.

use crate::store::{Collection, CollectionSnapshot, Document, DocumentStore, Snapshot, StoreResult};
use log::{debug, error};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback receiving full-collection snapshots.
pub type SnapshotListener = Box<dyn FnMut(&CollectionSnapshot) + Send>;

struct Registration {
    collection: Collection,
    listener: SnapshotListener,
}

/// Listener registry shared between a store and its subscription guards.
#[derive(Default)]
pub(crate) struct SnapshotHub {
    next_id: AtomicU64,
    registrations: Mutex<BTreeMap<u64, Registration>>,
}

impl SnapshotHub {
    pub(crate) fn register(
        self: &Arc<Self>,
        collection: Collection,
        listener: SnapshotListener,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(
            id,
            Registration {
                collection,
                listener,
            },
        );
        debug!("event=subscribe module=store status=ok collection={collection} subscription_id={id}");
        Subscription {
            id,
            collection,
            hub: Arc::downgrade(self),
        }
    }

    pub(crate) fn has_listeners(&self, collection: Collection) -> bool {
        self.lock()
            .values()
            .any(|registration| registration.collection == collection)
    }

    pub(crate) fn deliver(&self, snapshot: &CollectionSnapshot) {
        let mut registrations = self.lock();
        for registration in registrations
            .values_mut()
            .filter(|registration| registration.collection == snapshot.collection)
        {
            (registration.listener)(snapshot);
        }
    }

    fn remove(&self, id: u64) {
        self.lock().remove(&id);
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<u64, Registration>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Guard for one registered listener.
#[must_use = "dropping a Subscription immediately unregisters its listener"]
pub struct Subscription {
    id: u64,
    collection: Collection,
    hub: Weak<SnapshotHub>,
}

impl Subscription {
    pub fn collection(&self) -> Collection {
        self.collection
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(self.id);
            debug!(
                "event=unsubscribe module=store status=ok collection={} subscription_id={}",
                self.collection, self.id
            );
        }
    }
}

/// Latest decoded snapshot of one collection, kept current by a subscription.
///
/// Readers get a synchronous copy of whatever was delivered last. Local
/// writes are not reflected until the store delivers the post-commit
/// snapshot.
pub struct LiveCollection<T> {
    state: Arc<Mutex<Snapshot<T>>>,
    _subscription: Subscription,
}

impl<T: Document + Send + 'static> LiveCollection<T> {
    /// Subscribes to `T::COLLECTION` on `store`.
    ///
    /// A snapshot that fails to decode is logged and skipped; the previous
    /// snapshot stays visible.
    pub fn attach<S: DocumentStore + ?Sized>(store: &S) -> StoreResult<Self> {
        let state = Arc::new(Mutex::new(Snapshot::<T>::default()));
        let sink = Arc::clone(&state);
        let listener: SnapshotListener = Box::new(move |raw: &CollectionSnapshot| {
            match Snapshot::<T>::decode(raw) {
                Ok(snapshot) => {
                    *sink.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
                }
                Err(err) => {
                    error!(
                        "event=snapshot_decode module=store status=error collection={} version={} error={err}",
                        raw.collection, raw.version
                    );
                }
            }
        });
        let subscription = store.subscribe(T::COLLECTION, listener)?;
        Ok(Self {
            state,
            _subscription: subscription,
        })
    }

    /// Copy of the most recently delivered snapshot.
    pub fn latest(&self) -> Snapshot<T> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn version(&self) -> i64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .version()
    }
}
