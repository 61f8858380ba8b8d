//! Stale-while-revalidate store keyed by location.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tokio::time::Instant;
use trellis_data::LoadResult;

use crate::error::CacheError;
use crate::fetch::Fetch;
use crate::key::CacheKey;
use crate::options::SwrOptions;
use crate::state::{CacheState, Entry};

type FetchResult = Result<Arc<LoadResult>, CacheError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Environment signal that may warrant revalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevalidateEvent {
    /// The window regained focus.
    Focus,
    /// Network connectivity came back.
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Fresh,
    Stale,
    Expired,
}

struct Slot {
    state: watch::Sender<CacheState>,
    in_flight: Option<SharedFetch>,
    invalidated: bool,
}

impl Slot {
    fn new() -> Self {
        Self {
            state: watch::Sender::new(CacheState::Absent),
            in_flight: None,
            invalidated: false,
        }
    }
}

struct Inner {
    fetcher: Arc<dyn Fetch>,
    options: SwrOptions,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

enum Plan {
    Ready(Arc<LoadResult>),
    Wait(SharedFetch),
}

/// Client-side cache of loader results.
///
/// At most one fetch per key is in flight; every reader of that key joins
/// it. Cloning is cheap and shares the underlying store.
#[derive(Clone)]
pub struct SwrStore {
    inner: Arc<Inner>,
}

impl SwrStore {
    pub fn new(fetcher: Arc<dyn Fetch>, options: SwrOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                options,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn options(&self) -> &SwrOptions {
        &self.inner.options
    }

    /// Current state, with age applied to fresh entries.
    pub fn state(&self, key: &CacheKey) -> CacheState {
        let slots = self.inner.slots();
        let Some(slot) = slots.get(key) else {
            return CacheState::Absent;
        };
        let state = slot.state.borrow().clone();
        match state {
            CacheState::Fresh(entry)
                if self.inner.freshness(&entry, slot.invalidated) != Freshness::Fresh =>
            {
                CacheState::Stale(entry)
            }
            other => other,
        }
    }

    /// Read a value, fetching or revalidating as its age requires.
    ///
    /// Stale values return immediately while a background fetch refreshes
    /// them.
    pub async fn get(&self, key: &CacheKey) -> Result<Arc<LoadResult>, CacheError> {
        match self.inner.plan(key) {
            Plan::Ready(value) => Ok(value),
            Plan::Wait(fetch) => fetch.await,
        }
    }

    /// Watch a key's state, starting a load if it needs one.
    pub fn subscribe(&self, key: &CacheKey) -> watch::Receiver<CacheState> {
        let receiver = self.inner.slots().entry(key.clone()).or_insert_with(Slot::new).state.subscribe();
        let _ = self.inner.plan(key);
        receiver
    }

    /// Fetch now regardless of age. Joins a fetch already in flight.
    pub async fn revalidate(&self, key: &CacheKey) -> Result<Arc<LoadResult>, CacheError> {
        let fetch = {
            let mut slots = self.inner.slots();
            let slot = slots.entry(key.clone()).or_insert_with(Slot::new);
            self.inner.start(key, slot)
        };
        fetch.await
    }

    /// Seed a key with a value already in hand, e.g. data embedded in the page.
    pub fn prime(&self, key: &CacheKey, value: LoadResult) {
        let mut slots = self.inner.slots();
        let slot = slots.entry(key.clone()).or_insert_with(Slot::new);
        slot.invalidated = false;
        slot.state.send_replace(CacheState::Fresh(Entry {
            value: Arc::new(value),
            fetched_at: Instant::now(),
        }));
    }

    /// Mark a key stale. Subscribed keys revalidate at once; others on next read.
    pub fn invalidate(&self, key: &CacheKey) {
        let mut slots = self.inner.slots();
        let Some(slot) = slots.get_mut(key) else {
            return;
        };
        slot.invalidated = true;
        if slot.state.receiver_count() > 0 {
            let _ = self.inner.start(key, slot);
        }
    }

    /// React to focus or connectivity changes. Returns how many keys
    /// started revalidating.
    pub fn handle_event(&self, event: RevalidateEvent) -> usize {
        let enabled = match event {
            RevalidateEvent::Focus => self.inner.options.revalidate_on_focus,
            RevalidateEvent::Online => self.inner.options.revalidate_on_network,
        };
        if !enabled {
            return 0;
        }

        let mut slots = self.inner.slots();
        let mut started = 0;
        for (key, slot) in slots.iter_mut() {
            if slot.state.receiver_count() == 0 || slot.in_flight.is_some() {
                continue;
            }
            let _ = self.inner.start(key, slot);
            started += 1;
        }
        tracing::debug!(?event, keys = started, "revalidating on event");
        started
    }

    /// Number of keys the store knows about.
    pub fn len(&self) -> usize {
        self.inner.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots().is_empty()
    }
}

impl std::fmt::Debug for SwrStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwrStore")
            .field("options", &self.inner.options)
            .field("keys", &self.len())
            .finish()
    }
}

impl Inner {
    fn slots(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn freshness(&self, entry: &Entry, invalidated: bool) -> Freshness {
        let age = entry.fetched_at.elapsed();
        if age > self.options.fresh_age + self.options.stale_age {
            Freshness::Expired
        } else if invalidated || age > self.options.fresh_age {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }

    fn plan(self: &Arc<Self>, key: &CacheKey) -> Plan {
        let mut slots = self.slots();
        let slot = slots.entry(key.clone()).or_insert_with(Slot::new);
        let state = slot.state.borrow().clone();

        match state {
            CacheState::Fresh(entry) | CacheState::Stale(entry) => {
                match self.freshness(&entry, slot.invalidated) {
                    Freshness::Fresh => Plan::Ready(entry.value),
                    Freshness::Stale => {
                        slot.state.send_replace(CacheState::Stale(entry.clone()));
                        let _ = self.start(key, slot);
                        Plan::Ready(entry.value)
                    }
                    Freshness::Expired => {
                        slot.state.send_replace(CacheState::Absent);
                        Plan::Wait(self.start(key, slot))
                    }
                }
            }
            CacheState::Revalidating(entry) => Plan::Ready(entry.value),
            CacheState::Absent | CacheState::Loading | CacheState::Failed { .. } => {
                Plan::Wait(self.start(key, slot))
            }
        }
    }

    /// Start a fetch for `key` unless one is already running.
    fn start(self: &Arc<Self>, key: &CacheKey, slot: &mut Slot) -> SharedFetch {
        if let Some(fetch) = &slot.in_flight {
            return fetch.clone();
        }

        let next = match slot.state.borrow().entry() {
            Some(entry) => CacheState::Revalidating(entry.clone()),
            None => CacheState::Loading,
        };
        slot.state.send_replace(next);

        let inner = Arc::clone(self);
        let owned_key = key.clone();
        let fetch = async move { inner.run(owned_key).await }.boxed().shared();
        slot.in_flight = Some(fetch.clone());

        // Driven in the background so subscribers see progress without awaiting.
        tokio::spawn(fetch.clone());
        fetch
    }

    async fn run(self: Arc<Self>, key: CacheKey) -> FetchResult {
        let retry = &self.options.retry;
        let mut attempt = 0;

        let result = loop {
            match self.fetcher.fetch(&key).await {
                Ok(value) => break Ok(Arc::new(value)),
                Err(error) if retry.should_retry(&error, attempt) => {
                    tracing::debug!(%key, attempt, error = %error, "retrying data fetch");
                    tokio::time::sleep(retry.delay(attempt)).await;
                    attempt += 1;
                }
                Err(error) => break Err(error),
            }
        };

        self.settle(&key, &result);
        result
    }

    fn settle(&self, key: &CacheKey, result: &FetchResult) {
        let mut slots = self.slots();
        let Some(slot) = slots.get_mut(key) else {
            return;
        };
        slot.in_flight = None;

        let next = match result {
            Ok(value) => {
                slot.invalidated = false;
                CacheState::Fresh(Entry {
                    value: Arc::clone(value),
                    fetched_at: Instant::now(),
                })
            }
            Err(error) => {
                tracing::warn!(%key, error = %error, "data fetch failed");
                CacheState::Failed {
                    error: error.clone(),
                    previous: slot.state.borrow().entry().cloned(),
                }
            }
        };
        slot.state.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::retry::BackoffStrategy;

    /// Returns `{"n": call}`; fails the first `fail_first` calls.
    struct Counting {
        calls: AtomicUsize,
        fail_first: usize,
    }

    impl Counting {
        fn new(fail_first: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_first,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetch for Counting {
        async fn fetch(&self, _key: &CacheKey) -> Result<LoadResult, CacheError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(10)).await;
            if n <= self.fail_first {
                Err(CacheError::transport("offline"))
            } else {
                Ok(LoadResult::props(json!({ "n": n })))
            }
        }
    }

    fn store(fetcher: &Arc<Counting>) -> SwrStore {
        let options = SwrOptions::default().with_backoff(BackoffStrategy::Fixed(Duration::from_millis(5)));
        SwrStore::new(fetcher.clone(), options)
    }

    fn n(value: &LoadResult) -> u64 {
        value.props_value().and_then(|v| v["n"].as_u64()).unwrap()
    }

    fn key() -> CacheKey {
        CacheKey::new("/users/42", "")
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_reads_share_one_fetch() {
        let fetcher = Counting::new(0);
        let store = store(&fetcher);

        let (key_a, key_b) = (key(), key());
        let (a, b) = tokio::join!(store.get(&key_a), store.get(&key_b));

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_value_is_not_refetched() {
        let fetcher = Counting::new(0);
        let store = store(&fetcher);

        store.get(&key()).await.unwrap();
        let again = store.get(&key()).await.unwrap();

        assert_eq!(n(&again), 1);
        assert_eq!(fetcher.calls(), 1);
        assert!(matches!(store.state(&key()), CacheState::Fresh(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_value_served_while_revalidating() {
        let fetcher = Counting::new(0);
        let store = store(&fetcher);

        store.get(&key()).await.unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(matches!(store.state(&key()), CacheState::Stale(_)));

        let served = store.get(&key()).await.unwrap();
        assert_eq!(n(&served), 1);
        assert!(matches!(store.state(&key()), CacheState::Revalidating(_)));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fetcher.calls(), 2);
        let state = store.state(&key());
        assert_eq!(state.entry().map(|e| n(&e.value)), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_value_is_refetched_before_returning() {
        let fetcher = Counting::new(0);
        let store = store(&fetcher);

        store.get(&key()).await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;

        let value = store.get(&key()).await.unwrap();
        assert_eq!(n(&value), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_retry_then_success() {
        let fetcher = Counting::new(1);
        let store = store(&fetcher);

        let value = store.get(&key()).await.unwrap();
        assert_eq!(n(&value), 2);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_surfaces_after_one_retry() {
        let fetcher = Counting::new(usize::MAX);
        let store = store(&fetcher);

        let err = store.get(&key()).await.unwrap_err();
        assert_eq!(err, CacheError::transport("offline"));
        assert_eq!(fetcher.calls(), 2);
        assert!(matches!(store.state(&key()), CacheState::Failed { previous: None, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_transitions() {
        let fetcher = Counting::new(0);
        let store = store(&fetcher);

        let mut rx = store.subscribe(&key());
        assert!(rx.borrow().is_in_flight());

        let state = rx
            .wait_for(|s| matches!(s, CacheState::Fresh(_)))
            .await
            .unwrap()
            .clone();
        assert_eq!(state.resource().value().map(n), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_prime_skips_fetch() {
        let fetcher = Counting::new(0);
        let store = store(&fetcher);

        store.prime(&key(), LoadResult::props(json!({ "n": 7 })));
        let value = store.get(&key()).await.unwrap();

        assert_eq!(n(&value), 7);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_revalidates_subscribed_keys() {
        let fetcher = Counting::new(0);
        let store = store(&fetcher);

        store.prime(&key(), LoadResult::props(json!({ "n": 0 })));
        store.prime(&CacheKey::new("/unwatched", ""), LoadResult::empty());
        let _rx = store.subscribe(&key());

        assert_eq!(store.handle_event(RevalidateEvent::Focus), 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_triggers_do_nothing() {
        let fetcher = Counting::new(0);
        let options = SwrOptions::default()
            .with_revalidate_on_focus(false)
            .with_revalidate_on_network(false);
        let store = SwrStore::new(fetcher.clone(), options);

        store.prime(&key(), LoadResult::empty());
        let _rx = store.subscribe(&key());

        assert_eq!(store.handle_event(RevalidateEvent::Focus), 0);
        assert_eq!(store.handle_event(RevalidateEvent::Online), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_revalidation() {
        let fetcher = Counting::new(0);
        let store = store(&fetcher);

        store.prime(&key(), LoadResult::props(json!({ "n": 0 })));
        store.invalidate(&key());

        let served = store.get(&key()).await.unwrap();
        assert_eq!(n(&served), 0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fetcher.calls(), 1);
    }
}
