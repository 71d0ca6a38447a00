//! In-memory draft storage, one draft per browser session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::document::Draft;

struct DraftEntry {
    draft: Draft,
    touched: Instant,
}

#[derive(Clone)]
pub struct DraftStore {
    inner: Arc<Mutex<HashMap<String, DraftEntry>>>,
    ttl: Duration,
}

impl DraftStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn new_id() -> String {
        let bytes: [u8; 16] = rand::rng().random();
        hex::encode(bytes)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DraftEntry>> {
        // A panic inside a closure leaves the map itself intact.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `f` on the draft for `id`, creating a blank one if needed.
    pub fn with_draft<R>(&self, id: &str, f: impl FnOnce(&mut Draft) -> R) -> R {
        let mut drafts = self.lock();
        let entry = drafts.entry(id.to_string()).or_insert_with(|| DraftEntry {
            draft: Draft::default(),
            touched: Instant::now(),
        });
        entry.touched = Instant::now();
        f(&mut entry.draft)
    }

    pub fn snapshot(&self, id: &str) -> Option<Draft> {
        self.lock().get(id).map(|e| e.draft.clone())
    }

    pub fn discard(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Drops drafts idle for longer than the TTL. Returns how many went.
    pub fn evict_idle(&self) -> usize {
        let ttl = self.ttl;
        let mut drafts = self.lock();
        let before = drafts.len();
        drafts.retain(|_, e| e.touched.elapsed() <= ttl);
        before - drafts.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn spawn_eviction(store: DraftStore, period: Duration) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let evicted = store.evict_idle();
            if evicted > 0 {
                log::info!("Evicted {evicted} idle drafts ({} left)", store.len());
            }
        }
    });
}
