use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use soapbox_db::Store;
use soapbox_types::models::{CURRENT_MESSAGE_KEY, LOAD_ERROR_FALLBACK, NO_MESSAGE_FALLBACK};

use crate::run_blocking;

/// Serves the current message for display, hitting the store at most once
/// per freshness window.
pub struct MessageReader {
    store: Arc<dyn Store>,
    fresh_for: Duration,
    cache: Mutex<Cache>,
}

/// `generation` is bumped by every invalidation so a fetch that started
/// before it cannot put its (older) value back into the cache.
#[derive(Default)]
struct Cache {
    entry: Option<Cached>,
    generation: u64,
}

struct Cached {
    message: String,
    fetched_at: Instant,
}

impl MessageReader {
    pub fn new(store: Arc<dyn Store>, fresh_for: Duration) -> Self {
        Self {
            store,
            fresh_for,
            cache: Mutex::new(Cache::default()),
        }
    }

    pub fn fresh_for(&self) -> Duration {
        self.fresh_for
    }

    /// Never fails: an empty store yields the placeholder and a store error
    /// yields the error notice. Error notices are not cached.
    pub async fn read(&self) -> String {
        let (cached, generation) = self.lookup();
        if let Some(message) = cached {
            return message;
        }

        let message = match run_blocking(&self.store, |store| store.get(CURRENT_MESSAGE_KEY)).await {
            Ok(Some(message)) if !message.is_empty() => message,
            Ok(_) => {
                info!("No message set yet, serving placeholder");
                NO_MESSAGE_FALLBACK.to_string()
            }
            Err(e) => {
                error!("Error fetching message: {:#}", e);
                return LOAD_ERROR_FALLBACK.to_string();
            }
        };

        self.remember(&message, generation);
        message
    }

    /// Forget the cached value so the next read goes to the store. Reads
    /// already in flight will not cache what they fetched.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.entry = None;
            cache.generation = cache.generation.wrapping_add(1);
        }
    }

    /// The fresh cached message, if any, and the generation it was read at.
    fn lookup(&self) -> (Option<String>, u64) {
        // A poisoned cache is treated as a miss.
        let Ok(cache) = self.cache.lock() else {
            return (None, 0);
        };
        let fresh = cache
            .entry
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.fresh_for)
            .map(|cached| {
                debug!("Serving cached message");
                cached.message.clone()
            });
        (fresh, cache.generation)
    }

    fn remember(&self, message: &str, generation: u64) {
        if let Ok(mut cache) = self.cache.lock() {
            if cache.generation != generation {
                debug!("Cache invalidated during fetch, not caching");
                return;
            }
            cache.entry = Some(Cached {
                message: message.to_string(),
                fetched_at: Instant::now(),
            });
        }
    }
}
