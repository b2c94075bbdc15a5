//! Per-origin cap on in-flight requests.

use crate::request::ReplayRequest;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// One semaphore per origin (scheme, host, port).
///
/// Built from the full request list before dispatch, so the map is never
/// written once tasks are running.
#[derive(Debug)]
pub struct HostLimiter {
    per_host: usize,
    semaphores: HashMap<String, Arc<Semaphore>>,
}

impl HostLimiter {
    pub fn for_requests(requests: &[ReplayRequest], per_host: usize) -> Self {
        let mut semaphores = HashMap::new();
        for request in requests {
            semaphores
                .entry(origin_key(&request.url))
                .or_insert_with(|| Arc::new(Semaphore::new(per_host)));
        }
        Self {
            per_host,
            semaphores,
        }
    }

    /// Semaphore guarding `url`'s origin.
    pub fn semaphore_for(&self, url: &Url) -> Arc<Semaphore> {
        self.semaphores
            .get(&origin_key(url))
            .cloned()
            .unwrap_or_else(|| Arc::new(Semaphore::new(self.per_host)))
    }

    pub fn origins(&self) -> usize {
        self.semaphores.len()
    }
}

fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}
