use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::RecordKind;

/// Tracks remark submissions in flight so a record never has two at once.
#[derive(Debug, Clone, Default)]
pub struct SubmitGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Held for the duration of one submission; releases the record on drop,
/// including when the request future is cancelled.
#[derive(Debug)]
pub struct InFlight {
    key: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SubmitGuard {
    pub fn try_begin(&self, kind: RecordKind, id: &str) -> Option<InFlight> {
        let key = format!("{}/{}", kind.segment(), id);
        if !lock(&self.in_flight).insert(key.clone()) {
            return None;
        }
        Some(InFlight {
            key,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    #[cfg(test)]
    pub fn is_in_flight(&self, kind: RecordKind, id: &str) -> bool {
        lock(&self.in_flight).contains(&format!("{}/{}", kind.segment(), id))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.key);
    }
}

fn lock(set: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
