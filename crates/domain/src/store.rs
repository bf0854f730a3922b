use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::lpa::Lpa;
use crate::ports::BoxFuture;
use crate::ports::store::{LpaStore, StoreError};

/// Process-local store for development and tests.
#[derive(Clone, Default)]
pub struct InMemoryLpaStore {
    inner: Arc<Mutex<HashMap<String, Lpa>>>,
}

impl InMemoryLpaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LpaStore for InMemoryLpaStore {
    fn get(&self, session_id: &str) -> BoxFuture<'_, Result<Option<Lpa>, StoreError>> {
        let session_id = session_id.to_string();
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner
                .lock()
                .map_err(|_| StoreError::Unavailable("lpa store lock poisoned".to_string()))?;
            Ok(guard.get(&session_id).cloned())
        })
    }

    fn put(&self, session_id: &str, lpa: &Lpa) -> BoxFuture<'_, Result<u64, StoreError>> {
        let session_id = session_id.to_string();
        let inner = self.inner.clone();
        let mut lpa = lpa.clone();
        Box::pin(async move {
            let mut guard = inner
                .lock()
                .map_err(|_| StoreError::Unavailable("lpa store lock poisoned".to_string()))?;
            let found = guard.get(&session_id).map_or(0, |stored| stored.version);
            if found != lpa.version {
                return Err(StoreError::Conflict {
                    expected: lpa.version,
                    found,
                });
            }
            lpa.version = found + 1;
            let version = lpa.version;
            guard.insert(session_id, lpa);
            Ok(version)
        })
    }
}
