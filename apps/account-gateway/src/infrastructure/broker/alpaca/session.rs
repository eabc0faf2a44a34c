//! Lazy provider session.
//!
//! A session is built on first use and shared by all concurrent calls. After
//! a transport failure the failed session is dropped so the next attempt
//! starts from a fresh connection pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::config::AlpacaConfig;
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;
use crate::observability::record_session_created;

/// Lazily created, replaceable HTTP session.
#[derive(Debug)]
pub struct LazySession {
    config: AlpacaConfig,
    current: Mutex<Option<Arc<AlpacaHttpClient>>>,
    created: AtomicU64,
}

impl LazySession {
    /// Create an empty session holder. No client is built yet.
    #[must_use]
    pub fn new(config: AlpacaConfig) -> Self {
        Self {
            config,
            current: Mutex::new(None),
            created: AtomicU64::new(0),
        }
    }

    /// Get the live session, creating it if none exists.
    pub fn acquire(&self) -> Result<Arc<AlpacaHttpClient>, AlpacaError> {
        let mut current = self.current.lock();
        if let Some(client) = current.as_ref() {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(AlpacaHttpClient::new(&self.config)?);
        *current = Some(Arc::clone(&client));
        let count = self.created.fetch_add(1, Ordering::Relaxed) + 1;
        record_session_created();

        tracing::info!(
            environment = %self.config.environment,
            sessions_created = count,
            "Created provider session"
        );

        Ok(client)
    }

    /// Drop `stale` if it is still the live session.
    ///
    /// A session already replaced by another caller is left alone.
    pub fn invalidate(&self, stale: &Arc<AlpacaHttpClient>) {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|live| Arc::ptr_eq(live, stale)) {
            *current = None;
            tracing::debug!("Provider session invalidated after transport failure");
        }
    }

    /// Whether a session currently exists.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Number of sessions created so far.
    #[must_use]
    pub fn sessions_created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}
