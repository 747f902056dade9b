//! Warehouse session lifecycle.
//!
//! A session is opened on first use (or eagerly via [`SessionManager::warm_up`]),
//! reused until it is older than the configured TTL, then closed and replaced
//! on the next acquisition.

use crate::error::McpError;
use crate::warehouse::{Connector, Warehouse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct ActiveSession<S> {
    session: Arc<S>,
    established_at: Instant,
}

/// Owns at most one warehouse session at a time.
pub struct SessionManager<C: Connector> {
    connector: C,
    ttl: Duration,
    active: Mutex<Option<ActiveSession<C::Session>>>,
}

impl<C: Connector> SessionManager<C> {
    pub fn new(connector: C, ttl: Duration) -> Self {
        Self {
            connector,
            ttl,
            active: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the live session, connecting or refreshing as needed.
    pub async fn acquire(&self) -> Result<Arc<C::Session>, McpError> {
        let mut active = self.active.lock().await;

        if let Some(current) = active.as_ref() {
            if current.established_at.elapsed() < self.ttl {
                return Ok(current.session.clone());
            }
        }

        if let Some(expired) = active.take() {
            tracing::info!(
                age_secs = expired.established_at.elapsed().as_secs(),
                "Warehouse session expired, refreshing"
            );
            if let Err(e) = expired.session.close().await {
                tracing::warn!(error = %e, "Failed to close expired warehouse session");
            }
        }

        let session = self
            .connector
            .connect()
            .await
            .map_err(|e| McpError::Connection(format!("{e:#}")))?;
        let session = Arc::new(session);

        tracing::info!("Warehouse session established");

        *active = Some(ActiveSession {
            session: session.clone(),
            established_at: Instant::now(),
        });

        Ok(session)
    }

    /// Open a session ahead of the first query.
    pub async fn warm_up(&self) -> Result<(), McpError> {
        self.acquire().await.map(|_| ())
    }

    /// Whether a session exists and has not yet expired.
    pub async fn is_active(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .is_some_and(|s| s.established_at.elapsed() < self.ttl)
    }

    /// Close the current session, if any.
    pub async fn shutdown(&self) {
        if let Some(current) = self.active.lock().await.take() {
            match current.session.close().await {
                Ok(()) => tracing::info!("Warehouse session closed"),
                Err(e) => tracing::warn!(error = %e, "Failed to close warehouse session"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::Row;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Counters {
        connects: AtomicUsize,
        closes: AtomicUsize,
    }

    #[derive(Debug)]
    struct CountingSession {
        id: usize,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl Warehouse for CountingSession {
        async fn query(&self, _sql: &str) -> anyhow::Result<Vec<Row>> {
            Ok(Vec::new())
        }

        async fn close(&self) -> anyhow::Result<()> {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct CountingConnector {
        counters: Arc<Counters>,
        fail: bool,
    }

    #[async_trait]
    impl Connector for CountingConnector {
        type Session = CountingSession;

        async fn connect(&self) -> anyhow::Result<CountingSession> {
            if self.fail {
                anyhow::bail!("authentication failed");
            }
            let id = self.counters.connects.fetch_add(1, Ordering::SeqCst);
            Ok(CountingSession {
                id,
                counters: self.counters.clone(),
            })
        }
    }

    fn manager(ttl_secs: u64) -> (SessionManager<CountingConnector>, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let connector = CountingConnector {
            counters: counters.clone(),
            fail: false,
        };
        (
            SessionManager::new(connector, Duration::from_secs(ttl_secs)),
            counters,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_is_reused_within_ttl() {
        let (sessions, counters) = manager(60);

        let first = sessions.acquire().await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        let second = sessions.acquire().await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
        assert!(sessions.is_active().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_is_refreshed_after_ttl() {
        let (sessions, counters) = manager(60);

        let first = sessions.acquire().await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!sessions.is_active().await);

        let second = sessions.acquire().await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(counters.connects.load(Ordering::SeqCst), 2);
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        let sessions = SessionManager::new(
            CountingConnector {
                counters: Arc::new(Counters::default()),
                fail: true,
            },
            Duration::from_secs(60),
        );

        let err = sessions.acquire().await.unwrap_err();
        assert!(matches!(err, McpError::Connection(ref m) if m.contains("authentication failed")));
        assert!(!sessions.is_active().await);
    }

    #[tokio::test]
    async fn test_shutdown_closes_session() {
        let (sessions, counters) = manager(60);
        sessions.warm_up().await.unwrap();
        assert!(sessions.is_active().await);

        sessions.shutdown().await;
        assert!(!sessions.is_active().await);
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);

        // A second shutdown is a no-op.
        sessions.shutdown().await;
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    }
}
