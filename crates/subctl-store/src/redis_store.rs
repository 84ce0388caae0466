//! Redis Store - Connection and Operations
//!
//! Implements [`AgentStore`] over a single multiplexed Redis connection.
//! The connection is opened lazily on first use, shared by every call, and
//! dropped after any failure so the next call reconnects. Connecting and
//! waiting for replies are both bounded by the configured timeouts; a call
//! that takes too long surfaces as [`StoreError::Timeout`].

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::FromRedisValue;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::storage_traits::{AgentStore, StoreResult};

/// Configuration for a Redis connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    /// Server host name or address (default: "localhost")
    pub host: String,
    /// Server port (default: 6379)
    pub port: u16,
    /// Logical database index (default: 0)
    pub db: i64,
    /// Upper bound on establishing the connection
    pub connect_timeout: Duration,
    /// Upper bound on waiting for a single reply
    pub response_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            connect_timeout: Duration::from_secs(2),
            response_timeout: Duration::from_secs(2),
        }
    }
}

impl RedisConfig {
    /// Create a configuration for the given host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Select a logical database
    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the reply timeout
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// `host:port`
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection URL understood by the redis client
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Redis-backed agent store
pub struct RedisStore {
    client: redis::Client,
    config: RedisConfig,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisStore {
    /// Build a client from configuration.
    ///
    /// Performs no network I/O; an unreachable server is only noticed by
    /// the first store call. Fails when the configuration cannot form a
    /// valid connection URL.
    pub fn open(config: RedisConfig) -> StoreResult<Self> {
        if config.host.trim().is_empty() {
            return Err(StoreError::InvalidConfig("host must not be empty".to_string()));
        }
        let client = redis::Client::open(config.url().as_str())
            .map_err(|e| StoreError::InvalidConfig(format!("{}: {}", config.url(), e)))?;
        Ok(Self {
            client,
            config,
            connection: Mutex::new(None),
        })
    }

    async fn connection(&self) -> StoreResult<MultiplexedConnection> {
        let mut slot = self.connection.lock().await;
        if let Some(con) = slot.as_ref() {
            return Ok(con.clone());
        }

        debug!(endpoint = %self.config.endpoint(), "opening redis connection");
        let con = tokio::time::timeout(
            self.config.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            StoreError::Timeout(format!(
                "connecting to {} exceeded {}ms",
                self.config.endpoint(),
                self.config.connect_timeout.as_millis()
            ))
        })??;

        *slot = Some(con.clone());
        Ok(con)
    }

    async fn reset(&self) {
        self.connection.lock().await.take();
    }

    async fn query<T>(&self, cmd: &redis::Cmd, name: &str) -> StoreResult<T>
    where
        T: FromRedisValue + Send,
    {
        let mut con = self.connection().await?;
        match tokio::time::timeout(self.config.response_timeout, cmd.query_async(&mut con)).await
        {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                let err = StoreError::from(err);
                if err.is_unavailable() {
                    self.reset().await;
                }
                Err(err)
            }
            Err(_) => {
                self.reset().await;
                Err(StoreError::Timeout(format!(
                    "{} on {} exceeded {}ms",
                    name,
                    self.config.endpoint(),
                    self.config.response_timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl AgentStore for RedisStore {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.query(&cmd, "GET").await
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        self.query(&cmd, "SET").await
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn lpush(&self, key: &str, value: &str) -> StoreResult<u64> {
        let mut cmd = redis::cmd("LPUSH");
        cmd.arg(key).arg(value);
        self.query(&cmd, "LPUSH").await
    }

    #[instrument(skip(self), level = "debug")]
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let mut cmd = redis::cmd("LRANGE");
        cmd.arg(key).arg(start).arg(stop);
        self.query(&cmd, "LRANGE").await
    }

    #[instrument(skip(self), level = "debug")]
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let mut cmd = redis::cmd("EXPIRE");
        cmd.arg(key).arg(ttl.as_secs());
        self.query(&cmd, "EXPIRE").await
    }

    #[instrument(skip(self), level = "debug")]
    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let mut cmd = redis::cmd("TTL");
        cmd.arg(key);
        let seconds: i64 = self.query(&cmd, "TTL").await?;
        // -2: no such key, -1: key without expiry
        Ok(u64::try_from(seconds).ok().map(Duration::from_secs))
    }

    fn endpoint(&self) -> String {
        format!("redis://{}/{}", self.config.endpoint(), self.config.db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_well_known_endpoint() {
        let config = RedisConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 6379);
        assert_eq!(config.url(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_config_builders() {
        let config = RedisConfig::new("cache.internal", 6380)
            .with_db(3)
            .with_connect_timeout(Duration::from_millis(250))
            .with_response_timeout(Duration::from_millis(500));
        assert_eq!(config.endpoint(), "cache.internal:6380");
        assert_eq!(config.url(), "redis://cache.internal:6380/3");
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.response_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_open_does_not_connect() {
        // Nothing listens on port 1; open must still succeed.
        let store = RedisStore::open(RedisConfig::new("127.0.0.1", 1)).unwrap();
        assert_eq!(store.endpoint(), "redis://127.0.0.1:1/0");
    }

    #[test]
    fn test_open_rejects_empty_host() {
        let err = RedisStore::open(RedisConfig::new("  ", 6379))
            .err()
            .expect("empty host rejected");
        assert!(matches!(err, StoreError::InvalidConfig(_)));
    }
}
