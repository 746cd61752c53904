//! Durable key-value storage.
//!
//! Holds the few things that outlive a session: the achievement map, the Snake
//! high score and the notepad. Backends are picked by URL scheme:
//! - `memory://` - process-local, used by tests
//! - `file://<path>` - a single JSON object on disk, rewritten on every write
//! - `redis://...` - one Redis string per key under the `pkos:` prefix

use pkos_common::PkosError;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub type StoreResult<T> = Result<T, PkosError>;

/// Write-through string store
pub trait KvStore {
    fn get(&mut self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// Open the backend named by `url`
pub fn open_store(url: &str) -> StoreResult<Box<dyn KvStore>> {
    if url.starts_with("memory://") {
        return Ok(Box::new(MemoryStore::default()));
    }
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(Box::new(FileStore::open(path)?));
    }
    if url.starts_with("redis://") || url.starts_with("rediss://") {
        return Ok(Box::new(RedisStore::open(url)?));
    }
    Err(PkosError::Config(format!("Unsupported store URL: {}", url)))
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KvStore for MemoryStore {
    fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON file store
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                PkosError::Store(format!("Failed to read store file {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&raw)?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "File store opened");

        Ok(Self { path, entries })
    }

    fn flush(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PkosError::Store(format!("Failed to create store directory: {}", e))
                })?;
            }
        }
        let data = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, data).map_err(|e| {
            PkosError::Store(format!(
                "Failed to write store file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl KvStore for FileStore {
    fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Transport failures are retryable store errors; anything Redis itself
/// rejected is not
fn redis_error(err: redis::RedisError) -> PkosError {
    if err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
    {
        PkosError::Store(err.to_string())
    } else {
        PkosError::Internal(err.to_string())
    }
}

/// Redis store (blocking connection; the console is single-threaded)
pub struct RedisStore {
    client: redis::Client,
    conn: redis::Connection,
}

impl RedisStore {
    const PREFIX: &'static str = "pkos:";

    pub fn open(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| PkosError::Config(format!("Invalid Redis URL: {}", e)))?;
        let conn = client.get_connection().map_err(redis_error)?;
        Ok(Self { client, conn })
    }

    fn key(key: &str) -> String {
        format!("{}{}", Self::PREFIX, key)
    }

    /// Run `op`, reconnecting once when the connection failed
    fn run<T>(
        &mut self,
        op: impl Fn(&mut redis::Connection) -> redis::RedisResult<T>,
    ) -> StoreResult<T> {
        match op(&mut self.conn).map_err(redis_error) {
            Err(e) if e.is_retryable() => {
                tracing::warn!(error = %e, "Redis operation failed, reconnecting");
                self.conn = self.client.get_connection().map_err(redis_error)?;
                op(&mut self.conn).map_err(redis_error)
            }
            result => result,
        }
    }
}

impl KvStore for RedisStore {
    fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        use redis::Commands;
        let key = Self::key(key);
        self.run(|conn| conn.get(&key))
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        use redis::Commands;
        let key = Self::key(key);
        self.run(|conn| conn.set::<_, _, ()>(&key, value))
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        use redis::Commands;
        let key = Self::key(key);
        self.run(|conn| conn.del::<_, ()>(&key))
    }
}
