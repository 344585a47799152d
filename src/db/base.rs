//! Connection handling.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use crate::error::{Error, Result};
use crate::events::{Emitter, Event};
use crate::logging::{debug, info, warn};
use crate::types::ConnectionOptions;

/// URL scheme accepted in front of a filesystem path.
const URL_SCHEME: &str = "fjall://";

/// Keyspace name prefix for tables.
const TABLE_PREFIX: &str = "table_";

struct Connection {
    url: String,
    path: PathBuf,
    ready_at: Instant,
    db: fjall::Database,
}

/// Connection and event source shared by every table handle.
pub struct Base {
    options: ConnectionOptions,
    events: Emitter,
    state: RwLock<Option<Connection>>,
    // held across read-modify-write cycles
    writes: Mutex<()>,
}

/// One table of an open connection, valid while the connection lock is held.
pub(crate) struct TableHandle<'a> {
    pub(crate) keyspace: Keyspace,
    db: &'a fjall::Database,
    durable: bool,
}

impl TableHandle<'_> {
    /// Persist pending writes according to the connection options.
    pub(crate) fn flush(&self) -> Result<()> {
        let mode = if self.durable {
            PersistMode::SyncAll
        } else {
            PersistMode::Buffer
        };
        self.db.persist(mode)?;
        Ok(())
    }
}

/// Filesystem location for a connection URL.
///
/// Accepts `fjall://<path>` or a bare path.
pub fn storage_path(url: &str) -> Result<PathBuf> {
    let path = url.strip_prefix(URL_SCHEME).unwrap_or(url).trim();
    if path.is_empty() {
        return Err(Error::InvalidUrl(url.to_string()));
    }
    Ok(PathBuf::from(path))
}

impl Base {
    /// Create an unconnected base.
    pub fn new(options: ConnectionOptions) -> Self {
        Self {
            options,
            events: Emitter::new(),
            state: RwLock::new(None),
            writes: Mutex::new(()),
        }
    }

    /// Open the store at `url`, replacing any current connection.
    ///
    /// Emits `debug` before connecting, then `ready` on success or `error`
    /// on failure. A failed connect leaves the current connection in place.
    pub fn connect(&self, url: &str) -> Result<()> {
        self.events.debug("Creating database connection...");

        let mut state = self.state.write();
        if let Err(e) = self.open_into(&mut state, url) {
            self.events.error(e.to_string());
            return Err(e);
        }
        drop(state);

        info!(url = url, durable = self.options.durable, "database connected");
        self.events.ready();
        Ok(())
    }

    fn open_into(&self, state: &mut Option<Connection>, url: &str) -> Result<()> {
        let path = storage_path(url)?;
        if let Some(current) = state.as_mut() {
            current.db.persist(PersistMode::SyncAll)?;
            if current.path == path {
                current.url = url.to_string();
                current.ready_at = Instant::now();
                return Ok(());
            }
        }

        let db = fjall::Database::builder(path.clone()).open()?;
        let previous = state.replace(Connection {
            url: url.to_string(),
            path,
            ready_at: Instant::now(),
            db,
        });
        if let Some(previous) = previous {
            warn!(url = %previous.url, "replaced open connection");
        }
        Ok(())
    }

    /// Flush and close the connection. Closing twice is a no-op.
    pub fn disconnect(&self) -> Result<()> {
        let Some(connection) = self.state.write().take() else {
            return Ok(());
        };
        connection.db.persist(PersistMode::SyncAll)?;
        drop(connection);

        info!("database disconnected");
        self.events.debug("Database disconnected!");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().is_some()
    }

    /// URL of the open connection.
    pub fn url(&self) -> Option<String> {
        self.state.read().as_ref().map(|c| c.url.clone())
    }

    /// When the open connection became ready.
    pub fn ready_at(&self) -> Option<Instant> {
        self.state.read().as_ref().map(|c| c.ready_at)
    }

    /// Time since the connection became ready, zero when disconnected.
    pub fn uptime(&self) -> Duration {
        self.ready_at().map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn events(&self) -> &Emitter {
        &self.events
    }

    /// Receive `debug`, `error` and `ready` events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Like [`with_table`](Self::with_table), but serialized against every
    /// other writer so a read-modify-write cannot interleave with another.
    pub(crate) fn with_table_mut<T>(
        &self,
        table: &str,
        f: impl FnOnce(&TableHandle<'_>) -> Result<T>,
    ) -> Result<T> {
        let _writer = self.writes.lock();
        self.with_table(table, f)
    }

    /// Run `f` against the keyspace backing `table`.
    pub(crate) fn with_table<T>(
        &self,
        table: &str,
        f: impl FnOnce(&TableHandle<'_>) -> Result<T>,
    ) -> Result<T> {
        let guard = self.state.read();
        let connection = guard.as_ref().ok_or(Error::NotConnected)?;

        let name = format!("{}{}", TABLE_PREFIX, table);
        debug!(keyspace = %name, "opening table keyspace");
        let keyspace = connection.db.keyspace(&name, KeyspaceCreateOptions::default)?;

        f(&TableHandle {
            keyspace,
            db: &connection.db,
            durable: self.options.durable,
        })
    }
}

impl Drop for Base {
    fn drop(&mut self) {
        if let Some(connection) = self.state.get_mut().take() {
            // errors cannot surface from drop
            let _ = connection.db.persist(PersistMode::SyncAll);
        }
    }
}
