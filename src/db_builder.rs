use crate::Database;
use fjall::{BlockCache, TxKeyspace};
use std::{path::Path, sync::Arc};

/// Default name of the partition holding the per-minute sample records.
pub const SAMPLES_PARTITION: &str = "_pinghist#v1#samples";

/// Default name of the partition holding the address stats.
pub const ADDRESS_STATS_PARTITION: &str = "_pinghist#v1#address_stats";

/// Builder for [`Database`].
#[derive(Clone, Debug)]
pub struct Builder {
    cache_size_mib: u64,
    pub(crate) hyper_mode: bool,
    pub(crate) samples_partition: String,
    pub(crate) stats_partition: String,
    create_schema: bool,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            cache_size_mib: 64,
            hyper_mode: false,
            samples_partition: SAMPLES_PARTITION.into(),
            stats_partition: ADDRESS_STATS_PARTITION.into(),
            create_schema: true,
        }
    }

    /// Sets the cache size in MiB.
    ///
    /// Default = 64 MiB
    #[must_use]
    pub fn cache_size_mib(mut self, mib: u64) -> Self {
        self.cache_size_mib = mib;
        self
    }

    /// If `true`, writes become faster by skipping the `write()` syscall to OS buffers.
    ///
    /// However, writes are then not application-crash safe.
    #[must_use]
    pub fn hyper_mode(mut self, enabled: bool) -> Self {
        self.hyper_mode = enabled;
        self
    }

    /// Sets the name of the partition that stores samples.
    ///
    /// Default = `_pinghist#v1#samples`
    #[must_use]
    pub fn samples_partition<S: Into<String>>(mut self, name: S) -> Self {
        self.samples_partition = name.into();
        self
    }

    /// Sets the name of the partition that stores address stats.
    ///
    /// Default = `_pinghist#v1#address_stats`
    #[must_use]
    pub fn stats_partition<S: Into<String>>(mut self, name: S) -> Self {
        self.stats_partition = name.into();
        self
    }

    /// If `true` (default), partitions are created when opening.
    ///
    /// Otherwise [`Database::create_schema`] has to be called before use.
    #[must_use]
    pub fn create_schema(mut self, enabled: bool) -> Self {
        self.create_schema = enabled;
        self
    }

    /// Opens or recovers a ping history database.
    ///
    /// If you have a keyspace already in your application, you may
    /// want to use `open_in_keyspace` instead.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn open<P: AsRef<Path>>(self, path: P) -> crate::Result<Database> {
        let keyspace = fjall::Config::new(path)
            .block_cache(Arc::new(BlockCache::with_capacity_bytes(
                self.cache_size_mib * 1_024 * 1_024,
            )))
            .open_transactional()?;

        self.open_in_keyspace(keyspace)
    }

    /// Uses an existing `fjall` keyspace to open a ping history database.
    ///
    /// Partitions are prefixed with `_pinghist#` by default to avoid name clashes with other applications.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn open_in_keyspace(self, keyspace: TxKeyspace) -> crate::Result<Database> {
        let create_schema = self.create_schema;
        let db = Database::from_keyspace(keyspace, self);

        if create_schema {
            db.create_schema()?;
        }

        Ok(db)
    }
}
