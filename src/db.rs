use crate::{
    address_stats::{most_recently_active, Activity, AddressLedger},
    agg::stream::Grouper,
    db_builder::Builder,
    sample_key::SampleKey,
    samples::SampleStore,
    time::truncate_to_second,
    AddressStats, PingGroup, Probe,
};
use chrono::{DateTime, TimeDelta, Utc};
use fjall::{PersistMode, TxKeyspace};
use std::path::Path;

/// A ping history database
///
/// Samples are grouped by address and minute; each minute key holds up to
/// one 7-byte record per second.
pub struct Database {
    keyspace: TxKeyspace,
    samples_partition: String,
    stats_partition: String,
    hyper_mode: bool,
}

impl Database {
    /// Creates a builder to configure and open a database.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Opens or recovers a database at `path` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Self::builder().open(path)
    }

    pub(crate) fn from_keyspace(keyspace: TxKeyspace, config: Builder) -> Self {
        Self {
            keyspace,
            samples_partition: config.samples_partition,
            stats_partition: config.stats_partition,
            hyper_mode: config.hyper_mode,
        }
    }

    /// Creates the partitions if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn create_schema(&self) -> crate::Result<()> {
        SampleStore::create(&self.keyspace, &self.samples_partition)?;
        AddressLedger::create(&self.keyspace, &self.stats_partition)?;

        log::info!(
            "schema ready: {:?}, {:?}",
            self.samples_partition,
            self.stats_partition
        );

        Ok(())
    }

    /// Deletes the partitions and all data in them, if they exist.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn drop_schema(&self) -> crate::Result<()> {
        if self.keyspace.partition_exists(&self.samples_partition) {
            let store = SampleStore::create(&self.keyspace, &self.samples_partition)?;
            self.keyspace.delete_partition(store.partition().clone())?;
            log::info!("dropped partition {:?}", self.samples_partition);
        }

        if self.keyspace.partition_exists(&self.stats_partition) {
            let ledger = AddressLedger::create(&self.keyspace, &self.stats_partition)?;
            self.keyspace.delete_partition(ledger.partition().clone())?;
            log::info!("dropped partition {:?}", self.stats_partition);
        }

        Ok(())
    }

    fn check_partition(&self, name: &str) -> crate::Result<()> {
        if self.keyspace.partition_exists(name) {
            Ok(())
        } else {
            Err(crate::Error::PartitionNotFound(name.to_owned()))
        }
    }

    fn samples(&self) -> crate::Result<SampleStore> {
        self.check_partition(&self.samples_partition)?;
        SampleStore::create(&self.keyspace, &self.samples_partition)
    }

    fn ledger(&self) -> crate::Result<AddressLedger> {
        self.check_partition(&self.stats_partition)?;
        AddressLedger::create(&self.keyspace, &self.stats_partition)
    }

    fn validate_sample(response_time: f32) -> crate::Result<()> {
        if response_time.is_nan() || response_time < crate::record::TIMEOUT {
            return Err(crate::Error::ResponseTimeOutOfRange(response_time));
        }
        Ok(())
    }

    /// Stores a sample of `address` taken at `ts`.
    ///
    /// `response_time` is in milliseconds, `-1` marks a timeout.
    ///
    /// The sample and the address stats are updated atomically.
    ///
    /// # Errors
    ///
    /// Returns error if the address is empty, the response time is below `-1`,
    /// the schema is missing, or an I/O error occurred.
    pub fn save(&self, address: &str, ts: DateTime<Utc>, response_time: f32) -> crate::Result<()> {
        self.save_all(address, &[(ts, response_time)])
    }

    /// Stores many samples of `address` in one transaction.
    ///
    /// Either all samples are stored, or none.
    ///
    /// # Errors
    ///
    /// See [`Database::save`].
    pub fn save_all(&self, address: &str, samples: &[(DateTime<Utc>, f32)]) -> crate::Result<()> {
        if address.is_empty() {
            return Err(crate::Error::AddressRequired);
        }
        for (_, response_time) in samples {
            Self::validate_sample(*response_time)?;
        }

        let Some(activity) = Activity::from_samples(samples) else {
            return Ok(());
        };

        // NOTE: Sample keys are the longest keys of a write, so check them before
        // anything reaches the engine's key size assertion
        SampleKey::new(address, &activity.first)?;

        let store = self.samples()?;
        let ledger = self.ledger()?;

        let mut tx = self.keyspace.write_tx();

        // NOTE: Dropping the transaction on error discards both updates
        ledger.upsert(&mut tx, address, &activity)?;
        store.append(&mut tx, address, samples)?;

        tx.commit()?;

        if !self.hyper_mode {
            self.keyspace.persist(PersistMode::Buffer)?;
        }

        log::trace!("saved {} sample(s) of {address:?}", samples.len());

        Ok(())
    }

    /// Stores the outcome of a probe that was started at `ts`.
    ///
    /// # Errors
    ///
    /// See [`Database::save`].
    pub fn record(&self, probe: &Probe, ts: DateTime<Utc>) -> crate::Result<()> {
        self.save(probe.address(), ts, probe.response_time())
    }

    /// Summarizes the samples of `address` in `[start, end)` into groups of `bucket` width.
    ///
    /// `start` and `end` are truncated to whole seconds. The groups start at
    /// `start + n * bucket` and cover the whole range, including buckets without
    /// samples; the last group ends at `end`.
    ///
    /// # Errors
    ///
    /// Returns error if the address is empty, the range or bucket width is empty,
    /// the schema is missing, stored data is corrupt, or an I/O error occurred.
    pub fn query(
        &self,
        address: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        bucket: TimeDelta,
    ) -> crate::Result<Vec<PingGroup>> {
        if address.is_empty() {
            return Err(crate::Error::AddressRequired);
        }

        let start = truncate_to_second(start);
        let end = truncate_to_second(end);

        if end <= start {
            return Err(crate::Error::InvalidRange);
        }
        if bucket <= TimeDelta::zero() {
            return Err(crate::Error::InvalidBucketDuration);
        }

        let store = self.samples()?;
        let read_tx = self.keyspace.read_tx();

        log::debug!("querying {address:?} [{start}..{end}) in buckets of {bucket}");

        let samples = store.read(&read_tx, address, &start, &end)?;
        let groups = Grouper::new(samples, start, end, bucket).collect::<crate::Result<Vec<_>>>()?;

        log::debug!("query returned {} group(s)", groups.len());

        Ok(groups)
    }

    /// Returns the stats of `address`, if it has any samples.
    ///
    /// # Errors
    ///
    /// Returns error if the address is empty, the schema is missing,
    /// the stored stats are corrupt, or an I/O error occurred.
    pub fn get_address_stats(&self, address: &str) -> crate::Result<Option<AddressStats>> {
        if address.is_empty() {
            return Err(crate::Error::AddressRequired);
        }

        let ledger = self.ledger()?;
        ledger.get(&self.keyspace.read_tx(), address)
    }

    /// Returns the stats of all addresses, ordered by address.
    ///
    /// # Errors
    ///
    /// Returns error if the schema is missing, stored stats are corrupt, or an I/O error occurred.
    pub fn get_all_address_stats(&self) -> crate::Result<Vec<AddressStats>> {
        let ledger = self.ledger()?;
        ledger.list(&self.keyspace.read_tx())
    }

    /// Returns the address with the most recent sample, if any.
    ///
    /// # Errors
    ///
    /// See [`Database::get_all_address_stats`].
    pub fn most_recently_active(&self) -> crate::Result<Option<String>> {
        let stats = self.get_all_address_stats()?;
        Ok(most_recently_active(&stats).map(|stats| stats.address.clone()))
    }
}
