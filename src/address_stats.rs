use crate::sample_key::{SampleKey, MAX_KEY_LEN};
use chrono::{DateTime, Utc};
use fjall::{
    CompressionType, PartitionCreateOptions, ReadTransaction, TxKeyspace, TxPartition,
    WriteTransaction,
};
use serde::{Deserialize, Serialize};

/// Summary information about the samples of one address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStats {
    /// The address
    pub address: String,

    /// Storage key of the minute of the first sample
    pub first_sample_key: String,

    /// Time of the first sample
    pub first_sample_time: DateTime<Utc>,

    /// Storage key of the minute of the last sample
    pub last_sample_key: String,

    /// Time of the last sample
    pub last_sample_time: DateTime<Utc>,

    /// Number of received replies
    #[serde(default)]
    pub received: u64,

    /// Number of timed out probes
    #[serde(default)]
    pub timed_out: u64,
}

/// What a write contributes to an address' stats
#[derive(Clone, Debug)]
pub struct Activity {
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
    pub received: u64,
    pub timed_out: u64,
}

impl Activity {
    /// Summarizes samples in any order; `None` if there are none.
    pub fn from_samples(samples: &[(DateTime<Utc>, f32)]) -> Option<Self> {
        let first = samples.iter().map(|(ts, _)| ts).min()?;
        let last = samples.iter().map(|(ts, _)| ts).max()?;

        let timed_out = samples.iter().filter(|(_, rt)| *rt < 0.0).count() as u64;

        Some(Self {
            first: *first,
            last: *last,
            received: samples.len() as u64 - timed_out,
            timed_out,
        })
    }
}

/// Maps addresses to their [`AddressStats`], stored as JSON
pub struct AddressLedger {
    partition: TxPartition,
}

impl AddressLedger {
    pub fn create(keyspace: &TxKeyspace, name: &str) -> crate::Result<Self> {
        let opts = PartitionCreateOptions::default()
            .block_size(4_096)
            .compression(CompressionType::Lz4);

        let partition = keyspace.open_partition(name, opts)?;

        Ok(Self { partition })
    }

    pub fn partition(&self) -> &TxPartition {
        &self.partition
    }

    fn deserialize(bytes: &[u8]) -> crate::Result<AddressStats> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Creates or updates the stats of `address` inside the write transaction.
    pub fn upsert(
        &self,
        tx: &mut WriteTransaction,
        address: &str,
        activity: &Activity,
    ) -> crate::Result<AddressStats> {
        if address.len() > MAX_KEY_LEN {
            return Err(crate::Error::KeyTooLarge(address.len()));
        }

        let last_sample_key = SampleKey::format(address, &activity.last);

        let stats = match tx.get(&self.partition, address)? {
            Some(bytes) => {
                let mut stats = Self::deserialize(&bytes)?;
                stats.last_sample_key = last_sample_key;
                stats.last_sample_time = activity.last;
                stats.received += activity.received;
                stats.timed_out += activity.timed_out;
                stats
            }
            None => {
                log::debug!("first sample of {address:?}");

                AddressStats {
                    address: address.to_owned(),
                    first_sample_key: SampleKey::format(address, &activity.first),
                    first_sample_time: activity.first,
                    last_sample_key,
                    last_sample_time: activity.last,
                    received: activity.received,
                    timed_out: activity.timed_out,
                }
            }
        };

        tx.insert(&self.partition, address, serde_json::to_vec(&stats)?);

        Ok(stats)
    }

    pub fn get(&self, tx: &ReadTransaction, address: &str) -> crate::Result<Option<AddressStats>> {
        if address.len() > MAX_KEY_LEN {
            return Ok(None);
        }

        tx.get(&self.partition, address)?
            .map(|bytes| Self::deserialize(&bytes))
            .transpose()
    }

    /// Returns all stats, ordered by address.
    pub fn list(&self, tx: &ReadTransaction) -> crate::Result<Vec<AddressStats>> {
        tx.iter(&self.partition)
            .map(|kv| {
                let (_, v) = kv?;
                Self::deserialize(&v)
            })
            .collect()
    }
}

/// Picks the stats with the latest `last_sample_time`.
///
/// On ties the one listed last wins, like taking the tail of a stable ascending sort.
pub fn most_recently_active(stats: &[AddressStats]) -> Option<&AddressStats> {
    stats.iter().fold(None, |best: Option<&AddressStats>, candidate| match best {
        Some(best) if best.last_sample_time > candidate.last_sample_time => Some(best),
        _ => Some(candidate),
    })
}
