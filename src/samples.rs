use crate::{
    reader::{Sample, SampleReader},
    record,
    sample_key::SampleKey,
};
use chrono::{DateTime, Utc};
use fjall::{
    CompressionType, PartitionCreateOptions, ReadTransaction, TxKeyspace, TxPartition,
    WriteTransaction,
};
use std::collections::BTreeMap;

/// Per-minute sample records, keyed by `<address>_<minute>`
pub struct SampleStore {
    partition: TxPartition,
}

impl SampleStore {
    pub fn create(keyspace: &TxKeyspace, name: &str) -> crate::Result<Self> {
        let opts = PartitionCreateOptions::default()
            .block_size(4_096)
            .compression(CompressionType::Lz4)
            .max_memtable_size(8_000_000);

        let partition = keyspace.open_partition(name, opts)?;

        Ok(Self { partition })
    }

    pub fn partition(&self) -> &TxPartition {
        &self.partition
    }

    /// Appends the records of `samples` to their minute keys.
    ///
    /// Samples of the same minute are concatenated in the given order, so every key
    /// is read and rewritten once per call.
    pub fn append(
        &self,
        tx: &mut WriteTransaction,
        address: &str,
        samples: &[(DateTime<Utc>, f32)],
    ) -> crate::Result<()> {
        let mut minutes: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();

        for (ts, response_time) in samples {
            let key = SampleKey::new(address, ts)?;
            record::encode_into(minutes.entry(key).or_default(), ts, *response_time)?;
        }

        for (key, records) in minutes {
            self.append_records(tx, &key, &records)?;
        }

        Ok(())
    }

    fn append_records(
        &self,
        tx: &mut WriteTransaction,
        key: &[u8],
        records: &[u8],
    ) -> crate::Result<()> {
        let previous = tx.get(&self.partition, key)?;

        // NOTE: Build a new value instead of touching the engine's buffer
        let previous_len = previous.as_ref().map_or(0, |bytes| bytes.len());
        let mut value = Vec::with_capacity(previous_len + records.len());

        if let Some(previous) = previous {
            value.extend_from_slice(&previous);
        }
        value.extend_from_slice(records);

        log::trace!(
            "appending {} byte(s) to {:?}, now {} byte(s)",
            records.len(),
            String::from_utf8_lossy(key),
            value.len(),
        );

        tx.insert(&self.partition, key, value);

        Ok(())
    }

    /// Scans all minute keys of `address` between the minutes of `start` and `end` (both inclusive).
    pub fn read<'a>(
        &'a self,
        tx: &'a ReadTransaction,
        address: &str,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> crate::Result<impl Iterator<Item = crate::Result<Sample>> + 'a> {
        let min_key = SampleKey::new(address, start)?;
        let max_key = SampleKey::new(address, end)?;

        log::trace!(
            "scanning {:?}..={:?}",
            String::from_utf8_lossy(&min_key),
            String::from_utf8_lossy(&max_key),
        );

        let range = tx.range(&self.partition, min_key..=max_key);

        Ok(SampleReader::new(range, address))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn ts(m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 1, 1, 12, m, s).unwrap()
    }

    fn keys(keyspace: &TxKeyspace, store: &SampleStore) -> crate::Result<Vec<(String, usize)>> {
        let read_tx = keyspace.read_tx();

        let keys = read_tx
            .iter(store.partition())
            .map(|kv| -> crate::Result<(String, usize)> {
                let (k, v) = kv?;
                Ok((String::from_utf8_lossy(&k).into_owned(), v.len()))
            })
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(keys)
    }

    #[test_log::test]
    fn sample_store_same_minute_appends() -> crate::Result<()> {
        let path = tempfile::tempdir()?;
        let keyspace = fjall::Config::new(&path).open_transactional()?;
        let store = SampleStore::create(&keyspace, "samples")?;

        for (s, response_time) in [(0, 1.1), (1, 1.2)] {
            let mut tx = keyspace.write_tx();
            store.append(&mut tx, "127.0.0.1", &[(ts(30, s), response_time)])?;
            tx.commit()?;
        }

        assert_eq!(
            vec![("127.0.0.1_2015-01-01T12:30:00Z".to_owned(), 14)],
            keys(&keyspace, &store)?,
        );

        Ok(())
    }

    #[test_log::test]
    fn sample_store_next_minute_new_key() -> crate::Result<()> {
        let path = tempfile::tempdir()?;
        let keyspace = fjall::Config::new(&path).open_transactional()?;
        let store = SampleStore::create(&keyspace, "samples")?;

        let mut tx = keyspace.write_tx();
        store.append(
            &mut tx,
            "127.0.0.1",
            &[(ts(30, 0), 1.1), (ts(30, 0) + TimeDelta::minutes(1), 1.1)],
        )?;
        tx.commit()?;

        assert_eq!(
            vec![
                ("127.0.0.1_2015-01-01T12:30:00Z".to_owned(), 7),
                ("127.0.0.1_2015-01-01T12:31:00Z".to_owned(), 7),
            ],
            keys(&keyspace, &store)?,
        );

        Ok(())
    }

    #[test_log::test]
    fn sample_store_rollback() -> crate::Result<()> {
        let path = tempfile::tempdir()?;
        let keyspace = fjall::Config::new(&path).open_transactional()?;
        let store = SampleStore::create(&keyspace, "samples")?;

        {
            let mut tx = keyspace.write_tx();
            store.append(&mut tx, "127.0.0.1", &[(ts(30, 0), 1.1)])?;
            tx.rollback();
        }

        assert!(keys(&keyspace, &store)?.is_empty());

        Ok(())
    }

    #[test_log::test]
    fn sample_store_read_range() -> crate::Result<()> {
        let path = tempfile::tempdir()?;
        let keyspace = fjall::Config::new(&path).open_transactional()?;
        let store = SampleStore::create(&keyspace, "samples")?;

        let mut tx = keyspace.write_tx();
        for m in 0..5 {
            store.append(&mut tx, "10.0.0.1", &[(ts(m, 10), 1.0)])?;
            store.append(&mut tx, "10.0.0.10", &[(ts(m, 10), 2.0)])?;
        }
        tx.commit()?;

        let read_tx = keyspace.read_tx();
        let samples = store
            .read(&read_tx, "10.0.0.1", &ts(1, 30), &ts(3, 0))?
            .collect::<crate::Result<Vec<_>>>()?;

        assert_eq!(
            vec![ts(1, 10), ts(2, 10), ts(3, 10)],
            samples.iter().map(|s| s.timestamp).collect::<Vec<_>>(),
        );
        assert!(samples.iter().all(|s| (s.response_time - 1.0).abs() < f64::EPSILON));

        Ok(())
    }
}
