use crate::{
    record::{self, RECORD_LEN},
    sample_key::SampleKey,
};
use chrono::{DateTime, TimeDelta, Utc};

/// A decoded sample
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub response_time: f64,
}

macro_rules! fail_iter {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(e) => return Some(Err(crate::Error::from(e))),
        }
    };
}

/// Decodes the minute keys of one address into a chronological stream of samples.
///
/// Keys of other addresses that sort into the scanned range are skipped.
pub struct SampleReader<I, K, V>
where
    I: Iterator<Item = fjall::Result<(K, V)>>,
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    inner: I,
    address: String,
    minute: std::vec::IntoIter<Sample>,
}

impl<I, K, V> SampleReader<I, K, V>
where
    I: Iterator<Item = fjall::Result<(K, V)>>,
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    pub fn new(inner: I, address: &str) -> Self {
        Self {
            inner,
            address: address.to_owned(),
            minute: Vec::new().into_iter(),
        }
    }

    fn decode_minute(&self, key: &[u8], value: &[u8]) -> crate::Result<Option<Vec<Sample>>> {
        let (address, minute) = SampleKey::parse(key)?;

        if address != self.address {
            log::trace!("skipping key {:?} of another address", String::from_utf8_lossy(key));
            return Ok(None);
        }

        let mut samples = Vec::with_capacity(value.len() / RECORD_LEN);

        for chunk in value.chunks(RECORD_LEN) {
            let (second_offset, response_time) = record::decode(chunk)?;

            samples.push(Sample {
                timestamp: minute + TimeDelta::seconds(i64::from(second_offset)),
                response_time,
            });
        }

        // NOTE: Records are in write order, which is not necessarily chronological
        samples.sort_by_key(|sample| sample.timestamp);

        Ok(Some(samples))
    }
}

impl<I, K, V> Iterator for SampleReader<I, K, V>
where
    I: Iterator<Item = fjall::Result<(K, V)>>,
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    type Item = crate::Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(sample) = self.minute.next() {
                return Some(Ok(sample));
            }

            let (key, value) = fail_iter!(self.inner.next()?);

            if let Some(samples) = fail_iter!(self.decode_minute(key.as_ref(), value.as_ref())) {
                self.minute = samples.into_iter();
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn minute(m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 1, 1, 12, m, 0).unwrap()
    }

    fn kv(address: &str, m: u32, records: &[(i64, f32)]) -> fjall::Result<(Vec<u8>, Vec<u8>)> {
        let mut value = vec![];
        for &(second, response_time) in records {
            record::encode_into(&mut value, &(minute(m) + TimeDelta::seconds(second)), response_time)
                .unwrap();
        }
        Ok((SampleKey::new(address, &minute(m)).unwrap(), value))
    }

    #[test_log::test]
    fn sample_reader_decodes_in_order() -> crate::Result<()> {
        let kvs = vec![
            kv("h", 0, &[(0, 1.0), (30, 2.0), (15, -1.0)]),
            kv("h", 1, &[(5, 3.0)]),
        ];

        let samples = SampleReader::new(kvs.into_iter(), "h").collect::<crate::Result<Vec<_>>>()?;

        assert_eq!(
            vec![
                Sample { timestamp: minute(0), response_time: 1.0 },
                Sample { timestamp: minute(0) + TimeDelta::seconds(15), response_time: -1.0 },
                Sample { timestamp: minute(0) + TimeDelta::seconds(30), response_time: 2.0 },
                Sample { timestamp: minute(1) + TimeDelta::seconds(5), response_time: 3.0 },
            ],
            samples,
        );

        Ok(())
    }

    #[test_log::test]
    fn sample_reader_skips_other_addresses() -> crate::Result<()> {
        let kvs = vec![
            kv("h", 0, &[(0, 1.0)]),
            kv("h_2015-01-01T12:00:30Z", 0, &[(0, 9.0)]),
            kv("h", 1, &[(0, 1.0)]),
        ];

        let samples = SampleReader::new(kvs.into_iter(), "h").collect::<crate::Result<Vec<_>>>()?;

        assert_eq!(2, samples.len());
        assert!(samples.iter().all(|s| s.response_time == 1.0));

        Ok(())
    }

    #[test_log::test]
    fn sample_reader_truncated_value() {
        let (key, mut value) = kv("h", 0, &[(0, 1.0), (1, 1.0)]).unwrap();
        value.pop();

        let mut reader = SampleReader::new(vec![Ok((key, value))].into_iter(), "h");
        assert!(matches!(
            reader.next(),
            Some(Err(crate::Error::InvalidByteLength(6)))
        ));
    }

    #[test_log::test]
    fn sample_reader_invalid_key() {
        let kvs: Vec<fjall::Result<(Vec<u8>, Vec<u8>)>> = vec![Ok((b"h_garbage".to_vec(), vec![]))];

        let mut reader = SampleReader::new(kvs.into_iter(), "h");
        assert!(matches!(
            reader.next(),
            Some(Err(crate::Error::KeyTimestampParsing(_)))
        ));
    }
}
