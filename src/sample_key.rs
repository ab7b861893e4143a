use crate::time::truncate_to_minute;
use chrono::{DateTime, SecondsFormat, Utc};

/// Largest key the storage engine accepts.
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

const SEPARATOR: char = '_';

/// Length of a second-precision RFC 3339 UTC timestamp, e.g. `2015-01-01T12:30:00Z`.
const TIMESTAMP_LEN: usize = 20;

#[doc(hidden)]
pub struct SampleKey;

impl SampleKey {
    /// Formats the key of the minute `ts` falls into: `<address>_<RFC 3339 minute>`.
    ///
    /// The timestamp never contains the separator, so the key is split on the last one.
    #[doc(hidden)]
    #[must_use]
    pub fn format(address: &str, ts: &DateTime<Utc>) -> String {
        let mut str = String::with_capacity(address.len() + 1 + TIMESTAMP_LEN);
        str.push_str(address);
        str.push(SEPARATOR);
        str.push_str(&truncate_to_minute(*ts).to_rfc3339_opts(SecondsFormat::Secs, true));
        str
    }

    /// Like [`SampleKey::format`], but checks the engine's key size limit.
    #[doc(hidden)]
    pub fn new(address: &str, ts: &DateTime<Utc>) -> crate::Result<Vec<u8>> {
        let key = Self::format(address, ts);

        if key.len() > MAX_KEY_LEN {
            return Err(crate::Error::KeyTooLarge(key.len()));
        }

        Ok(key.into_bytes())
    }

    /// Splits a key into its address and the start of its minute.
    #[doc(hidden)]
    pub fn parse(key: &[u8]) -> crate::Result<(&str, DateTime<Utc>)> {
        let invalid = || crate::Error::InvalidKey(key.to_vec());

        let str = std::str::from_utf8(key).map_err(|_| invalid())?;
        let (address, ts) = str.rsplit_once(SEPARATOR).ok_or_else(invalid)?;

        if address.is_empty() {
            return Err(invalid());
        }

        let ts = DateTime::parse_from_rfc3339(ts)?.with_timezone(&Utc);

        Ok((address, ts))
    }
}
