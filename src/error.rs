/// Broad category of an [`Error`].
///
/// Nothing in this crate retries, so the kind tells the caller what to do next.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input was rejected before any I/O happened.
    Validation,

    /// A partition is missing; run [`crate::Database::create_schema`].
    Schema,

    /// Stored bytes or keys could not be decoded (corrupt or foreign data).
    Codec,

    /// The storage engine or the file system failed.
    Store,
}

/// Error type
#[derive(Debug)]
pub enum Error {
    /// An IO error.
    Io(std::io::Error),

    /// Error in storage engine.
    Storage(fjall::Error),

    /// The address of a sample or query was empty.
    AddressRequired,

    /// A response time below the timeout sentinel (`-1`) was given.
    ResponseTimeOutOfRange(f32),

    /// The query range is empty (`end <= start`).
    InvalidRange,

    /// The bucket duration of a query is not positive.
    InvalidBucketDuration,

    /// The named partition does not exist.
    PartitionNotFound(String),

    /// A record did not have exactly 7 bytes.
    InvalidByteLength(usize),

    /// A record's second offset was larger than 59.
    SecondOffsetOutOfRange(u8),

    /// A storage key had no address/timestamp separator, or was not UTF-8.
    InvalidKey(Vec<u8>),

    /// The timestamp part of a storage key is not RFC 3339.
    KeyTimestampParsing(chrono::ParseError),

    /// A key exceeds the storage engine's key size limit.
    KeyTooLarge(usize),

    /// An address stats record could not be (de)serialized.
    InvalidAddressStats(serde_json::Error),
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AddressRequired
            | Self::ResponseTimeOutOfRange(_)
            | Self::InvalidRange
            | Self::InvalidBucketDuration => ErrorKind::Validation,
            Self::PartitionNotFound(_) => ErrorKind::Schema,
            Self::InvalidByteLength(_)
            | Self::SecondOffsetOutOfRange(_)
            | Self::InvalidKey(_)
            | Self::KeyTimestampParsing(_)
            | Self::InvalidAddressStats(_) => ErrorKind::Codec,
            Self::Io(_) | Self::Storage(_) | Self::KeyTooLarge(_) => ErrorKind::Store,
        }
    }
}

impl From<fjall::Error> for Error {
    fn from(value: fjall::Error) -> Self {
        Self::Storage(value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<chrono::ParseError> for Error {
    fn from(value: chrono::ParseError) -> Self {
        Self::KeyTimestampParsing(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidAddressStats(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(e) => {
                write!(f, "{e}")
            }
            Self::Io(e) => {
                write!(f, "{e}")
            }
            Self::AddressRequired => {
                write!(f, "address can't be empty")
            }
            Self::ResponseTimeOutOfRange(v) => {
                write!(f, "response time must be >= -1, got {v}")
            }
            Self::InvalidRange => {
                write!(f, "query end must be after query start")
            }
            Self::InvalidBucketDuration => {
                write!(f, "bucket duration must be positive")
            }
            Self::PartitionNotFound(name) => {
                write!(f, "could not find partition {name:?}")
            }
            Self::InvalidByteLength(len) => {
                write!(f, "invalid record length: {len} bytes")
            }
            Self::SecondOffsetOutOfRange(offset) => {
                write!(f, "second offset is too large (> 59): {offset}")
            }
            Self::InvalidKey(key) => {
                write!(f, "could not parse key {:?}", String::from_utf8_lossy(key))
            }
            Self::KeyTimestampParsing(e) => {
                write!(f, "can't parse key timestamp: {e}")
            }
            Self::KeyTooLarge(len) => {
                write!(f, "key too large: {len} bytes")
            }
            Self::InvalidAddressStats(e) => {
                write!(f, "invalid address stats: {e}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Storage(e) => Some(e),
            Self::KeyTimestampParsing(e) => Some(e),
            Self::InvalidAddressStats(e) => Some(e),
            _ => None,
        }
    }
}

/// Result helper type
pub type Result<T> = std::result::Result<T, Error>;
