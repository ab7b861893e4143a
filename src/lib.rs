//! A small, embeddable ping history database.
//!
//! It uses <https://github.com/fjall-rs/fjall> as its underlying storage engine.
//!
//! Latency samples are keyed by address and minute. Every minute key holds a flat
//! array of 7-byte records (second offset + `f32` response time), so a probe per second
//! costs 420 bytes per hour before compression.
//!
//! Queries fold the samples of a time range into fixed-width groups with
//! min / avg / max / population standard deviation and the number of timeouts.
//! Every bucket of the range is returned, including empty ones.
//!
//! ```
//! # let dir = tempfile::tempdir()?;
//! use chrono::TimeDelta;
//! use pinghist::Database;
//!
//! let db = Database::builder().open(dir.path())?;
//!
//! let now = pinghist::now();
//!
//! db.save("127.0.0.1", now - TimeDelta::seconds(2), 14.2)?;
//! db.save("127.0.0.1", now - TimeDelta::seconds(1), -1.0 /* timed out */)?;
//!
//! let groups = db.query(
//!     "127.0.0.1",
//!     now - TimeDelta::minutes(10),
//!     now,
//!     /* bucket width */ TimeDelta::minutes(5),
//! )?;
//!
//! assert_eq!(2, groups.len());
//! assert_eq!(1, groups[1].received);
//! assert_eq!(1, groups[1].timed_out);
//!
//! assert_eq!(Some("127.0.0.1".to_owned()), db.most_recently_active()?);
//!
//! # Ok::<(), pinghist::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![warn(clippy::multiple_crate_versions)]
#![warn(clippy::result_unit_err)]

mod address_stats;
mod agg;
mod db;
mod db_builder;
mod error;
mod probe;
mod reader;

#[doc(hidden)]
pub mod record;

mod sample_key;
mod samples;
mod time;

pub use address_stats::AddressStats;
pub use agg::PingGroup;
pub use db::Database;
pub use db_builder::{Builder, ADDRESS_STATS_PARTITION, SAMPLES_PARTITION};
pub use error::{Error, ErrorKind, Result};
pub use probe::Probe;
pub use time::now;

#[doc(hidden)]
pub use sample_key::SampleKey;
