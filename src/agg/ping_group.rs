use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of the samples that fall into `[start, end)`.
///
/// Latencies are in milliseconds. Timed out samples only count towards
/// `timed_out`; all other statistics describe received samples.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PingGroup {
    /// Start of the window (inclusive)
    pub start: DateTime<Utc>,

    /// End of the window (exclusive)
    pub end: DateTime<Utc>,

    /// Number of received replies
    pub received: usize,

    /// Number of timed out probes
    pub timed_out: usize,

    /// Sum of all received response times
    pub total_time: f64,

    /// `total_time / received`, 0 if nothing was received
    pub avg_time: f64,

    /// Population standard deviation of the received response times
    pub std_dev: f64,

    /// Smallest received response time, 0 if nothing was received
    pub min_time: f64,

    /// Largest received response time, 0 if nothing was received
    pub max_time: f64,

    /// Received response times, freed by `finalize`
    #[serde(skip)]
    response_times: Vec<f64>,

    #[serde(skip)]
    is_finalized: bool,
}

impl PingGroup {
    pub(crate) fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            received: 0,
            timed_out: 0,
            total_time: 0.0,
            avg_time: 0.0,
            std_dev: 0.0,
            min_time: 0.0,
            max_time: 0.0,
            response_times: Vec::new(),
            is_finalized: false,
        }
    }

    /// Returns `true` if `ts` lies inside the window.
    #[must_use]
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.start <= *ts && *ts < self.end
    }

    /// Returns `true` if no sample (received or timed out) fell into the window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.received == 0 && self.timed_out == 0
    }

    /// Share of probes that timed out, 0 for an empty group.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn loss_ratio(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.timed_out as f64 / (self.received + self.timed_out) as f64
    }

    /// Folds one response time into the group; negative values count as timeouts.
    pub(crate) fn add(&mut self, response_time: f64) {
        debug_assert!(!self.is_finalized, "group is already finalized");

        if response_time < 0.0 {
            self.timed_out += 1;
            return;
        }

        if self.received == 0 || response_time < self.min_time {
            self.min_time = response_time;
        }
        if self.received == 0 || response_time > self.max_time {
            self.max_time = response_time;
        }

        self.received += 1;
        self.total_time += response_time;
        self.response_times.push(response_time);
    }

    /// Computes average and standard deviation, then frees the buffered response times.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn finalize(&mut self) {
        if self.is_finalized {
            return;
        }
        self.is_finalized = true;

        if self.received == 0 {
            self.avg_time = 0.0;
            self.std_dev = 0.0;
            return;
        }

        let count = self.received as f64;
        let avg = self.total_time / count;

        let sum_diff_sq = self
            .response_times
            .iter()
            .map(|x| (x - avg).powi(2))
            .sum::<f64>();

        self.avg_time = avg;
        self.std_dev = (sum_diff_sq / count).sqrt();
        self.response_times = Vec::new();
    }
}
