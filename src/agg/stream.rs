use super::PingGroup;
use crate::reader::Sample;
use chrono::{DateTime, TimeDelta, Utc};

/// A streaming grouper
///
/// Takes in a chronological stream of samples, and emits one finalized group per
/// bucket of `[start, end)`, including buckets without any samples.
pub struct Grouper<I: Iterator<Item = crate::Result<Sample>>> {
    samples: I,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    width: TimeDelta,
    group: PingGroup,
    pending: Option<Sample>,
    is_exhausted: bool,
    is_done: bool,
}

impl<I: Iterator<Item = crate::Result<Sample>>> Grouper<I> {
    /// `start < end` and a positive `width` are checked by the caller.
    pub fn new(samples: I, start: DateTime<Utc>, end: DateTime<Utc>, width: TimeDelta) -> Self {
        Self {
            samples,
            start,
            end,
            width,
            group: PingGroup::new(start, Self::window_end(start, width, end)),
            pending: None,
            is_exhausted: false,
            is_done: false,
        }
    }

    fn window_end(start: DateTime<Utc>, width: TimeDelta, end: DateTime<Utc>) -> DateTime<Utc> {
        start
            .checked_add_signed(width)
            .map_or(end, |window_end| window_end.min(end))
    }

    fn next_sample(&mut self) -> Option<crate::Result<Sample>> {
        if let Some(sample) = self.pending.take() {
            return Some(Ok(sample));
        }
        if self.is_exhausted {
            return None;
        }
        self.samples.next()
    }

    /// Finalizes the current group and opens the adjacent one.
    fn advance(&mut self) -> PingGroup {
        let start = self.group.end;
        let next = PingGroup::new(start, Self::window_end(start, self.width, self.end));

        let mut group = std::mem::replace(&mut self.group, next);
        group.finalize();
        group
    }
}

impl<I: Iterator<Item = crate::Result<Sample>>> Iterator for Grouper<I> {
    type Item = crate::Result<PingGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done {
            return None;
        }

        while let Some(sample) = self.next_sample() {
            let sample = match sample {
                Ok(v) => v,
                Err(e) => {
                    self.is_done = true;
                    return Some(Err(e));
                }
            };

            if sample.timestamp >= self.end {
                // NOTE: Samples are sorted, nothing after this one is in range
                break;
            }

            if sample.timestamp < self.start {
                // NOTE: The first minute key may start before the range
                continue;
            }

            if self.group.contains(&sample.timestamp) {
                self.group.add(sample.response_time);
                continue;
            }

            if sample.timestamp < self.group.start {
                log::warn!(
                    "skipping out-of-order sample at {}, group already closed",
                    sample.timestamp
                );
                continue;
            }

            // NOTE: Sample belongs to a later window, return current group
            // and keep the sample for the next call
            self.pending = Some(sample);
            return Some(Ok(self.advance()));
        }

        self.is_exhausted = true;

        // NOTE: Emit the remaining (possibly empty) groups up to the end of the range
        if self.group.start >= self.end {
            self.is_done = true;
            return None;
        }

        Some(Ok(self.advance()))
    }
}
