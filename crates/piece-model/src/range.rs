use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Closed tick interval `[low, high]`.
///
/// Valid ranges satisfy `low < high`: a zero-length range is rejected at
/// construction, which is what lets the pairing matcher guarantee that
/// every emitted note has a positive span. Immutable value type; the
/// `with_low`/`with_high` "setters" return validated copies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Range {
    low: u32,
    high: u32,
}

impl Range {
    pub fn new(low: u32, high: u32) -> Result<Self> {
        if high <= low {
            return Err(Error::InvalidRange { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    /// Half-open span: for `[0, 479]` this is `479`.
    pub fn length(&self) -> u32 {
        self.high - self.low
    }

    /// Inclusive span: for `[0, 479]` this is `480`.
    pub fn duration(&self) -> u32 {
        self.length() + 1
    }

    /// True if this range and `other` share at least one tick.
    pub fn overlaps(&self, other: Range) -> bool {
        self.low <= other.high && other.low <= self.high
    }

    pub fn contains_tick(&self, tick: u32) -> bool {
        self.low <= tick && tick <= self.high
    }

    /// True if `other` lies entirely within this range.
    pub fn contains(&self, other: Range) -> bool {
        self.low <= other.low && other.high <= self.high
    }

    /// This range slid forward by `ticks`.
    pub fn shifted(&self, ticks: u32) -> Range {
        Range {
            low: self.low.saturating_add(ticks),
            high: self.high.saturating_add(ticks),
        }
    }

    pub fn with_low(&self, low: u32) -> Result<Range> {
        Range::new(low, self.high)
    }

    pub fn with_high(&self, high: u32) -> Result<Range> {
        Range::new(self.low, high)
    }

    /// The quantizer's asymmetric overlap measure: how far this range's high
    /// endpoint reaches past the other's low endpoint, floored at zero.
    ///
    /// Not a true intersection length; the grid-alignment search depends on
    /// this exact formulation.
    pub fn overlapping_region_length(&self, other: Range) -> i64 {
        (i64::from(self.high) - i64::from(other.low)).max(0)
    }

    /// Partition this range into consecutive `size`-tick windows laid end to
    /// end. The final window is clamped to this range's high endpoint, and a
    /// one-tick remainder (too short to be a valid range) is absorbed into
    /// the window before it. Sizes below 2 produce nothing.
    pub fn windows(&self, size: u32) -> Vec<Range> {
        let mut out = Vec::new();
        if size < 2 {
            return out;
        }

        let mut start = self.low;
        while start < self.high {
            let end = start.saturating_add(size).min(self.high.saturating_add(1));
            if end - start < 2 {
                if let Some(prev) = out.pop() {
                    out.push(Range {
                        low: prev.low,
                        high: end - 1,
                    });
                }
                break;
            }
            out.push(Range {
                low: start,
                high: end - 1,
            });
            start = start.saturating_add(size);
        }
        out
    }

    /// Consecutive ranges from a set of start ticks: each range runs from its
    /// tick to just before the next, the last to `last_endpoint - 1`.
    /// Duplicate ticks collapse. `last_endpoint` must lie past every tick.
    pub fn from_start_ticks(ticks: &[u32], last_endpoint: u32) -> Result<Vec<Range>> {
        let mut ticks = ticks.to_vec();
        ticks.sort_unstable();
        ticks.dedup();

        let mut out = Vec::with_capacity(ticks.len());
        for (i, &tick) in ticks.iter().enumerate() {
            let next = ticks.get(i + 1).copied().unwrap_or(last_endpoint);
            out.push(Range::new(tick, next.saturating_sub(1))?);
        }
        Ok(out)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}
