//! Splitting a requested spectral domain into request-sized chunks.
//!
//! The external calculator only accepts a bounded wavenumber span per request,
//! so a domain such as `[0, 3000]` cm⁻¹ is broken into contiguous
//! [`Interval`]s no wider than the configured maximum span.

use std::fmt;

/// One `[start, end]` sub-request of a larger spectral domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower bound (inclusive)
    pub start: f64,
    /// Upper bound (inclusive)
    pub end: f64,
}

impl Interval {
    /// Create a new interval
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Width of the interval
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]", self.start, self.end)
    }
}

/// Split `[start, end]` into contiguous intervals at most `max_span` wide.
///
/// The bounds may be given in either order. Domains narrower than one unit
/// yield no intervals. Each interval's upper bound is the next interval's
/// lower bound, and the last one is clipped to the end of the domain.
///
/// A non-positive or non-finite `max_span` also yields no intervals; callers
/// are expected to validate it beforehand (see [`crate::config::Config`]).
///
/// When `max_span` is below the floating-point spacing at a bound, adding it
/// does not move the bound; the interval then extends to the next
/// representable value instead, so the loop always terminates.
///
/// # Example
///
/// ```
/// use spectracrawl::partition::{partition, Interval};
///
/// let chunks = partition(25.0, 0.0, 10.0);
/// assert_eq!(
///     chunks,
///     vec![
///         Interval::new(0.0, 10.0),
///         Interval::new(10.0, 20.0),
///         Interval::new(20.0, 25.0),
///     ]
/// );
/// ```
pub fn partition(start: f64, end: f64, max_span: f64) -> Vec<Interval> {
    let (start, end) = if start > end { (end, start) } else { (start, end) };

    if !(max_span > 0.0) || !max_span.is_finite() || !(end - start >= 1.0) {
        return Vec::new();
    }

    let mut intervals = Vec::new();
    let mut lo = start;
    while lo < end {
        let mut hi = (lo + max_span).min(end);
        if hi <= lo {
            hi = next_representable(lo).min(end);
        }
        intervals.push(Interval::new(lo, hi));
        lo = hi;
    }
    intervals
}

/// Smallest `f64` greater than the finite value `x`.
fn next_representable(x: f64) -> f64 {
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}
