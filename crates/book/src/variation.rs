//! Best-of-book percentage variation.
//!
//! `|last - first| / last * 100`, negative when the session closed below
//! where it opened. Each side is measured over its own series.

use orderstream_core::{BestQuote, Price, Side};
use serde::{Serialize, Serializer};
use std::fmt;

/// Signed percentage change between the first and last value of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variation {
    pub first: Price,
    pub last: Price,
    /// Unsigned magnitude in percent.
    pub pct: f64,
}

impl Variation {
    /// Measure a series. `None` when the series is empty or ends at a
    /// non-positive price.
    pub fn from_series(series: &[Price]) -> Option<Self> {
        let (&first, &last) = (series.first()?, series.last()?);
        if last <= 0 {
            return None;
        }
        let diff = last.abs_diff(first) as f64;
        Some(Self {
            first,
            last,
            pct: diff / last as f64 * 100.0,
        })
    }

    /// Measure one side of a best-of-book series.
    pub fn for_side(best_series: &[BestQuote], side: Side) -> Option<Self> {
        let series: Vec<Price> = best_series.iter().map(|q| q.price(side)).collect();
        Self::from_series(&series)
    }

    pub fn is_negative(&self) -> bool {
        self.last < self.first
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        write!(f, "{:.2}", self.pct)
    }
}

impl Serialize for Variation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_negative_variation() {
        let v = Variation::from_series(&[100, 105, 90]).unwrap();
        assert_relative_eq!(v.pct, 10.0 / 90.0 * 100.0);
        assert!(v.is_negative());
        assert_eq!(v.to_string(), "-11.11");
    }

    #[test]
    fn test_positive_variation() {
        let v = Variation::from_series(&[50, 55, 60]).unwrap();
        assert_relative_eq!(v.pct, 10.0 / 60.0 * 100.0);
        assert_eq!(v.to_string(), "16.67");
    }

    #[test]
    fn test_flat_and_single() {
        assert_eq!(Variation::from_series(&[70, 80, 70]).unwrap().to_string(), "0.00");
        assert_eq!(Variation::from_series(&[42]).unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_undefined_without_data() {
        assert!(Variation::from_series(&[]).is_none());
        assert!(Variation::from_series(&[10, 0]).is_none());
    }

    #[test]
    fn test_negative_first_does_not_overflow() {
        assert_eq!(Variation::from_series(&[-50, 100]).unwrap().to_string(), "150.00");

        let v = Variation::from_series(&[Price::MIN, 1]).unwrap();
        assert!(!v.is_negative());
        assert_relative_eq!(v.pct, (1u64 << 63) as f64 * 100.0);
    }

    #[test]
    fn test_sides_use_their_own_series() {
        let best = vec![
            BestQuote { bid: 100, ask: 50 },
            BestQuote { bid: 105, ask: 55 },
            BestQuote { bid: 90, ask: 60 },
        ];
        assert_eq!(Variation::for_side(&best, Side::Bid).unwrap().to_string(), "-11.11");
        assert_eq!(Variation::for_side(&best, Side::Ask).unwrap().to_string(), "16.67");
    }

    #[test]
    fn test_series_of_different_length_index_own_last() {
        // A short ask series must end at its own last element, not at the bid length.
        let bids = [100, 101, 102, 103, 104];
        let asks = [200, 100];
        let bid = Variation::from_series(&bids).unwrap();
        let ask = Variation::from_series(&asks).unwrap();
        assert_eq!(bid.last, 104);
        assert_eq!(ask.last, 100);
        assert_eq!(ask.to_string(), "-100.00");
    }
}
