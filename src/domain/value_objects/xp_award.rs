//! Party experience awards

use serde::{Deserialize, Serialize};

/// An experience award to be divided among party members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAward {
    total: i64,
}

impl XpAward {
    /// Awards are never negative; degenerate totals clamp to zero.
    pub fn new(total: i64) -> Self {
        Self {
            total: total.max(0),
        }
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    /// Divide the award into the given number of shares.
    ///
    /// The remainder goes to the earliest shares, one point each, so the
    /// whole award is always handed out and no share differs by more than 1.
    pub fn split_evenly(&self, shares: usize) -> Vec<i64> {
        if shares == 0 {
            return Vec::new();
        }
        let shares_i64 = shares as i64;
        let each = self.total / shares_i64;
        let remainder = (self.total % shares_i64) as usize;
        (0..shares)
            .map(|i| if i < remainder { each + 1 } else { each })
            .collect()
    }
}

impl std::ops::Add for XpAward {
    type Output = XpAward;

    fn add(self, other: XpAward) -> XpAward {
        XpAward::new(self.total + other.total)
    }
}

impl std::iter::Sum for XpAward {
    fn sum<I: Iterator<Item = XpAward>>(iter: I) -> Self {
        iter.fold(XpAward::new(0), std::ops::Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_exact() {
        assert_eq!(XpAward::new(300).split_evenly(3), vec![100, 100, 100]);
    }

    #[test]
    fn test_split_remainder_goes_to_earliest_shares() {
        assert_eq!(XpAward::new(100).split_evenly(3), vec![34, 33, 33]);
    }

    #[test]
    fn test_split_total_is_preserved() {
        let shares = XpAward::new(1234).split_evenly(5);
        assert_eq!(shares.iter().sum::<i64>(), 1234);
    }

    #[test]
    fn test_zero_shares_yields_nothing() {
        assert!(XpAward::new(500).split_evenly(0).is_empty());
    }

    #[test]
    fn test_negative_total_clamps_to_zero() {
        assert_eq!(XpAward::new(-50).split_evenly(2), vec![0, 0]);
    }

    #[test]
    fn test_awards_sum() {
        let total: XpAward = [XpAward::new(38), XpAward::new(85)].into_iter().sum();
        assert_eq!(total.total(), 123);
    }
}
