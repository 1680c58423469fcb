//! Statistics Aggregator
//!
//! Concentration metrics over the analyzed holder subset. The full on-chain
//! holder population is unknown here, so every figure (including the median)
//! describes only the holders passed in.

use crate::models::types::{Holder, HolderStatistics};

/// Top-K cut-offs reported in the statistics
pub const TOP_K: [usize; 3] = [5, 10, 20];

fn top_sum(balances: &[f64], k: usize) -> f64 {
    balances.iter().take(k).sum()
}

fn percentage(part: f64, total_supply: f64) -> Option<f64> {
    if total_supply > 0.0 {
        Some(part / total_supply * 100.0)
    } else {
        None
    }
}

/// Median as the element at index `len / 2` of the ascending balances.
/// For even lengths that is the upper of the two middle values, no interpolation.
pub fn median_by_index(balances: &[f64]) -> f64 {
    if balances.is_empty() {
        return 0.0;
    }
    let mut sorted = balances.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted[sorted.len() / 2]
}

/// Stable descending sort; ties keep their original order
pub fn sort_descending(holders: &mut [Holder]) {
    holders.sort_by(|a, b| b.balance.total_cmp(&a.balance));
}

/// `holders` must already be sorted descending by balance.
/// Percentages stay `None` unless `total_supply > 0`; an empty list yields zeroed statistics.
pub fn aggregate(holders: &[Holder], total_supply: f64) -> HolderStatistics {
    if holders.is_empty() {
        return HolderStatistics::default();
    }

    let balances: Vec<f64> = holders.iter().map(|h| h.balance).collect();
    let count = balances.len();

    let top_5_balance = top_sum(&balances, TOP_K[0]);
    let top_10_balance = top_sum(&balances, TOP_K[1]);
    let top_20_balance = top_sum(&balances, TOP_K[2]);
    let largest = balances.iter().copied().fold(f64::MIN, f64::max);
    let smallest = balances.iter().copied().fold(f64::MAX, f64::min);
    let average = balances.iter().sum::<f64>() / count as f64;

    HolderStatistics {
        total_holders_analyzed: count,
        top_5_balance,
        top_10_balance,
        top_20_balance,
        largest_holder_balance: largest,
        smallest_analyzed_balance: smallest,
        average_balance: average,
        median_balance: median_by_index(&balances),
        top_5_percentage: percentage(top_5_balance, total_supply),
        top_10_percentage: percentage(top_10_balance, total_supply),
        top_20_percentage: percentage(top_20_balance, total_supply),
        largest_holder_percentage: percentage(largest, total_supply),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holders(balances: &[f64]) -> Vec<Holder> {
        balances
            .iter()
            .enumerate()
            .map(|(i, b)| Holder {
                address: format!("addr{}", i + 1),
                raw_amount: *b as u64,
                balance: *b,
            })
            .collect()
    }

    #[test]
    fn test_top_k_sums_follow_prefix() {
        let balances: Vec<f64> = (1..=25).rev().map(|v| v as f64 * 10.0).collect();
        let stats = aggregate(&holders(&balances), 100_000.0);

        assert_eq!(stats.top_5_balance, balances[..5].iter().sum::<f64>());
        assert_eq!(stats.top_10_balance, balances[..10].iter().sum::<f64>());
        assert_eq!(stats.top_20_balance, balances[..20].iter().sum::<f64>());
        assert_eq!(stats.total_holders_analyzed, 25);
    }

    #[test]
    fn test_short_list_uses_all_holders() {
        let stats = aggregate(&holders(&[400_000.0, 300_000.0, 300_000.0]), 1_000_000.0);

        assert_eq!(stats.top_5_balance, 1_000_000.0);
        assert_eq!(stats.top_10_balance, 1_000_000.0);
        assert_eq!(stats.top_20_balance, 1_000_000.0);
        assert_eq!(stats.top_5_percentage, Some(100.0));
        assert_eq!(stats.largest_holder_percentage, Some(40.0));
    }

    #[test]
    fn test_non_positive_supply_omits_percentages() {
        for supply in [0.0, -5.0] {
            let stats = aggregate(&holders(&[10.0, 5.0]), supply);
            assert_eq!(stats.top_5_balance, 15.0);
            assert!(stats.top_5_percentage.is_none());
            assert!(stats.top_10_percentage.is_none());
            assert!(stats.top_20_percentage.is_none());
            assert!(stats.largest_holder_percentage.is_none());
        }
    }

    #[test]
    fn test_median_odd_length() {
        let stats = aggregate(&holders(&[9.0, 7.0, 5.0, 3.0, 1.0]), 100.0);
        assert_eq!(stats.median_balance, 5.0);
    }

    #[test]
    fn test_median_even_length_takes_upper_middle() {
        // ascending [1, 3, 5, 7] -> index 2
        let stats = aggregate(&holders(&[7.0, 5.0, 3.0, 1.0]), 100.0);
        assert_eq!(stats.median_balance, 5.0);
        assert_eq!(median_by_index(&[2.0, 1.0]), 2.0);
    }

    #[test]
    fn test_min_max_mean() {
        let stats = aggregate(&holders(&[6.0, 3.0, 3.0]), 100.0);
        assert_eq!(stats.largest_holder_balance, 6.0);
        assert_eq!(stats.smallest_analyzed_balance, 3.0);
        assert_eq!(stats.average_balance, 4.0);
    }

    #[test]
    fn test_empty_list_is_zeroed() {
        let stats = aggregate(&[], 1_000.0);
        assert_eq!(stats, HolderStatistics::default());
        assert_eq!(stats.total_holders_analyzed, 0);
        assert!(stats.top_5_percentage.is_none());
    }

    #[test]
    fn test_sort_descending_is_stable() {
        let mut list = holders(&[300.0, 400.0, 300.0]);
        sort_descending(&mut list);
        let order: Vec<&str> = list.iter().map(|h| h.address.as_str()).collect();
        assert_eq!(order, vec!["addr2", "addr1", "addr3"]);
    }
}
