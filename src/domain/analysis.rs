use strum_macros::Display;

use super::records::HOURS_PER_DAY;

/// Classification of the current spot price against the day curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PriceLevel {
    Low,
    Normal,
    High,
}

/// Consumption for the hour the simulation clock is in.
/// Missing or short profiles yield 0 rather than panicking.
pub fn current_consumption(profile: &[f64], hour: f64) -> f64 {
    if profile.is_empty() {
        return 0.0;
    }
    let idx = (hour.floor().max(0.0) as usize) % HOURS_PER_DAY;
    profile.get(idx).copied().unwrap_or(0.0)
}

/// Total consumption over the whole day curve.
pub fn total_daily_consumption(profile: &[f64]) -> f64 {
    profile.iter().sum()
}

/// Classify `current` against the day curve: low below
/// `min + (avg - min) * 0.3`, high above `max - (max - avg) * 0.3`.
/// An empty or flat curve is always Normal.
pub fn price_level(current: f64, hourly_prices: &[f64]) -> PriceLevel {
    if hourly_prices.is_empty() {
        return PriceLevel::Normal;
    }
    let min = hourly_prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = hourly_prices
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return PriceLevel::Normal;
    }
    let avg = hourly_prices.iter().sum::<f64>() / hourly_prices.len() as f64;

    if current <= min + (avg - min) * 0.3 {
        PriceLevel::Low
    } else if current >= max - (max - avg) * 0.3 {
        PriceLevel::High
    } else {
        PriceLevel::Normal
    }
}

/// Production band thresholds, in percent of installed capacity.
const LOW_PRODUCTION_PERCENT: f64 = 15.0;
const NORMAL_PRODUCTION_PERCENT: f64 = 50.0;
const HIGH_PRODUCTION_PERCENT: f64 = 80.0;

pub fn production_status(production_percent: f64) -> super::ProductionStatus {
    use super::ProductionStatus as Status;
    if production_percent <= 0.0 {
        Status::None
    } else if production_percent < LOW_PRODUCTION_PERCENT {
        Status::Low
    } else if production_percent < NORMAL_PRODUCTION_PERCENT {
        Status::Normal
    } else if production_percent < HIGH_PRODUCTION_PERCENT {
        Status::High
    } else {
        Status::Max
    }
}

/// Solar energy left over after the household load, rounded to two
/// decimals. Never negative.
pub fn energy_surplus(production_kwh: f64, household_load_kwh: f64) -> f64 {
    ((production_kwh - household_load_kwh).max(0.0) * 100.0).round() / 100.0
}

/// Number of hours the legacy client selects when deriving the charging
/// window itself.
const OPTIMAL_HOUR_COUNT: usize = 8;

/// Legacy-revision derivation: the 8 hours with the lowest baseload,
/// returned in hour order. The consolidated backend computes this
/// server-side; only the legacy adapter needs it.
pub fn derive_optimal_hours(baseload: &[f64]) -> Vec<u32> {
    let mut indexed: Vec<(usize, f64)> = baseload.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    let mut hours: Vec<u32> = indexed
        .into_iter()
        .take(OPTIMAL_HOUR_COUNT)
        .map(|(hour, _)| hour as u32)
        .collect();
    hours.sort_unstable();
    hours
}

/// Render a set of hours as a display range, preferring the night block
/// (22:00-06:00) when most of the hours fall in it, otherwise the longest
/// contiguous run.
pub fn describe_hour_range(hours: &[u32]) -> String {
    if hours.is_empty() {
        return "No optimal window".to_string();
    }
    if hours.len() == 1 {
        return format!("{:02}:00", hours[0]);
    }

    let mut sorted: Vec<u32> = hours.to_vec();
    sorted.sort_unstable();

    // The wraparound form only makes sense when the window actually
    // crosses midnight, i.e. has hours on both sides of it.
    let night: Vec<u32> = sorted
        .iter()
        .copied()
        .filter(|h| *h >= 22 || *h <= 6)
        .collect();
    let late: Option<u32> = night.iter().copied().filter(|h| *h >= 22).min();
    let early: Option<u32> = night.iter().copied().filter(|h| *h <= 6).max();
    if night.len() >= 3 {
        if let (Some(start), Some(end)) = (late, early) {
            return format!("{start:02}:00 - {:02}:00", (end + 1) % 24);
        }
    }

    let longest = longest_contiguous_run(&sorted);
    if longest.len() >= 2 {
        let start = longest[0];
        let end = longest[longest.len() - 1];
        return format!("{start:02}:00 - {:02}:00", (end + 1) % 24);
    }

    format!("{} optimal hours", sorted.len())
}

fn longest_contiguous_run(sorted_hours: &[u32]) -> Vec<u32> {
    let mut best: Vec<u32> = Vec::new();
    let mut current: Vec<u32> = Vec::new();
    for &hour in sorted_hours {
        match current.last() {
            Some(&prev) if hour == prev + 1 => current.push(hour),
            Some(_) => {
                if current.len() > best.len() {
                    best = current.clone();
                }
                current.clear();
                current.push(hour);
            }
            None => current.push(hour),
        }
    }
    if current.len() > best.len() {
        best = current;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn current_consumption_indexes_by_floored_hour() {
        let profile: Vec<f64> = (0..24).map(|h| h as f64).collect();
        assert_eq!(current_consumption(&profile, 14.0), 14.0);
        assert_eq!(current_consumption(&profile, 14.9), 14.0);
        assert_eq!(current_consumption(&profile, 23.5), 23.0);
    }

    #[test]
    fn current_consumption_of_empty_profile_is_zero() {
        assert_eq!(current_consumption(&[], 12.0), 0.0);
    }

    #[test]
    fn short_profile_yields_zero_out_of_range() {
        // A truncated response must not panic.
        assert_eq!(current_consumption(&[1.0, 2.0], 14.0), 0.0);
    }

    #[test]
    fn total_daily_consumption_sums_profile() {
        assert_eq!(total_daily_consumption(&vec![3.0; 24]), 72.0);
        assert_eq!(total_daily_consumption(&[]), 0.0);
    }

    #[test]
    fn flat_price_curve_is_normal() {
        // min == avg == max must not divide by zero or mis-threshold.
        assert_eq!(price_level(1.0, &vec![1.0; 24]), PriceLevel::Normal);
    }

    #[test]
    fn empty_price_curve_is_normal() {
        assert_eq!(price_level(2.5, &[]), PriceLevel::Normal);
    }

    #[test]
    fn price_below_low_threshold_is_low() {
        // min = 1.0, avg = 2.0, max = 4.0 -> low threshold 1.3
        let mut prices = vec![43.0 / 22.0; 24];
        prices[0] = 1.0;
        prices[1] = 4.0;
        let avg = prices.iter().sum::<f64>() / 24.0;
        assert!((avg - 2.0).abs() < 1e-9);

        assert_eq!(price_level(1.2, &prices), PriceLevel::Low);
        assert_eq!(price_level(2.0, &prices), PriceLevel::Normal);
        assert_eq!(price_level(3.9, &prices), PriceLevel::High);
    }

    #[test]
    fn production_status_bands() {
        use crate::domain::ProductionStatus as Status;
        assert_eq!(production_status(0.0), Status::None);
        assert_eq!(production_status(10.0), Status::Low);
        assert_eq!(production_status(30.0), Status::Normal);
        assert_eq!(production_status(65.0), Status::High);
        assert_eq!(production_status(95.0), Status::Max);
    }

    #[test]
    fn surplus_is_clamped_and_rounded() {
        assert_eq!(energy_surplus(8.0, 3.125), 4.88);
        assert_eq!(energy_surplus(1.0, 5.0), 0.0);
    }

    #[test]
    fn optimal_hours_pick_lowest_baseload() {
        let mut baseload = vec![5.0; 24];
        for h in [22, 23, 0, 1, 2, 3, 4, 5] {
            baseload[h] = 1.0;
        }
        assert_eq!(
            derive_optimal_hours(&baseload),
            vec![0, 1, 2, 3, 4, 5, 22, 23]
        );
    }

    #[test]
    fn night_block_renders_as_wraparound_range() {
        assert_eq!(
            describe_hour_range(&[22, 23, 0, 1, 2, 3, 4, 5]),
            "22:00 - 06:00"
        );
    }

    #[test]
    fn daytime_run_renders_start_to_end() {
        assert_eq!(describe_hour_range(&[11, 12, 13, 14]), "11:00 - 15:00");
    }

    #[test]
    fn morning_run_does_not_claim_late_evening_hours() {
        // All hours before midnight's far side; no wraparound range.
        assert_eq!(
            describe_hour_range(&[0, 1, 2, 3, 4, 5, 6, 7]),
            "00:00 - 08:00"
        );
        assert_eq!(describe_hour_range(&[2, 3, 4, 5]), "02:00 - 06:00");
    }

    #[test]
    fn scattered_hours_fall_back_to_count() {
        assert_eq!(describe_hour_range(&[8, 11, 14]), "3 optimal hours");
        assert_eq!(describe_hour_range(&[9]), "09:00");
        assert_eq!(describe_hour_range(&[]), "No optimal window");
    }

    proptest! {
        #[test]
        fn consumption_matches_floored_index(
            profile in prop::collection::vec(0.0f64..50.0, 24),
            hour in 0.0f64..24.0,
        ) {
            let expected = profile[(hour.floor() as usize) % 24];
            prop_assert_eq!(current_consumption(&profile, hour), expected);
        }

        #[test]
        fn total_equals_sum(profile in prop::collection::vec(0.0f64..50.0, 24)) {
            let expected: f64 = profile.iter().sum();
            prop_assert_eq!(total_daily_consumption(&profile), expected);
        }

        #[test]
        fn price_level_is_pure(
            current in 0.0f64..10.0,
            prices in prop::collection::vec(0.1f64..10.0, 24),
        ) {
            prop_assert_eq!(price_level(current, &prices), price_level(current, &prices));
        }

        #[test]
        fn extremes_classify_consistently(prices in prop::collection::vec(0.1f64..10.0, 24)) {
            let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
            let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assume!((max - min).abs() >= f64::EPSILON);
            prop_assert_eq!(price_level(min, &prices), PriceLevel::Low);
            prop_assert_eq!(price_level(max, &prices), PriceLevel::High);
        }
    }
}
