//! Pure display formatting: numbers to strings, statuses to labels and
//! icons. Nothing here touches state or I/O.

use ratatui::style::Color;

use crate::domain::{PriceLevel, ProductionStatus, TimeOfDay};

pub fn clock(time: &TimeOfDay) -> String {
    format!("{:02}:{:02}", time.hour, time.minute)
}

pub fn price_per_kwh(price: f64) -> String {
    format!("{price:.2} kr/kWh")
}

/// Instantaneous consumption, two decimals.
pub fn consumption_kwh(kwh: f64) -> String {
    format!("{kwh:.2} kWh")
}

/// Daily totals, one decimal.
pub fn daily_total_kwh(kwh: f64) -> String {
    format!("{kwh:.1} kWh")
}

pub fn percent(value: f64) -> String {
    format!("{}%", value.round() as i64)
}

/// "20.8/46.3 kWh" style capacity pair.
pub fn capacity_pair(current_kwh: f64, max_kwh: f64) -> String {
    format!("{current_kwh:.1}/{max_kwh:.1} kWh")
}

pub fn price_level_label(level: PriceLevel) -> &'static str {
    match level {
        PriceLevel::Low => "Low price",
        PriceLevel::Normal => "Normal price",
        PriceLevel::High => "High price",
    }
}

pub fn price_level_color(level: PriceLevel) -> Color {
    match level {
        PriceLevel::Low => Color::Green,
        PriceLevel::Normal => Color::Yellow,
        PriceLevel::High => Color::Red,
    }
}

pub fn production_label(status: ProductionStatus) -> &'static str {
    match status {
        ProductionStatus::None => "No production",
        ProductionStatus::Low => "Low production",
        ProductionStatus::Normal => "Normal production",
        ProductionStatus::High => "High production",
        ProductionStatus::Max => "Max production",
        ProductionStatus::Unknown => "Production unknown",
    }
}

pub fn production_icon(status: ProductionStatus) -> &'static str {
    match status {
        ProductionStatus::None => "🌙",
        ProductionStatus::Low => "⛅",
        ProductionStatus::Normal => "🌤",
        ProductionStatus::High | ProductionStatus::Max => "☀️",
        ProductionStatus::Unknown => "–",
    }
}

/// Battery gauge color tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryTier {
    Good,
    Low,
    Critical,
}

impl BatteryTier {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 50.0 {
            Self::Good
        } else if percent >= 20.0 {
            Self::Low
        } else {
            Self::Critical
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Good => Color::Green,
            Self::Low => Color::Yellow,
            Self::Critical => Color::Red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(clock(&TimeOfDay::new(9, 5)), "09:05");
        assert_eq!(clock(&TimeOfDay::new(23, 59)), "23:59");
    }

    #[rstest]
    #[case(2.5, "2.50 kr/kWh")]
    #[case(0.873, "0.87 kr/kWh")]
    #[case(1.2, "1.20 kr/kWh")]
    fn price_renders_two_decimals(#[case] price: f64, #[case] expected: &str) {
        assert_eq!(price_per_kwh(price), expected);
    }

    #[rstest]
    #[case(3.0, "3.00 kWh")]
    #[case(0.125, "0.13 kWh")]
    fn consumption_renders_two_decimals(#[case] kwh: f64, #[case] expected: &str) {
        assert_eq!(consumption_kwh(kwh), expected);
    }

    #[test]
    fn daily_total_renders_one_decimal() {
        assert_eq!(daily_total_kwh(72.0), "72.0 kWh");
        assert_eq!(daily_total_kwh(13.56), "13.6 kWh");
    }

    #[rstest]
    #[case(44.9, "45%")]
    #[case(45.4, "45%")]
    #[case(0.0, "0%")]
    #[case(99.5, "100%")]
    fn percent_rounds_to_nearest_integer(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(percent(value), expected);
    }

    #[test]
    fn capacity_pair_keeps_one_decimal() {
        assert_eq!(capacity_pair(20.8, 46.3), "20.8/46.3 kWh");
    }

    #[rstest]
    #[case(100.0, BatteryTier::Good)]
    #[case(50.0, BatteryTier::Good)]
    #[case(49.9, BatteryTier::Low)]
    #[case(20.0, BatteryTier::Low)]
    #[case(19.9, BatteryTier::Critical)]
    fn battery_tier_thresholds(#[case] percent: f64, #[case] expected: BatteryTier) {
        assert_eq!(BatteryTier::from_percent(percent), expected);
    }

    #[test]
    fn unknown_production_gets_default_label() {
        assert_eq!(production_label(ProductionStatus::Unknown), "Production unknown");
        assert_eq!(production_icon(ProductionStatus::Unknown), "–");
    }
}
