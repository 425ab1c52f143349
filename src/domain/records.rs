use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

/// Hours covered by every hour-indexed profile the backend serves.
pub const HOURS_PER_DAY: usize = 24;

// ============================================================================
// Dashboard Resource Records
// ============================================================================
//
// Every record is replaced wholesale on each poll; none carries identity or
// survives a restart. Each type has a `fallback()` constructor holding the
// substitute values served when the backend is unreachable.

/// Simulated wall-clock time reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
        }
    }

    /// Local wall-clock time, used when the backend cannot be reached.
    pub fn fallback() -> Self {
        let now = Local::now();
        Self {
            hour: now.hour(),
            minute: now.minute(),
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Hour-indexed household consumption profile for one day (kWh per hour).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseloadProfile {
    pub hourly: Vec<f64>,
}

impl BaseloadProfile {
    pub fn new(hourly: Vec<f64>) -> Self {
        Self { hourly }
    }

    /// Fixed residential profile: overnight trough, morning and evening peaks.
    pub fn fallback() -> Self {
        Self {
            hourly: vec![
                2.1, 1.8, 1.6, 1.5, 1.6, 1.9, 2.6, 3.8, 3.4, 2.9, 2.7, 2.8, 4.0, 2.4, 2.0, 2.4,
                2.8, 4.8, 5.6, 3.6, 2.8, 2.4, 2.0, 1.6,
            ],
        }
    }
}

/// EV traction battery state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvBatteryStatus {
    pub percentage: f64,
    pub current_energy_kwh: f64,
    pub max_capacity_kwh: f64,
    pub is_charging: bool,
}

impl EvBatteryStatus {
    pub fn fallback() -> Self {
        Self {
            percentage: 45.0,
            current_energy_kwh: 20.8,
            max_capacity_kwh: 46.3,
            is_charging: false,
        }
    }

    /// Percentage derived from energy and capacity, rounded to one decimal.
    /// This is the authoritative value; the backend-reported percentage is
    /// only validated against it.
    pub fn derived_percentage(&self) -> f64 {
        if self.max_capacity_kwh <= 0.0 {
            return 0.0;
        }
        (self.current_energy_kwh / self.max_capacity_kwh * 1000.0).round() / 10.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HomeBatteryMode {
    Charging,
    Discharging,
    Idle,
}

/// Stationary home battery state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeBatteryStatus {
    pub capacity_percent: f64,
    pub current_capacity_kwh: f64,
    pub max_capacity_kwh: f64,
    pub min_capacity_kwh: f64,
    pub mode: HomeBatteryMode,
}

impl HomeBatteryStatus {
    pub fn fallback() -> Self {
        Self {
            capacity_percent: 85.0,
            current_capacity_kwh: 11.48,
            max_capacity_kwh: 13.5,
            min_capacity_kwh: 1.35,
            mode: HomeBatteryMode::Idle,
        }
    }
}

/// Current spot price plus the full day curve (kr/kWh).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub current_price: f64,
    pub current_hour: u32,
    pub hourly_prices: Vec<f64>,
}

impl PriceInfo {
    pub fn fallback() -> Self {
        Self {
            current_price: 2.50,
            current_hour: Local::now().hour(),
            hourly_prices: vec![2.50; HOURS_PER_DAY],
        }
    }
}

/// Solar production band relative to installed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ProductionStatus {
    None,
    Low,
    Normal,
    High,
    Max,
    Unknown,
}

impl ProductionStatus {
    /// Map the backend's enum-like status string. The simulator reports
    /// Swedish labels; anything unrecognized becomes `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Ingen produktion" => Self::None,
            "Låg produktion" => Self::Low,
            "Normal produktion" => Self::Normal,
            "Hög produktion" => Self::High,
            "Max produktion" => Self::Max,
            _ => Self::Unknown,
        }
    }
}

/// Solar panel system state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarStatus {
    pub current_production_kwh: f64,
    pub max_capacity_kwh: f64,
    pub production_percent: f64,
    pub production_status: ProductionStatus,
    pub energy_surplus: f64,
    pub daily_production_estimate: f64,
    pub optimization_tips: Vec<String>,
}

impl SolarStatus {
    pub fn fallback() -> Self {
        Self {
            current_production_kwh: 0.0,
            max_capacity_kwh: 10.0,
            production_percent: 0.0,
            production_status: ProductionStatus::None,
            energy_surplus: 0.0,
            daily_production_estimate: 84.0,
            optimization_tips: Vec::new(),
        }
    }
}

/// Backend-recommended low-cost/low-load charging window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalChargingWindow {
    pub optimal_hours: Vec<u32>,
    pub strategy: String,
    pub time_range: String,
}

impl OptimalChargingWindow {
    pub fn fallback() -> Self {
        Self {
            optimal_hours: vec![22, 23, 0, 1, 2, 3, 4, 5],
            strategy: "Low consumption".to_string(),
            time_range: "22:00 - 06:00".to_string(),
        }
    }
}
