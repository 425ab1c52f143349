use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{get_json, post_command, ApiError, BackendApi};
use crate::domain::{
    analysis, BaseloadProfile, EvBatteryStatus, HomeBatteryMode, HomeBatteryStatus,
    OptimalChargingWindow, PriceInfo, ProductionStatus, SolarStatus, TimeOfDay,
};

/// Adapter for the original simulator service. Most resources are carved
/// out of the kitchen-sink `/info` endpoint; prices arrive in öre and are
/// converted to kronor here, and the charging window is derived
/// client-side from the baseload (the consolidated backend superseded all
/// of this with server-side computation).
#[derive(Clone)]
pub struct LegacyApi {
    base_url: String,
    http: reqwest::Client,
}

impl LegacyApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: super::build_http_client(timeout)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn info(&self) -> Result<InfoDto, ApiError> {
        get_json(&self.http, self.url("info")).await
    }
}

/// The simulator's combined state dump.
#[derive(Debug, Deserialize)]
struct InfoDto {
    sim_time_hour: f64,
    sim_time_min: f64,
    household_load_kwh: f64,
    battery_energy_kwh: f64,
    ev_battery_charge_start_stopp: bool,
    ev_batt_max_capacity_kwh: f64,
    home_batt_capacity_kwh: f64,
    home_batt_max_capacity_kwh: f64,
    home_batt_min_capacity_kwh: f64,
    home_batt_capacity_percent: f64,
    home_battery_mode: String,
    solar_production_kwh: f64,
    solar_max_capacity_kwh: f64,
    #[allow(dead_code)]
    net_household_load_kwh: f64,
}

const ORE_PER_KRONA: f64 = 100.0;

/// Surplus worth suggesting solar charging for, in kWh.
const SURPLUS_TIP_THRESHOLD: f64 = 3.0;

#[async_trait]
impl BackendApi for LegacyApi {
    async fn time(&self) -> Result<TimeOfDay, ApiError> {
        let info = self.info().await?;
        Ok(TimeOfDay::new(
            info.sim_time_hour.floor().max(0.0) as u32,
            info.sim_time_min.floor().max(0.0) as u32,
        ))
    }

    async fn baseload(&self) -> Result<BaseloadProfile, ApiError> {
        let hourly: Vec<f64> = get_json(&self.http, self.url("baseload")).await?;
        Ok(BaseloadProfile::new(hourly))
    }

    async fn ev_battery(&self) -> Result<EvBatteryStatus, ApiError> {
        let info = self.info().await?;
        let mut status = EvBatteryStatus {
            percentage: 0.0,
            current_energy_kwh: info.battery_energy_kwh,
            max_capacity_kwh: info.ev_batt_max_capacity_kwh,
            is_charging: info.ev_battery_charge_start_stopp,
        };
        // This revision never reported a percentage; derive it.
        status.percentage = status.derived_percentage();
        Ok(status)
    }

    async fn home_battery(&self) -> Result<HomeBatteryStatus, ApiError> {
        let info = self.info().await?;
        let mode = info
            .home_battery_mode
            .parse::<HomeBatteryMode>()
            .unwrap_or(HomeBatteryMode::Idle);
        Ok(HomeBatteryStatus {
            capacity_percent: info.home_batt_capacity_percent,
            current_capacity_kwh: info.home_batt_capacity_kwh,
            max_capacity_kwh: info.home_batt_max_capacity_kwh,
            min_capacity_kwh: info.home_batt_min_capacity_kwh,
            mode,
        })
    }

    async fn price(&self) -> Result<PriceInfo, ApiError> {
        let ore: Vec<f64> = get_json(&self.http, self.url("priceperhour")).await?;
        let info = self.info().await?;
        let hourly_prices: Vec<f64> = ore.into_iter().map(|p| p / ORE_PER_KRONA).collect();
        let current_hour = (info.sim_time_hour.floor().max(0.0) as u32) % 24;
        let current_price = hourly_prices
            .get(current_hour as usize)
            .copied()
            .unwrap_or(0.0);
        Ok(PriceInfo {
            current_price,
            current_hour,
            hourly_prices,
        })
    }

    async fn solar(&self) -> Result<SolarStatus, ApiError> {
        let info = self.info().await?;
        let profile: Vec<f64> = get_json(&self.http, self.url("solarproduction")).await?;

        let production_percent = if info.solar_max_capacity_kwh > 0.0 {
            (info.solar_production_kwh / info.solar_max_capacity_kwh * 1000.0).round() / 10.0
        } else {
            0.0
        };
        let status = analysis::production_status(production_percent);
        let surplus = analysis::energy_surplus(info.solar_production_kwh, info.household_load_kwh);

        let mut tips = Vec::new();
        if surplus >= SURPLUS_TIP_THRESHOLD {
            tips.push("Solar surplus available, good time to charge the EV".to_string());
        }
        if status == ProductionStatus::None && info.home_batt_capacity_percent > 50.0 {
            tips.push("No production, home battery can cover the base load".to_string());
        }

        Ok(SolarStatus {
            current_production_kwh: info.solar_production_kwh,
            max_capacity_kwh: info.solar_max_capacity_kwh,
            production_percent,
            production_status: status,
            energy_surplus: surplus,
            daily_production_estimate: profile.iter().sum(),
            optimization_tips: tips,
        })
    }

    async fn charging_window(&self) -> Result<OptimalChargingWindow, ApiError> {
        let baseload: Vec<f64> = get_json(&self.http, self.url("baseload")).await?;
        let optimal_hours = analysis::derive_optimal_hours(&baseload);
        let time_range = analysis::describe_hour_range(&optimal_hours);
        Ok(OptimalChargingWindow {
            optimal_hours,
            strategy: "Low consumption".to_string(),
            time_range,
        })
    }

    async fn set_charging(&self, on: bool) -> Result<(), ApiError> {
        let state = if on { "on" } else { "off" };
        post_command(
            &self.http,
            self.url("charge"),
            Some(serde_json::json!({ "charging": state })),
        )
        .await
    }

    async fn discharge_ev_battery(&self) -> Result<(), ApiError> {
        post_command(
            &self.http,
            self.url("discharge-ev-battery"),
            Some(serde_json::json!({ "discharging": "on" })),
        )
        .await
    }

    async fn discharge_home_battery(&self) -> Result<(), ApiError> {
        post_command(
            &self.http,
            self.url("discharge-home-battery"),
            Some(serde_json::json!({ "discharging": "on" })),
        )
        .await
    }
}
