use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{get_json, post_command, ApiError, BackendApi};
use crate::domain::{
    BaseloadProfile, EvBatteryStatus, HomeBatteryMode, HomeBatteryStatus, OptimalChargingWindow,
    PriceInfo, ProductionStatus, SolarStatus, TimeOfDay,
};

/// Adapter for the consolidated `/api` service (the latest backend
/// revision). Prices arrive in kronor and the charging window is computed
/// server-side, so this adapter is mostly a straight mapping.
#[derive(Clone)]
pub struct ConsolidatedApi {
    base_url: String,
    http: reqwest::Client,
}

impl ConsolidatedApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: super::build_http_client(timeout)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[derive(Debug, Deserialize)]
struct TimeDto {
    hour: u32,
    minute: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatteryDto {
    percentage: f64,
    current_energy_kwh: f64,
    max_capacity_kwh: f64,
    is_charging: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HomeBatteryDto {
    battery_level: f64,
    capacity_kwh: f64,
    max_capacity_kwh: f64,
    min_capacity_kwh: f64,
    battery_mode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentPriceDto {
    current_price: f64,
    current_hour: u32,
    hourly_prices: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolarDto {
    current_production_kwh: f64,
    max_capacity_kwh: f64,
    production_percent: f64,
    production_status: String,
    energy_surplus: f64,
    #[serde(default)]
    daily_production_estimate: f64,
    #[serde(default)]
    optimization_tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptimalChargingDto {
    // The backend serializes hours as JSON doubles (22.0), so deserialize
    // as floats and floor.
    optimal_hours: Vec<f64>,
    strategy: String,
    time_range: String,
}

#[async_trait]
impl BackendApi for ConsolidatedApi {
    async fn time(&self) -> Result<TimeOfDay, ApiError> {
        let dto: TimeDto = get_json(&self.http, self.url("time")).await?;
        Ok(TimeOfDay::new(dto.hour, dto.minute))
    }

    async fn baseload(&self) -> Result<BaseloadProfile, ApiError> {
        let hourly: Vec<f64> = get_json(&self.http, self.url("baseload")).await?;
        Ok(BaseloadProfile::new(hourly))
    }

    async fn ev_battery(&self) -> Result<EvBatteryStatus, ApiError> {
        let dto: BatteryDto = get_json(&self.http, self.url("battery")).await?;
        Ok(EvBatteryStatus {
            percentage: dto.percentage,
            current_energy_kwh: dto.current_energy_kwh,
            max_capacity_kwh: dto.max_capacity_kwh,
            is_charging: dto.is_charging,
        })
    }

    async fn home_battery(&self) -> Result<HomeBatteryStatus, ApiError> {
        let dto: HomeBatteryDto = get_json(&self.http, self.url("home-battery")).await?;
        let mode = dto
            .battery_mode
            .parse::<HomeBatteryMode>()
            .unwrap_or(HomeBatteryMode::Idle);
        Ok(HomeBatteryStatus {
            capacity_percent: dto.battery_level,
            current_capacity_kwh: dto.capacity_kwh,
            max_capacity_kwh: dto.max_capacity_kwh,
            min_capacity_kwh: dto.min_capacity_kwh,
            mode,
        })
    }

    async fn price(&self) -> Result<PriceInfo, ApiError> {
        let dto: CurrentPriceDto = get_json(&self.http, self.url("current-price")).await?;
        Ok(PriceInfo {
            current_price: dto.current_price,
            current_hour: dto.current_hour % 24,
            hourly_prices: dto.hourly_prices,
        })
    }

    async fn solar(&self) -> Result<SolarStatus, ApiError> {
        let dto: SolarDto = get_json(&self.http, self.url("solar-panel")).await?;
        Ok(SolarStatus {
            current_production_kwh: dto.current_production_kwh,
            max_capacity_kwh: dto.max_capacity_kwh,
            production_percent: dto.production_percent,
            production_status: ProductionStatus::from_label(&dto.production_status),
            energy_surplus: dto.energy_surplus,
            daily_production_estimate: dto.daily_production_estimate,
            optimization_tips: dto.optimization_tips,
        })
    }

    async fn charging_window(&self) -> Result<OptimalChargingWindow, ApiError> {
        let dto: OptimalChargingDto = get_json(&self.http, self.url("optimal-charging-hours")).await?;
        Ok(OptimalChargingWindow {
            optimal_hours: dto
                .optimal_hours
                .into_iter()
                .map(|h| (h.floor().max(0.0) as u32) % 24)
                .collect(),
            strategy: dto.strategy,
            time_range: dto.time_range,
        })
    }

    async fn set_charging(&self, on: bool) -> Result<(), ApiError> {
        let path = if on { "charge/start" } else { "charge/stop" };
        post_command(&self.http, self.url(path), None).await
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
