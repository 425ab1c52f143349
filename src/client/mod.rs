pub mod consolidated;
pub mod legacy;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::domain::{
    BaseloadProfile, EvBatteryStatus, HomeBatteryStatus, OptimalChargingWindow, PriceInfo,
    SolarStatus, TimeOfDay,
};

pub use consolidated::ConsolidatedApi;
pub use legacy::LegacyApi;

/// Everything that can go wrong talking to the backend. All three kinds
/// collapse into the same fallback policy at the [`DashboardClient`]
/// boundary; the distinction only shows up in logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {0}")]
    Status(StatusCode),

    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One normalized interface per backend revision. Adapters translate their
/// wire shape into the internal records; the rest of the crate never sees
/// wire DTOs.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn time(&self) -> Result<TimeOfDay, ApiError>;
    async fn baseload(&self) -> Result<BaseloadProfile, ApiError>;
    async fn ev_battery(&self) -> Result<EvBatteryStatus, ApiError>;
    async fn home_battery(&self) -> Result<HomeBatteryStatus, ApiError>;
    async fn price(&self) -> Result<PriceInfo, ApiError>;
    async fn solar(&self) -> Result<SolarStatus, ApiError>;
    async fn charging_window(&self) -> Result<OptimalChargingWindow, ApiError>;

    async fn set_charging(&self, on: bool) -> Result<(), ApiError>;
    async fn discharge_ev_battery(&self) -> Result<(), ApiError>;
    async fn discharge_home_battery(&self) -> Result<(), ApiError>;
}

/// A record plus whether it came from the backend or is the hardcoded
/// substitute. Panels render stale samples dimmed instead of showing an
/// error state.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampled<T> {
    pub value: T,
    pub fresh: bool,
}

impl<T> Sampled<T> {
    pub fn live(value: T) -> Self {
        Self { value, fresh: true }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            fresh: false,
        }
    }
}

/// Error-absorbing client: every fetch returns a record, never an error.
/// Failures are logged and replaced by the resource's fallback record;
/// commands report plain success/failure.
#[derive(Clone)]
pub struct DashboardClient {
    api: Arc<dyn BackendApi>,
}

impl DashboardClient {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }

    async fn guard<T, F>(&self, resource: &'static str, fut: F, fallback: fn() -> T) -> Sampled<T>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        match fut.await {
            Ok(value) => Sampled::live(value),
            Err(error) => {
                warn!(%error, resource, "fetch failed, serving fallback record");
                Sampled::fallback(fallback())
            }
        }
    }

    pub async fn time(&self) -> Sampled<TimeOfDay> {
        self.guard("time", self.api.time(), TimeOfDay::fallback)
            .await
    }

    pub async fn baseload(&self) -> Sampled<BaseloadProfile> {
        self.guard("baseload", self.api.baseload(), BaseloadProfile::fallback)
            .await
    }

    /// EV battery state. The energy/capacity-derived percentage is
    /// authoritative; a backend-reported percentage more than one point
    /// off is logged and replaced.
    pub async fn ev_battery(&self) -> Sampled<EvBatteryStatus> {
        let mut sample = self
            .guard(
                "ev-battery",
                self.api.ev_battery(),
                EvBatteryStatus::fallback,
            )
            .await;
        if sample.fresh {
            let derived = sample.value.derived_percentage();
            if (sample.value.percentage - derived).abs() > 1.0 {
                warn!(
                    reported = sample.value.percentage,
                    derived, "EV battery percentage disagrees with energy/capacity"
                );
                sample.value.percentage = derived;
            }
        }
        sample
    }

    pub async fn home_battery(&self) -> Sampled<HomeBatteryStatus> {
        self.guard(
            "home-battery",
            self.api.home_battery(),
            HomeBatteryStatus::fallback,
        )
        .await
    }

    pub async fn price(&self) -> Sampled<PriceInfo> {
        self.guard("price", self.api.price(), PriceInfo::fallback)
            .await
    }

    pub async fn solar(&self) -> Sampled<SolarStatus> {
        self.guard("solar", self.api.solar(), SolarStatus::fallback)
            .await
    }

    pub async fn charging_window(&self) -> Sampled<OptimalChargingWindow> {
        self.guard(
            "charging-window",
            self.api.charging_window(),
            OptimalChargingWindow::fallback,
        )
        .await
    }

    pub async fn start_charging(&self) -> bool {
        self.command("start-charging", self.api.set_charging(true))
            .await
    }

    pub async fn stop_charging(&self) -> bool {
        self.command("stop-charging", self.api.set_charging(false))
            .await
    }

    pub async fn discharge_ev_battery(&self) -> bool {
        self.command("discharge-ev-battery", self.api.discharge_ev_battery())
            .await
    }

    pub async fn discharge_home_battery(&self) -> bool {
        self.command("discharge-home-battery", self.api.discharge_home_battery())
            .await
    }

    async fn command<F>(&self, name: &'static str, fut: F) -> bool
    where
        F: Future<Output = Result<(), ApiError>>,
    {
        match fut.await {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, command = name, "command failed, state unchanged");
                false
            }
        }
    }
}

/// Shared GET helper: transport errors, non-2xx statuses and unparseable
/// bodies each map to their own [`ApiError`] variant.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: String,
) -> Result<T, ApiError> {
    let resp = http.get(&url).send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status(status));
    }
    Ok(serde_json::from_str(&body)?)
}

/// Shared POST helper for fire-and-forget commands.
pub(crate) async fn post_command(
    http: &reqwest::Client,
    url: String,
    body: Option<serde_json::Value>,
) -> Result<(), ApiError> {
    let mut req = http.post(&url);
    if let Some(body) = body {
        req = req.json(&body);
    }
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Status(status));
    }
    Ok(())
}

pub(crate) fn build_http_client(timeout: std::time::Duration) -> Result<reqwest::Client, ApiError> {
    use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("laddstation-dashboard/0.1"));
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}
