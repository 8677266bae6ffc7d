use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use crate::{devices::Device, error::AppError, events::EventBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PowerStatus {
    On,
    Off,
}

impl PowerStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            _ => Err(AppError::Validation(format!(
                "state must be \"ON\" or \"OFF\", got \"{s}\""
            ))),
        }
    }
}

/// The single light's accounting state.
#[derive(Debug, Clone, PartialEq)]
pub struct LightState {
    pub status: PowerStatus,
    pub brightness: u8,
    pub current_power: f64,
    pub last_updated: DateTime<Utc>,
    pub energy_consumed: f64,
}

/// Field changes requested by a client. `None` keeps the previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightUpdate {
    pub status: Option<PowerStatus>,
    pub brightness: Option<u8>,
}

/// What `GET /light` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LightReport {
    pub status: PowerStatus,
    pub brightness: u8,
    /// Watts.
    pub current_power: f64,
    pub last_updated: DateTime<Utc>,
    /// Watt-hours since startup.
    pub energy_consumed: f64,
    /// Currency per hour at the current draw.
    pub cost_estimate: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpdateLightResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: LightReport,
}

impl From<LightReport> for UpdateLightResponse {
    fn from(report: LightReport) -> Self {
        Self {
            message: format!("Light turned {}", report.status),
            report,
        }
    }
}

/// Body of `POST /light`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLightRequest {
    #[schema(example = "ON")]
    pub state: Option<String>,
    #[validate(range(min = 0, max = 100, message = "brightness must be between 0 and 100"))]
    #[schema(minimum = 0, maximum = 100)]
    pub brightness: Option<i64>,
}

impl UpdateLightRequest {
    pub fn into_update(self) -> Result<LightUpdate, AppError> {
        self.validate()?;
        let status = self.state.as_deref().map(str::parse::<PowerStatus>).transpose()?;
        let brightness = self
            .brightness
            .map(u8::try_from)
            .transpose()
            .map_err(|_| AppError::Validation("brightness must be between 0 and 100".into()))?;
        Ok(LightUpdate { status, brightness })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Messages pushed to `/ws/light` subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Snapshot(LightReport),
    Updated(UpdateLightResponse),
}

/// `events` is the same bus the light publishes to.
pub struct AppState {
    pub light: Arc<dyn Device>,
    pub events: Arc<EventBus>,
}

impl AppState {
    pub fn new(light: Arc<dyn Device>, events: Arc<EventBus>) -> Self {
        Self { light, events }
    }
}
