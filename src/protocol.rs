use serde::Deserialize;

use crate::{Error, Result};

/// Where the DIY thermostat daemon listens when running on the same host.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4201";

pub const STATUS_PATH: &str = "/thermostat";

/// Status body returned by `GET /thermostat`. Every key is optional; the
/// daemon only reports fields it has values for.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeviceStatus {
    pub mode: Option<String>,
    pub action: Option<String>,
    pub target: Option<TargetPayload>,
    pub temperature: Option<f64>,
}

/// The daemon reports `target` either as a bare number or as a
/// `[low, high]` pair, depending on the active mode.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TargetPayload {
    Scalar(f64),
    Pair(f64, f64),
}

pub fn parse_status(body: &str) -> Result<DeviceStatus> {
    serde_json::from_str(body).map_err(Error::from)
}
