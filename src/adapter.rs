use serde_json::Value;
use tracing::{debug, trace};

use crate::logger::{TrafficLogMode, TrafficLogger};
use crate::protocol::{parse_status, DeviceStatus, DEFAULT_BASE_URL, STATUS_PATH};
use crate::types::*;
use crate::{Error, Result};

const DISPLAY_NAME: &str = "Thermostat";

const MIN_TEMP_F: f64 = 60.0;
const MAX_TEMP_F: f64 = 80.0;
const TARGET_STEP_F: f64 = 0.1;

const SUPPORTED_MODES: &[HvacMode] = &[
    HvacMode::Off,
    HvacMode::Heat,
    HvacMode::Cool,
    HvacMode::HeatCool,
    HvacMode::FanOnly,
];

// The daemon exposes no fan control.
const SUPPORTED_FAN_MODES: &[&str] = &[];

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;

pub struct ThermostatAdapterBuilder {
    base_url: String,
    event_callbacks: Vec<EventCallback>,
    log_mode: Option<TrafficLogMode>,
    log_path: Option<String>,
}

impl ThermostatAdapterBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            event_callbacks: Vec::new(),
            log_mode: None,
            log_path: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn traffic_log(mut self, mode: TrafficLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> ThermostatAdapter {
        // No request timeout; a hung daemon blocks the caller.
        let http = reqwest::Client::builder()
            .build()
            .expect("failed to build HTTP client");

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => {
                Some(TrafficLogger::new(mode, &path).expect("failed to open traffic log"))
            }
            _ => None,
        };

        ThermostatAdapter {
            http,
            base_url: self.base_url,
            current_temperature: 50.0,
            target: Target::Single(70.0),
            hvac_mode: HvacMode::Off,
            hvac_action: HvacAction::Off,
            event_callbacks: self.event_callbacks,
            logger,
        }
    }
}

impl Default for ThermostatAdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Climate entity for one DIY thermostat daemon.
///
/// All methods take `&mut self`; the host framework must not issue calls
/// against the same adapter concurrently, and the exclusive borrow makes
/// that a compile-time rule rather than a runtime surprise.
pub struct ThermostatAdapter {
    http: reqwest::Client,
    base_url: String,
    current_temperature: f64,
    target: Target,
    hvac_mode: HvacMode,
    hvac_action: HvacAction,
    event_callbacks: Vec<EventCallback>,
    logger: Option<TrafficLogger>,
}

impl ThermostatAdapter {
    pub fn builder() -> ThermostatAdapterBuilder {
        ThermostatAdapterBuilder::new()
    }

    // -- Descriptive accessors (fixed for this device) --

    pub fn name(&self) -> &'static str {
        DISPLAY_NAME
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        TemperatureUnit::Fahrenheit
    }

    pub fn hvac_modes(&self) -> &'static [HvacMode] {
        SUPPORTED_MODES
    }

    pub fn fan_modes(&self) -> &'static [&'static str] {
        SUPPORTED_FAN_MODES
    }

    pub fn min_temp(&self) -> f64 {
        MIN_TEMP_F
    }

    pub fn max_temp(&self) -> f64 {
        MAX_TEMP_F
    }

    pub fn target_temperature_step(&self) -> f64 {
        TARGET_STEP_F
    }

    pub fn supported_features(&self) -> Features {
        Features::TARGET_TEMPERATURE
    }

    // -- State accessors --

    pub fn current_temperature(&self) -> f64 {
        self.current_temperature
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Scalar setpoint, `None` while a low/high range is active.
    pub fn target_temperature(&self) -> Option<f64> {
        self.target.general()
    }

    pub fn target_temperature_low(&self) -> Option<f64> {
        self.target.low()
    }

    pub fn target_temperature_high(&self) -> Option<f64> {
        self.target.high()
    }

    pub fn hvac_mode(&self) -> HvacMode {
        self.hvac_mode
    }

    pub fn hvac_action(&self) -> HvacAction {
        self.hvac_action
    }

    // -- Device synchronization --

    /// Pull the daemon's current status and overwrite local state with it.
    ///
    /// Any failure propagates to the host, which decides whether to mark the
    /// entity unavailable. Fields already applied before a failure stay
    /// applied; there is no rollback.
    pub async fn refresh(&mut self) -> Result<()> {
        let url = format!("{}{}", self.base_url, STATUS_PATH);
        debug!(url = %url, "refreshing thermostat state");

        if let Some(ref mut logger) = self.logger {
            logger.log_request("GET", STATUS_PATH, None);
        }

        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let status_code = resp.status().as_u16();
        let body = resp.text().await?;

        if let Some(ref mut logger) = self.logger {
            let body_json: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            logger.log_status(status_code, &body_json);
        }

        let status = parse_status(&body)?;
        let events = self.apply_status(&status)?;
        self.fire_events(&events);
        Ok(())
    }

    /// Apply a caller-requested setpoint change.
    ///
    /// A `low`/`high` pair takes precedence over `general`. Local state is
    /// updated before the device is notified; if the PUT fails, local and
    /// remote setpoints diverge until the next successful write.
    pub async fn set_temperature(
        &mut self,
        low: Option<f64>,
        high: Option<f64>,
        general: Option<f64>,
    ) -> Result<()> {
        let new_target = match (low, high, general) {
            (Some(low), Some(high), _) => Some(Target::Range { low, high }),
            (_, _, Some(value)) => Some(Target::Single(value)),
            _ => None,
        };

        let mut events = Vec::new();
        if let Some(target) = new_target
            && target != self.target
        {
            self.target = target;
            events.push(Event::TargetChanged { target });
        }

        let url = format!("{}{}", self.base_url, STATUS_PATH);
        debug!(url = %url, target = %self.target, "writing setpoint");

        if let Some(ref mut logger) = self.logger {
            logger.log_request("PUT", STATUS_PATH, None);
        }

        // TODO: transmit the new target in the request body; the daemon
        // accepts {"target": ...} on PUT but this request sends nothing,
        // so the device never learns the new setpoint.
        self.http.put(&url).send().await?.error_for_status()?;

        self.fire_events(&events);
        Ok(())
    }

    /// Change the operating mode. Local-only: unlike `set_temperature`, no
    /// request is issued, and the daemon keeps running its previous mode
    /// until something else tells it otherwise.
    pub fn set_hvac_mode(&mut self, mode: HvacMode) {
        if mode == self.hvac_mode {
            return;
        }
        self.hvac_mode = mode;
        let events = [Event::ModeChanged { mode }];
        self.fire_events(&events);
    }

    // -- Helpers --

    /// Fold a decoded status body into local state. Fields apply in the
    /// order mode, action, temperature; an unknown vocabulary string aborts
    /// at that field and leaves earlier fields applied.
    fn apply_status(&mut self, status: &DeviceStatus) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        if let Some(ref mode_str) = status.mode {
            let mode = HvacMode::from_device_str(mode_str)
                .ok_or_else(|| Error::UnknownMode(mode_str.clone()))?;
            if mode != self.hvac_mode {
                self.hvac_mode = mode;
                events.push(Event::ModeChanged { mode });
            }
        }

        if let Some(ref action_str) = status.action {
            let action = HvacAction::from_device_str(action_str)
                .ok_or_else(|| Error::UnknownAction(action_str.clone()))?;
            if action != self.hvac_action {
                self.hvac_action = action;
                events.push(Event::ActionChanged { action });
            }
        }

        if let Some(temperature) = status.temperature {
            if temperature != self.current_temperature {
                self.current_temperature = temperature;
                events.push(Event::TemperatureChanged { temperature });
            }
        }

        // Reported targets are decoded but not applied. The write path never
        // transmits setpoints (see set_temperature), so the daemon's idea of
        // the target is stale whenever the user has touched it here; echoing
        // it back would clobber the user's intent.
        // TODO: apply reported targets once set_temperature sends them.
        if let Some(target) = status.target {
            trace!(?target, "ignoring device-reported target");
        }

        Ok(events)
    }

    fn fire_events(&self, events: &[Event]) {
        for event in events {
            for cb in &self.event_callbacks {
                cb(event);
            }
        }
        if !events.is_empty() {
            debug!(count = events.len(), "state changes applied");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TargetPayload;

    fn adapter() -> ThermostatAdapter {
        ThermostatAdapter::builder().build()
    }

    #[test]
    fn defaults() {
        let a = adapter();
        assert_eq!(a.current_temperature(), 50.0);
        assert_eq!(a.target(), Target::Single(70.0));
        assert_eq!(a.hvac_mode(), HvacMode::Off);
        assert_eq!(a.hvac_action(), HvacAction::Off);
    }

    #[test]
    fn fixed_descriptors() {
        let a = adapter();
        assert_eq!(a.name(), "Thermostat");
        assert_eq!(a.temperature_unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(a.min_temp(), 60.0);
        assert_eq!(a.max_temp(), 80.0);
        assert_eq!(a.target_temperature_step(), 0.1);
        assert_eq!(a.hvac_modes().len(), 5);
        assert!(!a.hvac_modes().contains(&HvacMode::Idle));
        assert!(a.fan_modes().is_empty());
        assert!(a.supported_features().contains(Features::TARGET_TEMPERATURE));
    }

    #[test]
    fn apply_status_maps_mode_and_action() {
        let mut a = adapter();
        let status = DeviceStatus {
            mode: Some("heat".to_string()),
            action: Some("heating".to_string()),
            ..Default::default()
        };
        let events = a.apply_status(&status).unwrap();
        assert_eq!(a.hvac_mode(), HvacMode::Heat);
        assert_eq!(a.hvac_action(), HvacAction::Heating);
        assert_eq!(a.current_temperature(), 50.0);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn apply_status_unknown_mode_fails() {
        let mut a = adapter();
        let status = DeviceStatus {
            mode: Some("defrost".to_string()),
            ..Default::default()
        };
        let err = a.apply_status(&status).unwrap_err();
        assert!(matches!(err, Error::UnknownMode(ref s) if s == "defrost"));
        assert_eq!(a.hvac_mode(), HvacMode::Off);
    }

    #[test]
    fn apply_status_unknown_action_keeps_mode() {
        let mut a = adapter();
        let status = DeviceStatus {
            mode: Some("cool".to_string()),
            action: Some("purging".to_string()),
            temperature: Some(71.0),
            ..Default::default()
        };
        let err = a.apply_status(&status).unwrap_err();
        assert!(matches!(err, Error::UnknownAction(_)));
        // Mode applied before the failing field stays; temperature after
        // it is never reached.
        assert_eq!(a.hvac_mode(), HvacMode::Cool);
        assert_eq!(a.current_temperature(), 50.0);
    }

    #[test]
    fn apply_status_ignores_reported_target() {
        let mut a = adapter();
        let status = DeviceStatus {
            target: Some(TargetPayload::Pair(68.0, 72.0)),
            ..Default::default()
        };
        let events = a.apply_status(&status).unwrap();
        assert_eq!(a.target(), Target::Single(70.0));
        assert!(events.is_empty());
    }

    #[test]
    fn apply_status_updates_temperature() {
        let mut a = adapter();
        let status = DeviceStatus {
            temperature: Some(68.5),
            ..Default::default()
        };
        let events = a.apply_status(&status).unwrap();
        assert_eq!(a.current_temperature(), 68.5);
        assert_eq!(
            events,
            vec![Event::TemperatureChanged { temperature: 68.5 }]
        );
    }

    #[test]
    fn set_hvac_mode_is_local_only() {
        // No server anywhere near this test; a network call would hang or
        // fail, and neither happens.
        let mut a = adapter();
        a.set_hvac_mode(HvacMode::Heat);
        assert_eq!(a.hvac_mode(), HvacMode::Heat);
    }

    #[test]
    fn set_hvac_mode_fires_event_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let mut a = ThermostatAdapter::builder()
            .on_event(move |_| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        a.set_hvac_mode(HvacMode::Cool);
        a.set_hvac_mode(HvacMode::Cool);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
